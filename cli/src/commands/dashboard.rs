use agentic_dashboard::{Route, Shell};
use serde_json::json;

use crate::util::emit;

pub async fn run(shell: &mut Shell) -> i32 {
    let result = shell.navigate(Route::Dashboard).await.map(|_| {
        let view = shell.overview();
        let recent: Vec<_> = view
            .recent_activity()
            .iter()
            .map(|e| {
                json!({
                    "action_type": e.action_type,
                    "success": e.success,
                    "timestamp": e.timestamp,
                })
            })
            .collect();
        json!({
            "stats": view.stats(),
            "recent_activity": recent,
        })
    });
    emit(shell, result)
}

/// Every screen with the command that shows it.
pub fn routes() -> i32 {
    let routes: Vec<_> = Route::ALL
        .iter()
        .map(|r| json!({"path": r.path(), "label": r.label()}))
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&routes).unwrap_or_else(|_| format!("{routes:?}"))
    );
    0
}

use serde::Serialize;

/// What a view shows for one resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "lowercase")]
pub enum Loadable<T> {
    Loading,
    Ready(T),
}

impl<T> Loadable<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Loadable::Loading => None,
            Loadable::Ready(v) => Some(v),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Loadable::Loading)
    }
}

/// Identifies one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// A resource whose responses may arrive out of order.
///
/// Each fetch takes a ticket from `begin`; a response is applied only if no newer
/// ticket has been applied already, so a slow response never overwrites a fresher one.
#[derive(Debug, Clone)]
pub struct Synced<T> {
    state: Loadable<T>,
    issued: u64,
    applied: u64,
    revision: u64,
}

impl<T> Default for Synced<T> {
    fn default() -> Self {
        Self {
            state: Loadable::Loading,
            issued: 0,
            applied: 0,
            revision: 0,
        }
    }
}

impl<T> Synced<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    /// Apply a response. Returns false when it was superseded and dropped.
    pub fn apply(&mut self, ticket: Ticket, value: T) -> bool {
        if ticket.0 <= self.applied {
            tracing::debug!(
                ticket = ticket.0,
                applied = self.applied,
                "dropping stale response"
            );
            return false;
        }
        self.applied = ticket.0;
        self.revision += 1;
        self.state = Loadable::Ready(value);
        true
    }

    /// Record a failed fetch. Prior data stays; a first load settles on the empty
    /// value so the view stops spinning. Returns true if this was the first load.
    pub fn fail(&mut self, ticket: Ticket) -> bool
    where
        T: Default,
    {
        if ticket.0 <= self.applied || !self.state.is_loading() {
            return false;
        }
        self.applied = ticket.0;
        self.revision += 1;
        self.state = Loadable::Ready(T::default());
        true
    }

    /// Back to loading, discarding responses to anything already issued.
    pub fn reset(&mut self) {
        self.applied = self.issued;
        self.state = Loadable::Loading;
    }

    pub fn state(&self) -> &Loadable<T> {
        &self.state
    }

    pub fn get(&self) -> Option<&T> {
        self.state.ready()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// Bumped whenever the visible value changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn older_response_never_overwrites_newer() {
        let mut synced: Synced<Vec<u32>> = Synced::new();
        let first = synced.begin();
        let second = synced.begin();
        assert!(synced.apply(second, vec![2]));
        assert!(!synced.apply(first, vec![1]));
        assert_eq!(synced.get(), Some(&vec![2]));
        assert_eq!(synced.revision(), 1);
    }

    #[test]
    fn failed_first_load_resolves_to_empty() {
        let mut synced: Synced<Vec<u32>> = Synced::new();
        let t = synced.begin();
        assert!(synced.fail(t));
        assert_eq!(synced.get(), Some(&Vec::new()));
    }

    #[test]
    fn failure_after_data_keeps_data() {
        let mut synced: Synced<Vec<u32>> = Synced::new();
        let t = synced.begin();
        synced.apply(t, vec![7]);
        let t = synced.begin();
        assert!(!synced.fail(t));
        assert_eq!(synced.get(), Some(&vec![7]));
    }

    #[test]
    fn reset_discards_in_flight_responses() {
        let mut synced: Synced<u32> = Synced::new();
        let t = synced.begin();
        synced.reset();
        assert!(!synced.apply(t, 1));
        assert!(synced.is_loading());
        let t = synced.begin();
        assert!(synced.apply(t, 2));
    }
}

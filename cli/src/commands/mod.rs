pub mod agent;
pub mod auth;
pub mod dashboard;
pub mod policy;
pub mod swap;
pub mod transactions;
pub mod wallet;

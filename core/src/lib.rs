//! Records exchanged with the wallet-management backend.
//!
//! Everything here mirrors the backend's JSON. The dashboard never owns the lifecycle of
//! these records; it holds a transient copy per view and replaces it wholesale on reload.

pub mod agent;
pub mod audit;
pub mod auth;
pub mod error;
pub mod policy;
pub mod swap;
pub mod wallet;

//! # Repository Layer
//!
//! Repositories encapsulate the SeaORM operations on the listings store.
//! They are generic over the connection so the sync engine can run every
//! write of a pass inside one transaction.

pub mod listing;

pub use listing::{ListingFilter, ListingRepository, UpsertOutcome};

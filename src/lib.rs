//! # rentfeed
//!
//! Imports hashtag-structured real-estate listings from channel feeds into a
//! persisted store and keeps both in sync: extraction turns one message into
//! a typed record, the sync engine upserts by message identity and
//! tombstones listings that disappear from their channel.

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod logging;
pub mod models;
pub mod repositories;
pub mod source;
pub mod sync;
pub use migration;

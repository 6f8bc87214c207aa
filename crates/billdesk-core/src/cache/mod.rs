//! Local copies of dashboard data.
//!
//! `CacheManager` keeps the last fetched templates and unpaid bills as JSON so
//! the dashboard has something to show while a refresh is in flight. Entries
//! are considered stale after 60 minutes. Everything here belongs to the
//! signed-in user and is wiped when the session ends.

pub mod manager;

pub use manager::{CacheAges, CacheManager, CachedData};

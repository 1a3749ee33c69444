//! Mailbox search
//!
//! Runs a Gmail query on behalf of the signed-in user and turns the hits into
//! display records.

mod service;

pub use service::{SearchOutcome, SearchService};

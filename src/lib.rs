//! Outdate Notify: routes stale-document notifications to the people who
//! maintain them.

pub mod checks;
pub mod config;
pub mod document;
pub mod error;
pub mod mail;
pub mod notify;

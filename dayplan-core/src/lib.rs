//! Core types for dayplan.
//!
//! This crate provides everything the server and auth providers share:
//! - `DateKey`, `DayRecord` and `Timetable` for per-day notes and class slots
//! - `store` for the document store boundary and its file/memory backends
//! - `auth` for identity providers, their stdio protocol and the session manager
//! - `planner` for the application state a UI drives

pub mod auth;
pub mod config;
pub mod date_key;
pub mod day_store;
pub mod error;
pub mod links;
pub mod planner;
pub mod record;
pub mod store;

pub use date_key::{DateKey, format_date};
pub use record::{DayRecord, TIMETABLE_SLOTS, Timetable};

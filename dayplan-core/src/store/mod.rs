//! Document store boundary.
//!
//! Day records live at `users/{uid}/calendar/{date_key}`. A store only knows
//! how to read and write whole documents at a path; merging, retries and
//! conflict resolution are left to the backend (last writer wins).

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::date_key::DateKey;
use crate::error::StoreResult;
use crate::record::{DayRecord, Timetable};

const USERS_COLLECTION: &str = "users";
const CALENDAR_COLLECTION: &str = "calendar";

/// Path segments addressing one document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocPath(Vec<String>);

impl DocPath {
    /// `users/{uid}/calendar/{key}`
    pub fn day(uid: &str, key: &DateKey) -> Self {
        DocPath(vec![
            USERS_COLLECTION.to_string(),
            uid.to_string(),
            CALENDAR_COLLECTION.to_string(),
            key.to_string(),
        ])
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

/// Stored form of a day record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawDocument")]
pub struct Document {
    pub note: String,
    pub timetable: Timetable,
}

/// Whatever was actually on disk; decoded leniently into a [`Document`].
#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    note: serde_json::Value,
    #[serde(default)]
    timetable: serde_json::Value,
}

impl From<RawDocument> for Document {
    fn from(raw: RawDocument) -> Self {
        Document {
            note: raw.note.as_str().unwrap_or_default().to_string(),
            timetable: Timetable::from_stored(&raw.timetable),
        }
    }
}

impl Document {
    pub fn into_record(self, date: DateKey) -> DayRecord {
        DayRecord::new(date, self.note, self.timetable)
    }
}

impl From<&DayRecord> for Document {
    fn from(record: &DayRecord) -> Self {
        Document {
            note: record.note.clone(),
            timetable: record.timetable.clone(),
        }
    }
}

/// A key-document database.
///
/// `write` replaces the whole document; fields absent from `doc` are not
/// preserved from a previous version.
pub trait DocumentStore: Send + Sync {
    fn read(&self, path: &DocPath) -> impl Future<Output = StoreResult<Option<Document>>> + Send;

    fn write(&self, path: &DocPath, doc: &Document) -> impl Future<Output = StoreResult<()>> + Send;
}

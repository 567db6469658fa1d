//! Day records: the note and class timetable kept for one calendar day.

use serde::{Deserialize, Serialize};

use crate::date_key::DateKey;
use crate::error::{PlannerError, PlannerResult};

/// Number of class periods in a school day.
pub const TIMETABLE_SLOTS: usize = 7;

/// Display label for a timetable slot (0-based index).
pub fn slot_label(index: usize) -> String {
    format!("{}교시", index + 1)
}

/// Labels for every slot, in order.
pub fn slot_labels() -> Vec<String> {
    (0..TIMETABLE_SLOTS).map(slot_label).collect()
}

/// Exactly [`TIMETABLE_SLOTS`] text slots, one per class period.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timetable([String; TIMETABLE_SLOTS]);

impl Timetable {
    pub fn new(slots: [String; TIMETABLE_SLOTS]) -> Self {
        Timetable(slots)
    }

    /// Decode stored timetable data, falling back to empty slots when the
    /// value is missing, not an array of strings, or the wrong length.
    pub fn from_stored(value: &serde_json::Value) -> Self {
        let Some(items) = value.as_array() else {
            return Self::default();
        };

        let slots: Option<Vec<String>> = items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect();

        slots
            .and_then(|slots| Self::try_from(slots).ok())
            .unwrap_or_default()
    }

    pub fn slots(&self) -> &[String] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn set(&mut self, index: usize, value: impl Into<String>) -> PlannerResult<()> {
        let slot = self
            .0
            .get_mut(index)
            .ok_or(PlannerError::SlotOutOfRange(index))?;
        *slot = value.into();
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(String::is_empty)
    }
}

impl TryFrom<Vec<String>> for Timetable {
    type Error = PlannerError;

    fn try_from(slots: Vec<String>) -> Result<Self, Self::Error> {
        let len = slots.len();
        let slots: [String; TIMETABLE_SLOTS] = slots
            .try_into()
            .map_err(|_| PlannerError::InvalidTimetable(len))?;
        Ok(Timetable(slots))
    }
}

/// The note and timetable stored for one user on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: DateKey,
    pub note: String,
    pub timetable: Timetable,
}

impl DayRecord {
    /// What a day with nothing saved looks like.
    pub fn empty(date: DateKey) -> Self {
        DayRecord {
            date,
            note: String::new(),
            timetable: Timetable::default(),
        }
    }

    pub fn new(date: DateKey, note: impl Into<String>, timetable: Timetable) -> Self {
        DayRecord {
            date,
            note: note.into(),
            timetable,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.note.is_empty() && self.timetable.is_empty()
    }
}

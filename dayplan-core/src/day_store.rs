//! Loads and saves day records for the signed-in user.

use tracing::{debug, info};

use crate::auth::Identity;
use crate::date_key::DateKey;
use crate::error::StoreResult;
use crate::record::DayRecord;
use crate::store::{DocPath, Document, DocumentStore};

/// Day record access on top of a [`DocumentStore`].
///
/// Every operation takes the current identity as an `Option`; without one it
/// does nothing. A single attempt is made against the store and any failure is
/// returned as-is.
pub struct DayRecordStore<S> {
    store: S,
}

impl<S: DocumentStore> DayRecordStore<S> {
    pub fn new(store: S) -> Self {
        DayRecordStore { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetch the record for `date`.
    ///
    /// Returns `None` only when there is no identity. A day with nothing saved
    /// yields an empty record.
    pub async fn load(
        &self,
        identity: Option<&Identity>,
        date: DateKey,
    ) -> StoreResult<Option<DayRecord>> {
        let Some(identity) = identity else {
            return Ok(None);
        };

        let path = DocPath::day(&identity.uid, &date);
        let record = match self.store.read(&path).await? {
            Some(doc) => doc.into_record(date),
            None => DayRecord::empty(date),
        };

        debug!(uid = %identity.uid, date = %date, empty = record.is_empty(), "day record loaded");
        Ok(Some(record))
    }

    /// Replace the stored record for `record.date`.
    /// Returns false when there is no identity and nothing was written.
    pub async fn save(&self, identity: Option<&Identity>, record: &DayRecord) -> StoreResult<bool> {
        let Some(identity) = identity else {
            return Ok(false);
        };

        let path = DocPath::day(&identity.uid, &record.date);
        self.store.write(&path, &Document::from(record)).await?;

        info!(uid = %identity.uid, date = %record.date, "day record saved");
        Ok(true)
    }
}

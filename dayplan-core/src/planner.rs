//! Application state a UI drives: the session, the selected day and the
//! record being edited.
//!
//! Loads are stamped with a sequence number when issued. If the selection
//! changes (or the user signs out) before a load completes, its result is
//! discarded instead of overwriting the newer view.
//!
//! The view also remembers whose stored record the note and timetable came
//! from. The owner is reset whenever the selected day or the user changes,
//! and saving is refused unless it matches the signed-in user.

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::auth::{AuthProvider, Credentials, Identity, SessionManager};
use crate::date_key::DateKey;
use crate::day_store::DayRecordStore;
use crate::error::{PlannerError, PlannerResult};
use crate::record::{DayRecord, Timetable, slot_labels};
use crate::store::DocumentStore;

/// What happened to a load issued by the planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "record", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// The record now shows in the view.
    Applied(DayRecord),
    /// A newer selection or sign-out happened while loading; result dropped.
    Superseded,
    /// Nobody is signed in, so nothing was read.
    NoSession,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "date", rename_all = "snake_case")]
pub enum SaveOutcome {
    Saved(DateKey),
    NoSession,
}

/// Snapshot of everything a UI renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannerView {
    pub identity: Option<Identity>,
    pub selected_date: DateKey,
    pub note: String,
    pub timetable: Timetable,
    pub slot_labels: Vec<String>,
    /// Whether the note and timetable are the signed-in user's record for
    /// `selected_date`, i.e. whether saving is allowed.
    pub loaded: bool,
}

struct ViewState {
    selected: DateKey,
    note: String,
    timetable: Timetable,
    load_seq: u64,
    /// Uid whose record for `selected` the note and timetable were loaded from.
    owner: Option<String>,
}

impl ViewState {
    fn clear_record(&mut self) {
        self.note.clear();
        self.timetable = Timetable::default();
        self.owner = None;
    }

    fn owned_by(&self, identity: &Identity) -> bool {
        self.owner.as_deref() == Some(identity.uid.as_str())
    }

    /// Invalidate any load still in flight and return the new sequence number.
    fn next_seq(&mut self) -> u64 {
        self.load_seq += 1;
        self.load_seq
    }
}

pub struct Planner<A, S> {
    session: SessionManager<A>,
    days: DayRecordStore<S>,
    view: Mutex<ViewState>,
}

impl<A: AuthProvider, S: DocumentStore> Planner<A, S> {
    /// A planner showing today, signed out.
    pub fn new(provider: A, store: S) -> PlannerResult<Self> {
        Ok(Self::with_date(provider, store, DateKey::today()?))
    }

    pub fn with_date(provider: A, store: S, selected: DateKey) -> Self {
        Planner {
            session: SessionManager::new(provider),
            days: DayRecordStore::new(store),
            view: Mutex::new(ViewState {
                selected,
                note: String::new(),
                timetable: Timetable::default(),
                load_seq: 0,
                owner: None,
            }),
        }
    }

    pub fn session(&self) -> &SessionManager<A> {
        &self.session
    }

    pub fn days(&self) -> &DayRecordStore<S> {
        &self.days
    }

    pub async fn view(&self) -> PlannerView {
        let identity = self.session.identity().await;
        let view = self.view.lock().await;
        let loaded = identity.as_ref().is_some_and(|identity| view.owned_by(identity));

        PlannerView {
            identity,
            selected_date: view.selected,
            note: view.note.clone(),
            timetable: view.timetable.clone(),
            slot_labels: slot_labels(),
            loaded,
        }
    }

    /// Sign in, then load the selected day for the new user.
    ///
    /// Only a failed sign-in is an error. Once the provider accepts, the
    /// session stands and the load result is handed back alongside the
    /// identity, failed or not.
    pub async fn sign_in(
        &self,
        credentials: Credentials,
    ) -> PlannerResult<(Identity, PlannerResult<LoadOutcome>)> {
        let identity = self.session.sign_in(credentials).await?;

        {
            let mut view = self.view.lock().await;
            if !view.owned_by(&identity) {
                view.next_seq();
                view.clear_record();
            }
        }

        let load = self.reload().await;
        if let Err(e) = &load {
            warn!(uid = %identity.uid, error = %e, "signed in but the selected day did not load");
        }
        Ok((identity, load))
    }

    /// Sign out and reset the note and timetable. Never fails.
    ///
    /// The view is cleared before the provider is asked to end the remote
    /// session, which may take a while.
    pub async fn sign_out(&self) -> Option<Identity> {
        let identity = self.session.take_identity().await;

        {
            let mut view = self.view.lock().await;
            view.next_seq();
            view.clear_record();
        }

        if let Some(identity) = &identity {
            self.session.finish_sign_out(identity).await;
        }
        identity
    }

    /// Change the selected day and load its record when signed in.
    ///
    /// If the load fails the previous day stays selected, together with the
    /// record already on screen.
    pub async fn select_date(&self, date: DateKey) -> PlannerResult<LoadOutcome> {
        let (previous, seq) = {
            let mut view = self.view.lock().await;
            let previous = (view.selected, view.owner.take());
            view.selected = date;
            (previous, view.next_seq())
        };

        let result = self.load_into_view(date, seq).await;

        if let Err(e) = &result {
            let mut view = self.view.lock().await;
            if view.load_seq == seq {
                let (selected, owner) = previous;
                warn!(date = %date, kept = %selected, error = %e, "load failed, keeping previous day");
                view.selected = selected;
                view.owner = owner;
            }
        }

        result
    }

    /// Load the selected day again.
    pub async fn reload(&self) -> PlannerResult<LoadOutcome> {
        let (date, seq) = {
            let mut view = self.view.lock().await;
            (view.selected, view.next_seq())
        };

        self.load_into_view(date, seq).await
    }

    async fn load_into_view(&self, date: DateKey, seq: u64) -> PlannerResult<LoadOutcome> {
        let Some(identity) = self.session.identity().await else {
            return Ok(LoadOutcome::NoSession);
        };
        let Some(record) = self.days.load(Some(&identity), date).await? else {
            return Ok(LoadOutcome::NoSession);
        };

        let mut view = self.view.lock().await;
        if view.load_seq != seq {
            debug!(date = %date, seq, current = view.load_seq, "discarding superseded load");
            return Ok(LoadOutcome::Superseded);
        }

        view.note = record.note.clone();
        view.timetable = record.timetable.clone();
        view.owner = Some(identity.uid);
        Ok(LoadOutcome::Applied(record))
    }

    /// Read any day without touching the selection or the view.
    pub async fn peek(&self, date: DateKey) -> PlannerResult<Option<DayRecord>> {
        let identity = self.session.identity().await;
        Ok(self.days.load(identity.as_ref(), date).await?)
    }

    pub async fn set_note(&self, note: impl Into<String>) {
        self.view.lock().await.note = note.into();
    }

    pub async fn set_slot(&self, index: usize, value: impl Into<String>) -> PlannerResult<()> {
        self.view.lock().await.timetable.set(index, value)
    }

    pub async fn set_timetable(&self, timetable: Timetable) {
        self.view.lock().await.timetable = timetable;
    }

    /// Write the current note and timetable as the selected day's record.
    ///
    /// Fails with [`PlannerError::NotLoaded`] until the selected day has been
    /// loaded for the signed-in user.
    pub async fn save(&self) -> PlannerResult<SaveOutcome> {
        let Some(identity) = self.session.identity().await else {
            return Ok(SaveOutcome::NoSession);
        };

        let record = {
            let view = self.view.lock().await;
            if !view.owned_by(&identity) {
                return Err(PlannerError::NotLoaded(view.selected));
            }
            DayRecord::new(view.selected, view.note.clone(), view.timetable.clone())
        };

        self.days.save(Some(&identity), &record).await?;
        Ok(SaveOutcome::Saved(record.date))
    }

    /// Like [`Planner::save`], but a missing session is an error.
    pub async fn save_required(&self) -> PlannerResult<DateKey> {
        match self.save().await? {
            SaveOutcome::Saved(date) => Ok(date),
            SaveOutcome::NoSession => Err(PlannerError::NoSession),
        }
    }
}

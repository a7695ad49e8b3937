//! Debounced autosave for a single note editing session.
//!
//! Edits are merged into one pending [`NotePatch`]. Every edit restarts a
//! quiet-period timer; when it expires the patch is snapshotted, cleared,
//! and written as one request. Writes go through a FIFO gate so a session
//! never has two writes in flight.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, Mutex as AsyncMutex};
use tokio::task::JoinHandle;

use crate::api::NotesApi;
use crate::error::Result;
use crate::models::{NoteEdit, NoteId, NotePatch, SaveAck};

/// Quiet period used by the editor.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Write side of the autosave pipeline.
pub trait NoteSaver: Send + Sync + 'static {
    fn save_patch(
        &self,
        id: NoteId,
        patch: NotePatch,
    ) -> impl Future<Output = Result<SaveAck>> + Send;
}

impl NoteSaver for NotesApi {
    fn save_patch(
        &self,
        id: NoteId,
        patch: NotePatch,
    ) -> impl Future<Output = Result<SaveAck>> + Send {
        async move { self.patch_note(id, &patch).await }
    }
}

/// What happens to a snapshot whose write failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log and forget the failed fields.
    #[default]
    Drop,
    /// Put the failed fields back under any newer edits and re-arm the timer.
    Requeue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveOptions {
    pub window: Duration,
    pub failure_policy: FailurePolicy,
}

impl Default for AutosaveOptions {
    fn default() -> Self {
        Self {
            window: DEFAULT_DEBOUNCE,
            failure_policy: FailurePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveState {
    /// No timer armed and nothing in flight.
    Idle,
    /// Edits are pending and the quiet-period timer is running.
    Armed,
    /// A write is in flight (a new timer may be armed as well).
    Flushing,
}

struct DebounceTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

impl DebounceTimer {
    fn cancel(self) {
        self.handle.abort();
    }
}

#[derive(Default)]
struct Session {
    pending: NotePatch,
    timer: Option<DebounceTimer>,
    generation: u64,
    in_flight: usize,
    closed: bool,
}

struct Shared<W> {
    note_id: NoteId,
    saver: W,
    options: AutosaveOptions,
    session: Mutex<Session>,
    flush_gate: AsyncMutex<()>,
    last_saved: watch::Sender<Option<DateTime<Utc>>>,
}

impl<W: NoteSaver> Shared<W> {
    fn lock_session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace any armed timer with a fresh one.
    fn arm(self: &Arc<Self>, session: &mut Session) {
        if let Some(timer) = session.timer.take() {
            timer.cancel();
        }
        session.generation = session.generation.wrapping_add(1);
        let generation = session.generation;

        let shared = Arc::clone(self);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(shared.options.window).await;
            shared.on_timer_fired(generation).await;
        });
        session.timer = Some(DebounceTimer { generation, handle });
    }

    async fn on_timer_fired(self: Arc<Self>, generation: u64) {
        let snapshot = {
            let mut session = self.lock_session();
            let is_current = session
                .timer
                .as_ref()
                .is_some_and(|timer| timer.generation == generation);
            if !is_current {
                return;
            }
            session.timer = None;

            let snapshot = std::mem::take(&mut session.pending);
            if snapshot.is_empty() {
                return;
            }
            session.in_flight += 1;
            snapshot
        };

        // Failures are absorbed here; `write` already logged or requeued.
        let _ = self.write(snapshot).await;
    }

    /// Send one snapshot. The caller has already counted it as in flight.
    async fn write(self: &Arc<Self>, snapshot: NotePatch) -> Result<SaveAck> {
        let _gate = self.flush_gate.lock().await;

        tracing::debug!(
            note_id = %self.note_id,
            fields = ?snapshot.fields(),
            "flushing pending edits"
        );
        let retained = (self.options.failure_policy == FailurePolicy::Requeue)
            .then(|| snapshot.clone());
        let result = self.saver.save_patch(self.note_id, snapshot).await;

        let mut session = self.lock_session();
        session.in_flight = session.in_flight.saturating_sub(1);
        match &result {
            Ok(ack) => {
                if let Some(saved_at) = ack.updated_at {
                    self.last_saved.send_replace(Some(saved_at));
                }
            }
            Err(error) => match retained {
                Some(mut restored) if !session.closed => {
                    tracing::warn!(
                        "Autosave of note {} failed, retrying: {}",
                        self.note_id,
                        error
                    );
                    restored.merge(std::mem::take(&mut session.pending));
                    session.pending = restored;
                    if session.timer.is_none() {
                        self.arm(&mut session);
                    }
                }
                _ => {
                    tracing::warn!(
                        "Autosave of note {} failed, edits dropped: {}",
                        self.note_id,
                        error
                    );
                }
            },
        }
        result
    }
}

/// Autosave state for one open note.
///
/// Must be used from within a tokio runtime. Dropping the coordinator (or
/// calling [`AutosaveCoordinator::close`]) cancels an armed timer without
/// flushing; a write already in flight runs to completion on its own.
pub struct AutosaveCoordinator<W: NoteSaver> {
    shared: Arc<Shared<W>>,
}

impl<W: NoteSaver> AutosaveCoordinator<W> {
    pub fn new(note_id: NoteId, saver: W, options: AutosaveOptions) -> Self {
        let (last_saved, _) = watch::channel(None);
        Self {
            shared: Arc::new(Shared {
                note_id,
                saver,
                options,
                session: Mutex::new(Session::default()),
                flush_gate: AsyncMutex::new(()),
                last_saved,
            }),
        }
    }

    pub fn note_id(&self) -> NoteId {
        self.shared.note_id
    }

    /// Record one user edit and restart the quiet-period timer.
    pub fn record(&self, edit: NoteEdit) {
        let mut session = self.shared.lock_session();
        if session.closed {
            tracing::debug!(note_id = %self.shared.note_id, "ignoring edit on closed session");
            return;
        }
        session.pending.apply(edit);
        self.shared.arm(&mut session);
    }

    /// Cancel the timer and write whatever is pending right away.
    ///
    /// Waits for earlier writes to finish first. Unlike timer-driven
    /// flushes, the outcome is returned to the caller. `Ok(None)` means there
    /// was nothing to send.
    pub async fn flush_now(&self) -> Result<Option<SaveAck>> {
        let snapshot = {
            let mut session = self.shared.lock_session();
            if let Some(timer) = session.timer.take() {
                timer.cancel();
            }
            let snapshot = std::mem::take(&mut session.pending);
            if snapshot.is_empty() {
                None
            } else {
                session.in_flight += 1;
                Some(snapshot)
            }
        };

        match snapshot {
            Some(snapshot) => self.shared.write(snapshot).await.map(Some),
            None => {
                drop(self.shared.flush_gate.lock().await);
                Ok(None)
            }
        }
    }

    /// End the session: cancel the timer and discard pending edits.
    pub fn close(&self) {
        let mut session = self.shared.lock_session();
        session.closed = true;
        if let Some(timer) = session.timer.take() {
            timer.cancel();
        }
        let discarded = std::mem::take(&mut session.pending);
        if !discarded.is_empty() {
            tracing::debug!(
                note_id = %self.shared.note_id,
                fields = ?discarded.fields(),
                "discarding unsaved edits"
            );
        }
    }

    pub fn state(&self) -> AutosaveState {
        let session = self.shared.lock_session();
        if session.in_flight > 0 {
            AutosaveState::Flushing
        } else if session.timer.is_some() {
            AutosaveState::Armed
        } else {
            AutosaveState::Idle
        }
    }

    /// Copy of the edits waiting for the next flush.
    pub fn pending(&self) -> NotePatch {
        self.shared.lock_session().pending.clone()
    }

    /// Seed the "last saved" value, e.g. from the loaded note.
    pub fn set_last_saved(&self, saved_at: Option<DateTime<Utc>>) {
        self.shared.last_saved.send_replace(saved_at);
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        *self.shared.last_saved.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.shared.last_saved.subscribe()
    }
}

impl<W: NoteSaver> Drop for AutosaveCoordinator<W> {
    fn drop(&mut self) {
        self.close();
    }
}

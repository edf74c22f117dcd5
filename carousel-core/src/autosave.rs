//! Debounced background saving.
//!
//! The host calls [`AutoSaver::notify`] after every dispatch that bumped the
//! editor revision. The worker waits for the debounce period to pass without
//! further notifications, then writes the newest snapshot through the
//! [`DocumentStore`]. Outcomes come back on the [`SaveEvent`] channel; a
//! [`SaveEvent::Saved`] is only sent when no newer revision arrived while the
//! save was in flight, so dispatching `MarkSaved` on it never hides an edit.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::config::AutoSaveConfig;
use crate::document::CarouselDocument;
use crate::store::DocumentStore;

/// Outcome of a background save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveEvent {
    /// The snapshot for `revision` is stored and nothing newer is pending.
    Saved {
        /// Editor revision that was written.
        revision: u64,
    },
    /// Writing `revision` failed. The next notification retries.
    Failed {
        /// Editor revision that could not be written.
        revision: u64,
        /// Store error message.
        error: String,
    },
}

#[derive(Debug)]
enum Command {
    Notify {
        revision: u64,
        document: Arc<CarouselDocument>,
    },
    Flush,
    Shutdown,
}

#[derive(Debug)]
struct Pending {
    revision: u64,
    document: Arc<CarouselDocument>,
}

/// Handle to a running autosave task.
#[derive(Debug)]
pub struct AutoSaver {
    commands: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

impl AutoSaver {
    /// Start the worker on the current tokio runtime.
    ///
    /// Returns the handle and the receiver for save outcomes.
    pub fn spawn(
        store: Arc<dyn DocumentStore>,
        document_id: impl Into<String>,
        config: AutoSaveConfig,
    ) -> (Self, mpsc::UnboundedReceiver<SaveEvent>) {
        let (commands, inbox) = mpsc::unbounded_channel();
        let (events, outcomes) = mpsc::unbounded_channel();
        let worker = Worker {
            store,
            document_id: document_id.into(),
            config,
            inbox,
            events,
            pending: None,
            saved: None,
            deadline: None,
            flush_requested: false,
            stopping: false,
        };
        let task = tokio::spawn(worker.run());
        (Self { commands, task }, outcomes)
    }

    /// Schedule a save of `document` at `revision` after the debounce period.
    pub fn notify(&self, revision: u64, document: Arc<CarouselDocument>) {
        if self
            .commands
            .send(Command::Notify { revision, document })
            .is_err()
        {
            tracing::warn!(revision, "Autosave worker is gone; change not scheduled");
        }
    }

    /// Save the pending snapshot now instead of waiting.
    pub fn flush(&self) {
        if self.commands.send(Command::Flush).is_err() {
            tracing::warn!("Autosave worker is gone; flush ignored");
        }
    }

    /// Save anything pending, then stop the worker.
    pub async fn shutdown(self) {
        // The worker may already have exited; joining covers both cases.
        let _ = self.commands.send(Command::Shutdown);
        if let Err(e) = self.task.await {
            tracing::warn!("Autosave worker ended abnormally: {e}");
        }
    }
}

struct Worker {
    store: Arc<dyn DocumentStore>,
    document_id: String,
    config: AutoSaveConfig,
    inbox: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<SaveEvent>,
    pending: Option<Pending>,
    saved: Option<u64>,
    deadline: Option<Instant>,
    flush_requested: bool,
    stopping: bool,
}

impl Worker {
    async fn run(mut self) {
        tracing::debug!(document_id = %self.document_id, "Autosave started");
        while !self.stopping {
            tokio::select! {
                command = self.inbox.recv() => match command {
                    Some(command) => self.accept(command),
                    None => self.stopping = true,
                },
                () = sleep_until(self.deadline.unwrap_or_else(Instant::now)), if self.deadline.is_some() => {
                    self.flush_requested = true;
                }
            }
            if self.flush_requested || self.stopping {
                self.save_pending().await;
            }
        }
        tracing::debug!(document_id = %self.document_id, "Autosave stopped");
    }

    fn accept(&mut self, command: Command) {
        match command {
            Command::Notify { revision, document } => {
                if self.saved.is_some_and(|saved| revision <= saved)
                    || self
                        .pending
                        .as_ref()
                        .is_some_and(|pending| revision < pending.revision)
                {
                    tracing::debug!(revision, "Ignoring stale autosave notification");
                    return;
                }
                self.pending = Some(Pending { revision, document });
                self.deadline = Some(Instant::now() + self.config.debounce());
            }
            Command::Flush => self.flush_requested = true,
            Command::Shutdown => self.stopping = true,
        }
    }

    /// Write the pending snapshot, repeating while flushes keep arriving
    /// for newer revisions.
    async fn save_pending(&mut self) {
        self.flush_requested = false;
        self.deadline = None;
        while let Some(pending) = self.pending.take() {
            let result = self.store.save(&self.document_id, &pending.document).await;

            // Notifications that arrived during the write.
            while let Ok(command) = self.inbox.try_recv() {
                self.accept(command);
            }

            match result {
                Ok(()) => {
                    self.saved = Some(pending.revision);
                    if self
                        .pending
                        .as_ref()
                        .is_some_and(|newer| newer.revision <= pending.revision)
                    {
                        self.pending = None;
                    }
                    if self.pending.is_none() {
                        tracing::debug!(revision = pending.revision, "Autosave complete");
                        self.emit(SaveEvent::Saved {
                            revision: pending.revision,
                        });
                    } else {
                        tracing::debug!(
                            revision = pending.revision,
                            "Document changed during autosave; rescheduling"
                        );
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        document_id = %self.document_id,
                        revision = pending.revision,
                        "Autosave failed: {e}"
                    );
                    self.emit(SaveEvent::Failed {
                        revision: pending.revision,
                        error: e.to_string(),
                    });
                }
            }

            if !(self.flush_requested || self.stopping) {
                break;
            }
            self.flush_requested = false;
        }
        if self.pending.is_some() && self.deadline.is_none() {
            self.deadline = Some(Instant::now() + self.config.debounce());
        }
    }

    fn emit(&self, event: SaveEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("Save event dropped; nobody is listening");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        saves: AtomicUsize,
        delay: Option<Duration>,
        failing: AtomicBool,
    }

    #[async_trait]
    impl DocumentStore for CountingStore {
        async fn save(&self, id: &str, doc: &CarouselDocument) -> Result<(), StoreError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.failing.load(Ordering::SeqCst) {
                return Err(StoreError::Io(std::io::Error::other("disk full")));
            }
            self.inner.save(id, doc).await
        }

        async fn load(&self, id: &str) -> Result<Option<CarouselDocument>, StoreError> {
            self.inner.load(id).await
        }

        async fn delete(&self, id: &str) -> Result<(), StoreError> {
            self.inner.delete(id).await
        }

        async fn list(&self) -> Result<Vec<String>, StoreError> {
            self.inner.list().await
        }
    }

    fn doc(title: &str) -> Arc<CarouselDocument> {
        Arc::new(CarouselDocument::new_editable("d").with_title(title))
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_collapses_bursts() {
        let store = Arc::new(CountingStore::default());
        let (saver, mut events) = AutoSaver::spawn(store.clone(), "d", AutoSaveConfig::default());

        saver.notify(1, doc("one"));
        tokio::time::sleep(Duration::from_millis(500)).await;
        saver.notify(2, doc("two"));
        tokio::time::sleep(Duration::from_millis(1900)).await;
        assert_eq!(store.saves.load(Ordering::SeqCst), 0);

        assert_eq!(events.recv().await, Some(SaveEvent::Saved { revision: 2 }));
        assert_eq!(store.saves.load(Ordering::SeqCst), 1);
        let stored = store.load("d").await.expect("load").expect("present");
        assert_eq!(stored.title, "two");
        saver.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_saves_immediately() {
        let store = Arc::new(CountingStore::default());
        let (saver, mut events) = AutoSaver::spawn(store.clone(), "d", AutoSaveConfig::default());
        let start = Instant::now();

        saver.notify(1, doc("one"));
        saver.flush();
        assert_eq!(events.recv().await, Some(SaveEvent::Saved { revision: 1 }));
        assert!(start.elapsed() < Duration::from_secs(2));
        saver.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_during_save_withholds_saved_event() {
        let store = Arc::new(CountingStore {
            delay: Some(Duration::from_secs(1)),
            ..CountingStore::default()
        });
        let (saver, mut events) = AutoSaver::spawn(store.clone(), "d", AutoSaveConfig::default());

        saver.notify(1, doc("one"));
        // The first write starts at 2s and is still running at 2.1s.
        tokio::time::sleep(Duration::from_millis(2100)).await;
        saver.notify(2, doc("two"));

        assert_eq!(events.recv().await, Some(SaveEvent::Saved { revision: 2 }));
        assert_eq!(store.saves.load(Ordering::SeqCst), 2);
        saver.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_reported_and_retried() {
        let store = Arc::new(CountingStore::default());
        store.failing.store(true, Ordering::SeqCst);
        let (saver, mut events) = AutoSaver::spawn(store.clone(), "d", AutoSaveConfig::default());

        saver.notify(1, doc("one"));
        match events.recv().await {
            Some(SaveEvent::Failed { revision, error }) => {
                assert_eq!(revision, 1);
                assert!(error.contains("disk full"));
            }
            other => panic!("unexpected event {other:?}"),
        }

        store.failing.store(false, Ordering::SeqCst);
        saver.notify(1, doc("one"));
        assert_eq!(events.recv().await, Some(SaveEvent::Saved { revision: 1 }));
        saver.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_flushes_pending() {
        let store = Arc::new(CountingStore::default());
        let (saver, mut events) = AutoSaver::spawn(store.clone(), "d", AutoSaveConfig::default());

        saver.notify(3, doc("last"));
        saver.shutdown().await;
        assert_eq!(events.recv().await, Some(SaveEvent::Saved { revision: 3 }));
        assert_eq!(events.recv().await, None);
        assert_eq!(store.saves.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_revision_ignored() {
        let store = Arc::new(CountingStore::default());
        let (saver, mut events) = AutoSaver::spawn(store.clone(), "d", AutoSaveConfig::default());

        saver.notify(5, doc("five"));
        saver.flush();
        assert_eq!(events.recv().await, Some(SaveEvent::Saved { revision: 5 }));
        saver.notify(4, doc("four"));
        saver.shutdown().await;
        assert_eq!(events.recv().await, None);
        assert_eq!(store.saves.load(Ordering::SeqCst), 1);
    }
}

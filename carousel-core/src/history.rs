//! Bounded undo/redo history of document snapshots.
//!
//! Snapshots are shared [`Arc`]s: pushing the current document costs a
//! reference count bump, and the reducer's copy-on-write edit makes the
//! actual copy only when the next change happens.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::document::CarouselDocument;

/// Open gesture bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gesture {
    Closed,
    /// Open; `true` once its snapshot has been taken.
    Open(bool),
}

/// Undo and redo stacks.
#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<Arc<CarouselDocument>>,
    redo: Vec<Arc<CarouselDocument>>,
    limit: usize,
    gesture: Gesture,
}

impl History {
    /// Create an empty history holding at most `limit` undo snapshots.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit,
            gesture: Gesture::Closed,
        }
    }

    /// Record `previous` as the state before an edit and clear redo.
    ///
    /// Inside a gesture only the first edit is recorded.
    pub fn record(&mut self, previous: Arc<CarouselDocument>) {
        self.redo.clear();
        match self.gesture {
            Gesture::Open(true) => return,
            Gesture::Open(false) => self.gesture = Gesture::Open(true),
            Gesture::Closed => {}
        }
        if self.limit == 0 {
            return;
        }
        self.undo.push_back(previous);
        while self.undo.len() > self.limit {
            self.undo.pop_front();
        }
    }

    /// Step back: returns the snapshot to restore, stashing `current` for redo.
    pub fn undo(&mut self, current: Arc<CarouselDocument>) -> Option<Arc<CarouselDocument>> {
        self.end_gesture();
        let previous = self.undo.pop_back()?;
        self.redo.push(current);
        Some(previous)
    }

    /// Step forward: returns the snapshot to restore, stashing `current` for undo.
    pub fn redo(&mut self, current: Arc<CarouselDocument>) -> Option<Arc<CarouselDocument>> {
        self.end_gesture();
        let next = self.redo.pop()?;
        self.undo.push_back(current);
        while self.undo.len() > self.limit {
            self.undo.pop_front();
        }
        Some(next)
    }

    /// Open a gesture. Reopening an open gesture starts a new undo step.
    pub fn begin_gesture(&mut self) {
        self.gesture = Gesture::Open(false);
    }

    /// Close the open gesture, if any.
    pub fn end_gesture(&mut self) {
        self.gesture = Gesture::Closed;
    }

    /// Whether a gesture is open.
    #[must_use]
    pub fn in_gesture(&self) -> bool {
        matches!(self.gesture, Gesture::Open(_))
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.gesture = Gesture::Closed;
    }

    /// Number of undo steps available.
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Number of redo steps available.
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Maximum undo depth.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(title: &str) -> Arc<CarouselDocument> {
        Arc::new(CarouselDocument::new_empty("d").with_title(title))
    }

    #[test]
    fn test_undo_cap_drops_oldest() {
        let mut history = History::new(3);
        for i in 0..5 {
            history.record(doc(&i.to_string()));
        }
        assert_eq!(history.undo_len(), 3);
        let restored = history.undo(doc("now")).expect("snapshot");
        assert_eq!(restored.title, "4");
    }

    #[test]
    fn test_record_clears_redo() {
        let mut history = History::new(10);
        history.record(doc("a"));
        history.undo(doc("b")).expect("snapshot");
        assert_eq!(history.redo_len(), 1);
        history.record(doc("c"));
        assert_eq!(history.redo_len(), 0);
    }

    #[test]
    fn test_gesture_records_once() {
        let mut history = History::new(10);
        history.begin_gesture();
        history.record(doc("a"));
        history.record(doc("b"));
        history.record(doc("c"));
        history.end_gesture();
        assert_eq!(history.undo_len(), 1);
        history.record(doc("d"));
        assert_eq!(history.undo_len(), 2);
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut history = History::new(10);
        assert!(history.undo(doc("x")).is_none());
        assert!(history.redo(doc("x")).is_none());
        assert_eq!(history.redo_len(), 0);
    }
}

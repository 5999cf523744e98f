//! Reflow trigger policy: debounced timers per editing source
//!
//! The core never queues work for itself; rejected runs rely on these timers
//! re-arming. Time is an abstract monotonic counter supplied by the host, so
//! the whole policy is deterministic under test.

use crate::reflow::ReflowConfig;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// A structural edit that must eventually reach the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditEvent {
    /// A typed character inside a page's content container
    Keystroke { page: usize },
    /// Multi-line text paste
    Paste,
    /// Photo inserted into a container
    PhotoInserted,
    /// Photo moved up/down or dragged
    PhotoMoved,
    /// Photo removed
    PhotoDeleted,
    /// Whole-document raw-text replace
    RawReplaced,
    /// Viewport resize changed page geometry
    Resized,
}

/// Timer identity; scheduling the same key again cancels and reschedules
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerKey {
    /// Per-container typing debounce
    Typing(usize),
    /// Structural edits share one settle timer
    Structural,
    Resize,
    AutoSave,
}

/// What fires when a timer comes due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    Reflow,
    AutoSave,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    due: u64,
    task: TimerTask,
}

/// Cancellable one-shot timers keyed by source
#[derive(Debug, Default)]
pub struct TimerQueue {
    entries: FxHashMap<TimerKey, Entry>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a task; an existing timer under the same key is replaced
    pub fn schedule(&mut self, key: TimerKey, due: u64, task: TimerTask) {
        self.entries.insert(key, Entry { due, task });
    }

    /// Cancel a pending timer
    pub fn cancel(&mut self, key: TimerKey) -> bool {
        self.entries.remove(&key).is_some()
    }

    /// Whether a timer is pending under this key
    pub fn is_scheduled(&self, key: TimerKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Earliest pending deadline
    pub fn next_due(&self) -> Option<u64> {
        self.entries.values().map(|e| e.due).min()
    }

    /// Remove and return all tasks due at `now`, earliest first
    pub fn fire_due(&mut self, now: u64) -> SmallVec<[TimerTask; 2]> {
        let mut due: Vec<(TimerKey, Entry)> = self
            .entries
            .iter()
            .filter(|(_, e)| e.due <= now)
            .map(|(&k, &e)| (k, e))
            .collect();
        due.sort_by_key(|&(key, entry)| (entry.due, key));

        let mut tasks = SmallVec::new();
        for (key, entry) in due {
            self.entries.remove(&key);
            tasks.push(entry.task);
        }
        tasks
    }

    /// Number of pending timers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Map an edit event onto the timer queue.
///
/// Typing coalesces per container; structural edits schedule at the settle
/// delay so just-inserted content has been laid out before measurement;
/// resizes wait out the drag. Every content edit re-arms auto-save.
pub fn apply_event(queue: &mut TimerQueue, config: &ReflowConfig, event: EditEvent, now: u64) {
    match event {
        EditEvent::Keystroke { page } => {
            queue.schedule(
                TimerKey::Typing(page),
                now + config.typing_debounce,
                TimerTask::Reflow,
            );
            queue.schedule(TimerKey::AutoSave, now + config.autosave_delay, TimerTask::AutoSave);
        }
        EditEvent::Resized => {
            queue.schedule(TimerKey::Resize, now + config.resize_debounce, TimerTask::Reflow);
        }
        EditEvent::Paste
        | EditEvent::PhotoInserted
        | EditEvent::PhotoMoved
        | EditEvent::PhotoDeleted
        | EditEvent::RawReplaced => {
            queue.schedule(TimerKey::Structural, now + config.settle_delay, TimerTask::Reflow);
            queue.schedule(TimerKey::AutoSave, now + config.autosave_delay, TimerTask::AutoSave);
        }
    }
}

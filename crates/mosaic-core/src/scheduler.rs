#![forbid(unsafe_code)]

//! Deterministic virtual-clock task scheduler.
//!
//! Every timer the toolkit needs (toast auto-dismiss, tooltip debounce,
//! deferred palette execution, one-frame focus moves) is a task on a
//! [`Scheduler`]. The host advances the clock from its event loop; tests
//! advance it explicitly.
//!
//! # Invariants
//!
//! 1. Tasks run in `(due, scheduling order)` order.
//! 2. A task never runs before `now() >= due`.
//! 3. Tasks run with no internal borrow held, so they may schedule or cancel
//!    other tasks (including ones due in the same [`advance`](Scheduler::advance)).
//! 4. Cancellation is idempotent; cancelling a task that already ran is a
//!    no-op returning `false`.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Cancel unknown id | Returns `false` |
//! | Task schedules itself with zero delay forever | Runs until the clock target; caller's bug |
//! | Delay or advance past `Duration::MAX` | Clamped to `Duration::MAX` |

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Identifier of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

type Task = Box<dyn FnOnce()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QueueKey {
    due: Duration,
    seq: u64,
}

// Min-heap ordering on (due, seq).
impl Ord for QueueKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Default)]
struct SchedulerState {
    now: Duration,
    next_seq: u64,
    queue: BinaryHeap<QueueKey>,
    tasks: HashMap<u64, Task>,
}

impl SchedulerState {
    /// Pop the next live task due at or before `limit`.
    fn pop_due(&mut self, limit: Duration) -> Option<(Duration, Task)> {
        while let Some(key) = self.queue.peek().copied() {
            if key.due > limit {
                return None;
            }
            self.queue.pop();
            if let Some(task) = self.tasks.remove(&key.seq) {
                return Some((key.due, task));
            }
        }
        None
    }
}

/// Cloneable handle to a shared task queue.
#[derive(Clone, Default)]
pub struct Scheduler {
    state: Rc<RefCell<SchedulerState>>,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Scheduler")
            .field("now", &state.now)
            .field("pending", &state.tasks.len())
            .finish()
    }
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time since the scheduler was created.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Run `task` once `delay` has elapsed.
    pub fn schedule(&self, delay: Duration, task: impl FnOnce() + 'static) -> TaskId {
        let mut state = self.state.borrow_mut();
        let seq = state.next_seq;
        state.next_seq += 1;
        let due = state.now.saturating_add(delay);
        state.queue.push(QueueKey { due, seq });
        state.tasks.insert(seq, Box::new(task));
        crate::trace!(task = seq, due_ms = due.as_millis() as u64, "task scheduled");
        TaskId(seq)
    }

    /// Run `task` on the next turn (zero delay).
    pub fn defer(&self, task: impl FnOnce() + 'static) -> TaskId {
        self.schedule(Duration::ZERO, task)
    }

    /// Cancel a pending task. Returns whether it was still pending.
    pub fn cancel(&self, id: TaskId) -> bool {
        let removed = self.state.borrow_mut().tasks.remove(&id.0).is_some();
        if removed {
            crate::trace!(task = id.0, "task cancelled");
        }
        removed
    }

    /// Whether the task is still waiting to run.
    #[must_use]
    pub fn is_pending(&self, id: TaskId) -> bool {
        self.state.borrow().tasks.contains_key(&id.0)
    }

    /// Number of tasks waiting to run.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.state.borrow().tasks.len()
    }

    /// Move the clock forward by `by`, running every task that becomes due.
    ///
    /// Returns how many tasks ran.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.state.borrow().now.saturating_add(by);
        let mut ran = 0;
        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                let next = state.pop_due(target);
                if let Some((due, _)) = &next {
                    state.now = state.now.max(*due);
                }
                next
            };
            match next {
                Some((_, task)) => {
                    task();
                    ran += 1;
                }
                None => break,
            }
        }
        self.state.borrow_mut().now = target;
        ran
    }

    /// Run everything already due without moving the clock.
    pub fn run_pending(&self) -> usize {
        self.advance(Duration::ZERO)
    }
}

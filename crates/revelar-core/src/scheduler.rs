//! Explicit frame scheduler for cooperative transition tasks.
//!
//! The host owns a [`Scheduler`] and calls [`Scheduler::tick`] once per
//! frame. Tasks are explicit state machines ([`TickTask`]) that run up to a
//! suspension point and report how they want to be resumed: on the next
//! tick, or once a scaled-time delay has elapsed. Controllers hold a
//! cloneable [`SchedulerHandle`] to spawn and cancel tasks without access
//! to the scheduler itself.
//!
//! Cancellation is a tombstone: a cancelled task is simply never stepped
//! again, so every suspension point doubles as a cancellation point and a
//! cancelled task's remaining side effects never run.

use crate::clock::Clock;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Unique ID of a scheduled task. Never reused within a scheduler.
pub type TaskId = u64;

/// What a task does at a suspension point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Resume on the next tick.
    Yield,
    /// Resume once the given number of *scaled* seconds has elapsed.
    /// A zero-second wait still suspends for one tick; a paused clock
    /// never resumes these.
    Wait(f32),
    /// The task is finished and is dropped by the scheduler.
    Done,
}

/// A cooperative task driven one suspension point at a time.
///
/// `step` is called at most once per tick. Spawning and cancelling other
/// tasks from inside `step` is allowed: cancels take effect immediately
/// (including for tasks not yet stepped this tick), spawns are adopted on
/// the next tick.
pub trait TickTask: Send {
    /// Run the task up to its next suspension point.
    fn step(&mut self) -> Step;
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Wake {
    NextTick,
    AtScaledTime(f64),
}

struct TaskEntry {
    id: TaskId,
    task: Box<dyn TickTask>,
    wake: Wake,
}

impl TaskEntry {
    fn is_due(&self, now_scaled: f64) -> bool {
        match self.wake {
            Wake::NextTick => true,
            Wake::AtScaledTime(deadline) => now_scaled >= deadline,
        }
    }
}

/// State shared between the scheduler and its handles.
struct SharedQueue {
    /// Tasks spawned since the last tick, awaiting adoption.
    pending: Mutex<Vec<TaskEntry>>,
    /// Cancelled ids. Consumed when the matching entry is reaped.
    dead: Mutex<HashSet<TaskId>>,
    next_id: AtomicU64,
}

impl SharedQueue {
    fn new() -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
            dead: Mutex::new(HashSet::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn is_dead(&self, id: TaskId) -> bool {
        self.dead
            .lock()
            .expect("Scheduler mutex poisoned")
            .contains(&id)
    }

    fn take_dead(&self) -> HashSet<TaskId> {
        std::mem::take(&mut *self.dead.lock().expect("Scheduler mutex poisoned"))
    }
}

/// Cloneable handle for spawning and cancelling tasks.
#[derive(Clone)]
pub struct SchedulerHandle {
    queue: Arc<SharedQueue>,
    clock: Arc<dyn Clock>,
}

impl SchedulerHandle {
    /// Step the task synchronously until its first suspension point, then
    /// schedule it. Returns `None` if the task finished without
    /// suspending.
    ///
    /// The synchronous first step means a task whose work degrades to a
    /// no-op completes before `spawn` returns, callback included.
    pub fn spawn(&self, mut task: Box<dyn TickTask>) -> Option<TaskId> {
        let wake = match task.step() {
            Step::Done => return None,
            Step::Yield => Wake::NextTick,
            Step::Wait(secs) => Wake::AtScaledTime(self.clock.scaled_time() + f64::from(secs)),
        };
        let id = self.queue.next_id.fetch_add(1, Ordering::Relaxed);
        self.queue
            .pending
            .lock()
            .expect("Scheduler mutex poisoned")
            .push(TaskEntry { id, task, wake });
        Some(id)
    }

    /// Mark a task dead so it is never stepped again, even later in the
    /// current tick. Idempotent; unknown ids are ignored. Never invokes
    /// anything on the task itself.
    pub fn cancel(&self, id: TaskId) {
        self.queue
            .dead
            .lock()
            .expect("Scheduler mutex poisoned")
            .insert(id);
    }

    /// The clock all scheduling decisions are made against.
    #[must_use]
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }
}

/// Host-owned cooperative scheduler, ticked once per frame.
pub struct Scheduler {
    clock: Arc<dyn Clock>,
    queue: Arc<SharedQueue>,
    tasks: Vec<TaskEntry>,
}

impl Scheduler {
    /// Create a scheduler driven by the given clock.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            queue: Arc::new(SharedQueue::new()),
            tasks: Vec::new(),
        }
    }

    /// Create a handle for spawning and cancelling tasks.
    #[must_use]
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            queue: Arc::clone(&self.queue),
            clock: Arc::clone(&self.clock),
        }
    }

    /// The clock this scheduler ticks against.
    #[must_use]
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Number of live tasks, including spawned ones not yet adopted.
    #[must_use]
    pub fn task_count(&self) -> usize {
        let pending = self
            .queue
            .pending
            .lock()
            .expect("Scheduler mutex poisoned")
            .len();
        self.tasks.len() + pending
    }

    /// Whether no tasks are live.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.task_count() == 0
    }

    /// Run one frame: adopt spawned tasks, drop cancelled ones, then step
    /// every due task exactly once.
    pub fn tick(&mut self) {
        self.adopt_pending();
        self.reap_cancelled();

        // Snapshot due ids before stepping; a task stepped this tick may
        // cancel a later one, so the live dead set is re-checked per id.
        let now = self.clock.scaled_time();
        let due: Vec<TaskId> = self
            .tasks
            .iter()
            .filter(|entry| entry.is_due(now))
            .map(|entry| entry.id)
            .collect();

        for id in due {
            if self.queue.is_dead(id) {
                continue;
            }
            let Some(pos) = self.tasks.iter().position(|entry| entry.id == id) else {
                continue;
            };
            let mut entry = self.tasks.swap_remove(pos);
            match entry.task.step() {
                Step::Done => {}
                Step::Yield => {
                    entry.wake = Wake::NextTick;
                    self.tasks.push(entry);
                }
                Step::Wait(secs) => {
                    entry.wake = Wake::AtScaledTime(self.clock.scaled_time() + f64::from(secs));
                    self.tasks.push(entry);
                }
            }
        }

        self.reap_cancelled();
    }

    fn adopt_pending(&mut self) {
        let mut pending = self.queue.pending.lock().expect("Scheduler mutex poisoned");
        self.tasks.append(&mut pending);
    }

    /// Drain the dead set and drop every matching task. Tombstones with no
    /// matching task belong to already-finished tasks and are discarded.
    fn reap_cancelled(&mut self) {
        let dead = self.queue.take_dead();
        if dead.is_empty() {
            return;
        }
        self.tasks.retain(|entry| !dead.contains(&entry.id));
        self.queue
            .pending
            .lock()
            .expect("Scheduler mutex poisoned")
            .retain(|entry| !dead.contains(&entry.id));
    }
}

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::time::Duration;

/// Milliseconds of virtual time since the scheduler was constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub fn saturating_add(self, elapsed: Duration) -> Timestamp {
        Timestamp(self.0.saturating_add(duration_millis(elapsed)))
    }
}

/// Identifies a scheduled task for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// Returned by a periodic task to keep or drop its registration. A task
/// that returns `Stop` is removed by the scheduler itself, so loops that
/// decide their own end (like a teleport countdown) need no handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskControl {
    Continue,
    Stop,
}

enum Job {
    Once(Box<dyn FnOnce() + Send>),
    Repeating {
        run: Box<dyn FnMut() -> TaskControl + Send>,
        interval_ms: u64,
    },
}

#[derive(Clone, Copy, Debug)]
struct TimerEntry {
    due: Timestamp,
    id: u64,
}

/// Min-heap by deadline (earliest first), ties broken by registration order
impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior in BinaryHeap (which is max-heap)
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.id == other.id
    }
}

impl Eq for TimerEntry {}

/// Cooperative virtual-time scheduler. The host loop pumps it with
/// [`TickScheduler::advance`]; due tasks run in deadline order with the
/// clock pinned to each task's deadline. One task invocation is the unit
/// of atomicity: tasks are never interrupted, only interleaved.
///
/// Cancelled tasks leave stale entries in the heap; `advance` skips any
/// entry whose id is no longer in the task index.
pub struct TickScheduler {
    now: Timestamp,
    next_id: u64,
    heap: BinaryHeap<TimerEntry>,
    tasks: HashMap<u64, Job>,
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TickScheduler {
    pub fn new() -> Self {
        TickScheduler {
            now: Timestamp(0),
            next_id: 0,
            heap: BinaryHeap::new(),
            tasks: HashMap::new(),
        }
    }

    pub fn now(&self) -> Timestamp {
        self.now
    }

    /// Run `run` once, `delay` from now.
    pub fn after(&mut self, delay: Duration, run: impl FnOnce() + Send + 'static) -> TimerHandle {
        let id = self.allocate_id();
        self.heap.push(TimerEntry {
            due: self.now.saturating_add(delay),
            id,
        });
        self.tasks.insert(id, Job::Once(Box::new(run)));
        TimerHandle(id)
    }

    /// Run `run` repeatedly at `interval`, first firing one interval from now.
    pub fn every(
        &mut self,
        interval: Duration,
        run: impl FnMut() -> TaskControl + Send + 'static,
    ) -> TimerHandle {
        self.every_from(interval, interval, run)
    }

    /// Run `run` repeatedly at `interval`, first firing `initial_delay` from
    /// now. A zero `initial_delay` fires on the next pump.
    pub fn every_from(
        &mut self,
        initial_delay: Duration,
        interval: Duration,
        run: impl FnMut() -> TaskControl + Send + 'static,
    ) -> TimerHandle {
        let id = self.allocate_id();
        let interval_ms = duration_millis(interval).max(1);
        self.heap.push(TimerEntry {
            due: self.now.saturating_add(initial_delay),
            id,
        });
        self.tasks.insert(
            id,
            Job::Repeating {
                run: Box::new(run),
                interval_ms,
            },
        );
        TimerHandle(id)
    }

    /// Remove a scheduled task. Returns false if it already ran to
    /// completion, stopped itself, or was cancelled before.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.tasks.remove(&handle.0).is_some()
    }

    /// Number of live scheduled tasks.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Advance virtual time by `elapsed`, running every task that falls due.
    pub fn advance(&mut self, elapsed: Duration) {
        let target = self.now.saturating_add(elapsed);
        loop {
            let entry = match self.heap.peek() {
                Some(entry) if entry.due <= target => *entry,
                _ => break,
            };
            self.heap.pop();
            // Stale entry from a cancelled or stopped task.
            let job = match self.tasks.remove(&entry.id) {
                Some(job) => job,
                None => continue,
            };
            if entry.due > self.now {
                self.now = entry.due;
            }
            match job {
                Job::Once(run) => run(),
                Job::Repeating {
                    mut run,
                    interval_ms,
                } => {
                    if run() == TaskControl::Continue {
                        self.heap.push(TimerEntry {
                            due: Timestamp(self.now.0.saturating_add(interval_ms)),
                            id: entry.id,
                        });
                        self.tasks.insert(
                            entry.id,
                            Job::Repeating { run, interval_ms },
                        );
                    }
                }
            }
        }
        self.now = target;
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

fn duration_millis(duration: Duration) -> u64 {
    duration.as_millis().min(u64::MAX as u128) as u64
}

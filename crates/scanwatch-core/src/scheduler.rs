//! Delayed-task scheduler
//!
//! Runs an action once after a delay without blocking the caller. Every
//! scheduled action is tracked in a registry keyed by an opaque [`TaskHandle`]
//! until it has run, so outstanding work can be counted, cancelled, or
//! dropped on shutdown.
//!
//! Timers are Tokio tasks that only report "fired" over a channel. A single
//! worker loop drains that channel, runs the action and removes the registry
//! entry, so cleanup happens in exactly one place and actions never run on
//! the thread that scheduled them.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use scanwatch_core::scheduler::Scheduler;
//!
//! # async fn example() -> scanwatch_core::Result<()> {
//! let scheduler = Scheduler::new()?;
//! let handle = scheduler.execute(
//!     || {
//!         tracing::info!("one second later");
//!         Ok(())
//!     },
//!     Duration::from_secs(1),
//! )?;
//!
//! // Changed our mind
//! scheduler.cancel(&handle);
//! # Ok(())
//! # }
//! ```

use std::{
    collections::HashMap,
    fmt,
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex, MutexGuard, PoisonError, Weak,
    },
    time::{Duration, Instant},
};

use tokio::{runtime::Handle, sync::mpsc, task::JoinHandle};

use crate::{Error, Result};

// ═══════════════════════════════════════════════════════════════════════════
// TYPES
// ═══════════════════════════════════════════════════════════════════════════

/// Work run once when a task fires
pub type Action = Box<dyn FnOnce() -> Result<()> + Send + 'static>;

/// Unique, never reused identifier of a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// Handle returned by [`Scheduler::execute`]; the only way to refer to a task
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskHandle {
    id: TaskId,
}

impl TaskHandle {
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }
}

enum TaskState {
    Armed { action: Action, timer: JoinHandle<()> },
    Firing,
}

struct ScheduledTask {
    delay: Duration,
    armed_at: Instant,
    state: TaskState,
}

struct Shared {
    registry: Mutex<HashMap<TaskId, ScheduledTask>>,
    next_id: AtomicU64,
    closed: AtomicBool,
    fired_tx: mpsc::UnboundedSender<TaskId>,
    runtime: Handle,
    worker: Mutex<Option<JoinHandle<()>>>,
}

/// Delayed-task scheduler
///
/// Cheap to clone; clones share one registry and one worker. Construct it
/// explicitly and pass it to whatever needs to schedule work.
#[derive(Clone)]
pub struct Scheduler {
    shared: Arc<Shared>,
}

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

impl Scheduler {
    /// Create a scheduler bound to the current Tokio runtime
    ///
    /// # Errors
    ///
    /// Returns error if called outside a Tokio runtime
    pub fn new() -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| Error::Unknown(format!("Scheduler requires a Tokio runtime: {e}")))?;
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();

        let shared = Arc::new(Shared {
            registry: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
            fired_tx,
            runtime: runtime.clone(),
            worker: Mutex::new(None),
        });

        let worker = runtime.spawn(run_worker(Arc::downgrade(&shared), fired_rx));
        *lock(&shared.worker) = Some(worker);

        Ok(Self { shared })
    }

    /// Run `action` once after `delay`
    ///
    /// Returns immediately. May be called from any thread, including from
    /// inside another task's action.
    ///
    /// # Errors
    ///
    /// Returns error if the scheduler has been shut down
    pub fn execute<F>(&self, action: F, delay: Duration) -> Result<TaskHandle>
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        let mut registry = lock(&self.shared.registry);
        if self.shared.closed.load(Ordering::Acquire) {
            return Err(Error::scheduler_closed());
        }

        let id = TaskId(self.shared.next_id.fetch_add(1, Ordering::Relaxed));
        let fired_tx = self.shared.fired_tx.clone();
        // Spawned under the registry lock: the worker cannot see the firing
        // before the entry exists.
        let timer = self.shared.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = fired_tx.send(id);
        });

        registry.insert(
            id,
            ScheduledTask {
                delay,
                armed_at: Instant::now(),
                state: TaskState::Armed {
                    action: Box::new(action),
                    timer,
                },
            },
        );
        drop(registry);

        tracing::trace!("Armed {id} ({}ms)", delay.as_millis());
        Ok(TaskHandle { id })
    }

    /// Withdraw a task that has not fired yet
    ///
    /// Returns `false` if the task already fired, is running right now, was
    /// cancelled before, or the scheduler was shut down.
    pub fn cancel(&self, handle: &TaskHandle) -> bool {
        let removed = {
            let mut registry = lock(&self.shared.registry);
            let armed = matches!(
                registry.get(&handle.id).map(|task| &task.state),
                Some(TaskState::Armed { .. })
            );
            if armed {
                registry.remove(&handle.id)
            } else {
                None
            }
        };

        match removed {
            Some(ScheduledTask {
                state: TaskState::Armed { timer, .. },
                ..
            }) => {
                timer.abort();
                tracing::trace!("Cancelled {}", handle.id);
                true
            }
            _ => false,
        }
    }

    /// Number of tasks that are armed or currently running
    pub fn active_count(&self) -> usize {
        lock(&self.shared.registry).len()
    }

    /// Whether the task is still waiting for its delay to elapse
    pub fn is_pending(&self, handle: &TaskHandle) -> bool {
        matches!(
            lock(&self.shared.registry).get(&handle.id).map(|task| &task.state),
            Some(TaskState::Armed { .. })
        )
    }

    /// Stop the scheduler without running pending actions
    ///
    /// Armed timers are aborted and their actions dropped. Later calls to
    /// [`Scheduler::execute`] fail.
    pub fn shutdown(&self) {
        let drained: Vec<ScheduledTask> = {
            let mut registry = lock(&self.shared.registry);
            self.shared.closed.store(true, Ordering::Release);
            registry.drain().map(|(_, task)| task).collect()
        };

        let dropped = drained.len();
        drained.into_iter().for_each(|task| {
            if let TaskState::Armed { timer, .. } = task.state {
                timer.abort();
            }
        });

        if let Some(worker) = lock(&self.shared.worker).take() {
            worker.abort();
        }

        tracing::info!("Scheduler shut down, {dropped} pending task(s) dropped");
    }

    /// Whether [`Scheduler::shutdown`] has been called
    pub fn is_shut_down(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("active", &self.active_count())
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// WORKER
// ═══════════════════════════════════════════════════════════════════════════

async fn run_worker(shared: Weak<Shared>, mut fired_rx: mpsc::UnboundedReceiver<TaskId>) {
    while let Some(id) = fired_rx.recv().await {
        let Some(shared) = shared.upgrade() else {
            break;
        };
        shared.fire(id);
    }
    tracing::debug!("Scheduler worker stopped");
}

impl Shared {
    fn fire(&self, id: TaskId) {
        let taken = {
            let mut registry = lock(&self.registry);
            registry.get_mut(&id).and_then(|task| {
                match std::mem::replace(&mut task.state, TaskState::Firing) {
                    TaskState::Armed { action, .. } => Some((action, task.delay, task.armed_at)),
                    TaskState::Firing => None,
                }
            })
        };

        // Cancelled between the timer firing and the worker getting here.
        let Some((action, delay, armed_at)) = taken else {
            return;
        };

        tracing::trace!(
            "Firing {id} (delay {}ms, late by {}ms)",
            delay.as_millis(),
            armed_at.elapsed().saturating_sub(delay).as_millis()
        );
        run_guarded(id, action);

        lock(&self.registry).remove(&id);
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let registry = self
            .registry
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        registry.drain().for_each(|(_, task)| {
            if let TaskState::Armed { timer, .. } = task.state {
                timer.abort();
            }
        });
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// HELPERS
// ═══════════════════════════════════════════════════════════════════════════

/// Run an action; errors and panics are logged, never propagated
fn run_guarded(id: TaskId, action: Action) {
    match catch_unwind(AssertUnwindSafe(action)) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("Scheduled {id} failed: {e}"),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(ToString::to_string)
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            tracing::error!("Scheduled {id} panicked: {message}");
        }
    }
}

/// The registry is never left inconsistent mid-update (actions run outside
/// the lock), so a poisoned guard is still safe to use.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ═══════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════

use std::collections::VecDeque;
use std::time::Duration;

/// Inbound signals funneled into the serialized state queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateCommand {
    /// Periodic tick: measure the viewport and keep the selection correct.
    CheckState,
    /// The host reported an orientation flip.
    OrientationChanged,
    /// Deferred scroll-to-origin nudge, queued once after load to collapse
    /// the host's address bar.
    ScrollToOrigin,
}

/// Cancellation token for a recurring scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(pub u64);

/// Identifier for an orientation subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Periodic and one-shot deferred execution, provided by the host.
pub trait Scheduler: Send {
    /// Enqueue `cmd` every `interval` until the returned handle is
    /// cancelled. `name` lets hosts label or dedupe the task.
    fn repeat(&mut self, cmd: StateCommand, interval: Duration, name: &str) -> TaskHandle;

    /// Enqueue `cmd` once, to run after the current task completes.
    fn queue_once(&mut self, cmd: StateCommand);

    /// Stop a recurring task. Unknown handles are ignored.
    fn cancel(&mut self, handle: TaskHandle);
}

/// Orientation change notifications, provided by the host.
pub trait OrientationEvents: Send {
    fn subscribe(&mut self) -> SubscriptionId;

    fn unsubscribe(&mut self, id: SubscriptionId);
}

/// Combined seam for hosts whose scheduler also owns the event plumbing.
/// Load and unload take one of these so a single host object can serve both
/// roles.
pub trait HostHooks: Scheduler + OrientationEvents {}

impl<T: Scheduler + OrientationEvents> HostHooks for T {}

struct RepeatingTask {
    handle: TaskHandle,
    cmd: StateCommand,
    interval: Duration,
    next_fire: Duration,
    name: String,
}

/// Deterministic scheduler and event source driven by scripted time.
///
/// Commands accumulate in a queue; [`advance`](Self::advance) fires due
/// repeating tasks and [`drain`](Self::drain) hands the queue back for
/// dispatch, mirroring how the host's serialized task queue runs one command
/// to completion at a time.
#[derive(Default)]
pub struct SimulatedLoop {
    now: Duration,
    queue: VecDeque<StateCommand>,
    repeats: Vec<RepeatingTask>,
    subscriptions: Vec<SubscriptionId>,
    next_id: u64,
}

impl SimulatedLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the virtual clock forward, firing every repeat that comes due,
    /// in fire-time order.
    pub fn advance(&mut self, dt: Duration) {
        let target = self.now + dt;
        loop {
            let due = self
                .repeats
                .iter_mut()
                .filter(|task| task.next_fire <= target)
                .min_by_key(|task| task.next_fire);
            let Some(task) = due else { break };
            task.next_fire += task.interval;
            let cmd = task.cmd;
            self.queue.push_back(cmd);
        }
        self.now = target;
    }

    /// Inject an orientation notification. Dropped when nothing subscribed,
    /// like a real event source.
    pub fn emit_orientation_change(&mut self) {
        if !self.subscriptions.is_empty() {
            self.queue.push_back(StateCommand::OrientationChanged);
        }
    }

    /// Take every queued command, oldest first.
    pub fn drain(&mut self) -> Vec<StateCommand> {
        self.queue.drain(..).collect()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn repeat_count(&self) -> usize {
        self.repeats.len()
    }

    pub fn has_task(&self, name: &str) -> bool {
        self.repeats.iter().any(|task| task.name == name)
    }

    pub fn has_subscription(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    pub fn now(&self) -> Duration {
        self.now
    }
}

impl Scheduler for SimulatedLoop {
    fn repeat(&mut self, cmd: StateCommand, interval: Duration, name: &str) -> TaskHandle {
        self.next_id += 1;
        let handle = TaskHandle(self.next_id);
        // A zero interval would fire forever within one advance.
        let interval = interval.max(Duration::from_millis(1));
        self.repeats.push(RepeatingTask {
            handle,
            cmd,
            interval,
            next_fire: self.now + interval,
            name: name.to_string(),
        });
        handle
    }

    fn queue_once(&mut self, cmd: StateCommand) {
        self.queue.push_back(cmd);
    }

    fn cancel(&mut self, handle: TaskHandle) {
        self.repeats.retain(|task| task.handle != handle);
    }
}

impl OrientationEvents for SimulatedLoop {
    fn subscribe(&mut self) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscriptions.push(id);
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscriptions.retain(|sub| *sub != id);
    }
}

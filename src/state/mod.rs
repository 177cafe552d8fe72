//! Session orchestration: load/unload, the tick function, and the command
//! executor that serializes every mutation.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::{Value, json};

use crate::capability::CapabilityProbe;
use crate::chrome::{self, ChromeFactory};
use crate::error::{ChromeError, Result};
use crate::geometry::Size;
use crate::host::{HostEnvironment, NodeId};
use crate::lifecycle;
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::metrics::StateMetrics;
use crate::registry::ChromeRegistry;
use crate::schedule::{HostHooks, SimulatedLoop, StateCommand, SubscriptionId, TaskHandle};
use crate::viewport;

pub mod audit;

use audit::{NullStateAudit, StateAudit, StateAuditEvent, StateAuditStage};

const STATE_TARGET: &str = "chrome::state";

/// Configuration knobs for a chrome session.
#[derive(Clone)]
pub struct StateConfig {
    /// Interval between recurring state checks.
    pub check_interval: Duration,
    /// Optional structured logger.
    pub logger: Option<Logger>,
    /// Metrics accumulator used for periodic snapshots.
    pub metrics: Option<Arc<Mutex<StateMetrics>>>,
    /// Interval between metrics snapshot emissions. Zero disables snapshots.
    pub metrics_interval: Duration,
    /// Target field used when emitting metrics snapshots.
    pub metrics_target: String,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_millis(100),
            logger: None,
            metrics: None,
            metrics_interval: Duration::from_secs(5),
            metrics_target: "chrome::state.metrics".to_string(),
        }
    }
}

impl StateConfig {
    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(StateMetrics::new())));
        }
    }

    /// Disable metrics collection and prevent further snapshots.
    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    /// Access the shared metrics handle if metrics are enabled.
    pub fn metrics_handle(&self) -> Option<Arc<Mutex<StateMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }
}

/// Everything a loaded session owns. Dropped wholesale on unload.
struct Session {
    orientation: i32,
    size: Size,
    chrome_container: NodeId,
    viewport_hint: NodeId,
    active: Option<usize>,
    tick_task: Option<TaskHandle>,
    orientation_sub: Option<SubscriptionId>,
}

/// State machine keeping the right chrome active for the current display.
///
/// `Unloaded` and `Loaded` are modeled by `session` being absent or present;
/// inside `Loaded`, `active` tracks whether a chrome is installed. Every
/// mutating entry point runs on the host's serialized task queue, so the
/// session never sees interleaved operations.
pub struct StateManager {
    host: Box<dyn HostEnvironment>,
    probe: Box<dyn CapabilityProbe>,
    factory: ChromeFactory,
    config: StateConfig,
    audit: Arc<dyn StateAudit>,
    registry: ChromeRegistry,
    session: Option<Session>,
    start_instant: Option<Instant>,
    last_metrics_emit: Option<Instant>,
}

impl StateManager {
    pub fn new(
        host: Box<dyn HostEnvironment>,
        probe: Box<dyn CapabilityProbe>,
        factory: ChromeFactory,
    ) -> Self {
        Self {
            host,
            probe,
            factory,
            config: StateConfig::default(),
            audit: Arc::new(NullStateAudit),
            registry: ChromeRegistry::empty(),
            session: None,
            start_instant: None,
            last_metrics_emit: None,
        }
    }

    pub fn config_mut(&mut self) -> &mut StateConfig {
        &mut self.config
    }

    pub fn set_audit(&mut self, audit: Arc<dyn StateAudit>) {
        self.audit = audit;
    }

    pub fn is_loaded(&self) -> bool {
        self.session.is_some()
    }

    /// Index of the active chrome in discovery order, if one is installed.
    pub fn active_chrome(&self) -> Option<usize> {
        self.session.as_ref().and_then(|session| session.active)
    }

    pub fn current_size(&self) -> Option<Size> {
        self.session.as_ref().map(|session| session.size)
    }

    pub fn orientation(&self) -> Option<i32> {
        self.session.as_ref().map(|session| session.orientation)
    }

    pub fn chrome_count(&self) -> usize {
        self.registry.len()
    }

    /// Initialize the session: discover chromes, install the first one, and
    /// wire up the recurring check plus the orientation subscription.
    ///
    /// Fails with [`ChromeError::NoChromesDiscovered`] when every candidate
    /// was filtered out; the manager stays unloaded and the caller must
    /// present a fallback.
    pub fn load(&mut self, hooks: &mut dyn HostHooks) -> Result<()> {
        if self.session.is_some() {
            self.unload(hooks);
        }

        let body = self.host.body();
        self.host.clear_children(body);
        let chrome_container = self.host.create_container();
        let viewport_hint = self.host.viewport_hint_node();

        self.registry = ChromeRegistry::discover(
            self.host.as_mut(),
            self.probe.as_ref(),
            &self.factory,
            chrome_container,
            self.config.logger.as_ref(),
        );

        if self.registry.is_empty() {
            self.log(LogLevel::Error, "no_chromes_discovered", std::iter::empty());
            self.audit.record(
                StateAuditEvent::new(StateAuditStage::ChromesDiscovered)
                    .with_detail("count", json!(0)),
            );
            return Err(ChromeError::NoChromesDiscovered);
        }
        self.audit.record(
            StateAuditEvent::new(StateAuditStage::ChromesDiscovered)
                .with_detail("count", json!(self.registry.len())),
        );

        self.session = Some(Session {
            orientation: 0,
            size: Size::ZERO,
            chrome_container,
            viewport_hint,
            active: None,
            tick_task: None,
            orientation_sub: None,
        });
        let now = Instant::now();
        self.start_instant = Some(now);
        self.last_metrics_emit = Some(now);

        // Establish the initial chrome and size before any timer fires.
        self.check_state();

        let tick_task = hooks.repeat(
            StateCommand::CheckState,
            self.config.check_interval,
            "check_state",
        );
        let orientation_sub = self
            .probe
            .supports_orientation_events()
            .then(|| hooks.subscribe());
        if let Some(session) = self.session.as_mut() {
            session.tick_task = Some(tick_task);
            session.orientation_sub = orientation_sub;
        }

        // Deferred nudge collapses the host's address bar once the queue
        // settles.
        hooks.queue_once(StateCommand::ScrollToOrigin);

        self.log(
            LogLevel::Info,
            "session_loaded",
            [
                json_kv("chromes", json!(self.registry.len())),
                json_kv(
                    "check_interval_ms",
                    json!(self.config.check_interval.as_millis() as u64),
                ),
            ],
        );
        self.audit.record(
            StateAuditEvent::new(StateAuditStage::SessionLoaded)
                .with_detail("chromes", json!(self.registry.len())),
        );
        Ok(())
    }

    /// Tear the session down, releasing everything `load` acquired: the
    /// orientation subscription, the recurring tick, the active chrome, and
    /// the container contents. Idempotent.
    pub fn unload(&mut self, hooks: &mut dyn HostHooks) {
        let Some(mut session) = self.session.take() else {
            return;
        };

        if let Some(sub) = session.orientation_sub.take() {
            hooks.unsubscribe(sub);
        }
        if let Some(task) = session.tick_task.take() {
            hooks.cancel(task);
        }
        if let Some(index) = session.active.take() {
            if let Some(active) = self.registry.get_mut(index) {
                active.deactivate();
            }
            self.audit.record(
                StateAuditEvent::new(StateAuditStage::ChromeDeactivated)
                    .with_detail("index", json!(index)),
            );
        }
        self.host.clear_children(session.chrome_container);
        self.registry.clear();

        let uptime_ms = self
            .start_instant
            .map(|start| start.elapsed().as_millis() as u64)
            .unwrap_or(0);
        self.start_instant = None;
        self.last_metrics_emit = None;

        self.log(
            LogLevel::Info,
            "session_unloaded",
            [json_kv("uptime_ms", json!(uptime_ms))],
        );
        self.audit
            .record(StateAuditEvent::new(StateAuditStage::SessionUnloaded));
    }

    /// Tick function: measure the viewport and keep the selection correct.
    ///
    /// An unchanged measurement returns without touching anything, so
    /// redundant ticks are free. A changed measurement re-checks the active
    /// chrome's fit, swaps when needed, and always delivers the new size to
    /// whichever chrome ends up active.
    pub fn check_state(&mut self) {
        let Self {
            host,
            registry,
            session,
            config,
            audit,
            start_instant,
            last_metrics_emit,
            ..
        } = self;
        let Some(session) = session.as_mut() else {
            return;
        };

        let avail = viewport::available_size(host.as_mut());
        record_metric(config.metrics.as_ref(), StateMetrics::record_tick);
        audit.record(StateAuditEvent::new(StateAuditStage::TickDispatched));

        if avail == session.size {
            maybe_emit_metrics(config, *start_instant, last_metrics_emit);
            return;
        }

        session.size = avail;
        record_metric(config.metrics.as_ref(), StateMetrics::record_size_change);
        log_to(
            config.logger.as_ref(),
            LogLevel::Debug,
            "size_changed",
            [
                json_kv("width", json!(avail.width)),
                json_kv("height", json!(avail.height)),
            ],
        );
        audit.record(
            StateAuditEvent::new(StateAuditStage::SizeChanged)
                .with_detail("width", json!(avail.width))
                .with_detail("height", json!(avail.height)),
        );

        let still_fits = match session.active {
            Some(index) => registry.as_slice()[index].fits(avail),
            None => false,
        };

        if !still_fits {
            match chrome::select(registry.as_slice(), avail) {
                Some(next) => {
                    let previous = session.active;
                    lifecycle::swap_active(
                        host.as_mut(),
                        registry.chromes_mut(),
                        session.chrome_container,
                        previous,
                        next,
                    );
                    session.active = Some(next);
                    record_metric(config.metrics.as_ref(), StateMetrics::record_swap);
                    if let Some(index) = previous {
                        audit.record(
                            StateAuditEvent::new(StateAuditStage::ChromeDeactivated)
                                .with_detail("index", json!(index)),
                        );
                    }
                    audit.record(
                        StateAuditEvent::new(StateAuditStage::ChromeActivated)
                            .with_detail("index", json!(next)),
                    );
                    log_to(
                        config.logger.as_ref(),
                        LogLevel::Info,
                        "chrome_swapped",
                        [
                            json_kv("previous", previous.map_or(Value::Null, |i| json!(i))),
                            json_kv("next", json!(next)),
                            json_kv("width", json!(avail.width)),
                            json_kv("height", json!(avail.height)),
                        ],
                    );
                }
                None => {
                    // The previous chrome, possibly non-fitting, stays
                    // attached; the next size change retries selection.
                    record_metric(
                        config.metrics.as_ref(),
                        StateMetrics::record_selection_miss,
                    );
                    let err = ChromeError::NoFittingChrome {
                        width: avail.width,
                        height: avail.height,
                    };
                    log_to(
                        config.logger.as_ref(),
                        LogLevel::Warn,
                        "no_fitting_chrome",
                        [json_kv("error", json!(err.to_string()))],
                    );
                    audit.record(
                        StateAuditEvent::new(StateAuditStage::SelectionMissed)
                            .with_detail("width", json!(avail.width))
                            .with_detail("height", json!(avail.height)),
                    );
                }
            }
        }

        if let Some(index) = session.active {
            registry.chromes_mut()[index].set_size(avail);
        }

        maybe_emit_metrics(config, *start_instant, last_metrics_emit);
    }

    /// Orientation bookkeeping. Never re-runs selection; rotation also
    /// changes the measured size, which the next tick notices.
    pub fn on_orientation_change(&mut self) {
        let Self {
            host,
            probe,
            session,
            config,
            audit,
            ..
        } = self;
        let Some(session) = session.as_mut() else {
            return;
        };

        let changed = viewport::apply_orientation_change(
            host.as_mut(),
            probe.as_mut(),
            &mut session.orientation,
            session.viewport_hint,
        );
        if !changed {
            return;
        }

        record_metric(
            config.metrics.as_ref(),
            StateMetrics::record_orientation_change,
        );
        log_to(
            config.logger.as_ref(),
            LogLevel::Info,
            "orientation_changed",
            [json_kv("orientation", json!(session.orientation))],
        );
        audit.record(
            StateAuditEvent::new(StateAuditStage::OrientationChanged)
                .with_detail("orientation", json!(session.orientation)),
        );
    }

    /// Execute one queued command. All mutating signals funnel through here,
    /// so the session only ever sees one operation at a time.
    pub fn dispatch(&mut self, cmd: StateCommand) {
        match cmd {
            StateCommand::CheckState => self.check_state(),
            StateCommand::OrientationChanged => self.on_orientation_change(),
            StateCommand::ScrollToOrigin => self.host.scroll_to(0, 1),
        }
    }

    /// Drain a simulated loop's queue and dispatch every command in order.
    pub fn run_queued(&mut self, sim: &mut SimulatedLoop) {
        for cmd in sim.drain() {
            self.dispatch(cmd);
        }
    }

    fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        log_to(self.config.logger.as_ref(), level, message, fields);
    }
}

fn log_to<I>(logger: Option<&Logger>, level: LogLevel, message: &str, fields: I)
where
    I: IntoIterator<Item = (String, Value)>,
{
    if let Some(logger) = logger {
        let event = event_with_fields(level, STATE_TARGET, message, fields);
        let _ = logger.log_event(event);
    }
}

fn record_metric(
    metrics: Option<&Arc<Mutex<StateMetrics>>>,
    update: impl FnOnce(&mut StateMetrics),
) {
    if let Some(metrics) = metrics {
        if let Ok(mut guard) = metrics.lock() {
            update(&mut guard);
        }
    }
}

fn maybe_emit_metrics(
    config: &StateConfig,
    start_instant: Option<Instant>,
    last_emit: &mut Option<Instant>,
) {
    let Some(metrics) = config.metrics.as_ref() else {
        return;
    };
    if config.metrics_interval.is_zero() {
        return;
    }

    let now = Instant::now();
    match *last_emit {
        Some(last) if now.duration_since(last) < config.metrics_interval => return,
        _ => *last_emit = Some(now),
    }

    let uptime = start_instant
        .map(|start| now.duration_since(start))
        .unwrap_or_default();

    if let Some(logger) = config.logger.as_ref() {
        if let Ok(guard) = metrics.lock() {
            let event = guard
                .snapshot(uptime)
                .to_log_event(config.metrics_target.as_str());
            let _ = logger.log_event(event);
        }
    }
}

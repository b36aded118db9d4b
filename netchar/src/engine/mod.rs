mod stop;

use self::stop::Stop;
use crate::model::{Model, ModelError, ModelEvent};
use netchar_core::{
    defaults::{DEFAULT_CHANNEL_CAPACITY, DEFAULT_POLL_INTERVAL},
    NetCharUpdate, Scenario, SegmentAlgorithm,
};
use std::{
    sync::{
        mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError},
        Arc, Mutex, PoisonError,
    },
    thread::{self, JoinHandle},
    time::Duration,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetCharConfig {
    /// how long the worker waits for a notification before checking
    /// the stop signal
    pub poll_interval: Duration,
    /// capacity of the channels handed out by [`NetChar::subscribe`]
    pub channel_capacity: usize,
}

/// What the engine tells its observers.
#[derive(Debug, Clone, PartialEq)]
pub enum NetCharEvent {
    /// characteristics of the flows that changed during the pass
    Updated(Vec<NetCharUpdate>),
    /// end of a pass. Notifications queued while a pass runs (or while
    /// the engine is stopped) are folded into a single pass on the
    /// latest snapshot.
    Completed,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to connect to the topology model")]
    Connect(#[from] ModelError),
    #[error("Failed to spawn the engine thread")]
    Spawn(#[source] std::io::Error),
    #[error("The engine thread panicked, its state is lost")]
    Panicked,
}

type Observers = Arc<Mutex<Vec<SyncSender<NetCharEvent>>>>;

/// Background engine keeping the network characteristics of a
/// [`Model`]'s flows up to date.
///
/// Every notification of the model triggers a pass: the scenario is
/// segmented, the bandwidth shared, and the characteristics that
/// changed are sent to the observers, followed by
/// [`NetCharEvent::Completed`]. Notifications that pile up before a
/// pass starts are coalesced, only the latest snapshot is processed.
///
/// The engine stops when dropped.
pub struct NetChar {
    config: NetCharConfig,

    observers: Observers,

    stop: Arc<Stop>,

    /// the worker while the engine is stopped
    worker: Option<Worker>,
    /// the worker thread while the engine is running, handing the
    /// worker back when joined
    thread: Option<JoinHandle<Worker>>,
}

struct Worker {
    algorithm: SegmentAlgorithm,

    events: Receiver<ModelEvent>,

    /// snapshot already active when the engine connected
    initial: Option<Arc<Scenario>>,

    observers: Observers,
}

impl Default for NetCharConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl NetChar {
    /// Connect a stopped engine to `model`. The scenario active at that
    /// time, if any, is processed as soon as the engine starts.
    pub fn new(model: &Model, config: NetCharConfig) -> Result<Self, EngineError> {
        let (events, initial) = model.subscribe_with_snapshot()?;

        let observers = Observers::default();

        Ok(Self {
            config,
            observers: Arc::clone(&observers),
            stop: Arc::new(Stop::new()),
            worker: Some(Worker {
                algorithm: SegmentAlgorithm::new(),
                events,
                initial,
                observers,
            }),
            thread: None,
        })
    }

    /// Start the worker thread. Starting a running engine does nothing.
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.thread.is_some() {
            if self.is_running() {
                return Ok(());
            }
            // the worker stopped by itself, collect it first
            self.join()?;
        }

        let Some(worker) = self.worker.take() else {
            return Err(EngineError::Panicked);
        };

        let stop = Arc::new(Stop::new());
        self.stop = Arc::clone(&stop);
        let poll_interval = self.config.poll_interval;

        let thread = thread::Builder::new()
            .name("netchar".to_owned())
            .spawn(move || worker.run(&stop, poll_interval));

        match thread {
            Ok(thread) => {
                info!("NetChar engine started");
                self.thread = Some(thread);
                Ok(())
            }
            Err(error) => Err(EngineError::Spawn(error)),
        }
    }

    /// Stop the worker thread and wait for it. A pass in progress
    /// completes but its results are not published.
    pub fn stop(&mut self) -> Result<(), EngineError> {
        if self.thread.is_none() {
            return Ok(());
        }

        self.stop.toggle();
        self.join()?;

        info!("NetChar engine stopped");
        Ok(())
    }

    fn join(&mut self) -> Result<(), EngineError> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };

        match thread.join() {
            Ok(worker) => {
                self.worker = Some(worker);
                Ok(())
            }
            Err(panic) => {
                error!(?panic, "NetChar engine thread panicked");
                Err(EngineError::Panicked)
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .is_some_and(|thread| !thread.is_finished())
    }

    /// Send every event of the engine to `observer` from now on. An
    /// observer is forgotten once its receiving end is dropped.
    pub fn register(&self, observer: SyncSender<NetCharEvent>) {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    /// Register a new observer channel of `channel_capacity` events.
    pub fn subscribe(&self) -> Receiver<NetCharEvent> {
        let (sender, receiver) = mpsc::sync_channel(self.config.channel_capacity);
        self.register(sender);
        receiver
    }

    /// The algorithm state, available while the engine is stopped.
    pub fn algorithm(&self) -> Option<&SegmentAlgorithm> {
        self.worker.as_ref().map(|worker| &worker.algorithm)
    }
}

impl Drop for NetChar {
    fn drop(&mut self) {
        if let Err(error) = self.stop() {
            warn!(%error, "NetChar engine did not stop cleanly");
        }
    }
}

impl Worker {
    fn run(mut self, stop: &Stop, poll_interval: Duration) -> Self {
        // whatever was queued while stopped supersedes the snapshot taken
        // when connecting
        let initial = self.initial.take();
        if let Some(scenario) = self.latest(initial) {
            self.pass(&scenario, stop);
        }

        while !stop.get() {
            match self.events.recv_timeout(poll_interval) {
                Ok(event) => {
                    if let Some(scenario) = self.latest(Some(snapshot(event))) {
                        self.pass(&scenario, stop);
                    }
                }
                Err(RecvTimeoutError::Timeout) => (),
                Err(RecvTimeoutError::Disconnected) => {
                    // no more notification will ever come
                    info!("Topology model is gone, stopping the NetChar engine");
                    stop.toggle();
                }
            }
        }

        self
    }

    /// `current`, or the snapshot of the last notification queued since
    fn latest(&self, current: Option<Arc<Scenario>>) -> Option<Arc<Scenario>> {
        let mut latest = current;
        let mut skipped = 0usize;

        while let Ok(event) = self.events.try_recv() {
            if latest.is_some() {
                skipped += 1;
            }
            latest = Some(snapshot(event));
        }

        if skipped > 0 {
            debug!(skipped, "superseded topology notifications coalesced");
        }
        latest
    }

    fn pass(&mut self, scenario: &Scenario, stop: &Stop) {
        match self.algorithm.process_scenario(scenario) {
            Ok(()) => {
                let pending = self.algorithm.prepare_net_char();

                if stop.get() {
                    debug!(
                        scenario = %scenario.name,
                        discarded = pending.len(),
                        "engine stopping, updates not published"
                    );
                    return;
                }

                let updates = self.algorithm.commit(pending);
                if !updates.is_empty() {
                    self.publish(NetCharEvent::Updated(updates));
                }
            }
            Err(error) => {
                error!(
                    scenario = %scenario.name,
                    %error,
                    "pass aborted, previous characteristics stay in effect"
                );
            }
        }

        self.publish(NetCharEvent::Completed);
    }

    fn publish(&self, event: NetCharEvent) {
        let mut observers = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        observers.retain(|observer| match observer.try_send(event.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("NetChar observer is lagging behind, event dropped");
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        });
    }
}

/// the scenario a notification leaves in place, empty once terminated
fn snapshot(event: ModelEvent) -> Arc<Scenario> {
    match event {
        ModelEvent::Activated(scenario) | ModelEvent::Updated(scenario) => scenario,
        ModelEvent::Terminated => Arc::new(Scenario::empty()),
    }
}

//! In-memory topology model: holds the active scenario and tells its
//! subscribers about every change.

use netchar_core::Scenario;
use std::sync::{mpsc, Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::debug;

/// Change notification of the [`Model`].
#[derive(Debug, Clone)]
pub enum ModelEvent {
    /// a scenario was deployed
    Activated(Arc<Scenario>),
    /// the active scenario was edited, this is the new snapshot
    Updated(Arc<Scenario>),
    /// the active scenario was taken down, nothing is deployed anymore
    Terminated,
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("The topology model is shut down")]
    ShutDown,
    #[error("No active scenario")]
    NoActiveScenario,
    #[error("Failed to access the topology model, mutex poisoned")]
    Poisoned,
}

/// The topology model. Cloning gives another handle on the same model.
#[derive(Debug, Clone, Default)]
pub struct Model {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    scenario: Option<Arc<Scenario>>,
    subscribers: Vec<mpsc::Sender<ModelEvent>>,
    shut_down: bool,
}

impl Inner {
    /// deliver `event` to every subscriber, forgetting the ones that
    /// went away
    fn publish(&mut self, event: ModelEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    fn ensure_running(&self) -> Result<(), ModelError> {
        if self.shut_down {
            Err(ModelError::ShutDown)
        } else {
            Ok(())
        }
    }
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, ModelError> {
        self.inner.lock().map_err(|_| ModelError::Poisoned)
    }

    /// Deploy `scenario`, replacing the active one if any.
    pub fn activate(&self, scenario: Scenario) -> Result<(), ModelError> {
        let mut inner = self.lock()?;
        inner.ensure_running()?;

        debug!(scenario = %scenario.name, "scenario activated");

        let scenario = Arc::new(scenario);
        inner.scenario = Some(Arc::clone(&scenario));
        inner.publish(ModelEvent::Activated(scenario));
        Ok(())
    }

    /// Replace the active scenario with an edited snapshot.
    pub fn update(&self, scenario: Scenario) -> Result<(), ModelError> {
        let mut inner = self.lock()?;
        inner.ensure_running()?;
        if inner.scenario.is_none() {
            return Err(ModelError::NoActiveScenario);
        }

        debug!(scenario = %scenario.name, "scenario updated");

        let scenario = Arc::new(scenario);
        inner.scenario = Some(Arc::clone(&scenario));
        inner.publish(ModelEvent::Updated(scenario));
        Ok(())
    }

    /// Take the active scenario down.
    pub fn terminate(&self) -> Result<(), ModelError> {
        let mut inner = self.lock()?;
        inner.ensure_running()?;
        let Some(scenario) = inner.scenario.take() else {
            return Err(ModelError::NoActiveScenario);
        };

        debug!(scenario = %scenario.name, "scenario terminated");

        inner.publish(ModelEvent::Terminated);
        Ok(())
    }

    /// the active scenario, if any
    pub fn scenario(&self) -> Result<Option<Arc<Scenario>>, ModelError> {
        Ok(self.lock()?.scenario.clone())
    }

    /// Receive every change published from now on, in publication
    /// order.
    pub fn subscribe(&self) -> Result<mpsc::Receiver<ModelEvent>, ModelError> {
        self.subscribe_with_snapshot().map(|(receiver, _)| receiver)
    }

    /// Like [`Self::subscribe`], along with the scenario active at
    /// subscription time. No change can slip in between the two: the
    /// first event received is the first change after the snapshot.
    pub fn subscribe_with_snapshot(
        &self,
    ) -> Result<(mpsc::Receiver<ModelEvent>, Option<Arc<Scenario>>), ModelError> {
        let mut inner = self.lock()?;
        inner.ensure_running()?;

        let (sender, receiver) = mpsc::channel();
        inner.subscribers.push(sender);
        Ok((receiver, inner.scenario.clone()))
    }

    /// Stop publishing. The subscribers' channels are closed, every
    /// later call fails with [`ModelError::ShutDown`].
    pub fn shutdown(&self) -> Result<(), ModelError> {
        let mut inner = self.lock()?;
        inner.shut_down = true;
        inner.subscribers.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Scenario {
        Scenario {
            name: name.to_owned(),
            ..Scenario::empty()
        }
    }

    #[test]
    fn events_in_publication_order() {
        let model = Model::new();
        let events = model.subscribe().unwrap();

        model.activate(named("s1")).unwrap();
        model.update(named("s2")).unwrap();
        model.terminate().unwrap();

        assert!(matches!(events.try_recv(), Ok(ModelEvent::Activated(s)) if s.name == "s1"));
        assert!(matches!(events.try_recv(), Ok(ModelEvent::Updated(s)) if s.name == "s2"));
        assert!(matches!(events.try_recv(), Ok(ModelEvent::Terminated)));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn active_scenario() {
        let model = Model::new();
        assert!(model.scenario().unwrap().is_none());

        model.activate(named("s1")).unwrap();
        assert_eq!(model.scenario().unwrap().unwrap().name, "s1");

        model.terminate().unwrap();
        assert!(model.scenario().unwrap().is_none());
    }

    #[test]
    fn update_requires_an_active_scenario() {
        let model = Model::new();

        assert!(matches!(
            model.update(named("s1")),
            Err(ModelError::NoActiveScenario)
        ));
        assert!(matches!(model.terminate(), Err(ModelError::NoActiveScenario)));
    }

    #[test]
    fn dropped_subscribers_are_forgotten() {
        let model = Model::new();
        let kept = model.subscribe().unwrap();
        drop(model.subscribe().unwrap());

        model.activate(named("s1")).unwrap();

        assert!(kept.try_recv().is_ok());
        assert_eq!(model.inner.lock().unwrap().subscribers.len(), 1);
    }

    #[test]
    fn shutdown_closes_the_subscriptions() {
        let model = Model::new();
        let events = model.subscribe().unwrap();

        model.shutdown().unwrap();

        assert!(matches!(
            events.recv(),
            Err(mpsc::RecvError)
        ));
        assert!(matches!(model.subscribe(), Err(ModelError::ShutDown)));
        assert!(matches!(model.activate(named("s1")), Err(ModelError::ShutDown)));
    }

    #[test]
    fn snapshot_and_subscription_are_consistent() {
        let model = Model::new();
        model.activate(named("s1")).unwrap();

        let (events, snapshot) = model.subscribe_with_snapshot().unwrap();
        assert_eq!(snapshot.unwrap().name, "s1");
        assert!(events.try_recv().is_err());

        model.update(named("s2")).unwrap();
        assert!(matches!(events.try_recv(), Ok(ModelEvent::Updated(s)) if s.name == "s2"));

        let (_, snapshot) = Model::new().subscribe_with_snapshot().unwrap();
        assert!(snapshot.is_none());
    }
}

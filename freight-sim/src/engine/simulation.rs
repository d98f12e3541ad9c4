//! Core simulation engine: topology registration, tick fan-out, and
//! the driver loop.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use super::actors::{Actor, ActorId, EndDestination, Factory, Port};
use super::clock::{SimClock, Tick};
use super::events::{EventStore, Shipment};
use super::invariants::{Invariant, InvariantViolation, WorldView};
use crate::config::SimulationConfig;

/// Maximum number of invariant violations before stopping simulation.
const MAX_INVARIANT_VIOLATIONS: usize = 10;

/// Errors that can occur during simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Event scheduled before the current tick
    #[error("event scheduled in the past: time {time} < current tick {now}")]
    InvalidSchedule {
        /// Requested due tick
        time: Tick,
        /// Current tick at scheduling
        now: Tick,
    },

    /// Event addressed to a location with no registered actor
    #[error("event scheduled for unknown location '{location}' at tick {time}")]
    UnknownLocation {
        /// The unregistered location
        location: String,
        /// Requested due tick
        time: Tick,
    },

    /// Two actors registered with the same identifier
    #[error("duplicate location identifier '{location}'")]
    DuplicateLocation {
        /// The colliding identifier
        location: String,
    },

    /// Driver loop exceeded the configured tick budget
    #[error("termination predicate not satisfied within {limit} ticks")]
    TickLimitExceeded {
        /// Configured tick budget
        limit: Tick,
    },

    /// Too many invariant violations occurred
    #[error("too many invariant violations: {count}")]
    TooManyInvariantViolations {
        /// Number of violations that occurred
        count: usize,
    },
}

/// Counters collected while the simulation runs.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct SimulationMetrics {
    /// Total ticks advanced
    pub ticks_advanced: u64,
    /// Total actor reactions executed
    pub reactions_run: u64,
    /// Invariant violations detected
    pub invariant_violations: Vec<InvariantViolation>,
}

impl SimulationMetrics {
    /// Records one tick's fan-out across `reactions` actors.
    fn record_tick(&mut self, reactions: usize) {
        self.ticks_advanced += 1;
        self.reactions_run += reactions as u64;
    }
}

/// Result of a simulation run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SimulationReport {
    /// Tick the clock stopped at
    pub ticks: Tick,
    /// Total events ever scheduled
    pub events_scheduled: usize,
    /// Shipments received per destination identifier
    pub deliveries: BTreeMap<String, usize>,
    /// Collected metrics
    pub metrics: SimulationMetrics,
    /// Whether the run finished without invariant violations
    pub success: bool,
}

impl SimulationReport {
    /// Generates human-readable summary.
    pub fn summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str(&format!("Simulation finished at tick {}\n", self.ticks));
        summary.push_str(&format!("Events scheduled: {}\n", self.events_scheduled));
        summary.push_str(&format!("Success: {}\n", self.success));
        summary.push_str("\nDeliveries:\n");

        for (destination, count) in &self.deliveries {
            summary.push_str(&format!("  {destination}: {count}\n"));
        }

        if !self.metrics.invariant_violations.is_empty() {
            summary.push_str("\nInvariant violations:\n");
            for violation in &self.metrics.invariant_violations {
                summary.push_str(&format!("  - {violation}\n"));
            }
        }

        summary
    }
}

/// Discrete-event simulation of a logistics network.
///
/// Owns the clock, the event store, and every actor; actors are
/// registered up front, react to each tick in registration order, and
/// coordinate only through scheduled events. A tick advance is atomic:
/// every reaction for tick `T` completes before `advance` returns, and
/// events produced during `T` are due no earlier than `T + 1`.
pub struct Simulation {
    config: SimulationConfig,
    clock: SimClock,
    store: EventStore,
    actors: Vec<Actor>,
    invariants: Vec<Arc<dyn Invariant>>,
    metrics: SimulationMetrics,
}

impl Simulation {
    /// Creates an empty simulation with the given configuration.
    pub fn new(config: SimulationConfig) -> Self {
        let mut store = EventStore::new();
        if config.strict_locations {
            store.restrict_locations();
        }

        Self {
            config,
            clock: SimClock::new(),
            store,
            actors: Vec::new(),
            invariants: Vec::new(),
            metrics: SimulationMetrics::default(),
        }
    }

    /// Registers an end destination.
    ///
    /// # Errors
    /// - `SimulationError::DuplicateLocation` - Identifier already in use
    pub fn add_destination(
        &mut self,
        identifier: impl Into<String>,
    ) -> Result<ActorId, SimulationError> {
        self.register(Actor::EndDestination(EndDestination::new(identifier)))
    }

    /// Registers a factory with its initial truck pool and shipment
    /// queue.
    ///
    /// # Errors
    /// - `SimulationError::DuplicateLocation` - Identifier already in use
    pub fn add_factory(
        &mut self,
        identifier: impl Into<String>,
        trucks: Vec<String>,
        shipments: Vec<Shipment>,
    ) -> Result<ActorId, SimulationError> {
        self.register(Actor::Factory(Factory::new(identifier, trucks, shipments)))
    }

    /// Registers a port with its initial ship pool.
    ///
    /// # Errors
    /// - `SimulationError::DuplicateLocation` - Identifier already in use
    pub fn add_port(
        &mut self,
        identifier: impl Into<String>,
        ships: Vec<String>,
    ) -> Result<ActorId, SimulationError> {
        self.register(Actor::Port(Port::new(identifier, ships)))
    }

    fn register(&mut self, actor: Actor) -> Result<ActorId, SimulationError> {
        let identifier = actor.identifier().to_string();
        if self.actors.iter().any(|a| a.identifier() == identifier) {
            return Err(SimulationError::DuplicateLocation {
                location: identifier,
            });
        }

        self.store.register_location(&identifier);

        let id = ActorId::new(self.actors.len());
        self.actors.push(actor);
        self.clock.subscribe(id);
        tracing::debug!(location = %identifier, index = id.index(), "actor registered");
        Ok(id)
    }

    /// Adds an invariant to check after every tick.
    pub fn add_invariant(&mut self, invariant: Arc<dyn Invariant>) {
        self.invariants.push(invariant);
    }

    /// Advances the clock by one tick and fans the notification out to
    /// every subscribed actor, in subscription order.
    ///
    /// # Errors
    /// - `SimulationError::UnknownLocation` - Strict location checking
    ///   rejected a scheduled event
    /// - `SimulationError::TooManyInvariantViolations` - Violation cap
    ///   reached
    pub fn advance(&mut self) -> Result<Tick, SimulationError> {
        let now = self.clock.advance();
        tracing::trace!(tick = now, "tick advanced");

        let order: Vec<ActorId> = self.clock.subscribers().to_vec();
        for id in &order {
            if let Some(actor) = self.actors.get_mut(id.index()) {
                actor.react(now, &mut self.store)?;
            }
        }
        self.metrics.record_tick(order.len());

        self.check_invariants(now)?;
        Ok(now)
    }

    /// Repeatedly advances until the caller's termination predicate
    /// holds, then reports.
    ///
    /// The predicate is evaluated before each advance, so a predicate
    /// that is already true advances nothing.
    ///
    /// # Errors
    /// - `SimulationError::TickLimitExceeded` - Predicate not satisfied
    ///   within `config.max_ticks`
    /// - Any error from [`Simulation::advance`]
    pub fn run_until<F>(&mut self, predicate: F) -> Result<SimulationReport, SimulationError>
    where
        F: Fn(&Simulation) -> bool,
    {
        while !predicate(self) {
            if self.clock.current_tick() >= self.config.max_ticks {
                return Err(SimulationError::TickLimitExceeded {
                    limit: self.config.max_ticks,
                });
            }
            self.advance()?;
        }
        Ok(self.report())
    }

    fn check_invariants(&mut self, now: Tick) -> Result<(), SimulationError> {
        let world = WorldView {
            now,
            actors: &self.actors,
            events: &self.store,
        };

        let mut violations = Vec::new();
        for invariant in &self.invariants {
            if let Err(violation) = invariant.check(&world) {
                tracing::warn!(%violation, "invariant violated");
                violations.push(violation);
            }
        }
        self.metrics.invariant_violations.extend(violations);

        if self.metrics.invariant_violations.len() >= MAX_INVARIANT_VIOLATIONS {
            return Err(SimulationError::TooManyInvariantViolations {
                count: self.metrics.invariant_violations.len(),
            });
        }
        Ok(())
    }

    /// Returns the current tick.
    pub fn current_tick(&self) -> Tick {
        self.clock.current_tick()
    }

    /// Returns the configuration this simulation runs with.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Returns the shared event store.
    pub fn event_store(&self) -> &EventStore {
        &self.store
    }

    /// Returns all actors in registration order.
    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    /// Looks up an end destination by identifier.
    pub fn destination(&self, identifier: &str) -> Option<&EndDestination> {
        self.actors
            .iter()
            .filter(|actor| actor.identifier() == identifier)
            .find_map(Actor::as_destination)
    }

    /// Looks up a factory by identifier.
    pub fn factory(&self, identifier: &str) -> Option<&Factory> {
        self.actors
            .iter()
            .filter(|actor| actor.identifier() == identifier)
            .find_map(Actor::as_factory)
    }

    /// Looks up a port by identifier.
    pub fn port(&self, identifier: &str) -> Option<&Port> {
        self.actors
            .iter()
            .filter(|actor| actor.identifier() == identifier)
            .find_map(Actor::as_port)
    }

    /// Generates a report for the run so far.
    pub fn report(&self) -> SimulationReport {
        let deliveries = self
            .actors
            .iter()
            .filter_map(Actor::as_destination)
            .map(|destination| {
                (
                    destination.identifier.clone(),
                    destination.received_count(),
                )
            })
            .collect();

        SimulationReport {
            ticks: self.clock.current_tick(),
            events_scheduled: self.store.len(),
            deliveries,
            metrics: self.metrics.clone(),
            success: self.metrics.invariant_violations.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_monotonic_through_the_simulation() {
        let mut sim = Simulation::new(SimulationConfig::default());
        assert_eq!(sim.current_tick(), 0);

        for expected in 1..=5 {
            assert_eq!(sim.advance().unwrap(), expected);
        }
        assert_eq!(sim.metrics.ticks_advanced, 5);
    }

    #[test]
    fn test_duplicate_identifier_is_rejected() {
        let mut sim = Simulation::new(SimulationConfig::default());
        sim.add_destination("a").unwrap();

        let result = sim.add_factory("a", Vec::new(), Vec::new());
        assert!(matches!(
            result,
            Err(SimulationError::DuplicateLocation { ref location }) if location == "a"
        ));
    }

    #[test]
    fn test_run_until_respects_tick_budget() {
        let config = SimulationConfig {
            max_ticks: 25,
            ..SimulationConfig::default()
        };
        let mut sim = Simulation::new(config);
        sim.add_destination("a").unwrap();

        let result = sim.run_until(|sim| {
            sim.destination("a")
                .is_some_and(|d| d.received_count() >= 1)
        });

        assert!(matches!(
            result,
            Err(SimulationError::TickLimitExceeded { limit: 25 })
        ));
    }

    #[test]
    fn test_run_until_already_satisfied_advances_nothing() {
        let mut sim = Simulation::new(SimulationConfig::default());
        let report = sim.run_until(|_| true).unwrap();
        assert_eq!(report.ticks, 0);
        assert_eq!(report.events_scheduled, 0);
    }

    #[test]
    fn test_report_summary_lists_deliveries() {
        let mut sim = Simulation::new(SimulationConfig::default());
        sim.add_destination("a").unwrap();
        sim.add_destination("b").unwrap();

        let summary = sim.report().summary();
        assert!(summary.contains("a: 0"));
        assert!(summary.contains("b: 0"));
        assert!(summary.contains("Success: true"));
    }
}

//! Freight Simulation - deterministic discrete-event logistics modeling.

#![warn(missing_docs)]
#![warn(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
//!
//! This crate simulates a logistics network in which shipments move
//! from a factory through a port to final destinations via trucks and
//! ships, each leg consuming simulated time. A logical clock fans each
//! tick advance out to a fixed set of actors; actors consume the
//! events due at the new tick for their own location and schedule
//! follow-up events.
//!
//! # Features
//!
//! - **Deterministic Execution**: A given topology always produces
//!   identical results; seeded scenario generation is reproducible
//! - **Append-Only Event Store**: Events are indexed by due tick and
//!   never removed, so every query is idempotent
//! - **Invariant Checking**: Carrier and shipment conservation are
//!   validated live after every tick
//! - **Hardened Scheduling**: Past-dated events are always rejected;
//!   strict mode also rejects events addressed to unknown locations
//! - **Scenario Library**: Pre-built topologies, including the
//!   reference network and seeded random manifests
//!
//! # Example
//!
//! ```rust
//! use freight_sim::{SimulationConfig, SimulationScenarios};
//!
//! # fn main() -> Result<(), freight_sim::SimulationError> {
//! let mut sim = SimulationScenarios::reference_network(SimulationConfig::default())?;
//!
//! let report = sim.run_until(|sim| {
//!     sim.destination("b")
//!         .is_some_and(|d| d.received_count() >= 2)
//! })?;
//!
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod scenarios;

pub use config::SimulationConfig;
pub use engine::{
    Actor, ActorId, CarrierConservationInvariant, DeterministicRng, EndDestination, Event,
    EventStore, Factory, Invariant, InvariantViolation, Port, Shipment,
    ShipmentConservationInvariant, ShipmentId, SimClock, Simulation, SimulationError,
    SimulationMetrics, SimulationReport, Tick, WorldView,
};
pub use scenarios::SimulationScenarios;

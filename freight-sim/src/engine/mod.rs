//! Discrete-event simulation engine for the logistics network.
//!
//! A logical clock fans each tick advance out to a fixed set of
//! actors; actors consume the events due at the new tick for their own
//! location and schedule follow-up events, all within the same
//! synchronous advance.

mod actors;
mod clock;
mod events;
mod invariants;
mod simulation;

// Re-export core types for public API
pub use actors::{
    Actor, ActorId, DIRECT_DESTINATION, EndDestination, Factory, PORT_LOCATION, Port,
    SHIP_NEXT_HOP,
};
pub use clock::{DeterministicRng, SimClock, Tick};
pub use events::{Event, EventStore, Shipment, ShipmentId};
pub use invariants::{
    CarrierConservationInvariant, Invariant, InvariantViolation, ShipmentConservationInvariant,
    WorldView,
};
pub use simulation::{Simulation, SimulationError, SimulationMetrics, SimulationReport};

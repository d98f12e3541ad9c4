//! Invariant checking for conservation of carriers and shipments.

use std::fmt;

use super::actors::Actor;
use super::clock::Tick;
use super::events::{EventStore, ShipmentId};

/// Violation of a simulation invariant.
#[derive(Debug, Clone, serde::Serialize)]
pub struct InvariantViolation {
    /// Name of the violated invariant
    pub invariant: String,
    /// Detailed description of the violation
    pub description: String,
    /// Tick at which the violation was observed
    pub tick: Tick,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invariant '{}' violated at tick {}: {}",
            self.invariant, self.tick, self.description
        )
    }
}

/// Read-only view of the world handed to invariant checks after each
/// tick's fan-out completes.
pub struct WorldView<'a> {
    /// The tick that was just processed.
    pub now: Tick,
    /// All actors in construction order.
    pub actors: &'a [Actor],
    /// The shared event store.
    pub events: &'a EventStore,
}

impl WorldView<'_> {
    /// Counts occurrences of a carrier id across idle pools.
    fn pooled(&self, carrier: &str) -> usize {
        self.actors
            .iter()
            .flat_map(|actor| actor.available_carriers())
            .filter(|id| *id == carrier)
            .count()
    }

    /// Counts future events (strictly after `now`) carrying the id.
    fn in_flight(&self, carrier: &str) -> usize {
        self.events
            .iter()
            .filter(|event| event.time > self.now && event.carrier == carrier)
            .count()
    }
}

/// Trait for checking simulation invariants.
pub trait Invariant: Send + Sync {
    /// Checks if invariant holds for the current world state.
    ///
    /// # Errors
    /// Returns `InvariantViolation` if the invariant condition is not met.
    fn check(&self, world: &WorldView<'_>) -> Result<(), InvariantViolation>;

    /// Returns name of this invariant.
    fn name(&self) -> &str;
}

/// Ensures every carrier is either idle in exactly one pool or in
/// flight, never both and never lost.
///
/// A dispatching actor schedules both legs of a round trip up front, so
/// an in-flight carrier may appear in more than one future event; what
/// must never happen is a carrier idle in a pool while still having
/// scheduled legs, idle in two pools, or absent everywhere.
pub struct CarrierConservationInvariant {
    carriers: Vec<String>,
}

impl CarrierConservationInvariant {
    /// Creates the invariant for the given carrier fleet.
    pub fn new(carriers: Vec<String>) -> Self {
        Self { carriers }
    }
}

impl Invariant for CarrierConservationInvariant {
    fn check(&self, world: &WorldView<'_>) -> Result<(), InvariantViolation> {
        for carrier in &self.carriers {
            let pooled = world.pooled(carrier);
            let in_flight = world.in_flight(carrier);

            let description = if pooled > 1 {
                format!("carrier '{carrier}' idle in {pooled} pools")
            } else if pooled == 1 && in_flight > 0 {
                format!("carrier '{carrier}' idle but still has {in_flight} scheduled legs")
            } else if pooled == 0 && in_flight == 0 {
                format!("carrier '{carrier}' is neither pooled nor in flight")
            } else {
                continue;
            };

            return Err(InvariantViolation {
                invariant: self.name().to_string(),
                description,
                tick: world.now,
            });
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "CarrierConservation"
    }
}

/// Ensures every shipment is in exactly one place: a queue, an
/// in-flight event's cargo, or a destination's received list.
///
/// A shipment forwarded to a location no actor answers to drops out of
/// all three once its arrival tick passes, which this invariant
/// surfaces as a loss.
pub struct ShipmentConservationInvariant {
    shipments: Vec<ShipmentId>,
}

impl ShipmentConservationInvariant {
    /// Creates the invariant for the given shipment manifest.
    pub fn new(shipments: Vec<ShipmentId>) -> Self {
        Self { shipments }
    }
}

impl Invariant for ShipmentConservationInvariant {
    fn check(&self, world: &WorldView<'_>) -> Result<(), InvariantViolation> {
        for id in &self.shipments {
            let held: usize = world
                .actors
                .iter()
                .flat_map(|actor| actor.held_shipments())
                .filter(|shipment| shipment.id == *id)
                .count();
            let in_flight = world
                .events
                .iter()
                .filter(|event| {
                    event.time > world.now
                        && event.cargo.as_ref().is_some_and(|cargo| cargo.id == *id)
                })
                .count();

            let total = held + in_flight;
            if total != 1 {
                let description = if total == 0 {
                    format!("{id} is lost: not queued, in flight, or received")
                } else {
                    format!("{id} appears {total} times across queues and in-flight events")
                };
                return Err(InvariantViolation {
                    invariant: self.name().to_string(),
                    description,
                    tick: world.now,
                });
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "ShipmentConservation"
    }
}

//! Reactive actors: factory, port, and end destinations.
//!
//! Each actor reacts to a tick advance by cloning the due events
//! addressed to its own identifier, mutating its local state, and
//! scheduling follow-up events. Actors never read each other's state;
//! all coordination goes through the event store.

use super::clock::Tick;
use super::events::{Event, EventStore, Shipment};
use super::simulation::SimulationError;

/// Destination served directly by truck instead of via the port.
pub const DIRECT_DESTINATION: &str = "b";

/// Location identifier trucks route non-direct shipments to.
pub const PORT_LOCATION: &str = "port";

/// Next hop for every ship leaving the port.
///
/// Uppercase, while destinations register lowercase identifiers. The
/// reference network ships to a location no actor answers to, so
/// port-forwarded cargo is retained in the store but never received.
/// Kept verbatim; strict location checking turns it into a scheduling
/// error instead.
pub const SHIP_NEXT_HOP: &str = "A";

/// Truck transit time to the port, in ticks.
const TRUCK_LEG_TO_PORT: Tick = 1;

/// Truck transit time for the direct leg, in ticks.
const TRUCK_LEG_DIRECT: Tick = 5;

/// Ship transit time from the port, in ticks.
const SHIP_LEG: Tick = 4;

/// Handle to a registered actor.
///
/// An index into the simulation's actor table; the clock's subscriber
/// list holds these instead of callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorId(usize);

impl ActorId {
    /// Creates an actor id from a table index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the underlying table index.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Dispatches queued shipments on returning trucks.
#[derive(Debug, Clone)]
pub struct Factory {
    /// Unique location identifier.
    pub identifier: String,
    /// Shipments waiting for a truck, dispatched most-recently-queued
    /// first.
    pub shipment_queue: Vec<Shipment>,
    /// Idle truck ids, reused most-recently-returned first.
    pub available_trucks: Vec<String>,
}

impl Factory {
    /// Creates a factory with an initial truck pool and shipment queue.
    pub fn new(
        identifier: impl Into<String>,
        available_trucks: Vec<String>,
        shipments: Vec<Shipment>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            shipment_queue: shipments,
            available_trucks,
        }
    }

    fn react(&mut self, now: Tick, store: &mut EventStore) -> Result<(), SimulationError> {
        let due: Vec<Event> = store
            .events_at(now)
            .iter()
            .filter(|event| event.location == self.identifier)
            .cloned()
            .collect();

        for returned in due.iter().filter(|event| event.cargo.is_none()) {
            tracing::debug!(truck = %returned.carrier, tick = now, "truck returned to factory");
            self.available_trucks.push(returned.carrier.clone());
        }

        // Send out trucks until shipments or trucks run out; leftovers
        // wait for a future truck-return event.
        while !self.shipment_queue.is_empty() && !self.available_trucks.is_empty() {
            let (Some(shipment), Some(truck)) =
                (self.shipment_queue.pop(), self.available_trucks.pop())
            else {
                break;
            };

            let (duration, next_hop) = if shipment.destination == DIRECT_DESTINATION {
                (TRUCK_LEG_DIRECT, shipment.destination.clone())
            } else {
                (TRUCK_LEG_TO_PORT, PORT_LOCATION.to_string())
            };

            tracing::debug!(
                shipment = %shipment.id,
                truck = %truck,
                next_hop = %next_hop,
                arrives = now + duration,
                "factory dispatched truck"
            );

            store.schedule(
                Event::arrival(next_hop, truck.clone(), shipment, now + duration),
                now,
            )?;
            store.schedule(
                Event::carrier_return(self.identifier.clone(), truck, now + 2 * duration),
                now,
            )?;
        }

        Ok(())
    }
}

/// Transships truck cargo onto ships.
#[derive(Debug, Clone)]
pub struct Port {
    /// Unique location identifier.
    pub identifier: String,
    /// Shipments unloaded from trucks, loaded most-recently-arrived
    /// first.
    pub cargo_to_be_shipped: Vec<Shipment>,
    /// Idle ship ids, reused most-recently-returned first.
    pub available_ships: Vec<String>,
}

impl Port {
    /// Creates a port with an initial ship pool.
    pub fn new(identifier: impl Into<String>, available_ships: Vec<String>) -> Self {
        Self {
            identifier: identifier.into(),
            cargo_to_be_shipped: Vec::new(),
            available_ships,
        }
    }

    fn react(&mut self, now: Tick, store: &mut EventStore) -> Result<(), SimulationError> {
        let due: Vec<Event> = store
            .events_at(now)
            .iter()
            .filter(|event| event.location == self.identifier)
            .cloned()
            .collect();

        for returned in due.iter().filter(|event| event.cargo.is_none()) {
            tracing::debug!(ship = %returned.carrier, tick = now, "ship returned to port");
            self.available_ships.push(returned.carrier.clone());
        }

        for arrived in &due {
            if let Some(cargo) = &arrived.cargo {
                tracing::debug!(shipment = %cargo.id, truck = %arrived.carrier, tick = now, "cargo arrived at port");
                self.cargo_to_be_shipped.push(cargo.clone());
            }
        }

        // Send out ships until cargo or ships run out.
        while !self.cargo_to_be_shipped.is_empty() && !self.available_ships.is_empty() {
            let (Some(shipment), Some(ship)) =
                (self.cargo_to_be_shipped.pop(), self.available_ships.pop())
            else {
                break;
            };

            tracing::debug!(
                shipment = %shipment.id,
                ship = %ship,
                next_hop = SHIP_NEXT_HOP,
                arrives = now + SHIP_LEG,
                "port dispatched ship"
            );

            store.schedule(
                Event::arrival(SHIP_NEXT_HOP, ship.clone(), shipment, now + SHIP_LEG),
                now,
            )?;
            store.schedule(
                Event::carrier_return(self.identifier.clone(), ship, now + 2 * SHIP_LEG),
                now,
            )?;
        }

        Ok(())
    }
}

/// Terminal node collecting delivered shipments.
#[derive(Debug, Clone)]
pub struct EndDestination {
    /// Unique location identifier.
    pub identifier: String,
    /// Delivered shipments in arrival order.
    pub shipments_received: Vec<Shipment>,
}

impl EndDestination {
    /// Creates an end destination with the given identifier.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            shipments_received: Vec::new(),
        }
    }

    /// Returns the number of shipments received so far.
    pub fn received_count(&self) -> usize {
        self.shipments_received.len()
    }

    fn react(&mut self, now: Tick, store: &mut EventStore) {
        // Filtering is by location only; an empty return leg addressed
        // here would simply carry nothing to append.
        for event in store.events_at(now) {
            if event.location != self.identifier {
                continue;
            }
            if let Some(cargo) = &event.cargo {
                tracing::debug!(
                    shipment = %cargo.id,
                    carrier = %event.carrier,
                    destination = %self.identifier,
                    tick = now,
                    "shipment delivered"
                );
                self.shipments_received.push(cargo.clone());
            }
        }
    }
}

/// The closed set of actor variants.
///
/// Construction order doubles as clock subscription order, which fixes
/// intra-tick reaction order.
#[derive(Debug, Clone)]
pub enum Actor {
    /// Dispatching origin of all shipments.
    Factory(Factory),
    /// Truck-to-ship transshipment point.
    Port(Port),
    /// Terminal recipient.
    EndDestination(EndDestination),
}

impl Actor {
    /// Returns the actor's unique location identifier.
    pub fn identifier(&self) -> &str {
        match self {
            Actor::Factory(factory) => &factory.identifier,
            Actor::Port(port) => &port.identifier,
            Actor::EndDestination(destination) => &destination.identifier,
        }
    }

    /// Runs the query-filter-react cycle for the new tick.
    ///
    /// # Errors
    /// - `SimulationError::InvalidSchedule` - A follow-up event was
    ///   scheduled in the past (engine bug; durations are ≥ 1)
    /// - `SimulationError::UnknownLocation` - Strict location checking
    ///   rejected a follow-up event's next hop
    pub fn react(&mut self, now: Tick, store: &mut EventStore) -> Result<(), SimulationError> {
        match self {
            Actor::Factory(factory) => factory.react(now, store),
            Actor::Port(port) => port.react(now, store),
            Actor::EndDestination(destination) => {
                destination.react(now, store);
                Ok(())
            }
        }
    }

    /// Returns the carriers currently idle at this actor.
    pub fn available_carriers(&self) -> &[String] {
        match self {
            Actor::Factory(factory) => &factory.available_trucks,
            Actor::Port(port) => &port.available_ships,
            Actor::EndDestination(_) => &[],
        }
    }

    /// Returns the shipments currently held by this actor, whether
    /// queued, awaiting transshipment, or delivered.
    pub fn held_shipments(&self) -> &[Shipment] {
        match self {
            Actor::Factory(factory) => &factory.shipment_queue,
            Actor::Port(port) => &port.cargo_to_be_shipped,
            Actor::EndDestination(destination) => &destination.shipments_received,
        }
    }

    /// Downcasts to a factory.
    pub fn as_factory(&self) -> Option<&Factory> {
        match self {
            Actor::Factory(factory) => Some(factory),
            _ => None,
        }
    }

    /// Downcasts to a port.
    pub fn as_port(&self) -> Option<&Port> {
        match self {
            Actor::Port(port) => Some(port),
            _ => None,
        }
    }

    /// Downcasts to an end destination.
    pub fn as_destination(&self) -> Option<&EndDestination> {
        match self {
            Actor::EndDestination(destination) => Some(destination),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::events::ShipmentId;

    fn shipment(id: u64, destination: &str) -> Shipment {
        Shipment::new(ShipmentId::new(id), destination)
    }

    #[test]
    fn test_factory_routes_direct_shipment_to_b() {
        let mut store = EventStore::new();
        let mut factory = Factory::new(
            "factory",
            vec!["truck-1".to_string()],
            vec![shipment(0, "b")],
        );

        factory.react(0, &mut store).unwrap();

        let arrivals = store.events_at(5);
        assert_eq!(arrivals.len(), 1);
        assert_eq!(arrivals[0].location, "b");
        assert_eq!(arrivals[0].carrier, "truck-1");

        let returns = store.events_at(10);
        assert_eq!(returns.len(), 1);
        assert_eq!(returns[0].location, "factory");
        assert!(returns[0].cargo.is_none());
    }

    #[test]
    fn test_factory_routes_other_shipments_via_port() {
        let mut store = EventStore::new();
        let mut factory = Factory::new(
            "factory",
            vec!["truck-1".to_string()],
            vec![shipment(0, "a")],
        );

        factory.react(0, &mut store).unwrap();

        let arrivals = store.events_at(1);
        assert_eq!(arrivals.len(), 1);
        assert_eq!(arrivals[0].location, "port");

        assert_eq!(store.events_at(2).len(), 1);
        assert_eq!(store.events_at(2)[0].location, "factory");
    }

    #[test]
    fn test_factory_dispatches_most_recently_queued_first() {
        let mut store = EventStore::new();
        let mut factory = Factory::new(
            "factory",
            vec!["truck-1".to_string()],
            vec![shipment(0, "a"), shipment(1, "b")],
        );

        factory.react(0, &mut store).unwrap();

        // One truck: only the most recently queued shipment (to "b")
        // goes out; the other waits.
        assert_eq!(factory.shipment_queue.len(), 1);
        assert_eq!(factory.shipment_queue[0].destination, "a");
        assert_eq!(store.events_at(5)[0].location, "b");
    }

    #[test]
    fn test_factory_redispatches_on_truck_return() {
        let mut store = EventStore::new();
        let mut factory = Factory::new(
            "factory",
            Vec::new(),
            vec![shipment(0, "a")],
        );

        // Nothing to do without trucks.
        factory.react(0, &mut store).unwrap();
        assert_eq!(factory.shipment_queue.len(), 1);
        assert!(store.is_empty());

        // A truck returns at tick 3.
        store
            .schedule(Event::carrier_return("factory", "truck-9", 3), 0)
            .unwrap();
        factory.react(3, &mut store).unwrap();

        assert!(factory.shipment_queue.is_empty());
        assert_eq!(store.events_at(4).len(), 1);
        assert_eq!(store.events_at(4)[0].location, "port");
    }

    #[test]
    fn test_port_ships_arrived_cargo_to_uppercase_next_hop() {
        let mut store = EventStore::new();
        let mut port = Port::new("port", vec!["ship-1".to_string()]);

        store
            .schedule(Event::arrival("port", "truck-1", shipment(0, "a"), 1), 0)
            .unwrap();
        port.react(1, &mut store).unwrap();

        assert!(port.cargo_to_be_shipped.is_empty());
        assert!(port.available_ships.is_empty());

        let arrivals = store.events_at(5);
        assert_eq!(arrivals.len(), 1);
        assert_eq!(arrivals[0].location, "A");
        assert_eq!(arrivals[0].carrier, "ship-1");

        let returns = store.events_at(9);
        assert_eq!(returns.len(), 1);
        assert_eq!(returns[0].location, "port");
        assert!(returns[0].cargo.is_none());
    }

    #[test]
    fn test_port_holds_cargo_until_ship_returns() {
        let mut store = EventStore::new();
        let mut port = Port::new("port", Vec::new());

        store
            .schedule(Event::arrival("port", "truck-1", shipment(0, "a"), 1), 0)
            .unwrap();
        port.react(1, &mut store).unwrap();
        assert_eq!(port.cargo_to_be_shipped.len(), 1);

        store
            .schedule(Event::carrier_return("port", "ship-1", 2), 1)
            .unwrap();
        port.react(2, &mut store).unwrap();
        assert!(port.cargo_to_be_shipped.is_empty());
        assert_eq!(store.events_at(6).len(), 1);
    }

    #[test]
    fn test_destination_appends_in_arrival_order() {
        let mut store = EventStore::new();
        let mut destination = EndDestination::new("b");

        store
            .schedule(Event::arrival("b", "truck-1", shipment(0, "b"), 5), 0)
            .unwrap();
        store
            .schedule(Event::arrival("b", "truck-2", shipment(1, "b"), 5), 0)
            .unwrap();
        store
            .schedule(Event::arrival("a", "truck-3", shipment(2, "a"), 5), 0)
            .unwrap();

        destination.react(5, &mut store);

        let ids: Vec<u64> = destination
            .shipments_received
            .iter()
            .map(|s| s.id.as_u64())
            .collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn test_destination_ignores_other_ticks() {
        let mut store = EventStore::new();
        let mut destination = EndDestination::new("b");

        store
            .schedule(Event::arrival("b", "truck-1", shipment(0, "b"), 5), 0)
            .unwrap();
        destination.react(4, &mut store);

        assert_eq!(destination.received_count(), 0);
    }
}

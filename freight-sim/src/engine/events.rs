//! Scheduled events, shipments, and the append-only event store.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use super::clock::Tick;
use super::simulation::SimulationError;

/// Unique identity of a shipment, assigned once at topology
/// construction and stable for the whole run.
///
/// Conservation checks track shipments by this id as they move between
/// actor queues, in-flight events, and received lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct ShipmentId(u64);

impl ShipmentId {
    /// Creates a shipment id from a raw value.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ShipmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shipment-{}", self.0)
    }
}

/// A unit of goods with a fixed final destination.
///
/// The destination is an identifier handle matched against an
/// `EndDestination` actor's identifier, not a reference to the actor.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Shipment {
    /// Stable identity for conservation tracking.
    pub id: ShipmentId,
    /// Identifier of the receiving end destination.
    pub destination: String,
}

impl Shipment {
    /// Creates a shipment bound for the given destination identifier.
    pub fn new(id: ShipmentId, destination: impl Into<String>) -> Self {
        Self {
            id,
            destination: destination.into(),
        }
    }
}

/// A scheduled occurrence at a location: either cargo arriving via a
/// carrier, or an empty carrier returning.
///
/// Immutable once scheduled; the store owns it for the rest of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Identifier of the actor this event is addressed to.
    pub location: String,
    /// Truck or ship id performing the leg.
    pub carrier: String,
    /// Shipment on board, or `None` for an empty return leg.
    pub cargo: Option<Shipment>,
    /// Tick at which the event becomes due.
    pub time: Tick,
}

impl Event {
    /// Creates a cargo-arrival event.
    pub fn arrival(
        location: impl Into<String>,
        carrier: impl Into<String>,
        cargo: Shipment,
        time: Tick,
    ) -> Self {
        Self {
            location: location.into(),
            carrier: carrier.into(),
            cargo: Some(cargo),
            time,
        }
    }

    /// Creates an empty carrier-return event.
    pub fn carrier_return(
        location: impl Into<String>,
        carrier: impl Into<String>,
        time: Tick,
    ) -> Self {
        Self {
            location: location.into(),
            carrier: carrier.into(),
            cargo: None,
            time,
        }
    }
}

/// Append-only store of scheduled future events.
///
/// Events are indexed by due tick and kept in insertion order within a
/// tick. The store never shrinks: due events are read, never removed,
/// so queries are idempotent and past ticks remain inspectable.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    by_tick: BTreeMap<Tick, Vec<Event>>,
    scheduled: usize,
    known_locations: Option<HashSet<String>>,
}

impl EventStore {
    /// Creates an empty store with no location registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables the location registry.
    ///
    /// Once enabled, scheduling an event addressed to an unregistered
    /// location is rejected instead of being silently retained and
    /// never delivered.
    pub fn restrict_locations(&mut self) {
        self.known_locations.get_or_insert_with(HashSet::new);
    }

    /// Adds a location to the registry, if one is enabled.
    pub fn register_location(&mut self, location: &str) {
        if let Some(known) = self.known_locations.as_mut() {
            known.insert(location.to_string());
        }
    }

    /// Appends an event to the store.
    ///
    /// `now` is the current tick; scheduling for the current tick is
    /// permitted, scheduling in the past is not.
    ///
    /// # Errors
    /// - `SimulationError::InvalidSchedule` - Event time is before `now`
    /// - `SimulationError::UnknownLocation` - Location registry is
    ///   enabled and the event's location is not registered
    pub fn schedule(&mut self, event: Event, now: Tick) -> Result<(), SimulationError> {
        if event.time < now {
            return Err(SimulationError::InvalidSchedule {
                time: event.time,
                now,
            });
        }

        if let Some(known) = self.known_locations.as_ref()
            && !known.contains(&event.location)
        {
            return Err(SimulationError::UnknownLocation {
                location: event.location,
                time: event.time,
            });
        }

        tracing::trace!(
            location = %event.location,
            carrier = %event.carrier,
            time = event.time,
            loaded = event.cargo.is_some(),
            "event scheduled"
        );

        self.by_tick.entry(event.time).or_default().push(event);
        self.scheduled += 1;
        Ok(())
    }

    /// Returns all events due at `time`, in insertion order.
    ///
    /// Empty when nothing is due. The store is not mutated, so repeated
    /// queries for the same tick return the same events.
    pub fn events_at(&self, time: Tick) -> &[Event] {
        self.by_tick.get(&time).map_or(&[], Vec::as_slice)
    }

    /// Iterates all stored events in due-tick order, insertion order
    /// within a tick.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.by_tick.values().flatten()
    }

    /// Returns the total number of events ever scheduled.
    pub fn len(&self) -> usize {
        self.scheduled
    }

    /// Returns true if nothing has been scheduled.
    pub fn is_empty(&self) -> bool {
        self.scheduled == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shipment(id: u64, destination: &str) -> Shipment {
        Shipment::new(ShipmentId::new(id), destination)
    }

    #[test]
    fn test_events_visible_only_at_their_tick() {
        let mut store = EventStore::new();
        store
            .schedule(Event::arrival("port", "truck-1", shipment(0, "a"), 3), 0)
            .unwrap();

        assert!(store.events_at(2).is_empty());
        assert_eq!(store.events_at(3).len(), 1);
        assert!(store.events_at(4).is_empty());
    }

    #[test]
    fn test_query_is_idempotent() {
        let mut store = EventStore::new();
        store
            .schedule(Event::carrier_return("factory", "truck-1", 2), 0)
            .unwrap();

        let first: Vec<Event> = store.events_at(2).to_vec();
        let second: Vec<Event> = store.events_at(2).to_vec();
        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_insertion_order_preserved_within_tick() {
        let mut store = EventStore::new();
        store
            .schedule(Event::carrier_return("port", "ship-1", 4), 0)
            .unwrap();
        store
            .schedule(Event::arrival("port", "truck-2", shipment(1, "a"), 4), 0)
            .unwrap();

        let carriers: Vec<&str> = store
            .events_at(4)
            .iter()
            .map(|e| e.carrier.as_str())
            .collect();
        assert_eq!(carriers, vec!["ship-1", "truck-2"]);
    }

    #[test]
    fn test_scheduling_in_the_past_is_rejected() {
        let mut store = EventStore::new();
        let result = store.schedule(Event::carrier_return("factory", "truck-1", 1), 5);

        assert!(matches!(
            result,
            Err(SimulationError::InvalidSchedule { time: 1, now: 5 })
        ));
    }

    #[test]
    fn test_scheduling_at_current_tick_is_permitted() {
        let mut store = EventStore::new();
        store
            .schedule(Event::carrier_return("factory", "truck-1", 5), 5)
            .unwrap();
        assert_eq!(store.events_at(5).len(), 1);
    }

    #[test]
    fn test_unknown_location_rejected_only_with_registry() {
        let mut permissive = EventStore::new();
        permissive
            .schedule(Event::arrival("A", "ship-1", shipment(0, "a"), 4), 0)
            .unwrap();

        let mut strict = EventStore::new();
        strict.restrict_locations();
        strict.register_location("a");
        let result = strict.schedule(Event::arrival("A", "ship-1", shipment(0, "a"), 4), 0);

        assert!(matches!(
            result,
            Err(SimulationError::UnknownLocation { ref location, time: 4 }) if location == "A"
        ));
    }
}

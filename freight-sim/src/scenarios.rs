//! Pre-built simulation scenarios for common logistics topologies.
//!
//! Provides ready-to-use network wirings for systematic testing: the
//! reference network from the original system, an all-direct variant,
//! and a seeded random manifest generator.

use std::sync::Arc;

use crate::config::SimulationConfig;
use crate::engine::{
    CarrierConservationInvariant, DeterministicRng, Shipment, ShipmentConservationInvariant,
    ShipmentId, Simulation, SimulationError,
};

/// Destinations a random manifest draws from.
const MANIFEST_DESTINATIONS: [&str; 2] = ["a", "b"];

/// Pre-built simulation scenarios for systematic testing.
pub struct SimulationScenarios;

impl SimulationScenarios {
    /// Creates the reference network: destinations `"b"` and `"a"`, a
    /// factory with two trucks and a queue of one shipment to `"a"`
    /// and two to `"b"`, and a port with one ship.
    ///
    /// Conservation invariants for the full fleet and manifest are
    /// installed. Registration order matches the original wiring, which
    /// fixes intra-tick reaction order.
    ///
    /// # Errors
    /// - `SimulationError::DuplicateLocation` - Cannot occur for this
    ///   fixed wiring; propagated for uniformity
    pub fn reference_network(config: SimulationConfig) -> Result<Simulation, SimulationError> {
        let trucks = vec!["truck-1".to_string(), "truck-2".to_string()];
        let ships = vec!["ship-1".to_string()];
        let shipments = vec![
            Shipment::new(ShipmentId::new(0), "a"),
            Shipment::new(ShipmentId::new(1), "b"),
            Shipment::new(ShipmentId::new(2), "b"),
        ];

        let mut sim = Simulation::new(config);
        sim.add_destination("b")?;
        sim.add_destination("a")?;
        sim.add_factory("factory", trucks.clone(), shipments.clone())?;
        sim.add_port("port", ships.clone())?;

        let carriers = trucks.into_iter().chain(ships).collect();
        sim.add_invariant(Arc::new(CarrierConservationInvariant::new(carriers)));
        sim.add_invariant(Arc::new(ShipmentConservationInvariant::new(
            shipments.iter().map(|s| s.id).collect(),
        )));

        Ok(sim)
    }

    /// Creates a factory with `count` trucks and `count` shipments to
    /// the direct destination `"b"`; no port is involved.
    ///
    /// # Errors
    /// - `SimulationError::DuplicateLocation` - Cannot occur for this
    ///   fixed wiring; propagated for uniformity
    pub fn direct_shipments(
        config: SimulationConfig,
        count: usize,
    ) -> Result<Simulation, SimulationError> {
        let trucks: Vec<String> = (1..=count).map(|i| format!("truck-{i}")).collect();
        let shipments: Vec<Shipment> = (0..count)
            .map(|i| Shipment::new(ShipmentId::new(i as u64), "b"))
            .collect();

        let mut sim = Simulation::new(config);
        sim.add_destination("b")?;
        sim.add_factory("factory", trucks.clone(), shipments.clone())?;

        sim.add_invariant(Arc::new(CarrierConservationInvariant::new(trucks)));
        sim.add_invariant(Arc::new(ShipmentConservationInvariant::new(
            shipments.iter().map(|s| s.id).collect(),
        )));

        Ok(sim)
    }

    /// Creates a network with a seeded random manifest: `shipments`
    /// shipments with destinations drawn from `"a"`/`"b"`, and
    /// fleet sizes drawn from small ranges.
    ///
    /// The same seed always produces the identical topology, so runs
    /// are reproducible end to end. No invariants are installed; the
    /// caller decides which to add.
    ///
    /// # Errors
    /// - `SimulationError::DuplicateLocation` - Cannot occur for this
    ///   fixed wiring; propagated for uniformity
    pub fn random_manifest(
        config: SimulationConfig,
        seed: u64,
        shipments: usize,
    ) -> Result<Simulation, SimulationError> {
        let mut rng = DeterministicRng::from_seed(seed);

        let truck_count = rng.random_range(1, 4) as usize;
        let ship_count = rng.random_range(1, 3) as usize;
        let trucks: Vec<String> = (1..=truck_count).map(|i| format!("truck-{i}")).collect();
        let ships: Vec<String> = (1..=ship_count).map(|i| format!("ship-{i}")).collect();

        let manifest: Vec<Shipment> = (0..shipments)
            .map(|i| {
                let destination = rng
                    .choose(&MANIFEST_DESTINATIONS)
                    .copied()
                    .unwrap_or(MANIFEST_DESTINATIONS[0]);
                Shipment::new(ShipmentId::new(i as u64), destination)
            })
            .collect();

        tracing::debug!(
            seed,
            trucks = truck_count,
            ships = ship_count,
            shipments,
            "generated random manifest"
        );

        let mut sim = Simulation::new(config);
        sim.add_destination("b")?;
        sim.add_destination("a")?;
        sim.add_factory("factory", trucks, manifest)?;
        sim.add_port("port", ships)?;
        Ok(sim)
    }
}

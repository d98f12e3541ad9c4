//! Logical time control and random number generation for deterministic runs.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::actors::ActorId;

/// One discrete unit of simulated time.
pub type Tick = u64;

/// Logical clock driving the simulation.
///
/// Holds the current integer tick and the ordered list of actors
/// subscribed to tick advances. Time only moves forward, one tick per
/// advance, and is independent of wall-clock time. The clock is passed
/// explicitly to the simulation at construction; there is no global
/// instance.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    current_tick: Tick,
    subscribers: Vec<ActorId>,
}

impl SimClock {
    /// Creates a clock starting at tick zero with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current tick.
    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    /// Advances the clock by exactly one tick and returns the new tick.
    ///
    /// Subscriber reactions are fanned out by the simulation after this
    /// returns, in subscription order.
    pub fn advance(&mut self) -> Tick {
        self.current_tick += 1;
        self.current_tick
    }

    /// Registers an actor to be notified after every future advance.
    ///
    /// Subscriptions are never replayed for past advances and cannot be
    /// removed; actors live for the whole simulation.
    pub fn subscribe(&mut self, actor: ActorId) {
        self.subscribers.push(actor);
    }

    /// Returns the subscribers in subscription order.
    pub fn subscribers(&self) -> &[ActorId] {
        &self.subscribers
    }
}

/// Deterministic random number generator for reproducible scenarios.
///
/// Uses ChaCha8 for fast, high-quality pseudorandom numbers with
/// seed-based generation. Only scenario construction draws from it;
/// the engine itself is randomness-free.
#[derive(Debug)]
pub struct DeterministicRng {
    rng: ChaCha8Rng,
    seed: u64,
}

impl DeterministicRng {
    /// Creates deterministic RNG from seed value.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Returns the seed used for this RNG.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generates random number in range [min, max).
    pub fn random_range(&mut self, min: u64, max: u64) -> u64 {
        if min >= max {
            return min;
        }
        min + (self.rng.next_u64() % (max - min))
    }

    /// Selects random element from slice.
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        if slice.is_empty() {
            None
        } else {
            let index = self.random_range(0, slice.len() as u64) as usize;
            Some(&slice[index])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_advances_one_tick_at_a_time() {
        let mut clock = SimClock::new();
        assert_eq!(clock.current_tick(), 0);

        for expected in 1..=10 {
            assert_eq!(clock.advance(), expected);
        }
        assert_eq!(clock.current_tick(), 10);
    }

    #[test]
    fn test_subscription_order_is_preserved() {
        let mut clock = SimClock::new();
        clock.subscribe(ActorId::new(2));
        clock.subscribe(ActorId::new(0));
        clock.subscribe(ActorId::new(1));

        let order: Vec<usize> = clock.subscribers().iter().map(|id| id.index()).collect();
        assert_eq!(order, vec![2, 0, 1]);
    }

    #[test]
    fn test_deterministic_rng_reproducibility() {
        let seed = 12345;
        let mut rng1 = DeterministicRng::from_seed(seed);
        let mut rng2 = DeterministicRng::from_seed(seed);

        let values1: Vec<u64> = (0..10).map(|_| rng1.random_range(0, 100)).collect();
        let values2: Vec<u64> = (0..10).map(|_| rng2.random_range(0, 100)).collect();

        assert_eq!(values1, values2);
    }

    #[test]
    fn test_rng_choose_from_empty_slice() {
        let mut rng = DeterministicRng::from_seed(7);
        let empty: [u32; 0] = [];
        assert!(rng.choose(&empty).is_none());
    }
}

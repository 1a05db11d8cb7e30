//! Food placement by rejection sampling.

use std::collections::HashSet;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::{Cell, GridConfig};

/// Picks free cells uniformly at random.
///
/// Generic over the generator so tests can pin a seed; the default is a
/// [`Pcg32`] seeded from the thread RNG.
#[derive(Clone, Debug)]
pub struct FoodSpawner<R = Pcg32> {
    rng: R,
}

impl FoodSpawner<Pcg32> {
    pub fn new() -> Self {
        FoodSpawner { rng: Pcg32::from_rng(&mut rand::rng()) }
    }

    /// Deterministic spawner for replays and tests.
    pub fn seeded(seed: u64) -> Self {
        FoodSpawner { rng: Pcg32::seed_from_u64(seed) }
    }
}

impl Default for FoodSpawner<Pcg32> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> FoodSpawner<R> {
    pub fn with_rng(rng: R) -> Self {
        FoodSpawner { rng }
    }

    /// Sample a cell inside `config`'s bounds that is not in `occupied`.
    ///
    /// Returns `None` when `occupied` already covers the whole grid; sampling
    /// would never terminate otherwise.
    pub fn spawn<I>(&mut self, config: &GridConfig, occupied: I) -> Option<Cell>
    where
        I: IntoIterator<Item = Cell>,
    {
        let occupied: HashSet<Cell> = occupied
            .into_iter()
            .filter(|&c| config.contains(c))
            .collect();
        if occupied.len() >= config.cell_count() {
            return None;
        }

        loop {
            let cell = Cell::new(
                self.rng.random_range(0..config.width),
                self.rng.random_range(0..config.height),
            );
            if !occupied.contains(&cell) {
                return Some(cell);
            }
        }
    }
}

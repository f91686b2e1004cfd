use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};

/// Seeded runs are predictable; unseeded ones draw from the thread RNG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RandMode {
    Predictable,
    RandomUniform,
}

/// Random source behind `GetRandomNumber`.
pub struct ScummRand {
    rng: Box<dyn RngCore>,
    rand_mode: RandMode,
}

impl ScummRand {
    pub fn new_uniform() -> ScummRand {
        ScummRand {
            rng: Box::new(rand::thread_rng()),
            rand_mode: RandMode::RandomUniform,
        }
    }

    pub fn new_predictable(seed: u64) -> ScummRand {
        ScummRand {
            rng: Box::new(StdRng::seed_from_u64(seed)),
            rand_mode: RandMode::Predictable,
        }
    }

    /// Seeded when a seed is given, uniform otherwise.
    pub fn from_seed(seed: Option<u64>) -> ScummRand {
        match seed {
            Some(seed) => ScummRand::new_predictable(seed),
            None => ScummRand::new_uniform(),
        }
    }

    pub fn mode(&self) -> RandMode {
        self.rand_mode
    }

    /// Uniform value in `0..=max`
    pub fn gen_inclusive(&mut self, max: u16) -> u16 {
        self.rng.gen_range(0..=max)
    }
}

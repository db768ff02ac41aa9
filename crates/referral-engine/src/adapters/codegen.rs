//! Random code candidate generation.

use crate::domain::code::{self, CODE_ALPHABET, GENERATED_SUFFIX_LEN};
use crate::ports::outbound::CodeGenerator;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default candidate source: uniform draws from the code alphabet.
pub struct RandomCodeGenerator {
    rng: StdRng,
}

impl RandomCodeGenerator {
    /// Seed from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator for reproducible tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomCodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn next_candidate(&mut self) -> String {
        let suffix: String = (0..GENERATED_SUFFIX_LEN)
            .map(|_| {
                let idx = self.rng.gen_range(0..CODE_ALPHABET.len());
                CODE_ALPHABET[idx] as char
            })
            .collect();
        code::assemble(&suffix)
    }
}

use std::collections::BTreeSet;
use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::domain::{BaselineVector, CandidateScenario, InterventionDimension};

/// Largest dimension count enumerated exhaustively by default.
pub const DEFAULT_EXHAUSTIVE_LIMIT: usize = 10;

/// Hard ceiling on exhaustive enumeration regardless of policy (2^16 - 1 candidates).
pub const MAX_EXHAUSTIVE_DIMENSIONS: usize = 16;

/// Strategy used once the dimension count exceeds the exhaustive limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackStrategy {
    /// One candidate per dimension with only that flag on.
    SingleFlag,
    /// Up to `samples` distinct random assignments drawn from a seeded generator.
    Sampled { samples: usize, seed: u64 },
}

impl fmt::Display for FallbackStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackStrategy::SingleFlag => f.write_str("single_flag"),
            FallbackStrategy::Sampled { samples, seed } => {
                write!(f, "sampled(samples={samples}, seed={seed})")
            }
        }
    }
}

/// Chooses between full combinatorial search and the fallback strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumerationPolicy {
    pub exhaustive_limit: usize,
    pub fallback: FallbackStrategy,
}

impl Default for EnumerationPolicy {
    fn default() -> Self {
        Self {
            exhaustive_limit: DEFAULT_EXHAUSTIVE_LIMIT,
            fallback: FallbackStrategy::SingleFlag,
        }
    }
}

/// Which enumeration a generator will actually run for its dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enumeration {
    Exhaustive,
    Fallback(FallbackStrategy),
}

/// Derives candidate intervention scenarios from a baseline vector.
#[derive(Debug, Clone)]
pub struct ScenarioGenerator {
    dimensions: Vec<InterventionDimension>,
    policy: EnumerationPolicy,
}

impl ScenarioGenerator {
    /// Duplicate dimensions are dropped, keeping the first occurrence.
    pub fn new(dimensions: Vec<InterventionDimension>, policy: EnumerationPolicy) -> Self {
        let mut seen = BTreeSet::new();
        let dimensions = dimensions
            .into_iter()
            .filter(|dimension| seen.insert(*dimension))
            .collect();
        Self { dimensions, policy }
    }

    pub fn standard() -> Self {
        Self::new(InterventionDimension::ALL.to_vec(), EnumerationPolicy::default())
    }

    pub fn dimensions(&self) -> &[InterventionDimension] {
        &self.dimensions
    }

    pub fn policy(&self) -> EnumerationPolicy {
        self.policy
    }

    pub fn enumeration(&self) -> Enumeration {
        let limit = self.policy.exhaustive_limit.min(MAX_EXHAUSTIVE_DIMENSIONS);
        if self.dimensions.len() <= limit {
            Enumeration::Exhaustive
        } else {
            Enumeration::Fallback(self.policy.fallback)
        }
    }

    /// Candidates in a fixed generation order. The all-off assignment is never
    /// produced; it is the baseline and is scored separately.
    pub fn generate(&self, baseline: &BaselineVector) -> Vec<CandidateScenario> {
        let assignments = match self.enumeration() {
            Enumeration::Exhaustive => self.exhaustive(),
            Enumeration::Fallback(FallbackStrategy::SingleFlag) => self.single_flag(),
            Enumeration::Fallback(FallbackStrategy::Sampled { samples, seed }) => {
                self.sampled(samples, seed)
            }
        };

        assignments
            .into_iter()
            .enumerate()
            .map(|(ordinal, enabled)| CandidateScenario::new(ordinal, baseline, enabled))
            .collect()
    }

    fn select(&self, bits: impl Fn(usize) -> bool) -> Vec<InterventionDimension> {
        self.dimensions
            .iter()
            .enumerate()
            .filter(|(index, _)| bits(*index))
            .map(|(_, dimension)| *dimension)
            .collect()
    }

    fn exhaustive(&self) -> Vec<Vec<InterventionDimension>> {
        let total = 1u64 << self.dimensions.len();
        (1..total)
            .map(|mask| self.select(|index| mask & (1 << index) != 0))
            .collect()
    }

    fn single_flag(&self) -> Vec<Vec<InterventionDimension>> {
        self.dimensions.iter().map(|dimension| vec![*dimension]).collect()
    }

    fn sampled(&self, samples: usize, seed: u64) -> Vec<Vec<InterventionDimension>> {
        let count = self.dimensions.len();
        if count == 0 {
            return Vec::new();
        }
        let available = 1u64
            .checked_shl(count as u32)
            .map(|total| (total - 1).min(usize::MAX as u64) as usize)
            .unwrap_or(usize::MAX);
        let target = samples.min(available);
        let max_attempts = target.saturating_mul(16).max(64);

        let mut rng = StdRng::seed_from_u64(seed);
        let mut seen = BTreeSet::new();
        let mut assignments = Vec::with_capacity(target);
        let mut attempts = 0;
        while assignments.len() < target && attempts < max_attempts {
            attempts += 1;
            let bits: Vec<bool> = (0..count).map(|_| rng.gen_bool(0.5)).collect();
            if !bits.iter().any(|bit| *bit) || !seen.insert(bits.clone()) {
                continue;
            }
            assignments.push(self.select(|index| bits[index]));
        }
        assignments
    }
}

impl Default for ScenarioGenerator {
    fn default() -> Self {
        Self::standard()
    }
}

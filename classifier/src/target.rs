//! Random choice of the next hold-to-complete target.
//!
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use smallvec::SmallVec;

pub struct TargetPicker {
    rng: StdRng,
}

impl TargetPicker {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic picker, for tests and reproducible demo runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Pick uniformly among `labels` excluding `current`.
    ///
    /// A single draw over the eligible labels, so it terminates for any label
    /// set. If `current` is the only label it is kept.
    pub fn pick<'a>(&mut self, labels: &'a [String], current: Option<&str>) -> Option<&'a str> {
        let eligible: SmallVec<[&String; 8]> = labels
            .iter()
            .filter(|label| Some(label.as_str()) != current)
            .collect();

        match eligible.choose(&mut self.rng).copied() {
            Some(label) => Some(label.as_str()),
            None => {
                if !labels.is_empty() {
                    log::warn!("Only one target label available, keeping {:?}", current);
                }
                labels.first().map(String::as_str)
            }
        }
    }
}

impl Default for TargetPicker {
    fn default() -> Self {
        Self::from_entropy()
    }
}

use std::collections::VecDeque;

/// Uniform integer source consumed by the turn engine.
///
/// Implementations backed by a real generator live in the services crate so
/// the core stays free of RNG dependencies.
pub trait RandomSource {
    /// Uniform integer in `low..=high`. Callers guarantee `low <= high`.
    fn in_range(&mut self, low: u32, high: u32) -> u32;

    /// Uniform index in `0..len`. Callers guarantee `len > 0`.
    fn pick_index(&mut self, len: usize) -> usize {
        let high = u32::try_from(len.saturating_sub(1)).unwrap_or(u32::MAX);
        self.in_range(0, high) as usize
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn in_range(&mut self, low: u32, high: u32) -> u32 {
        (**self).in_range(low, high)
    }
}

/// Replays a fixed list of values, clamped into the requested range.
///
/// Once the script runs out every draw returns `low`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    values: VecDeque<u32>,
}

impl ScriptedRandom {
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = u32>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    /// Script a round that ends with exactly `weights`.
    ///
    /// Emits the total, one index per unit of weight, then `0` for every
    /// highlight colour draw.
    #[must_use]
    pub fn for_weights(weights: &[u32]) -> Self {
        let mut script = Self::default();
        script.push_weights(weights);
        script
    }

    /// Append another round to the script.
    pub fn push_weights(&mut self, weights: &[u32]) {
        let total: u32 = weights.iter().sum();
        self.values.push_back(total);
        for (index, weight) in weights.iter().enumerate() {
            let index = u32::try_from(index).unwrap_or(u32::MAX);
            for _ in 0..*weight {
                self.values.push_back(index);
            }
        }
        for _ in weights.iter().filter(|w| **w > 0) {
            self.values.push_back(0);
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn in_range(&mut self, low: u32, high: u32) -> u32 {
        self.values
            .pop_front()
            .map_or(low, |value| value.clamp(low, high))
    }
}

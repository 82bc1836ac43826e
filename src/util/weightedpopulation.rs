//! Weighted random population.
//!
//! A [`WeightedPopulation`] is a collection of element/weight pairs. The
//! relative weights are used as the probability of sampling the associated
//! element. Sampling walks a table of cumulative probability upper bounds
//! (the "range table") built from the weights.
//!
//! # Example
//!
//! ```
//! use preloadkit::util::weightedpopulation::WeightedPopulation;
//!
//! let mut population = WeightedPopulation::with_rng(fastrand::Rng::with_seed(7));
//! population.add_element("common", 3.0);
//! population.add_element("rare", 1.0);
//! let picked = population.sample().unwrap();
//! assert!(picked == "common" || picked == "rare");
//! ```

use crate::error::PreloadError;
use fastrand::Rng;

/// Collection of elements with relative sampling weights.
///
/// Insertion order is preserved and decides tie-breaks when walking the
/// range table. Weights of zero or less are accepted; such elements are
/// never drawn while another element still carries positive weight.
#[derive(Debug, Clone)]
pub struct WeightedPopulation<T> {
    weighted_elements: Vec<(T, f64)>,
    /// Cached range table over the whole population. `None` after any
    /// `add_element` until the next full-population sample.
    ranges: Option<Vec<f64>>,
    weight_total: f64,
    rng: Rng,
}

impl<T> Default for WeightedPopulation<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WeightedPopulation<T> {
    /// Create an empty population with an entropy-seeded generator.
    pub fn new() -> Self {
        Self::with_rng(Rng::new())
    }

    /// Create an empty population drawing from the given generator.
    pub fn with_rng(rng: Rng) -> Self {
        Self {
            weighted_elements: Vec::new(),
            ranges: None,
            weight_total: 0.0,
            rng,
        }
    }

    /// Add `element` with the given weight.
    pub fn add_element(&mut self, element: T, weight: f64) {
        self.weighted_elements.push((element, weight));
        self.weight_total += weight;
        self.ranges = None;
    }

    pub fn len(&self) -> usize {
        self.weighted_elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weighted_elements.is_empty()
    }

    /// Sum of all weights added so far.
    pub fn weight_total(&self) -> f64 {
        self.weight_total
    }

    /// Element/weight pairs in insertion order.
    pub fn elements(&self) -> &[(T, f64)] {
        &self.weighted_elements
    }

    /// Index of one element drawn from the whole population.
    ///
    /// Uses the cached range table, rebuilding it if elements were added
    /// since the last draw.
    pub fn sample_index(&mut self) -> Result<usize, PreloadError> {
        if self.weighted_elements.is_empty() {
            return Err(PreloadError::invalid_state(
                "cannot sample an empty weighted population",
            ));
        }
        if self.weight_total <= 0.0 {
            return Err(PreloadError::invalid_state(format!(
                "total weight must be positive to sample, got {}",
                self.weight_total
            )));
        }
        if self.ranges.is_none() {
            self.ranges = Some(make_ranges(
                self.weighted_elements.iter().map(|(_, w)| *w),
                self.weight_total,
            ));
        }
        let random = self.rng.f64();
        // Checked above; the table was just filled.
        let ranges = self.ranges.as_deref().unwrap_or_default();
        Ok(pick(ranges, random))
    }

    /// Index into `subset` of one element drawn from just those pairs.
    ///
    /// The range table is built fresh for the subset and not cached.
    pub fn sample_subset_index<U>(&mut self, subset: &[(U, f64)]) -> Result<usize, PreloadError> {
        if subset.is_empty() {
            return Err(PreloadError::invalid_state(
                "cannot sample an empty weighted subset",
            ));
        }
        let total: f64 = subset.iter().map(|(_, w)| *w).sum();
        if total <= 0.0 {
            return Err(PreloadError::invalid_state(format!(
                "total weight must be positive to sample, got {}",
                total
            )));
        }
        let ranges = make_ranges(subset.iter().map(|(_, w)| *w), total);
        Ok(pick(&ranges, self.rng.f64()))
    }
}

impl<T: Clone> WeightedPopulation<T> {
    /// Draw one element from the whole population.
    pub fn sample(&mut self) -> Result<T, PreloadError> {
        let index = self.sample_index()?;
        Ok(self.weighted_elements[index].0.clone())
    }

    /// Draw one element from the given element/weight pairs.
    pub fn sample_subset(&mut self, subset: &[(T, f64)]) -> Result<T, PreloadError> {
        let index = self.sample_subset_index(subset)?;
        Ok(subset[index].0.clone())
    }

    /// Draw `num_to_sample` elements independently. The same element may
    /// appear several times, so the result can be larger than the population.
    pub fn sample_with_replacement(&mut self, num_to_sample: usize) -> Result<Vec<T>, PreloadError> {
        let mut samples = Vec::with_capacity(num_to_sample);
        for _ in 0..num_to_sample {
            samples.push(self.sample()?);
        }
        Ok(samples)
    }

    /// Draw up to `num_to_sample` distinct elements.
    ///
    /// Each draw removes the chosen element from a working copy, so later
    /// draws are weighted by the elements that remain. The result holds
    /// `min(num_to_sample, len())` elements. Once only zero-weight elements
    /// remain they are drawn uniformly.
    pub fn sample_without_replacement(
        &mut self,
        num_to_sample: usize,
    ) -> Result<Vec<T>, PreloadError> {
        let num_to_sample = num_to_sample.min(self.weighted_elements.len());
        if num_to_sample > 0 && self.weight_total <= 0.0 {
            return Err(PreloadError::invalid_state(format!(
                "total weight must be positive to sample, got {}",
                self.weight_total
            )));
        }

        let mut remaining: Vec<(usize, f64)> = self
            .weighted_elements
            .iter()
            .enumerate()
            .map(|(i, (_, w))| (i, *w))
            .collect();
        let mut samples = Vec::with_capacity(num_to_sample);
        for _ in 0..num_to_sample {
            let position = match self.sample_subset_index(&remaining) {
                Ok(position) => position,
                Err(_) => self.rng.usize(..remaining.len()),
            };
            let (index, _) = remaining.remove(position);
            samples.push(self.weighted_elements[index].0.clone());
        }
        Ok(samples)
    }
}

/// Cumulative upper bounds for the given weights, normalized by `total`.
fn make_ranges(weights: impl Iterator<Item = f64>, total: f64) -> Vec<f64> {
    let mut current = 0.0;
    weights
        .map(|weight| {
            current += weight / total;
            current
        })
        .collect()
}

/// First index whose upper bound exceeds `random`. Rounding can leave the
/// last bound slightly below 1.0; such draws select the last element.
fn pick(ranges: &[f64], random: f64) -> usize {
    ranges
        .iter()
        .position(|&upper| random < upper)
        .unwrap_or(ranges.len().saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    fn seeded<T>() -> WeightedPopulation<T> {
        WeightedPopulation::with_rng(Rng::with_seed(0x5eed))
    }

    #[test]
    fn test_sample_empty_population_is_invalid_state() {
        let mut population: WeightedPopulation<&str> = seeded();
        assert!(matches!(
            population.sample(),
            Err(PreloadError::InvalidState(_))
        ));
        assert!(population.sample_with_replacement(3).is_err());
    }

    #[test]
    fn test_sample_zero_total_weight_is_invalid_state() {
        let mut population = seeded();
        population.add_element("a", 0.0);
        population.add_element("b", 0.0);
        assert!(matches!(
            population.sample(),
            Err(PreloadError::InvalidState(_))
        ));
    }

    #[test]
    fn test_sample_returns_member() {
        let mut population = seeded();
        population.add_element("a", 1.0);
        population.add_element("b", 2.0);
        population.add_element("c", 0.5);
        for _ in 0..500 {
            let s = population.sample().unwrap();
            assert!(["a", "b", "c"].contains(&s));
        }
    }

    #[test]
    fn test_sample_proportional_to_weight() {
        let mut population = seeded();
        population.add_element("light", 1.0);
        population.add_element("heavy", 3.0);
        let draws = 10_000;
        let heavy = population
            .sample_with_replacement(draws)
            .unwrap()
            .into_iter()
            .filter(|s| *s == "heavy")
            .count();
        let ratio = heavy as f64 / draws as f64;
        assert!(
            (ratio - 0.75).abs() < 0.02,
            "heavy ratio {} should be close to 0.75",
            ratio
        );
    }

    #[test]
    fn test_zero_weight_element_never_drawn() {
        let mut population = seeded();
        population.add_element("never", 0.0);
        population.add_element("always", 2.0);
        for _ in 0..1_000 {
            assert_eq!(population.sample().unwrap(), "always");
        }
    }

    #[test]
    fn test_add_element_invalidates_ranges() {
        let mut population = seeded();
        population.add_element("a", 1.0);
        assert_eq!(population.sample().unwrap(), "a");
        assert!(population.ranges.is_some());

        population.add_element("b", 1_000_000.0);
        assert!(population.ranges.is_none());
        let b_count = (0..200)
            .filter(|_| population.sample().unwrap() == "b")
            .count();
        assert!(b_count > 190);
    }

    #[test]
    fn test_pick_clamps_to_last_element() {
        // Rounding leaves the last bound just under 1.0.
        let ranges = [0.3, 0.6, 0.999_999_9];
        assert_eq!(pick(&ranges, 0.999_999_95), 2);
        assert_eq!(pick(&ranges, 0.0), 0);
        assert_eq!(pick(&ranges, 0.3), 1);
    }

    #[test]
    fn test_sample_subset_uses_only_subset() {
        let mut population = seeded();
        population.add_element("a", 100.0);
        let subset = vec![("x", 1.0), ("y", 1.0)];
        for _ in 0..100 {
            let s = population.sample_subset(&subset).unwrap();
            assert!(s == "x" || s == "y");
        }
        // Subset draws do not touch the cached table.
        assert!(population.ranges.is_none());
    }

    #[test]
    fn test_sample_with_replacement_allows_repeats() {
        let mut population = seeded();
        population.add_element(1, 1.0);
        population.add_element(2, 1.0);
        let samples = population.sample_with_replacement(10).unwrap();
        assert_eq!(samples.len(), 10);
        let distinct: FxHashSet<_> = samples.iter().collect();
        assert!(distinct.len() <= 2);
    }

    #[test]
    fn test_sample_without_replacement_distinct() {
        let mut population = seeded();
        for i in 0..10 {
            population.add_element(i, (i + 1) as f64);
        }
        for n in [0, 1, 5, 10, 25] {
            let samples = population.sample_without_replacement(n).unwrap();
            assert_eq!(samples.len(), n.min(10));
            let distinct: FxHashSet<_> = samples.iter().collect();
            assert_eq!(distinct.len(), samples.len());
            assert!(samples.iter().all(|s| (0..10).contains(s)));
        }
    }

    #[test]
    fn test_sample_without_replacement_reweights_remaining() {
        let mut population = seeded();
        population.add_element("light_a", 1.0);
        population.add_element("light_b", 1.0);
        population.add_element("heavy", 98.0);

        let trials = 2000;
        let mut heavy_first = 0;
        let mut light_second = [0usize; 2];
        for _ in 0..trials {
            let samples = population.sample_without_replacement(2).unwrap();
            assert_eq!(samples.len(), 2);
            assert_ne!(samples[0], samples[1]);
            if samples[0] == "heavy" {
                heavy_first += 1;
                match samples[1] {
                    "light_a" => light_second[0] += 1,
                    "light_b" => light_second[1] += 1,
                    other => panic!("unexpected second draw {}", other),
                }
            }
        }
        let ratio = heavy_first as f64 / trials as f64;
        assert!(ratio > 0.95, "heavy drawn first in {:.3} of trials", ratio);
        // With the heavy element gone the light ones split evenly.
        for count in light_second {
            let share = count as f64 / heavy_first as f64;
            assert!((share - 0.5).abs() < 0.08, "light share {:.3}", share);
        }
    }

    #[test]
    fn test_sample_without_replacement_exhausts_zero_weights() {
        let mut population = seeded();
        population.add_element("weighted", 1.0);
        population.add_element("zero", 0.0);
        let samples = population.sample_without_replacement(2).unwrap();
        assert_eq!(samples, vec!["weighted", "zero"]);
    }

    #[test]
    fn test_sample_without_replacement_empty_population() {
        let mut population: WeightedPopulation<u8> = seeded();
        assert!(population.sample_without_replacement(4).unwrap().is_empty());
    }
}

//! Per-level filters and combiners for embedded (multilevel) nets, spec
//! §9's "filters for embedded lattices (per-level selectors and
//! combiners)".
//!
//! A [`MeritFilterList`] narrows a per-level merit vector (as produced by
//! [`crate::tvalue::compute_t_value`] or a level-wise figure evaluation) to
//! a selected level range, then folds the selection down to one scalar via
//! a [`LevelCombiner`].

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum LevelCombiner {
    Sum,
    Max,
    WeightedSum(Vec<f64>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeritFilterList {
    pub min_level: usize,
    pub max_level: Option<usize>,
    pub combiner: LevelCombiner,
}

impl MeritFilterList {
    pub fn new(combiner: LevelCombiner) -> Self {
        Self {
            min_level: 0,
            max_level: None,
            combiner,
        }
    }

    pub fn with_range(mut self, min_level: usize, max_level: Option<usize>) -> Self {
        self.min_level = min_level;
        self.max_level = max_level;
        self
    }

    /// Folds `per_level_merit` (indexed by embedding level, starting at 0)
    /// down to a single scalar.
    pub fn apply(&self, per_level_merit: &[f64]) -> Result<f64> {
        let selected: Vec<(usize, f64)> = per_level_merit
            .iter()
            .enumerate()
            .filter(|(level, _)| *level >= self.min_level && self.max_level.map_or(true, |m| *level <= m))
            .map(|(level, &merit)| (level, merit))
            .collect();

        if selected.is_empty() {
            return Err(Error::Configuration("filter range excludes every level".into()));
        }

        match &self.combiner {
            LevelCombiner::Sum => Ok(selected.iter().map(|(_, m)| m).sum()),
            LevelCombiner::Max => Ok(selected.iter().map(|(_, m)| *m).fold(f64::NEG_INFINITY, f64::max)),
            LevelCombiner::WeightedSum(weights) => {
                let mut total = 0.0;
                for (level, merit) in &selected {
                    let w = weights.get(*level).ok_or_else(|| {
                        Error::Configuration(format!("no combiner weight for level {level}"))
                    })?;
                    total += w * merit;
                }
                Ok(total)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_combiner_adds_selected_levels() {
        let filters = MeritFilterList::new(LevelCombiner::Sum);
        let merit = filters.apply(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(merit, 6.0);
    }

    #[test]
    fn range_restricts_to_selected_levels() {
        let filters = MeritFilterList::new(LevelCombiner::Sum).with_range(1, Some(2));
        let merit = filters.apply(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(merit, 5.0);
    }

    #[test]
    fn max_combiner_picks_worst_level() {
        let filters = MeritFilterList::new(LevelCombiner::Max);
        let merit = filters.apply(&[1.0, 5.0, 2.0]).unwrap();
        assert_eq!(merit, 5.0);
    }

    #[test]
    fn empty_selection_is_a_configuration_error() {
        let filters = MeritFilterList::new(LevelCombiner::Sum).with_range(5, Some(6));
        assert!(filters.apply(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn weighted_sum_requires_a_weight_per_selected_level() {
        let filters = MeritFilterList::new(LevelCombiner::WeightedSum(vec![1.0]));
        assert!(filters.apply(&[1.0, 2.0]).is_err());
    }
}

//! Weighted tables
//!
//! Ordered `(value, weight)` pairs with a running total. Draw order is part of
//! the replay contract: the cursor `draw(total)` selects the first value whose
//! cumulative weight exceeds it, so reordering a table changes every recorded
//! outcome that used it.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::random::RandomSource;

/// A weighted selection table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(T, u64)>", into = "Vec<(T, u64)>")]
pub struct WeightTable<T: Clone> {
    vals: Vec<T>,
    weights: Vec<u64>,
    total_weight: u64,
}

impl<T: Clone> WeightTable<T> {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            vals: Vec::new(),
            weights: Vec::new(),
            total_weight: 0,
        }
    }

    /// A table that always yields `value`
    pub fn single(value: T) -> Self {
        Self {
            vals: vec![value],
            weights: vec![1],
            total_weight: 1,
        }
    }

    /// Append a value; fails when the total weight would overflow
    pub fn push(&mut self, value: T, weight: u64) -> EngineResult<()> {
        self.total_weight = self
            .total_weight
            .checked_add(weight)
            .ok_or(EngineError::WeightOverflow)?;
        self.vals.push(value);
        self.weights.push(weight);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.vals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vals.is_empty()
    }

    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    pub fn values(&self) -> &[T] {
        &self.vals
    }

    pub fn weights(&self) -> &[u64] {
        &self.weights
    }

    /// Weighted draw, returning the value and its index
    pub fn draw(&self, src: &mut dyn RandomSource) -> EngineResult<(T, usize)> {
        if self.total_weight == 0 {
            return Err(EngineError::EmptyWeightTable);
        }
        if self.vals.len() == 1 {
            return Ok((self.vals[0].clone(), 0));
        }

        let cursor = src.draw(self.total_weight)?;
        let mut acc = 0u64;
        for (i, w) in self.weights.iter().enumerate() {
            acc += w;
            if cursor < acc {
                return Ok((self.vals[i].clone(), i));
            }
        }

        // cursor < total_weight, so the loop always returns
        Err(EngineError::EmptyWeightTable)
    }

    fn recompute_total(&mut self) {
        self.total_weight = self.weights.iter().sum();
    }
}

impl<T: Clone + PartialEq> WeightTable<T> {
    /// Index of a value
    pub fn position(&self, value: &T) -> Option<usize> {
        self.vals.iter().position(|v| v == value)
    }

    /// Remove a value, returning its weight
    pub fn remove(&mut self, value: &T) -> EngineResult<u64> {
        let idx = self.position(value).ok_or(EngineError::ValueNotFound)?;
        self.vals.remove(idx);
        let weight = self.weights.remove(idx);
        self.recompute_total();
        Ok(weight)
    }

    /// Draw without replacement
    pub fn draw_and_remove(&mut self, src: &mut dyn RandomSource) -> EngineResult<(T, usize)> {
        let (value, idx) = self.draw(src)?;
        self.vals.remove(idx);
        self.weights.remove(idx);
        self.recompute_total();
        Ok((value, idx))
    }
}

impl<T: Clone> Default for WeightTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> TryFrom<Vec<(T, u64)>> for WeightTable<T> {
    type Error = EngineError;

    fn try_from(pairs: Vec<(T, u64)>) -> EngineResult<Self> {
        let mut table = Self::new();
        for (v, w) in pairs {
            table.push(v, w)?;
        }
        Ok(table)
    }
}

impl<T: Clone> From<WeightTable<T>> for Vec<(T, u64)> {
    fn from(table: WeightTable<T>) -> Self {
        table.vals.into_iter().zip(table.weights).collect()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ReplaySource;

    fn table() -> WeightTable<i64> {
        WeightTable::try_from(vec![(1, 10), (2, 30), (3, 60)]).unwrap()
    }

    #[test]
    fn test_draw_cumulative_boundaries() {
        let t = table();
        // cursor 9 -> first bucket, 10 -> second, 39 -> second, 40 -> third
        let mut src = ReplaySource::new(vec![0, 9, 10, 39, 40, 99]);
        let got: Vec<i64> = (0..6).map(|_| t.draw(&mut src).unwrap().0).collect();
        assert_eq!(got, vec![1, 1, 2, 2, 3, 3]);
    }

    #[test]
    fn test_single_entry_consumes_no_randomness() {
        let t = WeightTable::try_from(vec![("only", 5)]).unwrap();
        let mut src = ReplaySource::new(vec![]);
        assert_eq!(t.draw(&mut src).unwrap(), ("only", 0));
        assert_eq!(src.consumed(), 0);
    }

    #[test]
    fn test_zero_weight_entries_are_skipped() {
        let t = WeightTable::try_from(vec![(1, 0), (2, 5)]).unwrap();
        let mut src = ReplaySource::new(vec![0]);
        assert_eq!(t.draw(&mut src).unwrap(), (2, 1));
    }

    #[test]
    fn test_remove_updates_total() {
        let mut t = table();
        let before = t.total_weight();
        let w = t.remove(&2).unwrap();
        assert_eq!(w, 30);
        assert_eq!(t.total_weight(), before - 30);
        assert_eq!(t.total_weight(), t.weights().iter().sum::<u64>());
        assert!(matches!(t.remove(&2), Err(EngineError::ValueNotFound)));
    }

    #[test]
    fn test_exhausted_table_fails() {
        let mut t = table();
        for v in [1, 2, 3] {
            t.remove(&v).unwrap();
        }
        let mut src = ReplaySource::new(vec![0]);
        assert!(matches!(t.draw(&mut src), Err(EngineError::EmptyWeightTable)));
    }

    #[test]
    fn test_draw_and_remove_leaves_shared_table_intact() {
        let shared = table();
        let mut pool = shared.clone();
        let mut src = ReplaySource::new(vec![50, 0, 0]);
        let (first, _) = pool.draw_and_remove(&mut src).unwrap();
        assert_eq!(first, 3);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.total_weight(), 40);
        assert_eq!(shared.len(), 3);

        pool.draw_and_remove(&mut src).unwrap();
        let (last, _) = pool.draw_and_remove(&mut src).unwrap();
        assert_eq!(last, 2);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_source_error_propagates() {
        let t = table();
        let mut src = ReplaySource::new(vec![]);
        assert!(matches!(
            t.draw(&mut src),
            Err(EngineError::ExhaustedRandomSource(_))
        ));
    }

    #[test]
    fn test_serde_pairs() {
        let t: WeightTable<i64> = serde_json::from_str("[[5, 1], [7, 3]]").unwrap();
        assert_eq!(t.values(), &[5, 7]);
        assert_eq!(t.total_weight(), 4);
    }

    #[test]
    fn test_total_weight_overflow_is_rejected() {
        let mut t = WeightTable::try_from(vec![(1, u64::MAX - 1)]).unwrap();
        assert!(matches!(t.push(2, 2), Err(EngineError::WeightOverflow)));
        assert_eq!(t.len(), 1);
        assert_eq!(t.total_weight(), u64::MAX - 1);
        t.push(2, 1).unwrap();
        assert_eq!(t.total_weight(), u64::MAX);

        let json = format!("[[1, {}], [2, 1]]", u64::MAX);
        assert!(serde_json::from_str::<WeightTable<i64>>(&json).is_err());
    }

    #[test]
    fn test_draw_frequencies_follow_weights() {
        let t = table();
        let mut src = crate::random::ChaChaSource::seeded(99);
        let mut hits = [0u32; 3];
        let n = 60_000;
        for _ in 0..n {
            let (_, idx) = t.draw(&mut src).unwrap();
            hits[idx] += 1;
        }
        for (h, expected) in hits.iter().zip([0.1, 0.3, 0.6]) {
            approx::assert_abs_diff_eq!(*h as f64 / n as f64, expected, epsilon = 0.01);
        }
    }
}

//! Random sources
//!
//! The engine never owns a generator. Every probabilistic decision is a
//! synchronous call into a [`RandomSource`], which in production may be backed
//! by a remote service and in tests replays a recorded draw log.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::RandomSourceError;

/// Injected source of uniform integers
pub trait RandomSource {
    /// Draw a value in `0..upper`
    fn draw(&mut self, upper: u64) -> Result<u64, RandomSourceError>;
}

impl<S: RandomSource + ?Sized> RandomSource for &mut S {
    fn draw(&mut self, upper: u64) -> Result<u64, RandomSourceError> {
        (**self).draw(upper)
    }
}

/// Seeded ChaCha generator
pub struct ChaChaSource {
    rng: ChaCha8Rng,
}

impl ChaChaSource {
    /// Create a source with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Create a source seeded from the operating system
    pub fn from_os() -> Self {
        Self {
            rng: ChaCha8Rng::from_os_rng(),
        }
    }
}

impl RandomSource for ChaChaSource {
    fn draw(&mut self, upper: u64) -> Result<u64, RandomSourceError> {
        if upper == 0 {
            return Err(RandomSourceError::InvalidBound(upper));
        }
        Ok(self.rng.random_range(0..upper))
    }
}

/// One recorded draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub upper: u64,
    pub value: u64,
}

/// Replays a fixed list of values, in order
#[derive(Debug, Clone, Default)]
pub struct ReplaySource {
    values: Vec<u64>,
    cursor: usize,
}

impl ReplaySource {
    pub fn new(values: Vec<u64>) -> Self {
        Self { values, cursor: 0 }
    }

    /// Build from a recorded log
    pub fn from_records(records: &[DrawRecord]) -> Self {
        Self::new(records.iter().map(|r| r.value).collect())
    }

    /// Number of values consumed so far
    pub fn consumed(&self) -> usize {
        self.cursor
    }

    /// Values left to replay
    pub fn remaining(&self) -> usize {
        self.values.len() - self.cursor
    }
}

impl RandomSource for ReplaySource {
    fn draw(&mut self, upper: u64) -> Result<u64, RandomSourceError> {
        let value = *self
            .values
            .get(self.cursor)
            .ok_or(RandomSourceError::Exhausted(self.cursor))?;
        if value >= upper {
            return Err(RandomSourceError::OutOfRange { value, upper });
        }
        self.cursor += 1;
        Ok(value)
    }
}

/// Wraps a source and records every successful draw
pub struct RecordingSource<S> {
    inner: S,
    records: Vec<DrawRecord>,
}

impl<S: RandomSource> RecordingSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            records: Vec::new(),
        }
    }

    /// Recorded draws so far
    pub fn records(&self) -> &[DrawRecord] {
        &self.records
    }

    /// Take the log, leaving the recorder empty
    pub fn take_records(&mut self) -> Vec<DrawRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: RandomSource> RandomSource for RecordingSource<S> {
    fn draw(&mut self, upper: u64) -> Result<u64, RandomSourceError> {
        let value = self.inner.draw(upper)?;
        log::trace!("draw {} of {}", value, upper);
        self.records.push(DrawRecord { upper, value });
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_in_order() {
        let mut src = ReplaySource::new(vec![2, 0, 5]);
        assert_eq!(src.draw(3).unwrap(), 2);
        assert_eq!(src.draw(1).unwrap(), 0);
        assert_eq!(src.draw(10).unwrap(), 5);
        assert_eq!(src.draw(10), Err(RandomSourceError::Exhausted(3)));
    }

    #[test]
    fn test_replay_rejects_out_of_range() {
        let mut src = ReplaySource::new(vec![7]);
        assert_eq!(
            src.draw(5),
            Err(RandomSourceError::OutOfRange { value: 7, upper: 5 })
        );
        assert_eq!(src.consumed(), 0);
    }

    #[test]
    fn test_recording_roundtrips_through_replay() {
        let mut rec = RecordingSource::new(ChaChaSource::seeded(42));
        let drawn: Vec<u64> = (0..20).map(|i| rec.draw(10 + i).unwrap()).collect();

        let mut replay = ReplaySource::from_records(rec.records());
        let replayed: Vec<u64> = (0..20).map(|i| replay.draw(10 + i).unwrap()).collect();
        assert_eq!(drawn, replayed);
    }

    #[test]
    fn test_chacha_is_deterministic() {
        let mut a = ChaChaSource::seeded(7);
        let mut b = ChaChaSource::seeded(7);
        for _ in 0..50 {
            assert_eq!(a.draw(1000).unwrap(), b.draw(1000).unwrap());
        }
        assert!(a.draw(0).is_err());
    }
}

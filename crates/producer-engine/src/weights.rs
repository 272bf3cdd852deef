//! Weighted partition assignment.
//!
//! A [`PartitionWeights`] table splits the draw range `[0, 100)` into
//! consecutive half-open bands, one per partition. A draw is mapped to the
//! first band whose upper bound it is below, so the chosen partition depends
//! only on the table and the draw.

use crate::error::ProducerError;
use crate::random::RandomSource;
use std::collections::HashSet;

/// Exclusive upper bound of a draw.
pub const WEIGHT_SCALE: u64 = 100;

/// One band of the weight table: draws in `[previous upper, upper)` go to
/// `partition`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightBand {
    pub partition: i32,
    pub upper: u64,
}

const fn band(partition: i32, upper: u64) -> WeightBand {
    WeightBand { partition, upper }
}

/// Default skew: partitions 0, 3, 6 and 9 take 15% of traffic each, the
/// remaining eight partitions 5% each.
pub const DEFAULT_WEIGHTS: [WeightBand; 12] = [
    band(0, 15),
    band(3, 30),
    band(4, 35),
    band(5, 40),
    band(6, 55),
    band(9, 70),
    band(1, 75),
    band(2, 80),
    band(7, 85),
    band(8, 90),
    band(10, 95),
    band(11, 100),
];

/// Ordered, gap-free weight table over `[0, 100)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionWeights {
    bands: Vec<WeightBand>,
}

impl Default for PartitionWeights {
    fn default() -> Self {
        Self {
            bands: DEFAULT_WEIGHTS.to_vec(),
        }
    }
}

impl PartitionWeights {
    /// Build a table from bands in threshold order.
    ///
    /// Upper bounds must be strictly increasing and the last one must equal
    /// [`WEIGHT_SCALE`]. Each partition may appear once.
    pub fn new(bands: Vec<WeightBand>) -> Result<Self, ProducerError> {
        let Some(last) = bands.last() else {
            return Err(ProducerError::Config("weight table is empty".into()));
        };
        if last.upper != WEIGHT_SCALE {
            return Err(ProducerError::Config(format!(
                "weight table must end at {WEIGHT_SCALE}, ends at {}",
                last.upper
            )));
        }

        let mut lower = 0;
        let mut seen = HashSet::new();
        for b in &bands {
            if b.upper <= lower {
                return Err(ProducerError::Config(format!(
                    "weight band for partition {} has upper bound {} not above {lower}",
                    b.partition, b.upper
                )));
            }
            if b.partition < 0 {
                return Err(ProducerError::Config(format!(
                    "negative partition {} in weight table",
                    b.partition
                )));
            }
            if !seen.insert(b.partition) {
                return Err(ProducerError::Config(format!(
                    "partition {} appears more than once in weight table",
                    b.partition
                )));
            }
            lower = b.upper;
        }

        Ok(Self { bands })
    }

    /// Map a draw in `[0, 100)` to its partition.
    pub fn partition_for(&self, draw: u64) -> i32 {
        debug_assert!(draw < WEIGHT_SCALE, "draw {draw} outside [0, {WEIGHT_SCALE})");

        let mut lower = 0;
        for b in &self.bands {
            if draw >= lower && draw < b.upper {
                return b.partition;
            }
            lower = b.upper;
        }
        // Unreachable for validated tables and in-range draws.
        self.bands[self.bands.len() - 1].partition
    }

    /// Draw once from `entropy` and map the draw to a partition.
    pub fn choose<R: RandomSource + ?Sized>(&self, entropy: &mut R) -> i32 {
        self.partition_for(entropy.draw_below(WEIGHT_SCALE))
    }

    /// Share of traffic, in percent, routed to `partition`.
    pub fn share(&self, partition: i32) -> u64 {
        let mut lower = 0;
        for b in &self.bands {
            if b.partition == partition {
                return b.upper - lower;
            }
            lower = b.upper;
        }
        0
    }

    /// Highest partition index named by the table.
    pub fn max_partition(&self) -> i32 {
        self.bands.iter().map(|b| b.partition).max().unwrap_or(0)
    }

    /// Reject tables that would target partitions a topic of `partitions`
    /// partitions does not have.
    pub fn check_fits(&self, partitions: i32) -> Result<(), ProducerError> {
        let max = self.max_partition();
        if max >= partitions {
            return Err(ProducerError::Config(format!(
                "weight table targets partition {max} but the topic has only {partitions} partitions"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_every_draw_maps_to_a_partition() {
        let weights = PartitionWeights::default();
        for draw in 0..WEIGHT_SCALE {
            let partition = weights.partition_for(draw);
            assert!(
                (0..12).contains(&partition),
                "draw {draw} mapped to {partition}"
            );
        }
    }

    #[test]
    fn test_default_table_is_valid() {
        let weights = PartitionWeights::new(DEFAULT_WEIGHTS.to_vec()).unwrap();
        assert_eq!(weights, PartitionWeights::default());
        assert_eq!(weights.max_partition(), 11);
    }

    #[test]
    fn test_default_shares() {
        let weights = PartitionWeights::default();
        for hot in [0, 3, 6, 9] {
            assert_eq!(weights.share(hot), 15, "partition {hot}");
        }
        for cold in [1, 2, 4, 5, 7, 8, 10, 11] {
            assert_eq!(weights.share(cold), 5, "partition {cold}");
        }
        assert_eq!(weights.share(12), 0);

        let total: u64 = (0..12).map(|p| weights.share(p)).sum();
        assert_eq!(total, WEIGHT_SCALE);
    }

    #[test]
    fn test_band_boundaries() {
        let weights = PartitionWeights::default();
        assert_eq!(weights.partition_for(0), 0);
        assert_eq!(weights.partition_for(14), 0);
        assert_eq!(weights.partition_for(15), 3);
        assert_eq!(weights.partition_for(29), 3);
        assert_eq!(weights.partition_for(30), 4);
        assert_eq!(weights.partition_for(40), 6);
        assert_eq!(weights.partition_for(69), 9);
        assert_eq!(weights.partition_for(70), 1);
        assert_eq!(weights.partition_for(99), 11);
    }

    #[test]
    fn test_documented_draws() {
        let weights = PartitionWeights::default();
        let partitions: Vec<i32> = [5, 20, 50, 70, 95]
            .iter()
            .map(|d| weights.partition_for(*d))
            .collect();
        assert_eq!(partitions, vec![0, 3, 6, 1, 11]);
    }

    #[test]
    fn test_empirical_distribution() {
        let weights = PartitionWeights::default();
        let mut rng = StdRng::seed_from_u64(42);
        let draws = 200_000;
        let mut counts = [0u64; 12];
        for _ in 0..draws {
            counts[weights.choose(&mut rng) as usize] += 1;
        }

        for (partition, count) in counts.iter().enumerate() {
            let observed = *count as f64 / draws as f64;
            let expected = weights.share(partition as i32) as f64 / 100.0;
            assert!(
                (observed - expected).abs() < 0.01,
                "partition {partition}: observed {observed:.4}, expected {expected:.2}"
            );
        }
    }

    #[test]
    fn test_invalid_tables_are_rejected() {
        assert!(PartitionWeights::new(vec![]).is_err());
        // does not reach 100
        assert!(PartitionWeights::new(vec![band(0, 50), band(1, 90)]).is_err());
        // not increasing
        assert!(PartitionWeights::new(vec![band(0, 50), band(1, 50), band(2, 100)]).is_err());
        // duplicate partition
        assert!(PartitionWeights::new(vec![band(0, 50), band(0, 100)]).is_err());
        // negative partition
        assert!(PartitionWeights::new(vec![band(-1, 100)]).is_err());

        let two = PartitionWeights::new(vec![band(1, 80), band(0, 100)]).unwrap();
        assert_eq!(two.partition_for(79), 1);
        assert_eq!(two.partition_for(80), 0);
    }

    #[test]
    fn test_check_fits() {
        let weights = PartitionWeights::default();
        assert!(weights.check_fits(12).is_ok());
        assert!(weights.check_fits(24).is_ok());
        assert!(weights.check_fits(11).is_err());
    }
}

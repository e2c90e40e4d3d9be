//! Bounded FIFO of timestamped readings

use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// One buffered reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendSample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Fixed-capacity history. The oldest sample is evicted on overflow, so
/// `len() <= capacity()` always holds.
#[derive(Debug, Clone)]
pub struct HistoricalBuffer {
    samples: VecDeque<TrendSample>,
    capacity: usize,
}

impl HistoricalBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a reading. Returns the evicted sample, if any.
    pub fn push(&mut self, sample: TrendSample) -> Option<TrendSample> {
        let evicted = if self.samples.len() >= self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(sample);
        evicted
    }

    pub fn latest(&self) -> Option<&TrendSample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrendSample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn evicts_oldest_at_capacity() {
        let start = Utc::now();
        let mut buf = HistoricalBuffer::new(3);
        for i in 0..5 {
            let evicted = buf.push(TrendSample {
                timestamp: start + Duration::hours(i),
                value: i as f64,
            });
            assert!(buf.len() <= buf.capacity());
            if i >= 3 {
                assert_eq!(evicted.map(|s| s.value), Some((i - 3) as f64));
            } else {
                assert!(evicted.is_none());
            }
        }
        let values: Vec<f64> = buf.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![2.0, 3.0, 4.0]);
        assert_eq!(buf.latest().map(|s| s.value), Some(4.0));
    }

    #[test]
    fn zero_capacity_is_promoted_to_one() {
        let mut buf = HistoricalBuffer::new(0);
        buf.push(TrendSample { timestamp: Utc::now(), value: 1.0 });
        buf.push(TrendSample { timestamp: Utc::now(), value: 2.0 });
        assert_eq!(buf.len(), 1);
    }
}

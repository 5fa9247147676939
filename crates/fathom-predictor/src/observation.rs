//! Bounded ring buffers of raw observations (spec.md §4.3 "Observation model").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeObservation {
    pub checked_at: DateTime<Utc>,
    pub changed: bool,
    pub content_hash: Option<String>,
}

/// Push onto a `VecDeque`, evicting from the front once `cap` is exceeded.
pub fn push_bounded<T>(buffer: &mut VecDeque<T>, item: T, cap: usize) {
    buffer.push_back(item);
    while buffer.len() > cap {
        buffer.pop_front();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_past_capacity() {
        let mut buf = VecDeque::new();
        for i in 0..5 {
            push_bounded(&mut buf, i, 3);
        }
        assert_eq!(buf, VecDeque::from([2, 3, 4]));
    }
}

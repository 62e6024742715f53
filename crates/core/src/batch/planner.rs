//! Batch planning
//!
//! Splits an ordered sequence of records into bounded chunks. The planner
//! does not know service limits; callers pass the maximum they need.

use mixpanel_domain::{MixpanelError, Result};

/// A bounded slice of records sent in one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<T> {
    /// Zero-based position of this batch in the plan.
    pub index: usize,
    pub records: Vec<T>,
}

impl<T> Batch<T> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Split `records` into batches of at most `max_batch_size`.
///
/// Batch `i` holds records `[i * max, min((i + 1) * max, len))` in their
/// original order. An empty input yields no batches.
///
/// # Errors
/// Returns `MixpanelError::InvalidInput` when `max_batch_size` is zero.
pub fn split<T>(records: Vec<T>, max_batch_size: usize) -> Result<Vec<Batch<T>>> {
    if max_batch_size == 0 {
        return Err(MixpanelError::InvalidInput("max batch size must be positive".into()));
    }

    let mut batches = Vec::with_capacity(records.len().div_ceil(max_batch_size));
    let mut remaining = records.into_iter();
    loop {
        let chunk: Vec<T> = remaining.by_ref().take(max_batch_size).collect();
        if chunk.is_empty() {
            break;
        }
        batches.push(Batch { index: batches.len(), records: chunk });
    }
    Ok(batches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_batches() {
        let batches = split(Vec::<u32>::new(), 10).unwrap();
        assert!(batches.is_empty());
    }

    #[test]
    fn zero_max_is_rejected() {
        assert!(matches!(split(vec![1, 2, 3], 0), Err(MixpanelError::InvalidInput(_))));
    }

    #[test]
    fn sizes_and_order_hold_for_a_range_of_inputs() {
        for n in 0..=25usize {
            for max in 1..=7usize {
                let records: Vec<usize> = (0..n).collect();
                let batches = split(records.clone(), max).unwrap();

                assert_eq!(batches.len(), n.div_ceil(max), "n={n} max={max}");
                for (i, batch) in batches.iter().enumerate() {
                    assert_eq!(batch.index, i);
                    if i + 1 < batches.len() {
                        assert_eq!(batch.len(), max);
                    } else {
                        assert!(batch.len() <= max && !batch.is_empty());
                    }
                }
                let flattened: Vec<usize> =
                    batches.into_iter().flat_map(|batch| batch.records).collect();
                assert_eq!(flattened, records);
            }
        }
    }

    #[test]
    fn ingestion_ceiling_splits_evenly() {
        let batches = split((0..4001).collect::<Vec<_>>(), 2000).unwrap();
        let sizes: Vec<usize> = batches.iter().map(Batch::len).collect();
        assert_eq!(sizes, vec![2000, 2000, 1]);
    }
}

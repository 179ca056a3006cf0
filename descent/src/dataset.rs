use std::ops::Range;

use crate::error::{Error, Result};

/// An in-memory `(x₁, x₂) → y` sample set. The core never mutates it.
#[derive(Debug, Clone)]
pub struct Dataset {
    inputs: Vec<[f64; 2]>,
    targets: Vec<f64>,
}

impl Dataset {
    pub fn new(inputs: Vec<[f64; 2]>, targets: Vec<f64>) -> Result<Self> {
        if inputs.len() != targets.len() {
            return Err(Error::Dimension(format!(
                "{} inputs but {} targets",
                inputs.len(),
                targets.len()
            )));
        }
        Ok(Dataset { inputs, targets })
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn inputs(&self) -> &[[f64; 2]] {
        &self.inputs
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    /// The examples covered by `range`, in order.
    pub fn select(&self, range: &Range<usize>) -> (&[[f64; 2]], &[f64]) {
        (
            &self.inputs[range.clone()],
            &self.targets[range.clone()],
        )
    }
}

/// An ordered, disjoint partition of `0..count` into train, validation and
/// test index ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Range<usize>,
    pub validation: Range<usize>,
    pub test: Range<usize>,
}

impl Split {
    /// Cuts `0..count` at fixed fractional boundaries: the first
    /// `train_fraction` of the indices go to training, the next
    /// `validation_fraction` to validation, the remainder to test.
    pub fn by_fraction(count: usize, train_fraction: f64, validation_fraction: f64) -> Split {
        assert!((0.0..=1.0).contains(&train_fraction));
        assert!((0.0..=1.0).contains(&validation_fraction));
        assert!(train_fraction + validation_fraction <= 1.0);

        let train_end = (count as f64 * train_fraction).floor() as usize;
        let validation_end = train_end + (count as f64 * validation_fraction).floor() as usize;

        Split {
            train: 0..train_end,
            validation: train_end..validation_end,
            test: validation_end..count,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{Dataset, Split};
    use crate::error::Error;

    #[test]
    fn mismatched_lengths_are_rejected() {
        let err = Dataset::new(vec![[1.0, 2.0]], vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, Error::Dimension(_)));
    }

    #[test]
    fn select_returns_the_requested_slice() {
        let ds = Dataset::new(
            vec![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0]],
            vec![0.0, 1.0, 2.0, 3.0],
        )
        .unwrap();

        let (inputs, targets) = ds.select(&(1..3));
        assert_eq!(inputs, &[[1.0, 1.0], [2.0, 2.0]]);
        assert_eq!(targets, &[1.0, 2.0]);
    }

    #[test]
    fn reference_split_is_eighty_ten_ten() {
        let split = Split::by_fraction(100, 0.8, 0.1);

        assert_eq!(split.train, 0..80);
        assert_eq!(split.validation, 80..90);
        assert_eq!(split.test, 90..100);
    }

    #[test]
    fn remainder_goes_to_test() {
        let split = Split::by_fraction(10, 0.8, 0.1);

        assert_eq!(split.train, 0..8);
        assert_eq!(split.validation, 8..9);
        assert_eq!(split.test, 9..10);
    }

    proptest! {
        #[test]
        fn split_covers_every_index_exactly_once(count in 0_usize..500) {
            let split = Split::by_fraction(count, 0.8, 0.1);

            prop_assert_eq!(split.train.start, 0);
            prop_assert_eq!(split.train.end, split.validation.start);
            prop_assert_eq!(split.validation.end, split.test.start);
            prop_assert_eq!(split.test.end, count);
        }
    }
}

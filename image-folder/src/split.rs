//! Training/validation partitioning.

use crate::common::*;

/// A validation fraction strictly between 0 and 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ValidationSplit(R64);

impl ValidationSplit {
    pub fn to_r64(&self) -> R64 {
        self.0
    }

    pub fn to_f64(&self) -> f64 {
        self.0.raw()
    }

    /// The number of validation records out of `num_records`, rounded down.
    pub fn num_validation(&self, num_records: usize) -> usize {
        (self.0.raw() * num_records as f64).floor() as usize
    }
}

impl Serialize for ValidationSplit {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ValidationSplit {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Self::try_from(value).map_err(D::Error::custom)
    }
}

impl TryFrom<f64> for ValidationSplit {
    type Error = ConfigurationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        let value = R64::try_new(value)
            .filter(|value| value.raw() > 0.0 && value.raw() < 1.0)
            .ok_or(ConfigurationError::InvalidValidationSplit { value })?;
        Ok(Self(value))
    }
}

impl From<ValidationSplit> for f64 {
    fn from(split: ValidationSplit) -> Self {
        split.to_f64()
    }
}

impl Display for ValidationSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0.raw(), f)
    }
}

/// The partition a dataset is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subset {
    Training,
    Validation,
    Both,
}

impl Subset {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Training => "training",
            Self::Validation => "validation",
            Self::Both => "both",
        }
    }
}

impl Display for Subset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Split `records` into a leading training part and a trailing validation
/// part of `floor(split * len)` records.
///
/// Fails if either part is empty.
pub fn split_records<T>(
    mut records: Vec<T>,
    split: ValidationSplit,
) -> Result<(Vec<T>, Vec<T>), SplitError> {
    let num_records = records.len();
    let num_validation = split.num_validation(num_records);
    let num_training = num_records - num_validation;

    let empty = |subset| SplitError::EmptySplit {
        subset,
        num_records,
        validation_split: split.to_f64(),
    };
    if num_training == 0 {
        return Err(empty(Subset::Training));
    }
    if num_validation == 0 {
        return Err(empty(Subset::Validation));
    }

    let validation = records.split_off(num_training);
    info!(
        "using {} files for training and {} files for validation",
        num_training, num_validation
    );

    Ok((records, validation))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(value: f64) -> ValidationSplit {
        ValidationSplit::try_from(value).unwrap()
    }

    #[test]
    fn validation_split_must_be_a_proper_fraction() {
        assert!(ValidationSplit::try_from(0.2).is_ok());
        assert!(ValidationSplit::try_from(0.999).is_ok());
        for value in [0.0, 1.0, -0.1, 1.5, f64::NAN, f64::INFINITY] {
            assert!(ValidationSplit::try_from(value).is_err(), "{}", value);
        }

        let parsed: ValidationSplit = json5::from_str("0.25").unwrap();
        assert_eq!(parsed.to_f64(), 0.25);
        assert!(json5::from_str::<ValidationSplit>("1.0").is_err());
    }

    #[test]
    fn training_takes_the_leading_records() {
        let (training, validation) = split_records((0..5).collect(), split(0.2)).unwrap();
        assert_eq!(training, vec![0, 1, 2, 3]);
        assert_eq!(validation, vec![4]);

        // floor(0.35 * 10) = 3
        let (training, validation) = split_records((0..10).collect(), split(0.35)).unwrap();
        assert_eq!(training.len(), 7);
        assert_eq!(validation, vec![7, 8, 9]);
    }

    #[test]
    fn empty_partitions_are_rejected() {
        match split_records(vec![0, 1, 2], split(0.2)) {
            Err(SplitError::EmptySplit {
                subset: Subset::Validation,
                num_records: 3,
                ..
            }) => {}
            other => panic!("unexpected result {:?}", other),
        }

        match split_records(vec![0], split(0.99)) {
            Err(SplitError::EmptySplit {
                subset: Subset::Validation,
                ..
            }) => {}
            other => panic!("unexpected result {:?}", other),
        }

        match split_records(Vec::<usize>::new(), split(0.5)) {
            Err(SplitError::EmptySplit {
                subset: Subset::Training,
                ..
            }) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn subset_names() {
        let subset: Subset = json5::from_str("'both'").unwrap();
        assert_eq!(subset, Subset::Both);
        assert_eq!(Subset::Training.to_string(), "training");
        assert!(json5::from_str::<Subset>("'test'").is_err());
    }
}

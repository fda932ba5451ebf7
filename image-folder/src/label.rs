//! Label encoding modes and encoded labels.

use crate::common::*;

/// How class indexes are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelMode {
    /// The class index.
    Int,
    /// A one-hot vector of length `num_classes`.
    Categorical,
    /// A single `0.0` or `1.0`. Requires exactly two classes.
    Binary,
}

impl LabelMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Categorical => "categorical",
            Self::Binary => "binary",
        }
    }

    /// Check that `num_classes` can be encoded in this mode.
    pub fn check_num_classes(&self, num_classes: usize) -> Result<(), InputDataError> {
        match self {
            Self::Binary if num_classes != 2 => {
                Err(InputDataError::BinaryLabelCardinality { num_classes })
            }
            _ => Ok(()),
        }
    }

    pub fn encode(&self, class_index: usize, num_classes: usize) -> Label {
        match self {
            Self::Int => Label::Int(class_index),
            Self::Categorical => {
                let mut one_hot = vec![0.0; num_classes];
                if let Some(slot) = one_hot.get_mut(class_index) {
                    *slot = 1.0;
                }
                Label::Categorical(one_hot)
            }
            Self::Binary => Label::Binary(if class_index == 0 { 0.0 } else { 1.0 }),
        }
    }
}

impl Default for LabelMode {
    fn default() -> Self {
        Self::Int
    }
}

impl FromStr for LabelMode {
    type Err = ConfigurationError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let mode = match name {
            "int" => Self::Int,
            "categorical" => Self::Categorical,
            "binary" => Self::Binary,
            _ => {
                return Err(ConfigurationError::UnsupportedLabelMode {
                    name: name.to_owned(),
                })
            }
        };
        Ok(mode)
    }
}

impl Display for LabelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The encoded label of a single sample.
#[derive(Debug, Clone, PartialEq)]
pub enum Label {
    Int(usize),
    Categorical(Vec<f32>),
    Binary(f32),
}

impl Label {
    pub fn mode(&self) -> LabelMode {
        match self {
            Self::Int(_) => LabelMode::Int,
            Self::Categorical(_) => LabelMode::Categorical,
            Self::Binary(_) => LabelMode::Binary,
        }
    }
}

/// The stacked labels of a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelBatch {
    /// Shape `(batch,)`.
    Int(Array1<i64>),
    /// Shape `(batch, num_classes)`.
    Categorical(Array2<f32>),
    /// Shape `(batch, 1)`.
    Binary(Array2<f32>),
}

impl LabelBatch {
    /// Stack labels of one mode into a batch.
    ///
    /// Returns `None` if `labels` is empty or the labels do not share the same
    /// mode and length.
    pub fn stack<L>(labels: &[L]) -> Option<Self>
    where
        L: Borrow<Label>,
    {
        let first = labels.first()?.borrow();

        let batch = match first {
            Label::Int(_) => {
                let values: Vec<i64> = labels
                    .iter()
                    .map(|label| match label.borrow() {
                        Label::Int(index) => Some(*index as i64),
                        _ => None,
                    })
                    .collect::<Option<_>>()?;
                Self::Int(Array1::from(values))
            }
            Label::Categorical(one_hot) => {
                let num_classes = one_hot.len();
                let values: Vec<f32> = labels
                    .iter()
                    .map(|label| match label.borrow() {
                        Label::Categorical(one_hot) if one_hot.len() == num_classes => {
                            Some(one_hot.iter().cloned())
                        }
                        _ => None,
                    })
                    .collect::<Option<Vec<_>>>()?
                    .into_iter()
                    .flatten()
                    .collect();
                Self::Categorical(Array2::from_shape_vec((labels.len(), num_classes), values).ok()?)
            }
            Label::Binary(_) => {
                let values: Vec<f32> = labels
                    .iter()
                    .map(|label| match label.borrow() {
                        Label::Binary(value) => Some(*value),
                        _ => None,
                    })
                    .collect::<Option<_>>()?;
                Self::Binary(Array2::from_shape_vec((labels.len(), 1), values).ok()?)
            }
        };

        Some(batch)
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Int(array) => array.len(),
            Self::Categorical(array) | Self::Binary(array) => array.nrows(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            Self::Int(array) => array.shape(),
            Self::Categorical(array) | Self::Binary(array) => array.shape(),
        }
    }
}

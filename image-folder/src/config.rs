//! Dataset options and their json5 file format.

use crate::{
    common::*, index::Labels, label::LabelMode, size::TargetSize, split::Subset,
    split::ValidationSplit, InterpolationMethod,
};
use std::collections::HashSet;

/// The channel layout images are decoded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ColorMode {
    Grayscale,
    Rgb,
    Rgba,
}

impl ColorMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Grayscale => "grayscale",
            Self::Rgb => "rgb",
            Self::Rgba => "rgba",
        }
    }

    pub fn channels(&self) -> usize {
        match self {
            Self::Grayscale => 1,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

impl Default for ColorMode {
    fn default() -> Self {
        Self::Rgb
    }
}

impl FromStr for ColorMode {
    type Err = ConfigurationError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let mode = match name {
            "grayscale" => Self::Grayscale,
            "rgb" => Self::Rgb,
            "rgba" => Self::Rgba,
            _ => {
                return Err(ConfigurationError::UnsupportedColorMode {
                    name: name.to_owned(),
                })
            }
        };
        Ok(mode)
    }
}

impl TryFrom<String> for ColorMode {
    type Error = ConfigurationError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl From<ColorMode> for String {
    fn from(mode: ColorMode) -> Self {
        mode.name().to_owned()
    }
}

impl Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Options of a directory dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetOptions {
    /// `"inferred"`, `null`, or one integer label per file.
    #[serde(default)]
    pub labels: Labels,
    /// Label encoding, or `null` for unlabelled datasets.
    #[serde(default = "default_label_mode")]
    pub label_mode: Option<LabelMode>,
    /// Explicit class order. Only valid with inferred labels.
    #[serde(default)]
    pub class_names: Option<Vec<String>>,
    #[serde(default)]
    pub color_mode: ColorMode,
    /// Elements are batches if set, single samples otherwise.
    #[serde(default = "default_batch_size")]
    pub batch_size: Option<NonZeroUsize>,
    #[serde(default = "default_image_size")]
    pub image_size: TargetSize,
    #[serde(default = "default_shuffle")]
    pub shuffle: bool,
    /// The shuffle seed, drawn at random if missing.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub validation_split: Option<ValidationSplit>,
    #[serde(default)]
    pub subset: Option<Subset>,
    #[serde(default)]
    pub interpolation: InterpolationMethod,
    #[serde(default)]
    pub follow_links: bool,
    /// Crop to the target aspect ratio before resizing.
    #[serde(default, alias = "smart_resize")]
    pub crop_to_aspect_ratio: bool,
    #[serde(default)]
    pub antialias: bool,
}

impl DatasetOptions {
    pub const DEFAULT_BATCH_SIZE: usize = 32;
    pub const DEFAULT_IMAGE_SIZE: [usize; 2] = [256, 256];

    /// Load options from a json5 file.
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::ReadOptions {
            path: path.to_owned(),
            source,
        })?;
        let options = json5::from_str(&text).map_err(|source| Error::ParseOptions {
            path: path.to_owned(),
            source,
        })?;
        Ok(options)
    }

    /// Check option combinations that can be rejected before touching the
    /// file system.
    pub fn validate(&self) -> Result<()> {
        if let Some(class_names) = &self.class_names {
            if matches!(self.labels, Labels::Explicit(_)) {
                return Err(ConfigurationError::ClassNamesWithoutInferredLabels.into());
            }

            let mut seen = HashSet::new();
            if let Some(name) = class_names.iter().find(|name| !seen.insert(name.as_str())) {
                return Err(ConfigurationError::DuplicateClassName { name: name.clone() }.into());
            }

            if self.effective_label_mode() == Some(LabelMode::Binary) {
                LabelMode::Binary.check_num_classes(class_names.len())?;
            }
        }

        match (self.subset, self.validation_split) {
            (Some(_), None) => {
                return Err(ConfigurationError::SubsetWithoutValidationSplit.into())
            }
            (None, Some(_)) => {
                return Err(ConfigurationError::ValidationSplitWithoutSubset.into())
            }
            _ => {}
        }

        Ok(())
    }

    /// The label source after applying `label_mode`. A missing label mode
    /// disables labels altogether.
    pub fn effective_labels(&self) -> Labels {
        match self.label_mode {
            Some(_) => self.labels.clone(),
            None => Labels::None,
        }
    }

    /// The class names passed to indexing. They are dropped when labels are
    /// disabled.
    pub fn effective_class_names(&self) -> Option<&[String]> {
        if self.effective_labels().is_inferred() {
            self.class_names.as_deref()
        } else {
            None
        }
    }

    /// The label mode after applying `labels`. Unlabelled datasets have no
    /// label mode.
    pub fn effective_label_mode(&self) -> Option<LabelMode> {
        match self.labels {
            Labels::None => None,
            _ => self.label_mode,
        }
    }
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self {
            labels: Labels::default(),
            label_mode: default_label_mode(),
            class_names: None,
            color_mode: ColorMode::default(),
            batch_size: default_batch_size(),
            image_size: default_image_size(),
            shuffle: default_shuffle(),
            seed: None,
            validation_split: None,
            subset: None,
            interpolation: InterpolationMethod::default(),
            follow_links: false,
            crop_to_aspect_ratio: false,
            antialias: false,
        }
    }
}

fn default_label_mode() -> Option<LabelMode> {
    Some(LabelMode::Int)
}

fn default_batch_size() -> Option<NonZeroUsize> {
    NonZeroUsize::new(DatasetOptions::DEFAULT_BATCH_SIZE)
}

fn default_image_size() -> TargetSize {
    let [height, width] = DatasetOptions::DEFAULT_IMAGE_SIZE;
    TargetSize::new(height, width).expect("the default image size must be positive")
}

fn default_shuffle() -> bool {
    true
}

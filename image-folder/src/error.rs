//! Error types.
//!
//! Errors are grouped by the stage that detects them. [ConfigurationError]s
//! are raised before any file I/O, [InputDataError]s while indexing, and
//! [DecodeError]s lazily when the offending item is pulled from a stream.

use std::{io, path::PathBuf};
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    InputData(#[from] InputDataError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Split(#[from] SplitError),
    #[error("the directory indexing task failed")]
    Indexing(#[from] tokio::task::JoinError),
    #[error("failed to read options file '{}'", path.display())]
    ReadOptions {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse options file '{}'", path.display())]
    ParseOptions {
        path: PathBuf,
        #[source]
        source: json5::Error,
    },
}

/// Invalid or conflicting options.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error(
        "value not recognized for `interpolation`: '{name}', supported values are \
         bilinear, nearest, bicubic, area, lanczos3, lanczos5, gaussian, mitchellcubic"
    )]
    UnsupportedInterpolation { name: String },
    #[error("`color_mode` must be one of grayscale, rgb, rgba, but get '{name}'")]
    UnsupportedColorMode { name: String },
    #[error("`label_mode` must be one of int, categorical, binary, but get '{name}'")]
    UnsupportedLabelMode { name: String },
    #[error("`labels` must be \"inferred\", null or a list of integers, but get '{name}'")]
    UnknownLabelsValue { name: String },
    #[error("expect `size` to be a pair of positive integers, but get {size:?}")]
    InvalidSize { size: Vec<i64> },
    #[error("`validation_split` must be strictly between 0 and 1, but get {value}")]
    InvalidValidationSplit { value: f64 },
    #[error("`subset` is set but `validation_split` is not")]
    SubsetWithoutValidationSplit,
    #[error("`validation_split` is set but `subset` is not")]
    ValidationSplitWithoutSubset,
    #[error("`class_names` can only be passed with inferred labels")]
    ClassNamesWithoutInferredLabels,
    #[error("duplicated class name '{name}'")]
    DuplicateClassName { name: String },
}

/// Problems with the indexed directory content.
#[derive(Debug, Error)]
pub enum InputDataError {
    #[error("no images found in directory '{}', allowed formats: {formats:?}", dir.display())]
    EmptyDirectory {
        dir: PathBuf,
        formats: Vec<String>,
    },
    #[error("'{}' is not a directory", path.display())]
    NotADirectory { path: PathBuf },
    #[error(
        "expect the number of labels to match the number of files, \
         but get {num_labels} labels and {num_files} files"
    )]
    LabelCountMismatch { num_labels: usize, num_files: usize },
    #[error(
        "the class names {given:?} do not match the subdirectories {found:?} of the target directory"
    )]
    ClassNameMismatch {
        given: Vec<String>,
        found: Vec<String>,
    },
    #[error("'{}' has no label, but a label mode is set", path.display())]
    MissingLabel { path: PathBuf },
    #[error(
        "'{}' has label {label}, which is out of range for {num_classes} classes",
        path.display()
    )]
    LabelOutOfRange {
        path: PathBuf,
        label: usize,
        num_classes: usize,
    },
    #[error("binary label mode requires exactly 2 classes, but get {num_classes}")]
    BinaryLabelCardinality { num_classes: usize },
    #[error(
        "expect an image array with shape (height, width, channels) or \
         (batch_size, height, width, channels), but get shape {shape:?}"
    )]
    InvalidRank { shape: Vec<usize> },
    #[error("a {}x{} image has no crop with the aspect ratio of the target size {}x{}", shape[0], shape[1], target[0], target[1])]
    EmptyCrop { shape: [usize; 2], target: [usize; 2] },
    #[error("failed to access '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failures while materializing a single image.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read image file '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode image file '{}'", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to resize image '{}'", path.display())]
    Resize {
        path: PathBuf,
        #[source]
        source: InputDataError,
    },
    #[error("image '{}' has shape {shape:?}, but {expect:?} is expected", path.display())]
    UnexpectedShape {
        path: PathBuf,
        shape: Vec<usize>,
        expect: Vec<usize>,
    },
}

/// A train/validation partition came out empty.
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("the {subset} partition is empty, there are {num_records} records and validation_split is {validation_split}")]
    EmptySplit {
        subset: crate::split::Subset,
        num_records: usize,
        validation_split: f64,
    },
}

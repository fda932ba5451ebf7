//! Image folder datasets with aspect-ratio preserving resizing.
//!
//! The crate indexes a directory of images, infers or accepts class labels,
//! and assembles an ordered, lazily decoded stream of resized samples or
//! batches. The [smart_resize](resize::SmartResize::smart_resize) transform is
//! usable on its own for any `(height, width, channels)` or
//! `(batch, height, width, channels)` array.

mod common;
pub mod config;
pub mod dataset;
pub mod error;
pub mod index;
pub mod interpolation;
pub mod label;
pub mod profiling;
pub mod resize;
pub mod seed;
pub mod size;
pub mod split;
#[cfg(feature = "tch")]
pub mod tensor;

pub use config::*;
pub use dataset::*;
pub use error::*;
pub use index::*;
pub use interpolation::*;
pub use label::*;
pub use resize::*;
pub use seed::*;
pub use size::*;
pub use split::*;

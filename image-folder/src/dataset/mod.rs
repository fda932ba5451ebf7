//! Dataset traits and the image folder dataset.

mod folder;
mod image_dataset;
mod loader;
mod shuffle;

pub use folder::*;
pub use image_dataset::*;
pub use loader::*;
pub use shuffle::*;

use crate::{common::*, index::ImageRecord};

/// The generic dataset trait.
pub trait GenericDataset
where
    Self: Debug + Send,
{
    /// The number of color channels of the dataset.
    fn input_channels(&self) -> usize;

    /// The list of class names of the dataset.
    fn classes(&self) -> &IndexSet<String>;
}

/// The dataset with a list of image paths.
pub trait FileDataset
where
    Self: GenericDataset,
{
    /// Get the list of image records in the dataset.
    fn records(&self) -> &[ImageRecord];
}

/// The dataset that can be enumerated through a stream.
pub trait StreamingDataset
where
    Self: GenericDataset,
{
    /// Start a new pass over the dataset.
    fn stream(&self) -> BoxStream<'static, Result<Element>>;
}

impl GenericDataset for ImageDataset {
    fn input_channels(&self) -> usize {
        self.loader().color_mode.channels()
    }

    fn classes(&self) -> &IndexSet<String> {
        self.class_names()
    }
}

impl FileDataset for ImageDataset {
    fn records(&self) -> &[ImageRecord] {
        self.records_slice()
    }
}

impl StreamingDataset for ImageDataset {
    fn stream(&self) -> BoxStream<'static, Result<Element>> {
        self.elements()
    }
}

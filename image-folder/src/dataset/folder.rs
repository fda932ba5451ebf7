//! Datasets built from a directory of images.

use super::{DatasetParams, ImageDataset, ImageLoader, ShuffleBuffer};
use crate::{
    common::*,
    config::DatasetOptions,
    index::{index_directory, IndexOptions, ALLOWLIST_FORMATS},
    seed::{RandomSeed, SeedSource},
    split::{split_records, Subset},
};

/// The datasets loaded from a directory.
#[derive(Debug, Clone)]
pub enum DirectoryDataset {
    Single(ImageDataset),
    /// Both partitions of a `subset = "both"` split.
    Split {
        training: ImageDataset,
        validation: ImageDataset,
    },
}

impl DirectoryDataset {
    pub fn class_names(&self) -> &IndexSet<String> {
        match self {
            Self::Single(dataset) => dataset.class_names(),
            Self::Split { training, .. } => training.class_names(),
        }
    }

    pub fn into_single(self) -> Option<ImageDataset> {
        match self {
            Self::Single(dataset) => Some(dataset),
            Self::Split { .. } => None,
        }
    }

    pub fn into_split(self) -> Option<(ImageDataset, ImageDataset)> {
        match self {
            Self::Single(_) => None,
            Self::Split {
                training,
                validation,
            } => Some((training, validation)),
        }
    }

    /// The contained datasets with their partition name.
    pub fn datasets(&self) -> Vec<(Option<Subset>, &ImageDataset)> {
        match self {
            Self::Single(dataset) => vec![(None, dataset)],
            Self::Split {
                training,
                validation,
            } => vec![
                (Some(Subset::Training), training),
                (Some(Subset::Validation), validation),
            ],
        }
    }
}

/// The initializer of [ImageFolder].
#[derive(Debug, Clone)]
pub struct ImageFolderInit<S = RandomSeed> {
    pub options: DatasetOptions,
    /// Used when `options.seed` is not set.
    pub seed_source: S,
}

impl<S> ImageFolderInit<S>
where
    S: SeedSource,
{
    /// Validate the options and fix the shuffle seed.
    pub fn build(self) -> Result<ImageFolder> {
        let Self {
            options,
            seed_source,
        } = self;

        options.validate()?;
        let seed = options.seed.unwrap_or_else(|| seed_source.next_seed());

        Ok(ImageFolder {
            options: Arc::new(options),
            seed,
        })
    }
}

/// Loads directories into datasets with fixed options.
#[derive(Debug, Clone)]
pub struct ImageFolder {
    options: Arc<DatasetOptions>,
    seed: u64,
}

impl ImageFolder {
    pub fn options(&self) -> &DatasetOptions {
        &self.options
    }

    /// The seed shared by record shuffling and the shuffle buffer.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Index `dir` and assemble the datasets.
    ///
    /// All indexing and label errors are reported here. Image decoding is
    /// deferred to the dataset streams.
    pub async fn load(&self, dir: impl AsRef<Path>) -> Result<DirectoryDataset> {
        let options = &*self.options;
        let seed = self.seed;
        let label_mode = options.effective_label_mode();

        let index = {
            let dir = dir.as_ref().to_owned();
            let labels = options.effective_labels();
            let class_names = options.effective_class_names().map(<[String]>::to_vec);
            let shuffle = options.shuffle;
            let follow_links = options.follow_links;

            tokio::task::spawn_blocking(move || {
                index_directory(
                    &dir,
                    &IndexOptions {
                        labels: &labels,
                        formats: ALLOWLIST_FORMATS,
                        class_names: class_names.as_deref(),
                        shuffle,
                        seed,
                        follow_links,
                    },
                )
            })
            .await??
        };

        if let Some(label_mode) = label_mode {
            label_mode.check_num_classes(index.num_classes())?;
        }
        if options.shuffle && index.records.len() == 1 {
            warn!("shuffle is enabled but the directory contains a single image");
        }

        let class_names = Arc::new(index.class_names);
        let records = index.records;
        let loader = ImageLoader::from(options);
        let shuffle_buffer = options
            .shuffle
            .then(|| ShuffleBuffer::for_batch_size(options.batch_size, seed));

        let params = |shuffle_buffer| DatasetParams {
            label_mode,
            loader: loader.clone(),
            batch_size: options.batch_size,
            shuffle_buffer,
        };

        let dataset = match (options.subset, options.validation_split) {
            (None, _) => DirectoryDataset::Single(ImageDataset::new(
                records,
                class_names,
                params(shuffle_buffer),
            )?),
            (Some(_), None) => {
                return Err(ConfigurationError::SubsetWithoutValidationSplit.into());
            }
            (Some(subset), Some(split)) => {
                let (training, validation) = split_records(records, split)?;

                match subset {
                    Subset::Training => DirectoryDataset::Single(ImageDataset::new(
                        training,
                        class_names,
                        params(shuffle_buffer),
                    )?),
                    Subset::Validation => DirectoryDataset::Single(ImageDataset::new(
                        validation,
                        class_names,
                        params(shuffle_buffer),
                    )?),
                    Subset::Both => DirectoryDataset::Split {
                        training: ImageDataset::new(
                            training,
                            class_names.clone(),
                            params(shuffle_buffer),
                        )?,
                        validation: ImageDataset::new(validation, class_names, params(None))?,
                    },
                }
            }
        };

        Ok(dataset)
    }
}

/// Load a directory with `options`, drawing a random seed if none is set.
pub async fn image_dataset_from_directory(
    dir: impl AsRef<Path>,
    options: &DatasetOptions,
) -> Result<DirectoryDataset> {
    let folder = ImageFolderInit {
        options: options.clone(),
        seed_source: RandomSeed,
    }
    .build()?;
    folder.load(dir).await
}

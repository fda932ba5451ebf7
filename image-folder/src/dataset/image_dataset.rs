use super::{ImageLoader, ShuffleBuffer};
use crate::{
    common::*,
    index::ImageRecord,
    label::{Label, LabelBatch, LabelMode},
};

/// A decoded image and its encoded label.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// The position of the record in the dataset.
    pub index: usize,
    pub path: PathBuf,
    /// Shape `(height, width, channels)`.
    pub image: Array3<f32>,
    pub label: Option<Label>,
}

/// Consecutive samples stacked along a leading batch axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub indexes: Vec<usize>,
    /// Shape `(batch, height, width, channels)`.
    pub images: Array4<f32>,
    pub labels: Option<LabelBatch>,
}

impl Batch {
    /// Stack samples of shape `shape` into a batch.
    pub fn stack(samples: Vec<Sample>, shape: [usize; 3]) -> Result<Self> {
        let [height, width, channels] = shape;
        let mut images = Array4::zeros((samples.len(), height, width, channels));

        for (mut dst, sample) in images.outer_iter_mut().zip(&samples) {
            if sample.image.shape() != shape {
                return Err(DecodeError::UnexpectedShape {
                    path: sample.path.clone(),
                    shape: sample.image.shape().to_vec(),
                    expect: shape.to_vec(),
                }
                .into());
            }
            dst.assign(&sample.image);
        }

        let labels = samples
            .iter()
            .map(|sample| sample.label.as_ref())
            .collect::<Option<Vec<&Label>>>()
            .and_then(|labels| LabelBatch::stack(&labels));
        let indexes = samples.iter().map(|sample| sample.index).collect();

        Ok(Self {
            indexes,
            images,
            labels,
        })
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}

/// An item of a dataset stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Sample(Sample),
    Batch(Batch),
}

impl Element {
    /// The number of samples in this element.
    pub fn len(&self) -> usize {
        match self {
            Self::Sample(_) => 1,
            Self::Batch(batch) => batch.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn image_shape(&self) -> &[usize] {
        match self {
            Self::Sample(sample) => sample.image.shape(),
            Self::Batch(batch) => batch.images.shape(),
        }
    }

    pub fn label_shape(&self) -> Option<Vec<usize>> {
        match self {
            Self::Sample(sample) => sample.label.as_ref().map(|label| match label {
                Label::Int(_) | Label::Binary(_) => vec![],
                Label::Categorical(one_hot) => vec![one_hot.len()],
            }),
            Self::Batch(batch) => batch.labels.as_ref().map(|labels| labels.shape().to_vec()),
        }
    }
}

/// Parameters of an [ImageDataset].
#[derive(Debug, Clone)]
pub struct DatasetParams {
    pub label_mode: Option<LabelMode>,
    pub loader: ImageLoader,
    pub batch_size: Option<NonZeroUsize>,
    pub shuffle_buffer: Option<ShuffleBuffer>,
}

/// A finite and restartable stream of images loaded from files.
///
/// Clones share records and the loader, but count shuffled passes on their
/// own.
#[derive(Debug)]
pub struct ImageDataset {
    records: Arc<Vec<ImageRecord>>,
    class_names: Arc<IndexSet<String>>,
    label_mode: Option<LabelMode>,
    loader: Arc<ImageLoader>,
    batch_size: Option<NonZeroUsize>,
    shuffle_buffer: Option<ShuffleBuffer>,
    num_passes: AtomicU64,
}

impl Clone for ImageDataset {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
            class_names: self.class_names.clone(),
            label_mode: self.label_mode,
            loader: self.loader.clone(),
            batch_size: self.batch_size,
            shuffle_buffer: self.shuffle_buffer,
            num_passes: AtomicU64::new(self.num_passes.load(atomic::Ordering::SeqCst)),
        }
    }
}

impl ImageDataset {
    /// Build a dataset over `records`.
    ///
    /// Every record must carry a label within `class_names` if a label mode
    /// is set. Binary labels require exactly two classes.
    pub fn new(
        records: Vec<ImageRecord>,
        class_names: Arc<IndexSet<String>>,
        params: DatasetParams,
    ) -> Result<Self> {
        let DatasetParams {
            label_mode,
            loader,
            batch_size,
            shuffle_buffer,
        } = params;

        if let Some(label_mode) = label_mode {
            let num_classes = class_names.len();
            label_mode.check_num_classes(num_classes)?;

            for record in &records {
                let label = record.label.ok_or_else(|| InputDataError::MissingLabel {
                    path: record.path.clone(),
                })?;
                if label_mode != LabelMode::Int && label >= num_classes {
                    return Err(InputDataError::LabelOutOfRange {
                        path: record.path.clone(),
                        label,
                        num_classes,
                    }
                    .into());
                }
            }
        }

        Ok(Self {
            records: Arc::new(records),
            class_names,
            label_mode,
            loader: Arc::new(loader),
            batch_size,
            shuffle_buffer,
            num_passes: AtomicU64::new(0),
        })
    }

    pub fn class_names(&self) -> &IndexSet<String> {
        &self.class_names
    }

    pub fn file_paths(&self) -> impl Iterator<Item = &Path> {
        self.records.iter().map(|record| record.path.as_path())
    }

    pub fn num_records(&self) -> usize {
        self.records.len()
    }

    pub fn label_mode(&self) -> Option<LabelMode> {
        self.label_mode
    }

    pub fn batch_size(&self) -> Option<NonZeroUsize> {
        self.batch_size
    }

    pub fn shuffle_buffer(&self) -> Option<ShuffleBuffer> {
        self.shuffle_buffer
    }

    pub fn loader(&self) -> &ImageLoader {
        &self.loader
    }

    pub(super) fn records_slice(&self) -> &[ImageRecord] {
        &self.records
    }

    /// The record order of the next pass.
    fn next_pass_order(&self) -> Vec<usize> {
        let len = self.records.len();
        match self.shuffle_buffer {
            Some(shuffle_buffer) => {
                let pass = self.num_passes.fetch_add(1, atomic::Ordering::SeqCst);
                shuffle_buffer.order(len, pass)
            }
            None => (0..len).collect(),
        }
    }

    /// Start a pass yielding one sample per record.
    ///
    /// Images are loaded in parallel and yielded in order. The pass ends
    /// after the first error.
    pub fn samples(&self) -> BoxStream<'static, Result<Sample>> {
        let order = self.next_pass_order();
        let records = self.records.clone();
        let loader = self.loader.clone();
        let label_mode = self.label_mode;
        let num_classes = self.class_names.len();

        let stream = stream::iter(order).par_map(None, move |index| {
            let records = records.clone();
            let loader = loader.clone();

            move || -> Result<_> {
                let record = &records[index];
                let image = loader.load(&record.path)?;
                let label = label_mode
                    .zip(record.label)
                    .map(|(mode, class_index)| mode.encode(class_index, num_classes));

                Ok(Sample {
                    index,
                    path: record.path.clone(),
                    image,
                    label,
                })
            }
        });

        stop_on_error(stream).boxed()
    }

    /// Start a pass yielding batches of `batch_size` consecutive samples. The
    /// last batch may be smaller.
    pub fn batches(&self, batch_size: NonZeroUsize) -> BoxStream<'static, Result<Batch>> {
        let shape = self.loader.output_shape();

        let stream = self
            .samples()
            .chunks(batch_size.get())
            .par_map(None, move |results| {
                move || -> Result<_> {
                    let samples: Vec<_> = results.into_iter().collect::<Result<_>>()?;
                    Batch::stack(samples, shape)
                }
            });

        stop_on_error(stream).boxed()
    }

    /// Start a pass yielding samples or batches depending on the configured
    /// batch size.
    pub fn elements(&self) -> BoxStream<'static, Result<Element>> {
        match self.batch_size {
            Some(batch_size) => self.batches(batch_size).map_ok(Element::Batch).boxed(),
            None => self.samples().map_ok(Element::Sample).boxed(),
        }
    }
}

/// End the stream right after its first error.
fn stop_on_error<S, T>(stream: S) -> impl Stream<Item = Result<T>> + Send
where
    S: Stream<Item = Result<T>> + Send,
    T: Send,
{
    stream.scan(false, |failed, item| {
        if *failed {
            return future::ready(None);
        }
        *failed = item.is_err();
        future::ready(Some(item))
    })
}

//! Aspect-ratio preserving and plain image resizing.
//!
//! Images are laid out as `(height, width, channels)`, batches as
//! `(batch, height, width, channels)`. The [SmartResize] trait keeps the
//! container type of its input, so an [Array3] resizes into an [Array3], an
//! [ArrayD] into an [ArrayD], and so on.

mod resample;

pub use resample::*;

use crate::{common::*, size::CropBox, TargetSize};

/// Resizing operations on image arrays.
pub trait SmartResize
where
    Self: Sized,
{
    /// Take the largest centered crop with the aspect ratio of `size`, then
    /// resize it to exactly `size`.
    fn smart_resize(&self, size: TargetSize, resizer: &Resizer) -> Result<Self>;

    /// Resize to exactly `size`, distorting the aspect ratio if needed.
    fn resize(&self, size: TargetSize, resizer: &Resizer) -> Result<Self>;
}

/// Smart-resize a single `(height, width, channels)` view.
///
/// Fails with [InputDataError::EmptyCrop] when the source is too thin to hold
/// a single row or column of the target aspect ratio.
pub fn smart_resize_view(
    image: ArrayView3<f32>,
    size: TargetSize,
    resizer: &Resizer,
) -> Result<Array3<f32>, InputDataError> {
    let (height, width, _) = image.dim();
    let crop = CropBox::centered(height, width, size);
    if crop.is_empty() {
        return Err(InputDataError::EmptyCrop {
            shape: [height, width],
            target: size.hw(),
        });
    }

    let cropped = image.slice(s![
        crop.start_row..crop.end_row(),
        crop.start_col..crop.end_col(),
        ..
    ]);
    Ok(resizer.resample(cropped, size.height(), size.width()))
}

/// Resize a single `(height, width, channels)` view without cropping.
pub fn resize_view(image: ArrayView3<f32>, size: TargetSize, resizer: &Resizer) -> Array3<f32> {
    resizer.resample(image, size.height(), size.width())
}

fn map_batch<F>(
    batch: &Array4<f32>,
    size: TargetSize,
    mut f: F,
) -> Result<Array4<f32>, InputDataError>
where
    F: FnMut(ArrayView3<f32>) -> Result<Array3<f32>, InputDataError>,
{
    let (batch_size, _, _, channels) = batch.dim();
    let [target_h, target_w] = size.hw();
    let mut output = Array4::zeros((batch_size, target_h, target_w, channels));

    for (mut dst, src) in output.outer_iter_mut().zip(batch.outer_iter()) {
        dst.assign(&f(src)?);
    }

    Ok(output)
}

impl SmartResize for Array3<f32> {
    fn smart_resize(&self, size: TargetSize, resizer: &Resizer) -> Result<Self> {
        Ok(smart_resize_view(self.view(), size, resizer)?)
    }

    fn resize(&self, size: TargetSize, resizer: &Resizer) -> Result<Self> {
        Ok(resize_view(self.view(), size, resizer))
    }
}

impl SmartResize for Array4<f32> {
    fn smart_resize(&self, size: TargetSize, resizer: &Resizer) -> Result<Self> {
        Ok(map_batch(self, size, |image| {
            smart_resize_view(image, size, resizer)
        })?)
    }

    fn resize(&self, size: TargetSize, resizer: &Resizer) -> Result<Self> {
        Ok(map_batch(self, size, |image| {
            Ok(resize_view(image, size, resizer))
        })?)
    }
}

impl SmartResize for ArrayD<f32> {
    fn smart_resize(&self, size: TargetSize, resizer: &Resizer) -> Result<Self> {
        match self.ndim() {
            3 => {
                let image = self.view().into_dimensionality::<ndarray::Ix3>().map_err(|_| {
                    invalid_rank(self.shape())
                })?;
                Ok(smart_resize_view(image, size, resizer)?.into_dyn())
            }
            4 => {
                let batch = self
                    .clone()
                    .into_dimensionality::<ndarray::Ix4>()
                    .map_err(|_| invalid_rank(self.shape()))?;
                Ok(batch.smart_resize(size, resizer)?.into_dyn())
            }
            _ => Err(invalid_rank(self.shape()).into()),
        }
    }

    fn resize(&self, size: TargetSize, resizer: &Resizer) -> Result<Self> {
        match self.ndim() {
            3 => {
                let image = self.view().into_dimensionality::<ndarray::Ix3>().map_err(|_| {
                    invalid_rank(self.shape())
                })?;
                Ok(resize_view(image, size, resizer).into_dyn())
            }
            4 => {
                let batch = self
                    .clone()
                    .into_dimensionality::<ndarray::Ix4>()
                    .map_err(|_| invalid_rank(self.shape()))?;
                Ok(SmartResize::resize(&batch, size, resizer)?.into_dyn())
            }
            _ => Err(invalid_rank(self.shape()).into()),
        }
    }
}

pub(crate) fn invalid_rank(shape: &[usize]) -> InputDataError {
    InputDataError::InvalidRank {
        shape: shape.to_vec(),
    }
}

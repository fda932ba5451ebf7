//! Separable resampling of `(height, width, channels)` arrays.

use crate::{common::*, interpolation::Kernel, InterpolationMethod};

/// The source taps contributing to one output pixel along one axis.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Taps {
    pub start: usize,
    pub weights: Vec<f32>,
}

/// Resize settings shared by every image of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resizer {
    pub method: InterpolationMethod,
    /// Widen the kernel when downsampling. Has no effect on nearest and area.
    pub antialias: bool,
}

impl Resizer {
    pub fn new(method: InterpolationMethod) -> Self {
        Self {
            method,
            antialias: false,
        }
    }

    pub fn antialias(self, antialias: bool) -> Self {
        Self { antialias, ..self }
    }

    /// Resize a `(height, width, channels)` view to `out_h` x `out_w`.
    pub fn resample(&self, image: ArrayView3<f32>, out_h: usize, out_w: usize) -> Array3<f32> {
        let (in_h, in_w, channels) = image.dim();

        if (in_h, in_w) == (out_h, out_w) && self.is_identity_at_unit_scale() {
            return image.to_owned();
        }

        let rows = self.axis_taps(in_h, out_h);
        let cols = self.axis_taps(in_w, out_w);

        // vertical pass
        let mut vertical = Array3::<f32>::zeros((out_h, in_w, channels));
        for (out_y, taps) in rows.iter().enumerate() {
            let mut dst = vertical.index_axis_mut(Axis(0), out_y);
            for (offset, &weight) in taps.weights.iter().enumerate() {
                let src = image.index_axis(Axis(0), taps.start + offset);
                dst.scaled_add(weight, &src);
            }
        }

        // horizontal pass
        let mut output = Array3::<f32>::zeros((out_h, out_w, channels));
        for (out_x, taps) in cols.iter().enumerate() {
            let mut dst = output.index_axis_mut(Axis(1), out_x);
            for (offset, &weight) in taps.weights.iter().enumerate() {
                let src = vertical.index_axis(Axis(1), taps.start + offset);
                dst.scaled_add(weight, &src);
            }
        }

        output
    }

    fn is_identity_at_unit_scale(&self) -> bool {
        matches!(
            self.method,
            InterpolationMethod::Nearest | InterpolationMethod::Area | InterpolationMethod::Bilinear
        )
    }

    pub(crate) fn axis_taps(&self, in_size: usize, out_size: usize) -> Vec<Taps> {
        if in_size == 0 {
            return vec![
                Taps {
                    start: 0,
                    weights: vec![],
                };
                out_size
            ];
        }

        match self.method.kernel() {
            Some(kernel) => kernel_taps(kernel, in_size, out_size, self.antialias),
            None => match self.method {
                InterpolationMethod::Nearest => nearest_taps(in_size, out_size),
                InterpolationMethod::Area => area_taps(in_size, out_size),
                _ => unreachable!(),
            },
        }
    }
}

impl From<InterpolationMethod> for Resizer {
    fn from(method: InterpolationMethod) -> Self {
        Self::new(method)
    }
}

/// Half-pixel nearest neighbor sampling.
fn nearest_taps(in_size: usize, out_size: usize) -> Vec<Taps> {
    let scale = in_size as f64 / out_size as f64;

    (0..out_size)
        .map(|out| {
            let src = (((out as f64 + 0.5) * scale).floor() as usize).min(in_size - 1);
            Taps {
                start: src,
                weights: vec![1.0],
            }
        })
        .collect()
}

/// Box averaging over the exact source footprint of each output pixel.
fn area_taps(in_size: usize, out_size: usize) -> Vec<Taps> {
    let scale = in_size as f64 / out_size as f64;

    (0..out_size)
        .map(|out| {
            let lower = out as f64 * scale;
            let upper = ((out + 1) as f64 * scale).min(in_size as f64);
            let first = lower.floor() as usize;
            let last = (upper.ceil() as usize).max(first + 1).min(in_size);

            let weights = (first..last)
                .map(|index| {
                    let overlap = upper.min((index + 1) as f64) - lower.max(index as f64);
                    (overlap.max(0.0) / scale) as f32
                })
                .collect();

            Taps {
                start: first,
                weights,
            }
        })
        .collect()
}

/// Kernel sampling centered at `(out + 0.5) * in / out` in source coordinates.
///
/// Taps outside the source are dropped and the remaining weights are
/// normalized to sum to one.
fn kernel_taps(kernel: Kernel, in_size: usize, out_size: usize, antialias: bool) -> Vec<Taps> {
    let inv_scale = in_size as f32 / out_size as f32;
    let kernel_scale = if antialias { inv_scale.max(1.0) } else { 1.0 };
    let support = kernel.radius() * kernel_scale;

    (0..out_size)
        .map(|out| {
            let center = (out as f32 + 0.5) * inv_scale;
            let first = ((center - support - 0.5).ceil().max(0.0) as usize).min(in_size - 1);
            let last = ((center + support - 0.5).floor().max(0.0) as usize).min(in_size - 1);

            let mut weights: Vec<f32> = (first..=last)
                .map(|index| kernel.weight((index as f32 + 0.5 - center) / kernel_scale))
                .collect();

            let total: f32 = weights.iter().sum();
            if total.abs() >= 1000.0 * f32::MIN_POSITIVE {
                weights.iter_mut().for_each(|weight| *weight /= total);
            } else {
                weights.iter_mut().for_each(|weight| *weight = 0.0);
            }

            Taps {
                start: first,
                weights,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn ramp(height: usize, width: usize, channels: usize) -> Array3<f32> {
        Array3::from_shape_fn((height, width, channels), |(y, x, c)| {
            (y * 31 + x * 7 + c * 3) as f32
        })
    }

    #[test]
    fn identity_methods_copy_at_unit_scale() {
        let image = ramp(5, 6, 3);

        for method in [
            InterpolationMethod::Nearest,
            InterpolationMethod::Area,
            InterpolationMethod::Bilinear,
        ] {
            let resizer = Resizer::new(method);
            let taps = resizer.axis_taps(6, 6);
            assert!(taps
                .iter()
                .enumerate()
                .all(|(index, taps)| taps.start <= index
                    && taps.weights[index - taps.start] == 1.0));

            let output = resizer.resample(image.view(), 5, 6);
            assert_eq!(output, image);
        }
    }

    #[test]
    fn weights_are_normalized() {
        for method in InterpolationMethod::ALL {
            for antialias in [false, true] {
                let resizer = Resizer::new(method).antialias(antialias);
                for (in_size, out_size) in [(7, 3), (3, 7), (10, 10), (1, 4), (9, 2)] {
                    for taps in resizer.axis_taps(in_size, out_size) {
                        let total: f32 = taps.weights.iter().sum();
                        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-4);
                        assert!(taps.start + taps.weights.len() <= in_size);
                    }
                }
            }
        }
    }

    #[test]
    fn constant_image_is_preserved() {
        let image = Array3::from_elem((9, 13, 2), 42.0f32);

        for method in InterpolationMethod::ALL {
            let resizer = Resizer::new(method);
            for (out_h, out_w) in [(4, 4), (20, 7), (9, 13)] {
                let output = resizer.resample(image.view(), out_h, out_w);
                assert_eq!(output.dim(), (out_h, out_w, 2));
                output
                    .iter()
                    .for_each(|&value| assert_abs_diff_eq!(value, 42.0, epsilon = 1e-3));
            }
        }
    }

    #[test]
    fn bilinear_upsampling_interpolates_between_pixels() {
        let image = Array3::from_shape_vec((1, 2, 1), vec![0.0f32, 100.0]).unwrap();
        let output = Resizer::new(InterpolationMethod::Bilinear).resample(image.view(), 1, 4);
        let values: Vec<f32> = output.iter().cloned().collect();

        // sample centers at 0.25, 0.75, 1.25, 1.75 in source coordinates
        assert_abs_diff_eq!(values[0], 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(values[1], 25.0, epsilon = 1e-4);
        assert_abs_diff_eq!(values[2], 75.0, epsilon = 1e-4);
        assert_abs_diff_eq!(values[3], 100.0, epsilon = 1e-4);
    }

    #[test]
    fn area_downsampling_averages_blocks() {
        let image = Array3::from_shape_vec((1, 4, 1), vec![0.0f32, 2.0, 4.0, 6.0]).unwrap();
        let output = Resizer::new(InterpolationMethod::Area).resample(image.view(), 1, 2);
        assert_abs_diff_eq!(output[[0, 0, 0]], 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(output[[0, 1, 0]], 5.0, epsilon = 1e-5);

        // fractional footprints, 3 -> 2 covers 1.5 source pixels each
        let image = Array3::from_shape_vec((1, 3, 1), vec![0.0f32, 3.0, 6.0]).unwrap();
        let output = Resizer::new(InterpolationMethod::Area).resample(image.view(), 1, 2);
        assert_abs_diff_eq!(output[[0, 0, 0]], 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(output[[0, 1, 0]], 5.0, epsilon = 1e-5);
    }

    #[test]
    fn nearest_picks_half_pixel_neighbors() {
        let taps = Resizer::new(InterpolationMethod::Nearest).axis_taps(4, 2);
        assert_eq!(taps[0].start, 1);
        assert_eq!(taps[1].start, 3);

        let taps = Resizer::new(InterpolationMethod::Nearest).axis_taps(2, 4);
        let starts: Vec<_> = taps.iter().map(|taps| taps.start).collect();
        assert_eq!(starts, vec![0, 0, 1, 1]);
    }

    #[test]
    fn empty_source_yields_zeros() {
        let image = Array3::<f32>::zeros((0, 5, 3));
        let output = Resizer::new(InterpolationMethod::Bicubic).resample(image.view(), 2, 2);
        assert_eq!(output, Array3::zeros((2, 2, 3)));
    }
}

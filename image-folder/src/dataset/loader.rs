//! Image file loading and resizing.

use crate::{
    common::*,
    config::{ColorMode, DatasetOptions},
    profiling::Timing,
    resize::{resize_view, smart_resize_view, Resizer},
    size::TargetSize,
};

/// Reads, decodes and resizes image files to a fixed shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageLoader {
    pub image_size: TargetSize,
    pub color_mode: ColorMode,
    pub resizer: Resizer,
    pub crop_to_aspect_ratio: bool,
}

impl ImageLoader {
    pub fn new(image_size: TargetSize, color_mode: ColorMode, resizer: Resizer) -> Self {
        Self {
            image_size,
            color_mode,
            resizer,
            crop_to_aspect_ratio: false,
        }
    }

    pub fn crop_to_aspect_ratio(self, crop_to_aspect_ratio: bool) -> Self {
        Self {
            crop_to_aspect_ratio,
            ..self
        }
    }

    /// The `(height, width, channels)` shape of every loaded image.
    pub fn output_shape(&self) -> [usize; 3] {
        let [height, width] = self.image_size.hw();
        [height, width, self.color_mode.channels()]
    }

    /// Load an image file into a `(height, width, channels)` array.
    pub fn load(&self, path: &Path) -> Result<Array3<f32>, DecodeError> {
        let mut timing = Timing::new("load_image");

        let bytes = fs::read(path).map_err(|source| DecodeError::Read {
            path: path.to_owned(),
            source,
        })?;
        timing.set_record("read");

        let image = self.decode(path, &bytes)?;
        timing.set_record("decode");

        let image = self
            .resize(image.view())
            .map_err(|source| DecodeError::Resize {
                path: path.to_owned(),
                source,
            })?;
        timing.set_record("resize");

        let expect = self.output_shape();
        if image.shape() != expect {
            return Err(DecodeError::UnexpectedShape {
                path: path.to_owned(),
                shape: image.shape().to_vec(),
                expect: expect.to_vec(),
            });
        }

        timing.report();
        Ok(image)
    }

    /// Decode encoded image bytes to the configured channel count. Animated
    /// images yield their first frame.
    pub fn decode(&self, path: &Path, bytes: &[u8]) -> Result<Array3<f32>, DecodeError> {
        let image = image::load_from_memory(bytes).map_err(|source| DecodeError::Image {
            path: path.to_owned(),
            source,
        })?;

        let (width, height, raw) = match self.color_mode {
            ColorMode::Grayscale => {
                let image = image.to_luma8();
                let (width, height) = image.dimensions();
                (width, height, image.into_raw())
            }
            ColorMode::Rgb => {
                let image = image.to_rgb8();
                let (width, height) = image.dimensions();
                (width, height, image.into_raw())
            }
            ColorMode::Rgba => {
                let image = image.to_rgba8();
                let (width, height) = image.dimensions();
                (width, height, image.into_raw())
            }
        };

        let shape = (
            height as usize,
            width as usize,
            self.color_mode.channels(),
        );
        let num_values = raw.len();
        Array3::from_shape_vec(shape, raw.into_iter().map(f32::from).collect()).map_err(|_| {
            DecodeError::UnexpectedShape {
                path: path.to_owned(),
                shape: vec![num_values],
                expect: vec![shape.0, shape.1, shape.2],
            }
        })
    }

    fn resize(&self, image: ArrayView3<f32>) -> Result<Array3<f32>, InputDataError> {
        if self.crop_to_aspect_ratio {
            smart_resize_view(image, self.image_size, &self.resizer)
        } else {
            Ok(resize_view(image, self.image_size, &self.resizer))
        }
    }
}

impl From<&DatasetOptions> for ImageLoader {
    fn from(options: &DatasetOptions) -> Self {
        let resizer = Resizer::new(options.interpolation).antialias(options.antialias);
        Self::new(options.image_size, options.color_mode, resizer)
            .crop_to_aspect_ratio(options.crop_to_aspect_ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InterpolationMethod;
    use image::{ImageBuffer, ImageOutputFormat, Rgb};

    fn encode_png(width: u32, height: u32) -> Vec<u8> {
        let image = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x * 10) as u8, (y * 10) as u8, 200])
        });
        let mut bytes = vec![];
        image::DynamicImage::ImageRgb8(image)
            .write_to(&mut bytes, ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    fn loader(height: usize, width: usize, color_mode: ColorMode) -> ImageLoader {
        ImageLoader::new(
            TargetSize::new(height, width).unwrap(),
            color_mode,
            Resizer::new(InterpolationMethod::Nearest),
        )
    }

    #[test]
    fn decode_keeps_pixel_values() {
        let bytes = encode_png(4, 3);
        let image = loader(3, 4, ColorMode::Rgb)
            .decode(Path::new("test.png"), &bytes)
            .unwrap();

        assert_eq!(image.dim(), (3, 4, 3));
        assert_eq!(image[[2, 1, 0]], 10.0);
        assert_eq!(image[[2, 1, 1]], 20.0);
        assert_eq!(image[[2, 1, 2]], 200.0);
    }

    #[test]
    fn decode_to_requested_channels() {
        let bytes = encode_png(5, 2);
        for (color_mode, channels) in [
            (ColorMode::Grayscale, 1),
            (ColorMode::Rgb, 3),
            (ColorMode::Rgba, 4),
        ] {
            let image = loader(2, 5, color_mode)
                .decode(Path::new("test.png"), &bytes)
                .unwrap();
            assert_eq!(image.dim(), (2, 5, channels));
        }
    }

    #[test]
    fn load_resizes_to_output_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.png");
        fs::write(&path, encode_png(30, 20)).unwrap();

        for crop in [false, true] {
            let loader = loader(8, 8, ColorMode::Rgba).crop_to_aspect_ratio(crop);
            let image = loader.load(&path).unwrap();
            assert_eq!(image.shape(), loader.output_shape());
        }
    }

    #[test]
    fn thin_images_fail_to_crop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.png");
        fs::write(&path, encode_png(1, 1)).unwrap();

        let loader = loader(1, 3, ColorMode::Rgb);
        assert_eq!(loader.load(&path).unwrap().dim(), (1, 3, 3));

        let loader = loader.crop_to_aspect_ratio(true);
        assert!(matches!(
            loader.load(&path),
            Err(DecodeError::Resize {
                source: InputDataError::EmptyCrop { .. },
                ..
            })
        ));
    }

    #[test]
    fn invalid_files_fail_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"not an image").unwrap();

        let loader = loader(8, 8, ColorMode::Rgb);
        assert!(matches!(
            loader.load(&path),
            Err(DecodeError::Image { .. })
        ));
        assert!(matches!(
            loader.load(&dir.path().join("missing.png")),
            Err(DecodeError::Read { .. })
        ));
    }
}

//! Target sizes and centered crop boxes.

use crate::common::*;

/// The output spatial size of a resize, both sides positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "[usize; 2]")]
pub struct TargetSize {
    height: NonZeroUsize,
    width: NonZeroUsize,
}

impl TargetSize {
    pub fn new(height: usize, width: usize) -> Result<Self, ConfigurationError> {
        let invalid = || ConfigurationError::InvalidSize {
            size: vec![height as i64, width as i64],
        };
        Ok(Self {
            height: NonZeroUsize::new(height).ok_or_else(invalid)?,
            width: NonZeroUsize::new(width).ok_or_else(invalid)?,
        })
    }

    pub fn height(&self) -> usize {
        self.height.get()
    }

    pub fn width(&self) -> usize {
        self.width.get()
    }

    pub fn hw(&self) -> [usize; 2] {
        [self.height(), self.width()]
    }
}

impl TryFrom<&[i64]> for TargetSize {
    type Error = ConfigurationError;

    fn try_from(size: &[i64]) -> Result<Self, Self::Error> {
        let invalid = || ConfigurationError::InvalidSize {
            size: size.to_vec(),
        };

        match *size {
            [height, width] if height > 0 && width > 0 => {
                Self::new(height as usize, width as usize).map_err(|_| invalid())
            }
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<Vec<i64>> for TargetSize {
    type Error = ConfigurationError;

    fn try_from(size: Vec<i64>) -> Result<Self, Self::Error> {
        size.as_slice().try_into()
    }
}

impl TryFrom<[usize; 2]> for TargetSize {
    type Error = ConfigurationError;

    fn try_from([height, width]: [usize; 2]) -> Result<Self, Self::Error> {
        Self::new(height, width)
    }
}

impl From<TargetSize> for [usize; 2] {
    fn from(size: TargetSize) -> Self {
        size.hw()
    }
}

impl Display for TargetSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.height, self.width)
    }
}

/// The largest centered window of a source image that has the aspect ratio
/// of a [TargetSize].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CropBox {
    pub start_row: usize,
    pub start_col: usize,
    pub crop_height: usize,
    pub crop_width: usize,
}

impl CropBox {
    /// Compute the crop box for a `height` x `width` source.
    ///
    /// The ideal crop sides are computed with single precision division and
    /// truncated toward zero, then clamped to the source sides. The leftover
    /// margin is split evenly with the odd pixel placed after the crop.
    pub fn centered(height: usize, width: usize, target: TargetSize) -> Self {
        let [target_h, target_w] = target.hw();

        let ideal_h = ((width * target_h) as f32 / target_w as f32) as usize;
        let ideal_w = ((height * target_w) as f32 / target_h as f32) as usize;

        let crop_height = height.min(ideal_h);
        let crop_width = width.min(ideal_w);

        Self {
            start_row: (height - crop_height) / 2,
            start_col: (width - crop_width) / 2,
            crop_height,
            crop_width,
        }
    }

    /// Whether a crop side truncated to zero.
    pub fn is_empty(&self) -> bool {
        self.crop_height == 0 || self.crop_width == 0
    }

    pub fn end_row(&self) -> usize {
        self.start_row + self.crop_height
    }

    pub fn end_col(&self) -> usize {
        self.start_col + self.crop_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_size_requires_two_positive_sides() {
        assert!(TargetSize::try_from(vec![200, 100]).is_ok());
        assert_eq!(
            TargetSize::try_from(vec![200]).unwrap_err(),
            ConfigurationError::InvalidSize { size: vec![200] }
        );
        assert!(TargetSize::try_from(vec![1, 2, 3]).is_err());
        assert!(TargetSize::try_from(vec![0, 2]).is_err());
        assert!(TargetSize::try_from(vec![3, -2]).is_err());
        assert!(TargetSize::new(5, 0).is_err());

        let size: TargetSize = json5::from_str("[224, 192]").unwrap();
        assert_eq!(size.hw(), [224, 192]);
        assert!(json5::from_str::<TargetSize>("[224]").is_err());
    }

    #[test]
    fn landscape_crop_is_centered_along_width() {
        let target = TargetSize::new(200, 200).unwrap();
        let crop = CropBox::centered(340, 500, target);
        assert_eq!(
            crop,
            CropBox {
                start_row: 0,
                start_col: 80,
                crop_height: 340,
                crop_width: 340,
            }
        );
    }

    #[test]
    fn portrait_crop_rounds_margin_down() {
        // ideal height = trunc(3 * 4 / 5) = 2, leftover 5 rows
        let target = TargetSize::new(4, 5).unwrap();
        let crop = CropBox::centered(7, 3, target);
        assert_eq!(crop.crop_height, 2);
        assert_eq!(crop.crop_width, 3);
        assert_eq!(crop.start_row, 2);
        assert_eq!(crop.start_col, 0);
    }

    #[test]
    fn crop_truncates_instead_of_rounding() {
        // 10 * 2 / 3 = 6.67 is truncated to 6
        let target = TargetSize::new(2, 3).unwrap();
        let crop = CropBox::centered(10, 10, target);
        assert_eq!(crop.crop_height, 6);
        assert_eq!(crop.crop_width, 10);
        assert_eq!(crop.start_row, 2);
    }

    #[test]
    fn crop_stays_within_source() {
        for height in 1..40 {
            for width in 1..40 {
                for (target_h, target_w) in [(1, 1), (3, 7), (16, 9), (32, 5), (40, 40)] {
                    let target = TargetSize::new(target_h, target_w).unwrap();
                    let crop = CropBox::centered(height, width, target);

                    assert!(crop.crop_height <= height);
                    assert!(crop.crop_width <= width);
                    assert!(crop.crop_height == height || crop.crop_width == width);
                    assert!(crop.end_row() <= height);
                    assert!(crop.end_col() <= width);

                    let rows_after = height - crop.end_row();
                    let cols_after = width - crop.end_col();
                    assert!(crop.start_row <= rows_after && rows_after - crop.start_row <= 1);
                    assert!(crop.start_col <= cols_after && cols_after - crop.start_col <= 1);
                }
            }
        }
    }

    #[test]
    fn extreme_aspect_ratios_truncate_to_empty() {
        let crop = CropBox::centered(1, 1, TargetSize::new(1, 3).unwrap());
        assert_eq!(crop.crop_height, 0);
        assert_eq!(crop.crop_width, 1);
        assert!(crop.is_empty());

        assert!(!CropBox::centered(2, 6, TargetSize::new(1, 3).unwrap()).is_empty());
    }

    #[test]
    fn matching_aspect_ratio_keeps_everything() {
        let target = TargetSize::new(30, 40).unwrap();
        let crop = CropBox::centered(60, 80, target);
        assert_eq!(
            crop,
            CropBox {
                start_row: 0,
                start_col: 0,
                crop_height: 60,
                crop_width: 80,
            }
        );
    }
}

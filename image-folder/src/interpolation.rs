//! Interpolation methods and their sampling kernels.

use crate::common::*;
use std::f32::consts::PI;

/// The resize algorithm selected by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum InterpolationMethod {
    Bilinear,
    Nearest,
    Bicubic,
    Area,
    Lanczos3,
    Lanczos5,
    Gaussian,
    MitchellCubic,
}

impl InterpolationMethod {
    pub const ALL: [InterpolationMethod; 8] = [
        Self::Bilinear,
        Self::Nearest,
        Self::Bicubic,
        Self::Area,
        Self::Lanczos3,
        Self::Lanczos5,
        Self::Gaussian,
        Self::MitchellCubic,
    ];

    /// Look up a method by its case-insensitive name.
    pub fn resolve(name: &str) -> Result<Self, ConfigurationError> {
        let method = match name.to_lowercase().as_str() {
            "bilinear" => Self::Bilinear,
            "nearest" => Self::Nearest,
            "bicubic" => Self::Bicubic,
            "area" => Self::Area,
            "lanczos3" => Self::Lanczos3,
            "lanczos5" => Self::Lanczos5,
            "gaussian" => Self::Gaussian,
            "mitchellcubic" => Self::MitchellCubic,
            _ => {
                return Err(ConfigurationError::UnsupportedInterpolation {
                    name: name.to_owned(),
                })
            }
        };
        Ok(method)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bilinear => "bilinear",
            Self::Nearest => "nearest",
            Self::Bicubic => "bicubic",
            Self::Area => "area",
            Self::Lanczos3 => "lanczos3",
            Self::Lanczos5 => "lanczos5",
            Self::Gaussian => "gaussian",
            Self::MitchellCubic => "mitchellcubic",
        }
    }

    /// The continuous sampling kernel, or `None` for nearest and area
    /// sampling which are not kernel based.
    pub fn kernel(&self) -> Option<Kernel> {
        let kernel = match self {
            Self::Bilinear => Kernel::Triangle,
            Self::Bicubic => Kernel::KeysCubic,
            Self::Lanczos3 => Kernel::Lanczos { radius: 3 },
            Self::Lanczos5 => Kernel::Lanczos { radius: 5 },
            Self::Gaussian => Kernel::Gaussian,
            Self::MitchellCubic => Kernel::MitchellCubic,
            Self::Nearest | Self::Area => return None,
        };
        Some(kernel)
    }
}

impl Default for InterpolationMethod {
    fn default() -> Self {
        Self::Bilinear
    }
}

impl FromStr for InterpolationMethod {
    type Err = ConfigurationError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::resolve(name)
    }
}

impl TryFrom<String> for InterpolationMethod {
    type Error = ConfigurationError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::resolve(&name)
    }
}

impl From<InterpolationMethod> for String {
    fn from(method: InterpolationMethod) -> Self {
        method.name().to_owned()
    }
}

impl Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Symmetric sampling kernels evaluated at a distance in source pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Kernel {
    Triangle,
    /// Keys cubic convolution with `a = -0.5`.
    KeysCubic,
    Lanczos {
        radius: u32,
    },
    /// Gaussian with `sigma = radius / 3`.
    Gaussian,
    /// Mitchell-Netravali filter with `B = C = 1/3`.
    MitchellCubic,
}

impl Kernel {
    const GAUSSIAN_RADIUS: f32 = 1.5;

    /// The half width of the kernel support.
    pub fn radius(&self) -> f32 {
        match *self {
            Self::Triangle => 1.0,
            Self::KeysCubic => 2.0,
            Self::Lanczos { radius } => radius as f32,
            Self::Gaussian => Self::GAUSSIAN_RADIUS,
            Self::MitchellCubic => 2.0,
        }
    }

    pub fn weight(&self, x: f32) -> f32 {
        let x = x.abs();

        match *self {
            Self::Triangle => {
                if x < 1.0 {
                    1.0 - x
                } else {
                    0.0
                }
            }
            Self::KeysCubic => {
                if x >= 2.0 {
                    0.0
                } else if x >= 1.0 {
                    ((-0.5 * x + 2.5) * x - 4.0) * x + 2.0
                } else {
                    ((1.5 * x - 2.5) * x) * x + 1.0
                }
            }
            Self::Lanczos { radius } => {
                let radius = radius as f32;
                if x > radius {
                    0.0
                } else if x <= 1e-3 {
                    1.0
                } else {
                    radius * (PI * x).sin() * (PI * x / radius).sin() / (PI * PI * x * x)
                }
            }
            Self::Gaussian => {
                let sigma = Self::GAUSSIAN_RADIUS / 3.0;
                if x >= Self::GAUSSIAN_RADIUS {
                    0.0
                } else {
                    (-x * x / (2.0 * sigma * sigma)).exp()
                }
            }
            Self::MitchellCubic => {
                if x >= 2.0 {
                    0.0
                } else if x >= 1.0 {
                    (((-7.0 / 18.0) * x + 2.0) * x - 10.0 / 3.0) * x + 16.0 / 9.0
                } else {
                    (((7.0 / 6.0) * x - 2.0) * x) * x + 8.0 / 9.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn resolve_is_case_insensitive() {
        assert_eq!(
            InterpolationMethod::resolve("Bilinear").unwrap(),
            InterpolationMethod::Bilinear
        );
        assert_eq!(
            "LANCZOS5".parse::<InterpolationMethod>().unwrap(),
            InterpolationMethod::Lanczos5
        );
        assert_eq!(
            InterpolationMethod::resolve("mitchellCubic").unwrap(),
            InterpolationMethod::MitchellCubic
        );

        for method in InterpolationMethod::ALL {
            assert_eq!(InterpolationMethod::resolve(method.name()).unwrap(), method);
        }
    }

    #[test]
    fn resolve_rejects_unknown_names() {
        let err = InterpolationMethod::resolve("hamming").unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnsupportedInterpolation {
                name: "hamming".into()
            }
        );
    }

    #[test]
    fn kernels_peak_at_zero() {
        assert_abs_diff_eq!(Kernel::Triangle.weight(0.0), 1.0);
        assert_abs_diff_eq!(Kernel::KeysCubic.weight(0.0), 1.0);
        assert_abs_diff_eq!(Kernel::Lanczos { radius: 3 }.weight(0.0), 1.0);
        assert_abs_diff_eq!(Kernel::Gaussian.weight(0.0), 1.0);
        assert_abs_diff_eq!(
            Kernel::MitchellCubic.weight(0.0),
            8.0 / 9.0,
            epsilon = 1e-6
        );

        // interpolating kernels vanish at integer offsets
        assert_abs_diff_eq!(Kernel::KeysCubic.weight(1.0), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(Kernel::Lanczos { radius: 5 }.weight(2.0), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(Kernel::Triangle.weight(-1.0), 0.0);
        assert_abs_diff_eq!(Kernel::MitchellCubic.weight(2.0), 0.0);
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let method: InterpolationMethod = json5::from_str("'Gaussian'").unwrap();
        assert_eq!(method, InterpolationMethod::Gaussian);
        assert!(json5::from_str::<InterpolationMethod>("'cubic'").is_err());
    }
}

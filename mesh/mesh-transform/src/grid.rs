//! Voxel grid dimensions.

use std::fmt;
use std::str::FromStr;

use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::TransformError;

/// Resolution of the target voxel grid: width (X), height (Y), depth (Z).
///
/// Parses from and displays as `WxHxD`.
///
/// # Example
///
/// ```
/// use mesh_transform::GridDims;
///
/// let dims: GridDims = "64x32x16".parse().unwrap();
/// assert_eq!((dims.width, dims.height, dims.depth), (64, 32, 16));
/// assert_eq!(dims.to_string(), "64x32x16");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridDims {
    /// Cells along X.
    pub width: u32,
    /// Cells along Y.
    pub height: u32,
    /// Cells along Z.
    pub depth: u32,
}

impl GridDims {
    /// Create grid dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// A cube grid with `n` cells per side.
    #[must_use]
    pub const fn cube(n: u32) -> Self {
        Self::new(n, n, n)
    }

    /// True if every dimension is non-zero.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0 && self.depth > 0
    }

    /// Dimensions as a floating-point extent vector.
    #[must_use]
    pub fn extent(&self) -> Vector3<f64> {
        Vector3::new(
            f64::from(self.width),
            f64::from(self.height),
            f64::from(self.depth),
        )
    }
}

impl Default for GridDims {
    fn default() -> Self {
        Self::cube(32)
    }
}

impl fmt::Display for GridDims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.depth)
    }
}

impl FromStr for GridDims {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| TransformError::InvalidDims {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = s.trim().split(['x', 'X']).collect();
        let [w, h, d] = parts.as_slice() else {
            return Err(invalid("expected three values separated by `x`"));
        };

        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|e| invalid(&format!("`{part}` is not a cell count ({e})")))
        };
        let dims = Self::new(parse(w)?, parse(h)?, parse(d)?);

        if dims.is_valid() {
            Ok(dims)
        } else {
            Err(invalid("every dimension must be at least 1"))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays() {
        let dims: GridDims = "32x64x128".parse().unwrap_or_default();
        assert_eq!(dims, GridDims::new(32, 64, 128));
        assert_eq!(dims.to_string(), "32x64x128");
    }

    #[test]
    fn accepts_upper_case_separator_and_spaces() {
        assert_eq!("8X8 x 8".parse::<GridDims>(), Ok(GridDims::cube(8)));
    }

    #[test]
    fn rejects_malformed() {
        for bad in ["", "32", "32x32", "32x32x32x32", "32xx32", "ax2x3", "-1x2x3"] {
            assert!(
                matches!(bad.parse::<GridDims>(), Err(TransformError::InvalidDims { .. })),
                "`{bad}` should not parse"
            );
        }
    }

    #[test]
    fn rejects_zero() {
        let err = "0x32x32".parse::<GridDims>().unwrap_err();
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn default_is_32_cube() {
        assert_eq!(GridDims::default().extent(), Vector3::new(32.0, 32.0, 32.0));
    }
}

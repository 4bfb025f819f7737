//! Cell value types

use num_traits::{Float, NumCast, Zero};
use std::fmt::Debug;

/// Types that can be stored in a raster cell.
///
/// Non-finite values are always nodata; an explicit sentinel marks more.
pub trait RasterElement:
    Copy + Clone + Debug + PartialOrd + PartialEq + NumCast + Zero + Send + Sync + 'static
{
    /// Check if this value represents no-data
    fn is_nodata(&self, nodata: Option<Self>) -> bool;
}

impl<F: Float + Debug + Send + Sync + 'static> RasterElement for F {
    fn is_nodata(&self, nodata: Option<Self>) -> bool {
        if !self.is_finite() {
            return true;
        }
        // sentinels stored at reduced precision still match
        let tolerance = F::epsilon() * <F as NumCast>::from(100.0).unwrap_or_else(F::one);
        nodata.is_some_and(|nd| (*self - nd).abs() <= tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_nodata() {
        assert!(f64::NAN.is_nodata(None));
        assert!(f64::INFINITY.is_nodata(None));
        assert!((-9999.0_f64).is_nodata(Some(-9999.0)));
        assert!(!100.0_f64.is_nodata(Some(-9999.0)));
        assert!(!1.5_f32.is_nodata(None));
    }
}

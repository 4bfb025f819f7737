//! Coordinate Reference System handling
//!
//! The engine only needs to know whether grid units are degrees or meters;
//! reprojection is the caller's business.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether coordinates are angular (lon/lat) or planar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrsKind {
    /// Planar coordinates in meters (UTM, state plane, ...)
    #[default]
    Projected,
    /// Longitude/latitude in degrees
    Geographic,
}

/// Coordinate Reference System representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crs {
    kind: CrsKind,
    /// EPSG code if known
    epsg: Option<u32>,
}

impl Crs {
    /// Projected CRS with an optional EPSG code
    pub fn projected(epsg: Option<u32>) -> Self {
        Self {
            kind: CrsKind::Projected,
            epsg,
        }
    }

    /// Geographic CRS with an optional EPSG code
    pub fn geographic(epsg: Option<u32>) -> Self {
        Self {
            kind: CrsKind::Geographic,
            epsg,
        }
    }

    /// Create a CRS from an EPSG code.
    ///
    /// Codes 4326 (WGS84) and 4269 (NAD83) are treated as geographic,
    /// everything else as projected.
    pub fn from_epsg(code: u32) -> Self {
        match code {
            4326 | 4269 | 4258 => Self::geographic(Some(code)),
            _ => Self::projected(Some(code)),
        }
    }

    /// WGS84 geographic CRS (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::from_epsg(4326)
    }

    /// Get EPSG code if known
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// Coordinate kind
    pub fn kind(&self) -> CrsKind {
        self.kind
    }

    /// Whether coordinates are in degrees
    pub fn is_geographic(&self) -> bool {
        self.kind == CrsKind::Geographic
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            CrsKind::Projected => "projected",
            CrsKind::Geographic => "geographic",
        };
        match self.epsg {
            Some(code) => write!(f, "EPSG:{} ({})", code, kind),
            None => write!(f, "{}", kind),
        }
    }
}

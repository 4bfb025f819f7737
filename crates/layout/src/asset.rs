//! Asset kinds and their per-kind specifications

use std::fmt;

use serde::{Deserialize, Serialize};
use sitegrade_core::{Error, Result};

/// Equipment that can be placed on a site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Substation,
    Transformer,
    Battery,
    Inverter,
    SolarArray,
}

impl AssetKind {
    pub const ALL: [AssetKind; 5] = [
        AssetKind::Substation,
        AssetKind::Transformer,
        AssetKind::Battery,
        AssetKind::Inverter,
        AssetKind::SolarArray,
    ];

    pub fn role(self) -> AssetRole {
        match self {
            AssetKind::Substation => AssetRole::Hub,
            AssetKind::Transformer => AssetRole::Infrastructure,
            AssetKind::Battery | AssetKind::Inverter => AssetRole::Support,
            AssetKind::SolarArray => AssetRole::AreaFilling,
        }
    }

    pub fn is_hub(self) -> bool {
        self.role() == AssetRole::Hub
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AssetKind::Substation => "substation",
            AssetKind::Transformer => "transformer",
            AssetKind::Battery => "battery",
            AssetKind::Inverter => "inverter",
            AssetKind::SolarArray => "solar_array",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Placement tier of an asset kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetRole {
    /// Anchor of the road network
    Hub,
    Infrastructure,
    Support,
    /// Large arrays filling the remaining land
    AreaFilling,
}

impl AssetRole {
    /// Placement order: hubs and infrastructure, then support, then area-filling
    pub fn placement_rank(self) -> u8 {
        match self {
            AssetRole::Hub | AssetRole::Infrastructure => 0,
            AssetRole::Support => 1,
            AssetRole::AreaFilling => 2,
        }
    }
}

/// Relative weights of the four suitability factors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuitabilityWeights {
    pub slope: f64,
    pub aspect: f64,
    pub curvature: f64,
    pub roughness: f64,
}

impl Default for SuitabilityWeights {
    fn default() -> Self {
        Self {
            slope: 0.4,
            aspect: 0.2,
            curvature: 0.2,
            roughness: 0.2,
        }
    }
}

impl SuitabilityWeights {
    fn as_array(&self) -> [f64; 4] {
        [self.slope, self.aspect, self.curvature, self.roughness]
    }

    /// Check the weights are finite, non-negative and not all zero
    pub fn validate(&self) -> Result<()> {
        let w = self.as_array();
        if w.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(Error::invalid_parameter(
                "weights",
                format!("{w:?}"),
                "weights must be finite and non-negative",
            ));
        }
        if w.iter().sum::<f64>() <= 0.0 {
            return Err(Error::invalid_parameter("weights", format!("{w:?}"), "weights must not all be zero"));
        }
        Ok(())
    }

    /// Weights scaled to sum to 1
    pub fn normalized(&self) -> Self {
        let total: f64 = self.as_array().iter().sum();
        if total <= 0.0 || !total.is_finite() {
            return *self;
        }
        Self {
            slope: self.slope / total,
            aspect: self.aspect / total,
            curvature: self.curvature / total,
            roughness: self.roughness / total,
        }
    }
}

/// Terrain preferences of one asset kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuitabilityConfig {
    /// Slope (degrees) at and beyond which the slope score is 0
    pub max_slope_deg: f64,
    /// Slope (degrees) at and below which the slope score is 1
    pub optimal_slope_deg: f64,
    /// Preferred facing (degrees clockwise from north), `None` if indifferent
    pub preferred_aspect_deg: Option<f64>,
    /// Angular distance from the preferred aspect at which the score reaches 0
    pub aspect_tolerance_deg: f64,
    /// Curvature magnitude (1/m) at which the curvature score reaches 0
    pub max_curvature: f64,
    /// Roughness (m) at which the roughness score reaches 0
    pub max_roughness: f64,
    pub weights: SuitabilityWeights,
}

impl Default for SuitabilityConfig {
    fn default() -> Self {
        Self {
            max_slope_deg: 10.0,
            optimal_slope_deg: 3.0,
            preferred_aspect_deg: None,
            aspect_tolerance_deg: 90.0,
            max_curvature: 0.1,
            max_roughness: 1.0,
            weights: SuitabilityWeights::default(),
        }
    }
}

impl SuitabilityConfig {
    pub fn validate(&self) -> Result<()> {
        let positive = |name: &'static str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(Error::invalid_parameter(name, v, "must be positive"))
            }
        };
        positive("max_slope_deg", self.max_slope_deg)?;
        positive("aspect_tolerance_deg", self.aspect_tolerance_deg)?;
        positive("max_curvature", self.max_curvature)?;
        positive("max_roughness", self.max_roughness)?;
        if !self.optimal_slope_deg.is_finite()
            || self.optimal_slope_deg < 0.0
            || self.optimal_slope_deg > self.max_slope_deg
        {
            return Err(Error::invalid_parameter(
                "optimal_slope_deg",
                self.optimal_slope_deg,
                "must lie in [0, max_slope_deg]",
            ));
        }
        if let Some(a) = self.preferred_aspect_deg {
            if !a.is_finite() {
                return Err(Error::invalid_parameter("preferred_aspect_deg", a, "must be finite"));
            }
        }
        self.weights.validate()
    }
}

/// Capacity draw range of one asset kind, in kW
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapacityRange {
    pub min_kw: f64,
    pub max_kw: f64,
    /// Per-asset capacity the range is calibrated against
    pub reference_kw: f64,
}

impl CapacityRange {
    pub fn new(min_kw: f64, max_kw: f64, reference_kw: f64) -> Self {
        Self { min_kw, max_kw, reference_kw }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min_kw.is_finite() || self.min_kw < 0.0 || !self.max_kw.is_finite() || self.max_kw < self.min_kw {
            return Err(Error::invalid_parameter(
                "capacity",
                format!("[{}, {}]", self.min_kw, self.max_kw),
                "range must be finite with 0 <= min <= max",
            ));
        }
        if !self.reference_kw.is_finite() || self.reference_kw <= 0.0 {
            return Err(Error::invalid_parameter("reference_kw", self.reference_kw, "must be positive"));
        }
        Ok(())
    }
}

/// Everything the engine needs to know about one asset kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSpec {
    pub suitability: SuitabilityConfig,
    pub capacity: CapacityRange,
    pub footprint_width_m: f64,
    pub footprint_length_m: f64,
    /// Side of the square grading pad
    pub pad_size_m: f64,
}

impl AssetSpec {
    pub fn validate(&self) -> Result<()> {
        self.suitability.validate()?;
        self.capacity.validate()?;
        for (name, v) in [
            ("footprint_width_m", self.footprint_width_m),
            ("footprint_length_m", self.footprint_length_m),
            ("pad_size_m", self.pad_size_m),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(Error::invalid_parameter(name, v, "must be positive"));
            }
        }
        Ok(())
    }

    fn default_for(kind: AssetKind) -> Self {
        let suitability = |max: f64, opt: f64| SuitabilityConfig {
            max_slope_deg: max,
            optimal_slope_deg: opt,
            ..SuitabilityConfig::default()
        };
        match kind {
            AssetKind::Substation => Self {
                suitability: suitability(5.0, 2.0),
                capacity: CapacityRange::new(800.0, 1200.0, 1000.0),
                footprint_width_m: 40.0,
                footprint_length_m: 30.0,
                pad_size_m: 50.0,
            },
            AssetKind::Transformer => Self {
                suitability: suitability(8.0, 3.0),
                capacity: CapacityRange::new(200.0, 300.0, 250.0),
                footprint_width_m: 6.0,
                footprint_length_m: 4.0,
                pad_size_m: 10.0,
            },
            AssetKind::Battery => Self {
                suitability: suitability(6.0, 2.0),
                capacity: CapacityRange::new(400.0, 600.0, 500.0),
                footprint_width_m: 15.0,
                footprint_length_m: 3.0,
                pad_size_m: 20.0,
            },
            AssetKind::Inverter => Self {
                suitability: suitability(10.0, 4.0),
                capacity: CapacityRange::new(80.0, 120.0, 100.0),
                footprint_width_m: 3.0,
                footprint_length_m: 2.0,
                pad_size_m: 6.0,
            },
            AssetKind::SolarArray => Self {
                suitability: SuitabilityConfig {
                    max_slope_deg: 15.0,
                    optimal_slope_deg: 5.0,
                    preferred_aspect_deg: Some(180.0),
                    aspect_tolerance_deg: 90.0,
                    ..SuitabilityConfig::default()
                },
                capacity: CapacityRange::new(400.0, 600.0, 500.0),
                footprint_width_m: 100.0,
                footprint_length_m: 50.0,
                pad_size_m: 30.0,
            },
        }
    }
}

fn default_substation() -> AssetSpec {
    AssetSpec::default_for(AssetKind::Substation)
}

fn default_transformer() -> AssetSpec {
    AssetSpec::default_for(AssetKind::Transformer)
}

fn default_battery() -> AssetSpec {
    AssetSpec::default_for(AssetKind::Battery)
}

fn default_inverter() -> AssetSpec {
    AssetSpec::default_for(AssetKind::Inverter)
}

fn default_solar_array() -> AssetSpec {
    AssetSpec::default_for(AssetKind::SolarArray)
}

/// One [`AssetSpec`] per [`AssetKind`]; missing entries take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetCatalog {
    #[serde(default = "default_substation")]
    pub substation: AssetSpec,
    #[serde(default = "default_transformer")]
    pub transformer: AssetSpec,
    #[serde(default = "default_battery")]
    pub battery: AssetSpec,
    #[serde(default = "default_inverter")]
    pub inverter: AssetSpec,
    #[serde(default = "default_solar_array")]
    pub solar_array: AssetSpec,
}

impl Default for AssetCatalog {
    fn default() -> Self {
        Self {
            substation: default_substation(),
            transformer: default_transformer(),
            battery: default_battery(),
            inverter: default_inverter(),
            solar_array: default_solar_array(),
        }
    }
}

impl AssetCatalog {
    pub fn spec(&self, kind: AssetKind) -> &AssetSpec {
        match kind {
            AssetKind::Substation => &self.substation,
            AssetKind::Transformer => &self.transformer,
            AssetKind::Battery => &self.battery,
            AssetKind::Inverter => &self.inverter,
            AssetKind::SolarArray => &self.solar_array,
        }
    }

    pub fn spec_mut(&mut self, kind: AssetKind) -> &mut AssetSpec {
        match kind {
            AssetKind::Substation => &mut self.substation,
            AssetKind::Transformer => &mut self.transformer,
            AssetKind::Battery => &mut self.battery,
            AssetKind::Inverter => &mut self.inverter,
            AssetKind::SolarArray => &mut self.solar_array,
        }
    }

    pub fn validate(&self) -> Result<()> {
        AssetKind::ALL.iter().try_for_each(|&k| self.spec(k).validate())
    }
}

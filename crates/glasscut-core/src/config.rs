use crate::types::OptimizeRequest;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Length unit shared by piece and stock dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Millimeter,
    #[default]
    Centimeter,
    Meter,
}

impl LengthUnit {
    /// How many squared units make up one square meter.
    pub fn per_square_meter(self) -> f64 {
        match self {
            LengthUnit::Millimeter => 1_000_000.0,
            LengthUnit::Centimeter => 10_000.0,
            LengthUnit::Meter => 1.0,
        }
    }

    pub fn to_square_meters(self, area: f64) -> f64 {
        area / self.per_square_meter()
    }
}

impl FromStr for LengthUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mm" | "millimeter" => Ok(LengthUnit::Millimeter),
            "cm" | "centimeter" => Ok(LengthUnit::Centimeter),
            "m" | "meter" => Ok(LengthUnit::Meter),
            other => Err(format!("unknown length unit '{other}' (expected mm, cm or m)")),
        }
    }
}

/// Tunables of the packing engine.
///
/// Every field has a default, so a config file only needs to list what it changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Upper bound on the number of pieces after quantities are expanded
    pub max_pieces: u64,
    /// Gap left by the cutting tool between a piece and its neighbours
    pub kerf: f64,
    /// Default for pieces that carry no rotation marker
    pub allow_rotation: bool,
    pub length_unit: LengthUnit,
}

impl OptimizerConfig {
    pub const DEFAULT_MAX_PIECES: u64 = 10_000;
    pub const DEFAULT_KERF: f64 = 0.0;

    pub fn builder() -> OptimizerConfigBuilder {
        OptimizerConfigBuilder::default()
    }

    /// Applies the per-request settings that override this config.
    pub fn with_request_overrides(mut self, request: &OptimizeRequest) -> Self {
        if let Some(allow_rotation) = request.allow_rotation {
            self.allow_rotation = allow_rotation;
        }
        if let Some(kerf) = request.kerf {
            self.kerf = kerf;
        }
        self
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_pieces: Self::DEFAULT_MAX_PIECES,
            kerf: Self::DEFAULT_KERF,
            allow_rotation: true,
            length_unit: LengthUnit::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OptimizerConfigBuilder {
    config: OptimizerConfig,
}

impl OptimizerConfigBuilder {
    pub fn max_pieces(mut self, max_pieces: u64) -> Self {
        self.config.max_pieces = max_pieces;
        self
    }

    pub fn kerf(mut self, kerf: f64) -> Self {
        self.config.kerf = kerf;
        self
    }

    pub fn allow_rotation(mut self, allow_rotation: bool) -> Self {
        self.config.allow_rotation = allow_rotation;
        self
    }

    pub fn length_unit(mut self, unit: LengthUnit) -> Self {
        self.config.length_unit = unit;
        self
    }

    pub fn build(self) -> OptimizerConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StockSheet;

    #[test]
    fn test_square_meter_conversion() {
        assert_eq!(LengthUnit::Centimeter.to_square_meters(321.0 * 225.0), 7.2225);
        assert_eq!(LengthUnit::Millimeter.to_square_meters(2_500_000.0), 2.5);
        assert_eq!(LengthUnit::Meter.to_square_meters(3.0), 3.0);
    }

    #[test]
    fn test_length_unit_from_str() {
        assert_eq!("MM".parse::<LengthUnit>(), Ok(LengthUnit::Millimeter));
        assert_eq!(" cm ".parse::<LengthUnit>(), Ok(LengthUnit::Centimeter));
        assert!("inch".parse::<LengthUnit>().is_err());
    }

    #[test]
    fn test_request_overrides() {
        let mut request = OptimizeRequest::new("100x100", StockSheet::standard());
        request.allow_rotation = Some(false);
        request.kerf = Some(0.2);

        let config = OptimizerConfig::builder()
            .max_pieces(50)
            .build()
            .with_request_overrides(&request);

        assert!(!config.allow_rotation);
        assert_eq!(config.kerf, 0.2);
        assert_eq!(config.max_pieces, 50);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: OptimizerConfig = serde_json::from_str(r#"{"kerf": 0.3}"#).unwrap();
        assert_eq!(config.kerf, 0.3);
        assert_eq!(config.max_pieces, OptimizerConfig::DEFAULT_MAX_PIECES);
        assert!(config.allow_rotation);
        assert_eq!(config.length_unit, LengthUnit::Centimeter);
    }
}

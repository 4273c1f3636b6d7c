//! Price calculation against a read-only glass catalog.

use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Read-only source of glass reference data.
pub trait GlassCatalog {
    fn categories(&self) -> Vec<GlassCategory>;

    fn glass_types(&self, category_id: u32) -> Vec<GlassType>;

    /// Looks a glass type up by id or by name (case-insensitive).
    fn resolve(&self, reference: &str) -> Option<GlassType>;
}

/// Catalog held in memory, deserializable from YAML or JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticCatalog {
    pub categories: Vec<GlassCategory>,
    pub glass_types: Vec<GlassType>,
}

impl StaticCatalog {
    /// Checks that ids are unique, every type belongs to a known category and
    /// prices are non-negative.
    pub fn validate(&self) -> Result<()> {
        let mut category_ids = HashSet::new();
        for category in &self.categories {
            if !category_ids.insert(category.id) {
                return Err(OptimizerError::InvalidInput(format!(
                    "Duplicate glass category id {}",
                    category.id
                )));
            }
        }

        let mut type_ids = HashSet::new();
        for glass in &self.glass_types {
            if !type_ids.insert(glass.id) {
                return Err(OptimizerError::InvalidInput(format!(
                    "Duplicate glass type id {}",
                    glass.id
                )));
            }
            if !category_ids.contains(&glass.category_id) {
                return Err(OptimizerError::InvalidInput(format!(
                    "Glass type '{}' references unknown category {}",
                    glass.name, glass.category_id
                )));
            }
            if !glass.price_per_square_meter.is_finite() || glass.price_per_square_meter < 0.0 {
                return Err(OptimizerError::InvalidInput(format!(
                    "Glass type '{}' has an invalid price",
                    glass.name
                )));
            }
            if !glass.min_area.is_finite() || glass.min_area < 0.0 {
                return Err(OptimizerError::InvalidInput(format!(
                    "Glass type '{}' has an invalid minimum area",
                    glass.name
                )));
            }
        }

        Ok(())
    }
}

impl Default for StaticCatalog {
    /// The reference price list shipped with the calculator.
    fn default() -> Self {
        let category = |id, name: &str| GlassCategory {
            id,
            name: name.to_string(),
        };
        let glass = |id, category_id, name: &str, price| GlassType {
            id,
            category_id,
            name: name.to_string(),
            price_per_square_meter: price,
            min_area: 0.1,
        };

        Self {
            categories: vec![
                category(1, "FLOAT"),
                category(2, "PLANIBEL"),
                category(3, "CONNEX"),
                category(4, "LACOBEL"),
            ],
            glass_types: vec![
                glass(1, 1, "2 mm Float", 11.67),
                glass(2, 1, "3 mm Float", 6.41),
                glass(3, 1, "4 mm Float", 7.74),
                glass(4, 2, "3 mm Planibel bronz", 8.25),
                glass(5, 2, "4 mm Planibel bronz", 15.20),
                glass(6, 3, "33.1 číre", 19.35),
                glass(7, 3, "44.1 číre", 23.32),
                glass(8, 4, "4mm Lacobel čierny", 19.64),
                glass(9, 4, "4mm Lacobel biely", 25.33),
            ],
        }
    }
}

impl GlassCatalog for StaticCatalog {
    fn categories(&self) -> Vec<GlassCategory> {
        self.categories.clone()
    }

    fn glass_types(&self, category_id: u32) -> Vec<GlassType> {
        self.glass_types
            .iter()
            .filter(|glass| glass.category_id == category_id)
            .cloned()
            .collect()
    }

    fn resolve(&self, reference: &str) -> Option<GlassType> {
        let reference = reference.trim();
        if let Ok(id) = reference.parse::<u32>() {
            if let Some(glass) = self.glass_types.iter().find(|g| g.id == id) {
                return Some(glass.clone());
            }
        }

        let wanted = reference.to_lowercase();
        self.glass_types
            .iter()
            .find(|glass| glass.name.to_lowercase() == wanted)
            .cloned()
    }
}

/// Prices used area plus its share of waste for glass from a catalog.
pub struct PriceCalculator<'a, C: GlassCatalog + ?Sized> {
    catalog: &'a C,
}

impl<'a, C: GlassCatalog + ?Sized> PriceCalculator<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    pub fn calculate(&self, request: &PriceRequest) -> Result<PriceBreakdown> {
        validate_price_input(request.area, request.waste_percentage)?;

        let glass = self
            .catalog
            .resolve(&request.glass_type)
            .ok_or_else(|| OptimizerError::UnknownGlassType(request.glass_type.clone()))?;

        price_breakdown(&glass, request.area, request.waste_percentage)
    }
}

/// Applies the price list of `glass` to `area` square meters with
/// `waste_percentage` percent of extra waste.
///
/// The used area is billed at no less than the glass type's minimum area.
/// Waste is always taken from the requested area.
pub fn price_breakdown(glass: &GlassType, area: f64, waste_percentage: f64) -> Result<PriceBreakdown> {
    validate_price_input(area, waste_percentage)?;

    let price = glass.price_per_square_meter;
    if !price.is_finite() || price < 0.0 {
        return Err(OptimizerError::InvalidInput(format!(
            "Glass type '{}' has an invalid price",
            glass.name
        )));
    }

    let min_area = if glass.min_area.is_finite() && glass.min_area > 0.0 {
        glass.min_area
    } else {
        0.0
    };

    let billed_area = area.max(min_area);
    let waste_area = area * waste_percentage / 100.0;
    let area_price = billed_area * price;
    let waste_price = waste_area * price;

    Ok(PriceBreakdown {
        glass_name: glass.name.clone(),
        area,
        billed_area,
        area_price,
        waste_area,
        waste_price,
        total_price: area_price + waste_price,
    })
}

fn validate_price_input(area: f64, waste_percentage: f64) -> Result<()> {
    if !area.is_finite() || area < 0.0 {
        return Err(OptimizerError::InvalidInput(format!(
            "Area must be zero or positive, got {area}"
        )));
    }
    if !waste_percentage.is_finite() || !(0.0..=100.0).contains(&waste_percentage) {
        return Err(OptimizerError::InvalidInput(format!(
            "Waste percentage must be between 0 and 100, got {waste_percentage}"
        )));
    }
    Ok(())
}

/// Rounds a monetary or area value to two decimals for display.
pub fn round_for_display(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

use super::layout::OpenSheet;
use crate::config::LengthUnit;
use crate::types::{PlacedPanel, SheetResult, StockSheet, Summary};
use std::collections::BTreeMap;

/// Sum of the areas of the placed panels.
pub fn total_area(layout: &[PlacedPanel]) -> f64 {
    layout.iter().map(PlacedPanel::area).sum()
}

/// Share of the sheet not covered by panels, in percent, clamped to `[0, 100]`.
pub fn waste_percentage(sheet_area: f64, used_area: f64) -> f64 {
    if sheet_area <= 0.0 {
        return 0.0;
    }
    ((sheet_area - used_area) / sheet_area * 100.0).clamp(0.0, 100.0)
}

pub(super) fn sheet_result(sheet_number: u32, sheet: OpenSheet) -> SheetResult {
    let used = total_area(&sheet.placements);

    SheetResult {
        sheet_number,
        stock_width: sheet.stock.width,
        stock_height: sheet.stock.height,
        total_area: used,
        waste_percentage: waste_percentage(sheet.stock.area(), used),
        layout: sheet.placements,
    }
}

/// Computes sheet counts, utilization and waste across all sheets.
pub fn summarize(sheets: &[SheetResult], unit: LengthUnit) -> Summary {
    let mut sheets_required = BTreeMap::new();
    for sheet in sheets {
        let label = StockSheet::new(sheet.stock_width, sheet.stock_height).label();
        *sheets_required.entry(label).or_insert(0) += 1;
    }

    let stock_area: f64 = sheets.iter().map(SheetResult::sheet_area).sum();
    let used_area: f64 = sheets.iter().map(|s| s.total_area).sum();
    let waste_area = (stock_area - used_area).max(0.0);

    Summary {
        total_sheets: sheets.len() as u32,
        sheets_required,
        stock_area,
        used_area,
        waste_area,
        waste_percentage: waste_percentage(stock_area, used_area),
        used_area_m2: unit.to_square_meters(used_area),
        waste_area_m2: unit.to_square_meters(waste_area),
    }
}

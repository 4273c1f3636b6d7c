//! Geometric invariants of the packing engine over seeded random inputs.

use glasscut_core::{
    calculate_price, optimize, OptimizationResult, OptimizeRequest, OptimizerConfig, Piece,
    PriceRequest, StaticCatalog, StockSheet,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TOLERANCE: f64 = 1e-6;

fn random_request(seed: u64) -> OptimizeRequest {
    let mut rng = StdRng::seed_from_u64(seed);
    let stock = StockSheet::new(
        rng.random_range(200..=400) as f64,
        rng.random_range(150..=300) as f64,
    );

    let mut request = OptimizeRequest::new("", stock);
    let count = rng.random_range(1..=25);
    for index in 0..count {
        let width = rng.random_range(5..150) as f64 + if rng.random_bool(0.3) { 0.5 } else { 0.0 };
        let height = rng.random_range(5..150) as f64;
        request.pieces.push(Piece {
            id: format!("R{}", index + 1),
            width,
            height,
            quantity: rng.random_range(1..=4),
            rotation_allowed: rng.random_bool(0.7),
        });
    }
    request
}

fn check_invariants(request: &OptimizeRequest, result: &OptimizationResult) {
    let expected_panels: u32 = request.pieces.iter().map(|p| p.quantity).sum();
    let placed_panels: usize = result.sheets.iter().map(|s| s.layout.len()).sum();
    assert_eq!(placed_panels, expected_panels as usize);

    for sheet in &result.sheets {
        for panel in &sheet.layout {
            assert!(panel.x >= 0.0 && panel.y >= 0.0, "{panel:?} starts off the sheet");
            assert!(
                panel.x + panel.width <= sheet.stock_width,
                "{panel:?} exceeds width {}",
                sheet.stock_width
            );
            assert!(
                panel.y + panel.height <= sheet.stock_height,
                "{panel:?} exceeds height {}",
                sheet.stock_height
            );
        }

        for (i, a) in sheet.layout.iter().enumerate() {
            for b in &sheet.layout[i + 1..] {
                let overlap_x = (a.x + a.width).min(b.x + b.width) - a.x.max(b.x);
                let overlap_y = (a.y + a.height).min(b.y + b.height) - a.y.max(b.y);
                assert!(
                    overlap_x <= TOLERANCE || overlap_y <= TOLERANCE,
                    "sheet {}: {a:?} overlaps {b:?}",
                    sheet.sheet_number
                );
            }
        }

        assert!((0.0..=100.0).contains(&sheet.waste_percentage));
        assert!(sheet.total_area <= sheet.sheet_area() + TOLERANCE);
    }

    assert!((0.0..=100.0).contains(&result.summary.waste_percentage));
}

#[test]
fn test_random_layouts_respect_bounds_and_never_overlap() {
    let config = OptimizerConfig::default();
    for seed in 0..200 {
        let request = random_request(seed);
        let result = optimize(&request, &config).unwrap();
        check_invariants(&request, &result);
    }
}

#[test]
fn test_random_layouts_with_kerf() {
    let config = OptimizerConfig::builder().kerf(0.2).build();
    for seed in 1000..1100 {
        let request = random_request(seed);
        let result = optimize(&request, &config).unwrap();
        check_invariants(&request, &result);
    }
}

#[test]
fn test_rotated_panels_keep_their_area() {
    let request = random_request(7);
    let result = optimize(&request, &OptimizerConfig::default()).unwrap();

    for panel in result.sheets.iter().flat_map(|s| &s.layout) {
        let source = request
            .pieces
            .iter()
            .find(|p| p.id == panel.source_piece_id)
            .unwrap();
        if panel.rotated {
            assert!(source.rotation_allowed);
            assert_eq!((panel.width, panel.height), (source.height, source.width));
        } else {
            assert_eq!((panel.width, panel.height), (source.width, source.height));
        }
    }
}

#[test]
fn test_repeated_runs_are_byte_identical() {
    for seed in 0..20 {
        let request = random_request(seed);
        let config = OptimizerConfig::default();

        let first = serde_json::to_string(&optimize(&request, &config).unwrap()).unwrap();
        let second = serde_json::to_string(&optimize(&request, &config).unwrap()).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_text_request_end_to_end() {
    let mut request = OptimizeRequest::new("120x80x2\n60x200 f\n45x45x3", StockSheet::standard());
    request.allow_rotation = Some(true);

    let result = optimize(&request, &OptimizerConfig::default()).unwrap();
    assert!(result.success);
    assert_eq!(result.sheets.iter().map(|s| s.layout.len()).sum::<usize>(), 6);

    let price = calculate_price(
        &StaticCatalog::default(),
        &PriceRequest {
            glass_type: "4 mm Float".to_string(),
            area: result.summary.used_area_m2,
            waste_percentage: result.summary.waste_percentage,
        },
    )
    .unwrap();

    assert!((price.total_price - (price.area_price + price.waste_price)).abs() < TOLERANCE);
    assert!((price.waste_area / price.area * 100.0 - result.summary.waste_percentage).abs() < TOLERANCE);
}

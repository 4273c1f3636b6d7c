//! Glass cutting layout engine and price calculator.
//!
//! The flow is stateless: parse the piece list, pack it onto stock sheets,
//! aggregate waste, and later price the used area. Results are plain values
//! owned by the caller.

pub mod config;
pub mod optimizer;
pub mod parser;
pub mod pricing;
pub mod response;
pub mod types;

pub use config::{LengthUnit, OptimizerConfig, OptimizerConfigBuilder};
pub use optimizer::{summarize, total_area, waste_percentage, Optimizer};
pub use parser::parse_dimensions;
pub use pricing::{price_breakdown, round_for_display, GlassCatalog, PriceCalculator, StaticCatalog};
pub use response::{OptimizeResponse, PriceResponse};
pub use types::*;

/// Parses the request's piece list and packs it onto the requested stock.
///
/// A request without any piece is rejected as unparseable dimensions.
pub fn optimize(request: &OptimizeRequest, config: &OptimizerConfig) -> Result<OptimizationResult> {
    let config = config.with_request_overrides(request);

    let mut pieces = parse_dimensions(&request.dimensions, config.allow_rotation)?;
    pieces.extend(request.pieces.iter().cloned());
    if pieces.is_empty() {
        return Err(ParseError::new(request.dimensions.trim(), ParseErrorKind::Malformed).into());
    }

    Optimizer::new(pieces, request.stock(), config)?.optimize()
}

/// Prices a request against `catalog`.
pub fn calculate_price<C: GlassCatalog + ?Sized>(
    catalog: &C,
    request: &PriceRequest,
) -> Result<PriceBreakdown> {
    PriceCalculator::new(catalog).calculate(request)
}

//! Response shapes handed to the rendering and reporting layers.

use crate::types::*;
use serde::{Deserialize, Serialize};

/// Response of the optimize operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeResponse {
    pub success: bool,
    #[serde(default)]
    pub sheets: Vec<SheetResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl From<Result<OptimizationResult>> for OptimizeResponse {
    fn from(result: Result<OptimizationResult>) -> Self {
        match result {
            Ok(result) => OptimizeResponse {
                success: result.success,
                sheets: result.sheets,
                summary: Some(result.summary),
                error: None,
                error_kind: None,
            },
            Err(err) => OptimizeResponse {
                success: false,
                sheets: Vec::new(),
                summary: None,
                error: Some(err.to_string()),
                error_kind: Some(err.kind()),
            },
        }
    }
}

/// Response of the price calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceBreakdown>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl From<Result<PriceBreakdown>> for PriceResponse {
    fn from(result: Result<PriceBreakdown>) -> Self {
        match result {
            Ok(price) => PriceResponse {
                success: true,
                price: Some(price),
                error: None,
                error_kind: None,
            },
            Err(err) => PriceResponse {
                success: false,
                price: None,
                error: Some(err.to_string()),
                error_kind: Some(err.kind()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{optimize, OptimizerConfig};
    use serde_json::json;

    #[test]
    fn test_successful_optimization_shape() {
        let request = OptimizeRequest::new("500x600f, 500x600f", StockSheet::new(1000.0, 600.0));
        let response = OptimizeResponse::from(optimize(&request, &OptimizerConfig::default()));
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["success"], json!(true));
        assert_eq!(value["sheets"][0]["stock_width"], json!(1000.0));
        assert_eq!(value["sheets"][0]["stock_height"], json!(600.0));
        assert_eq!(value["sheets"][0]["total_area"], json!(600000.0));
        assert_eq!(value["sheets"][0]["waste_percentage"], json!(0.0));
        assert_eq!(value["sheets"][0]["layout"][1]["x"], json!(500.0));
        assert_eq!(value["sheets"][0]["layout"][1]["rotated"], json!(false));
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_failed_optimization_shape() {
        let request = OptimizeRequest::new("1200x900", StockSheet::new(1000.0, 600.0));
        let response = OptimizeResponse::from(optimize(&request, &OptimizerConfig::default()));
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["success"], json!(false));
        assert_eq!(value["sheets"], json!([]));
        assert_eq!(value["error_kind"], json!("piece_too_large"));
        assert_eq!(
            value["error"],
            json!("Piece P1 (1200x900) does not fit on any stock sheet")
        );
    }

    #[test]
    fn test_parse_error_is_surfaced_verbatim() {
        let request = OptimizeRequest::new("500x300, 0x10", StockSheet::standard());
        let response = OptimizeResponse::from(optimize(&request, &OptimizerConfig::default()));

        assert!(!response.success);
        assert_eq!(response.error_kind, Some(ErrorKind::Parse));
        assert_eq!(
            response.error.as_deref(),
            Some("Invalid dimension '0x10': width and height must be greater than zero")
        );
    }

    #[test]
    fn test_price_response_shape() {
        let price = PriceBreakdown {
            glass_name: "4 mm Float".to_string(),
            area: 2.0,
            billed_area: 2.0,
            area_price: 15.48,
            waste_area: 0.2,
            waste_price: 1.548,
            total_price: 17.028,
        };
        let value = serde_json::to_value(PriceResponse::from(Ok(price))).unwrap();

        assert_eq!(value["success"], json!(true));
        assert_eq!(value["price"]["glass_name"], json!("4 mm Float"));
        assert_eq!(value["price"]["area_price"], json!(15.48));
        assert_eq!(value["price"]["waste_price"], json!(1.548));
    }

    #[test]
    fn test_price_error_response() {
        let response =
            PriceResponse::from(Err(OptimizerError::UnknownGlassType("mystery".into())));
        let value = serde_json::to_value(response).unwrap();

        assert_eq!(value["success"], json!(false));
        assert_eq!(value["error_kind"], json!("unknown_glass_type"));
        assert!(value.get("price").is_none());
    }
}

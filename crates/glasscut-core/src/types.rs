use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Width of the standard stock sheet, in centimeters
pub const STANDARD_STOCK_WIDTH: f64 = 321.0;
/// Height of the standard stock sheet, in centimeters
pub const STANDARD_STOCK_HEIGHT: f64 = 225.0;

/// Glass piece requested by the customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub id: String,
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Whether the packer may swap width and height
    #[serde(default = "default_true")]
    pub rotation_allowed: bool,
}

impl Piece {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// Raw sheet the pieces are cut from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StockSheet {
    pub width: f64,
    pub height: f64,
}

impl StockSheet {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The 321x225 sheet stocked by default.
    pub fn standard() -> Self {
        Self::new(STANDARD_STOCK_WIDTH, STANDARD_STOCK_HEIGHT)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Label used to group sheets of the same size, e.g. `321x225`.
    pub fn label(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

impl Default for StockSheet {
    fn default() -> Self {
        Self::standard()
    }
}

/// Placement of a piece on a sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedPanel {
    pub source_piece_id: String,
    pub x: f64,
    pub y: f64,
    /// Width as laid on the sheet (after rotation)
    pub width: f64,
    /// Height as laid on the sheet (after rotation)
    pub height: f64,
    pub rotated: bool,
}

impl PlacedPanel {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Returns true when the interiors of both panels intersect.
    /// Panels that only share an edge do not overlap.
    pub fn overlaps(&self, other: &PlacedPanel) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

/// Layout of a single stock sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetResult {
    /// 1-based position in the order sheets were opened
    pub sheet_number: u32,
    pub stock_width: f64,
    pub stock_height: f64,
    pub layout: Vec<PlacedPanel>,
    /// Sum of the placed panel areas, in stock units squared
    pub total_area: f64,
    pub waste_percentage: f64,
}

impl SheetResult {
    pub fn sheet_area(&self) -> f64 {
        self.stock_width * self.stock_height
    }
}

/// Totals across every sheet of a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_sheets: u32,
    /// How many sheets of each stock size are needed, keyed by `WxH`
    pub sheets_required: BTreeMap<String, u32>,
    pub stock_area: f64,
    pub used_area: f64,
    pub waste_area: f64,
    pub waste_percentage: f64,
    /// Used area converted to square meters, ready for pricing
    pub used_area_m2: f64,
    pub waste_area_m2: f64,
}

/// Output of the packing engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub success: bool,
    pub sheets: Vec<SheetResult>,
    pub summary: Summary,
}

/// Input of the optimize operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeRequest {
    /// Free-text piece list such as `500x300x2, 400x200`
    #[serde(default, alias = "dimensions_text", alias = "dimensionsText")]
    pub dimensions: String,
    /// Structured pieces, packed after the ones parsed from `dimensions`
    #[serde(default)]
    pub pieces: Vec<Piece>,
    #[serde(default = "default_stock_width", alias = "stockWidth")]
    pub stock_width: f64,
    #[serde(default = "default_stock_height", alias = "stockHeight")]
    pub stock_height: f64,
    /// Alternate sheet sizes, tried in order after the primary one
    #[serde(default)]
    pub stock_sheets: Vec<StockSheet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_rotation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kerf: Option<f64>,
}

impl OptimizeRequest {
    pub fn new(dimensions: impl Into<String>, stock: StockSheet) -> Self {
        Self {
            dimensions: dimensions.into(),
            pieces: Vec::new(),
            stock_width: stock.width,
            stock_height: stock.height,
            stock_sheets: Vec::new(),
            allow_rotation: None,
            kerf: None,
        }
    }

    /// Primary sheet followed by the alternates.
    pub fn stock(&self) -> Vec<StockSheet> {
        let mut stock = vec![StockSheet::new(self.stock_width, self.stock_height)];
        stock.extend(self.stock_sheets.iter().copied());
        stock
    }
}

/// Glass category from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlassCategory {
    pub id: u32,
    pub name: String,
}

/// Glass type from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlassType {
    pub id: u32,
    pub category_id: u32,
    pub name: String,
    #[serde(alias = "price_per_m2")]
    pub price_per_square_meter: f64,
    /// Smallest area billed for one order, in square meters
    #[serde(default)]
    pub min_area: f64,
}

/// Input of the price calculation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceRequest {
    /// Glass type name or id
    #[serde(alias = "glassType")]
    pub glass_type: String,
    /// Billed area in square meters
    pub area: f64,
    #[serde(default, alias = "wastePercentage")]
    pub waste_percentage: f64,
}

/// Priced result. Values are kept unrounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub glass_name: String,
    pub area: f64,
    /// `area` raised to the glass type's minimum
    pub billed_area: f64,
    pub area_price: f64,
    pub waste_area: f64,
    pub waste_price: f64,
    pub total_price: f64,
}

/// Why a piece specification was rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("expected WIDTHxHEIGHT or WIDTHxHEIGHTxQUANTITY")]
    Malformed,

    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("width and height must be greater than zero")]
    NonPositive,

    #[error("quantity must be a whole number of at least 1")]
    InvalidQuantity,

    #[error("unknown marker '{0}' (use 'r' to allow rotation or 'f' to fix orientation)")]
    UnknownMarker(char),
}

/// Malformed dimension input
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid dimension '{token}': {kind}")]
pub struct ParseError {
    pub token: String,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(token: impl Into<String>, kind: ParseErrorKind) -> Self {
        Self {
            token: token.into(),
            kind,
        }
    }
}

/// Error type for optimization and pricing
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OptimizerError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Piece {id} ({width}x{height}) does not fit on any stock sheet")]
    PieceTooLarge { id: String, width: f64, height: f64 },

    #[error("Too many pieces: {count} requested, limit is {limit}")]
    TooManyPieces { count: u64, limit: u64 },

    #[error("Unknown glass type '{0}'")]
    UnknownGlassType(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Machine-readable category of an [`OptimizerError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Parse,
    PieceTooLarge,
    TooManyPieces,
    UnknownGlassType,
    InvalidInput,
}

impl OptimizerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OptimizerError::Parse(_) => ErrorKind::Parse,
            OptimizerError::PieceTooLarge { .. } => ErrorKind::PieceTooLarge,
            OptimizerError::TooManyPieces { .. } => ErrorKind::TooManyPieces,
            OptimizerError::UnknownGlassType(_) => ErrorKind::UnknownGlassType,
            OptimizerError::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }
}

pub type Result<T> = std::result::Result<T, OptimizerError>;

fn default_quantity() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_stock_width() -> f64 {
    STANDARD_STOCK_WIDTH
}

fn default_stock_height() -> f64 {
    STANDARD_STOCK_HEIGHT
}

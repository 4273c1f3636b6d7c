use crate::config::OptimizerConfig;
use crate::types::*;
use std::cmp::Ordering;

mod layout;
mod summary;

use layout::OpenSheet;
pub use summary::{summarize, total_area, waste_percentage};

/// Single rectangle to place, produced by expanding a piece's quantity.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct UnitPiece {
    pub id: String,
    /// Position of the source piece in the input
    pub order: usize,
    pub width: f64,
    pub height: f64,
    pub rotation_allowed: bool,
}

impl UnitPiece {
    fn area(&self) -> f64 {
        self.width * self.height
    }

    fn longest_side(&self) -> f64 {
        self.width.max(self.height)
    }
}

/// Packs rectangular pieces onto stock sheets with a first-fit guillotine heuristic.
pub struct Optimizer {
    pieces: Vec<Piece>,
    stock: Vec<StockSheet>,
    config: OptimizerConfig,
}

impl Optimizer {
    /// Validates the input and builds a new optimizer instance.
    pub fn new(pieces: Vec<Piece>, stock: Vec<StockSheet>, config: OptimizerConfig) -> Result<Self> {
        if stock.is_empty() {
            return Err(OptimizerError::InvalidInput(
                "At least one stock sheet size must be provided".to_string(),
            ));
        }

        for sheet in &stock {
            if !is_positive(sheet.width) || !is_positive(sheet.height) {
                return Err(OptimizerError::InvalidInput(format!(
                    "Stock sheet {}x{} must have a positive width and height",
                    sheet.width, sheet.height
                )));
            }
        }

        if !config.kerf.is_finite() || config.kerf < 0.0 {
            return Err(OptimizerError::InvalidInput(format!(
                "Kerf must be zero or positive, got {}",
                config.kerf
            )));
        }

        if pieces.is_empty() {
            return Err(OptimizerError::InvalidInput(
                "At least one piece must be provided".to_string(),
            ));
        }

        for piece in &pieces {
            if !is_positive(piece.width) || !is_positive(piece.height) {
                return Err(OptimizerError::InvalidInput(format!(
                    "Piece {} must have a positive width and height",
                    piece.id
                )));
            }
            if piece.quantity == 0 {
                return Err(OptimizerError::InvalidInput(format!(
                    "Piece {} must have a quantity of at least 1",
                    piece.id
                )));
            }
        }

        let count: u64 = pieces.iter().map(|p| u64::from(p.quantity)).sum();
        if count > config.max_pieces {
            return Err(OptimizerError::TooManyPieces {
                count,
                limit: config.max_pieces,
            });
        }

        Ok(Self {
            pieces,
            stock,
            config,
        })
    }

    /// Executes the full optimization flow and returns the packed sheets.
    ///
    /// Fails without packing anything when a piece fits no stock size.
    pub fn optimize(&self) -> Result<OptimizationResult> {
        self.ensure_every_piece_fits()?;

        let units = self.ordered_units();
        let open_sheets = self.pack(&units);

        let sheets: Vec<SheetResult> = open_sheets
            .into_iter()
            .zip(1..)
            .map(|(sheet, number)| summary::sheet_result(number, sheet))
            .collect();
        let summary = summarize(&sheets, self.config.length_unit);

        Ok(OptimizationResult {
            success: true,
            sheets,
            summary,
        })
    }

    fn ensure_every_piece_fits(&self) -> Result<()> {
        for piece in &self.pieces {
            let unit = UnitPiece {
                id: piece.id.clone(),
                order: 0,
                width: piece.width,
                height: piece.height,
                rotation_allowed: piece.rotation_allowed,
            };
            if self.stock_for(&unit).is_none() {
                return Err(OptimizerError::PieceTooLarge {
                    id: piece.id.clone(),
                    width: piece.width,
                    height: piece.height,
                });
            }
        }
        Ok(())
    }

    /// Duplicates pieces according to their quantity and sorts them into
    /// processing order: area descending, then longest side descending, then
    /// input order.
    pub(crate) fn ordered_units(&self) -> Vec<UnitPiece> {
        let mut units = Vec::new();
        for (order, piece) in self.pieces.iter().enumerate() {
            for _ in 0..piece.quantity {
                units.push(UnitPiece {
                    id: piece.id.clone(),
                    order,
                    width: piece.width,
                    height: piece.height,
                    rotation_allowed: piece.rotation_allowed,
                });
            }
        }

        units.sort_by(|a, b| {
            b.area()
                .partial_cmp(&a.area())
                .unwrap_or(Ordering::Equal)
                .then_with(|| {
                    b.longest_side()
                        .partial_cmp(&a.longest_side())
                        .unwrap_or(Ordering::Equal)
                })
                .then_with(|| a.order.cmp(&b.order))
        });
        units
    }

    /// Places units in order: first fitting region across the open sheets,
    /// otherwise a freshly opened sheet.
    fn pack(&self, units: &[UnitPiece]) -> Vec<OpenSheet> {
        let kerf = self.config.kerf;
        let mut sheets: Vec<OpenSheet> = Vec::new();

        for unit in units {
            let existing = sheets
                .iter()
                .enumerate()
                .find_map(|(index, sheet)| sheet.find_fit(unit, kerf).map(|fit| (index, fit)));

            if let Some((index, fit)) = existing {
                sheets[index].place(unit, fit, kerf);
                continue;
            }

            // Every unit fits some stock size, checked before packing starts.
            if let Some(stock) = self.stock_for(unit) {
                let mut sheet = OpenSheet::new(stock);
                if let Some(fit) = sheet.find_fit(unit, kerf) {
                    sheet.place(unit, fit, kerf);
                }
                sheets.push(sheet);
            }
        }

        sheets
    }

    /// First configured stock size able to host the unit.
    fn stock_for(&self, unit: &UnitPiece) -> Option<StockSheet> {
        self.stock
            .iter()
            .copied()
            .find(|stock| OpenSheet::new(*stock).find_fit(unit, self.config.kerf).is_some())
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

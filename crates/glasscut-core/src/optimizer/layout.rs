use super::*;

/// Tolerance for length comparisons.
pub(super) const EPSILON: f64 = 1e-9;

/// Unallocated rectangle of a sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct FreeRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl FreeRegion {
    /// Whether a `width` x `height` piece fits at the region origin. The
    /// tolerance absorbs rounding in region sizes, but the piece never
    /// crosses the edges of `stock`.
    pub(super) fn fits(&self, width: f64, height: f64, stock: &StockSheet) -> bool {
        width <= self.width + EPSILON
            && height <= self.height + EPSILON
            && self.x + width <= stock.width
            && self.y + height <= stock.height
    }

    /// Splits what is left of the region once a `width` x `height` piece sits
    /// at its origin. Returns at most two regions, the one right of the piece
    /// first.
    ///
    /// The cut runs along the shorter leftover axis: when the horizontal
    /// leftover is not larger than the vertical one, the region above the piece
    /// spans the whole region width; otherwise the region right of the piece
    /// spans the whole region height.
    pub(super) fn split(&self, width: f64, height: f64, kerf: f64) -> Vec<FreeRegion> {
        let right_width = self.width - width - kerf;
        let top_height = self.height - height - kerf;
        let horizontal_cut = self.width - width <= self.height - height;

        let right = FreeRegion {
            x: self.x + width + kerf,
            y: self.y,
            width: right_width,
            height: if horizontal_cut { height } else { self.height },
        };
        let top = FreeRegion {
            x: self.x,
            y: self.y + height + kerf,
            width: if horizontal_cut { self.width } else { width },
            height: top_height,
        };

        [right, top]
            .into_iter()
            .filter(|region| region.width > EPSILON && region.height > EPSILON)
            .collect()
    }

    /// Picks the orientation for `piece` in this region, or `None` when no
    /// permitted orientation fits. Returns whether the piece is rotated.
    ///
    /// When both orientations fit, the one leaving fewer regions wins and
    /// ties keep the piece unrotated.
    pub(super) fn orientation_for(
        &self,
        piece: &UnitPiece,
        stock: &StockSheet,
        kerf: f64,
    ) -> Option<bool> {
        let upright = self.fits(piece.width, piece.height, stock);
        let turned = piece.rotation_allowed && self.fits(piece.height, piece.width, stock);

        match (upright, turned) {
            (true, true) => {
                let upright_leftovers = self.split(piece.width, piece.height, kerf).len();
                let turned_leftovers = self.split(piece.height, piece.width, kerf).len();
                Some(turned_leftovers < upright_leftovers)
            }
            (true, false) => Some(false),
            (false, true) => Some(true),
            (false, false) => None,
        }
    }
}

/// Region and orientation chosen for a piece.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Fit {
    pub region_index: usize,
    pub rotated: bool,
}

/// A sheet being filled: its placements so far and the regions still free.
#[derive(Debug, Clone)]
pub(super) struct OpenSheet {
    pub stock: StockSheet,
    pub regions: Vec<FreeRegion>,
    pub placements: Vec<PlacedPanel>,
}

impl OpenSheet {
    pub(super) fn new(stock: StockSheet) -> Self {
        Self {
            stock,
            regions: vec![FreeRegion {
                x: 0.0,
                y: 0.0,
                width: stock.width,
                height: stock.height,
            }],
            placements: Vec::new(),
        }
    }

    /// First region, in list order, able to host the piece.
    pub(super) fn find_fit(&self, piece: &UnitPiece, kerf: f64) -> Option<Fit> {
        self.regions
            .iter()
            .enumerate()
            .find_map(|(region_index, region)| {
                region
                    .orientation_for(piece, &self.stock, kerf)
                    .map(|rotated| Fit {
                        region_index,
                        rotated,
                    })
            })
    }

    /// Places the piece at the origin of the chosen region and replaces the
    /// region with its leftovers, keeping their position in the list.
    pub(super) fn place(&mut self, piece: &UnitPiece, fit: Fit, kerf: f64) {
        let region = self.regions[fit.region_index];
        let (width, height) = if fit.rotated {
            (piece.height, piece.width)
        } else {
            (piece.width, piece.height)
        };

        self.placements.push(PlacedPanel {
            source_piece_id: piece.id.clone(),
            x: region.x,
            y: region.y,
            width,
            height,
            rotated: fit.rotated,
        });

        let leftovers = region.split(width, height, kerf);
        self.regions.splice(fit.region_index..=fit.region_index, leftovers);
    }
}

//! Screenlist grid geometry.
//!
//! [`GridLayout`] is computed once per screenlist from the thumbnail count,
//! the column count, the thumbnail size and the spacing. Everything here is
//! integer arithmetic; the compositor receives the resulting pixel offsets
//! verbatim.
//!
//! Sizes come straight from command-line flags, so every product is checked:
//! a grid whose canvas would not fit in [`MAX_CANVAS_DIMENSION`] has no
//! layout at all.

/// Default thumbnail width in pixels.
pub const DEFAULT_THUMBNAIL_WIDTH: u32 = 256;

/// Default gap between thumbnails (and around the grid border) in pixels.
pub const DEFAULT_SPACING: u32 = 16;

/// Largest canvas width or height a layout may produce.
///
/// ImageMagick geometry offsets are signed, so drawing positions must stay
/// within `i32`.
pub const MAX_CANVAS_DIMENSION: u32 = i32::MAX as u32;

/// Integer division rounding up.
///
/// `div_round_up(27, 3) == 9`, `div_round_up(28, 3) == 10`.
///
/// # Panics
///
/// Panics if `b` is zero.
pub fn div_round_up(a: u32, b: u32) -> u32 {
    let quotient = a / b;
    if a % b > 0 { quotient + 1 } else { quotient }
}

/// Height of a thumbnail `thumbnail_width` pixels wide that keeps the
/// source aspect ratio, truncated to a whole pixel.
///
/// Returns `None` for a zero-width source or a height that does not fit in
/// a `u32`.
pub fn thumbnail_height(
    thumbnail_width: u32,
    source_width: u32,
    source_height: u32,
) -> Option<u32> {
    if source_width == 0 {
        return None;
    }
    let height =
        u64::from(thumbnail_width) * u64::from(source_height) / u64::from(source_width);
    u32::try_from(height).ok()
}

/// `cells * cell + (cells + 1) * spacing`, or `None` past
/// [`MAX_CANVAS_DIMENSION`].
fn canvas_extent(cells: u32, cell: u32, spacing: u32) -> Option<u32> {
    let extent = u64::from(cells)
        .checked_mul(u64::from(cell))?
        .checked_add((u64::from(cells) + 1).checked_mul(u64::from(spacing))?)?;
    u32::try_from(extent)
        .ok()
        .filter(|&extent| extent <= MAX_CANVAS_DIMENSION)
}

/// Grid geometry of a screenlist's thumbnail panel.
///
/// Immutable once computed. Thumbnails are placed row-major: left to right,
/// then top to bottom, with `spacing` pixels between neighbours and around
/// the border.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct GridLayout {
    /// Width of one thumbnail.
    pub thumbnail_width: u32,
    /// Height of one thumbnail.
    pub thumbnail_height: u32,
    /// Thumbnails per row.
    pub columns: u32,
    /// Number of rows needed for all thumbnails.
    pub rows: u32,
    /// Gap in pixels.
    pub spacing: u32,
    /// Total panel width.
    pub canvas_width: u32,
    /// Total panel height.
    pub canvas_height: u32,
}

impl GridLayout {
    /// Compute the layout for `count` thumbnails in `columns` columns.
    ///
    /// Returns `None` when `columns` is zero or either canvas side would
    /// exceed [`MAX_CANVAS_DIMENSION`].
    pub fn new(
        count: u32,
        columns: u32,
        thumbnail_width: u32,
        thumbnail_height: u32,
        spacing: u32,
    ) -> Option<Self> {
        if columns == 0 {
            return None;
        }
        let rows = div_round_up(count, columns);
        Some(Self {
            thumbnail_width,
            thumbnail_height,
            columns,
            rows,
            spacing,
            canvas_width: canvas_extent(columns, thumbnail_width, spacing)?,
            canvas_height: canvas_extent(rows, thumbnail_height, spacing)?,
        })
    }

    /// Top-left pixel of the thumbnail at `index` (0-based, row-major).
    ///
    /// `index` must be below the thumbnail count the layout was built for.
    pub fn position(&self, index: u32) -> (u32, u32) {
        let column = index % self.columns;
        let row = index / self.columns;
        (
            column * (self.thumbnail_width + self.spacing) + self.spacing,
            row * (self.thumbnail_height + self.spacing) + self.spacing,
        )
    }
}

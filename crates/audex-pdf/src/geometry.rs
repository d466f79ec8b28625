//! Fixed page geometry for the table report.
//!
//! All measurements are in points (1/72 inch) with the origin at the
//! bottom-left corner of the page.

/// A4 landscape.
pub const PAGE_WIDTH: f32 = 842.0;
pub const PAGE_HEIGHT: f32 = 595.0;
pub const MARGIN: f32 = 36.0;

pub const TITLE_SIZE: f32 = 14.0;
pub const BODY_SIZE: f32 = 8.0;
pub const ROW_HEIGHT: f32 = 14.0;
pub const MAX_COLUMN_WIDTH: f32 = 180.0;

/// Average glyph advance of the body font as a fraction of its size.
const AVG_CHAR_WIDTH: f32 = 0.5;
const MIN_CELL_CHARS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub row_height: f32,
    pub max_column_width: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            width: PAGE_WIDTH,
            height: PAGE_HEIGHT,
            margin: MARGIN,
            row_height: ROW_HEIGHT,
            max_column_width: MAX_COLUMN_WIDTH,
        }
    }
}

impl PageGeometry {
    pub fn usable_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    pub fn title_y(&self) -> f32 {
        self.height - self.margin - TITLE_SIZE
    }

    pub fn meta_y(&self) -> f32 {
        self.title_y() - 16.0
    }

    pub fn header_y(&self) -> f32 {
        self.meta_y() - 20.0
    }

    pub fn separator_y(&self) -> f32 {
        self.header_y() - 4.0
    }

    pub fn first_row_y(&self) -> f32 {
        self.separator_y() - self.row_height
    }

    pub fn footer_y(&self) -> f32 {
        self.margin
    }

    /// Lowest baseline a body line may use without colliding with the footer.
    pub fn min_body_y(&self) -> f32 {
        self.footer_y() + 20.0
    }

    /// Data rows that fit below the header block.
    pub fn rows_per_page(&self) -> usize {
        let span = self.first_row_y() - self.min_body_y();
        if span < 0.0 {
            1
        } else {
            (span / self.row_height).floor() as usize + 1
        }
    }

    /// Usable width split evenly across `columns`, capped per column.
    pub fn column_width(&self, columns: usize) -> f32 {
        if columns == 0 {
            return self.max_column_width;
        }
        (self.usable_width() / columns as f32).min(self.max_column_width)
    }

    /// Characters that fit a cell of `width` at the body size, keeping one
    /// character of gutter.
    pub fn cell_char_budget(&self, width: f32) -> usize {
        let fit = (width / (BODY_SIZE * AVG_CHAR_WIDTH)).floor() as usize;
        fit.saturating_sub(1).max(MIN_CELL_CHARS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_page_fits_32_rows() {
        let geometry = PageGeometry::default();
        assert_eq!(geometry.first_row_y(), 491.0);
        assert_eq!(geometry.rows_per_page(), 32);
    }

    #[test]
    fn column_width_is_capped() {
        let geometry = PageGeometry::default();
        assert_eq!(geometry.column_width(2), MAX_COLUMN_WIDTH);
        assert_eq!(geometry.column_width(10), 77.0);
        assert_eq!(geometry.cell_char_budget(MAX_COLUMN_WIDTH), 44);
        assert_eq!(geometry.cell_char_budget(77.0), 18);
    }
}

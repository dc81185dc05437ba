//! Panel grid planning.
//!
//! The planner turns a [`GridSpec`] and the size of the source board into a
//! [`LayoutPlan`]: how many boards go in each direction, where every copy
//! lands and how large the panel is. The source board is never moved; the
//! first cell coincides with it and every other cell is a pure translation.

use log::{debug, info};

use kipanel_core::geometry::{Bounds, Point, Size, Transform};

use crate::error::PanelError;

/// Guards against exact fits being lost to floating point rounding.
const FIT_TOLERANCE: f64 = 1e-9;

/// Largest number of boards on one panel.
pub const MAX_BOARDS: u32 = 10_000;

/// How the grid size is requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridSpec {
    /// A fixed number of boards in each direction.
    Explicit { columns: u32, rows: u32 },
    /// As many boards as fit into the given panel size.
    Envelope { max_width: f64, max_height: f64 },
}

/// Rail widths in millimetres.
///
/// `horizontal` is the width of the strips on the left and right of the
/// panel, `vertical` the width of the strips along the top and bottom.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RailWidths {
    horizontal: f64,
    vertical: f64,
}

impl RailWidths {
    pub fn new(horizontal: f64, vertical: f64) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    pub fn horizontal(self) -> f64 {
        self.horizontal
    }

    pub fn vertical(self) -> f64 {
        self.vertical
    }

    /// Returns `true` if rails run along all four sides.
    pub fn both(self) -> bool {
        self.horizontal > 0.0 && self.vertical > 0.0
    }
}

/// One grid position of the panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    index: usize,
    column: u32,
    row: u32,
    offset: Point,
    translation: Point,
}

impl Cell {
    /// Zero-based row-major index; also the instance index of the copy.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    /// Top-left corner of the cell relative to the panel's top-left corner.
    pub fn offset(&self) -> Point {
        self.offset
    }

    /// How far the copy moves from the source board.
    pub fn translation(&self) -> Point {
        self.translation
    }

    /// The transform that moves the source board into this cell.
    pub fn transform(&self) -> Transform {
        Transform::translation(self.translation.x(), self.translation.y())
    }
}

/// The computed panel layout. Read-only once planned.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPlan {
    columns: u32,
    rows: u32,
    board: Bounds,
    padding: f64,
    rails: RailWidths,
    cells: Vec<Cell>,
    panel: Bounds,
    fitted: bool,
}

impl LayoutPlan {
    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Bounding box of the source board.
    pub fn board(&self) -> Bounds {
        self.board
    }

    pub fn padding(&self) -> f64 {
        self.padding
    }

    pub fn rails(&self) -> RailWidths {
        self.rails
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Absolute panel bounds, rails included.
    pub fn panel(&self) -> Bounds {
        self.panel
    }

    pub fn panel_size(&self) -> Size {
        self.panel.size()
    }

    /// `true` if the grid size was derived from a target panel size.
    pub fn fitted(&self) -> bool {
        self.fitted
    }

    /// Distance between the left edges of neighbouring columns.
    pub fn column_pitch(&self) -> f64 {
        self.board.width() + self.padding
    }

    /// Distance between the top edges of neighbouring rows.
    pub fn row_pitch(&self) -> f64 {
        self.board.height() + self.padding
    }

    /// Absolute bounds of the board copy in `cell`.
    pub fn cell_bounds(&self, cell: &Cell) -> Bounds {
        self.board.translate(cell.translation)
    }
}

/// Plan the panel grid.
///
/// # Errors
///
/// Returns [`PanelError::Config`] for negative padding or rails, a board
/// with no area, a grid that ends up with no boards in some direction or
/// one with more than [`MAX_BOARDS`] boards.
///
/// # Examples
///
/// ```
/// # use kipanel::layout::{plan, GridSpec, RailWidths};
/// # use kipanel_core::geometry::{Bounds, Point};
/// let board = Bounds::new(Point::new(0.0, 0.0), Point::new(40.0, 30.0));
/// let grid = GridSpec::Envelope { max_width: 100.0, max_height: 100.0 };
///
/// let plan = plan(grid, board, 2.0, RailWidths::default()).unwrap();
/// assert_eq!((plan.columns(), plan.rows()), (2, 3));
/// assert_eq!(plan.cells().len(), 6);
/// assert_eq!(plan.panel_size().width(), 82.0);
/// ```
pub fn plan(
    grid: GridSpec,
    board: Bounds,
    padding: f64,
    rails: RailWidths,
) -> Result<LayoutPlan, PanelError> {
    if padding < 0.0 {
        return Err(PanelError::Config("padding must not be negative".to_string()));
    }
    if rails.horizontal < 0.0 || rails.vertical < 0.0 {
        return Err(PanelError::Config(
            "rail widths must not be negative".to_string(),
        ));
    }
    if board.width() <= 0.0 || board.height() <= 0.0 {
        return Err(PanelError::Config(format!(
            "board outline has no area ({} x {} mm)",
            board.width(),
            board.height()
        )));
    }

    let (columns, rows, fitted) = match grid {
        GridSpec::Explicit { columns, rows } => (columns, rows, false),
        GridSpec::Envelope {
            max_width,
            max_height,
        } => {
            let columns = fit(max_width, board.width(), padding, rails.horizontal);
            let rows = fit(max_height, board.height(), padding, rails.vertical);
            debug!(max_width, max_height, columns, rows; "Fitted grid to envelope");
            (columns, rows, true)
        }
    };

    if columns == 0 || rows == 0 {
        return Err(PanelError::Config(format!(
            "a {columns} x {rows} grid holds no boards; the panel is too small for this board"
        )));
    }

    let count = columns
        .checked_mul(rows)
        .filter(|count| *count <= MAX_BOARDS)
        .ok_or_else(|| {
            PanelError::Config(format!(
                "a {columns} x {rows} grid exceeds the limit of {MAX_BOARDS} boards"
            ))
        })?;

    let column_pitch = board.width() + padding;
    let row_pitch = board.height() + padding;

    let mut cells = Vec::with_capacity(count as usize);
    for row in 0..rows {
        for column in 0..columns {
            let translation = Point::new(
                f64::from(column) * column_pitch,
                f64::from(row) * row_pitch,
            );
            cells.push(Cell {
                index: cells.len(),
                column,
                row,
                offset: translation.add_point(Point::new(rails.horizontal, rails.vertical)),
                translation,
            });
        }
    }

    let size = Size::new(
        f64::from(columns) * board.width()
            + f64::from(columns - 1) * padding
            + 2.0 * rails.horizontal,
        f64::from(rows) * board.height() + f64::from(rows - 1) * padding + 2.0 * rails.vertical,
    );
    let top_left = Point::new(
        board.min_x() - rails.horizontal,
        board.min_y() - rails.vertical,
    );
    let panel = Bounds::new_from_top_left(top_left, size);

    info!(columns, rows, width = size.width(), height = size.height(); "Layout planned");

    Ok(LayoutPlan {
        columns,
        rows,
        board,
        padding,
        rails,
        cells,
        panel,
        fitted,
    })
}

/// Largest `n` with `n * board + (n - 1) * padding + 2 * rail <= max`.
fn fit(max: f64, board: f64, padding: f64, rail: f64) -> u32 {
    let n = ((max - 2.0 * rail + padding) / (board + padding) + FIT_TOLERANCE).floor();
    if n <= 0.0 {
        0
    } else if n >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        n as u32
    }
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    fn dimension() -> impl Strategy<Value = f64> {
        (1u32..2000).prop_map(|tenths| f64::from(tenths) / 10.0)
    }

    fn spacing() -> impl Strategy<Value = f64> {
        (0u32..100).prop_map(|tenths| f64::from(tenths) / 10.0)
    }

    fn check_envelope_fits(
        max: (f64, f64),
        size: (f64, f64),
        padding: f64,
        rail: (f64, f64),
    ) -> Result<(), TestCaseError> {
        let board = Bounds::new(Point::new(0.0, 0.0), Point::new(size.0, size.1));
        let rails = RailWidths::new(rail.0, rail.1);
        let grid = GridSpec::Envelope {
            max_width: max.0,
            max_height: max.1,
        };

        let Ok(plan) = plan(grid, board, padding, rails) else {
            return Ok(());
        };

        let panel = plan.panel_size();
        prop_assert!(panel.width() <= max.0 + 1e-6);
        prop_assert!(panel.height() <= max.1 + 1e-6);

        // One more column or row would not fit.
        let wider = panel.width() + size.0 + padding;
        let taller = panel.height() + size.1 + padding;
        prop_assert!(wider > max.0 - 1e-6);
        prop_assert!(taller > max.1 - 1e-6);
        Ok(())
    }

    fn check_cells_inside_panel(
        columns: u32,
        rows: u32,
        size: (f64, f64),
        padding: f64,
        rail: (f64, f64),
    ) -> Result<(), TestCaseError> {
        let board = Bounds::new(Point::new(-10.0, 5.0), Point::new(size.0 - 10.0, size.1 + 5.0));
        let grid = GridSpec::Explicit { columns, rows };
        let plan = plan(grid, board, padding, RailWidths::new(rail.0, rail.1))
            .map_err(|err| TestCaseError::fail(err.to_string()))?;

        prop_assert_eq!(plan.cells().len(), (columns * rows) as usize);
        for (index, cell) in plan.cells().iter().enumerate() {
            prop_assert_eq!(cell.index(), index);
            prop_assert!(plan.panel().contains_approx(&plan.cell_bounds(cell), 1e-6));
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn envelope_fits(
            max in (dimension(), dimension()),
            size in (dimension(), dimension()),
            padding in spacing(),
            rail in (spacing(), spacing()),
        ) {
            check_envelope_fits(max, size, padding, rail)?;
        }

        #[test]
        fn cells_inside_panel(
            columns in 1u32..6,
            rows in 1u32..6,
            size in (dimension(), dimension()),
            padding in spacing(),
            rail in (spacing(), spacing()),
        ) {
            check_cells_inside_panel(columns, rows, size, padding, rail)?;
        }
    }
}

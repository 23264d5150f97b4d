use crate::model::{RowChild, Table, TableCell, TableRow};

/// Fallback column width when neither the grid nor the cells say anything (1 inch).
const DEFAULT_COLUMN_WIDTH: f32 = 72.0;

#[derive(Clone, Copy, Debug)]
pub struct ReconciledCell<'a> {
    pub cell: &'a TableCell,
    pub first_col: bool,
    pub last_col: bool,
}

/// Order the cells of `row` and flag the first and last column.
///
/// Naive enumeration skips cells wrapped in `w:sdt`, so when it comes up short of the
/// declared column count the raw row children are walked instead, accumulating grid
/// spans until the running column index reaches `column_count`.
pub fn reconcile_row<'a>(
    row: &'a TableRow,
    column_count: usize,
    grid_span: impl Fn(&TableCell) -> Option<u32>,
) -> Vec<ReconciledCell<'a>> {
    let naive: Vec<&TableCell> = row.cells().collect();
    if column_count <= naive.len() {
        let n = naive.len();
        return naive
            .into_iter()
            .enumerate()
            .map(|(i, cell)| ReconciledCell {
                cell,
                first_col: i == 0,
                last_col: i + 1 == n,
            })
            .collect();
    }

    let mut cells = Vec::new();
    let mut column = 0usize;
    let mut push = |cell: &'a TableCell, cells: &mut Vec<ReconciledCell<'a>>| {
        column += grid_span(cell).unwrap_or(1).max(1) as usize;
        cells.push(ReconciledCell {
            cell,
            first_col: cells.is_empty(),
            last_col: column == column_count,
        });
    };
    for child in &row.children {
        match child {
            RowChild::Cell(cell) => push(cell, &mut cells),
            RowChild::StructuredContent(wrapped) => {
                if wrapped.is_empty() {
                    log::debug!("Structured-content row child without cells, skipping");
                }
                for cell in wrapped {
                    push(cell, &mut cells);
                }
            }
        }
    }
    cells
}

/// Column widths in points: the declared grid when present, otherwise derived from
/// the first row's cell widths (spanning cells split evenly), otherwise an even split
/// of the table width.
pub fn column_widths(table: &Table) -> Vec<f32> {
    if !table.grid.is_empty() {
        return table.grid.clone();
    }

    let Some(first_row) = table.rows.first() else {
        return Vec::new();
    };

    let cells: Vec<&TableCell> = first_row.all_cells().collect();
    let columns: usize = cells
        .iter()
        .map(|c| c.grid_span.unwrap_or(1).max(1) as usize)
        .sum();
    if columns == 0 {
        return Vec::new();
    }

    if cells.iter().all(|c| c.width.is_none()) {
        let each = table
            .width
            .map(|w| w / columns as f32)
            .unwrap_or(DEFAULT_COLUMN_WIDTH);
        return vec![each; columns];
    }

    let mut widths = Vec::with_capacity(columns);
    for cell in cells {
        let span = cell.grid_span.unwrap_or(1).max(1) as usize;
        let w = cell.width.unwrap_or(DEFAULT_COLUMN_WIDTH * span as f32) / span as f32;
        widths.extend(std::iter::repeat_n(w, span));
    }
    widths
}

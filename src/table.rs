//! The table tree: tables own rows, rows own cells, and a cell may own a
//! nested table.
//!
//! Layout runs in two recursive passes over the tree. [`Table::line_count`]
//! measures how many text lines every row needs, and [`Table::draw`] emits
//! borders and text row by row, breaking pages between rows and stretching
//! the last row when the table has to fill the cell that contains it.

use crate::error::TableError;
use crate::style::{StyleDirective, StyleRegistry};
use crate::surface::{Align, Surface};
use crate::types::Pt;

/// Column alignment given either once for every column or per column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnAligns {
    All(Align),
    Each(Vec<Align>),
}

impl From<Align> for ColumnAligns {
    fn from(value: Align) -> Self {
        ColumnAligns::All(value)
    }
}

impl From<Vec<Align>> for ColumnAligns {
    fn from(value: Vec<Align>) -> Self {
        ColumnAligns::Each(value)
    }
}

impl<const N: usize> From<[Align; N]> for ColumnAligns {
    fn from(value: [Align; N]) -> Self {
        ColumnAligns::Each(value.to_vec())
    }
}

impl ColumnAligns {
    fn expand(self, columns: usize) -> Vec<Align> {
        match self {
            ColumnAligns::All(align) => vec![align; columns],
            ColumnAligns::Each(aligns) => aligns,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Nested(Box<Table>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    value: CellValue,
    directives: Vec<StyleDirective>,
}

impl Cell {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            value: CellValue::Text(text.into()),
            directives: Vec::new(),
        }
    }

    pub fn nested(table: Table) -> Self {
        Self {
            value: CellValue::Nested(Box::new(table)),
            directives: Vec::new(),
        }
    }

    pub fn value(&self) -> &CellValue {
        &self.value
    }

    pub fn is_nested(&self) -> bool {
        matches!(self.value, CellValue::Nested(_))
    }

    pub fn nested_table(&self) -> Option<&Table> {
        match &self.value {
            CellValue::Nested(table) => Some(table),
            CellValue::Text(_) => None,
        }
    }

    /// Resolved style directives in application order.
    pub fn directives(&self) -> &[StyleDirective] {
        &self.directives
    }

    pub fn line_count(&mut self, surface: &mut dyn Surface, width: Pt) -> usize {
        match &mut self.value {
            CellValue::Nested(table) => table.line_count(surface, width),
            CellValue::Text(text) => {
                apply_directives(&self.directives, surface);
                surface.line_count(width, text)
            }
        }
    }

    /// Draws the cell at the cursor and leaves the cursor at its top-right corner.
    /// A nested table ignores `align` and fills `height` instead.
    pub fn draw(
        &mut self,
        surface: &mut dyn Surface,
        width: Pt,
        height: Pt,
        align: Align,
    ) -> Result<(), TableError> {
        let (x, y) = surface.cursor();
        match &mut self.value {
            CellValue::Nested(table) => {
                table.draw(surface, width, Some(height))?;
            }
            CellValue::Text(text) => {
                apply_directives(&self.directives, surface);
                surface.draw_rect(x, y, width, height);
                let line_height = surface.default_cell_height();
                surface.draw_wrapped_text(width, line_height, text, align);
            }
        }
        surface.set_cursor(x + width, y);
        Ok(())
    }
}

fn apply_directives(directives: &[StyleDirective], surface: &mut dyn Surface) {
    for directive in directives {
        surface.apply_style(directive);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    cells: Vec<Cell>,
    is_header: bool,
}

impl Row {
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            is_header: false,
        }
    }

    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cells: values.into_iter().map(Cell::text).collect(),
            is_header: false,
        }
    }

    fn header<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            is_header: true,
            ..Self::from_values(values)
        }
    }

    pub fn push(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.cells.push(Cell::text(text));
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn is_header(&self) -> bool {
        self.is_header
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub fn line_count(&mut self, surface: &mut dyn Surface, widths: &[Pt]) -> usize {
        self.cells
            .iter_mut()
            .zip(widths)
            .map(|(cell, width)| cell.line_count(surface, *width))
            .max()
            .unwrap_or(0)
    }

    pub fn draw(
        &mut self,
        surface: &mut dyn Surface,
        widths: &[Pt],
        aligns: &[Align],
        height: Pt,
    ) -> Result<(), TableError> {
        let is_header = self.is_header;
        for ((cell, width), align) in self.cells.iter_mut().zip(widths).zip(aligns) {
            let (x, y) = surface.cursor();
            let align = if is_header { Align::Center } else { *align };
            cell.draw(surface, *width, height, align)?;
            surface.set_cursor(x + *width, y);
        }
        Ok(())
    }
}

impl Default for Row {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    widths: Vec<f32>,
    aligns: Vec<Align>,
    has_header: bool,
    rows: Vec<Row>,
    styles: StyleRegistry,
    current_row: Option<Row>,
}

impl Table {
    /// `widths` are percentages of the width the table is given at layout time.
    pub fn new(
        widths: Vec<f32>,
        aligns: impl Into<ColumnAligns>,
        header: Option<Vec<String>>,
    ) -> Result<Self, TableError> {
        let aligns = aligns.into().expand(widths.len());
        if widths.len() != aligns.len() || widths.is_empty() {
            return Err(TableError::Configuration {
                widths: widths.len(),
                aligns: aligns.len(),
            });
        }
        let mut rows = Vec::new();
        if let Some(header) = header {
            if header.len() != aligns.len() {
                return Err(TableError::HeaderMismatch {
                    header: header.len(),
                    columns: aligns.len(),
                });
            }
            rows.push(Row::header(header));
        }
        Ok(Self {
            widths,
            aligns,
            has_header: !rows.is_empty(),
            rows,
            styles: StyleRegistry::default(),
            current_row: None,
        })
    }

    pub fn column_count(&self) -> usize {
        self.aligns.len()
    }

    pub fn has_header(&self) -> bool {
        self.has_header
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn aligns(&self) -> &[Align] {
        &self.aligns
    }

    pub fn widths(&self) -> &[f32] {
        &self.widths
    }

    pub fn styles(&self) -> &StyleRegistry {
        &self.styles
    }

    /// Appends a complete row; its cell count must match the column count.
    pub fn push_row(&mut self, row: Row) -> Result<(), TableError> {
        if row.len() != self.column_count() {
            return Err(TableError::RowSize {
                row: self.rows.len(),
                expected: self.column_count(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn begin_row(&mut self) {
        self.current_row = Some(Row::new());
    }

    pub fn current_row(&self) -> Option<&Row> {
        self.current_row.as_ref()
    }

    pub fn current_row_mut(&mut self) -> Option<&mut Row> {
        self.current_row.as_mut()
    }

    /// Moves the in-progress row into the table. The slot is cleared even when
    /// the row is rejected.
    pub fn finish_row(&mut self) -> Result<(), TableError> {
        match self.current_row.take() {
            Some(row) => self.push_row(row),
            None => Err(TableError::RowSize {
                row: self.rows.len(),
                expected: self.column_count(),
                found: 0,
            }),
        }
    }

    pub fn set_row_style(&mut self, row: usize, directive: StyleDirective) {
        self.styles.set_row(row, directive);
    }

    pub fn set_column_style(&mut self, column: usize, directive: StyleDirective) {
        self.styles.set_column(column, directive);
    }

    pub fn set_cell_style(&mut self, row: usize, column: usize, directive: StyleDirective) {
        self.styles.set_cell(row, column, directive);
    }

    /// Attaches to every cell its directive list: the header/body base first,
    /// then the most specific registration. Replaces earlier results.
    pub fn resolve_styles(&mut self) {
        for (row_index, row) in self.rows.iter_mut().enumerate() {
            let is_header = row.is_header;
            for (column, cell) in row.cells.iter_mut().enumerate() {
                cell.directives = self.styles.resolve(row_index, column, is_header);
            }
        }
    }

    pub fn absolute_widths(&self, total: Pt) -> Vec<Pt> {
        self.widths.iter().map(|pct| total.percent(*pct)).collect()
    }

    /// Total wrapped lines over all rows when laid out into `width`.
    ///
    /// Applies cell styles to the surface as a side effect; the cursor is untouched.
    pub fn line_count(&mut self, surface: &mut dyn Surface, width: Pt) -> usize {
        self.resolve_styles();
        let widths = self.absolute_widths(width);
        self.rows
            .iter_mut()
            .map(|row| row.line_count(surface, &widths))
            .sum()
    }

    /// Natural height of the table laid out into `width`.
    pub fn height(&mut self, surface: &mut dyn Surface, width: Pt) -> Pt {
        let lines = self.line_count(surface, width);
        surface.default_cell_height() * lines as i32
    }

    /// Draws the table at the cursor.
    ///
    /// With `fill_height` the last row is stretched so the rows add up to
    /// exactly that height; a fill height below the content height fails
    /// before the last row is drawn.
    ///
    /// Page breaks only happen between rows. A row taller than a page is not
    /// supported: a nested table that breaks inside it leaves the sibling
    /// cells at the row's original position.
    pub fn draw(
        &mut self,
        surface: &mut dyn Surface,
        width: Pt,
        fill_height: Option<Pt>,
    ) -> Result<(), TableError> {
        self.resolve_styles();
        let widths = self.absolute_widths(width);
        let (initial_x, _) = surface.cursor();
        let cell_height = surface.default_cell_height();
        let last = self.rows.len().saturating_sub(1);
        let mut used = Pt::ZERO;
        for (index, row) in self.rows.iter_mut().enumerate() {
            let natural = cell_height * row.line_count(surface, &widths) as i32;
            let mut height = natural;
            if let Some(fill) = fill_height {
                if index == last {
                    let available = fill - used;
                    if available < natural {
                        return Err(TableError::FillHeight {
                            row: index,
                            available,
                            natural,
                        });
                    }
                    height = available;
                }
            }
            log::trace!("row {index}: natural {natural}, drawn {height}");

            if surface.page_break_if_needed(height) {
                log::debug!("page break before row {index}");
            }
            row.draw(surface, &widths, &self.aligns, height)?;

            surface.advance_line(height);
            surface.set_x(initial_x);
            used += height;
        }
        Ok(())
    }

    /// Draws the table as the outermost table, spanning the surface's content width.
    pub fn render(&mut self, surface: &mut dyn Surface) -> Result<(), TableError> {
        let width = surface.content_width();
        log::debug!(
            "rendering table: {} columns, {} rows, width {width}",
            self.column_count(),
            self.rows.len()
        );
        self.draw(surface, width, None)
    }
}

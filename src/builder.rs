//! Incremental construction of a table tree through open/close calls.
//!
//! [`TableBuilder`] keeps a stack of open contexts. The top of the stack
//! decides which calls are legal: rows open inside tables, cells inside rows,
//! and nested tables inside cells. Closing the outermost table renders it
//! onto the surface the builder borrows.

use serde_json::Value;

use crate::error::TableError;
use crate::style::StyleDirective;
use crate::surface::Surface;
use crate::table::{Cell, ColumnAligns, Row, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKind {
    Table,
    Row,
    Cell,
}

impl ContextKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContextKind::Table => "table",
            ContextKind::Row => "row",
            ContextKind::Cell => "cell",
        }
    }
}

enum Frame {
    Table,
    Row,
    /// Holds the table closed inside this cell, if any.
    Cell(Option<Table>),
}

impl Frame {
    fn kind(&self) -> ContextKind {
        match self {
            Frame::Table => ContextKind::Table,
            Frame::Row => ContextKind::Row,
            Frame::Cell(_) => ContextKind::Cell,
        }
    }
}

pub struct TableBuilder<'a> {
    surface: &'a mut dyn Surface,
    frames: Vec<Frame>,
    tables: Vec<Table>,
}

impl<'a> TableBuilder<'a> {
    pub fn new(surface: &'a mut dyn Surface) -> Self {
        Self {
            surface,
            frames: Vec::new(),
            tables: Vec::new(),
        }
    }

    /// Kind of the innermost open context.
    pub fn context(&self) -> Option<ContextKind> {
        self.frames.last().map(Frame::kind)
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// True when no table is under construction.
    pub fn is_idle(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn current_table(&self) -> Option<&Table> {
        self.tables.last()
    }

    fn require(
        &self,
        operation: &'static str,
        expected: ContextKind,
    ) -> Result<(), TableError> {
        match self.context() {
            Some(kind) if kind == expected => Ok(()),
            found => Err(TableError::ContextViolation {
                operation,
                expected: expected.as_str(),
                found,
            }),
        }
    }

    fn table_mut(&mut self, operation: &'static str) -> Result<&mut Table, TableError> {
        let found = self.context();
        self.tables.last_mut().ok_or(TableError::ContextViolation {
            operation,
            expected: "an open table",
            found,
        })
    }

    fn row_mut(&mut self, operation: &'static str) -> Result<&mut Row, TableError> {
        let found = self.context();
        self.tables
            .last_mut()
            .and_then(Table::current_row_mut)
            .ok_or(TableError::ContextViolation {
                operation,
                expected: "row",
                found,
            })
    }

    /// Opens a table at the top level or inside an open cell.
    pub fn open_table(
        &mut self,
        widths: Vec<f32>,
        aligns: impl Into<ColumnAligns>,
        header: Option<Vec<String>>,
    ) -> Result<(), TableError> {
        match self.context() {
            None | Some(ContextKind::Cell) => {}
            found => {
                return Err(TableError::ContextViolation {
                    operation: "open_table",
                    expected: "cell or no open context",
                    found,
                });
            }
        }
        if let Some(Frame::Cell(Some(_))) = self.frames.last() {
            return Err(TableError::ContextViolation {
                operation: "open_table",
                expected: "cell without a nested table",
                found: Some(ContextKind::Cell),
            });
        }
        let table = Table::new(widths, aligns, header)?;
        if self.frames.is_empty() {
            log::debug!("opening root table with {} columns", table.column_count());
        }
        self.tables.push(table);
        self.frames.push(Frame::Table);
        Ok(())
    }

    /// Closes the current table. Inside a cell the table becomes that cell's
    /// content; at the top level the whole tree is rendered.
    pub fn close_table(&mut self) -> Result<(), TableError> {
        self.require("close_table", ContextKind::Table)?;
        self.frames.pop();
        let Some(mut table) = self.tables.pop() else {
            return Err(TableError::ContextViolation {
                operation: "close_table",
                expected: "table",
                found: None,
            });
        };
        match self.frames.last_mut() {
            Some(Frame::Cell(slot)) => {
                *slot = Some(table);
                Ok(())
            }
            Some(frame) => Err(TableError::ContextViolation {
                operation: "close_table",
                expected: "cell or no open context",
                found: Some(frame.kind()),
            }),
            None => {
                table.render(&mut *self.surface)?;
                log::debug!("root table rendered");
                Ok(())
            }
        }
    }

    pub fn open_row(&mut self) -> Result<(), TableError> {
        self.require("open_row", ContextKind::Table)?;
        self.table_mut("open_row")?.begin_row();
        self.frames.push(Frame::Row);
        Ok(())
    }

    /// Closes the current row after checking it has one cell per column.
    pub fn close_row(&mut self) -> Result<(), TableError> {
        self.require("close_row", ContextKind::Row)?;
        self.frames.pop();
        self.table_mut("close_row")?.finish_row()
    }

    pub fn open_cell(&mut self) -> Result<(), TableError> {
        self.require("open_cell", ContextKind::Row)?;
        self.frames.push(Frame::Cell(None));
        Ok(())
    }

    /// Closes the current cell and appends it to the open row: the table
    /// closed inside it, or an empty text cell.
    pub fn close_cell(&mut self) -> Result<(), TableError> {
        self.require("close_cell", ContextKind::Cell)?;
        let cell = match self.frames.pop() {
            Some(Frame::Cell(Some(table))) => Cell::nested(table),
            _ => Cell::text(""),
        };
        self.row_mut("close_cell")?.push(cell);
        Ok(())
    }

    pub fn print_cell(&mut self, text: impl Into<String>) -> Result<(), TableError> {
        self.require("print_cell", ContextKind::Row)?;
        self.row_mut("print_cell")?.push_text(text);
        Ok(())
    }

    /// Like [`TableBuilder::print_cell`] for loosely typed input; only
    /// strings, numbers and booleans are accepted.
    pub fn print_value(&mut self, value: &Value) -> Result<(), TableError> {
        self.require("print_cell", ContextKind::Row)?;
        let text = scalar_text(value)?;
        self.row_mut("print_cell")?.push_text(text);
        Ok(())
    }

    /// Appends a complete row of text cells to the current table.
    pub fn print_row<I, S>(&mut self, values: I) -> Result<(), TableError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.require("print_row", ContextKind::Table)?;
        self.table_mut("print_row")?.push_row(Row::from_values(values))
    }

    pub fn print_row_values(&mut self, values: &[Value]) -> Result<(), TableError> {
        self.require("print_row", ContextKind::Table)?;
        let texts = values
            .iter()
            .map(scalar_text)
            .collect::<Result<Vec<_>, _>>()?;
        self.table_mut("print_row")?.push_row(Row::from_values(texts))
    }

    pub fn set_row_style(&mut self, row: usize, directive: StyleDirective) -> Result<(), TableError> {
        self.table_mut("set_row_style")?.set_row_style(row, directive);
        Ok(())
    }

    pub fn set_column_style(
        &mut self,
        column: usize,
        directive: StyleDirective,
    ) -> Result<(), TableError> {
        self.table_mut("set_column_style")?
            .set_column_style(column, directive);
        Ok(())
    }

    pub fn set_cell_style(
        &mut self,
        row: usize,
        column: usize,
        directive: StyleDirective,
    ) -> Result<(), TableError> {
        self.table_mut("set_cell_style")?
            .set_cell_style(row, column, directive);
        Ok(())
    }
}

fn scalar_text(value: &Value) -> Result<String, TableError> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Null => Err(non_scalar("null")),
        Value::Array(_) => Err(non_scalar("an array")),
        Value::Object(_) => Err(non_scalar("an object")),
    }
}

fn non_scalar(kind: &str) -> TableError {
    TableError::InvalidContent(format!("cell content must be a scalar value, got {kind}"))
}

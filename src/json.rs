//! Declarative table descriptions.
//!
//! A [`TableSpec`] is replayed through [`TableBuilder`] so that JSON input is
//! checked by exactly the same rules as hand-written builder calls.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::builder::TableBuilder;
use crate::error::TableError;
use crate::style::CellStyle;
use crate::surface::{Align, Surface};
use crate::table::ColumnAligns;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AlignSpec {
    All(Align),
    Each(Vec<Align>),
}

impl Default for AlignSpec {
    fn default() -> Self {
        AlignSpec::All(Align::Left)
    }
}

impl From<AlignSpec> for ColumnAligns {
    fn from(value: AlignSpec) -> Self {
        match value {
            AlignSpec::All(align) => ColumnAligns::All(align),
            AlignSpec::Each(aligns) => ColumnAligns::Each(aligns),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellSpec {
    Table(Box<TableSpec>),
    Value(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    pub widths: Vec<f32>,
    #[serde(default)]
    pub aligns: AlignSpec,
    #[serde(default)]
    pub header: Option<Vec<String>>,
    #[serde(default)]
    pub rows: Vec<Vec<CellSpec>>,
    #[serde(default)]
    pub row_styles: BTreeMap<usize, CellStyle>,
    #[serde(default)]
    pub column_styles: BTreeMap<usize, CellStyle>,
    /// Keyed by `"ROWxCOL"`, e.g. `"3x2"`.
    #[serde(default)]
    pub cell_styles: BTreeMap<String, CellStyle>,
}

impl TableSpec {
    pub fn from_json_str(raw: &str) -> Result<Self, TableError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Builds and renders this table at the surface's cursor.
    pub fn render(&self, surface: &mut dyn Surface) -> Result<(), TableError> {
        let mut builder = TableBuilder::new(surface);
        self.replay(&mut builder)
    }

    /// Emits the builder calls describing this table, from open to close.
    pub fn replay(&self, builder: &mut TableBuilder<'_>) -> Result<(), TableError> {
        builder.open_table(
            self.widths.clone(),
            self.aligns.clone(),
            self.header.clone(),
        )?;
        for (row, style) in &self.row_styles {
            builder.set_row_style(*row, style.to_directive())?;
        }
        for (column, style) in &self.column_styles {
            builder.set_column_style(*column, style.to_directive())?;
        }
        for (key, style) in &self.cell_styles {
            let (row, column) = parse_cell_key(key)?;
            builder.set_cell_style(row, column, style.to_directive())?;
        }
        for row in &self.rows {
            let values: Option<Vec<Value>> = row
                .iter()
                .map(|cell| match cell {
                    CellSpec::Value(value) => Some(value.clone()),
                    CellSpec::Table(_) => None,
                })
                .collect();
            if let Some(values) = values {
                builder.print_row_values(&values)?;
                continue;
            }
            builder.open_row()?;
            for cell in row {
                match cell {
                    CellSpec::Value(value) => builder.print_value(value)?,
                    CellSpec::Table(table) => {
                        builder.open_cell()?;
                        table.replay(builder)?;
                        builder.close_cell()?;
                    }
                }
            }
            builder.close_row()?;
        }
        builder.close_table()
    }
}

fn parse_cell_key(key: &str) -> Result<(usize, usize), TableError> {
    let parsed = key
        .split_once('x')
        .and_then(|(row, col)| Some((row.trim().parse().ok()?, col.trim().parse().ok()?)));
    parsed.ok_or_else(|| TableError::InvalidContent(format!("bad cell style key '{key}'")))
}

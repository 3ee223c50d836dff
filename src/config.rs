use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::style::CellStyle;
use crate::surface::FontStyle;
use crate::types::{Margins, Pt, Size, MM};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontFile {
    pub family: String,
    #[serde(default)]
    pub style: FontStyle,
    pub path: PathBuf,
}

/// Canvas settings. Lengths are in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// `a4`, `letter`, or `WIDTHxHEIGHT` in points.
    pub page_size: String,
    pub orientation: Orientation,
    pub margin: f32,
    pub cell_height: f32,
    pub cell_margin: f32,
    pub auto_page_break: bool,
    pub fill_cells: bool,
    pub header_style: CellStyle,
    pub body_style: CellStyle,
    pub styles: BTreeMap<String, CellStyle>,
    pub fonts: Vec<FontFile>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            page_size: "a4".to_string(),
            orientation: Orientation::Portrait,
            margin: 10.0 * MM,
            cell_height: 5.0 * MM,
            cell_margin: MM,
            auto_page_break: true,
            fill_cells: false,
            header_style: CellStyle::header(),
            body_style: CellStyle::body(),
            styles: BTreeMap::new(),
            fonts: Vec::new(),
        }
    }
}

impl CanvasConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, TableError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn page_size(&self) -> Result<Size, TableError> {
        let size = match self.page_size.trim().to_ascii_lowercase().as_str() {
            "a4" => Size::a4(),
            "letter" => Size::letter(),
            other => parse_dimensions(other).ok_or_else(|| {
                TableError::InvalidContent(format!("unknown page size '{other}'"))
            })?,
        };
        Ok(match self.orientation {
            Orientation::Portrait => size,
            Orientation::Landscape => size.landscape(),
        })
    }

    pub fn margins(&self) -> Margins {
        Margins::all(self.margin)
    }
}

fn parse_dimensions(raw: &str) -> Option<Size> {
    let (width, height) = raw.split_once('x')?;
    let width: f32 = width.trim().parse().ok()?;
    let height: f32 = height.trim().parse().ok()?;
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    Some(Size {
        width: Pt::from_f32(width),
        height: Pt::from_f32(height),
    })
}

//! The drawing capability tables are rendered against.
//!
//! Everything the layout code knows about pages, fonts and glyph metrics
//! goes through [`Surface`]. [`crate::Canvas`] is the recording
//! implementation shipped with the crate; other backends implement the
//! trait directly.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::style::StyleDirective;
use crate::types::{Color, Pt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl FromStr for Align {
    type Err = TableError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "l" | "left" => Ok(Align::Left),
            "c" | "center" | "centre" => Ok(Align::Center),
            "r" | "right" => Ok(Align::Right),
            other => Err(TableError::InvalidContent(format!(
                "unknown alignment token '{other}'"
            ))),
        }
    }
}

// Accepts the same tokens as `FromStr`, so "L" and "left" both work.
impl<'de> Deserialize<'de> for Align {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStyle {
    #[default]
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

/// Default look of a table row, supplied by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseStyle {
    Header,
    Body,
}

pub trait Surface {
    fn cursor(&self) -> (Pt, Pt);

    fn set_cursor(&mut self, x: Pt, y: Pt);

    fn set_x(&mut self, x: Pt);

    /// Moves down by `height` and back to the left margin.
    fn advance_line(&mut self, height: Pt);

    fn draw_rect(&mut self, x: Pt, y: Pt, width: Pt, height: Pt);

    /// Draws `text` wrapped into a box of `width` starting at the cursor,
    /// one line every `line_height`.
    fn draw_wrapped_text(&mut self, width: Pt, line_height: Pt, text: &str, align: Align);

    /// Number of lines `text` wraps to inside `width` with the active font. Never zero.
    fn line_count(&self, width: Pt, text: &str) -> usize;

    /// Starts a new page when `height` does not fit below the cursor.
    /// Returns true if a page was added.
    fn page_break_if_needed(&mut self, height: Pt) -> bool;

    fn apply_style(&mut self, directive: &StyleDirective);

    fn apply_base_style(&mut self, base: BaseStyle);

    /// Applies a style registered on the surface under `alias`.
    fn use_style(&mut self, alias: &str);

    fn default_cell_height(&self) -> Pt;

    /// Width between the left and right margins.
    fn content_width(&self) -> Pt;

    fn set_font(&mut self, family: &str, style: FontStyle, size: Pt);

    fn set_font_family(&mut self, family: &str);

    fn set_font_style(&mut self, style: FontStyle);

    fn set_font_size(&mut self, size: Pt);

    fn set_fill_color(&mut self, color: Color);

    fn set_text_color(&mut self, color: Color);

    fn set_draw_color(&mut self, color: Color);

    fn set_line_width(&mut self, width: Pt);
}

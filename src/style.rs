use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::surface::{BaseStyle, FontStyle, Surface};
use crate::types::{Color, Pt};

pub type StyleFn = Arc<dyn Fn(&mut dyn Surface) + Send + Sync>;

/// One unit of surface-state mutation applied right before a cell is drawn.
#[derive(Clone)]
pub enum StyleDirective {
    Base(BaseStyle),
    Font {
        family: String,
        style: FontStyle,
        size: Pt,
    },
    /// Changes only the font family, keeping the current style and size.
    FontFamily(String),
    FontStyle(FontStyle),
    FontSize(Pt),
    FillColor(Color),
    TextColor(Color),
    DrawColor(Color),
    LineWidth(Pt),
    /// A style registered on the surface by alias.
    Named(String),
    Batch(Vec<StyleDirective>),
    Custom(StyleFn),
}

impl StyleDirective {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&mut dyn Surface) + Send + Sync + 'static,
    {
        StyleDirective::Custom(Arc::new(f))
    }

    pub fn font(family: impl Into<String>, style: FontStyle, size: f32) -> Self {
        StyleDirective::Font {
            family: family.into(),
            style,
            size: Pt::from_f32(size),
        }
    }

    pub fn named(alias: impl Into<String>) -> Self {
        StyleDirective::Named(alias.into())
    }

    pub fn apply(&self, surface: &mut dyn Surface) {
        match self {
            StyleDirective::Base(base) => surface.apply_base_style(*base),
            StyleDirective::Font {
                family,
                style,
                size,
            } => surface.set_font(family, *style, *size),
            StyleDirective::FontFamily(family) => surface.set_font_family(family),
            StyleDirective::FontStyle(style) => surface.set_font_style(*style),
            StyleDirective::FontSize(size) => surface.set_font_size(*size),
            StyleDirective::FillColor(color) => surface.set_fill_color(*color),
            StyleDirective::TextColor(color) => surface.set_text_color(*color),
            StyleDirective::DrawColor(color) => surface.set_draw_color(*color),
            StyleDirective::LineWidth(width) => surface.set_line_width(*width),
            StyleDirective::Named(alias) => surface.use_style(alias),
            StyleDirective::Batch(items) => {
                for item in items {
                    item.apply(surface);
                }
            }
            StyleDirective::Custom(f) => f(surface),
        }
    }
}

impl PartialEq for StyleDirective {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Base(a), Self::Base(b)) => a == b,
            (
                Self::Font {
                    family: fa,
                    style: sa,
                    size: za,
                },
                Self::Font {
                    family: fb,
                    style: sb,
                    size: zb,
                },
            ) => fa == fb && sa == sb && za == zb,
            (Self::FontFamily(a), Self::FontFamily(b)) => a == b,
            (Self::FontStyle(a), Self::FontStyle(b)) => a == b,
            (Self::FontSize(a), Self::FontSize(b)) => a == b,
            (Self::FillColor(a), Self::FillColor(b)) => a == b,
            (Self::TextColor(a), Self::TextColor(b)) => a == b,
            (Self::DrawColor(a), Self::DrawColor(b)) => a == b,
            (Self::LineWidth(a), Self::LineWidth(b)) => a == b,
            (Self::Named(a), Self::Named(b)) => a == b,
            (Self::Batch(a), Self::Batch(b)) => a == b,
            (Self::Custom(a), Self::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for StyleDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleDirective::Base(base) => f.debug_tuple("Base").field(base).finish(),
            StyleDirective::Font {
                family,
                style,
                size,
            } => f
                .debug_struct("Font")
                .field("family", family)
                .field("style", style)
                .field("size", size)
                .finish(),
            StyleDirective::FontFamily(family) => {
                f.debug_tuple("FontFamily").field(family).finish()
            }
            StyleDirective::FontStyle(style) => f.debug_tuple("FontStyle").field(style).finish(),
            StyleDirective::FontSize(size) => f.debug_tuple("FontSize").field(size).finish(),
            StyleDirective::FillColor(c) => f.debug_tuple("FillColor").field(c).finish(),
            StyleDirective::TextColor(c) => f.debug_tuple("TextColor").field(c).finish(),
            StyleDirective::DrawColor(c) => f.debug_tuple("DrawColor").field(c).finish(),
            StyleDirective::LineWidth(w) => f.debug_tuple("LineWidth").field(w).finish(),
            StyleDirective::Named(alias) => f.debug_tuple("Named").field(alias).finish(),
            StyleDirective::Batch(items) => f.debug_tuple("Batch").field(items).finish(),
            StyleDirective::Custom(func) => {
                write!(f, "Custom({:p})", Arc::as_ptr(func) as *const ())
            }
        }
    }
}

/// Serializable description of a cell look.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellStyle {
    pub font_family: Option<String>,
    pub font_style: Option<FontStyle>,
    pub font_size: Option<f32>,
    pub fill_color: Option<[u8; 3]>,
    pub text_color: Option<[u8; 3]>,
    pub draw_color: Option<[u8; 3]>,
    pub line_width: Option<f32>,
    pub named: Option<String>,
}

impl CellStyle {
    pub fn header() -> Self {
        Self {
            font_family: Some("Arial".to_string()),
            font_style: Some(FontStyle::Bold),
            font_size: Some(9.0),
            fill_color: Some([233, 241, 219]),
            ..Self::default()
        }
    }

    pub fn body() -> Self {
        Self {
            font_family: Some("Arial".to_string()),
            font_style: Some(FontStyle::Regular),
            font_size: Some(8.0),
            fill_color: Some([255, 255, 255]),
            ..Self::default()
        }
    }

    /// Family and size together select a whole font (regular unless a style
    /// is given). Any other combination only changes the attributes it sets.
    pub fn to_directive(&self) -> StyleDirective {
        let mut items = Vec::new();
        if let Some(alias) = &self.named {
            items.push(StyleDirective::Named(alias.clone()));
        }
        match (&self.font_family, self.font_size) {
            (Some(family), Some(size)) => {
                let style = self.font_style.unwrap_or_default();
                items.push(StyleDirective::font(family.clone(), style, size));
            }
            (family, size) => {
                if let Some(family) = family {
                    items.push(StyleDirective::FontFamily(family.clone()));
                }
                if let Some(style) = self.font_style {
                    items.push(StyleDirective::FontStyle(style));
                }
                if let Some(size) = size {
                    items.push(StyleDirective::FontSize(Pt::from_f32(size)));
                }
            }
        }
        if let Some(rgb) = self.fill_color {
            items.push(StyleDirective::FillColor(Color::from_rgb8(rgb)));
        }
        if let Some(rgb) = self.text_color {
            items.push(StyleDirective::TextColor(Color::from_rgb8(rgb)));
        }
        if let Some(rgb) = self.draw_color {
            items.push(StyleDirective::DrawColor(Color::from_rgb8(rgb)));
        }
        if let Some(width) = self.line_width {
            items.push(StyleDirective::LineWidth(Pt::from_f32(width)));
        }
        StyleDirective::Batch(items)
    }
}

/// Per-table style registrations keyed by row, column and cell index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleRegistry {
    by_row: BTreeMap<usize, StyleDirective>,
    by_column: BTreeMap<usize, StyleDirective>,
    by_cell: BTreeMap<(usize, usize), StyleDirective>,
}

impl StyleRegistry {
    pub fn set_row(&mut self, row: usize, directive: StyleDirective) {
        self.by_row.insert(row, directive);
    }

    pub fn set_column(&mut self, column: usize, directive: StyleDirective) {
        self.by_column.insert(column, directive);
    }

    pub fn set_cell(&mut self, row: usize, column: usize, directive: StyleDirective) {
        self.by_cell.insert((row, column), directive);
    }

    pub fn is_empty(&self) -> bool {
        self.by_row.is_empty() && self.by_column.is_empty() && self.by_cell.is_empty()
    }

    /// The most specific registration for a cell: cell beats column beats row.
    /// Column styles never reach the header row.
    pub fn specific(&self, row: usize, column: usize, is_header: bool) -> Option<&StyleDirective> {
        self.by_cell
            .get(&(row, column))
            .or_else(|| {
                if is_header {
                    None
                } else {
                    self.by_column.get(&column)
                }
            })
            .or_else(|| self.by_row.get(&row))
    }

    /// Directives for one cell in application order, weakest first.
    pub fn resolve(&self, row: usize, column: usize, is_header: bool) -> Vec<StyleDirective> {
        let base = if is_header {
            BaseStyle::Header
        } else {
            BaseStyle::Body
        };
        let mut out = vec![StyleDirective::Base(base)];
        if let Some(directive) = self.specific(row, column, is_header) {
            out.push(directive.clone());
        }
        out
    }
}

use std::collections::HashMap;
use std::path::Path;

use crate::config::CanvasConfig;
use crate::error::TableError;
use crate::font::FontBook;
use crate::style::{CellStyle, StyleDirective};
use crate::surface::{Align, BaseStyle, FontStyle, Surface};
use crate::text::wrap_lines;
use crate::types::{Color, Margins, Pt, Size};

const MAX_STYLE_DEPTH: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetFillColor(Color),
    SetStrokeColor(Color),
    SetTextColor(Color),
    SetLineWidth(Pt),
    SetFont {
        family: String,
        style: FontStyle,
        size: Pt,
    },
    DrawRect {
        x: Pt,
        y: Pt,
        width: Pt,
        height: Pt,
    },
    Stroke,
    FillStroke,
    DrawString {
        x: Pt,
        y: Pt,
        text: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    pub commands: Vec<Command>,
}

impl Page {
    fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    pub page_size: Size,
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone)]
struct GraphicsState {
    fill_color: Color,
    stroke_color: Color,
    text_color: Color,
    line_width: Pt,
    font_family: String,
    font_style: FontStyle,
    font_size: Pt,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            fill_color: Color::WHITE,
            stroke_color: Color::BLACK,
            text_color: Color::BLACK,
            line_width: Pt::from_mm(0.2),
            font_family: "Arial".to_string(),
            font_style: FontStyle::Regular,
            font_size: Pt::from_i32(8),
        }
    }
}

/// Recording [`Surface`]: keeps a cursor over fixed-size pages and stores
/// every drawing operation as a [`Command`].
pub struct Canvas {
    page_size: Size,
    margins: Margins,
    pages: Vec<Page>,
    current: Page,
    current_state: GraphicsState,
    x: Pt,
    y: Pt,
    cell_height: Pt,
    cell_margin: Pt,
    auto_page_break: bool,
    fill_cells: bool,
    header_style: StyleDirective,
    body_style: StyleDirective,
    named_styles: HashMap<String, StyleDirective>,
    style_depth: usize,
    fonts: FontBook,
}

impl Canvas {
    /// A canvas with default settings and no registered fonts.
    pub fn new(page_size: Size) -> Self {
        CanvasBuilder::new()
            .page_size(page_size)
            .into_canvas(FontBook::default())
    }

    pub fn builder() -> CanvasBuilder {
        CanvasBuilder::new()
    }

    pub fn from_config(config: &CanvasConfig) -> Result<Self, TableError> {
        CanvasBuilder::from_config(config)?.build()
    }

    pub fn page_size(&self) -> Size {
        self.page_size
    }

    pub fn margins(&self) -> Margins {
        self.margins
    }

    pub fn set_cell_height(&mut self, height: Pt) {
        self.cell_height = height;
    }

    /// Registers a style that cells can refer to with [`StyleDirective::Named`].
    pub fn add_style(&mut self, alias: impl Into<String>, directive: StyleDirective) {
        self.named_styles.insert(alias.into(), directive);
    }

    pub fn page_count(&self) -> usize {
        self.pages.len() + 1
    }

    pub fn current_page(&self) -> &Page {
        &self.current
    }

    pub fn font_size(&self) -> Pt {
        self.current_state.font_size
    }

    pub fn font_family(&self) -> &str {
        &self.current_state.font_family
    }

    pub fn font_style(&self) -> FontStyle {
        self.current_state.font_style
    }

    pub fn fill_color(&self) -> Color {
        self.current_state.fill_color
    }

    pub fn text_color(&self) -> Color {
        self.current_state.text_color
    }

    pub fn measure_text_width(&self, text: &str) -> Pt {
        self.fonts.measure_text_width(
            &self.current_state.font_family,
            self.current_state.font_style,
            self.current_state.font_size,
            text,
        )
    }

    fn page_break_trigger(&self) -> Pt {
        self.page_size.height - self.margins.bottom
    }

    fn push(&mut self, command: Command) {
        self.current.commands.push(command);
    }

    /// Starts a new page keeping the cursor's x and the active graphics state.
    pub fn show_page(&mut self) {
        let current = std::mem::replace(&mut self.current, Page::new());
        self.pages.push(current);
        self.y = self.margins.top;
        let state = self.current_state.clone();
        self.push(Command::SetFont {
            family: state.font_family,
            style: state.font_style,
            size: state.font_size,
        });
        self.push(Command::SetFillColor(state.fill_color));
        self.push(Command::SetStrokeColor(state.stroke_color));
        self.push(Command::SetTextColor(state.text_color));
        self.push(Command::SetLineWidth(state.line_width));
        log::debug!("started page {}", self.page_count());
    }

    pub fn finish(mut self) -> Document {
        if !self.current.commands.is_empty() || self.pages.is_empty() {
            let current = std::mem::take(&mut self.current);
            self.pages.push(current);
        }
        Document {
            page_size: self.page_size,
            pages: self.pages,
        }
    }
}

impl Surface for Canvas {
    fn cursor(&self) -> (Pt, Pt) {
        (self.x, self.y)
    }

    fn set_cursor(&mut self, x: Pt, y: Pt) {
        self.x = x;
        self.y = y;
    }

    fn set_x(&mut self, x: Pt) {
        self.x = x;
    }

    fn advance_line(&mut self, height: Pt) {
        self.x = self.margins.left;
        self.y += height;
    }

    fn draw_rect(&mut self, x: Pt, y: Pt, width: Pt, height: Pt) {
        self.push(Command::DrawRect {
            x,
            y,
            width,
            height,
        });
        if self.fill_cells {
            self.push(Command::FillStroke);
        } else {
            self.push(Command::Stroke);
        }
    }

    fn draw_wrapped_text(&mut self, width: Pt, line_height: Pt, text: &str, align: Align) {
        let inner = width - self.cell_margin * 2;
        let lines = wrap_lines(text, inner, |s| self.measure_text_width(s));
        let (x0, y0) = (self.x, self.y);
        // Baseline sits 0.3em below the middle of the line box.
        let baseline = line_height / 2 + self.current_state.font_size * 0.3;
        let mut y = y0;
        for line in lines {
            let line_width = self.measure_text_width(&line);
            let x = match align {
                Align::Left => x0 + self.cell_margin,
                Align::Right => x0 + width - self.cell_margin - line_width,
                Align::Center => x0 + (width - line_width) / 2,
            };
            if !line.is_empty() {
                self.push(Command::DrawString {
                    x,
                    y: y + baseline,
                    text: line,
                });
            }
            y += line_height;
        }
        self.x = x0;
        self.y = y;
    }

    fn line_count(&self, width: Pt, text: &str) -> usize {
        let inner = width - self.cell_margin * 2;
        wrap_lines(text, inner, |s| self.measure_text_width(s))
            .len()
            .max(1)
    }

    fn page_break_if_needed(&mut self, height: Pt) -> bool {
        if self.auto_page_break && self.y + height > self.page_break_trigger() {
            self.show_page();
            return true;
        }
        false
    }

    fn apply_style(&mut self, directive: &StyleDirective) {
        directive.apply(self);
    }

    fn apply_base_style(&mut self, base: BaseStyle) {
        let directive = match base {
            BaseStyle::Header => self.header_style.clone(),
            BaseStyle::Body => self.body_style.clone(),
        };
        directive.apply(self);
    }

    fn use_style(&mut self, alias: &str) {
        if self.style_depth >= MAX_STYLE_DEPTH {
            log::warn!("style '{alias}' nests too deeply, ignored");
            return;
        }
        match self.named_styles.get(alias).cloned() {
            Some(directive) => {
                self.style_depth += 1;
                directive.apply(self);
                self.style_depth -= 1;
            }
            None => log::warn!("unknown style '{alias}' ignored"),
        }
    }

    fn default_cell_height(&self) -> Pt {
        self.cell_height
    }

    fn content_width(&self) -> Pt {
        self.page_size.width - self.margins.left - self.margins.right
    }

    fn set_font(&mut self, family: &str, style: FontStyle, size: Pt) {
        let state = &self.current_state;
        if state.font_family == family && state.font_style == style && state.font_size == size {
            return;
        }
        self.current_state.font_family = family.to_string();
        self.current_state.font_style = style;
        self.current_state.font_size = size;
        self.push(Command::SetFont {
            family: family.to_string(),
            style,
            size,
        });
    }

    fn set_font_family(&mut self, family: &str) {
        let state = &self.current_state;
        let (style, size) = (state.font_style, state.font_size);
        self.set_font(family, style, size);
    }

    fn set_font_style(&mut self, style: FontStyle) {
        let family = self.current_state.font_family.clone();
        let size = self.current_state.font_size;
        self.set_font(&family, style, size);
    }

    fn set_font_size(&mut self, size: Pt) {
        let family = self.current_state.font_family.clone();
        let style = self.current_state.font_style;
        self.set_font(&family, style, size);
    }

    fn set_fill_color(&mut self, color: Color) {
        if self.current_state.fill_color == color {
            return;
        }
        self.current_state.fill_color = color;
        self.push(Command::SetFillColor(color));
    }

    fn set_text_color(&mut self, color: Color) {
        if self.current_state.text_color == color {
            return;
        }
        self.current_state.text_color = color;
        self.push(Command::SetTextColor(color));
    }

    fn set_draw_color(&mut self, color: Color) {
        if self.current_state.stroke_color == color {
            return;
        }
        self.current_state.stroke_color = color;
        self.push(Command::SetStrokeColor(color));
    }

    fn set_line_width(&mut self, width: Pt) {
        let width = width.max(Pt::ZERO);
        if self.current_state.line_width == width {
            return;
        }
        self.current_state.line_width = width;
        self.push(Command::SetLineWidth(width));
    }
}

pub struct CanvasBuilder {
    page_size: Size,
    margins: Margins,
    cell_height: Pt,
    cell_margin: Pt,
    auto_page_break: bool,
    fill_cells: bool,
    header_style: CellStyle,
    body_style: CellStyle,
    named_styles: HashMap<String, StyleDirective>,
    font_files: Vec<(String, FontStyle, std::path::PathBuf)>,
    font_bytes: Vec<(String, FontStyle, Vec<u8>)>,
}

impl CanvasBuilder {
    pub fn new() -> Self {
        Self {
            page_size: Size::a4(),
            margins: Margins::all_mm(10.0),
            cell_height: Pt::from_mm(5.0),
            cell_margin: Pt::from_mm(1.0),
            auto_page_break: true,
            fill_cells: false,
            header_style: CellStyle::header(),
            body_style: CellStyle::body(),
            named_styles: HashMap::new(),
            font_files: Vec::new(),
            font_bytes: Vec::new(),
        }
    }

    pub fn from_config(config: &CanvasConfig) -> Result<Self, TableError> {
        let mut builder = Self::new()
            .page_size(config.page_size()?)
            .margins(config.margins())
            .cell_height(Pt::from_f32(config.cell_height))
            .cell_margin(Pt::from_f32(config.cell_margin))
            .auto_page_break(config.auto_page_break)
            .fill_cells(config.fill_cells)
            .header_style(config.header_style.clone())
            .body_style(config.body_style.clone());
        for (alias, style) in &config.styles {
            builder = builder.named_style(alias.clone(), style.to_directive());
        }
        for font in &config.fonts {
            builder = builder.font_file(font.family.clone(), font.style, &font.path);
        }
        Ok(builder)
    }

    pub fn page_size(mut self, size: Size) -> Self {
        self.page_size = size;
        self
    }

    pub fn margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    pub fn margin_all(mut self, value: f32) -> Self {
        self.margins = Margins::all(value);
        self
    }

    pub fn cell_height(mut self, height: Pt) -> Self {
        self.cell_height = height;
        self
    }

    // Horizontal padding between a cell border and its text.
    pub fn cell_margin(mut self, margin: Pt) -> Self {
        self.cell_margin = margin;
        self
    }

    pub fn auto_page_break(mut self, enabled: bool) -> Self {
        self.auto_page_break = enabled;
        self
    }

    pub fn fill_cells(mut self, enabled: bool) -> Self {
        self.fill_cells = enabled;
        self
    }

    pub fn header_style(mut self, style: CellStyle) -> Self {
        self.header_style = style;
        self
    }

    pub fn body_style(mut self, style: CellStyle) -> Self {
        self.body_style = style;
        self
    }

    pub fn named_style(mut self, alias: impl Into<String>, directive: StyleDirective) -> Self {
        self.named_styles.insert(alias.into(), directive);
        self
    }

    pub fn font_file(
        mut self,
        family: impl Into<String>,
        style: FontStyle,
        path: impl AsRef<Path>,
    ) -> Self {
        self.font_files
            .push((family.into(), style, path.as_ref().to_path_buf()));
        self
    }

    pub fn font_bytes(mut self, family: impl Into<String>, style: FontStyle, data: Vec<u8>) -> Self {
        self.font_bytes.push((family.into(), style, data));
        self
    }

    /// Builds the canvas, failing if a registered font cannot be loaded.
    pub fn build(self) -> Result<Canvas, TableError> {
        let mut fonts = FontBook::default();
        for (family, style, path) in &self.font_files {
            fonts.register_file(family, *style, path)?;
        }
        for (family, style, data) in &self.font_bytes {
            fonts.register_bytes(family, *style, data.clone())?;
        }
        Ok(self.into_canvas(fonts))
    }

    fn into_canvas(self, fonts: FontBook) -> Canvas {
        let state = GraphicsState::default();
        if !fonts.contains(&state.font_family, state.font_style) {
            log::debug!(
                "no metrics registered for {}, using fixed advance widths",
                state.font_family
            );
        }
        Canvas {
            page_size: self.page_size,
            margins: self.margins,
            pages: Vec::new(),
            current: Page::new(),
            current_state: state,
            x: self.margins.left,
            y: self.margins.top,
            cell_height: self.cell_height,
            cell_margin: self.cell_margin,
            auto_page_break: self.auto_page_break,
            fill_cells: self.fill_cells,
            header_style: self.header_style.to_directive(),
            body_style: self.body_style.to_directive(),
            named_styles: self.named_styles,
            style_depth: 0,
            fonts,
        }
    }
}

impl Default for CanvasBuilder {
    fn default() -> Self {
        Self::new()
    }
}

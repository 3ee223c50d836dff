use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::TableError;
use crate::surface::FontStyle;
use crate::types::Pt;

const FIRST_CHAR: u32 = 32;
const LAST_CHAR: u32 = 255;

/// Advance widths in 1/1000 em for the Latin-1 range, with the raw face kept
/// around for characters outside it.
#[derive(Debug)]
pub(crate) struct FontMetrics {
    widths: Vec<u16>,
    missing_width: u16,
    units_per_em: u16,
    data: Vec<u8>,
}

impl FontMetrics {
    pub(crate) fn from_bytes(data: Vec<u8>, source: &str) -> Result<Self, TableError> {
        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|err| TableError::Font(format!("invalid font data for {source}: {err}")))?;
        let units_per_em = face.units_per_em().max(1);
        let scale = 1000.0 / units_per_em as f32;
        let widths: Vec<u16> = (FIRST_CHAR..=LAST_CHAR)
            .map(|code| {
                char::from_u32(code)
                    .and_then(|ch| face.glyph_index(ch))
                    .and_then(|id| face.glyph_hor_advance(id))
                    .map(|adv| scale_advance(adv, scale))
                    .unwrap_or(0)
            })
            .collect();
        let missing_width = widths
            .get((b' ' as u32 - FIRST_CHAR) as usize)
            .copied()
            .unwrap_or(0);
        Ok(Self {
            widths,
            missing_width,
            units_per_em,
            data,
        })
    }

    fn advance_for_char<'a>(&'a self, ch: char, face: &mut Option<ttf_parser::Face<'a>>) -> u16 {
        let code = ch as u32;
        if (FIRST_CHAR..=LAST_CHAR).contains(&code) {
            let idx = (code - FIRST_CHAR) as usize;
            return self.widths.get(idx).copied().unwrap_or(self.missing_width);
        }
        if face.is_none() {
            *face = ttf_parser::Face::parse(&self.data, 0).ok();
        }
        let scale = 1000.0 / self.units_per_em as f32;
        face.as_ref()
            .and_then(|f| f.glyph_index(ch).and_then(|id| f.glyph_hor_advance(id)))
            .map(|adv| scale_advance(adv, scale))
            .unwrap_or(self.missing_width)
    }

    pub(crate) fn measure_text_width(&self, font_size: Pt, text: &str) -> Pt {
        let mut face = None;
        let total_units = text
            .chars()
            .map(|ch| self.advance_for_char(ch, &mut face) as i32)
            .fold(0i32, i32::saturating_add);
        if total_units <= 0 {
            return Pt::ZERO;
        }
        font_size.mul_ratio(total_units, 1000)
    }
}

fn scale_advance(advance: u16, scale: f32) -> u16 {
    let scaled = (advance as f32 * scale).round() as i32;
    scaled.clamp(0, u16::MAX as i32) as u16
}

/// Fonts registered per family and style. Unregistered fonts fall back to a
/// fixed advance of 0.6 em per character.
#[derive(Debug, Default)]
pub(crate) struct FontBook {
    fonts: HashMap<(String, FontStyle), FontMetrics>,
}

impl FontBook {
    pub(crate) fn register_bytes(
        &mut self,
        family: &str,
        style: FontStyle,
        data: Vec<u8>,
    ) -> Result<(), TableError> {
        let metrics = FontMetrics::from_bytes(data, family)?;
        self.fonts.insert((normalize_name(family), style), metrics);
        Ok(())
    }

    pub(crate) fn register_file(
        &mut self,
        family: &str,
        style: FontStyle,
        path: impl AsRef<Path>,
    ) -> Result<(), TableError> {
        let path = path.as_ref();
        let data = fs::read(path)
            .map_err(|err| TableError::Font(format!("{}: {err}", path.display())))?;
        self.register_bytes(family, style, data)
    }

    pub(crate) fn contains(&self, family: &str, style: FontStyle) -> bool {
        self.fonts.contains_key(&(normalize_name(family), style))
    }

    pub(crate) fn measure_text_width(
        &self,
        family: &str,
        style: FontStyle,
        font_size: Pt,
        text: &str,
    ) -> Pt {
        match self.fonts.get(&(normalize_name(family), style)) {
            Some(metrics) => metrics.measure_text_width(font_size, text),
            None => {
                let char_width = (font_size * 0.6).max(Pt::from_f32(1.0));
                char_width * (text.chars().count() as i32)
            }
        }
    }
}

fn normalize_name(name: &str) -> String {
    name.trim()
        .trim_matches('"')
        .trim_matches('\'')
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_fonts_use_fixed_advance() {
        let book = FontBook::default();
        let width = book.measure_text_width("Arial", FontStyle::Regular, Pt::from_i32(10), "abcd");
        assert_eq!(width, Pt::from_i32(24));
        assert!(!book.contains("Arial", FontStyle::Regular));
    }

    #[test]
    fn garbage_font_data_is_rejected() {
        let mut book = FontBook::default();
        let err = book
            .register_bytes("Broken", FontStyle::Bold, vec![0, 1, 2, 3])
            .unwrap_err();
        assert!(matches!(err, TableError::Font(_)));
        assert!(err.to_string().contains("Broken"));
    }

    #[test]
    fn missing_font_file_reports_path() {
        let mut book = FontBook::default();
        let err = book
            .register_file("Nope", FontStyle::Regular, "/nonexistent/tabletree/nope.ttf")
            .unwrap_err();
        assert!(err.to_string().contains("nope.ttf"));
    }
}

use crate::types::Pt;

/// Wraps `text` into lines no wider than `max_width`.
///
/// Paragraphs split on `\n` (carriage returns are dropped and a single
/// trailing newline is ignored). Words break on spaces; a word wider than
/// the line is broken between characters. Always returns at least one line.
pub fn wrap_lines<F>(text: &str, max_width: Pt, measure: F) -> Vec<String>
where
    F: Fn(&str) -> Pt,
{
    let cleaned = text.replace('\r', "");
    let cleaned = cleaned.strip_suffix('\n').unwrap_or(&cleaned);
    let mut lines = Vec::new();
    for paragraph in cleaned.split('\n') {
        wrap_paragraph(paragraph, max_width, &measure, &mut lines);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

pub fn count_lines<F>(text: &str, max_width: Pt, measure: F) -> usize
where
    F: Fn(&str) -> Pt,
{
    wrap_lines(text, max_width, measure).len()
}

fn wrap_paragraph<F>(paragraph: &str, max_width: Pt, measure: &F, out: &mut Vec<String>)
where
    F: Fn(&str) -> Pt,
{
    let mut current = String::new();
    let mut emitted = false;
    for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if measure(&candidate) <= max_width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            out.push(std::mem::take(&mut current));
            emitted = true;
        }
        if measure(word) <= max_width {
            current = word.to_string();
            continue;
        }
        let mut parts = split_long_word(word, max_width, measure);
        if let Some(last) = parts.pop() {
            emitted |= !parts.is_empty();
            out.extend(parts);
            current = last;
        }
    }
    if !current.is_empty() || !emitted {
        out.push(current);
    }
}

fn split_long_word<F>(word: &str, max_width: Pt, measure: &F) -> Vec<String>
where
    F: Fn(&str) -> Pt,
{
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_width = Pt::ZERO;
    let mut buf = [0u8; 4];
    for ch in word.chars() {
        let w = measure(ch.encode_utf8(&mut buf));
        let mut next_width = current_width + w;
        if !current.is_empty() && next_width > max_width {
            parts.push(std::mem::take(&mut current));
            next_width = w;
        }
        current.push(ch);
        current_width = next_width;
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

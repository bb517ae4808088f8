//! Page geometry and text fitting for A4 portrait reports.
//!
//! Built-in PDF fonts carry no metrics we can query cheaply, so widths are
//! estimated from an average glyph width. The estimate errs wide, which
//! only costs a little whitespace.

/// A4 width in millimetres.
pub const PAGE_WIDTH_MM: f32 = 210.0;
/// A4 height in millimetres.
pub const PAGE_HEIGHT_MM: f32 = 297.0;

pub const MARGIN_LEFT_MM: f32 = 18.0;
pub const MARGIN_RIGHT_MM: f32 = 18.0;
pub const MARGIN_TOP_MM: f32 = 14.0;

/// Space reserved at the top of each page for the running header.
pub const HEADER_HEIGHT_MM: f32 = 20.0;
/// Content never descends below this line; the footer lives beneath it.
pub const CONTENT_BOTTOM_MM: f32 = 22.0;
pub const FOOTER_BASELINE_MM: f32 = 12.0;

pub const CONTENT_WIDTH_MM: f32 = PAGE_WIDTH_MM - MARGIN_LEFT_MM - MARGIN_RIGHT_MM;

/// First content baseline below the header.
pub const CONTENT_TOP_MM: f32 = PAGE_HEIGHT_MM - MARGIN_TOP_MM - HEADER_HEIGHT_MM;

/// Points to millimetres.
pub const PT_TO_MM: f32 = 0.352_778;

/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_EM: f32 = 0.52;

/// Widths of the project table columns, summing to [`CONTENT_WIDTH_MM`].
pub const PROJECT_TABLE_WIDTHS_MM: [f32; 6] = [20.0, 46.0, 22.0, 30.0, 32.0, 24.0];

/// Line height for a font size, in millimetres.
pub fn line_height_mm(font_size_pt: f32) -> f32 {
    font_size_pt * PT_TO_MM * 1.45
}

/// Estimated rendered width of `text`, in millimetres.
pub fn text_width_mm(text: &str, font_size_pt: f32) -> f32 {
    text.chars().count() as f32 * font_size_pt * AVG_GLYPH_EM * PT_TO_MM
}

/// Characters that fit in `width_mm` at `font_size_pt`. Always at least 1.
pub fn chars_per_width(width_mm: f32, font_size_pt: f32) -> usize {
    let glyph = font_size_pt * AVG_GLYPH_EM * PT_TO_MM;
    ((width_mm / glyph).floor() as usize).max(1)
}

/// Greedy word wrap at `max_chars` per line.
///
/// Words longer than a line are hard-split.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let word: String = word.into_iter().collect();
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Cut `text` to `max_chars`, ending in `...` when shortened.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    if count <= max_chars {
        return text.to_string();
    }
    if max_chars <= 3 {
        return text.chars().take(max_chars).collect();
    }
    let mut out: String = text.chars().take(max_chars - 3).collect();
    out.push_str("...");
    out
}

/// Replace characters the built-in fonts cannot encode.
///
/// Standard PDF fonts use WinAnsi encoding; anything outside printable
/// Latin-1 is shown as `?`.
pub fn sanitize_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2013}' | '\u{2014}' => '-',
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            c if c == ' ' || (c.is_ascii_graphic()) => c,
            c if ('\u{A0}'..='\u{FF}').contains(&c) => c,
            c if c.is_whitespace() => ' ',
            _ => '?',
        })
        .collect()
}

/// Length of a bar for `value` on a track of `track_mm`, scaled to `max`.
pub fn bar_length_mm(value: u64, max: u64, track_mm: f32) -> f32 {
    if max == 0 {
        return 0.0;
    }
    (value as f32 / max as f32).min(1.0) * track_mm
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_widths_fill_content_width() {
        let total: f32 = PROJECT_TABLE_WIDTHS_MM.iter().sum();
        assert!((total - CONTENT_WIDTH_MM).abs() < 0.01);
    }

    #[test]
    fn wrap_respects_line_limit() {
        let lines = wrap_text("the quick brown fox jumps over the lazy dog", 10);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps over", "the lazy", "dog"]);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
    }

    #[test]
    fn wrap_hard_splits_long_words() {
        let lines = wrap_text("abcdefghij xy", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij", "xy"]);
    }

    #[test]
    fn wrap_empty_text_yields_no_lines() {
        assert!(wrap_text("   ", 10).is_empty());
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate_text("Community Health", 8), "Commu...");
        assert_eq!(truncate_text("Short", 8), "Short");
        assert_eq!(truncate_text("abcdef", 2), "ab");
    }

    #[test]
    fn sanitize_replaces_unencodable_characters() {
        assert_eq!(sanitize_text("a \u{2014} b"), "a - b");
        assert_eq!(sanitize_text("Kab\u{fc}l"), "Kab\u{fc}l");
        assert_eq!(sanitize_text("\u{0643}abul"), "?abul");
        assert_eq!(sanitize_text("tab\there"), "tab here");
    }

    #[test]
    fn bar_length_scales_to_track() {
        assert_eq!(bar_length_mm(50, 100, 80.0), 40.0);
        assert_eq!(bar_length_mm(100, 100, 80.0), 80.0);
        assert_eq!(bar_length_mm(5, 0, 80.0), 0.0);
    }

    #[test]
    fn chars_per_width_is_positive() {
        assert!(chars_per_width(0.1, 40.0) >= 1);
        assert!(chars_per_width(CONTENT_WIDTH_MM, 10.0) > 60);
    }
}

use lopdf::{dictionary, Dictionary, Object};
use tracing::warn;

use crate::core::win_ansi;

pub const FONT_RESOURCE: &str = "F1";
/// Courier advance width in glyph space.
pub const GLYPH_WIDTH: f32 = 600.0;

const FIRST_CHAR: i64 = 32;
const LAST_CHAR: i64 = 255;

/// Standard Courier with explicit WinAnsi widths.
pub fn font_dictionary() -> Dictionary {
    let widths: Vec<Object> = (FIRST_CHAR..=LAST_CHAR)
        .map(|_| Object::Integer(GLYPH_WIDTH as i64))
        .collect();
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
        "FirstChar" => FIRST_CHAR,
        "LastChar" => LAST_CHAR,
        "Widths" => widths,
    }
}

/// Encodes `text` for the text layer font. Characters the font cannot show
/// become `?`.
pub fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            win_ansi::encode_char(c).unwrap_or_else(|| {
                warn!("Could not find a glyph corresponding to Unicode character {c:?}");
                b'?'
            })
        })
        .collect()
}

/// Horizontal scaling, in percent, that stretches `glyphs` Courier glyphs at
/// `font_size` across `width` points.
pub fn horizontal_scaling(glyphs: usize, font_size: f32, width: f32) -> f32 {
    let natural = glyphs as f32 * GLYPH_WIDTH / 1000.0 * font_size;
    if natural <= 0.0 || width <= 0.0 {
        100.0
    } else {
        100.0 * width / natural
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unmapped_characters_become_question_marks() {
        assert_eq!(encode_text("Ça va"), vec![0xC7, b'a', b' ', b'v', b'a']);
        assert_eq!(encode_text("Дом"), b"???".to_vec());
    }

    #[test]
    fn scaling_stretches_run_to_box() {
        assert_eq!(horizontal_scaling(5, 10.0, 60.0), 200.0);
        assert_eq!(horizontal_scaling(5, 10.0, 0.0), 100.0);
    }

    #[test]
    fn widths_cover_the_encoding_range() {
        let dict = font_dictionary();
        match dict.get(b"Widths").unwrap() {
            Object::Array(widths) => assert_eq!(widths.len(), 224),
            other => panic!("unexpected widths {other:?}"),
        }
    }
}

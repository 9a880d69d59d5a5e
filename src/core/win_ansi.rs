//! WinAnsiEncoding: Latin-1 with the 0x80..=0x9F block remapped to
//! typographic punctuation.

const HIGH_BLOCK: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

/// Byte for `c`, or `None` when the encoding has no glyph for it.
pub fn encode_char(c: char) -> Option<u8> {
    let code = u32::from(c);
    match code {
        0x20..=0x7E | 0xA0..=0xFF => u8::try_from(code).ok(),
        _ => HIGH_BLOCK
            .iter()
            .position(|slot| *slot == Some(c))
            .and_then(|idx| u8::try_from(0x80 + idx).ok()),
    }
}

pub fn decode_byte(byte: u8) -> char {
    match byte {
        0x80..=0x9F => HIGH_BLOCK[usize::from(byte - 0x80)].unwrap_or('\u{FFFD}'),
        _ => char::from(byte),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin1_and_punctuation_map_both_ways() {
        for c in ['A', ' ', 'é', 'ÿ', '\u{2019}', '\u{20AC}', '\u{2014}'] {
            let byte = encode_char(c).unwrap();
            assert_eq!(decode_byte(byte), c);
        }
        assert_eq!(encode_char('\u{2019}'), Some(0x92));
    }

    #[test]
    fn unmapped_characters_have_no_byte() {
        assert_eq!(encode_char('Д'), None);
        assert_eq!(encode_char('\u{0085}'), None);
        assert_eq!(encode_char('\n'), None);
    }
}

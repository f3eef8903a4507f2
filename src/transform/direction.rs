//! Text direction detection.
//!
//! Direction follows the first strongly-directional character: Hebrew,
//! Arabic, Syriac, Thaana, NKo and their presentation forms are
//! right-to-left; Latin, Greek, Cyrillic and most other scripts are
//! left-to-right. Digits, punctuation and whitespace are neutral.

/// Writing direction of a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl,
    Neutral,
}

fn is_rtl(ch: char) -> bool {
    matches!(ch,
        '\u{0591}'..='\u{07FF}'
        | '\u{FB1D}'..='\u{FDFD}'
        | '\u{FE70}'..='\u{FEFC}')
}

fn is_ltr(ch: char) -> bool {
    matches!(ch,
        'A'..='Z'
        | 'a'..='z'
        | '\u{00C0}'..='\u{00D6}'
        | '\u{00D8}'..='\u{00F6}'
        | '\u{00F8}'..='\u{02B8}'
        | '\u{0300}'..='\u{0590}'
        | '\u{0800}'..='\u{1FFF}'
        | '\u{200E}'
        | '\u{2C00}'..='\u{FB1C}'
        | '\u{FE00}'..='\u{FE6F}'
        | '\u{FEFD}'..='\u{FFFF}')
}

/// Direction of `text`, decided by its first strong character.
#[must_use]
pub fn detect(text: &str) -> Direction {
    for ch in text.chars() {
        if is_rtl(ch) {
            return Direction::Rtl;
        }
        if is_ltr(ch) {
            return Direction::Ltr;
        }
    }
    Direction::Neutral
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin_is_ltr() {
        assert_eq!(detect("Hello world"), Direction::Ltr);
        assert_eq!(detect("  42. Ünïcode"), Direction::Ltr);
    }

    #[test]
    fn test_hebrew_and_arabic_are_rtl() {
        assert_eq!(detect("שלום עולם"), Direction::Rtl);
        assert_eq!(detect("مرحبا بالعالم"), Direction::Rtl);
        assert_eq!(detect("2024 - مرحبا"), Direction::Rtl);
    }

    #[test]
    fn test_first_strong_character_wins() {
        assert_eq!(detect("abc שלום"), Direction::Ltr);
        assert_eq!(detect("שלום abc"), Direction::Rtl);
    }

    #[test]
    fn test_no_strong_characters_is_neutral() {
        assert_eq!(detect(""), Direction::Neutral);
        assert_eq!(detect("123 - 456!"), Direction::Neutral);
    }
}

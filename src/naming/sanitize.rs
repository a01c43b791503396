//! Filename sanitizers applied to artist and song names.

use crate::constants::FORBIDDEN_CHARS;

/// Punctuation that survives the default sanitizer.
const KEPT_PUNCTUATION: &[char] = &['-', '_', ',', '.', '\'', '(', ')', '[', ']', '!'];

/// Default sanitizer: folds accented Latin letters to their ASCII base,
/// keeps ASCII letters, digits and a small set of punctuation, drops
/// everything else and collapses runs of whitespace to a single space.
pub fn clean_name(value: &str) -> String {
    let mut cleaned = String::with_capacity(value.len());

    for c in value.chars() {
        if c.is_whitespace() {
            cleaned.push(' ');
        } else if c.is_ascii_alphanumeric() || KEPT_PUNCTUATION.contains(&c) {
            cleaned.push(c);
        } else if let Some(folded) = fold_latin(c) {
            cleaned.push_str(folded);
        }
    }

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lightweight sanitizer: only strips characters that are illegal in
/// filenames on common platforms, plus `&`.
pub fn strip_forbidden(value: &str) -> String {
    value.chars().filter(|c| !FORBIDDEN_CHARS.contains(c)).collect()
}

fn fold_latin(c: char) -> Option<&'static str> {
    let folded = match c {
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'Ā' | 'Ă' | 'Ą' => "A",
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'Æ' => "AE",
        'æ' => "ae",
        'Ç' | 'Ć' | 'Č' => "C",
        'ç' | 'ć' | 'č' => "c",
        'Ð' | 'Ď' | 'Đ' => "D",
        'ð' | 'ď' | 'đ' => "d",
        'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ė' | 'Ę' | 'Ě' => "E",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'Ğ' => "G",
        'ğ' => "g",
        'Ì' | 'Í' | 'Î' | 'Ï' | 'Ī' | 'İ' => "I",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'ı' => "i",
        'Ł' => "L",
        'ł' => "l",
        'Ñ' | 'Ń' | 'Ň' => "N",
        'ñ' | 'ń' | 'ň' => "n",
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' | 'Ō' | 'Ő' => "O",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'Œ' => "OE",
        'œ' => "oe",
        'Ř' => "R",
        'ř' => "r",
        'Ś' | 'Š' | 'Ş' => "S",
        'ś' | 'š' | 'ş' => "s",
        'ß' => "ss",
        'Ť' => "T",
        'ť' => "t",
        'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ū' | 'Ů' | 'Ű' => "U",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => "u",
        'Ý' | 'Ÿ' => "Y",
        'ý' | 'ÿ' => "y",
        'Ź' | 'Ż' | 'Ž' => "Z",
        'ź' | 'ż' | 'ž' => "z",
        'Þ' => "Th",
        'þ' => "th",
        _ => return None,
    };
    Some(folded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_name_strips_slash() {
        assert_eq!(clean_name("AC/DC"), "ACDC");
    }

    #[test]
    fn test_clean_name_keeps_comma() {
        assert_eq!(clean_name("Band, The"), "Band, The");
    }

    #[test]
    fn test_clean_name_collapses_whitespace() {
        assert_eq!(clean_name("  Guns   N'\tRoses "), "Guns N' Roses");
        assert_eq!(clean_name("Sigur Rós"), "Sigur Ros");
    }

    #[test]
    fn test_clean_name_folds_and_drops() {
        assert_eq!(clean_name("Motörhead"), "Motorhead");
        assert_eq!(clean_name("Björk & Friends?"), "Bjork Friends");
        assert_eq!(clean_name("世界"), "");
    }

    #[test]
    fn test_strip_forbidden() {
        assert_eq!(strip_forbidden("AC/DC"), "ACDC");
        assert_eq!(strip_forbidden("Motörhead"), "Motörhead");
        assert_eq!(strip_forbidden(r#"a\b/c?d*e:f"g<h>i|j&k"#), "abcdefghijk");
        assert_eq!(strip_forbidden("  two  spaces "), "  two  spaces ");
    }
}

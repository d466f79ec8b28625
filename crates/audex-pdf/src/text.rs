//! Text preparation for literal strings in content streams.

use std::fmt::Write;

/// Appended when a cell is cut to its character budget.
pub const ELLIPSIS: &str = "...";

/// Cut `text` to at most `budget` characters, marking the cut.
pub fn truncate_cell(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }
    let keep = budget.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Escape for a `( ... )` literal in the font's WinAnsi encoding. Characters
/// above ASCII that the encoding covers are written as octal escapes;
/// anything else becomes `?` and control characters become spaces.
pub fn escape_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(ch);
            }
            ch if ch.is_ascii_control() => out.push(' '),
            ch if ch.is_ascii() => out.push(ch),
            ch => match win_ansi_byte(ch) {
                Some(byte) => {
                    let _ = write!(out, "\\{byte:03o}");
                }
                None => out.push('?'),
            },
        }
    }
    out
}

/// WinAnsi code for a non-ASCII character. The upper half matches Latin-1;
/// 0x80..0x9F holds the cp1252 punctuation and letters.
fn win_ansi_byte(ch: char) -> Option<u8> {
    let byte = match ch {
        '\u{a0}'..='\u{ff}' => return u8::try_from(u32::from(ch)).ok(),
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(byte)
}

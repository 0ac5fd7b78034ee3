//! Neutralizes text before it is placed in a bubble.
//!
//! The terminal is the markup here: a raw ESC, CSI or backspace inside a
//! message would be interpreted by the emulator instead of shown. Every
//! control character is rewritten to a printable form so the bubble always
//! displays the literal text.

/// Return `text` with all terminal-significant characters replaced by a
/// visible equivalent. Newlines and tabs are kept as layout; `\r\n` collapses
/// to `\n`.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\n' | '\t' => out.push(c),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\u{7f}' => out.push_str("^?"),
            c if (c as u32) < 0x20 => {
                out.push('^');
                out.push(char::from(c as u8 + 0x40));
            }
            c if (0x80..=0x9f).contains(&(c as u32)) => {
                out.push_str(&format!("\\u{{{:x}}}", c as u32));
            }
            c => out.push(c),
        }
    }

    out
}

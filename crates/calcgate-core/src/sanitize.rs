//! Input sanitizer: length bound and control-character stripping.

use crate::types::{Rejection, RejectionKind, SanitizedInput};

/// Reject input longer than `max_len` characters.
///
/// Counts Unicode scalar values, not UTF-16 code units: text outside the
/// Basic Multilingual Plane (emoji) counts once per character, where a
/// UTF-16 length would count it twice. Runs before sanitization so
/// oversized payloads are never scanned.
pub fn check_length(raw: &str, max_len: usize) -> Result<(), Rejection> {
    // Byte length is an upper bound on char count; skip the count when it fits.
    if raw.len() > max_len && raw.chars().count() > max_len {
        return Err(Rejection::too_long(max_len));
    }
    Ok(())
}

/// Whether `c` belongs to the stripped control set.
///
/// Tab, line feed and carriage return are kept; they are whitespace and
/// only survive in the interior of the input.
fn is_blocked_control(c: char) -> bool {
    matches!(
        c,
        '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{7F}' | '\u{80}'..='\u{9F}'
    )
}

/// Strip blocked control characters, then trim surrounding whitespace.
pub fn sanitize(raw: &str) -> SanitizedInput {
    let stripped: String = raw.chars().filter(|c| !is_blocked_control(*c)).collect();
    SanitizedInput::new(stripped.trim().to_string())
}

/// Length check, sanitization and the empty check, in that order.
pub fn sanitize_bounded(raw: &str, max_len: usize) -> Result<SanitizedInput, Rejection> {
    check_length(raw, max_len)?;

    let sanitized = sanitize(raw);
    if sanitized.is_empty() {
        return Err(Rejection::new(RejectionKind::Empty, "Input cannot be empty."));
    }

    Ok(sanitized)
}

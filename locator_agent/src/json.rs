//! Lenient extraction of JSON objects from model replies.

/// Find the last balanced `{...}` object in `text`.
///
/// Walks back from the final `}` to its matching `{`, skipping braces inside
/// string literals. Replies wrapped in code fences or surrounded by prose
/// (including prose with stray braces before the object) still yield the
/// object; a truncated object yields `None`.
pub fn extract_last_json_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let end = bytes.iter().rposition(|&b| b == b'}')?;

    let mut depth = 0usize;
    let mut in_string = false;

    for pos in (0..=end).rev() {
        let b = bytes[pos];

        if b == b'"' && !is_escaped(bytes, pos) {
            in_string = !in_string;
            continue;
        }
        if in_string {
            continue;
        }

        match b {
            b'}' => depth += 1,
            b'{' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[pos..=end]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Whether the quote at `pos` is preceded by an odd run of backslashes.
fn is_escaped(bytes: &[u8], pos: usize) -> bool {
    bytes[..pos]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count()
        % 2
        == 1
}

//! Extraction of a balanced `{...}` object embedded in uncontrolled text,
//! such as the player JSON assigned to a variable inside a watch page.

/// Find `marker`, then return the object literal starting at the first `{`
/// after it, up to its matching closing brace. Braces inside string
/// literals (and escaped quotes within them) are ignored.
pub fn extract_object<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    let after = text.find(marker)? + marker.len();
    let open = after + text[after..].find('{')?;
    let end = matching_brace(&text[open..])?;
    Some(&text[open..open + end + 1])
}

/// Byte offset of the brace closing the object that starts at `text[0]`.
fn matching_brace(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in text.bytes().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}

use std::sync::LazyLock;

use regex::Regex;

use crate::Segment;

// Android-style payload: <p t="1360" d="1680">text</p>, times in milliseconds.
static MILLIS_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<p\s+t="(\d+)"(?:\s+d="(\d+)")?[^>]*>(.*?)</p>"#).expect("millisecond caption pattern")
});

// Web-style payload: <text start="1.36" dur="1.68">text</text>, times in seconds.
static SECONDS_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<text\s+start="([^"]*)"(?:\s+dur="([^"]*)")?[^>]*>(.*?)</text>"#)
        .expect("seconds caption pattern")
});

static MARKUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("markup pattern"));

/// Parse a caption payload into segments.
///
/// The millisecond encoding is tried first; if it matches at least one
/// element, only its results are returned even when every element turns out
/// to be empty. A payload matching neither encoding yields no segments.
pub fn parse_captions(payload: &str) -> Vec<Segment> {
    let mut found_millis = false;
    let mut segments = Vec::new();

    for caps in MILLIS_ELEMENT.captures_iter(payload) {
        found_millis = true;
        let start = parse_millis(caps.get(1).map(|m| m.as_str()));
        let duration = parse_millis(caps.get(2).map(|m| m.as_str()));
        push_segment(&mut segments, start, duration, &caps[3]);
    }

    if found_millis {
        return segments;
    }

    for caps in SECONDS_ELEMENT.captures_iter(payload) {
        let start = parse_seconds(caps.get(1).map(|m| m.as_str()));
        let duration = parse_seconds(caps.get(2).map(|m| m.as_str()));
        push_segment(&mut segments, start, duration, &caps[3]);
    }

    segments
}

fn push_segment(segments: &mut Vec<Segment>, start: f64, duration: f64, raw: &str) {
    let text = clean_text(raw);
    if !text.is_empty() {
        segments.push(Segment { text, start, duration });
    }
}

fn parse_millis(value: Option<&str>) -> f64 {
    value.and_then(|v| v.parse::<u64>().ok()).unwrap_or(0) as f64 / 1000.0
}

fn parse_seconds(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(0.0)
}

/// Strip nested markup, decode entities and flatten to a single trimmed line.
fn clean_text(raw: &str) -> String {
    let stripped = MARKUP.replace_all(raw, "");
    // Web payloads escape entities twice (`&amp;#39;`), so decode a second pass.
    let once = html_escape::decode_html_entities(&stripped);
    let twice = html_escape::decode_html_entities(&once);
    twice.split_whitespace().collect::<Vec<_>>().join(" ")
}

//! Best-effort chapter detection from free-text video descriptions.
//!
//! A line counts as a chapter marker when it starts with `M:SS` or
//! `H:MM:SS`, optionally wrapped in brackets, followed by a label. A single
//! such line is treated as incidental, so fewer than two matches yield no
//! chapters.

use std::sync::LazyLock;

use regex::Regex;

use crate::Chapter;

static CHAPTER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[\[(]?(?:(\d{1,2}):)?(\d{1,2}):([0-5]\d)[\])]?\s*(?:[-–—:|•.]\s*)?(\S.*?)\s*$")
        .expect("chapter line pattern")
});

pub fn parse_chapters(description: &str) -> Vec<Chapter> {
    let chapters: Vec<Chapter> = description.lines().filter_map(parse_line).collect();

    if chapters.len() < 2 {
        return Vec::new();
    }
    chapters
}

fn parse_line(line: &str) -> Option<Chapter> {
    let caps = CHAPTER_LINE.captures(line)?;
    let hours: u64 = caps.get(1).map_or(Ok(0), |m| m.as_str().parse()).ok()?;
    let minutes: u64 = caps[2].parse().ok()?;
    let seconds: u64 = caps[3].parse().ok()?;

    Some(Chapter {
        offset: hours * 3600 + minutes * 60 + seconds,
        label: caps[4].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chapters_basic() {
        let description = "My video about things.\n\n0:00 Intro\n1:30 - Setup\n12:05 | Deep dive\n1:02:03 Outro\n\nThanks!";
        let chapters = parse_chapters(description);
        assert_eq!(chapters.len(), 4);
        assert_eq!(chapters[0], Chapter { offset: 0, label: "Intro".to_string() });
        assert_eq!(chapters[1], Chapter { offset: 90, label: "Setup".to_string() });
        assert_eq!(chapters[2], Chapter { offset: 725, label: "Deep dive".to_string() });
        assert_eq!(chapters[3], Chapter { offset: 3723, label: "Outro".to_string() });
    }

    #[test]
    fn test_single_timestamp_is_not_a_chapter_list() {
        let description = "Skip to 2:15 for the good part\n3:00 the drop\nSee you soon";
        assert!(parse_chapters(description).is_empty());
    }

    #[test]
    fn test_bracketed_timestamps() {
        let chapters = parse_chapters("[00:00] Start\n(05:10) Middle");
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[1].offset, 310);
        assert_eq!(chapters[1].label, "Middle");
    }

    #[test]
    fn test_windows_line_endings() {
        let chapters = parse_chapters("0:00 Intro\r\n4:20 Main\r\n");
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[1].label, "Main");
    }

    #[test]
    fn test_lines_without_labels_are_ignored() {
        assert!(parse_chapters("0:00\n1:00\n").is_empty());
    }

    #[test]
    fn test_empty_description() {
        assert!(parse_chapters("").is_empty());
    }
}

use serde::{Deserialize, Serialize};

use crate::comments::Comment;
use crate::{Chapter, Segment, TrackKind, TranscriptResult, VideoId};

/// Width of a synthesized summary section when the video has no chapters
pub const SUMMARY_WINDOW_SECS: f64 = 120.0;

const CHARS_PER_TOKEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Flowing text with a metadata header, for LLM input
    #[default]
    Clean,
    /// One line per segment with a timestamp deep link
    Timestamped,
    /// SubRip subtitle file
    Srt,
    /// Sections per chapter (or per two minutes) of flattened text
    Summary,
    /// Full result as JSON
    Json,
}

/// Render a transcript in the requested format, then apply the token budget
pub fn render(result: &TranscriptResult, format: Format, max_tokens: Option<usize>) -> String {
    let rendered = match format {
        Format::Clean => render_clean(result),
        Format::Timestamped => render_timestamped(result),
        Format::Srt => render_srt(&result.segments),
        Format::Summary => render_summary(result),
        Format::Json => render_json(result),
    };

    match max_tokens {
        Some(budget) => truncate_to_budget(&rendered, budget),
        None => rendered,
    }
}

/// Segment texts joined into one paragraph with whitespace collapsed
pub fn flatten(segments: &[&Segment]) -> String {
    segments
        .iter()
        .flat_map(|s| s.text.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn approx_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

pub fn render_clean(result: &TranscriptResult) -> String {
    let meta = &result.metadata;
    let text = flatten(&result.segments.iter().collect::<Vec<_>>());

    let mut lines = Vec::new();
    if !meta.title.is_empty() {
        lines.push(format!("Video: \"{}\"", meta.title));
    }
    if !meta.channel.is_empty() {
        lines.push(format!("Channel: {}", meta.channel));
    }
    lines.push(format!("Source: {}", result.video_id.watch_url()));
    if let Some(duration) = meta.duration {
        lines.push(format!("Duration: {}", format_duration(duration)));
    }
    if let Some(views) = meta.view_count {
        lines.push(format!("Views: {}", group_thousands(views)));
    }
    if let Some(track) = &result.track {
        let auto = if track.kind == TrackKind::Auto { " (auto-generated)" } else { "" };
        lines.push(format!("Caption language: {}{auto}", track.language_code));
    }
    lines.push(format!("Segments: {}", result.segments.len()));
    lines.push(format!("Approximate tokens: ~{}", approx_tokens(&text)));
    lines.push(String::new());
    lines.push(text);
    lines.join("\n")
}

pub fn render_timestamped(result: &TranscriptResult) -> String {
    let title = &result.metadata.title;
    let header = if title.is_empty() {
        String::new()
    } else {
        format!("{title}\n{}\n\n", "=".repeat(title.chars().count()))
    };

    let lines = result
        .segments
        .iter()
        .map(|s| {
            format!(
                "[{}]({}) {}",
                format_timestamp(s.start),
                deep_link(&result.video_id, s.start),
                s.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    header + &lines
}

/// Render segments as SRT subtitles
pub fn render_srt(segments: &[Segment]) -> String {
    segments
        .iter()
        .zip(1..)
        .map(|(s, i)| format!("{i}\n{} --> {}\n{}", format_srt_time(s.start), format_srt_time(s.end()), s.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn render_json(result: &TranscriptResult) -> String {
    serde_json::to_string_pretty(result).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}

/// A titled stretch of the transcript
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub heading: String,
    pub text: String,
}

/// Split the transcript by chapter, or into fixed windows when there are none.
/// Sections without any text are dropped.
pub fn sections(segments: &[Segment], chapters: &[Chapter]) -> Vec<Section> {
    let sections = if chapters.is_empty() {
        window_sections(segments)
    } else {
        chapter_sections(segments, chapters)
    };
    sections.into_iter().filter(|s| !s.text.is_empty()).collect()
}

fn chapter_sections(segments: &[Segment], chapters: &[Chapter]) -> Vec<Section> {
    chapters
        .iter()
        .enumerate()
        .map(|(i, chapter)| {
            let start = chapter.offset as f64;
            let end = chapters.get(i + 1).map_or(f64::INFINITY, |next| next.offset as f64);
            let inside: Vec<&Segment> = segments.iter().filter(|s| s.start >= start && s.start < end).collect();
            Section {
                heading: format!("[{}] {}", format_timestamp(start), chapter.label),
                text: flatten(&inside),
            }
        })
        .collect()
}

fn window_sections(segments: &[Segment]) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Vec<&Segment> = Vec::new();
    let mut window_start = 0.0;

    let mut close = |current: &mut Vec<&Segment>, start: f64| {
        if let Some(last) = current.last() {
            sections.push(Section {
                heading: format!("[{} - {}]", format_timestamp(start), format_timestamp(last.end())),
                text: flatten(current),
            });
        }
        current.clear();
    };

    for segment in segments {
        if !current.is_empty() && segment.start >= window_start + SUMMARY_WINDOW_SECS {
            close(&mut current, window_start);
        }
        if current.is_empty() {
            window_start = segment.start;
        }
        current.push(segment);
    }
    close(&mut current, window_start);

    sections
}

pub fn render_summary(result: &TranscriptResult) -> String {
    let meta = &result.metadata;
    let mut out = String::new();
    if !meta.title.is_empty() {
        out.push_str(&format!("# {}\n\n", meta.title));
    }
    out.push_str(&format!("Source: {}\n", result.video_id.watch_url()));
    if meta.chapters.is_empty() {
        out.push_str("Sections: 2-minute windows (no chapters found in description)\n");
    } else {
        out.push_str(&format!("Chapters: {}\n", meta.chapters.len()));
    }

    for section in sections(&result.segments, &meta.chapters) {
        out.push_str(&format!("\n## {}\n{}\n", section.heading, section.text));
    }
    out.trim_end().to_string()
}

/// Cut `text` to `budget * 4` characters, preferring a whitespace boundary
/// within the last 20% of the limit, and append a notice.
pub fn truncate_to_budget(text: &str, budget: usize) -> String {
    let limit = budget.saturating_mul(CHARS_PER_TOKEN);
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let cut = text.char_indices().nth(limit).map_or(text.len(), |(i, _)| i);
    let head = &text[..cut];
    let min_keep = limit * 4 / 5;

    let boundary = head
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map(|(i, _)| i)
        .filter(|&i| head[..i].chars().count() >= min_keep);

    let kept = match boundary {
        Some(i) => &head[..i],
        None => head,
    };

    format!("{}\n\n[Truncated to ~{budget} tokens]", kept.trim_end())
}

/// `M:SS` under an hour, `H:MM:SS` otherwise
pub fn format_timestamp(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 { seconds as u64 } else { 0 };
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

/// `HH:MM:SS,mmm`
pub fn format_srt_time(seconds: f64) -> String {
    let total_ms = if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as u64
    } else {
        0
    };
    let (h, m, s, ms) = (
        total_ms / 3_600_000,
        (total_ms % 3_600_000) / 60_000,
        (total_ms % 60_000) / 1000,
        total_ms % 1000,
    );
    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}

/// `1h 2m 3s`, `2m 5s` or `42s`
pub fn format_duration(total: u64) -> String {
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}h {m}m {s}s")
    } else if m > 0 {
        format!("{m}m {s}s")
    } else {
        format!("{s}s")
    }
}

pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn deep_link(video_id: &VideoId, seconds: f64) -> String {
    let secs = if seconds.is_finite() && seconds > 0.0 { seconds as u64 } else { 0 };
    format!("{}&t={secs}s", video_id.watch_url())
}

pub fn render_video_info(result: &TranscriptResult) -> String {
    let meta = &result.metadata;
    let title = if meta.title.is_empty() { "Unknown" } else { meta.title.as_str() };

    let mut info = vec![format!("Title: {title}")];
    if !meta.channel.is_empty() {
        info.push(format!("Channel: {}", meta.channel));
    }
    info.push(format!("URL: {}", result.video_id.watch_url()));
    if let Some(duration) = meta.duration {
        info.push(format!("Duration: {}", format_duration(duration)));
    }
    if let Some(views) = meta.view_count {
        info.push(format!("Views: {}", group_thousands(views)));
    }
    if !meta.description.is_empty() {
        info.push(String::new());
        info.push("Description:".to_string());
        info.push(meta.description.clone());
    }
    if !meta.chapters.is_empty() {
        info.push(String::new());
        info.push("Chapters:".to_string());
        info.extend(
            meta.chapters
                .iter()
                .map(|c| format!("  {} {}", format_timestamp(c.offset as f64), c.label)),
        );
    }
    if !meta.tracks.is_empty() {
        let captions = meta
            .tracks
            .iter()
            .map(|t| {
                let auto = if t.kind == TrackKind::Auto { ", auto" } else { "" };
                format!("{} ({}{auto})", t.name, t.language_code)
            })
            .collect::<Vec<_>>()
            .join(", ");
        info.push(String::new());
        info.push(format!("Available captions: {captions}"));
    }
    info.push(String::new());
    let has = if result.is_empty() { "No" } else { "Yes" };
    info.push(format!("Has transcript: {has} ({} segments)", result.segments.len()));
    info.join("\n")
}

/// Message for a playable video without usable captions
pub fn render_no_captions(result: &TranscriptResult) -> String {
    let languages = result.available_languages();
    if languages.is_empty() {
        "No captions found for this video. It may not have subtitles available.".to_string()
    } else {
        format!(
            "No captions found for this video in the requested language. Available languages: {}",
            languages.join(", ")
        )
    }
}

pub fn render_comments(video_id: &VideoId, comments: &[Comment]) -> String {
    if comments.is_empty() {
        return format!("No comments found for {} (comments may be disabled)", video_id.watch_url());
    }

    let mut out = format!("Top {} comments for {}\n", comments.len(), video_id.watch_url());
    for (i, c) in comments.iter().enumerate() {
        let likes = if c.likes.is_empty() { "0" } else { c.likes.as_str() };
        out.push_str(&format!(
            "\n{}. {} · {likes} likes · {}\n{}\n",
            i + 1,
            c.author,
            c.published,
            c.text
        ));
    }
    out.trim_end().to_string()
}

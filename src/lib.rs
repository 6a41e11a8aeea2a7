pub mod batch;
pub mod captions;
pub mod chapters;
pub mod comments;
pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod output;
pub mod ratelimit;
pub mod scan;
pub mod search;
pub mod tracks;
pub mod youtube;

#[cfg(test)]
mod testing;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub use engine::{Engine, Reply};
pub use error::{Error, FetchError, Result};

/// A single captioned segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

impl Segment {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Whether a caption track was written by a person or generated by speech recognition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Manual,
    Auto,
}

/// A caption track advertised by the player response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionTrack {
    pub language_code: String,
    pub name: String,
    pub kind: TrackKind,
    pub base_url: String,
}

/// A chapter marker recovered from the video description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub offset: u64,
    pub label: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub channel: String,
    pub duration: Option<u64>,
    pub view_count: Option<u64>,
    pub tracks: Vec<CaptionTrack>,
    pub chapters: Vec<Chapter>,
}

/// Complete transcript for a video. An empty `segments` list means the
/// video is playable but no usable captions could be retrieved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptResult {
    pub video_id: VideoId,
    pub metadata: VideoMetadata,
    pub track: Option<CaptionTrack>,
    pub segments: Vec<Segment>,
}

impl TranscriptResult {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Distinct track language codes, in upstream order
    pub fn available_languages(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = Vec::new();
        for track in &self.metadata.tracks {
            if !codes.contains(&track.language_code.as_str()) {
                codes.push(&track.language_code);
            }
        }
        codes
    }
}

/// An 11-character YouTube video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A YouTube playlist identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaylistId(String);

impl PlaylistId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// Tried in order, first match wins.
static VIDEO_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?:https?://)?(?:www\.|m\.)?youtube\.com/watch\?.*v=([a-zA-Z0-9_-]{11})",
        r"(?:https?://)?(?:www\.|m\.)?youtube\.com/embed/([a-zA-Z0-9_-]{11})",
        r"(?:https?://)?(?:www\.|m\.)?youtube\.com/shorts/([a-zA-Z0-9_-]{11})",
        r"(?:https?://)?(?:www\.|m\.)?youtube\.com/v/([a-zA-Z0-9_-]{11})",
        r"(?:https?://)?youtu\.be/([a-zA-Z0-9_-]{11})",
        r"(?:https?://)?(?:www\.|m\.)?youtube\.com/live/([a-zA-Z0-9_-]{11})",
        r"^([a-zA-Z0-9_-]{11})$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("video URL pattern"))
    .collect()
});

static PLAYLIST_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?:https?://)?(?:www\.|m\.)?youtube\.com/playlist\?(?:.*&)?list=([a-zA-Z0-9_-]{10,})",
        r"(?:https?://)?(?:www\.|m\.)?youtube\.com/watch\?(?:.*&)?list=([a-zA-Z0-9_-]{10,})",
        r"^((?:PL|UU|LL|FL|OL|RD)[a-zA-Z0-9_-]{10,})$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("playlist URL pattern"))
    .collect()
});

/// Extract video ID from various YouTube URL formats
pub fn extract_video_id(input: &str) -> Option<VideoId> {
    let input = input.trim();
    VIDEO_PATTERNS
        .iter()
        .find_map(|re| re.captures(input))
        .map(|caps| VideoId(caps[1].to_string()))
}

/// Extract playlist ID from a playlist URL, a watch URL carrying `list=`, or a bare ID
pub fn extract_playlist_id(input: &str) -> Option<PlaylistId> {
    let input = input.trim();
    PLAYLIST_PATTERNS
        .iter()
        .find_map(|re| re.captures(input))
        .map(|caps| PlaylistId(caps[1].to_string()))
}

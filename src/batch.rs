//! Runs the single-video pipeline over many inputs. Items are fetched
//! concurrently and fail independently; the aggregate output keeps input
//! order.

use futures::future::join_all;
use log::warn;

use crate::http::HttpSource;
use crate::output::{Format, render, render_no_captions};
use crate::youtube::{PlaylistEntry, YouTube};
use crate::{Error, Result, TranscriptResult, VideoId, extract_video_id};

#[derive(Debug)]
pub struct BatchItem {
    pub label: String,
    pub outcome: Result<TranscriptResult>,
}

impl BatchItem {
    pub fn succeeded(&self) -> bool {
        self.outcome.as_ref().is_ok_and(|r| !r.is_empty())
    }
}

/// Resolve a single batch entry, enforcing the URL length cap
pub fn resolve_input(input: &str, max_url_len: usize) -> Result<VideoId> {
    let input = input.trim();
    if input.chars().count() > max_url_len {
        return Err(Error::InvalidInput(format!("URL longer than {max_url_len} characters")));
    }
    extract_video_id(input).ok_or_else(|| Error::InvalidInput(format!("not a YouTube video URL: {input}")))
}

pub async fn fetch_urls<H: HttpSource>(
    youtube: &YouTube<H>,
    urls: &[String],
    lang: &str,
    max_url_len: usize,
) -> Vec<BatchItem> {
    let items = urls.iter().map(|url| async move {
        let outcome = match resolve_input(url, max_url_len) {
            Ok(video_id) => youtube.fetch_transcript(&video_id, lang).await,
            Err(e) => Err(e),
        };
        BatchItem {
            label: url.trim().to_string(),
            outcome,
        }
    });
    join_all(items).await
}

pub async fn fetch_entries<H: HttpSource>(youtube: &YouTube<H>, entries: &[PlaylistEntry], lang: &str) -> Vec<BatchItem> {
    let items = entries.iter().map(|entry| async move {
        let label = if entry.title.is_empty() {
            entry.video_id.watch_url()
        } else {
            format!("{} ({})", entry.title, entry.video_id.watch_url())
        };
        BatchItem {
            label,
            outcome: youtube.fetch_transcript(&entry.video_id, lang).await,
        }
    });
    join_all(items).await
}

/// Aggregate per-item output under `heading`, with failures reported inline
pub fn render_items(heading: &str, items: &[BatchItem], format: Format, max_tokens: Option<usize>) -> String {
    let succeeded = items.iter().filter(|i| i.succeeded()).count();
    let total = items.len();
    let noun = if total == 1 { "video" } else { "videos" };

    let mut out = format!(
        "{heading}: {total} {noun} ({succeeded} succeeded, {} failed)\n",
        total - succeeded
    );

    for (n, item) in items.iter().enumerate() {
        out.push_str(&format!("\n=== [{}/{total}] {} ===\n", n + 1, item.label));
        let body = match &item.outcome {
            Ok(result) if !result.is_empty() => render(result, format, max_tokens),
            Ok(result) => format!("[Failed] {}", render_no_captions(result)),
            Err(e) => {
                warn!("Batch item {} failed: {e}", item.label);
                format!("[Failed] {e}")
            }
        };
        out.push_str(&body);
        out.push('\n');
    }

    out.trim_end().to_string()
}

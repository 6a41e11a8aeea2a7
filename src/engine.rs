//! The consumer-facing operations. Every call passes the rate limiter and
//! validates its arguments before anything goes over the network.

use log::debug;

use crate::batch::{fetch_entries, fetch_urls, render_items, resolve_input};
use crate::config::Limits;
use crate::http::{HttpClient, HttpSource};
use crate::output::{Format, render, render_comments, render_no_captions, render_video_info};
use crate::ratelimit::RateLimiter;
use crate::search::render_search;
use crate::youtube::YouTube;
use crate::{Error, Result, VideoId, extract_playlist_id};

const INFO_LANG: &str = "en";

/// Rendered output of an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Content(String),
    /// The video is playable but has no usable captions
    NoCaptions(String),
}

impl Reply {
    pub fn text(&self) -> &str {
        match self {
            Reply::Content(text) | Reply::NoCaptions(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Reply::Content(text) | Reply::NoCaptions(text) => text,
        }
    }
}

#[derive(Debug)]
pub struct Engine<H = HttpClient> {
    youtube: YouTube<H>,
    limits: Limits,
    limiter: RateLimiter,
}

impl Engine<HttpClient> {
    pub fn new(limits: Limits) -> Self {
        Self::with_source(HttpClient::new(limits.timeout), limits)
    }
}

impl<H: HttpSource> Engine<H> {
    pub fn with_source(http: H, limits: Limits) -> Self {
        let limiter = RateLimiter::new(limits.rate_limit_max, limits.rate_limit_window);
        Self {
            youtube: YouTube::new(http),
            limits,
            limiter,
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub async fn get_transcript(&self, url: &str, lang: &str, format: Format, max_tokens: Option<usize>) -> Result<Reply> {
        self.admit()?;
        let video_id = self.resolve(url)?;
        self.check_lang(lang)?;
        check_budget(max_tokens)?;

        let result = self.youtube.fetch_transcript(&video_id, lang).await?;
        if result.is_empty() {
            return Ok(Reply::NoCaptions(render_no_captions(&result)));
        }
        Ok(Reply::Content(render(&result, format, max_tokens)))
    }

    pub async fn get_video_info(&self, url: &str) -> Result<Reply> {
        self.admit()?;
        let video_id = self.resolve(url)?;

        let result = self.youtube.fetch_transcript(&video_id, INFO_LANG).await?;
        Ok(Reply::Content(render_video_info(&result)))
    }

    pub async fn get_transcripts(
        &self,
        urls: &[String],
        lang: &str,
        format: Format,
        max_tokens: Option<usize>,
    ) -> Result<Reply> {
        self.admit()?;
        if urls.is_empty() {
            return Err(Error::InvalidInput("no URLs given".to_string()));
        }
        if urls.len() > self.limits.max_batch {
            return Err(Error::InvalidInput(format!(
                "{} URLs given, at most {} per batch",
                urls.len(),
                self.limits.max_batch
            )));
        }
        self.check_lang(lang)?;
        check_budget(max_tokens)?;

        let items = fetch_urls(&self.youtube, urls, lang, self.limits.max_url_len).await;
        Ok(Reply::Content(render_items("Batch", &items, format, max_tokens)))
    }

    pub async fn get_playlist(&self, url: &str, lang: &str, format: Format, max_tokens: Option<usize>) -> Result<Reply> {
        self.admit()?;
        self.check_url_len(url)?;
        let playlist_id = extract_playlist_id(url)
            .ok_or_else(|| Error::InvalidInput(format!("not a YouTube playlist URL: {}", url.trim())))?;
        self.check_lang(lang)?;
        check_budget(max_tokens)?;

        let playlist = self.youtube.fetch_playlist(&playlist_id, self.limits.max_playlist).await?;
        if playlist.entries.is_empty() {
            return Ok(Reply::Content(format!(
                "Playlist {playlist_id} has no accessible videos (it may be private or empty)"
            )));
        }

        let heading = if playlist.title.is_empty() {
            format!("Playlist {playlist_id}")
        } else {
            format!("Playlist \"{}\"", playlist.title)
        };
        let items = fetch_entries(&self.youtube, &playlist.entries, lang).await;
        Ok(Reply::Content(render_items(&heading, &items, format, max_tokens)))
    }

    pub async fn search_transcript(&self, url: &str, query: &str, lang: &str, context_lines: usize) -> Result<Reply> {
        self.admit()?;
        let video_id = self.resolve(url)?;
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::InvalidInput("search query is empty".to_string()));
        }
        if query.chars().count() > self.limits.max_query_len {
            return Err(Error::InvalidInput(format!(
                "search query longer than {} characters",
                self.limits.max_query_len
            )));
        }
        if context_lines > self.limits.max_context_lines {
            return Err(Error::InvalidInput(format!(
                "context lines must be at most {}",
                self.limits.max_context_lines
            )));
        }
        self.check_lang(lang)?;

        let result = self.youtube.fetch_transcript(&video_id, lang).await?;
        if result.is_empty() {
            return Ok(Reply::NoCaptions(render_no_captions(&result)));
        }
        Ok(Reply::Content(render_search(&result, query, context_lines)))
    }

    pub async fn get_comments(&self, url: &str, count: usize) -> Result<Reply> {
        self.admit()?;
        let video_id = self.resolve(url)?;
        if count == 0 || count > self.limits.max_comments {
            return Err(Error::InvalidInput(format!(
                "comment count must be between 1 and {}",
                self.limits.max_comments
            )));
        }

        let comments = self.youtube.fetch_comments(&video_id, count).await?;
        Ok(Reply::Content(render_comments(&video_id, &comments)))
    }

    fn admit(&self) -> Result<()> {
        self.limiter.check().map_err(|retry_after| {
            debug!("Request rejected by rate limiter");
            Error::RateLimited { retry_after }
        })
    }

    fn resolve(&self, url: &str) -> Result<VideoId> {
        resolve_input(url, self.limits.max_url_len)
    }

    fn check_url_len(&self, url: &str) -> Result<()> {
        if url.trim().chars().count() > self.limits.max_url_len {
            return Err(Error::InvalidInput(format!(
                "URL longer than {} characters",
                self.limits.max_url_len
            )));
        }
        Ok(())
    }

    fn check_lang(&self, lang: &str) -> Result<()> {
        let valid = !lang.is_empty()
            && lang.len() <= self.limits.max_lang_len
            && lang.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(())
        } else {
            Err(Error::InvalidInput(format!("invalid language code: {lang:?}")))
        }
    }
}

fn check_budget(max_tokens: Option<usize>) -> Result<()> {
    match max_tokens {
        Some(0) => Err(Error::InvalidInput("max_tokens must be positive".to_string())),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testing::{FakeHttp, player_json};

    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
    const CAPTIONS: &str = r#"<p t="0" d="2000">Rust is fast</p><p t="2000" d="2000">and safe</p><p t="4000" d="2000">rust again</p>"#;

    fn engine(http: FakeHttp) -> Engine<FakeHttp> {
        Engine::with_source(http, Limits::default())
    }

    fn working_http() -> FakeHttp {
        FakeHttp::new()
            .post("youtubei/v1/player", &player_json("OK", true))
            .get("api/timedtext", CAPTIONS)
    }

    #[tokio::test]
    async fn test_get_transcript_clean() {
        let reply = engine(working_http())
            .get_transcript(URL, "en", Format::Clean, None)
            .await
            .unwrap();
        let Reply::Content(text) = reply else { panic!("expected content") };
        assert!(text.starts_with("Video: \"Test Video\"\nChannel: Test Channel\n"));
        assert!(text.ends_with("Rust is fast and safe rust again"));
    }

    #[tokio::test]
    async fn test_get_transcript_with_budget() {
        let reply = engine(working_http())
            .get_transcript(URL, "en", Format::Timestamped, Some(10))
            .await
            .unwrap();
        assert!(reply.text().ends_with("[Truncated to ~10 tokens]"));
    }

    #[tokio::test]
    async fn test_invalid_url_makes_no_network_call() {
        let engine = engine(working_http());
        let err = engine
            .get_transcript("https://example.com/watch", "en", Format::Clean, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(engine.youtube.http.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_parameters_are_rejected() {
        let engine = engine(working_http());
        assert!(engine.get_transcript(URL, "", Format::Clean, None).await.is_err());
        assert!(engine.get_transcript(URL, "en;drop", Format::Clean, None).await.is_err());
        assert!(engine.get_transcript(URL, "en", Format::Clean, Some(0)).await.is_err());
        assert!(engine.search_transcript(URL, "   ", "en", 2).await.is_err());
        assert!(engine.search_transcript(URL, "rust", "en", 11).await.is_err());
        assert!(engine.get_comments(URL, 0).await.is_err());
        assert!(engine.get_comments(URL, 101).await.is_err());
        assert_eq!(engine.youtube.http.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_no_captions_reply() {
        let http = FakeHttp::new().post("youtubei/v1/player", &player_json("OK", false));
        let reply = engine(http).get_transcript(URL, "en", Format::Clean, None).await.unwrap();
        assert!(matches!(reply, Reply::NoCaptions(_)));
    }

    #[tokio::test]
    async fn test_rate_limit_rejects_before_network() {
        let limits = Limits {
            rate_limit_max: 2,
            rate_limit_window: Duration::from_secs(60),
            ..Limits::default()
        };
        let engine = Engine::with_source(working_http(), limits);

        assert!(engine.get_video_info(URL).await.is_ok());
        assert!(engine.get_video_info(URL).await.is_ok());
        let calls = engine.youtube.http.total_calls();

        let err = engine.get_video_info(URL).await.unwrap_err();
        assert!(matches!(err, Error::RateLimited { .. }));
        assert_eq!(engine.youtube.http.total_calls(), calls);
    }

    #[tokio::test]
    async fn test_video_info() {
        let reply = engine(working_http()).get_video_info(URL).await.unwrap();
        let text = reply.text();
        assert!(text.starts_with("Title: Test Video\n"));
        assert!(text.contains("Duration: 2m 5s"));
        assert!(text.contains("Chapters:\n  0:00 Intro\n  1:00 Main part"));
        assert!(text.contains("Available captions: English (auto-generated) (en, auto), English (en), French (fr)"));
        assert!(text.ends_with("Has transcript: Yes (3 segments)"));
    }

    #[tokio::test]
    async fn test_search() {
        let reply = engine(working_http()).search_transcript(URL, "RUST", "en", 0).await.unwrap();
        let text = reply.text();
        assert!(text.starts_with("2 matches for \"RUST\""));
        assert!(text.contains(">> [0:00]"));
        assert!(text.contains("\n...\n>> [0:04]"));
    }

    #[tokio::test]
    async fn test_batch_limits() {
        let engine = engine(working_http());
        let too_many: Vec<String> = (0..11).map(|_| URL.to_string()).collect();
        assert!(matches!(
            engine.get_transcripts(&too_many, "en", Format::Clean, None).await,
            Err(Error::InvalidInput(_))
        ));
        assert!(engine.get_transcripts(&[], "en", Format::Clean, None).await.is_err());
        assert_eq!(engine.youtube.http.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_batch() {
        let urls = vec![URL.to_string(), "garbage".to_string(), "https://youtu.be/aaaaaaaaaaa".to_string()];
        let reply = engine(working_http())
            .get_transcripts(&urls, "en", Format::Clean, None)
            .await
            .unwrap();
        let text = reply.text();
        assert!(text.starts_with("Batch: 3 videos (2 succeeded, 1 failed)"));
        assert_eq!(text.matches("[Failed]").count(), 1);
    }

    #[tokio::test]
    async fn test_playlist() {
        let browse = serde_json::json!({
            "metadata": {"playlistMetadataRenderer": {"title": "Series"}},
            "contents": [
                {"playlistVideoRenderer": {"videoId": "aaaaaaaaaaa", "title": {"runs": [{"text": "One"}]}}},
                {"playlistVideoRenderer": {"videoId": "bbbbbbbbbbb", "title": {"runs": [{"text": "Two"}]}}}
            ]
        });
        let http = working_http().post("youtubei/v1/browse", &browse.to_string());
        let reply = engine(http)
            .get_playlist("https://www.youtube.com/playlist?list=PLabcdefghijk12", "en", Format::Clean, None)
            .await
            .unwrap();
        let text = reply.text();
        assert!(text.starts_with("Playlist \"Series\": 2 videos (2 succeeded, 0 failed)"));
        assert!(text.contains("=== [2/2] Two (https://www.youtube.com/watch?v=bbbbbbbbbbb) ==="));
    }

    #[tokio::test]
    async fn test_playlist_invalid_url() {
        let err = engine(working_http())
            .get_playlist(URL, "en", Format::Clean, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_unplayable_video_is_error() {
        let http = FakeHttp::new().post("youtubei/v1/player", &player_json("ERROR", false));
        let err = engine(http)
            .get_transcript(URL, "en", Format::Clean, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("This video is private"));
    }
}

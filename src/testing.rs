//! Canned upstream responses for unit tests.

use std::sync::Mutex;
use std::time::Duration;

use crate::FetchError;
use crate::http::HttpSource;

#[derive(Debug, Clone)]
enum Canned {
    Body(String),
    Status(u16),
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Get,
    Post,
}

/// Routes requests to the first registered response whose fragment occurs
/// in the URL; unmatched requests fail with 404.
#[derive(Debug, Default)]
pub struct FakeHttp {
    routes: Vec<(Method, String, Canned)>,
    calls: Mutex<Vec<String>>,
}

impl FakeHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(mut self, fragment: &str, body: &str) -> Self {
        self.routes
            .push((Method::Get, fragment.to_string(), Canned::Body(body.to_string())));
        self
    }

    pub fn get_status(mut self, fragment: &str, status: u16) -> Self {
        self.routes.push((Method::Get, fragment.to_string(), Canned::Status(status)));
        self
    }

    pub fn post(mut self, fragment: &str, body: &str) -> Self {
        self.routes
            .push((Method::Post, fragment.to_string(), Canned::Body(body.to_string())));
        self
    }

    pub fn post_status(mut self, fragment: &str, status: u16) -> Self {
        self.routes.push((Method::Post, fragment.to_string(), Canned::Status(status)));
        self
    }

    pub fn post_timeout(mut self, fragment: &str) -> Self {
        self.routes.push((Method::Post, fragment.to_string(), Canned::Timeout));
        self
    }

    pub fn calls_to(&self, fragment: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|url| url.contains(fragment))
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn respond(&self, method: Method, url: &str) -> Result<String, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        let canned = self
            .routes
            .iter()
            .find(|(m, fragment, _)| *m == method && url.contains(fragment.as_str()))
            .map(|(_, _, canned)| canned.clone());

        match canned {
            Some(Canned::Body(body)) => Ok(body),
            Some(Canned::Status(status)) => Err(FetchError::Status(status)),
            Some(Canned::Timeout) => Err(FetchError::Timeout(Duration::from_secs(15))),
            None => Err(FetchError::Status(404)),
        }
    }
}

impl HttpSource for FakeHttp {
    async fn get_text(&self, url: &str, _user_agent: &str) -> Result<String, FetchError> {
        self.respond(Method::Get, url)
    }

    async fn post_json(&self, url: &str, _user_agent: &str, _body: &serde_json::Value) -> Result<String, FetchError> {
        self.respond(Method::Post, url)
    }
}

/// A player response with the given playability status, optionally
/// advertising English (auto + manual) and French tracks.
pub fn player_json(status: &str, with_tracks: bool) -> String {
    let tracks = if with_tracks {
        serde_json::json!({
            "playerCaptionsTracklistRenderer": {
                "captionTracks": [
                    {
                        "baseUrl": "https://www.youtube.com/api/timedtext?v=dQw4w9WgXcQ&lang=en&kind=asr",
                        "languageCode": "en",
                        "name": {"simpleText": "English (auto-generated)"},
                        "kind": "asr"
                    },
                    {
                        "baseUrl": "https://www.youtube.com/api/timedtext?v=dQw4w9WgXcQ&lang=en",
                        "languageCode": "en",
                        "name": {"runs": [{"text": "English"}]}
                    },
                    {
                        "baseUrl": "https://www.youtube.com/api/timedtext?v=dQw4w9WgXcQ&lang=fr",
                        "languageCode": "fr",
                        "name": {"simpleText": "French"}
                    }
                ]
            }
        })
    } else {
        serde_json::Value::Null
    };

    let reason = if status == "OK" { None } else { Some("This video is private") };

    serde_json::json!({
        "playabilityStatus": {"status": status, "reason": reason},
        "videoDetails": {
            "title": "Test Video",
            "author": "Test Channel",
            "shortDescription": "About this {video}.\n0:00 Intro\n1:00 Main part\n",
            "lengthSeconds": "125",
            "viewCount": "1234567"
        },
        "captions": tracks
    })
    .to_string()
}

/// Wrap a player response the way the watch page embeds it.
pub fn watch_page(player: &str) -> String {
    format!(
        "<html><head><script nonce=\"x\">var ytInitialPlayerResponse = {player};var meta = document.createElement('meta');</script></head><body></body></html>"
    )
}

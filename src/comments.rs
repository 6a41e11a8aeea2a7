use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;

use crate::http::HttpSource;
use crate::youtube::{InnerTubeClient, WEB_USER_AGENT, YouTube, find_all, innertube_url, text_of};
use crate::{Error, FetchError, Result, VideoId};

/// Upper bound on continuation pages fetched for one request
const MAX_PAGES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub author: String,
    pub text: String,
    /// Display string as shown by YouTube, e.g. `1.2K`
    pub likes: String,
    /// Relative time, e.g. `3 days ago`
    pub published: String,
}

impl<H: HttpSource> YouTube<H> {
    /// Fetch up to `count` top comments. Videos with comments disabled
    /// yield an empty list.
    pub async fn fetch_comments(&self, video_id: &VideoId, count: usize) -> Result<Vec<Comment>> {
        let first = self
            .call_next(serde_json::json!({
                "context": InnerTubeClient::Web.context("en"),
                "videoId": video_id.as_str(),
            }))
            .await
            .map_err(|e| {
                warn!("Comment lookup for {video_id} failed: {e}");
                Error::UpstreamUnavailable { id: video_id.to_string() }
            })?;

        let Some(mut token) = comment_section_token(&first) else {
            debug!("No comment section for {video_id}");
            return Ok(Vec::new());
        };

        let mut comments = Vec::new();
        for page in 1..=MAX_PAGES {
            let resp = match self
                .call_next(serde_json::json!({
                    "context": InnerTubeClient::Web.context("en"),
                    "continuation": token,
                }))
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    warn!("Comment page {page} for {video_id} failed: {e}");
                    break;
                }
            };

            comments.extend(parse_comments(&resp));
            debug!("Comment page {page} for {video_id}: {} collected", comments.len());
            if comments.len() >= count {
                break;
            }
            match next_page_token(&resp) {
                Some(next) => token = next,
                None => break,
            }
        }

        comments.truncate(count);
        Ok(comments)
    }

    async fn call_next(&self, body: Value) -> Result<Value, FetchError> {
        let text = self.http.post_json(&innertube_url("next"), WEB_USER_AGENT, &body).await?;
        Ok(serde_json::from_str(&text)?)
    }
}

fn first_token(value: &Value) -> Option<String> {
    let mut commands = Vec::new();
    find_all(value, "continuationCommand", &mut commands);
    commands
        .into_iter()
        .find_map(|c| c.get("token").and_then(Value::as_str))
        .map(str::to_string)
}

/// Continuation token that loads the first page of comments for a watch response
fn comment_section_token(watch: &Value) -> Option<String> {
    let mut sections = Vec::new();
    find_all(watch, "itemSectionRenderer", &mut sections);
    let from_section = sections
        .into_iter()
        .filter(|s| s.get("sectionIdentifier").and_then(Value::as_str) == Some("comment-item-section"))
        .find_map(first_token);
    if from_section.is_some() {
        return from_section;
    }

    let mut panels = Vec::new();
    find_all(watch, "engagementPanelSectionListRenderer", &mut panels);
    panels
        .into_iter()
        .filter(|p| {
            p.get("panelIdentifier")
                .and_then(Value::as_str)
                .is_some_and(|id| id.contains("comments"))
        })
        .find_map(first_token)
}

/// Token for the following page, carried by the trailing continuation item
fn next_page_token(page: &Value) -> Option<String> {
    page.get("onResponseReceivedEndpoints")?
        .as_array()?
        .iter()
        .rev()
        .find_map(|endpoint| {
            let items = endpoint
                .pointer("/reloadContinuationItemsCommand/continuationItems")
                .or_else(|| endpoint.pointer("/appendContinuationItemsAction/continuationItems"))?
                .as_array()?;
            first_token(items.last()?.get("continuationItemRenderer")?)
        })
}

/// Comments from either the entity-payload shape or the legacy renderer shape
fn parse_comments(page: &Value) -> Vec<Comment> {
    let mut payloads = Vec::new();
    find_all(page, "commentEntityPayload", &mut payloads);
    if !payloads.is_empty() {
        return payloads.into_iter().filter_map(parse_entity_payload).collect();
    }

    let mut renderers = Vec::new();
    find_all(page, "commentRenderer", &mut renderers);
    renderers.into_iter().filter_map(parse_comment_renderer).collect()
}

fn parse_entity_payload(payload: &Value) -> Option<Comment> {
    let str_at = |path: &str| payload.pointer(path).and_then(Value::as_str).unwrap_or_default().to_string();
    let text = str_at("/properties/content/content");
    if text.is_empty() {
        return None;
    }
    Some(Comment {
        author: str_at("/author/displayName"),
        text,
        likes: str_at("/toolbar/likeCountNotliked").trim().to_string(),
        published: str_at("/properties/publishedTime"),
    })
}

fn parse_comment_renderer(renderer: &Value) -> Option<Comment> {
    let text_at = |key: &str| renderer.get(key).map(text_of).unwrap_or_default();
    let text = text_at("contentText");
    if text.is_empty() {
        return None;
    }
    Some(Comment {
        author: text_at("authorText"),
        text,
        likes: text_at("voteCount").trim().to_string(),
        published: text_at("publishedTimeText"),
    })
}

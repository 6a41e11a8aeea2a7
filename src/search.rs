use crate::TranscriptResult;
use crate::output::{deep_link, format_timestamp};

/// A contiguous run of segment indices; `matched` flags which are hits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub start: usize,
    pub end: usize,
    pub matched: Vec<usize>,
}

/// Find segments containing `query` (case-insensitive), each widened by
/// `context` neighbours on both sides. Overlapping or adjacent windows are
/// merged into one run.
pub fn find_runs(result: &TranscriptResult, query: &str, context: usize) -> Vec<Run> {
    let needle = query.to_lowercase();
    let last = match result.segments.len().checked_sub(1) {
        Some(last) => last,
        None => return Vec::new(),
    };

    let mut runs: Vec<Run> = Vec::new();
    for (i, segment) in result.segments.iter().enumerate() {
        if !segment.text.to_lowercase().contains(&needle) {
            continue;
        }
        let start = i.saturating_sub(context);
        let end = i.saturating_add(context).min(last);

        match runs.last_mut() {
            Some(run) if start <= run.end + 1 => {
                run.end = run.end.max(end);
                run.matched.push(i);
            }
            _ => runs.push(Run {
                start,
                end,
                matched: vec![i],
            }),
        }
    }
    runs
}

pub fn render_search(result: &TranscriptResult, query: &str, context: usize) -> String {
    let runs = find_runs(result, query, context);
    let title = &result.metadata.title;
    let source = if title.is_empty() {
        result.video_id.watch_url()
    } else {
        format!("\"{title}\"")
    };

    if runs.is_empty() {
        return format!("No matches for \"{query}\" in {source}");
    }

    let total: usize = runs.iter().map(|r| r.matched.len()).sum();
    let noun = if total == 1 { "match" } else { "matches" };
    let mut out = format!("{total} {noun} for \"{query}\" in {source}\n");

    let blocks = runs
        .iter()
        .map(|run| {
            (run.start..=run.end)
                .map(|i| {
                    let s = &result.segments[i];
                    let marker = if run.matched.contains(&i) { ">>" } else { "  " };
                    format!(
                        "{marker} [{}]({}) {}",
                        format_timestamp(s.start),
                        deep_link(&result.video_id, s.start),
                        s.text
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect::<Vec<_>>();

    out.push('\n');
    out.push_str(&blocks.join("\n...\n"));
    out
}

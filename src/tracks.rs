use crate::{CaptionTrack, TrackKind};

/// Pick the best caption track for `lang`.
///
/// Precedence: exact code and manual, exact code, prefix match (`en` matches
/// `en-US`) and manual, prefix match, then the first track. Returns `None`
/// only when `tracks` is empty.
pub fn select_track<'a>(tracks: &'a [CaptionTrack], lang: &str) -> Option<&'a CaptionTrack> {
    let exact = |t: &&CaptionTrack| t.language_code == lang;
    let prefix = |t: &&CaptionTrack| t.language_code.starts_with(lang);
    let manual = |t: &&CaptionTrack| t.kind == TrackKind::Manual;

    tracks
        .iter()
        .find(|t| exact(t) && manual(t))
        .or_else(|| tracks.iter().find(exact))
        .or_else(|| tracks.iter().find(|t| prefix(t) && manual(t)))
        .or_else(|| tracks.iter().find(prefix))
        .or_else(|| tracks.first())
}

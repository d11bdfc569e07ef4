use url::Url;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum IdError {
    #[error("not a YouTube video id or URL: {0}")]
    InvalidVideo(String),
    #[error("not a YouTube playlist id or URL: {0}")]
    InvalidPlaylist(String),
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn is_video_id(s: &str) -> bool {
    s.len() == 11 && s.chars().all(is_id_char)
}

// User uploads, liked videos, favorites, mixes and albums.
const PLAYLIST_PREFIXES: [&str; 6] = ["PL", "UU", "LL", "FL", "RD", "OL"];

fn is_playlist_id(s: &str) -> bool {
    s.len() > 2
        && PLAYLIST_PREFIXES.iter().any(|p| s.starts_with(p))
        && s.chars().all(is_id_char)
}

fn parse_youtube_url(input: &str) -> Option<(Url, String)> {
    let with_scheme = if input.contains("://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    };
    let url = Url::parse(&with_scheme).ok()?;
    let host = url
        .host_str()?
        .trim_start_matches("www.")
        .trim_start_matches("m.")
        .to_string();

    Some((url, host))
}

fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

/// Accepts a bare video id, a `watch?v=` URL, a `youtu.be` link or a
/// `/shorts/`, `/embed/` or `/live/` URL.
pub fn video_id(input: &str) -> Result<String, IdError> {
    let input = input.trim();
    if is_video_id(input) {
        return Ok(input.to_string());
    }

    let invalid = || IdError::InvalidVideo(input.to_string());
    let (url, host) = parse_youtube_url(input).ok_or_else(invalid)?;
    let mut segments = url.path_segments().into_iter().flatten();

    let candidate = match host.as_str() {
        "youtu.be" => segments.next().map(str::to_string),
        "youtube.com" | "music.youtube.com" | "youtube-nocookie.com" => {
            match (segments.next(), segments.next()) {
                (Some("watch"), _) => query_param(&url, "v"),
                (Some("shorts" | "embed" | "live" | "v"), Some(id)) => Some(id.to_string()),
                _ => None,
            }
        }
        _ => None,
    };

    candidate.filter(|id| is_video_id(id)).ok_or_else(invalid)
}

/// Accepts a bare playlist id or any YouTube URL carrying a `list` parameter.
pub fn playlist_id(input: &str) -> Result<String, IdError> {
    let input = input.trim();
    if is_playlist_id(input) {
        return Ok(input.to_string());
    }

    let invalid = || IdError::InvalidPlaylist(input.to_string());
    let (url, host) = parse_youtube_url(input).ok_or_else(invalid)?;
    if !matches!(host.as_str(), "youtube.com" | "music.youtube.com" | "youtu.be") {
        return Err(invalid());
    }

    query_param(&url, "list")
        .filter(|id| is_playlist_id(id))
        .ok_or_else(invalid)
}

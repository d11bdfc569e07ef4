use async_trait::async_trait;
use serde::Deserialize;
use serde_aux::prelude::*;
use serde_json::Value;

use crate::util::{self, HttpClient};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Largest page the `playlistItems` endpoint returns. Only the first page is
/// fetched.
pub const MAX_RESULTS: u32 = 50;

const VIDEO_PARTS: &str = "statistics,status,snippet,contentDetails,topicDetails";
const VIDEO_METADATA_PARTS: &str = "snippet";
const PLAYLIST_ITEM_PARTS: &str = "snippet,status";
const PLAYLIST_PARTS: &str = "snippet,contentDetails";

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] util::HttpError),
    #[error("could not parse API response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("YouTube API error {status} ({reason}): {message}")]
    Api {
        status: u16,
        reason: String,
        message: String,
    },
    #[error("{0} not found")]
    NotFound(String),
    #[error("no YouTube API key configured, set one with `tube-info key set <KEY>`")]
    MissingApiKey,
}

impl ApiError {
    /// Machine readable reason such as `quotaExceeded` or `playlistNotFound`.
    pub fn reason(&self) -> Option<&str> {
        match self {
            ApiError::Api { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

// Google API error envelope

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    reason: String,
}

/// Decodes a non-2xx response body into [`ApiError::Api`].
pub fn parse_api_error(status: u16, body: &str) -> ApiError {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(resp) => ApiError::Api {
            status,
            reason: resp
                .error
                .errors
                .into_iter()
                .next()
                .map(|e| e.reason)
                .unwrap_or_else(|| "unknown".into()),
            message: resp.error.message,
        },
        Err(_) => ApiError::Api {
            status,
            reason: "unknown".into(),
            message: body.trim().chars().take(200).collect(),
        },
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistResource {
    snippet: PlaylistSnippet,
    content_details: PlaylistContentDetails,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistSnippet {
    title: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistContentDetails {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    item_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistMetadata {
    pub title: String,
    pub item_count: u64,
}

impl From<PlaylistResource> for PlaylistMetadata {
    fn from(res: PlaylistResource) -> Self {
        Self {
            title: res.snippet.title,
            item_count: res.content_details.item_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoResource {
    snippet: VideoSnippet,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: String,
    #[serde(default)]
    channel_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    pub title: String,
    pub channel_title: String,
}

impl From<VideoResource> for VideoMetadata {
    fn from(res: VideoResource) -> Self {
        Self {
            title: res.snippet.title,
            channel_title: res.snippet.channel_title,
        }
    }
}

/// Source of raw API items. [`YouTubeClient`] talks to the real API.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// One raw `/videos` item.
    async fn video(&self, video_id: &str) -> Result<Value, ApiError>;

    /// Title and channel title only, fetched with `part=snippet`.
    async fn video_metadata(&self, video_id: &str) -> Result<VideoMetadata, ApiError>;

    /// Raw `/playlistItems` entries of the first page, at most [`MAX_RESULTS`].
    async fn playlist_items(&self, playlist_id: &str) -> Result<Vec<Value>, ApiError>;

    async fn playlist_metadata(&self, playlist_id: &str) -> Result<PlaylistMetadata, ApiError>;
}

pub struct YouTubeClient {
    http: HttpClient,
    api_key: String,
    base_url: String,
}

impl YouTubeClient {
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, ApiError> {
        if api_key.trim().is_empty() {
            return Err(ApiError::MissingApiKey);
        }

        let http = HttpClient::new().map_err(util::HttpError::from)?;

        Ok(Self {
            http,
            api_key: api_key.trim().to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn list<T>(&self, resource: &str, params: &[(&str, &str)]) -> Result<Vec<T>, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, resource);
        let mut query = vec![("key", self.api_key.as_str())];
        query.extend_from_slice(params);

        debug!("GET {} {:?}", url, params);
        let (status, body) = self.http.fetch_text(&url, &query).await?;

        if !status.is_success() {
            let err = parse_api_error(status.as_u16(), &body);
            warn!("{} request failed: {}", resource, err);
            return Err(err);
        }

        let resp: ListResponse<T> = serde_json::from_str(&body)?;
        debug!("{} returned {} items", resource, resp.items.len());

        Ok(resp.items)
    }
}

#[async_trait]
impl MetadataSource for YouTubeClient {
    async fn video(&self, video_id: &str) -> Result<Value, ApiError> {
        self.list::<Value>("videos", &[("part", VIDEO_PARTS), ("id", video_id)])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(format!("video {}", video_id)))
    }

    async fn video_metadata(&self, video_id: &str) -> Result<VideoMetadata, ApiError> {
        self.list::<VideoResource>("videos", &[("part", VIDEO_METADATA_PARTS), ("id", video_id)])
            .await?
            .into_iter()
            .next()
            .map(VideoMetadata::from)
            .ok_or_else(|| ApiError::NotFound(format!("video {}", video_id)))
    }

    async fn playlist_items(&self, playlist_id: &str) -> Result<Vec<Value>, ApiError> {
        let max_results = MAX_RESULTS.to_string();
        self.list(
            "playlistItems",
            &[
                ("part", PLAYLIST_ITEM_PARTS),
                ("playlistId", playlist_id),
                ("maxResults", &max_results),
            ],
        )
        .await
    }

    async fn playlist_metadata(&self, playlist_id: &str) -> Result<PlaylistMetadata, ApiError> {
        self.list::<PlaylistResource>("playlists", &[("part", PLAYLIST_PARTS), ("id", playlist_id)])
            .await?
            .into_iter()
            .next()
            .map(PlaylistMetadata::from)
            .ok_or_else(|| ApiError::NotFound(format!("playlist {}", playlist_id)))
    }
}

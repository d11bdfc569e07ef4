//! # tube-info
//!
//! This crate exports metadata of YouTube videos and playlists, as returned by
//! the YouTube Data API v3, into flat JSON or CSV reports.
//!
//! ## Usage
//!
//! The heart of the crate is the projection from a raw, nested API item to a
//! flat record holding only the fields the user asked for, in the order they
//! asked for them. Fields are looked up in a per-entity catalog and passed
//! through derivation rules that build URLs, format durations and hide data of
//! private or deleted playlist entries.
//!
//! ```rust
//! use serde_json::json;
//! use tube_info::{
//!     catalog::{EntityKind, ExportSelection},
//!     playlist::PlaylistBatchProjector,
//!     projector,
//! };
//!
//! // A video item as returned by `/videos`
//! let video = json!({
//!     "id": "abc12345678",
//!     "snippet": { "title": "Hello", "channelId": "UCxyz" },
//!     "contentDetails": { "duration": "PT59M10S" }
//! });
//! let selection = ExportSelection::new(EntityKind::Video, ["title", "url", "length"]).unwrap();
//! let record = projector::project_video(&video, &selection).unwrap();
//! assert_eq!(
//!     record.into_value(),
//!     json!({
//!         "title": "Hello",
//!         "url": "https://youtu.be/abc12345678",
//!         "length": "59 minutes, 10 seconds"
//!     })
//! );
//!
//! // Playlist entries, dropping private and deleted videos
//! let items = vec![
//!     json!({ "snippet": { "title": "Private video" }, "status": { "privacyStatus": "private" } }),
//!     json!({ "snippet": { "title": "Kept", "position": 1 }, "status": { "privacyStatus": "public" } }),
//! ];
//! let selection = ExportSelection::new(EntityKind::PlaylistItem, ["position", "title"]).unwrap();
//! let records = PlaylistBatchProjector::new(&selection, true)
//!     .project_all(&items)
//!     .unwrap();
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].get("title"), Some(&json!("Kept")));
//! ```
//!
//! Fetching goes through the [`api::MetadataSource`] trait, implemented by
//! [`api::YouTubeClient`]. The [`report`] module ties fetching, projection and
//! the [`export`] writers together.

#![forbid(unsafe_code)]
#[macro_use]
extern crate log;

pub mod api;
pub mod catalog;
pub mod config;
pub mod duration;
pub mod export;
pub mod ids;
pub mod path;
pub mod playlist;
pub mod projector;
pub mod report;
pub mod util;

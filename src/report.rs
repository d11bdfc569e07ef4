use std::path::PathBuf;

use chrono::{NaiveDate, Utc};

use crate::{
    api::{self, ApiError, MetadataSource},
    catalog::{EntityKind, ExportSelection},
    config::Config,
    export::{self, ExportError, ExportOptions, FileExt, Report},
    path,
    playlist::PlaylistBatchProjector,
    projector::{self, ProjectionError},
};

#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    ApiError(#[from] ApiError),
    #[error(transparent)]
    ProjectionError(#[from] ProjectionError),
    #[error(transparent)]
    ExportError(#[from] ExportError),
}

/// Where and how a report is written, plus the playlist suppression flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub file_ext: FileExt,
    pub folder: PathBuf,
    pub suppress_private_or_deleted: bool,
    pub date: NaiveDate,
}

impl ReportOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            file_ext: config.file_ext,
            folder: config.folder_path.clone(),
            suppress_private_or_deleted: config.skip_private_or_deleted,
            date: Utc::now().date_naive(),
        }
    }

    fn export_options(&self, title: String) -> ExportOptions {
        ExportOptions {
            file_ext: self.file_ext,
            folder: self.folder.clone(),
            title,
            date: self.date,
        }
    }
}

/// Fetches one video, projects `selection` and writes the report.
pub async fn export_video<S>(
    source: &S,
    video_id: &str,
    selection: &ExportSelection,
    options: &ReportOptions,
) -> Result<PathBuf, ReportError>
where
    S: MetadataSource + ?Sized,
{
    expect_kind(selection, EntityKind::Video)?;

    let raw = source.video(video_id).await?;
    let title = path::resolve_str(&raw, "snippet.title")
        .unwrap_or(video_id)
        .to_string();
    info!("Exporting video \"{}\"", title);

    let record = projector::project_video(&raw, selection)?;
    let path = export::write_report(
        Report::Single(&record),
        selection.fields(),
        &options.export_options(title),
    )?;

    Ok(path)
}

/// Fetches the first page of a playlist, projects every kept entry and writes
/// the report.
pub async fn export_playlist<S>(
    source: &S,
    playlist_id: &str,
    selection: &ExportSelection,
    options: &ReportOptions,
) -> Result<PathBuf, ReportError>
where
    S: MetadataSource + ?Sized,
{
    expect_kind(selection, EntityKind::PlaylistItem)?;

    let metadata = source.playlist_metadata(playlist_id).await?;
    info!(
        "Exporting playlist \"{}\" ({} videos)",
        metadata.title, metadata.item_count
    );
    if metadata.item_count > u64::from(api::MAX_RESULTS) {
        warn!(
            "Playlist has {} videos, only the first {} are exported",
            metadata.item_count,
            api::MAX_RESULTS
        );
    }

    let items = source.playlist_items(playlist_id).await?;
    let records = PlaylistBatchProjector::new(selection, options.suppress_private_or_deleted)
        .project_all(&items)?;
    if records.len() < items.len() {
        info!(
            "Skipped {} private or deleted videos",
            items.len() - records.len()
        );
    }

    let path = export::write_report(
        Report::Many(&records),
        selection.fields(),
        &options.export_options(metadata.title),
    )?;

    Ok(path)
}

fn expect_kind(selection: &ExportSelection, expected: EntityKind) -> Result<(), ProjectionError> {
    if selection.kind() == expected {
        Ok(())
    } else {
        Err(ProjectionError::KindMismatch {
            expected,
            found: selection.kind(),
        })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::*;
    use crate::api::{PlaylistMetadata, VideoMetadata};

    struct FixtureSource;

    fn get_test_json(fname: &str) -> Value {
        let mut d = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        d.push("resources/test/");
        d.push(fname);
        let text = std::fs::read_to_string(d).expect(format!("Could not read {}", fname).as_str());
        serde_json::from_str(&text).expect("Could not parse fixture")
    }

    #[async_trait]
    impl MetadataSource for FixtureSource {
        async fn video(&self, video_id: &str) -> Result<Value, ApiError> {
            match video_id {
                "5C_HPTJg5ek" => Ok(get_test_json("video.json")),
                _ => Err(ApiError::NotFound(format!("video {}", video_id))),
            }
        }

        async fn video_metadata(&self, video_id: &str) -> Result<VideoMetadata, ApiError> {
            let raw = self.video(video_id).await?;
            Ok(VideoMetadata {
                title: path::resolve_str(&raw, "snippet.title").unwrap_or_default().into(),
                channel_title: path::resolve_str(&raw, "snippet.channelTitle")
                    .unwrap_or_default()
                    .into(),
            })
        }

        async fn playlist_items(&self, playlist_id: &str) -> Result<Vec<Value>, ApiError> {
            match playlist_id {
                "PLrust" => Ok(get_test_json("playlist_items.json")["items"]
                    .as_array()
                    .cloned()
                    .unwrap_or_default()),
                _ => Err(api::parse_api_error(
                    404,
                    r#"{"error":{"code":404,"message":"not found","errors":[{"reason":"playlistNotFound"}]}}"#,
                )),
            }
        }

        async fn playlist_metadata(&self, playlist_id: &str) -> Result<PlaylistMetadata, ApiError> {
            match playlist_id {
                "PLrust" => Ok(PlaylistMetadata {
                    title: "Rust: the good parts".into(),
                    item_count: 4,
                }),
                _ => Err(api::parse_api_error(
                    404,
                    r#"{"error":{"code":404,"message":"not found","errors":[{"reason":"playlistNotFound"}]}}"#,
                )),
            }
        }
    }

    fn options(dir: &std::path::Path, file_ext: FileExt, suppress: bool) -> ReportOptions {
        ReportOptions {
            file_ext,
            folder: dir.to_path_buf(),
            suppress_private_or_deleted: suppress,
            date: NaiveDate::from_ymd_opt(2024, 2, 15).unwrap(),
        }
    }

    #[tokio::test]
    async fn video_json() {
        let dir = tempfile::tempdir().unwrap();
        let selection =
            ExportSelection::new(EntityKind::Video, ["title", "length", "url"]).unwrap();

        let path = export_video(
            &FixtureSource,
            "5C_HPTJg5ek",
            &selection,
            &options(dir.path(), FileExt::Json, true),
        )
        .await
        .unwrap();

        assert_eq!(path, dir.path().join("2024-02-15 Rust in 100 Seconds.json"));
        let written: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(
            written,
            json!({
                "title": "Rust in 100 Seconds",
                "length": "2 minutes, 25 seconds",
                "url": "https://youtu.be/5C_HPTJg5ek"
            })
        );
    }

    #[tokio::test]
    async fn playlist_csv_skips_hidden() {
        let dir = tempfile::tempdir().unwrap();
        let selection =
            ExportSelection::new(EntityKind::PlaylistItem, ["position", "title", "url"]).unwrap();

        let path = export_playlist(
            &FixtureSource,
            "PLrust",
            &selection,
            &options(dir.path(), FileExt::Csv, true),
        )
        .await
        .unwrap();

        assert_eq!(path, dir.path().join("2024-02-15 Rust the good parts.csv"));
        let text = std::fs::read_to_string(path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "position,title,url",
                "0,Rust in 100 Seconds,https://youtu.be/5C_HPTJg5ek",
                r#"3,"Async Rust, ""explained""",https://youtu.be/ThjvMReOXYM"#,
            ]
        );
    }

    #[tokio::test]
    async fn playlist_json_keeps_hidden() {
        let dir = tempfile::tempdir().unwrap();
        let selection =
            ExportSelection::new(EntityKind::PlaylistItem, ["videoPrivacy", "description"])
                .unwrap();

        let path = export_playlist(
            &FixtureSource,
            "PLrust",
            &selection,
            &options(dir.path(), FileExt::Json, false),
        )
        .await
        .unwrap();

        let written: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        let entries = written.as_array().unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[1], json!({ "videoPrivacy": "private", "description": null }));
        assert_eq!(entries[2], json!({ "videoPrivacy": "deleted", "description": null }));
    }

    #[tokio::test]
    async fn api_errors_surface() {
        let dir = tempfile::tempdir().unwrap();
        let selection = ExportSelection::new(EntityKind::PlaylistItem, ["title"]).unwrap();

        let err = export_playlist(
            &FixtureSource,
            "PLmissing",
            &selection,
            &options(dir.path(), FileExt::Json, true),
        )
        .await
        .unwrap_err();

        match err {
            ReportError::ApiError(e) => assert_eq!(e.reason(), Some("playlistNotFound")),
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn video_metadata_through_trait_object() {
        let source: &dyn MetadataSource = &FixtureSource;
        let meta = source.video_metadata("5C_HPTJg5ek").await.unwrap();
        assert_eq!(meta.title, "Rust in 100 Seconds");
        assert_eq!(meta.channel_title, "Fireship");

        assert!(matches!(
            source.video_metadata("missing0000").await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn wrong_selection_kind() {
        let dir = tempfile::tempdir().unwrap();
        let selection = ExportSelection::new(EntityKind::PlaylistItem, ["title"]).unwrap();

        let err = export_video(
            &FixtureSource,
            "5C_HPTJg5ek",
            &selection,
            &options(dir.path(), FileExt::Json, true),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            ReportError::ProjectionError(ProjectionError::KindMismatch { .. })
        ));
    }
}

use serde_json::Value;

use crate::{
    catalog::{EntityKind, ExportSelection},
    path,
    projector::{EntityContext, ProjectedRecord, ProjectionError, RecordProjector},
};

/// Title YouTube reports for playlist entries whose video was removed.
pub const DELETED_VIDEO_TITLE: &str = "Deleted video";
pub const PRIVATE_STATUS: &str = "private";

const PRIVACY_STATUS_PATH: &str = "status.privacyStatus";
const TITLE_PATH: &str = "snippet.title";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrivacyState {
    #[default]
    Normal,
    Private,
    Deleted,
}

impl PrivacyState {
    /// Classifies a raw `/playlistItems` entry. The deleted title takes
    /// precedence over a private status.
    pub fn classify(raw: &Value) -> Self {
        if path::resolve_str(raw, TITLE_PATH) == Some(DELETED_VIDEO_TITLE) {
            PrivacyState::Deleted
        } else if path::resolve_str(raw, PRIVACY_STATUS_PATH) == Some(PRIVATE_STATUS) {
            PrivacyState::Private
        } else {
            PrivacyState::Normal
        }
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self, PrivacyState::Private | PrivacyState::Deleted)
    }
}

/// Projects every entry of a playlist page, optionally dropping private and
/// deleted entries.
#[derive(Debug, Clone)]
pub struct PlaylistBatchProjector<'a> {
    projector: RecordProjector,
    selection: &'a ExportSelection,
    suppress_private_or_deleted: bool,
}

impl<'a> PlaylistBatchProjector<'a> {
    pub fn new(selection: &'a ExportSelection, suppress_private_or_deleted: bool) -> Self {
        Self {
            projector: RecordProjector::for_kind(EntityKind::PlaylistItem),
            selection,
            suppress_private_or_deleted,
        }
    }

    pub fn project_all(&self, items: &[Value]) -> Result<Vec<ProjectedRecord>, ProjectionError> {
        let mut records = Vec::with_capacity(items.len());

        for (idx, item) in items.iter().enumerate() {
            let privacy = PrivacyState::classify(item);
            if self.suppress_private_or_deleted && privacy.is_hidden() {
                debug!("Skipping {:?} playlist entry at index {}", privacy, idx);
                continue;
            }

            let ctx = EntityContext { privacy };
            records.push(self.projector.project(item, self.selection, &ctx)?);
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn get_test_items() -> Vec<Value> {
        let mut d = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        d.push("resources/test/playlist_items.json");
        let text = std::fs::read_to_string(d).expect("Could not read playlist_items.json");
        let page: Value = serde_json::from_str(&text).expect("Could not parse fixture");
        page["items"].as_array().cloned().expect("No items in fixture")
    }

    fn selection(fields: &[&str]) -> ExportSelection {
        ExportSelection::new(EntityKind::PlaylistItem, fields).unwrap()
    }

    #[test]
    fn classify() {
        assert_eq!(
            PrivacyState::classify(&json!({ "status": { "privacyStatus": "public" }, "snippet": { "title": "a" } })),
            PrivacyState::Normal
        );
        assert_eq!(
            PrivacyState::classify(&json!({ "status": { "privacyStatus": "private" }, "snippet": { "title": "Private video" } })),
            PrivacyState::Private
        );
        assert_eq!(
            PrivacyState::classify(&json!({ "status": { "privacyStatus": "private" }, "snippet": { "title": "Deleted video" } })),
            PrivacyState::Deleted
        );
        assert_eq!(PrivacyState::classify(&json!({})), PrivacyState::Normal);
    }

    #[test]
    fn suppresses_hidden_entries() {
        let items = get_test_items();
        let sel = selection(&["position", "title"]);
        let records = PlaylistBatchProjector::new(&sel, true)
            .project_all(&items)
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("position"), Some(&json!(0)));
        assert_eq!(records[1].get("position"), Some(&json!(3)));
    }

    #[test]
    fn keeps_hidden_entries_with_nulled_fields() {
        let items = get_test_items();
        let sel = selection(&["title", "description", "uploaderUrl", "videoPrivacy", "url"]);
        let records = PlaylistBatchProjector::new(&sel, false)
            .project_all(&items)
            .unwrap();

        assert_eq!(records.len(), items.len());

        let normal = &records[0];
        assert_eq!(
            normal.get("uploaderUrl"),
            Some(&json!("https://www.youtube.com/channel/UCsBjURrPoezykLs9EqgamOA"))
        );
        assert_eq!(normal.get("url"), Some(&json!("https://youtu.be/5C_HPTJg5ek")));
        assert_eq!(normal.get("videoPrivacy"), Some(&json!("public")));
        assert!(normal.get("description").unwrap().is_string());

        let private = &records[1];
        assert_eq!(private.get("title"), Some(&json!("Private video")));
        assert_eq!(private.get("description"), Some(&Value::Null));
        assert_eq!(private.get("uploaderUrl"), Some(&Value::Null));
        assert_eq!(private.get("videoPrivacy"), Some(&json!("private")));

        let deleted = &records[2];
        assert_eq!(deleted.get("description"), Some(&Value::Null));
        assert_eq!(deleted.get("uploaderUrl"), Some(&Value::Null));
        assert_eq!(deleted.get("videoPrivacy"), Some(&json!("deleted")));
        assert_eq!(deleted.get("url"), Some(&json!("https://youtu.be/dQw4w9WgXcQ")));
    }

    #[test]
    fn deleted_title_overrides_status() {
        let item = json!({
            "snippet": { "title": "Deleted video" },
            "status": { "privacyStatus": "public" }
        });
        let sel = selection(&["videoPrivacy"]);
        let records = PlaylistBatchProjector::new(&sel, false)
            .project_all(&[item])
            .unwrap();
        assert_eq!(records[0].clone().into_value(), json!({ "videoPrivacy": "deleted" }));
    }

    #[test]
    fn order_and_shape() {
        let items = get_test_items();
        let fields = ["thumbnail", "publishTime", "position", "uploader"];
        let sel = selection(&fields);
        let records = PlaylistBatchProjector::new(&sel, false)
            .project_all(&items)
            .unwrap();

        let positions: Vec<_> = records.iter().map(|r| r.get("position").cloned()).collect();
        assert_eq!(
            positions,
            vec![Some(json!(0)), Some(json!(1)), Some(json!(2)), Some(json!(3))]
        );
        for record in &records {
            assert_eq!(record.keys().collect::<Vec<_>>(), fields);
        }
        assert_eq!(records[1].get("thumbnail"), Some(&Value::Null));
    }

    #[test]
    fn empty_page() {
        let sel = selection(&["title"]);
        assert!(PlaylistBatchProjector::new(&sel, true)
            .project_all(&[])
            .unwrap()
            .is_empty());
    }

    #[test]
    fn video_selection_is_rejected() {
        let sel = ExportSelection::new(EntityKind::Video, ["title"]).unwrap();
        let items = get_test_items();
        assert!(matches!(
            PlaylistBatchProjector::new(&sel, false).project_all(&items),
            Err(ProjectionError::KindMismatch { .. })
        ));
    }
}

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    catalog::{EntityKind, ExportSelection, FieldCatalog},
    duration, path,
    playlist::PrivacyState,
};

pub const VIDEO_URL_PREFIX: &str = "https://youtu.be/";
pub const CHANNEL_URL_PREFIX: &str = "https://www.youtube.com/channel/";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("unknown {kind} field: {field}")]
    UnknownField { kind: EntityKind, field: String },
    #[error("field selected more than once: {0}")]
    DuplicateField(String),
    #[error("no {0} fields selected")]
    EmptySelection(EntityKind),
    #[error("selection is for {found} fields but the catalog holds {expected} fields")]
    KindMismatch {
        expected: EntityKind,
        found: EntityKind,
    },
}

/// Per-entity facts a derivation rule may look at besides the field's own value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntityContext {
    pub privacy: PrivacyState,
}

pub type Derive = fn(Value, &EntityContext) -> Value;

#[derive(Debug, Clone, Copy)]
pub struct DerivationRule {
    pub field: &'static str,
    pub derive: Derive,
}

/// Field name to transform table applied after path resolution.
#[derive(Debug, Clone, Copy)]
pub struct DerivationRules {
    rules: &'static [DerivationRule],
}

const fn rule(field: &'static str, derive: Derive) -> DerivationRule {
    DerivationRule { field, derive }
}

pub static VIDEO_RULES: DerivationRules = DerivationRules {
    rules: &[
        rule("channelId", channel_url),
        rule("length", readable_duration),
        rule("url", video_url),
    ],
};

/// Private and deleted entries lose their description and uploader link, and
/// deleted entries report `"deleted"` as their privacy.
pub static PLAYLIST_ITEM_RULES: DerivationRules = DerivationRules {
    rules: &[
        rule("url", video_url),
        rule("uploaderUrl", uploader_url),
        rule("description", visible_only),
        rule("videoPrivacy", video_privacy),
    ],
};

impl DerivationRules {
    pub fn for_kind(kind: EntityKind) -> &'static DerivationRules {
        match kind {
            EntityKind::Video => &VIDEO_RULES,
            EntityKind::PlaylistItem => &PLAYLIST_ITEM_RULES,
        }
    }

    pub fn get(&self, field: &str) -> Option<Derive> {
        self.rules.iter().find(|r| r.field == field).map(|r| r.derive)
    }

    pub fn apply(&self, field: &str, base: Value, ctx: &EntityContext) -> Value {
        match self.get(field) {
            Some(derive) => derive(base, ctx),
            None => base,
        }
    }
}

fn prefixed(prefix: &str, base: Value) -> Value {
    match base {
        Value::String(id) => Value::String(format!("{}{}", prefix, id)),
        Value::Number(n) => Value::String(format!("{}{}", prefix, n)),
        _ => Value::Null,
    }
}

fn channel_url(base: Value, _: &EntityContext) -> Value {
    prefixed(CHANNEL_URL_PREFIX, base)
}

fn video_url(base: Value, _: &EntityContext) -> Value {
    prefixed(VIDEO_URL_PREFIX, base)
}

fn readable_duration(base: Value, _: &EntityContext) -> Value {
    match base {
        Value::String(code) => Value::String(duration::format(&code)),
        other => other,
    }
}

fn uploader_url(base: Value, ctx: &EntityContext) -> Value {
    if ctx.privacy.is_hidden() {
        Value::Null
    } else {
        prefixed(CHANNEL_URL_PREFIX, base)
    }
}

fn visible_only(base: Value, ctx: &EntityContext) -> Value {
    if ctx.privacy.is_hidden() {
        Value::Null
    } else {
        base
    }
}

fn video_privacy(base: Value, ctx: &EntityContext) -> Value {
    match ctx.privacy {
        PrivacyState::Deleted => Value::String("deleted".into()),
        _ => base,
    }
}

/// Flat output record. Keys follow the order of the [`ExportSelection`] it was
/// built from.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ProjectedRecord(Map<String, Value>);

impl ProjectedRecord {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Pairs a catalog with its derivation rules.
#[derive(Debug, Clone, Copy)]
pub struct RecordProjector {
    catalog: &'static FieldCatalog,
    rules: &'static DerivationRules,
}

impl RecordProjector {
    pub fn new(catalog: &'static FieldCatalog, rules: &'static DerivationRules) -> Self {
        Self { catalog, rules }
    }

    pub fn for_kind(kind: EntityKind) -> Self {
        Self::new(FieldCatalog::for_kind(kind), DerivationRules::for_kind(kind))
    }

    pub fn catalog(&self) -> &'static FieldCatalog {
        self.catalog
    }

    /// Builds one record with exactly the selected fields, in selection order.
    ///
    /// Missing paths become `null`. Fails without producing a partial record
    /// when the selection names a field outside the catalog.
    pub fn project(
        &self,
        raw: &Value,
        selection: &ExportSelection,
        ctx: &EntityContext,
    ) -> Result<ProjectedRecord, ProjectionError> {
        if selection.kind() != self.catalog.kind() {
            return Err(ProjectionError::KindMismatch {
                expected: self.catalog.kind(),
                found: selection.kind(),
            });
        }

        let mut out = Map::with_capacity(selection.len());
        for field in selection.fields() {
            let source_path = self.catalog.source_path_for(field)?;
            let base = path::resolve(raw, source_path)
                .cloned()
                .unwrap_or(Value::Null);
            out.insert(field.to_string(), self.rules.apply(field, base, ctx));
        }

        Ok(ProjectedRecord(out))
    }
}

/// Projects a single `/videos` item.
pub fn project_video(
    raw: &Value,
    selection: &ExportSelection,
) -> Result<ProjectedRecord, ProjectionError> {
    RecordProjector::for_kind(EntityKind::Video).project(raw, selection, &EntityContext::default())
}

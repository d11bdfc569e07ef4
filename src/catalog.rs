use std::fmt;

use crate::projector::ProjectionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Video,
    PlaylistItem,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Video => write!(f, "video"),
            EntityKind::PlaylistItem => write!(f, "playlist item"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub field: &'static str,
    pub source_path: &'static str,
}

impl CatalogEntry {
    pub const fn new(field: &'static str, source_path: &'static str) -> Self {
        Self { field, source_path }
    }
}

const fn entry(field: &'static str, source_path: &'static str) -> CatalogEntry {
    CatalogEntry::new(field, source_path)
}

/// Closed mapping from export field names to dotted paths inside a raw API item.
#[derive(Debug, PartialEq, Eq)]
pub struct FieldCatalog {
    kind: EntityKind,
    entries: &'static [CatalogEntry],
}

/// Fields of an item returned by `/videos`.
pub static VIDEO: FieldCatalog = FieldCatalog {
    kind: EntityKind::Video,
    entries: &[
        entry("channelId", "snippet.channelId"),
        entry("channelTitle", "snippet.channelTitle"),
        entry("commentCount", "statistics.commentCount"),
        entry("description", "snippet.description"),
        entry("favoriteCount", "statistics.favoriteCount"),
        entry("length", "contentDetails.duration"),
        entry("likeCount", "statistics.likeCount"),
        entry("privacyStatus", "status.privacyStatus"),
        entry("publishDate", "snippet.publishedAt"),
        entry("tags", "snippet.tags"),
        entry("thumbnail", "snippet.thumbnails.standard.url"),
        entry("title", "snippet.title"),
        entry("url", "id"),
        entry("viewCount", "statistics.viewCount"),
    ],
};

/// Fields of an item returned by `/playlistItems`.
pub static PLAYLIST_ITEM: FieldCatalog = FieldCatalog {
    kind: EntityKind::PlaylistItem,
    entries: &[
        entry("position", "snippet.position"),
        entry("title", "snippet.title"),
        entry("uploader", "snippet.videoOwnerChannelTitle"),
        entry("uploaderUrl", "snippet.videoOwnerChannelId"),
        entry("url", "snippet.resourceId.videoId"),
        entry("description", "snippet.description"),
        entry("videoPrivacy", "status.privacyStatus"),
        entry("publishTime", "snippet.publishedAt"),
        entry("thumbnail", "snippet.thumbnails.standard.url"),
    ],
};

impl FieldCatalog {
    pub const fn new(kind: EntityKind, entries: &'static [CatalogEntry]) -> Self {
        Self { kind, entries }
    }

    pub fn for_kind(kind: EntityKind) -> &'static FieldCatalog {
        match kind {
            EntityKind::Video => &VIDEO,
            EntityKind::PlaylistItem => &PLAYLIST_ITEM,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn entries(&self) -> &'static [CatalogEntry] {
        self.entries
    }

    /// Recognized field names, in catalog order.
    pub fn valid_field_names(&self) -> impl Iterator<Item = &'static str> {
        self.entries.iter().map(|e| e.field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.entries.iter().any(|e| e.field == field)
    }

    pub fn source_path_for(&self, field: &str) -> Result<&'static str, ProjectionError> {
        self.entries
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.source_path)
            .ok_or_else(|| ProjectionError::UnknownField {
                kind: self.kind,
                field: field.to_string(),
            })
    }

    fn canonical(&self, field: &str) -> Option<&'static str> {
        self.entries.iter().find(|e| e.field == field).map(|e| e.field)
    }
}

/// Ordered, duplicate-free list of fields to export for one entity kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSelection {
    kind: EntityKind,
    fields: Vec<&'static str>,
}

impl ExportSelection {
    /// Validates `fields` against the catalog of `kind`, keeping the caller's order.
    pub fn new<I, S>(kind: EntityKind, fields: I) -> Result<Self, ProjectionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let catalog = FieldCatalog::for_kind(kind);
        let mut selected: Vec<&'static str> = Vec::new();

        for field in fields {
            let field = field.as_ref();
            let name = catalog
                .canonical(field)
                .ok_or_else(|| ProjectionError::UnknownField {
                    kind,
                    field: field.to_string(),
                })?;
            if selected.contains(&name) {
                return Err(ProjectionError::DuplicateField(field.to_string()));
            }
            selected.push(name);
        }

        if selected.is_empty() {
            return Err(ProjectionError::EmptySelection(kind));
        }

        Ok(Self {
            kind,
            fields: selected,
        })
    }

    /// Every field of the catalog, in catalog order.
    pub fn all(kind: EntityKind) -> Self {
        Self {
            kind,
            fields: FieldCatalog::for_kind(kind).valid_field_names().collect(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn fields(&self) -> &[&'static str] {
        &self.fields
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| *f == field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

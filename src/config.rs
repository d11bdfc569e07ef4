use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    api,
    catalog::{EntityKind, ExportSelection, FieldCatalog},
    export::FileExt,
    projector::ProjectionError,
};

/// Overrides the location of the configuration file.
pub const CONFIG_PATH_ENV: &str = "TUBE_INFO_CONFIG";

const API_KEY_LEN: usize = 39;

const PLAYLIST_DEFAULTS: &[&str] = &["position", "title", "uploader", "url", "thumbnail"];
const VIDEO_DEFAULTS: &[&str] = &[
    "channelTitle",
    "length",
    "likeCount",
    "publishDate",
    "thumbnail",
    "title",
    "viewCount",
];

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("could not parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("could not determine the configuration directory")]
    NoConfigDir,
    #[error("invalid API key: {0}")]
    InvalidApiKey(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub api_key: String,
    pub api_base_url: String,
    pub playlist_export_items: BTreeMap<String, bool>,
    pub video_export_items: BTreeMap<String, bool>,
    pub file_ext: FileExt,
    pub folder_path: PathBuf,
    pub skip_private_or_deleted: bool,
}

fn default_export_items(kind: EntityKind, enabled: &[&str]) -> BTreeMap<String, bool> {
    FieldCatalog::for_kind(kind)
        .valid_field_names()
        .map(|f| (f.to_string(), enabled.contains(&f)))
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: api::DEFAULT_BASE_URL.to_string(),
            playlist_export_items: default_export_items(EntityKind::PlaylistItem, PLAYLIST_DEFAULTS),
            video_export_items: default_export_items(EntityKind::Video, VIDEO_DEFAULTS),
            file_ext: FileExt::Json,
            folder_path: dirs::home_dir()
                .unwrap_or_default()
                .join("tube")
                .join("reports"),
            skip_private_or_deleted: true,
        }
    }
}

/// `$TUBE_INFO_CONFIG`, or `tube-info/config.json` in the platform config directory.
pub fn default_path() -> Result<PathBuf, ConfigError> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }

    dirs::config_dir()
        .map(|dir| dir.join("tube-info").join("config.json"))
        .ok_or(ConfigError::NoConfigDir)
}

/// Checks the shape of a YouTube Data API key without contacting the API.
pub fn validate_api_key(key: &str) -> Result<(), ConfigError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(ConfigError::InvalidApiKey("key is empty"));
    }
    if key.len() != API_KEY_LEN {
        return Err(ConfigError::InvalidApiKey("expected 39 characters"));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::InvalidApiKey("unexpected characters"));
    }
    Ok(())
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&default_path()?)
    }

    /// Missing files yield the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path)?;
        let mut config: Config = serde_json::from_str(&text)?;
        config.normalize();

        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = default_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        debug!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn export_items(&self, kind: EntityKind) -> &BTreeMap<String, bool> {
        match kind {
            EntityKind::Video => &self.video_export_items,
            EntityKind::PlaylistItem => &self.playlist_export_items,
        }
    }

    fn export_items_mut(&mut self, kind: EntityKind) -> &mut BTreeMap<String, bool> {
        match kind {
            EntityKind::Video => &mut self.video_export_items,
            EntityKind::PlaylistItem => &mut self.playlist_export_items,
        }
    }

    // Drops names that are no longer in the catalog and adds missing ones as disabled.
    fn normalize(&mut self) {
        for kind in [EntityKind::Video, EntityKind::PlaylistItem] {
            let items = self.export_items_mut(kind);
            let catalog = FieldCatalog::for_kind(kind);
            items.retain(|name, _| {
                let known = catalog.contains(name);
                if !known {
                    warn!("Ignoring unknown {} export item `{}` in config", kind, name);
                }
                known
            });
            for name in catalog.valid_field_names() {
                items.entry(name.to_string()).or_insert(false);
            }
        }
    }

    /// Enabled fields, in catalog order.
    pub fn default_selection(&self, kind: EntityKind) -> Result<ExportSelection, ProjectionError> {
        let items = self.export_items(kind);
        ExportSelection::new(
            kind,
            FieldCatalog::for_kind(kind)
                .valid_field_names()
                .filter(|f| items.get(*f).copied().unwrap_or(false)),
        )
    }

    pub fn set_default_selection(&mut self, selection: &ExportSelection) {
        let items = self.export_items_mut(selection.kind());
        for name in FieldCatalog::for_kind(selection.kind()).valid_field_names() {
            items.insert(name.to_string(), selection.contains(name));
        }
    }
}

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
    sync::OnceLock,
};

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::projector::ProjectedRecord;

const MAX_FILE_NAME_BYTES: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileExt {
    #[default]
    Json,
    Csv,
}

impl FileExt {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileExt::Json => "json",
            FileExt::Csv => "csv",
        }
    }
}

impl fmt::Display for FileExt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unsupported file extension `{0}`, expected `json` or `csv`")]
pub struct ParseFileExtError(String);

impl FromStr for FileExt {
    type Err = ParseFileExtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "json" => Ok(FileExt::Json),
            "csv" => Ok(FileExt::Csv),
            _ => Err(ParseFileExtError(s.to_string())),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("could not serialize JSON: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("could not write CSV: {0}")]
    CsvError(#[from] csv::Error),
    #[error("CSV output is not valid UTF-8")]
    Utf8Error(#[from] std::string::FromUtf8Error),
}

/// What gets written: one video is stored as a bare object, a playlist as an
/// array.
#[derive(Debug, Clone, Copy)]
pub enum Report<'a> {
    Single(&'a ProjectedRecord),
    Many(&'a [ProjectedRecord]),
}

impl<'a> Report<'a> {
    fn records(&self) -> &'a [ProjectedRecord] {
        match *self {
            Report::Single(record) => std::slice::from_ref(record),
            Report::Many(records) => records,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub file_ext: FileExt,
    pub folder: PathBuf,
    pub title: String,
    pub date: NaiveDate,
}

struct FileNameRules {
    illegal: Regex,
    control: Regex,
    reserved: Regex,
    windows_reserved: Regex,
    windows_trailing: Regex,
}

fn file_name_rules() -> &'static FileNameRules {
    static RULES: OnceLock<FileNameRules> = OnceLock::new();
    RULES.get_or_init(|| FileNameRules {
        illegal: Regex::new(r#"[/?<>\\:*|"]"#).expect("valid regex"),
        control: Regex::new(r"[\x00-\x1f\x80-\x9f]").expect("valid regex"),
        reserved: Regex::new(r"^\.+$").expect("valid regex"),
        windows_reserved: Regex::new(r"(?i)^(con|prn|aux|nul|com\d|lpt\d)(\..*)?$")
            .expect("valid regex"),
        windows_trailing: Regex::new(r"[. ]+$").expect("valid regex"),
    })
}

fn truncate_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Strips characters that are unsafe in file names on common platforms and
/// caps the result at 255 bytes.
pub fn sanitize_file_name(input: &str) -> String {
    let rules = file_name_rules();
    let out = rules.illegal.replace_all(input, "");
    let out = rules.control.replace_all(&out, "");
    let out = rules.reserved.replace_all(&out, "");
    let out = rules.windows_reserved.replace_all(&out, "");
    let out = rules.windows_trailing.replace_all(&out, "");

    truncate_bytes(&out, MAX_FILE_NAME_BYTES).to_string()
}

/// `2021-09-16 Some title.json`
pub fn exported_file_name(title: &str, ext: FileExt, date: NaiveDate) -> String {
    let name = format!("{} {}", date.format("%Y-%m-%d"), sanitize_file_name(title));
    format!("{}.{}", name.trim_end(), ext)
}

pub fn render_json(report: Report<'_>) -> Result<String, ExportError> {
    let out = match report {
        Report::Single(record) => serde_json::to_string_pretty(record)?,
        Report::Many(records) => serde_json::to_string_pretty(records)?,
    };
    Ok(out)
}

fn csv_cell(value: &Value) -> Result<String, ExportError> {
    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value)?,
    })
}

/// Header row is `fields`; every record contributes one row in the same
/// column order.
pub fn render_csv(fields: &[&str], records: &[ProjectedRecord]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(fields)?;

    for record in records {
        let row = fields
            .iter()
            .map(|f| record.get(f).map(csv_cell).unwrap_or_else(|| Ok(String::new())))
            .collect::<Result<Vec<_>, _>>()?;
        writer.write_record(&row)?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

pub fn render(report: Report<'_>, fields: &[&str], ext: FileExt) -> Result<String, ExportError> {
    match ext {
        FileExt::Json => render_json(report),
        FileExt::Csv => render_csv(fields, report.records()),
    }
}

/// Writes the report into `options.folder`, creating it when needed, and
/// returns the path of the new file.
pub fn write_report(
    report: Report<'_>,
    fields: &[&str],
    options: &ExportOptions,
) -> Result<PathBuf, ExportError> {
    ensure_folder(&options.folder)?;

    let output = render(report, fields, options.file_ext)?;
    let path = options
        .folder
        .join(exported_file_name(&options.title, options.file_ext, options.date));
    fs::write(&path, output)?;

    info!("Wrote {} records to {}", report.records().len(), path.display());

    Ok(path)
}

fn ensure_folder(folder: &Path) -> std::io::Result<()> {
    if !folder.exists() {
        fs::create_dir_all(folder)?;
        info!("Created folder {}", folder.display());
    }
    Ok(())
}

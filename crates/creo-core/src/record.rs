use std::fmt;

use crate::error::RecordError;
use crate::payload::PayloadKind;

pub(crate) const ENTRY_DELIMITER: char = ';';
pub(crate) const FIELD_DELIMITER: char = ':';
const FIELD_COUNT: usize = 5;

/// Root directory a package's install path is relative to.
///
/// Codes outside the known set are kept as `Unrecognized` so a store written
/// by a newer publisher still round-trips; only placement rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BaseDirectory {
    Root,
    Build,
    Content,
    LocalAppData,
    Unrecognized(u8),
}

impl BaseDirectory {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Root,
            1 => Self::Build,
            2 => Self::Content,
            3 => Self::LocalAppData,
            other => Self::Unrecognized(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Root => 0,
            Self::Build => 1,
            Self::Content => 2,
            Self::LocalAppData => 3,
            Self::Unrecognized(code) => code,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Build => "build",
            Self::Content => "content",
            Self::LocalAppData => "local-app-data",
            Self::Unrecognized(_) => "unrecognized",
        }
    }

    pub fn is_recognized(self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

/// One independently versioned installable unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageRecord {
    title: String,
    version: u32,
    base_directory: BaseDirectory,
    download_path: String,
    install_path: String,
}

impl PackageRecord {
    pub fn new(
        title: impl Into<String>,
        version: u32,
        base_directory: BaseDirectory,
        download_path: impl Into<String>,
        install_path: impl Into<String>,
    ) -> Result<Self, RecordError> {
        let title = title.into();
        let download_path = download_path.into();
        let install_path = install_path.into();

        if title.trim().is_empty() {
            return Err(RecordError::InvalidField {
                field: "title",
                value: title,
                reason: "must not be empty",
            });
        }
        validate_encodable("title", &title)?;
        validate_encodable("download path", &download_path)?;
        validate_encodable("install path", &install_path)?;

        Ok(Self {
            title,
            version,
            base_directory,
            download_path,
            install_path,
        })
    }

    /// Decodes one `title:version:baseDirectory:downloadPath:installPath` entry.
    ///
    /// Fields past the fifth are ignored.
    pub fn parse_entry(entry: &str) -> Result<Self, RecordError> {
        let fields: Vec<&str> = entry.split(FIELD_DELIMITER).collect();
        if !has_all_fields(entry) {
            return Err(RecordError::MalformedRecord {
                entry: entry.to_string(),
                reason: format!(
                    "expected {FIELD_COUNT} ':'-delimited fields, found {}",
                    fields.len()
                ),
            });
        }

        let version = fields[1].trim().parse::<u32>().map_err(|err| {
            RecordError::MalformedRecord {
                entry: entry.to_string(),
                reason: format!(
                    "version counter '{}' is not a non-negative integer: {err}",
                    fields[1]
                ),
            }
        })?;
        let base_code = fields[2].trim().parse::<u8>().map_err(|err| {
            RecordError::MalformedRecord {
                entry: entry.to_string(),
                reason: format!(
                    "base directory '{}' is not a directory code: {err}",
                    fields[2]
                ),
            }
        })?;

        Self::new(
            fields[0].trim(),
            version,
            BaseDirectory::from_code(base_code),
            fields[3].trim(),
            fields[4].trim(),
        )
        .map_err(|err| RecordError::MalformedRecord {
            entry: entry.to_string(),
            reason: err.to_string(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn base_directory(&self) -> BaseDirectory {
        self.base_directory
    }

    pub fn download_path(&self) -> &str {
        &self.download_path
    }

    pub fn install_path(&self) -> &str {
        &self.install_path
    }

    pub fn payload_kind(&self) -> PayloadKind {
        PayloadKind::infer_from_path(&self.download_path)
    }

    pub fn is_newer_than(&self, other: &PackageRecord) -> bool {
        self.version > other.version
    }
}

impl fmt::Display for PackageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}{sep}{}{sep}{}",
            self.title,
            self.version,
            self.base_directory.code(),
            self.download_path,
            self.install_path,
            sep = FIELD_DELIMITER
        )
    }
}

pub(crate) fn has_all_fields(entry: &str) -> bool {
    entry.split(FIELD_DELIMITER).count() >= FIELD_COUNT
}

fn validate_encodable(field: &'static str, value: &str) -> Result<(), RecordError> {
    if value.contains(FIELD_DELIMITER) || value.contains(ENTRY_DELIMITER) {
        return Err(RecordError::InvalidField {
            field,
            value: value.to_string(),
            reason: "must not contain ':' or ';'",
        });
    }
    // Parsing trims every field, so edge whitespace would not survive.
    if value.trim() != value {
        return Err(RecordError::InvalidField {
            field,
            value: value.to_string(),
            reason: "must not start or end with whitespace",
        });
    }
    Ok(())
}

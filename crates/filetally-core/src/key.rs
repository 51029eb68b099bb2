//! File type classification.

use std::fmt;
use std::path::Path;

use compact_str::CompactString;
use serde::{Serialize, Serializer};

/// Name of the version-control metadata directory that is sized as a
/// single blob instead of being traversed.
pub const VCS_DIR_NAME: &str = ".git";

/// Normalized classification label for a file.
///
/// Sentinel labels are separate variants so they can never collide with a
/// real extension string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileTypeKey {
    /// Lower-cased extension including the leading dot, e.g. `.rs`.
    Extension(CompactString),
    /// File name without any extension.
    NoExtension,
    /// Dot-prefixed name with no further extension, e.g. `.env`.
    DotFile,
    /// Empty or missing file name.
    Invalid,
    /// A version-control metadata directory counted as one blob.
    VcsMetadata,
}

impl FileTypeKey {
    pub const NO_EXTENSION_LABEL: &'static str = "[no extension]";
    pub const DOTFILE_LABEL: &'static str = "[dotfile]";
    pub const INVALID_LABEL: &'static str = "[invalid]";
    pub const VCS_LABEL: &'static str = "[.git]";

    /// Display label used by reporters.
    pub fn label(&self) -> &str {
        match self {
            Self::Extension(ext) => ext.as_str(),
            Self::NoExtension => Self::NO_EXTENSION_LABEL,
            Self::DotFile => Self::DOTFILE_LABEL,
            Self::Invalid => Self::INVALID_LABEL,
            Self::VcsMetadata => Self::VCS_LABEL,
        }
    }

    /// Parse a user-supplied include filter.
    ///
    /// Sentinel labels map to their variants, an empty string means
    /// `[no extension]`, and anything else becomes a lower-cased extension
    /// with a leading dot.
    pub fn from_filter(input: &str) -> Self {
        let input = input.trim();
        match input {
            "" | Self::NO_EXTENSION_LABEL => Self::NoExtension,
            Self::DOTFILE_LABEL => Self::DotFile,
            Self::INVALID_LABEL => Self::Invalid,
            Self::VCS_LABEL => Self::VcsMetadata,
            ext => {
                let mut normalized = CompactString::with_capacity(ext.len() + 1);
                if !ext.starts_with('.') {
                    normalized.push('.');
                }
                normalized.push_str(&ext.to_ascii_lowercase());
                Self::Extension(normalized)
            }
        }
    }
}

impl fmt::Display for FileTypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for FileTypeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Classify a path by its file name.
///
/// The extension starts at the last `.` of the file name; a dot at index 0
/// only marks the file as hidden. Lower-casing is ASCII-only so the result
/// does not depend on locale.
pub fn classify(path: &Path) -> FileTypeKey {
    let Some(name) = path.file_name() else {
        return FileTypeKey::Invalid;
    };
    let name = name.to_string_lossy();
    if name.is_empty() {
        return FileTypeKey::Invalid;
    }

    match name.rfind('.') {
        Some(0) => FileTypeKey::DotFile,
        Some(idx) => FileTypeKey::Extension(CompactString::new(name[idx..].to_ascii_lowercase())),
        None => FileTypeKey::NoExtension,
    }
}

/// Whether a file name marks a hidden entry.
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ext(s: &str) -> FileTypeKey {
        FileTypeKey::Extension(s.into())
    }

    #[test]
    fn test_classify_extensions() {
        assert_eq!(classify(Path::new("/a/main.rs")), ext(".rs"));
        assert_eq!(classify(Path::new("IMAGE.JPG")), ext(".jpg"));
        assert_eq!(classify(Path::new("archive.tar.gz")), ext(".gz"));
        assert_eq!(classify(Path::new("trailing.")), ext("."));
    }

    #[test]
    fn test_classify_sentinels() {
        assert_eq!(classify(Path::new("Makefile")), FileTypeKey::NoExtension);
        assert_eq!(classify(Path::new(".env")), FileTypeKey::DotFile);
        assert_eq!(classify(Path::new(".env.local")), ext(".local"));
        assert_eq!(classify(Path::new("")), FileTypeKey::Invalid);
        assert_eq!(classify(Path::new("/")), FileTypeKey::Invalid);
        assert_eq!(classify(Path::new("dir/..")), FileTypeKey::Invalid);
    }

    #[test]
    fn test_from_filter() {
        assert_eq!(FileTypeKey::from_filter(".rs"), ext(".rs"));
        assert_eq!(FileTypeKey::from_filter("RS"), ext(".rs"));
        assert_eq!(FileTypeKey::from_filter(""), FileTypeKey::NoExtension);
        assert_eq!(FileTypeKey::from_filter("[dotfile]"), FileTypeKey::DotFile);
        assert_eq!(FileTypeKey::from_filter("[.git]"), FileTypeKey::VcsMetadata);
    }

    #[test]
    fn test_sentinel_does_not_collide_with_extension() {
        let git_file = classify(Path::new("mirror.git"));
        assert_eq!(git_file, ext(".git"));
        assert_ne!(git_file, FileTypeKey::VcsMetadata);
        assert_ne!(git_file.label(), FileTypeKey::VcsMetadata.label());
    }
}

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Broad media family of a shared file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Audio,
    Video,
    Image,
    Document,
    Program,
    Other,
}

impl MediaType {
    pub const ALL: [MediaType; 6] = [
        Self::Audio,
        Self::Video,
        Self::Image,
        Self::Document,
        Self::Program,
        Self::Other,
    ];

    /// Schema name used by metadata documents of this family.
    #[must_use]
    pub fn schema(self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Image => "image",
            Self::Document => "document",
            Self::Program => "application",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.schema())
    }
}

const DEFAULT_EXTENSIONS: &[(MediaType, &[&str])] = &[
    (
        MediaType::Audio,
        &["mp3", "ogg", "flac", "wav", "wma", "m4a", "aac", "mid", "aif", "aiff"],
    ),
    (
        MediaType::Video,
        &["avi", "mpg", "mpeg", "mp4", "mkv", "mov", "wmv", "asf", "ogm", "webm"],
    ),
    (
        MediaType::Image,
        &["jpg", "jpeg", "png", "gif", "bmp", "tif", "tiff", "svg", "webp"],
    ),
    (
        MediaType::Document,
        &["txt", "pdf", "doc", "docx", "rtf", "html", "htm", "xml", "odt", "epub"],
    ),
    (
        MediaType::Program,
        &["exe", "msi", "zip", "rar", "7z", "gz", "tar", "dmg", "deb", "rpm", "jar"],
    ),
];

/// Lookup table from file extensions and schema names to [`MediaType`].
///
/// Panels take a registry at construction time instead of consulting a
/// process-wide table, which lets callers and tests supply their own mapping.
#[derive(Debug, Clone)]
pub struct MediaTypeRegistry {
    by_extension: HashMap<String, MediaType>,
}

impl MediaTypeRegistry {
    /// An empty registry that classifies everything as [`MediaType::Other`].
    #[must_use]
    pub fn empty() -> Self {
        Self {
            by_extension: HashMap::new(),
        }
    }

    /// Map `extension` (case-insensitive, leading dot optional) to `media`.
    pub fn register(&mut self, extension: &str, media: MediaType) {
        let key = extension.trim().trim_start_matches('.').to_ascii_lowercase();
        if !key.is_empty() {
            self.by_extension.insert(key, media);
        }
    }

    #[must_use]
    pub fn with_extension(mut self, extension: &str, media: MediaType) -> Self {
        self.register(extension, media);
        self
    }

    #[must_use]
    pub fn for_extension(&self, extension: &str) -> MediaType {
        self.by_extension
            .get(&extension.to_ascii_lowercase())
            .copied()
            .unwrap_or(MediaType::Other)
    }

    /// Resolve a metadata schema name such as `audio` to its media family.
    #[must_use]
    pub fn for_schema(&self, schema: &str) -> MediaType {
        let schema = schema.trim();
        MediaType::ALL
            .into_iter()
            .find(|media| media.schema().eq_ignore_ascii_case(schema))
            .unwrap_or(MediaType::Other)
    }
}

impl Default for MediaTypeRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for (media, extensions) in DEFAULT_EXTENSIONS {
            for extension in *extensions {
                registry.register(extension, *media);
            }
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_knows_common_extensions() {
        let registry = MediaTypeRegistry::default();
        assert_eq!(registry.for_extension("MP3"), MediaType::Audio);
        assert_eq!(registry.for_extension("mkv"), MediaType::Video);
        assert_eq!(registry.for_extension("unknown"), MediaType::Other);
    }

    #[test]
    fn custom_registrations_override_defaults() {
        let registry = MediaTypeRegistry::default().with_extension(".mp3", MediaType::Document);
        assert_eq!(registry.for_extension("mp3"), MediaType::Document);
        assert_eq!(MediaTypeRegistry::empty().for_extension("mp3"), MediaType::Other);
    }

    #[test]
    fn schemas_resolve_by_name() {
        let registry = MediaTypeRegistry::empty();
        assert_eq!(registry.for_schema("Audio"), MediaType::Audio);
        assert_eq!(registry.for_schema("application"), MediaType::Program);
        assert_eq!(registry.for_schema("weird"), MediaType::Other);
    }
}

use serde::{Deserialize, Serialize};

use super::{ContentHash, ResultDocument, SpeedClass};
use crate::error::ValidationError;

/// Star rating assigned to a result by the network layer.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    #[default]
    Poor,
    Fair,
    Good,
    Excellent,
}

/// Where a result came from.
///
/// Multicast and promoted results are treated as privileged when ordering by
/// source count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    #[default]
    Standard,
    /// Found on the local network through a multicast query.
    Multicast,
    /// Injected by a sponsored or third-party catalogue.
    Promoted,
}

/// One response to a search query, as reported by a single source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub file_name: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<ContentHash>,
    /// Advertised upload speed in kbit/s.
    #[serde(default)]
    pub speed: u32,
    #[serde(default)]
    pub measured_speed: bool,
    #[serde(default)]
    pub quality: Quality,
    #[serde(default)]
    pub kind: ResultKind,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub spam_score: f32,
    /// Creation time in seconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    /// Address of the host that answered, e.g. `10.0.0.4:6346`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<ResultDocument>,
}

impl SearchResult {
    /// Create a standard result with default attributes.
    #[must_use]
    pub fn new(file_name: impl Into<String>, size: u64) -> Self {
        Self {
            file_name: file_name.into(),
            size,
            hash: None,
            speed: 0,
            measured_speed: false,
            quality: Quality::Poor,
            kind: ResultKind::Standard,
            secure: false,
            vendor: String::new(),
            spam_score: 0.0,
            created_at: None,
            source: None,
            document: None,
        }
    }

    #[must_use]
    pub fn with_hash(mut self, hash: ContentHash) -> Self {
        self.hash = Some(hash);
        self
    }

    #[must_use]
    pub fn with_speed(mut self, speed: u32, measured: bool) -> Self {
        self.speed = speed;
        self.measured_speed = measured;
        self
    }

    #[must_use]
    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: ResultKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    #[must_use]
    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = vendor.into();
        self
    }

    #[must_use]
    pub fn with_spam_score(mut self, score: f32) -> Self {
        self.spam_score = score;
        self
    }

    #[must_use]
    pub fn with_created_at(mut self, epoch_secs: i64) -> Self {
        self.created_at = Some(epoch_secs);
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn with_document(mut self, document: ResultDocument) -> Self {
        self.document = Some(document);
        self
    }

    /// Text after the last `.` of the file name, or an empty string.
    #[must_use]
    pub fn extension(&self) -> &str {
        match self.file_name.rfind('.') {
            Some(index) => &self.file_name[index + 1..],
            None => "",
        }
    }

    /// File name with the extension and its dot removed.
    #[must_use]
    pub fn stem(&self) -> &str {
        match self.file_name.rfind('.') {
            Some(index) => &self.file_name[..index],
            None => &self.file_name,
        }
    }

    /// Creation time, ignoring the non-positive placeholder some hosts send.
    #[must_use]
    pub fn creation_time(&self) -> Option<i64> {
        self.created_at.filter(|secs| *secs > 0)
    }

    #[must_use]
    pub fn speed_class(&self) -> SpeedClass {
        SpeedClass::from_kbps(self.speed)
    }

    /// Check the fields a result panel relies on.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: an empty file name or a spam score
    /// that is not a finite value in `0.0..=1.0`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.file_name.trim().is_empty() {
            return Err(ValidationError::EmptyFileName);
        }
        if !self.spam_score.is_finite() || !(0.0..=1.0).contains(&self.spam_score) {
            return Err(ValidationError::InvalidSpamScore {
                name: self.file_name.clone(),
                score: self.spam_score,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_extension_at_last_dot() {
        let result = SearchResult::new("Some.Band - Track.MP3", 10);
        assert_eq!(result.extension(), "MP3");
        assert_eq!(result.stem(), "Some.Band - Track");

        let bare = SearchResult::new("README", 10);
        assert_eq!(bare.extension(), "");
        assert_eq!(bare.stem(), "README");
    }

    #[test]
    fn validation_rejects_blank_names_and_bad_scores() {
        assert_eq!(
            SearchResult::new("  ", 1).validate(),
            Err(ValidationError::EmptyFileName)
        );
        assert!(matches!(
            SearchResult::new("a.mp3", 1).with_spam_score(1.5).validate(),
            Err(ValidationError::InvalidSpamScore { .. })
        ));
        assert!(matches!(
            SearchResult::new("a.mp3", 1)
                .with_spam_score(f32::NAN)
                .validate(),
            Err(ValidationError::InvalidSpamScore { .. })
        ));
        assert!(SearchResult::new("a.mp3", 0).validate().is_ok());
    }

    #[test]
    fn placeholder_creation_times_are_ignored() {
        assert_eq!(SearchResult::new("a", 1).with_created_at(0).creation_time(), None);
        assert_eq!(
            SearchResult::new("a", 1).with_created_at(42).creation_time(),
            Some(42)
        );
    }

    #[test]
    fn deserializes_with_defaults() {
        let json = r#"{"file_name":"song.mp3","size":1234,"quality":"good","kind":"multicast"}"#;
        let result: SearchResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.file_name, "song.mp3");
        assert_eq!(result.quality, Quality::Good);
        assert_eq!(result.kind, ResultKind::Multicast);
        assert_eq!(result.hash, None);
        assert_eq!(result.spam_score, 0.0);
    }

    #[test]
    fn malformed_hashes_fail_deserialization() {
        let json = r#"{"file_name":"song.mp3","size":1,"hash":"ééééé0000000000000000000000000000"}"#;
        let err = serde_json::from_str::<SearchResult>(json).unwrap_err();
        assert!(err.to_string().contains("hash"));
    }
}

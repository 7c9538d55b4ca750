//! Provider-independent image record.

use serde::Serialize;

use crate::Error;

/// One image, normalized from any provider's schema.
///
/// The zero value (`Default`) marks an empty slot in merged output. Aspect
/// ratios are not sanitized: a zero height from a provider yields `NaN`/`inf`,
/// which serializes as JSON `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedImage {
    /// `"<provider>/<native id>"`, unique across providers.
    pub id: String,
    pub tags: String,
    #[serde(rename = "source")]
    pub source_name: String,
    pub source_url: String,
    pub artist: String,
    #[serde(rename = "aspect")]
    pub aspect_ratio: f32,
    pub preview_url: String,
    pub download_url: String,
}

impl NormalizedImage {
    /// Build the namespaced id for a provider-native id.
    pub fn namespaced_id(provider: &str, native_id: impl std::fmt::Display) -> String {
        format!("{provider}/{native_id}")
    }

    /// True for the zero value used to fill unplaced slots.
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }
}

/// Width over height, kept as-is even when height is zero.
pub fn aspect_ratio(width: f32, height: f32) -> f32 {
    width / height
}

/// Result of fetching exactly one native page from one provider.
pub type SearchOutcome = Result<Vec<NormalizedImage>, Error>;

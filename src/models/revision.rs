//! Revision model used by clients for change detection.

use serde::{Deserialize, Serialize};

/// Revision information, bumped on every successful write.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionInfo {
    pub revision_id: i64,
    pub generated_at: String,
}

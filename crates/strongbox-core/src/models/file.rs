use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata record for a file admitted through the scan gate.
///
/// A record is created exactly once, after the file's bytes passed a virus
/// scan and were durably written. Records are never mutated in place;
/// replacing a file means delete then re-upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StoredFile {
    pub id: Uuid,
    /// Generated storage name (`{uuid}.{ext}`), never derived from the
    /// caller-supplied filename
    pub stored_name: String,
    /// Sanitized caller-supplied filename, kept for display and download
    pub original_name: String,
    pub size: i64,
    pub content_type: String,
    pub owner_id: Uuid,
    /// Short summary of the scan verdict that admitted this file
    pub scan_summary: String,
    pub uploaded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_file_serializes_round_trip() {
        let record = StoredFile {
            id: Uuid::new_v4(),
            stored_name: format!("{}.pdf", Uuid::new_v4()),
            original_name: "report.pdf".to_string(),
            size: 1024,
            content_type: "application/pdf".to_string(),
            owner_id: Uuid::new_v4(),
            scan_summary: "clean".to_string(),
            uploaded_at: Utc::now(),
        };

        let json = serde_json::to_string(&record).unwrap();
        let parsed: StoredFile = serde_json::from_str(&json).unwrap();
        assert_eq!(record, parsed);
    }
}

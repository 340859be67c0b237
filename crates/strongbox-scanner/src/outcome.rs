use serde::{Deserialize, Serialize};

/// Structured result of one scan attempt.
///
/// If `completed` is false no definitive verdict was obtained and the payload
/// must be treated as unsafe; `clean` is meaningless in that case. If
/// `completed` is true and `clean` is false, `threat_name` names the
/// detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub completed: bool,
    pub clean: bool,
    pub threat_name: Option<String>,
    pub raw_response: String,
    pub error: Option<String>,
}

impl ScanOutcome {
    /// The daemon answered and reported the payload clean.
    pub fn clean(raw_response: impl Into<String>) -> Self {
        ScanOutcome {
            completed: true,
            clean: true,
            threat_name: None,
            raw_response: raw_response.into(),
            error: None,
        }
    }

    /// The daemon answered and named a threat.
    pub fn infected(threat_name: impl Into<String>, raw_response: impl Into<String>) -> Self {
        ScanOutcome {
            completed: true,
            clean: false,
            threat_name: Some(threat_name.into()),
            raw_response: raw_response.into(),
            error: None,
        }
    }

    /// The daemon answered but reported an error, or the reply could not be
    /// parsed. No verdict was obtained.
    pub fn scan_error(error: impl Into<String>, raw_response: impl Into<String>) -> Self {
        ScanOutcome {
            completed: false,
            clean: false,
            threat_name: None,
            raw_response: raw_response.into(),
            error: Some(error.into()),
        }
    }

    /// The daemon could not be reached at all (refusal, timeout, I/O error,
    /// cancellation). No reply exists.
    pub fn failed(error: impl Into<String>) -> Self {
        ScanOutcome {
            completed: false,
            clean: false,
            threat_name: None,
            raw_response: String::new(),
            error: Some(error.into()),
        }
    }

    /// No scan was attempted for this request. Unlike `failed`, there is no
    /// failure to describe, so `error` stays empty.
    pub fn skipped() -> Self {
        ScanOutcome {
            completed: false,
            clean: false,
            threat_name: None,
            raw_response: String::new(),
            error: None,
        }
    }

    /// True only for a completed scan with a clean verdict. This is the one
    /// check that may admit bytes to storage.
    pub fn is_safe(&self) -> bool {
        self.completed && self.clean
    }

    /// Short human-readable summary, suitable for audit records.
    pub fn summary(&self) -> String {
        if self.is_safe() {
            "clean".to_string()
        } else if let Some(ref threat) = self.threat_name {
            format!("threat detected: {}", threat)
        } else {
            format!(
                "scan failed: {}",
                self.error.as_deref().unwrap_or("not attempted")
            )
        }
    }
}

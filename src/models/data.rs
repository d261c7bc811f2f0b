use serde::{Deserialize, Serialize};
use std::fmt;

/// The unit of work for one submission: an identity document image and a
/// selfie, both as raw PNG/JPEG bytes. Owned by the caller and passed by
/// reference into the pipeline.
#[derive(Debug, Clone)]
pub struct ImagePair {
    pub document: Vec<u8>,
    pub selfie: Vec<u8>,
}

impl ImagePair {
    pub fn new(document: Vec<u8>, selfie: Vec<u8>) -> Self {
        ImagePair { document, selfie }
    }

    // Combined byte size of both images, used by the size penalty rule
    pub fn total_bytes(&self) -> usize {
        self.document.len() + self.selfie.len()
    }
}

/// Identity claim extracted from the document OCR text. Either field may be
/// absent; absence is a valid, expected outcome rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedClaim {
    pub name: Option<String>,
    pub date_of_birth: Option<String>,
}

impl ExtractedClaim {
    pub fn empty() -> Self {
        ExtractedClaim {
            name: None,
            date_of_birth: None,
        }
    }
}

/// The independently computed signals feeding the risk scorer. Every
/// populated scalar lies in [0, 1]; `None` means the signal could not be
/// evaluated, which the scorer treats as its own branch, never as zero.
#[derive(Debug, Clone)]
pub struct SignalBundle {
    pub ocr_text: String,
    pub face_confidence: Option<f64>,
    pub liveness_score: Option<f64>,
    pub blur_severity: Option<f64>,
    pub total_bytes: usize,
}

/// Tri-state suggestion returned with every decision. Non-binding: a human
/// reviewer finalizes the status outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Suggestion {
    Approved,
    Pending,
    Flagged,
}

impl Suggestion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Suggestion::Approved => "APPROVED",
            Suggestion::Pending => "PENDING",
            Suggestion::Flagged => "FLAGGED",
        }
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The full record returned to the caller for one submission. Handed to the
/// external storage layer as-is; never mutated by this crate after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub name: Option<String>,
    pub date_of_birth: Option<String>,
    pub ocr_text: String,
    pub face_confidence: Option<f64>,
    pub liveness_score: Option<f64>,
    pub blur_severity: Option<f64>,
    pub risk: f64,
    pub reasons: Vec<String>,
    pub suggestion: Suggestion,
}

impl DecisionRecord {
    // Flat rendering for single-column storage, e.g. "reason a; reason b"
    pub fn reasons_joined(&self) -> String {
        self.reasons.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_bytes() {
        let pair = ImagePair::new(vec![0u8; 3000], vec![0u8; 1500]);
        assert_eq!(pair.total_bytes(), 4500);
    }

    #[test]
    fn test_suggestion_labels() {
        assert_eq!(Suggestion::Approved.to_string(), "APPROVED");
        assert_eq!(Suggestion::Pending.to_string(), "PENDING");
        assert_eq!(Suggestion::Flagged.to_string(), "FLAGGED");

        // The workflow layer compares serialized labels, so serde must match
        let json = serde_json::to_string(&Suggestion::Flagged).unwrap();
        assert_eq!(json, "\"FLAGGED\"");
    }

    #[test]
    fn test_reasons_joined() {
        let record = DecisionRecord {
            name: Some("JOHN SMITH".to_string()),
            date_of_birth: None,
            ocr_text: String::new(),
            face_confidence: None,
            liveness_score: None,
            blur_severity: None,
            risk: 1.0,
            reasons: vec!["first".to_string(), "second".to_string()],
            suggestion: Suggestion::Flagged,
        };
        assert_eq!(record.reasons_joined(), "first; second");
    }
}

use crate::models::{SignalBundle, Suggestion};
use crate::utils::round3;

const MIN_OCR_CHARS: usize = 30;
const MIN_TOTAL_BYTES: usize = 5000;

const PENALTY_SHORT_OCR: f64 = 0.4;
const PENALTY_NO_FACE: f64 = 0.6;
const PENALTY_LOW_FACE: f64 = 0.6;
const PENALTY_MODERATE_FACE: f64 = 0.3;
const PENALTY_LOW_LIVENESS: f64 = 0.2;
const PENALTY_BLURRY: f64 = 0.2;
const PENALTY_TINY_IMAGES: f64 = 0.1;

const LOW_FACE_THRESHOLD: f64 = 0.45;
const GOOD_FACE_THRESHOLD: f64 = 0.6;
const LIVENESS_FLOOR: f64 = 0.5;
const BLUR_CEILING: f64 = 0.5;

const APPROVE_MIN_FACE: f64 = 0.65;
const APPROVE_MAX_RISK: f64 = 0.35;
const APPROVE_MIN_LIVENESS: f64 = 0.8;
const PENDING_MAX_RISK: f64 = 0.6;

/// Pure risk aggregation and suggestion gate. Stateless and idempotent:
/// identical signal bundles always produce identical results.
pub struct RiskScorer;

impl RiskScorer {
    /// Additive scoring over the signal bundle. Each applicable rule
    /// contributes an independent penalty and a human-readable reason, in a
    /// fixed evaluation order; the total is clamped to [0, 1]. Absent
    /// signals take their own branch and are never coerced to zero.
    pub fn compute(signals: &SignalBundle) -> (f64, Vec<String>) {
        let mut score = 0.0;
        let mut reasons = Vec::new();

        if signals.ocr_text.trim().chars().count() < MIN_OCR_CHARS {
            score += PENALTY_SHORT_OCR;
            reasons.push("OCR text too short / unclear".to_string());
        }

        match signals.face_confidence {
            None => {
                score += PENALTY_NO_FACE;
                reasons.push("Face not detected / match failed".to_string());
            }
            Some(confidence) if confidence < LOW_FACE_THRESHOLD => {
                score += PENALTY_LOW_FACE;
                reasons.push(format!("Low face match ({})", confidence));
            }
            Some(confidence) if confidence < GOOD_FACE_THRESHOLD => {
                score += PENALTY_MODERATE_FACE;
                reasons.push(format!("Moderate face match ({})", confidence));
            }
            Some(confidence) => {
                // A good match is still reported, so the record explains
                // itself even at zero risk
                reasons.push(format!("Good face match ({})", confidence));
            }
        }

        if signals.liveness_score.map_or(true, |l| l < LIVENESS_FLOOR) {
            score += PENALTY_LOW_LIVENESS;
            reasons.push("Low liveness score".to_string());
        }

        // Absent blur is deliberately not penalized, unlike absent liveness
        if signals.blur_severity.map_or(false, |b| b > BLUR_CEILING) {
            score += PENALTY_BLURRY;
            reasons.push("Image appears blurry".to_string());
        }

        if signals.total_bytes < MIN_TOTAL_BYTES {
            score += PENALTY_TINY_IMAGES;
            reasons.push("Images very small".to_string());
        }

        (round3(score.min(1.0)), reasons)
    }

    /// Conservative tri-state gate. An absent confidence or liveness can
    /// never satisfy the APPROVED comparisons, so degraded submissions fall
    /// through to the risk-based branches.
    pub fn suggest(risk: f64, face_confidence: Option<f64>, liveness: Option<f64>) -> Suggestion {
        let strong_match = face_confidence.map_or(false, |c| c >= APPROVE_MIN_FACE);
        let live = liveness.map_or(false, |l| l >= APPROVE_MIN_LIVENESS);
        if strong_match && risk < APPROVE_MAX_RISK && live {
            Suggestion::Approved
        } else if risk < PENDING_MAX_RISK {
            Suggestion::Pending
        } else {
            Suggestion::Flagged
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(
        ocr_text: &str,
        face_confidence: Option<f64>,
        liveness_score: Option<f64>,
        blur_severity: Option<f64>,
        total_bytes: usize,
    ) -> SignalBundle {
        SignalBundle {
            ocr_text: ocr_text.to_string(),
            face_confidence,
            liveness_score,
            blur_severity,
            total_bytes,
        }
    }

    fn long_text() -> String {
        "NAME: JOHN SMITH DOB: 01/02/1990 ISSUED BY EXAMPLE AUTHORITY".to_string()
    }

    #[test]
    fn test_short_ocr_penalty() {
        let (risk, reasons) = RiskScorer::compute(&signals(
            "short",
            Some(0.9),
            Some(1.0),
            Some(0.1),
            50_000,
        ));
        assert_eq!(risk, 0.4);
        assert!(reasons.contains(&"OCR text too short / unclear".to_string()));

        // Whitespace does not count toward the 30-character minimum
        let padded = format!("   {}   ", "a".repeat(29));
        let (risk, _) = RiskScorer::compute(&signals(&padded, Some(0.9), Some(1.0), None, 50_000));
        assert_eq!(risk, 0.4);
    }

    #[test]
    fn test_face_absent_penalty_is_exactly_point_six() {
        let (risk, reasons) =
            RiskScorer::compute(&signals(&long_text(), None, Some(1.0), Some(0.1), 50_000));
        assert_eq!(risk, 0.6);
        assert!(reasons.contains(&"Face not detected / match failed".to_string()));
    }

    #[test]
    fn test_face_confidence_bands() {
        let (risk, reasons) =
            RiskScorer::compute(&signals(&long_text(), Some(0.3), Some(1.0), None, 50_000));
        assert_eq!(risk, 0.6);
        assert!(reasons.contains(&"Low face match (0.3)".to_string()));

        // 0.45 is the bottom of the moderate band
        let (risk, reasons) =
            RiskScorer::compute(&signals(&long_text(), Some(0.45), Some(1.0), None, 50_000));
        assert_eq!(risk, 0.3);
        assert!(reasons.contains(&"Moderate face match (0.45)".to_string()));

        // 0.6 and above is good and contributes no penalty
        let (risk, reasons) =
            RiskScorer::compute(&signals(&long_text(), Some(0.6), Some(1.0), None, 50_000));
        assert_eq!(risk, 0.0);
        assert!(reasons.contains(&"Good face match (0.6)".to_string()));
    }

    #[test]
    fn test_good_match_reason_is_the_single_face_entry() {
        let (_, reasons) =
            RiskScorer::compute(&signals(&long_text(), Some(0.9), Some(1.0), Some(0.1), 50_000));
        let face_related = reasons
            .iter()
            .filter(|r| r.contains("face match") || r.contains("Face not detected"))
            .count();
        assert_eq!(face_related, 1);
        assert!(reasons.contains(&"Good face match (0.9)".to_string()));
    }

    #[test]
    fn test_liveness_absent_and_low_are_penalized_alike() {
        let (risk_absent, _) =
            RiskScorer::compute(&signals(&long_text(), Some(0.9), None, None, 50_000));
        let (risk_low, reasons) =
            RiskScorer::compute(&signals(&long_text(), Some(0.9), Some(0.4), None, 50_000));
        assert_eq!(risk_absent, 0.2);
        assert_eq!(risk_low, 0.2);
        assert!(reasons.contains(&"Low liveness score".to_string()));
    }

    #[test]
    fn test_blur_absent_is_not_penalized() {
        let (risk, _) = RiskScorer::compute(&signals(&long_text(), Some(0.9), Some(1.0), None, 50_000));
        assert_eq!(risk, 0.0);

        let (risk, reasons) =
            RiskScorer::compute(&signals(&long_text(), Some(0.9), Some(1.0), Some(0.6), 50_000));
        assert_eq!(risk, 0.2);
        assert!(reasons.contains(&"Image appears blurry".to_string()));
    }

    #[test]
    fn test_risk_is_clamped_to_one() {
        // All five penalties fire: 0.4 + 0.6 + 0.2 + 0.2 + 0.1 = 1.5
        let (risk, reasons) = RiskScorer::compute(&signals("", None, None, Some(0.9), 100));
        assert_eq!(risk, 1.0);
        assert_eq!(reasons.len(), 5);
    }

    #[test]
    fn test_reason_order_follows_rule_order() {
        let (_, reasons) = RiskScorer::compute(&signals("", None, None, Some(0.9), 100));
        assert_eq!(
            reasons,
            vec![
                "OCR text too short / unclear",
                "Face not detected / match failed",
                "Low liveness score",
                "Image appears blurry",
                "Images very small",
            ]
        );
    }

    #[test]
    fn test_scenario_everything_missing() {
        // 0.4 (OCR) + 0.6 (face) + 0.2 (liveness) + 0.1 (size) = 1.3, clamped
        let (risk, _) = RiskScorer::compute(&signals("", None, None, None, 0));
        assert_eq!(risk, 1.0);
        assert_eq!(RiskScorer::suggest(risk, None, None), Suggestion::Flagged);
    }

    #[test]
    fn test_scenario_clean_submission() {
        let (risk, reasons) =
            RiskScorer::compute(&signals(&long_text(), Some(0.9), Some(1.0), Some(0.1), 50_000));
        assert_eq!(risk, 0.0);
        assert_eq!(reasons, vec!["Good face match (0.9)"]);
        assert_eq!(
            RiskScorer::suggest(risk, Some(0.9), Some(1.0)),
            Suggestion::Approved
        );
    }

    #[test]
    fn test_scenario_moderate_match_is_pending() {
        let (risk, _) =
            RiskScorer::compute(&signals(&long_text(), Some(0.5), Some(0.9), Some(0.2), 50_000));
        assert_eq!(risk, 0.3);
        // Fails the APPROVED gate on confidence alone
        assert_eq!(
            RiskScorer::suggest(risk, Some(0.5), Some(0.9)),
            Suggestion::Pending
        );
    }

    #[test]
    fn test_approved_gate_requires_all_three_thresholds() {
        assert_eq!(
            RiskScorer::suggest(0.1, Some(0.65), Some(0.8)),
            Suggestion::Approved
        );
        assert_eq!(
            RiskScorer::suggest(0.1, Some(0.64), Some(0.8)),
            Suggestion::Pending
        );
        assert_eq!(
            RiskScorer::suggest(0.35, Some(0.9), Some(1.0)),
            Suggestion::Pending
        );
        assert_eq!(
            RiskScorer::suggest(0.1, Some(0.9), Some(0.79)),
            Suggestion::Pending
        );
    }

    #[test]
    fn test_absent_signals_never_approve() {
        assert_eq!(RiskScorer::suggest(0.0, None, Some(1.0)), Suggestion::Pending);
        assert_eq!(RiskScorer::suggest(0.0, Some(0.9), None), Suggestion::Pending);
    }

    #[test]
    fn test_flagged_at_risk_point_six() {
        assert_eq!(RiskScorer::suggest(0.6, Some(0.5), Some(0.5)), Suggestion::Flagged);
        assert_eq!(RiskScorer::suggest(0.59, Some(0.5), Some(0.5)), Suggestion::Pending);
    }
}

use crate::models::{DecisionRecord, ImagePair, SignalBundle};
use crate::processing::{
    resolve_confidence, ClaimParser, FaceMatcher, HistogramMatcher, OcrProcessor, QualityAnalyzer,
};
use crate::scoring::RiskScorer;
use log::info;

/// One-shot, stateless KYC decision pipeline. Each call to `process` runs
/// the stages in a fixed order over one submission and returns a complete
/// record; nothing is retained between invocations, so a single pipeline
/// can serve concurrent submissions.
pub struct KycPipeline {
    matchers: Vec<Box<dyn FaceMatcher>>,
    parser: ClaimParser,
    quality: QualityAnalyzer,
}

impl KycPipeline {
    /// Pipeline carrying only the always-available histogram matcher.
    pub fn new() -> Self {
        Self::with_matchers(vec![Box::new(HistogramMatcher::new())])
    }

    /// Pipeline with an explicit, ordered face-match chain. Callers detect
    /// the optional heavyweight backends once at process start and pass the
    /// strategies that are actually available, highest priority first; the
    /// chain is fixed for the lifetime of the pipeline.
    pub fn with_matchers(matchers: Vec<Box<dyn FaceMatcher>>) -> Self {
        KycPipeline {
            matchers,
            parser: ClaimParser::new(),
            quality: QualityAnalyzer::new(),
        }
    }

    /// Run the full decision pipeline over one submission. Never fails for
    /// business-logic reasons: every sub-extractor degrades to an absent
    /// signal and the scoring rules compensate, so a record always comes
    /// back. A non-empty caller-supplied name takes precedence over the
    /// OCR-derived one.
    pub fn process(&self, pair: &ImagePair, supplied_name: Option<&str>) -> DecisionRecord {
        // Step 1: extract document text
        let ocr_text = OcrProcessor::extract_text(&pair.document);

        // Step 2: parse the identity claim out of the text
        let claim = self.parser.parse(&ocr_text);

        // Step 3: face match through the prioritized fallback chain
        let face_confidence = resolve_confidence(&self.matchers, pair);

        // Step 4: selfie quality signals
        let liveness_score = self.quality.liveness_estimate(&pair.selfie);
        let blur_severity = self.quality.blur_severity(&pair.selfie);

        let signals = SignalBundle {
            ocr_text,
            face_confidence,
            liveness_score,
            blur_severity,
            total_bytes: pair.total_bytes(),
        };

        // Step 5: aggregate the signals and decide
        let (risk, reasons) = RiskScorer::compute(&signals);
        let suggestion = RiskScorer::suggest(risk, signals.face_confidence, signals.liveness_score);

        let name = supplied_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .or(claim.name);

        info!(
            "submission scored: risk={} suggestion={} reasons={}",
            risk,
            suggestion,
            reasons.len()
        );

        DecisionRecord {
            name,
            date_of_birth: claim.date_of_birth,
            ocr_text: signals.ocr_text,
            face_confidence: signals.face_confidence,
            liveness_score: signals.liveness_score,
            blur_severity: signals.blur_severity,
            risk,
            reasons,
            suggestion,
        }
    }
}

impl Default for KycPipeline {
    fn default() -> Self {
        Self::new()
    }
}

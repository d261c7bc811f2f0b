use crate::models::ImagePair;
use crate::processing::{FaceDetector, HeuristicFaceDetector, ImageOps};
use crate::utils::{round3, KycError};
use image::GrayImage;
use log::debug;

// Face crops are compared on a fixed canvas so histogram shape does not
// depend on the detected box size
const CROP_SIZE: u32 = 150;
const HISTOGRAM_BINS: usize = 256;
// Embedding distances around 0.6 and beyond are considered non-matches
const EMBEDDING_DISTANCE_SCALE: f64 = 0.6;

/// Produces fixed-size facial embeddings for distance-based comparison.
/// Backed by a heavyweight model; implementations are wired in at process
/// start by deployments that carry one.
pub trait FaceEncoder: Send + Sync {
    /// One embedding per detected face, in detection order. An empty result
    /// means no face was found in the image.
    fn encodings(&self, image_data: &[u8]) -> Result<Vec<Vec<f64>>, KycError>;
}

/// External face-verification routine returning a raw distance in [0, ~1+].
/// Expected to run in lenient detection mode, so a distance comes back even
/// for borderline crops.
pub trait FaceVerifier: Send + Sync {
    fn distance(&self, document: &[u8], selfie: &[u8]) -> Result<f64, KycError>;
}

/// One strategy in the prioritized match chain. The uniform contract is
/// "confidence in [0, 1] or no usable result"; a strategy never fabricates a
/// number and never propagates an internal failure.
pub trait FaceMatcher: Send + Sync {
    fn name(&self) -> &'static str;

    fn match_confidence(&self, pair: &ImagePair) -> Option<f64>;
}

/// Walk the ordered strategy chain; the first usable confidence wins. An
/// exhausted chain yields `None`, which the scorer treats as "no match
/// possible", never as zero.
pub fn resolve_confidence(matchers: &[Box<dyn FaceMatcher>], pair: &ImagePair) -> Option<f64> {
    for matcher in matchers {
        match matcher.match_confidence(pair) {
            Some(confidence) => {
                debug!("face matcher '{}' produced confidence {}", matcher.name(), confidence);
                return Some(confidence);
            }
            None => {
                debug!("face matcher '{}' had no usable result, trying next", matcher.name());
            }
        }
    }
    None
}

/// Distance between the first facial embedding of each image, mapped to a
/// confidence. Yields no result when either image has no detectable face or
/// the encoder fails internally.
pub struct EmbeddingMatcher {
    encoder: Box<dyn FaceEncoder>,
}

impl EmbeddingMatcher {
    pub fn new(encoder: Box<dyn FaceEncoder>) -> Self {
        EmbeddingMatcher { encoder }
    }
}

impl FaceMatcher for EmbeddingMatcher {
    fn name(&self) -> &'static str {
        "embedding"
    }

    fn match_confidence(&self, pair: &ImagePair) -> Option<f64> {
        let document = self.encoder.encodings(&pair.document).ok()?;
        let selfie = self.encoder.encodings(&pair.selfie).ok()?;
        let a = document.first()?;
        let b = selfie.first()?;
        if a.is_empty() || a.len() != b.len() {
            return None;
        }
        let distance = euclidean(a, b);
        Some(round3((1.0 - distance / EMBEDDING_DISTANCE_SCALE).max(0.0)))
    }
}

/// Delegates to an external verification routine and maps its distance to a
/// confidence. Any internal failure yields no result rather than
/// propagating.
pub struct VerificationMatcher {
    verifier: Box<dyn FaceVerifier>,
}

impl VerificationMatcher {
    pub fn new(verifier: Box<dyn FaceVerifier>) -> Self {
        VerificationMatcher { verifier }
    }
}

impl FaceMatcher for VerificationMatcher {
    fn name(&self) -> &'static str {
        "verification"
    }

    fn match_confidence(&self, pair: &ImagePair) -> Option<f64> {
        let distance = self.verifier.distance(&pair.document, &pair.selfie).ok()?;
        Some(round3((1.0 - distance).max(0.0)))
    }
}

/// Degraded but always-available fallback: the most confident face crop from
/// each image is resized to a fixed canvas and their normalized grayscale
/// intensity histograms are compared by correlation.
pub struct HistogramMatcher {
    detector: Box<dyn FaceDetector>,
}

impl HistogramMatcher {
    pub fn new() -> Self {
        HistogramMatcher {
            detector: Box::new(HeuristicFaceDetector::new()),
        }
    }

    pub fn with_detector(detector: Box<dyn FaceDetector>) -> Self {
        HistogramMatcher { detector }
    }

    // Most confident face crop, on the comparison canvas
    fn best_face_crop(&self, gray: &GrayImage) -> Option<GrayImage> {
        let region = self.detector.detect_faces(gray).into_iter().next()?;
        let cropped = ImageOps::crop(gray, region.x, region.y, region.width, region.height);
        Some(ImageOps::resize(&cropped, CROP_SIZE, CROP_SIZE))
    }
}

impl Default for HistogramMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FaceMatcher for HistogramMatcher {
    fn name(&self) -> &'static str {
        "histogram"
    }

    fn match_confidence(&self, pair: &ImagePair) -> Option<f64> {
        let document = ImageOps::load_grayscale(&pair.document).ok()?;
        let selfie = ImageOps::load_grayscale(&pair.selfie).ok()?;

        let document_face = self.best_face_crop(&document)?;
        let selfie_face = self.best_face_crop(&selfie)?;

        let h1 = intensity_histogram(&document_face);
        let h2 = intensity_histogram(&selfie_face);
        let correlation = histogram_correlation(&h1, &h2)?;
        Some(round3((correlation + 1.0) / 2.0))
    }
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

fn intensity_histogram(gray: &GrayImage) -> Vec<f64> {
    let mut histogram = vec![0.0; HISTOGRAM_BINS];
    for pixel in gray.pixels() {
        histogram[pixel.0[0] as usize] += 1.0;
    }
    histogram
}

// Pearson correlation coefficient between two histograms. Undefined when
// either histogram has zero variance across bins, in which case the matcher
// reports no usable result instead of a guess.
fn histogram_correlation(h1: &[f64], h2: &[f64]) -> Option<f64> {
    let n = h1.len() as f64;
    let mean1 = h1.iter().sum::<f64>() / n;
    let mean2 = h2.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut var1 = 0.0;
    let mut var2 = 0.0;
    for (a, b) in h1.iter().zip(h2.iter()) {
        let da = a - mean1;
        let db = b - mean2;
        covariance += da * db;
        var1 += da * da;
        var2 += db * db;
    }

    let denominator = (var1 * var2).sqrt();
    if denominator == 0.0 {
        return None;
    }
    Some(covariance / denominator)
}

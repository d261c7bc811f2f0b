use crate::processing::{FaceDetector, HeuristicFaceDetector, ImageOps};
use crate::utils::round3;
use image::{ImageBuffer, Luma};
use imageproc::filter::laplacian_filter;
use log::debug;

const LIVENESS_EYES_FOUND: f64 = 1.0;
const LIVENESS_NO_EYES: f64 = 0.6;
const LIVENESS_NO_FACE: f64 = 0.0;
// Laplacian variance around this value and above counts as fully sharp
const SHARPNESS_NORM: f64 = 200.0;

/// Selfie quality heuristics: a liveness estimate from face/eye detection
/// and a blur severity from the variance of the Laplacian response.
pub struct QualityAnalyzer {
    detector: Box<dyn FaceDetector>,
}

impl QualityAnalyzer {
    pub fn new() -> Self {
        QualityAnalyzer {
            detector: Box::new(HeuristicFaceDetector::new()),
        }
    }

    pub fn with_detector(detector: Box<dyn FaceDetector>) -> Self {
        QualityAnalyzer { detector }
    }

    /// Liveness estimate for a selfie. An unreadable image yields `None`
    /// ("could not evaluate"); a readable selfie with no detectable face
    /// yields 0.0 ("evaluated as non-live"). The two states are distinct and
    /// both stored as-is.
    pub fn liveness_estimate(&self, selfie: &[u8]) -> Option<f64> {
        let gray = ImageOps::load_grayscale(selfie).ok()?;
        let faces = self.detector.detect_faces(&gray);
        let face = match faces.first() {
            Some(face) => *face,
            None => {
                debug!("liveness: no face region in selfie");
                return Some(LIVENESS_NO_FACE);
            }
        };

        let roi = ImageOps::crop(&gray, face.x, face.y, face.width, face.height);
        let eyes = self.detector.detect_eyes(&roi);
        debug!("liveness: {} eye region(s) in face crop", eyes);
        Some(if eyes >= 1 {
            LIVENESS_EYES_FOUND
        } else {
            LIVENESS_NO_EYES
        })
    }

    /// Blur severity of a selfie: 0 = sharp, 1 = very blurry. `None` when
    /// the image cannot be read.
    pub fn blur_severity(&self, selfie: &[u8]) -> Option<f64> {
        let gray = ImageOps::load_grayscale(selfie).ok()?;
        let response = laplacian_filter(&gray);
        let sharpness = (pixel_variance(&response) / SHARPNESS_NORM).clamp(0.0, 1.0);
        Some(round3(1.0 - sharpness))
    }
}

impl Default for QualityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

// Variance of the filter response over all pixels, the classic
// focus-measure for blur estimation
fn pixel_variance(response: &ImageBuffer<Luma<i16>, Vec<i16>>) -> f64 {
    let count = response.pixels().len() as f64;
    if count == 0.0 {
        return 0.0;
    }
    let mut sum = 0.0;
    let mut sq_sum = 0.0;
    for pixel in response.pixels() {
        let v = pixel.0[0] as f64;
        sum += v;
        sq_sum += v * v;
    }
    let mean = sum / count;
    (sq_sum / count - mean * mean).max(0.0)
}

pub mod claims;
pub mod detect;
pub mod face;
pub mod image;
pub mod ocr;
pub mod quality;

pub use claims::ClaimParser;
pub use detect::{FaceDetector, FaceRegion, HeuristicFaceDetector};
pub use face::{
    resolve_confidence, EmbeddingMatcher, FaceEncoder, FaceMatcher, FaceVerifier,
    HistogramMatcher, VerificationMatcher,
};
pub use self::image::ImageOps;
pub use ocr::OcrProcessor;
pub use quality::QualityAnalyzer;

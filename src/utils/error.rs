use thiserror::Error;

#[derive(Debug, Error)]
pub enum KycError {
    #[error("Image decode error: {0}")]
    ImageDecodeError(String),
    #[error("OCR error: {0}")]
    OcrError(String),
    #[error("Face detection error: {0}")]
    DetectionError(String),
    #[error("Face encoding error: {0}")]
    EncodingError(String),
    #[error("Verification error: {0}")]
    VerificationError(String),
    #[error("IO error: {0}")]
    IoError(String),
}

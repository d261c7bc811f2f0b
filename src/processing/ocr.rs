use crate::utils::KycError;
use log::{debug, warn};
use std::io::Write;
use tempfile::NamedTempFile;
use tesseract::Tesseract;

pub struct OcrProcessor;

impl OcrProcessor {
    /// Best-effort text extraction from a document image. Extraction failure
    /// of any kind (undecodable image, engine unavailable) collapses to an
    /// empty string; downstream stages treat that as a valid low-information
    /// outcome, so this never raises past the stage boundary.
    pub fn extract_text(image_data: &[u8]) -> String {
        match Self::run_ocr(image_data) {
            Ok(text) => {
                debug!("OCR extracted {} characters", text.len());
                text
            }
            Err(e) => {
                warn!("OCR failed, treating document text as empty: {}", e);
                String::new()
            }
        }
    }

    // Tesseract reads from a file path, so the in-memory bytes go through a
    // temp file for the duration of the call
    fn run_ocr(image_data: &[u8]) -> Result<String, KycError> {
        let mut temp_file = NamedTempFile::new()
            .map_err(|e| KycError::OcrError(format!("Failed to create temp file: {}", e)))?;

        temp_file
            .write_all(image_data)
            .map_err(|e| KycError::OcrError(format!("Failed to write to temp file: {}", e)))?;

        let image_path_str = temp_file
            .path()
            .to_str()
            .ok_or_else(|| KycError::OcrError("Failed to convert path to string".to_string()))?;

        let text = Tesseract::new(None, Some("eng"))
            .map_err(|e| KycError::OcrError(format!("Tesseract init error: {}", e)))?
            .set_image(image_path_str)
            .map_err(|e| KycError::OcrError(format!("Tesseract set image error: {}", e)))?
            .get_text()
            .map_err(|e| KycError::OcrError(format!("Tesseract error: {}", e)))?;

        Ok(text)
    }
}

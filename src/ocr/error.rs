use thiserror::Error;

/// Failure of the external OCR engine.
#[derive(Debug, Error)]
pub enum OcrEngineError {
    #[error("Tesseract failed. Please check provided parameters")]
    TesseractFailed,

    #[error("Tesseract produced no output file at {0}")]
    MissingOutput(String),
}

impl OcrEngineError {
    pub const TESSERACT_FAILED: &'static str = "TESSERACT_FAILED";
    pub const MISSING_OUTPUT: &'static str = "MISSING_OUTPUT";

    /// Stable diagnostic code for the failure.
    pub fn code(&self) -> &'static str {
        match self {
            OcrEngineError::TesseractFailed => Self::TESSERACT_FAILED,
            OcrEngineError::MissingOutput(_) => Self::MISSING_OUTPUT,
        }
    }
}

/// Structural problems in hOCR input that cannot be skipped.
#[derive(Debug, Error)]
pub enum HocrError {
    #[error("invalid page id '{id}' in {file}")]
    InvalidPageNumber { id: String, file: String },
}

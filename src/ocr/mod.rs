pub mod error;
pub mod files;
pub mod hocr;
pub mod process;
pub mod tesseract;

pub use error::{HocrError, OcrEngineError};
pub use hocr::{parse_hocr_files, parse_hocr_str};
pub use tesseract::{TesseractConfig, TesseractEngine};

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::core::model::PageTextMap;

pub trait OcrEngine {
    /// Recognizes one image and returns its text units keyed by page.
    fn do_image_ocr(&self, image: &Path) -> Result<PageTextMap>;

    /// Recognizes the images in order and writes the plain text to `out`.
    fn create_txt(&self, images: &[PathBuf], out: &Path) -> Result<()>;
}

pub mod compose;
pub mod core;
pub mod export;
pub mod extract;
pub mod ocr;
pub mod pipeline;

pub use crate::compose::{CreatorConfig, OcrPage, PdfCompositor};
pub use crate::core::model::{PageTextMap, ScaleMode, TextInfo, TextPositioning};
pub use crate::extract::{text_from_layer, LayerExtractionStrategy};
pub use crate::pipeline::{create_pdf, verify_layer, VerificationReport};

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use lopdf::Document;
use serde::{Deserialize, Serialize};
use strsim::normalized_levenshtein;
use tracing::{error, info};
use unicode_normalization::UnicodeNormalization;

use crate::compose::{CreatorConfig, OcrPage, PdfCompositor};
use crate::core::model::PageTextMap;
use crate::export::{Exporter, JsonExporter, TextExporter};
use crate::extract::document_text_from_layer;
use crate::ocr::{OcrEngine, TesseractConfig};

/// Engine and document settings, loadable from a JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub tesseract: TesseractConfig,
    pub creator: CreatorConfig,
}

impl PipelineConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("Invalid config: {}", path.display()))
    }
}

/// Recognizes every image and composes the layered document. Each page the
/// engine reports becomes one PDF page over its image; an image with no
/// recognized text still gets an image-only page.
pub fn create_pdf(
    engine: &dyn OcrEngine,
    images: &[PathBuf],
    config: &CreatorConfig,
) -> Result<Document> {
    info!("Starting ocr for {} image(s)", images.len());

    let mut pages = Vec::new();
    for image in images {
        if !image.is_file() {
            error!(image = %image.display(), "image does not exist, skipping");
            continue;
        }
        let recognized = engine.do_image_ocr(image)?;
        if recognized.is_empty() {
            pages.push(OcrPage::new(image, Vec::new()));
        }
        for (_, units) in recognized.iter() {
            pages.push(OcrPage::new(image, units.to_vec()));
        }
    }

    PdfCompositor::new(config.clone()).compose(&pages)
}

pub fn save_pdf(doc: &mut Document, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    doc.compress();
    doc.save(path)
        .map_err(|e| anyhow!("Failed to write PDF {}: {e}", path.display()))?;
    Ok(())
}

pub fn load_pdf(path: &Path) -> Result<Document> {
    Document::load(path).map_err(|e| anyhow!("Failed to open PDF {}: {e}", path.display()))
}

/// Writes the JSON map plus per-page text files into `output`.
pub fn export_text_map(pages: &PageTextMap, output: &Path) -> Result<()> {
    let json_exporter = JsonExporter::new(output.to_path_buf());
    json_exporter.export(pages)?;

    let text_exporter = TextExporter::new(output.to_path_buf());
    text_exporter.export(pages)?;

    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationReport {
    pub layer: Option<String>,
    pub extracted: String,
    pub exact_match: bool,
    /// Normalized Levenshtein similarity in `0.0..=1.0`.
    pub similarity: f64,
}

/// Extracts `layer` from every page and compares it with `expected`.
pub fn verify_layer(doc: &Document, expected: &str, layer: Option<&str>) -> Result<VerificationReport> {
    let extracted = document_text_from_layer(doc, layer)?;
    let (actual, wanted) = (normalize(&extracted), normalize(expected));
    let similarity = if actual.is_empty() && wanted.is_empty() {
        1.0
    } else {
        normalized_levenshtein(&actual, &wanted)
    };
    Ok(VerificationReport {
        layer: layer.map(str::to_string),
        exact_match: actual == wanted,
        similarity,
        extracted,
    })
}

fn normalize(text: &str) -> String {
    let normalized = text.nfkc().collect::<String>();
    normalized.split_whitespace().collect::<Vec<_>>().join(" ")
}

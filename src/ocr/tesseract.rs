use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::model::{PageTextMap, TextPositioning};
use crate::ocr::error::OcrEngineError;
use crate::ocr::files::{delete_file, read_txt_file, temp_file_path, write_to_text_file};
use crate::ocr::hocr::parse_hocr_files;
use crate::ocr::process::run_command;
use crate::ocr::OcrEngine;

const DEFAULT_LANGUAGE: &str = "eng";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TesseractConfig {
    #[serde(default = "default_exec_path")]
    pub exec_path: PathBuf,
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    #[serde(default)]
    pub tess_data_dir: Option<PathBuf>,
    #[serde(default)]
    pub page_segmentation_mode: Option<u32>,
    #[serde(default)]
    pub text_positioning: TextPositioning,
}

fn default_exec_path() -> PathBuf {
    PathBuf::from("tesseract")
}

fn default_languages() -> Vec<String> {
    vec![DEFAULT_LANGUAGE.to_string()]
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            exec_path: default_exec_path(),
            languages: default_languages(),
            tess_data_dir: None,
            page_segmentation_mode: None,
            text_positioning: TextPositioning::default(),
        }
    }
}

/// Output flavour requested from the executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Hocr,
    Txt,
}

impl OutputFormat {
    fn config_name(&self) -> &'static str {
        match self {
            OutputFormat::Hocr => "hocr",
            OutputFormat::Txt => "txt",
        }
    }
}

/// Drives the `tesseract` command-line binary.
#[derive(Debug, Clone, Default)]
pub struct TesseractEngine {
    config: TesseractConfig,
}

impl TesseractEngine {
    pub fn new(config: TesseractConfig) -> Self {
        Self { config }
    }

    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        self.config.languages = languages;
        self
    }

    pub fn with_text_positioning(mut self, positioning: TextPositioning) -> Self {
        self.config.text_positioning = positioning;
        self
    }

    pub fn config(&self) -> &TesseractConfig {
        &self.config
    }

    fn language_arg(&self) -> String {
        let languages: Vec<&str> = self
            .config
            .languages
            .iter()
            .map(|lang| lang.trim())
            .filter(|lang| !lang.is_empty())
            .collect();
        if languages.is_empty() {
            DEFAULT_LANGUAGE.to_string()
        } else {
            languages.join("+")
        }
    }

    fn build_args(&self, image: &Path, output_base: &Path, format: OutputFormat) -> Vec<String> {
        let mut args = vec![
            image.display().to_string(),
            output_base.display().to_string(),
            "-l".to_string(),
            self.language_arg(),
        ];
        if let Some(dir) = &self.config.tess_data_dir {
            args.push("--tessdata-dir".to_string());
            args.push(dir.display().to_string());
        }
        if let Some(psm) = self.config.page_segmentation_mode {
            args.push("--psm".to_string());
            args.push(psm.to_string());
        }
        args.push(format.config_name().to_string());
        args
    }

    /// Runs the engine once; tesseract appends the extension to `output_base`.
    fn run(&self, image: &Path, format: OutputFormat) -> Result<PathBuf> {
        let output_base = temp_file_path("ocrlayer", "");
        let args = self.build_args(image, &output_base, format);
        run_command(&self.config.exec_path, &args)?;

        let output = output_base.with_extension(format.config_name());
        if !output.is_file() {
            return Err(OcrEngineError::MissingOutput(output.display().to_string()).into());
        }
        Ok(output)
    }
}

impl OcrEngine for TesseractEngine {
    fn do_image_ocr(&self, image: &Path) -> Result<PageTextMap> {
        let hocr = self
            .run(image, OutputFormat::Hocr)
            .with_context(|| format!("OCR failed for {}", image.display()))?;
        let pages = parse_hocr_files(std::slice::from_ref(&hocr), self.config.text_positioning);
        delete_file(&hocr);
        let pages = pages?;
        info!("Image {} contains {} page(s)", image.display(), pages.len());
        Ok(pages)
    }

    fn create_txt(&self, images: &[PathBuf], out: &Path) -> Result<()> {
        let mut content = String::new();
        for image in images {
            let txt = self
                .run(image, OutputFormat::Txt)
                .with_context(|| format!("OCR failed for {}", image.display()))?;
            if let Some(text) = read_txt_file(&txt) {
                content.push_str(&text);
            }
            delete_file(&txt);
        }
        write_to_text_file(out, &content);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builds_hocr_arguments() {
        let engine = TesseractEngine::new(TesseractConfig {
            tess_data_dir: Some(PathBuf::from("/data")),
            page_segmentation_mode: Some(3),
            ..TesseractConfig::default()
        })
        .with_languages(vec!["eng".into(), "deu".into()]);
        let args = engine.build_args(Path::new("scan.png"), Path::new("/tmp/out"), OutputFormat::Hocr);
        assert_eq!(
            args,
            vec![
                "scan.png", "/tmp/out", "-l", "eng+deu", "--tessdata-dir", "/data", "--psm", "3",
                "hocr"
            ]
        );
    }

    #[test]
    fn blank_language_list_falls_back_to_english() {
        let engine = TesseractEngine::default().with_languages(vec![" ".into()]);
        assert_eq!(engine.language_arg(), "eng");
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: TesseractConfig =
            serde_json::from_str(r#"{"languages": ["fra"], "text_positioning": "by_lines"}"#).unwrap();
        assert_eq!(config.exec_path, PathBuf::from("tesseract"));
        assert_eq!(config.languages, vec!["fra"]);
        assert_eq!(config.text_positioning, TextPositioning::ByLines);
    }

    #[test]
    fn missing_executable_fails_with_engine_code() {
        let engine = TesseractEngine::new(TesseractConfig {
            exec_path: PathBuf::from("/nonexistent/tesseract"),
            ..TesseractConfig::default()
        });
        let err = engine.do_image_ocr(Path::new("scan.png")).unwrap_err();
        let engine_err = err.downcast_ref::<OcrEngineError>().expect("engine error");
        assert_eq!(engine_err.code(), "TESSERACT_FAILED");
    }
}

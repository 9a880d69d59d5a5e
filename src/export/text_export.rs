use std::fs;
use std::path::PathBuf;

use anyhow::Result;

use crate::core::model::{PageTextMap, TextInfo};
use crate::export::Exporter;

#[derive(Debug, Clone)]
pub struct TextExporter {
    out_dir: PathBuf,
}

impl TextExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }

    fn format_page(units: &[TextInfo]) -> String {
        units
            .iter()
            .map(TextInfo::text)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Exporter for TextExporter {
    fn export(&self, pages: &PageTextMap) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;

        let mut full_text = String::new();
        for (page, units) in pages.iter() {
            let page_text = Self::format_page(units);
            full_text.push_str(&format!("=== Page {page} ===\n\n"));
            full_text.push_str(&page_text);
            full_text.push_str("\n\n");

            let page_path = self.out_dir.join(format!("page_{page:03}.txt"));
            fs::write(page_path, page_text)?;
        }

        fs::write(self.out_dir.join("document.txt"), full_text)?;
        Ok(())
    }
}

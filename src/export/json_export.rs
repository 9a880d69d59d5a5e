use std::fs;
use std::path::PathBuf;

use anyhow::Result;

use crate::core::model::PageTextMap;
use crate::export::Exporter;

pub const TEXT_MAP_FILE: &str = "text_map.json";

#[derive(Debug, Clone)]
pub struct JsonExporter {
    out_dir: PathBuf,
}

impl JsonExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }

    pub fn path(&self) -> PathBuf {
        self.out_dir.join(TEXT_MAP_FILE)
    }
}

impl Exporter for JsonExporter {
    fn export(&self, pages: &PageTextMap) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        let data = serde_json::to_string_pretty(pages)?;
        fs::write(self.path(), data)?;
        Ok(())
    }
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::core::geometry::BBox;

/// One recognized unit (a word or a line) and where the engine found it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextInfo {
    text: String,
    bbox: BBox,
}

impl TextInfo {
    pub fn new(text: impl Into<String>, bbox: BBox) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn bbox(&self) -> BBox {
        self.bbox
    }
}

/// Which hOCR classes are collected as text units.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TextPositioning {
    /// `ocr_line` followed by `ocr_caption`.
    ByLines,
    /// `ocrx_word`.
    #[default]
    ByWords,
}

impl TextPositioning {
    pub fn searched_classes(&self) -> &'static [&'static str] {
        match self {
            TextPositioning::ByLines => &["ocr_line", "ocr_caption"],
            TextPositioning::ByWords => &["ocrx_word"],
        }
    }
}

/// How a scanned image is fitted onto its PDF page.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    /// Page takes the image's own size.
    KeepOriginalSize,
    /// Page width is fixed, height follows the image aspect ratio.
    ScaleWidth,
    /// Page height is fixed, width follows the image aspect ratio.
    ScaleHeight,
    /// Page size is fixed, image scaled uniformly and centred.
    #[default]
    ScaleToFit,
}

/// Device colour as set by the fill-colour operators.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "space", rename_all = "lowercase")]
pub enum Color {
    Gray { value: f32 },
    Rgb { r: f32, g: f32, b: f32 },
    Cmyk { c: f32, m: f32, y: f32, k: f32 },
}

impl Default for Color {
    fn default() -> Self {
        Color::Gray { value: 0.0 }
    }
}

/// Page number → recognized units in document order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct PageTextMap {
    pages: BTreeMap<u32, Vec<TextInfo>>,
}

impl PageTextMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a page and returns the key it was stored under.
    ///
    /// A page number that is already taken is moved to one past the current
    /// largest key, so pages from several hOCR files never overwrite each
    /// other. The new key says nothing about physical page order. When no key
    /// past the largest is left the page is dropped and `None` is returned.
    pub fn insert_page(&mut self, page_number: u32, text: Vec<TextInfo>) -> Option<u32> {
        let key = if self.pages.contains_key(&page_number) {
            let Some(renumbered) = self.max_page().and_then(|max| max.checked_add(1)) else {
                error!(page_number, "duplicate page number and no free page number left, page dropped");
                return None;
            };
            warn!(page_number, renumbered, "duplicate page number, renumbering");
            renumbered
        } else {
            page_number
        };
        self.pages.insert(key, text);
        Some(key)
    }

    pub fn get(&self, page_number: u32) -> Option<&[TextInfo]> {
        self.pages.get(&page_number).map(Vec::as_slice)
    }

    pub fn max_page(&self) -> Option<u32> {
        self.pages.keys().next_back().copied()
    }

    pub fn page_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &[TextInfo])> {
        self.pages.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// All units of all pages joined with single spaces.
    pub fn text_content(&self) -> String {
        self.pages
            .values()
            .flatten()
            .map(|info| info.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

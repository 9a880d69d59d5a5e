use serde::Serialize;

use crate::core::geometry::{Matrix, Vector};
use crate::core::model::Color;

/// One level of marked content around a rendering operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasTag {
    pub role: String,
    /// `/Name` of the tag's property list, e.g. the optional-content group name.
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontInfo {
    pub resource_name: String,
    pub base_font: Option<String>,
    pub subtype: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TextRenderInfo {
    pub text: String,
    pub baseline_start: Vector,
    pub baseline_end: Vector,
    /// Width of a space glyph in user space.
    pub single_space_width: f32,
    pub font: FontInfo,
    pub font_size: f32,
    pub fill_color: Color,
    pub render_mode: i64,
    /// Innermost tag first.
    pub tag_hierarchy: Vec<CanvasTag>,
}

#[derive(Debug, Clone)]
pub struct ImageRenderInfo {
    pub resource_name: String,
    pub ctm: Matrix,
    pub width: i64,
    pub height: i64,
    /// Innermost tag first.
    pub tag_hierarchy: Vec<CanvasTag>,
}

#[derive(Debug, Clone)]
pub enum RenderEvent {
    Text(TextRenderInfo),
    Image(ImageRenderInfo),
}

impl RenderEvent {
    pub fn tag_hierarchy(&self) -> &[CanvasTag] {
        match self {
            RenderEvent::Text(info) => &info.tag_hierarchy,
            RenderEvent::Image(info) => &info.tag_hierarchy,
        }
    }

    /// Name of the nearest enclosing tag, if it declares one.
    pub fn tag_name(&self) -> Option<&str> {
        nearest_tag_name(self.tag_hierarchy())
    }
}

pub fn nearest_tag_name(tags: &[CanvasTag]) -> Option<&str> {
    tags.first().and_then(|tag| tag.name.as_deref())
}

/// Receives rendering events while a page's content is replayed.
pub trait EventListener {
    fn on_text(&mut self, info: &TextRenderInfo);

    fn on_image(&mut self, info: &ImageRenderInfo);

    fn on_event(&mut self, event: &RenderEvent) {
        match event {
            RenderEvent::Text(info) => self.on_text(info),
            RenderEvent::Image(info) => self.on_image(info),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: Option<&str>) -> CanvasTag {
        CanvasTag {
            role: "OC".to_string(),
            name: name.map(str::to_string),
        }
    }

    #[test]
    fn only_innermost_tag_counts() {
        assert_eq!(nearest_tag_name(&[tag(Some("Text Layer")), tag(Some("Outer"))]), Some("Text Layer"));
        assert_eq!(nearest_tag_name(&[tag(None), tag(Some("Outer"))]), None);
        assert_eq!(nearest_tag_name(&[]), None);
    }
}

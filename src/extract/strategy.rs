use crate::core::geometry::{Matrix, Rectangle};
use crate::core::model::Color;
use crate::extract::event::{nearest_tag_name, EventListener, FontInfo, ImageRenderInfo, TextRenderInfo};
use crate::extract::location::{BoundaryFn, LocationTextAccumulator, TextChunk};

/// Decides from the nearest tag name whether an event is kept.
pub type LayerFilter = Box<dyn Fn(Option<&str>) -> bool>;

/// Word boundary used for OCR text layers.
///
/// Degenerate chunks never merge with a neighbour. Otherwise the chunks are
/// joined only when the gap between them, less the mean of their space
/// widths, is not positive.
pub fn ocr_word_boundary(chunk: &TextChunk, previous: &TextChunk) -> bool {
    let (cur, prev) = (&chunk.location, &previous.location);
    if cur.is_degenerate() || prev.is_degenerate() {
        return true;
    }
    let gap = cur.dist_parallel_start() - prev.dist_parallel_end();
    gap - (cur.char_space_width() + prev.char_space_width()) / 2.0 > 0.0
}

/// Placement rectangle of an image drawn with `ctm`: origin plus scale.
pub fn image_rectangle(ctm: &Matrix) -> Rectangle {
    Rectangle::new(
        ctm.get(Matrix::I31),
        ctm.get(Matrix::I32),
        ctm.get(Matrix::I11),
        ctm.get(Matrix::I22),
    )
}

/// Accepts events whose nearest tag is named `layer`; `None` accepts only
/// untagged events.
pub fn layer_filter(layer: Option<&str>) -> LayerFilter {
    let layer = layer.map(str::to_string);
    Box::new(move |tag: Option<&str>| tag == layer.as_deref())
}

/// Collects the text, font, colour and image placement of a single layer.
pub struct LayerExtractionStrategy {
    accepts: LayerFilter,
    accumulator: LocationTextAccumulator,
    fill_color: Option<Color>,
    font: Option<FontInfo>,
    image_bbox: Option<Rectangle>,
}

impl LayerExtractionStrategy {
    pub fn new(layer: Option<&str>) -> Self {
        Self::with_parts(layer_filter(layer), ocr_word_boundary)
    }

    pub fn with_parts(accepts: LayerFilter, boundary: BoundaryFn) -> Self {
        Self {
            accepts,
            accumulator: LocationTextAccumulator::new(boundary),
            fill_color: None,
            font: None,
            image_bbox: None,
        }
    }

    pub fn fill_color(&self) -> Option<Color> {
        self.fill_color
    }

    pub fn font(&self) -> Option<&FontInfo> {
        self.font.as_ref()
    }

    pub fn image_bbox(&self) -> Option<Rectangle> {
        self.image_bbox
    }

    pub fn result_text(&self) -> String {
        self.accumulator.result_text()
    }
}

impl EventListener for LayerExtractionStrategy {
    fn on_text(&mut self, info: &TextRenderInfo) {
        if !(self.accepts)(nearest_tag_name(&info.tag_hierarchy)) {
            return;
        }
        self.fill_color = Some(info.fill_color);
        self.font = Some(info.font.clone());
        self.accumulator.add_render_info(info);
    }

    fn on_image(&mut self, info: &ImageRenderInfo) {
        if !(self.accepts)(nearest_tag_name(&info.tag_hierarchy)) {
            return;
        }
        self.image_bbox = Some(image_rectangle(&info.ctm));
    }
}

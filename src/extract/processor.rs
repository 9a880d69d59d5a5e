//! Replays a page's content stream and reports text and image rendering to an
//! [`EventListener`].

use std::rc::Rc;
use std::sync::LazyLock;

use anyhow::{anyhow, Result};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::debug;

use crate::core::geometry::{Matrix, Vector};
use crate::core::model::Color;
use crate::core::win_ansi;
use crate::extract::event::{
    CanvasTag, EventListener, FontInfo, ImageRenderInfo, RenderEvent, TextRenderInfo,
};

const MAX_FORM_DEPTH: usize = 8;
const COURIER_WIDTH: f32 = 600.0;
const FALLBACK_WIDTH: f32 = 500.0;

static EMPTY_RESOURCES: LazyLock<Dictionary> = LazyLock::new(Dictionary::new);

/// Runs `listener` over every text and image operation of a 1-based page.
pub fn process_page(
    doc: &Document,
    page_number: u32,
    listener: &mut dyn EventListener,
) -> Result<()> {
    let page_id = *doc
        .get_pages()
        .get(&page_number)
        .ok_or_else(|| anyhow!("page {page_number} not found"))?;
    let content = doc
        .get_page_content(page_id)
        .map_err(|e| anyhow!("failed to read content of page {page_number}: {e}"))?;
    let resources = page_resources(doc, page_id);

    let mut processor = ContentProcessor::new(doc, listener);
    processor.process_content(&content, resources, 0)
}

fn page_resources(doc: &Document, page_id: ObjectId) -> &Dictionary {
    let mut node = doc.get_object(page_id).ok().and_then(as_dict);
    while let Some(dict) = node {
        if let Some(resources) = dict_entry(doc, dict, b"Resources").and_then(as_dict) {
            return resources;
        }
        node = match dict.get(b"Parent") {
            Ok(Object::Reference(parent)) => doc.get_object(*parent).ok().and_then(as_dict),
            _ => None,
        };
    }
    &EMPTY_RESOURCES
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        other => other,
    }
}

fn dict_entry<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    dict.get(key).ok().map(|obj| resolve(doc, obj))
}

fn as_dict(obj: &Object) -> Option<&Dictionary> {
    match obj {
        Object::Dictionary(dict) => Some(dict),
        Object::Stream(stream) => Some(&stream.dict),
        _ => None,
    }
}

fn as_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

fn as_name(obj: &Object) -> Option<&[u8]> {
    match obj {
        Object::Name(name) => Some(name),
        _ => None,
    }
}

fn name_string(obj: &Object) -> Option<String> {
    as_name(obj).map(|name| String::from_utf8_lossy(name).into_owned())
}

/// Decodes a PDF text string: UTF-16BE with BOM, else UTF-8, else Latin-1.
pub fn decode_pdf_text(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn text_value(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict_entry(doc, dict, key)? {
        Object::String(bytes, _) => Some(decode_pdf_text(bytes)),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

fn matrix_from(operands: &[Object]) -> Matrix {
    let n = |i: usize| operands.get(i).and_then(as_number).unwrap_or(0.0);
    Matrix::new(n(0), n(1), n(2), n(3), n(4), n(5))
}

#[derive(Debug)]
struct LoadedFont {
    info: FontInfo,
    first_char: i64,
    widths: Vec<f32>,
    missing_width: f32,
    win_ansi: bool,
}

impl LoadedFont {
    fn fallback(resource_name: &str) -> Self {
        Self {
            info: FontInfo {
                resource_name: resource_name.to_string(),
                base_font: None,
                subtype: None,
            },
            first_char: 0,
            widths: Vec::new(),
            missing_width: FALLBACK_WIDTH,
            win_ansi: false,
        }
    }

    fn load(doc: &Document, resource_name: &str, dict: &Dictionary) -> Self {
        let base_font = dict_entry(doc, dict, b"BaseFont").and_then(name_string);
        let subtype = dict_entry(doc, dict, b"Subtype").and_then(name_string);
        let win_ansi = dict_entry(doc, dict, b"Encoding")
            .and_then(name_string)
            .is_some_and(|encoding| encoding == "WinAnsiEncoding");
        let first_char = dict_entry(doc, dict, b"FirstChar")
            .and_then(as_number)
            .unwrap_or(0.0) as i64;
        let widths: Vec<f32> = match dict_entry(doc, dict, b"Widths") {
            Some(Object::Array(items)) => items
                .iter()
                .map(|w| as_number(resolve(doc, w)).unwrap_or(0.0))
                .collect(),
            _ => Vec::new(),
        };
        let declared_missing = dict_entry(doc, dict, b"FontDescriptor")
            .and_then(as_dict)
            .and_then(|descriptor| dict_entry(doc, descriptor, b"MissingWidth"))
            .and_then(as_number);
        let missing_width = match declared_missing {
            Some(width) => width,
            None if !widths.is_empty() => 0.0,
            None if base_font.as_deref().is_some_and(|f| f.starts_with("Courier")) => COURIER_WIDTH,
            None => FALLBACK_WIDTH,
        };

        Self {
            info: FontInfo {
                resource_name: resource_name.to_string(),
                base_font,
                subtype,
            },
            first_char,
            widths,
            missing_width,
            win_ansi,
        }
    }

    fn glyph_width(&self, code: u8) -> f32 {
        let idx = i64::from(code) - self.first_char;
        usize::try_from(idx)
            .ok()
            .and_then(|idx| self.widths.get(idx).copied())
            .unwrap_or(self.missing_width)
    }

    fn decode(&self, bytes: &[u8]) -> String {
        if self.win_ansi {
            bytes.iter().map(|&b| win_ansi::decode_byte(b)).collect()
        } else {
            bytes.iter().map(|&b| char::from(b)).collect()
        }
    }

    fn space_width(&self) -> f32 {
        let width = self.glyph_width(b' ');
        if width > 0.0 {
            width
        } else {
            self.missing_width
        }
    }
}

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    fill_color: Color,
    font: Option<Rc<LoadedFont>>,
    font_size: f32,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scaling: f32,
    leading: f32,
    rise: f32,
    render_mode: i64,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::identity(),
            fill_color: Color::default(),
            font: None,
            font_size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scaling: 1.0,
            leading: 0.0,
            rise: 0.0,
            render_mode: 0,
        }
    }
}

struct ContentProcessor<'a, 'l> {
    doc: &'a Document,
    listener: &'l mut dyn EventListener,
    gs: GraphicsState,
    saved: Vec<GraphicsState>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    tags: Vec<CanvasTag>,
}

impl<'a, 'l> ContentProcessor<'a, 'l> {
    fn new(doc: &'a Document, listener: &'l mut dyn EventListener) -> Self {
        Self {
            doc,
            listener,
            gs: GraphicsState::default(),
            saved: Vec::new(),
            text_matrix: Matrix::identity(),
            line_matrix: Matrix::identity(),
            tags: Vec::new(),
        }
    }

    fn process_content(&mut self, bytes: &[u8], resources: &'a Dictionary, depth: usize) -> Result<()> {
        let content =
            Content::decode(bytes).map_err(|e| anyhow!("failed to decode content stream: {e}"))?;
        for op in &content.operations {
            self.apply(op, resources, depth)?;
        }
        Ok(())
    }

    fn apply(&mut self, op: &Operation, resources: &'a Dictionary, depth: usize) -> Result<()> {
        let operands = op.operands.as_slice();
        let num = |i: usize| operands.get(i).and_then(as_number).unwrap_or(0.0);

        match op.operator.as_str() {
            "q" => self.saved.push(self.gs.clone()),
            "Q" => {
                if let Some(gs) = self.saved.pop() {
                    self.gs = gs;
                }
            }
            "cm" => self.gs.ctm = matrix_from(operands).multiply(&self.gs.ctm),
            "BT" => {
                self.text_matrix = Matrix::identity();
                self.line_matrix = Matrix::identity();
            }
            "ET" => {}
            "Tf" => {
                let name = operands.first().and_then(as_name).unwrap_or_default();
                self.gs.font = Some(Rc::new(self.load_font(resources, name)));
                self.gs.font_size = num(1);
            }
            "Tc" => self.gs.char_spacing = num(0),
            "Tw" => self.gs.word_spacing = num(0),
            "Tz" => self.gs.horizontal_scaling = num(0) / 100.0,
            "TL" => self.gs.leading = num(0),
            "Ts" => self.gs.rise = num(0),
            "Tr" => self.gs.render_mode = num(0) as i64,
            "Td" => self.move_text(num(0), num(1)),
            "TD" => {
                self.gs.leading = -num(1);
                self.move_text(num(0), num(1));
            }
            "Tm" => {
                self.line_matrix = matrix_from(operands);
                self.text_matrix = self.line_matrix;
            }
            "T*" => self.next_line(),
            "Tj" => self.show_operand(operands.first()),
            "'" => {
                self.next_line();
                self.show_operand(operands.first());
            }
            "\"" => {
                self.gs.word_spacing = num(0);
                self.gs.char_spacing = num(1);
                self.next_line();
                self.show_operand(operands.get(2));
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    for item in items {
                        match item {
                            Object::String(bytes, _) => self.show_text(bytes),
                            other => {
                                if let Some(adjust) = as_number(other) {
                                    let tx = -adjust / 1000.0
                                        * self.gs.font_size
                                        * self.gs.horizontal_scaling;
                                    self.advance(tx);
                                }
                            }
                        }
                    }
                }
            }
            "g" => self.gs.fill_color = Color::Gray { value: num(0) },
            "rg" => {
                self.gs.fill_color = Color::Rgb {
                    r: num(0),
                    g: num(1),
                    b: num(2),
                }
            }
            "k" => {
                self.gs.fill_color = Color::Cmyk {
                    c: num(0),
                    m: num(1),
                    y: num(2),
                    k: num(3),
                }
            }
            "sc" | "scn" => {
                let comps: Vec<f32> = operands.iter().filter_map(as_number).collect();
                match comps.as_slice() {
                    [value] => self.gs.fill_color = Color::Gray { value: *value },
                    [r, g, b] => self.gs.fill_color = Color::Rgb { r: *r, g: *g, b: *b },
                    [c, m, y, k] => {
                        self.gs.fill_color = Color::Cmyk {
                            c: *c,
                            m: *m,
                            y: *y,
                            k: *k,
                        }
                    }
                    _ => {}
                }
            }
            "BMC" => self.begin_tag(operands.first(), None),
            "BDC" => {
                let name = self.property_list_name(resources, operands.get(1));
                self.begin_tag(operands.first(), name);
            }
            "EMC" => {
                self.tags.pop();
            }
            "Do" => {
                if let Some(name) = operands.first().and_then(as_name) {
                    self.draw_xobject(name, resources, depth)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn load_font(&self, resources: &Dictionary, name: &[u8]) -> LoadedFont {
        let resource_name = String::from_utf8_lossy(name).into_owned();
        dict_entry(self.doc, resources, b"Font")
            .and_then(as_dict)
            .and_then(|fonts| dict_entry(self.doc, fonts, name))
            .and_then(as_dict)
            .map(|dict| LoadedFont::load(self.doc, &resource_name, dict))
            .unwrap_or_else(|| {
                debug!(font = %resource_name, "font resource missing, using fallback metrics");
                LoadedFont::fallback(&resource_name)
            })
    }

    fn property_list_name(&self, resources: &Dictionary, operand: Option<&Object>) -> Option<String> {
        let doc = self.doc;
        let properties = match operand? {
            Object::Dictionary(dict) => dict,
            Object::Name(name) => dict_entry(doc, resources, b"Properties")
                .and_then(as_dict)
                .and_then(|props| dict_entry(doc, props, name))
                .and_then(as_dict)?,
            _ => return None,
        };
        text_value(doc, properties, b"Name")
    }

    fn begin_tag(&mut self, role: Option<&Object>, name: Option<String>) {
        let role = role.and_then(name_string).unwrap_or_default();
        self.tags.push(CanvasTag { role, name });
    }

    fn tag_hierarchy(&self) -> Vec<CanvasTag> {
        self.tags.iter().rev().cloned().collect()
    }

    fn move_text(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translation(tx, ty).multiply(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.move_text(0.0, -self.gs.leading);
    }

    fn advance(&mut self, tx: f32) {
        self.text_matrix = Matrix::translation(tx, 0.0).multiply(&self.text_matrix);
    }

    fn show_operand(&mut self, operand: Option<&Object>) {
        if let Some(Object::String(bytes, _)) = operand {
            self.show_text(bytes);
        }
    }

    fn show_text(&mut self, bytes: &[u8]) {
        let font = self
            .gs
            .font
            .clone()
            .unwrap_or_else(|| Rc::new(LoadedFont::fallback("")));
        let gs = &self.gs;
        let size = gs.font_size;
        let scaling = gs.horizontal_scaling;

        let width: f32 = bytes
            .iter()
            .map(|&code| {
                let word_spacing = if code == b' ' { gs.word_spacing } else { 0.0 };
                (font.glyph_width(code) / 1000.0 * size + gs.char_spacing + word_spacing) * scaling
            })
            .sum();

        let rendering = self.text_matrix.multiply(&gs.ctm);
        let baseline_start = Vector::point(0.0, gs.rise).cross_matrix(&rendering);
        let baseline_end = Vector::point(width, gs.rise).cross_matrix(&rendering);
        let space = (font.space_width() / 1000.0 * size + gs.char_spacing + gs.word_spacing) * scaling;
        let single_space_width = Vector::new(space, 0.0, 0.0).cross_matrix(&rendering).length();

        let info = TextRenderInfo {
            text: font.decode(bytes),
            baseline_start,
            baseline_end,
            single_space_width,
            font: font.info.clone(),
            font_size: size,
            fill_color: gs.fill_color,
            render_mode: gs.render_mode,
            tag_hierarchy: self.tag_hierarchy(),
        };
        self.listener.on_event(&RenderEvent::Text(info));
        self.advance(width);
    }

    fn draw_xobject(&mut self, name: &[u8], resources: &'a Dictionary, depth: usize) -> Result<()> {
        let doc = self.doc;
        let Some(stream) = dict_entry(doc, resources, b"XObject")
            .and_then(as_dict)
            .and_then(|xobjects| dict_entry(doc, xobjects, name))
            .and_then(|obj| obj.as_stream().ok())
        else {
            debug!(xobject = %String::from_utf8_lossy(name), "xobject not found");
            return Ok(());
        };

        let subtype = dict_entry(doc, &stream.dict, b"Subtype").and_then(name_string);
        match subtype.as_deref() {
            Some("Image") => {
                let dimension = |key: &[u8]| {
                    dict_entry(doc, &stream.dict, key)
                        .and_then(as_number)
                        .unwrap_or(0.0) as i64
                };
                let info = ImageRenderInfo {
                    resource_name: String::from_utf8_lossy(name).into_owned(),
                    ctm: self.gs.ctm,
                    width: dimension(b"Width"),
                    height: dimension(b"Height"),
                    tag_hierarchy: self.tag_hierarchy(),
                };
                self.listener.on_event(&RenderEvent::Image(info));
            }
            Some("Form") => {
                if depth >= MAX_FORM_DEPTH {
                    debug!(depth, "form xobject nesting too deep, skipped");
                    return Ok(());
                }
                let form_matrix = match dict_entry(doc, &stream.dict, b"Matrix") {
                    Some(Object::Array(values)) => matrix_from(values),
                    _ => Matrix::identity(),
                };
                let form_resources = dict_entry(doc, &stream.dict, b"Resources")
                    .and_then(as_dict)
                    .unwrap_or(resources);
                let bytes = if stream.dict.get(b"Filter").is_ok() {
                    stream
                        .decompressed_content()
                        .map_err(|e| anyhow!("failed to decompress form xobject: {e}"))?
                } else {
                    stream.content.clone()
                };

                // A form cannot leave marked content or text state behind in
                // its caller, balanced or not.
                let tags = self.tags.clone();
                let (text_matrix, line_matrix) = (self.text_matrix, self.line_matrix);
                self.saved.push(self.gs.clone());
                self.gs.ctm = form_matrix.multiply(&self.gs.ctm);
                let result = self.process_content(&bytes, form_resources, depth + 1);
                if let Some(gs) = self.saved.pop() {
                    self.gs = gs;
                }
                self.tags = tags;
                self.text_matrix = text_matrix;
                self.line_matrix = line_matrix;
                result?;
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Collector {
        texts: Vec<TextRenderInfo>,
        images: Vec<ImageRenderInfo>,
    }

    impl EventListener for Collector {
        fn on_text(&mut self, info: &TextRenderInfo) {
            self.texts.push(info.clone());
        }

        fn on_image(&mut self, info: &ImageRenderInfo) {
            self.images.push(info.clone());
        }
    }

    fn single_page(content: &[u8]) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let ocg_id = doc.add_object(dictionary! {
            "Type" => "OCG",
            "Name" => Object::string_literal("Text Layer"),
        });
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 2,
                "Height" => 2,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            vec![0u8; 12],
        ));
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::from(page_id)],
                "Count" => 1,
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                    "XObject" => dictionary! { "Im0" => image_id },
                    "Properties" => dictionary! { "L1" => ocg_id },
                },
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    #[test]
    fn courier_run_spans_its_advance_width() {
        let doc = single_page(b"BT /F1 10 Tf 72 700 Td (Hello) Tj ET");
        let mut collector = Collector::default();
        process_page(&doc, 1, &mut collector).unwrap();

        let info = &collector.texts[0];
        assert_eq!(info.text, "Hello");
        assert_eq!((info.baseline_start.x, info.baseline_start.y), (72.0, 700.0));
        assert_eq!(info.baseline_end.x, 102.0);
        assert_eq!(info.single_space_width, 6.0);
        assert_eq!(info.font.base_font.as_deref(), Some("Courier"));
    }

    #[test]
    fn horizontal_scaling_shrinks_the_run() {
        let doc = single_page(b"BT /F1 10 Tf 50 Tz 1 0 0 1 0 0 Tm (ab) Tj (c) Tj ET");
        let mut collector = Collector::default();
        process_page(&doc, 1, &mut collector).unwrap();
        assert_eq!(collector.texts[0].baseline_end.x, 6.0);
        assert_eq!(collector.texts[1].baseline_start.x, 6.0);
        assert_eq!(collector.texts[1].single_space_width, 3.0);
    }

    #[test]
    fn marked_content_names_come_from_properties() {
        let doc = single_page(
            b"/OC /L1 BDC BT /F1 10 Tf 0.5 g (in) Tj ET EMC BT /F1 10 Tf (out) Tj ET",
        );
        let mut collector = Collector::default();
        process_page(&doc, 1, &mut collector).unwrap();
        assert_eq!(collector.texts[0].tag_hierarchy[0].name.as_deref(), Some("Text Layer"));
        assert_eq!(collector.texts[0].tag_hierarchy[0].role, "OC");
        assert_eq!(collector.texts[0].fill_color, Color::Gray { value: 0.5 });
        assert!(collector.texts[1].tag_hierarchy.is_empty());
    }

    #[test]
    fn image_event_carries_ctm() {
        let doc = single_page(b"q 200 0 0 150 100 300 cm /Im0 Do Q");
        let mut collector = Collector::default();
        process_page(&doc, 1, &mut collector).unwrap();
        assert_eq!(collector.images.len(), 1);
        let ctm = collector.images[0].ctm;
        assert_eq!(ctm.get(Matrix::I31), 100.0);
        assert_eq!(ctm.get(Matrix::I32), 300.0);
        assert_eq!(ctm.get(Matrix::I11), 200.0);
        assert_eq!(ctm.get(Matrix::I22), 150.0);
        assert_eq!(collector.images[0].width, 2);
    }

    /// Page whose resources hold `F1`, the `L1` layer and a form `FM1`
    /// translated 100 units along x.
    fn page_with_form(form: &[u8], content: &[u8]) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let ocg_id = doc.add_object(dictionary! {
            "Type" => "OCG",
            "Name" => Object::string_literal("Text Layer"),
        });
        let form_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "Matrix" => vec![1.into(), 0.into(), 0.into(), 1.into(), 100.into(), 0.into()],
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
            },
            form.to_vec(),
        ));
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
                "XObject" => dictionary! { "FM1" => form_id },
                "Properties" => dictionary! { "L1" => ocg_id },
            },
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::from(page_id)],
                "Count" => 1i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    #[test]
    fn form_xobject_text_is_transformed_by_form_matrix() {
        let doc = page_with_form(b"BT /F1 10 Tf 0 50 Td (form) Tj ET", b"q /FM1 Do Q");

        let mut collector = Collector::default();
        process_page(&doc, 1, &mut collector).unwrap();
        assert_eq!(collector.texts.len(), 1);
        assert_eq!(collector.texts[0].text, "form");
        assert_eq!(
            (collector.texts[0].baseline_start.x, collector.texts[0].baseline_start.y),
            (100.0, 50.0)
        );
    }

    #[test]
    fn unbalanced_form_does_not_leak_into_caller() {
        let doc = page_with_form(
            b"EMC EMC BT /F1 10 Tf 0 50 Td (form) Tj ET",
            b"/OC /L1 BDC BT /F1 10 Tf 20 700 Td /FM1 Do (after) Tj ET EMC",
        );

        let mut collector = Collector::default();
        process_page(&doc, 1, &mut collector).unwrap();
        assert_eq!(collector.texts.len(), 2);
        assert!(collector.texts[0].tag_hierarchy.is_empty());

        let after = &collector.texts[1];
        assert_eq!(after.text, "after");
        assert_eq!(after.tag_hierarchy[0].name.as_deref(), Some("Text Layer"));
        assert_eq!((after.baseline_start.x, after.baseline_start.y), (20.0, 700.0));
    }

    #[test]
    fn missing_page_is_an_error() {
        let doc = single_page(b"");
        let mut collector = Collector::default();
        assert!(process_page(&doc, 2, &mut collector).is_err());
    }

    #[test]
    fn utf16_text_strings_decode() {
        assert_eq!(decode_pdf_text(&[0xFE, 0xFF, 0x00, 0x41, 0x04, 0x14]), "AД");
        assert_eq!(decode_pdf_text(b"Image Layer"), "Image Layer");
    }
}

//! Builds the layered PDF: each page carries the scanned image in one
//! optional-content group and invisible, positioned OCR text in another.

pub mod font;
pub mod placement;

pub use placement::{place_image, ImagePlacement, PageSize};

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use image::{ImageReader, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::core::geometry::BBox;
use crate::core::model::{Color, ScaleMode, TextInfo};

pub const DEFAULT_IMAGE_LAYER: &str = "Image Layer";
pub const DEFAULT_TEXT_LAYER: &str = "Text Layer";
pub const DEFAULT_LANG: &str = "en-US";

const IMAGE_RESOURCE: &str = "Im0";
const IMAGE_LAYER_RESOURCE: &str = "L0";
const TEXT_LAYER_RESOURCE: &str = "L1";
/// Text render mode 3: neither fill nor stroke.
const INVISIBLE: i64 = 3;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CreatorConfig {
    pub image_layer_name: String,
    pub text_layer_name: String,
    pub scale_mode: ScaleMode,
    pub page_size: PageSize,
    pub text_color: Color,
    pub title: String,
    pub lang: String,
}

impl Default for CreatorConfig {
    fn default() -> Self {
        Self {
            image_layer_name: DEFAULT_IMAGE_LAYER.to_string(),
            text_layer_name: DEFAULT_TEXT_LAYER.to_string(),
            scale_mode: ScaleMode::default(),
            page_size: PageSize::default(),
            text_color: Color::default(),
            title: String::new(),
            lang: DEFAULT_LANG.to_string(),
        }
    }
}

impl CreatorConfig {
    pub fn with_layer_names(
        mut self,
        image_layer: impl Into<String>,
        text_layer: impl Into<String>,
    ) -> Self {
        self.image_layer_name = image_layer.into();
        self.text_layer_name = text_layer.into();
        self
    }

    pub fn with_scale_mode(mut self, scale_mode: ScaleMode) -> Self {
        self.scale_mode = scale_mode;
        self
    }

    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_text_color(mut self, color: Color) -> Self {
        self.text_color = color;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }
}

/// One output page: the scanned image and the text recognized on it.
#[derive(Debug, Clone)]
pub struct OcrPage {
    pub image: PathBuf,
    pub text: Vec<TextInfo>,
}

impl OcrPage {
    pub fn new(image: impl Into<PathBuf>, text: Vec<TextInfo>) -> Self {
        Self {
            image: image.into(),
            text,
        }
    }
}

struct LayerIds {
    image: ObjectId,
    text: ObjectId,
}

pub struct PdfCompositor {
    config: CreatorConfig,
}

impl PdfCompositor {
    pub fn new(config: CreatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CreatorConfig {
        &self.config
    }

    pub fn compose(&self, pages: &[OcrPage]) -> Result<Document> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(font::font_dictionary());
        let layers = LayerIds {
            image: doc.add_object(dictionary! {
                "Type" => "OCG",
                "Name" => text_string(&self.config.image_layer_name),
            }),
            text: doc.add_object(dictionary! {
                "Type" => "OCG",
                "Name" => text_string(&self.config.text_layer_name),
            }),
        };

        let mut kids = Vec::new();
        for page in pages {
            let image = match load_rgb(&page.image) {
                Ok(image) => image,
                Err(e) => {
                    error!(image = %page.image.display(), "skipping unreadable image: {e:#}");
                    continue;
                }
            };
            let page_id = self
                .add_page(&mut doc, pages_id, font_id, &layers, image, &page.text)
                .with_context(|| format!("failed to compose page for {}", page.image.display()))?;
            kids.push(Object::Reference(page_id));
        }
        if kids.is_empty() {
            bail!("no readable images to compose");
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let layer_refs = || {
            vec![
                Object::Reference(layers.image),
                Object::Reference(layers.text),
            ]
        };
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
            "Lang" => text_string(&self.config.lang),
            "OCProperties" => dictionary! {
                "OCGs" => layer_refs(),
                "D" => dictionary! {
                    "Order" => layer_refs(),
                    "ON" => layer_refs(),
                },
            },
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => text_string(&self.config.title),
            "Producer" => text_string(concat!("ocrlayer ", env!("CARGO_PKG_VERSION"))),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        debug!(pages = count, "composed layered document");
        Ok(doc)
    }

    fn add_page(
        &self,
        doc: &mut Document,
        pages_id: ObjectId,
        font_id: ObjectId,
        layers: &LayerIds,
        image: RgbImage,
        text: &[TextInfo],
    ) -> Result<ObjectId> {
        let placement = place_image(
            image.width(),
            image.height(),
            self.config.scale_mode,
            self.config.page_size,
        )?;

        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(image.width()),
                "Height" => i64::from(image.height()),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            image.into_raw(),
        ));

        let mut operations = image_layer_operations(&placement);
        operations.extend(self.text_layer_operations(&placement, text));
        let content = Content { operations }
            .encode()
            .map_err(|e| anyhow::anyhow!("failed to encode page content: {e}"))?;
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                real(0.0),
                real(0.0),
                real(placement.page.width),
                real(placement.page.height),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { font::FONT_RESOURCE => font_id },
                "XObject" => dictionary! { IMAGE_RESOURCE => image_id },
                "Properties" => dictionary! {
                    IMAGE_LAYER_RESOURCE => layers.image,
                    TEXT_LAYER_RESOURCE => layers.text,
                },
            },
        });
        Ok(page_id)
    }

    fn text_layer_operations(&self, placement: &ImagePlacement, text: &[TextInfo]) -> Vec<Operation> {
        let mut ops = vec![
            Operation::new("BDC", vec!["OC".into(), TEXT_LAYER_RESOURCE.into()]),
            Operation::new("BT", vec![]),
            Operation::new("Tr", vec![INVISIBLE.into()]),
            color_operation(&self.config.text_color),
        ];
        let units: Vec<&TextInfo> = text
            .iter()
            .filter(|unit| {
                let drawable = !font::encode_text(unit.text()).is_empty() && unit.bbox().height() > 0.0;
                if !drawable {
                    debug!(text = unit.text(), "skipping text unit without extent");
                }
                drawable
            })
            .collect();

        for line in visual_lines(&units) {
            // Lowest bottom edge of the line, in pixels.
            let bottom = line.iter().map(|unit| unit.bbox().y1).fold(f32::MIN, f32::max);
            let baseline = placement.rect.y + (placement.pixel_height - bottom) * placement.scale_y();

            for (i, unit) in line.iter().enumerate() {
                let rect = placement.to_user_space(&unit.bbox());
                let mut bytes = font::encode_text(unit.text());
                let font_size = rect.height;
                let scaling = font::horizontal_scaling(bytes.len(), font_size, rect.width);
                // The space past the box separates the unit from its right
                // neighbour however narrow the gap between the boxes is.
                if i + 1 < line.len() {
                    bytes.push(b' ');
                }
                ops.push(Operation::new(
                    "Tf",
                    vec![font::FONT_RESOURCE.into(), real(font_size)],
                ));
                ops.push(Operation::new("Tz", vec![real(scaling)]));
                ops.push(Operation::new(
                    "Tm",
                    vec![
                        1.into(),
                        0.into(),
                        0.into(),
                        1.into(),
                        real(rect.x),
                        real(baseline),
                    ],
                ));
                ops.push(Operation::new("Tj", vec![Object::string_literal(bytes)]));
            }
        }
        ops.push(Operation::new("ET", vec![]));
        ops.push(Operation::new("EMC", vec![]));
        ops
    }
}

/// Splits units, in recognition order, into runs that sit on one visual
/// line: each unit joins the current run when it shares at least half of the
/// smaller height with the run's vertical extent.
fn visual_lines<'t>(units: &[&'t TextInfo]) -> Vec<Vec<&'t TextInfo>> {
    let mut lines: Vec<Vec<&TextInfo>> = Vec::new();
    let mut extent: Option<BBox> = None;
    for &unit in units {
        let bbox = unit.bbox();
        match extent {
            Some(run) if shares_line(&run, &bbox) => {
                if let Some(line) = lines.last_mut() {
                    line.push(unit);
                }
                extent = Some(run.union(&bbox));
            }
            _ => {
                lines.push(vec![unit]);
                extent = Some(bbox);
            }
        }
    }
    lines
}

fn shares_line(run: &BBox, bbox: &BBox) -> bool {
    let overlap = run.y1.min(bbox.y1) - run.y0.max(bbox.y0);
    overlap > 0.0 && overlap * 2.0 >= run.height().min(bbox.height())
}

fn image_layer_operations(placement: &ImagePlacement) -> Vec<Operation> {
    let rect = placement.rect;
    vec![
        Operation::new("BDC", vec!["OC".into(), IMAGE_LAYER_RESOURCE.into()]),
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                real(rect.width),
                0.into(),
                0.into(),
                real(rect.height),
                real(rect.x),
                real(rect.y),
            ],
        ),
        Operation::new("Do", vec![IMAGE_RESOURCE.into()]),
        Operation::new("Q", vec![]),
        Operation::new("EMC", vec![]),
    ]
}

fn color_operation(color: &Color) -> Operation {
    match *color {
        Color::Gray { value } => Operation::new("g", vec![real(value)]),
        Color::Rgb { r, g, b } => Operation::new("rg", vec![real(r), real(g), real(b)]),
        Color::Cmyk { c, m, y, k } => {
            Operation::new("k", vec![real(c), real(m), real(y), real(k)])
        }
    }
}

fn load_rgb(path: &Path) -> Result<RgbImage> {
    let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    Ok(image.to_rgb8())
}

fn real(value: f32) -> Object {
    Object::Real(value.into())
}

/// PDF text string: literal when ASCII, UTF-16BE with byte-order mark otherwise.
pub fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{document_layers, text_from_layer, LayerInfo};
    use crate::extract::processor::decode_pdf_text;
    use pretty_assertions::assert_eq;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_png(width: u32, height: u32) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "ocrlayer_compose_{}_{}.png",
            std::process::id(),
            nanos
        ));
        RgbImage::from_pixel(width, height, image::Rgb([255, 255, 255]))
            .save(&path)
            .expect("write png");
        path
    }

    fn hello_world_page(image: &Path) -> OcrPage {
        OcrPage::new(
            image,
            vec![
                TextInfo::new("Hello", BBox::new(10.0, 10.0, 60.0, 30.0)),
                TextInfo::new("World", BBox::new(80.0, 10.0, 130.0, 30.0)),
            ],
        )
    }

    #[test]
    fn text_layer_round_trips() {
        let image = temp_png(200, 100);
        let doc = PdfCompositor::new(CreatorConfig::default())
            .compose(&[hello_world_page(&image)])
            .unwrap();
        let _ = std::fs::remove_file(&image);

        assert_eq!(text_from_layer(&doc, 1, Some(DEFAULT_TEXT_LAYER)).unwrap(), "Hello World");
        assert_eq!(text_from_layer(&doc, 1, Some(DEFAULT_IMAGE_LAYER)).unwrap(), "");
        assert_eq!(text_from_layer(&doc, 1, None).unwrap(), "");
    }

    fn compose_words(words: &[(&str, [f32; 4])]) -> Document {
        let image = temp_png(200, 100);
        let text = words
            .iter()
            .map(|(word, b)| TextInfo::new(*word, BBox::new(b[0], b[1], b[2], b[3])))
            .collect();
        let doc = PdfCompositor::new(CreatorConfig::default())
            .compose(&[OcrPage::new(&image, text)])
            .unwrap();
        let _ = std::fs::remove_file(&image);
        doc
    }

    #[test]
    fn descenders_stay_on_the_line() {
        let doc = compose_words(&[("Hello", [10.0, 10.0, 60.0, 30.0]), ("gym", [80.0, 12.0, 120.0, 34.0])]);
        assert_eq!(text_from_layer(&doc, 1, Some(DEFAULT_TEXT_LAYER)).unwrap(), "Hello gym");
    }

    #[test]
    fn gaps_narrower_than_a_glyph_still_separate_words() {
        let doc = compose_words(&[("The", [10.0, 10.0, 55.0, 40.0]), ("quick", [65.0, 10.0, 140.0, 40.0])]);
        assert_eq!(text_from_layer(&doc, 1, Some(DEFAULT_TEXT_LAYER)).unwrap(), "The quick");

        let doc = compose_words(&[
            ("a", [10.0, 10.0, 18.0, 30.0]),
            ("tight", [19.0, 10.0, 60.0, 30.0]),
            ("fit", [61.0, 8.0, 80.0, 30.0]),
        ]);
        assert_eq!(text_from_layer(&doc, 1, Some(DEFAULT_TEXT_LAYER)).unwrap(), "a tight fit");
    }

    #[test]
    fn separate_lines_keep_their_order() {
        let doc = compose_words(&[
            ("one", [10.0, 10.0, 40.0, 30.0]),
            ("two", [44.0, 12.0, 74.0, 32.0]),
            ("three", [10.0, 50.0, 60.0, 72.0]),
        ]);
        assert_eq!(text_from_layer(&doc, 1, Some(DEFAULT_TEXT_LAYER)).unwrap(), "one two\nthree");
    }

    #[test]
    fn units_group_into_visual_lines() {
        let units = [
            TextInfo::new("The", BBox::new(10.0, 10.0, 40.0, 30.0)),
            TextInfo::new("quick", BBox::new(44.0, 14.0, 84.0, 36.0)),
            TextInfo::new("jumps", BBox::new(10.0, 50.0, 58.0, 72.0)),
            TextInfo::new("over", BBox::new(62.0, 56.0, 92.0, 70.0)),
        ];
        let refs: Vec<&TextInfo> = units.iter().collect();
        let texts: Vec<Vec<&str>> = visual_lines(&refs)
            .iter()
            .map(|line| line.iter().map(|unit| unit.text()).collect())
            .collect();
        assert_eq!(texts, vec![vec!["The", "quick"], vec!["jumps", "over"]]);
    }

    #[test]
    fn layers_are_declared_in_order_and_on() {
        let image = temp_png(40, 40);
        let config = CreatorConfig::default().with_layer_names("Scan", "Texte reconnu");
        let doc = PdfCompositor::new(config).compose(&[hello_world_page(&image)]).unwrap();
        let _ = std::fs::remove_file(&image);

        assert_eq!(
            document_layers(&doc),
            vec![
                LayerInfo { name: "Scan".to_string(), on: true },
                LayerInfo { name: "Texte reconnu".to_string(), on: true },
            ]
        );
    }

    #[test]
    fn unreadable_images_are_skipped() {
        let image = temp_png(40, 40);
        let missing = std::env::temp_dir().join("ocrlayer_compose_missing.png");
        let doc = PdfCompositor::new(CreatorConfig::default())
            .compose(&[OcrPage::new(&missing, Vec::new()), OcrPage::new(&image, Vec::new())])
            .unwrap();
        let _ = std::fs::remove_file(&image);
        assert_eq!(doc.get_pages().len(), 1);

        let err = PdfCompositor::new(CreatorConfig::default())
            .compose(&[OcrPage::new(&missing, Vec::new())])
            .unwrap_err();
        assert!(err.to_string().contains("no readable images"));
    }

    #[test]
    fn non_ascii_strings_use_utf16() {
        match text_string("Übersicht") {
            Object::String(bytes, StringFormat::Hexadecimal) => {
                assert_eq!(&bytes[..2], &[0xFE, 0xFF]);
                assert_eq!(decode_pdf_text(&bytes), "Übersicht");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}

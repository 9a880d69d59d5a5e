pub mod event;
pub mod location;
pub mod processor;
pub mod strategy;

pub use event::{CanvasTag, EventListener, FontInfo, ImageRenderInfo, RenderEvent, TextRenderInfo};
pub use location::{LocationTextAccumulator, TextChunk, TextChunkLocation};
pub use processor::process_page;
pub use strategy::{layer_filter, ocr_word_boundary, LayerExtractionStrategy};

use anyhow::Result;
use lopdf::{Dictionary, Document, Object, ObjectId};

use processor::decode_pdf_text;

/// Text of one page restricted to the layer named `layer` (`None`: untagged
/// content only).
pub fn text_from_layer(doc: &Document, page_number: u32, layer: Option<&str>) -> Result<String> {
    let mut strategy = LayerExtractionStrategy::new(layer);
    process_page(doc, page_number, &mut strategy)?;
    Ok(strategy.result_text())
}

/// Layer text of every page, pages separated by a newline.
pub fn document_text_from_layer(doc: &Document, layer: Option<&str>) -> Result<String> {
    let pages = doc
        .get_pages()
        .into_keys()
        .map(|page| text_from_layer(doc, page, layer))
        .collect::<Result<Vec<_>>>()?;
    Ok(pages.join("\n"))
}

/// A declared optional-content group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerInfo {
    pub name: String,
    pub on: bool,
}

/// Optional-content groups in `/OCProperties /OCGs` order with their default
/// visibility.
pub fn document_layers(doc: &Document) -> Vec<LayerInfo> {
    let deref = |obj: &Object| -> Option<Object> {
        match obj {
            Object::Reference(id) => doc.get_object(*id).ok().cloned(),
            other => Some(other.clone()),
        }
    };
    let dict_of = |obj: Option<Object>| -> Option<Dictionary> {
        match obj? {
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    };
    let array_of = |obj: Option<Object>| -> Vec<Object> {
        match obj {
            Some(Object::Array(items)) => items,
            _ => Vec::new(),
        }
    };

    let catalog = dict_of(doc.trailer.get(b"Root").ok().and_then(deref));
    let Some(properties) =
        dict_of(catalog.and_then(|c| c.get(b"OCProperties").ok().and_then(deref)))
    else {
        return Vec::new();
    };

    let ocgs = array_of(properties.get(b"OCGs").ok().and_then(deref));
    let off: Vec<ObjectId> = dict_of(properties.get(b"D").ok().and_then(deref))
        .map(|d| array_of(d.get(b"OFF").ok().and_then(deref)))
        .unwrap_or_default()
        .iter()
        .filter_map(|obj| obj.as_reference().ok())
        .collect();

    ocgs.iter()
        .filter_map(|ocg| {
            let dict = dict_of(deref(ocg))?;
            let name = match dict.get(b"Name").ok()? {
                Object::String(bytes, _) => decode_pdf_text(bytes),
                _ => return None,
            };
            let hidden = ocg.as_reference().is_ok_and(|id| off.contains(&id));
            Some(LayerInfo { name, on: !hidden })
        })
        .collect()
}

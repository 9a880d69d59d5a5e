use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{anyhow, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, error};

use crate::core::geometry::BBox;
use crate::core::model::{PageTextMap, TextInfo, TextPositioning};
use crate::ocr::error::HocrError;

const PAGE_CLASS: &str = "ocr_page";
const PAGE_ID_PREFIX: &str = "page_";

static BBOX_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bbbox\s+(\d+)\s+(\d+)\s+(\d+)\s+(\d+)\s*(?:;|$)").expect("bbox pattern is valid")
});

/// Parses hOCR files in the given order into a single page map.
///
/// Missing or unreadable files are logged and skipped. A page whose id does not
/// end in a number aborts the whole parse.
pub fn parse_hocr_files(files: &[PathBuf], positioning: TextPositioning) -> Result<PageTextMap> {
    let mut pages = PageTextMap::new();
    for file in files {
        let Some(content) = read_hocr(file) else {
            continue;
        };
        parse_hocr_into(&content, &file.display().to_string(), positioning, &mut pages)?;
    }
    Ok(pages)
}

/// Parses one hOCR document held in memory.
pub fn parse_hocr_str(content: &str, positioning: TextPositioning) -> Result<PageTextMap> {
    let mut pages = PageTextMap::new();
    parse_hocr_into(content, "<memory>", positioning, &mut pages)?;
    Ok(pages)
}

fn read_hocr(path: &Path) -> Option<String> {
    if !path.is_file() {
        error!("Cannot read input file {}: not found", path.display());
        return None;
    }
    let mut content = String::new();
    let read = File::open(path).and_then(|file| BufReader::new(file).read_to_string(&mut content));
    match read {
        Ok(_) => Some(content),
        Err(err) => {
            error!("Cannot read input file {}: {err}", path.display());
            None
        }
    }
}

fn parse_hocr_into(
    content: &str,
    source: &str,
    positioning: TextPositioning,
    pages: &mut PageTextMap,
) -> Result<()> {
    let document = Html::parse_document(content);
    let page_selector = class_selector(PAGE_CLASS)?;
    let unit_selectors = positioning
        .searched_classes()
        .iter()
        .map(|class| class_selector(class))
        .collect::<Result<Vec<_>>>()?;

    for page in document.select(&page_selector) {
        let page_number = page_number(page, source)?;
        let text_data: Vec<TextInfo> = unit_selectors
            .iter()
            .flat_map(|selector| page.select(selector))
            .filter_map(text_info)
            .collect();

        if text_data.is_empty() {
            debug!(page_number, source, "page has no text units, omitted");
            continue;
        }
        pages.insert_page(page_number, text_data);
    }
    Ok(())
}

fn class_selector(class: &str) -> Result<Selector> {
    Selector::parse(&format!(".{class}")).map_err(|err| anyhow!("bad selector for {class}: {err}"))
}

fn page_number(page: ElementRef<'_>, source: &str) -> Result<u32, HocrError> {
    let id = page.value().id().unwrap_or_default();
    id.rsplit(PAGE_ID_PREFIX)
        .next()
        .and_then(|suffix| suffix.parse().ok())
        .ok_or_else(|| HocrError::InvalidPageNumber {
            id: id.to_string(),
            file: source.to_string(),
        })
}

fn text_info(element: ElementRef<'_>) -> Option<TextInfo> {
    let title = element.value().attr("title")?;
    let bbox = parse_bbox(title)?;
    let text = element.text().collect::<String>();
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    Some(TextInfo::new(text, bbox))
}

/// Reads the `bbox x1 y1 x2 y2` token out of an hOCR `title` attribute.
pub fn parse_bbox(title: &str) -> Option<BBox> {
    let caps = BBOX_PATTERN.captures(title)?;
    let mut coords = [0.0f32; 4];
    for (i, coord) in coords.iter_mut().enumerate() {
        *coord = caps.get(i + 1)?.as_str().parse().ok()?;
    }
    Some(BBox::from_array(coords))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TWO_WORDS: &str = r#"<html><body>
<div class='ocr_page' id='page_1' title='image "scan.png"; bbox 0 0 200 100; ppageno 0'>
  <div class='ocr_carea' id='block_1_1' title="bbox 10 10 110 30">
    <p class='ocr_par' id='par_1_1'>
      <span class='ocr_line' id='line_1_1' title="bbox 10 10 110 30; baseline 0 -3; x_size 20">
        <span class='ocrx_word' id='word_1_1' title='bbox 10 10 50 30; x_wconf 95'>Hello</span>
        <span class='ocrx_word' id='word_1_2' title='bbox 60 10 110 30; x_wconf 93'>World</span>
      </span>
    </p>
  </div>
</div>
</body></html>"#;

    fn texts(map: &PageTextMap, page: u32) -> Vec<String> {
        map.get(page)
            .unwrap_or_default()
            .iter()
            .map(|info| info.text().to_string())
            .collect()
    }

    #[test]
    fn parses_words_with_boxes() {
        let map = parse_hocr_str(TWO_WORDS, TextPositioning::ByWords).unwrap();
        assert_eq!(map.len(), 1);
        let page = map.get(1).unwrap();
        assert_eq!(page[0], TextInfo::new("Hello", BBox::new(10.0, 10.0, 50.0, 30.0)));
        assert_eq!(page[1], TextInfo::new("World", BBox::new(60.0, 10.0, 110.0, 30.0)));
    }

    #[test]
    fn lines_and_words_carry_the_same_text() {
        let words = parse_hocr_str(TWO_WORDS, TextPositioning::ByWords).unwrap();
        let lines = parse_hocr_str(TWO_WORDS, TextPositioning::ByLines).unwrap();
        assert_eq!(words.text_content(), lines.text_content());
        assert_eq!(texts(&lines, 1), vec!["Hello World"]);

        let word_boxes = words.get(1).unwrap();
        let union = word_boxes[0].bbox().union(&word_boxes[1].bbox());
        assert_eq!(lines.get(1).unwrap()[0].bbox(), union);
    }

    #[test]
    fn captions_follow_lines() {
        let hocr = r#"<div class='ocr_page' id='page_3'>
            <span class='ocr_caption' title='bbox 0 0 10 10'>Figure</span>
            <span class='ocr_line' title='bbox 0 20 10 30'>Body</span>
        </div>"#;
        let map = parse_hocr_str(hocr, TextPositioning::ByLines).unwrap();
        assert_eq!(texts(&map, 3), vec!["Body", "Figure"]);
    }

    #[test]
    fn nodes_without_bbox_are_skipped() {
        let hocr = r#"<div class='ocr_page' id='page_1'>
            <span class='ocrx_word' title='x_wconf 90'>nobox</span>
            <span class='ocrx_word' title='bbox 1 2 3'>short</span>
            <span class='ocrx_word' title='bbox 1 2 3 4 5; x_wconf 90'>long</span>
            <span class='ocrx_word' title='bbox 1 2 3 4'>kept</span>
        </div>"#;
        let map = parse_hocr_str(hocr, TextPositioning::ByWords).unwrap();
        assert_eq!(texts(&map, 1), vec!["kept"]);
    }

    #[test]
    fn pages_without_units_are_omitted() {
        let hocr = r#"<div class='ocr_page' id='page_1'>
            <span class='ocrx_word' title='bbox 1 2 3 4'>word</span>
        </div>
        <div class='ocr_page' id='page_2'>
            <span class='ocr_line' title='bbox 1 2 3 4'>line only</span>
        </div>"#;
        let map = parse_hocr_str(hocr, TextPositioning::ByWords).unwrap();
        assert_eq!(map.page_numbers().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn bad_page_id_is_fatal() {
        let hocr = r#"<div class='ocr_page' id='page_x'>
            <span class='ocrx_word' title='bbox 1 2 3 4'>word</span>
        </div>"#;
        let err = parse_hocr_str(hocr, TextPositioning::ByWords).unwrap_err();
        assert!(err.downcast_ref::<HocrError>().is_some());
    }

    #[test]
    fn bbox_requires_four_integers() {
        assert_eq!(
            parse_bbox("bbox 36 92 582 135; baseline 0 -9"),
            Some(BBox::new(36.0, 92.0, 582.0, 135.0))
        );
        assert_eq!(parse_bbox("bbox 1 2 3"), None);
        assert_eq!(parse_bbox("bbox 1 2 3 4 5"), None);
        assert_eq!(parse_bbox("bbox 1 2 3 4x"), None);
        assert_eq!(parse_bbox("bbox 1 2 3 4"), Some(BBox::new(1.0, 2.0, 3.0, 4.0)));
        assert_eq!(parse_bbox("x_wconf 95"), None);
    }
}

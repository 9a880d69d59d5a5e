use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use ocrlayer::compose::CreatorConfig;
use ocrlayer::core::model::{ScaleMode, TextPositioning};
use ocrlayer::extract::{document_layers, document_text_from_layer, text_from_layer};
use ocrlayer::ocr::{parse_hocr_files, OcrEngine, TesseractEngine};
use ocrlayer::pipeline::{create_pdf, export_text_map, load_pdf, save_pdf, PipelineConfig};

#[derive(Parser, Debug)]
#[command(name = "ocrlayer")]
#[command(version, about = "Searchable PDFs from scanned images with a hidden OCR text layer", long_about = None)]
struct Cli {
    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Recognize images and write a layered PDF
    Create {
        /// Input images, one or more pages each
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Output PDF path
        #[arg(short, long)]
        output: PathBuf,

        /// JSON file with engine and document settings
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Tesseract language(s), e.g. eng or eng+deu
        #[arg(short, long)]
        lang: Option<String>,

        /// Position text by lines instead of words
        #[arg(long)]
        by_lines: bool,

        #[arg(long, value_enum)]
        scale_mode: Option<ScaleArg>,

        /// Name of the image layer
        #[arg(long)]
        image_layer: Option<String>,

        /// Name of the text layer
        #[arg(long)]
        text_layer: Option<String>,

        /// Document title
        #[arg(long)]
        title: Option<String>,

        /// Document language tag, e.g. en-US
        #[arg(long)]
        locale: Option<String>,
    },

    /// Parse hOCR files into a page map
    Parse {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[arg(long)]
        by_lines: bool,

        /// Write text_map.json and per-page text here instead of printing
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the text of one layer of a PDF
    Extract {
        input: PathBuf,

        /// Layer name; untagged content when omitted
        #[arg(long)]
        layer: Option<String>,

        /// 1-based page; all pages when omitted
        #[arg(long)]
        page: Option<u32>,

        /// List the document's layers and exit
        #[arg(long)]
        list_layers: bool,
    },

    /// Recognize images into a plain text file
    Txt {
        #[arg(required = true)]
        images: Vec<PathBuf>,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(short, long)]
        lang: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum ScaleArg {
    KeepOriginalSize,
    ScaleWidth,
    ScaleHeight,
    ScaleToFit,
}

impl From<ScaleArg> for ScaleMode {
    fn from(arg: ScaleArg) -> Self {
        match arg {
            ScaleArg::KeepOriginalSize => ScaleMode::KeepOriginalSize,
            ScaleArg::ScaleWidth => ScaleMode::ScaleWidth,
            ScaleArg::ScaleHeight => ScaleMode::ScaleHeight,
            ScaleArg::ScaleToFit => ScaleMode::ScaleToFit,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Create {
            images,
            output,
            config,
            lang,
            by_lines,
            scale_mode,
            image_layer,
            text_layer,
            title,
            locale,
        } => {
            let mut config = match config {
                Some(path) => PipelineConfig::from_json_file(&path)?,
                None => PipelineConfig::default(),
            };
            if let Some(lang) = lang {
                config.tesseract.languages = split_languages(&lang);
            }
            if by_lines {
                config.tesseract.text_positioning = TextPositioning::ByLines;
            }
            let mut creator = config.creator;
            if let Some(mode) = scale_mode {
                creator = creator.with_scale_mode(mode.into());
            }
            let (image_name, text_name) = (
                image_layer.unwrap_or(creator.image_layer_name.clone()),
                text_layer.unwrap_or(creator.text_layer_name.clone()),
            );
            creator = creator.with_layer_names(image_name, text_name);
            if let Some(title) = title {
                creator = creator.with_title(title);
            }
            if let Some(locale) = locale {
                creator = creator.with_lang(locale);
            }
            run_create(images, output, TesseractEngine::new(config.tesseract), creator)
        }
        Commands::Parse {
            files,
            by_lines,
            output,
        } => run_parse(files, by_lines, output),
        Commands::Extract {
            input,
            layer,
            page,
            list_layers,
        } => run_extract(input, layer, page, list_layers),
        Commands::Txt {
            images,
            output,
            lang,
        } => {
            let mut engine = TesseractEngine::default();
            if let Some(lang) = lang {
                engine = engine.with_languages(split_languages(&lang));
            }
            println!("[*] Recognizing {} image(s)", images.len());
            engine
                .create_txt(&images, &output)
                .with_context(|| format!("Failed to create text file: {}", output.display()))?;
            println!("[✓] Done! Text saved to: {}", output.display());
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "ocrlayer=debug" } else { "ocrlayer=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn split_languages(lang: &str) -> Vec<String> {
    lang.split(['+', ','])
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

fn run_create(
    images: Vec<PathBuf>,
    output: PathBuf,
    engine: TesseractEngine,
    creator: CreatorConfig,
) -> Result<()> {
    println!("[*] Images: {}", images.len());
    println!("[*] Output: {}", output.display());
    println!("[*] Layers: {} / {}", creator.image_layer_name, creator.text_layer_name);

    println!("\n[+] Recognizing and composing...");
    let mut doc = create_pdf(&engine, &images, &creator)
        .with_context(|| format!("Failed to create PDF: {}", output.display()))?;

    println!("[+] Writing PDF...");
    save_pdf(&mut doc, &output)?;

    println!("\n[✓] Done! PDF saved to: {}", output.display());
    Ok(())
}

fn run_parse(files: Vec<PathBuf>, by_lines: bool, output: Option<PathBuf>) -> Result<()> {
    let positioning = if by_lines {
        TextPositioning::ByLines
    } else {
        TextPositioning::ByWords
    };
    let pages = parse_hocr_files(&files, positioning).context("Failed to parse hOCR")?;

    match output {
        Some(dir) => {
            export_text_map(&pages, &dir)
                .with_context(|| format!("Failed to export to: {}", dir.display()))?;
            println!("[✓] {} page(s) saved to: {}", pages.len(), dir.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&pages)?),
    }
    Ok(())
}

fn run_extract(
    input: PathBuf,
    layer: Option<String>,
    page: Option<u32>,
    list_layers: bool,
) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }
    let doc = load_pdf(&input)?;

    if list_layers {
        for info in document_layers(&doc) {
            println!("{}\t{}", info.name, if info.on { "on" } else { "off" });
        }
        return Ok(());
    }

    let text = match page {
        Some(page) => text_from_layer(&doc, page, layer.as_deref())?,
        None => document_text_from_layer(&doc, layer.as_deref())?,
    };
    println!("{text}");
    Ok(())
}

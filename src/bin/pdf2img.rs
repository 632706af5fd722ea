//! CLI binary for pdf2img.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2img::{
    convert, default_scratch_root, inspect, sweep_scratch_root, ConversionConfig, OutputFormat,
    Quality,
};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert every page (up to 50) to JPEG images
  pdf2img document.pdf

  # Copy the images into a directory of your choosing
  pdf2img document.pdf -o ./out

  # Specific pages only
  pdf2img --pages 2,4 document.pdf

  # A contiguous range at high quality
  pdf2img --pages 3-15 --quality high document.pdf

  # Inspect metadata without converting
  pdf2img --inspect-only document.pdf

  # Machine-readable result
  pdf2img --json document.pdf > result.json

FALLBACK BEHAVIOUR:
  pdf2img tries, in order:
    1. the poppler `pdftoppm` binary (checked under /opt/homebrew/bin,
       /usr/local/bin, /usr/bin, then the search path)
    2. a pdfium shared library (system-installed, or PDFIUM_LIB_PATH)
    3. built-in placeholder images, one per page

  Install poppler for high-quality output:
    macOS:          brew install poppler
    Debian/Ubuntu:  sudo apt-get install poppler-utils

SCRATCH FILES:
  Images are written to a unique directory under the scratch root
  (default: <system temp>/pdf2img) and are never deleted by the tool
  itself. Use --sweep-older-than to clean up stale runs.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH      Path to an existing libpdfium for the fallback tier
  PDF2IMG_SCRATCH      Override the scratch root directory
"#;

/// Convert PDF pages to raster images with a cascading renderer fallback chain.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2img",
    version,
    about = "Convert PDF pages to raster images",
    long_about = "Convert PDF pages to raster images. Uses poppler's pdftoppm when available, \
falls back to pdfium, and guarantees output with built-in placeholder images when neither \
renderer is present.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the PDF file to convert.
    input: PathBuf,

    /// Copy the generated images into this directory.
    #[arg(short, long, env = "PDF2IMG_OUTPUT")]
    output_dir: Option<PathBuf>,

    /// Rendering quality: draft (120 dpi), normal (150 dpi), high (200 dpi).
    #[arg(long, env = "PDF2IMG_QUALITY", value_enum, default_value = "normal")]
    quality: QualityArg,

    /// Requested output format (currently always JPEG).
    #[arg(long, env = "PDF2IMG_FORMAT", value_enum, default_value = "jpeg")]
    format: FormatArg,

    /// Page selection: all, 5, 3-15, or 1,3,5.
    #[arg(long, env = "PDF2IMG_PAGES", default_value = "all")]
    pages: String,

    /// Upper bound on rendered pages when no explicit end is given.
    #[arg(long, env = "PDF2IMG_MAX_PAGES", default_value_t = 50)]
    max_pages: u32,

    /// Hard wall-clock limit for the external rasterizer, in seconds.
    #[arg(long, env = "PDF2IMG_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    /// Path to a pdfium shared library for the fallback tier.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Scratch root directory for generated images.
    #[arg(long, env = "PDF2IMG_SCRATCH")]
    scratch_dir: Option<PathBuf>,

    /// Before converting, delete scratch entries older than this many minutes.
    #[arg(long)]
    sweep_older_than: Option<u64>,

    /// Output structured JSON instead of a plain path list.
    #[arg(long, env = "PDF2IMG_JSON")]
    json: bool,

    /// Print PDF metadata only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "PDF2IMG_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2IMG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2IMG_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum QualityArg {
    Draft,
    Normal,
    High,
}

impl From<QualityArg> for Quality {
    fn from(v: QualityArg) -> Self {
        match v {
            QualityArg::Draft => Quality::Draft,
            QualityArg::Normal => Quality::Normal,
            QualityArg::High => Quality::High,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Jpeg,
    Png,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Jpeg => OutputFormat::Jpeg,
            FormatArg::Png => OutputFormat::Png,
        }
    }
}

/// Parsed form of the `--pages` flag.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PageSpec {
    All,
    Range(u32, u32),
    Set(Vec<u32>),
}

fn parse_page_spec(spec: &str) -> Result<PageSpec, String> {
    let spec = spec.trim();
    if spec.is_empty() || spec.eq_ignore_ascii_case("all") {
        return Ok(PageSpec::All);
    }
    if let Some((start, end)) = spec.split_once('-') {
        let start: u32 = start
            .trim()
            .parse()
            .map_err(|_| format!("invalid range start in '{spec}'"))?;
        let end: u32 = end
            .trim()
            .parse()
            .map_err(|_| format!("invalid range end in '{spec}'"))?;
        if start == 0 || end < start {
            return Err(format!("invalid page range '{spec}' (pages are 1-based)"));
        }
        return Ok(PageSpec::Range(start, end));
    }
    let mut pages = Vec::new();
    for part in spec.split(',') {
        let page: u32 = part
            .trim()
            .parse()
            .map_err(|_| format!("invalid page number '{}'", part.trim()))?;
        if page == 0 {
            return Err("pages are 1-based; 0 is not a valid page".into());
        }
        pages.push(page);
    }
    Ok(PageSpec::Set(pages))
}

fn build_config(cli: &Cli) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .quality(cli.quality.into())
        .format(cli.format.into())
        .max_pages(cli.max_pages)
        .exec_timeout_secs(cli.timeout);

    match parse_page_spec(&cli.pages).map_err(|e| anyhow::anyhow!(e))? {
        PageSpec::All => {}
        PageSpec::Range(start, end) => {
            builder = builder.first_page(start).last_page(end);
        }
        PageSpec::Set(pages) => {
            builder = builder.selected_pages(pages);
        }
    }

    if let Some(ref path) = cli.pdfium_lib {
        builder = builder.pdfium_library_path(path);
    }
    if let Some(ref dir) = cli.scratch_dir {
        builder = builder.scratch_root(dir);
    }

    builder.build().context("invalid conversion options")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner is the user's feedback channel; keep library logs quiet
    // unless explicitly asked for.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Optional scratch sweep ───────────────────────────────────────────
    if let Some(minutes) = cli.sweep_older_than {
        let root = cli
            .scratch_dir
            .clone()
            .unwrap_or_else(default_scratch_root);
        let removed = sweep_scratch_root(&root, Duration::from_secs(minutes * 60));
        if !cli.quiet && removed > 0 {
            eprintln!("swept {removed} stale scratch entr{}", if removed == 1 { "y" } else { "ies" });
        }
    }

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = inspect(&cli.input).await.context("failed to inspect PDF")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("failed to serialize metadata")?
            );
        } else {
            println!("File:       {}", cli.input.display());
            if let Some(ref t) = meta.title {
                println!("Title:      {t}");
            }
            if let Some(ref a) = meta.author {
                println!("Author:     {a}");
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:    {s}");
            }
            println!("Pages:      {}", meta.page_count);
            println!("File size:  {} bytes", meta.file_size);
            if let Some(ref p) = meta.producer {
                println!("Producer:   {p}");
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:    {c}");
            }
        }
        return Ok(());
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let config = build_config(&cli)?;

    let spinner = if show_progress {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(format!("Converting {}…", cli.input.display()));
        bar.enable_steady_tick(Duration::from_millis(80));
        Some(bar)
    } else {
        None
    };

    let result = convert(&cli.input, &config).await;

    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    let output = result.context("conversion failed")?;

    // ── Deliver results ──────────────────────────────────────────────────
    let images = match cli.output_dir {
        Some(ref dir) => copy_images(&output.images, dir, &cli.input)?,
        None => output.images.clone(),
    };

    if cli.json {
        let report = serde_json::json!({
            "images": images,
            "scratch_dir": output.scratch_dir,
            "stats": output.stats,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to serialize result")?
        );
    } else {
        for image in &images {
            println!("{}", image.display());
        }
        if !cli.quiet {
            eprintln!(
                "✔ {} image(s) in {}ms",
                output.stats.images_produced, output.stats.total_duration_ms
            );
        }
    }

    Ok(())
}

/// Copy generated images into `dir` as `<source-stem>_page_NNN.jpg`.
fn copy_images(images: &[PathBuf], dir: &Path, source: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");

    let mut copied = Vec::with_capacity(images.len());
    for (index, image) in images.iter().enumerate() {
        let ext = image
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("jpg");
        let dest = dir.join(format!("{stem}_page_{:03}.{ext}", index + 1));
        std::fs::copy(image, &dest)
            .with_context(|| format!("failed to copy {} to {}", image.display(), dest.display()))?;
        copied.push(dest);
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_spec_all() {
        assert_eq!(parse_page_spec("all").unwrap(), PageSpec::All);
        assert_eq!(parse_page_spec("ALL").unwrap(), PageSpec::All);
        assert_eq!(parse_page_spec("  ").unwrap(), PageSpec::All);
    }

    #[test]
    fn page_spec_range() {
        assert_eq!(parse_page_spec("3-15").unwrap(), PageSpec::Range(3, 15));
        assert!(parse_page_spec("5-3").is_err());
        assert!(parse_page_spec("0-3").is_err());
    }

    #[test]
    fn page_spec_set_and_single() {
        assert_eq!(parse_page_spec("5").unwrap(), PageSpec::Set(vec![5]));
        assert_eq!(
            parse_page_spec("1,3,5").unwrap(),
            PageSpec::Set(vec![1, 3, 5])
        );
        assert!(parse_page_spec("1,0,5").is_err());
        assert!(parse_page_spec("1,x").is_err());
    }
}

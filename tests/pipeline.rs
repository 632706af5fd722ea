//! End-to-end tests for the conversion pipeline.
//!
//! Fixtures are synthesised in-memory with `lopdf`, so the tests need no
//! checked-in binary PDFs. Anything that depends on a real `pdftoppm`
//! install is gated on the binary actually being present and skips
//! otherwise; the placeholder-tier scenarios force the first two tiers to
//! fail (always-missing locator, bogus pdfium path) and therefore run
//! deterministically everywhere.

use lopdf::content::Content;
use lopdf::{dictionary, Document, Object, Stream};
use pdf2img::{
    convert, inspect, ConversionConfig, ConvertError, ExecutorHandle, ExecutorLocator, Quality,
    SystemLocator,
};
use std::path::Path;
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────

/// A locator that never finds anything; forces the chain past tier 1.
struct MissingLocator;

impl ExecutorLocator for MissingLocator {
    fn locate(&self) -> Option<ExecutorHandle> {
        None
    }
}

/// Write a PDF with one page per `(width_pts, height_pts)` entry.
fn build_pdf(path: &Path, pages: &[(i64, i64)]) {
    build_pdf_with_info(path, pages, None);
}

fn build_pdf_with_info(path: &Path, pages: &[(i64, i64)], title: Option<&str>) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::new();
    for &(width, height) in pages {
        let content = Content { operations: vec![] };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = pages.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if let Some(title) = title {
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(title),
            "Producer" => Object::string_literal("pdf2img test suite"),
        });
        doc.trailer.set("Info", info_id);
    }

    doc.save(path).unwrap();
}

/// Letter-sized pages, the common case.
fn letter_pages(n: usize) -> Vec<(i64, i64)> {
    vec![(612, 792); n]
}

/// A config whose first two tiers cannot succeed, making the placeholder
/// tier's behaviour observable regardless of what is installed locally.
fn placeholder_only(scratch_root: &Path) -> pdf2img::ConversionConfigBuilder {
    ConversionConfig::builder()
        .locator(Arc::new(MissingLocator))
        .pdfium_library_path("/no/such/libpdfium.so")
        .scratch_root(scratch_root)
}

/// Skip the test unless a real pdftoppm is installed.
macro_rules! skip_unless_pdftoppm {
    () => {
        if SystemLocator::new().locate().is_none() {
            println!("SKIP — pdftoppm not installed on this host");
            return;
        }
    };
}

// ── Fatal-error paths ────────────────────────────────────────────────────

#[tokio::test]
async fn missing_source_fails_before_any_tier() {
    let config = ConversionConfig::default();
    let err = convert("/no/such/document.pdf", &config).await.unwrap_err();
    assert!(matches!(err, ConvertError::SourceUnreadable { .. }), "got: {err:?}");
}

#[tokio::test]
async fn garbage_source_fails_as_unreadable_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("not-a-pdf.pdf");
    std::fs::write(&source, b"this is not a pdf at all").unwrap();

    let config = placeholder_only(dir.path()).build().unwrap();
    let err = convert(&source, &config).await.unwrap_err();
    assert!(matches!(err, ConvertError::PdfUnreadable { .. }), "got: {err:?}");
}

// ── Placeholder-tier scenarios (deterministic everywhere) ────────────────

#[tokio::test]
async fn three_page_document_yields_three_images() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("three.pdf");
    build_pdf(&source, &letter_pages(3));

    let config = placeholder_only(dir.path()).build().unwrap();
    let output = convert(&source, &config).await.unwrap();

    assert_eq!(output.images.len(), 3);
    assert_eq!(output.stats.images_produced, 3);
    for (index, image) in output.images.iter().enumerate() {
        assert!(image.exists(), "missing {}", image.display());
        assert!(std::fs::metadata(image).unwrap().len() > 0);
        let expected = format!("page-{:03}.jpg", index + 1);
        assert!(
            image.ends_with(&expected),
            "expected {} to end with {expected}",
            image.display()
        );
    }
}

#[tokio::test]
async fn single_page_document_yields_one_image() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("one.pdf");
    build_pdf(&source, &letter_pages(1));

    let config = placeholder_only(dir.path()).build().unwrap();
    let output = convert(&source, &config).await.unwrap();

    assert_eq!(output.images.len(), 1);
    assert!(std::fs::metadata(&output.images[0]).unwrap().len() > 0);
}

#[tokio::test]
async fn placeholder_tier_covers_the_whole_document_despite_page_options() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("three.pdf");
    build_pdf(&source, &letter_pages(3));

    let config = placeholder_only(dir.path())
        .selected_pages([2])
        .build()
        .unwrap();
    let output = convert(&source, &config).await.unwrap();

    // Range options apply to the rendering tiers; the placeholder tier
    // always emits one image per actual page.
    assert_eq!(output.images.len(), 3);
}

#[tokio::test]
async fn placeholder_output_is_byte_identical_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("two.pdf");
    build_pdf(&source, &[(612, 792), (595, 842)]);

    let config = placeholder_only(dir.path()).build().unwrap();
    let first = convert(&source, &config).await.unwrap();
    let second = convert(&source, &config).await.unwrap();

    assert_eq!(first.images.len(), second.images.len());
    for (a, b) in first.images.iter().zip(&second.images) {
        assert_eq!(std::fs::read(a).unwrap(), std::fs::read(b).unwrap());
    }
}

#[tokio::test]
async fn placeholder_images_are_decodable_and_sized_from_page_geometry() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("sized.pdf");
    build_pdf(&source, &[(612, 792)]);

    let config = placeholder_only(dir.path()).build().unwrap();
    let output = convert(&source, &config).await.unwrap();

    let decoded = image::open(&output.images[0]).unwrap();
    // Twice the Letter point size.
    assert_eq!(decoded.width(), 1224);
    assert_eq!(decoded.height(), 1584);
}

#[tokio::test]
async fn concurrent_conversions_get_isolated_scratch_directories() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("doc.pdf");
    build_pdf(&source, &letter_pages(2));

    let config = placeholder_only(dir.path()).build().unwrap();
    let (a, b) = tokio::join!(convert(&source, &config), convert(&source, &config));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_ne!(a.scratch_dir, b.scratch_dir);
    assert_eq!(a.images.len(), 2);
    assert_eq!(b.images.len(), 2);
}

// ── Metadata inspection ──────────────────────────────────────────────────

#[tokio::test]
async fn inspect_reads_page_count_and_info_dictionary() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("meta.pdf");
    build_pdf_with_info(&source, &letter_pages(2), Some("Quarterly Report"));

    let meta = inspect(&source).await.unwrap();
    assert_eq!(meta.page_count, 2);
    assert_eq!(meta.title.as_deref(), Some("Quarterly Report"));
    assert_eq!(meta.producer.as_deref(), Some("pdf2img test suite"));
    assert!(meta.file_size > 0);
    assert!(meta.author.is_none());
}

#[tokio::test]
async fn inspect_rejects_missing_files() {
    let err = inspect("/no/such/file.pdf").await.unwrap_err();
    assert!(matches!(err, ConvertError::SourceUnreadable { .. }));
}

// ── External-rasterizer scenarios (need a real pdftoppm) ─────────────────

#[tokio::test]
async fn seven_page_document_renders_in_page_order() {
    skip_unless_pdftoppm!();

    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("seven.pdf");
    build_pdf(&source, &letter_pages(7));

    let config = ConversionConfig::builder()
        .scratch_root(dir.path())
        .build()
        .unwrap();
    let output = convert(&source, &config).await.unwrap();

    assert_eq!(output.images.len(), 7);
    for image in &output.images {
        assert!(std::fs::metadata(image).unwrap().len() > 0);
    }
}

#[tokio::test]
async fn selected_pages_return_exactly_those_pages() {
    skip_unless_pdftoppm!();

    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("five.pdf");
    build_pdf(&source, &letter_pages(5));

    let config = ConversionConfig::builder()
        .scratch_root(dir.path())
        .selected_pages([2, 4])
        .build()
        .unwrap();
    let output = convert(&source, &config).await.unwrap();

    assert_eq!(output.images.len(), 2, "got: {:?}", output.images);
}

#[tokio::test]
async fn rendered_output_is_decodable_jpeg() {
    skip_unless_pdftoppm!();

    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("one.pdf");
    build_pdf(&source, &letter_pages(1));

    let config = ConversionConfig::builder()
        .scratch_root(dir.path())
        .quality(Quality::Draft)
        .build()
        .unwrap();
    let output = convert(&source, &config).await.unwrap();

    assert_eq!(output.images.len(), 1);
    let decoded = image::open(&output.images[0]).unwrap();
    assert!(decoded.width() > 0 && decoded.height() > 0);
}

#[tokio::test]
async fn identical_requests_yield_equally_sized_results() {
    skip_unless_pdftoppm!();

    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("doc.pdf");
    build_pdf(&source, &letter_pages(4));

    let config = ConversionConfig::builder()
        .scratch_root(dir.path())
        .first_page(2)
        .last_page(3)
        .build()
        .unwrap();
    let first = convert(&source, &config).await.unwrap();
    let second = convert(&source, &config).await.unwrap();

    assert_eq!(first.images.len(), 2);
    assert_eq!(first.images.len(), second.images.len());
}

// ── Scratch-root behaviour shared by all tiers ───────────────────────────

#[tokio::test]
async fn scratch_directories_survive_conversion() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("doc.pdf");
    build_pdf(&source, &letter_pages(1));

    let config = placeholder_only(dir.path()).build().unwrap();
    let output = convert(&source, &config).await.unwrap();

    // The pipeline must not clean up after itself; the caller owns the
    // files until the host sweeps them.
    assert!(output.scratch_dir.is_dir());
    assert!(output.images.iter().all(|p| p.exists()));
    assert!(output
        .images
        .iter()
        .all(|p| p.starts_with(&output.scratch_dir)));
}

#[test]
fn sync_wrapper_produces_the_same_shape() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("doc.pdf");
    build_pdf(&source, &letter_pages(2));

    let config = placeholder_only(dir.path()).build().unwrap();
    let output = pdf2img::convert_sync(&source, &config).unwrap();
    assert_eq!(output.images.len(), 2);
}

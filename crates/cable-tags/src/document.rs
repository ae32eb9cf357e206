//! Document assembly
//!
//! Every page pair prints the same tags twice: the front side first, then
//! the mirrored back side. Pages are only ever pushed in pairs, so the
//! output never ends on a stray blank page.

use crate::font::{ResolvedFont, resolve_font};
use crate::layout::{PageGeometry, page_pair_count};
use crate::options::TagOptions;
use crate::render::{PageCanvas, PageDrawing, PdfFont, StrokeStyle, layout_page, render_page};
use crate::text::TextMeasure;
use crate::types::{BuildProgress, Result, Side, TagError, TagRecord};
use printpdf::{BuiltinFont, Mm, PdfDocument, PdfPage, PdfSaveOptions};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

const DOCUMENT_TITLE: &str = "Cable Tags";

pub type ProgressCallback = Box<dyn FnMut(BuildProgress) + Send>;

/// Progress reporting and cooperative cancellation for a build
#[derive(Default)]
pub struct BuildControl {
    progress: Option<ProgressCallback>,
    cancel: Option<Arc<AtomicBool>>,
}

impl BuildControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_progress(mut self, callback: impl FnMut(BuildProgress) + Send + 'static) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Build stops before the next page side once `flag` is set
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn report(&mut self, progress: BuildProgress) {
        if let Some(callback) = self.progress.as_mut() {
            callback(progress);
        }
    }
}

/// Page sides in output order: front and back for each pair
fn page_sides(tag_count: usize, per_page: usize) -> impl Iterator<Item = (usize, Side)> {
    (0..page_pair_count(tag_count, per_page))
        .flat_map(move |pair| [Side::Front, Side::Back].map(|side| (pair * per_page, side)))
}

/// Display list of the whole document, one entry per output page
pub fn layout_document(
    tags: &[TagRecord],
    options: &TagOptions,
    measure: &dyn TextMeasure,
) -> Result<Vec<PageDrawing>> {
    let geometry = PageGeometry::from_options(options)?;
    Ok(page_sides(tags.len(), geometry.tags_per_page())
        .map(|(start, side)| layout_page(tags, start, side, &geometry, &options.text, measure))
        .collect())
}

/// Build the complete PDF in memory
pub fn build_document(
    tags: &[TagRecord],
    options: &TagOptions,
    control: &mut BuildControl,
) -> Result<Vec<u8>> {
    if tags.is_empty() {
        return Err(TagError::NoTags);
    }

    let geometry = PageGeometry::from_options(options)?;
    let font = resolve_font(&options.font);
    build_with_font(tags, options, &geometry, &font, control)
}

fn build_with_font(
    tags: &[TagRecord],
    options: &TagOptions,
    geometry: &PageGeometry,
    font: &ResolvedFont,
    control: &mut BuildControl,
) -> Result<Vec<u8>> {
    let mut doc = PdfDocument::new(DOCUMENT_TITLE);
    let pdf_font = match font.parsed_font() {
        Some(parsed) => PdfFont::Embedded(doc.add_font(parsed)),
        None => PdfFont::Builtin(BuiltinFont::TimesBold),
    };
    let stroke = StrokeStyle::from_mm(options.outline_thickness_mm, options.shared_edge_thickness_mm);

    let per_page = geometry.tags_per_page();
    let sides_total = 2 * page_pair_count(tags.len(), per_page);
    log::info!(
        "Building {} tags on {} pages with {}",
        tags.len(),
        sides_total,
        font.description()
    );

    for (sides_done, (start, side)) in page_sides(tags.len(), per_page).enumerate() {
        if control.is_cancelled() {
            log::info!("Build cancelled after {} of {} sides", sides_done, sides_total);
            return Err(TagError::BuildFailed("cancelled".to_string()));
        }

        let drawing = layout_page(tags, start, side, geometry, &options.text, font);
        log::debug!(
            "Page {} ({} side): {} tiles from tag {}",
            sides_done + 1,
            side.name(),
            drawing.tiles.len(),
            start
        );

        let mut canvas = PageCanvas::new(pdf_font.clone(), stroke);
        render_page(&mut canvas, &drawing);
        doc.pages.push(PdfPage::new(
            Mm(geometry.page_width_mm),
            Mm(geometry.page_height_mm),
            canvas.into_ops(),
        ));

        control.report(BuildProgress {
            sides_done: sides_done + 1,
            sides_total,
        });
    }

    let mut warnings = Vec::new();
    let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
    if !warnings.is_empty() {
        log::debug!("PDF writer reported {} warnings", warnings.len());
    }

    Ok(bytes)
}

fn unwritable(path: &Path, source: std::io::Error) -> TagError {
    TagError::OutputPathUnwritable {
        path: path.to_path_buf(),
        source,
    }
}

/// Write test against the temporary sibling before any drawing work
async fn preflight_output(path: &Path, temp_path: &Path) -> Result<()> {
    if tokio::fs::metadata(path).await.is_ok_and(|meta| meta.is_dir()) {
        return Err(unwritable(
            path,
            std::io::Error::other("output path is a directory"),
        ));
    }

    tokio::fs::write(temp_path, b"")
        .await
        .map_err(|e| unwritable(path, e))?;
    if let Err(e) = tokio::fs::remove_file(temp_path).await {
        log::debug!("Could not remove {}: {}", temp_path.display(), e);
    }
    Ok(())
}

/// `.name.part` next to the final output
fn temp_sibling(path: &Path) -> Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        unwritable(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "output path has no file name"),
        )
    })?;

    let mut temp_name = OsString::from(".");
    temp_name.push(file_name);
    temp_name.push(".part");
    Ok(path.with_file_name(temp_name))
}

/// Removes the temporary file unless the write was committed
struct TempFileGuard {
    path: PathBuf,
    committed: bool,
}

impl TempFileGuard {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            committed: false,
        }
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if !self.committed {
            if let Err(e) = std::fs::remove_file(&self.path) {
                log::debug!("Could not remove {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Build the PDF on a blocking task and write it atomically to `output_path`
pub async fn generate_pdf(
    tags: &[TagRecord],
    options: &TagOptions,
    output_path: impl AsRef<Path>,
    control: BuildControl,
) -> Result<()> {
    let output_path = output_path.as_ref().to_owned();
    let temp_path = temp_sibling(&output_path)?;
    preflight_output(&output_path, &temp_path).await?;

    let tags = tags.to_vec();
    let options = options.clone();
    let mut control = control;

    let bytes =
        tokio::task::spawn_blocking(move || build_document(&tags, &options, &mut control))
            .await??;

    let guard = TempFileGuard::new(temp_path.clone());
    tokio::fs::write(&temp_path, &bytes)
        .await
        .map_err(|e| unwritable(&output_path, e))?;
    tokio::fs::rename(&temp_path, &output_path)
        .await
        .map_err(|e| unwritable(&output_path, e))?;
    guard.commit();

    log::info!(
        "Wrote {} ({} bytes)",
        output_path.display(),
        bytes.len()
    );
    Ok(())
}

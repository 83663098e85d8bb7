//! # Export
//!
//! Writes the rendered CV to a PDF and the generated deck to PNG slides.
//! Exports run on a blocking worker; they read a snapshot and never touch
//! the record.

pub mod pdf;
pub mod slides;

use std::fmt;
use std::path::{Path, PathBuf};

use log::info;

use crate::core::record::Slide;
use crate::core::settings::CvSettings;
use crate::render::Document;

/// File stem used when the record has no name.
pub const PDF_FALLBACK_NAME: &str = "Resume";
pub const SLIDES_FALLBACK_NAME: &str = "Presentation";

#[derive(Debug)]
pub enum ExportError {
    Io(std::io::Error),
    /// A font file is missing or unreadable.
    Font(String),
    Pdf(String),
    Image(String),
    /// Nothing to write, e.g. no slides generated yet.
    NothingToExport(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Io(e) => write!(f, "I/O error: {e}"),
            ExportError::Font(msg) => write!(f, "font error: {msg}"),
            ExportError::Pdf(msg) => write!(f, "PDF error: {msg}"),
            ExportError::Image(msg) => write!(f, "image error: {msg}"),
            ExportError::NothingToExport(what) => write!(f, "nothing to export: {what}"),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        ExportError::Io(e)
    }
}

/// Where exports go and which font family they use.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub output_dir: PathBuf,
    pub font_dir: PathBuf,
    pub font_family: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportJob {
    Pdf {
        document: Document,
        settings: CvSettings,
        owner: String,
    },
    Slides {
        slides: Vec<Slide>,
        owner: String,
        accent: (u8, u8, u8),
    },
}

/// Keeps a display name usable as a file name.
fn file_safe(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') { '_' } else { c })
        .collect()
}

pub fn pdf_file_name(owner: &str) -> String {
    format!("{}.pdf", file_safe(owner))
}

pub fn html_file_name(owner: &str) -> String {
    format!("{}.html", file_safe(owner))
}

/// `n` counts from 1.
pub fn slide_file_name(n: usize, owner: &str) -> String {
    format!("Slide_{n}_{}.png", file_safe(owner))
}

/// Path of one file of a font family, e.g. `fonts/NotoSans-Bold.ttf`.
pub(crate) fn font_file(options: &ExportOptions, variant: &str) -> PathBuf {
    options.font_dir.join(format!("{}-{variant}.ttf", options.font_family))
}

pub(crate) fn ensure_dir(dir: &Path) -> Result<(), ExportError> {
    if !dir.as_os_str().is_empty() {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Runs one export job and returns the files written.
pub fn run(job: &ExportJob, options: &ExportOptions) -> Result<Vec<PathBuf>, ExportError> {
    ensure_dir(&options.output_dir)?;
    match job {
        ExportJob::Pdf { document, settings, owner } => {
            let path = options.output_dir.join(pdf_file_name(owner));
            info!("Exporting PDF to {}", path.display());
            pdf::write_pdf(document, settings, options, &path)?;
            Ok(vec![path])
        }
        ExportJob::Slides { slides, owner, accent } => {
            if slides.is_empty() {
                return Err(ExportError::NothingToExport("no slides generated yet".into()));
            }
            info!("Exporting {} slides to {}", slides.len(), options.output_dir.display());
            slides::write_slides(slides, owner, *accent, options)
        }
    }
}

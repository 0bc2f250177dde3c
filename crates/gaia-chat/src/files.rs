//! Upload classification and prompt fragments.
//!
//! Every uploaded file is classified once into a [`FileKind`] by its
//! (case-insensitive) extension, then encoded by kind into a text fragment
//! that can be embedded in the outbound prompt:
//!
//! - images are inlined as base64,
//! - text and code files are inlined verbatim,
//! - tabular files, PDFs and everything else are referenced by path only;
//!   parsing them is left to the agent's own tools.
//!
//! Encoding never fails. Read errors become an inline
//! `[ERROR PROCESSING FILE: ..]` fragment so that one bad upload does not
//! sink the rest of the submission.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;
use tracing::{debug, warn};

/// Upload extensions accepted by the presentation layers, with leading dot.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    // Images
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp",
    // Text and code
    ".txt", ".md", ".py", ".js", ".html", ".css", ".json", ".xml",
    // Tabular
    ".csv", ".xlsx", ".xls",
    // Documents
    ".pdf", ".doc", ".docx",
];

// ── FileKind ──────────────────────────────────────────────────────────

/// Spreadsheet-like formats handed to the agent by path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TabularFormat {
    Csv,
    Excel,
}

/// How an upload contributes to the prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "format")]
pub enum FileKind {
    /// Inlined as base64.
    Image,
    /// Inlined as UTF-8 text.
    Text,
    /// Referenced by path.
    Tabular(TabularFormat),
    /// PDF, referenced by path.
    Document,
    /// Any other extension (Word files included), referenced by path.
    Other,
}

impl FileKind {
    /// Classify a bare extension (with or without the leading dot).
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "bmp" | "webp" => Self::Image,
            "txt" | "md" | "py" | "js" | "html" | "css" | "json" | "xml" => Self::Text,
            "csv" => Self::Tabular(TabularFormat::Csv),
            "xlsx" | "xls" => Self::Tabular(TabularFormat::Excel),
            "pdf" => Self::Document,
            _ => Self::Other,
        }
    }

    /// Classify a path by its extension. Paths without one are [`FileKind::Other`].
    pub fn of(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map_or(Self::Other, Self::from_extension)
    }

    /// Whether encoding this kind reads the file's bytes.
    pub fn reads_content(self) -> bool {
        matches!(self, Self::Image | Self::Text)
    }

    /// Fragment label for path-only kinds.
    fn path_label(self) -> &'static str {
        match self {
            Self::Tabular(TabularFormat::Csv) => "UPLOADED CSV FILE",
            Self::Tabular(TabularFormat::Excel) => "UPLOADED EXCEL FILE",
            Self::Document => "UPLOADED PDF FILE",
            Self::Image | Self::Text | Self::Other => "UPLOADED FILE",
        }
    }
}

// ── UploadedFile ──────────────────────────────────────────────────────

/// A classified upload, alive only for the duration of one submission.
#[derive(Clone, Debug)]
pub struct UploadedFile {
    pub path: PathBuf,
    pub kind: FileKind,
}

impl UploadedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let kind = FileKind::of(&path);
        Self { path, kind }
    }

    /// Base name used in fragment headers.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Encode the file into its prompt fragment.
    pub fn encode(&self) -> Result<String, String> {
        let name = self.name();
        if !self.kind.reads_content() {
            return Ok(format!(
                "[{}: {name}] - File path: {}",
                self.kind.path_label(),
                self.path.display()
            ));
        }

        let bytes = std::fs::read(&self.path).map_err(|e| e.to_string())?;
        if self.kind == FileKind::Image {
            let data = BASE64.encode(bytes);
            debug!("Image {name} converted to base64 ({} chars)", data.len());
            Ok(format!("[UPLOADED IMAGE: {name}] - Base64 data: {data}"))
        } else {
            let content = String::from_utf8(bytes).map_err(|e| e.to_string())?;
            debug!("Text file {name} read ({} chars)", content.len());
            Ok(format!("[UPLOADED TEXT FILE: {name}]\nContent:\n{content}"))
        }
    }
}

// ── Encoding ──────────────────────────────────────────────────────────

/// Encode one upload into a prompt fragment.
///
/// Returns `None` for an empty or non-existent path; such uploads are
/// skipped without an inline error. Any read failure is returned as an
/// `[ERROR PROCESSING FILE: <name>] - <message>` fragment.
pub fn encode_file(path: &Path) -> Option<String> {
    if path.as_os_str().is_empty() || !path.exists() {
        warn!("Skipping invalid file path: {}", path.display());
        return None;
    }

    let file = UploadedFile::new(path);
    let size = std::fs::metadata(path).map_or(0, |m| m.len());
    debug!(
        "Processing file: {} ({size} bytes, {:?})",
        file.name(),
        file.kind
    );

    match file.encode() {
        Ok(fragment) => Some(fragment),
        Err(e) => {
            warn!("Error processing file {}: {e}", path.display());
            Some(format!("[ERROR PROCESSING FILE: {}] - {e}", file.name()))
        }
    }
}

/// Encode uploads in submission order, dropping skipped paths.
pub fn encode_files<P: AsRef<Path>>(paths: &[P]) -> Vec<String> {
    let fragments: Vec<String> = paths
        .iter()
        .filter_map(|p| encode_file(p.as_ref()))
        .collect();
    if !fragments.is_empty() {
        debug!(
            "Encoded {} of {} upload(s) into prompt fragments",
            fragments.len(),
            paths.len()
        );
    }
    fragments
}

//! Book directory assembler.
//!
//! Takes a scraped [`BookRecord`] and writes the final directory to disk:
//!
//! ```text
//! <output_root>/<book>/
//! ├── README.md        title, preamble and the entry index
//! ├── book.json        machine-readable manifest
//! ├── entry_01.md      one file per entry (flat books)
//! └── adhyaya_1/       or nested by number (hierarchical books)
//!     └── pada_1/
//!         └── sutra_001.md
//! ```

use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

use grantha_crawler::CITATION_KEY;
use grantha_shared::{BookRecord, EntryRecord, GranthaError, Result, entry_path};

/// Placeholder for an entry whose explanation could not be extracted.
const NO_EXPLANATION: &str = "*विवरणं अनुपलब्धम्*";

/// Manifest file name inside the book directory.
pub const MANIFEST_FILE: &str = "book.json";

/// Index file name inside the book directory.
pub const INDEX_FILE: &str = "README.md";

/// One entry as recorded in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub number: String,
    pub title: String,
    pub url: String,
    /// Path relative to the book directory.
    pub path: String,
    /// SHA-256 of the written file.
    pub sha256: String,
}

/// Contents of `book.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookManifest {
    pub name: String,
    pub title: String,
    pub source_url: String,
    pub header_shlokas: Vec<String>,
    pub footer_title: String,
    pub tool_version: String,
    pub generated_at: DateTime<Utc>,
    pub entry_count: usize,
    pub entries: Vec<ManifestEntry>,
}

/// Output from a successful assembly.
#[derive(Debug, Clone)]
pub struct AssembleResult {
    /// Directory the book was written to.
    pub book_dir: PathBuf,
    /// Files written, including the index and manifest.
    pub files_written: usize,
    /// The manifest that was written.
    pub manifest: BookManifest,
}

/// Relative output path of every entry, in book order.
///
/// An entry whose number maps to a path already taken (e.g. `1` and `१`) is
/// written under its positional name instead.
pub fn entry_paths(book: &BookRecord) -> Vec<String> {
    let organization = book.variant.config().organization;
    let mut seen = HashSet::new();

    book.entries()
        .enumerate()
        .map(|(i, entry)| {
            let position = i + 1;
            let path = entry_path(organization, &entry.number, position);
            if seen.insert(path.clone()) {
                return path;
            }
            let fallback = entry_path(organization, "", position);
            warn!(
                number = %entry.number,
                taken = %path,
                path = %fallback,
                "entry path already used, falling back to position"
            );
            seen.insert(fallback.clone());
            fallback
        })
        .collect()
}

/// Write `book` under `output_root/<book name>/`.
#[instrument(skip_all, fields(book = %book.name, entries = book.entry_count()))]
pub fn assemble(book: &BookRecord, output_root: &Path, tool_version: &str) -> Result<AssembleResult> {
    let book_dir = output_root.join(&book.name);
    std::fs::create_dir_all(&book_dir).map_err(|e| GranthaError::io(&book_dir, e))?;

    info!(path = %book_dir.display(), "assembling book directory");

    let paths = entry_paths(book);

    let mut entries = Vec::with_capacity(paths.len());
    for (entry, path) in book.entries().zip(&paths) {
        let markdown = render_entry(entry, path);
        let sha256 = write_atomic(&book_dir.join(path), &markdown)?;
        debug!(%path, number = %entry.number, "wrote entry");

        entries.push(ManifestEntry {
            number: entry.number.clone(),
            title: entry.title.clone(),
            url: entry.url.clone(),
            path: path.clone(),
            sha256,
        });
    }

    write_atomic(&book_dir.join(INDEX_FILE), &render_readme(book, &paths))?;

    let manifest = BookManifest {
        name: book.name.clone(),
        title: book.title.clone(),
        source_url: book.source_url.clone(),
        header_shlokas: book.header_shlokas.clone(),
        footer_title: book.footer_title.clone(),
        tool_version: tool_version.to_string(),
        generated_at: Utc::now(),
        entry_count: entries.len(),
        entries,
    };
    write_json(&book_dir.join(MANIFEST_FILE), &manifest)?;

    let files_written = manifest.entry_count + 2;
    info!(files_written, path = %book_dir.display(), "book assembly complete");

    Ok(AssembleResult {
        book_dir,
        files_written,
        manifest,
    })
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// The book index: title, preamble, source link and an entry table.
pub fn render_readme(book: &BookRecord, paths: &[String]) -> String {
    let title = if book.title.is_empty() {
        capitalize(&book.name)
    } else {
        book.title.clone()
    };

    let mut md = format!("<div align=\"center\">\n\n# {title}\n\n");
    for shloka in &book.header_shlokas {
        let _ = write!(md, "*{shloka}*\n\n");
    }
    let _ = write!(
        md,
        "---\n\n📖 **स्रोतः (Source):** [{url}]({url})\n\n</div>\n\n---\n\n\
         ## 📋 सूचि (Index)\n\n\
         | क्र. | नाम | विवरणम् |\n\
         |:---:|:-----|:--------|\n",
        url = book.source_url
    );

    for (entry, path) in book.entries().zip(paths) {
        let citation = entry
            .metadata_value(CITATION_KEY)
            .map(|c| format!(" ({c})"))
            .unwrap_or_default();
        let _ = writeln!(
            md,
            "| {} | **{}**{citation} | [{path}](./{path}) |",
            entry.number, entry.title
        );
    }

    let footer = if book.footer_title.is_empty() {
        String::new()
    } else {
        format!("*{}*", book.footer_title)
    };
    let _ = write!(md, "\n---\n\n<div align=\"center\">\n\n{footer}\n\n</div>\n");
    md
}

/// One entry's document. `path` is where it will be written, relative to the
/// book directory; the back link climbs out of any nesting.
pub fn render_entry(entry: &EntryRecord, path: &str) -> String {
    let mut md = format!(
        "<div align=\"center\">\n\n# {}. {}\n\n",
        entry.number, entry.title
    );
    if let Some(citation) = entry.metadata_value(CITATION_KEY) {
        let _ = write!(md, "**{citation}**\n\n");
    }

    let content = if entry.content.is_empty() {
        NO_EXPLANATION
    } else {
        entry.content.as_str()
    };
    let _ = write!(
        md,
        "📖 **स्रोतः:** [{url}]({url})\n\n</div>\n\n---\n\n\
         ## 📜 विवरणम् (Explanation)\n\n{content}\n\n",
        url = entry.url
    );

    if !entry.notes.is_empty() {
        md.push_str("---\n\n## 📝 टिप्पणी (Notes)\n\n");
        for note in &entry.notes {
            let _ = writeln!(md, "- {note}");
        }
        md.push('\n');
    }

    for (name, text) in entry.sections.iter() {
        if text.trim().is_empty() {
            continue;
        }
        let _ = write!(md, "---\n\n## 📖 {name}\n\n{text}\n\n");
    }

    let _ = write!(
        md,
        "---\n\n<div align=\"center\">\n\n[🏠 मुख्यपृष्ठम्]({}{INDEX_FILE})\n\n</div>\n",
        back_prefix(path)
    );
    md
}

/// `./` for a top-level file, one `../` per directory level otherwise.
fn back_prefix(path: &str) -> String {
    match path.matches('/').count() {
        0 => "./".to_string(),
        depth => "../".repeat(depth),
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Write `content` via a temp file and rename, creating parents.
/// Returns the SHA-256 of the content.
fn write_atomic(path: &Path, content: &str) -> Result<String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| GranthaError::io(parent, e))?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = path.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&temp, content).map_err(|e| GranthaError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| GranthaError::io(path, e))?;

    Ok(compute_hash(content))
}

/// Write a JSON file (pretty-printed).
fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| GranthaError::validation(format!("JSON serialization failed: {e}")))?;
    write_atomic(path, &json)?;
    debug!(path = %path.display(), "wrote JSON file");
    Ok(())
}

/// Compute SHA-256 hash of content.
fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

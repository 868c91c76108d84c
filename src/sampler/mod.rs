//! Text Sampling
//!
//! Decides which files carry readable text, pulls a short snippet out of each,
//! and picks a bounded, representative subset of a large folder. Rich document
//! formats are out of scope; the default sampler reads plain-text families only.

use crate::tree::FileEntry;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Default cap on bytes read from any single file
pub const SAMPLE_BYTES: usize = 2048;

/// Default number of files sampled from a LEAF folder
pub const SAMPLE_LIMIT: usize = 15;

/// Oldest and newest files always included when sampling
const EDGE_SAMPLES: usize = 3;

/// Extensions treated as textual, lower-case without the dot
pub const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "rst", "rtf", "csv", "tsv", "json", "yaml", "yml", "toml", "ini",
    "cfg", "conf", "log", "py", "java", "js", "ts", "rs", "go", "c", "h", "cpp", "hpp", "cs",
    "rb", "php", "sh", "sql", "html", "htm", "css", "xml", "tex", "srt", "vtt",
];

/// Text extraction and sampling seam used by the persona builder
pub trait TextSampler: Send + Sync {
    /// Whether the file is expected to yield readable text
    fn is_textual(&self, path: &Path) -> bool;

    /// Extract a short text snippet; failures are returned as messages, never raised
    fn extract(&self, path: &Path) -> (String, Vec<String>);

    /// Deterministically choose at most `limit` representative files
    fn sample(&self, files: &[FileEntry], limit: usize) -> Vec<FileEntry> {
        sample_files(files, limit)
    }
}

/// Plain-text sampler reading straight from the filesystem
#[derive(Debug, Clone)]
pub struct FsTextSampler {
    sample_bytes: usize,
}

impl FsTextSampler {
    pub fn new(sample_bytes: usize) -> Self {
        Self { sample_bytes }
    }
}

impl Default for FsTextSampler {
    fn default() -> Self {
        Self::new(SAMPLE_BYTES)
    }
}

impl TextSampler for FsTextSampler {
    fn is_textual(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let e = e.to_ascii_lowercase();
                TEXT_EXTENSIONS.contains(&e.as_str())
            })
            .unwrap_or(false)
    }

    fn extract(&self, path: &Path) -> (String, Vec<String>) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let mut buf = Vec::with_capacity(self.sample_bytes);
        let read = File::open(path).and_then(|f| {
            f.take(self.sample_bytes as u64).read_to_end(&mut buf)
        });
        if let Err(e) = read {
            return (String::new(), vec![format!("Failed to read {}: {}", name, e)]);
        }

        let text = String::from_utf8_lossy(&buf);
        // A multi-byte character cut at the byte cap decodes as a replacement char
        let text = text.trim_end_matches('\u{FFFD}');
        (text.chars().take(self.sample_bytes).collect(), Vec::new())
    }
}

/// Pick a bounded, representative subset ordered by modification time
///
/// Returns everything when `files.len() <= limit`. Otherwise always keeps the
/// three oldest and three newest files (fewer for very small limits) and fills
/// the rest with evenly strided picks from the middle. Ties on modification time
/// are broken by name so the result never depends on directory order.
pub fn sample_files(files: &[FileEntry], limit: usize) -> Vec<FileEntry> {
    let mut candidates: Vec<&FileEntry> = files.iter().collect();
    candidates.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.name.cmp(&b.name)));

    if candidates.len() <= limit {
        return candidates.into_iter().cloned().collect();
    }
    if limit == 0 {
        return Vec::new();
    }

    let edge = EDGE_SAMPLES.min(limit / 2);
    let total = candidates.len();
    let pool_start = edge;
    let pool_len = total - 2 * edge;
    let needed = limit - 2 * edge;

    let mut picked: Vec<usize> = (0..edge).collect();
    if needed > 0 && pool_len > 0 {
        let stride = (pool_len / needed).max(1);
        for i in 0..needed {
            picked.push(pool_start + (i * stride).min(pool_len - 1));
        }
    }
    picked.extend(total - edge..total);
    picked.sort_unstable();
    picked.dedup();
    picked.truncate(limit);

    picked.into_iter().map(|i| candidates[i].clone()).collect()
}

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::SiteConfig;
use crate::error::{DocError, DocResult};

/// A Turtle file found under the input root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path as discovered, usable for reading
    pub path: PathBuf,
    /// Path relative to the input root, used to mirror the output tree
    pub relative: PathBuf,
}

impl SourceFile {
    pub fn new(path: PathBuf, relative: PathBuf) -> Self {
        Self { path, relative }
    }

    /// File name without extension.
    pub fn stem(&self) -> String {
        self.relative
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Parent directory relative to the input root; empty at the root.
    pub fn relative_dir(&self) -> &Path {
        self.relative.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Parent directory as URL path segments.
    pub fn dir_segments(&self) -> Vec<String> {
        self.relative_dir()
            .components()
            .filter_map(|c| match c {
                std::path::Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect()
    }

    /// Relative path with `/` separators, as it appears in URLs.
    pub fn relative_url_path(&self) -> String {
        let mut segments = self.dir_segments();
        if let Some(name) = self.relative.file_name() {
            segments.push(name.to_string_lossy().into_owned());
        }
        segments.join("/")
    }

    pub fn output_dir(&self, output_root: &Path) -> PathBuf {
        output_root.join(self.relative_dir())
    }

    pub fn output_file(&self, output_root: &Path, extension: &str) -> PathBuf {
        self.output_dir(output_root)
            .join(format!("{}.{}", self.stem(), extension))
    }
}

/// Recursively find ontology files under the configured input root.
///
/// Results are sorted by path. The output root is never descended into.
pub fn discover_sources(config: &SiteConfig) -> anyhow::Result<Vec<SourceFile>> {
    let root = &config.input_dir;
    if !root.is_dir() {
        anyhow::bail!("Input directory does not exist: {}", root.display());
    }

    let extension = config.normalized_extension().to_string();
    let output_root = fs::canonicalize(&config.output_dir).ok();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if !entry.file_type().is_dir() {
                return true;
            }
            match (&output_root, fs::canonicalize(entry.path())) {
                (Some(out), Ok(dir)) => &dir != out,
                _ => true,
            }
        });

    let mut sources = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable directory entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() || !has_extension(entry.path(), &extension) {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or_else(|_| entry.path())
            .to_path_buf();
        debug!("Discovered {}", entry.path().display());
        sources.push(SourceFile::new(entry.path().to_path_buf(), relative));
    }

    Ok(sources)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map_or(false, |name| {
            name.len() > extension.len() + 1
                && name.ends_with(extension)
                && name[..name.len() - extension.len()].ends_with('.')
        })
}

/// Read a text file, honouring a byte-order mark and falling back to UTF-8.
pub fn read_text(path: &Path) -> DocResult<String> {
    let bytes = fs::read(path).map_err(|source| DocError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let encoding = if let Some((enc, _)) = encoding_rs::Encoding::for_bom(&bytes) {
        enc
    } else {
        encoding_rs::UTF_8
    };

    let (text, _, had_errors) = encoding.decode(&bytes);
    if had_errors {
        warn!("Encoding errors detected in file: {}", path.display());
    }

    Ok(text.into_owned())
}

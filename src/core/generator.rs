use anyhow::Result;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::SiteConfig;
use crate::core::{loader, projector};
use crate::error::{DocError, DocResult};
use crate::handlers::{discover_sources, SourceFile};
use crate::templates::{PageContext, PageRenderer, RenderConfig};
use crate::utils::TripleCsvWriter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Documented { csv: PathBuf, html: PathBuf },
    NotAnOntology,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct FileReport {
    pub source: PathBuf,
    pub outcome: FileOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub files: Vec<FileReport>,
    pub processing_time_seconds: f64,
}

impl RunSummary {
    pub fn documented(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Documented { .. }))
    }

    pub fn not_ontologies(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::NotAnOntology))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed(_)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.files.iter().filter_map(|f| match &f.outcome {
            FileOutcome::Failed(message) => Some((f.source.as_path(), message.as_str())),
            _ => None,
        })
    }

    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.outcome)).count()
    }
}

/// Turns every ontology under the input root into an HTML page and a CSV dump.
pub struct SiteGenerator {
    config: SiteConfig,
    render_config: RenderConfig,
    renderer: PageRenderer,
    csv_writer: TripleCsvWriter,
}

impl SiteGenerator {
    /// `generated` is the date printed on every page.
    pub fn new(config: SiteConfig, generated: impl Into<String>) -> Result<Self> {
        let render_config = RenderConfig::from_site_config(&config, generated);
        let renderer = PageRenderer::new(&render_config)?;

        Ok(Self {
            config,
            render_config,
            renderer,
            csv_writer: TripleCsvWriter::new(),
        })
    }

    /// Discover and process every source file. Only discovery itself can fail.
    pub fn generate_all(&self) -> Result<RunSummary> {
        let sources = discover_sources(&self.config)?;
        info!(
            "Found {} .{} files under {}",
            sources.len(),
            self.config.normalized_extension(),
            self.config.input_dir.display()
        );
        Ok(self.generate_sources(&sources))
    }

    pub fn generate_sources(&self, sources: &[SourceFile]) -> RunSummary {
        let start_time = Instant::now();
        let mut files = Vec::with_capacity(sources.len());

        for source in sources {
            let outcome = match self.generate_for_file(source) {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("Skipping {}: {}", source.path.display(), e);
                    FileOutcome::Failed(e.to_string())
                }
            };
            files.push(FileReport {
                source: source.path.clone(),
                outcome,
            });
        }

        RunSummary {
            files,
            processing_time_seconds: start_time.elapsed().as_secs_f64(),
        }
    }

    pub fn generate_for_file(&self, source: &SourceFile) -> DocResult<FileOutcome> {
        info!("Considering {}", source.path.display());

        let graph = loader::load(&source.path)?;
        if !graph.is_ontology() {
            info!("Not an ontology: {}", source.path.display());
            return Ok(FileOutcome::NotAnOntology);
        }
        info!("Found an ontology: {}", source.path.display());

        let model = projector::project(&graph, self.config.missing_predicate)?;
        debug!(
            "Projected {} classes, {} object properties, {} datatype properties",
            model.classes.len(),
            model.object_properties.len(),
            model.data_properties.len()
        );
        let page = PageContext::new(model, source, &self.render_config)?;

        let out_dir = source.output_dir(&self.config.output_dir);
        if ensure_dir(&out_dir)? {
            info!(" Made dir {}", out_dir.display());
        }

        let csv = source.output_file(&self.config.output_dir, "csv");
        info!("  Writing {}", csv.display());
        self.csv_writer.write_file(&graph, &csv)?;

        let html = source.output_file(&self.config.output_dir, "html");
        info!("  Writing {}", html.display());
        self.renderer.render_to_file(&page, &html)?;

        Ok(FileOutcome::Documented { csv, html })
    }
}

/// Create `dir` and its parents. Returns whether anything was created.
fn ensure_dir(dir: &Path) -> DocResult<bool> {
    if dir.is_dir() {
        return Ok(false);
    }
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(DocError::io(dir, e)),
    }
}

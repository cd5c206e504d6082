use anyhow::{Context as _, Result};
use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::SiteConfig;
use crate::core::projector::{
    ClassRecord, DatatypePropertyRecord, DocumentModel, ImportReference, MakerRecord,
    NamespaceRecord, ObjectPropertyRecord, RelationshipRecord,
};
use crate::error::{DocError, DocResult};
use crate::handlers::SourceFile;
use crate::utils::urls::{display_name, join_url, ontology_name_from_path, slugify};

const TEMPLATE_NAME: &str = "ontology";
const DEFAULT_TEMPLATE: &str = include_str!("ontology.html.hbs");

/// Everything the renderer needs besides the document itself.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub root_url: String,
    pub html_root_url: String,
    pub source_root_url: String,
    pub output_dir: PathBuf,
    /// Template file replacing the built-in one
    pub template: Option<PathBuf>,
    /// Generation date shown on every page
    pub generated: String,
}

impl RenderConfig {
    pub fn from_site_config(config: &SiteConfig, generated: impl Into<String>) -> Self {
        Self {
            root_url: config.root_url.clone(),
            html_root_url: config.html_root_url.clone(),
            source_root_url: config.source_root_url.clone(),
            output_dir: config.output_dir.clone(),
            template: config.template.clone(),
            generated: generated.into(),
        }
    }

    /// Today's date in UTC, as printed in page footers.
    pub fn today() -> String {
        chrono::Utc::now().format("%Y-%m-%d").to_string()
    }
}

/// Variables available to the page template.
#[derive(Debug, Clone, Serialize)]
pub struct PageContext {
    pub relcanonical: String,
    pub csv_url: String,
    pub htmlpath: String,
    pub htmldir: String,
    pub ttlpath: String,
    pub ttl_url: String,
    pub root_url: String,
    pub generated: String,
    pub title: String,
    pub created: Option<String>,
    pub rights: Option<String>,
    pub description: Option<String>,
    pub depiction: Option<String>,
    pub classes: Vec<ClassRecord>,
    pub object_properties: Vec<ObjectPropertyRecord>,
    pub data_properties: Vec<DatatypePropertyRecord>,
    pub namespaces: Vec<NamespaceRecord>,
    pub makers: Vec<MakerRecord>,
    pub imports: Vec<ImportReference>,
    pub equivalent_classes: Vec<RelationshipRecord>,
    pub sub_classes: Vec<RelationshipRecord>,
}

impl PageContext {
    pub fn new(model: DocumentModel, source: &SourceFile, config: &RenderConfig) -> DocResult<Self> {
        let stem = source.stem();
        let mut segments = source.dir_segments();

        segments.push(format!("{}.html", stem));
        let relcanonical = link(&config.html_root_url, &segments)?;
        segments.pop();

        segments.push(format!("{}.csv", stem));
        let csv_url = link(&config.html_root_url, &segments)?;
        segments.pop();

        let ttlpath = source.relative_url_path();
        segments.push(
            source
                .relative
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );
        let ttl_url = link(&config.source_root_url, &segments)?;

        let htmlpath = source
            .output_file(&config.output_dir, "html")
            .to_string_lossy()
            .replace('\\', "/")
            .trim_start_matches('.')
            .to_string();

        let metadata = model.metadata;
        Ok(Self {
            relcanonical,
            csv_url,
            htmlpath,
            htmldir: config.output_dir.to_string_lossy().into_owned(),
            ttlpath,
            ttl_url,
            root_url: config.root_url.clone(),
            generated: config.generated.clone(),
            title: metadata.title,
            created: metadata.created,
            rights: metadata.rights,
            description: metadata.description,
            depiction: metadata.depiction,
            classes: model.classes,
            object_properties: model.object_properties,
            data_properties: model.data_properties,
            namespaces: model.namespaces,
            makers: model.makers,
            imports: model.imports,
            equivalent_classes: model.equivalent_classes,
            sub_classes: model.sub_classes,
        })
    }
}

fn link(base: &str, segments: &[String]) -> DocResult<String> {
    join_url(base, segments)
        .map(String::from)
        .map_err(|e| DocError::InvalidUrl {
            base: base.to_string(),
            message: e.to_string(),
        })
}

/// Renders ontology pages through Handlebars.
///
/// Registered helpers, each a pure string function whose output is escaped:
///
/// - `slash2wbr`: inserts `<wbr>` after every `/` so long IRIs can wrap
/// - `ttlpath2ontologyname`: `meta/house-of-lords.ttl` → `House Of Lords`
/// - `ttlpath2htmlpath`: Turtle path → URL of its published page
/// - `local_name`: text after the last `/` or `#`
/// - `slugify`: label → anchor id
pub struct PageRenderer {
    handlebars: Handlebars<'static>,
}

impl PageRenderer {
    pub fn new(config: &RenderConfig) -> Result<Self> {
        let mut handlebars = Handlebars::new();

        handlebars.register_helper("slash2wbr", Box::new(slash2wbr_helper));
        handlebars.register_helper("ttlpath2ontologyname", Box::new(ontology_name_helper));
        handlebars.register_helper(
            "ttlpath2htmlpath",
            Box::new(HtmlPathHelper {
                html_root_url: config.html_root_url.clone(),
            }),
        );
        handlebars.register_helper("local_name", Box::new(local_name_helper));
        handlebars.register_helper("slugify", Box::new(slugify_helper));

        let content = match config.template {
            Some(ref path) => fs::read_to_string(path)
                .with_context(|| format!("Failed to read template file: {}", path.display()))?,
            None => DEFAULT_TEMPLATE.to_string(),
        };
        handlebars
            .register_template_string(TEMPLATE_NAME, content)
            .with_context(|| "Failed to compile page template")?;

        match config.template {
            Some(ref path) => info!("Loaded template: {}", path.display()),
            None => info!("Using built-in page template"),
        }

        Ok(Self { handlebars })
    }

    pub fn render(&self, page: &PageContext) -> DocResult<String> {
        Ok(self.handlebars.render(TEMPLATE_NAME, page)?)
    }

    pub fn render_to_file(&self, page: &PageContext, path: &Path) -> DocResult<()> {
        let html = self.render(page)?;
        fs::write(path, html).map_err(|e| DocError::io(path, e))
    }
}

/// Escape `value` and allow a line break after every `/`.
pub fn slash_to_wbr(value: &str) -> String {
    html_escape::encode_text(value).replace('/', "/<wbr>")
}

/// URL of the published page for a Turtle path.
///
/// For an absolute path the first segment names the site and is dropped, so
/// `/ontologies/house/house.ttl` maps to `<root>house/house.html`.
pub fn html_url_for_ttl_path(html_root_url: &str, ttlpath: &str) -> Option<String> {
    let mut segments: Vec<&str> = ttlpath
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();
    if ttlpath.starts_with('/') && segments.len() > 1 {
        segments.remove(0);
    }
    let file = segments.pop()?;
    let page = match file.strip_suffix(".ttl") {
        Some(stem) => format!("{}.html", stem),
        None => file.to_string(),
    };
    segments.push(&page);
    join_url(html_root_url, &segments).ok().map(String::from)
}

fn str_param<'a>(h: &'a Helper) -> Option<&'a str> {
    h.param(0).and_then(|p| p.value().as_str())
}

// Handlebars helpers
fn slash2wbr_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    if let Some(value) = str_param(h) {
        out.write(&slash_to_wbr(value))?;
    }
    Ok(())
}

fn ontology_name_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    if let Some(value) = str_param(h) {
        out.write(&html_escape::encode_text(&ontology_name_from_path(value)))?;
    }
    Ok(())
}

fn local_name_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    if let Some(value) = str_param(h) {
        out.write(&html_escape::encode_text(display_name(value)))?;
    }
    Ok(())
}

fn slugify_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    if let Some(value) = str_param(h) {
        out.write(&html_escape::encode_double_quoted_attribute(&slugify(value)))?;
    }
    Ok(())
}

struct HtmlPathHelper {
    html_root_url: String,
}

impl HelperDef for HtmlPathHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        if let Some(url) = str_param(h).and_then(|p| html_url_for_ttl_path(&self.html_root_url, p)) {
            out.write(&html_escape::encode_double_quoted_attribute(&url))?;
        }
        Ok(())
    }
}

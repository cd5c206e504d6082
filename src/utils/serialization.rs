use csv::{QuoteStyle, WriterBuilder};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{DocError, DocResult};
use crate::knowledge_graph::OntologyGraph;

pub const CSV_HEADER: [&str; 3] = ["Subject", "Predicate", "Object"];

/// Dumps every triple of a graph as quoted CSV rows.
pub struct TripleCsvWriter;

impl TripleCsvWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write<W: Write>(&self, graph: &OntologyGraph, out: W) -> DocResult<()> {
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .from_writer(out);

        writer.write_record(CSV_HEADER)?;
        for triple in graph.triples() {
            writer.write_record([
                triple.subject.as_str(),
                triple.predicate.as_str(),
                triple.object.as_str(),
            ])?;
        }
        writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    pub fn write_file(&self, graph: &OntologyGraph, path: &Path) -> DocResult<()> {
        let file = File::create(path).map_err(|e| DocError::io(path, e))?;
        self.write(graph, file)
    }

    pub fn to_string(&self, graph: &OntologyGraph) -> DocResult<String> {
        let mut buffer = Vec::new();
        self.write(graph, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl Default for TripleCsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

use rio_api::model as rio;
use rio_api::parser::TriplesParser;
use rio_turtle::{TurtleError, TurtleParser};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{DocError, DocResult};
use crate::handlers::read_text;
use crate::knowledge_graph::{OntologyGraph, Term, Triple};

/// Read and parse a Turtle file.
///
/// Read failures are logged with their OS error code before being returned.
pub fn load(path: &Path) -> DocResult<OntologyGraph> {
    let text = match read_text(path) {
        Ok(text) => text,
        Err(e) => {
            match e.os_error_code() {
                Some(code) => warn!("{} (os error {})", e, code),
                None => warn!("{}", e),
            }
            return Err(e);
        }
    };

    let graph = parse_turtle(&text, path)?;
    debug!(
        "Parsed {} triples and {} prefixes from {}",
        graph.len(),
        graph.namespaces().len(),
        path.display()
    );
    Ok(graph)
}

/// Parse Turtle text into a graph. `path` is only used in error reports.
pub fn parse_turtle(text: &str, path: &Path) -> DocResult<OntologyGraph> {
    let mut graph = OntologyGraph::new();
    let mut parser = TurtleParser::new(text.as_bytes(), None);

    parser
        .parse_all(&mut |t: rio::Triple<'_>| -> Result<(), TurtleError> {
            graph.insert(convert_triple(t));
            Ok(())
        })
        .map_err(|e| DocError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    for (prefix, iri) in parser.prefixes() {
        graph.bind_namespace(prefix.clone(), iri.clone());
    }

    Ok(graph)
}

fn convert_triple(t: rio::Triple<'_>) -> Triple {
    Triple::new(
        convert_subject(t.subject),
        t.predicate.iri,
        convert_term(t.object),
    )
}

fn convert_subject(subject: rio::Subject<'_>) -> Term {
    match subject {
        rio::Subject::NamedNode(n) => Term::NamedNode(n.iri.to_string()),
        rio::Subject::BlankNode(b) => Term::BlankNode(b.id.to_string()),
        quoted => Term::NamedNode(quoted.to_string()),
    }
}

fn convert_term(term: rio::Term<'_>) -> Term {
    match term {
        rio::Term::NamedNode(n) => Term::NamedNode(n.iri.to_string()),
        rio::Term::BlankNode(b) => Term::BlankNode(b.id.to_string()),
        rio::Term::Literal(literal) => convert_literal(literal),
        quoted => Term::NamedNode(quoted.to_string()),
    }
}

fn convert_literal(literal: rio::Literal<'_>) -> Term {
    match literal {
        rio::Literal::Simple { value } => Term::Literal {
            value: value.to_string(),
            language: None,
            datatype: None,
        },
        rio::Literal::LanguageTaggedString { value, language } => Term::Literal {
            value: value.to_string(),
            language: Some(language.to_string()),
            datatype: None,
        },
        rio::Literal::Typed { value, datatype } => Term::Literal {
            value: value.to_string(),
            language: None,
            datatype: Some(datatype.iri.to_string()),
        },
    }
}

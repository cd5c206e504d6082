use std::collections::{BTreeMap, HashSet};
use std::fmt;

pub mod vocab;

use vocab::{owl, rdf, rdfs};

/// A node or value in a triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    NamedNode(String),
    BlankNode(String),
    Literal {
        value: String,
        language: Option<String>,
        datatype: Option<String>,
    },
}

impl Term {
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::NamedNode(iri.into())
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            language: None,
            datatype: None,
        }
    }

    /// IRI text, blank node id, or literal lexical value.
    pub fn as_str(&self) -> &str {
        match self {
            Term::NamedNode(iri) => iri,
            Term::BlankNode(id) => id,
            Term::Literal { value, .. } => value,
        }
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::NamedNode(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn is_iri(&self, iri: &str) -> bool {
        self.as_iri() == Some(iri)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    pub subject: Term,
    pub predicate: String,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object,
        }
    }
}

/// In-memory triple store for a single ontology file.
///
/// Triples keep parse order and duplicates are dropped on insert, so every
/// query below iterates deterministically.
#[derive(Debug, Default, Clone)]
pub struct OntologyGraph {
    triples: Vec<Triple>,
    seen: HashSet<Triple>,
    namespaces: BTreeMap<String, String>,
}

impl OntologyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, triple: Triple) -> bool {
        if self.seen.contains(&triple) {
            return false;
        }
        self.seen.insert(triple.clone());
        self.triples.push(triple);
        true
    }

    pub fn bind_namespace(&mut self, prefix: impl Into<String>, iri: impl Into<String>) {
        self.namespaces.insert(prefix.into(), iri.into());
    }

    pub fn namespaces(&self) -> &BTreeMap<String, String> {
        &self.namespaces
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn triples(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    pub fn is_ontology(&self) -> bool {
        self.triples
            .iter()
            .any(|t| t.predicate == rdf::TYPE && t.object.is_iri(owl::ONTOLOGY))
    }

    /// Distinct subjects typed `type_iri`, in first-seen order.
    pub fn subjects_of_type(&self, type_iri: &str) -> Vec<&Term> {
        let mut subjects: Vec<&Term> = Vec::new();
        for t in &self.triples {
            if t.predicate == rdf::TYPE && t.object.is_iri(type_iri) && !subjects.contains(&&t.subject) {
                subjects.push(&t.subject);
            }
        }
        subjects
    }

    pub fn triples_with_predicate<'a>(&'a self, predicate: &'a str) -> impl Iterator<Item = &'a Triple> + 'a {
        self.triples.iter().filter(move |t| t.predicate == predicate)
    }

    pub fn triples_about<'a>(&'a self, subject: &'a Term) -> impl Iterator<Item = &'a Triple> + 'a {
        self.triples.iter().filter(move |t| &t.subject == subject)
    }

    pub fn objects<'a>(&'a self, subject: &'a Term, predicate: &'a str) -> impl Iterator<Item = &'a Term> + 'a {
        self.triples
            .iter()
            .filter(move |t| &t.subject == subject && t.predicate == predicate)
            .map(|t| &t.object)
    }

    /// First object of `predicate` on `subject`, if any.
    pub fn value(&self, subject: &Term, predicate: &str) -> Option<&Term> {
        self.triples
            .iter()
            .find(|t| &t.subject == subject && t.predicate == predicate)
            .map(|t| &t.object)
    }

    pub fn value_string(&self, subject: &Term, predicate: &str) -> Option<String> {
        self.value(subject, predicate).map(|t| t.to_string())
    }

    /// `rdfs:label` of `subject`, or an empty string.
    pub fn label(&self, subject: &Term) -> String {
        self.value_string(subject, rdfs::LABEL).unwrap_or_default()
    }
}

//! Projection of an ontology graph into the flat records a page is built from.

use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;
use url::Url;

use crate::config::MissingPredicatePolicy;
use crate::error::{DocError, DocResult};
use crate::knowledge_graph::vocab::{dcterms, foaf, owl, rdfs};
use crate::knowledge_graph::{OntologyGraph, Term};
use crate::utils::urls::{fragment_name, local_name, slugify, uri_path};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OntologyMetadata {
    pub title: String,
    pub description: Option<String>,
    pub created: Option<String>,
    pub rights: Option<String>,
    pub depiction: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassRecord {
    pub label: String,
    pub identifier: String,
    pub anchor: String,
    pub comment: Option<String>,
    pub defined_by: Option<String>,
    pub superclasses: Vec<ClassLink>,
}

/// A superclass reference. `anchor` is set only when the target is a class
/// documented on the same page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassLink {
    pub name: String,
    pub anchor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatatypePropertyRecord {
    pub label: String,
    pub identifier: String,
    pub comment: Option<String>,
    pub domain: String,
    pub range: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectPropertyRecord {
    pub label: String,
    pub identifier: String,
    pub domain: String,
    pub range: String,
    pub superproperty: String,
    pub comment: Option<String>,
}

/// Subject and object paths of a class relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipRecord {
    pub subject: String,
    pub object: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MakerRecord {
    pub id: String,
    pub name: Option<String>,
    pub homepage: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceRecord {
    pub prefix: String,
    pub iri: String,
}

/// Structural breakdown of an `owl:imports` IRI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReference {
    pub iri: String,
    pub scheme: String,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub path: String,
    pub query: Option<String>,
    pub fragment: Option<String>,
}

impl ImportReference {
    pub fn parse(iri: &str) -> Self {
        match Url::parse(iri) {
            Ok(url) => Self {
                iri: iri.to_string(),
                scheme: url.scheme().to_string(),
                host: url.host_str().map(str::to_string),
                port: url.port(),
                path: url.path().to_string(),
                query: url.query().map(str::to_string),
                fragment: url.fragment().map(str::to_string),
            },
            Err(_) => Self {
                iri: iri.to_string(),
                scheme: String::new(),
                host: None,
                port: None,
                path: iri.to_string(),
                query: None,
                fragment: None,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentModel {
    pub metadata: OntologyMetadata,
    pub classes: Vec<ClassRecord>,
    pub data_properties: Vec<DatatypePropertyRecord>,
    pub object_properties: Vec<ObjectPropertyRecord>,
    pub makers: Vec<MakerRecord>,
    pub imports: Vec<ImportReference>,
    pub equivalent_classes: Vec<RelationshipRecord>,
    pub sub_classes: Vec<RelationshipRecord>,
    pub namespaces: Vec<NamespaceRecord>,
}

/// Build the document model for `graph`.
///
/// Only properties without `rdfs:domain` or `rdfs:range` can fail; `policy`
/// decides whether such a property is dropped or fails the whole projection.
pub fn project(graph: &OntologyGraph, policy: MissingPredicatePolicy) -> DocResult<DocumentModel> {
    Ok(DocumentModel {
        metadata: ontology_metadata(graph),
        classes: classes(graph),
        data_properties: collect_records(datatype_properties(graph), policy)?,
        object_properties: collect_records(object_properties(graph), policy)?,
        makers: makers(graph),
        imports: imports(graph),
        equivalent_classes: relationships(graph, owl::EQUIVALENT_CLASS),
        sub_classes: relationships(graph, rdfs::SUB_CLASS_OF),
        namespaces: namespaces(graph),
    })
}

fn collect_records<T>(
    records: Vec<DocResult<T>>,
    policy: MissingPredicatePolicy,
) -> DocResult<Vec<T>> {
    let mut kept = Vec::with_capacity(records.len());
    for record in records {
        match record {
            Ok(record) => kept.push(record),
            Err(e @ DocError::MissingPredicate { .. }) => match policy {
                MissingPredicatePolicy::SkipRecord => warn!("Skipping property: {}", e),
                MissingPredicatePolicy::AbortFile => return Err(e),
            },
            Err(e) => return Err(e),
        }
    }
    Ok(kept)
}

fn required<'a>(graph: &'a OntologyGraph, subject: &Term, predicate: &str) -> DocResult<&'a Term> {
    graph
        .value(subject, predicate)
        .ok_or_else(|| DocError::MissingPredicate {
            subject: subject.to_string(),
            predicate: predicate.to_string(),
        })
}

/// Metadata of the ontology subject. With several, the last one wins.
pub fn ontology_metadata(graph: &OntologyGraph) -> OntologyMetadata {
    match graph.subjects_of_type(owl::ONTOLOGY).last() {
        Some(subject) => OntologyMetadata {
            title: graph.value_string(subject, dcterms::TITLE).unwrap_or_default(),
            description: graph.value_string(subject, dcterms::DESCRIPTION),
            created: graph.value_string(subject, dcterms::CREATED),
            rights: graph.value_string(subject, dcterms::RIGHTS),
            depiction: graph.value_string(subject, foaf::DEPICTION),
        },
        None => OntologyMetadata::default(),
    }
}

pub fn classes(graph: &OntologyGraph) -> Vec<ClassRecord> {
    let subjects = graph.subjects_of_type(owl::CLASS);
    let anchors: HashMap<&Term, String> = subjects
        .iter()
        .map(|subject| (*subject, class_anchor(graph, subject)))
        .collect();

    subjects
        .iter()
        .map(|subject| ClassRecord {
            label: graph.label(subject),
            identifier: local_name(subject.as_str()).to_string(),
            anchor: anchors[subject].clone(),
            comment: graph.value_string(subject, rdfs::COMMENT),
            defined_by: graph.value_string(subject, rdfs::IS_DEFINED_BY),
            superclasses: graph
                .objects(subject, rdfs::SUB_CLASS_OF)
                .map(|o| ClassLink {
                    name: local_name(o.as_str()).to_string(),
                    anchor: anchors.get(o).cloned(),
                })
                .collect(),
        })
        .collect()
}

/// Heading id of a class: its slugged label, or its slugged identifier when
/// unlabelled.
fn class_anchor(graph: &OntologyGraph, subject: &Term) -> String {
    let label = graph.label(subject);
    if label.trim().is_empty() {
        slugify(local_name(subject.as_str()))
    } else {
        slugify(&label)
    }
}

/// Datatype properties. The range keeps only its `#` fragment.
pub fn datatype_properties(graph: &OntologyGraph) -> Vec<DocResult<DatatypePropertyRecord>> {
    graph
        .subjects_of_type(owl::DATATYPE_PROPERTY)
        .into_iter()
        .map(|subject| {
            let domain = required(graph, subject, rdfs::DOMAIN)?;
            let range = required(graph, subject, rdfs::RANGE)?;
            Ok(DatatypePropertyRecord {
                label: graph.label(subject),
                identifier: local_name(subject.as_str()).to_string(),
                comment: graph.value_string(subject, rdfs::COMMENT),
                domain: local_name(domain.as_str()).to_string(),
                range: fragment_name(range.as_str()).to_string(),
            })
        })
        .collect()
}

pub fn object_properties(graph: &OntologyGraph) -> Vec<DocResult<ObjectPropertyRecord>> {
    graph
        .subjects_of_type(owl::OBJECT_PROPERTY)
        .into_iter()
        .map(|subject| {
            let domain = required(graph, subject, rdfs::DOMAIN)?;
            let range = required(graph, subject, rdfs::RANGE)?;
            Ok(ObjectPropertyRecord {
                label: graph.label(subject),
                identifier: local_name(subject.as_str()).to_string(),
                domain: local_name(domain.as_str()).to_string(),
                range: local_name(range.as_str()).to_string(),
                superproperty: graph
                    .value(subject, rdfs::SUB_PROPERTY_OF)
                    .map(|p| local_name(p.as_str()).to_string())
                    .unwrap_or_default(),
                comment: graph.value_string(subject, rdfs::COMMENT),
            })
        })
        .collect()
}

/// Makers referenced by any subject, de-duplicated on all fields.
///
/// A maker only yields a record when the graph describes it.
pub fn makers(graph: &OntologyGraph) -> Vec<MakerRecord> {
    let mut makers: Vec<MakerRecord> = Vec::new();
    for triple in graph.triples_with_predicate(foaf::MAKER) {
        let maker = &triple.object;
        if graph.triples_about(maker).next().is_none() {
            continue;
        }
        let record = MakerRecord {
            id: maker.to_string(),
            name: graph.value_string(maker, foaf::NAME),
            homepage: graph.value_string(maker, foaf::HOMEPAGE),
        };
        if !makers.contains(&record) {
            makers.push(record);
        }
    }
    makers
}

pub fn imports(graph: &OntologyGraph) -> Vec<ImportReference> {
    graph
        .triples_with_predicate(owl::IMPORTS)
        .map(|t| ImportReference::parse(t.object.as_str()))
        .collect()
}

pub fn relationships(graph: &OntologyGraph, predicate: &str) -> Vec<RelationshipRecord> {
    graph
        .triples_with_predicate(predicate)
        .map(|t| RelationshipRecord {
            subject: uri_path(t.subject.as_str()),
            object: uri_path(t.object.as_str()),
        })
        .collect()
}

pub fn namespaces(graph: &OntologyGraph) -> Vec<NamespaceRecord> {
    graph
        .namespaces()
        .iter()
        .map(|(prefix, iri)| NamespaceRecord {
            prefix: prefix.clone(),
            iri: iri.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::loader::parse_turtle;
    use std::path::Path;

    const PREFIXES: &str = r#"
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
@prefix dcterms: <http://purl.org/dc/terms/> .
@prefix foaf: <http://xmlns.com/foaf/0.1/> .
@prefix : <https://id.example.org/schema/> .
"#;

    fn graph(body: &str) -> OntologyGraph {
        parse_turtle(&format!("{}{}", PREFIXES, body), Path::new("test.ttl")).unwrap()
    }

    fn skip(graph: &OntologyGraph) -> DocumentModel {
        project(graph, MissingPredicatePolicy::SkipRecord).unwrap()
    }

    #[test]
    fn test_minimal_ontology() {
        let g = graph(
            r#"
<https://id.example.org/schema> a owl:Ontology ; dcterms:title "Test Ontology" .
:Foo a owl:Class ; rdfs:label "Foo" ; rdfs:comment "A foo" .
"#,
        );
        let model = skip(&g);

        assert_eq!(model.metadata.title, "Test Ontology");
        assert_eq!(model.metadata.description, None);
        assert_eq!(
            model.classes,
            vec![ClassRecord {
                label: "Foo".to_string(),
                identifier: "Foo".to_string(),
                anchor: "foo".to_string(),
                comment: Some("A foo".to_string()),
                defined_by: None,
                superclasses: vec![],
            }]
        );
        assert!(model.sub_classes.is_empty());
    }

    #[test]
    fn test_every_labelled_class_is_projected() {
        let g = graph(
            r#"
:A a owl:Class ; rdfs:label "Alpha" ; rdfs:comment "first" .
:B a owl:Class ; rdfs:label "Beta" ; rdfs:comment "second" .
:C a owl:Class ; rdfs:label "Gamma" ; rdfs:comment "third" .
"#,
        );
        let classes = classes(&g);
        assert_eq!(classes.len(), 3);
        let summary: Vec<(&str, &str, &str)> = classes
            .iter()
            .map(|c| (c.identifier.as_str(), c.label.as_str(), c.comment.as_deref().unwrap()))
            .collect();
        assert!(summary.contains(&("A", "Alpha", "first")));
        assert!(summary.contains(&("B", "Beta", "second")));
        assert!(summary.contains(&("C", "Gamma", "third")));
    }

    #[test]
    fn test_class_without_label_is_kept() {
        let g = graph(":Bare a owl:Class .");
        let classes = classes(&g);
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].label, "");
        assert_eq!(classes[0].comment, None);
    }

    #[test]
    fn test_superclasses_and_subclass_pairs() {
        let g = graph(
            r#"
:Person a owl:Class ; rdfs:label "Person" .
:Member a owl:Class ; rdfs:label "Member" ;
    rdfs:subClassOf :Person, <http://xmlns.com/foaf/0.1/Agent> ;
    rdfs:isDefinedBy <https://id.example.org/schema> .
"#,
        );
        let model = skip(&g);
        let member = model.classes.iter().find(|c| c.identifier == "Member").unwrap();
        assert_eq!(
            member.superclasses,
            vec![
                ClassLink {
                    name: "Person".to_string(),
                    anchor: Some("person".to_string()),
                },
                ClassLink {
                    name: "Agent".to_string(),
                    anchor: None,
                },
            ]
        );
        assert_eq!(member.defined_by.as_deref(), Some("https://id.example.org/schema"));

        assert_eq!(model.sub_classes.len(), 2);
        assert!(model.sub_classes.contains(&RelationshipRecord {
            subject: "/schema/Member".to_string(),
            object: "/schema/Person".to_string(),
        }));
        assert!(model.sub_classes.contains(&RelationshipRecord {
            subject: "/schema/Member".to_string(),
            object: "/foaf/0.1/Agent".to_string(),
        }));
    }

    #[test]
    fn test_superclass_anchor_follows_target_label() {
        let g = graph(
            r#"
:ParliamentaryPeriod a owl:Class ; rdfs:label "Parliamentary period" .
:Session a owl:Class ; rdfs:label "Session" ;
    rdfs:subClassOf :ParliamentaryPeriod, [ a owl:Restriction ] .
"#,
        );
        let classes = classes(&g);
        let period = classes.iter().find(|c| c.identifier == "ParliamentaryPeriod").unwrap();
        let session = classes.iter().find(|c| c.identifier == "Session").unwrap();

        assert_eq!(period.anchor, "parliamentary-period");
        assert_eq!(session.superclasses.len(), 2);
        assert_eq!(session.superclasses[0].name, "ParliamentaryPeriod");
        assert_eq!(session.superclasses[0].anchor.as_deref(), Some("parliamentary-period"));
        assert_eq!(session.superclasses[1].anchor, None);
    }

    #[test]
    fn test_unlabelled_class_anchor_uses_identifier() {
        let g = graph(":BareThing a owl:Class .");
        assert_eq!(classes(&g)[0].anchor, "barething");
    }

    #[test]
    fn test_equivalent_classes() {
        let g = graph(":Person owl:equivalentClass foaf:Person .");
        assert_eq!(
            relationships(&g, owl::EQUIVALENT_CLASS),
            vec![RelationshipRecord {
                subject: "/schema/Person".to_string(),
                object: "/foaf/0.1/Person".to_string(),
            }]
        );
    }

    #[test]
    fn test_datatype_property_range_uses_fragment() {
        let g = graph(
            r#"
:personName a owl:DatatypeProperty ; rdfs:label "name" ;
    rdfs:domain :Person ; rdfs:range xsd:string .
"#,
        );
        let model = skip(&g);
        assert_eq!(
            model.data_properties,
            vec![DatatypePropertyRecord {
                label: "name".to_string(),
                identifier: "personName".to_string(),
                comment: None,
                domain: "Person".to_string(),
                range: "string".to_string(),
            }]
        );
    }

    #[test]
    fn test_object_property_superproperty_defaults_to_empty() {
        let g = graph(
            r#"
:hasMember a owl:ObjectProperty ; rdfs:label "has member" ;
    rdfs:domain :House ; rdfs:range :Member .
:hasPeer a owl:ObjectProperty ; rdfs:label "has peer" ;
    rdfs:domain :House ; rdfs:range :Peer ; rdfs:subPropertyOf :hasMember .
"#,
        );
        let props = skip(&g).object_properties;
        assert_eq!(props.len(), 2);
        assert_eq!(props[0].superproperty, "");
        assert_eq!(props[0].range, "Member");
        assert_eq!(props[1].superproperty, "hasMember");
    }

    #[test]
    fn test_missing_range_skips_only_that_record() {
        let g = graph(
            r#"
:broken a owl:ObjectProperty ; rdfs:domain :House .
:fine a owl:ObjectProperty ; rdfs:domain :House ; rdfs:range :Member .
:alsoBroken a owl:DatatypeProperty ; rdfs:range xsd:string .
"#,
        );
        let model = skip(&g);
        assert_eq!(model.object_properties.len(), 1);
        assert_eq!(model.object_properties[0].identifier, "fine");
        assert!(model.data_properties.is_empty());
    }

    #[test]
    fn test_missing_domain_aborts_file_when_configured() {
        let g = graph(":broken a owl:ObjectProperty ; rdfs:range :Member .");
        let err = project(&g, MissingPredicatePolicy::AbortFile).unwrap_err();
        match err {
            DocError::MissingPredicate { subject, predicate } => {
                assert_eq!(subject, "https://id.example.org/schema/broken");
                assert_eq!(predicate, rdfs::DOMAIN);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_identical_makers_collapse() {
        let g = graph(
            r#"
:A foaf:maker <https://example.org/people/ann> .
:B foaf:maker <https://example.org/people/ann> .
<https://example.org/people/ann> foaf:name "Ann" ; foaf:homepage <https://ann.example.org/> .
"#,
        );
        let makers = makers(&g);
        assert_eq!(
            makers,
            vec![MakerRecord {
                id: "https://example.org/people/ann".to_string(),
                name: Some("Ann".to_string()),
                homepage: Some("https://ann.example.org/".to_string()),
            }]
        );
    }

    #[test]
    fn test_makers_differing_in_homepage_are_kept() {
        let g = graph(
            r#"
:A foaf:maker <https://example.org/people/ann>, <https://example.org/people/ann2> .
<https://example.org/people/ann> foaf:name "Ann" ; foaf:homepage <https://ann.example.org/> .
<https://example.org/people/ann2> foaf:name "Ann" ; foaf:homepage <https://ann.example.com/> .
"#,
        );
        assert_eq!(makers(&g).len(), 2);
    }

    #[test]
    fn test_undescribed_maker_is_ignored() {
        let g = graph(":A foaf:maker <https://example.org/people/nobody> .");
        assert!(makers(&g).is_empty());
    }

    #[test]
    fn test_imports_are_parsed() {
        let g = graph(
            "<https://id.example.org/schema> a owl:Ontology ; owl:imports <https://id.example.org:8443/core/base?v=2#top> .",
        );
        let imports = imports(&g);
        assert_eq!(
            imports,
            vec![ImportReference {
                iri: "https://id.example.org:8443/core/base?v=2#top".to_string(),
                scheme: "https".to_string(),
                host: Some("id.example.org".to_string()),
                port: Some(8443),
                path: "/core/base".to_string(),
                query: Some("v=2".to_string()),
                fragment: Some("top".to_string()),
            }]
        );
    }

    #[test]
    fn test_metadata_fields() {
        let g = graph(
            r#"
<https://id.example.org/schema> a owl:Ontology ;
    dcterms:description "Things" ;
    dcterms:created "2020-02-02"^^xsd:date ;
    dcterms:rights "Open Parliament Licence" ;
    foaf:depiction <https://example.org/diagram.svg> .
"#,
        );
        let metadata = ontology_metadata(&g);
        assert_eq!(metadata.title, "");
        assert_eq!(metadata.description.as_deref(), Some("Things"));
        assert_eq!(metadata.created.as_deref(), Some("2020-02-02"));
        assert_eq!(metadata.rights.as_deref(), Some("Open Parliament Licence"));
        assert_eq!(metadata.depiction.as_deref(), Some("https://example.org/diagram.svg"));
    }

    #[test]
    fn test_namespaces_come_from_prefix_declarations() {
        let g = graph(":A a owl:Class .");
        let namespaces = namespaces(&g);
        assert_eq!(namespaces.len(), 7);
        assert_eq!(namespaces[0], NamespaceRecord {
            prefix: "".to_string(),
            iri: "https://id.example.org/schema/".to_string(),
        });
    }
}

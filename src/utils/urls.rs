//! String derivations used for identifiers, links and page text.

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Text after the last `/`.
pub fn local_name(iri: &str) -> &str {
    iri.rsplit_once('/').map_or(iri, |(_, name)| name)
}

/// Text after the last `#`.
pub fn fragment_name(iri: &str) -> &str {
    iri.rsplit_once('#').map_or(iri, |(_, name)| name)
}

/// Text after the last `/` or `#`, whichever comes later.
pub fn display_name(iri: &str) -> &str {
    match iri.rfind(['/', '#']) {
        Some(idx) => &iri[idx + 1..],
        None => iri,
    }
}

/// Path component of an IRI; anything that does not parse is returned as is.
pub fn uri_path(iri: &str) -> String {
    match Url::parse(iri) {
        Ok(url) => url.path().to_string(),
        Err(_) => iri.to_string(),
    }
}

/// Append path segments to `base`, percent-encoding each one.
///
/// A trailing slash on `base` is not duplicated and empty segments are
/// dropped.
pub fn join_url<S: AsRef<str>>(base: &str, segments: &[S]) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base)?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?;
        path.pop_if_empty();
        path.extend(
            segments
                .iter()
                .map(|s| s.as_ref())
                .filter(|s| !s.is_empty()),
        );
    }
    Ok(url)
}

/// Capitalize the first letter of every word and lowercase the rest.
///
/// A word is a run of alphabetic characters, so `o'neil` becomes `O'Neil`.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut previous_is_alpha = false;
    for c in value.chars() {
        if c.is_alphabetic() {
            if previous_is_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_alpha = true;
        } else {
            out.push(c);
            previous_is_alpha = false;
        }
    }
    out
}

/// Ontology display name from a Turtle path: `meta/house-of-lords.ttl` → `House Of Lords`.
pub fn ontology_name_from_path(path: &str) -> String {
    let file = local_name(path);
    let stem = match file.rfind('.') {
        Some(idx) if idx > 0 => &file[..idx],
        _ => file,
    };
    title_case(&stem.replace('-', " "))
}

/// Lowercase anchor id for a label.
pub fn slugify(label: &str) -> String {
    static NON_WORD: OnceLock<Regex> = OnceLock::new();
    let re = NON_WORD.get_or_init(|| Regex::new(r"[^\p{L}\p{N}]+").expect("static regex"));
    re.replace_all(&label.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

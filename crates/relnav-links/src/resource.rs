//! Link extraction from raw resource payloads
//!
//! A resource is any JSON value that carries its hyperlinks under one of a
//! configurable set of properties (`links` or `_links` by default). The
//! collection may be an ordered array of links or a map from rel to link
//! definition; both normalize to an ordered `Vec<Link>` here, exactly once,
//! so nothing downstream re-probes the raw payload.

use serde::Deserialize;
use serde_json::Value;

use crate::error::LinkError;
use crate::link::{Link, Verb, VerbSpec};
use crate::Result;

/// Properties searched for a link collection when none are configured
pub const DEFAULT_LINK_PROPERTIES: [&str; 2] = ["links", "_links"];

/// Map-shaped link entry: the rel lives in the key, not the value
#[derive(Deserialize)]
struct LinkDef {
    href: String,
    #[serde(default)]
    verbs: Vec<VerbSpec>,
}

/// Extract and normalize the link collection of a raw resource.
///
/// Fails with [`LinkError::MalformedResource`] when none of
/// `allowed_properties` is present on the payload.
pub fn extract_links(resource: &Value, allowed_properties: &[String]) -> Result<Vec<Link>> {
    let collection = allowed_properties
        .iter()
        .find_map(|prop| resource.get(prop))
        .ok_or_else(|| LinkError::MalformedResource(allowed_properties.join(", ")))?;

    match collection {
        Value::Array(items) => items
            .iter()
            .map(|item| {
                serde_json::from_value::<Link>(item.clone())
                    .map_err(|e| LinkError::MalformedResource(e.to_string()))
            })
            .collect(),
        Value::Object(map) => map
            .iter()
            .map(|(rel, def)| normalize_entry(rel, def))
            .collect(),
        other => Err(LinkError::MalformedResource(format!(
            "link collection must be an array or an object, got {other}"
        ))),
    }
}

fn normalize_entry(rel: &str, def: &Value) -> Result<Link> {
    // a bare string is shorthand for { href }
    if let Value::String(href) = def {
        return Ok(Link::new(rel, href.clone()));
    }

    let def: LinkDef = serde_json::from_value(def.clone())
        .map_err(|e| LinkError::MalformedResource(format!("link [{rel}]: {e}")))?;

    Ok(Link {
        rel: rel.to_string(),
        href: def.href,
        verbs: def.verbs,
    })
}

/// A resource whose link collection has been validated and normalized.
///
/// Construction clones the links out of the raw payload; the caller's value
/// is never mutated and never probed again after `parse`.
#[derive(Debug, Clone)]
pub struct LinkedResource {
    links: Vec<Link>,
}

impl LinkedResource {
    pub fn parse(resource: &Value, allowed_properties: &[String]) -> Result<Self> {
        Ok(Self {
            links: extract_links(resource, allowed_properties)?,
        })
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Find a link by relation.
    pub fn find(&self, rel: &str) -> Result<&Link> {
        self.links
            .iter()
            .find(|l| l.rel == rel)
            .ok_or_else(|| LinkError::UnknownRelation(rel.to_string()))
    }

    /// Resolve the link to follow for a given verb.
    ///
    /// Returns a clone; under `enforce_verbs` a link with a non-empty verb
    /// allow-list rejects verbs outside it, and the matched entry's
    /// querystring is appended to the returned href.
    pub fn link_for(&self, rel: &str, verb: Verb, enforce_verbs: bool) -> Result<Link> {
        let mut link = self.find(rel)?.clone();

        if enforce_verbs && link.is_restricted() {
            let querystring = link
                .verb_spec(verb)
                .map(|spec| spec.querystring.clone())
                .ok_or_else(|| LinkError::VerbNotAllowed {
                    rel: rel.to_string(),
                    verb: verb.as_str().to_string(),
                })?;
            if let Some(qs) = querystring {
                link.href.push_str(&qs);
            }
        }

        Ok(link)
    }
}

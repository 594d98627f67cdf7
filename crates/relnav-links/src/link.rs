//! Hyperlink model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// HTTP verb a link may be restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Post => "post",
            Verb::Put => "put",
            Verb::Delete => "delete",
        }
    }

    /// HTTP wire form (uppercase)
    pub fn as_method(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "get" => Ok(Verb::Get),
            "post" => Ok(Verb::Post),
            "put" => Ok(Verb::Put),
            "delete" => Ok(Verb::Delete),
            other => Err(format!("Unknown verb: {other}")),
        }
    }
}

/// Per-verb entry in a link's allow-list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerbSpec {
    pub verb: Verb,
    /// Extra querystring appended to the href when this verb is used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub querystring: Option<String>,
}

/// One hyperlink in a resource's link collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    /// URI, possibly containing `{placeholder}` template tokens
    pub href: String,
    /// Empty means no verb restriction
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verbs: Vec<VerbSpec>,
}

impl Link {
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
            verbs: Vec::new(),
        }
    }

    /// Find the allow-list entry for a verb, if the link declares one
    pub fn verb_spec(&self, verb: Verb) -> Option<&VerbSpec> {
        self.verbs.iter().find(|v| v.verb == verb)
    }

    /// Whether the link restricts the verbs it can be followed with
    pub fn is_restricted(&self) -> bool {
        !self.verbs.is_empty()
    }
}

//! Link resolution error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("Resource has no link collection (looked for: {0})")]
    MalformedResource(String),

    #[error("Unknown relation: {0}")]
    UnknownRelation(String),

    #[error("Verb [{verb}] is not allowed on relation [{rel}]")]
    VerbNotAllowed { rel: String, verb: String },
}

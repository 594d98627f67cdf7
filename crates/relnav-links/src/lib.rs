//! relnav link resolution
//!
//! Pure, stateless half of the navigation engine:
//! - extract and normalize a resource's hyperlink collection
//! - look up links by relation and enforce verb restrictions
//! - expand `{name}` URI templates from caller parameters

mod error;
mod link;
mod resource;
mod template;

pub use error::LinkError;
pub use link::{Link, Verb, VerbSpec};
pub use resource::{extract_links, LinkedResource, DEFAULT_LINK_PROPERTIES};
pub use template::{expand_uri, Params};

pub type Result<T> = std::result::Result<T, LinkError>;

//! Link header generation
//!
//! - [`resolver`]: finds the entity a response is about
//! - [`reference`]: `rel="related"` links from entity reference fields
//! - [`alternate`]: `rel="alternate"` links to REST serializations
//! - [`decorator`]: runs the three against a response

pub mod alternate;
pub mod decorator;
pub mod header;
pub mod reference;
pub mod resolver;

pub use alternate::AlternateLinkGenerator;
pub use decorator::{Collaborators, LinkHeaderDecorator, RequestContext};
pub use header::{LinkHeaderValue, LinkRelation};
pub use reference::ReferenceLinkGenerator;
pub use resolver::{ResponseHead, SubjectResolver};

//! Auth-domain identifiers, tenant credentials, scopes, and token models.

pub mod id;
pub mod scope;
pub mod tenant;
pub mod token;

pub use id::*;
pub use scope::*;
pub use tenant::*;
pub use token::{record::*, secret::*};

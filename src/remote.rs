//! Remote-API descriptors (data) and error classification (behavior).
//!
//! `endpoints` exposes validated base URLs for the credential, ticket, user-authorization,
//! and domain endpoints. `errcode` decodes the protocol's numeric `errcode` values and defines
//! [`ErrorClassifier`], the hook that maps them into the semantic kinds the token guard acts on.

pub mod endpoints;
pub mod errcode;

pub use endpoints::*;
pub use errcode::*;

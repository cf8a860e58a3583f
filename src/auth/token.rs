//! Cached token records and the redacting secret wrapper they share.

pub mod record;
pub mod secret;

//! Claims collaborator: at-most-one claim per fund and per photo, plus
//! community verification votes.
//!
//! Image handling stays with the caller, which supplies the photo's
//! perceptual fingerprint and any GPS fix it extracted.

pub mod error;
pub mod store;
pub mod types;

pub use error::ClaimError;
pub use store::ClaimsStore;
pub use types::*;

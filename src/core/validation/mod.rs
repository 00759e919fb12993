//! Request validation
//!
//! Request bodies derive [`validator::Validate`] and are extracted with
//! [`ValidatedJson`], so handlers only ever see well-formed input. Path ids and
//! free-text fields go through the helpers in [`validators`].

pub mod extractor;
pub mod validators;

pub use extractor::{ParsedQuery, ValidatedJson};
pub use validators::{not_blank, parse_id, require_text};

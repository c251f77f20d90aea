//! The plaintext wire protocol: request decoding and response rendering.
//!
//! Requests and responses are newline-delimited, one line each way. A
//! request line decodes into a typed [`Command`] exactly once at the
//! boundary; everything past this module operates on commands, never raw
//! text. Responses render to plain text through [`Response`]'s `Display`.

pub mod command;
pub mod response;

pub use command::{Command, ParseError};
pub use response::Response;

//! TwiML voice response documents for the Lifeline call flow.
//!
//! A [`VoiceResponse`] is an ordered list of [`Verb`]s that tells the
//! telephony provider what to say, which input to gather, and where to
//! transfer the call. Documents are assembled with a small builder API and
//! serialized with [`VoiceResponse::to_xml`]. All text and attribute values
//! are escaped, so any input string yields a well-formed document.
//!
//! [`VoiceResponse::parse`] reads the same dialect back. It is strict: only
//! the verbs and attributes this crate can emit are accepted.

pub mod error;
mod escape;
mod parse;
pub mod response;

pub use error::TwimlError;
pub use response::{Gather, GatherInput, Method, SpeechTimeout, Verb, VoiceResponse};

/// Content type the provider expects on every webhook response.
pub const CONTENT_TYPE: &str = "text/xml";

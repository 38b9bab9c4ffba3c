//! Error types for reading TwiML documents.

/// Errors that can occur while parsing a TwiML document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TwimlError {
    /// The document ended inside an element, attribute or declaration.
    #[error("unexpected end of document")]
    UnexpectedEof,

    /// The reader found something other than what the grammar allows.
    #[error("syntax error at byte {offset}: expected {expected}")]
    Syntax {
        offset: usize,
        expected: &'static str,
    },

    /// A closing tag does not match the element it closes.
    #[error("closing tag </{close}> does not match <{open}>")]
    MismatchedTag { open: String, close: String },

    /// Content follows the root element.
    #[error("trailing content at byte {0}")]
    TrailingContent(usize),

    /// An entity reference that is neither predefined nor a valid character reference.
    #[error("unknown entity: &{0};")]
    UnknownEntity(String),

    /// An element that is not a verb, or a verb nested where it is not allowed.
    #[error("unexpected element <{name}> inside <{parent}>")]
    UnexpectedElement { name: String, parent: String },

    /// Non-whitespace text where only verbs are allowed.
    #[error("unexpected text inside <{0}>")]
    UnexpectedText(String),

    /// An unknown attribute, or a known attribute with an unparsable value.
    #[error("invalid attribute {name}=\"{value}\" on <{element}>")]
    InvalidAttribute {
        element: String,
        name: String,
        value: String,
    },
}

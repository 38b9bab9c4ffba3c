//! Voice response document model and serialization.

use crate::error::TwimlError;
use crate::escape::{write_escaped, write_escaped_attribute};
use crate::parse::{parse_document, Element, Node};
use std::fmt::{self, Write};
use std::str::FromStr;

const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// HTTP method the provider uses when posting gathered input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl FromStr for Method {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            _ => Err(()),
        }
    }
}

/// Which kind of caller input a [`Gather`] collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatherInput {
    Speech,
    /// Keypad digits.
    Dtmf,
    DtmfSpeech,
}

impl GatherInput {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Speech => "speech",
            Self::Dtmf => "dtmf",
            Self::DtmfSpeech => "dtmf speech",
        }
    }
}

impl FromStr for GatherInput {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "speech" => Ok(Self::Speech),
            "dtmf" => Ok(Self::Dtmf),
            "dtmf speech" | "speech dtmf" => Ok(Self::DtmfSpeech),
            _ => Err(()),
        }
    }
}

/// How long the provider waits after the caller stops speaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechTimeout {
    /// Let the provider's end-of-speech detection decide.
    Auto,
    Seconds(u32),
}

impl fmt::Display for SpeechTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Seconds(secs) => write!(f, "{secs}"),
        }
    }
}

impl FromStr for SpeechTimeout {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "auto" {
            Ok(Self::Auto)
        } else {
            s.parse().map(Self::Seconds).map_err(|_| ())
        }
    }
}

/// A single instruction in a voice response document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    /// Speak text to the caller.
    Say(String),
    /// Stay silent for `length` seconds.
    Pause { length: u32 },
    /// Collect caller input and post it to another webhook.
    Gather(Gather),
    /// Transfer the call to a phone number.
    Dial(String),
}

/// Configuration and nested prompts of a `<Gather>` verb.
///
/// Only [`Verb::Say`] and [`Verb::Pause`] may be nested; the builder methods
/// enforce this and [`VoiceResponse::parse`] rejects anything else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Gather {
    pub action: Option<String>,
    pub method: Option<Method>,
    /// Seconds of silence before the gather ends.
    pub timeout: Option<u32>,
    pub speech_timeout: Option<SpeechTimeout>,
    pub input: Option<GatherInput>,
    pub num_digits: Option<u32>,
    pub verbs: Vec<Verb>,
}

impl Gather {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn timeout(mut self, seconds: u32) -> Self {
        self.timeout = Some(seconds);
        self
    }

    pub fn speech_timeout(mut self, speech_timeout: SpeechTimeout) -> Self {
        self.speech_timeout = Some(speech_timeout);
        self
    }

    pub fn input(mut self, input: GatherInput) -> Self {
        self.input = Some(input);
        self
    }

    pub fn num_digits(mut self, digits: u32) -> Self {
        self.num_digits = Some(digits);
        self
    }

    /// Adds a prompt spoken while the gather is listening.
    pub fn say(mut self, text: impl Into<String>) -> Self {
        self.verbs.push(Verb::Say(text.into()));
        self
    }

    pub fn pause(mut self, length: u32) -> Self {
        self.verbs.push(Verb::Pause { length });
        self
    }

    fn write_attributes<W: Write>(&self, out: &mut W) -> fmt::Result {
        if let Some(action) = &self.action {
            write_attribute(out, "action", action)?;
        }
        if let Some(method) = self.method {
            write_attribute(out, "method", method.as_str())?;
        }
        if let Some(timeout) = self.timeout {
            write_attribute(out, "timeout", &timeout.to_string())?;
        }
        if let Some(speech_timeout) = self.speech_timeout {
            write_attribute(out, "speechTimeout", &speech_timeout.to_string())?;
        }
        if let Some(input) = self.input {
            write_attribute(out, "input", input.as_str())?;
        }
        if let Some(num_digits) = self.num_digits {
            write_attribute(out, "numDigits", &num_digits.to_string())?;
        }
        Ok(())
    }

    fn from_element(el: &Element) -> Result<Self, TwimlError> {
        let mut gather = Gather::new();
        for (name, value) in &el.attrs {
            let invalid = || invalid_attribute(el, name, value);
            match name.as_str() {
                "action" => gather.action = Some(value.clone()),
                "method" => gather.method = Some(value.parse().map_err(|_| invalid())?),
                "timeout" => gather.timeout = Some(value.parse().map_err(|_| invalid())?),
                "speechTimeout" => {
                    gather.speech_timeout = Some(value.parse().map_err(|_| invalid())?)
                }
                "input" => gather.input = Some(value.parse().map_err(|_| invalid())?),
                "numDigits" => gather.num_digits = Some(value.parse().map_err(|_| invalid())?),
                _ => return Err(invalid()),
            }
        }
        gather.verbs = verbs_from(el, true)?;
        Ok(gather)
    }
}

/// An ordered TwiML `<Response>` document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceResponse {
    verbs: Vec<Verb>,
}

impl VoiceResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn say(mut self, text: impl Into<String>) -> Self {
        self.verbs.push(Verb::Say(text.into()));
        self
    }

    pub fn pause(mut self, length: u32) -> Self {
        self.verbs.push(Verb::Pause { length });
        self
    }

    pub fn gather(mut self, gather: Gather) -> Self {
        self.verbs.push(Verb::Gather(gather));
        self
    }

    /// Transfers the call. An empty number still produces a well-formed
    /// `<Dial></Dial>`; the provider rejects it at call time.
    pub fn dial(mut self, number: impl Into<String>) -> Self {
        self.verbs.push(Verb::Dial(number.into()));
        self
    }

    pub fn verbs(&self) -> &[Verb] {
        &self.verbs
    }

    /// Serializes the document, including the XML declaration.
    pub fn to_xml(&self) -> String {
        self.to_string()
    }

    /// Parses a document produced by [`VoiceResponse::to_xml`] (or any
    /// document restricted to the same verbs and attributes).
    ///
    /// # Errors
    ///
    /// Returns [`TwimlError`] on malformed XML, unknown elements or
    /// attributes, and misplaced text.
    pub fn parse(input: &str) -> Result<Self, TwimlError> {
        let root = parse_document(input)?;
        if root.name != "Response" {
            return Err(TwimlError::UnexpectedElement {
                name: root.name,
                parent: "document".to_string(),
            });
        }
        if let Some((name, value)) = root.attrs.first() {
            return Err(invalid_attribute(&root, name, value));
        }
        Ok(Self {
            verbs: verbs_from(&root, false)?,
        })
    }
}

impl fmt::Display for VoiceResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(DECLARATION)?;
        f.write_str("<Response>")?;
        for verb in &self.verbs {
            write_verb(f, verb)?;
        }
        f.write_str("</Response>")
    }
}

fn write_attribute<W: Write>(out: &mut W, name: &str, value: &str) -> fmt::Result {
    write!(out, " {name}=\"")?;
    write_escaped_attribute(out, value)?;
    out.write_char('"')
}

fn write_verb<W: Write>(out: &mut W, verb: &Verb) -> fmt::Result {
    match verb {
        Verb::Say(text) => {
            out.write_str("<Say>")?;
            write_escaped(out, text)?;
            out.write_str("</Say>")
        }
        Verb::Pause { length } => write!(out, "<Pause length=\"{length}\"/>"),
        Verb::Gather(gather) => {
            out.write_str("<Gather")?;
            gather.write_attributes(out)?;
            out.write_char('>')?;
            for nested in &gather.verbs {
                write_verb(out, nested)?;
            }
            out.write_str("</Gather>")
        }
        Verb::Dial(number) => {
            out.write_str("<Dial>")?;
            write_escaped(out, number)?;
            out.write_str("</Dial>")
        }
    }
}

fn invalid_attribute(el: &Element, name: &str, value: &str) -> TwimlError {
    TwimlError::InvalidAttribute {
        element: el.name.clone(),
        name: name.to_string(),
        value: value.to_string(),
    }
}

fn verbs_from(parent: &Element, in_gather: bool) -> Result<Vec<Verb>, TwimlError> {
    let mut verbs = Vec::new();
    for child in &parent.children {
        match child {
            Node::Text(text) if text.trim().is_empty() => {}
            Node::Text(_) => return Err(TwimlError::UnexpectedText(parent.name.clone())),
            Node::Element(el) => verbs.push(verb_from(el, &parent.name, in_gather)?),
        }
    }
    Ok(verbs)
}

fn verb_from(el: &Element, parent: &str, in_gather: bool) -> Result<Verb, TwimlError> {
    match el.name.as_str() {
        "Say" => {
            reject_attributes(el)?;
            Ok(Verb::Say(el.text()?))
        }
        "Pause" => {
            let mut length = 1;
            for (name, value) in &el.attrs {
                if name != "length" {
                    return Err(invalid_attribute(el, name, value));
                }
                length = value
                    .parse()
                    .map_err(|_| invalid_attribute(el, name, value))?;
            }
            if !el.text()?.trim().is_empty() {
                return Err(TwimlError::UnexpectedText(el.name.clone()));
            }
            Ok(Verb::Pause { length })
        }
        "Gather" if !in_gather => Ok(Verb::Gather(Gather::from_element(el)?)),
        "Dial" if !in_gather => {
            reject_attributes(el)?;
            Ok(Verb::Dial(el.text()?))
        }
        _ => Err(TwimlError::UnexpectedElement {
            name: el.name.clone(),
            parent: parent.to_string(),
        }),
    }
}

fn reject_attributes(el: &Element) -> Result<(), TwimlError> {
    match el.attrs.first() {
        Some((name, value)) => Err(invalid_attribute(el, name, value)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_response_has_declaration_and_root() {
        assert_eq!(
            VoiceResponse::new().to_xml(),
            r#"<?xml version="1.0" encoding="UTF-8"?><Response></Response>"#
        );
    }

    #[test]
    fn serializes_verbs_in_order() {
        let xml = VoiceResponse::new()
            .say("Hello")
            .pause(1)
            .gather(
                Gather::new()
                    .action("/next")
                    .method(Method::Post)
                    .timeout(10)
                    .speech_timeout(SpeechTimeout::Auto)
                    .input(GatherInput::Speech)
                    .say("Speak now"),
            )
            .dial("+15551234567")
            .to_xml();

        assert_eq!(
            xml,
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8"?><Response>"#,
                "<Say>Hello</Say>",
                r#"<Pause length="1"/>"#,
                r#"<Gather action="/next" method="POST" timeout="10" speechTimeout="auto" input="speech">"#,
                "<Say>Speak now</Say></Gather>",
                "<Dial>+15551234567</Dial>",
                "</Response>"
            )
        );
    }

    #[test]
    fn escapes_text_and_attributes() {
        let xml = VoiceResponse::new()
            .say(r#"Tom & Jerry's "<shelter>""#)
            .gather(Gather::new().action("/next?a=1&b=2"))
            .to_xml();

        assert!(xml.contains("<Say>Tom &amp; Jerry&apos;s &quot;&lt;shelter&gt;&quot;</Say>"));
        assert!(xml.contains(r#"action="/next?a=1&amp;b=2""#));
    }

    #[test]
    fn empty_dial_is_still_well_formed() {
        let response = VoiceResponse::new().dial("");
        assert!(response.to_xml().ends_with("<Dial></Dial></Response>"));
        assert_eq!(VoiceResponse::parse(&response.to_xml()).unwrap(), response);
    }

    #[test]
    fn parse_defaults_pause_length() {
        let parsed = VoiceResponse::parse("<Response><Pause/></Response>").unwrap();
        assert_eq!(parsed.verbs(), &[Verb::Pause { length: 1 }]);
    }

    #[test]
    fn parse_rejects_nested_gather_and_dial() {
        let err = VoiceResponse::parse("<Response><Gather><Dial>1</Dial></Gather></Response>")
            .unwrap_err();
        assert_eq!(
            err,
            TwimlError::UnexpectedElement {
                name: "Dial".to_string(),
                parent: "Gather".to_string()
            }
        );
        assert!(VoiceResponse::parse("<Response><Gather><Gather/></Gather></Response>").is_err());
    }

    #[test]
    fn parse_rejects_unknown_verbs_and_attributes() {
        assert!(matches!(
            VoiceResponse::parse("<Response><Play>x</Play></Response>"),
            Err(TwimlError::UnexpectedElement { .. })
        ));
        assert!(matches!(
            VoiceResponse::parse(r#"<Response><Say voice="alice">x</Say></Response>"#),
            Err(TwimlError::InvalidAttribute { .. })
        ));
        assert!(matches!(
            VoiceResponse::parse(r#"<Response><Gather numDigits="one"/></Response>"#),
            Err(TwimlError::InvalidAttribute { .. })
        ));
        assert!(matches!(
            VoiceResponse::parse("<Response>stray</Response>"),
            Err(TwimlError::UnexpectedText(_))
        ));
    }

    #[test]
    fn parse_requires_response_root() {
        assert_eq!(
            VoiceResponse::parse("<Say>x</Say>").unwrap_err(),
            TwimlError::UnexpectedElement {
                name: "Say".to_string(),
                parent: "document".to_string()
            }
        );
    }
}

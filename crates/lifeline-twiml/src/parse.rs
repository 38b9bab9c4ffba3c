//! Minimal XML reader for the TwiML subset.
//!
//! Supports an optional `<?xml ... ?>` declaration, elements, quoted
//! attributes, self-closing tags, text and entity references. Comments,
//! CDATA sections, processing instructions inside the body and DOCTYPE
//! declarations are not part of the dialect and are rejected as syntax errors.

use crate::error::TwimlError;
use crate::escape::unescape;

/// Deepest element nesting the dialect uses: `Response` > `Gather` > `Say`.
const MAX_DEPTH: usize = 3;

#[derive(Debug)]
pub(crate) struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

#[derive(Debug)]
pub(crate) enum Node {
    Element(Element),
    Text(String),
}

impl Element {
    /// Concatenated text content. Fails if any child is an element.
    pub fn text(&self) -> Result<String, TwimlError> {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(text),
                Node::Element(el) => {
                    return Err(TwimlError::UnexpectedElement {
                        name: el.name.clone(),
                        parent: self.name.clone(),
                    })
                }
            }
        }
        Ok(out)
    }
}

struct Reader<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Reader<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &'static str) -> Result<(), TwimlError> {
        if self.eat(token) {
            Ok(())
        } else if self.rest().is_empty() {
            Err(TwimlError::UnexpectedEof)
        } else {
            Err(TwimlError::Syntax {
                offset: self.pos,
                expected: token,
            })
        }
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start_matches(|c: char| c.is_ascii_whitespace());
        self.pos = self.input.len() - trimmed.len();
    }

    fn name(&mut self) -> Result<&'a str, TwimlError> {
        let rest = self.rest();
        let end = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')))
            .unwrap_or(rest.len());
        if end == 0 {
            return if rest.is_empty() {
                Err(TwimlError::UnexpectedEof)
            } else {
                Err(TwimlError::Syntax {
                    offset: self.pos,
                    expected: "a name",
                })
            };
        }
        self.pos += end;
        Ok(&rest[..end])
    }

    fn attribute_value(&mut self) -> Result<String, TwimlError> {
        let quote = if self.eat("\"") {
            '"'
        } else if self.eat("'") {
            '\''
        } else {
            return Err(TwimlError::Syntax {
                offset: self.pos,
                expected: "a quoted attribute value",
            });
        };
        let rest = self.rest();
        let end = rest.find(quote).ok_or(TwimlError::UnexpectedEof)?;
        let raw = &rest[..end];
        if raw.contains('<') {
            return Err(TwimlError::Syntax {
                offset: self.pos + raw.find('<').unwrap_or(0),
                expected: "an attribute value without '<'",
            });
        }
        let value = unescape(raw)?;
        self.pos += end + quote.len_utf8();
        Ok(value)
    }

    /// Reads one element at nesting level `depth` (the root is level 1).
    fn element(&mut self, depth: usize) -> Result<Element, TwimlError> {
        self.expect("<")?;
        let name = self.name()?.to_string();
        let mut attrs = Vec::new();

        loop {
            self.skip_whitespace();
            if self.eat("/>") {
                return Ok(Element {
                    name,
                    attrs,
                    children: Vec::new(),
                });
            }
            if self.eat(">") {
                break;
            }
            let key = self.name()?.to_string();
            self.skip_whitespace();
            self.expect("=")?;
            self.skip_whitespace();
            let value = self.attribute_value()?;
            attrs.push((key, value));
        }

        let mut children = Vec::new();
        loop {
            if self.rest().is_empty() {
                return Err(TwimlError::UnexpectedEof);
            }
            if self.eat("</") {
                let close = self.name()?;
                if close != name {
                    return Err(TwimlError::MismatchedTag {
                        open: name,
                        close: close.to_string(),
                    });
                }
                self.skip_whitespace();
                self.expect(">")?;
                return Ok(Element {
                    name,
                    attrs,
                    children,
                });
            }
            if self.rest().starts_with('<') {
                if depth >= MAX_DEPTH {
                    self.pos += 1;
                    return Err(TwimlError::UnexpectedElement {
                        name: self.name()?.to_string(),
                        parent: name,
                    });
                }
                children.push(Node::Element(self.element(depth + 1)?));
            } else {
                let rest = self.rest();
                let end = rest.find('<').unwrap_or(rest.len());
                children.push(Node::Text(unescape(&rest[..end])?));
                self.pos += end;
            }
        }
    }
}

/// Reads a whole document and returns its root element.
pub(crate) fn parse_document(input: &str) -> Result<Element, TwimlError> {
    let mut reader = Reader { input, pos: 0 };
    reader.skip_whitespace();
    if reader.eat("<?xml") {
        let end = reader.rest().find("?>").ok_or(TwimlError::UnexpectedEof)?;
        reader.pos += end + 2;
        reader.skip_whitespace();
    }

    let root = reader.element(1)?;
    reader.skip_whitespace();
    if !reader.rest().is_empty() {
        return Err(TwimlError::TrailingContent(reader.pos));
    }
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_nested_elements_and_attributes() {
        let root = parse_document(
            r#"<?xml version="1.0"?>
            <Response><Gather action='/next' input="speech"><Say>hi</Say></Gather><Pause/></Response>"#,
        )
        .unwrap();

        assert_eq!(root.name, "Response");
        assert_eq!(root.children.len(), 2);
        let Node::Element(gather) = &root.children[0] else {
            panic!("expected element");
        };
        assert_eq!(
            gather.attrs,
            vec![
                ("action".to_string(), "/next".to_string()),
                ("input".to_string(), "speech".to_string())
            ]
        );
        let Node::Element(say) = &gather.children[0] else {
            panic!("expected element");
        };
        assert_eq!(say.text().unwrap(), "hi");
    }

    #[test]
    fn rejects_mismatched_and_unterminated_tags() {
        assert_eq!(
            parse_document("<Response><Say>x</Dial></Response>").unwrap_err(),
            TwimlError::MismatchedTag {
                open: "Say".to_string(),
                close: "Dial".to_string()
            }
        );
        assert_eq!(
            parse_document("<Response><Say>x").unwrap_err(),
            TwimlError::UnexpectedEof
        );
    }

    #[test]
    fn rejects_trailing_content() {
        assert!(matches!(
            parse_document("<Response/><Response/>"),
            Err(TwimlError::TrailingContent(_))
        ));
    }

    #[test]
    fn rejects_nesting_deeper_than_the_dialect() {
        let deep = format!(
            "<Response>{}{}</Response>",
            "<a>".repeat(200_000),
            "</a>".repeat(200_000)
        );
        assert_eq!(
            parse_document(&deep).unwrap_err(),
            TwimlError::UnexpectedElement {
                name: "a".to_string(),
                parent: "a".to_string()
            }
        );

        assert_eq!(
            parse_document("<Response><Gather><Say><b>x</b></Say></Gather></Response>")
                .unwrap_err(),
            TwimlError::UnexpectedElement {
                name: "b".to_string(),
                parent: "Say".to_string()
            }
        );
        assert!(parse_document("<Response><Gather><Pause/></Gather></Response>").is_ok());
    }

    #[test]
    fn rejects_raw_markup_in_text_positions() {
        assert!(parse_document("<Response><Say>a & b</Say></Response>").is_err());
        assert!(parse_document(r#"<Response><Gather action="<x"/></Response>"#).is_err());
    }
}

use crate::error::TwimlError;
use std::fmt::{self, Write};

/// Returns `true` for characters allowed by the XML 1.0 `Char` production.
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Writes text content with markup characters replaced by entities.
///
/// `\r` is written as a character reference so XML line-end normalization
/// does not turn it into `\n`. Characters that XML 1.0 cannot represent at
/// all are dropped.
pub(crate) fn write_escaped<W: Write>(out: &mut W, value: &str) -> fmt::Result {
    escape_into(out, value, false)
}

/// Like [`write_escaped`], for double-quoted attribute values.
///
/// Tab and newline are referenced too, since attribute-value normalization
/// would otherwise replace them with spaces.
pub(crate) fn write_escaped_attribute<W: Write>(out: &mut W, value: &str) -> fmt::Result {
    escape_into(out, value, true)
}

fn escape_into<W: Write>(out: &mut W, value: &str, attribute: bool) -> fmt::Result {
    for c in value.chars() {
        match c {
            '&' => out.write_str("&amp;")?,
            '<' => out.write_str("&lt;")?,
            '>' => out.write_str("&gt;")?,
            '"' => out.write_str("&quot;")?,
            '\'' => out.write_str("&apos;")?,
            '\r' => out.write_str("&#13;")?,
            '\t' if attribute => out.write_str("&#9;")?,
            '\n' if attribute => out.write_str("&#10;")?,
            c if is_xml_char(c) => out.write_char(c)?,
            _ => {}
        }
    }
    Ok(())
}

/// Resolves entity and character references in raw text or attribute content.
pub(crate) fn unescape(raw: &str) -> Result<String, TwimlError> {
    if !raw.contains('&') {
        return Ok(raw.to_string());
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let semi = after.find(';').ok_or(TwimlError::UnexpectedEof)?;
        let entity = &after[..semi];
        out.push(resolve_entity(entity)?);
        rest = &after[semi + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn resolve_entity(entity: &str) -> Result<char, TwimlError> {
    let unknown = || TwimlError::UnknownEntity(entity.to_string());
    match entity {
        "amp" => Ok('&'),
        "lt" => Ok('<'),
        "gt" => Ok('>'),
        "quot" => Ok('"'),
        "apos" => Ok('\''),
        _ => {
            let code = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).map_err(|_| unknown())?
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().map_err(|_| unknown())?
            } else {
                return Err(unknown());
            };
            char::from_u32(code)
                .filter(|c| is_xml_char(*c))
                .ok_or_else(unknown)
        }
    }
}

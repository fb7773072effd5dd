// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP file tokenizer using nom combinators
//!
//! Parses STEP/IFC entity definitions and header records into tokens, and
//! decodes the ISO 10303-21 string escapes (`''`, `\X2\...\X0\`, `\X\hh`, `\S\c`).

use ifcore_model::{AttributeValue, DecodedEntity, EntityId, IfcType};
use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::char,
    combinator::{opt, recognize},
    multi::separated_list0,
    sequence::{delimited, pair},
    IResult, Parser,
};

/// Raw token from STEP file (before conversion to AttributeValue)
#[derive(Clone, Debug, PartialEq)]
pub enum Token<'a> {
    /// Entity reference (#123)
    EntityRef(u32),
    /// String value, still escaped as written in the file
    String(&'a str),
    /// Integer value
    Integer(i64),
    /// Float value
    Float(f64),
    /// Enumeration (.VALUE.)
    Enum(&'a str),
    /// List of tokens
    List(Vec<Token<'a>>),
    /// Typed value like IFCLABEL('text')
    TypedValue(&'a str, Vec<Token<'a>>),
    /// Null value ($)
    Null,
    /// Derived value (*)
    Derived,
}

impl<'a> Token<'a> {
    /// Convert token to owned AttributeValue, decoding string escapes
    pub fn to_attribute_value(&self) -> AttributeValue {
        match self {
            Token::EntityRef(id) => AttributeValue::EntityRef(EntityId(*id)),
            Token::String(s) => AttributeValue::String(decode_step_string(s)),
            Token::Integer(i) => AttributeValue::Integer(*i),
            Token::Float(f) => AttributeValue::Float(*f),
            Token::Enum(s) => AttributeValue::Enum((*s).to_string()),
            Token::List(items) => {
                AttributeValue::List(items.iter().map(|t| t.to_attribute_value()).collect())
            }
            Token::TypedValue(name, args) => AttributeValue::TypedValue(
                name.to_ascii_uppercase(),
                args.iter().map(|t| t.to_attribute_value()).collect(),
            ),
            Token::Null => AttributeValue::Null,
            Token::Derived => AttributeValue::Derived,
        }
    }
}

// ============================================================================
// String Decoding
// ============================================================================

/// Decode a raw STEP string body into Unicode text
///
/// Room names such as `Ba\X2\00F1\X0\o` arrive here as "Baño". Malformed
/// escapes are kept literally.
pub fn decode_step_string(raw: &str) -> String {
    if !raw.contains('\\') && !raw.contains("''") {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(c) = rest.chars().next() {
        if rest.starts_with("''") {
            out.push('\'');
            rest = &rest[2..];
        } else if c == '\\' {
            match decode_escape(rest) {
                Some((decoded, consumed)) => {
                    out.push_str(&decoded);
                    rest = &rest[consumed..];
                }
                None => {
                    out.push('\\');
                    rest = &rest[1..];
                }
            }
        } else {
            out.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }

    out
}

/// Decode one escape at the start of `s`, returning the text and bytes consumed
fn decode_escape(s: &str) -> Option<(String, usize)> {
    if let Some(body) = s.strip_prefix("\\X2\\") {
        let end = body.find("\\X0\\")?;
        let units = hex_units(&body[..end], 4)?
            .into_iter()
            .map(|u| u as u16)
            .collect::<Vec<_>>();
        let text = char::decode_utf16(units)
            .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect();
        return Some((text, 4 + end + 4));
    }

    if let Some(body) = s.strip_prefix("\\X4\\") {
        let end = body.find("\\X0\\")?;
        let text = hex_units(&body[..end], 8)?
            .into_iter()
            .map(|u| char::from_u32(u).unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect();
        return Some((text, 4 + end + 4));
    }

    if let Some(body) = s.strip_prefix("\\X\\") {
        let byte = u8::from_str_radix(body.get(..2)?, 16).ok()?;
        return Some((char::from(byte).to_string(), 5));
    }

    if let Some(body) = s.strip_prefix("\\S\\") {
        let c = body.chars().next().filter(char::is_ascii)?;
        return Some((char::from(c as u8 + 0x80).to_string(), 4));
    }

    if s.starts_with("\\\\") {
        return Some(("\\".to_string(), 2));
    }

    // Code page switch (\PA\ .. \PI\): affects \S\ only, which we map to Latin-1
    if s.len() >= 4 && s.starts_with("\\P") && s.as_bytes()[3] == b'\\' {
        return Some((String::new(), 4));
    }

    None
}

fn hex_units(hex: &str, width: usize) -> Option<Vec<u32>> {
    if hex.is_empty() || hex.len() % width != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(width)
        .map(|i| u32::from_str_radix(hex.get(i..i + width)?, 16).ok())
        .collect()
}

// ============================================================================
// Parsing Primitives
// ============================================================================

/// Skip whitespace and `/* ... */` comments
fn ws(input: &str) -> IResult<&str, ()> {
    let mut rest = input.trim_start();
    while let Some(body) = rest.strip_prefix("/*") {
        match body.find("*/") {
            Some(end) => rest = body[end + 2..].trim_start(),
            None => break,
        }
    }
    Ok((rest, ()))
}

/// Parse an entity reference (#123)
fn entity_ref(input: &str) -> IResult<&str, Token<'_>> {
    let (input, _) = char('#')(input)?;
    let (input, digits) = take_while1(|c: char| c.is_ascii_digit())(input)?;
    let id = digits.parse::<u32>().unwrap_or(0);
    Ok((input, Token::EntityRef(id)))
}

/// Parse a STEP string ('text' with '' for escaped quotes)
fn step_string(input: &str) -> IResult<&str, Token<'_>> {
    let (input, _) = char('\'')(input)?;

    let bytes = input.as_bytes();
    let mut end = 0;
    while end < bytes.len() {
        if bytes[end] == b'\'' {
            if bytes.get(end + 1) == Some(&b'\'') {
                end += 2;
                continue;
            }
            break;
        }
        end += 1;
    }

    if end >= bytes.len() {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )));
    }

    Ok((&input[end + 1..], Token::String(&input[..end])))
}

/// Parse a number (integer or float)
fn number(input: &str) -> IResult<&str, Token<'_>> {
    let (input, num_str) = recognize((
        opt(alt((char('-'), char('+')))),
        take_while1(|c: char| c.is_ascii_digit()),
        opt(pair(char('.'), take_while(|c: char| c.is_ascii_digit()))),
        opt((
            alt((char('e'), char('E'))),
            opt(alt((char('+'), char('-')))),
            take_while1(|c: char| c.is_ascii_digit()),
        )),
    ))
    .parse(input)?;

    let digits = num_str.trim_start_matches('+');
    if digits.contains(['.', 'e', 'E']) {
        // lexical-core rejects a bare trailing dot ("2."), which STEP allows
        let f: f64 = lexical_core::parse(digits.as_bytes())
            .ok()
            .or_else(|| digits.parse().ok())
            .unwrap_or(0.0);
        Ok((input, Token::Float(f)))
    } else {
        let i: i64 = lexical_core::parse(digits.as_bytes()).unwrap_or(0);
        Ok((input, Token::Integer(i)))
    }
}

/// Parse an enumeration (.VALUE.)
fn enumeration(input: &str) -> IResult<&str, Token<'_>> {
    let (input, _) = char('.')(input)?;
    let (input, name) = take_while1(|c: char| c.is_alphanumeric() || c == '_')(input)?;
    let (input, _) = char('.')(input)?;
    Ok((input, Token::Enum(name)))
}

/// Parse null ($)
fn null_value(input: &str) -> IResult<&str, Token<'_>> {
    let (input, _) = char('$')(input)?;
    Ok((input, Token::Null))
}

/// Parse derived (*)
fn derived_value(input: &str) -> IResult<&str, Token<'_>> {
    let (input, _) = char('*')(input)?;
    Ok((input, Token::Derived))
}

/// Parse a parenthesised, comma separated token list
fn token_list(input: &str) -> IResult<&str, Vec<Token<'_>>> {
    delimited(
        pair(char('('), ws),
        separated_list0((ws, char(','), ws), token),
        pair(ws, char(')')),
    )
    .parse(input)
}

fn list(input: &str) -> IResult<&str, Token<'_>> {
    let (input, items) = token_list(input)?;
    Ok((input, Token::List(items)))
}

/// Parse a typed value like IFCLABEL('text')
fn typed_value(input: &str) -> IResult<&str, Token<'_>> {
    let (input, type_name) = keyword(input)?;
    let (input, _) = ws(input)?;
    let (input, args) = token_list(input)?;
    Ok((input, Token::TypedValue(type_name, args)))
}

fn keyword(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_')(input)
}

/// Parse any token
fn token(input: &str) -> IResult<&str, Token<'_>> {
    alt((
        entity_ref,
        step_string,
        null_value,
        derived_value,
        enumeration,
        number,
        list,
        typed_value,
    ))
    .parse(input)
}

// ============================================================================
// Entity and Header Parsing
// ============================================================================

/// Parse a complete entity definition
///
/// Format: `#123=IFCWALL(attr1,attr2,...);`
pub fn parse_entity(input: &str) -> Result<DecodedEntity, String> {
    let input = input.trim_start();

    let (input, _) = char::<&str, nom::error::Error<&str>>('#')
        .parse(input)
        .map_err(|_| "Expected # at start of entity")?;

    let (input, id_str) =
        take_while1::<_, &str, nom::error::Error<&str>>(|c: char| c.is_ascii_digit())
            .parse(input)
            .map_err(|_| "Expected entity ID")?;

    let id: u32 = id_str.parse().map_err(|_| "Invalid entity ID")?;

    let (input, _) = (ws, char('='), ws)
        .parse(input)
        .map_err(|_: nom::Err<nom::error::Error<&str>>| "Expected = after entity ID")?;

    let (input, type_name) = keyword(input).map_err(|_| "Expected type name")?;
    let (input, _) = ws(input).map_err(|_| "Expected attribute list")?;

    let (_, tokens) =
        token_list(input).map_err(|e| format!("Failed to parse attributes: {:?}", e))?;

    Ok(DecodedEntity {
        id: EntityId(id),
        ifc_type: IfcType::parse(type_name),
        attributes: tokens.iter().map(|t| t.to_attribute_value()).collect(),
    })
}

/// Parse entity from the byte range reported by the scanner
pub fn parse_entity_at(content: &str, start: usize, end: usize) -> Result<DecodedEntity, String> {
    let slice = content
        .get(start..end)
        .ok_or_else(|| format!("Entity range {}..{} out of bounds", start, end))?;
    parse_entity(slice)
}

/// Parse a header record such as `FILE_NAME('a.ifc', ...);`
///
/// Returns the uppercase keyword and its argument tokens.
pub fn parse_header_record(input: &str) -> Option<(String, Vec<Token<'_>>)> {
    let (input, _) = ws(input).ok()?;
    let (input, name) = keyword(input).ok()?;
    let (input, _) = ws(input).ok()?;
    let (_, args) = token_list(input).ok()?;
    Some((name.to_ascii_uppercase(), args))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entity_ref() {
        let (remaining, token) = entity_ref("#123").unwrap();
        assert_eq!(remaining, "");
        assert_eq!(token, Token::EntityRef(123));
    }

    #[test]
    fn test_parse_string_with_escaped_quote() {
        let (remaining, token) = step_string("'it''s a test', $").unwrap();
        assert_eq!(remaining, ", $");
        assert_eq!(token, Token::String("it''s a test"));
        assert_eq!(
            token.to_attribute_value(),
            AttributeValue::String("it's a test".to_string())
        );
    }

    #[test]
    fn test_unterminated_string_is_error() {
        assert!(step_string("'never closed").is_err());
    }

    #[test]
    fn test_decode_unicode_escapes() {
        assert_eq!(decode_step_string("Ba\\X2\\00F1\\X0\\o"), "Baño");
        assert_eq!(decode_step_string("Habitaci\\X2\\00F3\\X0\\n 1"), "Habitación 1");
        assert_eq!(decode_step_string("Sal\\X\\F3n"), "Salón");
        assert_eq!(decode_step_string("\\S\\i"), "é");
        assert_eq!(decode_step_string("\\X4\\0001F600\\X0\\"), "😀");
        assert_eq!(decode_step_string("C:\\\\temp"), "C:\\temp");
        assert_eq!(decode_step_string("\\PA\\plain"), "plain");
    }

    #[test]
    fn test_decode_keeps_malformed_escapes() {
        assert_eq!(decode_step_string("50\\X2\\zz"), "50\\X2\\zz");
        assert_eq!(decode_step_string("no escapes"), "no escapes");
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(number("42").unwrap().1, Token::Integer(42));
        assert_eq!(number("-7").unwrap().1, Token::Integer(-7));
        match number("1.5E-3").unwrap().1 {
            Token::Float(f) => assert!((f - 0.0015).abs() < 1e-12),
            other => panic!("Expected float, got {:?}", other),
        }
        match number("2.").unwrap().1 {
            Token::Float(f) => assert_eq!(f, 2.0),
            other => panic!("Expected float, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_enum_and_list() {
        assert_eq!(enumeration(".TRUE.").unwrap().1, Token::Enum("TRUE"));
        match list("(1, #2 , $)").unwrap().1 {
            Token::List(items) => assert_eq!(items.len(), 3),
            other => panic!("Expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_typed_value() {
        let entity = parse_entity(
            "#20=IFCPROPERTYSINGLEVALUE('IsExternal',$,IFCBOOLEAN(.T.),$);",
        )
        .unwrap();
        assert_eq!(entity.ifc_type, IfcType::IfcPropertySingleValue);
        assert_eq!(
            entity.get(2),
            Some(&AttributeValue::TypedValue(
                "IFCBOOLEAN".to_string(),
                vec![AttributeValue::Enum("T".to_string())]
            ))
        );
    }

    #[test]
    fn test_parse_entity_with_comment() {
        let entity = parse_entity("#1= IFCWALL /* wall */ ('abc',$,#2);").unwrap();
        assert_eq!(entity.id, EntityId(1));
        assert_eq!(entity.ifc_type, IfcType::IfcWall);
        assert_eq!(entity.attributes.len(), 3);
        assert_eq!(entity.get_ref(2), Some(EntityId(2)));
    }

    #[test]
    fn test_parse_header_record() {
        let (name, args) =
            parse_header_record("\nFILE_SCHEMA(('IFC4'));").unwrap();
        assert_eq!(name, "FILE_SCHEMA");
        assert_eq!(args, vec![Token::List(vec![Token::String("IFC4")])]);
    }
}

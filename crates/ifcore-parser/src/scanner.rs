// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fast entity scanner using SIMD-accelerated byte searching
//!
//! Scans the DATA section to discover entity boundaries without decoding
//! attributes, and reads the HEADER section records.

use crate::tokenizer::{decode_step_string, parse_header_record, Token};
use ifcore_model::{EntityId, IfcType};
use memchr::memchr;
use rustc_hash::FxHashMap;

/// Entity index mapping ID to byte offsets
pub type EntityIndex = FxHashMap<u32, (usize, usize)>;

/// Type index mapping each entity type to its IDs, in file order
pub type TypeIndex = FxHashMap<IfcType, Vec<EntityId>>;

/// One entity found by the scanner
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScannedEntity<'a> {
    pub id: u32,
    pub type_name: &'a str,
    pub start: usize,
    pub end: usize,
}

/// Fast entity scanner for IFC files
///
/// Iterates over entity definitions (`#id=TYPE(...);`) in the DATA section.
pub struct EntityScanner<'a> {
    content: &'a str,
    pos: usize,
}

impl<'a> EntityScanner<'a> {
    /// Create a new scanner positioned after the `DATA;` marker
    pub fn new(content: &'a str) -> Self {
        let pos = content.find("DATA;").map(|p| p + 5).unwrap_or(0);
        Self { content, pos }
    }

    fn skip_blanks(&mut self) {
        let bytes = self.content.as_bytes();
        while self.pos < bytes.len() && (bytes[self.pos] == b' ' || bytes[self.pos] == b'\t') {
            self.pos += 1;
        }
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let bytes = self.content.as_bytes();
        let start = self.pos;
        while self.pos < bytes.len() && pred(bytes[self.pos]) {
            self.pos += 1;
        }
        &self.content[start..self.pos]
    }

    /// Find the end of an entity (semicolon), handling quoted strings
    fn find_entity_end(&mut self) -> Option<usize> {
        let bytes = self.content.as_bytes();
        let mut in_string = false;

        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'\'' if in_string && bytes.get(self.pos + 1) == Some(&b'\'') => {
                    self.pos += 2;
                    continue;
                }
                b'\'' => in_string = !in_string,
                b';' if !in_string => {
                    self.pos += 1;
                    return Some(self.pos);
                }
                _ => {}
            }
            self.pos += 1;
        }

        None
    }

    /// Build the ID index and the type index in a single pass
    pub fn build_indices(content: &'a str) -> (EntityIndex, TypeIndex) {
        let mut index = EntityIndex::default();
        let mut types = TypeIndex::default();

        for entity in Self::new(content) {
            index.insert(entity.id, (entity.start, entity.end));
            types
                .entry(IfcType::parse(entity.type_name))
                .or_default()
                .push(EntityId(entity.id));
        }

        (index, types)
    }

    /// Count entities by (uppercase) type name
    pub fn count_by_type(content: &'a str) -> FxHashMap<String, usize> {
        let mut counts: FxHashMap<String, usize> = FxHashMap::default();
        for entity in Self::new(content) {
            *counts.entry(entity.type_name.to_ascii_uppercase()).or_insert(0) += 1;
        }
        counts
    }
}

impl<'a> Iterator for EntityScanner<'a> {
    type Item = ScannedEntity<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.content.as_bytes();

        while self.pos < bytes.len() {
            let hash_pos = memchr(b'#', &bytes[self.pos..])?;
            self.pos += hash_pos;

            // Definitions start a line (or follow the previous `;`); anything
            // else is a reference inside an attribute list.
            let at_line_start =
                self.pos == 0 || matches!(bytes[self.pos - 1], b'\n' | b'\r' | b';');
            if !at_line_start {
                self.pos += 1;
                continue;
            }

            let start = self.pos;
            self.pos += 1;

            let digits = self.take_while(|b| b.is_ascii_digit());
            let Ok(id) = digits.parse::<u32>() else {
                continue;
            };

            self.skip_blanks();
            if bytes.get(self.pos) != Some(&b'=') {
                continue;
            }
            self.pos += 1;
            self.skip_blanks();

            let type_name = self.take_while(|b| b.is_ascii_alphanumeric() || b == b'_');
            if type_name.is_empty() {
                continue;
            }

            let end = self.find_entity_end()?;
            return Some(ScannedEntity {
                id,
                type_name,
                start,
                end,
            });
        }

        None
    }
}

/// Header information extracted from IFC file
#[derive(Clone, Debug, Default)]
pub struct HeaderInfo {
    pub schema_version: String,
    pub file_description: Option<String>,
    pub file_name: Option<String>,
    pub timestamp: Option<String>,
    pub author: Option<String>,
    pub organization: Option<String>,
    pub preprocessor_version: Option<String>,
    pub originating_system: Option<String>,
}

/// Parse the header section to extract metadata
///
/// Each record is parsed with the same tokenizer as DATA entities, so
/// escaped quotes and encoded characters are handled identically.
pub fn parse_header(content: &str) -> HeaderInfo {
    let mut info = HeaderInfo::default();

    let Some(header_start) = content.find("HEADER;") else {
        return info;
    };
    let header = &content[header_start + 7..];
    let header = &header[..header.find("ENDSEC;").unwrap_or(header.len())];

    for record in header_records(header) {
        let Some((keyword, args)) = parse_header_record(record) else {
            continue;
        };

        match keyword.as_str() {
            "FILE_DESCRIPTION" => {
                info.file_description = first_text(args.first());
            }
            "FILE_NAME" => {
                // name, time_stamp, author, organization, preprocessor, originating_system, authorization
                info.file_name = text(args.first());
                info.timestamp = text(args.get(1));
                info.author = first_text(args.get(2));
                info.organization = first_text(args.get(3));
                info.preprocessor_version = text(args.get(4));
                info.originating_system = text(args.get(5));
            }
            "FILE_SCHEMA" => {
                info.schema_version = first_text(args.first()).unwrap_or_default();
            }
            _ => {}
        }
    }

    info
}

/// Split the header into `;`-terminated records, ignoring `;` inside strings
fn header_records(header: &str) -> Vec<&str> {
    let mut records = Vec::new();
    let mut in_string = false;
    let mut start = 0;

    for (i, byte) in header.bytes().enumerate() {
        match byte {
            // An escaped '' toggles twice and leaves the state unchanged
            b'\'' => in_string = !in_string,
            b';' if !in_string => {
                records.push(&header[start..=i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    records
}

fn text(token: Option<&Token<'_>>) -> Option<String> {
    match token? {
        Token::String(raw) => Some(decode_step_string(raw)).filter(|s| !s.is_empty()),
        _ => None,
    }
}

fn first_text(token: Option<&Token<'_>>) -> Option<String> {
    match token? {
        Token::List(items) => items.iter().find_map(|item| text(Some(item))),
        other => text(Some(other)),
    }
}

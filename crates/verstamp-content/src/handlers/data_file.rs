//! JSON data file handler: discrete `version`, `build_number`, `build_date`
//! and `git_commit` keys

use std::ops::Range;

use serde_json::{Map, Value};

use crate::build_id::{BuildId, SENTINEL};
use crate::error::{Error, Result};
use crate::format::{Format, VersionFormat};
use crate::record::{VersionFields, VersionRecord};
use crate::version::SemanticVersion;

const VERSION_KEY: &str = "version";
const BUILD_NUMBER_KEY: &str = "build_number";
const BUILD_DATE_KEY: &str = "build_date";
const GIT_COMMIT_KEY: &str = "git_commit";

/// Handler for JSON version files bundled as application assets.
///
/// The document is validated with `serde_json`, then only the value tokens
/// of the four version keys are replaced in the source text. Everything else
/// (spacing, escapes, number spelling, nested layout) is left as written.
/// Missing keys are appended after the last member, following its layout.
#[derive(Debug, Default)]
pub struct DataFileHandler;

impl DataFileHandler {
    pub fn new() -> Self {
        Self
    }

    fn parse_object(&self, source: &str) -> Result<Map<String, Value>> {
        match serde_json::from_str::<Value>(source) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(Error::parse(
                "JSON",
                format!("top level is not an object, expected {}", self.expected_shape()),
            )),
            Err(e) => Err(Error::parse("JSON", e.to_string())),
        }
    }

    fn string_field<'a>(map: &'a Map<String, Value>, key: &str) -> Result<Option<&'a str>> {
        match map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(Error::parse(
                "JSON",
                format!("`{key}` must be a string, found {other}"),
            )),
        }
    }

    /// Indentation used by the source, or `None` for single-line JSON.
    fn detect_indent(source: &str) -> Option<String> {
        if !source.trim_end().contains('\n') {
            return None;
        }
        let indent = source
            .lines()
            .skip(1)
            .find(|line| !line.trim().is_empty())
            .map(|line| {
                line.chars()
                    .take_while(|c| *c == ' ' || *c == '\t')
                    .collect::<String>()
            })
            .filter(|indent| !indent.is_empty())
            .unwrap_or_else(|| "  ".to_string());
        Some(indent)
    }

    fn quote(value: &str) -> Result<String> {
        serde_json::to_string(value).map_err(|e| Error::parse("JSON", e.to_string()))
    }
}

/// One top-level member, as byte ranges into the source.
#[derive(Debug)]
struct Member {
    /// Whitespace between the preceding `{` or `,` and the key
    lead: Range<usize>,
    key: String,
    /// Just past the key's closing quote
    key_end: usize,
    value: Range<usize>,
}

/// The top-level object of a document `serde_json` has already accepted.
#[derive(Debug)]
struct TopLevel {
    open: usize,
    members: Vec<Member>,
}

impl TopLevel {
    /// Where to insert `missing` members, and the text to insert.
    fn append(&self, source: &str, missing: &[(&str, String)]) -> (usize, String) {
        match self.members.last() {
            Some(last) => {
                let lead = &source[last.lead.clone()];
                let colon = &source[last.key_end..last.value.start];
                let text = missing
                    .iter()
                    .map(|(key, value)| format!(",{lead}\"{key}\"{colon}{value}"))
                    .collect();
                (last.value.end, text)
            }
            None => {
                let newline = if source.contains("\r\n") { "\r\n" } else { "\n" };
                let (lead, colon) = match DataFileHandler::detect_indent(source) {
                    Some(indent) => (format!("{newline}{indent}"), ": "),
                    None => (String::new(), ":"),
                };
                let text = missing
                    .iter()
                    .map(|(key, value)| format!("{lead}\"{key}\"{colon}{value}"))
                    .collect::<Vec<_>>()
                    .join(",");
                (self.open + 1, text)
            }
        }
    }
}

/// Byte-level scanner over a well-formed JSON document.
struct Scanner<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
        }
    }

    fn error(&self, message: &str) -> Error {
        Error::parse("JSON", format!("{message} at byte {}", self.pos))
    }

    fn peek(&self) -> Result<u8> {
        self.bytes
            .get(self.pos)
            .copied()
            .ok_or_else(|| self.error("unexpected end of document"))
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.bytes.get(self.pos), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        if self.peek()? != byte {
            return Err(self.error(&format!("expected `{}`", byte as char)));
        }
        self.pos += 1;
        Ok(())
    }

    fn string(&mut self) -> Result<Range<usize>> {
        let start = self.pos;
        self.expect(b'"')?;
        loop {
            match self.peek()? {
                b'\\' => self.pos += 2,
                b'"' => {
                    self.pos += 1;
                    return Ok(start..self.pos);
                }
                _ => self.pos += 1,
            }
        }
    }

    fn value(&mut self) -> Result<Range<usize>> {
        let start = self.pos;
        match self.peek()? {
            b'"' => return self.string(),
            b'{' | b'[' => {
                let mut depth = 0usize;
                loop {
                    match self.peek()? {
                        b'"' => {
                            self.string()?;
                            continue;
                        }
                        b'{' | b'[' => depth += 1,
                        b'}' | b']' => {
                            depth -= 1;
                            if depth == 0 {
                                self.pos += 1;
                                break;
                            }
                        }
                        _ => {}
                    }
                    self.pos += 1;
                }
            }
            _ => {
                while let Some(byte) = self.bytes.get(self.pos) {
                    if matches!(byte, b',' | b'}' | b']' | b' ' | b'\t' | b'\n' | b'\r') {
                        break;
                    }
                    self.pos += 1;
                }
            }
        }
        Ok(start..self.pos)
    }

    fn object(mut self) -> Result<TopLevel> {
        self.skip_whitespace();
        let open = self.pos;
        self.expect(b'{')?;
        let mut members = Vec::new();

        loop {
            let lead_start = self.pos;
            self.skip_whitespace();
            if members.is_empty() && self.peek()? == b'}' {
                break;
            }
            let lead = lead_start..self.pos;
            let key_span = self.string()?;
            let key = serde_json::from_str::<String>(&self.source[key_span.clone()])
                .map_err(|e| Error::parse("JSON", e.to_string()))?;
            let key_end = self.pos;
            self.skip_whitespace();
            self.expect(b':')?;
            self.skip_whitespace();
            let value = self.value()?;
            members.push(Member {
                lead,
                key,
                key_end,
                value,
            });

            self.skip_whitespace();
            match self.peek()? {
                b',' => self.pos += 1,
                b'}' => break,
                _ => return Err(self.error("expected `,` or `}`")),
            }
        }
        Ok(TopLevel { open, members })
    }
}

impl VersionFormat for DataFileHandler {
    fn format(&self) -> Format {
        Format::Json
    }

    fn expected_shape(&self) -> String {
        format!(
            "a JSON object with string keys `{VERSION_KEY}`, `{BUILD_NUMBER_KEY}`, `{BUILD_DATE_KEY}`, `{GIT_COMMIT_KEY}`"
        )
    }

    fn read(&self, source: &str) -> Result<VersionFields> {
        let map = self.parse_object(source)?;

        let semantic = Self::string_field(&map, VERSION_KEY)?
            .map(SemanticVersion::parse)
            .transpose()?;

        // Older tooling wrote the build number as a bare integer
        let build = match map.get(BUILD_NUMBER_KEY) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(BuildId::parse(s)?),
            Some(Value::Number(n)) => Some(BuildId::parse(&n.to_string())?),
            Some(other) => {
                return Err(Error::parse(
                    "JSON",
                    format!("`{BUILD_NUMBER_KEY}` must be a string, found {other}"),
                ));
            }
        };

        let timestamp = Self::string_field(&map, BUILD_DATE_KEY)?
            .filter(|date| *date != SENTINEL)
            .map(str::to_string);
        let revision = Self::string_field(&map, GIT_COMMIT_KEY)?.map(str::to_string);

        Ok(VersionFields {
            semantic,
            build,
            timestamp,
            revision,
        })
    }

    fn write(&self, source: &str, record: &VersionRecord) -> Result<String> {
        // Rejects malformed documents and wrongly typed fields
        self.read(source)?;
        let object = Scanner::new(source).object()?;

        let timestamp = record.timestamp.as_deref().unwrap_or(SENTINEL);
        let values = [
            (VERSION_KEY, record.semantic.to_string()),
            (BUILD_NUMBER_KEY, record.build.to_string()),
            (BUILD_DATE_KEY, timestamp.to_string()),
            (GIT_COMMIT_KEY, record.revision_or_unknown().to_string()),
        ];

        let mut edits: Vec<(Range<usize>, String)> = Vec::new();
        let mut missing = Vec::new();
        for (key, value) in values {
            let quoted = Self::quote(&value)?;
            let spans: Vec<_> = object
                .members
                .iter()
                .filter(|member| member.key == key)
                .map(|member| member.value.clone())
                .collect();
            if spans.is_empty() {
                missing.push((key, quoted));
            } else {
                // Duplicate keys are all rewritten so no stale copy survives
                edits.extend(spans.into_iter().map(|span| (span, quoted.clone())));
            }
        }
        if !missing.is_empty() {
            let (at, text) = object.append(source, &missing);
            edits.push((at..at, text));
        }
        edits.sort_by_key(|(span, _)| span.start);

        let mut out = String::with_capacity(source.len() + 64);
        let mut cursor = 0;
        for (span, text) in edits {
            out.push_str(&source[cursor..span.start]);
            out.push_str(&text);
            cursor = span.end;
        }
        out.push_str(&source[cursor..]);
        Ok(out)
    }
}

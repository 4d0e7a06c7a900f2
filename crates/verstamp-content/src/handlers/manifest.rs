//! YAML manifest handler: the top-level `version: X.Y.Z+BUILD` entry

use serde_yaml::Value as YamlValue;

use super::lines::{self, Line};
use crate::build_id::BuildId;
use crate::error::{Error, Result};
use crate::format::{Format, VersionFormat};
use crate::record::{VersionFields, VersionRecord};
use crate::version::SemanticVersion;

const KEY: &str = "version:";

/// Handler for package manifests that embed `semantic+build` in one
/// top-level `version:` entry.
///
/// The document is validated as YAML, but only the `version:` line is ever
/// rewritten; its quoting and any trailing comment are kept.
#[derive(Debug, Default)]
pub struct ManifestHandler;

/// The pieces of the `version:` line, so it can be rebuilt around a new value.
#[derive(Debug)]
struct VersionLine<'a> {
    index: usize,
    /// `version:` plus the whitespace after it
    lead: &'a str,
    quote: &'a str,
    value: &'a str,
    /// Everything after the value (closing quote, spacing, comment)
    trailer: &'a str,
}

impl ManifestHandler {
    pub fn new() -> Self {
        Self
    }

    fn check_yaml(source: &str) -> Result<YamlValue> {
        let value: YamlValue =
            serde_yaml::from_str(source).map_err(|e| Error::parse("YAML", e.to_string()))?;
        if !value.is_mapping() {
            return Err(Error::parse("YAML", "top level is not a mapping"));
        }
        Ok(value)
    }

    fn find_line<'a>(&self, lines: &[Line<'a>]) -> Result<VersionLine<'a>> {
        let (index, line) = lines
            .iter()
            .enumerate()
            .find(|(_, line)| line.text.starts_with(KEY))
            .ok_or_else(|| {
                Error::parse(
                    "YAML",
                    format!("no top-level entry found, expected {}", self.expected_shape()),
                )
            })?;

        let rest = &line.text[KEY.len()..];
        let body = rest.trim_start();
        let lead = &line.text[..line.text.len() - body.len()];

        let (quote, value, trailer) = match body.chars().next() {
            Some(q @ ('"' | '\'')) => {
                let inner = &body[1..];
                let close = inner.find(q).ok_or_else(|| {
                    Error::parse("YAML", "unterminated quoted value in version entry")
                })?;
                (&body[..1], &inner[..close], &inner[close..])
            }
            _ => {
                let end = body.find(char::is_whitespace).unwrap_or(body.len());
                ("", &body[..end], &body[end..])
            }
        };

        Ok(VersionLine {
            index,
            lead,
            quote,
            value,
            trailer,
        })
    }

    fn split_value(&self, value: &str) -> Result<(SemanticVersion, BuildId)> {
        let (semantic, build) = value.split_once('+').ok_or_else(|| {
            Error::parse(
                "YAML",
                format!("version '{}' has no build part, expected {}", value, self.expected_shape()),
            )
        })?;
        Ok((SemanticVersion::parse(semantic)?, BuildId::parse(build)?))
    }
}

impl VersionFormat for ManifestHandler {
    fn format(&self) -> Format {
        Format::Yaml
    }

    fn expected_shape(&self) -> String {
        "a top-level `version: MAJOR.MINOR.PATCH+BUILD` entry".to_string()
    }

    fn read(&self, source: &str) -> Result<VersionFields> {
        let document = Self::check_yaml(source)?;
        let lines = lines::split(source);
        let line = self.find_line(&lines)?;

        // The line model and the YAML parser must agree on what the value is
        let parsed = document.get("version").and_then(YamlValue::as_str);
        if parsed != Some(line.value) {
            return Err(Error::parse(
                "YAML",
                format!(
                    "top-level version is not a plain string, expected {}",
                    self.expected_shape()
                ),
            ));
        }

        let (semantic, build) = self.split_value(line.value)?;
        Ok(VersionFields {
            semantic: Some(semantic),
            build: Some(build),
            timestamp: None,
            revision: None,
        })
    }

    fn write(&self, source: &str, record: &VersionRecord) -> Result<String> {
        Self::check_yaml(source)?;
        let lines = lines::split(source);
        let line = self.find_line(&lines)?;
        let replacement = record.full();

        tracing::trace!(from = line.value, to = %replacement, "rewriting manifest version");

        let mut out = String::with_capacity(source.len() + replacement.len());
        for (index, current) in lines.iter().enumerate() {
            if index == line.index {
                out.push_str(line.lead);
                out.push_str(line.quote);
                out.push_str(&replacement);
                out.push_str(line.trailer);
            } else {
                out.push_str(current.text);
            }
            out.push_str(current.eol);
        }
        Ok(out)
    }
}

//! Dart source handler: one version/build constant pair per component

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use super::lines::{self, Line};
use crate::build_id::{BuildId, SENTINEL};
use crate::error::{Error, Result};
use crate::format::{Format, VersionFormat};
use crate::record::{VersionFields, VersionRecord};
use crate::version::SemanticVersion;

/// Name of the constant holding the build timestamp.
pub const TIMESTAMP_CONSTANT: &str = "buildTimestamp";

/// `[static] const <Type> <name> = <literal>;` with every piece captured so
/// the line can be rebuilt around a new literal.
static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<head>\s*(?:static\s+)?const\s+(?P<ty>String|int)\s+(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*=\s*)(?P<literal>'[^']*'|\x22[^\x22]*\x22|\d+)(?P<tail>\s*;.*)$",
    )
    .expect("Invalid constant declaration regex")
});

static COMPONENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][A-Za-z0-9]*$").expect("Invalid component name regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConstType {
    String,
    Int,
}

/// What a constant holds, derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Version,
    Build,
    Timestamp,
}

#[derive(Debug)]
struct Declaration<'a> {
    index: usize,
    head: &'a str,
    ty: ConstType,
    literal: &'a str,
    tail: &'a str,
}

impl Declaration<'_> {
    /// Literal contents without quotes.
    fn unquoted(&self) -> &str {
        match self.ty {
            ConstType::String => &self.literal[1..self.literal.len() - 1],
            ConstType::Int => self.literal,
        }
    }

    fn quote(&self) -> &str {
        match self.ty {
            ConstType::String => &self.literal[..1],
            ConstType::Int => "",
        }
    }
}

/// Handler for a generated source file that exposes the shared version to
/// several lock-stepped components.
///
/// For each component alias `x` the file declares `xVersion` (String) and
/// `xBuildNumber` (int or String), plus a single `buildTimestamp` String.
/// An `int` build constant cannot hold the sentinel, so a pending build is
/// written as `0` there and `0` reads back as pending.
#[derive(Debug, Clone)]
pub struct ConstantsHandler {
    components: Vec<String>,
}

impl ConstantsHandler {
    /// Create a handler for the given component aliases.
    pub fn new<I, S>(components: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let components: Vec<String> = components.into_iter().map(Into::into).collect();
        for name in &components {
            if !COMPONENT.is_match(name) {
                return Err(Error::InvalidComponent { name: name.clone() });
            }
        }
        if components.is_empty() {
            return Err(Error::InvalidComponent {
                name: String::new(),
            });
        }
        Ok(Self { components })
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    fn roles(&self) -> BTreeMap<String, Role> {
        let mut roles = BTreeMap::new();
        for component in &self.components {
            roles.insert(format!("{component}Version"), Role::Version);
            roles.insert(format!("{component}BuildNumber"), Role::Build);
        }
        roles.insert(TIMESTAMP_CONSTANT.to_string(), Role::Timestamp);
        roles
    }

    /// Locate every managed declaration, failing if one is missing.
    fn declarations<'a>(
        &self,
        lines: &[Line<'a>],
    ) -> Result<BTreeMap<String, (Role, Declaration<'a>)>> {
        let roles = self.roles();
        let mut found = BTreeMap::new();

        for (index, line) in lines.iter().enumerate() {
            let Some(caps) = DECLARATION.captures(line.text) else {
                continue;
            };
            let name = caps.name("name").map_or("", |m| m.as_str());
            let Some(role) = roles.get(name) else {
                continue;
            };
            let (Some(head), Some(literal), Some(tail)) =
                (caps.name("head"), caps.name("literal"), caps.name("tail"))
            else {
                continue;
            };
            let ty = match caps.name("ty").map(|m| m.as_str()) {
                Some("int") => ConstType::Int,
                _ => ConstType::String,
            };

            let quoted = literal.as_str().starts_with(['\'', '"']);
            if quoted != (ty == ConstType::String) {
                return Err(Error::parse(
                    "Dart",
                    format!("constant `{name}` has a literal that does not match its type"),
                ));
            }
            if *role != Role::Build && ty == ConstType::Int {
                return Err(Error::parse(
                    "Dart",
                    format!("constant `{name}` must be a String"),
                ));
            }

            if found.contains_key(name) {
                return Err(Error::parse(
                    "Dart",
                    format!("duplicate constant `{name}` on line {}", index + 1),
                ));
            }
            found.insert(
                name.to_string(),
                (
                    *role,
                    Declaration {
                        index,
                        head: head.as_str(),
                        ty,
                        literal: literal.as_str(),
                        tail: tail.as_str(),
                    },
                ),
            );
        }

        let missing: Vec<&str> = roles
            .keys()
            .filter(|name| !found.contains_key(*name))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(Error::parse(
                "Dart",
                format!(
                    "missing constants {}, expected {}",
                    missing.join(", "),
                    self.expected_shape()
                ),
            ));
        }

        Ok(found)
    }

    fn read_build(decl: &Declaration<'_>) -> Result<BuildId> {
        match (decl.ty, decl.unquoted()) {
            (ConstType::Int, "0") => Ok(BuildId::Pending),
            (_, value) => BuildId::parse(value),
        }
    }

    fn render_literal(decl: &Declaration<'_>, role: Role, record: &VersionRecord) -> String {
        let value = match role {
            Role::Version => record.semantic.to_string(),
            Role::Build => match (decl.ty, &record.build) {
                (ConstType::Int, BuildId::Pending) => "0".to_string(),
                (_, build) => build.to_string(),
            },
            Role::Timestamp => record
                .timestamp
                .clone()
                .unwrap_or_else(|| SENTINEL.to_string()),
        };
        format!("{q}{value}{q}", q = decl.quote())
    }
}

impl VersionFormat for ConstantsHandler {
    fn format(&self) -> Format {
        Format::Dart
    }

    fn expected_shape(&self) -> String {
        let names: Vec<String> = self
            .components
            .iter()
            .flat_map(|c| [format!("{c}Version"), format!("{c}BuildNumber")])
            .chain(std::iter::once(TIMESTAMP_CONSTANT.to_string()))
            .collect();
        format!("`const` declarations for {}", names.join(", "))
    }

    fn read(&self, source: &str) -> Result<VersionFields> {
        let lines = lines::split(source);
        let found = self.declarations(&lines)?;

        let mut semantic: Option<(String, SemanticVersion)> = None;
        let mut build: Option<(String, BuildId)> = None;
        let mut timestamp = None;

        // Every component must carry the same record
        for (name, (role, decl)) in &found {
            match role {
                Role::Version => {
                    let value = SemanticVersion::parse(decl.unquoted())?;
                    match &semantic {
                        Some((first, seen)) if *seen != value => {
                            return Err(Error::parse(
                                "Dart",
                                format!("`{name}` = {value} disagrees with `{first}` = {seen}"),
                            ));
                        }
                        Some(_) => {}
                        None => semantic = Some((name.clone(), value)),
                    }
                }
                Role::Build => {
                    let value = Self::read_build(decl)?;
                    match &build {
                        Some((first, seen)) if *seen != value => {
                            return Err(Error::parse(
                                "Dart",
                                format!("`{name}` = {value} disagrees with `{first}` = {seen}"),
                            ));
                        }
                        Some(_) => {}
                        None => build = Some((name.clone(), value)),
                    }
                }
                Role::Timestamp => {
                    let value = decl.unquoted();
                    if value != SENTINEL {
                        timestamp = Some(value.to_string());
                    }
                }
            }
        }

        Ok(VersionFields {
            semantic: semantic.map(|(_, v)| v),
            build: build.map(|(_, b)| b),
            timestamp,
            revision: None,
        })
    }

    fn write(&self, source: &str, record: &VersionRecord) -> Result<String> {
        let lines = lines::split(source);
        let found = self.declarations(&lines)?;

        let mut replacements: BTreeMap<usize, String> = BTreeMap::new();
        for (role, decl) in found.values() {
            let literal = Self::render_literal(decl, *role, record);
            replacements.insert(decl.index, format!("{}{}{}", decl.head, literal, decl.tail));
        }

        let mut out = String::with_capacity(source.len());
        for (index, line) in lines.iter().enumerate() {
            match replacements.get(&index) {
                Some(rewritten) => out.push_str(rewritten),
                None => out.push_str(line.text),
            }
            out.push_str(line.eol);
        }
        Ok(out)
    }
}

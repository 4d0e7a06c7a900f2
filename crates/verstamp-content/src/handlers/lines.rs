//! Line model shared by the line-oriented formats.
//!
//! A source is split into lines that keep their own terminator, so joining
//! the pieces back together reproduces the input exactly, including mixed
//! `\n` / `\r\n` endings and a missing final newline.

/// One line of a source file, split from its terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Line<'a> {
    pub text: &'a str,
    pub eol: &'a str,
}

pub(crate) fn split(source: &str) -> Vec<Line<'_>> {
    source
        .split_inclusive('\n')
        .map(|raw| {
            let body_len = if raw.ends_with("\r\n") {
                raw.len() - 2
            } else if raw.ends_with('\n') {
                raw.len() - 1
            } else {
                raw.len()
            };
            Line {
                text: &raw[..body_len],
                eol: &raw[body_len..],
            }
        })
        .collect()
}

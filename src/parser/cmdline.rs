use super::{PipelineParser, TextFormat};
use crate::catalog::Catalog;
use crate::error::{ParseError, PipelineError};
use crate::pipeline::{FunctionId, Pipeline};
use ahash::AHashMap;
use itertools::Itertools as _;
use std::sync::Arc;

/// Shell-specific tolerance rules applied before tokenization. Both dialects
/// render the same single-line form; they differ only in what they accept.
#[derive(Debug, Clone, Copy)]
pub struct Dialect {
    pub name: &'static str,
    /// A standalone token equal to this is treated as plain whitespace, so
    /// multi-line command files with trailing continuations parse unchanged.
    pub line_continuation: &'static str,
    pub comment_prefix: &'static str,
    pub comment_case_insensitive: bool,
}

impl Dialect {
    pub const BASH: Dialect = Dialect {
        name: "bash",
        line_continuation: "\\",
        comment_prefix: "#",
        comment_case_insensitive: false,
    };

    pub const CMD: Dialect = Dialect {
        name: "cmd",
        line_continuation: "^",
        comment_prefix: "REM",
        comment_case_insensitive: true,
    };

    fn is_comment(&self, line: &str) -> bool {
        let trimmed = line.trim_start();
        if self.comment_case_insensitive {
            let prefix_len = self.comment_prefix.len();
            trimmed
                .get(..prefix_len)
                .is_some_and(|p| p.eq_ignore_ascii_case(self.comment_prefix))
                && trimmed[prefix_len..]
                    .chars()
                    .next()
                    .is_none_or(char::is_whitespace)
        } else {
            trimmed.starts_with(self.comment_prefix)
        }
    }
}

/// One token of the command stream with its 1-based source position.
#[derive(Debug, Clone)]
struct Token {
    text: String,
    line: usize,
    column: usize,
    quoted: bool,
}

/// Parser for the command-line pipeline format.
///
/// Grammar (whitespace-delimited tokens):
///
/// ```text
/// pipeline   := item*
/// item       := in_marker* TYPE param* out_marker*
/// in_marker  := '@' INT      -- upstream at an earlier stream position,
///                               '@0' declares an explicit root
/// param      := '--' NAME VALUE
/// out_marker := '>' INT      -- extra downstream edge to an earlier position
/// ```
///
/// An item without in-markers chains onto the previous item (its next free
/// output slot feeds the new item's input slot 0); the markers are the
/// explicit encoding for everything a flat chain cannot express. Markers only
/// reference earlier positions, so the text form cannot encode a cycle.
/// Values containing anything outside `[A-Za-z0-9._:/-]` are double-quoted
/// with `\"` and `\\` escapes.
#[derive(Debug)]
pub struct CommandLineParser {
    format: TextFormat,
    dialect: Dialect,
}

impl CommandLineParser {
    pub fn bash() -> Self {
        Self {
            format: TextFormat::Bash,
            dialect: Dialect::BASH,
        }
    }

    pub fn cmd() -> Self {
        Self {
            format: TextFormat::Cmd,
            dialect: Dialect::CMD,
        }
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    fn tokenize(&self, input: &str) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        for (line_index, raw_line) in input.lines().enumerate() {
            let line = line_index + 1;
            if self.dialect.is_comment(raw_line) {
                continue;
            }
            let chars: Vec<char> = raw_line.chars().collect();
            let mut i = 0;
            while i < chars.len() {
                if chars[i].is_whitespace() {
                    i += 1;
                    continue;
                }
                let column = i + 1;
                if chars[i] == '"' {
                    let mut text = String::new();
                    let mut closed = false;
                    i += 1;
                    while i < chars.len() {
                        match chars[i] {
                            '\\' if i + 1 < chars.len()
                                && (chars[i + 1] == '"' || chars[i + 1] == '\\') =>
                            {
                                text.push(chars[i + 1]);
                                i += 2;
                            }
                            '"' => {
                                i += 1;
                                closed = true;
                                break;
                            }
                            c => {
                                text.push(c);
                                i += 1;
                            }
                        }
                    }
                    if !closed {
                        return Err(ParseError::UnterminatedQuote { line, column });
                    }
                    tokens.push(Token {
                        text,
                        line,
                        column,
                        quoted: true,
                    });
                } else {
                    let start = i;
                    while i < chars.len() && !chars[i].is_whitespace() {
                        i += 1;
                    }
                    let text: String = chars[start..i].iter().collect();
                    if text == self.dialect.line_continuation {
                        continue;
                    }
                    tokens.push(Token {
                        text,
                        line,
                        column,
                        quoted: false,
                    });
                }
            }
        }
        Ok(tokens)
    }

    /// Whether an unquoted token is grammar structure rather than a value.
    fn is_structural(text: &str) -> bool {
        text.starts_with("--") || text.starts_with('@') || text.starts_with('>')
    }

    fn marker_index(token: &Token) -> Result<usize, ParseError> {
        let digits = &token.text[1..];
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ParseError::InvalidMarker {
                marker: token.text.clone(),
                line: token.line,
                column: token.column,
                message: "expected a stream position after the marker symbol".to_string(),
            });
        }
        digits
            .parse::<usize>()
            .map_err(|_| ParseError::InvalidMarker {
                marker: token.text.clone(),
                line: token.line,
                column: token.column,
                message: "stream position is out of range".to_string(),
            })
    }

    /// The output slot a new edge from `id` would use. When every slot is
    /// taken, the last slot is returned so `connect` reports the occupancy;
    /// with zero declared outputs, slot 0 triggers the range check instead.
    fn pick_output_slot(pipeline: &Pipeline, id: FunctionId) -> usize {
        match pipeline.next_free_output_slot(id) {
            Some(slot) => slot,
            None => pipeline
                .function_type_of(id)
                .map(|t| t.out_connectors.saturating_sub(1))
                .unwrap_or(0),
        }
    }

    fn pick_input_slot(pipeline: &Pipeline, id: FunctionId) -> usize {
        match pipeline.next_free_input_slot(id) {
            Some(slot) => slot,
            None => pipeline
                .function_type_of(id)
                .map(|t| t.in_connectors.saturating_sub(1))
                .unwrap_or(0),
        }
    }

    fn graph_error(token: &Token, source: PipelineError) -> ParseError {
        ParseError::InvalidValue {
            line: token.line,
            column: token.column,
            source,
        }
    }

    fn render_value(value: &str) -> String {
        // A leading "--" would read back as a parameter token.
        let plain = !value.is_empty()
            && !value.starts_with("--")
            && value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "._:/-".contains(c));
        if plain {
            value.to_string()
        } else {
            format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
        }
    }
}

impl PipelineParser for CommandLineParser {
    fn format(&self) -> TextFormat {
        self.format
    }

    fn parse_string(&self, input: &str, catalog: &Arc<Catalog>) -> Result<Pipeline, ParseError> {
        let tokens = self.tokenize(input)?;
        let mut pipeline = Pipeline::new(catalog.clone());
        let mut sequence: Vec<FunctionId> = Vec::new();
        let mut current: Option<FunctionId> = None;
        let mut pending_in: Vec<(usize, Token)> = Vec::new();

        let mut iter = tokens.into_iter().peekable();
        while let Some(token) = iter.next() {
            if !token.quoted && token.text.starts_with("--") {
                let name = token.text[2..].to_string();
                let function_id = match current {
                    Some(id) if pending_in.is_empty() => id,
                    _ => {
                        return Err(ParseError::ParameterBeforeFunction {
                            name,
                            line: token.line,
                            column: token.column,
                        });
                    }
                };

                let has_value = iter
                    .peek()
                    .map(|v| v.quoted || !Self::is_structural(&v.text))
                    .unwrap_or(false);
                let value = match iter.next() {
                    Some(v) if has_value => v,
                    _ => {
                        return Err(ParseError::MissingValue {
                            name,
                            line: token.line,
                            column: token.column,
                        });
                    }
                };

                let index = {
                    let function_type = pipeline
                        .function_type_of(function_id)
                        .map_err(|e| Self::graph_error(&token, e))?;
                    match function_type.parameter(&name) {
                        Some((index, _)) => index,
                        None => {
                            return Err(ParseError::UnknownParameter {
                                type_id: function_type.id.clone(),
                                name,
                                line: token.line,
                                column: token.column,
                            });
                        }
                    }
                };
                pipeline
                    .set_parameter(function_id, index, &value.text)
                    .map_err(|e| Self::graph_error(&value, e))?;
            } else if !token.quoted && token.text.starts_with('@') {
                let k = Self::marker_index(&token)?;
                if k > sequence.len() {
                    return Err(ParseError::InvalidMarker {
                        marker: token.text.clone(),
                        line: token.line,
                        column: token.column,
                        message: format!(
                            "references position {k}, but only {} function(s) have appeared",
                            sequence.len()
                        ),
                    });
                }
                current = None;
                pending_in.push((k, token));
            } else if !token.quoted && token.text.starts_with('>') {
                let m = Self::marker_index(&token)?;
                let source = match current {
                    Some(id) => id,
                    None => {
                        return Err(ParseError::InvalidMarker {
                            marker: token.text.clone(),
                            line: token.line,
                            column: token.column,
                            message: "no function to branch from".to_string(),
                        });
                    }
                };
                if m == 0 || m > sequence.len() {
                    return Err(ParseError::InvalidMarker {
                        marker: token.text.clone(),
                        line: token.line,
                        column: token.column,
                        message: format!(
                            "references position {m}, but only {} function(s) have appeared",
                            sequence.len()
                        ),
                    });
                }
                let target = sequence[m - 1];
                let from_slot = Self::pick_output_slot(&pipeline, source);
                let to_slot = Self::pick_input_slot(&pipeline, target);
                pipeline
                    .connect(source, from_slot, target, to_slot)
                    .map_err(|e| Self::graph_error(&token, e))?;
            } else {
                if !catalog.contains(&token.text) {
                    return Err(ParseError::UnknownFunction {
                        name: token.text.clone(),
                        line: token.line,
                        column: token.column,
                    });
                }
                let id = pipeline
                    .add_function(&token.text)
                    .map_err(|e| Self::graph_error(&token, e))?;

                if pending_in.is_empty() {
                    if let Some(&prev) = sequence.last() {
                        let from_slot = Self::pick_output_slot(&pipeline, prev);
                        pipeline
                            .connect(prev, from_slot, id, 0)
                            .map_err(|e| Self::graph_error(&token, e))?;
                    }
                } else {
                    let markers = std::mem::take(&mut pending_in);
                    let is_root = markers.iter().any(|(k, _)| *k == 0);
                    if is_root && markers.len() > 1 {
                        let (_, first) = &markers[0];
                        return Err(ParseError::InvalidMarker {
                            marker: first.text.clone(),
                            line: first.line,
                            column: first.column,
                            message: "a root marker cannot be combined with other markers"
                                .to_string(),
                        });
                    }
                    if !is_root {
                        for (k, marker_token) in markers {
                            let source = sequence[k - 1];
                            let from_slot = Self::pick_output_slot(&pipeline, source);
                            let to_slot = Self::pick_input_slot(&pipeline, id);
                            pipeline
                                .connect(source, from_slot, id, to_slot)
                                .map_err(|e| Self::graph_error(&marker_token, e))?;
                        }
                    }
                }

                sequence.push(id);
                current = Some(id);
            }
        }

        if let Some((_, token)) = pending_in.first() {
            return Err(ParseError::InvalidMarker {
                marker: token.text.clone(),
                line: token.line,
                column: token.column,
                message: "marker is not followed by a function".to_string(),
            });
        }

        Ok(pipeline)
    }

    fn parse_pipeline(&self, pipeline: &Pipeline) -> String {
        let sequence = pipeline.ordered_sequence();
        let position: AHashMap<FunctionId, usize> = sequence
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, i + 1))
            .collect();

        let mut tokens: Vec<String> = Vec::new();
        for (index, &id) in sequence.iter().enumerate() {
            let n = index + 1;
            let Some(function) = pipeline.function(id) else {
                continue;
            };

            let incoming = pipeline.incoming(id);
            let earlier: Vec<_> = incoming
                .iter()
                .filter(|c| position[&c.from] < n)
                .collect();
            let prev = index.checked_sub(1).map(|i| sequence[i]);
            let implicit = earlier.len() == 1 && prev == Some(earlier[0].from);

            if !implicit {
                if earlier.is_empty() {
                    if n > 1 {
                        tokens.push("@0".to_string());
                    }
                } else {
                    for edge in &earlier {
                        tokens.push(format!("@{}", position[&edge.from]));
                    }
                }
            }

            tokens.push(function.type_id().to_string());

            if let Some(function_type) = pipeline.catalog().get(function.type_id()) {
                for (schema, binding) in function_type.parameters.iter().zip(function.bindings()) {
                    if let Some(value) = binding.value() {
                        tokens.push(format!("--{}", schema.name));
                        tokens.push(Self::render_value(value));
                    }
                }
            }

            for edge in pipeline.outgoing(id) {
                if position[&edge.to] < n {
                    tokens.push(format!(">{}", position[&edge.to]));
                }
            }
        }

        tokens.iter().join(" ")
    }
}

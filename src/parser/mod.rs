//! Bidirectional conversion between a pipeline and its textual command
//! representation, one parser per supported text format.

pub mod cmdline;

pub use cmdline::*;

use crate::catalog::Catalog;
use crate::error::ParseError;
use crate::pipeline::Pipeline;
use ahash::AHashMap;
use std::fmt;
use std::sync::Arc;

/// Tag of a supported textual pipeline format. Selection is always driven by
/// this tag, never by content sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextFormat {
    Bash,
    Cmd,
}

impl fmt::Display for TextFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextFormat::Bash => write!(f, "bash"),
            TextFormat::Cmd => write!(f, "cmd"),
        }
    }
}

/// Defines the contract for converting one textual format to and from the
/// pipeline graph.
///
/// Implementations are stateless and shared; the same instance serves every
/// caller of its format.
pub trait PipelineParser: Send + Sync + fmt::Debug {
    /// The format tag this parser serves.
    fn format(&self) -> TextFormat;

    /// Builds a pipeline from its textual representation. The returned graph
    /// is constructed through the normal model operations, so every model
    /// invariant holds on success.
    fn parse_string(&self, input: &str, catalog: &Arc<Catalog>) -> Result<Pipeline, ParseError>;

    /// Renders the pipeline as text. Deterministic: equal pipelines always
    /// produce byte-identical output.
    fn parse_pipeline(&self, pipeline: &Pipeline) -> String;
}

/// Resolves a [`TextFormat`] tag to its parser instance.
///
/// All parsers are registered at startup; unknown tags fail with
/// [`ParseError::UnsupportedFormat`].
pub struct ParserFactory {
    registry: AHashMap<TextFormat, Arc<dyn PipelineParser>>,
}

impl ParserFactory {
    /// A factory with every built-in format registered.
    pub fn new() -> Self {
        let mut factory = Self::empty();
        factory.register(Arc::new(CommandLineParser::bash()));
        factory.register(Arc::new(CommandLineParser::cmd()));
        factory
    }

    /// A factory without any registered parser, for callers that assemble
    /// their own format set.
    pub fn empty() -> Self {
        Self {
            registry: AHashMap::new(),
        }
    }

    /// Registers a parser under its own format tag, replacing any previous
    /// registration.
    pub fn register(&mut self, parser: Arc<dyn PipelineParser>) {
        self.registry.insert(parser.format(), parser);
    }

    /// Returns the shared parser for `format`.
    pub fn parser(&self, format: TextFormat) -> Result<Arc<dyn PipelineParser>, ParseError> {
        self.registry
            .get(&format)
            .cloned()
            .ok_or_else(|| ParseError::UnsupportedFormat {
                format: format.to_string(),
            })
    }
}

impl Default for ParserFactory {
    fn default() -> Self {
        Self::new()
    }
}

// crates/ruleflow-core/src/flow/parser.rs
// ============================================================================
// Module: Flow Parser
// Description: Line-oriented contract between a node factory and the sorter.
// Purpose: Turn script lines into sorted flows with positioned errors.
// Dependencies: crate::flow, crate::node, thiserror
// ============================================================================

//! ## Overview
//! Lexing a line is the job of a [`NodeFactory`] supplied by the host. The
//! [`FlowParser`] drives it line by line, skips blank lines, reports failures
//! as `... on line N/M` (N is the failing line, M the total), and hands the
//! resulting flat sequence to the flow sorter.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::flow::Flow;
use crate::node::FlowNode;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default maximum number of lines accepted in one flow.
pub const DEFAULT_MAX_LINES: usize = 10_000;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failure reported by a node factory for one line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LineError {
    /// Human-readable reason.
    message: String,
}

impl LineError {
    /// Creates a line error with the given reason.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Flow parse errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowParseError {
    /// The script exceeds the configured line limit.
    #[error("flow has {actual} lines, exceeding the limit of {max}")]
    TooManyLines {
        /// Configured limit.
        max: usize,
        /// Lines in the script.
        actual: usize,
    },
    /// No factory rule matched the line.
    #[error("unable to find a matching node for \"{content}\" on line {line}/{total}")]
    Unmatched {
        /// Trimmed line content.
        content: String,
        /// One-based failing line.
        line: usize,
        /// Total lines.
        total: usize,
    },
    /// The factory rejected the line.
    #[error("{source} on line {line}/{total}")]
    InvalidLine {
        /// Factory error.
        source: LineError,
        /// One-based failing line.
        line: usize,
        /// Total lines.
        total: usize,
    },
}

// ============================================================================
// SECTION: Node Factory
// ============================================================================

/// Builds a configured node from one script line.
pub trait NodeFactory {
    /// Creates the node described by `line`.
    ///
    /// Returns `Ok(None)` when the line is not recognized.
    ///
    /// # Errors
    ///
    /// Returns [`LineError`] when the line is recognized but invalid.
    fn create(&self, line: &str) -> Result<Option<FlowNode>, LineError>;
}

// ============================================================================
// SECTION: Flow Parser
// ============================================================================

/// Parses scripts into sorted flows.
pub struct FlowParser<'a, F: ?Sized> {
    /// Line-to-node factory.
    factory: &'a F,
    /// Maximum accepted line count.
    max_lines: usize,
}

impl<'a, F: NodeFactory + ?Sized> FlowParser<'a, F> {
    /// Creates a parser with the default line limit.
    #[must_use]
    pub const fn new(factory: &'a F) -> Self {
        Self {
            factory,
            max_lines: DEFAULT_MAX_LINES,
        }
    }

    /// Returns the parser with a different line limit.
    #[must_use]
    pub const fn with_max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = max_lines;
        self
    }

    /// Returns the line limit.
    #[must_use]
    pub const fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// Parses `lines` and sorts the result into a flow.
    ///
    /// # Errors
    ///
    /// Returns [`FlowParseError`] when the script is too long, a line is not
    /// recognized, or the factory rejects a line.
    pub fn parse<S: AsRef<str>>(&self, lines: &[S]) -> Result<Flow, FlowParseError> {
        let total = lines.len();
        if total > self.max_lines {
            return Err(FlowParseError::TooManyLines {
                max: self.max_lines,
                actual: total,
            });
        }
        let mut nodes = Vec::with_capacity(total);
        for (index, raw) in lines.iter().enumerate() {
            let content = raw.as_ref().trim();
            if content.is_empty() {
                continue;
            }
            let line = index + 1;
            match self.factory.create(content) {
                Ok(Some(node)) => nodes.push(node),
                Ok(None) => {
                    return Err(FlowParseError::Unmatched {
                        content: content.to_string(),
                        line,
                        total,
                    });
                }
                Err(source) => {
                    return Err(FlowParseError::InvalidLine {
                        source,
                        line,
                        total,
                    });
                }
            }
        }
        Ok(Flow::from_nodes(nodes))
    }

    /// Parses a multi-line script.
    ///
    /// # Errors
    ///
    /// Returns [`FlowParseError`] under the same conditions as
    /// [`FlowParser::parse`].
    pub fn parse_str(&self, script: &str) -> Result<Flow, FlowParseError> {
        let lines: Vec<&str> = script.lines().collect();
        self.parse(&lines)
    }
}

//! Pest parser for block-structured configuration text

use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "document/block.pest"]
pub struct BlockTextParser;

/// Error type for block text parsing
#[derive(Debug)]
pub struct BlockParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for BlockParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "parse error at {}:{}: {}",
            self.line, self.column, self.message
        )
    }
}

impl std::error::Error for BlockParseError {}

impl From<pest::error::Error<Rule>> for BlockParseError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        let (line, column) = match err.line_col {
            pest::error::LineColLocation::Pos((l, c)) => (l, c),
            pest::error::LineColLocation::Span((l, c), _) => (l, c),
        };
        BlockParseError {
            message: err.variant.message().to_string(),
            line,
            column,
        }
    }
}

/// Parse block text into a pest parse tree
pub fn parse(source: &str) -> Result<pest::iterators::Pairs<'_, Rule>, BlockParseError> {
    BlockTextParser::parse(Rule::file, source).map_err(BlockParseError::from)
}

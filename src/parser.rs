//! Pipeline builder for pipesh
//!
//! Scans expanded tokens left to right and groups them into stages.
//! `|` starts a new stage, `<` and `>` bind the following word as the
//! current stage's redirection, and `&` marks the whole pipeline as a
//! background job. Structural tokens never reach a stage's argv.

use crate::ast::{Pipeline, Stage};
use thiserror::Error;

pub const PIPE: &str = "|";
pub const READ: &str = "<";
pub const WRITE: &str = ">";
pub const BACKGROUND: &str = "&";

/// Stages allowed in one pipeline unless configured otherwise
pub const DEFAULT_MAX_STAGES: usize = 3;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("too many pipes (at most {0} commands per pipeline)")]
    TooManyPipes(usize),
    #[error("missing input file")]
    MissingInput,
    #[error("missing output file")]
    MissingOutput,
}

/// Parser state
struct Parser<'a> {
    tokens: &'a [String],
    pos: usize,
    max_stages: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [String], max_stages: usize) -> Self {
        Parser {
            tokens,
            pos: 0,
            max_stages: max_stages.max(1),
        }
    }

    /// Consume and return the current token
    fn advance(&mut self) -> Option<&'a str> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token.as_str())
    }

    fn parse(&mut self) -> Result<Pipeline<'a>, ParseError> {
        let mut pipeline = Pipeline::default();

        while let Some(token) = self.advance() {
            match token {
                PIPE => {
                    if pipeline.stages.len() >= self.max_stages {
                        return Err(ParseError::TooManyPipes(self.max_stages));
                    }
                    pipeline.stages.push(Stage::default());
                }
                READ => {
                    let path = self.advance().ok_or(ParseError::MissingInput)?;
                    current(&mut pipeline).input = Some(path);
                }
                WRITE => {
                    let path = self.advance().ok_or(ParseError::MissingOutput)?;
                    current(&mut pipeline).output = Some(path);
                }
                BACKGROUND => pipeline.background = true,
                word => current(&mut pipeline).argv.push(word),
            }
        }

        Ok(pipeline)
    }
}

fn current<'p, 'a>(pipeline: &'p mut Pipeline<'a>) -> &'p mut Stage<'a> {
    // `Pipeline::default` starts with one stage and stages are only pushed
    let last = pipeline.stages.len() - 1;
    &mut pipeline.stages[last]
}

/// Build a pipeline of at most `max_stages` stages from expanded tokens
pub fn build(tokens: &[String], max_stages: usize) -> Result<Pipeline<'_>, ParseError> {
    Parser::new(tokens, max_stages).parse()
}

//! Tokenization for pipesh
//!
//! Input lines are split on whitespace only. Operator characters (`|`, `<`,
//! `>`, `&`) are not split from adjacent text, so they are recognized by the
//! parser only when typed as standalone words.

use nom::{
    bytes::complete::take_till1,
    character::complete::multispace0,
    multi::many0,
    sequence::{delimited, preceded},
    IResult,
};

/// Parse a single whitespace-delimited word
fn word(input: &str) -> IResult<&str, &str> {
    preceded(multispace0, take_till1(char::is_whitespace))(input)
}

/// Parse every word in the input, consuming trailing whitespace
fn words(input: &str) -> IResult<&str, Vec<&str>> {
    delimited(multispace0, many0(word), multispace0)(input)
}

/// Split a line into an ordered sequence of owned word tokens
pub fn tokenize(input: &str) -> Vec<String> {
    words(input)
        .map(|(_, found)| found.into_iter().map(String::from).collect())
        .unwrap_or_default()
}

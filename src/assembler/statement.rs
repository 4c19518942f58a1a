//! [Statement] struct and line tokenization

use regex::Regex;

/// Build the lexer splitting a line into tokens. Tokens are separated by
/// whitespace and commas; a double-quoted string stays one token.
pub fn lexer() -> Regex {
    Regex::new(r#""[^"]*"|[^,\s]+"#).unwrap()
}

/// One source line lexed into tokens
#[derive(Debug, Clone)]
pub struct Statement<'a> {
    tokens: Vec<&'a str>,
    line_number: usize,
    line: &'a str,
}

impl<'a> Statement<'a> {
    /// Tokenize a line.
    pub fn tokenize(lexer: &Regex, line: &'a str, line_number: usize) -> Statement<'a> {
        let tokens = lexer.find_iter(line).map(|m| m.as_str()).collect();
        Statement {
            tokens,
            line_number,
            line,
        }
    }

    pub fn tokens(&self) -> &[&'a str] {
        &self.tokens
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// The raw source line
    pub fn line(&self) -> &'a str {
        self.line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens_of(line: &str) -> Vec<&str> {
        let lexer = lexer();
        lexer.find_iter(line).map(|m| m.as_str()).collect()
    }

    #[test]
    fn splits_on_whitespace_and_commas() {
        assert_eq!(tokens_of("mov r3, LENGTH"), vec!["mov", "r3", "LENGTH"]);
        assert_eq!(tokens_of("add  #5 ,r1"), vec!["add", "#5", "r1"]);
        assert_eq!(tokens_of("MAIN: mov *r2, r7"), vec!["MAIN:", "mov", "*r2", "r7"]);
    }

    #[test]
    fn quoted_strings_stay_whole() {
        assert_eq!(
            tokens_of(".string \"hello, world\""),
            vec![".string", "\"hello, world\""]
        );
    }

    #[test]
    fn trailing_comma_yields_no_empty_token() {
        assert_eq!(tokens_of(".data 1, 2,"), vec![".data", "1", "2"]);
    }

    #[test]
    fn statement_records_line_info() {
        let lexer = lexer();
        let statement = Statement::tokenize(&lexer, "stop", 12);
        assert_eq!(statement.tokens(), ["stop"]);
        assert_eq!(statement.line_number(), 12);
        assert_eq!(statement.line(), "stop");
    }
}

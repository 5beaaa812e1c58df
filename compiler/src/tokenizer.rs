use regex::Regex;
use lazy_static::lazy_static;
use crate::utils::{quote, error};
use crate::error::CompileError;

lazy_static! {
    pub static ref TOKEN_REGEX: Regex = Regex::new(
        r"((?s:/\*.*?\*/)|//[^\n]*|(?:-|\b)\d+(?:\.\d+)?\b|[=;:,{}\[\].]|\b[A-Za-z_][A-Za-z0-9_]*\b|\s+)"
    ).unwrap();
}

#[derive(Debug, PartialEq)]
pub struct Token {
    pub text:   String,
    pub line:   usize,
    pub column: usize,
}

fn is_trivia(part: &str) -> bool {
    part.starts_with("//")
        || part.starts_with("/*")
        || part.chars().all(char::is_whitespace)
}

/// Split schema text into position-tagged tokens, dropping comments and
/// whitespace and appending an empty EOF token.
pub fn tokenize_schema(text: &str) -> Result<Vec<Token>, CompileError> {
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut column = 1;
    let mut last_end = 0;

    for mat in TOKEN_REGEX.find_iter(text) {
        let start = mat.start();
        let end   = mat.end();
        let part  = mat.as_str();

        if start > last_end {
            let unexpected = &text[last_end..start];
            return Err(error(
                &format!("Syntax error: {}", quote(unexpected)),
                line,
                column,
            ));
        }

        if !is_trivia(part) {
            tokens.push(Token {
                text:   part.to_string(),
                line,
                column,
            });
        }

        // Update line/column, accounting for newlines inside block comments.
        let newline_count = part.matches('\n').count();
        if newline_count > 0 {
            line += newline_count;
            if let Some(last_line_part) = part.split('\n').next_back() {
                column = last_line_part.len() + 1;
            }
        } else {
            column += part.len();
        }

        last_end = end;
    }

    if last_end != text.len() {
        let unexpected = &text[last_end..];
        return Err(error(
            &format!("Syntax error: {}", quote(unexpected)),
            line,
            column,
        ));
    }

    tokens.push(Token {
        text:   "".to_string(),
        line,
        column,
    });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_field_declaration() {
        let input = "fov: float = 1.5;";
        let expected = vec![
            Token { text: "fov".into(),   line: 1, column: 1 },
            Token { text: ":".into(),     line: 1, column: 4 },
            Token { text: "float".into(), line: 1, column: 6 },
            Token { text: "=".into(),     line: 1, column: 12 },
            Token { text: "1.5".into(),   line: 1, column: 14 },
            Token { text: ";".into(),     line: 1, column: 17 },
            Token { text: "".into(),      line: 1, column: 18 },
        ];
        let got = tokenize_schema(input).unwrap();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_tokenize_array_forms() {
        let input = "[uint] [float:4]";
        let texts: Vec<String> = tokenize_schema(input)
            .unwrap()
            .into_iter()
            .map(|token| token.text)
            .collect();
        assert_eq!(texts, vec!["[", "uint", "]", "[", "float", ":", "4", "]", ""]);
    }

    #[test]
    fn test_tokenize_skips_comments() {
        let input = "table // trailing\n/* block\nspanning */ Camera";
        let got = tokenize_schema(input).unwrap();
        assert_eq!(got.len(), 3);
        assert_eq!(got[0].text, "table");
        assert_eq!(got[1].text, "Camera");
        // The identifier sits after the block comment on line 3.
        assert_eq!(got[1].line, 3);
        assert_eq!(got[1].column, 13);
    }

    #[test]
    fn test_tokenize_negative_number() {
        let input = "x = -12;";
        let texts: Vec<String> = tokenize_schema(input)
            .unwrap()
            .into_iter()
            .map(|token| token.text)
            .collect();
        assert_eq!(texts, vec!["x", "=", "-12", ";", ""]);
    }

    #[test]
    fn test_tokenize_unexpected_text() {
        let input = "table Foo @";
        let err = tokenize_schema(input).unwrap_err();
        assert!(
            matches!(err, CompileError::Grammar { .. }),
            "expected a grammar error but got {:?}",
            err
        );
    }
}

use crate::error::CompileError;

pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap()
}

pub fn error(msg: &str, line: usize, column: usize) -> CompileError {
    CompileError::Grammar {
        msg:    msg.to_string(),
        line,
        column,
    }
}

// BlueStack Token

use std::fmt;

/// One program token: an opcode mnemonic or the operand that follows it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub lexeme: String,
    /// 1-based source line
    pub line: usize,
}

impl Token {
    pub fn new(lexeme: impl Into<String>, line: usize) -> Self {
        Self {
            lexeme: lexeme.into(),
            line,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lexeme)
    }
}

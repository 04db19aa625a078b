// BlueStack Program
// Ordered token sequence with opcodes and operands interleaved

use std::fmt::Write;

use super::labels::LabelTable;
use super::opcode::Opcode;
use crate::config::MAX_PROGRAM_SIZE;
use crate::error::{VmError, VmResult};
use crate::lexer::Token;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    tokens: Vec<Token>,
    max_size: usize,
}

impl Program {
    pub fn new() -> Self {
        Self::with_limit(MAX_PROGRAM_SIZE)
    }

    pub fn with_limit(max_size: usize) -> Self {
        Self {
            tokens: Vec::new(),
            max_size,
        }
    }

    /// Build a program from bare lexemes, all on line 1
    pub fn from_lexemes<'a>(lexemes: impl IntoIterator<Item = &'a str>) -> VmResult<Self> {
        let mut program = Self::new();
        for lexeme in lexemes {
            program.push(Token::new(lexeme, 1))?;
        }
        Ok(program)
    }

    pub fn push(&mut self, token: Token) -> VmResult<()> {
        if self.tokens.len() >= self.max_size {
            return Err(VmError::capacity_exceeded(format!(
                "Program exceeds {} tokens",
                self.max_size
            )));
        }
        self.tokens.push(token);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Render a listing of the program the way the dispatcher will decode it
    pub fn listing(&self, name: &str, labels: &LabelTable) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "--- {} ---", name);

        let mut index = 0;
        while index < self.tokens.len() {
            for label in labels.names_at(index) {
                let _ = writeln!(out, "{}:", label);
            }

            let token = &self.tokens[index];
            let start = index;
            index += 1;

            match Opcode::from_mnemonic(&token.lexeme) {
                Some(op) if op.operand_count() == 1 => {
                    let operand = self
                        .tokens
                        .get(index)
                        .map(|t| t.lexeme.as_str())
                        .unwrap_or("<missing>");
                    index += 1;
                    let operand = if op == Opcode::Print {
                        format!("\"{}\"", operand)
                    } else {
                        operand.to_string()
                    };
                    let _ = writeln!(out, "{:04} {:>4} {:<12} {}", start, token.line, op, operand);
                }
                Some(op) => {
                    let _ = writeln!(out, "{:04} {:>4} {}", start, token.line, op);
                }
                None => {
                    let lexeme = &token.lexeme;
                    let _ = writeln!(out, "{:04} {:>4} ?? {}", start, token.line, lexeme);
                }
            }
        }

        for label in labels.names_at(self.tokens.len()) {
            let _ = writeln!(out, "{}:", label);
        }
        out
    }

    /// Disassemble the program for debugging
    pub fn disassemble(&self, name: &str, labels: &LabelTable) {
        print!("{}", self.listing(name, labels));
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

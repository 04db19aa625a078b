// BlueStack Scanner
// Turns source text into a Program plus its label table

use crate::config::Limits;
use crate::error::{Location, VmError, VmResult};
use crate::lexer::token::Token;
use crate::program::{LabelTable, OperandKind, Opcode, Program};

pub struct Scanner<'a> {
    source: &'a str,
    limits: Limits,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            limits: Limits::default(),
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Line-oriented source format used for files.
    ///
    /// Only the first token of a line is an instruction. A token ending in `:`
    /// declares a label at the current token count and the rest of the line is
    /// ignored. Opcodes that take an operand consume exactly one more piece of
    /// the line; `PRINT` takes the text between the next pair of double quotes.
    pub fn scan_program(&self) -> VmResult<(Program, LabelTable)> {
        let mut program = Program::with_limit(self.limits.max_program_size);
        let mut labels = LabelTable::with_limit(self.limits.max_labels);

        for (index, text) in self.source.lines().enumerate() {
            let line = index + 1;
            self.scan_source_line(text, line, &mut program, &mut labels)
                .map_err(|e| e.or_at(Location::Line(line)))?;
        }

        Ok((program, labels))
    }

    fn scan_source_line(
        &self,
        text: &str,
        line: usize,
        program: &mut Program,
        labels: &mut LabelTable,
    ) -> VmResult<()> {
        let (word, rest) = match next_word(text) {
            Some(split) => split,
            None => return Ok(()),
        };

        if let Some(label) = word.strip_suffix(':') {
            return labels.declare(label, program.len());
        }

        program.push(Token::new(word, line))?;

        let kind = match Opcode::from_mnemonic(word) {
            Some(op) => op.operand_kind(),
            // Unknown mnemonics load fine; the dispatcher rejects them
            None => OperandKind::None,
        };

        let operand = match kind {
            OperandKind::None => return Ok(()),
            OperandKind::Word | OperandKind::Label => next_word(rest).map(|(w, _)| w),
            OperandKind::Text => quoted_text(rest),
        };

        match operand {
            Some(operand) => program.push(Token::new(operand, line)),
            None => Err(VmError::missing_operand(word)),
        }
    }

    /// Free-form format used for console lines.
    ///
    /// Every whitespace-delimited token goes into the program and a quoted run
    /// is a single token. Labels index into this line's program only, so the
    /// table comes back fresh with the program.
    pub fn scan_interactive(&self) -> VmResult<(Program, LabelTable)> {
        let mut program = Program::with_limit(self.limits.max_program_size);
        let mut labels = LabelTable::with_limit(self.limits.max_labels);

        for (index, text) in self.source.lines().enumerate() {
            let line = index + 1;
            for (lexeme, quoted) in split_interactive(text) {
                let declared = if quoted { None } else { lexeme.strip_suffix(':') };
                let result = match declared {
                    Some(label) => labels.declare(label, program.len()),
                    None => program.push(Token::new(lexeme, line)),
                };
                result.map_err(|e| e.or_at(Location::Line(line)))?;
            }
        }

        Ok((program, labels))
    }
}

fn next_word(text: &str) -> Option<(&str, &str)> {
    let trimmed = text.trim_start();
    if trimmed.is_empty() {
        return None;
    }
    let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
    Some((&trimmed[..end], &trimmed[end..]))
}

/// Text after the first `"` up to the next one, or to the end of the line
fn quoted_text(text: &str) -> Option<&str> {
    let start = text.find('"')? + 1;
    let body = &text[start..];
    let end = body.find('"').unwrap_or(body.len());
    Some(&body[..end])
}

fn split_interactive(text: &str) -> Vec<(&str, bool)> {
    let mut parts = Vec::new();
    let mut rest = text;

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        if let Some(body) = rest.strip_prefix('"') {
            let end = body.find('"').unwrap_or(body.len());
            parts.push((&body[..end], true));
            rest = body.get(end + 1..).unwrap_or("");
        } else {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            parts.push((&rest[..end], false));
            rest = &rest[end..];
        }
    }

    parts
}

// Integer reader behind READ
// Keeps the unread part of the current input line between reads

use std::io::BufRead;

use crate::error::{VmError, VmResult};

pub struct InputReader<R> {
    reader: R,
    pending: Vec<u8>,
    cursor: usize,
}

impl<R: BufRead> InputReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: Vec::new(),
            cursor: 0,
        }
    }

    /// Read the next integer, skipping whitespace and blank lines.
    ///
    /// Digits are taken as far as they go, so `12abc` yields 12 and leaves
    /// `abc` for the next read. When no integer starts at the cursor the rest
    /// of that line is thrown away and the read fails. Input is taken as raw
    /// bytes, so text that is not UTF-8 is just another bad token.
    pub fn read_int(&mut self) -> VmResult<i32> {
        loop {
            let rest = &self.pending[self.cursor..];
            let skipped = rest.iter().take_while(|b| b.is_ascii_whitespace()).count();
            self.cursor += skipped;
            if self.cursor < self.pending.len() {
                break;
            }
            if !self.fill_line()? {
                return Err(VmError::invalid_input());
            }
        }

        match scan_int(&self.pending[self.cursor..]) {
            Some((value, used)) => {
                self.cursor += used;
                Ok(value)
            }
            None => {
                self.discard_line();
                Err(VmError::invalid_input())
            }
        }
    }

    /// Drop whatever is left of the current line
    pub fn discard_line(&mut self) {
        self.pending.clear();
        self.cursor = 0;
    }

    fn fill_line(&mut self) -> VmResult<bool> {
        self.pending.clear();
        self.cursor = 0;
        let read = self.reader.read_until(b'\n', &mut self.pending)?;
        Ok(read > 0)
    }
}

/// Optional sign then at least one digit; returns the value and bytes used
fn scan_int(bytes: &[u8]) -> Option<(i32, usize)> {
    let mut pos = 0;
    let negative = match bytes.first() {
        Some(b'-') => {
            pos += 1;
            true
        }
        Some(b'+') => {
            pos += 1;
            false
        }
        _ => false,
    };

    let digits_start = pos;
    let mut value: i32 = 0;
    while let Some(&b) = bytes.get(pos) {
        if !b.is_ascii_digit() {
            break;
        }
        value = value.wrapping_mul(10).wrapping_add((b - b'0') as i32);
        pos += 1;
    }

    if pos == digits_start {
        return None;
    }
    Some((if negative { value.wrapping_neg() } else { value }, pos))
}

/// Integer literal for PUSH: leading digits count, anything else reads as 0
pub fn parse_literal(text: &str) -> i32 {
    scan_int(text.trim_start().as_bytes()).map(|(value, _)| value).unwrap_or(0)
}

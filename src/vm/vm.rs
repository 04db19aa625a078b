// BlueStack Virtual Machine
// Fetch-decode-execute loop over a token program and a stack manager

use colored::*;
use std::io::{self, BufRead, StdinLock, Stdout, Write};

use crate::error::{Location, VmError, VmResult};
use crate::program::{LabelTable, Opcode, Program};
use crate::vm::input::{parse_literal, InputReader};
use crate::vm::stack::StackManager;

/// Runs programs against a stack manager, reading and writing through the
/// streams it was built with. The streams outlive single runs so buffered
/// console input carries over between them.
pub struct Interpreter<R, W> {
    input: InputReader<R>,
    output: W,
    trace_enabled: bool,
}

impl Interpreter<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Interpreter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: InputReader::new(input),
            output,
            trace_enabled: false,
        }
    }

    /// Print every instruction on stderr before it runs
    pub fn set_trace_enabled(&mut self, enabled: bool) {
        self.trace_enabled = enabled;
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Run until HALT, the end of the program, or the first error.
    ///
    /// An error stops the run at the failing instruction. Whatever earlier
    /// instructions did to `stacks` stays in place.
    pub fn execute(
        &mut self,
        program: &Program,
        labels: &LabelTable,
        stacks: &mut StackManager,
    ) -> VmResult<()> {
        let result = self.run_loop(program, labels, stacks);
        let flushed = self.output.flush().map_err(VmError::from);
        result.and(flushed)
    }

    fn run_loop(
        &mut self,
        program: &Program,
        labels: &LabelTable,
        stacks: &mut StackManager,
    ) -> VmResult<()> {
        let mut pc = 0;

        while let Some(token) = program.get(pc) {
            if token.lexeme == Opcode::Halt.mnemonic() {
                break;
            }

            let at = pc;
            let location = || Location::Instruction {
                pc: at,
                opcode: token.lexeme.clone(),
            };

            let op = Opcode::from_mnemonic(&token.lexeme)
                .ok_or_else(|| VmError::unknown_opcode(&token.lexeme).at(location()))?;
            pc += 1;

            let operand = if op.operand_count() == 1 {
                let operand = program
                    .get(pc)
                    .ok_or_else(|| VmError::missing_operand(op.mnemonic()).at(location()))?;
                pc += 1;
                Some(operand.lexeme.as_str())
            } else {
                None
            };

            if self.trace_enabled {
                trace_instruction(at, op, operand, stacks);
            }

            if let Some(target) = self
                .execute_one(op, operand.unwrap_or(""), labels, stacks)
                .map_err(|e| e.or_at(location()))?
            {
                pc = target;
            }
        }

        Ok(())
    }

    /// Execute a single instruction. Returns the new pc when it jumps.
    fn execute_one(
        &mut self,
        op: Opcode,
        operand: &str,
        labels: &LabelTable,
        stacks: &mut StackManager,
    ) -> VmResult<Option<usize>> {
        match op {
            Opcode::InitStack => {
                stacks.create(operand)?;
            }

            Opcode::CurrentStack => {
                let index = find_stack(stacks, operand)?;
                stacks.select(index)?;
            }

            Opcode::Copy => {
                let from = find_stack(stacks, operand)?;
                let to = stacks.current_index();
                stacks.copy(from, to)?;
            }

            Opcode::DeleteStack => {
                let index = find_stack(stacks, operand)?;
                stacks.delete(index)?;
            }

            Opcode::Flush => stacks.clear_current(),

            Opcode::Push => stacks.push(parse_literal(operand))?,

            Opcode::Pop => {
                stacks.pop()?;
            }

            Opcode::Swap => {
                let a = stacks.pop()?;
                let b = stacks.pop()?;
                stacks.push(a)?;
                stacks.push(b)?;
            }

            Opcode::Dup => {
                let top = stacks.peek()?;
                stacks.push(top)?;
            }

            Opcode::Dup2 => {
                let a = stacks.pop()?;
                let b = stacks.pop()?;
                stacks.push(b)?;
                stacks.push(a)?;
                stacks.push(b)?;
                stacks.push(a)?;
            }

            Opcode::Add => binary_op(stacks, |b, a| Ok(b.wrapping_add(a)))?,
            Opcode::Sub => binary_op(stacks, |b, a| Ok(b.wrapping_sub(a)))?,
            Opcode::Mul => binary_op(stacks, |b, a| Ok(b.wrapping_mul(a)))?,
            // Both operands are already off the stack when the zero check fails
            Opcode::Div => binary_op(stacks, |b, a| {
                if a == 0 {
                    return Err(VmError::divide_by_zero());
                }
                Ok(b.wrapping_div(a))
            })?,
            Opcode::Mod => binary_op(stacks, |b, a| {
                if a == 0 {
                    return Err(VmError::divide_by_zero());
                }
                Ok(b.wrapping_rem(a))
            })?,

            Opcode::Print => {
                let text = unescape(operand);
                self.output.write_all(text.as_bytes())?;
            }

            Opcode::Top => {
                let top = stacks.peek()?;
                writeln!(self.output, "{}", top)?;
            }

            Opcode::Read => {
                // Prompts written by PRINT must be visible before blocking
                self.output.flush()?;
                let value = self.input.read_int()?;
                stacks.push(value)?;
            }

            Opcode::Dump => write_stacks(&mut self.output, stacks)?,

            Opcode::Jump => return resolve_label(labels, operand).map(Some),

            Opcode::JumpIfZero | Opcode::JumpIfPositive | Opcode::JumpIfNegative => {
                let top = stacks.peek()?;
                let taken = match op {
                    Opcode::JumpIfZero => top == 0,
                    Opcode::JumpIfPositive => top > 0,
                    _ => top < 0,
                };
                if taken {
                    return resolve_label(labels, operand).map(Some);
                }
            }

            Opcode::Halt => {}
        }

        Ok(None)
    }
}

/// Pop a, pop b, push f(b, a)
fn binary_op(
    stacks: &mut StackManager,
    f: impl FnOnce(i32, i32) -> VmResult<i32>,
) -> VmResult<()> {
    let a = stacks.pop()?;
    let b = stacks.pop()?;
    let result = f(b, a)?;
    stacks.push(result)
}

fn find_stack(stacks: &StackManager, name: &str) -> VmResult<usize> {
    stacks
        .find_by_name(name)
        .ok_or_else(|| VmError::stack_not_found(name))
}

fn resolve_label(labels: &LabelTable, name: &str) -> VmResult<usize> {
    labels
        .resolve(name)
        .ok_or_else(|| VmError::label_not_found(name))
}

/// `\n` becomes a newline and `\t` a tab; every other character is kept
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some('n') => {
                    chars.next();
                    out.push('\n');
                    continue;
                }
                Some('t') => {
                    chars.next();
                    out.push('\t');
                    continue;
                }
                _ => {}
            }
        }
        out.push(c);
    }
    out
}

/// Every stack in collection order, values top first
pub fn write_stacks<W: Write>(out: &mut W, stacks: &StackManager) -> io::Result<()> {
    for stack in stacks.stacks() {
        writeln!(out, "Stack {}: ", stack.name())?;
        for value in stack.values().iter().rev() {
            writeln!(out, "[_{}_]", value)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn trace_instruction(pc: usize, op: Opcode, operand: Option<&str>, stacks: &StackManager) {
    let stack = stacks.current_stack();
    eprintln!(
        "{} pc={:<4} {:<12} {:<10} {}={:?}",
        "[TRACE]".bright_black(),
        pc,
        op.mnemonic(),
        operand.unwrap_or(""),
        stack.name(),
        stack.values()
    );
}

// BlueStack Session
// State that outlives single runs in the interactive console

use std::io::{BufRead, Write};

use crate::config::Limits;
use crate::error::VmResult;
use crate::lexer::Scanner;
use crate::program::{LabelTable, Program};
use crate::vm::stack::StackManager;
use crate::vm::vm::Interpreter;

/// One StackManager and one LabelTable kept by the console.
///
/// Stacks carry over from line to line. Label entries point into the program
/// of the line that declared them, so each line replaces the table: a jump to
/// an earlier line's label fails with `LabelNotFound`, and the same label may
/// be declared again on a later line.
pub struct Session {
    stacks: StackManager,
    labels: LabelTable,
    limits: Limits,
}

impl Session {
    pub fn new(limits: Limits) -> Self {
        Self {
            stacks: StackManager::with_limits(limits),
            labels: LabelTable::with_limit(limits.max_labels),
            limits,
        }
    }

    pub fn stacks(&self) -> &StackManager {
        &self.stacks
    }

    /// Labels of the most recent line that scanned cleanly
    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// Scan one console line and run it against the session stacks
    pub fn run_line<R: BufRead, W: Write>(
        &mut self,
        line: &str,
        interp: &mut Interpreter<R, W>,
    ) -> VmResult<()> {
        let (program, labels) = Scanner::new(line)
            .with_limits(self.limits)
            .scan_interactive()?;
        self.labels = labels;
        if program.is_empty() {
            return Ok(());
        }
        interp.execute(&program, &self.labels, &mut self.stacks)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Limits::default())
    }
}

/// A finished run on a fresh stack manager.
/// The stacks are kept whether or not the run ended normally.
pub struct RunOutcome {
    pub stacks: StackManager,
    pub result: VmResult<()>,
}

/// Run a loaded program on a new stack manager
pub fn run_fresh<R: BufRead, W: Write>(
    program: &Program,
    labels: &LabelTable,
    limits: Limits,
    interp: &mut Interpreter<R, W>,
) -> RunOutcome {
    let mut stacks = StackManager::with_limits(limits);
    let result = interp.execute(program, labels, &mut stacks);
    RunOutcome { stacks, result }
}

/// Load line-oriented source and run it on a new stack manager.
/// Load errors come back directly; run errors sit in the outcome.
pub fn run_source<R: BufRead, W: Write>(
    source: &str,
    limits: Limits,
    interp: &mut Interpreter<R, W>,
) -> VmResult<RunOutcome> {
    let (program, labels) = Scanner::new(source).with_limits(limits).scan_program()?;
    Ok(run_fresh(&program, &labels, limits, interp))
}

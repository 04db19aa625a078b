// BlueStack
// A virtual machine over several named integer stacks

pub mod config;
pub mod error;
pub mod lexer;
pub mod program;
pub mod vm;

use std::io::{BufRead, Write};

use error::VmResult;
use program::{LabelTable, Program};
use vm::{Interpreter, StackManager};

/// Run `program` on the process console.
///
/// Ends normally at `HALT` or the end of the program; any failure aborts the
/// run and comes back as the error. Stacks keep what earlier instructions did.
pub fn execute(
    program: &Program,
    labels: &LabelTable,
    stacks: &mut StackManager,
) -> VmResult<()> {
    Interpreter::stdio().execute(program, labels, stacks)
}

/// Same as [`execute`] with caller-supplied streams
pub fn execute_with<R: BufRead, W: Write>(
    program: &Program,
    labels: &LabelTable,
    stacks: &mut StackManager,
    input: R,
    output: W,
) -> VmResult<()> {
    Interpreter::new(input, output).execute(program, labels, stacks)
}

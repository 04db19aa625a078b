pub mod input;
pub mod session;
pub mod stack;
pub mod vm;

pub use input::InputReader;
pub use session::{run_fresh, run_source, RunOutcome, Session};
pub use stack::{Stack, StackManager, DEFAULT_STACK, MAIN_STACK};
pub use vm::{unescape, write_stacks, Interpreter};

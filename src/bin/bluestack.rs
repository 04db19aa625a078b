// BlueStack CLI - Command Line Interface
// Usage: bluestack [FILE] [OPTIONS]

use clap::Parser;
use colored::*;
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use bluestack_core::config::{Config, Limits};
use bluestack_core::lexer::Scanner;
use bluestack_core::program::{LabelTable, Program};
use bluestack_core::vm::{run_fresh, unescape, write_stacks, Interpreter, Session, StackManager};

/// BlueStack - a virtual machine over named integer stacks
#[derive(Parser)]
#[command(name = "bluestack")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A virtual machine over named integer stacks", long_about = None)]
struct Cli {
    /// Program file to run
    file: Option<PathBuf>,

    /// Debug options: tokens, asm, trace, stacks (comma-separated)
    #[arg(short = 'd', long = "debug", value_delimiter = ',')]
    debug: Option<Vec<String>>,

    /// Execute inline source
    #[arg(short = 'e', long = "exec")]
    exec: Option<String>,

    /// Check for load errors without running
    #[arg(long = "check")]
    check: bool,

    /// Config file (default: nearest bluestack.json)
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Override the maximum number of stacks
    #[arg(long = "max-stacks")]
    max_stacks: Option<usize>,

    /// Override the capacity of each stack
    #[arg(long = "stack-capacity")]
    stack_capacity: Option<usize>,
}

fn main() {
    let cli = Cli::parse();

    let debug = DebugFlags::from_options(&cli.debug);

    let result = load_config(&cli).and_then(|config| {
        if let Some(code) = &cli.exec {
            handle_exec(code, &config, &debug)
        } else if let Some(path) = &cli.file {
            if cli.check {
                handle_check(path, &config)
            } else {
                handle_run(path, &config, &debug)
            }
        } else {
            repl(&config, &debug)
        }
    });

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

#[derive(Default, Clone)]
struct DebugFlags {
    tokens: bool,
    asm: bool,
    trace: bool,
    stacks: bool,
}

impl DebugFlags {
    fn from_options(opts: &Option<Vec<String>>) -> Self {
        let mut flags = Self::default();
        if let Some(opts) = opts {
            for opt in opts {
                match opt.as_str() {
                    "tokens" => flags.tokens = true,
                    "asm" => flags.asm = true,
                    "trace" => flags.trace = true,
                    "stacks" => flags.stacks = true,
                    _ => eprintln!("{} Unknown debug option: {}", "!".yellow(), opt),
                }
            }
        }
        flags
    }
}

fn load_config(cli: &Cli) -> Result<Config, String> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path).map_err(|e| e.format())?,
        None => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            Config::discover(&cwd)
                .map_err(|e| e.format())?
                .unwrap_or_default()
        }
    };

    if let Some(max_stacks) = cli.max_stacks {
        if max_stacks == 0 {
            return Err(format!("{} --max-stacks must be at least 1", "!".red()));
        }
        config.limits.max_stacks = max_stacks;
    }
    if let Some(capacity) = cli.stack_capacity {
        config.limits.stack_capacity = capacity;
    }
    Ok(config)
}

fn read_source(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("Error reading file '{}': {}", path.display(), e))
}

fn load(source: &str, limits: Limits) -> Result<(Program, LabelTable), String> {
    Scanner::new(source)
        .with_limits(limits)
        .scan_program()
        .map_err(|e| e.format())
}

/// Check file for load errors without running
fn handle_check(path: &Path, config: &Config) -> Result<(), String> {
    let source = read_source(path)?;
    load(&source, config.limits)?;
    println!("{} No errors found in {}", "✓".green(), path.display());
    Ok(())
}

fn handle_run(path: &Path, config: &Config, debug: &DebugFlags) -> Result<(), String> {
    let source = read_source(path)?;
    let name = path.to_string_lossy().to_string();
    let mut interp = Interpreter::stdio();
    run_program(&source, &name, config.limits, debug, &mut interp)
}

/// Execute inline code
fn handle_exec(code: &str, config: &Config, debug: &DebugFlags) -> Result<(), String> {
    let mut interp = Interpreter::stdio();
    run_program(code, "<exec>", config.limits, debug, &mut interp)
}

/// Load source and run it on a fresh stack manager
fn run_program<R: BufRead, W: Write>(
    source: &str,
    name: &str,
    limits: Limits,
    debug: &DebugFlags,
    interp: &mut Interpreter<R, W>,
) -> Result<(), String> {
    let (program, labels) = load(source, limits)?;

    // Show tokens if requested
    if debug.tokens {
        println!("{}", "-- Tokens --".cyan());
        for token in program.tokens() {
            println!("  {:>4} '{}'", token.line, token.lexeme);
        }
        println!();
        return Ok(());
    }

    if debug.asm {
        program.disassemble(name, &labels);
    }

    interp.set_trace_enabled(debug.trace);
    let outcome = run_fresh(&program, &labels, limits, interp);

    if debug.stacks {
        dump_stacks(&outcome.stacks);
    }
    outcome.result.map_err(|e| e.format())
}

fn dump_stacks(stacks: &StackManager) {
    eprintln!("{}", "-- Stacks --".cyan());
    let _ = write_stacks(&mut std::io::stderr(), stacks);
}

fn repl(config: &Config, debug: &DebugFlags) -> Result<(), String> {
    use reedline::{
        FileBackedHistory, Prompt, PromptHistorySearch, PromptHistorySearchStatus, Reedline,
        Signal,
    };
    use std::borrow::Cow;

    struct ConsolePrompt;

    impl Prompt for ConsolePrompt {
        fn render_prompt_left(&self) -> Cow<'_, str> {
            Cow::Owned(":->".blue().bold().to_string())
        }
        fn render_prompt_right(&self) -> Cow<'_, str> {
            Cow::Borrowed("")
        }
        fn render_prompt_indicator(&self, _: reedline::PromptEditMode) -> Cow<'_, str> {
            Cow::Borrowed(" ")
        }
        fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
            Cow::Borrowed("... ")
        }
        fn render_prompt_history_search_indicator(
            &self,
            history_search: PromptHistorySearch,
        ) -> Cow<'_, str> {
            let prefix = match history_search.status {
                PromptHistorySearchStatus::Passing => "",
                PromptHistorySearchStatus::Failing => "failing ",
            };
            Cow::Owned(format!("({}reverse-search: {}) ", prefix, history_search.term))
        }
    }

    print_banner();

    let history_path = dirs_home().join(".bluestack_history");
    let history = Box::new(
        FileBackedHistory::with_file(config.history_size, history_path)
            .map_err(|e| e.to_string())?,
    );

    let mut line_editor = Reedline::create().with_history(history);
    let prompt = ConsolePrompt;

    // Stacks and labels persist across lines
    let mut session = Session::new(config.limits);
    let mut interp = Interpreter::stdio();
    interp.set_trace_enabled(debug.trace);

    loop {
        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(line)) => {
                let input = line.trim_end();

                match Command::parse(input) {
                    Command::Exit => break,
                    Command::Help => print_help(),
                    Command::Clear => {
                        print!("\x1B[2J\x1B[1;1H");
                        let _ = std::io::stdout().flush();
                    }
                    Command::Print(text) => println!("{}", unescape(text)),
                    Command::Run(file) => {
                        if file.is_empty() {
                            eprintln!("{}", "Error: No file name provided for RUN command".red());
                            continue;
                        }
                        let path = PathBuf::from(file);
                        let result = read_source(&path).and_then(|source| {
                            run_program(&source, file, config.limits, debug, &mut interp)
                        });
                        if let Err(e) = result {
                            eprintln!("{}", e);
                        }
                    }
                    Command::Line(code) => {
                        if let Err(e) = session.run_line(code, &mut interp) {
                            eprintln!("{}", e.format());
                        }
                        if debug.stacks {
                            dump_stacks(session.stacks());
                        }
                    }
                }
            }
            Ok(Signal::CtrlC) => {
                println!("{}", "^C".bright_black());
                continue;
            }
            Ok(Signal::CtrlD) => {
                println!("{}", "^D".bright_black());
                break;
            }
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}

/// Console line, sorted into built-in commands and program text
#[derive(Debug, PartialEq)]
enum Command<'a> {
    Exit,
    Help,
    Clear,
    Print(&'a str),
    Run(&'a str),
    Line(&'a str),
}

impl<'a> Command<'a> {
    fn parse(input: &'a str) -> Self {
        if input == "EXIT" {
            Command::Exit
        } else if input == "HELP" {
            Command::Help
        } else if input == "RUN" {
            Command::Run("")
        } else if let Some(file) = input.strip_prefix("RUN ") {
            Command::Run(file.trim())
        } else if let Some(text) = input.strip_prefix("PRINT ") {
            Command::Print(text)
        } else if input.starts_with("CLS") {
            Command::Clear
        } else {
            Command::Line(input)
        }
    }
}

fn print_banner() {
    let art = [
        r" ___ _   _   _ ___ ___ _____ _   ___ _  __",
        r"| _ ) | | | | | __/ __|_   _/_\ / __| |/ /",
        r"| _ \ |_| |_| | _|\__ \ | |/ _ \ (__| ' < ",
        r"|___/____\___/|___|___/ |_/_/ \_\___|_|\ \",
    ];
    println!();
    for line in art {
        println!("{}", line.blue().bold());
    }
    println!(
        "{}{}",
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black(),
        r"                                   \_\".blue().bold()
    );
    println!("  {}", "Type HELP for commands, EXIT to quit".bright_black());
    println!();
}

const HELP_TEXT: &str = "\
Console commands
  RUN <file>          run a program file on fresh stacks
  PRINT <text>        print text (\\n and \\t are expanded)
  CLS                 clear the screen
  HELP                show this help
  EXIT                quit

Anything else runs as instructions on the session stacks,
for example: PUSH 3 PUSH 4 ADD TOP

Stacks
  INITSTACK <name>    create a stack
  CURRENTSTACK <name> select a stack
  COPY <name>         copy the top of <name> onto the current stack
  DELETESTACK <name>  remove a stack
  FLUSH               empty the current stack
  DUMP                show every stack

Values
  PUSH <int>  POP  SWAP  DUP  DUP2
  ADD  SUB  MUL  DIV  MOD
  TOP                 print the top value
  READ                read an integer
  PRINT \"<text>\"      print text

Control
  <label>:            mark a position
  JUMP <label>        jump
  JUMP.=0 / JUMP.>0 / JUMP.<0 <label>
                      jump when the top value is zero / positive / negative
  HALT                stop";

fn print_help() {
    println!("   {}", "_".repeat(55));
    for line in HELP_TEXT.lines() {
        println!("  |  {}", line);
    }
    println!("   {}", "_".repeat(55));
}

/// Get home directory for history file
fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parse() {
        assert_eq!(Command::parse("EXIT"), Command::Exit);
        assert_eq!(Command::parse("HELP"), Command::Help);
        assert_eq!(Command::parse("CLS"), Command::Clear);
        assert_eq!(Command::parse("RUN"), Command::Run(""));
        assert_eq!(Command::parse("RUN  demo.bs "), Command::Run("demo.bs"));
        assert_eq!(Command::parse("PRINT hi\\n"), Command::Print("hi\\n"));
        assert_eq!(Command::parse("PUSH 1 TOP"), Command::Line("PUSH 1 TOP"));
        assert_eq!(Command::parse("EXITS"), Command::Line("EXITS"));
    }

    #[test]
    fn test_run_program_fresh_stacks() {
        let mut interp = Interpreter::new("".as_bytes(), Vec::new());
        let debug = DebugFlags::default();
        run_program("PUSH 2\nDUP\nMUL\nTOP\n", "<test>", Limits::default(), &debug, &mut interp)
            .unwrap();
        run_program("PUSH 5\nTOP\n", "<test>", Limits::default(), &debug, &mut interp).unwrap();
        assert_eq!(interp.output(), b"4\n5\n");
    }

    #[test]
    fn test_run_program_reports_failure() {
        let mut interp = Interpreter::new("".as_bytes(), Vec::new());
        let debug = DebugFlags {
            stacks: true,
            ..DebugFlags::default()
        };
        let source = "PUSH 1\nTOP\nPOP\nPOP\n";
        let err = run_program(source, "<test>", Limits::default(), &debug, &mut interp)
            .unwrap_err();
        assert!(err.contains("StackUnderflow"));
        assert_eq!(interp.output(), b"1\n");
    }
}

//! The Monkey command-line interpreter: runs a source file, or drops into a
//! read-eval-print loop when invoked without one.

use anyhow::Context;
use getopts::Options;
use monkey_lang::evaluator;
use monkey_lang::lexer::Lexer;
use monkey_lang::object::{Environment, Object};
use monkey_lang::parser::Parser;

use std::cell::RefCell;
use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::process;
use std::rc::Rc;

const PROMPT: &str = ">> ";

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optflag("h", "help", "print this help menu");
    opts.optflag("l", "lex", "only lex the input and print its tokens");

    let matches = opts.parse(&args[1..])?;

    if matches.opt_present("h") {
        let brief = format!("Usage: {} [options] [file]", program);
        print!("{}", opts.usage(&brief));
        return Ok(());
    }

    // With no file argument, start an interactive session.
    let path = match matches.free.first() {
        Some(path) => path,
        None => return repl(),
    };

    let source =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path))?;

    if matches.opt_present("l") {
        return lex(&source, path);
    }

    let env = Environment::new();
    match run(&source, Some(path.as_str()), &env) {
        Ok(Object::Null) => {}
        Ok(value) => println!("{}", value),
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    }

    Ok(())
}

// Dumps the token stream of a source file, for debugging the lexer.
fn lex(source: &str, path: &str) -> anyhow::Result<()> {
    let tokens = Lexer::with_file(source, path).lex()?;
    for t in &tokens {
        println!("{}\t{}", t.position, t);
    }

    Ok(())
}

// Reads lines from stdin and evaluates each within a single root
// environment, so bindings persist across lines. Errors are reported and
// the loop continues.
fn repl() -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    let env = Environment::new();

    let mut line = String::new();
    loop {
        stdout.write_all(PROMPT.as_bytes())?;
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }

        match run(&line, None, &env) {
            Ok(Object::Null) => {}
            Ok(value) => println!("{}", value),
            Err(err) => println!("{}", err),
        }
    }
}

// Parses and evaluates one source text within `env`.
fn run(source: &str, file: Option<&str>, env: &Rc<RefCell<Environment>>) -> Result<Object, String> {
    let lexer = match file {
        Some(file) => Lexer::with_file(source, file),
        None => Lexer::new(source),
    };

    let mut parser = Parser::new(lexer).map_err(|err| err.to_string())?;
    let program = parser.parse().map_err(|err| err.to_string())?;

    evaluator::eval(&program, env).map_err(|err| err.to_string())
}

use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result, bail};

use minipy::interpreter::Interpreter;
use minipy::{analyser, lexer, parser};

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let mut dump_tokens = false;
    let mut dump_ast = false;
    let mut input_path: Option<String> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dump-tokens" => dump_tokens = true,
            "--dump-ast" => dump_ast = true,
            _ => {
                input_path = Some(arg);
                if args.next().is_some() {
                    bail!("Only one input file is supported");
                }
                break;
            }
        }
    }

    let source = if let Some(path) = input_path {
        fs::read_to_string(&path).with_context(|| format!("Reading {path}"))?
    } else {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Reading stdin")?;
        buffer
    };

    let stream = match lexer::tokenize(&source) {
        Ok(stream) => stream,
        Err(error) => {
            eprintln!("Lexic error: {error}");
            bail!("lexical analysis failed");
        }
    };
    if dump_tokens {
        print!("{}", stream.table_summary());
    }

    let program = match parser::parse(&stream) {
        Ok(program) => program,
        Err(error) => {
            eprintln!("Syntax error: {error}");
            bail!("parsing failed");
        }
    };
    if dump_ast {
        print!("{program}");
    }

    if let Err(error) = analyser::analyse(&program) {
        eprintln!("Semantic error: {error}");
        bail!("semantic analysis failed");
    }

    let mut interpreter = Interpreter::new(&program);
    let result = interpreter.run();

    // Lines printed before a failing statement stay visible, ahead of
    // the diagnostic.
    let output = interpreter.output().join("\n");
    if !output.is_empty() {
        println!("{output}");
    }
    if let Err(error) = result {
        eprintln!("Interpreter error: {error}");
        bail!("interpretation failed");
    }
    Ok(())
}

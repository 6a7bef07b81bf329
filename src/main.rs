mod debug_report;

use patter::{Engine, Options, Session, loader};
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let mut engine = Engine::new();
    let mut report = loader::LoadReport::default();
    for path in &config.rules {
        match loader::load_path(&mut engine, path) {
            Ok(part) => report.absorb(part),
            Err(err) => {
                eprintln!("error: {err}");
                std::process::exit(1);
            }
        }
    }

    let mut session = Session::new();
    let options = Options { max_steps: config.budget };
    let (outcome, details) = engine.match_verbose(&config.input, &mut session, &options);

    debug_report::print_run(&config.input, &report, &engine.stats(), &outcome, &details, config.color);
}

struct CliConfig {
    rules: Vec<PathBuf>,
    input: String,
    budget: usize,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut rules: Vec<PathBuf> = Vec::new();
    let mut input: Option<String> = None;
    let mut budget = Options::default().max_steps;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1).peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("patter {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--rules" | "-r" => {
                let value = args.next().ok_or_else(|| "error: --rules expects a path".to_string())?;
                rules.push(PathBuf::from(value));
            }
            "--budget" => {
                let value = args.next().ok_or_else(|| "error: --budget expects a number".to_string())?;
                budget = parse_budget(&value)?;
            }
            "--input" | "-i" => {
                let value = args.next().ok_or_else(|| "error: --input expects a value".to_string())?;
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(value);
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    if input.is_some() {
                        return Err("error: input provided multiple times".to_string());
                    }
                    input = Some(rest);
                }
                break;
            }
            _ if arg.starts_with("--rules=") => {
                rules.push(PathBuf::from(arg.trim_start_matches("--rules=")));
            }
            _ if arg.starts_with("--budget=") => {
                budget = parse_budget(arg.trim_start_matches("--budget="))?;
            }
            _ if arg.starts_with("--input=") => {
                let value = arg.trim_start_matches("--input=");
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(value.to_string());
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" ");
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(rest);
                break;
            }
        }
    }

    if rules.is_empty() {
        return Err(format!("error: no rules provided (use --rules)\n\n{}", help_text()));
    }

    let input = match input {
        Some(value) => value,
        None => read_stdin_input()?,
    };

    if input.trim().is_empty() {
        return Err(format!("error: no input provided\n\n{}", help_text()));
    }

    Ok(CliConfig { rules, input, budget, color })
}

fn parse_budget(value: &str) -> Result<usize, String> {
    value.parse::<usize>().map_err(|_| format!("error: invalid --budget '{value}' (expected a number)"))
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "patter {version}

Graph-master pattern matching CLI.

Usage:
  patter --rules <path> [OPTIONS] [--] <input...>
  patter --rules <path> [OPTIONS] --input <text>

Options:
  -r, --rules <path>   Rules file or directory of rules files. Repeatable.
  -i, --input <text>   Utterance to match. If omitted, reads remaining args
                       or stdin when no args are provided.
  --budget <n>         Search step budget. Default: {default_budget}
  --color              Force ANSI color output.
  --no-color           Disable ANSI color output.
  -h, --help           Show this help message.
  -V, --version        Print version information.

Environment:
  PATTER_DEBUG_MATCH=1   Trace every branch decision during search.

Exit codes:
  0  Success.
  1  Rules could not be loaded.
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION"),
        default_budget = Options::default().max_steps
    )
}

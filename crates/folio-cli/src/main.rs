// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result, anyhow, bail};
use config::Config;
use runtime::{Command, Runtime};
use std::env;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `folio --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    init_logging(config.log_level())?;

    let runtime = Runtime::from_config(&config)?;
    if options.check_only {
        return Ok(());
    }

    let Some(command) = options.command else {
        print_help();
        return Ok(());
    };
    let stdout = io::stdout();
    runtime.run(&command, &mut stdout.lock())
}

fn init_logging(configured: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(configured)
            .with_context(|| format!("invalid log level {configured:?}"))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
    command: Option<Command>,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
        command: None,
    };
    let mut positional = Vec::new();

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            flag if flag.starts_with('-') && flag.parse::<i64>().is_err() => {
                bail!("unknown argument {flag:?}; run with --help to see supported options");
            }
            value => positional.push(value.to_owned()),
        }
    }

    if !positional.is_empty() {
        options.command = Some(parse_command(&positional)?);
    }
    Ok(options)
}

fn parse_command(words: &[String]) -> Result<Command> {
    let (name, rest) = words
        .split_first()
        .ok_or_else(|| anyhow!("missing command"))?;
    let arity = |expected: usize, usage: &str| -> Result<()> {
        if rest.len() != expected {
            bail!("usage: folio {usage}");
        }
        Ok(())
    };

    let command = match name.as_str() {
        "keys" => {
            arity(0, "keys")?;
            Command::Keys
        }
        "get" => {
            arity(1, "get <key>")?;
            Command::Get {
                key: rest[0].clone(),
            }
        }
        "dump" => {
            arity(0, "dump")?;
            Command::Dump
        }
        "validate" => {
            arity(2, "validate <key> <file.json>")?;
            Command::Validate {
                key: rest[0].clone(),
                file: PathBuf::from(&rest[1]),
            }
        }
        "put" => {
            arity(2, "put <key> <file.json>")?;
            Command::Put {
                key: rest[0].clone(),
                file: PathBuf::from(&rest[1]),
            }
        }
        "move" => {
            arity(3, "move <key> <from> <to>")?;
            Command::Move {
                key: rest[0].clone(),
                from: rest[1].clone(),
                to: rest[2].clone(),
            }
        }
        "add" => {
            arity(1, "add <key>")?;
            Command::Add {
                key: rest[0].clone(),
            }
        }
        "remove" => {
            arity(2, "remove <key> <pos|title>")?;
            Command::Remove {
                key: rest[0].clone(),
                entry: rest[1].clone(),
            }
        }
        "seed" => {
            if rest.len() > 1 {
                bail!("usage: folio seed [<file.json>]");
            }
            Command::Seed {
                file: rest.first().map(PathBuf::from),
            }
        }
        unknown => bail!("unknown command {unknown:?}; run with --help to see supported commands"),
    };
    Ok(command)
}

fn print_help() {
    println!("folio [options] <command>");
    println!();
    println!("Commands:");
    println!("  keys                       List profile keys");
    println!("  get <key>                  Print one record (empty default when unavailable)");
    println!("  dump                       Print every record");
    println!("  validate <key> <file>      Check a JSON document without saving");
    println!("  put <key> <file>           Validate and save a JSON document");
    println!("  move <key> <from> <to>     Reorder a list by position or title, then save");
    println!("  add <key>                  Append a blank entry to a list, then save");
    println!("  remove <key> <pos|title>   Drop one list entry, then save");
    println!("  seed [<file>]              Create missing rows (sqlite backend only)");
    println!();
    println!("Options:");
    println!("  --config <path>            Use a specific config path");
    println!("  --print-config-path        Print resolved config path");
    println!("  --print-example-config     Print a v1 config template");
    println!("  --check                    Validate config and backend setup");
    println!("  --help                     Show this help");
}

use std::env;
use std::fs;
use std::path::Path;
use std::process::{Command, ExitCode};

fn print_usage() {
    eprintln!(
        "Usage:
  cargo run --bin xtask -- precommit [--locked]
  cargo run --bin xtask -- ci [--locked]
  cargo run --bin xtask -- commit-msg <path>"
    );
}

fn run_command(program: &str, args: &[&str]) -> Result<(), String> {
    eprintln!("+ {program} {}", args.join(" "));
    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|error| format!("Failed to run `{program}`: {error}"))?;

    if status.success() {
        Ok(())
    } else {
        Err(format!(
            "Command `{program} {}` exited with status {status}",
            args.join(" ")
        ))
    }
}

fn run_cargo(args: &[&str], locked: bool) -> Result<(), String> {
    let mut full: Vec<&str> = args.to_vec();
    if locked {
        full.push("--locked");
    }
    run_command("cargo", &full)
}

fn run_precommit(locked: bool) -> Result<(), String> {
    run_command("cargo", &["fmt", "--all", "--", "--check"])?;
    run_command(
        "cargo",
        &["clippy", "--all-targets", "--", "-D", "warnings"],
    )?;
    run_cargo(&["test", "--lib", "--bins", "--tests"], locked)?;
    Ok(())
}

fn run_ci(locked: bool) -> Result<(), String> {
    run_precommit(locked)?;
    run_cargo(&["test", "--doc"], locked)?;
    Ok(())
}

fn validate_commit_message(path: &Path) -> Result<(), String> {
    let raw = fs::read_to_string(path).map_err(|error| {
        format!(
            "Failed to read commit message file {}: {error}",
            path.display()
        )
    })?;

    let subject = raw
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .ok_or_else(|| "Commit message subject is empty.".to_string())?;

    if subject.starts_with("Merge ") || subject.starts_with("Revert \"") {
        return Ok(());
    }
    if subject.len() > 72 {
        return Err(format!(
            "Commit subject is {} chars (max 72): `{subject}`",
            subject.len()
        ));
    }
    if subject.ends_with('.') {
        return Err("Commit subject must not end with a period.".to_string());
    }

    Ok(())
}

fn parse_locked(rest: &[String]) -> Result<bool, ExitCode> {
    match rest {
        [] => Ok(false),
        [flag] if flag == "--locked" => Ok(true),
        [flag, ..] => {
            eprintln!("Unknown option: {flag}");
            print_usage();
            Err(ExitCode::from(2))
        }
    }
}

fn main() -> ExitCode {
    let mut args = env::args().skip(1);
    let Some(command) = args.next() else {
        print_usage();
        return ExitCode::from(2);
    };
    let rest: Vec<String> = args.collect();

    let result = match command.as_str() {
        "precommit" => match parse_locked(&rest) {
            Ok(locked) => run_precommit(locked),
            Err(code) => return code,
        },
        "ci" => match parse_locked(&rest) {
            Ok(locked) => run_ci(locked),
            Err(code) => return code,
        },
        "commit-msg" => {
            if rest.len() != 1 {
                eprintln!("commit-msg requires exactly one path argument.");
                print_usage();
                return ExitCode::from(2);
            }
            validate_commit_message(Path::new(&rest[0]))
        }
        _ => {
            eprintln!("Unknown command: {command}");
            print_usage();
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::from(1)
        }
    }
}

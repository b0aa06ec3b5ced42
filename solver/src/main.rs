use std::process::ExitCode;

use slicebasis::{SearchStrategy, Solver, SolverConfig, TargetsBuilder};

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // only when asked for
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn print_usage() {
    eprintln!("Usage: solver <glyph file> [options]");
    eprintln!();
    eprintln!("Glyphs are separated by blank lines. '#' marks a pixel, '.' or a space leaves it empty.");
    eprintln!("A glyph may start with a line '= c' to tag it with the character c.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --strategy=<name>       power-set, backtracking (default) or sat");
    eprintln!("  --max-candidates=<n>    most candidates the power-set strategy will enumerate per target");
    eprintln!("  --max-covers=<n>        most covers any strategy may find per target");
    eprintln!("  --best-effort           keep truncated search results instead of failing");
}

fn parse_count(flag: &str, value: &str) -> Result<usize, String> {
    value.parse().map_err(|_| format!("{} expects a non-negative integer, got '{}'", flag, value))
}

/// The glyph file path and the solver configuration.
fn parse_args(args: &[String]) -> Result<(String, SolverConfig), String> {
    let mut path = None;
    let mut config = SolverConfig::builder();

    for arg in args {
        if let Some(name) = arg.strip_prefix("--strategy=") {
            let strategy: SearchStrategy = name.parse().map_err(|_| format!("unknown strategy '{}'", name))?;
            config.strategy(strategy);
        } else if let Some(value) = arg.strip_prefix("--max-candidates=") {
            config.max_candidates(parse_count("--max-candidates", value)?);
        } else if let Some(value) = arg.strip_prefix("--max-covers=") {
            config.max_covers(parse_count("--max-covers", value)?);
        } else if arg == "--best-effort" {
            config.best_effort(true);
        } else if arg.starts_with("--") {
            return Err(format!("unknown option '{}'", arg));
        } else if path.replace(arg.clone()).is_some() {
            return Err("only one glyph file may be given".into());
        }
    }

    let path = path.ok_or_else(|| "no glyph file given".to_string())?;
    Ok((path, config.build()))
}

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_usage();
        return ExitCode::FAILURE;
    }

    let (path, config) = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("error: {}", message);
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(error) => {
            eprintln!("error: could not read '{}': {}", path, error);
            return ExitCode::FAILURE;
        }
    };

    let targets = match TargetsBuilder::new().add_glyph_file(&text).build() {
        Ok(targets) => targets,
        Err(reasons) => {
            for reason in reasons {
                eprintln!("error: {:?}", reason);
            }
            return ExitCode::FAILURE;
        }
    };

    match Solver::new(config).solve(&targets) {
        Ok(solution) => {
            for diagnostic in &solution.diagnostics {
                eprintln!("warning: {}", diagnostic);
            }
            if !solution.best_effort.is_empty() {
                eprintln!("warning: search was truncated for targets {:?}", solution.best_effort);
            }
            print!("{}", solution.map);
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("error: {}", error);
            ExitCode::FAILURE
        }
    }
}

use std::{env, fs, io, path::Path, process, sync::Arc};

use ember::{
    bytecode::{module::Module, module_cache::ModuleCache},
    config::{CACHE_DIR_ENV, Command, Config, help_text},
    diagnostics::render_report,
    driver::compile_source,
    runtime::vm::Interpreter,
    syntax::lexer::Lexer,
};
use rayon::prelude::*;
use tracing::warn;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "EMBER_LOG";

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let config = match Config::from_args(args, env::var(CACHE_DIR_ENV).ok()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {}", err);
            eprintln!("Run `ember help` for usage.");
            process::exit(2);
        }
    };
    init_tracing(config.trace);

    let code = match &config.command {
        Command::Help => {
            print!("{}", help_text());
            0
        }
        Command::Run(path) => run_file(path, &config),
        Command::Tokens(path) => show_tokens(path),
        Command::Bytecode(path) => show_bytecode(path, &config),
        Command::Check(paths) => check_files(paths, &config),
    };
    process::exit(code);
}

fn init_tracing(trace: bool) {
    let mut filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    if trace {
        match "ember::vm=trace".parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(err) => eprintln!("Warning: could not enable instruction trace: {}", err),
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_source(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(source) => Some(source),
        Err(err) => {
            eprintln!("Error reading {}: {}", path.display(), err);
            None
        }
    }
}

/// Compiles `source`, printing diagnostics on failure.
fn compile_or_report(path: &Path, source: &str, max_errors: usize) -> Option<Module> {
    match compile_source(source) {
        Ok(module) => Some(module),
        Err(diagnostics) => {
            let file = path.display().to_string();
            eprintln!(
                "{}",
                render_report(&diagnostics, Some(source), Some(&file), max_errors)
            );
            None
        }
    }
}

fn run_file(path: &Path, config: &Config) -> i32 {
    let Some(source) = read_source(path) else {
        return 1;
    };

    let cache = ModuleCache::new(&config.cache_dir);
    let cached = if config.no_cache {
        None
    } else {
        cache.load(path, &source)
    };
    let module = match cached {
        Some(module) => module,
        None => {
            let Some(module) = compile_or_report(path, &source, config.max_errors) else {
                return 1;
            };
            if !config.no_cache {
                if let Err(err) = cache.store(path, &source, &module) {
                    warn!(
                        target: "ember::cache",
                        path = %path.display(),
                        error = %err,
                        "could not store module"
                    );
                }
            }
            module
        }
    };

    let mut interpreter = Interpreter::new(Arc::new(module));
    match interpreter.run() {
        Ok(_) => 0,
        Err(fault) => {
            let file = path.display().to_string();
            eprintln!("{}", fault.render(Some(&source), Some(&file)));
            1
        }
    }
}

fn show_tokens(path: &Path) -> i32 {
    let Some(source) = read_source(path) else {
        return 1;
    };
    let mut lexer = Lexer::new(source);
    println!("Tokens from {}:", path.display());
    println!("{}", "─".repeat(50));
    for tok in lexer.tokenize() {
        println!(
            "{:>3}:{:<3} {:12} {:?}",
            tok.position.line,
            tok.position.column,
            tok.token_type.to_string(),
            tok.literal
        );
    }
    0
}

fn show_bytecode(path: &Path, config: &Config) -> i32 {
    let Some(source) = read_source(path) else {
        return 1;
    };
    let Some(module) = compile_or_report(path, &source, config.max_errors) else {
        return 1;
    };

    if config.json {
        return match serde_json::to_string_pretty(&module) {
            Ok(json) => {
                println!("{}", json);
                0
            }
            Err(err) => {
                eprintln!("Error serializing module: {}", err);
                1
            }
        };
    }

    println!("Bytecode from {}:", path.display());
    println!("{}", "─".repeat(50));
    print!("{}", module.disassemble());
    0
}

/// Compiles every file in parallel; reports in argument order.
fn check_files(paths: &[std::path::PathBuf], config: &Config) -> i32 {
    let results: Vec<(String, Result<(), String>)> = paths
        .par_iter()
        .map(|path| {
            let file = path.display().to_string();
            let outcome = match fs::read_to_string(path) {
                Ok(source) => compile_source(&source).map(|_| ()).map_err(|diagnostics| {
                    render_report(&diagnostics, Some(&source), Some(&file), config.max_errors)
                }),
                Err(err) => Err(format!("Error reading {}: {}", file, err)),
            };
            (file, outcome)
        })
        .collect();

    let mut failed = 0;
    for (file, outcome) in &results {
        match outcome {
            Ok(()) => println!("ok    {}", file),
            Err(report) => {
                failed += 1;
                println!("error {}", file);
                eprintln!("{}", report);
            }
        }
    }
    if failed > 0 {
        eprintln!("{} of {} file(s) failed", failed, results.len());
        1
    } else {
        0
    }
}

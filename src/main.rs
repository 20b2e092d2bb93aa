use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use ntscript::interpreter::namespace::DEFAULT_NAMESPACE;
use ntscript::{Error, InternalNamespace, Script, ScriptOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ntscript")]
#[command(about = "Run line-oriented test scenario scripts")]
#[command(version)]
struct Cli {
    /// Log every parsed and executed command
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Print one JSON report per file (file, ok, error, variables)
    #[arg(long = "json")]
    json: bool,

    /// Script files to run, in order
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let stdout = std::io::stdout();
    for file in &cli.files {
        let script = Script::new(ScriptOptions {
            namespace: Some(InternalNamespace::default().with_field(
                DEFAULT_NAMESPACE,
                "script",
                file.display().to_string(),
            )),
            ..Default::default()
        });

        let mut out = stdout.lock();
        let result = script.exec_file(file, &mut out);
        drop(out);

        if cli.json {
            let report = match &result {
                Ok(env) => serde_json::json!({
                    "file": file.display().to_string(),
                    "ok": true,
                    "error": null,
                    "variables": env.to_json(),
                }),
                Err(e) => serde_json::json!({
                    "file": file.display().to_string(),
                    "ok": false,
                    "error": e.to_string(),
                    "variables": null,
                }),
            };
            println!("{}", report);
        }

        if let Err(e) = result {
            match e {
                Error::Parse(e) => eprintln!("parse {} err: {}", file.display(), e),
                Error::Run(e) => eprintln!("run {} err: {}", file.display(), e),
                Error::Io(e) => eprintln!("Error: Cannot read script file: {}: {}", file.display(), e),
            }
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}

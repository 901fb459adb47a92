//! Command-line surface: a single `-c <path>` flag.
//!
//! Everything else on the command line is ignored, so arguments are filtered
//! down to the recognised flags before clap sees them.

use crate::config::CliOverrides;
use crate::error::{MakeError, Result};
use clap::Parser;
use clap::builder::NonEmptyStringValueParser;
use clap::error::ErrorKind;
use std::ffi::OsString;

#[derive(Parser, Debug)]
#[command(name = "cppmake")]
#[command(about = "Build a C++ project with g++ and optionally run it", version = env!("CARGO_PKG_VERSION"))]
#[command(args_override_self = true)]
struct Cli {
    /// Config file to use instead of makeconfig.json
    #[arg(short = 'c', value_name = "CONFIG_FILE", allow_hyphen_values = true, value_parser = NonEmptyStringValueParser::new())]
    config: Option<String>,
}

/// What the command line asked for.
#[derive(Debug, PartialEq, Eq)]
pub enum Invocation {
    Build(CliOverrides),
    /// `--help` or `--version`; the rendered text to print.
    Info(String),
}

const PASSTHROUGH: &[&str] = &["-h", "--help", "-V", "--version"];

/// Parse a full argument vector (program name first).
pub fn parse_args<I, T>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut kept: Vec<OsString> = vec![args.next().unwrap_or_else(|| "cppmake".into())];

    while let Some(arg) = args.next() {
        if arg == "-c" {
            kept.push(arg);
            if let Some(value) = args.next() {
                kept.push(value);
            }
        } else if PASSTHROUGH.iter().any(|flag| arg == *flag) {
            kept.push(arg);
        }
    }

    match Cli::try_parse_from(kept) {
        Ok(cli) => Ok(Invocation::Build(CliOverrides {
            config_file: cli.config,
        })),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            Ok(Invocation::Info(e.render().to_string()))
        }
        Err(_) => Err(MakeError::Usage {
            message: "Error: The config file name must not be empty if -c flag is specified..".to_string(),
        }),
    }
}

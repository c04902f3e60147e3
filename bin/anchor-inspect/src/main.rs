//! Command line tool for looking at ANCHOR transactions and building
//! carriers.

use std::io;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod encode;
mod walk;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level, overriding `RUST_LOG`.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    /// Breaks a raw transaction into labeled byte ranges and decodes any
    /// ANCHOR payloads in it.
    Walk(walk::Walk),

    /// Encodes a payload and wraps it in a carrier.
    Encode(encode::Encode),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Walk(walk) => walk.run(),
        Command::Encode(encode) => encode.run(),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_encode() {
        let cli = Cli::try_parse_from([
            "anchor-inspect",
            "-v",
            "encode",
            "--kind",
            "1",
            "--text",
            "hi",
            "--carrier",
            "op-return",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Encode(_)));

        // Needs exactly one of the body flags.
        let res = Cli::try_parse_from([
            "anchor-inspect",
            "encode",
            "--kind",
            "1",
            "--text",
            "hi",
            "--body-hex",
            "6869",
            "--carrier",
            "stamps",
        ]);
        assert!(res.is_err());
    }
}

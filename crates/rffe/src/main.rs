mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::{BoardArgs, Command};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "rffe", version, about = "RF front-end controller CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(flatten)]
    board: BoardArgs,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, &cli.board, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_set_subcommand() {
        let cli = Cli::try_parse_from([
            "rffe",
            "--host",
            "10.0.18.100",
            "set",
            "attenuator",
            "12.5",
        ])
        .expect("set args should parse");

        assert_eq!(cli.board.host, "10.0.18.100");
        match cli.command {
            Command::Set(args) => {
                assert_eq!(args.register, "attenuator");
                assert_eq!(args.value, "12.5");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn board_flags_are_global() {
        let cli = Cli::try_parse_from(["rffe", "status", "--port", "7001", "--timeout", "250ms"])
            .expect("status args should parse");
        assert_eq!(cli.board.port, 7001);
        assert_eq!(cli.board.timeout, "250ms");
        assert!(matches!(cli.command, Command::Status(_)));
    }

    #[test]
    fn reprogram_requires_firmware_version() {
        let err = Cli::try_parse_from(["rffe", "reprogram", "image.bin"])
            .expect_err("missing version should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let cli = Cli::try_parse_from([
            "rffe",
            "reprogram",
            "image.bin",
            "--firmware-version",
            "2.1.0",
        ])
        .expect("reprogram args should parse");
        assert!(matches!(cli.command, Command::Reprogram(_)));
    }

    #[test]
    fn parses_version_subcommand() {
        let cli = Cli::try_parse_from(["rffe", "version", "--extended"])
            .expect("version args should parse");
        assert!(matches!(cli.command, Command::Version(ref args) if args.extended));
    }
}

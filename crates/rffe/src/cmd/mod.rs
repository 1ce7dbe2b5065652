use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use rffe_client::{connect_with_config, Client, ClientConfig, Register};
use rffe_transport::{RffeStream, DEFAULT_PORT};

use crate::exit::{client_error, frame_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod get;
pub mod registers;
pub mod reprogram;
pub mod reset;
pub mod set;
pub mod status;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the register catalog.
    Registers(RegistersArgs),
    /// Read one register.
    Get(GetArgs),
    /// Write one register.
    Set(SetArgs),
    /// Read every readable register.
    Status(StatusArgs),
    /// Restart the board software.
    Reset(ResetArgs),
    /// Upload a new firmware image.
    Reprogram(ReprogramArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, board: &BoardArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Registers(args) => registers::run(args, format),
        Command::Get(args) => get::run(args, board, format),
        Command::Set(args) => set::run(args, board, format),
        Command::Status(args) => status::run(args, board, format),
        Command::Reset(args) => reset::run(args, board, format),
        Command::Reprogram(args) => reprogram::run(args, board, format),
        Command::Version(args) => version::run(args),
    }
}

/// Where the board is and how long to wait on it.
#[derive(Args, Debug)]
pub struct BoardArgs {
    /// Board hostname or IP address.
    #[arg(long, env = "RFFE_HOST", default_value = "localhost", global = true)]
    pub host: String,
    /// Board TCP port.
    #[arg(long, env = "RFFE_PORT", default_value_t = DEFAULT_PORT, global = true)]
    pub port: u16,
    /// Connect and I/O timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s", global = true)]
    pub timeout: String,
}

impl BoardArgs {
    pub fn config(&self) -> CliResult<ClientConfig> {
        Ok(ClientConfig::new(self.host.clone())
            .with_port(self.port)
            .with_timeout(parse_duration(&self.timeout)?))
    }

    pub fn connect(&self) -> CliResult<Client<RffeStream>> {
        let config = self.config()?;
        connect_with_config(&config).map_err(|err| client_error("connect failed", err))
    }
}

#[derive(Args, Debug, Default)]
pub struct RegistersArgs {}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Register name (e.g. attenuator, temp-ac) or hex id (e.g. 0x01).
    pub register: String,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Register name or hex id.
    pub register: String,
    /// Value: a number for floats, 0/1 or hex for bytes, text for blocks.
    pub value: String,
}

#[derive(Args, Debug, Default)]
pub struct StatusArgs {}

#[derive(Args, Debug, Default)]
pub struct ResetArgs {}

#[derive(Args, Debug)]
pub struct ReprogramArgs {
    /// Firmware image file.
    pub image: PathBuf,
    /// Version announced to the board (x.y.z).
    #[arg(long, value_name = "VERSION")]
    pub firmware_version: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_register(input: &str) -> CliResult<Register> {
    input
        .parse()
        .map_err(|err| frame_error("invalid register", err))
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

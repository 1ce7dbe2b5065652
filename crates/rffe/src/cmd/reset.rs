use crate::cmd::{BoardArgs, ResetArgs};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_ack, Ack, OutputFormat};

pub fn run(_args: ResetArgs, board: &BoardArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = board.connect()?;
    client
        .reset()
        .map_err(|err| client_error("reset failed", err))?;
    client
        .close()
        .map_err(|err| client_error("close failed", err))?;

    print_ack(
        &Ack {
            action: "reset",
            register: None,
            value: None,
            ok: true,
        },
        format,
    );
    Ok(SUCCESS)
}

use rffe_client::Register;
use tracing::debug;

use crate::cmd::{BoardArgs, StatusArgs};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_rows, OutputFormat, RegisterRow};

pub fn run(_args: StatusArgs, board: &BoardArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = board.connect()?;

    let mut rows = Vec::new();
    for register in Register::ALL {
        if !register.access().readable() {
            continue;
        }
        let value = client
            .read_register(register)
            .map_err(|err| client_error(&format!("reading {register} failed"), err))?;
        debug!(%register, %value, "status read");
        rows.push(RegisterRow::with_value(register, &value));
    }
    client
        .close()
        .map_err(|err| client_error("close failed", err))?;

    print_rows(&rows, true, format);
    Ok(SUCCESS)
}

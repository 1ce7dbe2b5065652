use rffe_client::Register;

use crate::cmd::RegistersArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_rows, OutputFormat, RegisterRow};

pub fn run(_args: RegistersArgs, format: OutputFormat) -> CliResult<i32> {
    let rows: Vec<RegisterRow> = Register::ALL
        .into_iter()
        .map(RegisterRow::describe)
        .collect();
    print_rows(&rows, false, format);
    Ok(SUCCESS)
}

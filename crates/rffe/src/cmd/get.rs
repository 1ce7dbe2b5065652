use crate::cmd::{parse_register, BoardArgs, GetArgs};
use crate::exit::{client_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_value, OutputFormat};

pub fn run(args: GetArgs, board: &BoardArgs, format: OutputFormat) -> CliResult<i32> {
    let register = parse_register(&args.register)?;
    if !register.access().readable() {
        return Err(CliError::new(
            USAGE,
            format!("register {register} is write-only"),
        ));
    }

    let mut client = board.connect()?;
    let value = client
        .read_register(register)
        .map_err(|err| client_error(&format!("reading {register} failed"), err))?;
    client
        .close()
        .map_err(|err| client_error("close failed", err))?;

    print_value(register, &value, format);
    Ok(SUCCESS)
}

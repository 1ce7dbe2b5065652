use rffe_client::value_from_text;

use crate::cmd::{parse_register, BoardArgs, SetArgs};
use crate::exit::{client_error, frame_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{json_value, print_ack, Ack, OutputFormat};

pub fn run(args: SetArgs, board: &BoardArgs, format: OutputFormat) -> CliResult<i32> {
    let register = parse_register(&args.register)?;
    if !register.access().writable() {
        return Err(CliError::new(
            USAGE,
            format!("register {register} is read-only"),
        ));
    }

    // Reject bad values before touching the network.
    let value = value_from_text(register, &args.value)
        .map_err(|err| client_error("invalid value", err))?;
    register
        .check(&value)
        .map_err(|err| frame_error("invalid value", err))?;

    let mut client = board.connect()?;
    client
        .write_register(register, value.clone())
        .map_err(|err| client_error(&format!("writing {register} failed"), err))?;
    client
        .close()
        .map_err(|err| client_error("close failed", err))?;

    print_ack(
        &Ack {
            action: "set",
            register: Some(register.name()),
            value: Some(json_value(&value)),
            ok: true,
        },
        format,
    );
    Ok(SUCCESS)
}

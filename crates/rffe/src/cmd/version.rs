use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("rffe {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: rffe");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("RFFE_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "profile: {}",
        option_env!("RFFE_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!("default_port: {}", rffe_transport::DEFAULT_PORT);
    println!(
        "default_timeout_ms: {}",
        rffe_transport::DEFAULT_TIMEOUT.as_millis()
    );
    println!("registers: {}", rffe_frame::Register::ALL.len());

    Ok(SUCCESS)
}

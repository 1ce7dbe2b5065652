use std::fs::File;
use std::io::BufReader;

use rffe_client::{FirmwareVersion, UploadReport};
use serde::Serialize;
use tracing::info;

use crate::cmd::{BoardArgs, ReprogramArgs};
use crate::exit::{client_error, io_error, CliResult, SUCCESS};
use crate::output::{print_json, OutputFormat};

#[derive(Serialize)]
struct ReprogramOutput {
    image: String,
    firmware_version: String,
    image_bytes: usize,
    chunks: usize,
    frames: usize,
    finalized: bool,
}

pub fn run(args: ReprogramArgs, board: &BoardArgs, format: OutputFormat) -> CliResult<i32> {
    // Validate the version and open the image before connecting, so a typo
    // never leaves the board half-programmed.
    let version: FirmwareVersion = args
        .firmware_version
        .parse()
        .map_err(|err| client_error("invalid firmware version", err))?;
    let file = File::open(&args.image).map_err(|err| {
        io_error(&format!("failed opening {}", args.image.display()), err)
    })?;

    let mut client = board.connect()?;
    info!(image = %args.image.display(), %version, "starting firmware upload");
    let report = client
        .upload_firmware(BufReader::new(file), &version.to_string())
        .map_err(|err| client_error("firmware upload failed", err))?;
    client
        .close()
        .map_err(|err| client_error("close failed", err))?;

    print_report(&args, version, report, format);
    Ok(SUCCESS)
}

fn print_report(
    args: &ReprogramArgs,
    version: FirmwareVersion,
    report: UploadReport,
    format: OutputFormat,
) {
    let out = ReprogramOutput {
        image: args.image.display().to_string(),
        firmware_version: version.to_string(),
        image_bytes: report.image_bytes,
        chunks: report.chunks,
        frames: report.frames,
        finalized: true,
    };
    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("Firmware upload:");
            println!("  Image:    {}", out.image);
            println!("  Version:  {}", out.firmware_version);
            println!("  Bytes:    {}", out.image_bytes);
            println!("  Chunks:   {}", out.chunks);
            println!("  Frames:   {}", out.frames);
            println!("The board restarts into the new image on its own.");
        }
    }
}

//! Poll both front-end temperatures once a second.
//!
//! Run with:
//!   cargo run --example poll-temperatures -- 10.0.18.100 5

use std::thread;
use std::time::Duration;

use rffe::client::{connect_with_config, ClientConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "localhost".to_string());
    let samples: usize = args.next().map(|s| s.parse()).transpose()?.unwrap_or(5);

    let config = ClientConfig::new(host).with_timeout(Duration::from_secs(2));
    let mut board = connect_with_config(&config)?;
    println!(
        "setpoints: A/C {:.2} °C, B/D {:.2} °C",
        board.get_temp_ac_setpoint()?,
        board.get_temp_bd_setpoint()?
    );

    for _ in 0..samples {
        let ac = board.get_temp_ac()?;
        let bd = board.get_temp_bd()?;
        println!("A/C {ac:.2} °C  B/D {bd:.2} °C");
        thread::sleep(Duration::from_secs(1));
    }

    board.close()?;
    Ok(())
}

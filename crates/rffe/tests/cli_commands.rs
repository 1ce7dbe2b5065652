#![cfg(feature = "cli")]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::PathBuf;
use std::process::{Command, Output};
use std::thread::{self, JoinHandle};

use rffe_frame::Register;

/// Serve `connections` sequential clients from a shared register store and
/// return every (register, payload) written.
fn spawn_board(connections: usize) -> (SocketAddr, JoinHandle<Vec<(u8, Vec<u8>)>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
    let addr = listener.local_addr().expect("local addr");
    let handle = thread::spawn(move || {
        let mut registers: HashMap<u8, Vec<u8>> = HashMap::new();
        for register in Register::ALL {
            registers.insert(register.id(), vec![0u8; register.shape().wire_len()]);
        }
        registers.insert(Register::Attenuator.id(), 6.5f64.to_le_bytes().to_vec());
        registers.insert(Register::SoftwareVersion.id(), b"V2_1_0\0".to_vec());
        registers.insert(Register::MacAddress.id(), b"DE:AD:BE:EF:00:01".to_vec());

        let mut writes = Vec::new();
        for _ in 0..connections {
            let (mut stream, _) = listener.accept().expect("accept should succeed");
            serve(&mut stream, &mut registers, &mut writes);
        }
        writes
    });
    (addr, handle)
}

fn serve(
    stream: &mut TcpStream,
    registers: &mut HashMap<u8, Vec<u8>>,
    writes: &mut Vec<(u8, Vec<u8>)>,
) {
    loop {
        let mut header = [0u8; 4];
        if stream.read_exact(&mut header).is_err() {
            return;
        }
        let response = if header[0] == 0x10 {
            let value = registers.get(&header[3]).cloned().unwrap_or_default();
            let mut out = vec![0x11, 0x00, value.len() as u8 + 1];
            out.extend_from_slice(&value);
            out
        } else {
            let mut payload = vec![0u8; usize::from(header[2]).saturating_sub(1)];
            if stream.read_exact(&mut payload).is_err() {
                return;
            }
            registers.insert(header[3], payload.clone());
            writes.push((header[3], payload));
            vec![0x11, 0x00, 0x01]
        };
        if stream.write_all(&response).is_err() {
            return;
        }
    }
}

fn rffe(addr: Option<SocketAddr>, args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rffe"));
    cmd.env_remove("RFFE_HOST")
        .env_remove("RFFE_PORT")
        .arg("--log-level")
        .arg("off")
        .arg("--format")
        .arg("json");
    if let Some(addr) = addr {
        cmd.arg("--host")
            .arg(addr.ip().to_string())
            .arg("--port")
            .arg(addr.port().to_string())
            .arg("--timeout")
            .arg("2s");
    }
    cmd.args(args).output().expect("rffe should run")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be json")
}

fn temp_image(tag: &str, bytes: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("rffe-{tag}-{}.bin", std::process::id()));
    std::fs::write(&path, bytes).expect("image should be writable");
    path
}

#[test]
fn registers_lists_catalog_without_board() {
    let output = rffe(None, &["registers"]);
    assert!(output.status.success());
    let rows = stdout_json(&output);
    let rows = rows.as_array().expect("array of registers");
    assert_eq!(rows.len(), 20);
    assert_eq!(rows[0]["name"], "attenuator");
    assert_eq!(rows[0]["id"], "0x00");
}

#[test]
fn set_then_get_attenuator() {
    let (addr, board) = spawn_board(2);

    let set = rffe(Some(addr), &["set", "attenuator", "12.5"]);
    assert!(set.status.success(), "{}", String::from_utf8_lossy(&set.stderr));
    assert_eq!(stdout_json(&set)["ok"], true);

    let get = rffe(Some(addr), &["get", "attenuator"]);
    assert!(get.status.success());
    assert_eq!(stdout_json(&get)["value"], 12.5);

    let writes = board.join().expect("board thread");
    assert_eq!(writes, vec![(0x00, 12.5f64.to_le_bytes().to_vec())]);
}

#[test]
fn off_grid_attenuation_is_rejected_before_connecting() {
    let output = rffe(
        Some("127.0.0.1:9".parse().unwrap()),
        &["set", "attenuator", "12.3"],
    );
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn unknown_register_is_usage_error() {
    let output = rffe(None, &["get", "flux-capacitor"]);
    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("flux-capacitor"));
}

#[test]
fn status_reads_every_readable_register() {
    let (addr, board) = spawn_board(1);

    let output = rffe(Some(addr), &["status"]);
    assert!(output.status.success());
    let rows = stdout_json(&output);
    let rows = rows.as_array().expect("array of rows");
    let readable = Register::ALL
        .iter()
        .filter(|r| r.access().readable())
        .count();
    assert_eq!(rows.len(), readable);
    let mac = rows
        .iter()
        .find(|row| row["name"] == "mac-address")
        .expect("mac row");
    assert_eq!(mac["value"], "DE:AD:BE:EF:00:01");

    assert!(board.join().unwrap().is_empty());
}

#[test]
fn reprogram_uploads_image() {
    let (addr, board) = spawn_board(1);
    let image = temp_image("upload", &[0x42; 200]);

    let output = rffe(
        Some(addr),
        &[
            "reprogram",
            image.to_str().unwrap(),
            "--firmware-version",
            "2.1.0",
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let report = stdout_json(&output);
    assert_eq!(report["chunks"], 2);
    assert_eq!(report["frames"], 5);

    let writes = board.join().unwrap();
    let registers: Vec<u8> = writes.iter().map(|(id, _)| *id).collect();
    assert_eq!(registers, vec![0x0A, 0x09, 0x0A, 0x0A, 0x09]);
    assert_eq!(&writes[0].1[..3], &[2, 1, 0]);
    let _ = std::fs::remove_file(image);
}

#[test]
fn reprogram_rejects_bad_version_without_connecting() {
    let image = temp_image("badver", &[0x00; 16]);
    let output = rffe(
        Some("127.0.0.1:9".parse().unwrap()),
        &[
            "reprogram",
            image.to_str().unwrap(),
            "--firmware-version",
            "2.1",
        ],
    );
    assert_eq!(output.status.code(), Some(60));
    let _ = std::fs::remove_file(image);
}

#[test]
fn refused_connection_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let output = rffe(Some(addr), &["reset"]);
    assert_eq!(output.status.code(), Some(3));
}

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use bytes::Bytes;
use rffe_frame::{
    decode_value, encode_read, encode_value, encode_write, FrameConfig, FrameStream, Register,
    RegisterValue, ValueShape,
};
use rffe_transport::Connection;
use tracing::{debug, trace};

use crate::error::{ClientError, Result};
use crate::firmware::{FirmwareUpload, FirmwareVersion, UploadReport};

/// Longest IP string the board stores.
const IP_FIELD_LEN: usize = 16;

/// Direction of one register transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Read,
    Write(RegisterValue),
}

/// A connection to one RF front-end controller board.
///
/// Every call is one blocking request/response round trip. The client is
/// not internally synchronized; share it behind a `Mutex` or open one
/// client per thread.
pub struct Client<S> {
    frames: Option<FrameStream<S>>,
}

impl<S: Connection> Client<S> {
    /// Wrap an open connection with default frame settings.
    pub fn new(stream: S) -> Self {
        Self::with_config(stream, FrameConfig::default())
    }

    /// Wrap an open connection with explicit frame settings.
    pub fn with_config(stream: S, config: FrameConfig) -> Self {
        Self {
            frames: Some(FrameStream::with_config(stream, config)),
        }
    }

    /// One request/response transaction on `register`.
    ///
    /// Reads return the decoded value. Writes are validated against the
    /// register's shape and domain before anything is sent, and return
    /// `None` once the acknowledgment has been drained.
    pub fn transact(
        &mut self,
        register: Register,
        operation: Operation,
    ) -> Result<Option<RegisterValue>> {
        match operation {
            Operation::Read => {
                if !register.access().readable() {
                    return Err(ClientError::InvalidArgument(format!(
                        "register {register} is write-only"
                    )));
                }
                let frames = self.frames()?;
                let response = frames.exchange(&encode_read(register.id()))?;
                let value = decode_value(&response, register.shape())?;
                trace!(%register, %value, "register read");
                Ok(Some(value))
            }
            Operation::Write(value) => {
                if !register.access().writable() {
                    return Err(ClientError::InvalidArgument(format!(
                        "register {register} is read-only"
                    )));
                }
                register.check(&value).map_err(ClientError::invalid_value)?;
                let payload =
                    encode_value(&value, register.shape()).map_err(ClientError::invalid_value)?;
                let request =
                    encode_write(register.id(), &payload).map_err(ClientError::invalid_value)?;
                self.exchange_and_drain(&request)?;
                trace!(%register, %value, "register written");
                Ok(None)
            }
        }
    }

    /// Read a register.
    pub fn read_register(&mut self, register: Register) -> Result<RegisterValue> {
        self.transact(register, Operation::Read)?
            .ok_or_else(|| ClientError::InvalidArgument(format!("no value read from {register}")))
    }

    /// Write a register and discard the acknowledgment.
    pub fn write_register(&mut self, register: Register, value: RegisterValue) -> Result<()> {
        self.transact(register, Operation::Write(value)).map(|_| ())
    }

    /// Send a pre-built request and drain its acknowledgment.
    pub(crate) fn exchange_and_drain(&mut self, request: &[u8]) -> Result<usize> {
        Ok(self.frames()?.exchange_and_drain(request)?)
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.frames.is_none() {
            return Err(ClientError::Closed);
        }
        Ok(())
    }

    fn frames(&mut self) -> Result<&mut FrameStream<S>> {
        self.frames.as_mut().ok_or(ClientError::Closed)
    }

    fn get_float(&mut self, register: Register) -> Result<f64> {
        match self.read_register(register)? {
            RegisterValue::Float(v) => Ok(v),
            _ => Err(shape_error(register)),
        }
    }

    fn get_block(&mut self, register: Register) -> Result<Bytes> {
        match self.read_register(register)? {
            RegisterValue::Block(v) => Ok(v),
            _ => Err(shape_error(register)),
        }
    }

    fn set_float(&mut self, register: Register, value: f64) -> Result<()> {
        self.write_register(register, RegisterValue::Float(value))
    }

    /// Attenuation of both front-ends, in dB.
    pub fn get_attenuator(&mut self) -> Result<f64> {
        self.get_float(Register::Attenuator)
    }

    /// Set the attenuation, in dB.
    ///
    /// Only the 64 settings 0, 0.5, …, 31.5 dB are accepted; anything else
    /// fails with `InvalidArgument` and nothing is sent.
    pub fn set_attenuator(&mut self, db: f64) -> Result<()> {
        self.set_float(Register::Attenuator, db)
    }

    /// A/C front-end temperature, °C.
    pub fn get_temp_ac(&mut self) -> Result<f64> {
        self.get_float(Register::TempAc)
    }

    /// B/D front-end temperature, °C.
    pub fn get_temp_bd(&mut self) -> Result<f64> {
        self.get_float(Register::TempBd)
    }

    pub fn get_temp_ac_setpoint(&mut self) -> Result<f64> {
        self.get_float(Register::TempAcSetpoint)
    }

    pub fn set_temp_ac_setpoint(&mut self, celsius: f64) -> Result<()> {
        self.set_float(Register::TempAcSetpoint, celsius)
    }

    pub fn get_temp_bd_setpoint(&mut self) -> Result<f64> {
        self.get_float(Register::TempBdSetpoint)
    }

    pub fn set_temp_bd_setpoint(&mut self, celsius: f64) -> Result<()> {
        self.set_float(Register::TempBdSetpoint, celsius)
    }

    /// Temperature controller state: 0 off, 1 on.
    pub fn get_temperature_control_status(&mut self) -> Result<u8> {
        match self.read_register(Register::TempControlStatus)? {
            RegisterValue::Byte(v) => Ok(v),
            _ => Err(shape_error(Register::TempControlStatus)),
        }
    }

    /// Turn the temperature controller off (0) or on (1).
    ///
    /// Any other value is ignored: no frame is sent and no error returned.
    pub fn set_temperature_control_status(&mut self, status: u8) -> Result<()> {
        if status > 1 {
            debug!(status, "ignoring temperature control status outside 0/1");
            return Ok(());
        }
        self.write_register(Register::TempControlStatus, RegisterValue::Byte(status))
    }

    /// Heater drive level of the A/C front-end.
    pub fn get_heater_ac(&mut self) -> Result<f64> {
        self.get_float(Register::HeaterAc)
    }

    pub fn set_heater_ac(&mut self, level: f64) -> Result<()> {
        self.set_float(Register::HeaterAc, level)
    }

    /// Heater drive level of the B/D front-end.
    pub fn get_heater_bd(&mut self) -> Result<f64> {
        self.get_float(Register::HeaterBd)
    }

    pub fn set_heater_bd(&mut self, level: f64) -> Result<()> {
        self.set_float(Register::HeaterBd, level)
    }

    /// Restart the board software.
    pub fn reset(&mut self) -> Result<()> {
        self.write_register(Register::Reset, RegisterValue::Byte(0x01))
    }

    /// The 7-byte software version identifier.
    pub fn get_software_version(&mut self) -> Result<Bytes> {
        self.get_block(Register::SoftwareVersion)
    }

    pub fn get_pid_ac_kc(&mut self) -> Result<f64> {
        self.get_float(Register::PidAcKc)
    }

    pub fn set_pid_ac_kc(&mut self, value: f64) -> Result<()> {
        self.set_float(Register::PidAcKc, value)
    }

    pub fn get_pid_ac_tau_i(&mut self) -> Result<f64> {
        self.get_float(Register::PidAcTauI)
    }

    pub fn set_pid_ac_tau_i(&mut self, value: f64) -> Result<()> {
        self.set_float(Register::PidAcTauI, value)
    }

    pub fn get_pid_ac_tau_d(&mut self) -> Result<f64> {
        self.get_float(Register::PidAcTauD)
    }

    pub fn set_pid_ac_tau_d(&mut self, value: f64) -> Result<()> {
        self.set_float(Register::PidAcTauD, value)
    }

    pub fn get_pid_bd_kc(&mut self) -> Result<f64> {
        self.get_float(Register::PidBdKc)
    }

    pub fn set_pid_bd_kc(&mut self, value: f64) -> Result<()> {
        self.set_float(Register::PidBdKc, value)
    }

    pub fn get_pid_bd_tau_i(&mut self) -> Result<f64> {
        self.get_float(Register::PidBdTauI)
    }

    pub fn set_pid_bd_tau_i(&mut self, value: f64) -> Result<()> {
        self.set_float(Register::PidBdTauI, value)
    }

    pub fn get_pid_bd_tau_d(&mut self) -> Result<f64> {
        self.get_float(Register::PidBdTauD)
    }

    pub fn set_pid_bd_tau_d(&mut self, value: f64) -> Result<()> {
        self.set_float(Register::PidBdTauD, value)
    }

    /// The 17-character MAC address, e.g. `DE:AD:BE:EF:00:01`.
    pub fn get_mac_address(&mut self) -> Result<Bytes> {
        self.get_block(Register::MacAddress)
    }

    /// Store a new IP address on the board.
    ///
    /// The text is sent as ASCII, zero padded to 16 bytes. It takes effect
    /// after the next reset.
    pub fn set_ip(&mut self, ip: &str) -> Result<()> {
        if ip.len() > IP_FIELD_LEN {
            return Err(ClientError::InvalidArgument(format!(
                "ip address '{ip}' is longer than {IP_FIELD_LEN} bytes"
            )));
        }
        self.write_register(
            Register::IpAddress,
            RegisterValue::Block(Bytes::copy_from_slice(ip.as_bytes())),
        )
    }

    /// Upload a firmware image read from `image`.
    ///
    /// The version is validated before anything is sent. A transport error
    /// part-way leaves the board mid-update; restart from the beginning.
    pub fn upload_firmware<R: Read>(&mut self, image: R, version: &str) -> Result<UploadReport> {
        let version: FirmwareVersion = version.parse()?;
        self.ensure_open()?;
        FirmwareUpload::new(self, version).run(image)
    }

    /// Upload the firmware image stored at `path`.
    pub fn reprogram(&mut self, path: impl AsRef<Path>, version: &str) -> Result<UploadReport> {
        let version: FirmwareVersion = version.parse()?;
        self.ensure_open()?;
        let file = File::open(path.as_ref()).map_err(ClientError::FirmwareSource)?;
        FirmwareUpload::new(self, version).run(BufReader::new(file))
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.frames.is_none()
    }

    /// Close the connection. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut frames) = self.frames.take() {
            frames.get_mut().close()?;
            debug!("client closed");
        }
        Ok(())
    }

    /// Borrow the underlying connection, if still open.
    pub fn get_ref(&self) -> Option<&S> {
        self.frames.as_ref().map(FrameStream::get_ref)
    }
}

impl<S> std::fmt::Debug for Client<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("open", &self.frames.is_some())
            .finish()
    }
}

fn shape_error(register: Register) -> ClientError {
    ClientError::Frame(rffe_frame::FrameError::ShapeMismatch {
        register: register.name(),
        expected: register.shape(),
    })
}

/// Parse user-supplied text into a value of the register's shape.
///
/// Bytes accept decimal or `0x`-prefixed hex; blocks take the text as-is.
pub fn value_from_text(register: Register, text: &str) -> Result<RegisterValue> {
    match register.shape() {
        ValueShape::Float64 => text
            .trim()
            .parse::<f64>()
            .map(RegisterValue::Float)
            .map_err(|err| ClientError::InvalidArgument(format!("{register}: {err}"))),
        ValueShape::Byte => parse_byte(text)
            .map(RegisterValue::Byte)
            .ok_or_else(|| ClientError::InvalidArgument(format!("{register}: '{text}' is not a byte"))),
        ValueShape::Block(_) => Ok(RegisterValue::Block(Bytes::copy_from_slice(text.as_bytes()))),
    }
}

fn parse_byte(text: &str) -> Option<u8> {
    let text = text.trim();
    match text.strip_prefix("0x") {
        Some(hex) => u8::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;
    use std::io::{ErrorKind, Write};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use rffe_frame::FrameError;

    use super::*;

    /// In-memory board: records every write and answers reads from a queue.
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedBoard {
        pub(crate) written: Vec<Vec<u8>>,
        pub(crate) responses: VecDeque<std::io::Result<Vec<u8>>>,
        pub(crate) reads: usize,
        pub(crate) closes: Arc<AtomicUsize>,
    }

    impl ScriptedBoard {
        pub(crate) fn answering(responses: Vec<Vec<u8>>) -> Self {
            Self {
                responses: responses.into_iter().map(Ok).collect(),
                ..Self::default()
            }
        }

        pub(crate) fn ops(&self) -> usize {
            self.written.len() + self.reads
        }
    }

    impl Read for ScriptedBoard {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.reads += 1;
            match self.responses.pop_front() {
                Some(Ok(bytes)) => {
                    let n = bytes.len().min(buf.len());
                    buf[..n].copy_from_slice(&bytes[..n]);
                    Ok(n)
                }
                Some(Err(err)) => Err(err),
                None => Err(std::io::Error::from(ErrorKind::TimedOut)),
            }
        }
    }

    impl Write for ScriptedBoard {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.written.push(buf.to_vec());
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Connection for ScriptedBoard {
        fn close(&mut self) -> rffe_transport::Result<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    pub(crate) fn ack() -> Vec<u8> {
        vec![0x11, 0x00, 0x01]
    }

    fn float_response(v: f64) -> Vec<u8> {
        let mut out = vec![0x11, 0x00, 0x09];
        out.extend_from_slice(&v.to_le_bytes());
        out
    }

    fn board(client: &Client<ScriptedBoard>) -> &ScriptedBoard {
        client.get_ref().unwrap()
    }

    #[test]
    fn get_attenuator_sends_read_frame() {
        let mut client = Client::new(ScriptedBoard::answering(vec![float_response(7.5)]));
        assert_eq!(client.get_attenuator().unwrap(), 7.5);
        assert_eq!(board(&client).written, vec![vec![0x10, 0x00, 0x01, 0x00]]);
    }

    #[test]
    fn set_attenuator_sends_float_payload() {
        let mut client = Client::new(ScriptedBoard::answering(vec![ack()]));
        client.set_attenuator(31.5).unwrap();

        let mut expected = vec![0x20, 0x00, 0x09, 0x00];
        expected.extend_from_slice(&31.5f64.to_le_bytes());
        assert_eq!(board(&client).written, vec![expected]);
        assert_eq!(board(&client).reads, 1);
    }

    #[test]
    fn invalid_attenuation_sends_nothing() {
        let mut client = Client::new(ScriptedBoard::default());
        for db in [-0.5, 0.3, 32.0, 100.0, f64::NAN] {
            let err = client.set_attenuator(db).unwrap_err();
            assert!(matches!(err, ClientError::InvalidArgument(_)), "{db}");
            assert!(err.is_invalid_argument());
        }
        assert_eq!(board(&client).ops(), 0);
    }

    #[test]
    fn temperature_control_status_zero_and_one_send_frames() {
        let mut client = Client::new(ScriptedBoard::answering(vec![ack(), ack()]));
        client.set_temperature_control_status(1).unwrap();
        client.set_temperature_control_status(0).unwrap();
        assert_eq!(
            board(&client).written,
            vec![
                vec![0x20, 0x00, 0x02, 0x05, 0x01],
                vec![0x20, 0x00, 0x02, 0x05, 0x00],
            ]
        );
    }

    #[test]
    fn temperature_control_status_other_values_are_ignored() {
        let mut client = Client::new(ScriptedBoard::default());
        for status in [2, 7, 255] {
            client.set_temperature_control_status(status).unwrap();
        }
        assert_eq!(board(&client).ops(), 0);
    }

    #[test]
    fn get_temperature_control_status_reads_byte() {
        let mut client = Client::new(ScriptedBoard::answering(vec![vec![0x11, 0x00, 0x02, 0x01]]));
        assert_eq!(client.get_temperature_control_status().unwrap(), 1);
        assert_eq!(board(&client).written, vec![vec![0x10, 0x00, 0x01, 0x05]]);
    }

    #[test]
    fn reset_writes_one() {
        let mut client = Client::new(ScriptedBoard::answering(vec![ack()]));
        client.reset().unwrap();
        assert_eq!(board(&client).written, vec![vec![0x20, 0x00, 0x02, 0x08, 0x01]]);
    }

    #[test]
    fn set_ip_pads_to_sixteen_bytes() {
        let mut client = Client::new(ScriptedBoard::answering(vec![ack()]));
        client.set_ip("10.0.18.36").unwrap();

        let written = &board(&client).written[0];
        assert_eq!(written.len(), 20);
        assert_eq!(&written[..4], &[0x20, 0x00, 0x11, 0x12]);
        assert_eq!(&written[4..14], b"10.0.18.36");
        assert!(written[14..].iter().all(|&b| b == 0));
    }

    #[test]
    fn set_ip_rejects_long_text() {
        let mut client = Client::new(ScriptedBoard::default());
        let err = client.set_ip("255.255.255.255:80").unwrap_err();
        assert!(matches!(err, ClientError::InvalidArgument(_)));
        assert_eq!(board(&client).ops(), 0);
    }

    #[test]
    fn software_version_and_mac_blocks() {
        let mut version = vec![0x11, 0x00, 0x08];
        version.extend_from_slice(b"V2_1_0\0");
        let mut mac = vec![0x11, 0x00, 0x12];
        mac.extend_from_slice(b"DE:AD:BE:EF:00:01");

        let mut client = Client::new(ScriptedBoard::answering(vec![version, mac]));
        assert_eq!(client.get_software_version().unwrap().as_ref(), b"V2_1_0\0");
        assert_eq!(client.get_mac_address().unwrap().as_ref(), b"DE:AD:BE:EF:00:01");
        assert_eq!(
            board(&client).written,
            vec![vec![0x10, 0x00, 0x01, 0x0B], vec![0x10, 0x00, 0x01, 0x13]]
        );
    }

    #[test]
    fn short_response_is_reported() {
        let mut client = Client::new(ScriptedBoard::answering(vec![vec![0x11, 0x00, 0x09, 0x00]]));
        let err = client.get_temp_ac().unwrap_err();
        assert!(err.is_short_response());
        assert!(matches!(
            err,
            ClientError::Frame(FrameError::ShortResponse { needed: 11, received: 4 })
        ));
    }

    #[test]
    fn read_timeout_is_reported() {
        let mut client = Client::new(ScriptedBoard::default());
        let err = client.get_pid_bd_kc().unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(board(&client).written, vec![vec![0x10, 0x00, 0x01, 0x0F]]);
    }

    #[test]
    fn pid_registers_use_their_ids() {
        let responses = (0..6).map(|_| ack()).collect();
        let mut client = Client::new(ScriptedBoard::answering(responses));
        client.set_pid_ac_kc(1.0).unwrap();
        client.set_pid_ac_tau_i(2.0).unwrap();
        client.set_pid_ac_tau_d(3.0).unwrap();
        client.set_pid_bd_kc(4.0).unwrap();
        client.set_pid_bd_tau_i(5.0).unwrap();
        client.set_pid_bd_tau_d(6.0).unwrap();

        let ids: Vec<u8> = board(&client).written.iter().map(|f| f[3]).collect();
        assert_eq!(ids, vec![0x0C, 0x0D, 0x0E, 0x0F, 0x10, 0x11]);
    }

    #[test]
    fn read_only_register_cannot_be_written() {
        let mut client = Client::new(ScriptedBoard::default());
        let err = client
            .write_register(Register::TempAc, RegisterValue::Float(20.0))
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidArgument(_)));
        let err = client.read_register(Register::Reset).unwrap_err();
        assert!(matches!(err, ClientError::InvalidArgument(_)));
        assert_eq!(board(&client).ops(), 0);
    }

    #[test]
    fn close_is_idempotent_and_final() {
        let mut client = Client::new(ScriptedBoard::default());
        client.close().unwrap();
        client.close().unwrap();
        assert!(client.is_closed());
        assert!(matches!(client.get_attenuator(), Err(ClientError::Closed)));
        assert!(matches!(client.reset(), Err(ClientError::Closed)));
    }

    #[test]
    fn close_closes_connection_once() {
        let board = ScriptedBoard::default();
        let closes = Arc::clone(&board.closes);
        let mut client = Client::new(board);
        client.close().unwrap();
        client.close().unwrap();
        assert_eq!(closes.load(Ordering::SeqCst), 1);
        assert!(client.get_ref().is_none());
    }

    #[test]
    fn value_from_text_follows_shape() {
        assert_eq!(
            value_from_text(Register::Attenuator, "12.5").unwrap(),
            RegisterValue::Float(12.5)
        );
        assert_eq!(
            value_from_text(Register::TempControlStatus, "0x01").unwrap(),
            RegisterValue::Byte(1)
        );
        assert!(value_from_text(Register::TempControlStatus, "on").is_err());
        assert_eq!(
            value_from_text(Register::IpAddress, "10.0.0.1").unwrap(),
            RegisterValue::Block(Bytes::from_static(b"10.0.0.1"))
        );
    }
}

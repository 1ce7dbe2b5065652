//! Register catalog.
//!
//! Every parameter on the board is addressed by a one-byte id and carries a
//! value of a fixed wire shape. The catalog is closed: registers are known at
//! build time and never created at runtime.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;

use crate::error::{FrameError, Result};

/// Attenuator resolution in dB.
pub const ATTENUATION_STEP_DB: f64 = 0.5;

/// Number of attenuator settings (0 dB to 31.5 dB inclusive).
pub const ATTENUATION_STEPS: u32 = 64;

/// Wire shape of a register value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// 8-byte little-endian IEEE-754 double.
    Float64,
    /// A single byte.
    Byte,
    /// A fixed-width block of bytes.
    Block(usize),
}

impl ValueShape {
    /// Number of value bytes on the wire.
    pub fn wire_len(self) -> usize {
        match self {
            ValueShape::Float64 => 8,
            ValueShape::Byte => 1,
            ValueShape::Block(len) => len,
        }
    }
}

impl fmt::Display for ValueShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueShape::Float64 => f.write_str("f64"),
            ValueShape::Byte => f.write_str("u8"),
            ValueShape::Block(len) => write!(f, "{len}-byte block"),
        }
    }
}

/// Which directions a register supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
    ReadWrite,
}

impl Access {
    pub fn readable(self) -> bool {
        matches!(self, Access::Read | Access::ReadWrite)
    }

    pub fn writable(self) -> bool {
        matches!(self, Access::Write | Access::ReadWrite)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Access::Read => "r",
            Access::Write => "w",
            Access::ReadWrite => "rw",
        }
    }
}

/// A decoded register value.
#[derive(Debug, Clone, PartialEq)]
pub enum RegisterValue {
    Float(f64),
    Byte(u8),
    Block(Bytes),
}

impl RegisterValue {
    pub fn as_float(&self) -> Option<f64> {
        match self {
            RegisterValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_byte(&self) -> Option<u8> {
        match self {
            RegisterValue::Byte(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&Bytes> {
        match self {
            RegisterValue::Block(v) => Some(v),
            _ => None,
        }
    }

    /// Block contents as text, up to the first NUL.
    pub fn as_text(&self) -> Option<String> {
        self.as_block().map(|block| {
            let end = block.iter().position(|&b| b == 0).unwrap_or(block.len());
            String::from_utf8_lossy(&block[..end]).into_owned()
        })
    }

    fn matches(&self, shape: ValueShape) -> bool {
        matches!(
            (self, shape),
            (RegisterValue::Float(_), ValueShape::Float64)
                | (RegisterValue::Byte(_), ValueShape::Byte)
                | (RegisterValue::Block(_), ValueShape::Block(_))
        )
    }
}

impl fmt::Display for RegisterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterValue::Float(v) => write!(f, "{v}"),
            RegisterValue::Byte(v) => write!(f, "{v}"),
            RegisterValue::Block(_) => f.write_str(&self.as_text().unwrap_or_default()),
        }
    }
}

/// Board registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    Attenuator,
    TempAc,
    TempBd,
    TempAcSetpoint,
    TempBdSetpoint,
    TempControlStatus,
    HeaterAc,
    HeaterBd,
    Reset,
    FirmwareControl,
    FirmwareData,
    SoftwareVersion,
    PidAcKc,
    PidAcTauI,
    PidAcTauD,
    PidBdKc,
    PidBdTauI,
    PidBdTauD,
    IpAddress,
    MacAddress,
}

impl Register {
    /// The full catalog, in id order.
    pub const ALL: [Register; 20] = [
        Register::Attenuator,
        Register::TempAc,
        Register::TempBd,
        Register::TempAcSetpoint,
        Register::TempBdSetpoint,
        Register::TempControlStatus,
        Register::HeaterAc,
        Register::HeaterBd,
        Register::Reset,
        Register::FirmwareControl,
        Register::FirmwareData,
        Register::SoftwareVersion,
        Register::PidAcKc,
        Register::PidAcTauI,
        Register::PidAcTauD,
        Register::PidBdKc,
        Register::PidBdTauI,
        Register::PidBdTauD,
        Register::IpAddress,
        Register::MacAddress,
    ];

    /// One-byte register id used on the wire.
    pub fn id(self) -> u8 {
        match self {
            Register::Attenuator => 0x00,
            Register::TempAc => 0x01,
            Register::TempBd => 0x02,
            Register::TempAcSetpoint => 0x03,
            Register::TempBdSetpoint => 0x04,
            Register::TempControlStatus => 0x05,
            Register::HeaterAc => 0x06,
            Register::HeaterBd => 0x07,
            Register::Reset => 0x08,
            Register::FirmwareControl => 0x09,
            Register::FirmwareData => 0x0A,
            Register::SoftwareVersion => 0x0B,
            Register::PidAcKc => 0x0C,
            Register::PidAcTauI => 0x0D,
            Register::PidAcTauD => 0x0E,
            Register::PidBdKc => 0x0F,
            Register::PidBdTauI => 0x10,
            Register::PidBdTauD => 0x11,
            Register::IpAddress => 0x12,
            Register::MacAddress => 0x13,
        }
    }

    /// Look a register up by wire id.
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|reg| reg.id() == id)
    }

    /// Stable kebab-case name.
    pub fn name(self) -> &'static str {
        match self {
            Register::Attenuator => "attenuator",
            Register::TempAc => "temp-ac",
            Register::TempBd => "temp-bd",
            Register::TempAcSetpoint => "temp-ac-setpoint",
            Register::TempBdSetpoint => "temp-bd-setpoint",
            Register::TempControlStatus => "temp-control",
            Register::HeaterAc => "heater-ac",
            Register::HeaterBd => "heater-bd",
            Register::Reset => "reset",
            Register::FirmwareControl => "firmware-control",
            Register::FirmwareData => "firmware-data",
            Register::SoftwareVersion => "software-version",
            Register::PidAcKc => "pid-ac-kc",
            Register::PidAcTauI => "pid-ac-taui",
            Register::PidAcTauD => "pid-ac-taud",
            Register::PidBdKc => "pid-bd-kc",
            Register::PidBdTauI => "pid-bd-taui",
            Register::PidBdTauD => "pid-bd-taud",
            Register::IpAddress => "ip-address",
            Register::MacAddress => "mac-address",
        }
    }

    pub fn shape(self) -> ValueShape {
        match self {
            Register::TempControlStatus | Register::Reset | Register::FirmwareControl => {
                ValueShape::Byte
            }
            Register::FirmwareData => ValueShape::Block(crate::codec::FIRMWARE_CHUNK_SIZE),
            Register::SoftwareVersion => ValueShape::Block(7),
            Register::IpAddress => ValueShape::Block(16),
            Register::MacAddress => ValueShape::Block(17),
            _ => ValueShape::Float64,
        }
    }

    pub fn access(self) -> Access {
        match self {
            Register::TempAc
            | Register::TempBd
            | Register::SoftwareVersion
            | Register::MacAddress => Access::Read,
            Register::Reset
            | Register::FirmwareControl
            | Register::FirmwareData
            | Register::IpAddress => Access::Write,
            _ => Access::ReadWrite,
        }
    }

    /// Physical unit, for display.
    pub fn unit(self) -> Option<&'static str> {
        match self {
            Register::Attenuator => Some("dB"),
            Register::TempAc
            | Register::TempBd
            | Register::TempAcSetpoint
            | Register::TempBdSetpoint => Some("°C"),
            Register::HeaterAc | Register::HeaterBd => Some("V"),
            _ => None,
        }
    }

    /// Check a value against this register's shape and domain.
    pub fn check(self, value: &RegisterValue) -> Result<()> {
        if !value.matches(self.shape()) {
            return Err(FrameError::ShapeMismatch {
                register: self.name(),
                expected: self.shape(),
            });
        }

        match (self, value) {
            (Register::Attenuator, RegisterValue::Float(db)) if !is_valid_attenuation(*db) => {
                Err(self.out_of_domain(format!(
                    "{db} dB is not a 0.5 dB step between 0 and 31.5 dB"
                )))
            }
            (Register::TempControlStatus, RegisterValue::Byte(status)) if *status > 1 => {
                Err(self.out_of_domain(format!("status must be 0 or 1, got {status}")))
            }
            (Register::Reset, RegisterValue::Byte(v)) if *v != 0x01 => {
                Err(self.out_of_domain(format!("reset accepts only 0x01, got {v:#04x}")))
            }
            (Register::FirmwareControl, RegisterValue::Byte(v)) if !matches!(v, 0x01 | 0x02) => {
                Err(self.out_of_domain(format!("expected 0x01 or 0x02, got {v:#04x}")))
            }
            (_, RegisterValue::Block(block)) if block.len() > self.shape().wire_len() => {
                Err(FrameError::PayloadTooLarge {
                    size: block.len(),
                    max: self.shape().wire_len(),
                })
            }
            (Register::IpAddress, RegisterValue::Block(text))
                if text.is_empty() || !text.is_ascii() =>
            {
                Err(self.out_of_domain("address must be non-empty ASCII".to_string()))
            }
            _ => Ok(()),
        }
    }

    fn out_of_domain(self, reason: String) -> FrameError {
        FrameError::OutOfDomain {
            register: self.name(),
            reason,
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Register {
    type Err = FrameError;

    /// Accepts the kebab-case name, underscores in place of dashes, or a
    /// hex id such as `0x0b`.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        if let Some(hex) = normalized.strip_prefix("0x") {
            return u8::from_str_radix(hex, 16)
                .ok()
                .and_then(Register::from_id)
                .ok_or_else(|| FrameError::UnknownRegister(s.to_string()));
        }
        Register::ALL
            .into_iter()
            .find(|reg| reg.name() == normalized)
            .ok_or_else(|| FrameError::UnknownRegister(s.to_string()))
    }
}

/// True if `db` is one of the 64 attenuator settings.
pub fn is_valid_attenuation(db: f64) -> bool {
    if !(0.0..=ATTENUATION_STEP_DB * f64::from(ATTENUATION_STEPS - 1)).contains(&db) {
        return false;
    }
    let steps = db / ATTENUATION_STEP_DB;
    steps.fract() == 0.0
}

/// All valid attenuator settings, ascending.
pub fn attenuation_steps() -> impl Iterator<Item = f64> {
    (0..ATTENUATION_STEPS).map(|k| f64::from(k) * ATTENUATION_STEP_DB)
}

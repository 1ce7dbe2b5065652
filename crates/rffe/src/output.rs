use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use rffe_client::{Register, RegisterValue};
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One register and, when it was read, its value.
#[derive(Serialize)]
pub struct RegisterRow {
    pub id: String,
    pub name: &'static str,
    pub shape: String,
    pub access: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl RegisterRow {
    pub fn describe(register: Register) -> Self {
        Self {
            id: format!("0x{:02X}", register.id()),
            name: register.name(),
            shape: register.shape().to_string(),
            access: register.access().as_str(),
            unit: register.unit(),
            value: None,
        }
    }

    pub fn with_value(register: Register, value: &RegisterValue) -> Self {
        Self {
            value: Some(json_value(value)),
            ..Self::describe(register)
        }
    }

    fn value_text(&self) -> String {
        match &self.value {
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }
}

/// Register values as JSON: numbers stay numbers, blocks become text.
pub fn json_value(value: &RegisterValue) -> Value {
    match value {
        RegisterValue::Float(v) => serde_json::Number::from_f64(*v)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        RegisterValue::Byte(v) => Value::from(*v),
        RegisterValue::Block(_) => Value::String(value.to_string()),
    }
}

pub fn print_rows(rows: &[RegisterRow], with_values: bool, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(rows),
        OutputFormat::Table => {
            let mut header = vec!["ID", "REGISTER", "SHAPE", "ACCESS", "UNIT"];
            if with_values {
                header.push("VALUE");
            }
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(header);
            for row in rows {
                let mut cells = vec![
                    row.id.clone(),
                    row.name.to_string(),
                    row.shape.clone(),
                    row.access.to_string(),
                    row.unit.unwrap_or("").to_string(),
                ];
                if with_values {
                    cells.push(row.value_text());
                }
                table.add_row(cells);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for row in rows {
                if with_values {
                    println!(
                        "{:<20} {}{}",
                        row.name,
                        row.value_text(),
                        row.unit.map(|u| format!(" {u}")).unwrap_or_default()
                    );
                } else {
                    println!("{} {:<20} {:<14} {}", row.id, row.name, row.shape, row.access);
                }
            }
        }
    }
}

pub fn print_value(register: Register, value: &RegisterValue, format: OutputFormat) {
    let row = RegisterRow::with_value(register, value);
    match format {
        OutputFormat::Json => print_json(&row),
        OutputFormat::Table => print_rows(std::slice::from_ref(&row), true, format),
        OutputFormat::Pretty => println!("{}", row.value_text()),
    }
}

/// Outcome of a command that only writes.
#[derive(Serialize)]
pub struct Ack<'a> {
    pub action: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub register: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    pub ok: bool,
}

pub fn print_ack(ack: &Ack<'_>, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(ack),
        OutputFormat::Table | OutputFormat::Pretty => match (&ack.register, &ack.value) {
            (Some(register), Some(value)) => println!("{}: {register} = {value}", ack.action),
            _ => println!("{}: ok", ack.action),
        },
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

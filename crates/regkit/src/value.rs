//! Typed registry values.
//!
//! Raw registry data is a type code plus a byte payload. It is decoded once, right
//! after the read, into [`RegValue`]; everything downstream dispatches on the
//! variant instead of re-inspecting bytes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Win32 registry value type codes.
pub mod reg_types {
    pub const REG_NONE: u32 = 0;
    pub const REG_SZ: u32 = 1;
    pub const REG_EXPAND_SZ: u32 = 2;
    pub const REG_BINARY: u32 = 3;
    pub const REG_DWORD: u32 = 4;
    pub const REG_DWORD_BIG_ENDIAN: u32 = 5;
    pub const REG_LINK: u32 = 6;
    pub const REG_MULTI_SZ: u32 = 7;
    pub const REG_QWORD: u32 = 11;
}

/// The kind of a registry value, as reported by the value type query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    None,
    String,
    ExpandString,
    Binary,
    DWord,
    MultiString,
    QWord,
    Unknown,
}

impl ValueKind {
    pub fn from_type_code(code: u32) -> ValueKind {
        use reg_types::*;
        match code {
            REG_NONE => ValueKind::None,
            REG_SZ => ValueKind::String,
            REG_EXPAND_SZ => ValueKind::ExpandString,
            REG_BINARY => ValueKind::Binary,
            REG_DWORD => ValueKind::DWord,
            REG_MULTI_SZ => ValueKind::MultiString,
            REG_QWORD => ValueKind::QWord,
            _ => ValueKind::Unknown,
        }
    }

    /// Canonical name.
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::None => "None",
            ValueKind::String => "String",
            ValueKind::ExpandString => "ExpandString",
            ValueKind::Binary => "Binary",
            ValueKind::DWord => "DWord",
            ValueKind::MultiString => "MultiString",
            ValueKind::QWord => "QWord",
            ValueKind::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded registry value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum RegValue {
    String(String),
    /// String containing `%VAR%` references, expanded when rendered.
    ExpandString(String),
    MultiString(Vec<String>),
    Binary(Vec<u8>),
    DWord(u32),
    QWord(u64),
    /// REG_NONE, REG_LINK, big-endian DWORDs, and payloads too short for their type.
    Unknown { type_code: u32, data: Vec<u8> },
}

impl RegValue {
    /// Decode a raw payload as returned by the OS.
    pub fn from_raw(type_code: u32, data: &[u8]) -> RegValue {
        use reg_types::*;
        match type_code {
            REG_SZ => RegValue::String(read_utf16le_string(data)),
            REG_EXPAND_SZ => RegValue::ExpandString(read_utf16le_string(data)),
            REG_MULTI_SZ => RegValue::MultiString(read_utf16le_multi(data)),
            REG_BINARY => RegValue::Binary(data.to_vec()),
            REG_DWORD if data.len() >= 4 => {
                RegValue::DWord(u32::from_le_bytes([data[0], data[1], data[2], data[3]]))
            }
            REG_QWORD if data.len() >= 8 => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(&data[..8]);
                RegValue::QWord(u64::from_le_bytes(raw))
            }
            _ => RegValue::Unknown {
                type_code,
                data: data.to_vec(),
            },
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            RegValue::String(_) => ValueKind::String,
            RegValue::ExpandString(_) => ValueKind::ExpandString,
            RegValue::MultiString(_) => ValueKind::MultiString,
            RegValue::Binary(_) => ValueKind::Binary,
            RegValue::DWord(_) => ValueKind::DWord,
            RegValue::QWord(_) => ValueKind::QWord,
            RegValue::Unknown { type_code, .. } => ValueKind::from_type_code(*type_code),
        }
    }

    /// Raw bytes for the variants that carry opaque data.
    pub fn raw_bytes(&self) -> Option<&[u8]> {
        match self {
            RegValue::Binary(data) | RegValue::Unknown { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Single-line string form used when listing and searching values.
    pub fn render_text(&self) -> String {
        match self {
            RegValue::String(s) => s.clone(),
            RegValue::ExpandString(s) => expand_environment(s),
            RegValue::MultiString(items) => items.join("\n"),
            RegValue::Binary(data) | RegValue::Unknown { data, .. } => hex_display(data),
            RegValue::DWord(v) => v.to_string(),
            RegValue::QWord(v) => v.to_string(),
        }
    }
}

/// Upper-case hex bytes separated by single spaces, e.g. `0A FF 10`.
pub fn hex_display(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Replace `%NAME%` references with the value of the environment variable `NAME`.
/// References to undefined variables are left as written.
pub fn expand_environment(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find('%') else {
            out.push_str(&rest[start..]);
            return out;
        };

        let name = &after[..end];
        match lookup_env(name) {
            Some(value) => {
                out.push_str(&value);
                rest = &after[end + 1..];
            }
            None => {
                // The closing '%' may open the next reference.
                out.push('%');
                out.push_str(name);
                rest = &after[end..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn lookup_env(name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    std::env::var(name).ok()
}

fn utf16_units(data: &[u8]) -> Vec<u16> {
    data.chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect()
}

/// Decode a UTF-16LE string from raw bytes, stopping at first null or end.
fn read_utf16le_string(data: &[u8]) -> String {
    let units: Vec<u16> = utf16_units(data).into_iter().take_while(|&c| c != 0).collect();
    String::from_utf16_lossy(&units)
}

/// Decode a REG_MULTI_SZ payload: NUL-separated strings ending in a double NUL.
fn read_utf16le_multi(data: &[u8]) -> Vec<String> {
    let mut units = utf16_units(data);
    while units.last() == Some(&0) {
        units.pop();
    }
    if units.is_empty() {
        return Vec::new();
    }
    units
        .split(|&c| c == 0)
        .map(String::from_utf16_lossy)
        .collect()
}

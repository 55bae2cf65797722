//! Memory value enum for handling different data types

use super::address::Address;
use super::error::{MemoryError, MemoryResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::mem::size_of;
use std::os::raw::c_long;
use std::str::FromStr;

/// Three consecutive f32 values
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Four consecutive f32 values, laid out w, x, y, z
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector4 {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Semantic type of a value stored in target memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    #[serde(rename = "byte")]
    U8,
    #[serde(rename = "short")]
    I16,
    #[serde(rename = "int32")]
    I32,
    #[serde(rename = "uint32")]
    U32,
    #[serde(rename = "int64")]
    I64,
    #[serde(rename = "uint64")]
    U64,
    #[serde(rename = "float")]
    F32,
    #[serde(rename = "double")]
    F64,
    #[serde(rename = "bool")]
    Bool,
    #[serde(rename = "pointer")]
    Pointer,
    #[serde(rename = "string")]
    String,
    #[serde(rename = "vec3")]
    Vec3,
    #[serde(rename = "vec4")]
    Vec4,
    #[serde(rename = "bytes")]
    Bytes,
}

impl ValueType {
    /// Type matching the host C `long`
    pub const C_LONG: ValueType = if size_of::<c_long>() == 8 {
        ValueType::I64
    } else {
        ValueType::I32
    };

    /// Returns the size in bytes for this value type
    ///
    /// `None` for variable-size types (`string`, `bytes`).
    pub const fn size(&self) -> Option<usize> {
        match self {
            ValueType::U8 | ValueType::Bool => Some(1),
            ValueType::I16 => Some(2),
            ValueType::I32 | ValueType::U32 | ValueType::F32 => Some(4),
            ValueType::I64 | ValueType::U64 | ValueType::F64 => Some(8),
            ValueType::Pointer => Some(size_of::<usize>()),
            ValueType::Vec3 => Some(size_of::<Vector3>()),
            ValueType::Vec4 => Some(size_of::<Vector4>()),
            ValueType::String | ValueType::Bytes => None,
        }
    }

    /// Canonical lowercase tag
    pub const fn as_str(&self) -> &'static str {
        match self {
            ValueType::U8 => "byte",
            ValueType::I16 => "short",
            ValueType::I32 => "int32",
            ValueType::U32 => "uint32",
            ValueType::I64 => "int64",
            ValueType::U64 => "uint64",
            ValueType::F32 => "float",
            ValueType::F64 => "double",
            ValueType::Bool => "bool",
            ValueType::Pointer => "pointer",
            ValueType::String => "string",
            ValueType::Vec3 => "vec3",
            ValueType::Vec4 => "vec4",
            ValueType::Bytes => "bytes",
        }
    }
}

impl FromStr for ValueType {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value_type = match s.trim().to_ascii_lowercase().as_str() {
            "byte" => ValueType::U8,
            "short" => ValueType::I16,
            "int" | "int32" => ValueType::I32,
            "uint32" | "dword" => ValueType::U32,
            "int64" => ValueType::I64,
            "uint64" => ValueType::U64,
            "long" => ValueType::C_LONG,
            "float" => ValueType::F32,
            "double" => ValueType::F64,
            "bool" | "boolean" => ValueType::Bool,
            "ptr" | "pointer" => ValueType::Pointer,
            "str" | "string" => ValueType::String,
            "vec3" | "vector3" => ValueType::Vec3,
            "vec4" | "vector4" => ValueType::Vec4,
            "bytes" | "buffer" => ValueType::Bytes,
            other => {
                return Err(MemoryError::InvalidArgument(format!(
                    "unknown value type '{}'",
                    other
                )))
            }
        };
        Ok(value_type)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value read from or destined for target memory, tagged with its type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum MemoryValue {
    #[serde(rename = "byte")]
    U8(u8),
    #[serde(rename = "short")]
    I16(i16),
    #[serde(rename = "int32")]
    I32(i32),
    #[serde(rename = "uint32")]
    U32(u32),
    #[serde(rename = "int64")]
    I64(i64),
    #[serde(rename = "uint64")]
    U64(u64),
    #[serde(rename = "float")]
    F32(f32),
    #[serde(rename = "double")]
    F64(f64),
    #[serde(rename = "bool")]
    Bool(bool),
    #[serde(rename = "pointer")]
    Pointer(Address),
    #[serde(rename = "string")]
    String(String),
    #[serde(rename = "vec3")]
    Vec3(Vector3),
    #[serde(rename = "vec4")]
    Vec4(Vector4),
    #[serde(rename = "bytes")]
    Bytes(Vec<u8>),
}

fn array<const N: usize>(bytes: &[u8]) -> Option<[u8; N]> {
    bytes.get(..N)?.try_into().ok()
}

fn f32_at(bytes: &[u8], index: usize) -> Option<f32> {
    array::<4>(bytes.get(index * 4..)?).map(f32::from_ne_bytes)
}

impl MemoryValue {
    /// Returns the size in bytes of the encoded value
    pub fn size(&self) -> usize {
        match self {
            MemoryValue::String(s) => s.len() + 1,
            MemoryValue::Bytes(b) => b.len(),
            other => other.value_type().size().unwrap_or(0),
        }
    }

    /// Encodes the value in native byte order
    ///
    /// Strings gain a trailing NUL; bools encode as 0 or 1.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            MemoryValue::U8(v) => vec![*v],
            MemoryValue::I16(v) => v.to_ne_bytes().to_vec(),
            MemoryValue::I32(v) => v.to_ne_bytes().to_vec(),
            MemoryValue::U32(v) => v.to_ne_bytes().to_vec(),
            MemoryValue::I64(v) => v.to_ne_bytes().to_vec(),
            MemoryValue::U64(v) => v.to_ne_bytes().to_vec(),
            MemoryValue::F32(v) => v.to_ne_bytes().to_vec(),
            MemoryValue::F64(v) => v.to_ne_bytes().to_vec(),
            MemoryValue::Bool(v) => vec![u8::from(*v)],
            MemoryValue::Pointer(a) => a.as_usize().to_ne_bytes().to_vec(),
            MemoryValue::String(s) => {
                let mut bytes = Vec::with_capacity(s.len() + 1);
                bytes.extend_from_slice(s.as_bytes());
                bytes.push(0);
                bytes
            }
            MemoryValue::Vec3(v) => [v.x, v.y, v.z]
                .iter()
                .flat_map(|c| c.to_ne_bytes())
                .collect(),
            MemoryValue::Vec4(v) => [v.w, v.x, v.y, v.z]
                .iter()
                .flat_map(|c| c.to_ne_bytes())
                .collect(),
            MemoryValue::Bytes(b) => b.clone(),
        }
    }

    /// Decodes a value of the given type from native-order bytes
    ///
    /// Returns `None` when `bytes` is shorter than the type's width.
    /// Strings stop at the first NUL and are decoded lossily.
    pub fn from_bytes(bytes: &[u8], value_type: ValueType) -> Option<Self> {
        let value = match value_type {
            ValueType::U8 => MemoryValue::U8(*bytes.first()?),
            ValueType::I16 => MemoryValue::I16(i16::from_ne_bytes(array(bytes)?)),
            ValueType::I32 => MemoryValue::I32(i32::from_ne_bytes(array(bytes)?)),
            ValueType::U32 => MemoryValue::U32(u32::from_ne_bytes(array(bytes)?)),
            ValueType::I64 => MemoryValue::I64(i64::from_ne_bytes(array(bytes)?)),
            ValueType::U64 => MemoryValue::U64(u64::from_ne_bytes(array(bytes)?)),
            ValueType::F32 => MemoryValue::F32(f32::from_ne_bytes(array(bytes)?)),
            ValueType::F64 => MemoryValue::F64(f64::from_ne_bytes(array(bytes)?)),
            ValueType::Bool => MemoryValue::Bool(*bytes.first()? != 0),
            ValueType::Pointer => {
                MemoryValue::Pointer(Address::new(usize::from_ne_bytes(array(bytes)?)))
            }
            ValueType::String => {
                let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
                MemoryValue::String(String::from_utf8_lossy(&bytes[..end]).into_owned())
            }
            ValueType::Vec3 => MemoryValue::Vec3(Vector3 {
                x: f32_at(bytes, 0)?,
                y: f32_at(bytes, 1)?,
                z: f32_at(bytes, 2)?,
            }),
            ValueType::Vec4 => MemoryValue::Vec4(Vector4 {
                w: f32_at(bytes, 0)?,
                x: f32_at(bytes, 1)?,
                y: f32_at(bytes, 2)?,
                z: f32_at(bytes, 3)?,
            }),
            ValueType::Bytes => MemoryValue::Bytes(bytes.to_vec()),
        };
        Some(value)
    }

    /// Gets the value type enum for this value
    pub fn value_type(&self) -> ValueType {
        match self {
            MemoryValue::U8(_) => ValueType::U8,
            MemoryValue::I16(_) => ValueType::I16,
            MemoryValue::I32(_) => ValueType::I32,
            MemoryValue::U32(_) => ValueType::U32,
            MemoryValue::I64(_) => ValueType::I64,
            MemoryValue::U64(_) => ValueType::U64,
            MemoryValue::F32(_) => ValueType::F32,
            MemoryValue::F64(_) => ValueType::F64,
            MemoryValue::Bool(_) => ValueType::Bool,
            MemoryValue::Pointer(_) => ValueType::Pointer,
            MemoryValue::String(_) => ValueType::String,
            MemoryValue::Vec3(_) => ValueType::Vec3,
            MemoryValue::Vec4(_) => ValueType::Vec4,
            MemoryValue::Bytes(_) => ValueType::Bytes,
        }
    }

    /// Parses user text into a value of the given type
    ///
    /// Bytes are hex (`"DEADBEEF"` or `"DE AD BE EF"`), vectors are
    /// comma-separated components, pointers accept any `Address` syntax.
    pub fn parse(value_type: ValueType, text: &str) -> MemoryResult<Self> {
        let text = text.trim();
        let bad = |what: &str| {
            MemoryError::InvalidArgument(format!("cannot parse '{}' as {}", text, what))
        };

        let value = match value_type {
            ValueType::U8 => MemoryValue::U8(text.parse().map_err(|_| bad("byte"))?),
            ValueType::I16 => MemoryValue::I16(text.parse().map_err(|_| bad("short"))?),
            ValueType::I32 => MemoryValue::I32(text.parse().map_err(|_| bad("int32"))?),
            ValueType::U32 => MemoryValue::U32(text.parse().map_err(|_| bad("uint32"))?),
            ValueType::I64 => MemoryValue::I64(text.parse().map_err(|_| bad("int64"))?),
            ValueType::U64 => MemoryValue::U64(text.parse().map_err(|_| bad("uint64"))?),
            ValueType::F32 => MemoryValue::F32(text.parse().map_err(|_| bad("float"))?),
            ValueType::F64 => MemoryValue::F64(text.parse().map_err(|_| bad("double"))?),
            ValueType::Bool => match text.to_ascii_lowercase().as_str() {
                "true" | "1" => MemoryValue::Bool(true),
                "false" | "0" => MemoryValue::Bool(false),
                _ => return Err(bad("bool")),
            },
            ValueType::Pointer => MemoryValue::Pointer(text.parse()?),
            ValueType::String => MemoryValue::String(text.to_string()),
            ValueType::Vec3 => {
                let c = parse_components(text, 3).ok_or_else(|| bad("vec3"))?;
                MemoryValue::Vec3(Vector3 {
                    x: c[0],
                    y: c[1],
                    z: c[2],
                })
            }
            ValueType::Vec4 => {
                let c = parse_components(text, 4).ok_or_else(|| bad("vec4"))?;
                MemoryValue::Vec4(Vector4 {
                    w: c[0],
                    x: c[1],
                    y: c[2],
                    z: c[3],
                })
            }
            ValueType::Bytes => {
                let compact: String = text.split_whitespace().collect();
                MemoryValue::Bytes(hex::decode(compact).map_err(|_| bad("hex bytes"))?)
            }
        };
        Ok(value)
    }
}

fn parse_components(text: &str, count: usize) -> Option<Vec<f32>> {
    let components = text
        .split(',')
        .map(|part| part.trim().parse::<f32>().ok())
        .collect::<Option<Vec<_>>>()?;
    (components.len() == count).then_some(components)
}

impl fmt::Display for MemoryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryValue::U8(v) => write!(f, "{}", v),
            MemoryValue::I16(v) => write!(f, "{}", v),
            MemoryValue::I32(v) => write!(f, "{}", v),
            MemoryValue::U32(v) => write!(f, "{}", v),
            MemoryValue::I64(v) => write!(f, "{}", v),
            MemoryValue::U64(v) => write!(f, "{}", v),
            MemoryValue::F32(v) => write!(f, "{}", v),
            MemoryValue::F64(v) => write!(f, "{}", v),
            MemoryValue::Bool(v) => write!(f, "{}", v),
            MemoryValue::Pointer(a) => write!(f, "{}", a),
            MemoryValue::String(s) => write!(f, "\"{}\"", s),
            MemoryValue::Vec3(v) => write!(f, "({}, {}, {})", v.x, v.y, v.z),
            MemoryValue::Vec4(v) => write!(f, "({}, {}, {}, {})", v.w, v.x, v.y, v.z),
            MemoryValue::Bytes(b) => write!(f, "{}", hex::encode_upper(b)),
        }
    }
}

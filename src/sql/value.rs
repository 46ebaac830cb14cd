//! Typed scalar values and their canonical binary encodings.
//!
//! Every encoding is fixed-width for the numeric kinds, and chosen so that
//! bytewise comparison of two encoded values of the same kind matches their
//! natural ordering. This is what lets index range scans return values in
//! type-natural order without decoding them.

use crate::err::Error;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter, Write};

/// The type of a [`Value`]. The `u8` representation is the tag stored in
/// encoded record headers, and must never be reordered.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Kind {
	Bool = 1,
	Int8 = 2,
	Int16 = 3,
	Int32 = 4,
	Int64 = 5,
	Int = 6,
	Uint8 = 7,
	Uint16 = 8,
	Uint32 = 9,
	Uint64 = 10,
	Uint = 11,
	Float32 = 12,
	Float64 = 13,
	String = 14,
	Bytes = 15,
	Null = 16,
}

impl Kind {
	pub(crate) fn from_u8(v: u8) -> Option<Kind> {
		match v {
			1 => Some(Kind::Bool),
			2 => Some(Kind::Int8),
			3 => Some(Kind::Int16),
			4 => Some(Kind::Int32),
			5 => Some(Kind::Int64),
			6 => Some(Kind::Int),
			7 => Some(Kind::Uint8),
			8 => Some(Kind::Uint16),
			9 => Some(Kind::Uint32),
			10 => Some(Kind::Uint64),
			11 => Some(Kind::Uint),
			12 => Some(Kind::Float32),
			13 => Some(Kind::Float64),
			14 => Some(Kind::String),
			15 => Some(Kind::Bytes),
			16 => Some(Kind::Null),
			_ => None,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Kind::Bool => "bool",
			Kind::Int8 => "int8",
			Kind::Int16 => "int16",
			Kind::Int32 => "int32",
			Kind::Int64 => "int64",
			Kind::Int => "int",
			Kind::Uint8 => "uint8",
			Kind::Uint16 => "uint16",
			Kind::Uint32 => "uint32",
			Kind::Uint64 => "uint64",
			Kind::Uint => "uint",
			Kind::Float32 => "float32",
			Kind::Float64 => "float64",
			Kind::String => "string",
			Kind::Bytes => "bytes",
			Kind::Null => "null",
		}
	}
}

impl Display for Kind {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A typed scalar: a [`Kind`] tag together with the canonical byte
/// encoding of the value for that kind.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Value {
	pub kind: Kind,
	pub data: Vec<u8>,
}

impl Value {
	pub fn new(kind: Kind, data: Vec<u8>) -> Value {
		Value {
			kind,
			data,
		}
	}

	/// The null value
	pub fn null() -> Value {
		Value::new(Kind::Null, Vec::new())
	}

	/// The zero value of a kind
	pub fn zero(kind: Kind) -> Value {
		match kind {
			Kind::Bool => Value::from(false),
			Kind::Int8 => Value::from(0i8),
			Kind::Int16 => Value::from(0i16),
			Kind::Int32 => Value::from(0i32),
			Kind::Int64 => Value::new(Kind::Int64, encode_i64(0).to_vec()),
			Kind::Int => Value::from(0i64),
			Kind::Uint8 => Value::from(0u8),
			Kind::Uint16 => Value::from(0u16),
			Kind::Uint32 => Value::from(0u32),
			Kind::Uint64 => Value::new(Kind::Uint64, encode_u64(0).to_vec()),
			Kind::Uint => Value::from(0u64),
			Kind::Float32 => Value::from(0f32),
			Kind::Float64 => Value::from(0f64),
			Kind::String => Value::new(Kind::String, Vec::new()),
			Kind::Bytes => Value::new(Kind::Bytes, Vec::new()),
			Kind::Null => Value::null(),
		}
	}

	pub fn is_null(&self) -> bool {
		self.kind == Kind::Null
	}

	/// Decode this value as a signed 64-bit integer. Fails when the kind
	/// is not an integer kind, or when an unsigned value does not fit.
	pub fn as_int(&self) -> Result<i64, Error> {
		match self.kind {
			Kind::Int8 => Ok(decode_i8(&self.data)? as i64),
			Kind::Int16 => Ok(decode_i16(&self.data)? as i64),
			Kind::Int32 => Ok(decode_i32(&self.data)? as i64),
			Kind::Int64 | Kind::Int => decode_i64(&self.data),
			Kind::Uint8 => Ok(decode_u8(&self.data)? as i64),
			Kind::Uint16 => Ok(decode_u16(&self.data)? as i64),
			Kind::Uint32 => Ok(decode_u32(&self.data)? as i64),
			Kind::Uint64 | Kind::Uint => i64::try_from(decode_u64(&self.data)?).map_err(|_| {
				Error::Decode {
					what: "int64",
				}
			}),
			_ => Err(Error::Decode {
				what: "integer",
			}),
		}
	}

	/// Decode this value as a 64-bit float. Integer kinds are widened.
	pub fn as_float(&self) -> Result<f64, Error> {
		match self.kind {
			Kind::Float32 => Ok(decode_f32(&self.data)? as f64),
			Kind::Float64 => decode_f64(&self.data),
			_ => Ok(self.as_int()? as f64),
		}
	}

	/// Decode this value as a string
	pub fn as_string(&self) -> Result<String, Error> {
		match self.kind {
			Kind::String => String::from_utf8(self.data.clone()).map_err(|_| Error::Decode {
				what: "string",
			}),
			_ => Err(Error::Decode {
				what: "string",
			}),
		}
	}

	/// Decode this value as a boolean
	pub fn as_bool(&self) -> Result<bool, Error> {
		match self.kind {
			Kind::Bool => decode_bool(&self.data),
			_ => Err(Error::Decode {
				what: "bool",
			}),
		}
	}

	/// Whether this value counts as true in a predicate
	pub fn is_truthy(&self) -> Result<bool, Error> {
		match self.kind {
			Kind::Bool => decode_bool(&self.data),
			Kind::Float32 | Kind::Float64 => Ok(self.as_float()? != 0.0),
			Kind::String | Kind::Bytes => Ok(!self.data.is_empty()),
			Kind::Null => Ok(false),
			_ => Ok(self.as_int()? != 0),
		}
	}

	fn is_integer(&self) -> bool {
		matches!(
			self.kind,
			Kind::Int8
				| Kind::Int16 | Kind::Int32
				| Kind::Int64 | Kind::Int
				| Kind::Uint8 | Kind::Uint16
				| Kind::Uint32 | Kind::Uint64
				| Kind::Uint
		)
	}

	fn as_i128(&self) -> Result<i128, Error> {
		match self.kind {
			Kind::Uint64 | Kind::Uint => Ok(decode_u64(&self.data)? as i128),
			_ => Ok(self.as_int()? as i128),
		}
	}

	pub(crate) fn is_float(&self) -> bool {
		matches!(self.kind, Kind::Float32 | Kind::Float64)
	}

	/// Compare two values. Integers compare numerically across widths and
	/// signedness, floats compare with integers as floats, and strings,
	/// bytes and booleans compare within their own kind. Values of
	/// unrelated kinds are incomparable.
	pub fn compare(&self, other: &Value) -> Option<Ordering> {
		if self.is_float() || other.is_float() {
			if !(self.is_float() || self.is_integer()) {
				return None;
			}
			if !(other.is_float() || other.is_integer()) {
				return None;
			}
			return self.as_float().ok()?.partial_cmp(&other.as_float().ok()?);
		}
		if self.is_integer() && other.is_integer() {
			return Some(self.as_i128().ok()?.cmp(&other.as_i128().ok()?));
		}
		match (self.kind, other.kind) {
			(Kind::String, Kind::String) => Some(self.data.cmp(&other.data)),
			(Kind::Bytes, Kind::Bytes) => Some(self.data.cmp(&other.data)),
			(Kind::Bool, Kind::Bool) => {
				Some(self.as_bool().ok()?.cmp(&other.as_bool().ok()?))
			}
			(Kind::Null, Kind::Null) => Some(Ordering::Equal),
			_ => None,
		}
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Value::new(Kind::Bool, encode_bool(v).to_vec())
	}
}

impl From<i8> for Value {
	fn from(v: i8) -> Self {
		Value::new(Kind::Int8, encode_i8(v).to_vec())
	}
}

impl From<i16> for Value {
	fn from(v: i16) -> Self {
		Value::new(Kind::Int16, encode_i16(v).to_vec())
	}
}

impl From<i32> for Value {
	fn from(v: i32) -> Self {
		Value::new(Kind::Int32, encode_i32(v).to_vec())
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Value::new(Kind::Int, encode_i64(v).to_vec())
	}
}

impl From<u8> for Value {
	fn from(v: u8) -> Self {
		Value::new(Kind::Uint8, encode_u8(v).to_vec())
	}
}

impl From<u16> for Value {
	fn from(v: u16) -> Self {
		Value::new(Kind::Uint16, encode_u16(v).to_vec())
	}
}

impl From<u32> for Value {
	fn from(v: u32) -> Self {
		Value::new(Kind::Uint32, encode_u32(v).to_vec())
	}
}

impl From<u64> for Value {
	fn from(v: u64) -> Self {
		Value::new(Kind::Uint, encode_u64(v).to_vec())
	}
}

impl From<f32> for Value {
	fn from(v: f32) -> Self {
		Value::new(Kind::Float32, encode_f32(v).to_vec())
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Value::new(Kind::Float64, encode_f64(v).to_vec())
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::new(Kind::String, v.as_bytes().to_vec())
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Value::new(Kind::String, v.into_bytes())
	}
}

impl From<Vec<u8>> for Value {
	fn from(v: Vec<u8>) -> Self {
		Value::new(Kind::Bytes, v)
	}
}

impl From<&[u8]> for Value {
	fn from(v: &[u8]) -> Self {
		Value::new(Kind::Bytes, v.to_vec())
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match self.kind {
			Kind::Bool => match decode_bool(&self.data) {
				Ok(true) => f.write_str("true"),
				Ok(false) => f.write_str("false"),
				Err(_) => f.write_str("<invalid>"),
			},
			Kind::Float32 | Kind::Float64 => match self.as_float() {
				Ok(v) => write!(f, "{v}"),
				Err(_) => f.write_str("<invalid>"),
			},
			Kind::Uint64 | Kind::Uint => match decode_u64(&self.data) {
				Ok(v) => write!(f, "{v}"),
				Err(_) => f.write_str("<invalid>"),
			},
			Kind::String => {
				f.write_char('\'')?;
				f.write_str(&String::from_utf8_lossy(&self.data))?;
				f.write_char('\'')
			}
			Kind::Bytes => {
				f.write_str("0x")?;
				for b in &self.data {
					write!(f, "{b:02x}")?;
				}
				Ok(())
			}
			Kind::Null => f.write_str("NULL"),
			_ => match self.as_int() {
				Ok(v) => write!(f, "{v}"),
				Err(_) => f.write_str("<invalid>"),
			},
		}
	}
}

fn array<const N: usize>(data: &[u8], what: &'static str) -> Result<[u8; N], Error> {
	data.try_into().map_err(|_| Error::Decode {
		what,
	})
}

pub fn encode_bool(v: bool) -> [u8; 1] {
	[v as u8]
}

pub fn decode_bool(data: &[u8]) -> Result<bool, Error> {
	match data {
		[0] => Ok(false),
		[1] => Ok(true),
		_ => Err(Error::Decode {
			what: "bool",
		}),
	}
}

// Signed integers are stored big-endian with the sign bit flipped, so
// that bytewise order matches numeric order across the sign boundary.

pub fn encode_i8(v: i8) -> [u8; 1] {
	[(v as u8) ^ 0x80]
}

pub fn decode_i8(data: &[u8]) -> Result<i8, Error> {
	let [b] = array(data, "int8")?;
	Ok((b ^ 0x80) as i8)
}

pub fn encode_i16(v: i16) -> [u8; 2] {
	((v as u16) ^ 0x8000).to_be_bytes()
}

pub fn decode_i16(data: &[u8]) -> Result<i16, Error> {
	Ok((u16::from_be_bytes(array(data, "int16")?) ^ 0x8000) as i16)
}

pub fn encode_i32(v: i32) -> [u8; 4] {
	((v as u32) ^ 0x8000_0000).to_be_bytes()
}

pub fn decode_i32(data: &[u8]) -> Result<i32, Error> {
	Ok((u32::from_be_bytes(array(data, "int32")?) ^ 0x8000_0000) as i32)
}

pub fn encode_i64(v: i64) -> [u8; 8] {
	((v as u64) ^ 0x8000_0000_0000_0000).to_be_bytes()
}

pub fn decode_i64(data: &[u8]) -> Result<i64, Error> {
	Ok((u64::from_be_bytes(array(data, "int64")?) ^ 0x8000_0000_0000_0000) as i64)
}

pub fn encode_u8(v: u8) -> [u8; 1] {
	[v]
}

pub fn decode_u8(data: &[u8]) -> Result<u8, Error> {
	let [b] = array(data, "uint8")?;
	Ok(b)
}

pub fn encode_u16(v: u16) -> [u8; 2] {
	v.to_be_bytes()
}

pub fn decode_u16(data: &[u8]) -> Result<u16, Error> {
	Ok(u16::from_be_bytes(array(data, "uint16")?))
}

pub fn encode_u32(v: u32) -> [u8; 4] {
	v.to_be_bytes()
}

pub fn decode_u32(data: &[u8]) -> Result<u32, Error> {
	Ok(u32::from_be_bytes(array(data, "uint32")?))
}

pub fn encode_u64(v: u64) -> [u8; 8] {
	v.to_be_bytes()
}

pub fn decode_u64(data: &[u8]) -> Result<u64, Error> {
	Ok(u64::from_be_bytes(array(data, "uint64")?))
}

// Floats flip the sign bit when positive and invert every bit when
// negative. Order is preserved for all non-NaN values.

pub fn encode_f32(v: f32) -> [u8; 4] {
	let mut bits = v.to_bits();
	if bits >> 31 == 1 {
		bits = !bits;
	} else {
		bits ^= 1 << 31;
	}
	bits.to_be_bytes()
}

pub fn decode_f32(data: &[u8]) -> Result<f32, Error> {
	let mut bits = u32::from_be_bytes(array(data, "float32")?);
	if bits >> 31 == 1 {
		bits ^= 1 << 31;
	} else {
		bits = !bits;
	}
	Ok(f32::from_bits(bits))
}

pub fn encode_f64(v: f64) -> [u8; 8] {
	let mut bits = v.to_bits();
	if bits >> 63 == 1 {
		bits = !bits;
	} else {
		bits ^= 1 << 63;
	}
	bits.to_be_bytes()
}

pub fn decode_f64(data: &[u8]) -> Result<f64, Error> {
	let mut bits = u64::from_be_bytes(array(data, "float64")?);
	if bits >> 63 == 1 {
		bits ^= 1 << 63;
	} else {
		bits = !bits;
	}
	Ok(f64::from_bits(bits))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn roundtrip() {
		for v in [i8::MIN, -1, 0, 1, i8::MAX] {
			assert_eq!(decode_i8(&encode_i8(v)).unwrap(), v);
		}
		for v in [i16::MIN, -1, 0, 1, i16::MAX] {
			assert_eq!(decode_i16(&encode_i16(v)).unwrap(), v);
		}
		for v in [i32::MIN, -1, 0, 1, i32::MAX] {
			assert_eq!(decode_i32(&encode_i32(v)).unwrap(), v);
		}
		for v in [i64::MIN, -1, 0, 1, i64::MAX] {
			assert_eq!(decode_i64(&encode_i64(v)).unwrap(), v);
		}
		for v in [0u64, 1, u64::MAX] {
			assert_eq!(decode_u64(&encode_u64(v)).unwrap(), v);
		}
		for v in [f64::MIN, -1.5, -0.0, 0.0, 1.5, f64::MAX] {
			assert_eq!(decode_f64(&encode_f64(v)).unwrap(), v);
		}
		for v in [f32::MIN, -1.5, 0.0, 1.5, f32::MAX] {
			assert_eq!(decode_f32(&encode_f32(v)).unwrap(), v);
		}
		assert!(decode_bool(&encode_bool(true)).unwrap());
		assert!(!decode_bool(&encode_bool(false)).unwrap());
	}

	#[test]
	fn decode_rejects_wrong_width() {
		assert!(matches!(decode_i64(&[0; 4]), Err(Error::Decode { .. })));
		assert!(matches!(decode_u16(&[0; 3]), Err(Error::Decode { .. })));
		assert!(matches!(decode_bool(&[2]), Err(Error::Decode { .. })));
	}

	#[test]
	fn signed_encoding_preserves_order() {
		let values = [i64::MIN, -1_000_000, -2, -1, 0, 1, 2, 1_000_000, i64::MAX];
		for w in values.windows(2) {
			assert!(
				encode_i64(w[0]) < encode_i64(w[1]),
				"{} should sort before {}",
				w[0],
				w[1]
			);
		}
	}

	#[test]
	fn unsigned_encoding_preserves_order() {
		let values = [0u64, 1, 2, 255, 256, 1_000_000, u64::MAX];
		for w in values.windows(2) {
			assert!(encode_u64(w[0]) < encode_u64(w[1]));
		}
	}

	#[test]
	fn float_encoding_preserves_order() {
		let values = [f64::NEG_INFINITY, f64::MIN, -1.5, -1.0, -0.5, 0.5, 1.0, 1.5, f64::MAX, f64::INFINITY];
		for w in values.windows(2) {
			assert!(
				encode_f64(w[0]) < encode_f64(w[1]),
				"{} should sort before {}",
				w[0],
				w[1]
			);
		}
	}

	#[test]
	fn zero_values() {
		assert_eq!(Value::zero(Kind::Int).as_int().unwrap(), 0);
		assert_eq!(Value::zero(Kind::Uint8).as_int().unwrap(), 0);
		assert_eq!(Value::zero(Kind::Float64).as_float().unwrap(), 0.0);
		assert_eq!(Value::zero(Kind::String).as_string().unwrap(), "");
		assert!(!Value::zero(Kind::Bool).as_bool().unwrap());
		assert!(Value::zero(Kind::Null).is_null());
	}

	#[test]
	fn comparisons() {
		assert_eq!(Value::from(1i64).compare(&Value::from(2i64)), Some(Ordering::Less));
		assert_eq!(Value::from(2u8).compare(&Value::from(2i64)), Some(Ordering::Equal));
		assert_eq!(Value::from(u64::MAX).compare(&Value::from(-1i64)), Some(Ordering::Greater));
		assert_eq!(Value::from(1.5).compare(&Value::from(1i64)), Some(Ordering::Greater));
		assert_eq!(Value::from("a").compare(&Value::from("b")), Some(Ordering::Less));
		assert_eq!(Value::from("a").compare(&Value::from(1i64)), None);
		assert_eq!(Value::null().compare(&Value::null()), Some(Ordering::Equal));
	}

	#[test]
	fn display() {
		assert_eq!(Value::from(10i64).to_string(), "10");
		assert_eq!(Value::from(-3i32).to_string(), "-3");
		assert_eq!(Value::from(1.5).to_string(), "1.5");
		assert_eq!(Value::from("a").to_string(), "'a'");
		assert_eq!(Value::from(true).to_string(), "true");
		assert_eq!(Value::null().to_string(), "NULL");
		assert_eq!(Value::from(vec![0xabu8, 0x01]).to_string(), "0xab01");
	}
}

//! The self-describing binary encoding for records.
//!
//! An encoded record starts with a header table sorted by field name, so
//! that a single field can be fetched with a binary search and decoded on
//! its own, without touching the rest of the blob. Iteration yields fields
//! in their original insertion order, which each header entry remembers.
//!
//! ```text
//! u32            field count n
//! n x 21 bytes   header entries, sorted ascending by field name:
//!                name_off u32 | name_len u32 | data_off u32 |
//!                data_len u32 | kind u8 | ins u32
//! ...            field names, concatenated in header order
//! ...            field data, concatenated in header order
//! ```
//!
//! All header integers are little-endian; offsets are absolute.

use super::{Field, FieldBuffer, Record};
use crate::err::Error;
use crate::sql::value::{Kind, Value};
use std::cmp::Ordering;

const ENTRY_SIZE: usize = 21;

/// Serialize a record into its binary form.
pub fn encode(record: &dyn Record) -> Result<Vec<u8>, Error> {
	let mut fields: Vec<Field> = Vec::new();
	record.iterate(&mut |f| {
		fields.push(f.clone());
		Ok(())
	})?;
	// Header entries are sorted by name for binary search
	let mut order: Vec<usize> = (0..fields.len()).collect();
	order.sort_by(|&a, &b| fields[a].name.as_bytes().cmp(fields[b].name.as_bytes()));
	let names_len: usize = fields.iter().map(|f| f.name.len()).sum();
	let header_len = 4 + fields.len() * ENTRY_SIZE;
	let data_start = header_len + names_len;
	let total = data_start + fields.iter().map(|f| f.value.data.len()).sum::<usize>();
	let count = u32::try_from(fields.len()).map_err(|_| Error::RecordTooLarge)?;
	u32::try_from(total).map_err(|_| Error::RecordTooLarge)?;
	let mut buf = Vec::with_capacity(total);
	buf.extend_from_slice(&count.to_le_bytes());
	let mut name_off = header_len;
	let mut data_off = data_start;
	for &i in &order {
		let f = &fields[i];
		buf.extend_from_slice(&(name_off as u32).to_le_bytes());
		buf.extend_from_slice(&(f.name.len() as u32).to_le_bytes());
		buf.extend_from_slice(&(data_off as u32).to_le_bytes());
		buf.extend_from_slice(&(f.value.data.len() as u32).to_le_bytes());
		buf.push(f.value.kind as u8);
		buf.extend_from_slice(&(i as u32).to_le_bytes());
		name_off += f.name.len();
		data_off += f.value.data.len();
	}
	for &i in &order {
		buf.extend_from_slice(fields[i].name.as_bytes());
	}
	for &i in &order {
		buf.extend_from_slice(&fields[i].value.data);
	}
	Ok(buf)
}

/// Materialise an encoded record into a mutable [`FieldBuffer`].
pub fn decode(bytes: &[u8]) -> Result<FieldBuffer, Error> {
	let record = EncodedRecord::from_slice(bytes);
	let mut buf = FieldBuffer::new();
	buf.scan(&record)?;
	Ok(buf)
}

struct Entry {
	name_off: usize,
	name_len: usize,
	data_off: usize,
	data_len: usize,
	kind: u8,
	ins: usize,
}

fn read_u32(buf: &[u8], off: usize) -> Result<u32, Error> {
	let b = buf.get(off..off + 4).ok_or(Error::Decode {
		what: "record header",
	})?;
	Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// A record read directly from its encoded form.
///
/// The buffer may be recycled between uses with [`EncodedRecord::set_bytes`];
/// iteration entry points rely on this to avoid re-allocating per record, so
/// callbacks handed an `&EncodedRecord` must clone whatever they retain.
#[derive(Clone, Debug, Default)]
pub struct EncodedRecord {
	buf: Vec<u8>,
}

impl EncodedRecord {
	pub fn new(buf: Vec<u8>) -> EncodedRecord {
		EncodedRecord {
			buf,
		}
	}

	pub fn from_slice(bytes: &[u8]) -> EncodedRecord {
		EncodedRecord::new(bytes.to_vec())
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.buf
	}

	/// Replace the contents, reusing the allocation
	pub(crate) fn set_bytes(&mut self, bytes: &[u8]) {
		self.buf.clear();
		self.buf.extend_from_slice(bytes);
	}

	/// The number of fields in this record
	pub fn num_fields(&self) -> Result<usize, Error> {
		Ok(read_u32(&self.buf, 0)? as usize)
	}

	fn entry(&self, i: usize) -> Result<Entry, Error> {
		let off = 4 + i * ENTRY_SIZE;
		Ok(Entry {
			name_off: read_u32(&self.buf, off)? as usize,
			name_len: read_u32(&self.buf, off + 4)? as usize,
			data_off: read_u32(&self.buf, off + 8)? as usize,
			data_len: read_u32(&self.buf, off + 12)? as usize,
			kind: *self.buf.get(off + 16).ok_or(Error::Decode {
				what: "record header",
			})?,
			ins: read_u32(&self.buf, off + 17)? as usize,
		})
	}

	fn name(&self, entry: &Entry) -> Result<&[u8], Error> {
		self.buf.get(entry.name_off..entry.name_off + entry.name_len).ok_or(Error::Decode {
			what: "record header",
		})
	}

	fn field_at(&self, entry: &Entry) -> Result<Field, Error> {
		let name = std::str::from_utf8(self.name(entry)?).map_err(|_| Error::Decode {
			what: "field name",
		})?;
		let kind = Kind::from_u8(entry.kind).ok_or(Error::Decode {
			what: "field type",
		})?;
		let data = self.buf.get(entry.data_off..entry.data_off + entry.data_len).ok_or(
			Error::Decode {
				what: "record header",
			},
		)?;
		Ok(Field::new(name, Value::new(kind, data.to_vec())))
	}
}

impl Record for EncodedRecord {
	/// Binary search the header and decode only the target field
	fn field(&self, name: &str) -> Result<Field, Error> {
		let n = self.num_fields()?;
		let target = name.as_bytes();
		let (mut lo, mut hi) = (0, n);
		while lo < hi {
			let mid = (lo + hi) / 2;
			let entry = self.entry(mid)?;
			match self.name(&entry)?.cmp(target) {
				Ordering::Less => lo = mid + 1,
				Ordering::Greater => hi = mid,
				Ordering::Equal => return self.field_at(&entry),
			}
		}
		Err(Error::FieldNotFound {
			name: name.to_owned(),
		})
	}

	/// Yield the fields in their original insertion order
	fn iterate(&self, f: &mut dyn FnMut(&Field) -> Result<(), Error>) -> Result<(), Error> {
		let n = self.num_fields()?;
		// Invert the insertion-order permutation stored in the header
		let mut perm = vec![usize::MAX; n];
		for i in 0..n {
			let ins = self.entry(i)?.ins;
			if ins >= n || perm[ins] != usize::MAX {
				return Err(Error::Decode {
					what: "record header",
				});
			}
			perm[ins] = i;
		}
		for &i in &perm {
			let entry = self.entry(i)?;
			f(&self.field_at(&entry)?)?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample() -> FieldBuffer {
		let mut buf = FieldBuffer::new();
		buf.add(Field::new("Name", Value::from("cleo")));
		buf.add(Field::new("Age", Value::from(3i64)));
		buf.add(Field::new("Chipped", Value::from(true)));
		buf
	}

	#[test]
	fn roundtrip_preserves_insertion_order() {
		let rec = EncodedRecord::new(encode(&sample()).unwrap());
		assert_eq!(rec.num_fields().unwrap(), 3);
		let mut fields = Vec::new();
		rec.iterate(&mut |f| {
			fields.push(f.clone());
			Ok(())
		})
		.unwrap();
		assert_eq!(fields[0], Field::new("Name", Value::from("cleo")));
		assert_eq!(fields[1], Field::new("Age", Value::from(3i64)));
		assert_eq!(fields[2], Field::new("Chipped", Value::from(true)));
	}

	#[test]
	fn field_lookup() {
		let rec = EncodedRecord::new(encode(&sample()).unwrap());
		assert_eq!(rec.field("Age").unwrap().value.as_int().unwrap(), 3);
		assert_eq!(rec.field("Name").unwrap().value.as_string().unwrap(), "cleo");
		assert!(rec.field("Chipped").unwrap().value.as_bool().unwrap());
		assert!(matches!(rec.field("Missing"), Err(Error::FieldNotFound { .. })));
	}

	#[test]
	fn field_lookup_with_many_fields() {
		let mut buf = FieldBuffer::new();
		// Insert out of name order to exercise the sorted header
		for i in [7i64, 2, 9, 0, 5, 1, 8, 3, 6, 4] {
			buf.add(Field::new(format!("field{i}"), Value::from(i)));
		}
		let rec = EncodedRecord::new(encode(&buf).unwrap());
		for i in 0..10i64 {
			let field = rec.field(&format!("field{i}")).unwrap();
			assert_eq!(field.value.as_int().unwrap(), i);
		}
	}

	#[test]
	fn decode_materialises_a_buffer() {
		let bytes = encode(&sample()).unwrap();
		let mut buf = decode(&bytes).unwrap();
		assert_eq!(buf.len(), 3);
		buf.delete("Age").unwrap();
		let bytes = encode(&buf).unwrap();
		let rec = EncodedRecord::new(bytes);
		assert!(matches!(rec.field("Age"), Err(Error::FieldNotFound { .. })));
		assert_eq!(rec.field("Name").unwrap().value.as_string().unwrap(), "cleo");
	}

	#[test]
	fn empty_record() {
		let rec = EncodedRecord::new(encode(&FieldBuffer::new()).unwrap());
		assert_eq!(rec.num_fields().unwrap(), 0);
		rec.iterate(&mut |_| panic!("no fields expected")).unwrap();
	}

	#[test]
	fn malformed_blobs_are_rejected() {
		let rec = EncodedRecord::new(vec![]);
		assert!(matches!(rec.num_fields(), Err(Error::Decode { .. })));
		// A count pointing past the end of the buffer
		let rec = EncodedRecord::new(vec![9, 0, 0, 0]);
		assert!(matches!(rec.field("x"), Err(Error::Decode { .. })));
	}

	#[test]
	fn iteration_error_surfaces() {
		let rec = EncodedRecord::new(encode(&sample()).unwrap());
		let res = rec.iterate(&mut |_| Err(Error::Ignore));
		assert!(matches!(res, Err(Error::Ignore)));
	}
}

//! Records: ordered, name-unique collections of typed fields.
//!
//! A table is schemaless, so records are modelled as a capability trait
//! rather than a concrete type: anything which can name its fields and
//! walk them in a stable order can be stored. [`EncodedRecord`] reads
//! fields straight out of an encoded blob, while [`FieldBuffer`] is the
//! mutable in-memory counterpart used for schema changes.

pub mod buffer;
pub mod encoding;

pub use buffer::FieldBuffer;
pub use encoding::EncodedRecord;

use crate::err::Error;
use crate::sql::value::Value;

/// A single named, typed field of a record.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct Field {
	pub name: String,
	pub value: Value,
}

impl Field {
	pub fn new(name: impl Into<String>, value: Value) -> Field {
		Field {
			name: name.into(),
			value,
		}
	}
}

/// The contract any storable document satisfies.
pub trait Record {
	/// Fetch a single field by name
	fn field(&self, name: &str) -> Result<Field, Error>;

	/// Invoke the callback for every field, in stable insertion order,
	/// stopping at the first error which is then surfaced
	fn iterate(&self, f: &mut dyn FnMut(&Field) -> Result<(), Error>) -> Result<(), Error>;

	/// The primary key for this record, if it defines one. Records
	/// without an opinion return `None` and are assigned a generated id
	/// at insert time.
	fn key(&self) -> Result<Option<Vec<u8>>, Error> {
		Ok(None)
	}
}

/// Wraps a record, pinning its primary key to a fixed id.
///
/// Used by `Table::replace` so that the rewritten record keeps the record
/// id it is replacing. The pinned id takes precedence over any key the
/// inner record reports itself.
pub(crate) struct Keyed<'a> {
	pub record: &'a dyn Record,
	pub id: &'a [u8],
}

impl Record for Keyed<'_> {
	fn field(&self, name: &str) -> Result<Field, Error> {
		self.record.field(name)
	}

	fn iterate(&self, f: &mut dyn FnMut(&Field) -> Result<(), Error>) -> Result<(), Error> {
		self.record.iterate(f)
	}

	fn key(&self) -> Result<Option<Vec<u8>>, Error> {
		Ok(Some(self.id.to_vec()))
	}
}

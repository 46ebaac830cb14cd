//! Secondary indexes mapping encoded field values to record ids.
//!
//! Each index owns one engine sub-store holding two disjoint key spaces:
//!
//! - forward entries under `F`, ordered by encoded value, used for range
//!   traversal and uniqueness checks;
//! - reverse entries under `R`, keyed by record id, so that deleting a
//!   record needs no scan.
//!
//! A unique index keys forward entries by the value alone. A non-unique
//! index appends a `0x1F` separator and the record id, so that entries
//! with equal values coexist and sort by record id. In both modes the
//! record id is stored as the entry value, which is what lets a scan
//! split `(value, id)` without parsing the key.

use crate::err::Error;
use crate::kvs::{Key, Store};

const FORWARD: u8 = b'F';
const REVERSE: u8 = b'R';
const SEPARATOR: u8 = 0x1f;

/// Options controlling how an index treats duplicate values.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct IndexOptions {
	pub unique: bool,
}

/// A handle on one secondary index within a transaction.
pub struct Index<'a> {
	store: Box<dyn Store + 'a>,
	field: String,
	unique: bool,
}

impl<'a> Index<'a> {
	pub(crate) fn new(store: Box<dyn Store + 'a>, field: String, unique: bool) -> Index<'a> {
		Index {
			store,
			field,
			unique,
		}
	}

	/// The name of the field this index covers
	pub fn field(&self) -> &str {
		&self.field
	}

	/// Whether this index rejects duplicate values
	pub fn unique(&self) -> bool {
		self.unique
	}

	fn forward_key(&self, value: &[u8], id: &[u8]) -> Key {
		let mut key = Vec::with_capacity(1 + value.len() + 1 + id.len());
		key.push(FORWARD);
		key.extend_from_slice(value);
		if !self.unique {
			key.push(SEPARATOR);
			key.extend_from_slice(id);
		}
		key
	}

	fn reverse_key(id: &[u8]) -> Key {
		let mut key = Vec::with_capacity(1 + id.len());
		key.push(REVERSE);
		key.extend_from_slice(id);
		key
	}

	/// Recover the value bytes from a forward entry
	fn split_value<'k>(&self, key: &'k [u8], id: &[u8]) -> Result<&'k [u8], Error> {
		let key = &key[1..];
		if self.unique {
			return Ok(key);
		}
		let len = key.len().checked_sub(id.len() + 1).ok_or(Error::Decode {
			what: "index key",
		})?;
		Ok(&key[..len])
	}

	/// Associate an encoded field value with a record id.
	/// A unique index rejects a second value with [`Error::Duplicate`].
	pub fn set(&self, value: &[u8], id: &[u8]) -> Result<(), Error> {
		let key = self.forward_key(value, id);
		if self.unique {
			match self.store.get(&key) {
				Ok(_) => return Err(Error::Duplicate),
				Err(Error::KeyNotFound) => (),
				Err(e) => return Err(e),
			}
		}
		self.store.put(&key, id)?;
		self.store.put(&Self::reverse_key(id), value)
	}

	/// Remove every entry referencing a record id. Removing an id which
	/// was never indexed is a no-op, since a record need not carry the
	/// indexed field at all.
	pub fn delete(&self, id: &[u8]) -> Result<(), Error> {
		let rkey = Self::reverse_key(id);
		let value = match self.store.get(&rkey) {
			Ok(v) => v,
			Err(Error::KeyNotFound) => return Ok(()),
			Err(e) => return Err(e),
		};
		match self.store.del(&self.forward_key(&value, id)) {
			Ok(()) | Err(Error::KeyNotFound) => (),
			Err(e) => return Err(e),
		}
		self.store.del(&rkey)
	}

	/// Remove every entry from this index
	pub fn truncate(&self) -> Result<(), Error> {
		self.store.truncate()
	}

	/// Traverse the indexed values ascending from a pivot, invoking the
	/// callback with `(value, record id)`. Returning [`Error::Ignore`]
	/// from the callback stops the traversal without error.
	pub fn ascend_greater_or_equal<F>(&self, pivot: Option<&[u8]>, mut f: F) -> Result<(), Error>
	where
		F: FnMut(&[u8], &[u8]) -> Result<(), Error>,
	{
		let mut start = vec![FORWARD];
		if let Some(p) = pivot {
			start.extend_from_slice(p);
		}
		let res = self.store.ascend_greater_or_equal(Some(&start), &mut |k, v| {
			if k.first() != Some(&FORWARD) {
				// Past the end of the forward entry space
				return Err(Error::Ignore);
			}
			f(self.split_value(k, v)?, v)
		});
		match res {
			Err(Error::Ignore) => Ok(()),
			other => other,
		}
	}

	/// Traverse the indexed values descending from a pivot, invoking the
	/// callback with `(value, record id)`. Returning [`Error::Ignore`]
	/// from the callback stops the traversal without error.
	pub fn descend_less_or_equal<F>(&self, pivot: Option<&[u8]>, mut f: F) -> Result<(), Error>
	where
		F: FnMut(&[u8], &[u8]) -> Result<(), Error>,
	{
		let start = pivot.map(|p| {
			let mut start = vec![FORWARD];
			start.extend_from_slice(p);
			if !self.unique {
				// Cover the whole group of entries sharing the pivot value
				start.push(0xff);
			}
			start
		});
		let res = self.store.descend_less_or_equal(start.as_deref(), &mut |k, v| {
			if k.first() != Some(&FORWARD) {
				// Reverse entries sort after the forward space; skip them
				return Ok(());
			}
			f(self.split_value(k, v)?, v)
		});
		match res {
			Err(Error::Ignore) => Ok(()),
			other => other,
		}
	}
}

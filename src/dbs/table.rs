//! Tables: named collections of records with synchronous index upkeep.
//!
//! A [`Table`] is a small handle borrowing its transaction; fetching the
//! same table twice yields two equally valid handles. Index handles are
//! resolved through the catalog on every operation and never cached,
//! because the catalog itself can change within the transaction.

use super::catalog;
use super::Tx;
use crate::doc::{encoding, EncodedRecord, Field, FieldBuffer, Keyed, Record};
use crate::err::Error;
use crate::idx::{Index, IndexOptions};
use crate::kvs::{Key, Store};
use crate::sql::value::Value;

/// A handle on one table within a transaction.
pub struct Table<'a> {
	tx: &'a Tx,
	name: String,
}

impl<'a> Table<'a> {
	pub(crate) fn new(tx: &'a Tx, name: String) -> Table<'a> {
		Table {
			tx,
			name,
		}
	}

	/// The name of this table
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Fetch the sub-store holding this table's records
	fn store(&self) -> Result<Box<dyn Store + 'a>, Error> {
		self.tx.store(self.name.as_bytes())
	}

	/// Visit every record in the table in record-id order.
	///
	/// The [`EncodedRecord`] buffer is reused across invocations for
	/// allocation economy; callbacks must clone anything they retain.
	/// Returning [`Error::Ignore`] stops the scan without error.
	pub fn iterate<F>(&self, mut f: F) -> Result<(), Error>
	where
		F: FnMut(&[u8], &EncodedRecord) -> Result<(), Error>,
	{
		let mut record = EncodedRecord::default();
		let res = self.store()?.ascend_greater_or_equal(None, &mut |k, v| {
			record.set_bytes(v);
			f(k, &record)
		});
		match res {
			Err(Error::Ignore) => Ok(()),
			other => other,
		}
	}

	/// Fetch a single record by id
	pub fn get_record(&self, id: &[u8]) -> Result<EncodedRecord, Error> {
		match self.store()?.get(id) {
			Ok(v) => Ok(EncodedRecord::new(v)),
			Err(Error::KeyNotFound) => Err(Error::RecordNotFound),
			Err(e) => Err(e),
		}
	}

	/// Insert a record, returning its record id.
	///
	/// The id is the record's own primary key when it reports one, and a
	/// generated time-ordered id otherwise. Fails with
	/// [`Error::Duplicate`] when the id already exists, or when a unique
	/// index rejects one of the record's field values. No compensating
	/// rollback is performed; atomicity belongs to the transaction.
	pub fn insert(&self, record: &dyn Record) -> Result<Key, Error> {
		let data = encoding::encode(record)?;
		let id = match record.key()? {
			Some(id) => id,
			None => self.tx.next_record_id()?,
		};
		let store = self.store()?;
		// Reject an id which already exists in the table
		match store.get(&id) {
			Ok(_) => return Err(Error::Duplicate),
			Err(Error::KeyNotFound) => (),
			Err(e) => return Err(e),
		}
		store.put(&id, &data)?;
		// Keep every configured index in step with the new record
		for index in self.indexes()? {
			match record.field(index.field()) {
				Ok(f) => index.set(&f.value.data, &id)?,
				Err(Error::FieldNotFound {
					..
				}) => continue,
				Err(e) => return Err(e),
			}
		}
		trace!("Inserted record into table '{}'", self.name);
		Ok(id)
	}

	/// Delete a record by id, removing its index entries
	pub fn delete(&self, id: &[u8]) -> Result<(), Error> {
		match self.store()?.del(id) {
			Ok(()) => (),
			Err(Error::KeyNotFound) => return Err(Error::RecordNotFound),
			Err(e) => return Err(e),
		}
		for index in self.indexes()? {
			index.delete(id)?;
		}
		trace!("Deleted record from table '{}'", self.name);
		Ok(())
	}

	/// Replace the record stored under an id.
	///
	/// The supplied id is kept even when the new record reports a
	/// different primary key of its own.
	pub fn replace(&self, id: &[u8], record: &dyn Record) -> Result<(), Error> {
		self.delete(id)?;
		let keyed = Keyed {
			record,
			id,
		};
		self.insert(&keyed)?;
		Ok(())
	}

	/// Remove every record from the table and every entry from its indexes
	pub fn truncate(&self) -> Result<(), Error> {
		self.store()?.truncate()?;
		for index in self.indexes()? {
			index.truncate()?;
		}
		Ok(())
	}

	/// Add a field to every record which does not already have it. An
	/// empty data payload defaults to the zero value of the field kind.
	pub fn add_field(&self, field: &Field) -> Result<(), Error> {
		let value = match field.value.data.is_empty() {
			true => Value::zero(field.value.kind),
			false => field.value.clone(),
		};
		let mut updates = Vec::new();
		self.iterate(|id, record| {
			match record.field(&field.name) {
				// This record already satisfies the new schema
				Ok(_) => return Ok(()),
				Err(Error::FieldNotFound {
					..
				}) => (),
				Err(e) => return Err(e),
			}
			let mut buf = FieldBuffer::new();
			buf.scan(record)?;
			buf.add(Field::new(&field.name, value.clone()));
			updates.push((id.to_vec(), encoding::encode(&buf)?));
			Ok(())
		})?;
		let store = self.store()?;
		for (id, data) in updates {
			store.put(&id, &data)?;
		}
		Ok(())
	}

	/// Remove a field from every record which has it
	pub fn delete_field(&self, name: &str) -> Result<(), Error> {
		let mut updates = Vec::new();
		self.iterate(|id, record| {
			match record.field(name) {
				Ok(_) => (),
				Err(Error::FieldNotFound {
					..
				}) => return Ok(()),
				Err(e) => return Err(e),
			}
			let mut buf = FieldBuffer::new();
			buf.scan(record)?;
			buf.delete(name)?;
			updates.push((id.to_vec(), encoding::encode(&buf)?));
			Ok(())
		})?;
		let store = self.store()?;
		for (id, data) in updates {
			store.put(&id, &data)?;
		}
		Ok(())
	}

	/// Rename a field on every record which has it, keeping its value
	/// and position
	pub fn rename_field(&self, old: &str, new: &str) -> Result<(), Error> {
		let mut updates = Vec::new();
		self.iterate(|id, record| {
			let field = match record.field(old) {
				Ok(f) => f,
				Err(Error::FieldNotFound {
					..
				}) => return Ok(()),
				Err(e) => return Err(e),
			};
			let mut buf = FieldBuffer::new();
			buf.scan(record)?;
			buf.replace(old, Field::new(new, field.value))?;
			updates.push((id.to_vec(), encoding::encode(&buf)?));
			Ok(())
		})?;
		let store = self.store()?;
		for (id, data) in updates {
			store.put(&id, &data)?;
		}
		Ok(())
	}

	/// Create an index on a field. The new index is empty; use
	/// [`Table::reindex`] to build entries for existing records.
	pub fn create_index(&self, field: &str, opts: IndexOptions) -> Result<Index<'a>, Error> {
		let indexes = self.tx.store(catalog::INDEXES_STORE)?;
		let name = catalog::index_store_name(&self.name, field);
		match indexes.get(&name) {
			Ok(_) => {
				return Err(Error::IndexAlreadyExists {
					name: field.to_owned(),
				})
			}
			Err(Error::KeyNotFound) => (),
			Err(e) => return Err(e),
		}
		indexes.put(&name, &catalog::encode_index_options(&self.name, field, opts)?)?;
		self.tx.create_store(&name)?;
		debug!("Created index on field '{field}' of table '{}'", self.name);
		self.index(field)
	}

	/// Fetch a handle on an index of this table
	pub fn index(&self, field: &str) -> Result<Index<'a>, Error> {
		let indexes = self.tx.store(catalog::INDEXES_STORE)?;
		let name = catalog::index_store_name(&self.name, field);
		let opts = match indexes.get(&name) {
			Ok(v) => catalog::decode_index_options(&v)?,
			Err(Error::KeyNotFound) => {
				return Err(Error::IndexNotFound {
					name: field.to_owned(),
				})
			}
			Err(e) => return Err(e),
		};
		let store = self.tx.store(&name)?;
		Ok(Index::new(store, field.to_owned(), opts.unique))
	}

	/// Fetch handles on every index of this table, by listing the index
	/// sub-stores under this table's name prefix
	pub fn indexes(&self) -> Result<Vec<Index<'a>>, Error> {
		let prefix = catalog::index_store_name(&self.name, "");
		let mut out = Vec::new();
		for store_name in self.tx.list_stores(&prefix)? {
			let Some(field) = catalog::index_field_name(&store_name, &self.name) else {
				continue;
			};
			out.push(self.index(&field)?);
		}
		Ok(out)
	}

	/// Drop an index, removing its store and catalog record
	pub fn drop_index(&self, field: &str) -> Result<(), Error> {
		let indexes = self.tx.store(catalog::INDEXES_STORE)?;
		let name = catalog::index_store_name(&self.name, field);
		match indexes.del(&name) {
			Ok(()) => (),
			Err(Error::KeyNotFound) => {
				return Err(Error::IndexNotFound {
					name: field.to_owned(),
				})
			}
			Err(e) => return Err(e),
		}
		self.tx.drop_store(&name)?;
		debug!("Dropped index on field '{field}' of table '{}'", self.name);
		Ok(())
	}

	/// Rebuild an index from scratch by scanning the whole table
	pub fn reindex(&self, field: &str) -> Result<(), Error> {
		let indexes = self.tx.store(catalog::INDEXES_STORE)?;
		let name = catalog::index_store_name(&self.name, field);
		match indexes.get(&name) {
			Ok(_) => (),
			Err(Error::KeyNotFound) => {
				return Err(Error::IndexNotFound {
					name: field.to_owned(),
				})
			}
			Err(e) => return Err(e),
		}
		// Recreate the backing store, keeping the options record
		self.tx.drop_store(&name)?;
		self.tx.create_store(&name)?;
		let index = self.index(field)?;
		let mut entries = Vec::new();
		self.iterate(|id, record| {
			match record.field(field) {
				Ok(f) => entries.push((f.value.data, id.to_vec())),
				Err(Error::FieldNotFound {
					..
				}) => (),
				Err(e) => return Err(e),
			}
			Ok(())
		})?;
		for (value, id) in entries {
			index.set(&value, &id)?;
		}
		debug!("Rebuilt index on field '{field}' of table '{}'", self.name);
		Ok(())
	}
}

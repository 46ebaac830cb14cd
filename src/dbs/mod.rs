//! Databases, transactions and tables.
//!
//! A [`Db`] wraps a storage engine and hands out transactions. A [`Tx`]
//! wraps one engine transaction together with the record-id generator,
//! and resolves table names through the catalog. All mutations performed
//! through a transaction are discarded atomically when it is cancelled.

pub(crate) mod catalog;
pub mod table;

pub use table::Table;

use crate::err::Error;
use crate::kvs::{Datastore, Key, Store, Transaction};
use parking_lot::Mutex;
use ulid::Generator;

/// An embedded database, layered over a storage engine.
pub struct Db {
	ds: Box<dyn Datastore>,
}

impl Db {
	/// Open a database on the given storage engine, creating the
	/// reserved catalog stores when they do not exist yet.
	pub fn new(ds: impl Datastore + 'static) -> Result<Db, Error> {
		let db = Db {
			ds: Box::new(ds),
		};
		let tx = db.begin(true)?;
		for name in [catalog::TABLES_STORE, catalog::INDEXES_STORE] {
			match tx.tx.store(name) {
				Ok(_) => (),
				Err(Error::StoreNotFound {
					..
				}) => tx.tx.create_store(name)?,
				Err(e) => return Err(e),
			}
		}
		tx.commit()?;
		Ok(db)
	}

	/// Start a new transaction
	pub fn begin(&self, write: bool) -> Result<Tx, Error> {
		Ok(Tx {
			tx: self.ds.transaction(write)?,
			ids: Mutex::new(Generator::new()),
		})
	}

	/// Run a closure inside a read-only transaction
	pub fn view<T, F>(&self, f: F) -> Result<T, Error>
	where
		F: FnOnce(&Tx) -> Result<T, Error>,
	{
		let tx = self.begin(false)?;
		match f(&tx) {
			Ok(out) => {
				tx.cancel()?;
				Ok(out)
			}
			Err(e) => {
				let _ = tx.cancel();
				Err(e)
			}
		}
	}

	/// Run a closure inside a write transaction, committing when the
	/// closure succeeds and cancelling when it fails
	pub fn update<T, F>(&self, f: F) -> Result<T, Error>
	where
		F: FnOnce(&Tx) -> Result<T, Error>,
	{
		let tx = self.begin(true)?;
		match f(&tx) {
			Ok(out) => {
				tx.commit()?;
				Ok(out)
			}
			Err(e) => {
				let _ = tx.cancel();
				Err(e)
			}
		}
	}
}

/// A transaction on a [`Db`].
pub struct Tx {
	tx: Box<dyn Transaction>,
	/// Monotonic generator, so ids created in the same millisecond
	/// still sort in generation order
	ids: Mutex<Generator>,
}

impl Tx {
	/// Commit this transaction
	pub fn commit(mut self) -> Result<(), Error> {
		self.tx.commit()
	}

	/// Cancel this transaction, discarding all changes
	pub fn cancel(mut self) -> Result<(), Error> {
		self.tx.cancel()
	}

	/// Create a new table, returning a handle on it
	pub fn create_table(&self, name: &str) -> Result<Table<'_>, Error> {
		let tables = self.tx.store(catalog::TABLES_STORE)?;
		match tables.get(name.as_bytes()) {
			Ok(_) => {
				return Err(Error::TableAlreadyExists {
					name: name.to_owned(),
				})
			}
			Err(Error::KeyNotFound) => (),
			Err(e) => return Err(e),
		}
		tables.put(name.as_bytes(), &catalog::encode_table_record(name)?)?;
		self.tx.create_store(name.as_bytes())?;
		debug!("Created table '{name}'");
		self.table(name)
	}

	/// Fetch a handle on an existing table
	pub fn table(&self, name: &str) -> Result<Table<'_>, Error> {
		let tables = self.tx.store(catalog::TABLES_STORE)?;
		match tables.get(name.as_bytes()) {
			Ok(_) => (),
			Err(Error::KeyNotFound) => {
				return Err(Error::TableNotFound {
					name: name.to_owned(),
				})
			}
			Err(e) => return Err(e),
		}
		Ok(Table::new(self, name.to_owned()))
	}

	/// Remove a table, its records, and all its indexes
	pub fn drop_table(&self, name: &str) -> Result<(), Error> {
		let tables = self.tx.store(catalog::TABLES_STORE)?;
		match tables.del(name.as_bytes()) {
			Ok(()) => (),
			Err(Error::KeyNotFound) => {
				return Err(Error::TableNotFound {
					name: name.to_owned(),
				})
			}
			Err(e) => return Err(e),
		}
		// Remove every index configured for this table
		let indexes = self.tx.store(catalog::INDEXES_STORE)?;
		for store_name in self.tx.list_stores(&catalog::index_store_name(name, ""))? {
			match indexes.del(&store_name) {
				Ok(()) | Err(Error::KeyNotFound) => (),
				Err(e) => return Err(e),
			}
			self.tx.drop_store(&store_name)?;
		}
		self.tx.drop_store(name.as_bytes())?;
		debug!("Dropped table '{name}'");
		Ok(())
	}

	/// Generate a new time-ordered record id
	pub(crate) fn next_record_id(&self) -> Result<Key, Error> {
		let id = self.ids.lock().generate()?;
		Ok(id.to_string().into_bytes())
	}

	pub(crate) fn store(&self, name: &[u8]) -> Result<Box<dyn Store + '_>, Error> {
		self.tx.store(name)
	}

	pub(crate) fn create_store(&self, name: &[u8]) -> Result<(), Error> {
		self.tx.create_store(name)
	}

	pub(crate) fn drop_store(&self, name: &[u8]) -> Result<(), Error> {
		self.tx.drop_store(name)
	}

	pub(crate) fn list_stores(&self, prefix: &[u8]) -> Result<Vec<Key>, Error> {
		self.tx.list_stores(prefix)
	}
}

#[cfg(all(test, feature = "kv-mem"))]
mod tests {
	use super::*;
	use crate::doc::{Field, FieldBuffer, Record};
	use crate::kvs::mem::Datastore;
	use crate::sql::value::Value;

	fn db() -> Db {
		Db::new(Datastore::new()).unwrap()
	}

	#[test_log::test]
	fn table_lifecycle() {
		let db = db();
		let tx = db.begin(true).unwrap();
		assert!(matches!(tx.table("users"), Err(Error::TableNotFound { .. })));
		tx.create_table("users").unwrap();
		assert!(matches!(tx.create_table("users"), Err(Error::TableAlreadyExists { .. })));
		tx.table("users").unwrap();
		tx.drop_table("users").unwrap();
		assert!(matches!(tx.drop_table("users"), Err(Error::TableNotFound { .. })));
		assert!(matches!(tx.table("users"), Err(Error::TableNotFound { .. })));
		tx.commit().unwrap();
	}

	#[test_log::test]
	fn cancelled_transactions_discard_tables() {
		let db = db();
		let tx = db.begin(true).unwrap();
		tx.create_table("users").unwrap();
		tx.cancel().unwrap();
		let tx = db.begin(false).unwrap();
		assert!(matches!(tx.table("users"), Err(Error::TableNotFound { .. })));
		tx.cancel().unwrap();
	}

	#[test_log::test]
	fn view_and_update_helpers() {
		let db = db();
		let id = db
			.update(|tx| {
				let table = tx.create_table("users")?;
				let mut user = FieldBuffer::new();
				user.add(Field::new("Name", Value::from("a")));
				table.insert(&user)
			})
			.unwrap();
		let name = db
			.view(|tx| {
				let table = tx.table("users")?;
				table.get_record(&id)?.field("Name")?.value.as_string()
			})
			.unwrap();
		assert_eq!(name, "a");
		// A failing update is rolled back
		let res: Result<(), Error> = db.update(|tx| {
			let table = tx.table("users")?;
			let mut user = FieldBuffer::new();
			user.add(Field::new("Name", Value::from("b")));
			table.insert(&user)?;
			Err(Error::Ignore)
		});
		assert!(matches!(res, Err(Error::Ignore)));
		let count = db
			.view(|tx| {
				let mut count = 0;
				tx.table("users")?.iterate(|_, _| {
					count += 1;
					Ok(())
				})?;
				Ok(count)
			})
			.unwrap();
		assert_eq!(count, 1);
	}
}

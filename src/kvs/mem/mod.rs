#![cfg(feature = "kv-mem")]

//! The reference in-memory storage engine.
//!
//! A write transaction holds the datastore lock exclusively for its whole
//! lifetime, so there is at most one writer at a time while readers share
//! snapshots. Every transaction works on a copy of the store map and a
//! commit publishes that copy wholesale, which makes cancellation trivial
//! and lets iteration observe the transaction's own earlier writes.

use crate::err::Error;
use crate::kvs::{Key, Val};
use parking_lot::lock_api::{ArcRwLockReadGuard, ArcRwLockWriteGuard};
use parking_lot::{Mutex, RawRwLock, RwLock};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

type Stores = BTreeMap<Key, BTreeMap<Key, Val>>;

enum Guard {
	Read(ArcRwLockReadGuard<RawRwLock, Stores>),
	Write(ArcRwLockWriteGuard<RawRwLock, Stores>),
}

#[non_exhaustive]
pub struct Datastore {
	db: Arc<RwLock<Stores>>,
}

#[non_exhaustive]
pub struct Transaction {
	/// Is the transaction complete?
	done: bool,
	/// Is the transaction writeable?
	write: bool,
	/// The working copy of the datastore contents
	buf: Mutex<Stores>,
	/// The datastore lock held for the transaction lifetime
	guard: Option<Guard>,
}

/// A handle on one named sub-store within a [`Transaction`].
pub struct Store<'a> {
	tx: &'a Transaction,
	name: Key,
}

impl Datastore {
	/// Open a new in-memory datastore
	pub fn new() -> Datastore {
		Datastore {
			db: Arc::new(RwLock::new(BTreeMap::new())),
		}
	}
}

impl Default for Datastore {
	fn default() -> Self {
		Self::new()
	}
}

impl super::Datastore for Datastore {
	/// Start a new transaction
	fn transaction(&self, write: bool) -> Result<Box<dyn super::Transaction>, Error> {
		// Take the datastore lock for the lifetime of the transaction
		let guard = match write {
			true => Guard::Write(self.db.write_arc()),
			false => Guard::Read(self.db.read_arc()),
		};
		// Snapshot the current contents as the working copy
		let buf = match &guard {
			Guard::Read(g) => (**g).clone(),
			Guard::Write(g) => (**g).clone(),
		};
		trace!("Starting a new {} transaction", if write { "writeable" } else { "read only" });
		Ok(Box::new(Transaction {
			done: false,
			write,
			buf: Mutex::new(buf),
			guard: Some(guard),
		}))
	}
}

impl Drop for Transaction {
	fn drop(&mut self) {
		if !self.done && self.write {
			// Check if already panicking
			if std::thread::panicking() {
				return;
			}
			warn!("A transaction was dropped without being committed or cancelled");
		}
	}
}

fn store_not_found(name: &[u8]) -> Error {
	Error::StoreNotFound {
		name: String::from_utf8_lossy(name).into_owned(),
	}
}

impl super::Transaction for Transaction {
	/// Check if closed
	fn closed(&self) -> bool {
		self.done
	}

	/// Cancel a transaction
	fn cancel(&mut self) -> Result<(), Error> {
		// Check to see if transaction is closed
		if self.done {
			return Err(Error::TxFinished);
		}
		// Mark this transaction as done
		self.done = true;
		// Discard the working copy and release the lock
		self.guard.take();
		trace!("Cancelled transaction");
		Ok(())
	}

	/// Commit a transaction
	fn commit(&mut self) -> Result<(), Error> {
		// Check to see if transaction is closed
		if self.done {
			return Err(Error::TxFinished);
		}
		// Check to see if transaction is writable
		if !self.write {
			return Err(Error::TxReadonly);
		}
		// Mark this transaction as done
		self.done = true;
		// Publish the working copy and release the lock
		if let Some(Guard::Write(mut guard)) = self.guard.take() {
			*guard = std::mem::take(&mut *self.buf.lock());
		}
		trace!("Committed transaction");
		Ok(())
	}

	/// Create a new named sub-store
	fn create_store(&self, name: &[u8]) -> Result<(), Error> {
		// Check to see if transaction is closed
		if self.done {
			return Err(Error::TxFinished);
		}
		// Check to see if transaction is writable
		if !self.write {
			return Err(Error::TxReadonly);
		}
		// Create the store
		let mut buf = self.buf.lock();
		if buf.contains_key(name) {
			return Err(Error::StoreAlreadyExists {
				name: String::from_utf8_lossy(name).into_owned(),
			});
		}
		buf.insert(name.to_vec(), BTreeMap::new());
		Ok(())
	}

	/// Fetch a handle on a named sub-store
	fn store(&self, name: &[u8]) -> Result<Box<dyn super::Store + '_>, Error> {
		// Check to see if transaction is closed
		if self.done {
			return Err(Error::TxFinished);
		}
		// Check the store exists
		if !self.buf.lock().contains_key(name) {
			return Err(store_not_found(name));
		}
		Ok(Box::new(Store {
			tx: self,
			name: name.to_vec(),
		}))
	}

	/// Remove a named sub-store and all its entries
	fn drop_store(&self, name: &[u8]) -> Result<(), Error> {
		// Check to see if transaction is closed
		if self.done {
			return Err(Error::TxFinished);
		}
		// Check to see if transaction is writable
		if !self.write {
			return Err(Error::TxReadonly);
		}
		// Remove the store
		match self.buf.lock().remove(name) {
			Some(_) => Ok(()),
			None => Err(store_not_found(name)),
		}
	}

	/// List the names of all sub-stores starting with a prefix
	fn list_stores(&self, prefix: &[u8]) -> Result<Vec<Key>, Error> {
		// Check to see if transaction is closed
		if self.done {
			return Err(Error::TxFinished);
		}
		// Collect the matching store names in order
		let buf = self.buf.lock();
		Ok(buf.keys().filter(|k| k.starts_with(prefix)).cloned().collect())
	}
}

impl super::Store for Store<'_> {
	/// Fetch a key from the store
	fn get(&self, key: &[u8]) -> Result<Val, Error> {
		// Check to see if transaction is closed
		if self.tx.done {
			return Err(Error::TxFinished);
		}
		// Get the key
		let buf = self.tx.buf.lock();
		let store = buf.get(&self.name).ok_or_else(|| store_not_found(&self.name))?;
		store.get(key).cloned().ok_or(Error::KeyNotFound)
	}

	/// Insert or update a key in the store
	fn put(&self, key: &[u8], val: &[u8]) -> Result<(), Error> {
		// Check to see if transaction is closed
		if self.tx.done {
			return Err(Error::TxFinished);
		}
		// Check to see if transaction is writable
		if !self.tx.write {
			return Err(Error::TxReadonly);
		}
		// Set the key
		let mut buf = self.tx.buf.lock();
		let store = buf.get_mut(&self.name).ok_or_else(|| store_not_found(&self.name))?;
		store.insert(key.to_vec(), val.to_vec());
		Ok(())
	}

	/// Delete a key from the store
	fn del(&self, key: &[u8]) -> Result<(), Error> {
		// Check to see if transaction is closed
		if self.tx.done {
			return Err(Error::TxFinished);
		}
		// Check to see if transaction is writable
		if !self.tx.write {
			return Err(Error::TxReadonly);
		}
		// Remove the key
		let mut buf = self.tx.buf.lock();
		let store = buf.get_mut(&self.name).ok_or_else(|| store_not_found(&self.name))?;
		store.remove(key).map(|_| ()).ok_or(Error::KeyNotFound)
	}

	/// Remove all entries from the store
	fn truncate(&self) -> Result<(), Error> {
		// Check to see if transaction is closed
		if self.tx.done {
			return Err(Error::TxFinished);
		}
		// Check to see if transaction is writable
		if !self.tx.write {
			return Err(Error::TxReadonly);
		}
		// Clear the store
		let mut buf = self.tx.buf.lock();
		let store = buf.get_mut(&self.name).ok_or_else(|| store_not_found(&self.name))?;
		store.clear();
		Ok(())
	}

	/// Iterate ascending over the entries from a pivot
	fn ascend_greater_or_equal(
		&self,
		pivot: Option<&[u8]>,
		f: &mut dyn FnMut(&[u8], &[u8]) -> Result<(), Error>,
	) -> Result<(), Error> {
		// Check to see if transaction is closed
		if self.tx.done {
			return Err(Error::TxFinished);
		}
		// Materialise the matching entries so that the callback is free
		// to write back into this store without re-entering the lock
		let entries: Vec<(Key, Val)> = {
			let buf = self.tx.buf.lock();
			let store = buf.get(&self.name).ok_or_else(|| store_not_found(&self.name))?;
			match pivot {
				Some(p) => store
					.range::<[u8], _>((Bound::Included(p), Bound::Unbounded))
					.map(|(k, v)| (k.clone(), v.clone()))
					.collect(),
				None => store.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
			}
		};
		for (k, v) in &entries {
			f(k, v)?;
		}
		Ok(())
	}

	/// Iterate descending over the entries from a pivot
	fn descend_less_or_equal(
		&self,
		pivot: Option<&[u8]>,
		f: &mut dyn FnMut(&[u8], &[u8]) -> Result<(), Error>,
	) -> Result<(), Error> {
		// Check to see if transaction is closed
		if self.tx.done {
			return Err(Error::TxFinished);
		}
		let entries: Vec<(Key, Val)> = {
			let buf = self.tx.buf.lock();
			let store = buf.get(&self.name).ok_or_else(|| store_not_found(&self.name))?;
			match pivot {
				Some(p) => store
					.range::<[u8], _>((Bound::Unbounded, Bound::Included(p)))
					.rev()
					.map(|(k, v)| (k.clone(), v.clone()))
					.collect(),
				None => store.iter().rev().map(|(k, v)| (k.clone(), v.clone())).collect(),
			}
		};
		for (k, v) in &entries {
			f(k, v)?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::Datastore;
	use crate::err::Error;
	use crate::kvs::Datastore as _;

	#[test]
	fn store_crud() {
		let ds = Datastore::new();
		let mut tx = ds.transaction(true).unwrap();
		tx.create_store(b"test").unwrap();
		let store = tx.store(b"test").unwrap();
		store.put(b"foo", b"bar").unwrap();
		assert_eq!(store.get(b"foo").unwrap(), b"bar");
		store.put(b"foo", b"baz").unwrap();
		assert_eq!(store.get(b"foo").unwrap(), b"baz");
		store.del(b"foo").unwrap();
		assert!(matches!(store.get(b"foo"), Err(Error::KeyNotFound)));
		assert!(matches!(store.del(b"foo"), Err(Error::KeyNotFound)));
		drop(store);
		tx.cancel().unwrap();
	}

	#[test]
	fn store_lifecycle() {
		let ds = Datastore::new();
		let mut tx = ds.transaction(true).unwrap();
		assert!(matches!(tx.store(b"test"), Err(Error::StoreNotFound { .. })));
		tx.create_store(b"test").unwrap();
		assert!(matches!(tx.create_store(b"test"), Err(Error::StoreAlreadyExists { .. })));
		tx.create_store(b"test2").unwrap();
		tx.create_store(b"other").unwrap();
		let names = tx.list_stores(b"test").unwrap();
		assert_eq!(names, vec![b"test".to_vec(), b"test2".to_vec()]);
		tx.drop_store(b"test2").unwrap();
		assert!(matches!(tx.drop_store(b"test2"), Err(Error::StoreNotFound { .. })));
		assert_eq!(tx.list_stores(b"test").unwrap(), vec![b"test".to_vec()]);
		tx.cancel().unwrap();
	}

	#[test]
	fn commit_publishes_and_cancel_discards() {
		let ds = Datastore::new();
		// Committed changes are visible to later transactions
		let mut tx = ds.transaction(true).unwrap();
		tx.create_store(b"test").unwrap();
		tx.store(b"test").unwrap().put(b"foo", b"bar").unwrap();
		tx.commit().unwrap();
		// Cancelled changes are not
		let mut tx = ds.transaction(true).unwrap();
		tx.store(b"test").unwrap().put(b"foo", b"baz").unwrap();
		tx.store(b"test").unwrap().put(b"fuz", b"buz").unwrap();
		tx.cancel().unwrap();
		// Verify through a read transaction
		let mut tx = ds.transaction(false).unwrap();
		let store = tx.store(b"test").unwrap();
		assert_eq!(store.get(b"foo").unwrap(), b"bar");
		assert!(matches!(store.get(b"fuz"), Err(Error::KeyNotFound)));
		drop(store);
		tx.cancel().unwrap();
	}

	#[test]
	fn readonly_transactions_reject_writes() {
		let ds = Datastore::new();
		let mut tx = ds.transaction(true).unwrap();
		tx.create_store(b"test").unwrap();
		tx.commit().unwrap();
		let mut tx = ds.transaction(false).unwrap();
		assert!(matches!(tx.create_store(b"other"), Err(Error::TxReadonly)));
		let store = tx.store(b"test").unwrap();
		assert!(matches!(store.put(b"foo", b"bar"), Err(Error::TxReadonly)));
		assert!(matches!(store.truncate(), Err(Error::TxReadonly)));
		drop(store);
		assert!(matches!(tx.commit(), Err(Error::TxReadonly)));
		tx.cancel().unwrap();
	}

	#[test]
	fn finished_transactions_reject_everything() {
		let ds = Datastore::new();
		let mut tx = ds.transaction(true).unwrap();
		tx.create_store(b"test").unwrap();
		tx.commit().unwrap();
		assert!(tx.closed());
		assert!(matches!(tx.store(b"test"), Err(Error::TxFinished)));
		assert!(matches!(tx.commit(), Err(Error::TxFinished)));
		assert!(matches!(tx.cancel(), Err(Error::TxFinished)));
	}

	#[test]
	fn scans_are_ordered() {
		let ds = Datastore::new();
		let mut tx = ds.transaction(true).unwrap();
		tx.create_store(b"test").unwrap();
		let store = tx.store(b"test").unwrap();
		for key in [&b"c"[..], b"a", b"d", b"b"] {
			store.put(key, b"").unwrap();
		}
		// Ascending from a pivot
		let mut keys = Vec::new();
		store
			.ascend_greater_or_equal(Some(b"b"), &mut |k, _| {
				keys.push(k.to_vec());
				Ok(())
			})
			.unwrap();
		assert_eq!(keys, vec![b"b".to_vec(), b"c".to_vec(), b"d".to_vec()]);
		// Descending from a pivot
		let mut keys = Vec::new();
		store
			.descend_less_or_equal(Some(b"c"), &mut |k, _| {
				keys.push(k.to_vec());
				Ok(())
			})
			.unwrap();
		assert_eq!(keys, vec![b"c".to_vec(), b"b".to_vec(), b"a".to_vec()]);
		// Callback errors stop iteration and surface
		let mut count = 0;
		let res = store.ascend_greater_or_equal(None, &mut |_, _| {
			count += 1;
			Err(Error::Ignore)
		});
		assert!(matches!(res, Err(Error::Ignore)));
		assert_eq!(count, 1);
		drop(store);
		tx.cancel().unwrap();
	}

	#[test]
	fn scans_observe_earlier_writes() {
		let ds = Datastore::new();
		let mut tx = ds.transaction(true).unwrap();
		tx.create_store(b"test").unwrap();
		let store = tx.store(b"test").unwrap();
		store.put(b"a", b"1").unwrap();
		store.put(b"b", b"2").unwrap();
		// A callback may write back into the same store
		store
			.ascend_greater_or_equal(None, &mut |k, _| {
				let mut key = k.to_vec();
				key.push(b'!');
				store.put(&key, b"3")
			})
			.unwrap();
		assert_eq!(store.get(b"a!").unwrap(), b"3");
		assert_eq!(store.get(b"b!").unwrap(), b"3");
		drop(store);
		tx.cancel().unwrap();
	}
}

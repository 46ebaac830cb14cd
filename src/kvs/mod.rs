//! The contract between the database layers and the underlying ordered
//! key-value storage engine.
//!
//! An engine exposes named sub-stores ordered by bytewise key comparison,
//! grouped under single-writer / multi-reader transactions. Iteration
//! within a transaction reflects writes made earlier in that same
//! transaction. The database layers consume nothing else from an engine,
//! so any store satisfying these traits can be plugged in.

pub mod mem;

use crate::err::Error;

/// The key part of a key-value pair. An alias for byte vectors.
pub type Key = Vec<u8>;

/// The value part of a key-value pair. An alias for byte vectors.
pub type Val = Vec<u8>;

/// An ordered key-value storage engine.
pub trait Datastore {
	/// Start a new transaction on this datastore
	fn transaction(&self, write: bool) -> Result<Box<dyn Transaction>, Error>;
}

/// A set of ordered writes and reads against a [`Datastore`].
///
/// A transaction owns the sub-stores it hands out; all mutations are
/// discarded atomically when the transaction is cancelled.
pub trait Transaction {
	/// Check if this transaction is finished
	fn closed(&self) -> bool;
	/// Cancel this transaction, discarding all changes
	fn cancel(&mut self) -> Result<(), Error>;
	/// Commit this transaction, persisting all changes
	fn commit(&mut self) -> Result<(), Error>;
	/// Create a new named sub-store
	fn create_store(&self, name: &[u8]) -> Result<(), Error>;
	/// Fetch a handle on a named sub-store
	fn store(&self, name: &[u8]) -> Result<Box<dyn Store + '_>, Error>;
	/// Remove a named sub-store and all its entries
	fn drop_store(&self, name: &[u8]) -> Result<(), Error>;
	/// List the names of all sub-stores starting with a prefix
	fn list_stores(&self, prefix: &[u8]) -> Result<Vec<Key>, Error>;
}

/// A named, ordered key-value namespace within a [`Transaction`].
pub trait Store {
	/// Fetch a key from the store
	fn get(&self, key: &[u8]) -> Result<Val, Error>;
	/// Insert or update a key in the store
	fn put(&self, key: &[u8], val: &[u8]) -> Result<(), Error>;
	/// Delete a key from the store
	fn del(&self, key: &[u8]) -> Result<(), Error>;
	/// Remove all entries from the store
	fn truncate(&self) -> Result<(), Error>;
	/// Iterate over the entries with keys greater than or equal to the
	/// pivot, in ascending key order. A pivot of `None` starts at the
	/// first entry. Iteration stops when the callback returns an error,
	/// and that error is surfaced.
	fn ascend_greater_or_equal(
		&self,
		pivot: Option<&[u8]>,
		f: &mut dyn FnMut(&[u8], &[u8]) -> Result<(), Error>,
	) -> Result<(), Error>;
	/// Iterate over the entries with keys less than or equal to the
	/// pivot, in descending key order. A pivot of `None` starts at the
	/// last entry.
	fn descend_less_or_equal(
		&self,
		pivot: Option<&[u8]>,
		f: &mut dyn FnMut(&[u8], &[u8]) -> Result<(), Error>,
	) -> Result<(), Error>;
}

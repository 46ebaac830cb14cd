use crate::syn::error::ParseError;
use thiserror::Error;

/// The error type for every operation in this crate.
///
/// Errors raised by the underlying key-value engine are translated at the
/// layer boundary where possible: a [`Error::KeyNotFound`] from a store
/// lookup becomes [`Error::RecordNotFound`], [`Error::TableNotFound`] or
/// [`Error::IndexNotFound`] depending on what was being looked up.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
	/// There was a problem with the underlying datastore
	#[error("There was a problem with the underlying datastore: {0}")]
	Ds(String),

	/// There was a problem with a datastore transaction
	#[error("There was a problem with a transaction: {0}")]
	Tx(String),

	/// The transaction was already committed or cancelled
	#[error("Couldn't update a finished transaction")]
	TxFinished,

	/// The transaction was created as read-only
	#[error("Couldn't write to a read only transaction")]
	TxReadonly,

	/// The key being looked up in a store does not exist
	#[error("The key does not exist")]
	KeyNotFound,

	/// The store being looked up does not exist
	#[error("The store '{name}' does not exist")]
	StoreNotFound {
		name: String,
	},

	/// The store being created already exists
	#[error("The store '{name}' already exists")]
	StoreAlreadyExists {
		name: String,
	},

	/// The table being looked up does not exist
	#[error("The table '{name}' does not exist")]
	TableNotFound {
		name: String,
	},

	/// The table being created already exists
	#[error("The table '{name}' already exists")]
	TableAlreadyExists {
		name: String,
	},

	/// The record being looked up does not exist
	#[error("The record does not exist")]
	RecordNotFound,

	/// An insert collided with an existing record id or unique index entry
	#[error("The record already exists")]
	Duplicate,

	/// The index being looked up does not exist
	#[error("The index on field '{name}' does not exist")]
	IndexNotFound {
		name: String,
	},

	/// The index being created already exists
	#[error("The index on field '{name}' already exists")]
	IndexAlreadyExists {
		name: String,
	},

	/// The record has no field of that name
	#[error("The field '{name}' does not exist")]
	FieldNotFound {
		name: String,
	},

	/// The bytes do not parse as the claimed type
	#[error("Failed to decode a {what}")]
	Decode {
		what: &'static str,
	},

	/// The record payload does not fit the encodable size
	#[error("The record data is too large to encode")]
	RecordTooLarge,

	/// A new record id could not be generated
	#[error("Failed to generate a record id: {0}")]
	RecordId(#[from] ulid::MonotonicError),

	/// The query text was rejected by the parser
	#[error("Failed to parse query: {0}")]
	InvalidQuery(#[from] ParseError),

	/// The LIMIT clause did not evaluate to a non-negative integer
	#[error("Found {value} but the LIMIT clause must evaluate to a non-negative integer")]
	InvalidLimit {
		value: String,
	},

	/// The OFFSET clause did not evaluate to a non-negative integer
	#[error("Found {value} but the OFFSET clause must evaluate to a non-negative integer")]
	InvalidOffset {
		value: String,
	},

	/// Sentinel returned by iteration callbacks to stop a scan early.
	/// Swallowed by the iteration entry points, never surfaced to callers.
	#[error("Iteration was stopped")]
	Ignore,
}

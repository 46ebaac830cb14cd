//! Reserved catalog stores and their record formats.
//!
//! Two stores track the schema: one record per user table, and one
//! record per index keyed by the index's own store name. The reserved
//! prefix contains characters the SQL identifier grammar cannot produce,
//! so user tables can never collide with it.

use crate::doc::{encoding, Field, FieldBuffer, EncodedRecord, Record};
use crate::err::Error;
use crate::idx::IndexOptions;
use crate::kvs::Key;
use crate::sql::value::Value;

/// The store holding one record per user table
pub(crate) const TABLES_STORE: &[u8] = b"__quartz.tables";

/// The store holding one options record per index
pub(crate) const INDEXES_STORE: &[u8] = b"__quartz.indexes";

/// The prefix shared by every index sub-store
const INDEX_STORE_PREFIX: &[u8] = b"__quartz_idx__";

/// Separates the table name from the field name in an index store name
const INDEX_NAME_SEPARATOR: u8 = 0x1e;

/// Build the name of the sub-store backing an index. The same name keys
/// the options record in the indexes catalog store.
pub(crate) fn index_store_name(table: &str, field: &str) -> Key {
	let mut name = Vec::with_capacity(INDEX_STORE_PREFIX.len() + table.len() + 1 + field.len());
	name.extend_from_slice(INDEX_STORE_PREFIX);
	name.extend_from_slice(table.as_bytes());
	name.push(INDEX_NAME_SEPARATOR);
	name.extend_from_slice(field.as_bytes());
	name
}

/// Recover the field name from an index store name
pub(crate) fn index_field_name(store_name: &[u8], table: &str) -> Option<String> {
	let prefix = index_store_name(table, "");
	let field = store_name.strip_prefix(prefix.as_slice())?;
	String::from_utf8(field.to_vec()).ok()
}

/// Encode the record stored per user table
pub(crate) fn encode_table_record(table: &str) -> Result<Vec<u8>, Error> {
	let mut buf = FieldBuffer::new();
	buf.add(Field::new("TableName", Value::from(table)));
	encoding::encode(&buf)
}

/// Encode the options record stored per index
pub(crate) fn encode_index_options(
	table: &str,
	field: &str,
	opts: IndexOptions,
) -> Result<Vec<u8>, Error> {
	let mut buf = FieldBuffer::new();
	buf.add(Field::new("TableName", Value::from(table)));
	buf.add(Field::new("FieldName", Value::from(field)));
	buf.add(Field::new("Unique", Value::from(opts.unique)));
	encoding::encode(&buf)
}

/// Decode an index options record
pub(crate) fn decode_index_options(data: &[u8]) -> Result<IndexOptions, Error> {
	let record = EncodedRecord::from_slice(data);
	Ok(IndexOptions {
		unique: record.field("Unique")?.value.as_bool()?,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn index_store_names_split_cleanly() {
		let name = index_store_name("users", "Email");
		assert_eq!(index_field_name(&name, "users"), Some("Email".to_owned()));
		// A table whose name extends another must not match its prefix
		assert_eq!(index_field_name(&name, "user"), None);
	}

	#[test]
	fn index_options_roundtrip() {
		let data = encode_index_options(
			"users",
			"Email",
			IndexOptions {
				unique: true,
			},
		)
		.unwrap();
		assert!(decode_index_options(&data).unwrap().unique);
		// The options record carries the table and field names as well
		let record = EncodedRecord::from_slice(&data);
		assert_eq!(record.field("TableName").unwrap().value.as_string().unwrap(), "users");
		assert_eq!(record.field("FieldName").unwrap().value.as_string().unwrap(), "Email");
	}
}

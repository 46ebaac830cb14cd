//! An embeddable, document-oriented database core with SQL-like queries,
//! layered over a pluggable ordered key-value storage engine.
//!
//! Records are heterogeneous collections of named, typed fields stored in
//! named tables. Tables maintain secondary indexes synchronously during
//! mutations, and all access happens inside a single-writer / multi-reader
//! transaction inherited from the underlying engine.
//!
//! The crate is organised in layers, leaves first:
//!
//! - [`sql::value`]: typed scalar values with order-preserving binary
//!   encodings, so that index range scans yield values in natural order.
//! - [`doc`]: the record contract, the self-describing binary record
//!   encoding with per-field random access, and the mutable [`doc::FieldBuffer`].
//! - [`kvs`]: the ordered key-value engine contract, with a reference
//!   in-memory engine behind the `kv-mem` feature.
//! - [`idx`]: unique and non-unique secondary indexes over the engine.
//! - [`dbs`]: databases, transactions, tables and the schema catalog.
//! - [`syn`] and [`sql`]: the SELECT tokenizer / parser and the query AST
//!   it produces.
//!
//! ```
//! use quartzdb::dbs::Db;
//! use quartzdb::doc::{Field, FieldBuffer, Record};
//! use quartzdb::kvs::mem::Datastore;
//! use quartzdb::sql::Value;
//!
//! # fn main() -> Result<(), quartzdb::Error> {
//! let db = Db::new(Datastore::new())?;
//! let tx = db.begin(true)?;
//! let table = tx.create_table("users")?;
//! let mut user = FieldBuffer::new();
//! user.add(Field::new("Name", Value::from("tobie")));
//! let id = table.insert(&user)?;
//! assert_eq!(table.get_record(&id)?.field("Name")?.value, Value::from("tobie"));
//! tx.commit()?;
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate tracing;

pub mod dbs;
pub mod doc;
pub mod err;
pub mod idx;
pub mod kvs;
pub mod sql;
pub mod syn;

pub use err::Error;

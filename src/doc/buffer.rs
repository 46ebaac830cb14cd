//! The mutable, in-memory counterpart of an encoded record.

use super::{Field, Record};
use crate::err::Error;

/// An ordered list of fields which can be mutated and re-encoded.
///
/// Used to build records by hand, and by the schema mutation operations
/// which decode each stored record into a buffer, rewrite it, and encode
/// it back.
#[derive(Clone, Debug, Default)]
pub struct FieldBuffer {
	fields: Vec<Field>,
}

impl FieldBuffer {
	pub fn new() -> FieldBuffer {
		FieldBuffer::default()
	}

	/// Append a field
	pub fn add(&mut self, field: Field) {
		self.fields.push(field);
	}

	/// Remove the field with the given name
	pub fn delete(&mut self, name: &str) -> Result<(), Error> {
		match self.fields.iter().position(|f| f.name == name) {
			Some(i) => {
				self.fields.remove(i);
				Ok(())
			}
			None => Err(Error::FieldNotFound {
				name: name.to_owned(),
			}),
		}
	}

	/// Replace the field with the given name, keeping its position
	pub fn replace(&mut self, name: &str, field: Field) -> Result<(), Error> {
		match self.fields.iter().position(|f| f.name == name) {
			Some(i) => {
				self.fields[i] = field;
				Ok(())
			}
			None => Err(Error::FieldNotFound {
				name: name.to_owned(),
			}),
		}
	}

	/// Append every field of the given record
	pub fn scan(&mut self, record: &dyn Record) -> Result<(), Error> {
		record.iterate(&mut |f| {
			self.fields.push(f.clone());
			Ok(())
		})
	}

	pub fn fields(&self) -> &[Field] {
		&self.fields
	}

	pub fn len(&self) -> usize {
		self.fields.len()
	}

	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}
}

impl Record for FieldBuffer {
	fn field(&self, name: &str) -> Result<Field, Error> {
		self.fields.iter().find(|f| f.name == name).cloned().ok_or_else(|| {
			Error::FieldNotFound {
				name: name.to_owned(),
			}
		})
	}

	fn iterate(&self, f: &mut dyn FnMut(&Field) -> Result<(), Error>) -> Result<(), Error> {
		for field in &self.fields {
			f(field)?;
		}
		Ok(())
	}
}

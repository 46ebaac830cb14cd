use crate::err::Error;
use crate::sql::expression::Expr;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The LIMIT clause of a statement.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub struct Limit(pub Expr);

impl Limit {
	/// Evaluate the clause into a row count
	pub fn process(&self) -> Result<usize, Error> {
		let value = self.0.eval(None)?;
		match value.as_int() {
			// This is a valid limiting number
			Ok(v) if v >= 0 => Ok(v as usize),
			// An invalid value was specified
			_ => Err(Error::InvalidLimit {
				value: value.to_string(),
			}),
		}
	}
}

impl fmt::Display for Limit {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "LIMIT {}", self.0)
	}
}

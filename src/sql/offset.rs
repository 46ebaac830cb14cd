use crate::err::Error;
use crate::sql::expression::Expr;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The OFFSET clause of a statement.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub struct Offset(pub Expr);

impl Offset {
	/// Evaluate the clause into a row count to skip
	pub fn process(&self) -> Result<usize, Error> {
		let value = self.0.eval(None)?;
		match value.as_int() {
			Ok(v) if v >= 0 => Ok(v as usize),
			_ => Err(Error::InvalidOffset {
				value: value.to_string(),
			}),
		}
	}
}

impl fmt::Display for Offset {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "OFFSET {}", self.0)
	}
}

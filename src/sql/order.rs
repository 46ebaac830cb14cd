use crate::sql::expression::FieldSelector;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// The sort direction of an ORDER BY clause. An unspecified direction
/// sorts ascending.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub enum Direction {
	#[default]
	Default,
	Asc,
	Desc,
}

impl Direction {
	pub fn is_descending(&self) -> bool {
		matches!(self, Direction::Desc)
	}
}

/// The ORDER BY clause of a statement.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub struct Order {
	pub selector: FieldSelector,
	pub direction: Direction,
}

impl Deref for Order {
	type Target = FieldSelector;
	fn deref(&self) -> &Self::Target {
		&self.selector
	}
}

impl fmt::Display for Order {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "ORDER BY {}", self.selector)?;
		match self.direction {
			Direction::Default => Ok(()),
			Direction::Asc => f.write_str(" ASC"),
			Direction::Desc => f.write_str(" DESC"),
		}
	}
}

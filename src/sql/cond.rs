use crate::sql::expression::Expr;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// The WHERE predicate of a statement.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub struct Cond(pub Expr);

impl Deref for Cond {
	type Target = Expr;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl fmt::Display for Cond {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "WHERE {}", self.0)
	}
}

use crate::sql::cond::Cond;
use crate::sql::field::Fields;
use crate::sql::ident::Ident;
use crate::sql::limit::Limit;
use crate::sql::offset::Offset;
use crate::sql::order::Order;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A parsed SELECT statement.
///
/// A statement without a FROM clause selects pure expressions: `what` is
/// `None` and the executor evaluates the projection once with no record.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub struct SelectStatement {
	pub expr: Fields,
	pub what: Option<Ident>,
	pub cond: Option<Cond>,
	pub order: Option<Order>,
	pub limit: Option<Limit>,
	pub offset: Option<Offset>,
}

impl fmt::Display for SelectStatement {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "SELECT {}", self.expr)?;
		if let Some(ref what) = self.what {
			write!(f, " FROM {what}")?;
		}
		if let Some(ref cond) = self.cond {
			write!(f, " {cond}")?;
		}
		if let Some(ref order) = self.order {
			write!(f, " {order}")?;
		}
		if let Some(ref limit) = self.limit {
			write!(f, " {limit}")?;
		}
		if let Some(ref offset) = self.offset {
			write!(f, " {offset}")?;
		}
		Ok(())
	}
}

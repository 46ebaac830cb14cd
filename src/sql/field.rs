use crate::sql::expression::Expr;
use crate::sql::ident::Ident;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter, Write};
use std::ops::Deref;

/// The projection list of a SELECT statement.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub struct Fields(pub Vec<Field>);

impl Fields {
	pub fn all() -> Self {
		Self(vec![Field::All])
	}

	/// Check to see if this is a `*` projection
	pub fn is_all(&self) -> bool {
		self.0.iter().any(|v| matches!(v, Field::All))
	}
}

impl Deref for Fields {
	type Target = Vec<Field>;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl IntoIterator for Fields {
	type Item = Field;
	type IntoIter = std::vec::IntoIter<Self::Item>;
	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

impl Display for Fields {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		for (i, field) in self.0.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			Display::fmt(field, f)?;
		}
		Ok(())
	}
}

/// One selected output field.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub enum Field {
	/// The `*` in `SELECT * FROM ...`
	#[default]
	All,
	/// The 'rating' in `SELECT rating FROM ...`
	Single {
		expr: Expr,
		/// The `quality` in `SELECT rating AS quality FROM ...`
		alias: Option<Ident>,
	},
}

impl Field {
	/// The column name this field produces: the alias when one is given,
	/// and the textual form of the expression otherwise
	pub fn name(&self) -> Option<String> {
		match self {
			Field::All => None,
			Field::Single {
				expr,
				alias,
			} => match alias {
				Some(alias) => Some(alias.to_raw()),
				None => Some(expr.to_string()),
			},
		}
	}
}

impl Display for Field {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match self {
			Self::All => f.write_char('*'),
			Self::Single {
				expr,
				alias,
			} => {
				Display::fmt(expr, f)?;
				if let Some(alias) = alias {
					f.write_str(" AS ")?;
					Display::fmt(alias, f)
				} else {
					Ok(())
				}
			}
		}
	}
}

//! Clause-by-clause parsing of the SELECT statement.

use super::mac::expected;
use super::{ParseResult, Parser};
use crate::sql::{
	Cond, Direction, Field, FieldSelector, Fields, Limit, Offset, Order, SelectStatement,
};
use crate::syn::token::t;

impl Parser<'_> {
	/// Parse a full SELECT statement.
	///
	/// ```text
	/// SELECT  = "SELECT" ResultFields [ "FROM" Ident ]
	///           [ "WHERE" Expr ]
	///           [ "ORDER" "BY" Ident [ "ASC" | "DESC" ] ]
	///           [ "LIMIT" Expr ]
	///           [ "OFFSET" Expr ]
	/// ```
	pub fn parse_select_stmt(&mut self) -> ParseResult<SelectStatement> {
		expected!(self, t!("SELECT"));
		let expr = self.parse_fields()?;
		let what = match self.eat(t!("FROM")) {
			true => Some(self.parse_ident()?),
			false => None,
		};
		let cond = self.try_parse_condition()?;
		let order = self.try_parse_order()?;
		let limit = self.try_parse_limit()?;
		let offset = self.try_parse_offset()?;
		Ok(SelectStatement {
			expr,
			what,
			cond,
			order,
			limit,
			offset,
		})
	}

	fn parse_fields(&mut self) -> ParseResult<Fields> {
		let mut fields = vec![self.parse_result_field()?];
		while self.eat(t!(",")) {
			fields.push(self.parse_result_field()?);
		}
		Ok(Fields(fields))
	}

	fn parse_result_field(&mut self) -> ParseResult<Field> {
		if self.eat(t!("*")) {
			return Ok(Field::All);
		}
		let expr = self.parse_expr()?;
		let alias = match self.eat(t!("AS")) {
			true => Some(self.parse_ident()?),
			false => None,
		};
		Ok(Field::Single {
			expr,
			alias,
		})
	}

	fn try_parse_condition(&mut self) -> ParseResult<Option<Cond>> {
		if !self.eat(t!("WHERE")) {
			return Ok(None);
		}
		Ok(Some(Cond(self.parse_expr()?)))
	}

	fn try_parse_order(&mut self) -> ParseResult<Option<Order>> {
		if !self.eat(t!("ORDER")) {
			return Ok(None);
		}
		expected!(self, t!("BY"));
		let selector = FieldSelector(self.parse_ident()?);
		let direction = match self.peek_kind() {
			t!("ASC") => {
				self.pop_peek();
				Direction::Asc
			}
			t!("DESC") => {
				self.pop_peek();
				Direction::Desc
			}
			_ => Direction::Default,
		};
		Ok(Some(Order {
			selector,
			direction,
		}))
	}

	fn try_parse_limit(&mut self) -> ParseResult<Option<Limit>> {
		if !self.eat(t!("LIMIT")) {
			return Ok(None);
		}
		Ok(Some(Limit(self.parse_expr()?)))
	}

	fn try_parse_offset(&mut self) -> ParseResult<Option<Offset>> {
		if !self.eat(t!("OFFSET")) {
			return Ok(None);
		}
		Ok(Some(Offset(self.parse_expr()?)))
	}
}

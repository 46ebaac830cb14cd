//! Precedence-climbing expression parsing.
//!
//! Binding strength, loosest first: `OR`, `AND`, comparisons, `+`/`-`,
//! `*`/`/`, primary expressions. All binary operators associate left.

use super::mac::{expected, unexpected};
use super::{ParseResult, Parser};
use crate::sql::{Expr, FieldSelector, Ident, Operator, Value};
use crate::syn::error::{ParseError, ParseErrorKind};
use crate::syn::token::{t, Span, TokenKind};

impl Parser<'_> {
	pub(crate) fn parse_expr(&mut self) -> ParseResult<Expr> {
		self.parse_or()
	}

	fn parse_or(&mut self) -> ParseResult<Expr> {
		let mut left = self.parse_and()?;
		while self.eat(t!("OR")) {
			let right = self.parse_and()?;
			left = binary(left, Operator::Or, right);
		}
		Ok(left)
	}

	fn parse_and(&mut self) -> ParseResult<Expr> {
		let mut left = self.parse_comparison()?;
		while self.eat(t!("AND")) {
			let right = self.parse_comparison()?;
			left = binary(left, Operator::And, right);
		}
		Ok(left)
	}

	fn parse_comparison(&mut self) -> ParseResult<Expr> {
		let mut left = self.parse_additive()?;
		loop {
			let op = match self.peek_kind() {
				t!("=") => Operator::Eq,
				t!("!=") => Operator::Neq,
				t!("<") => Operator::Lt,
				t!("<=") => Operator::Lte,
				t!(">") => Operator::Gt,
				t!(">=") => Operator::Gte,
				_ => return Ok(left),
			};
			self.pop_peek();
			let right = self.parse_additive()?;
			left = binary(left, op, right);
		}
	}

	fn parse_additive(&mut self) -> ParseResult<Expr> {
		let mut left = self.parse_multiplicative()?;
		loop {
			let op = match self.peek_kind() {
				t!("+") => Operator::Add,
				t!("-") => Operator::Sub,
				_ => return Ok(left),
			};
			self.pop_peek();
			let right = self.parse_multiplicative()?;
			left = binary(left, op, right);
		}
	}

	fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
		let mut left = self.parse_prime()?;
		loop {
			let op = match self.peek_kind() {
				t!("*") => Operator::Mul,
				t!("/") => Operator::Div,
				_ => return Ok(left),
			};
			self.pop_peek();
			let right = self.parse_prime()?;
			left = binary(left, op, right);
		}
	}

	fn parse_prime(&mut self) -> ParseResult<Expr> {
		let token = self.peek();
		match token.kind {
			TokenKind::Number => {
				self.pop_peek();
				let text = self.span_str(token.span);
				number_literal(text, token.span)
			}
			TokenKind::Strand => {
				self.pop_peek();
				let text = self.span_str(token.span);
				// Strip the enclosing quotes
				Ok(Expr::Literal(Value::from(&text[1..text.len() - 1])))
			}
			t!("TRUE") => {
				self.pop_peek();
				Ok(Expr::Literal(Value::from(true)))
			}
			t!("FALSE") => {
				self.pop_peek();
				Ok(Expr::Literal(Value::from(false)))
			}
			t!("NULL") => {
				self.pop_peek();
				Ok(Expr::Literal(Value::null()))
			}
			TokenKind::Ident => {
				self.pop_peek();
				let ident = Ident::from(self.span_str(token.span));
				Ok(Expr::Field(FieldSelector(ident)))
			}
			t!("(") => {
				self.pop_peek();
				let expr = self.parse_expr()?;
				expected!(self, t!(")"));
				Ok(expr)
			}
			t!("-") => {
				// A negative number literal
				self.pop_peek();
				let number = expected!(self, TokenKind::Number);
				let mut text = String::from("-");
				text.push_str(self.span_str(number.span));
				number_literal(&text, number.span)
			}
			found => unexpected!(self, found, "an expression"),
		}
	}
}

fn binary(left: Expr, op: Operator, right: Expr) -> Expr {
	Expr::Binary {
		left: Box::new(left),
		op,
		right: Box::new(right),
	}
}

fn number_literal(text: &str, span: Span) -> ParseResult<Expr> {
	let value = if text.contains(['.', 'e', 'E']) {
		match text.parse::<f64>() {
			Ok(v) => Value::from(v),
			Err(_) => return Err(ParseError::new(ParseErrorKind::InvalidNumber, span)),
		}
	} else {
		match text.parse::<i64>() {
			Ok(v) => Value::from(v),
			Err(_) => return Err(ParseError::new(ParseErrorKind::InvalidNumber, span)),
		}
	};
	Ok(Expr::Literal(value))
}

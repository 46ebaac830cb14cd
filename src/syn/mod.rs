//! The lexer and parser for the SELECT grammar.

pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;

pub use error::{ParseError, ParseErrorKind};
pub use parser::Parser;

use crate::err::Error;
use crate::sql::SelectStatement;

/// Parse a SELECT statement from query text.
pub fn parse(input: &str) -> Result<SelectStatement, Error> {
	let mut parser = Parser::new(input);
	let stmt = parser.parse_select_stmt()?;
	parser.expect_terminated()?;
	Ok(stmt)
}

#[cfg(test)]
mod tests {
	use super::error::ParseErrorKind;
	use super::parse;
	use crate::err::Error;
	use crate::sql::{Direction, Expr, Field, FieldSelector, Operator, Value};

	fn parse_err(input: &str) -> ParseErrorKind {
		match parse(input) {
			Err(Error::InvalidQuery(e)) => e.kind,
			other => panic!("expected a parse error, got {other:?}"),
		}
	}

	#[test]
	fn full_select_statement() {
		let stmt = parse("SELECT a, b AS bb FROM t WHERE x > 1 ORDER BY y DESC LIMIT 10 OFFSET 5")
			.unwrap();
		assert_eq!(stmt.expr.len(), 2);
		assert_eq!(
			stmt.expr[0],
			Field::Single {
				expr: Expr::Field(FieldSelector::from("a")),
				alias: None,
			}
		);
		assert_eq!(
			stmt.expr[1],
			Field::Single {
				expr: Expr::Field(FieldSelector::from("b")),
				alias: Some("bb".into()),
			}
		);
		assert_eq!(stmt.what.as_deref().map(String::as_str), Some("t"));
		let cond = stmt.cond.expect("a WHERE clause");
		assert_eq!(
			*cond,
			Expr::Binary {
				left: Box::new(Expr::Field(FieldSelector::from("x"))),
				op: Operator::Gt,
				right: Box::new(Expr::Literal(Value::from(1i64))),
			}
		);
		let order = stmt.order.expect("an ORDER BY clause");
		assert_eq!(order.selector, FieldSelector::from("y"));
		assert_eq!(order.direction, Direction::Desc);
		assert_eq!(stmt.limit.expect("a LIMIT clause").process().unwrap(), 10);
		assert_eq!(stmt.offset.expect("an OFFSET clause").process().unwrap(), 5);
	}

	#[test]
	fn expression_only_select() {
		let stmt = parse("SELECT *").unwrap();
		assert_eq!(stmt.expr.0, vec![Field::All]);
		assert_eq!(stmt.what, None);
		assert_eq!(stmt.cond, None);
		assert_eq!(stmt.order, None);
		let stmt = parse("SELECT 1 + 2 * 3").unwrap();
		let Field::Single {
			ref expr,
			..
		} = stmt.expr[0]
		else {
			panic!("expected a single field");
		};
		assert_eq!(expr.eval(None).unwrap().as_int().unwrap(), 7);
	}

	#[test]
	fn default_column_names() {
		let stmt = parse("SELECT a, b AS bb, x + 1 FROM t").unwrap();
		let names: Vec<_> = stmt.expr.iter().map(|f| f.name().unwrap()).collect();
		assert_eq!(names, vec!["a", "bb", "x + 1"]);
	}

	#[test]
	fn order_direction_defaults_to_ascending() {
		let stmt = parse("SELECT * FROM t ORDER BY y").unwrap();
		let order = stmt.order.unwrap();
		assert_eq!(order.direction, Direction::Default);
		assert!(!order.direction.is_descending());
		let stmt = parse("SELECT * FROM t ORDER BY y ASC").unwrap();
		assert_eq!(stmt.order.unwrap().direction, Direction::Asc);
	}

	#[test]
	fn order_requires_by() {
		assert!(matches!(
			parse_err("SELECT * FROM t ORDER y"),
			ParseErrorKind::Unexpected {
				expected: "BY",
				..
			}
		));
	}

	#[test]
	fn literals_and_keywords_in_expressions() {
		let stmt = parse("SELECT * FROM t WHERE a = 'x' AND b != TRUE OR c = NULL").unwrap();
		// OR binds loosest: (a = 'x' AND b != TRUE) OR (c = NULL)
		let cond = stmt.cond.unwrap();
		match &cond.0 {
			Expr::Binary {
				op: Operator::Or,
				left,
				..
			} => match left.as_ref() {
				Expr::Binary {
					op: Operator::And,
					..
				} => (),
				other => panic!("expected AND on the left, got {other:?}"),
			},
			other => panic!("expected OR at the top, got {other:?}"),
		}
	}

	#[test]
	fn parse_errors_carry_positions() {
		match parse("SELECT FROM t") {
			Err(Error::InvalidQuery(e)) => {
				assert!(matches!(e.kind, ParseErrorKind::Unexpected { expected: "an expression", .. }));
				assert_eq!(e.position(), 7);
			}
			other => panic!("expected a parse error, got {other:?}"),
		}
	}

	#[test]
	fn statements_must_terminate() {
		parse("SELECT * FROM t;").unwrap();
		assert!(matches!(
			parse_err("SELECT * FROM t garbage"),
			ParseErrorKind::Unexpected {
				expected: "end of input",
				..
			}
		));
	}

	#[test]
	fn keywords_are_case_insensitive() {
		let stmt = parse("select a from t where x >= 2 order by x desc limit 1 offset 0").unwrap();
		assert!(stmt.cond.is_some());
		assert_eq!(stmt.order.unwrap().direction, Direction::Desc);
	}

	#[test]
	fn statement_display_roundtrip() {
		let text = "SELECT a, b AS bb FROM t WHERE x > 1 ORDER BY y DESC LIMIT 10 OFFSET 5";
		assert_eq!(parse(text).unwrap().to_string(), text);
		let text = "SELECT *";
		assert_eq!(parse(text).unwrap().to_string(), text);
	}

	#[test]
	fn negative_and_float_literals() {
		let stmt = parse("SELECT * FROM t LIMIT 2 OFFSET 0 ").unwrap();
		assert_eq!(stmt.limit.unwrap().process().unwrap(), 2);
		let stmt = parse("SELECT -3, 1.5").unwrap();
		let values: Vec<_> = stmt
			.expr
			.iter()
			.map(|f| match f {
				Field::Single {
					expr, ..
				} => expr.eval(None).unwrap(),
				Field::All => panic!("expected expressions"),
			})
			.collect();
		assert_eq!(values[0].as_int().unwrap(), -3);
		assert_eq!(values[1].as_float().unwrap(), 1.5);
	}

	#[test]
	fn invalid_limits_are_rejected_at_processing() {
		let stmt = parse("SELECT * FROM t LIMIT -1").unwrap();
		assert!(matches!(stmt.limit.unwrap().process(), Err(Error::InvalidLimit { .. })));
		let stmt = parse("SELECT * FROM t OFFSET 'x'").unwrap();
		assert!(matches!(stmt.offset.unwrap().process(), Err(Error::InvalidOffset { .. })));
	}
}

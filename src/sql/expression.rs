//! Expressions and their evaluation against a record environment.

use crate::doc::Record;
use crate::err::Error;
use crate::sql::ident::Ident;
use crate::sql::value::Value;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

/// A reference to a record field, usable as an expression or a sort key.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub struct FieldSelector(pub Ident);

impl FieldSelector {
	/// The name of the referenced field
	pub fn name(&self) -> &str {
		self.0.as_str()
	}
}

impl From<&str> for FieldSelector {
	fn from(v: &str) -> Self {
		FieldSelector(Ident::from(v))
	}
}

impl Display for FieldSelector {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		Display::fmt(&self.0, f)
	}
}

/// A binary operator.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub enum Operator {
	Or,
	And,
	Eq,
	Neq,
	Lt,
	Lte,
	Gt,
	Gte,
	Add,
	Sub,
	Mul,
	Div,
}

impl Operator {
	pub fn as_str(&self) -> &'static str {
		match self {
			Operator::Or => "OR",
			Operator::And => "AND",
			Operator::Eq => "=",
			Operator::Neq => "!=",
			Operator::Lt => "<",
			Operator::Lte => "<=",
			Operator::Gt => ">",
			Operator::Gte => ">=",
			Operator::Add => "+",
			Operator::Sub => "-",
			Operator::Mul => "*",
			Operator::Div => "/",
		}
	}
}

impl Display for Operator {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// An expression tree evaluated against the current record.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub enum Expr {
	Literal(Value),
	Field(FieldSelector),
	Binary {
		left: Box<Expr>,
		op: Operator,
		right: Box<Expr>,
	},
}

impl Expr {
	/// Evaluate this expression. A field reference against a record
	/// which lacks the field, or against no record at all, yields null,
	/// so that predicates over heterogeneous records never abort a scan.
	pub fn eval(&self, doc: Option<&dyn Record>) -> Result<Value, Error> {
		match self {
			Expr::Literal(v) => Ok(v.clone()),
			Expr::Field(selector) => match doc {
				Some(doc) => match doc.field(selector.name()) {
					Ok(f) => Ok(f.value),
					Err(Error::FieldNotFound {
						..
					}) => Ok(Value::null()),
					Err(e) => Err(e),
				},
				None => Ok(Value::null()),
			},
			Expr::Binary {
				left,
				op,
				right,
			} => match op {
				Operator::And => {
					if !left.eval(doc)?.is_truthy()? {
						return Ok(Value::from(false));
					}
					Ok(Value::from(right.eval(doc)?.is_truthy()?))
				}
				Operator::Or => {
					if left.eval(doc)?.is_truthy()? {
						return Ok(Value::from(true));
					}
					Ok(Value::from(right.eval(doc)?.is_truthy()?))
				}
				Operator::Eq | Operator::Neq | Operator::Lt | Operator::Lte | Operator::Gt
				| Operator::Gte => {
					let l = left.eval(doc)?;
					let r = right.eval(doc)?;
					Ok(Value::from(compare(*op, l.compare(&r))))
				}
				Operator::Add | Operator::Sub | Operator::Mul | Operator::Div => {
					let l = left.eval(doc)?;
					let r = right.eval(doc)?;
					Ok(arithmetic(*op, &l, &r))
				}
			},
		}
	}
}

/// Resolve a comparison operator against an ordering. Incomparable
/// values fail every comparison.
fn compare(op: Operator, ord: Option<Ordering>) -> bool {
	let Some(ord) = ord else {
		return false;
	};
	match op {
		Operator::Eq => ord == Ordering::Equal,
		Operator::Neq => ord != Ordering::Equal,
		Operator::Lt => ord == Ordering::Less,
		Operator::Lte => ord != Ordering::Greater,
		Operator::Gt => ord == Ordering::Greater,
		Operator::Gte => ord != Ordering::Less,
		_ => false,
	}
}

/// Apply an arithmetic operator. Non-numeric operands, integer overflow
/// and integer division by zero all yield null.
fn arithmetic(op: Operator, l: &Value, r: &Value) -> Value {
	if l.is_float() || r.is_float() {
		let (Ok(l), Ok(r)) = (l.as_float(), r.as_float()) else {
			return Value::null();
		};
		let out = match op {
			Operator::Add => l + r,
			Operator::Sub => l - r,
			Operator::Mul => l * r,
			Operator::Div => l / r,
			_ => return Value::null(),
		};
		return Value::from(out);
	}
	let (Ok(l), Ok(r)) = (l.as_int(), r.as_int()) else {
		return Value::null();
	};
	let out = match op {
		Operator::Add => l.checked_add(r),
		Operator::Sub => l.checked_sub(r),
		Operator::Mul => l.checked_mul(r),
		Operator::Div => match r {
			0 => None,
			_ => l.checked_div(r),
		},
		_ => None,
	};
	match out {
		Some(v) => Value::from(v),
		None => Value::null(),
	}
}

impl Display for Expr {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match self {
			Expr::Literal(v) => Display::fmt(v, f),
			Expr::Field(s) => Display::fmt(s, f),
			Expr::Binary {
				left,
				op,
				right,
			} => write!(f, "{left} {op} {right}"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::doc::{Field, FieldBuffer};

	fn binary(left: Expr, op: Operator, right: Expr) -> Expr {
		Expr::Binary {
			left: Box::new(left),
			op,
			right: Box::new(right),
		}
	}

	fn int(v: i64) -> Expr {
		Expr::Literal(Value::from(v))
	}

	#[test]
	fn comparisons_against_a_record() {
		let mut doc = FieldBuffer::new();
		doc.add(Field::new("x", Value::from(2i64)));
		let expr = binary(Expr::Field(FieldSelector::from("x")), Operator::Gt, int(1));
		assert!(expr.eval(Some(&doc)).unwrap().is_truthy().unwrap());
		let expr = binary(Expr::Field(FieldSelector::from("x")), Operator::Eq, int(3));
		assert!(!expr.eval(Some(&doc)).unwrap().is_truthy().unwrap());
	}

	#[test]
	fn missing_fields_evaluate_to_null() {
		let doc = FieldBuffer::new();
		let expr = Expr::Field(FieldSelector::from("missing"));
		assert!(expr.eval(Some(&doc)).unwrap().is_null());
		// And fail comparisons rather than erroring
		let expr = binary(Expr::Field(FieldSelector::from("missing")), Operator::Gt, int(1));
		assert!(!expr.eval(Some(&doc)).unwrap().is_truthy().unwrap());
	}

	#[test]
	fn logic_short_circuits() {
		let t = Expr::Literal(Value::from(true));
		let f = Expr::Literal(Value::from(false));
		assert!(binary(t.clone(), Operator::Or, f.clone()).eval(None).unwrap().is_truthy().unwrap());
		assert!(!binary(f.clone(), Operator::And, t.clone()).eval(None).unwrap().is_truthy().unwrap());
		assert!(binary(t.clone(), Operator::And, t.clone()).eval(None).unwrap().is_truthy().unwrap());
		assert!(!binary(f.clone(), Operator::Or, f).eval(None).unwrap().is_truthy().unwrap());
	}

	#[test]
	fn arithmetic_evaluation() {
		let expr = binary(int(2), Operator::Add, binary(int(3), Operator::Mul, int(4)));
		assert_eq!(expr.eval(None).unwrap().as_int().unwrap(), 14);
		let expr = binary(int(1), Operator::Div, int(0));
		assert!(expr.eval(None).unwrap().is_null());
		let expr = binary(Expr::Literal(Value::from(1.5)), Operator::Mul, int(2));
		assert_eq!(expr.eval(None).unwrap().as_float().unwrap(), 3.0);
		let expr = binary(Expr::Literal(Value::from("a")), Operator::Add, int(1));
		assert!(expr.eval(None).unwrap().is_null());
	}

	#[test]
	fn textual_form() {
		let expr = binary(Expr::Field(FieldSelector::from("x")), Operator::Gt, int(1));
		assert_eq!(expr.to_string(), "x > 1");
	}
}

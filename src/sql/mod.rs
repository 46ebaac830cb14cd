//! The query AST produced by the parser.
//!
//! Every node implements `Display`, and the textual form of an expression
//! is what names its output column when no `AS` alias is given.

pub mod cond;
pub mod expression;
pub mod field;
pub mod ident;
pub mod limit;
pub mod offset;
pub mod order;
pub mod statements;
pub mod value;

pub use cond::Cond;
pub use expression::{Expr, FieldSelector, Operator};
pub use field::{Field, Fields};
pub use ident::Ident;
pub use limit::Limit;
pub use offset::Offset;
pub use order::{Direction, Order};
pub use statements::select::SelectStatement;
pub use value::{Kind, Value};

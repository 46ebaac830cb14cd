//! The token representation shared by the lexer and the parser.

/// A location in the source passed to the lexer.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
#[non_exhaustive]
pub struct Span {
	/// Offset in bytes.
	pub offset: u32,
	/// The amount of bytes this location encompasses.
	pub len: u32,
}

impl Span {
	/// Create a new empty span.
	pub const fn empty() -> Self {
		Span {
			offset: 0,
			len: 0,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}
}

/// The kind of a lexed token.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
#[non_exhaustive]
pub enum TokenKind {
	Select,
	From,
	Where,
	Order,
	By,
	Asc,
	Desc,
	Limit,
	Offset,
	As,
	And,
	Or,
	True,
	False,
	Null,
	Ident,
	Number,
	Strand,
	Star,
	Comma,
	OpenParen,
	CloseParen,
	SemiColon,
	Eq,
	Neq,
	Lt,
	Lte,
	Gt,
	Gte,
	Add,
	Sub,
	Div,
	Invalid,
	Eof,
}

impl TokenKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			TokenKind::Select => "SELECT",
			TokenKind::From => "FROM",
			TokenKind::Where => "WHERE",
			TokenKind::Order => "ORDER",
			TokenKind::By => "BY",
			TokenKind::Asc => "ASC",
			TokenKind::Desc => "DESC",
			TokenKind::Limit => "LIMIT",
			TokenKind::Offset => "OFFSET",
			TokenKind::As => "AS",
			TokenKind::And => "AND",
			TokenKind::Or => "OR",
			TokenKind::True => "TRUE",
			TokenKind::False => "FALSE",
			TokenKind::Null => "NULL",
			TokenKind::Ident => "an identifier",
			TokenKind::Number => "a number",
			TokenKind::Strand => "a string",
			TokenKind::Star => "*",
			TokenKind::Comma => ",",
			TokenKind::OpenParen => "(",
			TokenKind::CloseParen => ")",
			TokenKind::SemiColon => ";",
			TokenKind::Eq => "=",
			TokenKind::Neq => "!=",
			TokenKind::Lt => "<",
			TokenKind::Lte => "<=",
			TokenKind::Gt => ">",
			TokenKind::Gte => ">=",
			TokenKind::Add => "+",
			TokenKind::Sub => "-",
			TokenKind::Div => "/",
			TokenKind::Invalid => "an invalid token",
			TokenKind::Eof => "end of input",
		}
	}
}

/// A lexed token: its kind and where it sits in the source.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[non_exhaustive]
pub struct Token {
	pub kind: TokenKind,
	pub span: Span,
}

/// Maps a token string to its [`TokenKind`], keeping parser code close
/// to the grammar it implements.
macro_rules! t {
	("SELECT") => {
		$crate::syn::token::TokenKind::Select
	};
	("FROM") => {
		$crate::syn::token::TokenKind::From
	};
	("WHERE") => {
		$crate::syn::token::TokenKind::Where
	};
	("ORDER") => {
		$crate::syn::token::TokenKind::Order
	};
	("BY") => {
		$crate::syn::token::TokenKind::By
	};
	("ASC") => {
		$crate::syn::token::TokenKind::Asc
	};
	("DESC") => {
		$crate::syn::token::TokenKind::Desc
	};
	("LIMIT") => {
		$crate::syn::token::TokenKind::Limit
	};
	("OFFSET") => {
		$crate::syn::token::TokenKind::Offset
	};
	("AS") => {
		$crate::syn::token::TokenKind::As
	};
	("AND") => {
		$crate::syn::token::TokenKind::And
	};
	("OR") => {
		$crate::syn::token::TokenKind::Or
	};
	("TRUE") => {
		$crate::syn::token::TokenKind::True
	};
	("FALSE") => {
		$crate::syn::token::TokenKind::False
	};
	("NULL") => {
		$crate::syn::token::TokenKind::Null
	};
	("*") => {
		$crate::syn::token::TokenKind::Star
	};
	(",") => {
		$crate::syn::token::TokenKind::Comma
	};
	("(") => {
		$crate::syn::token::TokenKind::OpenParen
	};
	(")") => {
		$crate::syn::token::TokenKind::CloseParen
	};
	(";") => {
		$crate::syn::token::TokenKind::SemiColon
	};
	("=") => {
		$crate::syn::token::TokenKind::Eq
	};
	("!=") => {
		$crate::syn::token::TokenKind::Neq
	};
	("<") => {
		$crate::syn::token::TokenKind::Lt
	};
	("<=") => {
		$crate::syn::token::TokenKind::Lte
	};
	(">") => {
		$crate::syn::token::TokenKind::Gt
	};
	(">=") => {
		$crate::syn::token::TokenKind::Gte
	};
	("+") => {
		$crate::syn::token::TokenKind::Add
	};
	("-") => {
		$crate::syn::token::TokenKind::Sub
	};
	("/") => {
		$crate::syn::token::TokenKind::Div
	};
}
pub(crate) use t;

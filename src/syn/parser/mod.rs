//! The recursive descent parser for the SELECT grammar.
//!
//! The parser consumes tokens from the lexer through a single-token
//! peek buffer. Clause parsers use [`mac::expected!`] when exactly one
//! token can come next, and [`mac::unexpected!`] to report a token that
//! fits no production.

pub(crate) mod mac;

mod expression;
mod stmt;

use super::error::ParseError;
use super::lexer::Lexer;
use super::token::{Span, Token, TokenKind};
use crate::sql::Ident;
use mac::{expected, unexpected};

/// The result returned by most parser functions.
pub type ParseResult<T> = Result<T, ParseError>;

pub struct Parser<'a> {
	lexer: Lexer<'a>,
	peeked: Option<Token>,
}

impl<'a> Parser<'a> {
	/// Create a new parser for the given source.
	pub fn new(source: &'a str) -> Self {
		Parser {
			lexer: Lexer::new(source),
			peeked: None,
		}
	}

	/// Returns the next token and advances the parser one token forward.
	#[allow(clippy::should_implement_trait)]
	pub(crate) fn next(&mut self) -> Token {
		self.peeked.take().unwrap_or_else(|| self.lexer.next_token())
	}

	/// Returns the next token without consuming it.
	pub(crate) fn peek(&mut self) -> Token {
		match self.peeked {
			Some(token) => token,
			None => {
				let token = self.lexer.next_token();
				self.peeked = Some(token);
				token
			}
		}
	}

	/// Returns the kind of the next token without consuming it.
	pub(crate) fn peek_kind(&mut self) -> TokenKind {
		self.peek().kind
	}

	/// Consume the current peeked token and advance the parser.
	///
	/// Should only be called after peeking a value.
	pub(crate) fn pop_peek(&mut self) -> Token {
		self.next()
	}

	/// Eat the next token if it is of the given kind.
	/// Returns whether a token was eaten.
	pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
		if self.peek().kind == kind {
			self.pop_peek();
			true
		} else {
			false
		}
	}

	/// The span of the next token
	pub(crate) fn recent_span(&mut self) -> Span {
		self.peek().span
	}

	/// The source text covered by a span
	pub(crate) fn span_str(&self, span: Span) -> &'a str {
		self.lexer.span_str(span)
	}

	/// Parse a single identifier token
	pub(crate) fn parse_ident(&mut self) -> ParseResult<Ident> {
		let token = expected!(self, TokenKind::Ident);
		Ok(Ident::from(self.span_str(token.span)))
	}

	/// Check that nothing except an optional statement terminator is
	/// left in the source
	pub(crate) fn expect_terminated(&mut self) -> ParseResult<()> {
		self.eat(TokenKind::SemiColon);
		let token = self.peek();
		if token.kind == TokenKind::Eof {
			return Ok(());
		}
		unexpected!(self, token.kind, "end of input")
	}
}

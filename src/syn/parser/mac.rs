/// Require the next token to be of the given kind, returning a parse
/// error from the enclosing function otherwise.
macro_rules! expected {
	($parser:expr, $kind:expr) => {{
		let token = $parser.next();
		if token.kind == $kind {
			token
		} else {
			let expected = $kind.as_str();
			match token.kind {
				$crate::syn::token::TokenKind::Eof => {
					return Err($crate::syn::error::ParseError::new(
						$crate::syn::error::ParseErrorKind::UnexpectedEof {
							expected,
						},
						token.span,
					));
				}
				$crate::syn::token::TokenKind::Invalid => {
					return Err($crate::syn::error::ParseError::new(
						$crate::syn::error::ParseErrorKind::InvalidToken,
						token.span,
					));
				}
				found => {
					return Err($crate::syn::error::ParseError::new(
						$crate::syn::error::ParseErrorKind::Unexpected {
							found,
							expected,
						},
						token.span,
					));
				}
			}
		}
	}};
}

/// Raise a parse error for a token the parser did not expect.
macro_rules! unexpected {
	($parser:expr, $found:expr, $expected:expr) => {
		match $found {
			$crate::syn::token::TokenKind::Eof => {
				return Err($crate::syn::error::ParseError::new(
					$crate::syn::error::ParseErrorKind::UnexpectedEof {
						expected: $expected,
					},
					$parser.recent_span(),
				));
			}
			$crate::syn::token::TokenKind::Invalid => {
				return Err($crate::syn::error::ParseError::new(
					$crate::syn::error::ParseErrorKind::InvalidToken,
					$parser.recent_span(),
				));
			}
			found => {
				return Err($crate::syn::error::ParseError::new(
					$crate::syn::error::ParseErrorKind::Unexpected {
						found,
						expected: $expected,
					},
					$parser.recent_span(),
				));
			}
		}
	};
}

pub(crate) use expected;
pub(crate) use unexpected;

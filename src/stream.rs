//! Buffered token stream.
//!
//! The parser pulls tokens through this layer, which adds pushback,
//! conditional consumption, balanced-token capture (with `>>` splitting in
//! template context) and fenced token groups for speculative re-parses of
//! already-captured runs.

use std::collections::VecDeque;

use crate::ast;
use crate::diagnostics::{ErrorCode, ParseError};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::span::{Location, Span};

pub type Result<T> = std::result::Result<T, ParseError>;

/// A fenced group of tokens that must be consumed in isolation.
struct Group {
    tokens: VecDeque<Token>,
    /// Whether the synthetic group terminator has been handed out.
    end_emitted: bool,
}

/// Buffered view over the lexer.
pub struct TokenStream<'src> {
    lexer: Lexer<'src>,
    lookahead: VecDeque<Token>,
    groups: Vec<Group>,
    last_location: Location,
}

impl<'src> TokenStream<'src> {
    pub fn new(lexer: Lexer<'src>) -> Self {
        Self {
            lexer,
            lookahead: VecDeque::new(),
            groups: Vec::new(),
            last_location: Location::dummy(),
        }
    }

    /// Source text for a span.
    pub fn text(&self, span: Span) -> &'src str {
        self.lexer.slice(span)
    }

    /// Convert a lexed token to an owned AST token.
    pub fn ast_token(&self, tok: &Token) -> ast::Token {
        ast::Token::new(self.text(tok.span), tok.kind)
    }

    /// Convert a captured run to a [`ast::Value`].
    pub fn value(&self, toks: &[Token]) -> ast::Value {
        ast::Value::new(toks.iter().map(|t| self.ast_token(t)).collect())
    }

    /// Location of the most recently produced token.
    pub fn last_location(&self) -> Location {
        self.last_location.clone()
    }

    fn lexical_error(&self, tok: &Token) -> ParseError {
        ParseError::new(
            ErrorCode::LexicalError,
            self.lexer.describe_error(tok.span),
            tok.location.clone(),
        )
    }

    /// Pull the next token, honoring the active fenced group.
    fn pull(&mut self) -> Result<Token> {
        if let Some(group) = self.groups.last_mut() {
            if let Some(tok) = group.tokens.pop_front() {
                self.last_location = tok.location.clone();
                return Ok(tok);
            }
            if !group.end_emitted {
                group.end_emitted = true;
                return Ok(Token::new(
                    TokenKind::GroupEnd,
                    Span::default(),
                    self.last_location.clone(),
                ));
            }
            return Err(ParseError::new(
                ErrorCode::UnbalancedDelimiter,
                "ran past the end of a lookahead group",
                self.last_location.clone(),
            ));
        }

        if let Some(tok) = self.lookahead.pop_front() {
            self.last_location = tok.location.clone();
            return Ok(tok);
        }

        match self.lexer.next() {
            Some(tok) if tok.kind == TokenKind::Error => Err(self.lexical_error(&tok)),
            Some(tok) => {
                self.last_location = tok.location.clone();
                Ok(tok)
            }
            None => {
                // The lexer yields a final Eof; afterwards keep returning it.
                let at = self.last_location.clone();
                Ok(Token::new(TokenKind::Eof, Span::default(), at))
            }
        }
    }

    /// Push a token back to the front of the stream.
    pub fn return_token(&mut self, tok: Token) {
        if let Some(group) = self.groups.last_mut() {
            if tok.kind == TokenKind::GroupEnd {
                group.end_emitted = false;
                return;
            }
            group.tokens.push_front(tok);
        } else {
            self.lookahead.push_front(tok);
        }
    }

    /// Push a sequence back, preserving order.
    pub fn return_tokens(&mut self, toks: Vec<Token>) {
        for tok in toks.into_iter().rev() {
            self.return_token(tok);
        }
    }

    /// Next token, failing on end of file.
    pub fn token(&mut self) -> Result<Token> {
        let tok = self.pull()?;
        if tok.kind == TokenKind::Eof {
            return Err(ParseError::new(
                ErrorCode::UnexpectedToken,
                "unexpected end of file",
                tok.location,
            ));
        }
        Ok(tok)
    }

    /// Next token, or `None` at end of file.
    pub fn token_eof_ok(&mut self) -> Result<Option<Token>> {
        let tok = self.pull()?;
        if tok.kind == TokenKind::Eof {
            Ok(None)
        } else {
            Ok(Some(tok))
        }
    }

    /// Consume the next token when it has the given kind.
    pub fn token_if(&mut self, kind: TokenKind) -> Result<Option<Token>> {
        let tok = self.pull()?;
        if tok.kind == kind {
            Ok(Some(tok))
        } else {
            self.return_token(tok);
            Ok(None)
        }
    }

    /// Consume the next token when its kind satisfies the predicate.
    pub fn token_if_in(&mut self, pred: impl Fn(TokenKind) -> bool) -> Result<Option<Token>> {
        let tok = self.pull()?;
        if pred(tok.kind) {
            Ok(Some(tok))
        } else {
            self.return_token(tok);
            Ok(None)
        }
    }

    /// Consume the next token when its kind is *not* one of the given.
    pub fn token_if_not(&mut self, kinds: &[TokenKind]) -> Result<Option<Token>> {
        let tok = self.pull()?;
        if kinds.contains(&tok.kind) || tok.kind == TokenKind::Eof {
            self.return_token(tok);
            Ok(None)
        } else {
            Ok(Some(tok))
        }
    }

    /// Kind of the next token, without consuming.
    pub fn peek_kind(&mut self) -> Result<TokenKind> {
        let tok = self.pull()?;
        let kind = tok.kind;
        self.return_token(tok);
        Ok(kind)
    }

    /// Kind of the token after the next one, without consuming.
    pub fn peek2_kind(&mut self) -> Result<TokenKind> {
        let first = self.pull()?;
        let second = self.pull()?;
        let kind = second.kind;
        self.return_token(second);
        self.return_token(first);
        Ok(kind)
    }

    /// Location of the next token.
    pub fn peek_location(&mut self) -> Result<Location> {
        let tok = self.pull()?;
        let location = tok.location.clone();
        self.return_token(tok);
        Ok(location)
    }

    // ============================================================
    // Balanced capture
    // ============================================================

    fn closing_for(kind: TokenKind) -> Option<TokenKind> {
        match kind {
            TokenKind::LParen => Some(TokenKind::RParen),
            TokenKind::LBrace => Some(TokenKind::RBrace),
            TokenKind::LBracket => Some(TokenKind::RBracket),
            TokenKind::Lt => Some(TokenKind::Gt),
            _ => None,
        }
    }

    fn is_closer(kind: TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::RParen | TokenKind::RBrace | TokenKind::RBracket | TokenKind::Gt
        )
    }

    /// Consume tokens until every opener in `init` is matched, returning the
    /// full run including the closers. `>>` closes two levels of template
    /// brackets, splitting when only one level is open.
    pub fn consume_balanced(&mut self, init: Vec<Token>) -> Result<Vec<Token>> {
        let mut consumed = init;
        let mut stack: Vec<TokenKind> = Vec::new();
        for tok in &consumed {
            match Self::closing_for(tok.kind) {
                Some(close) => stack.push(close),
                None => {
                    return Err(ParseError::new(
                        ErrorCode::InternalInvariantBroken,
                        "balanced capture started on a non-opening token",
                        tok.location.clone(),
                    ))
                }
            }
        }

        loop {
            let tok = self.token().map_err(|e| {
                if e.code == ErrorCode::UnexpectedToken {
                    ParseError::new(
                        ErrorCode::UnbalancedDelimiter,
                        "unexpected end of file inside a balanced group",
                        e.location,
                    )
                } else {
                    e
                }
            })?;

            if tok.kind == TokenKind::Shr && stack.last() == Some(&TokenKind::Gt) {
                // `>>` ends a template-argument level; split off the second
                // `>` so the outer level can consume it.
                stack.pop();
                let first = Token::new(
                    TokenKind::Gt,
                    Span::new(tok.span.start, tok.span.start + 1),
                    tok.location.clone(),
                );
                let second = Token::new(
                    TokenKind::Gt,
                    Span::new(tok.span.start + 1, tok.span.end),
                    tok.location.clone(),
                );
                consumed.push(first);
                if stack.is_empty() {
                    self.return_token(second);
                    return Ok(consumed);
                }
                if stack.last() == Some(&TokenKind::Gt) {
                    stack.pop();
                    consumed.push(second);
                    if stack.is_empty() {
                        return Ok(consumed);
                    }
                } else {
                    self.return_token(second);
                }
                continue;
            }

            if Self::is_closer(tok.kind) {
                match stack.pop() {
                    Some(expected) if expected == tok.kind => {
                        consumed.push(tok);
                        if stack.is_empty() {
                            return Ok(consumed);
                        }
                        continue;
                    }
                    _ => {
                        return Err(ParseError::new(
                            ErrorCode::UnbalancedDelimiter,
                            format!(
                                "mismatched '{}'",
                                tok.kind.token_str().unwrap_or("delimiter")
                            ),
                            tok.location,
                        ));
                    }
                }
            }

            if let Some(close) = Self::closing_for(tok.kind) {
                stack.push(close);
            }
            consumed.push(tok);
        }
    }

    /// Consume until one of `stop` appears at depth 0 (the stop token is not
    /// consumed), recursing into balanced groups along the way.
    pub fn consume_value_until(&mut self, stop: &[TokenKind]) -> Result<Vec<Token>> {
        let mut toks = Vec::new();
        loop {
            let tok = match self.token_if_not(stop)? {
                Some(tok) => tok,
                None => break,
            };
            if Self::closing_for(tok.kind).is_some() {
                toks.extend(self.consume_balanced(vec![tok])?);
            } else {
                toks.push(tok);
            }
        }
        Ok(toks)
    }

    /// Consume until one of `stop` appears (not consumed), with no balance
    /// tracking.
    pub fn consume_until(&mut self, toks: &mut Vec<Token>, stop: &[TokenKind]) -> Result<()> {
        while let Some(tok) = self.token_if_not(stop)? {
            toks.push(tok);
        }
        Ok(())
    }

    /// Skip tokens until the matching closer, counting only the given pair.
    pub fn discard_contents(&mut self, open: TokenKind, close: TokenKind) -> Result<()> {
        let mut depth = 1usize;
        loop {
            let tok = self.token().map_err(|e| {
                if e.code == ErrorCode::UnexpectedToken {
                    ParseError::new(
                        ErrorCode::UnbalancedDelimiter,
                        "unexpected end of file inside a block",
                        e.location,
                    )
                } else {
                    e
                }
            })?;
            if tok.kind == open {
                depth += 1;
            } else if tok.kind == close {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
        }
    }

    /// Like [`TokenStream::discard_contents`], but keeps the tokens
    /// (excluding the final closer, which is included).
    pub fn capture_contents(
        &mut self,
        open: TokenKind,
        close: TokenKind,
    ) -> Result<Vec<Token>> {
        let mut depth = 1usize;
        let mut toks = Vec::new();
        loop {
            let tok = self.token()?;
            if tok.kind == open {
                depth += 1;
            } else if tok.kind == close {
                depth -= 1;
                if depth == 0 {
                    toks.push(tok);
                    return Ok(toks);
                }
            }
            toks.push(tok);
        }
    }

    // ============================================================
    // Fenced groups
    // ============================================================

    /// Begin a fenced group: subsequent tokens come only from `toks`, and
    /// exhaustion produces a synthetic [`TokenKind::GroupEnd`].
    pub fn begin_group(&mut self, toks: Vec<Token>) {
        self.groups.push(Group {
            tokens: toks.into(),
            end_emitted: false,
        });
    }

    /// End the innermost fenced group, returning any unconsumed tokens.
    pub fn end_group(&mut self) -> Vec<Token> {
        self.groups
            .pop()
            .map(|g| g.tokens.into_iter().collect())
            .unwrap_or_default()
    }

    /// Whether a fenced group is active.
    pub fn in_group(&self) -> bool {
        !self.groups.is_empty()
    }

    // ============================================================
    // Doxygen passthrough
    // ============================================================

    /// Take the buffered doxygen comment if it ended on or before the given
    /// line.
    pub fn take_doxygen_before(&mut self, line: u32) -> Option<String> {
        self.lexer.take_doxygen_before(line)
    }

    /// Take the buffered doxygen comment if it started on the given line.
    pub fn take_doxygen_on_line(&mut self, line: u32) -> Option<String> {
        self.lexer.take_doxygen_on_line(line)
    }
}

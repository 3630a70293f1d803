//! Recursive-descent parser for preprocessed C++ headers.
//!
//! The parser pulls tokens from the [`TokenStream`] and emits declarations
//! to a [`Visitor`] in source order while maintaining the lexical scope
//! stack and per-scope type-name tables.
//!
//! # Parser architecture
//!
//! The engine is split across submodules:
//!
//! - `types` - qualified names, decl-specifier sequences and declarators
//! - `decl` - the general declaration engine (functions, methods, fields,
//!   operators, structured bindings)
//! - `item` - keyword-led productions (namespaces, using, classes, enums,
//!   templates, friends, attributes)
//!
//! # Example
//!
//! ```rust
//! use cxxparse::parse_string;
//!
//! let parsed = parse_string("namespace a { struct B { int m; }; }", None, None)
//!     .expect("parse failed");
//! assert_eq!(parsed.unit.declarations.len(), 1);
//! ```
//!
//! # Error policy
//!
//! Lexical errors, unexpected tokens and unbalanced delimiters abort the
//! parse. `Unsupported` constructs are skipped to the next `;` (or the
//! enclosing `}`) and recorded as diagnostics.

mod decl;
mod item;
mod types;

#[cfg(test)]
mod tests;

use crate::ast::{Access, Attribute, ClassDecl, Value};
use crate::diagnostics::{Diagnostic, ErrorCode, ParseError};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::options::{ParserOptions, PreprocessorLines};
use crate::scope::{ScopeKind, ScopeStack};
use crate::source::SourceText;
use crate::span::Location;
use crate::stream::TokenStream;
use crate::visitor::Visitor;

pub(crate) type Result<T> = std::result::Result<T, ParseError>;

/// Declaration modifiers gathered while scanning a decl-specifier-seq,
/// kept apart by what they may legally modify so the caller can validate
/// them for its context.
#[derive(Debug, Default, Clone)]
pub(crate) struct TypeModifiers {
    /// Legal on variables and functions: `constexpr`, `consteval`,
    /// `extern`, `inline`, `static`.
    pub both: Vec<(&'static str, Location)>,
    /// Legal only on variables: `mutable`, `thread_local`, `constinit`.
    pub vars: Vec<(&'static str, Location)>,
    /// Legal only on methods: `explicit`, `virtual`.
    pub meths: Vec<(&'static str, Location)>,
    /// Linkage string from an inline `extern "C"` specifier.
    pub linkage: Option<String>,
}

impl TypeModifiers {
    pub fn validate(&self, var_ok: bool, meth_ok: bool, msg: &str) -> Result<()> {
        if !var_ok {
            if let Some((name, location)) = self.vars.first() {
                return Err(ParseError::new(
                    ErrorCode::UnexpectedToken,
                    format!("{msg}: unexpected '{name}'"),
                    location.clone(),
                ));
            }
        }
        if !meth_ok {
            if let Some((name, location)) = self.meths.first() {
                return Err(ParseError::new(
                    ErrorCode::UnexpectedToken,
                    format!("{msg}: unexpected '{name}'"),
                    location.clone(),
                ));
            }
        }
        if !meth_ok && !var_ok {
            if let Some((name, location)) = self.both.first() {
                return Err(ParseError::new(
                    ErrorCode::UnexpectedToken,
                    format!("{msg}: unexpected '{name}'"),
                    location.clone(),
                ));
            }
        }
        Ok(())
    }

    pub fn has(&self, name: &str) -> bool {
        self.both.iter().any(|(n, _)| *n == name)
            || self.vars.iter().any(|(n, _)| *n == name)
            || self.meths.iter().any(|(n, _)| *n == name)
    }
}

/// Parse-time state for an open block.
#[derive(Debug)]
pub(crate) enum Block {
    Namespace,
    Class {
        decl: ClassDecl,
        access: Access,
        /// Set when the class appeared inside a typedef.
        is_typedef: bool,
        /// Modifiers that apply to declarators following the class body.
        mods: TypeModifiers,
        /// Set when a template header scope encloses the class body and
        /// must be popped together with it.
        pops_template_scope: bool,
    },
    Extern,
    /// A stray `{ ... }` not owned by any declaration.
    Empty,
}

/// Single-use parser driving a visitor over one header.
pub struct Parser<'src, 'v> {
    pub(crate) stream: TokenStream<'src>,
    pub(crate) visitor: &'v mut dyn Visitor,
    pub(crate) options: ParserOptions,
    pub(crate) scopes: ScopeStack,
    pub(crate) blocks: Vec<Block>,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) anon_id: u32,
    /// Attributes found embedded in a name (e.g. after a class-key),
    /// drained into the owning declaration.
    pub(crate) pqname_attrs: Vec<Attribute>,
}

impl<'src, 'v> Parser<'src, 'v> {
    /// Create a parser over cleaned source text.
    pub fn new(
        source: &'src SourceText,
        visitor: &'v mut dyn Visitor,
        options: ParserOptions,
    ) -> Self {
        let lexer = Lexer::new(source, options.retain_doxygen_comments);
        let known = options.known_type_names.iter().cloned().collect::<Vec<_>>();
        Self {
            stream: TokenStream::new(lexer),
            visitor,
            options,
            scopes: ScopeStack::new(known),
            blocks: Vec::new(),
            diagnostics: Vec::new(),
            anon_id: 0,
            pqname_attrs: Vec::new(),
        }
    }

    /// Parse the header contents, emitting events to the visitor.
    #[must_use = "parsing has no effect if the result is not used"]
    pub fn parse(&mut self) -> Result<()> {
        loop {
            let tok = match self.stream.token_eof_ok()? {
                Some(tok) => tok,
                None => break,
            };
            let doxygen = self.stream.take_doxygen_before(tok.location.line);

            match self.dispatch(tok, doxygen) {
                Ok(()) => {}
                Err(err) if err.code.is_recoverable() => {
                    self.diagnostics.push((&err).into());
                    self.skip_to_sync()?;
                }
                Err(err) => return Err(err),
            }
        }

        if !self.blocks.is_empty() {
            return Err(ParseError::new(
                ErrorCode::UnbalancedDelimiter,
                "unexpected end of file with an unclosed block",
                self.stream.last_location(),
            ));
        }
        Ok(())
    }

    /// Recoverable diagnostics accumulated while parsing.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Dispatch one top-level or member declaration by its leading token.
    fn dispatch(&mut self, mut tok: Token, doxygen: Option<String>) -> Result<()> {
        let mut attrs: Vec<Attribute> = Vec::new();
        while self.is_attribute_start(&tok)? {
            attrs.extend(self.parse_attribute_seq(tok)?);
            tok = self.stream.token()?;
        }

        if tok.kind == TokenKind::Inline && self.stream.peek_kind()? == TokenKind::Namespace {
            let ns_tok = self.stream.token()?;
            return self.parse_namespace(ns_tok, doxygen, true);
        }
        if tok.kind == TokenKind::Identifier && self.is_module_directive(&tok)? {
            return Err(ParseError::new(
                ErrorCode::Unsupported,
                "module declarations are not modeled",
                tok.location,
            ));
        }

        match tok.kind {
            TokenKind::Namespace => self.parse_namespace(tok, doxygen, false),
            TokenKind::Using => self.parse_using(tok, doxygen, None),
            TokenKind::Template => self.parse_template(tok, doxygen, attrs),
            TokenKind::Extern => self.parse_extern(tok, doxygen, attrs),
            TokenKind::Friend => self.parse_friend(tok, doxygen, None, attrs),
            TokenKind::Typedef => self.parse_typedef(tok, doxygen, attrs),
            TokenKind::StaticAssert => self.parse_static_assert(tok),
            TokenKind::Public | TokenKind::Protected | TokenKind::Private => {
                self.parse_access_specifier(tok)
            }
            TokenKind::PPLine => self.parse_directive(tok),
            TokenKind::Semi => Ok(()),
            TokenKind::LBrace => {
                self.blocks.push(Block::Empty);
                Ok(())
            }
            TokenKind::RBrace => self.on_block_end(tok),
            TokenKind::Export => Err(ParseError::new(
                ErrorCode::Unsupported,
                "module declarations are not modeled",
                tok.location,
            )),
            TokenKind::Mutable => {
                if !self.in_class_block() {
                    return Err(self.err_unexpected(&tok, None));
                }
                self.parse_declarations(tok, doxygen, None, attrs, false, false)
            }
            _ => self.parse_declarations(tok, doxygen, None, attrs, false, false),
        }
    }

    /// `module;`, `module name;` and `import <...>;` lines from C++20
    /// modules, which this parser intentionally does not model.
    fn is_module_directive(&mut self, tok: &Token) -> Result<bool> {
        let text = self.stream.text(tok.span);
        let next = self.stream.peek_kind()?;
        match text {
            "module" => Ok(next == TokenKind::Semi
                || (next == TokenKind::Identifier && !self.scopes.is_type_name("module"))),
            "import" => Ok(matches!(
                next,
                TokenKind::Lt | TokenKind::StringLit | TokenKind::Shl
            )),
            _ => Ok(false),
        }
    }

    /// Skip past an unsupported declaration: everything up to a `;` at the
    /// outer depth, or the enclosing `}` (left unconsumed).
    fn skip_to_sync(&mut self) -> Result<()> {
        let mut depth = 0usize;
        loop {
            let kind = match self.stream.token_eof_ok()? {
                Some(tok) => {
                    let kind = tok.kind;
                    if kind == TokenKind::RBrace && depth == 0 {
                        self.stream.return_token(tok);
                        return Ok(());
                    }
                    kind
                }
                None => return Ok(()),
            };
            match kind {
                TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket => {
                    depth = depth.saturating_sub(1);
                }
                TokenKind::Semi if depth == 0 => return Ok(()),
                _ => {}
            }
        }
    }

    // ============================================================
    // Block state
    // ============================================================

    pub(crate) fn in_class_block(&self) -> bool {
        matches!(self.blocks.last(), Some(Block::Class { .. }))
    }

    /// Access level in effect for the innermost class block.
    pub(crate) fn current_access(&self) -> Option<Access> {
        match self.blocks.last() {
            Some(Block::Class { access, .. }) => Some(*access),
            _ => None,
        }
    }

    fn parse_access_specifier(&mut self, tok: Token) -> Result<()> {
        let access = match tok.kind {
            TokenKind::Public => Access::Public,
            TokenKind::Protected => Access::Protected,
            _ => Access::Private,
        };
        let in_class = match self.blocks.last_mut() {
            Some(Block::Class {
                access: current, ..
            }) => {
                *current = access;
                true
            }
            _ => false,
        };
        if !in_class {
            return Err(self.err_unexpected(&tok, None));
        }
        self.next_must_be(TokenKind::Colon)?;
        Ok(())
    }

    /// A `}` closes the innermost open block.
    fn on_block_end(&mut self, tok: Token) -> Result<()> {
        let block = match self.blocks.pop() {
            Some(block) => block,
            None => return Err(self.err_unexpected(&tok, None)),
        };
        match block {
            Block::Namespace => {
                self.scopes.pop();
                self.visitor.exit_namespace();
                Ok(())
            }
            Block::Extern => {
                self.visitor.exit_extern_block();
                Ok(())
            }
            Block::Empty => Ok(()),
            Block::Class {
                decl,
                is_typedef,
                mods,
                pops_template_scope,
                ..
            } => {
                self.scopes.pop();
                if pops_template_scope {
                    self.scopes.pop();
                }
                self.visitor.exit_class();
                self.finish_class_or_enum(decl.typename, is_typedef, mods)
            }
        }
    }

    // ============================================================
    // Preprocessor lines
    // ============================================================

    fn parse_directive(&mut self, tok: Token) -> Result<()> {
        if self.options.preprocessor_lines == PreprocessorLines::Ignore {
            return Ok(());
        }
        use crate::ast::{DirectiveDecl, DirectiveKind};

        let raw = self.stream.text(tok.span).to_string();
        let body = raw
            .trim_start_matches(|c| c == '#' || c == '%' || c == ':')
            .trim_start();
        let (word, rest) = match body.find(|c: char| c.is_whitespace()) {
            Some(pos) => (&body[..pos], body[pos..].trim_start()),
            None => (body, ""),
        };
        let kind = match word {
            "include" => DirectiveKind::Include,
            "pragma" => DirectiveKind::Pragma,
            "define" => DirectiveKind::Define,
            _ => DirectiveKind::Other,
        };
        self.visitor.on_directive(DirectiveDecl {
            kind,
            content: rest.to_string(),
            raw,
            location: tok.location,
        });
        Ok(())
    }

    // ============================================================
    // Token and error helpers
    // ============================================================

    pub(crate) fn err_unexpected(&self, tok: &Token, expected: Option<&str>) -> ParseError {
        let text = match tok.kind {
            TokenKind::Eof => "end of file".to_string(),
            TokenKind::GroupEnd => "end of declaration".to_string(),
            _ => format!("'{}'", self.stream.text(tok.span)),
        };
        let message = match expected {
            Some(expected) => format!("unexpected {text}, expected {expected}"),
            None => format!("unexpected {text}"),
        };
        ParseError::new(ErrorCode::UnexpectedToken, message, tok.location.clone())
    }

    pub(crate) fn next_must_be(&mut self, kind: TokenKind) -> Result<Token> {
        let tok = self.stream.token()?;
        if tok.kind != kind {
            return Err(self.err_unexpected(&tok, Some(&kind.describe())));
        }
        Ok(tok)
    }

    pub(crate) fn next_must_be_any(&mut self, kinds: &[TokenKind]) -> Result<Token> {
        let tok = self.stream.token()?;
        if !kinds.contains(&tok.kind) {
            let expected = kinds
                .iter()
                .map(|k| k.describe())
                .collect::<Vec<_>>()
                .join(" or ");
            return Err(self.err_unexpected(&tok, Some(&expected)));
        }
        Ok(tok)
    }

    /// Consume a template list separator; returns `true` when the list
    /// ended. `>>` closes this level and returns the second `>` to the
    /// stream.
    pub(crate) fn template_separator(&mut self) -> Result<bool> {
        let tok = self.stream.token()?;
        match tok.kind {
            TokenKind::Comma => Ok(false),
            TokenKind::Gt => Ok(true),
            TokenKind::Shr => {
                self.split_shr(tok);
                let first = self.stream.token()?;
                debug_assert_eq!(first.kind, TokenKind::Gt);
                Ok(true)
            }
            _ => Err(self.err_unexpected(&tok, Some("',' or '>'"))),
        }
    }

    /// Replace a `>>` with two `>` tokens at the front of the stream.
    pub(crate) fn split_shr(&mut self, tok: Token) {
        debug_assert_eq!(tok.kind, TokenKind::Shr);
        let first = Token::new(
            TokenKind::Gt,
            crate::span::Span::new(tok.span.start, tok.span.start + 1),
            tok.location.clone(),
        );
        let second = Token::new(
            TokenKind::Gt,
            crate::span::Span::new(tok.span.start + 1, tok.span.end),
            tok.location,
        );
        self.stream.return_token(second);
        self.stream.return_token(first);
    }

    pub(crate) fn make_value(&self, toks: &[Token]) -> Value {
        self.stream.value(toks)
    }

    /// Fresh id for an anonymous class or enum.
    pub(crate) fn next_anon_id(&mut self) -> u32 {
        self.anon_id += 1;
        self.anon_id
    }

    /// Register a type name in the scope where the current declaration
    /// lives; template header scopes are transparent so the name outlives
    /// them.
    pub(crate) fn register_type(&mut self, name: &str) {
        if !name.is_empty() {
            self.scopes.declare_type_skipping_templates(name);
        }
    }

    /// Push a template header scope seeded with its type parameter names.
    pub(crate) fn push_template_scope(&mut self, template: &crate::ast::TemplateDecl) {
        self.scopes.push(ScopeKind::Template, None);
        for param in &template.params {
            if let crate::ast::TemplateParam::Type(tp) = param {
                if let Some(name) = &tp.name {
                    self.scopes.declare_type(name.clone());
                }
            }
        }
    }
}

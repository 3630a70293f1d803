//! # cxxparse
//!
//! A lexer and recursive-descent parser for preprocessed C++ header text.
//!
//! Given a header that has already been run through a preprocessor, the
//! parser produces a structured description of every declaration it
//! introduces: namespaces, classes, enums, typedefs and aliases, functions
//! and methods (operators included), variables, templates, friends, using
//! declarations, attributes and forward declarations. Expressions are not
//! modeled; default arguments, initializers, array sizes, bit-field widths
//! and enumerator values are captured as opaque balanced token runs.
//!
//! ## Pipeline
//!
//! ```text
//! SourceText -> Lexer -> TokenStream -> Parser -> Visitor -> Unit
//! ```
//!
//! ## Quick start
//!
//! ```rust
//! use cxxparse::parse_string;
//!
//! let parsed = parse_string(
//!     "namespace hal { class Gpio { public: void set(bool value); }; }",
//!     None,
//!     None,
//! )
//! .expect("parse failed");
//!
//! assert_eq!(parsed.unit.declarations.len(), 1);
//! ```
//!
//! ## Streaming
//!
//! A consumer that does not need the tree can implement [`Visitor`] and
//! drive [`Parser`] directly; events arrive in source order.
//!
//! ## Error handling
//!
//! [`parse_string`] returns a [`collect::ParseFailure`] on structurally
//! unrecoverable input, carrying the error location and the partial tree up
//! to the failure. Unsupported-but-valid constructs (such as module
//! declarations) are skipped and surfaced as [`Diagnostic`]s.
//!
//! ## Module overview
//!
//! - [`source`] - input cleanup and line tracking
//! - [`lexer`] - tokenization
//! - [`stream`] - buffered token stream with balanced capture
//! - [`parser`] - syntax analysis
//! - [`ast`] - the declaration tree
//! - [`scope`] - lexical scope and type-name tables
//! - [`visitor`] - the event interface
//! - [`collect`] - the default tree-building visitor and entry points
//! - [`options`] - parsing knobs
//! - [`diagnostics`] - errors and reporting

pub mod ast;
pub mod collect;
pub mod diagnostics;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod scope;
pub mod source;
pub mod span;
pub mod stream;
pub mod visitor;

pub use collect::{parse_file, parse_string, AstVisitor, ParsedUnit};
pub use diagnostics::{Diagnostic, DiagnosticEmitter, ErrorCode, ParseError};
pub use lexer::{Lexer, Token, TokenKind};
pub use options::ParserOptions;
pub use parser::Parser;
pub use source::SourceText;
pub use span::{Location, Span};
pub use visitor::{NullVisitor, Visitor};

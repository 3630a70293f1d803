//! Lexical analysis for C++ header text.
//!
//! This module tokenizes preprocessed C++ source into a stream of tokens.
//! It handles the full header-level token set:
//!
//! - Keywords and identifiers (including universal character names)
//! - pp-numbers (base prefixes, digit separators, exponents, UDL suffixes)
//! - Character and string literals with encoding prefixes, raw strings,
//!   and concatenation of adjacent string literals
//! - Operators, punctuation, digraphs and alternative tokens
//! - Preprocessor lines (`#...`), including `#line`/linemarker tracking
//! - Comments; doxygen comments are retained for attachment to declarations
//!
//! # Example
//!
//! ```rust
//! use cxxparse::{Lexer, SourceText, TokenKind};
//!
//! let source = SourceText::new("x.h", "int x = 42;");
//! let tokens: Vec<_> = Lexer::new(&source, true).collect();
//!
//! assert_eq!(tokens[0].kind, TokenKind::Int);
//! assert_eq!(tokens[1].kind, TokenKind::Identifier);
//! assert_eq!(tokens[2].kind, TokenKind::Eq);
//! assert_eq!(tokens[3].kind, TokenKind::Number);
//! assert_eq!(tokens[4].kind, TokenKind::Semi);
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use logos::{Filter, Logos};
use serde::{Deserialize, Serialize};

use crate::source::SourceText;
use crate::span::{Location, Span};

/// Token kinds for the C++ header lexer.
#[derive(
    Logos, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[logos(skip r"[ \t\n\f]+")]
pub enum TokenKind {
    // ============================================================
    // Keywords
    // ============================================================
    #[token("alignas")]
    Alignas,
    #[token("alignof")]
    Alignof,
    #[token("asm")]
    Asm,
    #[token("auto")]
    Auto,
    #[token("bool")]
    Bool,
    #[token("break")]
    Break,
    #[token("case")]
    Case,
    #[token("catch")]
    Catch,
    #[token("char")]
    Char,
    #[token("char8_t")]
    Char8T,
    #[token("char16_t")]
    Char16T,
    #[token("char32_t")]
    Char32T,
    #[token("class")]
    Class,
    #[token("concept")]
    Concept,
    #[token("const")]
    Const,
    #[token("consteval")]
    Consteval,
    #[token("constexpr")]
    Constexpr,
    #[token("constinit")]
    Constinit,
    #[token("const_cast")]
    ConstCast,
    #[token("continue")]
    Continue,
    #[token("decltype")]
    Decltype,
    #[token("default")]
    Default,
    #[token("delete")]
    Delete,
    #[token("do")]
    Do,
    #[token("double")]
    Double,
    #[token("dynamic_cast")]
    DynamicCast,
    #[token("else")]
    Else,
    #[token("enum")]
    Enum,
    #[token("explicit")]
    Explicit,
    #[token("export")]
    Export,
    #[token("extern")]
    Extern,
    #[token("false")]
    False,
    #[token("final")]
    Final,
    #[token("float")]
    Float,
    #[token("for")]
    For,
    #[token("friend")]
    Friend,
    #[token("goto")]
    Goto,
    #[token("if")]
    If,
    #[token("inline")]
    Inline,
    #[token("int")]
    Int,
    #[token("long")]
    Long,
    #[token("mutable")]
    Mutable,
    #[token("namespace")]
    Namespace,
    #[token("new")]
    New,
    #[token("noexcept")]
    Noexcept,
    #[token("nullptr")]
    Nullptr,
    // Not a keyword, but treating it as one simplifies fundamental types.
    #[token("nullptr_t")]
    NullptrT,
    #[token("operator")]
    Operator,
    #[token("override")]
    Override,
    #[token("private")]
    Private,
    #[token("protected")]
    Protected,
    #[token("public")]
    Public,
    #[token("register")]
    Register,
    #[token("reinterpret_cast")]
    ReinterpretCast,
    #[token("requires")]
    Requires,
    #[token("return")]
    Return,
    #[token("short")]
    Short,
    #[token("signed")]
    Signed,
    #[token("sizeof")]
    Sizeof,
    #[token("static")]
    Static,
    #[token("static_assert")]
    StaticAssert,
    #[token("static_cast")]
    StaticCast,
    #[token("struct")]
    Struct,
    #[token("switch")]
    Switch,
    #[token("template")]
    Template,
    #[token("this")]
    This,
    #[token("thread_local")]
    ThreadLocal,
    #[token("throw")]
    Throw,
    #[token("true")]
    True,
    #[token("try")]
    Try,
    #[token("typedef")]
    Typedef,
    #[token("typeid")]
    Typeid,
    #[token("typename")]
    Typename,
    #[token("union")]
    Union,
    #[token("unsigned")]
    Unsigned,
    #[token("using")]
    Using,
    #[token("virtual")]
    Virtual,
    #[token("void")]
    Void,
    #[token("volatile")]
    Volatile,
    #[token("wchar_t")]
    WcharT,
    #[token("while")]
    While,

    // Vendor extension keywords
    #[token("__attribute__")]
    GnuAttribute,
    #[token("__declspec")]
    Declspec,
    #[token("__cdecl")]
    Cdecl,
    #[token("__clrcall")]
    Clrcall,
    #[token("__stdcall")]
    Stdcall,
    #[token("__fastcall")]
    Fastcall,
    #[token("__thiscall")]
    Thiscall,
    #[token("__vectorcall")]
    Vectorcall,

    // ============================================================
    // Literals
    // ============================================================
    /// pp-number: full spelling including base prefix, digit separators,
    /// exponent and user-defined-literal suffix. No value is computed.
    #[regex(r"[0-9]", lex_number)]
    #[regex(r"\.[0-9]", lex_number)]
    Number,

    /// Character literal with optional encoding prefix and UDL suffix.
    #[regex(r"(u8|u|U|L)?'([^'\\\n]|\\.)+'([A-Za-z_][A-Za-z0-9_]*)?")]
    CharLit,

    /// String literal. Raw strings are matched by the `R"` callback;
    /// adjacent literals are concatenated by the [`Lexer`] wrapper.
    #[regex(r#"(u8|u|U|L)?"([^"\\\n]|\\.)*"([A-Za-z_][A-Za-z0-9_]*)?"#)]
    #[regex(r#"(u8|u|U|L)?R""#, lex_raw_string)]
    StringLit,

    // ============================================================
    // Identifiers
    // ============================================================
    #[regex(r"([A-Za-z_]|\\u[0-9a-fA-F]{4}|\\U[0-9a-fA-F]{8})([A-Za-z0-9_]|\\u[0-9a-fA-F]{4}|\\U[0-9a-fA-F]{8})*")]
    Identifier,

    // ============================================================
    // Preprocessor lines and comments
    // ============================================================
    /// A full `#...` line, unparsed. `#line` directives and linemarkers are
    /// filtered out by the wrapper, which updates its location state.
    #[token("#", lex_pp_line)]
    #[token("%:", lex_pp_line)]
    PPLine,

    /// A doxygen comment (`///`, `//!`, `/**`, `/*!`). Plain comments are
    /// skipped; these are buffered by the wrapper and never reach the
    /// parser as tokens.
    #[regex(r"//[^\n]*", lex_line_comment)]
    #[token("/*", lex_block_comment)]
    DocComment,

    // ============================================================
    // Punctuators
    // ============================================================
    #[token("{")]
    #[token("<%")]
    LBrace,
    #[token("}")]
    #[token("%>")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    #[token(":>")]
    RBracket,

    #[token(";")]
    Semi,
    #[token(":")]
    Colon,
    #[token("::")]
    ColonColon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(".*")]
    DotStar,
    #[token("->")]
    Arrow,
    #[token("->*")]
    ArrowStar,
    #[token("...")]
    Ellipsis,
    #[token("?")]
    Question,
    #[token("~")]
    #[token("compl")]
    Tilde,
    #[token("!")]
    #[token("not")]
    Bang,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("^")]
    #[token("xor")]
    Caret,
    #[token("&")]
    #[token("bitand")]
    Amp,
    #[token("|")]
    #[token("bitor")]
    Pipe,

    #[token("=")]
    Eq,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("^=")]
    #[token("xor_eq")]
    CaretEq,
    #[token("&=")]
    #[token("and_eq")]
    AmpEq,
    #[token("|=")]
    #[token("or_eq")]
    PipeEq,
    #[token("<<=")]
    ShlEq,
    #[token(">>=")]
    ShrEq,

    #[token("==")]
    EqEq,
    #[token("!=")]
    #[token("not_eq")]
    BangEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<=>")]
    Spaceship,

    #[token("&&")]
    #[token("and")]
    AmpAmp,
    #[token("||")]
    #[token("or")]
    PipePipe,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,

    /// `<:` digraph, with the `<::` special case resolved by the callback.
    /// The wrapper rewrites this into `[` or `<` `::` depending on the
    /// matched slice.
    #[token("<:", lex_lt_digraph)]
    LtColonColon,

    // ============================================================
    // Special
    // ============================================================
    /// End of file marker (not produced by logos, added by the wrapper).
    Eof,

    /// Synthetic terminator for fenced lookahead groups; never produced by
    /// the lexer.
    GroupEnd,

    /// Lexer error.
    Error,
}

/// Consume the remainder of a pp-number after its first matched character.
///
/// pp-numbers swallow identifier characters, `.`, digit separators and
/// signed exponents, which covers hex floats and UDL suffixes without
/// computing any value.
fn lex_number(lex: &mut logos::Lexer<TokenKind>) {
    let bytes = lex.remainder().as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b @ (b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'.') => {
                i += 1;
                if matches!(b, b'e' | b'E' | b'p' | b'P')
                    && matches!(bytes.get(i), Some(&b'+') | Some(&b'-'))
                {
                    i += 1;
                }
            }
            b'\'' if matches!(
                bytes.get(i + 1),
                Some(c) if c.is_ascii_alphanumeric() || *c == b'_'
            ) =>
            {
                i += 2;
            }
            _ => break,
        }
    }
    lex.bump(i);
}

/// Consume a raw string literal after the `R"` (plus encoding prefix) has
/// matched. Errors if the closing `)delim"` never appears.
fn lex_raw_string(lex: &mut logos::Lexer<TokenKind>) -> Result<(), ()> {
    let rem = lex.remainder();
    let open = rem.find('(').ok_or(())?;
    if open > 16 {
        return Err(());
    }
    let delim = &rem[..open];
    if delim.contains([' ', ')', '\\', '\n']) {
        return Err(());
    }
    let terminator = format!("){delim}\"");
    let body = &rem[open + 1..];
    let close = body.find(&terminator).ok_or(())?;
    let mut len = open + 1 + close + terminator.len();

    // optional UDL suffix
    let suffix = &rem[len..];
    let mut chars = suffix.chars();
    if let Some(c) = chars.next() {
        if c.is_ascii_alphabetic() || c == '_' {
            len += 1;
            for c in chars {
                if c.is_ascii_alphanumeric() || c == '_' {
                    len += 1;
                } else {
                    break;
                }
            }
        }
    }

    lex.bump(len);
    Ok(())
}

/// Consume a `#` line up to (not including) the newline. The wrapper
/// decides whether it is a linemarker or a directive worth surfacing.
fn lex_pp_line(lex: &mut logos::Lexer<TokenKind>) {
    let rem = lex.remainder();
    let end = rem.find('\n').unwrap_or(rem.len());
    lex.bump(end);
}

/// Line comments: emit doxygen forms, skip the rest.
fn lex_line_comment(lex: &mut logos::Lexer<TokenKind>) -> Filter<()> {
    let s = lex.slice();
    if s.starts_with("///") || s.starts_with("//!") {
        Filter::Emit(())
    } else {
        Filter::Skip
    }
}

/// Block comments (non-nesting). Doxygen forms are emitted; unterminated
/// comments are emitted too and flagged as errors by the wrapper.
fn lex_block_comment(lex: &mut logos::Lexer<TokenKind>) -> Filter<()> {
    let rem = lex.remainder();
    match rem.find("*/") {
        Some(pos) => {
            lex.bump(pos + 2);
            let s = lex.slice();
            if s.starts_with("/**") && s != "/**/" || s.starts_with("/*!") {
                Filter::Emit(())
            } else {
                Filter::Skip
            }
        }
        None => {
            lex.bump(rem.len());
            Filter::Emit(())
        }
    }
}

/// `<:` digraph handling per the `<::` rule: `<::` followed by anything
/// other than `:` or `>` lexes as `<` `::`, otherwise `<:` is `[`.
fn lex_lt_digraph(lex: &mut logos::Lexer<TokenKind>) {
    let rem = lex.remainder().as_bytes();
    if rem.first() == Some(&b':') && !matches!(rem.get(1), Some(&b':') | Some(&b'>')) {
        lex.bump(1);
    }
}

impl TokenKind {
    /// The fixed spelling of a keyword or punctuator, if it has one.
    pub fn token_str(self) -> Option<&'static str> {
        use TokenKind::*;
        Some(match self {
            Alignas => "alignas",
            Alignof => "alignof",
            Asm => "asm",
            Auto => "auto",
            Bool => "bool",
            Break => "break",
            Case => "case",
            Catch => "catch",
            Char => "char",
            Char8T => "char8_t",
            Char16T => "char16_t",
            Char32T => "char32_t",
            Class => "class",
            Concept => "concept",
            Const => "const",
            Consteval => "consteval",
            Constexpr => "constexpr",
            Constinit => "constinit",
            ConstCast => "const_cast",
            Continue => "continue",
            Decltype => "decltype",
            Default => "default",
            Delete => "delete",
            Do => "do",
            Double => "double",
            DynamicCast => "dynamic_cast",
            Else => "else",
            Enum => "enum",
            Explicit => "explicit",
            Export => "export",
            Extern => "extern",
            False => "false",
            Final => "final",
            Float => "float",
            For => "for",
            Friend => "friend",
            Goto => "goto",
            If => "if",
            Inline => "inline",
            Int => "int",
            Long => "long",
            Mutable => "mutable",
            Namespace => "namespace",
            New => "new",
            Noexcept => "noexcept",
            Nullptr => "nullptr",
            NullptrT => "nullptr_t",
            Operator => "operator",
            Override => "override",
            Private => "private",
            Protected => "protected",
            Public => "public",
            Register => "register",
            ReinterpretCast => "reinterpret_cast",
            Requires => "requires",
            Return => "return",
            Short => "short",
            Signed => "signed",
            Sizeof => "sizeof",
            Static => "static",
            StaticAssert => "static_assert",
            StaticCast => "static_cast",
            Struct => "struct",
            Switch => "switch",
            Template => "template",
            This => "this",
            ThreadLocal => "thread_local",
            Throw => "throw",
            True => "true",
            Try => "try",
            Typedef => "typedef",
            Typeid => "typeid",
            Typename => "typename",
            Union => "union",
            Unsigned => "unsigned",
            Using => "using",
            Virtual => "virtual",
            Void => "void",
            Volatile => "volatile",
            WcharT => "wchar_t",
            While => "while",
            GnuAttribute => "__attribute__",
            Declspec => "__declspec",
            Cdecl => "__cdecl",
            Clrcall => "__clrcall",
            Stdcall => "__stdcall",
            Fastcall => "__fastcall",
            Thiscall => "__thiscall",
            Vectorcall => "__vectorcall",
            LBrace => "{",
            RBrace => "}",
            LParen => "(",
            RParen => ")",
            LBracket => "[",
            RBracket => "]",
            Semi => ";",
            Colon => ":",
            ColonColon => "::",
            Comma => ",",
            Dot => ".",
            DotStar => ".*",
            Arrow => "->",
            ArrowStar => "->*",
            Ellipsis => "...",
            Question => "?",
            Tilde => "~",
            Bang => "!",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            Caret => "^",
            Amp => "&",
            Pipe => "|",
            Eq => "=",
            PlusEq => "+=",
            MinusEq => "-=",
            StarEq => "*=",
            SlashEq => "/=",
            PercentEq => "%=",
            CaretEq => "^=",
            AmpEq => "&=",
            PipeEq => "|=",
            ShlEq => "<<=",
            ShrEq => ">>=",
            EqEq => "==",
            BangEq => "!=",
            Lt => "<",
            Gt => ">",
            LtEq => "<=",
            GtEq => ">=",
            Spaceship => "<=>",
            AmpAmp => "&&",
            PipePipe => "||",
            Shl => "<<",
            Shr => ">>",
            PlusPlus => "++",
            MinusMinus => "--",
            _ => return None,
        })
    }

    /// A human-readable name for "expected X" messages.
    pub fn describe(self) -> String {
        match self {
            TokenKind::Identifier => "identifier".into(),
            TokenKind::Number => "number".into(),
            TokenKind::CharLit => "character literal".into(),
            TokenKind::StringLit => "string literal".into(),
            TokenKind::PPLine => "preprocessor line".into(),
            TokenKind::DocComment => "comment".into(),
            TokenKind::Eof => "end of file".into(),
            TokenKind::GroupEnd | TokenKind::Error => "token".into(),
            TokenKind::LtColonColon => "'['".into(),
            other => match other.token_str() {
                Some(s) => format!("'{s}'"),
                None => "token".into(),
            },
        }
    }

    /// Fundamental type keywords that may appear in any order as a group.
    pub fn is_compound_fundamental(self) -> bool {
        matches!(
            self,
            TokenKind::Unsigned
                | TokenKind::Signed
                | TokenKind::Short
                | TokenKind::Int
                | TokenKind::Long
                | TokenKind::Float
                | TokenKind::Double
                | TokenKind::Char
        )
    }

    /// All fundamental type keywords.
    pub fn is_fundamental(self) -> bool {
        self.is_compound_fundamental()
            || matches!(
                self,
                TokenKind::Bool
                    | TokenKind::Char8T
                    | TokenKind::Char16T
                    | TokenKind::Char32T
                    | TokenKind::NullptrT
                    | TokenKind::WcharT
                    | TokenKind::Void
            )
    }

    /// Class keys that can start an elaborated type specifier.
    pub fn is_class_key(self) -> bool {
        matches!(
            self,
            TokenKind::Struct | TokenKind::Enum | TokenKind::Class | TokenKind::Union
        )
    }

    /// Tokens that can start a possibly-qualified name.
    pub fn is_pqname_start(self) -> bool {
        matches!(
            self,
            TokenKind::Identifier
                | TokenKind::Auto
                | TokenKind::Decltype
                | TokenKind::Operator
                | TokenKind::Template
                | TokenKind::Typename
                | TokenKind::ColonColon
                | TokenKind::Tilde
                | TokenKind::Final
                | TokenKind::Override
        ) || self.is_class_key()
            || self.is_fundamental()
    }

    /// MSVC calling-convention keywords.
    pub fn is_msvc_convention(self) -> bool {
        matches!(
            self,
            TokenKind::Cdecl
                | TokenKind::Clrcall
                | TokenKind::Stdcall
                | TokenKind::Fastcall
                | TokenKind::Thiscall
                | TokenKind::Vectorcall
        )
    }
}

/// A token with its kind, span in the cleaned text, and source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub location: Location,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, location: Location) -> Self {
        Self {
            kind,
            span,
            location,
        }
    }
}

/// The lexer wrapper.
///
/// Wraps the generated lexer and layers on the behavior that needs state:
/// location computation (honoring `#line` and linemarkers), adjacent
/// string-literal concatenation, doxygen comment buffering, and the digraph
/// split for `<::`.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    source: &'src SourceText,
    /// Filename reported for subsequent tokens; changed by `#line`.
    filename: Arc<str>,
    /// physical line - reported line.
    line_offset: i64,
    pending: VecDeque<Token>,
    retain_doxygen: bool,
    comments: Vec<String>,
    comments_start_line: u32,
    comments_end_line: u32,
    finished: bool,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer over cleaned source text.
    pub fn new(source: &'src SourceText, retain_doxygen: bool) -> Self {
        Self {
            inner: TokenKind::lexer(source.text()),
            source,
            filename: source.filename().clone(),
            line_offset: 0,
            pending: VecDeque::new(),
            retain_doxygen,
            comments: Vec::new(),
            comments_start_line: 0,
            comments_end_line: 0,
            finished: false,
        }
    }

    /// Get the source text for a span.
    pub fn slice(&self, span: Span) -> &'src str {
        &self.source.text()[span.start..span.end]
    }

    /// Take the buffered doxygen comment, if any.
    pub fn take_doxygen(&mut self) -> Option<String> {
        if self.comments.is_empty() {
            return None;
        }
        let text = self.comments.join("\n");
        self.comments.clear();
        Some(text)
    }

    /// Take the buffered doxygen comment only if it ended on or before the
    /// given line. Guards against a declaration stealing the comment that
    /// belongs to the one after it.
    pub fn take_doxygen_before(&mut self, line: u32) -> Option<String> {
        if self.comments.is_empty() || self.comments_end_line > line {
            return None;
        }
        self.take_doxygen()
    }

    /// Take the buffered doxygen comment only if it started on the given
    /// line (trailing comments on fields and enumerators).
    pub fn take_doxygen_on_line(&mut self, line: u32) -> Option<String> {
        if self.comments.is_empty() || self.comments_start_line != line {
            return None;
        }
        self.take_doxygen()
    }

    /// Classify an error token into a lexical-error message.
    pub fn describe_error(&self, span: Span) -> &'static str {
        let rest = &self.source.text()[span.start..];
        if rest.starts_with("/*") {
            "unterminated block comment"
        } else if rest.starts_with('\'') || rest.starts_with("u8'") {
            "unterminated or malformed character literal"
        } else if rest.contains('"') {
            "unterminated string literal"
        } else {
            "unexpected character"
        }
    }

    fn location(&self, offset: usize) -> Location {
        let (line, col) = self.source.line_col(offset);
        let line = (i64::from(line) - self.line_offset).max(0) as u32;
        Location::new(self.filename.clone(), line, col)
    }

    /// Parse `#line N "file"` or a GCC linemarker `# N "file" flags`.
    /// Returns the directive's claimed line number and optional filename.
    fn parse_linemarker(content: &str) -> Option<(u32, Option<&str>)> {
        let rest = content.strip_prefix('#').or_else(|| content.strip_prefix("%:"))?;
        let rest = rest.trim_start();
        let rest = rest.strip_prefix("line").unwrap_or(rest);
        let rest = rest.trim_start();
        if !rest.starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let line: u32 = rest[..digits_end].parse().ok()?;
        let rest = rest[digits_end..].trim_start();
        let filename = rest
            .strip_prefix('"')
            .and_then(|r| r.split('"').next());
        Some((line, filename))
    }

    /// Record a doxygen comment for later attachment. Lines are recorded in
    /// the same adjusted coordinates as token locations so the parser can
    /// compare against them.
    fn record_comment(&mut self, span: Span) {
        if !self.retain_doxygen {
            return;
        }
        let start_line = self.location(span.start).line;
        let end_line = self.location(span.end.saturating_sub(1)).line;
        if !self.comments.is_empty() && start_line > self.comments_end_line + 1 {
            self.comments.clear();
        }
        if self.comments.is_empty() {
            self.comments_start_line = start_line;
        }
        let text = self.slice(span);
        for line in text.lines() {
            self.comments.push(line.trim().to_string());
        }
        self.comments_end_line = end_line;
    }

    /// Build a token to hand out, dropping any buffered doxygen comment
    /// that a blank line separates from this token.
    fn yield_token(&mut self, kind: TokenKind, span: Span) -> Token {
        let location = self.location(span.start);
        if !self.comments.is_empty() && location.line > self.comments_end_line + 1 {
            self.comments.clear();
        }
        Token::new(kind, span, location)
    }

    /// Produce the next token, applying linemarker, comment and digraph
    /// handling but not string concatenation.
    fn raw_next(&mut self) -> Option<Token> {
        loop {
            let (kind, span) = match self.inner.next() {
                Some(Ok(kind)) => (kind, Span::from(self.inner.span())),
                Some(Err(())) => {
                    let span = Span::from(self.inner.span());
                    return Some(self.yield_token(TokenKind::Error, span));
                }
                None => {
                    if self.finished {
                        return None;
                    }
                    self.finished = true;
                    let at = self.source.text().len();
                    return Some(self.yield_token(TokenKind::Eof, Span::new(at, at)));
                }
            };

            match kind {
                TokenKind::PPLine => {
                    let content = self.slice(span);
                    if let Some((line, filename)) = Self::parse_linemarker(content) {
                        // Physical line of the *next* line must report as `line`.
                        let (physical, _) = self.source.line_col(span.start);
                        self.line_offset = i64::from(physical) + 1 - i64::from(line);
                        if let Some(f) = filename {
                            self.filename = Arc::from(f);
                        }
                        continue;
                    }
                    return Some(self.yield_token(kind, span));
                }
                TokenKind::DocComment => {
                    let content = self.slice(span);
                    if content.starts_with("/*") && !(content.len() >= 4 && content.ends_with("*/"))
                    {
                        let location = self.location(span.start);
                        return Some(Token::new(TokenKind::Error, span, location));
                    }
                    self.record_comment(span);
                    continue;
                }
                TokenKind::LtColonColon => {
                    if span.len() == 2 {
                        // plain digraph
                        return Some(self.yield_token(TokenKind::LBracket, span));
                    }
                    // `<::X` lexes as `<` `::`
                    let colons = Span::new(span.start + 1, span.start + 3);
                    let colons_loc = self.location(colons.start);
                    self.pending
                        .push_front(Token::new(TokenKind::ColonColon, colons, colons_loc));
                    return Some(
                        self.yield_token(TokenKind::Lt, Span::new(span.start, span.start + 1)),
                    );
                }
                _ => return Some(self.yield_token(kind, span)),
            }
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if let Some(tok) = self.pending.pop_front() {
            return Some(tok);
        }

        let mut tok = self.raw_next()?;
        if tok.kind == TokenKind::StringLit {
            // Concatenate adjacent string literals into a single token.
            while let Some(next) = self.raw_next() {
                if next.kind == TokenKind::StringLit {
                    tok.span = tok.span.merge(next.span);
                } else {
                    self.pending.push_front(next);
                    break;
                }
            }
        }
        Some(tok)
    }
}

//! Abstract syntax tree for parsed C++ headers.
//!
//! This module defines the data structures that represent the declarations
//! a header introduces. The tree is serializable through serde in a
//! self-describing tagged form; every node carries the [`Location`] it was
//! found at (type nodes expose the location of their underlying name).
//!
//! # AST structure
//!
//! - [`Unit`] - root node for one parsed header
//! - [`Declaration`] - top-level and member declarations
//! - [`Type`] - decorated types (pointers, references, arrays, functions)
//! - [`QualifiedName`] - possibly qualified names with template arguments
//! - [`Value`] - opaque balanced token runs (default arguments, initializers,
//!   array sizes, bit-field widths, enumerator values, bodies)
//!
//! # Design notes
//!
//! - Node families are closed tagged enums; consumers dispatch exhaustively.
//! - No node references tokens owned by another node; captured token runs
//!   are standalone [`Value`]s.
//! - Fundamental types, `auto` and `decltype(...)` are name segments so that
//!   conversion operators, trailing return types and template arguments all
//!   go through one name representation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::lexer::TokenKind;
use crate::span::Location;

// ============================================================
// Opaque token runs
// ============================================================

/// A single captured token: its exact spelling and lexical kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub value: String,
    pub kind: TokenKind,
}

impl Token {
    pub fn new(value: impl Into<String>, kind: TokenKind) -> Self {
        Self {
            value: value.into(),
            kind,
        }
    }
}

/// An unparsed run of tokens.
///
/// ```c++
/// int x = 0x1337;
///         ~~~~~~
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Value {
    pub tokens: Vec<Token>,
}

impl Value {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl std::fmt::Display for Value {
    /// Re-emit the run with C++-ish spacing: words get spaced apart,
    /// punctuation mostly hugs its neighbors.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut last_right = 0u8;
        for tok in &self.tokens {
            let (left, right) = spacing(tok);
            if last_right + left >= 3 {
                f.write_str(" ")?;
            }
            f.write_str(&tok.value)?;
            last_right = right;
        }
        Ok(())
    }
}

/// (left, right) spacing weights; a pair of adjacent weights summing to 3 or
/// more gets a space between the tokens.
fn spacing(tok: &Token) -> (u8, u8) {
    match tok.kind {
        _ if tok.value == "operator" => (2, 0),
        TokenKind::Identifier
        | TokenKind::Number
        | TokenKind::CharLit
        | TokenKind::StringLit
        | TokenKind::Ellipsis => (2, 2),
        TokenKind::Gt => (0, 2),
        TokenKind::RParen => (0, 1),
        TokenKind::LParen => (1, 0),
        TokenKind::Comma => (0, 3),
        TokenKind::Star => (1, 2),
        TokenKind::Amp => (0, 2),
        kind if kind.token_str().map_or(false, |s| {
            s.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
        }) =>
        {
            (2, 2)
        }
        _ => (0, 0),
    }
}

// ============================================================
// Names
// ============================================================

/// The class-key of an elaborated type specifier or class definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassKey {
    Class,
    Struct,
    Union,
    Enum,
    EnumClass,
    EnumStruct,
}

impl ClassKey {
    pub fn as_str(self) -> &'static str {
        match self {
            ClassKey::Class => "class",
            ClassKey::Struct => "struct",
            ClassKey::Union => "union",
            ClassKey::Enum => "enum",
            ClassKey::EnumClass => "enum class",
            ClassKey::EnumStruct => "enum struct",
        }
    }

    pub fn is_enum(self) -> bool {
        matches!(
            self,
            ClassKey::Enum | ClassKey::EnumClass | ClassKey::EnumStruct
        )
    }

    /// The member access in effect at the top of a class body.
    pub fn default_access(self) -> Access {
        match self {
            ClassKey::Struct => Access::Public,
            _ => Access::Private,
        }
    }
}

/// One segment of a possibly qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NameSegment {
    /// A plain identifier, operator name (`operator+`), destructor name
    /// (`~Foo`), optionally with template arguments.
    Name {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        specialization: Option<TemplateSpecialization>,
    },
    /// A run of fundamental type keywords, canonical space-joined spelling.
    Fundamental { name: String },
    /// A name for an anonymous class or enum; ids are unique per parse.
    Anonymous { id: u32 },
    /// `auto` (or `decltype(auto)` spelled in the decltype segment).
    Auto,
    /// `decltype(...)` with the parenthesized tokens.
    Decltype { tokens: Value },
}

impl NameSegment {
    pub fn name(name: impl Into<String>) -> Self {
        NameSegment::Name {
            name: name.into(),
            specialization: None,
        }
    }

    /// The identifier of a plain name segment.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            NameSegment::Name { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Possibly qualified name of a C++ type or function.
///
/// Always has at least one segment. A name that refers to the global scope
/// (`::X`) begins with an empty [`NameSegment::Name`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualifiedName {
    pub segments: Vec<NameSegment>,
    /// Set when the name was written as an elaborated type specifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classkey: Option<ClassKey>,
    /// Set when the name was preceded by `typename`.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_typename: bool,
    pub location: Location,
}

impl QualifiedName {
    pub fn new(segments: Vec<NameSegment>, location: Location) -> Self {
        Self {
            segments,
            classkey: None,
            has_typename: false,
            location,
        }
    }

    /// The identifier of the last segment, when it is a plain name.
    pub fn last_name(&self) -> Option<&str> {
        self.segments.last().and_then(NameSegment::as_name)
    }

    /// Whether this is the single segment `auto`.
    pub fn is_auto(&self) -> bool {
        matches!(self.segments.as_slice(), [NameSegment::Auto])
    }
}

impl std::fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("::")?;
            }
            match seg {
                NameSegment::Name { name, .. } => f.write_str(name)?,
                NameSegment::Fundamental { name } => f.write_str(name)?,
                NameSegment::Anonymous { id } => write!(f, "<anonymous:{id}>")?,
                NameSegment::Auto => f.write_str("auto")?,
                NameSegment::Decltype { tokens } => write!(f, "decltype({tokens})")?,
            }
        }
        Ok(())
    }
}

// ============================================================
// Templates
// ============================================================

/// A single argument of a template-id.
///
/// ```c++
/// Foo<int, Bar...>
///     ~~~
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateArgument {
    pub arg: TemplateArgValue,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_pack: bool,
}

/// A template argument is stored as a type when it parses as one, and as an
/// unparsed token run otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateArgValue {
    Type(Box<Type>),
    Tokens(Value),
}

/// The arguments of a template-id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TemplateSpecialization {
    pub args: Vec<TemplateArgument>,
}

/// `template <typename T>` introducing a type parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateTypeParam {
    /// `typename` or `class`.
    pub typekey: String,
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_pack: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Set for a template template parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<Box<TemplateDecl>>,
}

/// A non-type template parameter: `template <int N>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateNonTypeParam {
    pub ty: Type,
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_pack: bool,
}

/// A parameter of a template declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateParam {
    Type(TemplateTypeParam),
    NonType(TemplateNonTypeParam),
}

/// A template parameter list, plus the `requires` clause if one followed it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TemplateDecl {
    pub params: Vec<TemplateParam>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_clause: Option<Value>,
}

// ============================================================
// Types
// ============================================================

/// Reference kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefKind {
    LValue,
    RValue,
}

/// A type with a (possibly qualified) name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedType {
    pub typename: QualifiedName,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_const: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_volatile: bool,
    /// Attribute sequences found in the specifier position.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
}

impl NamedType {
    pub fn new(typename: QualifiedName) -> Self {
        Self {
            typename,
            is_const: false,
            is_volatile: false,
            attributes: Vec::new(),
        }
    }
}

/// A pointer derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pointer {
    pub pointee: Box<Type>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_const: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_volatile: bool,
}

/// A reference derivation (`&` or `&&`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub referent: Box<Type>,
    pub kind: RefKind,
}

/// An array derivation; multidimensional arrays nest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Array {
    pub element: Box<Type>,
    /// `int x[10];` captures the `10`; `int x[];` has none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Value>,
}

/// A function type, used for function pointers and typedefs of functions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionType {
    pub return_type: Box<Type>,
    pub parameters: Vec<Parameter>,
    /// Set when the parameter list ends with `...`.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub vararg: bool,
    /// Set when spelled with a trailing return type; the recorded return
    /// type is the trailing one.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_trailing_return: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noexcept: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msvc_convention: Option<String>,
}

/// A pointer to member: `int C::* p` or `void (C::*fp)(int)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberPointer {
    /// The class whose member is pointed to.
    pub class_name: QualifiedName,
    pub pointee: Box<Type>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_const: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_volatile: bool,
}

/// A decorated type.
///
/// There can be at most one [`Type::Function`] in a chain, and references
/// cannot be further decorated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    Named(NamedType),
    Pointer(Pointer),
    Reference(Reference),
    Array(Array),
    Function(FunctionType),
    MemberPointer(MemberPointer),
}

impl Type {
    /// Shorthand for an undecorated named type.
    pub fn named(typename: QualifiedName) -> Self {
        Type::Named(NamedType::new(typename))
    }

    /// The location of the underlying name.
    pub fn location(&self) -> &Location {
        match self {
            Type::Named(t) => &t.typename.location,
            Type::Pointer(p) => p.pointee.location(),
            Type::Reference(r) => r.referent.location(),
            Type::Array(a) => a.element.location(),
            Type::Function(f) => f.return_type.location(),
            Type::MemberPointer(m) => &m.class_name.location,
        }
    }

    /// The named type at the root of the decoration chain, if the chain
    /// bottoms out in one.
    pub fn base_named(&self) -> Option<&NamedType> {
        match self {
            Type::Named(t) => Some(t),
            Type::Pointer(p) => p.pointee.base_named(),
            Type::Reference(r) => r.referent.base_named(),
            Type::Array(a) => a.element.base_named(),
            Type::Function(f) => f.return_type.base_named(),
            Type::MemberPointer(m) => m.pointee.base_named(),
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Type::Reference(_))
    }
}

/// A parameter of a function, method or template non-type parameter list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub ty: Type,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_pack: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
}

impl Parameter {
    pub fn new(ty: Type) -> Self {
        Self {
            ty,
            name: None,
            default: None,
            is_pack: false,
            attributes: Vec::new(),
        }
    }
}

// ============================================================
// Attributes
// ============================================================

/// The spelling family of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeKind {
    /// `[[ ... ]]`
    DoubleBracket,
    /// `alignas( ... )`
    Alignas,
    /// `__attribute__(( ... ))`
    Gnu,
    /// `__declspec( ... )`
    Declspec,
}

/// An attribute captured positionally; tokens include the introducer and
/// delimiters so the exact spelling is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub kind: AttributeKind,
    pub tokens: Value,
    pub location: Location,
}

// ============================================================
// Declarations
// ============================================================

/// Member access levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Access {
    Public,
    Protected,
    Private,
}

impl Access {
    pub fn as_str(self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Protected => "protected",
            Access::Private => "private",
        }
    }
}

/// Ref-qualifier on a member function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefQualifier {
    LValue,
    RValue,
}

/// The names introduced by a namespace definition.
///
/// ```c++
/// namespace foo::bar {}
///           ~~~~~~~~
/// ```
///
/// An anonymous namespace has no names; `is_nested` reports the `A::B` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceDecl {
    pub names: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_inline: bool,
    pub location: Location,
}

impl NamespaceDecl {
    pub fn is_nested(&self) -> bool {
        self.names.len() > 1
    }
}

/// A namespace definition with its body in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceScope {
    pub decl: NamespaceDecl,
    pub declarations: Vec<Declaration>,
}

/// Base class specifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseClass {
    pub access: Access,
    pub typename: QualifiedName,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_virtual: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_pack: bool,
}

/// Head of a class/struct/union definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub typename: QualifiedName,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bases: Vec<BaseClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplateDecl>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_final: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doxygen: Option<String>,
    /// Access level of this declaration when nested in another class.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<Access>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    pub location: Location,
}

impl ClassDecl {
    pub fn classkey(&self) -> Option<ClassKey> {
        self.typename.classkey
    }
}

/// A class definition and its members in source order. Each member carries
/// the access level in effect at its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassScope {
    pub decl: ClassDecl,
    pub members: Vec<Declaration>,
}

/// An individual enumerator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enumerator {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doxygen: Option<String>,
    pub location: Location,
}

/// An enumeration definition (scoped or unscoped).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDecl {
    pub typename: QualifiedName,
    pub values: Vec<Enumerator>,
    /// The underlying type, when specified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<QualifiedName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doxygen: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<Access>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    pub location: Location,
}

impl EnumDecl {
    pub fn is_scoped(&self) -> bool {
        matches!(
            self.typename.classkey,
            Some(ClassKey::EnumClass) | Some(ClassKey::EnumStruct)
        )
    }
}

/// A forward declaration of a user-defined type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardDecl {
    pub typename: QualifiedName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplateDecl>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doxygen: Option<String>,
    /// Set for an opaque enum declaration with an explicit base.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_base: Option<QualifiedName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<Access>,
    pub location: Location,
}

/// A function or method declaration, potentially with a captured body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
    /// Constructors and destructors have no return type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<Type>,
    pub name: QualifiedName,
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub vararg: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doxygen: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_constexpr: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_consteval: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_extern: bool,
    /// Linkage string when declared `extern "C"`-style inline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkage: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_static: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_inline: bool,

    /// True when the declaration included a body (captured below only when
    /// the options ask for it).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_body: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Constructor member-initializer list, captured unparsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_initializers: Option<Value>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_trailing_return: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplateDecl>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_clause: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throw: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noexcept: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msvc_convention: Option<String>,

    // Member-function state; meaningful only inside a class body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<Access>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_const: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_volatile: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_qualifier: Option<RefQualifier>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_constructor: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_destructor: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_explicit: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_defaulted: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_deleted: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_pure_virtual: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_virtual: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_final: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_override: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_friend: bool,

    /// The operator spelling for operator overloads (`+`, `()`, `""_id`);
    /// `"conversion"` for conversion operators, whose target type is the
    /// return type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    pub location: Location,
}

impl FunctionDecl {
    pub fn new(name: QualifiedName, location: Location) -> Self {
        Self {
            return_type: None,
            name,
            parameters: Vec::new(),
            vararg: false,
            doxygen: None,
            is_constexpr: false,
            is_consteval: false,
            is_extern: false,
            linkage: None,
            is_static: false,
            is_inline: false,
            has_body: false,
            body: None,
            member_initializers: None,
            has_trailing_return: false,
            template: None,
            requires_clause: None,
            throw: None,
            noexcept: None,
            msvc_convention: None,
            access: None,
            is_const: false,
            is_volatile: false,
            ref_qualifier: None,
            is_constructor: false,
            is_destructor: false,
            is_explicit: false,
            is_defaulted: false,
            is_deleted: false,
            is_pure_virtual: false,
            is_virtual: false,
            is_final: false,
            is_override: false,
            is_friend: false,
            operator: None,
            attributes: Vec::new(),
            location,
        }
    }

    /// Whether this is a conversion operator.
    pub fn is_conversion_operator(&self) -> bool {
        self.operator.as_deref() == Some("conversion")
    }

    /// Whether this is a user-defined literal operator.
    pub fn is_literal_operator(&self) -> bool {
        self.operator.as_deref().map_or(false, |op| op.starts_with("\"\""))
    }
}

/// A variable declaration or class data member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDecl {
    /// Absent only for anonymous bit-fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<QualifiedName>,
    pub ty: Type,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Bit-field width, captured unparsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bits: Option<Value>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_constexpr: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_constinit: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_extern: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkage: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_static: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_inline: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_thread_local: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_mutable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<Access>,
    /// Can occur for a static member of a templated class.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplateDecl>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doxygen: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    pub location: Location,
}

/// A structured binding declaration: `auto [a, b] = init;`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredBindingDecl {
    pub names: Vec<String>,
    /// The `auto` type with its cv and reference decorations.
    pub ty: Type,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_static: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_thread_local: bool,
    pub location: Location,
}

/// One alias introduced by a `typedef` declaration; `typedef int T, *PT;`
/// produces two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedefDecl {
    pub ty: Type,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<Access>,
    pub location: Location,
}

/// `using foo = int;`, possibly templated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsingAliasDecl {
    pub alias: String,
    pub ty: Type,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplateDecl>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<Access>,
    pub location: Location,
}

/// `using NS::name;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsingDecl {
    pub typename: QualifiedName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<Access>,
    pub location: Location,
}

/// `using namespace std;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsingDirectiveDecl {
    pub namespace: QualifiedName,
    pub location: Location,
}

/// `using enum Color;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsingEnumDecl {
    pub typename: QualifiedName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<Access>,
    pub location: Location,
}

/// `namespace A = B::C;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceAliasDecl {
    pub name: String,
    pub target: QualifiedName,
    pub location: Location,
}

/// The entity a friend declaration names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FriendTarget {
    Class(ForwardDecl),
    Function(Box<FunctionDecl>),
}

/// A friend declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendDecl {
    pub target: FriendTarget,
    pub access: Access,
    pub location: Location,
}

/// `static_assert(cond, "message");`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticAssertDecl {
    pub condition: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub location: Location,
}

/// `extern "C" { ... }` with its body in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternBlockScope {
    /// The linkage string with its quotes, e.g. `"C"`.
    pub linkage: String,
    pub declarations: Vec<Declaration>,
    pub location: Location,
}

/// An explicit (or extern) template instantiation, captured unparsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateInstantiationDecl {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_extern: bool,
    pub tokens: Value,
    pub location: Location,
}

/// `template <...> concept Name = constraint-expression;` with the
/// constraint captured unparsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptDecl {
    pub name: String,
    pub template: TemplateDecl,
    pub expression: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doxygen: Option<String>,
    pub location: Location,
}

/// The directive family of a surfaced preprocessor line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectiveKind {
    Include,
    Pragma,
    Define,
    Other,
}

/// A preprocessor line found at a declaration boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveDecl {
    pub kind: DirectiveKind,
    /// The directive's argument text, e.g. the `<vector>` of an include.
    pub content: String,
    /// The raw line.
    pub raw: String,
    pub location: Location,
}

/// Any declaration the parser can surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Declaration {
    Namespace(NamespaceScope),
    Class(ClassScope),
    Enum(EnumDecl),
    Function(Box<FunctionDecl>),
    Variable(Box<VariableDecl>),
    StructuredBinding(StructuredBindingDecl),
    Typedef(TypedefDecl),
    UsingAlias(UsingAliasDecl),
    UsingDeclaration(UsingDecl),
    UsingDirective(UsingDirectiveDecl),
    UsingEnum(UsingEnumDecl),
    NamespaceAlias(NamespaceAliasDecl),
    Forward(ForwardDecl),
    Friend(FriendDecl),
    StaticAssert(StaticAssertDecl),
    ExternBlock(ExternBlockScope),
    TemplateInstantiation(TemplateInstantiationDecl),
    Concept(ConceptDecl),
    Directive(DirectiveDecl),
}

impl Declaration {
    pub fn location(&self) -> &Location {
        match self {
            Declaration::Namespace(d) => &d.decl.location,
            Declaration::Class(d) => &d.decl.location,
            Declaration::Enum(d) => &d.location,
            Declaration::Function(d) => &d.location,
            Declaration::Variable(d) => &d.location,
            Declaration::StructuredBinding(d) => &d.location,
            Declaration::Typedef(d) => &d.location,
            Declaration::UsingAlias(d) => &d.location,
            Declaration::UsingDeclaration(d) => &d.location,
            Declaration::UsingDirective(d) => &d.location,
            Declaration::UsingEnum(d) => &d.location,
            Declaration::NamespaceAlias(d) => &d.location,
            Declaration::Forward(d) => &d.location,
            Declaration::Friend(d) => &d.location,
            Declaration::StaticAssert(d) => &d.location,
            Declaration::ExternBlock(d) => &d.location,
            Declaration::TemplateInstantiation(d) => &d.location,
            Declaration::Concept(d) => &d.location,
            Declaration::Directive(d) => &d.location,
        }
    }
}

/// The root of a parsed header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub filename: Arc<str>,
    pub declarations: Vec<Declaration>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TokenKind as K;

    fn toks(pairs: &[(&str, K)]) -> Value {
        Value::new(pairs.iter().map(|(v, k)| Token::new(*v, *k)).collect())
    }

    #[test]
    fn test_value_display_spacing() {
        let v = toks(&[
            ("const", K::Const),
            ("char", K::Char),
            ("*", K::Star),
            ("p", K::Identifier),
        ]);
        assert_eq!(v.to_string(), "const char * p");
    }

    #[test]
    fn test_value_display_template() {
        let v = toks(&[
            ("std", K::Identifier),
            ("::", K::ColonColon),
            ("vector", K::Identifier),
            ("<", K::Lt),
            ("int", K::Int),
            (">", K::Gt),
            ("v", K::Identifier),
        ]);
        assert_eq!(v.to_string(), "std::vector<int> v");
    }

    #[test]
    fn test_value_display_call() {
        let v = toks(&[
            ("f", K::Identifier),
            ("(", K::LParen),
            ("1", K::Number),
            (",", K::Comma),
            ("2", K::Number),
            (")", K::RParen),
        ]);
        assert_eq!(v.to_string(), "f (1, 2)");
    }

    #[test]
    fn test_qualified_name_display() {
        let name = QualifiedName::new(
            vec![NameSegment::name("std"), NameSegment::name("string")],
            Location::dummy(),
        );
        assert_eq!(name.to_string(), "std::string");
        assert_eq!(name.last_name(), Some("string"));
    }

    #[test]
    fn test_class_key_default_access() {
        assert_eq!(ClassKey::Struct.default_access(), Access::Public);
        assert_eq!(ClassKey::Class.default_access(), Access::Private);
        assert_eq!(ClassKey::Union.default_access(), Access::Private);
    }

    #[test]
    fn test_serialization_is_tagged() {
        let ty = Type::named(QualifiedName::new(
            vec![NameSegment::Fundamental { name: "int".into() }],
            Location::dummy(),
        ));
        let json = serde_json::to_value(&ty).unwrap();
        assert!(json.get("Named").is_some());
    }
}

//! The visitor contract the parser calls during parsing.
//!
//! Events arrive in source order. The default implementations do nothing,
//! so a consumer only overrides what it cares about; [`crate::collect`]
//! provides the visitor that assembles the AST.

use crate::ast::{
    ClassDecl, ConceptDecl, DirectiveDecl, EnumDecl, ForwardDecl, FriendDecl, FunctionDecl,
    NamespaceAliasDecl, NamespaceDecl, StaticAssertDecl, StructuredBindingDecl,
    TemplateInstantiationDecl, TypedefDecl, UsingAliasDecl, UsingDecl, UsingDirectiveDecl,
    UsingEnumDecl, VariableDecl,
};

/// Streaming consumer of parse events.
#[allow(unused_variables)]
pub trait Visitor {
    /// A `namespace` block was opened.
    fn enter_namespace(&mut self, ns: NamespaceDecl) {}
    /// The matching `}` of a namespace block was reached.
    fn exit_namespace(&mut self) {}

    /// A class/struct/union definition was opened. Member events follow
    /// until the matching [`Visitor::exit_class`].
    fn enter_class(&mut self, class: ClassDecl) {}
    /// The end of a class body. Trailing declarators (`struct X { } x;`)
    /// produce their own events after this.
    fn exit_class(&mut self) {}

    /// An `extern "..."` linkage block was opened.
    fn enter_extern_block(&mut self, linkage: String, location: crate::span::Location) {}
    /// The end of an `extern "..."` block.
    fn exit_extern_block(&mut self) {}

    fn on_function(&mut self, function: FunctionDecl) {}
    fn on_variable(&mut self, variable: VariableDecl) {}
    fn on_structured_binding(&mut self, binding: StructuredBindingDecl) {}
    fn on_typedef(&mut self, typedef: TypedefDecl) {}
    fn on_using_declaration(&mut self, using: UsingDecl) {}
    fn on_using_directive(&mut self, using: UsingDirectiveDecl) {}
    fn on_using_alias(&mut self, using: UsingAliasDecl) {}
    fn on_using_enum(&mut self, using: UsingEnumDecl) {}
    fn on_namespace_alias(&mut self, alias: NamespaceAliasDecl) {}
    fn on_forward_decl(&mut self, forward: ForwardDecl) {}
    fn on_friend(&mut self, friend: FriendDecl) {}
    fn on_enum(&mut self, decl: EnumDecl) {}
    fn on_static_assert(&mut self, assert: StaticAssertDecl) {}
    fn on_concept(&mut self, concept: ConceptDecl) {}
    fn on_template_instantiation(&mut self, inst: TemplateInstantiationDecl) {}
    /// A preprocessor line found at a declaration boundary.
    fn on_directive(&mut self, directive: DirectiveDecl) {}
}

/// A visitor that discards every event. Useful for syntax-checking runs.
#[derive(Debug, Default)]
pub struct NullVisitor;

impl Visitor for NullVisitor {}

//! The default visitor: collects parse events into a [`Unit`] tree.
//!
//! [`parse_string`] and [`parse_file`] are the main entry points:
//!
//! ```rust
//! use cxxparse::parse_string;
//!
//! let parsed = parse_string("int x = 3;", None, None).expect("parse failed");
//! assert_eq!(parsed.unit.declarations.len(), 1);
//! ```

use std::sync::Arc;

use crate::ast::{
    ClassDecl, ClassScope, ConceptDecl, Declaration, DirectiveDecl, EnumDecl, ExternBlockScope,
    ForwardDecl, FriendDecl, FunctionDecl, NamespaceAliasDecl, NamespaceDecl, NamespaceScope,
    StaticAssertDecl, StructuredBindingDecl, TemplateInstantiationDecl, TypedefDecl, Unit,
    UsingAliasDecl, UsingDecl, UsingDirectiveDecl, UsingEnumDecl, VariableDecl,
};
use crate::diagnostics::{Diagnostic, ParseError};
use crate::options::ParserOptions;
use crate::parser::Parser;
use crate::source::SourceText;
use crate::span::Location;
use crate::visitor::Visitor;

/// An open container that declarations accumulate into.
enum Container {
    Namespace(NamespaceScope),
    Class(ClassScope),
    Extern(ExternBlockScope),
}

/// Builds the AST from parse events. This is the visitor behind
/// [`parse_string`]; use it directly when driving [`Parser`] yourself.
pub struct AstVisitor {
    filename: Arc<str>,
    declarations: Vec<Declaration>,
    stack: Vec<Container>,
}

impl AstVisitor {
    pub fn new(filename: Arc<str>) -> Self {
        Self {
            filename,
            declarations: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn push_decl(&mut self, decl: Declaration) {
        match self.stack.last_mut() {
            Some(Container::Namespace(ns)) => ns.declarations.push(decl),
            Some(Container::Class(class)) => class.members.push(decl),
            Some(Container::Extern(block)) => block.declarations.push(decl),
            None => self.declarations.push(decl),
        }
    }

    fn pop_container(&mut self) {
        let decl = match self.stack.pop() {
            Some(Container::Namespace(ns)) => Declaration::Namespace(ns),
            Some(Container::Class(class)) => Declaration::Class(class),
            Some(Container::Extern(block)) => Declaration::ExternBlock(block),
            None => return,
        };
        self.push_decl(decl);
    }

    /// Close any open containers and return the collected tree. Called
    /// both on success and to produce the partial AST for a failure.
    pub fn finish(mut self) -> Unit {
        while !self.stack.is_empty() {
            self.pop_container();
        }
        Unit {
            filename: self.filename,
            declarations: self.declarations,
        }
    }
}

impl Visitor for AstVisitor {
    fn enter_namespace(&mut self, ns: NamespaceDecl) {
        self.stack.push(Container::Namespace(NamespaceScope {
            decl: ns,
            declarations: Vec::new(),
        }));
    }

    fn exit_namespace(&mut self) {
        self.pop_container();
    }

    fn enter_class(&mut self, class: ClassDecl) {
        self.stack.push(Container::Class(ClassScope {
            decl: class,
            members: Vec::new(),
        }));
    }

    fn exit_class(&mut self) {
        self.pop_container();
    }

    fn enter_extern_block(&mut self, linkage: String, location: Location) {
        self.stack.push(Container::Extern(ExternBlockScope {
            linkage,
            declarations: Vec::new(),
            location,
        }));
    }

    fn exit_extern_block(&mut self) {
        self.pop_container();
    }

    fn on_function(&mut self, function: FunctionDecl) {
        self.push_decl(Declaration::Function(Box::new(function)));
    }

    fn on_variable(&mut self, variable: VariableDecl) {
        self.push_decl(Declaration::Variable(Box::new(variable)));
    }

    fn on_structured_binding(&mut self, binding: StructuredBindingDecl) {
        self.push_decl(Declaration::StructuredBinding(binding));
    }

    fn on_typedef(&mut self, typedef: TypedefDecl) {
        self.push_decl(Declaration::Typedef(typedef));
    }

    fn on_using_declaration(&mut self, using: UsingDecl) {
        self.push_decl(Declaration::UsingDeclaration(using));
    }

    fn on_using_directive(&mut self, using: UsingDirectiveDecl) {
        self.push_decl(Declaration::UsingDirective(using));
    }

    fn on_using_alias(&mut self, using: UsingAliasDecl) {
        self.push_decl(Declaration::UsingAlias(using));
    }

    fn on_using_enum(&mut self, using: UsingEnumDecl) {
        self.push_decl(Declaration::UsingEnum(using));
    }

    fn on_namespace_alias(&mut self, alias: NamespaceAliasDecl) {
        self.push_decl(Declaration::NamespaceAlias(alias));
    }

    fn on_forward_decl(&mut self, forward: ForwardDecl) {
        self.push_decl(Declaration::Forward(forward));
    }

    fn on_friend(&mut self, friend: FriendDecl) {
        self.push_decl(Declaration::Friend(friend));
    }

    fn on_enum(&mut self, decl: EnumDecl) {
        self.push_decl(Declaration::Enum(decl));
    }

    fn on_static_assert(&mut self, assert: StaticAssertDecl) {
        self.push_decl(Declaration::StaticAssert(assert));
    }

    fn on_concept(&mut self, concept: ConceptDecl) {
        self.push_decl(Declaration::Concept(concept));
    }

    fn on_template_instantiation(&mut self, inst: TemplateInstantiationDecl) {
        self.push_decl(Declaration::TemplateInstantiation(inst));
    }

    fn on_directive(&mut self, directive: DirectiveDecl) {
        self.push_decl(Declaration::Directive(directive));
    }
}

/// A successful parse: the tree plus any recoverable diagnostics.
#[derive(Debug)]
pub struct ParsedUnit {
    pub unit: Unit,
    pub diagnostics: Vec<Diagnostic>,
}

/// A failed parse: the error plus the tree built up to the failure point.
#[derive(Debug)]
pub struct ParseFailure {
    pub error: ParseError,
    pub partial: Unit,
    pub diagnostics: Vec<Diagnostic>,
}

impl std::fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.error.fmt(f)
    }
}

impl std::error::Error for ParseFailure {}

/// Parse a header from a string.
pub fn parse_string(
    content: &str,
    filename: Option<&str>,
    options: Option<ParserOptions>,
) -> Result<ParsedUnit, Box<ParseFailure>> {
    let source = SourceText::new(filename.unwrap_or("<str>"), content);
    let mut visitor = AstVisitor::new(source.filename().clone());
    let mut parser = Parser::new(&source, &mut visitor, options.unwrap_or_default());

    let result = parser.parse();
    let diagnostics = parser.take_diagnostics();

    match result {
        Ok(()) => Ok(ParsedUnit {
            unit: visitor.finish(),
            diagnostics,
        }),
        Err(error) => Err(Box::new(ParseFailure {
            error,
            partial: visitor.finish(),
            diagnostics,
        })),
    }
}

/// Parse a header from a file. A filename of `-` reads standard input.
pub fn parse_file(
    filename: &str,
    options: Option<ParserOptions>,
) -> std::io::Result<Result<ParsedUnit, Box<ParseFailure>>> {
    let content = if filename == "-" {
        std::io::read_to_string(std::io::stdin())?
    } else {
        std::fs::read_to_string(filename)?
    };
    Ok(parse_string(&content, Some(filename), options))
}

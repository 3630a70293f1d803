//! Parser tests.
//!
//! Most tests parse a small header through the collecting entry point and
//! assert on the resulting tree.

use crate::ast::*;
use crate::collect::{parse_string, ParseFailure, ParsedUnit};
use crate::diagnostics::ErrorCode;
use crate::options::{MethodBody, ParserOptions, PreprocessorLines};

fn parse(source: &str) -> Unit {
    parse_string(source, None, None)
        .unwrap_or_else(|e| panic!("parse failed: {e}"))
        .unit
}

fn parse_opts(source: &str, options: ParserOptions) -> ParsedUnit {
    parse_string(source, None, Some(options)).unwrap_or_else(|e| panic!("parse failed: {e}"))
}

fn parse_err(source: &str) -> Box<ParseFailure> {
    match parse_string(source, None, None) {
        Ok(parsed) => panic!("expected failure, got: {:#?}", parsed.unit),
        Err(failure) => failure,
    }
}

fn decls(source: &str) -> Vec<Declaration> {
    parse(source).declarations
}

fn one(source: &str) -> Declaration {
    let mut ds = decls(source);
    assert_eq!(ds.len(), 1, "expected one declaration: {ds:#?}");
    ds.remove(0)
}

fn as_variable(d: &Declaration) -> &VariableDecl {
    match d {
        Declaration::Variable(v) => v,
        other => panic!("expected a variable, got {other:#?}"),
    }
}

fn as_function(d: &Declaration) -> &FunctionDecl {
    match d {
        Declaration::Function(f) => f,
        other => panic!("expected a function, got {other:#?}"),
    }
}

fn as_class(d: &Declaration) -> &ClassScope {
    match d {
        Declaration::Class(c) => c,
        other => panic!("expected a class, got {other:#?}"),
    }
}

fn as_namespace(d: &Declaration) -> &NamespaceScope {
    match d {
        Declaration::Namespace(ns) => ns,
        other => panic!("expected a namespace, got {other:#?}"),
    }
}

fn as_enum(d: &Declaration) -> &EnumDecl {
    match d {
        Declaration::Enum(e) => e,
        other => panic!("expected an enum, got {other:#?}"),
    }
}

fn as_typedef(d: &Declaration) -> &TypedefDecl {
    match d {
        Declaration::Typedef(t) => t,
        other => panic!("expected a typedef, got {other:#?}"),
    }
}

/// The base name at the root of a decorated type.
fn base_name(ty: &Type) -> String {
    ty.base_named()
        .unwrap_or_else(|| panic!("no base name: {ty:#?}"))
        .typename
        .to_string()
}

fn value_str(v: &Value) -> String {
    v.to_string()
}

fn tok_values(v: &Value) -> Vec<&str> {
    v.tokens.iter().map(|t| t.value.as_str()).collect()
}

fn var_name(v: &VariableDecl) -> String {
    v.name.as_ref().expect("unnamed variable").to_string()
}

// ============================================================
// Variables
// ============================================================

#[test]
fn test_simple_variable() {
    let d = one("int x = 3;");
    let v = as_variable(&d);
    assert_eq!(var_name(v), "x");
    assert_eq!(base_name(&v.ty), "int");
    assert_eq!(value_str(v.value.as_ref().unwrap()), "3");
    assert!(matches!(
        &v.ty,
        Type::Named(named)
            if matches!(&named.typename.segments[0], NameSegment::Fundamental { name } if name == "int")
    ));
    assert_eq!(v.location.line, 1);
}

#[test]
fn test_multiple_declarators() {
    let ds = decls("int a, *b, c[2];");
    assert_eq!(ds.len(), 3);
    assert_eq!(var_name(as_variable(&ds[0])), "a");
    assert!(matches!(&as_variable(&ds[1]).ty, Type::Pointer(_)));
    let c = as_variable(&ds[2]);
    match &c.ty {
        Type::Array(arr) => {
            assert_eq!(value_str(arr.size.as_ref().unwrap()), "2");
        }
        other => panic!("expected an array, got {other:#?}"),
    }
}

#[test]
fn test_cv_qualifiers() {
    let d = one("const char* p;");
    let v = as_variable(&d);
    match &v.ty {
        Type::Pointer(p) => {
            assert!(!p.is_const);
            match &*p.pointee {
                Type::Named(named) => assert!(named.is_const),
                other => panic!("expected a named type, got {other:#?}"),
            }
        }
        other => panic!("expected a pointer, got {other:#?}"),
    }
}

#[test]
fn test_east_const() {
    let d = one("char const* p;");
    let v = as_variable(&d);
    match &v.ty {
        Type::Pointer(p) => match &*p.pointee {
            Type::Named(named) => assert!(named.is_const),
            other => panic!("expected a named type, got {other:#?}"),
        },
        other => panic!("expected a pointer, got {other:#?}"),
    }
}

#[test]
fn test_const_pointer() {
    let d = one("char* const p = nullptr;");
    let v = as_variable(&d);
    match &v.ty {
        Type::Pointer(p) => assert!(p.is_const),
        other => panic!("expected a pointer, got {other:#?}"),
    }
}

#[test]
fn test_references() {
    let ds = decls("int& r = x;\nint&& rr = f();");
    match &as_variable(&ds[0]).ty {
        Type::Reference(r) => assert_eq!(r.kind, RefKind::LValue),
        other => panic!("expected a reference, got {other:#?}"),
    }
    match &as_variable(&ds[1]).ty {
        Type::Reference(r) => assert_eq!(r.kind, RefKind::RValue),
        other => panic!("expected a reference, got {other:#?}"),
    }
}

#[test]
fn test_multidimensional_array() {
    let d = one("char buf[10][20];");
    let v = as_variable(&d);
    match &v.ty {
        Type::Array(outer) => {
            assert_eq!(value_str(outer.size.as_ref().unwrap()), "10");
            match &*outer.element {
                Type::Array(inner) => {
                    assert_eq!(value_str(inner.size.as_ref().unwrap()), "20");
                    assert_eq!(base_name(&inner.element), "char");
                }
                other => panic!("expected a nested array, got {other:#?}"),
            }
        }
        other => panic!("expected an array, got {other:#?}"),
    }
}

#[test]
fn test_static_constexpr_variable() {
    let d = one("static constexpr int kLimit = 64;");
    let v = as_variable(&d);
    assert!(v.is_static);
    assert!(v.is_constexpr);
    assert!(!v.is_extern);
}

#[test]
fn test_extern_variable_with_linkage() {
    let d = one("extern \"C\" int errno_shim;");
    let v = as_variable(&d);
    assert!(v.is_extern);
    assert_eq!(v.linkage.as_deref(), Some("\"C\""));
}

#[test]
fn test_thread_local_variable() {
    let d = one("static thread_local int counter;");
    let v = as_variable(&d);
    assert!(v.is_static);
    assert!(v.is_thread_local);
}

#[test]
fn test_brace_initializer() {
    let d = one("int x{42};");
    let v = as_variable(&d);
    assert_eq!(value_str(v.value.as_ref().unwrap()), "{42}");
}

#[test]
fn test_constructor_style_initializer() {
    // `Foo x(3)` cannot be a parameter clause, so it is an initializer
    let d = one("Foo x(3);");
    let v = as_variable(&d);
    assert_eq!(var_name(v), "x");
    assert_eq!(base_name(&v.ty), "Foo");
    assert_eq!(value_str(v.value.as_ref().unwrap()), "3");
}

// ============================================================
// Functions
// ============================================================

#[test]
fn test_function_with_defaults_and_noexcept() {
    let d = one("int f(int x, const char* s = \"hi\") noexcept;");
    let f = as_function(&d);
    assert_eq!(f.name.to_string(), "f");
    assert_eq!(base_name(f.return_type.as_ref().unwrap()), "int");
    assert_eq!(f.parameters.len(), 2);
    assert_eq!(f.parameters[0].name.as_deref(), Some("x"));
    assert_eq!(f.parameters[1].name.as_deref(), Some("s"));
    assert_eq!(
        value_str(f.parameters[1].default.as_ref().unwrap()),
        "\"hi\""
    );
    assert!(f.noexcept.is_some());
    assert!(!f.has_body);
}

#[test]
fn test_function_with_body() {
    let d = one("inline int f() { return 1; }");
    let f = as_function(&d);
    assert!(f.is_inline);
    assert!(f.has_body);
    assert!(f.body.is_none());
}

#[test]
fn test_function_body_retained() {
    let options = ParserOptions {
        method_body: MethodBody::RetainTokens,
        ..ParserOptions::default()
    };
    let parsed = parse_opts("int f() { return 1; }", options);
    let f = as_function(&parsed.unit.declarations[0]);
    assert!(f.has_body);
    assert_eq!(value_str(f.body.as_ref().unwrap()), "return 1;");
}

#[test]
fn test_void_parameter_is_dropped() {
    let d = one("int f(void);");
    assert!(as_function(&d).parameters.is_empty());
}

#[test]
fn test_void_parameter_retained_when_disabled() {
    let options = ParserOptions {
        convert_void_to_zero_params: false,
        ..ParserOptions::default()
    };
    let parsed = parse_opts("int f(void);", options);
    assert_eq!(as_function(&parsed.unit.declarations[0]).parameters.len(), 1);
}

#[test]
fn test_vararg_function() {
    let d = one("int printf(const char* fmt, ...);");
    let f = as_function(&d);
    assert!(f.vararg);
    assert_eq!(f.parameters.len(), 1);
}

#[test]
fn test_trailing_return_type() {
    let ds = decls("auto f() -> int;");
    let f = as_function(&ds[0]);
    assert!(f.has_trailing_return);
    assert_eq!(base_name(f.return_type.as_ref().unwrap()), "int");
}

#[test]
fn test_trailing_return_with_body() {
    let ds = decls("auto f() -> double { return 1.5; }");
    let f = as_function(&ds[0]);
    assert!(f.has_trailing_return);
    assert!(f.has_body);
}

#[test]
fn test_noexcept_with_expression() {
    let d = one("void f() noexcept(sizeof(int) == 4);");
    let f = as_function(&d);
    assert_eq!(
        tok_values(f.noexcept.as_ref().unwrap()),
        vec!["sizeof", "(", "int", ")", "==", "4"]
    );
}

#[test]
fn test_function_returning_pointer() {
    let d = one("const char* name();");
    let f = as_function(&d);
    assert!(matches!(f.return_type.as_ref().unwrap(), Type::Pointer(_)));
}

#[test]
fn test_function_taking_type_not_misread_as_variable() {
    let d = one("Foo f(Bar);");
    let f = as_function(&d);
    assert_eq!(f.parameters.len(), 1);
    assert_eq!(base_name(&f.parameters[0].ty), "Bar");
}

#[test]
fn test_out_of_line_method() {
    let d = one("void Foo::bar(int x);");
    let f = as_function(&d);
    assert_eq!(f.name.to_string(), "Foo::bar");
}

#[test]
fn test_msvc_calling_convention() {
    let d = one("void __cdecl f();");
    assert_eq!(as_function(&d).msvc_convention.as_deref(), Some("__cdecl"));
}

#[test]
fn test_function_pointer_variable() {
    let d = one("int (*fp)(char, double);");
    let v = as_variable(&d);
    assert_eq!(var_name(v), "fp");
    match &v.ty {
        Type::Pointer(p) => match &*p.pointee {
            Type::Function(f) => {
                assert_eq!(f.parameters.len(), 2);
                assert_eq!(base_name(&f.return_type), "int");
            }
            other => panic!("expected a function type, got {other:#?}"),
        },
        other => panic!("expected a pointer, got {other:#?}"),
    }
}

#[test]
fn test_msvc_function_pointer() {
    let d = one("void (__stdcall *fp)(int);");
    let v = as_variable(&d);
    match &v.ty {
        Type::Pointer(p) => match &*p.pointee {
            Type::Function(f) => {
                assert_eq!(f.msvc_convention.as_deref(), Some("__stdcall"));
            }
            other => panic!("expected a function type, got {other:#?}"),
        },
        other => panic!("expected a pointer, got {other:#?}"),
    }
}

#[test]
fn test_member_pointer_variable() {
    let d = one("int C::* p;");
    let v = as_variable(&d);
    match &v.ty {
        Type::MemberPointer(mp) => {
            assert_eq!(mp.class_name.to_string(), "C");
            assert_eq!(base_name(&mp.pointee), "int");
        }
        other => panic!("expected a member pointer, got {other:#?}"),
    }
}

#[test]
fn test_member_function_pointer() {
    let d = one("void (C::*fp)(int);");
    let v = as_variable(&d);
    assert_eq!(var_name(v), "fp");
    match &v.ty {
        Type::MemberPointer(mp) => {
            assert_eq!(mp.class_name.to_string(), "C");
            assert!(matches!(&*mp.pointee, Type::Function(_)));
        }
        other => panic!("expected a member pointer, got {other:#?}"),
    }
}

#[test]
fn test_grouping_parens() {
    let d = one("void (name(int x));");
    let f = as_function(&d);
    assert_eq!(f.name.to_string(), "name");
    assert_eq!(f.parameters.len(), 1);
}

// ============================================================
// Namespaces
// ============================================================

#[test]
fn test_namespace_with_struct() {
    let d = one("namespace a { struct B { int m; }; }");
    let ns = as_namespace(&d);
    assert_eq!(ns.decl.names, vec!["a"]);
    assert!(!ns.decl.is_inline);

    let class = as_class(&ns.declarations[0]);
    assert_eq!(class.decl.classkey(), Some(ClassKey::Struct));
    assert_eq!(class.decl.typename.to_string(), "B");

    let m = as_variable(&class.members[0]);
    assert_eq!(var_name(m), "m");
    assert_eq!(base_name(&m.ty), "int");
    assert_eq!(m.access, Some(Access::Public));
}

#[test]
fn test_nested_namespace_names() {
    let d = one("namespace a::b::c { int x; }");
    let ns = as_namespace(&d);
    assert_eq!(ns.decl.names, vec!["a", "b", "c"]);
    assert!(ns.decl.is_nested());
    assert_eq!(ns.declarations.len(), 1);
}

#[test]
fn test_anonymous_namespace() {
    let d = one("namespace { int hidden; }");
    let ns = as_namespace(&d);
    assert!(ns.decl.names.is_empty());
}

#[test]
fn test_inline_namespace() {
    let d = one("inline namespace v1 { void f(); }");
    assert!(as_namespace(&d).decl.is_inline);
}

#[test]
fn test_namespace_alias() {
    let d = one("namespace fs = std::filesystem;");
    match &d {
        Declaration::NamespaceAlias(alias) => {
            assert_eq!(alias.name, "fs");
            assert_eq!(alias.target.to_string(), "std::filesystem");
        }
        other => panic!("expected a namespace alias, got {other:#?}"),
    }
}

// ============================================================
// Classes
// ============================================================

#[test]
fn test_base_clause() {
    let d = one("struct A : public B<int>, virtual C {};");
    let class = as_class(&d);
    let bases = &class.decl.bases;
    assert_eq!(bases.len(), 2);

    assert_eq!(bases[0].access, Access::Public);
    assert!(!bases[0].is_virtual);
    assert_eq!(bases[0].typename.to_string(), "B");
    match &bases[0].typename.segments[0] {
        NameSegment::Name {
            specialization: Some(spec),
            ..
        } => assert_eq!(spec.args.len(), 1),
        other => panic!("expected a template-id, got {other:#?}"),
    }

    assert_eq!(bases[1].access, Access::Public);
    assert!(bases[1].is_virtual);
    assert_eq!(bases[1].typename.to_string(), "C");
}

#[test]
fn test_private_base_default_for_class() {
    let d = one("class A : B {};");
    assert_eq!(as_class(&d).decl.bases[0].access, Access::Private);
}

#[test]
fn test_base_pack() {
    let d = one("template <typename... Ts> struct Mixin : Ts... {};");
    let class = as_class(&d);
    assert!(class.decl.bases[0].is_pack);
}

#[test]
fn test_access_specifier_tracking() {
    let source = "class C {\n\
                  int a;\n\
                  public:\n\
                  int b;\n\
                  int c;\n\
                  protected:\n\
                  int d;\n\
                  private:\n\
                  int e;\n\
                  };";
    let d = one(source);
    let class = as_class(&d);
    let accesses: Vec<Option<Access>> = class
        .members
        .iter()
        .map(|m| as_variable(m).access)
        .collect();
    assert_eq!(
        accesses,
        vec![
            Some(Access::Private),
            Some(Access::Public),
            Some(Access::Public),
            Some(Access::Protected),
            Some(Access::Private),
        ]
    );
}

#[test]
fn test_union_defaults_private() {
    let d = one("union U { int a; float b; };");
    let class = as_class(&d);
    assert_eq!(class.decl.classkey(), Some(ClassKey::Union));
    assert_eq!(as_variable(&class.members[0]).access, Some(Access::Private));
}

#[test]
fn test_final_class() {
    let d = one("class Sealed final {};");
    assert!(as_class(&d).decl.is_final);
}

#[test]
fn test_forward_declaration() {
    let d = one("class Widget;");
    match &d {
        Declaration::Forward(fwd) => {
            assert_eq!(fwd.typename.to_string(), "Widget");
            assert_eq!(fwd.typename.classkey, Some(ClassKey::Class));
        }
        other => panic!("expected a forward declaration, got {other:#?}"),
    }
}

#[test]
fn test_class_with_trailing_declarator() {
    let ds = decls("struct X { int a; } x;");
    assert_eq!(ds.len(), 2);
    let v = as_variable(&ds[1]);
    assert_eq!(var_name(v), "x");
    assert_eq!(base_name(&v.ty), "X");
}

#[test]
fn test_anonymous_struct_typedef() {
    let ds = decls("typedef struct { int x; } Foo;");
    assert_eq!(ds.len(), 2);
    let class = as_class(&ds[0]);
    assert!(matches!(
        class.decl.typename.segments[0],
        NameSegment::Anonymous { .. }
    ));
    let td = as_typedef(&ds[1]);
    assert_eq!(td.name, "Foo");
}

#[test]
fn test_constructor_and_destructor() {
    let d = one("struct A { A(int x); ~A(); };");
    let class = as_class(&d);

    let ctor = as_function(&class.members[0]);
    assert!(ctor.is_constructor);
    assert!(ctor.return_type.is_none());
    assert_eq!(ctor.parameters.len(), 1);

    let dtor = as_function(&class.members[1]);
    assert!(dtor.is_destructor);
    assert_eq!(dtor.name.to_string(), "~A");
}

#[test]
fn test_constructor_initializer_list() {
    let d = one("struct A { int x_; A() : x_(0) {} };");
    let class = as_class(&d);
    let ctor = as_function(&class.members[1]);
    assert!(ctor.is_constructor);
    assert!(ctor.has_body);
    assert_eq!(
        tok_values(ctor.member_initializers.as_ref().unwrap()),
        vec!["x_", "(", "0", ")"]
    );
}

#[test]
fn test_method_qualifiers() {
    let source = "struct S {\n\
                  virtual void a() = 0;\n\
                  void b() const noexcept;\n\
                  virtual void c() override final;\n\
                  void d() &&;\n\
                  S() = default;\n\
                  S(const S&) = delete;\n\
                  };";
    let d = one(source);
    let class = as_class(&d);

    let a = as_function(&class.members[0]);
    assert!(a.is_virtual && a.is_pure_virtual);

    let b = as_function(&class.members[1]);
    assert!(b.is_const);
    assert!(b.noexcept.is_some());

    let c = as_function(&class.members[2]);
    assert!(c.is_override && c.is_final);

    let d2 = as_function(&class.members[3]);
    assert_eq!(d2.ref_qualifier, Some(RefQualifier::RValue));

    assert!(as_function(&class.members[4]).is_defaulted);
    assert!(as_function(&class.members[5]).is_deleted);
}

#[test]
fn test_explicit_constructor() {
    let d = one("struct A { explicit A(int); };");
    assert!(as_function(&as_class(&d).members[0]).is_explicit);
}

#[test]
fn test_static_method_and_member() {
    let d = one("struct S { static int count; static int get(); };");
    let class = as_class(&d);
    assert!(as_variable(&class.members[0]).is_static);
    assert!(as_function(&class.members[1]).is_static);
}

#[test]
fn test_mutable_member() {
    let d = one("struct S { mutable int cache; };");
    assert!(as_variable(&as_class(&d).members[0]).is_mutable);
}

#[test]
fn test_nested_class() {
    let d = one("class Outer { class Inner { int x; }; };");
    let outer = as_class(&d);
    let inner = as_class(&outer.members[0]);
    assert_eq!(inner.decl.access, Some(Access::Private));
    assert_eq!(as_variable(&inner.members[0]).access, Some(Access::Private));
}

// ============================================================
// Bit-fields
// ============================================================

#[test]
fn test_bitfields() {
    let d = one("struct F { int a : 2; unsigned b : 4; int : 0; };");
    let class = as_class(&d);

    let a = as_variable(&class.members[0]);
    assert_eq!(value_str(a.bits.as_ref().unwrap()), "2");

    let b = as_variable(&class.members[1]);
    assert_eq!(value_str(b.bits.as_ref().unwrap()), "4");

    let anon = as_variable(&class.members[2]);
    assert!(anon.name.is_none());
    assert_eq!(value_str(anon.bits.as_ref().unwrap()), "0");
}

#[test]
fn test_bitfield_expression_width() {
    let d = one("struct F { unsigned x : (3 + 1); };");
    let class = as_class(&d);
    let x = as_variable(&class.members[0]);
    assert_eq!(value_str(x.bits.as_ref().unwrap()), "(3+1)");
}

// ============================================================
// Enums
// ============================================================

#[test]
fn test_scoped_enum_with_base() {
    let d = one("enum class E : unsigned char { a, b = 2, c };");
    let e = as_enum(&d);
    assert!(e.is_scoped());
    assert_eq!(e.typename.to_string(), "E");
    assert_eq!(e.base.as_ref().unwrap().to_string(), "unsigned char");

    assert_eq!(e.values.len(), 3);
    assert_eq!(e.values[0].name, "a");
    assert!(e.values[0].value.is_none());
    assert_eq!(e.values[1].name, "b");
    assert_eq!(value_str(e.values[1].value.as_ref().unwrap()), "2");
    assert_eq!(e.values[2].name, "c");
}

#[test]
fn test_unscoped_enum() {
    let d = one("enum Color { red, green };");
    let e = as_enum(&d);
    assert!(!e.is_scoped());
    assert_eq!(e.typename.classkey, Some(ClassKey::Enum));
}

#[test]
fn test_enum_forward_with_base() {
    let d = one("enum class E : int;");
    match &d {
        Declaration::Forward(fwd) => {
            assert_eq!(fwd.enum_base.as_ref().unwrap().to_string(), "int");
        }
        other => panic!("expected a forward declaration, got {other:#?}"),
    }
}

#[test]
fn test_enum_with_trailing_declarator() {
    let ds = decls("enum E { x } e;");
    assert_eq!(ds.len(), 2);
    assert_eq!(var_name(as_variable(&ds[1])), "e");
}

#[test]
fn test_anonymous_enum() {
    let d = one("enum { FLAG = 1 };");
    let e = as_enum(&d);
    assert!(matches!(
        e.typename.segments[0],
        NameSegment::Anonymous { .. }
    ));
}

// ============================================================
// Typedefs and aliases
// ============================================================

#[test]
fn test_typedef_multiple_declarators() {
    let ds = decls("typedef int T, *PT;");
    assert_eq!(ds.len(), 2);
    assert_eq!(as_typedef(&ds[0]).name, "T");
    let pt = as_typedef(&ds[1]);
    assert_eq!(pt.name, "PT");
    assert!(matches!(&pt.ty, Type::Pointer(_)));
}

#[test]
fn test_typedef_function_type() {
    let d = one("typedef int callback_t(void*, int);");
    let td = as_typedef(&d);
    match &td.ty {
        Type::Function(f) => assert_eq!(f.parameters.len(), 2),
        other => panic!("expected a function type, got {other:#?}"),
    }
}

#[test]
fn test_typedef_function_pointer() {
    let d = one("typedef void (*handler_t)(int);");
    let td = as_typedef(&d);
    assert_eq!(td.name, "handler_t");
    assert!(matches!(&td.ty, Type::Pointer(_)));
}

#[test]
fn test_using_alias() {
    let d = one("using Ticks = unsigned long long;");
    match &d {
        Declaration::UsingAlias(alias) => {
            assert_eq!(alias.alias, "Ticks");
            assert_eq!(base_name(&alias.ty), "unsigned long long");
        }
        other => panic!("expected an alias, got {other:#?}"),
    }
}

#[test]
fn test_templated_alias() {
    let d = one("template <typename T> using VecT = std::vector<T>;");
    match &d {
        Declaration::UsingAlias(alias) => {
            assert!(alias.template.is_some());
            assert_eq!(base_name(&alias.ty), "std::vector");
        }
        other => panic!("expected an alias, got {other:#?}"),
    }
}

#[test]
fn test_using_declaration() {
    let d = one("using std::string;");
    match &d {
        Declaration::UsingDeclaration(u) => {
            assert_eq!(u.typename.to_string(), "std::string");
        }
        other => panic!("expected a using-declaration, got {other:#?}"),
    }
}

#[test]
fn test_using_directive() {
    let d = one("using namespace std::chrono;");
    match &d {
        Declaration::UsingDirective(u) => {
            assert_eq!(u.namespace.to_string(), "std::chrono");
        }
        other => panic!("expected a using-directive, got {other:#?}"),
    }
}

#[test]
fn test_using_enum() {
    let ds = decls("enum class Color { red };\nusing enum Color;");
    match &ds[1] {
        Declaration::UsingEnum(u) => assert_eq!(u.typename.to_string(), "Color"),
        other => panic!("expected a using-enum, got {other:#?}"),
    }
}

#[test]
fn test_inherited_constructor_using() {
    let d = one("struct D : B { using B::B; };");
    let class = as_class(&d);
    match &class.members[0] {
        Declaration::UsingDeclaration(u) => {
            assert_eq!(u.typename.to_string(), "B::B");
            assert_eq!(u.access, Some(Access::Public));
        }
        other => panic!("expected a using-declaration, got {other:#?}"),
    }
}

// ============================================================
// Templates
// ============================================================

#[test]
fn test_class_template() {
    let d = one("template<typename T, int N = 4> class Vec { public: T data[N]; };");
    let class = as_class(&d);
    let template = class.decl.template.as_ref().unwrap();
    assert_eq!(template.params.len(), 2);

    match &template.params[0] {
        TemplateParam::Type(tp) => {
            assert_eq!(tp.typekey, "typename");
            assert_eq!(tp.name.as_deref(), Some("T"));
        }
        other => panic!("expected a type parameter, got {other:#?}"),
    }
    match &template.params[1] {
        TemplateParam::NonType(ntp) => {
            assert_eq!(base_name(&ntp.ty), "int");
            assert_eq!(ntp.name.as_deref(), Some("N"));
            assert_eq!(value_str(ntp.default.as_ref().unwrap()), "4");
        }
        other => panic!("expected a non-type parameter, got {other:#?}"),
    }

    let data = as_variable(&class.members[0]);
    assert_eq!(data.access, Some(Access::Public));
    match &data.ty {
        Type::Array(arr) => {
            assert_eq!(base_name(&arr.element), "T");
            assert_eq!(value_str(arr.size.as_ref().unwrap()), "N");
        }
        other => panic!("expected an array, got {other:#?}"),
    }
}

#[test]
fn test_function_template() {
    let d = one("template <class T> T max(T a, T b);");
    let f = as_function(&d);
    let template = f.template.as_ref().unwrap();
    assert_eq!(template.params.len(), 1);
    match &template.params[0] {
        TemplateParam::Type(tp) => assert_eq!(tp.typekey, "class"),
        other => panic!("expected a type parameter, got {other:#?}"),
    }
}

#[test]
fn test_variable_template() {
    let d = one("template <typename T> T zero = T(0);");
    let v = as_variable(&d);
    assert!(v.template.is_some());
    assert_eq!(
        tok_values(v.value.as_ref().unwrap()),
        vec!["T", "(", "0", ")"]
    );
}

#[test]
fn test_explicit_specialization() {
    let d = one("template <> struct Hash<int> { int operator()(int v) const; };");
    let class = as_class(&d);
    let template = class.decl.template.as_ref().unwrap();
    assert!(template.params.is_empty());
    match &class.decl.typename.segments[0] {
        NameSegment::Name {
            specialization: Some(spec),
            ..
        } => {
            assert_eq!(spec.args.len(), 1);
            match &spec.args[0].arg {
                TemplateArgValue::Type(ty) => assert_eq!(base_name(ty), "int"),
                other => panic!("expected a type argument, got {other:#?}"),
            }
        }
        other => panic!("expected a template-id, got {other:#?}"),
    }
}

#[test]
fn test_partial_specialization() {
    let d = one("template <typename T> struct Hash<T*> {};");
    let class = as_class(&d);
    match &class.decl.typename.segments[0] {
        NameSegment::Name {
            specialization: Some(spec),
            ..
        } => match &spec.args[0].arg {
            TemplateArgValue::Type(ty) => assert!(matches!(&**ty, Type::Pointer(_))),
            other => panic!("expected a type argument, got {other:#?}"),
        },
        other => panic!("expected a template-id, got {other:#?}"),
    }
}

#[test]
fn test_template_template_parameter() {
    let d = one("template <template <typename> class C> class Holder {};");
    let class = as_class(&d);
    let template = class.decl.template.as_ref().unwrap();
    match &template.params[0] {
        TemplateParam::Type(tp) => {
            assert_eq!(tp.name.as_deref(), Some("C"));
            let inner = tp.template.as_ref().unwrap();
            assert_eq!(inner.params.len(), 1);
        }
        other => panic!("expected a type parameter, got {other:#?}"),
    }
}

#[test]
fn test_parameter_pack() {
    let d = one("template <typename... Args> void log(Args... args);");
    let f = as_function(&d);
    match &f.template.as_ref().unwrap().params[0] {
        TemplateParam::Type(tp) => assert!(tp.is_pack),
        other => panic!("expected a type parameter, got {other:#?}"),
    }
    assert!(f.parameters[0].is_pack);
    assert_eq!(f.parameters[0].name.as_deref(), Some("args"));
}

#[test]
fn test_right_shift_closes_nested_templates() {
    let d = one("std::vector<std::vector<int>> grid;");
    let v = as_variable(&d);
    assert_eq!(base_name(&v.ty), "std::vector");
    let spec = match &v.ty.base_named().unwrap().typename.segments[1] {
        NameSegment::Name {
            specialization: Some(spec),
            ..
        } => spec,
        other => panic!("expected a template-id, got {other:#?}"),
    };
    match &spec.args[0].arg {
        TemplateArgValue::Type(inner) => {
            assert_eq!(base_name(inner), "std::vector");
        }
        other => panic!("expected a type argument, got {other:#?}"),
    }
}

#[test]
fn test_shift_right_is_not_a_declaration() {
    let failure = parse_err("a >> b;");
    assert_eq!(failure.error.code, ErrorCode::UnexpectedToken);
}

#[test]
fn test_dependent_nontype_template_param() {
    let d = one("template <typename T, typename T::size_type N> struct Buf {};");
    let class = as_class(&d);
    let template = class.decl.template.as_ref().unwrap();
    assert_eq!(template.params.len(), 2);
    assert!(matches!(&template.params[1], TemplateParam::NonType(_)));
}

#[test]
fn test_template_argument_expression_stays_tokens() {
    let d = one("Array<sizeof(int) * 2> a;");
    let v = as_variable(&d);
    let spec = match &v.ty.base_named().unwrap().typename.segments[0] {
        NameSegment::Name {
            specialization: Some(spec),
            ..
        } => spec,
        other => panic!("expected a template-id, got {other:#?}"),
    };
    match &spec.args[0].arg {
        TemplateArgValue::Tokens(v) => {
            assert_eq!(
                tok_values(v),
                vec!["sizeof", "(", "int", ")", "*", "2"]
            );
        }
        other => panic!("expected token arguments, got {other:#?}"),
    }
}

#[test]
fn test_extern_template() {
    let d = one("extern template class Foo<int>;");
    match &d {
        Declaration::TemplateInstantiation(inst) => {
            assert!(inst.is_extern);
            assert_eq!(value_str(&inst.tokens), "class Foo<int>");
        }
        other => panic!("expected an instantiation, got {other:#?}"),
    }
}

#[test]
fn test_explicit_instantiation() {
    let d = one("template class Foo<char>;");
    match &d {
        Declaration::TemplateInstantiation(inst) => assert!(!inst.is_extern),
        other => panic!("expected an instantiation, got {other:#?}"),
    }
}

#[test]
fn test_extern_template_skipped() {
    let options = ParserOptions {
        extern_template_handling: crate::options::ExternTemplate::Skip,
        ..ParserOptions::default()
    };
    let parsed = parse_opts("extern template class Foo<int>;", options);
    assert!(parsed.unit.declarations.is_empty());
}

// ============================================================
// Operators
// ============================================================

#[test]
fn test_operator_overloads() {
    let source = "struct V {\n\
                  V operator+(const V& o) const;\n\
                  V& operator=(const V& o);\n\
                  int operator()(int x);\n\
                  int operator[](int i) const;\n\
                  bool operator==(const V& o) const;\n\
                  };";
    let d = one(source);
    let class = as_class(&d);
    let ops: Vec<&str> = class
        .members
        .iter()
        .map(|m| as_function(m).operator.as_deref().unwrap())
        .collect();
    assert_eq!(ops, vec!["+", "=", "()", "[]", "=="]);
    assert_eq!(as_function(&class.members[0]).name.to_string(), "operator+");
}

#[test]
fn test_conversion_operator() {
    let d = one("struct Handle { operator bool() const; };");
    let class = as_class(&d);
    let conv = as_function(&class.members[0]);
    assert!(conv.is_conversion_operator());
    assert_eq!(base_name(conv.return_type.as_ref().unwrap()), "bool");
    assert!(conv.is_const);
}

#[test]
fn test_conversion_operator_to_pointer() {
    let d = one("struct Handle { operator void*() const; };");
    let class = as_class(&d);
    let conv = as_function(&class.members[0]);
    assert!(conv.is_conversion_operator());
    assert!(matches!(conv.return_type.as_ref().unwrap(), Type::Pointer(_)));
}

#[test]
fn test_free_operator() {
    let d = one("bool operator!=(const V& a, const V& b);");
    let f = as_function(&d);
    assert_eq!(f.operator.as_deref(), Some("!="));
    assert_eq!(f.parameters.len(), 2);
}

#[test]
fn test_stream_operator() {
    let d = one("std::ostream& operator<<(std::ostream& os, const V& v);");
    let f = as_function(&d);
    assert_eq!(f.operator.as_deref(), Some("<<"));
}

#[test]
fn test_user_defined_literal() {
    let d = one("unsigned long long operator\"\"_km(unsigned long long v);");
    let f = as_function(&d);
    assert_eq!(f.operator.as_deref(), Some("\"\"_km"));
    assert!(f.is_literal_operator());
}

#[test]
fn test_operator_new_delete() {
    let source = "struct A {\n\
                  void* operator new(unsigned long n);\n\
                  void operator delete(void* p);\n\
                  };";
    let d = one(source);
    let class = as_class(&d);
    assert_eq!(as_function(&class.members[0]).operator.as_deref(), Some("new"));
    assert_eq!(
        as_function(&class.members[1]).operator.as_deref(),
        Some("delete")
    );
}

// ============================================================
// Friends
// ============================================================

#[test]
fn test_friend_class() {
    let d = one("class A { friend class B; };");
    let class = as_class(&d);
    match &class.members[0] {
        Declaration::Friend(friend) => match &friend.target {
            FriendTarget::Class(fwd) => {
                assert_eq!(fwd.typename.to_string(), "B");
                assert_eq!(fwd.typename.classkey, Some(ClassKey::Class));
            }
            other => panic!("expected a class target, got {other:#?}"),
        },
        other => panic!("expected a friend, got {other:#?}"),
    }
}

#[test]
fn test_friend_function() {
    let d = one("class A { friend void swap(A& x, A& y); };");
    let class = as_class(&d);
    match &class.members[0] {
        Declaration::Friend(friend) => match &friend.target {
            FriendTarget::Function(f) => {
                assert!(f.is_friend);
                assert_eq!(f.name.to_string(), "swap");
                assert_eq!(f.parameters.len(), 2);
            }
            other => panic!("expected a function target, got {other:#?}"),
        },
        other => panic!("expected a friend, got {other:#?}"),
    }
}

#[test]
fn test_friend_without_classkey() {
    let d = one("class A { friend B; };");
    let class = as_class(&d);
    match &class.members[0] {
        Declaration::Friend(friend) => match &friend.target {
            FriendTarget::Class(fwd) => assert_eq!(fwd.typename.to_string(), "B"),
            other => panic!("expected a class target, got {other:#?}"),
        },
        other => panic!("expected a friend, got {other:#?}"),
    }
}

// ============================================================
// extern blocks, static_assert, directives
// ============================================================

#[test]
fn test_extern_c_block() {
    let d = one("extern \"C\" { void f(); int x; }");
    match &d {
        Declaration::ExternBlock(block) => {
            assert_eq!(block.linkage, "\"C\"");
            assert_eq!(block.declarations.len(), 2);
        }
        other => panic!("expected an extern block, got {other:#?}"),
    }
}

#[test]
fn test_extern_c_single_function() {
    let d = one("extern \"C\" void f();");
    let f = as_function(&d);
    assert!(f.is_extern);
    assert_eq!(f.linkage.as_deref(), Some("\"C\""));
}

#[test]
fn test_static_assert() {
    let d = one("static_assert(sizeof(int) == 4, \"int must be 32-bit\");");
    match &d {
        Declaration::StaticAssert(sa) => {
            assert_eq!(
                tok_values(&sa.condition),
                vec!["sizeof", "(", "int", ")", "==", "4"]
            );
            assert_eq!(sa.message.as_deref(), Some("\"int must be 32-bit\""));
        }
        other => panic!("expected a static_assert, got {other:#?}"),
    }
}

#[test]
fn test_static_assert_no_message() {
    let d = one("static_assert(alignof(double) >= 4);");
    match &d {
        Declaration::StaticAssert(sa) => assert!(sa.message.is_none()),
        other => panic!("expected a static_assert, got {other:#?}"),
    }
}

#[test]
fn test_directives_retained() {
    let ds = decls("#include <vector>\n#pragma once\n#define N 4\nint x;");
    assert_eq!(ds.len(), 4);
    match &ds[0] {
        Declaration::Directive(dir) => {
            assert_eq!(dir.kind, DirectiveKind::Include);
            assert_eq!(dir.content, "<vector>");
        }
        other => panic!("expected a directive, got {other:#?}"),
    }
    match &ds[1] {
        Declaration::Directive(dir) => {
            assert_eq!(dir.kind, DirectiveKind::Pragma);
            assert_eq!(dir.content, "once");
        }
        other => panic!("expected a directive, got {other:#?}"),
    }
    match &ds[2] {
        Declaration::Directive(dir) => assert_eq!(dir.kind, DirectiveKind::Define),
        other => panic!("expected a directive, got {other:#?}"),
    }
}

#[test]
fn test_directives_ignored() {
    let options = ParserOptions {
        preprocessor_lines: PreprocessorLines::Ignore,
        ..ParserOptions::default()
    };
    let parsed = parse_opts("#pragma once\nint x;", options);
    assert_eq!(parsed.unit.declarations.len(), 1);
}

#[test]
fn test_line_directive_changes_locations() {
    let ds = decls("#line 80 \"real.h\"\nint x;");
    // the #line itself is not surfaced
    assert_eq!(ds.len(), 1);
    let v = as_variable(&ds[0]);
    assert_eq!(&*v.location.filename, "real.h");
    assert_eq!(v.location.line, 80);
}

// ============================================================
// Structured bindings
// ============================================================

#[test]
fn test_structured_binding() {
    let d = one("auto [a, b] = std::minmax(1, 2);");
    match &d {
        Declaration::StructuredBinding(sb) => {
            assert_eq!(sb.names, vec!["a", "b"]);
            assert_eq!(
                tok_values(sb.value.as_ref().unwrap()),
                vec!["std", "::", "minmax", "(", "1", ",", "2", ")"]
            );
        }
        other => panic!("expected a structured binding, got {other:#?}"),
    }
}

#[test]
fn test_structured_binding_by_reference() {
    let d = one("const auto& [x, y] = point;");
    match &d {
        Declaration::StructuredBinding(sb) => {
            assert!(matches!(&sb.ty, Type::Reference(_)));
        }
        other => panic!("expected a structured binding, got {other:#?}"),
    }
}

// ============================================================
// Concepts and requires clauses
// ============================================================

#[test]
fn test_concept_declaration() {
    let d = one("template <typename T> concept Addable = requires(T a) { a + a; };");
    match &d {
        Declaration::Concept(concept) => {
            assert_eq!(concept.name, "Addable");
            assert_eq!(concept.template.params.len(), 1);
            assert!(value_str(&concept.expression).starts_with("requires"));
        }
        other => panic!("expected a concept, got {other:#?}"),
    }
}

#[test]
fn test_template_requires_clause() {
    let d = one("template <typename T> requires std::integral<T> T twice(T t);");
    let f = as_function(&d);
    let template = f.template.as_ref().unwrap();
    assert_eq!(
        value_str(template.requires_clause.as_ref().unwrap()),
        "std::integral<T>"
    );
}

#[test]
fn test_function_requires_clause() {
    let d = one("template <typename T> void f(T t) requires (sizeof(T) > 4);");
    let f = as_function(&d);
    assert!(f.requires_clause.is_some());
}

#[test]
fn test_concepts_disabled() {
    let options = ParserOptions {
        concepts: false,
        ..ParserOptions::default()
    };
    let parsed = parse_opts(
        "template <typename T> concept C = true;\nint x;",
        options,
    );
    assert_eq!(parsed.diagnostics.len(), 1);
    assert_eq!(parsed.diagnostics[0].code, ErrorCode::Unsupported);
    assert_eq!(parsed.unit.declarations.len(), 1);
}

// ============================================================
// Attributes
// ============================================================

#[test]
fn test_double_bracket_attribute() {
    let d = one("[[nodiscard]] int f();");
    let f = as_function(&d);
    assert_eq!(f.attributes.len(), 1);
    assert_eq!(f.attributes[0].kind, AttributeKind::DoubleBracket);
    assert_eq!(value_str(&f.attributes[0].tokens), "[[nodiscard]]");
}

#[test]
fn test_class_key_embedded_attribute() {
    let d = one("struct [[nodiscard]] Result {};");
    let class = as_class(&d);
    assert_eq!(class.decl.attributes.len(), 1);
}

#[test]
fn test_gnu_attribute() {
    let d = one("__attribute__((packed)) struct P { char c; int i; };");
    let class = as_class(&d);
    assert_eq!(class.decl.attributes[0].kind, AttributeKind::Gnu);
    assert!(value_str(&class.decl.attributes[0].tokens).contains("packed"));
}

#[test]
fn test_declspec_attribute() {
    let d = one("__declspec(dllexport) void api();");
    let f = as_function(&d);
    assert_eq!(f.attributes[0].kind, AttributeKind::Declspec);
}

#[test]
fn test_alignas() {
    let d = one("struct alignas(16) Vec4 { float v[4]; };");
    let class = as_class(&d);
    assert_eq!(class.decl.attributes[0].kind, AttributeKind::Alignas);
}

#[test]
fn test_enumerator_attribute() {
    let d = one("enum E { old_name [[deprecated]] = 1, new_name };");
    let e = as_enum(&d);
    assert_eq!(e.values[0].attributes.len(), 1);
    assert!(e.values[1].attributes.is_empty());
}

#[test]
fn test_gnu_attribute_rejected_in_strict_mode() {
    let options = ParserOptions {
        strict: true,
        gnu_attributes: false,
        ..ParserOptions::default()
    };
    let parsed = parse_opts("__attribute__((packed)) int x;\nint y;", options);
    assert_eq!(parsed.diagnostics.len(), 1);
    assert_eq!(parsed.diagnostics[0].code, ErrorCode::Unsupported);
    assert_eq!(parsed.unit.declarations.len(), 1);
}

// ============================================================
// Doxygen comments
// ============================================================

#[test]
fn test_doxygen_before_declaration() {
    let ds = decls("/// The answer.\nint answer = 42;");
    let v = as_variable(&ds[0]);
    assert_eq!(v.doxygen.as_deref(), Some("/// The answer."));
}

#[test]
fn test_doxygen_block_comment() {
    let ds = decls("/** A thing. */\nstruct Thing {};");
    let class = as_class(&ds[0]);
    assert_eq!(class.decl.doxygen.as_deref(), Some("/** A thing. */"));
}

#[test]
fn test_doxygen_trailing_on_field() {
    let d = one("struct S { int x; ///< horizontal\n int y; };");
    let class = as_class(&d);
    assert_eq!(
        as_variable(&class.members[0]).doxygen.as_deref(),
        Some("///< horizontal")
    );
    assert!(as_variable(&class.members[1]).doxygen.is_none());
}

#[test]
fn test_doxygen_on_enumerator() {
    let d = one("enum E {\n a, ///< first\n b,\n};");
    let e = as_enum(&d);
    assert_eq!(e.values[0].doxygen.as_deref(), Some("///< first"));
    assert!(e.values[1].doxygen.is_none());
}

#[test]
fn test_doxygen_not_attached_across_blank_line() {
    let ds = decls("/// stale\n\n\nint x;");
    assert!(as_variable(&ds[0]).doxygen.is_none());
}

#[test]
fn test_doxygen_disabled() {
    let options = ParserOptions {
        retain_doxygen_comments: false,
        ..ParserOptions::default()
    };
    let parsed = parse_opts("/// doc\nint x;", options);
    assert!(as_variable(&parsed.unit.declarations[0]).doxygen.is_none());
}

// ============================================================
// typename, decltype, auto
// ============================================================

#[test]
fn test_typename_qualified_return() {
    let d = one("typename T::value_type front();");
    let f = as_function(&d);
    let ret = f.return_type.as_ref().unwrap().base_named().unwrap();
    assert!(ret.typename.has_typename);
    assert_eq!(ret.typename.to_string(), "T::value_type");
}

#[test]
fn test_decltype_type() {
    let d = one("decltype(x + 1) y = x + 1;");
    let v = as_variable(&d);
    match &v.ty.base_named().unwrap().typename.segments[0] {
        NameSegment::Decltype { tokens } => {
            assert_eq!(tok_values(tokens), vec!["x", "+", "1"]);
        }
        other => panic!("expected decltype, got {other:#?}"),
    }
}

#[test]
fn test_auto_variable() {
    let d = one("auto x = compute();");
    let v = as_variable(&d);
    assert!(v.ty.base_named().unwrap().typename.is_auto());
}

// ============================================================
// Error handling
// ============================================================

#[test]
fn test_lexical_error_is_fatal() {
    let failure = parse_err("int good;\nint @bad;");
    assert_eq!(failure.error.code, ErrorCode::LexicalError);
    // the partial tree contains everything up to the failure
    assert_eq!(failure.partial.declarations.len(), 1);
}

#[test]
fn test_unbalanced_delimiter() {
    let failure = parse_err("void f(int;");
    assert_eq!(failure.error.code, ErrorCode::UnbalancedDelimiter);
}

#[test]
fn test_unclosed_block_at_eof() {
    let failure = parse_err("struct X { int a;");
    assert_eq!(failure.error.code, ErrorCode::UnbalancedDelimiter);
}

#[test]
fn test_unexpected_token() {
    let failure = parse_err("namespace 42 {}");
    assert_eq!(failure.error.code, ErrorCode::UnexpectedToken);
    assert!(failure.error.message.contains("'42'"));
}

#[test]
fn test_error_carries_location() {
    let failure = parse_err("int x;\nnamespace 9 {}");
    assert_eq!(failure.error.location.line, 2);
}

#[test]
fn test_module_declaration_is_unsupported() {
    let parsed = parse_string("export module foo;\nint x;", None, None).unwrap();
    assert_eq!(parsed.diagnostics.len(), 1);
    assert_eq!(parsed.diagnostics[0].code, ErrorCode::Unsupported);
    assert_eq!(parsed.unit.declarations.len(), 1);
}

#[test]
fn test_import_is_unsupported() {
    let parsed = parse_string("import <vector>;\nint x;", None, None).unwrap();
    assert_eq!(parsed.diagnostics.len(), 1);
    assert_eq!(parsed.unit.declarations.len(), 1);
}

#[test]
fn test_ambiguous_member_initializer() {
    let failure = parse_err("struct S { Foo x(3); };");
    assert_eq!(failure.error.code, ErrorCode::AmbiguousDeclaration);
}

// ============================================================
// Serialization
// ============================================================

#[test]
fn test_serialization_round_trip() {
    let unit = parse(
        "namespace demo {\n\
         template <typename T> class Box {\n\
         public:\n\
         explicit Box(T v);\n\
         T get() const noexcept;\n\
         private:\n\
         T value_;\n\
         };\n\
         enum class Mode : int { off, on = 1 };\n\
         [[nodiscard]] Box<int> make(int v = 0);\n\
         }",
    );
    let json = serde_json::to_value(&unit).expect("serialize");
    let back: Unit = serde_json::from_value(json).expect("deserialize");
    assert_eq!(unit, back);
}

#[test]
fn test_serialization_includes_locations() {
    let unit = parse("int x;");
    let json = serde_json::to_value(&unit).expect("serialize");
    let decl = &json["declarations"][0]["Variable"];
    assert_eq!(decl["location"]["line"], 1);
    assert_eq!(decl["location"]["filename"], "<str>");
}

// ============================================================
// Scope-sensitive parsing
// ============================================================

#[test]
fn test_known_type_names_seed() {
    let options = ParserOptions::default().with_known_types(["HANDLE"]);
    let parsed = parse_opts("HANDLE h;", options);
    let v = as_variable(&parsed.unit.declarations[0]);
    assert_eq!(base_name(&v.ty), "HANDLE");
}

#[test]
fn test_declarations_visible_in_nested_scope() {
    // the typedef registers `id_t`, so the member parses as a declaration
    let ds = decls("typedef int id_t;\nstruct S { id_t* next; };");
    let class = as_class(&ds[1]);
    let next = as_variable(&class.members[0]);
    assert!(matches!(&next.ty, Type::Pointer(_)));
}

#[test]
fn test_empty_input() {
    assert!(decls("").is_empty());
    assert!(decls("  \n\t\n").is_empty());
    assert!(decls(";;;").is_empty());
}

#[test]
fn test_empty_block() {
    // a stray block is tolerated and contributes nothing
    let ds = decls("{ }\nint x;");
    assert_eq!(ds.len(), 1);
}

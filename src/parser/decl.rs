//! The general declaration engine: variables, fields, functions, methods,
//! operators, bit-fields and structured bindings.

use super::{Block, Parser, Result, TypeModifiers};
use crate::ast::{
    Attribute, ForwardDecl, FriendDecl, FriendTarget, FunctionDecl, FunctionType, NameSegment,
    NamedType, QualifiedName, RefQualifier, StructuredBindingDecl, TemplateDecl, Type, TypedefDecl,
    VariableDecl,
};
use crate::diagnostics::{ErrorCode, ParseError};
use crate::lexer::{Token, TokenKind};
use crate::options::MethodBody;
use crate::span::Location;

/// Copy the gathered specifier modifiers onto a function.
fn apply_mods_to_function(mods: &TypeModifiers, f: &mut FunctionDecl) {
    for (name, _) in &mods.both {
        match *name {
            "constexpr" => f.is_constexpr = true,
            "consteval" => f.is_consteval = true,
            "extern" => f.is_extern = true,
            "inline" => f.is_inline = true,
            "static" => f.is_static = true,
            _ => {}
        }
    }
    for (name, _) in &mods.meths {
        match *name {
            "explicit" => f.is_explicit = true,
            "virtual" => f.is_virtual = true,
            _ => {}
        }
    }
    f.linkage = mods.linkage.clone();
}

/// Copy the gathered specifier modifiers onto a variable or field.
fn apply_mods_to_variable(mods: &TypeModifiers, v: &mut VariableDecl) {
    for (name, _) in &mods.both {
        match *name {
            "constexpr" => v.is_constexpr = true,
            "extern" => v.is_extern = true,
            "inline" => v.is_inline = true,
            "static" => v.is_static = true,
            _ => {}
        }
    }
    for (name, _) in &mods.vars {
        match *name {
            "mutable" => v.is_mutable = true,
            "thread_local" => v.is_thread_local = true,
            "constinit" => v.is_constinit = true,
            _ => {}
        }
    }
    v.linkage = mods.linkage.clone();
}

impl<'src, 'v> Parser<'src, 'v> {
    /// Parse a declaration that starts with a decl-specifier-seq: classes,
    /// enums, functions, variables, typedefs and friends all funnel through
    /// here once keyword dispatch is done.
    pub(crate) fn parse_declarations(
        &mut self,
        tok: Token,
        doxygen: Option<String>,
        template: Option<TemplateDecl>,
        attrs: Vec<Attribute>,
        is_typedef: bool,
        is_friend: bool,
    ) -> Result<()> {
        let location = tok.location.clone();

        let (parsed_type, mods) = self.parse_type(Some(tok), true)?;
        let mut parsed_type = parsed_type;

        // A class-key might introduce a definition or forward declaration
        // rather than an elaborated specifier in a larger declaration.
        if parsed_type
            .as_ref()
            .map_or(false, |p| p.typename.classkey.is_some())
        {
            let next = self.stream.peek_kind()?;
            let is_def = matches!(
                next,
                TokenKind::Colon | TokenKind::Final | TokenKind::Explicit | TokenKind::LBrace
            );
            if next == TokenKind::Semi || is_def {
                if let Some(parsed) = parsed_type.take() {
                    return self.parse_class_enum_decl(
                        parsed, mods, doxygen, template, is_typedef, is_friend, location, attrs,
                    );
                }
            }
        }

        let var_ok = !is_typedef;
        let (meth_ok, msg) = if is_typedef {
            (false, "parsing typedef")
        } else if self.in_class_block() {
            (true, "parsing declaration in class")
        } else {
            (false, "parsing declaration")
        };
        mods.validate(var_ok, meth_ok, msg)?;

        let parsed = match parsed_type {
            Some(parsed) => parsed,
            None => {
                // an `operator` was encountered: conversion operator
                return self.parse_operator_conversion(
                    mods, location, doxygen, template, is_typedef, is_friend, attrs,
                );
            }
        };

        let mut doxygen = doxygen;
        let mut location = location;
        loop {
            if self.parse_decl(
                parsed.clone(),
                &mods,
                location,
                doxygen.take(),
                template.clone(),
                is_typedef,
                is_friend,
                attrs.clone(),
            )? {
                // the declarator handled the end of the statement
                break;
            }

            let tok = self.next_must_be_any(&[TokenKind::Comma, TokenKind::Semi])?;
            location = tok.location;
            if tok.kind == TokenKind::Semi {
                break;
            }
        }
        Ok(())
    }

    /// A class/enum definition or forward declaration whose head was parsed
    /// as an elaborated type specifier.
    #[allow(clippy::too_many_arguments)]
    fn parse_class_enum_decl(
        &mut self,
        parsed: NamedType,
        mods: TypeModifiers,
        doxygen: Option<String>,
        template: Option<TemplateDecl>,
        is_typedef: bool,
        is_friend: bool,
        location: Location,
        attrs: Vec<Attribute>,
    ) -> Result<()> {
        let mut attrs = attrs;
        attrs.extend(parsed.attributes);
        let typename = parsed.typename;
        let classkey = match typename.classkey {
            Some(classkey) => classkey,
            None => {
                return Err(ParseError::new(
                    ErrorCode::InternalInvariantBroken,
                    "class declaration without a class-key",
                    location,
                ))
            }
        };

        if let Some(tok) = self.stream.token_if(TokenKind::Semi)? {
            // forward (or friend) declaration
            if is_typedef {
                return Err(self.err_unexpected(&tok, None));
            }
            mods.validate(false, false, "parsing forward declaration")?;

            // a plain `enum` cannot be forward declared, but `enum class`
            // can, and `friend enum X` is accepted
            if classkey == crate::ast::ClassKey::Enum && !is_friend {
                return Err(self.err_unexpected(&tok, None));
            }
            if template.is_some() && classkey.is_enum() {
                return Err(self.err_unexpected(&tok, None));
            }

            if let Some(name) = typename.last_name() {
                let name = name.to_string();
                self.register_type(&name);
            }
            let fdecl = ForwardDecl {
                typename,
                template,
                doxygen,
                enum_base: None,
                access: self.current_access(),
                location: location.clone(),
            };
            if is_friend {
                let access = self.current_access().ok_or_else(|| {
                    ParseError::new(
                        ErrorCode::InternalInvariantBroken,
                        "friend declaration outside of a class",
                        location.clone(),
                    )
                })?;
                self.visitor.on_friend(FriendDecl {
                    target: FriendTarget::Class(fdecl),
                    access,
                    location,
                });
            } else {
                self.visitor.on_forward_decl(fdecl);
            }
            return Ok(());
        }

        let tok = self.stream.token()?;
        mods.validate(!is_typedef, false, "parsing class declaration")?;

        if is_friend {
            // a friend definition has no meaning
            return Err(self.err_unexpected(&tok, None));
        }

        if classkey.is_enum() {
            if template.is_some() {
                return Err(self.err_unexpected(&tok, None));
            }
            self.parse_enum_decl(typename, tok, doxygen, is_typedef, location, mods, attrs)
        } else {
            self.parse_class_decl(
                typename, tok, doxygen, template, is_typedef, location, mods, attrs,
            )
        }
    }

    /// The innermost class's own name, for constructor detection.
    fn current_class_name(&self) -> Option<String> {
        match self.blocks.last() {
            Some(Block::Class { decl, .. }) => decl.typename.last_name().map(str::to_string),
            _ => None,
        }
    }

    /// One declarator and whatever follows it. Returns `true` when the end
    /// of the statement was consumed (function bodies, trailing returns).
    #[allow(clippy::too_many_arguments)]
    fn parse_decl(
        &mut self,
        base: NamedType,
        mods: &TypeModifiers,
        location: Location,
        doxygen: Option<String>,
        template: Option<TemplateDecl>,
        is_typedef: bool,
        is_friend: bool,
        attrs: Vec<Attribute>,
    ) -> Result<bool> {
        let mut dtype = Some(self.parse_cv_ptr(Type::Named(base.clone()))?);

        let mut pqname: Option<QualifiedName> = None;
        let mut op: Option<String> = None;
        let mut constructor = false;
        let mut destructor = false;

        // A leading `(` is either an obnoxious grouping paren or the
        // parameter list of a constructor/destructor.
        if let Some(tok) = self.stream.token_if(TokenKind::LParen)? {
            if self.in_class_block() {
                if let Some(Type::Named(named)) = &dtype {
                    let dsegments = &named.typename.segments;
                    let cls_name = if !is_friend {
                        self.current_class_name()
                    } else if dsegments.len() >= 2 {
                        dsegments[dsegments.len() - 2]
                            .as_name()
                            .map(str::to_string)
                    } else {
                        None
                    };
                    let ret_name = dsegments.last().and_then(NameSegment::as_name);

                    if let (Some(cls), Some(ret)) = (cls_name, ret_name) {
                        if cls == ret {
                            pqname = Some(named.typename.clone());
                            dtype = None;
                            constructor = true;
                            self.stream.return_token(tok.clone());
                        } else if format!("~{cls}") == ret {
                            pqname = Some(named.typename.clone());
                            dtype = None;
                            destructor = true;
                            self.stream.return_token(tok.clone());
                        }
                    }
                }
            }

            if dtype.is_some() {
                // grouping paren such as `void (name(int x));`
                let toks = self.stream.consume_balanced(vec![tok])?;
                self.stream.return_tokens(toks[1..toks.len() - 1].to_vec());
            }
        }

        let mut msvc_convention = None;
        if dtype.is_some() {
            msvc_convention = self.parse_msvc_convention()?;

            // structured bindings: `auto [a, b] = init;`
            if base.typename.is_auto()
                && !is_typedef
                && !is_friend
                && !self.in_class_block()
                && self.stream.peek_kind()? == TokenKind::LBracket
            {
                if let Some(dtype) = dtype.take() {
                    return self.parse_structured_binding(dtype, mods, location);
                }
            }

            if let Some(tok) = self.stream.token_if_in(TokenKind::is_pqname_start)? {
                let (name, name_op) = self.parse_pqname(Some(tok), true, false, false)?;
                pqname = Some(name);
                op = name_op;
            }
        }

        // `type name(...)` is ambiguous between a function declaration and
        // a variable initialized by constructor call; a header parser
        // resolves toward the function unless the parenthesized tokens do
        // not form a parameter clause.
        if let Some(open) = self.stream.token_if(TokenKind::LParen)? {
            let pqname = match pqname {
                Some(pqname) => pqname,
                None => return Err(self.err_unexpected(&open, Some("a declarator name"))),
            };

            if op.is_none() && !constructor && !destructor {
                let toks = self.stream.consume_balanced(vec![open])?;
                if let Some((params, vararg)) = self.reparse_parameter_clause(&toks) {
                    return self.parse_function_with_params(
                        mods,
                        dtype,
                        pqname,
                        None,
                        template,
                        doxygen,
                        location,
                        false,
                        false,
                        is_friend,
                        is_typedef,
                        msvc_convention,
                        attrs,
                        params,
                        vararg,
                    );
                }
                // not a parameter clause: treat as a constructor-style
                // initializer on a variable
                if is_typedef || self.in_class_block() {
                    return Err(ParseError::new(
                        ErrorCode::AmbiguousDeclaration,
                        format!(
                            "'{}' is neither a parameter list nor a variable initializer \
                             in this context",
                            self.make_value(&toks)
                        ),
                        location,
                    ));
                }
                let init = self.make_value(&toks[1..toks.len() - 1]);
                let dtype = dtype.ok_or_else(|| {
                    ParseError::new(
                        ErrorCode::InternalInvariantBroken,
                        "variable initializer without a type",
                        location.clone(),
                    )
                })?;
                let mut v = VariableDecl {
                    name: Some(pqname),
                    ty: dtype,
                    value: Some(init),
                    bits: None,
                    is_constexpr: false,
                    is_constinit: false,
                    is_extern: false,
                    linkage: None,
                    is_static: false,
                    is_inline: false,
                    is_thread_local: false,
                    is_mutable: false,
                    access: self.current_access(),
                    template,
                    doxygen,
                    attributes: attrs,
                    location,
                };
                apply_mods_to_variable(mods, &mut v);
                self.visitor.on_variable(v);
                return Ok(false);
            }

            return self.parse_function(
                mods,
                dtype,
                pqname,
                op,
                template,
                doxygen,
                location,
                constructor,
                destructor,
                is_friend,
                is_typedef,
                msvc_convention,
                attrs,
            );
        } else if let Some(convention) = msvc_convention {
            return Err(ParseError::new(
                ErrorCode::UnexpectedToken,
                format!("'{convention}' must be followed by a function declarator"),
                location,
            ));
        }

        if is_friend {
            // `friend Foo;`
            let tok = self.stream.token()?;
            if tok.kind != TokenKind::Semi {
                return Err(self.err_unexpected(&tok, Some("';'")));
            }
            let access = self.current_access().ok_or_else(|| {
                ParseError::new(
                    ErrorCode::InternalInvariantBroken,
                    "friend declaration outside of a class",
                    location.clone(),
                )
            })?;
            let fwd = ForwardDecl {
                typename: base.typename,
                template,
                doxygen,
                enum_base: None,
                access: Some(access),
                location: location.clone(),
            };
            self.visitor.on_friend(FriendDecl {
                target: FriendTarget::Class(fwd),
                access,
                location,
            });
            return Ok(true);
        }

        if op.is_some() {
            let tok = self.stream.token()?;
            return Err(self.err_unexpected(&tok, Some("'('")));
        }

        let dtype = dtype.ok_or_else(|| {
            ParseError::new(
                ErrorCode::InternalInvariantBroken,
                "parsing a field without a type",
                location.clone(),
            )
        })?;
        self.parse_field(mods, dtype, pqname, template, doxygen, location, is_typedef, attrs)?;
        Ok(false)
    }

    /// Try to re-parse a captured paren group as a parameter clause.
    fn reparse_parameter_clause(
        &mut self,
        toks: &[Token],
    ) -> Option<(Vec<crate::ast::Parameter>, bool)> {
        // strip the outer parens; an empty clause is trivially parameters
        let inner = &toks[1..toks.len() - 1];
        if inner.is_empty() {
            return Some((Vec::new(), false));
        }
        self.stream.begin_group(inner.to_vec());
        let result = (|| -> Result<(Vec<crate::ast::Parameter>, bool)> {
            let mut params = Vec::new();
            let mut vararg = false;
            loop {
                if self.stream.token_if(TokenKind::Ellipsis)?.is_some() {
                    vararg = true;
                    break;
                }
                params.push(self.parse_parameter(None, &[TokenKind::GroupEnd])?);
                match self.stream.token_if(TokenKind::Comma)? {
                    Some(_) => continue,
                    None => break,
                }
            }
            self.next_must_be(TokenKind::GroupEnd)?;
            Ok((params, vararg))
        })();
        let leftover = self.stream.end_group();
        match result {
            Ok((mut params, vararg)) if leftover.is_empty() => {
                self.convert_void_params(&mut params);
                Some((params, vararg))
            }
            _ => None,
        }
    }

    /// `auto [a, b] = init;` at namespace scope.
    fn parse_structured_binding(
        &mut self,
        dtype: Type,
        mods: &TypeModifiers,
        location: Location,
    ) -> Result<bool> {
        self.next_must_be(TokenKind::LBracket)?;

        let mut names = Vec::new();
        loop {
            let tok = self.next_must_be(TokenKind::Identifier)?;
            names.push(self.stream.text(tok.span).to_string());
            let tok = self.next_must_be_any(&[TokenKind::Comma, TokenKind::RBracket])?;
            if tok.kind == TokenKind::RBracket {
                break;
            }
        }

        let value = if self.stream.token_if(TokenKind::Eq)?.is_some() {
            let toks = self.stream.consume_value_until(&[TokenKind::Semi])?;
            Some(self.make_value(&toks))
        } else if let Some(open) = self.stream.token_if(TokenKind::LBrace)? {
            let toks = self.stream.consume_balanced(vec![open])?;
            Some(self.make_value(&toks))
        } else if let Some(open) = self.stream.token_if(TokenKind::LParen)? {
            let toks = self.stream.consume_balanced(vec![open])?;
            Some(self.make_value(&toks))
        } else {
            None
        };

        self.visitor.on_structured_binding(StructuredBindingDecl {
            names,
            ty: dtype,
            value,
            is_static: mods.has("static"),
            is_thread_local: mods.has("thread_local"),
            location,
        });
        Ok(false)
    }

    // ============================================================
    // Fields and variables
    // ============================================================

    /// A variable, class field or typedef declarator (after the declarator
    /// name), including arrays, bit-fields and initializers.
    #[allow(clippy::too_many_arguments)]
    fn parse_field(
        &mut self,
        mods: &TypeModifiers,
        dtype: Type,
        pqname: Option<QualifiedName>,
        template: Option<TemplateDecl>,
        doxygen: Option<String>,
        location: Location,
        is_typedef: bool,
        attrs: Vec<Attribute>,
    ) -> Result<()> {
        let is_class_block = self.in_class_block();
        let mut dtype = dtype;
        let mut name = None;

        match &pqname {
            None => {
                if is_typedef {
                    return Err(ParseError::new(
                        ErrorCode::UnexpectedToken,
                        "an empty name is not allowed in a typedef",
                        location,
                    ));
                }
                if !is_class_block {
                    return Err(ParseError::new(
                        ErrorCode::UnexpectedToken,
                        "variables must have names",
                        location,
                    ));
                }
            }
            Some(pqname) => {
                let last = pqname.segments.last().and_then(NameSegment::as_name);
                let last = match last {
                    Some(last) => last,
                    None => {
                        return Err(ParseError::new(
                            ErrorCode::UnexpectedToken,
                            format!("invalid name for a variable: {pqname}"),
                            location,
                        ))
                    }
                };
                if is_typedef || is_class_block {
                    name = Some(last.to_string());
                    if pqname.segments.len() > 1 {
                        return Err(ParseError::new(
                            ErrorCode::UnexpectedToken,
                            format!("'{pqname}' may not have multiple segments here"),
                            location,
                        ));
                    }
                }
            }
        }

        if let Some(open) = self.stream.token_if(TokenKind::LBracket)? {
            dtype = self.parse_array_type(open, dtype)?;
        }

        // bit-field width
        let mut bits = None;
        if let Some(tok) = self.stream.token_if(TokenKind::Colon)? {
            if is_typedef || !is_class_block {
                return Err(self.err_unexpected(&tok, None));
            }
            let toks = self.stream.consume_value_until(&[
                TokenKind::Comma,
                TokenKind::Semi,
                TokenKind::Eq,
                TokenKind::LBrace,
            ])?;
            bits = Some(self.make_value(&toks));
        }

        // initializer
        let mut default = None;
        if self.stream.token_if(TokenKind::Eq)?.is_some() {
            if is_typedef {
                return Err(ParseError::new(
                    ErrorCode::UnexpectedToken,
                    "a typedef may not have an initializer",
                    location,
                ));
            }
            let toks = self
                .stream
                .consume_value_until(&[TokenKind::Comma, TokenKind::Semi])?;
            default = Some(self.make_value(&toks));
        } else if let Some(open) = self.stream.token_if(TokenKind::LBrace)? {
            if is_typedef {
                return Err(self.err_unexpected(&open, None));
            }
            let toks = self.stream.consume_balanced(vec![open])?;
            default = Some(self.make_value(&toks));
        }

        // a doxygen comment may trail the declaration on the same line
        let mut doxygen = doxygen;
        if doxygen.is_none() {
            let line = self.stream.last_location().line;
            let _ = self.stream.peek2_kind()?;
            doxygen = self.stream.take_doxygen_on_line(line);
        }

        if is_typedef {
            let name = name.ok_or_else(|| {
                ParseError::new(
                    ErrorCode::UnexpectedToken,
                    "a typedef must have a name",
                    location.clone(),
                )
            })?;
            self.register_type(&name);
            self.visitor.on_typedef(TypedefDecl {
                ty: dtype,
                name,
                access: self.current_access(),
                location,
            });
        } else {
            let var_name = match (name, pqname) {
                (Some(name), Some(pqname)) => Some(QualifiedName::new(
                    vec![NameSegment::name(name)],
                    pqname.location,
                )),
                (_, pqname) => pqname,
            };
            let mut v = VariableDecl {
                name: var_name,
                ty: dtype,
                value: default,
                bits,
                is_constexpr: false,
                is_constinit: false,
                is_extern: false,
                linkage: None,
                is_static: false,
                is_inline: false,
                is_thread_local: false,
                is_mutable: false,
                access: self.current_access(),
                template,
                doxygen,
                attributes: attrs,
                location,
            };
            apply_mods_to_variable(mods, &mut v);
            self.visitor.on_variable(v);
        }
        Ok(())
    }

    // ============================================================
    // Functions and methods
    // ============================================================

    /// A function declarator whose parameter `(` was just consumed.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn parse_function(
        &mut self,
        mods: &TypeModifiers,
        return_type: Option<Type>,
        pqname: QualifiedName,
        op: Option<String>,
        template: Option<TemplateDecl>,
        doxygen: Option<String>,
        location: Location,
        constructor: bool,
        destructor: bool,
        is_friend: bool,
        is_typedef: bool,
        msvc_convention: Option<String>,
        attrs: Vec<Attribute>,
    ) -> Result<bool> {
        let (params, vararg) = self.parse_parameters()?;
        self.parse_function_with_params(
            mods,
            return_type,
            pqname,
            op,
            template,
            doxygen,
            location,
            constructor,
            destructor,
            is_friend,
            is_typedef,
            msvc_convention,
            attrs,
            params,
            vararg,
        )
    }

    /// Everything after a function's parameter list.
    #[allow(clippy::too_many_arguments)]
    fn parse_function_with_params(
        &mut self,
        mods: &TypeModifiers,
        return_type: Option<Type>,
        pqname: QualifiedName,
        op: Option<String>,
        template: Option<TemplateDecl>,
        doxygen: Option<String>,
        location: Location,
        constructor: bool,
        destructor: bool,
        is_friend: bool,
        is_typedef: bool,
        msvc_convention: Option<String>,
        attrs: Vec<Attribute>,
        params: Vec<crate::ast::Parameter>,
        vararg: bool,
    ) -> Result<bool> {
        if pqname.segments.last().and_then(NameSegment::as_name).is_none() {
            return Err(ParseError::new(
                ErrorCode::UnexpectedToken,
                "invalid function name",
                location,
            ));
        }

        let mut f = FunctionDecl::new(pqname, location.clone());
        f.return_type = return_type;
        f.parameters = params;
        f.vararg = vararg;
        f.doxygen = doxygen;
        f.template = template;
        f.msvc_convention = msvc_convention;
        f.operator = op;
        f.is_constructor = constructor;
        f.is_destructor = destructor;
        f.attributes = attrs;
        apply_mods_to_function(mods, &mut f);

        let is_class_block = self.in_class_block();
        if is_class_block && !is_typedef {
            f.access = self.current_access();
            self.parse_method_end(&mut f)?;

            let handled = f.has_body || f.has_trailing_return;
            if is_friend {
                f.is_friend = true;
                let access = f.access.unwrap_or(crate::ast::Access::Private);
                self.visitor.on_friend(FriendDecl {
                    target: FriendTarget::Function(Box::new(f)),
                    access,
                    location,
                });
            } else {
                // a method name has a single segment unless it is an
                // operator spelled with a qualified target
                if f.name.segments.len() > 1
                    && !f
                        .name
                        .segments
                        .first()
                        .and_then(NameSegment::as_name)
                        .map_or(false, |n| n.starts_with("operator"))
                {
                    return Err(ParseError::new(
                        ErrorCode::UnexpectedToken,
                        format!("invalid method name '{}'", f.name),
                        location,
                    ));
                }
                self.visitor.on_function(f);
            }
            return Ok(handled);
        }

        self.parse_fn_end(&mut f)?;

        if is_typedef {
            self.typedef_function(f)?;
            return Ok(false);
        }

        let handled = f.has_body || f.has_trailing_return;
        self.visitor.on_function(f);
        Ok(handled)
    }

    /// `typedef int fn_t(char);` becomes a typedef of a function type.
    fn typedef_function(&mut self, f: FunctionDecl) -> Result<()> {
        let location = f.location.clone();
        let err = |message: &str| {
            Err(ParseError::new(
                ErrorCode::UnexpectedToken,
                message.to_string(),
                location.clone(),
            ))
        };

        if f.name.segments.len() != 1 {
            return err("a typedef name may not be qualified");
        }
        let name = match f.name.last_name() {
            Some(name) => name.to_string(),
            None => return err("a typedef function must have a name"),
        };
        if f.is_constexpr || f.is_extern || f.is_static || f.is_inline {
            return err("a typedef function may not have storage specifiers");
        }
        if f.has_body {
            return err("a typedef may not be a function definition");
        }
        if f.template.is_some() {
            return err("a typedef function may not have a template");
        }
        let return_type = match f.return_type {
            Some(ty) => ty,
            None => return err("a typedef function must have a return type"),
        };

        let fntype = FunctionType {
            return_type: Box::new(return_type),
            parameters: f.parameters,
            vararg: f.vararg,
            has_trailing_return: f.has_trailing_return,
            noexcept: f.noexcept,
            msvc_convention: f.msvc_convention,
        };
        self.register_type(&name);
        self.visitor.on_typedef(TypedefDecl {
            ty: Type::Function(fntype),
            name,
            access: self.current_access(),
            location: f.location,
        });
        Ok(())
    }

    /// Keywords after the parameters of a free function, and the body if
    /// present.
    fn parse_fn_end(&mut self, f: &mut FunctionDecl) -> Result<()> {
        loop {
            if self.stream.token_if(TokenKind::Throw)?.is_some() {
                let open = self.next_must_be(TokenKind::LParen)?;
                let toks = self.stream.consume_balanced(vec![open])?;
                f.throw = Some(self.make_value(&toks));
                continue;
            }
            if self.stream.token_if(TokenKind::Noexcept)?.is_some() {
                f.noexcept = Some(self.parse_noexcept_value()?);
                continue;
            }
            if self.stream.token_if(TokenKind::Requires)?.is_some() {
                f.requires_clause = Some(self.parse_requires_clause()?);
                continue;
            }
            if let Some(atok) = self.attribute_start_token()? {
                f.attributes.extend(self.parse_attribute_seq(atok)?);
                continue;
            }
            if self.stream.token_if(TokenKind::Arrow)?.is_some() {
                let current = f.return_type.take().ok_or_else(|| {
                    ParseError::new(
                        ErrorCode::UnexpectedToken,
                        "a trailing return type requires a return type of 'auto'",
                        self.stream.last_location(),
                    )
                })?;
                f.return_type = Some(self.parse_trailing_return_type(&current)?);
                f.has_trailing_return = true;
                continue;
            }
            if self.stream.token_if(TokenKind::LBrace)?.is_some() {
                self.consume_function_body(f)?;
            }
            break;
        }
        Ok(())
    }

    /// Keywords after the parameters of a method: cv, ref-qualifiers,
    /// virt-specifiers, `= 0/default/delete`, exception specs, trailing
    /// return, constructor initializers and the body.
    fn parse_method_end(&mut self, f: &mut FunctionDecl) -> Result<()> {
        loop {
            let tok = self.stream.token()?;
            match tok.kind {
                TokenKind::Colon => {
                    self.parse_ctor_initializers(f)?;
                    break;
                }
                TokenKind::LBrace => {
                    self.consume_function_body(f)?;
                    break;
                }
                TokenKind::Eq => {
                    let tok = self.stream.token()?;
                    match tok.kind {
                        TokenKind::Number if self.stream.text(tok.span) == "0" => {
                            f.is_pure_virtual = true;
                        }
                        TokenKind::Delete => f.is_deleted = true,
                        TokenKind::Default => f.is_defaulted = true,
                        _ => {
                            return Err(
                                self.err_unexpected(&tok, Some("'0', 'delete' or 'default'"))
                            )
                        }
                    }
                    break;
                }
                TokenKind::Const => f.is_const = true,
                TokenKind::Volatile => f.is_volatile = true,
                TokenKind::Override => f.is_override = true,
                TokenKind::Final => f.is_final = true,
                TokenKind::Amp => f.ref_qualifier = Some(RefQualifier::LValue),
                TokenKind::AmpAmp => f.ref_qualifier = Some(RefQualifier::RValue),
                TokenKind::Arrow => {
                    let current = f.return_type.take().ok_or_else(|| {
                        self.err_unexpected(&tok, Some("no trailing return on a constructor"))
                    })?;
                    f.return_type = Some(self.parse_trailing_return_type(&current)?);
                    f.has_trailing_return = true;
                }
                TokenKind::Throw => {
                    let open = self.next_must_be(TokenKind::LParen)?;
                    let toks = self.stream.consume_balanced(vec![open])?;
                    f.throw = Some(self.make_value(&toks));
                }
                TokenKind::Noexcept => {
                    f.noexcept = Some(self.parse_noexcept_value()?);
                }
                TokenKind::Requires => {
                    f.requires_clause = Some(self.parse_requires_clause()?);
                }
                _ => {
                    if self.is_attribute_start(&tok)? {
                        let seq = self.parse_attribute_seq(tok)?;
                        f.attributes.extend(seq);
                        continue;
                    }
                    self.stream.return_token(tok);
                    break;
                }
            }
        }
        Ok(())
    }

    /// Capture a constructor's member-initializer list, then consume the
    /// body that must follow it.
    fn parse_ctor_initializers(&mut self, f: &mut FunctionDecl) -> Result<()> {
        let mut toks: Vec<Token> = Vec::new();

        loop {
            let mut tok = self.stream.token()?;
            if tok.kind == TokenKind::ColonColon {
                toks.push(tok);
                tok = self.stream.token()?;
            }
            if tok.kind == TokenKind::Decltype {
                toks.push(tok);
                let open = self.next_must_be(TokenKind::LParen)?;
                toks.extend(self.stream.consume_balanced(vec![open])?);
                tok = self.stream.token()?;
            }

            // each initializer is `name(...)` or `name{...}`
            loop {
                match tok.kind {
                    TokenKind::LBrace | TokenKind::LParen => {
                        toks.extend(self.stream.consume_balanced(vec![tok])?);
                        tok = self.stream.token()?;
                        break;
                    }
                    _ => {
                        toks.push(tok);
                        tok = self.stream.token()?;
                    }
                }
            }

            if tok.kind == TokenKind::Ellipsis {
                toks.push(tok);
                tok = self.stream.token()?;
            }

            match tok.kind {
                TokenKind::Comma => {
                    toks.push(tok);
                    continue;
                }
                TokenKind::LBrace => {
                    f.member_initializers = Some(self.make_value(&toks));
                    self.consume_function_body(f)?;
                    return Ok(());
                }
                _ => return Err(self.err_unexpected(&tok, Some("',' or '{'"))),
            }
        }
    }

    /// Consume a function body; entered with the `{` consumed.
    fn consume_function_body(&mut self, f: &mut FunctionDecl) -> Result<()> {
        f.has_body = true;
        match self.options.method_body {
            MethodBody::Skip => {
                self.stream
                    .discard_contents(TokenKind::LBrace, TokenKind::RBrace)?;
            }
            MethodBody::RetainTokens => {
                let toks = self
                    .stream
                    .capture_contents(TokenKind::LBrace, TokenKind::RBrace)?;
                f.body = Some(self.make_value(&toks[..toks.len() - 1]));
            }
        }
        Ok(())
    }

    // ============================================================
    // Conversion operators
    // ============================================================

    /// `operator target-type ( ) ...` — the target type is recorded as the
    /// return type.
    #[allow(clippy::too_many_arguments)]
    fn parse_operator_conversion(
        &mut self,
        mods: TypeModifiers,
        location: Location,
        doxygen: Option<String>,
        template: Option<TemplateDecl>,
        is_typedef: bool,
        is_friend: bool,
        attrs: Vec<Attribute>,
    ) -> Result<()> {
        let tok = self.next_must_be(TokenKind::Operator)?;
        if is_typedef {
            return Err(self.err_unexpected(&tok, None));
        }

        let (ctype, cmods) = self.parse_type(None, false)?;
        let ctype = match ctype {
            Some(ctype) => ctype,
            None => {
                let tok = self.stream.token()?;
                return Err(self.err_unexpected(&tok, Some("a conversion target type")));
            }
        };
        cmods.validate(false, false, "parsing conversion operator")?;
        let dtype = self.parse_cv_ptr(Type::Named(ctype))?;

        self.next_must_be(TokenKind::LParen)?;

        let pqname = QualifiedName::new(vec![NameSegment::name("operator")], location.clone());

        if self.parse_function(
            &mods,
            Some(dtype),
            pqname,
            Some("conversion".to_string()),
            template,
            doxygen,
            location,
            false,
            false,
            is_friend,
            false,
            None,
            attrs,
        )? {
            // the body was consumed
            return Ok(());
        }

        self.next_must_be(TokenKind::Semi)?;
        Ok(())
    }

    // ============================================================
    // Trailing declarators after class/enum bodies
    // ============================================================

    /// Handle what follows a class or enum body: `;`, or declarators such
    /// as `struct X { } x, *px;` (typedef names in a typedef context).
    pub(crate) fn finish_class_or_enum(
        &mut self,
        name: QualifiedName,
        is_typedef: bool,
        mods: TypeModifiers,
    ) -> Result<()> {
        let base = NamedType::new(name);

        if let Some(tok) = self.stream.token_if(TokenKind::GnuAttribute)? {
            let _ = self.parse_attribute_seq(tok)?;
        }

        if !is_typedef && self.stream.token_if(TokenKind::Semi)?.is_some() {
            return Ok(());
        }

        loop {
            let location = self.stream.peek_location()?;
            if self.parse_decl(
                base.clone(),
                &mods,
                location,
                None,
                None,
                is_typedef,
                false,
                Vec::new(),
            )? {
                break;
            }
            let tok = self.next_must_be_any(&[TokenKind::Comma, TokenKind::Semi])?;
            if tok.kind == TokenKind::Semi {
                break;
            }
        }
        Ok(())
    }
}

//! Qualified names, decl-specifier sequences and declarators.

use super::{Parser, Result, TypeModifiers};
use crate::ast::{
    Array, FunctionType, MemberPointer, NameSegment, NamedType, Parameter, Pointer, QualifiedName,
    RefKind, Reference, TemplateArgValue, TemplateArgument, TemplateSpecialization, Type, Value,
};
use crate::diagnostics::{ErrorCode, ParseError};
use crate::lexer::{Token, TokenKind};

/// Canonical order for compound fundamental type keywords: sign first,
/// then length modifiers, then the base type.
fn fundamental_rank(word: &str) -> u8 {
    match word {
        "signed" | "unsigned" => 0,
        "short" | "long" => 1,
        _ => 2,
    }
}

impl<'src, 'v> Parser<'src, 'v> {
    // ============================================================
    // Qualified names
    // ============================================================

    /// Parse a possibly qualified type or function name, stopping (without
    /// consuming) at the first token that cannot continue it.
    ///
    /// * `fn_ok`: operator names are permitted
    /// * `compound_ok`: elaborated type specifiers (`struct X`) permitted
    /// * `fund_ok`: fundamental types permitted
    ///
    /// Returns the name and, for operators, the operator spelling.
    pub(crate) fn parse_pqname(
        &mut self,
        tok: Option<Token>,
        fn_ok: bool,
        compound_ok: bool,
        fund_ok: bool,
    ) -> Result<(QualifiedName, Option<String>)> {
        let mut tok = match tok {
            Some(tok) => tok,
            None => self.stream.token()?,
        };
        if !tok.kind.is_pqname_start() {
            return Err(self.err_unexpected(&tok, Some("a name")));
        }

        let location = tok.location.clone();
        let mut segments: Vec<NameSegment> = Vec::new();
        let mut classkey = None;
        let mut has_typename = false;
        let mut op = None;

        if tok.kind == TokenKind::Auto {
            return Ok((
                QualifiedName::new(vec![NameSegment::Auto], location),
                None,
            ));
        }

        if tok.kind.is_class_key() {
            if !compound_ok {
                return Err(self.err_unexpected(&tok, None));
            }
            classkey = Some(self.parse_class_key(&tok)?);

            // an attribute may be embedded after the class-key
            if let Some(atok) = self.attribute_start_token()? {
                let attrs = self.parse_attribute_seq(atok)?;
                self.pqname_attrs.extend(attrs);
            }

            match self.stream.token_if_in(|k| {
                matches!(k, TokenKind::Identifier | TokenKind::ColonColon)
            })? {
                Some(next) => tok = next,
                None => {
                    // unnamed class/enum/struct
                    let id = self.next_anon_id();
                    segments.push(NameSegment::Anonymous { id });
                    let mut name = QualifiedName::new(segments, location);
                    name.classkey = classkey;
                    return Ok((name, None));
                }
            }
        } else if tok.kind == TokenKind::Typename {
            has_typename = true;
            tok = self.stream.token()?;
            if !tok.kind.is_pqname_start() {
                return Err(self.err_unexpected(&tok, Some("a name")));
            }
        }

        // A leading `::` denotes the global namespace.
        if tok.kind == TokenKind::ColonColon {
            segments.push(NameSegment::name(""));
            tok = self.next_must_be_any(&[
                TokenKind::Identifier,
                TokenKind::Template,
                TokenKind::Operator,
                TokenKind::Tilde,
            ])?;
        }

        loop {
            match tok.kind {
                TokenKind::Decltype => {
                    segments.push(self.parse_decltype_specifier()?);
                }
                kind if kind.is_fundamental() => {
                    if !fund_ok {
                        return Err(self.err_unexpected(&tok, None));
                    }
                    segments.push(self.parse_fundamental(&tok)?);
                    // nothing comes after a fundamental
                    break;
                }
                _ => {
                    let mut tok = tok;
                    if tok.kind == TokenKind::Template {
                        tok = self.next_must_be(TokenKind::Identifier)?;
                    }
                    let (segment, seg_op) = self.parse_pqname_segment(tok, fn_ok)?;
                    segments.push(segment);
                    if let Some(seg_op) = seg_op {
                        op = Some(seg_op);
                        // nothing comes after an operator
                        break;
                    }
                }
            }

            if self.stream.token_if(TokenKind::ColonColon)?.is_none() {
                break;
            }
            tok = self.next_must_be_any(&[
                TokenKind::Identifier,
                TokenKind::Operator,
                TokenKind::Template,
                TokenKind::Decltype,
                TokenKind::Tilde,
            ])?;
        }

        let mut name = QualifiedName::new(segments, location);
        name.classkey = classkey;
        name.has_typename = has_typename;
        Ok((name, op))
    }

    /// The class-key, folding `enum class` / `enum struct`.
    fn parse_class_key(&mut self, tok: &Token) -> Result<crate::ast::ClassKey> {
        use crate::ast::ClassKey;
        Ok(match tok.kind {
            TokenKind::Class => ClassKey::Class,
            TokenKind::Struct => ClassKey::Struct,
            TokenKind::Union => ClassKey::Union,
            TokenKind::Enum => {
                if self.stream.token_if(TokenKind::Class)?.is_some() {
                    ClassKey::EnumClass
                } else if self.stream.token_if(TokenKind::Struct)?.is_some() {
                    ClassKey::EnumStruct
                } else {
                    ClassKey::Enum
                }
            }
            _ => {
                return Err(ParseError::new(
                    ErrorCode::InternalInvariantBroken,
                    "class-key expected",
                    tok.location.clone(),
                ))
            }
        })
    }

    /// `decltype ( expression )` as a name segment.
    fn parse_decltype_specifier(&mut self) -> Result<NameSegment> {
        let open = self.next_must_be(TokenKind::LParen)?;
        let toks = self.stream.consume_balanced(vec![open])?;
        let inner = &toks[1..toks.len() - 1];
        Ok(NameSegment::Decltype {
            tokens: self.make_value(inner),
        })
    }

    /// A run of fundamental keywords, canonicalized into one segment.
    fn parse_fundamental(&mut self, tok: &Token) -> Result<NameSegment> {
        let mut words = vec![self.stream.text(tok.span).to_string()];
        if tok.kind.is_compound_fundamental() {
            while let Some(next) = self
                .stream
                .token_if_in(TokenKind::is_compound_fundamental)?
            {
                words.push(self.stream.text(next.span).to_string());
            }
        }
        // `long unsigned` and friends canonicalize to sign-first order;
        // the sort is stable so `long long` keeps both words.
        words.sort_by_key(|w| fundamental_rank(w));
        Ok(NameSegment::Fundamental {
            name: words.join(" "),
        })
    }

    /// One name segment: identifier, `~dtor`, or an operator name, with an
    /// optional template specialization.
    fn parse_pqname_segment(
        &mut self,
        tok: Token,
        fn_ok: bool,
    ) -> Result<(NameSegment, Option<String>)> {
        let mut op = None;
        let name = match tok.kind {
            TokenKind::Operator => {
                let spelling = self.parse_operator_spelling()?;
                if !fn_ok {
                    return Err(ParseError::new(
                        ErrorCode::UnexpectedToken,
                        format!("unexpected operator name 'operator{spelling}'"),
                        tok.location,
                    ));
                }
                op = Some(spelling.clone());
                format!("operator{spelling}")
            }
            TokenKind::Tilde => {
                let name_tok = self.next_must_be(TokenKind::Identifier)?;
                format!("~{}", self.stream.text(name_tok.span))
            }
            _ => self.stream.text(tok.span).to_string(),
        };

        let specialization = if op.is_none() && self.stream.token_if(TokenKind::Lt)?.is_some() {
            Some(self.parse_template_specialization()?)
        } else {
            None
        };

        Ok((
            NameSegment::Name {
                name,
                specialization,
            },
            op,
        ))
    }

    /// The token spelling of an overloaded operator, collected up to the
    /// opening paren of the parameter list. Covers symbol operators,
    /// `operator()`, `operator[]`, new/delete forms and literal operators.
    fn parse_operator_spelling(&mut self) -> Result<String> {
        let tok = self.stream.token()?;
        let mut parts = vec![self.stream.ast_token(&tok)];

        if tok.kind == TokenKind::LParen {
            let close = self.next_must_be(TokenKind::RParen)?;
            parts.push(self.stream.ast_token(&close));
        } else {
            let mut rest = Vec::new();
            self.stream.consume_until(&mut rest, &[TokenKind::LParen])?;
            parts.extend(rest.iter().map(|t| self.stream.ast_token(t)));
        }

        Ok(parts.into_iter().map(|t| t.value).collect())
    }

    // ============================================================
    // Template specializations
    // ============================================================

    /// Template-id arguments; entered with the `<` consumed.
    ///
    /// Each argument is first captured as a balanced token run, then
    /// re-parsed as a type through a fenced group. Arguments that fail the
    /// type parse stay unparsed values.
    pub(crate) fn parse_template_specialization(&mut self) -> Result<TemplateSpecialization> {
        let mut args: Vec<TemplateArgument> = Vec::new();
        let start_line = self.stream.last_location().line;

        loop {
            // `<>` and a `>>` closing an enclosing list both end here
            if matches!(
                self.stream.peek_kind()?,
                TokenKind::Gt | TokenKind::Shr
            ) {
                self.template_separator()?;
                break;
            }

            let raw_toks = self
                .stream
                .consume_value_until(&[
                    TokenKind::Comma,
                    TokenKind::Gt,
                    TokenKind::Shr,
                    TokenKind::Ellipsis,
                ])
                .map_err(|e| {
                    e.with_context(&format!(
                        "template argument list starting at line {start_line}"
                    ))
                })?;
            let val = self.make_value(&raw_toks);

            let mut dtype = None;
            if raw_toks
                .first()
                .map_or(false, |t| t.kind.is_pqname_start())
            {
                dtype = self.reparse_type_tokens(raw_toks.clone());
            }

            let is_pack = self.stream.token_if(TokenKind::Ellipsis)?.is_some();

            args.push(TemplateArgument {
                arg: match dtype {
                    Some(ty) => TemplateArgValue::Type(Box::new(ty)),
                    None => TemplateArgValue::Tokens(val),
                },
                is_pack,
            });

            if self.template_separator()? {
                break;
            }
        }

        Ok(TemplateSpecialization { args })
    }

    /// Speculatively parse a captured token run as a type. Returns `None`
    /// when the run is not a well-formed type (the caller keeps the raw
    /// value instead).
    pub(crate) fn reparse_type_tokens(&mut self, toks: Vec<Token>) -> Option<Type> {
        self.stream.begin_group(toks);
        let result = (|| -> Result<Type> {
            let (parsed, mods) = self.parse_type(None, false)?;
            let parsed = parsed.ok_or_else(|| {
                ParseError::new(
                    ErrorCode::UnexpectedToken,
                    "not a type",
                    self.stream.last_location(),
                )
            })?;
            mods.validate(false, false, "parsing template argument")?;
            let dtype = self.parse_cv_ptr_or_fn(Type::Named(parsed), true)?;
            self.next_must_be(TokenKind::GroupEnd)?;
            Ok(dtype)
        })();
        let leftover = self.stream.end_group();
        match result {
            Ok(ty) if leftover.is_empty() => Some(ty),
            _ => None,
        }
    }

    // ============================================================
    // Decl-specifier sequences
    // ============================================================

    /// Parse the leading specifier run of a declaration: cv qualifiers,
    /// storage and function specifiers, attributes, and at most one type
    /// specifier. Stops (without consuming) at the first token it does not
    /// understand; the caller decides what the leftovers mean.
    ///
    /// The type is `None` only when `operator_ok` is set and a conversion
    /// operator name was encountered.
    pub(crate) fn parse_type(
        &mut self,
        tok: Option<Token>,
        operator_ok: bool,
    ) -> Result<(Option<NamedType>, TypeModifiers)> {
        let mut is_const = false;
        let mut is_volatile = false;
        let mut mods = TypeModifiers::default();
        let mut attrs = Vec::new();
        let mut pqname: Option<QualifiedName> = None;
        let mut pqname_optional = false;

        let mut tok = match tok {
            Some(tok) => tok,
            None => self.stream.token()?,
        };

        loop {
            if self.is_attribute_start(&tok)? {
                attrs.extend(self.parse_attribute_seq(tok)?);
                tok = self.stream.token()?;
                continue;
            }
            match tok.kind {
                kind if kind.is_pqname_start() => {
                    if pqname.is_some() {
                        // a second name run starts the declarator
                        self.stream.return_token(tok);
                        break;
                    }
                    if operator_ok && kind == TokenKind::Operator {
                        // conversion operator: the type is the target
                        pqname_optional = true;
                        self.stream.return_token(tok);
                        break;
                    }
                    let (name, _) = self.parse_pqname(Some(tok), false, true, true)?;
                    pqname = Some(name);
                }
                TokenKind::Star | TokenKind::Amp | TokenKind::AmpAmp | TokenKind::LParen => {
                    if pqname.is_none() {
                        return Err(self.err_unexpected(&tok, Some("a type name")));
                    }
                    self.stream.return_token(tok);
                    break;
                }
                TokenKind::Const => is_const = true,
                TokenKind::Volatile => is_volatile = true,
                TokenKind::Constexpr => mods.both.push(("constexpr", tok.location.clone())),
                TokenKind::Consteval => mods.both.push(("consteval", tok.location.clone())),
                TokenKind::Inline => mods.both.push(("inline", tok.location.clone())),
                TokenKind::Static => mods.both.push(("static", tok.location.clone())),
                TokenKind::Extern => {
                    if let Some(link) = self.stream.token_if(TokenKind::StringLit)? {
                        mods.linkage = Some(self.stream.text(link.span).to_string());
                    }
                    mods.both.push(("extern", tok.location.clone()));
                }
                TokenKind::Explicit => mods.meths.push(("explicit", tok.location.clone())),
                TokenKind::Virtual => mods.meths.push(("virtual", tok.location.clone())),
                TokenKind::Mutable => mods.vars.push(("mutable", tok.location.clone())),
                TokenKind::ThreadLocal => mods.vars.push(("thread_local", tok.location.clone())),
                TokenKind::Constinit => mods.vars.push(("constinit", tok.location.clone())),
                TokenKind::Register => {}
                _ => {
                    self.stream.return_token(tok);
                    break;
                }
            }
            tok = self.stream.token()?;
        }

        let parsed = match pqname {
            Some(typename) => {
                let mut named = NamedType::new(typename);
                named.is_const = is_const;
                named.is_volatile = is_volatile;
                named.attributes = attrs;
                named.attributes.append(&mut self.pqname_attrs);
                Some(named)
            }
            None => {
                if !pqname_optional {
                    let tok = self.stream.token()?;
                    return Err(self.err_unexpected(&tok, Some("a type name")));
                }
                None
            }
        };

        Ok((parsed, mods))
    }

    // ============================================================
    // Declarators
    // ============================================================

    /// Array declarator; `tok` is the already-consumed `[`. Recurses for
    /// multidimensional arrays, which bind right to left.
    pub(crate) fn parse_array_type(&mut self, tok: Token, dtype: Type) -> Result<Type> {
        if dtype.is_reference() {
            return Err(ParseError::new(
                ErrorCode::UnexpectedToken,
                "arrays of references are illegal",
                tok.location,
            ));
        }

        let toks = self.stream.consume_balanced(vec![tok])?;
        let mut dtype = dtype;
        if let Some(next) = self.stream.token_if(TokenKind::LBracket)? {
            dtype = self.parse_array_type(next, dtype)?;
        }

        let inner = &toks[1..toks.len() - 1];
        let size = if inner.is_empty() {
            None
        } else {
            Some(self.make_value(inner))
        };

        Ok(Type::Array(Array {
            element: Box::new(dtype),
            size,
        }))
    }

    /// Wrap a base type with the pointer/reference/member-pointer/cv/paren
    /// decorations that follow it. Errors when the result is a bare
    /// function type.
    pub(crate) fn parse_cv_ptr(&mut self, dtype: Type) -> Result<Type> {
        let dtype = self.parse_cv_ptr_or_fn(dtype, false)?;
        if matches!(dtype, Type::Function(_)) {
            return Err(ParseError::new(
                ErrorCode::UnexpectedToken,
                "unexpected function type",
                self.stream.last_location(),
            ));
        }
        Ok(dtype)
    }

    /// Declarator decorations. `nonptr_fn` permits a bare function type,
    /// used when re-parsing template arguments like `Foo<int(char)>`.
    pub(crate) fn parse_cv_ptr_or_fn(&mut self, mut dtype: Type, nonptr_fn: bool) -> Result<Type> {
        loop {
            if let Some(class_name) = self.try_member_pointer_prefix()? {
                dtype = Type::MemberPointer(MemberPointer {
                    class_name,
                    pointee: Box::new(dtype),
                    is_const: false,
                    is_volatile: false,
                });
                continue;
            }

            let tok = match self.stream.token_if_in(|k| {
                matches!(
                    k,
                    TokenKind::Star | TokenKind::Const | TokenKind::Volatile | TokenKind::LParen
                )
            })? {
                Some(tok) => tok,
                None => break,
            };

            match tok.kind {
                TokenKind::Star => {
                    if dtype.is_reference() {
                        return Err(self.err_unexpected(&tok, None));
                    }
                    dtype = Type::Pointer(Pointer {
                        pointee: Box::new(dtype),
                        is_const: false,
                        is_volatile: false,
                    });
                }
                TokenKind::Const => {
                    if !set_const(&mut dtype) {
                        return Err(self.err_unexpected(&tok, None));
                    }
                }
                TokenKind::Volatile => {
                    if !set_volatile(&mut dtype) {
                        return Err(self.err_unexpected(&tok, None));
                    }
                }
                _ if nonptr_fn => {
                    // bare function type in a template argument
                    loop {
                        let gtok = match self.stream.token_if(TokenKind::LParen)? {
                            Some(gtok) => gtok,
                            None => break,
                        };
                        let toks = self.stream.consume_balanced(vec![gtok])?;
                        self.stream
                            .return_tokens(toks[1..toks.len() - 1].to_vec());
                    }
                    let (parameters, vararg) = self.parse_parameters()?;
                    let mut fn_type = FunctionType {
                        return_type: Box::new(dtype),
                        parameters,
                        vararg,
                        has_trailing_return: false,
                        noexcept: None,
                        msvc_convention: None,
                    };
                    if self.stream.token_if(TokenKind::Noexcept)?.is_some() {
                        fn_type.noexcept = Some(self.parse_noexcept_value()?);
                    }
                    if self.stream.token_if(TokenKind::Arrow)?.is_some() {
                        let ret = self.parse_trailing_return_type(&fn_type.return_type)?;
                        fn_type.return_type = Box::new(ret);
                        fn_type.has_trailing_return = true;
                    }
                    dtype = Type::Function(fn_type);
                }
                _ => {
                    // `(` - either a grouping paren around a declarator
                    // (function pointer and friends) or not ours at all
                    let msvc_convention = self.parse_msvc_convention()?;

                    let grouping = matches!(
                        self.stream.peek_kind()?,
                        TokenKind::Star | TokenKind::Amp | TokenKind::AmpAmp
                    ) || self.peek_member_pointer_prefix()?;
                    if !grouping {
                        self.stream.return_token(tok);
                        break;
                    }

                    let toks = self.stream.consume_balanced(vec![tok])?;

                    match self
                        .stream
                        .token_if_in(|k| matches!(k, TokenKind::LBracket | TokenKind::LParen))?
                    {
                        Some(aptok) if aptok.kind == TokenKind::LBracket => {
                            dtype = self.parse_array_type(aptok, dtype)?;
                        }
                        Some(_) => {
                            let (parameters, vararg) = self.parse_parameters()?;
                            dtype = Type::Function(FunctionType {
                                return_type: Box::new(dtype),
                                parameters,
                                vararg,
                                has_trailing_return: false,
                                noexcept: None,
                                msvc_convention,
                            });
                        }
                        None => {}
                    }

                    // re-feed the inner declarator tokens and recurse
                    self.stream
                        .return_tokens(toks[1..toks.len() - 1].to_vec());
                    dtype = self.parse_cv_ptr_or_fn(dtype, nonptr_fn)?;
                    break;
                }
            }
        }

        if let Some(tok) = self
            .stream
            .token_if_in(|k| matches!(k, TokenKind::Amp | TokenKind::AmpAmp))?
        {
            if dtype.is_reference() {
                return Err(self.err_unexpected(&tok, None));
            }
            let kind = if tok.kind == TokenKind::Amp {
                RefKind::LValue
            } else {
                RefKind::RValue
            };
            dtype = Type::Reference(Reference {
                referent: Box::new(dtype),
                kind,
            });
            // a paren after the ref-qualifier can be a function pointer
            if self.stream.peek_kind()? == TokenKind::LParen {
                dtype = self.parse_cv_ptr_or_fn(dtype, nonptr_fn)?;
            }
        }

        Ok(dtype)
    }

    /// An MSVC calling convention keyword, when those are enabled.
    pub(crate) fn parse_msvc_convention(&mut self) -> Result<Option<String>> {
        let tok = self
            .stream
            .token_if_in(TokenKind::is_msvc_convention)?;
        match tok {
            Some(tok) => {
                if !self.options.msvc_attributes && self.options.strict {
                    return Err(ParseError::new(
                        ErrorCode::Unsupported,
                        format!(
                            "calling convention '{}' requires MSVC extensions",
                            self.stream.text(tok.span)
                        ),
                        tok.location,
                    ));
                }
                Ok(Some(self.stream.text(tok.span).to_string()))
            }
            None => Ok(None),
        }
    }

    /// Pure lookahead for a `Name::(Name::)* *` member-pointer prefix.
    /// Pulls tokens to check the pattern and pushes them all back.
    fn peek_member_pointer_prefix(&mut self) -> Result<bool> {
        match self.stream.peek_kind()? {
            TokenKind::Identifier | TokenKind::ColonColon => {}
            _ => return Ok(false),
        }

        let mut taken: Vec<Token> = Vec::new();
        let mut matched = false;

        if let Some(tok) = self.stream.token_if(TokenKind::ColonColon)? {
            taken.push(tok);
        }
        loop {
            match self.stream.token_if(TokenKind::Identifier)? {
                Some(tok) => taken.push(tok),
                None => break,
            }
            match self.stream.token_if(TokenKind::ColonColon)? {
                Some(tok) => taken.push(tok),
                None => break,
            }
            if let Some(star) = self.stream.token_if(TokenKind::Star)? {
                taken.push(star);
                matched = true;
                break;
            }
        }

        self.stream.return_tokens(taken);
        Ok(matched)
    }

    /// Consume a member-pointer prefix known to be present (checked with
    /// [`Parser::peek_member_pointer_prefix`]), returning the class name.
    fn try_member_pointer_prefix(&mut self) -> Result<Option<QualifiedName>> {
        if !self.peek_member_pointer_prefix()? {
            return Ok(None);
        }

        let mut segments: Vec<NameSegment> = Vec::new();
        let mut location = None;

        if let Some(tok) = self.stream.token_if(TokenKind::ColonColon)? {
            segments.push(NameSegment::name(""));
            location = Some(tok.location.clone());
        }

        loop {
            let name_tok = self.next_must_be(TokenKind::Identifier)?;
            segments.push(NameSegment::name(self.stream.text(name_tok.span)));
            location.get_or_insert_with(|| name_tok.location.clone());

            self.next_must_be(TokenKind::ColonColon)?;
            if self.stream.token_if(TokenKind::Star)?.is_some() {
                let location = location.unwrap_or_else(|| self.stream.last_location());
                return Ok(Some(QualifiedName::new(segments, location)));
            }
        }
    }

    // ============================================================
    // Parameters
    // ============================================================

    /// A single parameter declaration (also used for template non-type
    /// parameters, with `end` set to the closing `>`).
    pub(crate) fn parse_parameter(
        &mut self,
        tok: Option<Token>,
        end: &[TokenKind],
    ) -> Result<Parameter> {
        let (parsed, mods) = self.parse_type(tok, false)?;
        let parsed = match parsed {
            Some(parsed) => parsed,
            None => {
                let tok = self.stream.token()?;
                return Err(self.err_unexpected(&tok, Some("a parameter type")));
            }
        };
        mods.validate(false, false, "parsing parameter")?;

        let mut dtype = self.parse_cv_ptr(Type::Named(parsed))?;
        let is_pack = self.stream.token_if(TokenKind::Ellipsis)?.is_some();

        // the name can be wrapped in parens
        if let Some(open) = self.stream.token_if(TokenKind::LParen)? {
            let toks = self.stream.consume_balanced(vec![open])?;
            self.stream.return_tokens(toks[1..toks.len() - 1].to_vec());
        }

        let name = match self.stream.token_if_in(|k| {
            matches!(
                k,
                TokenKind::Identifier | TokenKind::Final | TokenKind::Override
            )
        })? {
            Some(tok) => Some(self.stream.text(tok.span).to_string()),
            None => None,
        };

        if let Some(open) = self.stream.token_if(TokenKind::LBracket)? {
            dtype = self.parse_array_type(open, dtype)?;
        }

        let default = if self.stream.token_if(TokenKind::Eq)?.is_some() {
            let mut stop = vec![TokenKind::Comma];
            stop.extend_from_slice(end);
            if end.contains(&TokenKind::Gt) {
                stop.push(TokenKind::Shr);
            }
            let toks = self.stream.consume_value_until(&stop)?;
            Some(self.make_value(&toks))
        } else {
            None
        };

        Ok(Parameter {
            ty: dtype,
            name,
            default,
            is_pack,
            attributes: Vec::new(),
        })
    }

    /// A parenthesized parameter list; entered with the `(` consumed.
    /// Returns the parameters and whether the list ended with `...`.
    pub(crate) fn parse_parameters(&mut self) -> Result<(Vec<Parameter>, bool)> {
        if self.stream.token_if(TokenKind::RParen)?.is_some() {
            return Ok((Vec::new(), false));
        }

        let mut params = Vec::new();
        let mut vararg = false;

        loop {
            if self.stream.token_if(TokenKind::Ellipsis)?.is_some() {
                vararg = true;
                self.next_must_be(TokenKind::RParen)?;
                break;
            }

            params.push(self.parse_parameter(None, &[TokenKind::RParen])?);
            let tok = self.next_must_be_any(&[TokenKind::Comma, TokenKind::RParen])?;
            if tok.kind == TokenKind::RParen {
                break;
            }
        }

        self.convert_void_params(&mut params);
        Ok((params, vararg))
    }

    /// `fn(void)` records as zero parameters when the option asks for it.
    pub(crate) fn convert_void_params(&self, params: &mut Vec<Parameter>) {
        if !self.options.convert_void_to_zero_params || params.len() != 1 {
            return;
        }
        let only_void = matches!(
            &params[0],
            Parameter {
                ty: Type::Named(named),
                name: None,
                default: None,
                ..
            } if matches!(
                named.typename.segments.as_slice(),
                [NameSegment::Fundamental { name }] if name == "void"
            )
        );
        if only_void {
            params.clear();
        }
    }

    /// The value of a `noexcept` specifier: empty for bare `noexcept`, the
    /// inner tokens for `noexcept(...)`.
    pub(crate) fn parse_noexcept_value(&mut self) -> Result<Value> {
        match self.stream.token_if(TokenKind::LParen)? {
            Some(open) => {
                let toks = self.stream.consume_balanced(vec![open])?;
                Ok(self.make_value(&toks[1..toks.len() - 1]))
            }
            None => Ok(Value::default()),
        }
    }

    /// A trailing return type; entered with the `->` consumed. The current
    /// return type must be a plain `auto`.
    pub(crate) fn parse_trailing_return_type(&mut self, current: &Type) -> Result<Type> {
        let ok = matches!(
            current,
            Type::Named(named)
                if named.typename.is_auto() && !named.is_const && !named.is_volatile
        );
        if !ok {
            return Err(ParseError::new(
                ErrorCode::UnexpectedToken,
                "a trailing return type requires a return type of 'auto'",
                self.stream.last_location(),
            ));
        }

        let (parsed, mods) = self.parse_type(None, false)?;
        let parsed = match parsed {
            Some(parsed) => parsed,
            None => {
                let tok = self.stream.token()?;
                return Err(self.err_unexpected(&tok, Some("a return type")));
            }
        };
        mods.validate(false, false, "parsing trailing return type")?;
        self.parse_cv_ptr(Type::Named(parsed))
    }

    // ============================================================
    // Requires clauses
    // ============================================================

    /// Capture a `requires` clause as an opaque token run, reading primary
    /// constraints joined by `&&`/`||`. The clause is never validated.
    pub(crate) fn parse_requires_clause(&mut self) -> Result<Value> {
        if !self.options.concepts {
            return Err(ParseError::new(
                ErrorCode::Unsupported,
                "requires clauses are disabled",
                self.stream.last_location(),
            ));
        }
        let mut toks: Vec<Token> = Vec::new();
        loop {
            self.parse_constraint_primary(&mut toks)?;
            match self
                .stream
                .token_if_in(|k| matches!(k, TokenKind::AmpAmp | TokenKind::PipePipe))?
            {
                Some(tok) => toks.push(tok),
                None => break,
            }
        }
        Ok(self.make_value(&toks))
    }

    /// One primary constraint: a parenthesized expression, a
    /// requires-expression, a negation, or a (possibly qualified,
    /// possibly templated) name.
    fn parse_constraint_primary(&mut self, toks: &mut Vec<Token>) -> Result<()> {
        if let Some(open) = self.stream.token_if(TokenKind::LParen)? {
            toks.extend(self.stream.consume_balanced(vec![open])?);
            return Ok(());
        }
        if let Some(req) = self.stream.token_if(TokenKind::Requires)? {
            toks.push(req);
            if let Some(open) = self.stream.token_if(TokenKind::LParen)? {
                toks.extend(self.stream.consume_balanced(vec![open])?);
            }
            let open = self.next_must_be(TokenKind::LBrace)?;
            toks.extend(self.stream.consume_balanced(vec![open])?);
            return Ok(());
        }
        if let Some(bang) = self.stream.token_if(TokenKind::Bang)? {
            toks.push(bang);
            return self.parse_constraint_primary(toks);
        }

        // a qualified name, literal, or bool constant
        loop {
            let tok = self.stream.token()?;
            match tok.kind {
                TokenKind::Identifier
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Number => toks.push(tok),
                _ => return Err(self.err_unexpected(&tok, Some("a constraint expression"))),
            }
            if self.stream.peek_kind()? == TokenKind::Lt {
                let open = self.stream.token()?;
                toks.extend(self.stream.consume_balanced(vec![open])?);
            }
            match self.stream.token_if(TokenKind::ColonColon)? {
                Some(colons) => toks.push(colons),
                None => break,
            }
        }
        Ok(())
    }
}

fn set_const(dtype: &mut Type) -> bool {
    match dtype {
        Type::Named(t) => t.is_const = true,
        Type::Pointer(p) => p.is_const = true,
        Type::MemberPointer(m) => m.is_const = true,
        _ => return false,
    }
    true
}

fn set_volatile(dtype: &mut Type) -> bool {
    match dtype {
        Type::Named(t) => t.is_volatile = true,
        Type::Pointer(p) => p.is_volatile = true,
        Type::MemberPointer(m) => m.is_volatile = true,
        _ => return false,
    }
    true
}

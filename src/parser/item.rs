//! Keyword-led productions: namespaces, using, classes, enums, templates,
//! friends, static_assert, linkage blocks and attribute sequences.

use super::{Block, Parser, Result, TypeModifiers};
use crate::ast::{
    Access, Attribute, AttributeKind, BaseClass, ClassDecl, ConceptDecl, EnumDecl, Enumerator,
    ForwardDecl, NameSegment, NamespaceAliasDecl, NamespaceDecl, QualifiedName, StaticAssertDecl,
    TemplateDecl, TemplateInstantiationDecl, TemplateNonTypeParam, TemplateParam,
    TemplateTypeParam, UsingAliasDecl, UsingDecl, UsingDirectiveDecl, UsingEnumDecl,
};
use crate::diagnostics::{ErrorCode, ParseError};
use crate::lexer::{Token, TokenKind};
use crate::options::ExternTemplate;
use crate::scope::ScopeKind;
use crate::span::Location;

impl<'src, 'v> Parser<'src, 'v> {
    // ============================================================
    // Namespaces
    // ============================================================

    /// Namespace definition (named, nested `A::B::C`, anonymous, inline)
    /// or a namespace alias. Entered with `namespace` consumed.
    pub(crate) fn parse_namespace(
        &mut self,
        tok: Token,
        _doxygen: Option<String>,
        is_inline: bool,
    ) -> Result<()> {
        let location = tok.location;
        let mut names: Vec<String> = Vec::new();

        let mut tok = self.next_must_be_any(&[TokenKind::Identifier, TokenKind::LBrace])?;
        if tok.kind != TokenKind::LBrace {
            loop {
                names.push(self.stream.text(tok.span).to_string());

                // `namespace A = B::C;`
                if names.len() == 1 && self.stream.token_if(TokenKind::Eq)?.is_some() {
                    let (target, _) = self.parse_pqname(None, false, false, false)?;
                    self.next_must_be(TokenKind::Semi)?;
                    self.visitor.on_namespace_alias(NamespaceAliasDecl {
                        name: names.remove(0),
                        target,
                        location,
                    });
                    return Ok(());
                }

                let next =
                    self.next_must_be_any(&[TokenKind::ColonColon, TokenKind::LBrace])?;
                if next.kind == TokenKind::LBrace {
                    break;
                }
                tok = self.next_must_be(TokenKind::Identifier)?;
            }
        }

        let scope_name = if names.is_empty() {
            None
        } else {
            Some(names.join("::"))
        };
        self.blocks.push(Block::Namespace);
        self.scopes.push(ScopeKind::Namespace, scope_name);
        self.visitor.enter_namespace(NamespaceDecl {
            names,
            is_inline,
            location,
        });
        Ok(())
    }

    // ============================================================
    // extern blocks, extern template
    // ============================================================

    /// `extern` at declaration position: a linkage block, an extern
    /// template instantiation, or a storage-class specifier on an ordinary
    /// declaration.
    pub(crate) fn parse_extern(
        &mut self,
        tok: Token,
        doxygen: Option<String>,
        attrs: Vec<Attribute>,
    ) -> Result<()> {
        if let Some(etok) = self.stream.token_if(TokenKind::StringLit)? {
            if self.stream.token_if(TokenKind::LBrace)?.is_some() {
                let linkage = self.stream.text(etok.span).to_string();
                self.blocks.push(Block::Extern);
                self.visitor.enter_extern_block(linkage, tok.location);
                return Ok(());
            }
            // an extern variable/function with explicit linkage
            self.stream.return_token(etok);
        } else if self.stream.token_if(TokenKind::Template)?.is_some() {
            return self.parse_template_instantiation(true, tok.location);
        }

        self.parse_declarations(tok, doxygen, None, attrs, false, false)
    }

    /// `template class Foo<int>;` / `extern template class Foo<int>;`,
    /// captured unparsed up to the `;`.
    pub(crate) fn parse_template_instantiation(
        &mut self,
        is_extern: bool,
        location: Location,
    ) -> Result<()> {
        let toks = self.stream.consume_value_until(&[TokenKind::Semi])?;
        self.next_must_be(TokenKind::Semi)?;

        if is_extern && self.options.extern_template_handling == ExternTemplate::Skip {
            return Ok(());
        }
        self.visitor
            .on_template_instantiation(TemplateInstantiationDecl {
                is_extern,
                tokens: self.make_value(&toks),
                location,
            });
        Ok(())
    }

    // ============================================================
    // typedef
    // ============================================================

    pub(crate) fn parse_typedef(
        &mut self,
        _tok: Token,
        doxygen: Option<String>,
        attrs: Vec<Attribute>,
    ) -> Result<()> {
        let tok = self.stream.token()?;
        self.parse_declarations(tok, doxygen, None, attrs, true, false)
    }

    // ============================================================
    // static_assert
    // ============================================================

    /// `static_assert(condition)` / `static_assert(condition, "message")`.
    pub(crate) fn parse_static_assert(&mut self, tok: Token) -> Result<()> {
        let open = self.next_must_be(TokenKind::LParen)?;
        let toks = self.stream.consume_balanced(vec![open])?;
        self.next_must_be(TokenKind::Semi)?;

        let inner = &toks[1..toks.len() - 1];

        // split at the last depth-0 comma when a message string follows it
        let mut depth = 0usize;
        let mut split = None;
        for (i, t) in inner.iter().enumerate() {
            match t.kind {
                TokenKind::LParen | TokenKind::LBrace | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBrace | TokenKind::RBracket => {
                    depth = depth.saturating_sub(1)
                }
                TokenKind::Comma if depth == 0 => split = Some(i),
                _ => {}
            }
        }

        let (condition, message) = match split {
            Some(i)
                if inner.len() == i + 2 && inner[i + 1].kind == TokenKind::StringLit =>
            {
                let message = self.stream.text(inner[i + 1].span).to_string();
                (&inner[..i], Some(message))
            }
            _ => (inner, None),
        };

        self.visitor.on_static_assert(StaticAssertDecl {
            condition: self.make_value(condition),
            message,
            location: tok.location,
        });
        Ok(())
    }

    // ============================================================
    // using
    // ============================================================

    /// `using` family: directive, declaration, enum-using, or alias.
    /// Entered with `using` consumed; consumes the trailing `;`.
    pub(crate) fn parse_using(
        &mut self,
        tok: Token,
        _doxygen: Option<String>,
        template: Option<TemplateDecl>,
    ) -> Result<()> {
        let location = tok.location;
        let tok = self.next_must_be_any(&[
            TokenKind::Identifier,
            TokenKind::ColonColon,
            TokenKind::Namespace,
            TokenKind::Typename,
            TokenKind::Enum,
        ])?;
        let is_alias =
            tok.kind == TokenKind::Identifier && self.stream.peek_kind()? == TokenKind::Eq;

        match tok.kind {
            TokenKind::Namespace => {
                if template.is_some() {
                    return Err(ParseError::new(
                        ErrorCode::UnexpectedToken,
                        "unexpected using-directive when parsing alias-declaration",
                        tok.location.clone(),
                    ));
                }
                if self.in_class_block() {
                    return Err(self.err_unexpected(&tok, None));
                }
                self.parse_using_directive(location)?;
            }
            TokenKind::Enum => {
                let (typename, _) = self.parse_pqname(None, false, false, false)?;
                self.visitor.on_using_enum(UsingEnumDecl {
                    typename,
                    access: self.current_access(),
                    location,
                });
            }
            TokenKind::Identifier if is_alias => {
                self.stream.token()?; // `=`
                self.parse_using_typealias(tok, template, location)?;
            }
            _ => {
                if template.is_some() {
                    return Err(ParseError::new(
                        ErrorCode::UnexpectedToken,
                        "unexpected using-declaration when parsing alias-declaration",
                        tok.location.clone(),
                    ));
                }
                self.parse_using_declaration(tok, location)?;
            }
        }

        self.next_must_be(TokenKind::Semi)?;
        Ok(())
    }

    /// `using namespace ns::child;`
    fn parse_using_directive(&mut self, location: Location) -> Result<()> {
        let mut segments = Vec::new();
        if self.stream.token_if(TokenKind::ColonColon)?.is_some() {
            segments.push(NameSegment::name(""));
        }
        loop {
            let tok = self.next_must_be(TokenKind::Identifier)?;
            segments.push(NameSegment::name(self.stream.text(tok.span)));
            if self.stream.token_if(TokenKind::ColonColon)?.is_none() {
                break;
            }
        }
        let namespace = QualifiedName::new(segments, location.clone());
        self.visitor
            .on_using_directive(UsingDirectiveDecl {
                namespace,
                location,
            });
        Ok(())
    }

    /// `using NS::name;`
    fn parse_using_declaration(&mut self, tok: Token, location: Location) -> Result<()> {
        let tok = if tok.kind == TokenKind::Typename {
            self.stream.token()?
        } else {
            tok
        };
        let (typename, _) = self.parse_pqname(Some(tok), true, true, true)?;
        if let Some(name) = typename.last_name() {
            let name = name.to_string();
            self.register_type(&name);
        }
        self.visitor.on_using_declaration(UsingDecl {
            typename,
            access: self.current_access(),
            location,
        });
        Ok(())
    }

    /// `using name = type;`
    fn parse_using_typealias(
        &mut self,
        id_tok: Token,
        template: Option<TemplateDecl>,
        location: Location,
    ) -> Result<()> {
        let (parsed, mods) = self.parse_type(None, false)?;
        let parsed = match parsed {
            Some(parsed) => parsed,
            None => {
                let tok = self.stream.token()?;
                return Err(self.err_unexpected(&tok, Some("a type")));
            }
        };
        mods.validate(false, false, "parsing type alias")?;
        let dtype = self.parse_cv_ptr(crate::ast::Type::Named(parsed))?;

        let alias = self.stream.text(id_tok.span).to_string();
        self.register_type(&alias);
        self.visitor.on_using_alias(UsingAliasDecl {
            alias,
            ty: dtype,
            template,
            access: self.current_access(),
            location,
        });
        Ok(())
    }

    // ============================================================
    // Templates
    // ============================================================

    /// `template` at declaration position: a template declaration or an
    /// explicit instantiation. Entered with `template` consumed.
    pub(crate) fn parse_template(
        &mut self,
        tok: Token,
        doxygen: Option<String>,
        attrs: Vec<Attribute>,
    ) -> Result<()> {
        if self.stream.peek_kind()? != TokenKind::Lt {
            return self.parse_template_instantiation(false, tok.location);
        }

        let mut template = self.parse_template_decl()?;
        if self.stream.peek_kind()? == TokenKind::Requires {
            self.stream.token()?;
            template.requires_clause = Some(self.parse_requires_clause()?);
        }

        self.push_template_scope(&template);
        let depth_before = self.blocks.len();
        let result = self.parse_templated_entity(tok.location, doxygen, attrs, template);

        // If the templated declaration opened a class body, its block pops
        // the template header scope along with its own; otherwise the
        // declaration is complete and the scope ends here.
        let deferred = result.is_ok()
            && self.blocks.len() > depth_before
            && matches!(self.blocks.last(), Some(Block::Class { .. }));
        if deferred {
            if let Some(Block::Class {
                pops_template_scope,
                ..
            }) = self.blocks.last_mut()
            {
                *pops_template_scope = true;
            }
        } else {
            self.scopes.pop();
        }
        result
    }

    fn parse_templated_entity(
        &mut self,
        location: Location,
        doxygen: Option<String>,
        attrs: Vec<Attribute>,
        template: TemplateDecl,
    ) -> Result<()> {
        let tok = self.stream.token()?;
        match tok.kind {
            TokenKind::Using => self.parse_using(tok, doxygen, Some(template)),
            TokenKind::Friend => self.parse_friend(tok, doxygen, Some(template), attrs),
            TokenKind::Concept => {
                if !self.options.concepts {
                    return Err(ParseError::new(
                        ErrorCode::Unsupported,
                        "concept declarations are disabled",
                        tok.location,
                    ));
                }
                self.parse_concept(template, doxygen, location)
            }
            TokenKind::Template => Err(ParseError::new(
                ErrorCode::Unsupported,
                "out-of-line member templates of class templates are not modeled",
                tok.location,
            )),
            _ => self.parse_declarations(tok, doxygen, Some(template), attrs, false, false),
        }
    }

    /// A template parameter list; entered at the `<`.
    pub(crate) fn parse_template_decl(&mut self) -> Result<TemplateDecl> {
        self.next_must_be(TokenKind::Lt)?;
        let mut params: Vec<TemplateParam> = Vec::new();

        if self.stream.token_if(TokenKind::Gt)?.is_none() {
            loop {
                let tok = self.stream.token()?;
                let param = match tok.kind {
                    TokenKind::Template => {
                        let inner = self.parse_template_decl()?;
                        let key =
                            self.next_must_be_any(&[TokenKind::Class, TokenKind::Typename])?;
                        TemplateParam::Type(
                            self.parse_template_type_parameter(&key, Some(inner))?,
                        )
                    }
                    TokenKind::Class => {
                        TemplateParam::Type(self.parse_template_type_parameter(&tok, None)?)
                    }
                    TokenKind::Typename => {
                        let ptok = self.stream.token()?;
                        let is_type_param = matches!(
                            ptok.kind,
                            TokenKind::Ellipsis
                                | TokenKind::Eq
                                | TokenKind::Comma
                                | TokenKind::Gt
                                | TokenKind::Shr
                        ) || (ptok.kind == TokenKind::Identifier
                            && matches!(
                                self.stream.peek_kind()?,
                                TokenKind::Eq
                                    | TokenKind::Comma
                                    | TokenKind::Gt
                                    | TokenKind::Shr
                            ));
                        if is_type_param {
                            self.stream.return_token(ptok);
                            TemplateParam::Type(
                                self.parse_template_type_parameter(&tok, None)?,
                            )
                        } else {
                            // a dependent non-type param (`typename T::type N`)
                            self.nontype_template_param(Some(ptok))?
                        }
                    }
                    _ => self.nontype_template_param(Some(tok))?,
                };
                params.push(param);

                if self.template_separator()? {
                    break;
                }
            }
        }

        Ok(TemplateDecl {
            params,
            requires_clause: None,
        })
    }

    fn nontype_template_param(&mut self, tok: Option<Token>) -> Result<TemplateParam> {
        let param = self.parse_parameter(tok, &[TokenKind::Gt])?;
        Ok(TemplateParam::NonType(TemplateNonTypeParam {
            ty: param.ty,
            name: param.name,
            default: param.default,
            is_pack: param.is_pack,
        }))
    }

    /// `class T`, `typename T = X`, `typename... Ts`, or a template
    /// template parameter when `template` is set.
    fn parse_template_type_parameter(
        &mut self,
        key: &Token,
        template: Option<TemplateDecl>,
    ) -> Result<TemplateTypeParam> {
        let typekey = self.stream.text(key.span).to_string();
        let is_pack = self.stream.token_if(TokenKind::Ellipsis)?.is_some();
        let name = match self.stream.token_if(TokenKind::Identifier)? {
            Some(tok) => Some(self.stream.text(tok.span).to_string()),
            None => None,
        };
        let default = if self.stream.token_if(TokenKind::Eq)?.is_some() {
            let toks = self.stream.consume_value_until(&[
                TokenKind::Comma,
                TokenKind::Gt,
                TokenKind::Shr,
            ])?;
            Some(self.make_value(&toks))
        } else {
            None
        };

        Ok(TemplateTypeParam {
            typekey,
            name,
            is_pack,
            default,
            template: template.map(Box::new),
        })
    }

    /// `template <...> concept Name = constraint;` with the constraint
    /// captured unparsed. Entered with `concept` consumed.
    fn parse_concept(
        &mut self,
        template: TemplateDecl,
        doxygen: Option<String>,
        location: Location,
    ) -> Result<()> {
        let name_tok = self.next_must_be(TokenKind::Identifier)?;
        let name = self.stream.text(name_tok.span).to_string();
        self.next_must_be(TokenKind::Eq)?;
        let toks = self.stream.consume_value_until(&[TokenKind::Semi])?;
        self.next_must_be(TokenKind::Semi)?;

        self.visitor.on_concept(ConceptDecl {
            name,
            template,
            expression: self.make_value(&toks),
            doxygen,
            location,
        });
        Ok(())
    }

    // ============================================================
    // Friends
    // ============================================================

    /// `friend` declarations; entered with `friend` consumed.
    pub(crate) fn parse_friend(
        &mut self,
        tok: Token,
        doxygen: Option<String>,
        template: Option<TemplateDecl>,
        attrs: Vec<Attribute>,
    ) -> Result<()> {
        if !self.in_class_block() {
            return Err(self.err_unexpected(&tok, None));
        }
        let tok = self.stream.token()?;
        self.parse_declarations(tok, doxygen, template, attrs, false, true)
    }

    // ============================================================
    // Enums
    // ============================================================

    /// Enum body or opaque forward declaration. On entry the head name is
    /// parsed and `tok` is the token after it (`:`, `{`, or `;` handled by
    /// the caller).
    pub(crate) fn parse_enum_decl(
        &mut self,
        typename: QualifiedName,
        tok: Token,
        doxygen: Option<String>,
        is_typedef: bool,
        location: Location,
        mods: TypeModifiers,
        attrs: Vec<Attribute>,
    ) -> Result<()> {
        let mut tok = tok;
        let mut base = None;

        if tok.kind == TokenKind::Colon {
            let (parsed_base, _) = self.parse_pqname(None, false, false, true)?;
            base = Some(parsed_base);
            tok = self.next_must_be_any(&[TokenKind::LBrace, TokenKind::Semi])?;

            if tok.kind == TokenKind::Semi {
                if is_typedef {
                    return Err(self.err_unexpected(&tok, None));
                }
                // opaque enum declaration with a base
                if let Some(name) = typename.last_name() {
                    let name = name.to_string();
                    self.register_type(&name);
                }
                self.visitor.on_forward_decl(ForwardDecl {
                    typename,
                    template: None,
                    doxygen,
                    enum_base: base,
                    access: self.current_access(),
                    location,
                });
                return Ok(());
            }
        }

        if tok.kind != TokenKind::LBrace {
            return Err(self.err_unexpected(&tok, Some("'{'")));
        }

        let values = self.parse_enumerator_list()?;

        if let Some(name) = typename.last_name() {
            let name = name.to_string();
            self.register_type(&name);
        }
        let enum_decl = EnumDecl {
            typename: typename.clone(),
            values,
            base,
            doxygen,
            access: self.current_access(),
            attributes: attrs,
            location,
        };
        self.visitor.on_enum(enum_decl);

        self.finish_class_or_enum(typename, is_typedef, mods)
    }

    /// Enumerators up to the closing `}` (consumed).
    fn parse_enumerator_list(&mut self) -> Result<Vec<Enumerator>> {
        let mut values = Vec::new();

        loop {
            let name_tok =
                self.next_must_be_any(&[TokenKind::RBrace, TokenKind::Identifier])?;
            if name_tok.kind == TokenKind::RBrace {
                break;
            }
            let line = name_tok.location.line;
            let mut doxygen = self.stream.take_doxygen_before(line);

            let mut attributes = Vec::new();
            if let Some(atok) = self.attribute_start_token()? {
                attributes = self.parse_attribute_seq(atok)?;
            }

            let mut value = None;
            let mut tok = self.next_must_be_any(&[
                TokenKind::RBrace,
                TokenKind::Comma,
                TokenKind::Eq,
            ])?;
            if tok.kind == TokenKind::Eq {
                let toks = self
                    .stream
                    .consume_value_until(&[TokenKind::Comma, TokenKind::RBrace])?;
                value = Some(self.make_value(&toks));
                tok = self.next_must_be_any(&[TokenKind::RBrace, TokenKind::Comma])?;
            }

            if doxygen.is_none() {
                // look ahead so a trailing comment on this line gets lexed
                let _ = self.stream.peek_kind()?;
                doxygen = self.stream.take_doxygen_on_line(line);
            }

            values.push(Enumerator {
                name: self.stream.text(name_tok.span).to_string(),
                value,
                attributes,
                doxygen,
                location: name_tok.location,
            });

            if tok.kind == TokenKind::RBrace {
                break;
            }
        }

        Ok(values)
    }

    // ============================================================
    // Classes
    // ============================================================

    /// Class head (virt-specifiers and base clause) and body start. On
    /// entry the head name is parsed and `tok` is the token after it.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn parse_class_decl(
        &mut self,
        typename: QualifiedName,
        tok: Token,
        doxygen: Option<String>,
        template: Option<TemplateDecl>,
        is_typedef: bool,
        location: Location,
        mods: TypeModifiers,
        attrs: Vec<Attribute>,
    ) -> Result<()> {
        let default_access = typename
            .classkey
            .map(|k| k.default_access())
            .unwrap_or(Access::Public);

        let mut bases = Vec::new();
        let mut is_final = false;

        let mut tok = tok;
        loop {
            match tok.kind {
                TokenKind::Final => is_final = true,
                // tolerated on some dllexport-style classes
                TokenKind::Explicit => {}
                _ => break,
            }
            tok = self.stream.token()?;
        }

        if tok.kind == TokenKind::Colon {
            bases = self.parse_class_base_clause(default_access)?;
            tok = self.stream.token()?;
        }

        if tok.kind != TokenKind::LBrace {
            return Err(self.err_unexpected(&tok, Some("'{'")));
        }

        let scope_name = typename.last_name().map(str::to_string);
        if let Some(name) = &scope_name {
            self.register_type(name);
        }

        let decl = ClassDecl {
            typename,
            bases,
            template,
            is_final,
            doxygen,
            access: self.current_access(),
            attributes: attrs,
            location,
        };
        self.blocks.push(Block::Class {
            decl: decl.clone(),
            access: default_access,
            is_typedef,
            mods,
            pops_template_scope: false,
        });
        self.scopes.push(ScopeKind::Class, scope_name);
        self.visitor.enter_class(decl);
        Ok(())
    }

    /// The base-specifier list after the `:` of a class head.
    fn parse_class_base_clause(&mut self, default_access: Access) -> Result<Vec<BaseClass>> {
        let mut bases = Vec::new();

        loop {
            if let Some(atok) = self.attribute_start_token()? {
                // attributes on a base specifier are consumed and dropped
                let _ = self.parse_attribute_seq(atok)?;
            }

            let mut access = default_access;
            let mut is_virtual = false;
            loop {
                let tok = match self.stream.token_if_in(|k| {
                    matches!(
                        k,
                        TokenKind::Public
                            | TokenKind::Protected
                            | TokenKind::Private
                            | TokenKind::Virtual
                    )
                })? {
                    Some(tok) => tok,
                    None => break,
                };
                match tok.kind {
                    TokenKind::Virtual => is_virtual = true,
                    TokenKind::Public => access = Access::Public,
                    TokenKind::Protected => access = Access::Protected,
                    _ => access = Access::Private,
                }
            }

            let (typename, _) = self.parse_pqname(None, false, false, false)?;
            let is_pack = self.stream.token_if(TokenKind::Ellipsis)?.is_some();

            bases.push(BaseClass {
                access,
                typename,
                is_virtual,
                is_pack,
            });

            if self.stream.token_if(TokenKind::Comma)?.is_none() {
                break;
            }
        }

        Ok(bases)
    }

    // ============================================================
    // Attributes
    // ============================================================

    /// Whether `tok` begins an attribute. A `[` counts only when another
    /// `[` follows immediately.
    pub(crate) fn is_attribute_start(&mut self, tok: &Token) -> Result<bool> {
        Ok(match tok.kind {
            TokenKind::Alignas | TokenKind::GnuAttribute | TokenKind::Declspec => true,
            TokenKind::LBracket => self.stream.peek_kind()? == TokenKind::LBracket,
            _ => false,
        })
    }

    /// Consume and return the next token when it begins an attribute.
    pub(crate) fn attribute_start_token(&mut self) -> Result<Option<Token>> {
        let tok = match self.stream.token_eof_ok()? {
            Some(tok) => tok,
            None => return Ok(None),
        };
        if self.is_attribute_start(&tok)? {
            Ok(Some(tok))
        } else {
            self.stream.return_token(tok);
            Ok(None)
        }
    }

    /// An attribute-specifier-seq: one or more attributes back to back.
    pub(crate) fn parse_attribute_seq(&mut self, tok: Token) -> Result<Vec<Attribute>> {
        let mut attrs = vec![self.parse_one_attribute(tok)?];
        while let Some(next) = self.attribute_start_token()? {
            attrs.push(self.parse_one_attribute(next)?);
        }
        Ok(attrs)
    }

    fn parse_one_attribute(&mut self, tok: Token) -> Result<Attribute> {
        let location = tok.location.clone();
        let (kind, toks) = match tok.kind {
            TokenKind::LBracket => {
                let toks = self.stream.consume_balanced(vec![tok])?;
                (AttributeKind::DoubleBracket, toks)
            }
            TokenKind::Alignas => {
                let open = self.next_must_be(TokenKind::LParen)?;
                let mut toks = vec![tok];
                toks.extend(self.stream.consume_balanced(vec![open])?);
                (AttributeKind::Alignas, toks)
            }
            TokenKind::GnuAttribute => {
                if !self.options.gnu_attributes && self.options.strict {
                    return Err(ParseError::new(
                        ErrorCode::Unsupported,
                        "__attribute__ requires GNU extensions",
                        location,
                    ));
                }
                let open1 = self.next_must_be(TokenKind::LParen)?;
                let open2 = self.next_must_be(TokenKind::LParen)?;
                let mut toks = vec![tok];
                toks.extend(self.stream.consume_balanced(vec![open1, open2])?);
                (AttributeKind::Gnu, toks)
            }
            TokenKind::Declspec => {
                if !self.options.msvc_attributes && self.options.strict {
                    return Err(ParseError::new(
                        ErrorCode::Unsupported,
                        "__declspec requires MSVC extensions",
                        location,
                    ));
                }
                let open = self.next_must_be(TokenKind::LParen)?;
                let mut toks = vec![tok];
                toks.extend(self.stream.consume_balanced(vec![open])?);
                (AttributeKind::Declspec, toks)
            }
            _ => {
                return Err(ParseError::new(
                    ErrorCode::InternalInvariantBroken,
                    "attribute parser called on a non-attribute token",
                    location,
                ))
            }
        };

        Ok(Attribute {
            kind,
            tokens: self.make_value(&toks),
            location,
        })
    }
}

use crate::ast::*;
use crate::error::{ParseError, SyntaxError};
use crate::lexer::{tokenize, Span, Token, TokenKind};

type PResult<T> = Result<T, SyntaxError>;

/// Keywords that start a new statement when they appear on a fresh line.
const STATEMENT_KEYWORDS: [&str; 14] = [
    "abstract",
    "class",
    "const",
    "declare",
    "enum",
    "export",
    "function",
    "import",
    "interface",
    "let",
    "module",
    "namespace",
    "type",
    "var",
];

pub fn parse_source_file(path: &str, text: String) -> Result<SourceFile, ParseError> {
    let parsed = tokenize(&text).and_then(|tokens| {
        let mut parser = Parser {
            source: &text,
            tokens,
            pos: 0,
            is_module: false,
        };
        let statements = parser.statements(false)?;
        Ok((statements, parser.is_module))
    });
    match parsed {
        Ok((statements, is_module)) => Ok(SourceFile {
            path: path.to_owned(),
            text,
            statements,
            is_module,
        }),
        Err(error) => Err(error.locate(path, &text)),
    }
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    is_module: bool,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Token {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> Token {
        let index = (self.pos + n).min(self.tokens.len() - 1);
        self.tokens[index]
    }

    fn bump(&mut self) -> Token {
        let token = self.peek();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn text(&self, token: Token) -> &'a str {
        token.span.text(self.source)
    }

    fn prev_end(&self) -> usize {
        match self.pos {
            0 => 0,
            pos => self.tokens[pos - 1].span.end,
        }
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.prev_end().max(start))
    }

    fn is_punct(&self, token: Token, punct: &str) -> bool {
        token.kind == TokenKind::Punct && self.text(token) == punct
    }

    fn is_keyword(&self, token: Token, keyword: &str) -> bool {
        token.kind == TokenKind::Identifier && self.text(token) == keyword
    }

    fn at_punct(&self, punct: &str) -> bool {
        self.is_punct(self.peek(), punct)
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        self.is_keyword(self.peek(), keyword)
    }

    fn eat_punct(&mut self, punct: &str) -> bool {
        let found = self.at_punct(punct);
        if found {
            self.bump();
        }
        found
    }

    fn error_here(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(self.peek().span.start, message)
    }

    fn expect_punct(&mut self, punct: &str) -> PResult<Token> {
        if self.at_punct(punct) {
            Ok(self.bump())
        } else {
            Err(self.error_here(format!(
                "expected `{punct}`, found `{}`",
                self.text(self.peek())
            )))
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> PResult<()> {
        if self.at_keyword(keyword) {
            self.bump();
            Ok(())
        } else {
            Err(self.error_here(format!("expected `{keyword}`")))
        }
    }

    fn expect_identifier(&mut self) -> PResult<String> {
        let token = self.peek();
        if token.kind == TokenKind::Identifier {
            self.bump();
            Ok(self.text(token).to_owned())
        } else {
            Err(self.error_here("expected an identifier"))
        }
    }

    fn expect_string(&mut self) -> PResult<String> {
        let token = self.peek();
        if token.kind == TokenKind::String {
            self.bump();
            Ok(self.string_value(token))
        } else {
            Err(self.error_here("expected a string literal"))
        }
    }

    fn string_value(&self, token: Token) -> String {
        let text = self.text(token);
        text[1..text.len() - 1].to_owned()
    }

    /// Skips a bracketed region, starting at `open` and ending after its matching `close`.
    fn skip_balanced(&mut self, open: &str, close: &str) -> PResult<()> {
        self.expect_punct(open)?;
        let mut depth = 1usize;
        while depth > 0 {
            let token = self.bump();
            if token.kind == TokenKind::Eof {
                return Err(SyntaxError::new(token.span.start, format!("expected `{close}`")));
            } else if self.is_punct(token, open) {
                depth += 1;
            } else if self.is_punct(token, close) {
                depth -= 1;
            }
        }
        Ok(())
    }

    fn skip_statement(&mut self) {
        let mut depth = 0usize;
        let mut consumed = 0usize;
        loop {
            let token = self.peek();
            if token.kind == TokenKind::Eof {
                return;
            }
            if depth == 0 && consumed > 0 {
                let starts_statement = token.newline_before
                    && token.kind == TokenKind::Identifier
                    && STATEMENT_KEYWORDS.contains(&self.text(token));
                if starts_statement || self.is_punct(token, "}") {
                    return;
                }
            }
            self.bump();
            consumed += 1;
            if token.kind != TokenKind::Punct {
                continue;
            }
            match self.text(token) {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 && self.text(token) == "}" && self.peek().newline_before {
                        return;
                    }
                }
                ";" if depth == 0 => return,
                _ => {}
            }
        }
    }

    fn statements(&mut self, nested: bool) -> PResult<Vec<Statement>> {
        let mut statements = Vec::new();
        loop {
            if self.peek().kind == TokenKind::Eof {
                if nested {
                    return Err(self.error_here("expected `}`"));
                }
                return Ok(statements);
            }
            if nested && self.at_punct("}") {
                return Ok(statements);
            }
            if let Some(statement) = self.statement(nested)? {
                statements.push(statement);
            }
        }
    }

    fn statement(&mut self, nested: bool) -> PResult<Option<Statement>> {
        if self.eat_punct(";") {
            return Ok(None);
        }
        let first = self.peek();
        let mut exported = false;
        loop {
            if self.at_keyword("export") {
                exported = true;
                self.bump();
                if !nested {
                    self.is_module = true;
                }
                let re_export = self.at_punct("=")
                    || self.at_punct("{")
                    || self.at_punct("*")
                    || self.at_keyword("as")
                    || self.at_keyword("import");
                if re_export {
                    self.skip_statement();
                    return Ok(None);
                }
            } else if (self.at_keyword("declare")
                || self.at_keyword("default")
                || self.at_keyword("abstract"))
                && self.peek_at(1).kind == TokenKind::Identifier
                && !self.peek_at(1).newline_before
            {
                self.bump();
            } else {
                break;
            }
        }

        let token = self.peek();
        if token.kind != TokenKind::Identifier {
            self.skip_statement();
            return Ok(None);
        }
        let next = self.peek_at(1);
        match self.text(token) {
            "import" if !exported && !self.is_punct(next, "(") => {
                if !nested {
                    self.is_module = true;
                }
                Ok(self.import_declaration()?.map(Statement::Import))
            }
            "class" | "interface" => {
                let declaration = self.type_declaration(first)?;
                Ok(Some(Statement::Declaration(declaration)))
            }
            "module" | "namespace"
                if matches!(next.kind, TokenKind::String | TokenKind::Identifier)
                    && !next.newline_before =>
            {
                Ok(Some(Statement::Module(self.module_declaration()?)))
            }
            "global" if self.is_punct(next, "{") => {
                Ok(Some(Statement::Module(self.module_declaration()?)))
            }
            _ => {
                self.skip_statement();
                Ok(None)
            }
        }
    }

    fn import_declaration(&mut self) -> PResult<Option<ImportDeclaration>> {
        self.expect_keyword("import")?;
        let next = self.peek_at(1);
        if self.at_keyword("type")
            && (self.is_punct(next, "{")
                || self.is_punct(next, "*")
                || (next.kind == TokenKind::Identifier && !self.is_keyword(next, "from")))
        {
            self.bump();
        }

        if self.peek().kind == TokenKind::String {
            let module = self.expect_string()?;
            self.eat_punct(";");
            return Ok(Some(ImportDeclaration {
                module,
                bindings: Vec::new(),
            }));
        }

        let mut bindings = Vec::new();
        if self.peek().kind == TokenKind::Identifier {
            let local = self.expect_identifier()?;
            if self.eat_punct("=") {
                if self.at_keyword("require") && self.is_punct(self.peek_at(1), "(") {
                    self.bump();
                    self.bump();
                    let module = self.expect_string()?;
                    self.expect_punct(")")?;
                    self.eat_punct(";");
                    return Ok(Some(ImportDeclaration {
                        module,
                        bindings: vec![ImportBinding::Namespace(local)],
                    }));
                }
                // `import a = b.c;` aliases an entity, not a module.
                self.skip_statement();
                return Ok(None);
            }
            bindings.push(ImportBinding::Default(local));
            self.eat_punct(",");
        }

        if self.eat_punct("*") {
            self.expect_keyword("as")?;
            bindings.push(ImportBinding::Namespace(self.expect_identifier()?));
        } else if self.eat_punct("{") {
            while !self.eat_punct("}") {
                if self.at_keyword("type") && self.peek_at(1).kind == TokenKind::Identifier {
                    self.bump();
                }
                let imported = if self.peek().kind == TokenKind::String {
                    self.expect_string()?
                } else {
                    self.expect_identifier()?
                };
                let local = if self.at_keyword("as") {
                    self.bump();
                    self.expect_identifier()?
                } else {
                    imported.clone()
                };
                bindings.push(ImportBinding::Named { imported, local });
                if !self.eat_punct(",") {
                    self.expect_punct("}")?;
                    break;
                }
            }
        }

        self.expect_keyword("from")?;
        let module = self.expect_string()?;
        self.eat_punct(";");
        Ok(Some(ImportDeclaration { module, bindings }))
    }

    fn module_declaration(&mut self) -> PResult<ModuleDeclaration> {
        let name = if self.at_keyword("global") {
            self.bump();
            ModuleName::Global
        } else {
            self.bump();
            if self.peek().kind == TokenKind::String {
                ModuleName::Ambient(self.expect_string()?)
            } else {
                ModuleName::Namespace(self.qualified_name()?)
            }
        };

        let body = if self.eat_punct("{") {
            let body = self.statements(true)?;
            self.expect_punct("}")?;
            body
        } else {
            // Shorthand ambient module: `declare module "m";`
            self.eat_punct(";");
            Vec::new()
        };
        Ok(ModuleDeclaration { name, body })
    }

    fn type_declaration(&mut self, first: Token) -> PResult<TypeDeclaration> {
        let kind = if self.at_keyword("class") {
            DeclarationKind::Class
        } else {
            DeclarationKind::Interface
        };
        self.bump();

        let name = if self.peek().kind == TokenKind::Identifier
            && !self.at_keyword("extends")
            && !self.at_keyword("implements")
        {
            self.expect_identifier()?
        } else {
            "default".to_owned()
        };

        let type_parameters = if self.at_punct("<") {
            self.type_parameters()?
        } else {
            Vec::new()
        };

        let mut heritage_clauses = Vec::new();
        loop {
            let token = if self.at_keyword("extends") {
                HeritageToken::Extends
            } else if self.at_keyword("implements") {
                HeritageToken::Implements
            } else {
                break;
            };
            self.bump();
            let mut types = vec![self.reference_type()?];
            while self.eat_punct(",") {
                types.push(self.reference_type()?);
            }
            heritage_clauses.push(HeritageClause { token, types });
        }

        self.expect_punct("{")?;
        let members = self.members()?;

        Ok(TypeDeclaration {
            kind,
            name,
            type_parameters,
            heritage_clauses,
            members,
            span: self.span_from(first.span.start),
            leading_trivia: first.trivia,
        })
    }

    fn type_parameters(&mut self) -> PResult<Vec<String>> {
        self.expect_punct("<")?;
        let mut names = Vec::new();
        while !self.eat_punct(">") {
            let is_variance_modifier = ["in", "out", "const"].iter().any(|m| self.at_keyword(m));
            if is_variance_modifier && self.peek_at(1).kind == TokenKind::Identifier {
                self.bump();
            }
            names.push(self.expect_identifier()?);
            if self.at_keyword("extends") {
                self.bump();
                self.ty()?;
            }
            if self.eat_punct("=") {
                self.ty()?;
            }
            if !self.eat_punct(",") {
                self.expect_punct(">")?;
                break;
            }
        }
        Ok(names)
    }

    fn members(&mut self) -> PResult<Vec<Member>> {
        let mut members = Vec::new();
        loop {
            if self.eat_punct("}") {
                return Ok(members);
            }
            if self.peek().kind == TokenKind::Eof {
                return Err(self.error_here("expected `}`"));
            }
            if self.eat_punct(";") || self.eat_punct(",") {
                continue;
            }
            members.push(self.member()?);
        }
    }

    fn is_member_name_start(&self, token: Token) -> bool {
        match token.kind {
            TokenKind::Identifier | TokenKind::String | TokenKind::Number => true,
            TokenKind::Punct => matches!(self.text(token), "[" | "#" | "*"),
            _ => false,
        }
    }

    fn member(&mut self) -> PResult<Member> {
        let start = self.peek().span.start;
        let mut modifiers = Modifiers::default();
        while self.peek().kind == TokenKind::Identifier && self.is_member_name_start(self.peek_at(1))
        {
            match self.text(self.peek()) {
                "static" => modifiers.is_static = true,
                "private" => modifiers.is_private = true,
                "protected" => modifiers.is_protected = true,
                "readonly" => modifiers.is_readonly = true,
                "abstract" => modifiers.is_abstract = true,
                "public" | "declare" | "override" | "accessor" | "async" => {}
                _ => break,
            }
            self.bump();
        }

        let member = |kind, name, optional, type_annotation, span| Member {
            kind,
            name,
            modifiers,
            optional,
            type_annotation,
            span,
        };

        if (self.at_keyword("get") || self.at_keyword("set"))
            && self.is_member_name_start(self.peek_at(1))
        {
            let kind = if self.at_keyword("get") {
                MemberKind::GetAccessor
            } else {
                MemberKind::SetAccessor
            };
            self.bump();
            let name = self.property_name()?;
            let type_annotation = self.signature_rest()?;
            return Ok(member(kind, Some(name), false, type_annotation, self.span_from(start)));
        }

        let next = self.peek_at(1);
        let opens_signature = |p: &Self, t: Token| p.is_punct(t, "(") || p.is_punct(t, "<");
        if self.at_keyword("constructor") && opens_signature(self, next) {
            self.bump();
            self.signature_rest()?;
            return Ok(member(MemberKind::Constructor, None, false, None, self.span_from(start)));
        }
        if self.at_keyword("new") && opens_signature(self, next) {
            self.bump();
        }
        if opens_signature(self, self.peek()) {
            let type_annotation = self.signature_rest()?;
            let span = self.span_from(start);
            return Ok(member(MemberKind::CallSignature, None, false, type_annotation, span));
        }

        if self.at_punct("[")
            && next.kind == TokenKind::Identifier
            && self.is_punct(self.peek_at(2), ":")
        {
            self.bump();
            self.bump();
            self.bump();
            self.ty()?;
            self.expect_punct("]")?;
            let type_annotation = if self.eat_punct(":") {
                Some(self.ty()?)
            } else {
                None
            };
            let span = self.span_from(start);
            return Ok(member(MemberKind::IndexSignature, None, false, type_annotation, span));
        }

        let name = self.property_name()?;
        let optional = self.eat_punct("?");
        if !optional {
            self.eat_punct("!");
        }

        if opens_signature(self, self.peek()) {
            let type_annotation = self.signature_rest()?;
            let span = self.span_from(start);
            return Ok(member(MemberKind::Method, Some(name), optional, type_annotation, span));
        }

        let type_annotation = if self.eat_punct(":") {
            Some(self.ty()?)
        } else {
            None
        };
        if self.eat_punct("=") {
            self.skip_initializer();
        }
        let span = self.span_from(start);
        Ok(member(MemberKind::Property, Some(name), optional, type_annotation, span))
    }

    fn property_name(&mut self) -> PResult<String> {
        let token = self.peek();
        match token.kind {
            TokenKind::Identifier | TokenKind::Number => {
                self.bump();
                Ok(self.text(token).to_owned())
            }
            TokenKind::String => self.expect_string(),
            TokenKind::Punct if self.is_punct(token, "#") => {
                self.bump();
                Ok(format!("#{}", self.expect_identifier()?))
            }
            TokenKind::Punct if self.is_punct(token, "[") => {
                self.skip_balanced("[", "]")?;
                Ok(self.span_from(token.span.start).text(self.source).to_owned())
            }
            _ => Err(self.error_here("expected a member name")),
        }
    }

    /// Parses the remainder of a method-like member after its name: type parameters,
    /// parameter list, optional return type and optional body.
    fn signature_rest(&mut self) -> PResult<Option<TypeNode>> {
        if self.at_punct("<") {
            self.skip_balanced("<", ">")?;
        }
        self.skip_balanced("(", ")")?;
        let return_type = if self.eat_punct(":") {
            Some(self.return_type()?)
        } else {
            None
        };
        if self.at_punct("{") {
            self.skip_balanced("{", "}")?;
        }
        Ok(return_type)
    }

    fn return_type(&mut self) -> PResult<TypeNode> {
        if self.at_keyword("asserts") && self.peek_at(1).kind == TokenKind::Identifier {
            let start = self.peek().span.start;
            self.bump();
            self.bump();
            if self.at_keyword("is") {
                self.bump();
                self.ty()?;
            }
            return Ok(TypeNode {
                kind: TypeKind::Keyword(Keyword::Void),
                span: self.span_from(start),
            });
        }
        let type_node = self.ty()?;
        if self.at_keyword("is") && !self.peek().newline_before {
            self.bump();
            return self.ty();
        }
        Ok(type_node)
    }

    fn skip_initializer(&mut self) {
        let mut depth = 0usize;
        let mut consumed = 0usize;
        loop {
            let token = self.peek();
            if token.kind == TokenKind::Eof {
                return;
            }
            if depth == 0 {
                let ends = [";", ",", "}"].iter().any(|p| self.is_punct(token, p))
                    || (consumed > 0 && token.newline_before);
                if ends {
                    return;
                }
            }
            self.bump();
            consumed += 1;
            if token.kind == TokenKind::Punct {
                match self.text(token) {
                    "(" | "[" | "{" => depth += 1,
                    ")" | "]" | "}" => depth = depth.saturating_sub(1),
                    _ => {}
                }
            }
        }
    }

    fn qualified_name(&mut self) -> PResult<Vec<String>> {
        let mut name = vec![self.expect_identifier()?];
        while self.at_punct(".") && self.peek_at(1).kind == TokenKind::Identifier {
            self.bump();
            name.push(self.expect_identifier()?);
        }
        Ok(name)
    }

    fn ty(&mut self) -> PResult<TypeNode> {
        let start = self.peek().span.start;
        let check = self.union_type()?;
        if self.at_keyword("extends") && !self.peek().newline_before {
            self.bump();
            self.union_type()?;
            self.expect_punct("?")?;
            self.ty()?;
            self.expect_punct(":")?;
            self.ty()?;
            return Ok(TypeNode {
                kind: TypeKind::Conditional,
                span: self.span_from(start),
            });
        }
        Ok(check)
    }

    fn union_type(&mut self) -> PResult<TypeNode> {
        let start = self.peek().span.start;
        self.eat_punct("|");
        let first = self.intersection_type()?;
        if !self.at_punct("|") {
            return Ok(first);
        }
        let mut types = vec![first];
        while self.eat_punct("|") {
            types.push(self.intersection_type()?);
        }
        Ok(TypeNode {
            kind: TypeKind::Union(types),
            span: self.span_from(start),
        })
    }

    fn intersection_type(&mut self) -> PResult<TypeNode> {
        let start = self.peek().span.start;
        self.eat_punct("&");
        let first = self.postfix_type()?;
        if !self.at_punct("&") {
            return Ok(first);
        }
        let mut types = vec![first];
        while self.eat_punct("&") {
            types.push(self.postfix_type()?);
        }
        Ok(TypeNode {
            kind: TypeKind::Intersection(types),
            span: self.span_from(start),
        })
    }

    fn postfix_type(&mut self) -> PResult<TypeNode> {
        let start = self.peek().span.start;
        let mut node = self.primary_type()?;
        while self.at_punct("[") && !self.peek().newline_before {
            self.bump();
            let kind = if self.eat_punct("]") {
                TypeKind::Array(Box::new(node))
            } else {
                let index = self.ty()?;
                self.expect_punct("]")?;
                TypeKind::IndexedAccess(Box::new(node), Box::new(index))
            };
            node = TypeNode {
                kind,
                span: self.span_from(start),
            };
        }
        Ok(node)
    }

    fn primary_type(&mut self) -> PResult<TypeNode> {
        let token = self.peek();
        let start = token.span.start;
        let next = self.peek_at(1);
        let kind = match token.kind {
            TokenKind::String | TokenKind::Template | TokenKind::Number => {
                self.bump();
                TypeKind::Literal
            }
            TokenKind::Punct => match self.text(token) {
                "(" if self.is_function_type_start() => self.function_type()?,
                "(" => {
                    self.bump();
                    let inner = self.ty()?;
                    self.expect_punct(")")?;
                    TypeKind::Parenthesized(Box::new(inner))
                }
                "<" => self.function_type()?,
                "{" => {
                    self.skip_balanced("{", "}")?;
                    TypeKind::ObjectLiteral
                }
                "[" => {
                    self.skip_balanced("[", "]")?;
                    TypeKind::Tuple
                }
                "-" if next.kind == TokenKind::Number => {
                    self.bump();
                    self.bump();
                    TypeKind::Literal
                }
                _ => return Err(self.error_here("expected a type")),
            },
            TokenKind::Identifier => match self.text(token) {
                "typeof" => {
                    self.bump();
                    TypeKind::Query(self.qualified_name()?)
                }
                "keyof" | "unique" | "readonly" | "infer" => {
                    self.bump();
                    TypeKind::Operator(Box::new(self.postfix_type()?))
                }
                "new" if self.is_punct(next, "(") || self.is_punct(next, "<") => {
                    self.bump();
                    self.function_type()?
                }
                "abstract" if self.is_keyword(next, "new") => {
                    self.bump();
                    self.bump();
                    self.function_type()?
                }
                "import" if self.is_punct(next, "(") => {
                    self.bump();
                    self.skip_balanced("(", ")")?;
                    while self.at_punct(".") && self.peek_at(1).kind == TokenKind::Identifier {
                        self.bump();
                        self.bump();
                    }
                    if self.at_punct("<") {
                        self.skip_balanced("<", ">")?;
                    }
                    TypeKind::Import
                }
                "true" | "false" => {
                    self.bump();
                    TypeKind::Literal
                }
                text => match Keyword::from_text(text) {
                    Some(keyword) if !self.is_punct(next, ".") => {
                        self.bump();
                        TypeKind::Keyword(keyword)
                    }
                    _ => return self.reference_type(),
                },
            },
            TokenKind::Eof => return Err(self.error_here("expected a type")),
        };
        Ok(TypeNode {
            kind,
            span: self.span_from(start),
        })
    }

    fn is_function_type_start(&self) -> bool {
        let mut depth = 0usize;
        let mut offset = 0;
        loop {
            let token = self.peek_at(offset);
            if token.kind == TokenKind::Eof {
                return false;
            }
            if self.is_punct(token, "(") {
                depth += 1;
            } else if self.is_punct(token, ")") {
                depth -= 1;
                if depth == 0 {
                    return self.is_punct(self.peek_at(offset + 1), "=>");
                }
            }
            offset += 1;
        }
    }

    fn function_type(&mut self) -> PResult<TypeKind> {
        if self.at_punct("<") {
            self.skip_balanced("<", ">")?;
        }
        self.skip_balanced("(", ")")?;
        self.expect_punct("=>")?;
        self.return_type()?;
        Ok(TypeKind::Function)
    }

    fn reference_type(&mut self) -> PResult<TypeNode> {
        let start = self.peek().span.start;
        let name = self.qualified_name()?;
        let mut arguments = Vec::new();
        if self.at_punct("<") && !self.peek().newline_before {
            self.bump();
            while !self.eat_punct(">") {
                arguments.push(self.ty()?);
                if !self.eat_punct(",") {
                    self.expect_punct(">")?;
                    break;
                }
            }
        }
        Ok(TypeNode {
            kind: TypeKind::Reference { name, arguments },
            span: self.span_from(start),
        })
    }
}

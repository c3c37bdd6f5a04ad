use std::collections::HashMap;

use tracing::debug;

use crate::ast::{
    DeclarationKind, ImportBinding, ModuleName, SourceFile, Statement, TypeDeclaration, TypeKind,
    TypeNode,
};
use crate::error::ParseError;
use crate::lexer::Span;
use crate::parser::parse_source_file;

/// Declarations the analysis engine knows without any input, standing in for the standard
/// library typings. Always bound first, so its declarations lead every merged symbol.
pub const PRELUDE: &str = "\
interface Object {}
interface Function {}
interface String {}
interface Number {}
interface Boolean {}
interface RegExp {}
interface Error {}
interface Array<T> {}
interface Date {}
";

pub const PRELUDE_PATH: &str = "lib.d.ts";

/// A source file handed to [`Program::new`].
#[derive(Clone, Debug)]
pub struct SourceText {
    /// Path relative to the program root, with `/` separators.
    pub path: String,
    pub text: String,
}

impl SourceText {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FileId(usize);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DeclarationId(usize);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SymbolId(usize);

#[derive(Clone, Debug, PartialEq, Eq)]
enum ImportTarget {
    Module(String),
    Export { module: String, name: String },
}

#[derive(Debug)]
struct Scope {
    parent: Option<ScopeId>,
    /// Qualifier prepended to the names declared in this scope; empty at global scope.
    prefix: String,
    /// Name of the enclosing module, for resolving relative module specifiers.
    module: Option<String>,
    imports: HashMap<String, ImportTarget>,
}

/// A bound `class` or `interface` declaration.
#[derive(Debug)]
pub struct Declaration {
    pub id: DeclarationId,
    pub file: FileId,
    pub scope: ScopeId,
    pub symbol: SymbolId,
    pub node: TypeDeclaration,
}

impl Declaration {
    pub fn name(&self) -> &str {
        &self.node.name
    }

    pub fn kind(&self) -> DeclarationKind {
        self.node.kind
    }
}

/// All declarations sharing one fully-qualified name.
#[derive(Debug)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    fully_qualified_name: String,
    declarations: Vec<DeclarationId>,
}

#[derive(Debug)]
struct File {
    path: String,
    text: String,
}

/// The whole input set, parsed and bound once.
#[derive(Debug)]
pub struct Program {
    files: Vec<File>,
    scopes: Vec<Scope>,
    declarations: Vec<Declaration>,
    symbols: Vec<Symbol>,
    symbol_index: HashMap<String, SymbolId>,
}

impl Program {
    pub fn new(sources: impl IntoIterator<Item = SourceText>) -> Result<Self, ParseError> {
        let mut program = Self {
            files: Vec::new(),
            scopes: Vec::new(),
            declarations: Vec::new(),
            symbols: Vec::new(),
            symbol_index: HashMap::new(),
        };
        program.bind_file(parse_source_file(PRELUDE_PATH, PRELUDE.to_owned())?);
        for source in sources {
            program.bind_file(parse_source_file(&source.path, source.text)?);
        }
        debug!(
            files = program.files.len(),
            declarations = program.declarations.len(),
            symbols = program.symbols.len(),
            "bound program"
        );
        Ok(program)
    }

    pub fn type_checker(&self) -> TypeChecker<'_> {
        TypeChecker { program: self }
    }

    /// Every bound declaration, in file order and then source order.
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter()
    }

    pub fn declaration(&self, id: DeclarationId) -> &Declaration {
        &self.declarations[id.0]
    }

    pub fn file_path(&self, file: FileId) -> &str {
        &self.files[file.0].path
    }

    pub fn source_text(&self, file: FileId, span: Span) -> &str {
        span.text(&self.files[file.0].text)
    }

    fn bind_file(&mut self, source: SourceFile) {
        let file = FileId(self.files.len());
        let (prefix, module) = if source.is_module {
            let name = module_name_of_path(&source.path);
            (quoted(&name), Some(name))
        } else {
            (String::new(), None)
        };
        let scope = self.create_scope(None, prefix, module);
        self.files.push(File {
            path: source.path,
            text: source.text,
        });
        self.bind_statements(file, scope, source.statements);
    }

    fn create_scope(&mut self, parent: Option<ScopeId>, prefix: String, module: Option<String>) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            parent,
            prefix,
            module,
            imports: HashMap::new(),
        });
        id
    }

    fn bind_statements(&mut self, file: FileId, scope: ScopeId, statements: Vec<Statement>) {
        for statement in statements {
            match statement {
                Statement::Import(import) => {
                    let module = self.resolve_module_specifier(scope, &import.module);
                    for binding in import.bindings {
                        let (local, target) = match binding {
                            ImportBinding::Namespace(local) => {
                                (local, ImportTarget::Module(module.clone()))
                            }
                            ImportBinding::Default(local) => (
                                local,
                                ImportTarget::Export {
                                    module: module.clone(),
                                    name: "default".into(),
                                },
                            ),
                            ImportBinding::Named { imported, local } => (
                                local,
                                ImportTarget::Export {
                                    module: module.clone(),
                                    name: imported,
                                },
                            ),
                        };
                        self.scopes[scope.0].imports.insert(local, target);
                    }
                }
                Statement::Module(declaration) => {
                    let (prefix, module) = match declaration.name {
                        ModuleName::Ambient(name) => (quoted(&name), Some(name)),
                        ModuleName::Namespace(path) => {
                            let outer = &self.scopes[scope.0];
                            (join(&outer.prefix, &path.join(".")), outer.module.clone())
                        }
                        ModuleName::Global => (String::new(), None),
                    };
                    let inner = self.create_scope(Some(scope), prefix, module);
                    self.bind_statements(file, inner, declaration.body);
                }
                Statement::Declaration(node) => self.bind_declaration(file, scope, node),
            }
        }
    }

    fn bind_declaration(&mut self, file: FileId, scope: ScopeId, node: TypeDeclaration) {
        let fully_qualified_name = join(&self.scopes[scope.0].prefix, &node.name);
        let id = DeclarationId(self.declarations.len());
        let symbol = match self.symbol_index.get(&fully_qualified_name) {
            Some(&symbol) => symbol,
            None => {
                let symbol = SymbolId(self.symbols.len());
                self.symbols.push(Symbol {
                    id: symbol,
                    name: node.name.clone(),
                    fully_qualified_name: fully_qualified_name.clone(),
                    declarations: Vec::new(),
                });
                self.symbol_index.insert(fully_qualified_name, symbol);
                symbol
            }
        };
        self.symbols[symbol.0].declarations.push(id);
        self.declarations.push(Declaration {
            id,
            file,
            scope,
            symbol,
            node,
        });
    }

    fn resolve_module_specifier(&self, scope: ScopeId, specifier: &str) -> String {
        if !specifier.starts_with('.') {
            return strip_extension(specifier).to_owned();
        }
        let base = self.scopes[scope.0].module.as_deref().unwrap_or("");
        let mut segments: Vec<&str> = base.split('/').collect();
        segments.pop();
        for segment in specifier.split('/') {
            match segment {
                "." | "" => {}
                ".." => {
                    segments.pop();
                }
                segment => segments.push(segment),
            }
        }
        strip_extension(&segments.join("/")).to_owned()
    }

    fn scope_chain(&self, scope: ScopeId) -> impl Iterator<Item = &Scope> {
        std::iter::successors(Some(&self.scopes[scope.0]), |s| {
            s.parent.map(|p| &self.scopes[p.0])
        })
    }

    fn lookup(&self, fully_qualified_name: &str) -> Option<&Symbol> {
        self.symbol_index
            .get(fully_qualified_name)
            .map(|id| &self.symbols[id.0])
    }

    fn lookup_import(&self, target: &ImportTarget, rest: &[String]) -> Option<&Symbol> {
        let qualifier = match target {
            ImportTarget::Module(module) => quoted(module),
            ImportTarget::Export { module, name } => join(&quoted(module), name),
        };
        if rest.is_empty() {
            return match target {
                ImportTarget::Module(_) => None,
                ImportTarget::Export { .. } => self.lookup(&qualifier),
            };
        }
        self.lookup(&join(&qualifier, &rest.join(".")))
    }

    fn resolve_name(&self, scope: ScopeId, name: &[String]) -> Option<&Symbol> {
        let (head, rest) = name.split_first()?;
        let dotted = name.join(".");
        for scope in self.scope_chain(scope) {
            if let Some(symbol) = self.lookup(&join(&scope.prefix, &dotted)) {
                return Some(symbol);
            }
            if let Some(target) = scope.imports.get(head) {
                return self.lookup_import(target, rest);
            }
        }
        self.lookup(&dotted)
    }
}

/// The type-resolution capability over a bound [`Program`].
#[derive(Copy, Clone)]
pub struct TypeChecker<'a> {
    program: &'a Program,
}

impl<'a> TypeChecker<'a> {
    /// Resolves the symbol a type node refers to, as seen from `scope`.
    ///
    /// Array types resolve to the global `Array`; keywords and structural types have no symbol.
    pub fn resolve_symbol(&self, scope: ScopeId, node: &TypeNode) -> Option<&'a Symbol> {
        match &node.kind {
            TypeKind::Reference { name, .. } => self.program.resolve_name(scope, name),
            TypeKind::Array(_) => self.program.lookup("Array"),
            TypeKind::Parenthesized(inner) => self.resolve_symbol(scope, inner),
            _ => None,
        }
    }

    pub fn fully_qualified_name(&self, symbol: &'a Symbol) -> &'a str {
        &symbol.fully_qualified_name
    }

    /// The symbol a declaration contributes to.
    pub fn symbol_of(&self, declaration: &Declaration) -> &'a Symbol {
        &self.program.symbols[declaration.symbol.0]
    }

    /// The declarations of a symbol in binding order.
    pub fn declarations(&self, symbol: &'a Symbol) -> impl Iterator<Item = &'a Declaration> + 'a {
        let program = self.program;
        symbol
            .declarations
            .iter()
            .map(move |id| program.declaration(*id))
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}.{name}")
    }
}

fn quoted(module: &str) -> String {
    format!("\"{module}\"")
}

fn strip_extension(path: &str) -> &str {
    [".d.ts", ".ts"]
        .iter()
        .find_map(|ext| path.strip_suffix(ext))
        .unwrap_or(path)
}

fn module_name_of_path(path: &str) -> String {
    strip_extension(&path.replace('\\', "/")).to_owned()
}

//! Semantic resolution over the parsed module.
//!
//! The [`TypeBinder`] owns the [`TypeGraph`] for one analysis run. It turns syntactic type
//! references into canonical [`TypeId`]s and computes the static type of the expressions the
//! call pattern matcher inspects. Every declaration gets exactly one `Named` node, created on
//! first reference; its underlying representation is resolved lazily by [`TypeBinder::complete`]
//! so that types never reached from a documented response cannot fail the run.

mod expr;
mod scope;
pub mod serde_attrs;

pub use expr::ExprContext;
pub use scope::{ImplBlock, TypeDecl, TypeItem, ValueDecl};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::parser::{ModulePath, SourceSet};
use crate::type_graph::{BasicKind, Field, TypeGraph, TypeId, TypeNode};
use log::debug;
use quote::ToTokens;
use scope::ScopeIndex;
use serde_attrs::{ContainerAttrs, FieldAttrs};
use std::collections::{HashMap, HashSet};

/// Nesting limit for `use` chains and type aliases
const MAX_RESOLUTION_DEPTH: usize = 32;

/// External types documented as scalars: (crate, type name, canonical qualifier)
const KNOWN_EXTERNALS: &[(&str, &str, &str)] = &[
    ("chrono", "DateTime", "chrono::DateTime"),
    ("chrono", "NaiveDateTime", "chrono::NaiveDateTime"),
    ("chrono", "NaiveDate", "chrono::NaiveDate"),
    ("chrono", "NaiveTime", "chrono::NaiveTime"),
    ("time", "OffsetDateTime", "time::OffsetDateTime"),
    ("time", "PrimitiveDateTime", "time::PrimitiveDateTime"),
    ("time", "Date", "time::Date"),
    ("std", "SystemTime", "std::time::SystemTime"),
    ("uuid", "Uuid", "uuid::Uuid"),
    ("rust_decimal", "Decimal", "rust_decimal::Decimal"),
    ("url", "Url", "url::Url"),
];

/// Renders a syntax node back to source text for diagnostics
pub(crate) fn source_text<T: ToTokens>(node: &T) -> String {
    node.to_token_stream().to_string()
}

/// Declaration behind a local `Named` node
#[derive(Debug, Clone)]
struct LocalDecl<'a> {
    module: ModulePath,
    name: String,
    decl: TypeDecl<'a>,
}

/// Resolves declared types and expressions of one module into a [`TypeGraph`]
pub struct TypeBinder<'a> {
    config: &'a Config,
    graph: TypeGraph,
    index: ScopeIndex<'a>,
    /// Canonical key (`crate::a::B` for local types, the full path otherwise) -> node
    named: HashMap<String, TypeId>,
    local_decls: HashMap<TypeId, LocalDecl<'a>>,
    completed: HashSet<TypeId>,
    external_scalars: HashMap<String, BasicKind>,
    impl_targets: Option<Vec<Option<TypeId>>>,
    /// `Result` nodes -> success type. Fields of type `Result` stay unsupported, but `?`,
    /// `unwrap` and `Ok(..)` patterns see through them.
    fallible: HashMap<TypeId, TypeId>,
    request_type: TypeId,
    alias_depth: usize,
}

impl<'a> TypeBinder<'a> {
    /// Indexes `sources` and prepares the graph.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when an `[external-types]` entry names an unknown scalar.
    pub fn new(sources: &'a SourceSet, config: &'a Config) -> Result<Self> {
        let mut external_scalars = HashMap::new();
        for (path, scalar) in &config.external_types {
            let kind = BasicKind::from_name(scalar).ok_or_else(|| {
                Error::Config(format!(
                    "external type `{}` maps to unknown scalar `{}`",
                    path, scalar
                ))
            })?;
            external_scalars.insert(path.clone(), kind);
        }

        let mut graph = TypeGraph::new();
        let vocabulary = &config.capability;
        let request_type = graph.add_named(format!("{}::{}", vocabulary.name, vocabulary.request_type));
        let handle = graph.unsupported("framework request handle");
        graph.set_underlying(request_type, handle);

        let mut completed = HashSet::new();
        completed.insert(request_type);

        Ok(Self {
            config,
            graph,
            index: ScopeIndex::build(sources),
            named: HashMap::new(),
            local_decls: HashMap::new(),
            completed,
            external_scalars,
            impl_targets: None,
            fallible: HashMap::new(),
            request_type,
            alias_depth: 0,
        })
    }

    pub fn graph(&self) -> &TypeGraph {
        &self.graph
    }

    pub fn config(&self) -> &'a Config {
        self.config
    }

    /// Consumes the binder, handing the finished graph to the output stages
    pub fn into_graph(self) -> TypeGraph {
        self.graph
    }

    /// The framework request type parameter accessors are called on
    pub fn request_type(&self) -> TypeId {
        self.request_type
    }

    pub fn is_identical(&self, a: TypeId, b: TypeId) -> bool {
        self.graph.is_identical(a, b)
    }

    /// Module-level struct and enum declarations in source order
    pub fn declarations(&self) -> &[TypeItem<'a>] {
        &self.index.declarations
    }

    pub fn impl_blocks(&self) -> &[ImplBlock<'a>] {
        &self.index.impls
    }

    /// Returns the canonical node of the type declared as `ident` in `module`.
    ///
    /// Aliases resolve to their target; structs and enums to their `Named` node.
    pub fn resolve_declared_type(&mut self, module: &[String], ident: &str) -> Result<TypeId> {
        let mut path = vec!["crate".to_string()];
        path.extend(module.iter().cloned());
        path.push(ident.to_string());

        match self.lookup_type(&path, 0) {
            Some((decl_module, decl)) => {
                let name = decl.ident().to_string();
                self.declared_type(&decl_module, &name, decl)
            }
            None => Err(Error::bind(module, format!("unknown type `{}`", ident))),
        }
    }

    fn declared_type(&mut self, module: &[String], name: &str, decl: TypeDecl<'a>) -> Result<TypeId> {
        match decl {
            TypeDecl::Alias(alias) => {
                if !alias.generics.params.is_empty() {
                    return Ok(self
                        .graph
                        .unsupported(format!("generic type alias `{}`", name)));
                }
                if self.alias_depth >= MAX_RESOLUTION_DEPTH {
                    return Err(Error::bind(module, format!("type alias `{}` does not terminate", name)));
                }
                self.alias_depth += 1;
                let target = self.resolve_type(module, &alias.ty, None);
                self.alias_depth -= 1;
                target
            }
            TypeDecl::Struct(_) | TypeDecl::Enum(_) => Ok(self.declared_named(module, name, decl)),
        }
    }

    fn declared_named(&mut self, module: &[String], name: &str, decl: TypeDecl<'a>) -> TypeId {
        let key = local_key(module, name);
        if let Some(id) = self.named.get(&key) {
            return *id;
        }

        let qualifier = if module.is_empty() {
            name.to_string()
        } else {
            format!("{}::{}", module.join("::"), name)
        };
        let id = self.graph.add_named(qualifier);
        self.named.insert(key, id);
        self.local_decls.insert(
            id,
            LocalDecl {
                module: module.to_vec(),
                name: name.to_string(),
                decl,
            },
        );
        id
    }

    /// Resolves one syntactic type reference written in `module`.
    ///
    /// `self_ty` is the type `Self` denotes, if any. Shapes outside the documented subset
    /// become `Unsupported` nodes; only unknown names are errors.
    pub fn resolve_type(
        &mut self,
        module: &[String],
        ty: &syn::Type,
        self_ty: Option<TypeId>,
    ) -> Result<TypeId> {
        match ty {
            syn::Type::Path(type_path) if type_path.qself.is_none() => {
                self.resolve_type_path(module, &type_path.path, self_ty)
            }
            syn::Type::Reference(reference) => {
                let inner = self.resolve_type(module, &reference.elem, self_ty)?;
                Ok(self.graph.pointer(inner))
            }
            syn::Type::Ptr(ptr) => {
                let inner = self.resolve_type(module, &ptr.elem, self_ty)?;
                Ok(self.graph.pointer(inner))
            }
            syn::Type::Slice(slice) => {
                let elem = self.resolve_type(module, &slice.elem, self_ty)?;
                Ok(self.graph.slice(elem))
            }
            syn::Type::Array(array) => {
                let elem = self.resolve_type(module, &array.elem, self_ty)?;
                Ok(self.graph.slice(elem))
            }
            syn::Type::Paren(paren) => self.resolve_type(module, &paren.elem, self_ty),
            syn::Type::Group(group) => self.resolve_type(module, &group.elem, self_ty),
            syn::Type::Tuple(tuple) if tuple.elems.is_empty() => Ok(self.graph.unsupported("unit type `()`")),
            syn::Type::Tuple(_) => Ok(self.graph.unsupported(format!("tuple `{}`", source_text(ty)))),
            syn::Type::BareFn(_) => Ok(self.graph.unsupported(format!("function type `{}`", source_text(ty)))),
            syn::Type::TraitObject(_) | syn::Type::ImplTrait(_) => {
                Ok(self.graph.unsupported(format!("trait object `{}`", source_text(ty))))
            }
            _ => Ok(self.graph.unsupported(format!("type `{}`", source_text(ty)))),
        }
    }

    /// Resolves a path in type position
    pub fn resolve_type_path(
        &mut self,
        module: &[String],
        path: &syn::Path,
        self_ty: Option<TypeId>,
    ) -> Result<TypeId> {
        let segments: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
        let Some(last) = path.segments.last() else {
            return Err(Error::bind(module, "empty type path"));
        };

        if segments.len() == 1 && segments[0] == "Self" {
            return self_ty.ok_or_else(|| Error::bind(module, "`Self` used outside an impl block"));
        }

        let absolute = self.absolutize(module, &segments, 0).unwrap_or_else(|| segments.clone());
        if absolute.first().map(String::as_str) == Some("crate") {
            let Some((decl_module, decl)) = self.lookup_type(&absolute, 0) else {
                return Err(Error::bind(
                    module,
                    format!("unknown type `{}`", segments.join("::")),
                ));
            };
            let name = decl.ident().to_string();
            let is_generic = match decl {
                TypeDecl::Struct(item) => !item.generics.params.is_empty(),
                TypeDecl::Enum(item) => !item.generics.params.is_empty(),
                TypeDecl::Alias(_) => false,
            };
            if is_generic || (!last.arguments.is_empty() && !matches!(decl, TypeDecl::Alias(_))) {
                return Ok(self.graph.unsupported(format!("generic type `{}`", source_text(path))));
            }
            return self.declared_type(&decl_module, &name, decl);
        }

        self.resolve_external(module, &absolute, last, self_ty)
    }

    /// Resolves a path that does not name a local declaration
    fn resolve_external(
        &mut self,
        module: &[String],
        absolute: &[String],
        last: &syn::PathSegment,
        self_ty: Option<TypeId>,
    ) -> Result<TypeId> {
        let full = absolute.join("::");
        let name = last.ident.to_string();
        let root = absolute.first().map(String::as_str).unwrap_or_default();
        let vocabulary = &self.config.capability;

        if root == vocabulary.name && name == vocabulary.request_type && absolute.len() == 2 {
            return Ok(self.request_type);
        }

        let short = format!("{}::{}", root, name);
        for candidate in [&full, &short] {
            if let Some(kind) = self.external_scalars.get(candidate.as_str()).copied() {
                return Ok(self.named_external(candidate, kind));
            }
        }
        if let Some((_, _, qualifier)) = KNOWN_EXTERNALS
            .iter()
            .find(|(krate, ty, _)| *krate == root && *ty == name)
        {
            return Ok(self.named_external(qualifier, BasicKind::String));
        }
        if full == "serde_json::Value" || short == "serde_json::Value" {
            return Ok(self.graph.unsupported("dynamic JSON value `serde_json::Value`"));
        }

        // `std::result::Result`, `io::Result`, `anyhow::Result` and friends
        if name == "Result" {
            return Ok(self.result_type(module, first_type_argument(last), last, self_ty));
        }

        let is_std = absolute.len() == 1 || matches!(root, "std" | "core" | "alloc");
        if is_std {
            if let Some(kind) = BasicKind::from_name(&name).filter(|_| name != "string") {
                return Ok(self.graph.basic(kind));
            }
            let argument = first_type_argument(last);
            match name.as_str() {
                "Vec" | "VecDeque" | "LinkedList" | "HashSet" | "BTreeSet" | "BinaryHeap" => {
                    let elem = self.resolve_argument(module, argument, &name, self_ty)?;
                    return Ok(self.graph.slice(elem));
                }
                "Box" | "Rc" | "Arc" | "Option" | "Cow" | "Cell" | "RefCell" | "Mutex" | "RwLock" => {
                    let pointee = self.resolve_argument(module, argument, &name, self_ty)?;
                    return Ok(self.graph.pointer(pointee));
                }
                "HashMap" | "BTreeMap" => {
                    return Ok(self.graph.unsupported(format!("map `{}`", source_text(last))));
                }
                "PhantomData" | "Duration" | "Instant" => {
                    return Ok(self.graph.unsupported(format!("`{}`", source_text(last))));
                }
                _ => {}
            }
        }

        Err(Error::bind(module, format!("unknown type `{}`", full)))
    }

    fn result_type(
        &mut self,
        module: &[String],
        argument: Option<&syn::Type>,
        last: &syn::PathSegment,
        self_ty: Option<TypeId>,
    ) -> TypeId {
        let Some(ok) = argument.and_then(|ty| self.resolve_type(module, ty, self_ty).ok()) else {
            return self.graph.unsupported(format!("`{}`", source_text(last)));
        };
        // the success type is part of the diagnostic so distinct results never share a node
        let diagnostic = format!("`{}` of {}", source_text(last), self.graph.short_name(ok));
        let id = self.graph.unsupported(diagnostic);
        self.fallible.insert(id, ok);
        id
    }

    /// Success type of a `Result` node
    pub fn result_success(&self, id: TypeId) -> Option<TypeId> {
        self.fallible.get(&id).copied()
    }

    fn resolve_argument(
        &mut self,
        module: &[String],
        argument: Option<&syn::Type>,
        container: &str,
        self_ty: Option<TypeId>,
    ) -> Result<TypeId> {
        match argument {
            Some(ty) => self.resolve_type(module, ty, self_ty),
            None => Ok(self
                .graph
                .unsupported(format!("`{}` without a type argument", container))),
        }
    }

    fn named_external(&mut self, qualifier: &str, kind: BasicKind) -> TypeId {
        if let Some(id) = self.named.get(qualifier) {
            return *id;
        }
        let id = self.graph.add_named(qualifier);
        let scalar = self.graph.basic(kind);
        self.graph.set_underlying(id, scalar);
        self.named.insert(qualifier.to_string(), id);
        self.completed.insert(id);
        id
    }

    /// Resolves the underlying representation of every `Named` node reachable from `id`.
    ///
    /// # Errors
    ///
    /// Fails with a bind error when an exported field refers to a type that is neither local,
    /// built in, nor configured.
    pub fn complete(&mut self, id: TypeId) -> Result<()> {
        let mut pending = vec![id];
        let mut seen = HashSet::new();

        while let Some(current) = pending.pop() {
            if !seen.insert(current) {
                continue;
            }
            match self.graph.node(current).clone() {
                TypeNode::Named { .. } => {
                    if let Some(underlying) = self.ensure_underlying(current)? {
                        pending.push(underlying);
                    }
                }
                TypeNode::Struct(fields) => pending.extend(fields.iter().map(|f| f.ty)),
                TypeNode::Slice(inner) | TypeNode::Pointer(inner) => pending.push(inner),
                TypeNode::Basic(_) | TypeNode::Unsupported(_) => {}
            }
        }
        Ok(())
    }

    fn ensure_underlying(&mut self, id: TypeId) -> Result<Option<TypeId>> {
        if self.completed.contains(&id) {
            return Ok(match self.graph.node(id) {
                TypeNode::Named { underlying, .. } => *underlying,
                _ => None,
            });
        }
        let Some(local) = self.local_decls.get(&id).cloned() else {
            return Ok(None);
        };

        let underlying = self.declaration_body(id, &local)?;
        self.graph.set_underlying(id, underlying);
        self.completed.insert(id);
        debug!("Completed {} as {}", local.name, self.graph.short_name(underlying));
        Ok(Some(underlying))
    }

    /// Builds the structural representation of a struct or enum declaration
    fn declaration_body(&mut self, id: TypeId, local: &LocalDecl<'a>) -> Result<TypeId> {
        let module = &local.module;
        let item = match local.decl {
            TypeDecl::Struct(item) => item,
            TypeDecl::Enum(_) => return Ok(self.graph.unsupported(format!("enum `{}`", local.name))),
            TypeDecl::Alias(alias) => return self.resolve_type(module, &alias.ty, Some(id)),
        };
        if !item.generics.params.is_empty() {
            return Ok(self.graph.unsupported(format!("generic struct `{}`", local.name)));
        }

        let container = ContainerAttrs::parse(&item.attrs);
        match &item.fields {
            syn::Fields::Unit => Ok(self.graph.add_struct(Vec::new())),
            syn::Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
                self.resolve_type(module, &unnamed.unnamed[0].ty, Some(id))
            }
            syn::Fields::Unnamed(_) => Ok(self.graph.unsupported(format!("tuple struct `{}`", local.name))),
            syn::Fields::Named(named) if container.transparent && named.named.len() == 1 => {
                self.resolve_type(module, &named.named[0].ty, Some(id))
            }
            syn::Fields::Named(named) => {
                let mut fields = Vec::with_capacity(named.named.len());
                for field in &named.named {
                    let ident = field.ident.as_ref().map(|i| i.to_string()).unwrap_or_default();
                    let attrs = FieldAttrs::parse(&field.attrs);
                    let is_pub = matches!(field.vis, syn::Visibility::Public(_));
                    let exported = !attrs.skip && (is_pub || !self.config.require_pub_fields);
                    let name = match (&attrs.rename, container.rename_all) {
                        (Some(rename), _) => rename.clone(),
                        (None, Some(rule)) => rule.apply(&ident),
                        (None, None) => ident.clone(),
                    };

                    let ty = match self.resolve_type(module, &field.ty, Some(id)) {
                        Ok(ty) => ty,
                        Err(err) if !exported => {
                            debug!("Hidden field `{}.{}` left unresolved: {}", local.name, ident, err);
                            self.graph.unsupported(format!("unresolved `{}`", source_text(&field.ty)))
                        }
                        Err(err) => return Err(err),
                    };
                    fields.push(Field {
                        name,
                        ident,
                        ty,
                        exported,
                    });
                }
                Ok(self.graph.add_struct(fields))
            }
        }
    }

    /// Type of the field `ident` of the local struct `owner`, without completing `owner`
    pub fn field_type(&mut self, owner: TypeId, ident: &str) -> Option<TypeId> {
        let local = self.local_decls.get(&owner).cloned()?;
        let TypeDecl::Struct(item) = local.decl else {
            return None;
        };
        let field = match &item.fields {
            syn::Fields::Named(named) => named
                .named
                .iter()
                .find(|f| f.ident.as_ref().is_some_and(|i| i == ident))?,
            syn::Fields::Unnamed(unnamed) => {
                let position: usize = ident.parse().ok()?;
                unnamed.unnamed.iter().nth(position)?
            }
            syn::Fields::Unit => return None,
        };
        self.resolve_type(&local.module, &field.ty, Some(owner)).ok()
    }

    /// The dereferenced local type each impl block attaches to, by impl index.
    ///
    /// Impls of foreign or generic types have no target.
    pub fn impl_targets(&mut self) -> Vec<Option<TypeId>> {
        if let Some(targets) = &self.impl_targets {
            return targets.clone();
        }

        let blocks = self.index.impls.clone();
        let mut targets = Vec::with_capacity(blocks.len());
        for block in &blocks {
            let target = match self.resolve_type(&block.module, &block.item.self_ty, None) {
                Ok(ty) => {
                    let target = self.graph.deref(ty);
                    self.local_decls.contains_key(&target).then_some(target)
                }
                Err(err) => {
                    debug!(
                        "Skipping impl for `{}`: {}",
                        source_text(&block.item.self_ty),
                        err
                    );
                    None
                }
            };
            targets.push(target);
        }

        self.impl_targets = Some(targets.clone());
        targets
    }

    /// Return type of the associated function or method `name` declared for `owner`
    pub fn method_return(&mut self, owner: TypeId, name: &str) -> Option<TypeId> {
        let targets = self.impl_targets();
        let (module, function) = self
            .index
            .impls
            .iter()
            .zip(&targets)
            .filter(|(_, target)| **target == Some(owner))
            .find_map(|(block, _)| {
                let item: &'a syn::ItemImpl = block.item;
                item.items.iter().find_map(|member| match member {
                    syn::ImplItem::Fn(f) if f.sig.ident == name => Some((block.module.clone(), f)),
                    _ => None,
                })
            })?;

        match &function.sig.output {
            syn::ReturnType::Type(_, ty) => self.resolve_type(&module, ty, Some(owner)).ok(),
            syn::ReturnType::Default => None,
        }
    }

    /// Expression of the associated const `name` declared for `owner`, with its module
    fn associated_const(&mut self, owner: TypeId, name: &str) -> Option<(ModulePath, &'a syn::Expr)> {
        let targets = self.impl_targets();
        self.index
            .impls
            .iter()
            .zip(&targets)
            .filter(|(_, target)| **target == Some(owner))
            .find_map(|(block, _)| {
                let item: &'a syn::ItemImpl = block.item;
                item.items.iter().find_map(|member| match member {
                    syn::ImplItem::Const(c) if c.ident == name => Some((block.module.clone(), &c.expr)),
                    _ => None,
                })
            })
    }

    /// Absolute form of a path written in `module`, e.g. `["rest", "json"]` for `api::json`
    /// under `use rest as api;`
    pub fn canonical_path(&self, module: &[String], segments: &[String]) -> Option<Vec<String>> {
        self.absolutize(module, segments, 0)
    }

    /// Turns a path written in `module` into an absolute path.
    ///
    /// Local paths start with `crate`; anything else is taken to name an external crate or
    /// a prelude item. Returns `None` when `super` climbs past the root or imports loop.
    fn absolutize(&self, module: &[String], segments: &[String], depth: usize) -> Option<Vec<String>> {
        if depth > MAX_RESOLUTION_DEPTH {
            return None;
        }
        let (first, rest) = segments.split_first()?;

        match first.as_str() {
            "crate" => return Some(segments.to_vec()),
            "self" => return Some(join_path(module, rest)),
            "super" => {
                let supers = segments.iter().take_while(|s| *s == "super").count();
                let parent_len = module.len().checked_sub(supers)?;
                return Some(join_path(&module[..parent_len], &segments[supers..]));
            }
            _ => {}
        }

        let Some(scope) = self.index.module(module) else {
            return Some(segments.to_vec());
        };
        if scope.declares(first) {
            return Some(join_path(module, segments));
        }
        if let Some(import) = scope.imports.get(first) {
            if import.len() == 1 && import[0] == *first {
                return Some(segments.to_vec());
            }
            let mut target = self.absolutize(module, import, depth + 1)?;
            target.extend(rest.iter().cloned());
            return Some(target);
        }
        for glob in &scope.globs {
            let Some(base) = self.absolutize(module, glob, depth + 1) else {
                continue;
            };
            if base.first().map(String::as_str) != Some("crate") {
                continue;
            }
            let exported = self
                .index
                .module(&base[1..])
                .is_some_and(|m| m.declares(first) || m.imports.contains_key(first));
            if exported {
                let mut target = base;
                target.extend(segments.iter().cloned());
                return Some(target);
            }
        }

        Some(segments.to_vec())
    }

    /// Finds the type declaration an absolute local path names, following re-exports
    fn lookup_type(&self, absolute: &[String], depth: usize) -> Option<(ModulePath, TypeDecl<'a>)> {
        let (module, name) = self.split_local(absolute, depth)?;
        let scope = self.index.module(module)?;
        if let Some(decl) = scope.types.get(name) {
            return Some((module.to_vec(), *decl));
        }
        let target = self.reexport_target(module, name, depth)?;
        self.lookup_type(&target, depth + 1)
    }

    /// Finds the value declaration an absolute local path names, following re-exports
    fn lookup_value(&self, absolute: &[String], depth: usize) -> Option<(ModulePath, ValueDecl<'a>)> {
        let (module, name) = self.split_local(absolute, depth)?;
        let scope = self.index.module(module)?;
        if let Some(decl) = scope.values.get(name) {
            return Some((module.to_vec(), *decl));
        }
        let target = self.reexport_target(module, name, depth)?;
        self.lookup_value(&target, depth + 1)
    }

    fn split_local<'p>(&self, absolute: &'p [String], depth: usize) -> Option<(&'p [String], &'p String)> {
        if depth > MAX_RESOLUTION_DEPTH || absolute.first().map(String::as_str) != Some("crate") {
            return None;
        }
        let (name, module) = absolute[1..].split_last()?;
        Some((module, name))
    }

    fn reexport_target(&self, module: &[String], name: &str, depth: usize) -> Option<Vec<String>> {
        let scope = self.index.module(module)?;
        if scope.imports.contains_key(name) {
            let target = self.absolutize(module, &[name.to_string()], depth + 1)?;
            return (target.first().map(String::as_str) == Some("crate")).then_some(target);
        }
        scope.globs.iter().find_map(|glob| {
            let mut target = self.absolutize(module, glob, depth + 1)?;
            if target.first().map(String::as_str) != Some("crate") {
                return None;
            }
            target.push(name.to_string());
            let inner = &target[1..target.len() - 1];
            self.index
                .module(inner)
                .is_some_and(|m| m.types.contains_key(name) || m.values.contains_key(name))
                .then_some(target)
        })
    }
}

fn local_key(module: &[String], name: &str) -> String {
    let mut key = String::from("crate");
    for segment in module {
        key.push_str("::");
        key.push_str(segment);
    }
    key.push_str("::");
    key.push_str(name);
    key
}

fn join_path(module: &[String], rest: &[String]) -> Vec<String> {
    let mut path = Vec::with_capacity(module.len() + rest.len() + 1);
    path.push("crate".to_string());
    path.extend(module.iter().cloned());
    path.extend(rest.iter().cloned());
    path
}

fn first_type_argument(segment: &syn::PathSegment) -> Option<&syn::Type> {
    match &segment.arguments {
        syn::PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
            syn::GenericArgument::Type(ty) => Some(ty),
            _ => None,
        }),
        _ => None,
    }
}

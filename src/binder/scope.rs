//! Per-module symbol tables built from the parsed sources.

use crate::parser::{ModulePath, SourceSet};
use log::debug;
use std::collections::{BTreeMap, HashMap, HashSet};
use syn::{Item, UseTree};

/// A type-namespace declaration
#[derive(Debug, Clone, Copy)]
pub enum TypeDecl<'a> {
    Struct(&'a syn::ItemStruct),
    Enum(&'a syn::ItemEnum),
    Alias(&'a syn::ItemType),
}

impl<'a> TypeDecl<'a> {
    pub fn ident(&self) -> &'a syn::Ident {
        match self {
            TypeDecl::Struct(item) => &item.ident,
            TypeDecl::Enum(item) => &item.ident,
            TypeDecl::Alias(item) => &item.ident,
        }
    }

    pub fn attrs(&self) -> &'a [syn::Attribute] {
        match self {
            TypeDecl::Struct(item) => &item.attrs,
            TypeDecl::Enum(item) => &item.attrs,
            TypeDecl::Alias(item) => &item.attrs,
        }
    }
}

/// A value-namespace declaration
#[derive(Debug, Clone, Copy)]
pub enum ValueDecl<'a> {
    Const(&'a syn::ItemConst),
    Static(&'a syn::ItemStatic),
    Fn(&'a syn::ItemFn),
}

/// Items and imports visible at the top level of one module
#[derive(Debug)]
pub struct ModuleScope<'a> {
    pub path: ModulePath,
    /// Index of the file the module is written in
    pub file: usize,
    pub types: HashMap<String, TypeDecl<'a>>,
    pub values: HashMap<String, ValueDecl<'a>>,
    /// Local name -> path as written in the `use` item
    pub imports: HashMap<String, Vec<String>>,
    pub globs: Vec<Vec<String>>,
    pub children: HashSet<String>,
}

impl<'a> ModuleScope<'a> {
    fn new(path: ModulePath, file: usize) -> Self {
        Self {
            path,
            file,
            types: HashMap::new(),
            values: HashMap::new(),
            imports: HashMap::new(),
            globs: Vec::new(),
            children: HashSet::new(),
        }
    }

    /// Whether `name` is declared (not imported) in this module
    pub fn declares(&self, name: &str) -> bool {
        self.types.contains_key(name)
            || self.values.contains_key(name)
            || self.children.contains(name)
    }
}

/// An `impl` block and where it was written
#[derive(Debug, Clone)]
pub struct ImplBlock<'a> {
    pub module: ModulePath,
    pub file: usize,
    pub item: &'a syn::ItemImpl,
}

/// A module-level `struct` or `enum`, in source order
#[derive(Debug, Clone)]
pub struct TypeItem<'a> {
    pub module: ModulePath,
    pub file: usize,
    pub ident: &'a syn::Ident,
    pub decl: TypeDecl<'a>,
}

/// Symbol tables for every module of a [`SourceSet`]
#[derive(Debug, Default)]
pub struct ScopeIndex<'a> {
    pub modules: BTreeMap<ModulePath, ModuleScope<'a>>,
    pub impls: Vec<ImplBlock<'a>>,
    pub declarations: Vec<TypeItem<'a>>,
}

impl<'a> ScopeIndex<'a> {
    pub fn build(sources: &'a SourceSet) -> Self {
        let mut index = ScopeIndex::default();
        for (file_idx, file) in sources.files.iter().enumerate() {
            index.collect_items(&file.module_path, file_idx, &file.syntax_tree.items);
        }
        index.link_children();
        debug!(
            "Indexed {} modules, {} impl blocks, {} type declarations",
            index.modules.len(),
            index.impls.len(),
            index.declarations.len()
        );
        index
    }

    pub fn module(&self, path: &[String]) -> Option<&ModuleScope<'a>> {
        self.modules.get(path)
    }

    fn collect_items(&mut self, module: &[String], file: usize, items: &'a [Item]) {
        self.modules
            .entry(module.to_vec())
            .or_insert_with(|| ModuleScope::new(module.to_vec(), file));

        for item in items {
            match item {
                Item::Struct(s) => {
                    self.scope_mut(module).types.insert(s.ident.to_string(), TypeDecl::Struct(s));
                    self.declarations.push(TypeItem {
                        module: module.to_vec(),
                        file,
                        ident: &s.ident,
                        decl: TypeDecl::Struct(s),
                    });
                }
                Item::Enum(e) => {
                    self.scope_mut(module).types.insert(e.ident.to_string(), TypeDecl::Enum(e));
                    self.declarations.push(TypeItem {
                        module: module.to_vec(),
                        file,
                        ident: &e.ident,
                        decl: TypeDecl::Enum(e),
                    });
                }
                Item::Type(t) => {
                    self.scope_mut(module).types.insert(t.ident.to_string(), TypeDecl::Alias(t));
                }
                Item::Const(c) => {
                    self.scope_mut(module).values.insert(c.ident.to_string(), ValueDecl::Const(c));
                }
                Item::Static(s) => {
                    self.scope_mut(module).values.insert(s.ident.to_string(), ValueDecl::Static(s));
                }
                Item::Fn(f) => {
                    self.scope_mut(module)
                        .values
                        .insert(f.sig.ident.to_string(), ValueDecl::Fn(f));
                }
                Item::Use(u) => {
                    let mut prefix = Vec::new();
                    collect_use_tree(&mut prefix, &u.tree, self.scope_mut(module));
                }
                Item::ExternCrate(krate) => {
                    let name = krate.ident.to_string();
                    let local = match &krate.rename {
                        Some((_, rename)) => rename.to_string(),
                        None => name.clone(),
                    };
                    if local != "_" && local != name {
                        self.scope_mut(module).imports.insert(local, vec![name]);
                    }
                }
                Item::Impl(imp) => self.impls.push(ImplBlock {
                    module: module.to_vec(),
                    file,
                    item: imp,
                }),
                Item::Mod(m) => {
                    let name = m.ident.to_string();
                    self.scope_mut(module).children.insert(name.clone());
                    if let Some((_, content)) = &m.content {
                        let mut child = module.to_vec();
                        child.push(name);
                        self.collect_items(&child, file, content);
                    }
                }
                _ => {}
            }
        }
    }

    fn scope_mut(&mut self, module: &[String]) -> &mut ModuleScope<'a> {
        // collect_items creates the scope before any item is recorded
        self.modules
            .entry(module.to_vec())
            .or_insert_with(|| ModuleScope::new(module.to_vec(), 0))
    }

    /// Registers every file module as a child of its parent
    fn link_children(&mut self) {
        let paths: Vec<ModulePath> = self.modules.keys().cloned().collect();
        for path in paths {
            if let Some((name, parent)) = path.split_last() {
                if let Some(scope) = self.modules.get_mut(parent) {
                    scope.children.insert(name.clone());
                }
            }
        }
    }
}

fn collect_use_tree(prefix: &mut Vec<String>, tree: &UseTree, scope: &mut ModuleScope) {
    match tree {
        UseTree::Path(path) => {
            prefix.push(path.ident.to_string());
            collect_use_tree(prefix, &path.tree, scope);
            prefix.pop();
        }
        UseTree::Name(name) => {
            let ident = name.ident.to_string();
            if ident == "self" {
                if let Some(last) = prefix.last() {
                    scope.imports.insert(last.clone(), prefix.clone());
                }
            } else {
                let mut path = prefix.clone();
                path.push(ident.clone());
                scope.imports.insert(ident, path);
            }
        }
        UseTree::Rename(rename) => {
            let alias = rename.rename.to_string();
            if alias == "_" {
                return;
            }
            let mut path = prefix.clone();
            let ident = rename.ident.to_string();
            if ident != "self" {
                path.push(ident);
            }
            scope.imports.insert(alias, path);
        }
        UseTree::Glob(_) => scope.globs.push(prefix.clone()),
        UseTree::Group(group) => {
            for item in &group.items {
                collect_use_tree(prefix, item, scope);
            }
        }
    }
}

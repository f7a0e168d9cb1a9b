//! Static types of expressions inside method bodies.
//!
//! This is not type inference. Only the forms documentation code actually passes to response
//! constructors and parameter accessors are covered; everything else yields `None`, meaning
//! "not statically determinable".

use super::{source_text, TypeBinder, TypeDecl, ValueDecl, MAX_RESOLUTION_DEPTH};
use crate::parser::ModulePath;
use crate::type_graph::{BasicKind, TypeId, TypeNode};
use log::debug;
use std::collections::HashMap;
use syn::punctuated::Punctuated;
use syn::{Expr, Lit, Pat, Token};

/// Lexical environment of one method body
#[derive(Debug, Clone)]
pub struct ExprContext {
    pub module: ModulePath,
    pub self_ty: Option<TypeId>,
    /// Innermost scope last. `None` marks a binding whose type is unknown.
    scopes: Vec<HashMap<String, Option<TypeId>>>,
}

impl ExprContext {
    pub fn new(module: ModulePath, self_ty: Option<TypeId>) -> Self {
        Self {
            module,
            self_ty,
            scopes: vec![HashMap::new()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn bind(&mut self, name: impl Into<String>, ty: Option<TypeId>) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.into(), ty);
        }
    }

    /// `Some(binding)` when `name` is a local, whatever its type
    pub fn lookup(&self, name: &str) -> Option<Option<TypeId>> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name).copied())
    }
}

impl<'a> TypeBinder<'a> {
    /// Binds the names a `let` statement introduces
    pub fn bind_local(&mut self, local: &syn::Local, ctx: &mut ExprContext) {
        let ty = match (&local.pat, &local.init) {
            (Pat::Type(typed), _) => self.resolve_type(&ctx.module, &typed.ty, ctx.self_ty).ok(),
            (_, Some(init)) => self.resolve_type_of(&init.expr, ctx),
            (_, None) => None,
        };
        self.bind_pattern(&local.pat, ty, ctx);
    }

    /// Binds every identifier in `pat`. Only a plain identifier pattern keeps `ty`.
    pub fn bind_pattern(&mut self, pat: &Pat, ty: Option<TypeId>, ctx: &mut ExprContext) {
        match pat {
            Pat::Ident(ident) => {
                ctx.bind(ident.ident.to_string(), ty);
                if let Some((_, sub)) = &ident.subpat {
                    self.bind_pattern(sub, None, ctx);
                }
            }
            Pat::Type(typed) => {
                let declared = self.resolve_type(&ctx.module, &typed.ty, ctx.self_ty).ok();
                self.bind_pattern(&typed.pat, declared.or(ty), ctx);
            }
            Pat::Reference(reference) => {
                let inner = ty.map(|t| self.pointee(t));
                self.bind_pattern(&reference.pat, inner, ctx);
            }
            Pat::Paren(paren) => self.bind_pattern(&paren.pat, ty, ctx),
            Pat::Tuple(tuple) => {
                for elem in &tuple.elems {
                    self.bind_pattern(elem, None, ctx);
                }
            }
            Pat::TupleStruct(tuple) => {
                // `Some(x)` and `Ok(x)` bind the success value
                let is_success = (tuple.path.is_ident("Some") || tuple.path.is_ident("Ok"))
                    && tuple.elems.len() == 1;
                for elem in &tuple.elems {
                    let inner = if is_success { ty.map(|t| self.unwrapped(t)) } else { None };
                    self.bind_pattern(elem, inner, ctx);
                }
            }
            Pat::Struct(pat_struct) => {
                for field in &pat_struct.fields {
                    self.bind_pattern(&field.pat, None, ctx);
                }
            }
            Pat::Slice(slice) => {
                for elem in &slice.elems {
                    self.bind_pattern(elem, None, ctx);
                }
            }
            Pat::Or(or) => {
                if let Some(first) = or.cases.first() {
                    self.bind_pattern(first, None, ctx);
                }
            }
            _ => {}
        }
    }

    fn pointee(&self, ty: TypeId) -> TypeId {
        match self.graph.node(ty) {
            TypeNode::Pointer(inner) => *inner,
            _ => ty,
        }
    }

    /// What `?` or `unwrap` leaves of an `Option` or `Result`
    fn unwrapped(&self, ty: TypeId) -> TypeId {
        self.result_success(ty).unwrap_or_else(|| self.pointee(ty))
    }

    /// Returns the static type of `expr`, or `None` when it cannot be determined
    pub fn resolve_type_of(&mut self, expr: &Expr, ctx: &mut ExprContext) -> Option<TypeId> {
        match expr {
            Expr::Lit(lit) => Some(self.literal_type(&lit.lit)),
            Expr::Path(path) if path.qself.is_none() => self.path_value_type(&path.path, ctx),
            Expr::Struct(literal) if literal.qself.is_none() => {
                self.resolve_type_path(&ctx.module, &literal.path, ctx.self_ty).ok()
            }
            Expr::Call(call) => self.call_type(call, ctx),
            Expr::MethodCall(call) => self.method_call_type(call, ctx),
            Expr::Field(field) => {
                let base = self.resolve_type_of(&field.base, ctx)?;
                let owner = self.graph.deref(base);
                let member = match &field.member {
                    syn::Member::Named(ident) => ident.to_string(),
                    syn::Member::Unnamed(index) => index.index.to_string(),
                };
                self.field_type(owner, &member)
            }
            Expr::Reference(reference) => {
                let inner = self.resolve_type_of(&reference.expr, ctx)?;
                Some(self.graph.pointer(inner))
            }
            Expr::Unary(unary) => {
                let inner = self.resolve_type_of(&unary.expr, ctx)?;
                match unary.op {
                    syn::UnOp::Deref(_) => Some(self.pointee(inner)),
                    _ => Some(inner),
                }
            }
            Expr::Try(expr_try) => {
                let inner = self.resolve_type_of(&expr_try.expr, ctx)?;
                Some(self.unwrapped(inner))
            }
            Expr::Await(expr_await) => self.resolve_type_of(&expr_await.base, ctx),
            Expr::Cast(cast) => self.resolve_type(&ctx.module, &cast.ty, ctx.self_ty).ok(),
            Expr::Paren(paren) => self.resolve_type_of(&paren.expr, ctx),
            Expr::Group(group) => self.resolve_type_of(&group.expr, ctx),
            Expr::Block(block) => self.block_type(&block.block, ctx),
            Expr::Unsafe(block) => self.block_type(&block.block, ctx),
            Expr::Array(array) => {
                let first = array.elems.first()?;
                let elem = self.resolve_type_of(first, ctx)?;
                Some(self.graph.slice(elem))
            }
            Expr::Repeat(repeat) => {
                let elem = self.resolve_type_of(&repeat.expr, ctx)?;
                Some(self.graph.slice(elem))
            }
            Expr::Index(index) => {
                let base = self.resolve_type_of(&index.expr, ctx)?;
                match self.graph.node(self.graph.deref(base)) {
                    TypeNode::Slice(elem) => Some(*elem),
                    _ => None,
                }
            }
            Expr::Macro(mac) => self.macro_type(&mac.mac, ctx),
            Expr::If(expr_if) => {
                let then_ty = self.block_type(&expr_if.then_branch, ctx);
                match (then_ty, &expr_if.else_branch) {
                    (Some(ty), _) => Some(ty),
                    (None, Some((_, else_expr))) => self.resolve_type_of(else_expr, ctx),
                    (None, None) => None,
                }
            }
            Expr::Match(expr_match) => {
                let scrutinee = self.resolve_type_of(&expr_match.expr, ctx);
                for arm in &expr_match.arms {
                    ctx.push_scope();
                    self.bind_pattern(&arm.pat, scrutinee, ctx);
                    let ty = self.resolve_type_of(&arm.body, ctx);
                    ctx.pop_scope();
                    if ty.is_some() {
                        return ty;
                    }
                }
                None
            }
            Expr::Binary(binary) => {
                use syn::BinOp;
                match binary.op {
                    BinOp::Eq(_)
                    | BinOp::Ne(_)
                    | BinOp::Lt(_)
                    | BinOp::Le(_)
                    | BinOp::Gt(_)
                    | BinOp::Ge(_)
                    | BinOp::And(_)
                    | BinOp::Or(_) => Some(self.graph.basic(BasicKind::Bool)),
                    _ => self.resolve_type_of(&binary.left, ctx),
                }
            }
            Expr::Tuple(tuple) if tuple.elems.is_empty() => Some(self.graph.unsupported("unit type `()`")),
            Expr::Tuple(_) => Some(self.graph.unsupported(format!("tuple `{}`", source_text(expr)))),
            _ => None,
        }
    }

    fn literal_type(&mut self, lit: &Lit) -> TypeId {
        match lit {
            Lit::Str(_) => {
                let string = self.graph.basic(BasicKind::String);
                self.graph.pointer(string)
            }
            Lit::Int(int) => {
                let kind = BasicKind::from_name(int.suffix()).unwrap_or(BasicKind::I32);
                self.graph.basic(kind)
            }
            Lit::Float(float) => {
                let kind = BasicKind::from_name(float.suffix()).unwrap_or(BasicKind::F64);
                self.graph.basic(kind)
            }
            Lit::Bool(_) => self.graph.basic(BasicKind::Bool),
            Lit::Char(_) => self.graph.basic(BasicKind::Char),
            Lit::Byte(_) => self.graph.basic(BasicKind::U8),
            Lit::ByteStr(_) => {
                let byte = self.graph.basic(BasicKind::U8);
                let bytes = self.graph.slice(byte);
                self.graph.pointer(bytes)
            }
            _ => self.graph.unsupported(format!("literal `{}`", source_text(lit))),
        }
    }

    /// Type of a path in value position: a local, a const or static, or a unit struct
    fn path_value_type(&mut self, path: &syn::Path, ctx: &mut ExprContext) -> Option<TypeId> {
        let segments: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
        if let [name] = segments.as_slice() {
            if let Some(binding) = ctx.lookup(name) {
                return binding;
            }
        }

        let absolute = self.absolutize(&ctx.module, &segments, 0)?;
        if let Some((module, value)) = self.lookup_value(&absolute, 0) {
            return match value {
                ValueDecl::Const(item) => self.resolve_type(&module, &item.ty, None).ok(),
                ValueDecl::Static(item) => self.resolve_type(&module, &item.ty, None).ok(),
                ValueDecl::Fn(_) => None,
            };
        }
        if let Some((module, decl)) = self.lookup_type(&absolute, 0) {
            let name = decl.ident().to_string();
            return self.declared_type(&module, &name, decl).ok();
        }

        // `Enum::Variant`, `Type::CONST`, `i64::MAX`
        let (_, prefix) = segments.split_last()?;
        if prefix.is_empty() {
            return None;
        }
        if let [scalar] = prefix {
            if let Some(kind) = BasicKind::from_name(scalar) {
                return Some(self.graph.basic(kind));
            }
        }
        let owner = self.prefix_type(prefix, ctx)?;
        if matches!(self.local_decls.get(&owner).map(|d| d.decl), Some(TypeDecl::Enum(_))) {
            return Some(owner);
        }
        let name = segments.last()?;
        let (module, value) = self.associated_const(owner, name)?;
        let mut const_ctx = ExprContext::new(module, Some(owner));
        self.resolve_type_of(value, &mut const_ctx)
    }

    /// Resolves the type named by the leading segments of an associated item path
    fn prefix_type(&mut self, prefix: &[String], ctx: &ExprContext) -> Option<TypeId> {
        if let [name] = prefix {
            if name == "Self" {
                return ctx.self_ty;
            }
        }
        let absolute = self.absolutize(&ctx.module, prefix, 0)?;
        let (module, decl) = self.lookup_type(&absolute, 0)?;
        let name = decl.ident().to_string();
        let ty = self.declared_type(&module, &name, decl).ok()?;
        Some(self.graph.deref(ty))
    }

    fn call_type(&mut self, call: &syn::ExprCall, ctx: &mut ExprContext) -> Option<TypeId> {
        let Expr::Path(func) = call.func.as_ref() else {
            return None;
        };
        let segments: Vec<String> = func.path.segments.iter().map(|s| s.ident.to_string()).collect();
        let names: Vec<&str> = segments.iter().map(String::as_str).collect();
        let first_arg = call.args.first();

        match names.as_slice() {
            ["Some"] => {
                let inner = self.resolve_type_of(first_arg?, ctx)?;
                return Some(self.graph.pointer(inner));
            }
            [.., "Box" | "Rc" | "Arc", "new"] => {
                let inner = self.resolve_type_of(first_arg?, ctx)?;
                return Some(self.graph.pointer(inner));
            }
            ["String", "from" | "new"] => return Some(self.graph.basic(BasicKind::String)),
            _ => {}
        }

        if let Some(absolute) = self.absolutize(&ctx.module, &segments, 0) {
            if let Some((module, ValueDecl::Fn(item))) = self.lookup_value(&absolute, 0) {
                return match &item.sig.output {
                    syn::ReturnType::Type(_, ty) => self.resolve_type(&module, ty, None).ok(),
                    syn::ReturnType::Default => None,
                };
            }
            // tuple struct constructor
            if let Some((module, decl @ TypeDecl::Struct(_))) = self.lookup_type(&absolute, 0) {
                let name = decl.ident().to_string();
                return self.declared_type(&module, &name, decl).ok();
            }
        }

        if names == ["Self"] {
            return ctx.self_ty;
        }
        let (method, prefix) = segments.split_last()?;
        if prefix.is_empty() {
            return None;
        }
        let owner = self.prefix_type(prefix, ctx)?;
        if matches!(self.local_decls.get(&owner).map(|d| d.decl), Some(TypeDecl::Enum(_))) {
            // `Enum::Variant(..)`
            return Some(owner);
        }
        self.method_return(owner, method)
    }

    fn method_call_type(&mut self, call: &syn::ExprMethodCall, ctx: &mut ExprContext) -> Option<TypeId> {
        let method = call.method.to_string();
        if let Some(turbofish) = &call.turbofish {
            if matches!(method.as_str(), "collect" | "into" | "parse" | "try_into") {
                let ty = turbofish.args.iter().find_map(|arg| match arg {
                    syn::GenericArgument::Type(ty) => Some(ty),
                    _ => None,
                })?;
                return self.resolve_type(&ctx.module, ty, ctx.self_ty).ok();
            }
        }

        match method.as_str() {
            "to_string" | "to_uppercase" | "to_lowercase" | "trim" | "as_str" => {
                return Some(self.graph.basic(BasicKind::String));
            }
            "len" | "count" => return Some(self.graph.basic(BasicKind::Usize)),
            "is_empty" | "contains" | "starts_with" | "ends_with" | "is_some" | "is_none" => {
                return Some(self.graph.basic(BasicKind::Bool));
            }
            _ => {}
        }

        let receiver = self.resolve_type_of(&call.receiver, ctx)?;
        match method.as_str() {
            "clone" | "to_owned" | "to_vec" | "cloned" => Some(self.graph.deref(receiver)),
            "unwrap" | "expect" | "unwrap_or_default" | "unwrap_or" | "unwrap_or_else" => {
                Some(self.unwrapped(receiver))
            }
            "ok" => {
                let success = self.result_success(receiver)?;
                Some(self.graph.pointer(success))
            }
            "as_ref" | "as_mut" | "borrow" => Some(receiver),
            _ => {
                let owner = self.graph.deref(receiver);
                self.method_return(owner, &method)
            }
        }
    }

    fn macro_type(&mut self, mac: &syn::Macro, ctx: &mut ExprContext) -> Option<TypeId> {
        let name = mac.path.segments.last()?.ident.to_string();
        match name.as_str() {
            "format" => Some(self.graph.basic(BasicKind::String)),
            "vec" => {
                let elem = match mac.parse_body_with(Punctuated::<Expr, Token![,]>::parse_terminated) {
                    Ok(elems) => {
                        let first = elems.into_iter().next()?;
                        self.resolve_type_of(&first, ctx)?
                    }
                    // `vec![value; len]`
                    Err(_) => {
                        let tokens = &mac.tokens;
                        let repeat: syn::ExprRepeat = syn::parse2(quote::quote!([#tokens])).ok()?;
                        self.resolve_type_of(&repeat.expr, ctx)?
                    }
                };
                Some(self.graph.slice(elem))
            }
            _ => None,
        }
    }

    /// Type of a block's tail expression, with the block's `let` bindings in scope
    pub fn block_type(&mut self, block: &syn::Block, ctx: &mut ExprContext) -> Option<TypeId> {
        ctx.push_scope();
        let mut ty = None;
        for (position, stmt) in block.stmts.iter().enumerate() {
            match stmt {
                syn::Stmt::Local(local) => self.bind_local(local, ctx),
                syn::Stmt::Expr(expr, None) if position + 1 == block.stmts.len() => {
                    ty = self.resolve_type_of(expr, ctx);
                }
                _ => {}
            }
        }
        ctx.pop_scope();
        ty
    }

    /// Constant-evaluates `expr` to a string.
    ///
    /// String literals, `const`/associated `const` items holding one, and `concat!` of those
    /// evaluate; locals and everything else do not.
    pub fn const_str(&mut self, expr: &Expr, ctx: &ExprContext) -> Option<String> {
        self.const_str_at(expr, ctx, 0)
    }

    fn const_str_at(&mut self, expr: &Expr, ctx: &ExprContext, depth: usize) -> Option<String> {
        if depth > MAX_RESOLUTION_DEPTH {
            debug!("Constant evaluation too deep at `{}`", source_text(expr));
            return None;
        }
        match expr {
            Expr::Lit(syn::ExprLit { lit: Lit::Str(text), .. }) => Some(text.value()),
            Expr::Paren(paren) => self.const_str_at(&paren.expr, ctx, depth + 1),
            Expr::Group(group) => self.const_str_at(&group.expr, ctx, depth + 1),
            Expr::Reference(reference) => self.const_str_at(&reference.expr, ctx, depth + 1),
            Expr::Path(path) if path.qself.is_none() => {
                let segments: Vec<String> =
                    path.path.segments.iter().map(|s| s.ident.to_string()).collect();
                if let [name] = segments.as_slice() {
                    if ctx.lookup(name).is_some() {
                        return None;
                    }
                }

                let absolute = self.absolutize(&ctx.module, &segments, 0)?;
                if let Some((module, ValueDecl::Const(item))) = self.lookup_value(&absolute, 0) {
                    let const_ctx = ExprContext::new(module, None);
                    return self.const_str_at(&item.expr, &const_ctx, depth + 1);
                }

                let (name, prefix) = segments.split_last()?;
                if prefix.is_empty() {
                    return None;
                }
                let owner = self.prefix_type(prefix, ctx)?;
                let (module, value) = self.associated_const(owner, name)?;
                let const_ctx = ExprContext::new(module, Some(owner));
                self.const_str_at(value, &const_ctx, depth + 1)
            }
            Expr::Macro(mac) if mac.mac.path.is_ident("concat") => {
                let parts = mac
                    .mac
                    .parse_body_with(Punctuated::<Expr, Token![,]>::parse_terminated)
                    .ok()?;
                let mut joined = String::new();
                for part in &parts {
                    joined.push_str(&self.const_str_at(part, ctx, depth + 1)?);
                }
                Some(joined)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::tests::source_set;
    use crate::config::Config;

    fn expr(code: &str) -> Expr {
        syn::parse_str(code).unwrap()
    }

    #[test]
    fn test_literal_and_local_types() {
        let sources = source_set(&[(&[], "pub struct User { pub name: String, pub age: u32 }")]);
        let config = Config::default();
        let mut binder = TypeBinder::new(&sources, &config).unwrap();
        let mut ctx = ExprContext::new(Vec::new(), None);

        let int = binder.resolve_type_of(&expr("42u8"), &mut ctx).unwrap();
        assert_eq!(binder.graph().short_name(int), "u8");

        let local: syn::Stmt = syn::parse_str("let user = User { name: String::new(), age: 3 };").unwrap();
        let syn::Stmt::Local(local) = local else {
            panic!("not a let statement");
        };
        binder.bind_local(&local, &mut ctx);

        let user = binder.resolve_declared_type(&[], "User").unwrap();
        let user_ref = binder.graph.pointer(user);
        assert_eq!(binder.resolve_type_of(&expr("user"), &mut ctx), Some(user));
        assert_eq!(binder.resolve_type_of(&expr("&user"), &mut ctx), Some(user_ref));
        let age = binder.resolve_type_of(&expr("user.age"), &mut ctx).unwrap();
        assert_eq!(binder.graph().short_name(age), "u32");
    }

    #[test]
    fn test_calls_and_constructors() {
        let sources = source_set(&[(
            &[],
            r#"
            pub struct User { pub name: String }
            pub struct UserId(pub u64);
            impl User {
                pub fn new(name: &str) -> Self { User { name: name.to_string() } }
                pub fn friends(&self) -> Vec<User> { Vec::new() }
            }
            pub fn load_all() -> Vec<User> { Vec::new() }
            "#,
        )]);
        let config = Config::default();
        let mut binder = TypeBinder::new(&sources, &config).unwrap();
        let user = binder.resolve_declared_type(&[], "User").unwrap();
        let user_id = binder.resolve_declared_type(&[], "UserId").unwrap();
        let users = binder.graph.slice(user);
        let mut ctx = ExprContext::new(Vec::new(), None);

        assert_eq!(binder.resolve_type_of(&expr("User::new(\"ann\")"), &mut ctx), Some(user));
        assert_eq!(binder.resolve_type_of(&expr("UserId(7)"), &mut ctx), Some(user_id));
        assert_eq!(binder.resolve_type_of(&expr("load_all()"), &mut ctx), Some(users));
        assert_eq!(
            binder.resolve_type_of(&expr("User::new(\"ann\").friends()"), &mut ctx),
            Some(users)
        );
        assert_eq!(
            binder.resolve_type_of(&expr("vec![User::new(\"a\"), User::new(\"b\")]"), &mut ctx),
            Some(users)
        );
        assert_eq!(
            binder.resolve_type_of(&expr("load_all().into_iter().collect::<Vec<User>>()"), &mut ctx),
            Some(users)
        );
        assert_eq!(binder.resolve_type_of(&expr("unknown_function()"), &mut ctx), None);
    }

    #[test]
    fn test_self_receiver_and_fields() {
        let sources = source_set(&[(
            &[],
            r#"
            pub struct Profile { pub bio: String }
            pub struct ProfileResource { profile: Profile }
            "#,
        )]);
        let config = Config::default();
        let mut binder = TypeBinder::new(&sources, &config).unwrap();
        let resource = binder.resolve_declared_type(&[], "ProfileResource").unwrap();
        let profile = binder.resolve_declared_type(&[], "Profile").unwrap();

        let mut ctx = ExprContext::new(Vec::new(), Some(resource));
        let self_ref = binder.graph.pointer(resource);
        ctx.bind("self", Some(self_ref));

        assert_eq!(binder.resolve_type_of(&expr("self.profile"), &mut ctx), Some(profile));
        assert_eq!(
            binder.resolve_type_of(&expr("self.profile.clone()"), &mut ctx),
            Some(profile)
        );
        assert_eq!(
            binder.resolve_type_of(&expr("Self { profile: todo!() }"), &mut ctx),
            Some(resource)
        );
    }

    #[test]
    fn test_results_unwrap_to_their_success_type() {
        let sources = source_set(&[(
            &[],
            r#"
            pub struct User { pub name: String }
            pub struct Lookup { pub last: Result<User, String> }
            pub fn find() -> Result<User, String> { Err(String::new()) }
            pub async fn fetch() -> anyhow::Result<Vec<User>> { Ok(Vec::new()) }
            "#,
        )]);
        let config = Config::default();
        let mut binder = TypeBinder::new(&sources, &config).unwrap();
        let user = binder.resolve_declared_type(&[], "User").unwrap();
        let users = binder.graph.slice(user);
        let optional_user = binder.graph.pointer(user);
        let mut ctx = ExprContext::new(Vec::new(), None);

        assert_eq!(binder.resolve_type_of(&expr("find()?"), &mut ctx), Some(user));
        assert_eq!(binder.resolve_type_of(&expr("find().unwrap()"), &mut ctx), Some(user));
        assert_eq!(binder.resolve_type_of(&expr("find().ok()"), &mut ctx), Some(optional_user));
        assert_eq!(binder.resolve_type_of(&expr("fetch().await?"), &mut ctx), Some(users));

        // the result itself has no documented shape
        let result = binder.resolve_type_of(&expr("find()"), &mut ctx).unwrap();
        assert!(matches!(binder.graph().node(result), TypeNode::Unsupported(_)));
        let lookup = binder.resolve_declared_type(&[], "Lookup").unwrap();
        let last = binder.field_type(lookup, "last").unwrap();
        assert!(matches!(binder.graph().node(last), TypeNode::Unsupported(_)));
    }

    #[test]
    fn test_shadowing_hides_outer_binding() {
        let sources = source_set(&[(&[], "pub struct A;")]);
        let config = Config::default();
        let mut binder = TypeBinder::new(&sources, &config).unwrap();
        let a = binder.resolve_declared_type(&[], "A").unwrap();

        let mut ctx = ExprContext::new(Vec::new(), None);
        ctx.bind("value", Some(a));
        ctx.push_scope();
        ctx.bind("value", None);
        assert_eq!(binder.resolve_type_of(&expr("value"), &mut ctx), None);
        ctx.pop_scope();
        assert_eq!(binder.resolve_type_of(&expr("value"), &mut ctx), Some(a));
    }

    #[test]
    fn test_const_str() {
        let sources = source_set(&[
            (
                &[],
                r#"
                pub mod params;
                pub const AGE: &str = "age";
                pub struct UserResource;
                impl UserResource { const LIMIT: &'static str = "limit"; }
                "#,
            ),
            (&["params"], "pub const PAGE: &str = concat!(\"pa\", \"ge\");"),
        ]);
        let config = Config::default();
        let mut binder = TypeBinder::new(&sources, &config).unwrap();
        let resource = binder.resolve_declared_type(&[], "UserResource").unwrap();
        let mut ctx = ExprContext::new(Vec::new(), Some(resource));

        assert_eq!(binder.const_str(&expr("\"name\""), &ctx), Some("name".to_string()));
        assert_eq!(binder.const_str(&expr("AGE"), &ctx), Some("age".to_string()));
        assert_eq!(binder.const_str(&expr("params::PAGE"), &ctx), Some("page".to_string()));
        assert_eq!(binder.const_str(&expr("Self::LIMIT"), &ctx), Some("limit".to_string()));
        assert_eq!(binder.const_str(&expr("format!(\"x\")"), &ctx), None);

        ctx.bind("AGE", None);
        assert_eq!(binder.const_str(&expr("AGE"), &ctx), None);
    }
}

use crate::binder::{source_text, ExprContext, TypeBinder};
use crate::config::Vocabulary;
use crate::detector::CapabilityAliases;
use crate::discoverer::{DiscoveredResource, MethodSite};
use crate::error::{Error, Result};
use crate::parser::doc_text;
use crate::resource::{Method, Resource};
use crate::response::Response;
use crate::type_graph::TypeId;
use log::{debug, info};
use syn::punctuated::Punctuated;
use syn::visit::{self, Visit};
use syn::{Expr, Token};

/// Call pattern matcher for collecting responses and parameters of verb methods.
///
/// Responses are only taken from return positions: `return` expressions outside closures
/// and nested items, and the body's tail expression, where a tail `if`, `match` or block
/// contributes each of its branch tails. Any call nested in such an expression counts,
/// including calls inside macro arguments. Parameter accessors are recorded wherever they
/// appear in the body.
pub struct CallPatternMatcher<'b, 'a> {
    binder: &'b mut TypeBinder<'a>,
    aliases: &'b CapabilityAliases,
}

impl<'b, 'a> CallPatternMatcher<'b, 'a> {
    pub fn new(binder: &'b mut TypeBinder<'a>, aliases: &'b CapabilityAliases) -> Self {
        Self { binder, aliases }
    }

    /// Analyzes every verb method of the discovered resources
    pub fn match_resources(&mut self, discovered: Vec<DiscoveredResource<'a>>) -> Result<Vec<Resource>> {
        let mut resources = Vec::with_capacity(discovered.len());
        for DiscoveredResource {
            mut resource, sites, ..
        } in discovered
        {
            for site in &sites {
                let method = resource.methods.entry(site.verb).or_default();
                self.analyze(site, method)?;
                debug!(
                    "{} {}: {} responses, {} params",
                    site.verb,
                    resource.path,
                    method.responses.len(),
                    method.params.len()
                );
            }
            resources.push(resource);
        }
        info!("Matched calls in {} resources", resources.len());
        Ok(resources)
    }

    /// Walks the body of one verb method, filling in `method`.
    ///
    /// # Errors
    ///
    /// Fails when the type of a `json` argument cannot be determined, or when completing the
    /// type of a returned payload reaches an unknown type.
    pub fn analyze(&mut self, site: &MethodSite<'a>, method: &mut Method) -> Result<()> {
        let vocabulary: &'a Vocabulary = &self.binder.config().capability;
        let mut ctx = ExprContext::new(site.module.clone(), Some(site.self_ty));

        for input in &site.item.sig.inputs {
            match input {
                // field and method lookups see through references, so every receiver form
                // binds the resource type itself
                syn::FnArg::Receiver(_) => ctx.bind("self", Some(site.self_ty)),
                syn::FnArg::Typed(typed) => {
                    let ty = self
                        .binder
                        .resolve_type(&site.module, &typed.ty, Some(site.self_ty))
                        .ok();
                    self.binder.bind_pattern(&typed.pat, ty, &mut ctx);
                }
            }
        }

        let mut walker = BodyWalker {
            binder: &mut *self.binder,
            aliases: self.aliases,
            vocabulary,
            file: site.file,
            doc: doc_text(&site.item.attrs),
            ctx,
            method,
            returning: 0,
            closure_depth: 0,
            error: None,
        };
        walker.walk_block(&site.item.block, true);

        match walker.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Response constructors the vocabulary names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selector {
    Json,
    Error,
    Success,
}

/// Single pass over one method body.
///
/// Locals are bound in source order so every expression is typed in the scope it is written
/// in. `returning` counts the return-position expressions currently entered.
struct BodyWalker<'w, 'a> {
    binder: &'w mut TypeBinder<'a>,
    aliases: &'w CapabilityAliases,
    vocabulary: &'a Vocabulary,
    file: usize,
    doc: String,
    ctx: ExprContext,
    method: &'w mut Method,
    returning: usize,
    closure_depth: usize,
    error: Option<Error>,
}

impl<'w, 'a> BodyWalker<'w, 'a> {
    /// Visits a block in its own scope. With `tail`, the trailing expression is a return
    /// position.
    fn walk_block(&mut self, block: &syn::Block, tail: bool) {
        self.ctx.push_scope();
        let last = block.stmts.len().saturating_sub(1);
        for (position, stmt) in block.stmts.iter().enumerate() {
            if self.error.is_some() {
                break;
            }
            match stmt {
                syn::Stmt::Local(local) => self.visit_local(local),
                syn::Stmt::Item(_) => {}
                syn::Stmt::Expr(expr, None) if tail && position == last => self.visit_tail_expr(expr),
                syn::Stmt::Expr(expr, _) => self.visit_expr(expr),
                syn::Stmt::Macro(stmt_macro) => self.visit_macro(&stmt_macro.mac),
            }
        }
        self.ctx.pop_scope();
    }

    fn visit_tail_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::If(expr_if) => {
                self.ctx.push_scope();
                self.visit_expr(&expr_if.cond);
                self.walk_block(&expr_if.then_branch, true);
                self.ctx.pop_scope();
                if let Some((_, else_branch)) = &expr_if.else_branch {
                    self.visit_tail_expr(else_branch);
                }
            }
            Expr::Match(expr_match) => {
                self.visit_expr(&expr_match.expr);
                let scrutinee = self.binder.resolve_type_of(&expr_match.expr, &mut self.ctx);
                for arm in &expr_match.arms {
                    self.walk_arm(arm, scrutinee, true);
                }
            }
            Expr::Block(block) if block.label.is_none() => self.walk_block(&block.block, true),
            Expr::Unsafe(block) => self.walk_block(&block.block, true),
            Expr::Paren(paren) => self.visit_tail_expr(&paren.expr),
            _ => {
                self.returning += 1;
                self.visit_expr(expr);
                self.returning -= 1;
            }
        }
    }

    /// Visits one match arm with its pattern bound against the scrutinee type
    fn walk_arm(&mut self, arm: &syn::Arm, scrutinee: Option<TypeId>, tail: bool) {
        self.ctx.push_scope();
        self.binder.bind_pattern(&arm.pat, scrutinee, &mut self.ctx);
        if let Some((_, guard)) = &arm.guard {
            self.visit_detached_expr(guard);
        }
        if tail {
            self.visit_tail_expr(&arm.body);
        } else {
            self.visit_detached_expr(&arm.body);
        }
        self.ctx.pop_scope();
    }

    /// Visits an expression that does not borrow from the method body, such as a parsed
    /// macro argument
    fn visit_detached_expr(&mut self, expr: &Expr) {
        Visit::visit_expr(self, expr);
    }

    fn selector(&self, call: &syn::ExprCall) -> Option<Selector> {
        let Expr::Path(func) = call.func.as_ref() else {
            return None;
        };
        if func.qself.is_some() {
            return None;
        }
        let segments: Vec<String> = func.path.segments.iter().map(|s| s.ident.to_string()).collect();
        let canonical = self.binder.canonical_path(&self.ctx.module, &segments);

        let name = match (canonical.as_deref(), segments.as_slice()) {
            (Some([base, name]), _) if *base == self.vocabulary.name => name,
            // An alias the module scope does not see, e.g. one imported in a sibling module
            (Some(path), [base, name])
                if path.first().map(String::as_str) != Some("crate")
                    && self.aliases.is_capability(self.file, base) =>
            {
                name
            }
            _ => return None,
        };

        let vocabulary = self.vocabulary;
        if *name == vocabulary.json {
            Some(Selector::Json)
        } else if *name == vocabulary.json_error || *name == vocabulary.json_errorf {
            Some(Selector::Error)
        } else if *name == vocabulary.json_success {
            Some(Selector::Success)
        } else {
            None
        }
    }

    fn match_response(&mut self, call: &syn::ExprCall) -> Result<()> {
        let Some(selector) = self.selector(call) else {
            return Ok(());
        };

        let response = match selector {
            Selector::Success => Response::Success,
            Selector::Error => Response::Error,
            Selector::Json => {
                let payload = call.args.first().and_then(|arg| self.binder.resolve_type_of(arg, &mut self.ctx));
                let Some(payload) = payload else {
                    return Err(Error::bind(
                        &self.ctx.module,
                        format!("cannot determine the payload type of `{}`", source_text(call)),
                    ));
                };
                self.binder.complete(payload)?;
                Response::Json(payload)
            }
        };

        self.method.doc = self.doc.clone();
        if self.method.add_response(response, self.binder.graph()) {
            debug!("Found response {:?} in `{}`", response, source_text(call));
        }
        Ok(())
    }

    fn match_param(&mut self, call: &syn::ExprMethodCall) {
        let Some(receiver) = self.binder.resolve_type_of(&call.receiver, &mut self.ctx) else {
            return;
        };
        let receiver = self.binder.graph().deref(receiver);
        if !self.binder.is_identical(receiver, self.binder.request_type()) {
            return;
        }
        let Some(first) = call.args.first() else {
            return;
        };
        match self.binder.const_str(first, &self.ctx) {
            Some(name) => {
                self.method.params.insert(name);
            }
            None => debug!("Ignoring non-constant parameter name `{}`", source_text(first)),
        }
    }
}

impl<'ast, 'w, 'a> Visit<'ast> for BodyWalker<'w, 'a> {
    fn visit_block(&mut self, block: &'ast syn::Block) {
        self.walk_block(block, false);
    }

    fn visit_local(&mut self, local: &'ast syn::Local) {
        if let Some(init) = &local.init {
            self.visit_expr(&init.expr);
            if let Some((_, diverge)) = &init.diverge {
                self.visit_expr(diverge);
            }
        }
        self.binder.bind_local(local, &mut self.ctx);
    }

    fn visit_item(&mut self, _item: &'ast syn::Item) {}

    fn visit_expr_return(&mut self, node: &'ast syn::ExprReturn) {
        if self.closure_depth > 0 {
            visit::visit_expr_return(self, node);
            return;
        }
        self.returning += 1;
        visit::visit_expr_return(self, node);
        self.returning -= 1;
    }

    fn visit_expr_closure(&mut self, node: &'ast syn::ExprClosure) {
        let returning = std::mem::replace(&mut self.returning, 0);
        self.closure_depth += 1;
        self.ctx.push_scope();
        for input in &node.inputs {
            self.binder.bind_pattern(input, None, &mut self.ctx);
        }
        self.visit_expr(&node.body);
        self.ctx.pop_scope();
        self.closure_depth -= 1;
        self.returning = returning;
    }

    fn visit_expr_async(&mut self, node: &'ast syn::ExprAsync) {
        let returning = std::mem::replace(&mut self.returning, 0);
        self.closure_depth += 1;
        self.walk_block(&node.block, false);
        self.closure_depth -= 1;
        self.returning = returning;
    }

    fn visit_expr_if(&mut self, node: &'ast syn::ExprIf) {
        self.ctx.push_scope();
        self.visit_expr(&node.cond);
        self.walk_block(&node.then_branch, false);
        self.ctx.pop_scope();
        if let Some((_, else_branch)) = &node.else_branch {
            self.visit_expr(else_branch);
        }
    }

    fn visit_expr_while(&mut self, node: &'ast syn::ExprWhile) {
        self.ctx.push_scope();
        self.visit_expr(&node.cond);
        self.walk_block(&node.body, false);
        self.ctx.pop_scope();
    }

    fn visit_expr_let(&mut self, node: &'ast syn::ExprLet) {
        self.visit_expr(&node.expr);
        let ty = self.binder.resolve_type_of(&node.expr, &mut self.ctx);
        self.binder.bind_pattern(&node.pat, ty, &mut self.ctx);
    }

    fn visit_expr_for_loop(&mut self, node: &'ast syn::ExprForLoop) {
        self.visit_expr(&node.expr);
        self.ctx.push_scope();
        self.binder.bind_pattern(&node.pat, None, &mut self.ctx);
        self.walk_block(&node.body, false);
        self.ctx.pop_scope();
    }

    fn visit_expr_match(&mut self, node: &'ast syn::ExprMatch) {
        self.visit_expr(&node.expr);
        let scrutinee = self.binder.resolve_type_of(&node.expr, &mut self.ctx);
        for arm in &node.arms {
            self.walk_arm(arm, scrutinee, false);
        }
    }

    fn visit_expr_call(&mut self, call: &'ast syn::ExprCall) {
        if self.error.is_some() {
            return;
        }
        if self.returning > 0 {
            if let Err(err) = self.match_response(call) {
                self.error = Some(err);
                return;
            }
        }
        visit::visit_expr_call(self, call);
    }

    fn visit_expr_method_call(&mut self, call: &'ast syn::ExprMethodCall) {
        if self.error.is_some() {
            return;
        }
        self.match_param(call);
        visit::visit_expr_method_call(self, call);
    }

    fn visit_macro(&mut self, mac: &'ast syn::Macro) {
        if self.error.is_some() {
            return;
        }
        if let Ok(args) = mac.parse_body_with(Punctuated::<Expr, Token![,]>::parse_terminated) {
            for arg in &args {
                self.visit_detached_expr(arg);
            }
            return;
        }
        // `vec![value; len]`
        let tokens = &mac.tokens;
        if let Ok(repeat) = syn::parse2::<syn::ExprRepeat>(quote::quote!([#tokens])) {
            self.visit_detached_expr(&repeat.expr);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::tests::source_set;
    use crate::config::Config;
    use crate::detector::CapabilityDetector;
    use crate::discoverer::ResourceDiscoverer;
    use crate::parser::SourceSet;
    use crate::resource::HttpVerb;
    use crate::schema_renderer::SchemaRenderer;
    use crate::type_graph::TypeGraph;
    use pretty_assertions::assert_eq;

    fn analyze_sources(sources: &SourceSet, config: &Config) -> Result<(Vec<Resource>, TypeGraph)> {
        let aliases = CapabilityDetector::detect(sources, &config.capability);
        let mut binder = TypeBinder::new(sources, config)?;
        let discovered = ResourceDiscoverer::discover(&mut binder)?;
        let resources = CallPatternMatcher::new(&mut binder, &aliases).match_resources(discovered)?;
        Ok((resources, binder.into_graph()))
    }

    fn schemas(graph: &TypeGraph, method: &Method) -> Vec<String> {
        method.responses.iter().map(|r| r.describe(graph)).collect()
    }

    const USERS: &str = r#"
        use rest::{json, Request};

        pub struct User {
            pub name: String,
            pub age: u32,
        }

        pub struct UserResource;

        impl UserResource {
            /// Returns one user.
            pub fn get(&self, req: &Request) -> rest::Response {
                let age = req.param("age");
                let name = req.query(NAME);
                if age.is_empty() {
                    return rest::json_error(400, "missing age");
                }
                let user = User { name: "ada".to_string(), age: 36 };
                json(user)
            }

            /// Deletes a user.
            pub fn delete(&self, req: &Request) -> rest::Response {
                match req.param("id").as_str() {
                    "" => rest::json_errorf(404, "no user"),
                    _ => rest::json_success(),
                }
            }
        }

        const NAME: &str = "name";
    "#;

    #[test]
    fn test_responses_and_params() {
        let sources = source_set(&[(&[], USERS)]);
        let config = Config::default();
        let (resources, graph) = analyze_sources(&sources, &config).unwrap();

        let resource = resources.iter().find(|r| r.name == "UserResource").unwrap();
        let get = resource.method(HttpVerb::Get).unwrap();
        assert_eq!(get.doc, "Returns one user.");
        assert_eq!(get.params.iter().cloned().collect::<Vec<_>>(), vec!["age", "name"]);
        assert_eq!(
            schemas(&graph, get),
            vec![
                "{\n\tcode: u16\n\terror: string\n}".to_string(),
                "{\n\tname: string\n\tage: u32\n}".to_string(),
            ]
        );

        let delete = resource.method(HttpVerb::Delete).unwrap();
        assert_eq!(delete.responses, vec![Response::Error, Response::Success]);
        assert_eq!(delete.params.len(), 1);
    }

    #[test]
    fn test_aliased_capability() {
        let sources = source_set(&[(
            &[],
            r#"
            use rest as api;
            pub struct Thing { pub id: u64 }
            pub struct ThingResource;
            impl ThingResource {
                fn post(&self, req: api::Request) -> api::Response {
                    let id: u64 = 7;
                    req.form("title");
                    api::json(Thing { id })
                }
            }
            "#,
        )]);
        let config = Config::default();
        let (resources, graph) = analyze_sources(&sources, &config).unwrap();

        let post = resources[1].method(HttpVerb::Post).unwrap();
        assert_eq!(schemas(&graph, post), vec!["{\n\tid: u64\n}".to_string()]);
        assert!(post.params.contains("title"));
    }

    #[test]
    fn test_calls_outside_return_positions_are_ignored() {
        let sources = source_set(&[(
            &[],
            r#"
            pub struct Quiet;
            impl Quiet {
                fn get(&self) -> rest::Response {
                    let unused = rest::json_error(500, "never returned");
                    let handler = |x: u8| { return rest::json_success(); };
                    other::json(1u8);
                    rest::redirect("/")
                }
            }
            "#,
        )]);
        let config = Config::default();
        let (resources, _) = analyze_sources(&sources, &config).unwrap();

        let get = resources[0].method(HttpVerb::Get).unwrap();
        assert!(get.responses.is_empty());
        assert_eq!(get.doc, "");
    }

    #[test]
    fn test_duplicate_shapes_are_recorded_once() {
        let sources = source_set(&[(
            &[],
            r#"
            pub struct Item { pub label: String }
            pub struct Items;
            impl Items {
                fn get(&self, flag: bool) -> rest::Response {
                    if flag {
                        return rest::json(vec![Item { label: String::new() }]);
                    }
                    if !flag {
                        return rest::json_error(400, "a");
                    }
                    match flag {
                        true => rest::json(vec![Item { label: String::new() }]),
                        false => rest::json_errorf(400, "b"),
                    }
                }
            }
            "#,
        )]);
        let config = Config::default();
        let (resources, graph) = analyze_sources(&sources, &config).unwrap();

        let get = resources[1].method(HttpVerb::Get).unwrap();
        assert_eq!(get.responses.len(), 2);
        let Response::Json(items) = get.responses[0] else {
            panic!("first response is not a payload");
        };
        assert_eq!(SchemaRenderer::new(&graph).render(items), "[{\n\tlabel: string\n}]");
        assert_eq!(get.responses[1], Response::Error);
    }

    const STORE: &str = r#"
        pub struct User {
            pub name: String,
            pub age: u32,
        }

        pub struct Store;

        impl Store {
            pub fn find(&self, id: u64) -> Result<User, String> {
                Err(format!("no user {}", id))
            }

            pub async fn load(&self, id: u64) -> std::io::Result<User> {
                unimplemented!()
            }
        }

        pub struct UserResource {
            store: Store,
        }

        impl UserResource {
            fn get(&self) -> Result<rest::Response, String> {
                let user = self.store.find(1)?;
                Ok(rest::json(user))
            }

            async fn post(&self) -> anyhow::Result<rest::Response> {
                let user = self.store.load(2).await?;
                Ok(rest::json(user))
            }

            fn put(&self) -> rest::Response {
                let user = self.store.find(3).expect("seeded");
                rest::json(user)
            }

            fn delete(&self) -> rest::Response {
                match self.store.find(4) {
                    Ok(user) => rest::json(user),
                    Err(_) => rest::json_error(404, "gone"),
                }
            }
        }
    "#;

    #[test]
    fn test_payloads_behind_results_and_futures() {
        let sources = source_set(&[(&[], STORE)]);
        let config = Config::default();
        let (resources, graph) = analyze_sources(&sources, &config).unwrap();

        let resource = resources.iter().find(|r| r.name == "UserResource").unwrap();
        let user = "{\n\tname: string\n\tage: u32\n}".to_string();
        for verb in [HttpVerb::Get, HttpVerb::Post, HttpVerb::Put] {
            let method = resource.method(verb).unwrap();
            assert_eq!(schemas(&graph, method), vec![user.clone()], "{}", verb);
        }

        let delete = resource.method(HttpVerb::Delete).unwrap();
        assert_eq!(
            schemas(&graph, delete),
            vec![user, "{\n\tcode: u16\n\terror: string\n}".to_string()]
        );
    }

    #[test]
    fn test_undeterminable_payload_is_fatal() {
        let sources = source_set(&[(
            &[],
            r#"
            pub struct Broken;
            impl Broken {
                fn get(&self) -> rest::Response {
                    rest::json(external::load())
                }
            }
            "#,
        )]);
        let config = Config::default();
        let err = analyze_sources(&sources, &config).unwrap_err();
        assert!(matches!(err, Error::Bind { .. }));
        assert!(err.to_string().contains("external"));
    }

    #[test]
    fn test_payload_with_unknown_field_type_is_fatal() {
        let sources = source_set(&[(
            &[],
            r#"
            pub struct Report { pub pool: sqlx::PgPool }
            pub struct Reports;
            impl Reports {
                fn get(&self, report: Report) -> rest::Response {
                    rest::json(report)
                }
            }
            "#,
        )]);
        let config = Config::default();
        let err = analyze_sources(&sources, &config).unwrap_err();
        assert!(err.to_string().contains("sqlx::PgPool"));
    }

    #[test]
    fn test_params_inside_closures_and_macros() {
        let sources = source_set(&[(
            &[],
            r#"
            use rest::Request;
            pub struct Search;
            impl Search {
                fn get(&self, req: &Request) -> rest::Response {
                    let pick = |r: &Request| r.param("page");
                    println!("{}", req.param("q"));
                    let key = "dynamic";
                    req.param(key);
                    rest::json_success()
                }
            }
            "#,
        )]);
        let config = Config::default();
        let (resources, _) = analyze_sources(&sources, &config).unwrap();

        let get = resources[0].method(HttpVerb::Get).unwrap();
        assert_eq!(get.params.iter().cloned().collect::<Vec<_>>(), vec!["page", "q"]);
    }
}

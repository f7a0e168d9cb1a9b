use crate::binder::{TypeBinder, TypeItem};
use crate::config::RouteDirective;
use crate::error::Result;
use crate::parser::{doc_text, ModulePath};
use crate::resource::{HttpVerb, Method, Resource};
use crate::type_graph::TypeId;
use log::{debug, info};
use std::collections::BTreeMap;

/// A verb method attached to a resource
#[derive(Debug, Clone)]
pub struct MethodSite<'a> {
    pub verb: HttpVerb,
    pub item: &'a syn::ImplItemFn,
    /// Module the `impl` block is written in
    pub module: ModulePath,
    pub file: usize,
    /// The resource type `Self` refers to
    pub self_ty: TypeId,
}

/// A resource together with the verb methods still to be analyzed
#[derive(Debug, Clone)]
pub struct DiscoveredResource<'a> {
    pub resource: Resource,
    pub type_id: TypeId,
    /// In the order the verbs were found, one per verb
    pub sites: Vec<MethodSite<'a>>,
}

/// Resource discoverer for turning declarations into resources.
///
/// Every module-level `struct` and `enum` becomes a resource, even without verb methods.
/// Methods attach by the canonical identity of the `impl` self type, so `impl T`,
/// `impl Trait for T` and `impl Trait for &T` all count, whatever the receiver form.
pub struct ResourceDiscoverer;

impl ResourceDiscoverer {
    pub fn discover<'a>(binder: &mut TypeBinder<'a>) -> Result<Vec<DiscoveredResource<'a>>> {
        info!("Discovering resources in {} declarations", binder.declarations().len());

        let declarations: Vec<TypeItem<'a>> = binder.declarations().to_vec();
        let targets = binder.impl_targets();
        let blocks = binder.impl_blocks().to_vec();
        let verbs = binder.config().verbs.clone();
        let directive = binder.config().route_directive.clone();

        let mut discovered = Vec::with_capacity(declarations.len());
        for decl in &declarations {
            let name = decl.ident.to_string();
            let type_id = binder.resolve_declared_type(&decl.module, &name)?;

            let mut resource = Resource::new(name.clone(), qualified_path(&decl.module, &name));
            let (doc, url) = split_route(&doc_text(decl.decl.attrs()), &directive);
            resource.doc = doc;
            resource.url = url;

            let mut sites: BTreeMap<HttpVerb, MethodSite<'a>> = BTreeMap::new();
            let mut order = Vec::new();
            for (block, target) in blocks.iter().zip(&targets) {
                if *target != Some(type_id) {
                    continue;
                }
                let item: &'a syn::ItemImpl = block.item;
                for member in &item.items {
                    let syn::ImplItem::Fn(function) = member else {
                        continue;
                    };
                    if function.sig.receiver().is_none() {
                        continue;
                    }
                    let method_name = function.sig.ident.to_string();
                    let Some(verb) = HttpVerb::from_method_name(&method_name, &verbs) else {
                        continue;
                    };
                    if sites.contains_key(&verb) {
                        debug!("{}: ignoring second `{}` method", resource.path, method_name);
                        continue;
                    }
                    order.push(verb);
                    sites.insert(
                        verb,
                        MethodSite {
                            verb,
                            item: function,
                            module: block.module.clone(),
                            file: block.file,
                            self_ty: type_id,
                        },
                    );
                }
            }

            for verb in &order {
                resource.methods.insert(*verb, Method::default());
            }
            debug!("Resource {} with verbs {:?}", resource.path, order);

            let sites = order.iter().filter_map(|verb| sites.remove(verb)).collect();
            discovered.push(DiscoveredResource {
                resource,
                type_id,
                sites,
            });
        }

        info!("Discovered {} resources", discovered.len());
        Ok(discovered)
    }
}

fn qualified_path(module: &[String], name: &str) -> String {
    if module.is_empty() {
        name.to_string()
    } else {
        format!("{}::{}", module.join("::"), name)
    }
}

/// Removes route directive lines from `doc`, returning the remaining text and the first URL
fn split_route(doc: &str, directive: &RouteDirective) -> (String, Option<String>) {
    let mut url = None;
    let mut lines = Vec::new();
    for line in doc.lines() {
        match line.trim().strip_prefix(directive.0.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => {
                let route = rest.trim();
                if url.is_none() && !route.is_empty() {
                    url = Some(route.to_string());
                }
            }
            _ => lines.push(line),
        }
    }
    (lines.join("\n").trim().to_string(), url)
}

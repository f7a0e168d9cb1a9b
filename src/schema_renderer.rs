use crate::type_graph::{TypeGraph, TypeId, TypeNode};
use std::collections::HashSet;

/// Text emitted in place of a type already being rendered
pub const RECURSIVE_SENTINEL: &str = "<recursive>";

/// Hard nesting limit. Only reachable through direct containment cycles, which Rust rejects
/// as infinitely sized, so it guards against malformed graphs.
const MAX_RENDER_DEPTH: usize = 128;

/// Schema renderer for converting resolved types into canonical structural text.
///
/// Named types expand to their underlying structure and pointers are transparent. Struct
/// fields are listed one per line in declaration order, indented with tabs, and only
/// exported fields appear:
///
/// ```text
/// {
/// 	name: string
/// 	tags: [string]
/// }
/// ```
///
/// Rendering is pure: the same type always produces the same text.
pub struct SchemaRenderer<'g> {
    graph: &'g TypeGraph,
}

impl<'g> SchemaRenderer<'g> {
    pub fn new(graph: &'g TypeGraph) -> Self {
        Self { graph }
    }

    /// Renders the schema text of `id`
    pub fn render(&self, id: TypeId) -> String {
        let mut out = String::new();
        let mut visited = HashSet::new();
        self.render_into(id, &mut visited, 0, 0, &mut out);
        out
    }

    /// `visited` holds the types on the current render path; each entry is removed once its
    /// subtree is done, so siblings sharing a type both expand fully. `indent` is the tab
    /// level of the line the text starts on.
    fn render_into(
        &self,
        id: TypeId,
        visited: &mut HashSet<TypeId>,
        depth: usize,
        indent: usize,
        out: &mut String,
    ) {
        let node = self.graph.node(id);
        let indirection = matches!(node, TypeNode::Pointer(_) | TypeNode::Slice(_));
        if (indirection && visited.contains(&id)) || depth > MAX_RENDER_DEPTH {
            out.push_str(RECURSIVE_SENTINEL);
            return;
        }

        let inserted = visited.insert(id);
        match node {
            TypeNode::Basic(kind) => out.push_str(kind.name()),
            TypeNode::Named { underlying, qualifier } => match underlying {
                Some(target) => self.render_into(*target, visited, depth + 1, indent, out),
                None => {
                    out.push_str("<unresolved: ");
                    out.push_str(qualifier);
                    out.push('>');
                }
            },
            TypeNode::Struct(fields) => {
                let exported: Vec<_> = fields.iter().filter(|f| f.exported).collect();
                if exported.is_empty() {
                    out.push_str("{}");
                } else {
                    out.push_str("{\n");
                    for field in exported {
                        push_tabs(out, indent + 1);
                        out.push_str(&field.name);
                        out.push_str(": ");
                        self.render_into(field.ty, visited, depth + 1, indent + 1, out);
                        out.push('\n');
                    }
                    push_tabs(out, indent);
                    out.push('}');
                }
            }
            TypeNode::Slice(elem) => {
                out.push('[');
                self.render_into(*elem, visited, depth + 1, indent, out);
                out.push(']');
            }
            TypeNode::Pointer(pointee) => self.render_into(*pointee, visited, depth + 1, indent, out),
            TypeNode::Unsupported(diagnostic) => {
                out.push_str("<unsupported: ");
                out.push_str(diagnostic);
                out.push('>');
            }
        }
        if inserted {
            visited.remove(&id);
        }
    }
}

fn push_tabs(out: &mut String, count: usize) {
    for _ in 0..count {
        out.push('\t');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_graph::{BasicKind, Field};
    use pretty_assertions::assert_eq;

    fn field(name: &str, ty: TypeId) -> Field {
        Field {
            name: name.to_string(),
            ident: name.to_string(),
            ty,
            exported: true,
        }
    }

    fn named_struct(graph: &mut TypeGraph, qualifier: &str, fields: Vec<Field>) -> TypeId {
        let named = graph.add_named(qualifier);
        let body = graph.add_struct(fields);
        graph.set_underlying(named, body);
        named
    }

    #[test]
    fn test_render_two_field_struct() {
        let mut graph = TypeGraph::new();
        let string = graph.basic(BasicKind::String);
        let int = graph.basic(BasicKind::I64);
        let fields = vec![field("Name", string), field("Age", int)];
        let person = named_struct(&mut graph, "Person", fields);

        let schema = SchemaRenderer::new(&graph).render(person);
        assert_eq!(schema, "{\n\tName: string\n\tAge: i64\n}");
    }

    #[test]
    fn test_render_nested_struct_indentation() {
        let mut graph = TypeGraph::new();
        let string = graph.basic(BasicKind::String);
        let address = named_struct(&mut graph, "Address", vec![field("city", string)]);
        let addresses = graph.slice(address);
        let user = named_struct(
            &mut graph,
            "User",
            vec![field("home", address), field("previous", addresses)],
        );

        let schema = SchemaRenderer::new(&graph).render(user);
        assert_eq!(
            schema,
            "{\n\thome: {\n\t\tcity: string\n\t}\n\tprevious: [{\n\t\tcity: string\n\t}]\n}"
        );
    }

    #[test]
    fn test_hidden_fields_are_not_rendered() {
        let mut graph = TypeGraph::new();
        let string = graph.basic(BasicKind::String);
        let mut secret = field("password", string);
        secret.exported = false;
        let account = named_struct(&mut graph, "Account", vec![field("login", string), secret]);

        let schema = SchemaRenderer::new(&graph).render(account);
        assert!(!schema.contains("password"));
        assert_eq!(schema, "{\n\tlogin: string\n}");
    }

    #[test]
    fn test_empty_struct_and_pointer_transparency() {
        let mut graph = TypeGraph::new();
        let empty = named_struct(&mut graph, "Marker", Vec::new());
        let boxed = graph.pointer(empty);
        let optional = graph.pointer(boxed);

        assert_eq!(SchemaRenderer::new(&graph).render(optional), "{}");
    }

    #[test]
    fn test_self_pointer_renders_one_sentinel() {
        let mut graph = TypeGraph::new();
        let int = graph.basic(BasicKind::I32);
        let node = graph.add_named("Node");
        let next = graph.pointer(node);
        let body = graph.add_struct(vec![field("value", int), field("next", next)]);
        graph.set_underlying(node, body);

        let schema = SchemaRenderer::new(&graph).render(node);
        assert_eq!(schema.matches(RECURSIVE_SENTINEL).count(), 1);
        assert_eq!(schema, "{\n\tvalue: i32\n\tnext: {\n\t\tvalue: i32\n\t\tnext: <recursive>\n\t}\n}");
    }

    #[test]
    fn test_slice_recursion_renders_one_sentinel() {
        let mut graph = TypeGraph::new();
        let tree = graph.add_named("Tree");
        let children = graph.slice(tree);
        let body = graph.add_struct(vec![field("children", children)]);
        graph.set_underlying(tree, body);

        let schema = SchemaRenderer::new(&graph).render(tree);
        assert_eq!(schema.matches(RECURSIVE_SENTINEL).count(), 1);
        assert_eq!(schema, "{\n\tchildren: [{\n\t\tchildren: <recursive>\n\t}]\n}");
    }

    #[test]
    fn test_sibling_fields_sharing_a_pointer_type_both_expand() {
        let mut graph = TypeGraph::new();
        let string = graph.basic(BasicKind::String);
        let tag = named_struct(&mut graph, "Tag", vec![field("label", string)]);
        let tag_ref = graph.pointer(tag);
        let post = named_struct(
            &mut graph,
            "Post",
            vec![field("primary", tag_ref), field("secondary", tag_ref)],
        );

        let schema = SchemaRenderer::new(&graph).render(post);
        assert!(!schema.contains(RECURSIVE_SENTINEL));
        assert_eq!(schema.matches("label: string").count(), 2);
    }

    #[test]
    fn test_render_unsupported_and_scalars() {
        let mut graph = TypeGraph::new();
        let map = graph.unsupported("map `HashMap<String, i32>`");
        let flag = graph.basic(BasicKind::Bool);
        let flags = graph.slice(flag);
        let renderer = SchemaRenderer::new(&graph);

        assert_eq!(renderer.render(map), "<unsupported: map `HashMap<String, i32>`>");
        assert_eq!(renderer.render(flags), "[bool]");
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut graph = TypeGraph::new();
        let node = graph.add_named("Node");
        let next = graph.pointer(node);
        let body = graph.add_struct(vec![field("next", next)]);
        graph.set_underlying(node, body);

        let renderer = SchemaRenderer::new(&graph);
        assert_eq!(renderer.render(node), renderer.render(node));
    }
}

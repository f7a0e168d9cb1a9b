use crate::schema_renderer::SchemaRenderer;
use crate::synthesizer::ExampleSynthesizer;
use crate::type_graph::{TypeGraph, TypeId};
use serde_json::json;

const SUCCESS_SCHEMA: &str = "{\n\tstatus: string\n}";
const ERROR_SCHEMA: &str = "{\n\tcode: u16\n\terror: string\n}";

/// A response shape a verb may return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Response {
    /// The generic success message
    Success,
    /// The standard error message
    Error,
    /// A payload of the given type
    Json(TypeId),
}

impl Response {
    /// Schema text of this response
    pub fn describe(&self, graph: &TypeGraph) -> String {
        match self {
            Response::Success => SUCCESS_SCHEMA.to_string(),
            Response::Error => ERROR_SCHEMA.to_string(),
            Response::Json(id) => SchemaRenderer::new(graph).render(*id),
        }
    }

    /// Example payload text. Never fails: a synthesis error becomes the text.
    pub fn example(&self, synthesizer: &ExampleSynthesizer) -> String {
        match self {
            Response::Success => static_example(json!({ "status": "Success" })),
            Response::Error => static_example(json!({ "code": 400, "error": "string" })),
            Response::Json(id) => synthesizer.example_text(*id),
        }
    }

    /// Whether two responses document the same shape. Payloads compare by schema text.
    pub fn same_shape(&self, other: &Response, graph: &TypeGraph) -> bool {
        match (self, other) {
            (Response::Success, Response::Success) | (Response::Error, Response::Error) => true,
            (Response::Json(a), Response::Json(b)) => {
                graph.is_identical(*a, *b) || self.describe(graph) == other.describe(graph)
            }
            _ => false,
        }
    }
}

fn static_example(value: serde_json::Value) -> String {
    serde_json::to_string_pretty(&value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SynthesisConfig;
    use crate::synthesizer::FillerRegistry;
    use crate::type_graph::{BasicKind, Field};
    use pretty_assertions::assert_eq;

    fn named_struct(graph: &mut TypeGraph, qualifier: &str, field_name: &str) -> TypeId {
        let string = graph.basic(BasicKind::String);
        let named = graph.add_named(qualifier);
        let body = graph.add_struct(vec![Field {
            name: field_name.to_string(),
            ident: field_name.to_string(),
            ty: string,
            exported: true,
        }]);
        graph.set_underlying(named, body);
        named
    }

    #[test]
    fn test_static_responses() {
        let graph = TypeGraph::new();
        let config = SynthesisConfig::default();
        let synthesizer = ExampleSynthesizer::new(&graph, &config, FillerRegistry::new());

        assert_eq!(Response::Success.describe(&graph), "{\n\tstatus: string\n}");
        assert_eq!(Response::Success.example(&synthesizer), "{\n  \"status\": \"Success\"\n}");
        assert_eq!(Response::Error.describe(&graph), "{\n\tcode: u16\n\terror: string\n}");
        assert_eq!(
            Response::Error.example(&synthesizer),
            "{\n  \"code\": 400,\n  \"error\": \"string\"\n}"
        );
    }

    #[test]
    fn test_json_response_uses_renderer() {
        let mut graph = TypeGraph::new();
        let user = named_struct(&mut graph, "models::User", "name");
        assert_eq!(Response::Json(user).describe(&graph), "{\n\tname: string\n}");
    }

    #[test]
    fn test_same_shape() {
        let mut graph = TypeGraph::new();
        let user = named_struct(&mut graph, "models::User", "name");
        let alias = named_struct(&mut graph, "legacy::User", "name");
        let other = named_struct(&mut graph, "models::Team", "title");

        assert!(Response::Json(user).same_shape(&Response::Json(alias), &graph));
        assert!(!Response::Json(user).same_shape(&Response::Json(other), &graph));
        assert!(Response::Error.same_shape(&Response::Error, &graph));
        assert!(!Response::Error.same_shape(&Response::Success, &graph));
    }
}

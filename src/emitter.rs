use crate::resource::{HttpVerb, Method, Resource};
use crate::response::Response;
use crate::synthesizer::ExampleSynthesizer;
use crate::type_graph::{TypeGraph, TypeId};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Documentation builder
pub struct DocumentBuilder<'g> {
    graph: &'g TypeGraph,
    synthesizer: ExampleSynthesizer<'g>,
    /// Example text per payload type
    examples: HashMap<TypeId, String>,
    resources: BTreeMap<String, ResourceDoc>,
    skip_empty: bool,
}

/// The finished documentation report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiDocument {
    /// Resources keyed by qualified path
    pub resources: BTreeMap<String, ResourceDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceDoc {
    pub name: String,
    pub doc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// `null` when the verb is not implemented
    pub get: Option<MethodDoc>,
    pub post: Option<MethodDoc>,
    pub put: Option<MethodDoc>,
    pub delete: Option<MethodDoc>,
}

impl ResourceDoc {
    pub fn method(&self, verb: HttpVerb) -> Option<&MethodDoc> {
        match verb {
            HttpVerb::Get => self.get.as_ref(),
            HttpVerb::Post => self.post.as_ref(),
            HttpVerb::Put => self.put.as_ref(),
            HttpVerb::Delete => self.delete.as_ref(),
        }
    }

    fn method_mut(&mut self, verb: HttpVerb) -> &mut Option<MethodDoc> {
        match verb {
            HttpVerb::Get => &mut self.get,
            HttpVerb::Post => &mut self.post,
            HttpVerb::Put => &mut self.put,
            HttpVerb::Delete => &mut self.delete,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MethodDoc {
    pub doc: String,
    /// Sorted parameter names
    pub params: Vec<String>,
    pub responses: Vec<ResponseDoc>,
}

/// Schema text and example payload of one response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseDoc {
    pub schema: String,
    pub example: String,
}

impl<'g> DocumentBuilder<'g> {
    pub fn new(graph: &'g TypeGraph, synthesizer: ExampleSynthesizer<'g>) -> Self {
        Self {
            graph,
            synthesizer,
            examples: HashMap::new(),
            resources: BTreeMap::new(),
            skip_empty: false,
        }
    }

    /// Omit resources that implement no verb
    pub fn skip_empty(mut self, skip: bool) -> Self {
        self.skip_empty = skip;
        self
    }

    pub fn add_resource(&mut self, resource: &Resource) {
        if self.skip_empty && !resource.has_methods() {
            debug!("Skipping {} (no verbs)", resource.path);
            return;
        }

        let mut doc = ResourceDoc {
            name: resource.name.clone(),
            doc: resource.doc.clone(),
            url: resource.url.clone(),
            get: None,
            post: None,
            put: None,
            delete: None,
        };
        for (verb, method) in &resource.methods {
            *doc.method_mut(*verb) = Some(self.method_doc(method));
        }
        self.resources.insert(resource.path.clone(), doc);
    }

    fn method_doc(&mut self, method: &Method) -> MethodDoc {
        let responses = method
            .responses
            .iter()
            .map(|response| ResponseDoc {
                schema: response.describe(self.graph),
                example: self.example(response),
            })
            .collect();
        MethodDoc {
            doc: method.doc.clone(),
            params: method.params.iter().cloned().collect(),
            responses,
        }
    }

    fn example(&mut self, response: &Response) -> String {
        let Response::Json(id) = response else {
            return response.example(&self.synthesizer);
        };
        if let Some(text) = self.examples.get(id) {
            return text.clone();
        }
        let text = response.example(&self.synthesizer);
        self.examples.insert(*id, text.clone());
        text
    }

    pub fn build(self) -> ApiDocument {
        debug!(
            "Built document with {} resources, {} distinct examples",
            self.resources.len(),
            self.examples.len()
        );
        ApiDocument {
            resources: self.resources,
        }
    }
}

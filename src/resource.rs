use crate::config::VerbNames;
use crate::response::Response;
use crate::type_graph::TypeGraph;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// The documented HTTP verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpVerb {
    pub const ALL: [HttpVerb; 4] = [HttpVerb::Get, HttpVerb::Post, HttpVerb::Put, HttpVerb::Delete];

    /// Maps a method name to its verb, using the configured names
    pub fn from_method_name(name: &str, verbs: &VerbNames) -> Option<Self> {
        HttpVerb::ALL
            .into_iter()
            .find(|verb| verb.method_name(verbs) == name)
    }

    pub fn method_name(self, verbs: &VerbNames) -> &str {
        match self {
            HttpVerb::Get => &verbs.get,
            HttpVerb::Post => &verbs.post,
            HttpVerb::Put => &verbs.put,
            HttpVerb::Delete => &verbs.delete,
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Delete => "DELETE",
        };
        write!(f, "{}", name)
    }
}

/// What one verb method of a resource accepts and returns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Method {
    /// Doc comment of the method, set once a response is found
    pub doc: String,
    pub params: BTreeSet<String>,
    /// Distinct response shapes in discovery order
    pub responses: Vec<Response>,
}

impl Method {
    /// Appends `response` unless a response of the same shape is already present.
    /// Returns whether it was added.
    pub fn add_response(&mut self, response: Response, graph: &TypeGraph) -> bool {
        if self
            .responses
            .iter()
            .any(|existing| existing.same_shape(&response, graph))
        {
            debug!("Skipping duplicate response {:?}", response);
            return false;
        }
        self.responses.push(response);
        true
    }
}

/// A documented type and its verb methods
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    /// Declared identifier
    pub name: String,
    /// Qualified path, e.g. `handlers::UserResource`
    pub path: String,
    pub doc: String,
    /// URL declared by a route directive in the doc comment
    pub url: Option<String>,
    pub methods: BTreeMap<HttpVerb, Method>,
}

impl Resource {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            doc: String::new(),
            url: None,
            methods: BTreeMap::new(),
        }
    }

    pub fn method(&self, verb: HttpVerb) -> Option<&Method> {
        self.methods.get(&verb)
    }

    /// Whether the resource implements at least one verb
    pub fn has_methods(&self) -> bool {
        !self.methods.is_empty()
    }
}

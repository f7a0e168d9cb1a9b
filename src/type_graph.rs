use std::collections::HashMap;
use std::fmt;

/// Stable handle of a node in the [`TypeGraph`].
///
/// Two handles are equal exactly when they denote the same canonical type, so identity
/// comparisons and visited-sets work on plain integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicKind {
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
    Bool,
    Char,
    String,
}

impl BasicKind {
    /// Maps a Rust scalar type name to its kind. `String` and `str` are both strings.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "i8" => BasicKind::I8,
            "i16" => BasicKind::I16,
            "i32" => BasicKind::I32,
            "i64" => BasicKind::I64,
            "i128" => BasicKind::I128,
            "isize" => BasicKind::Isize,
            "u8" => BasicKind::U8,
            "u16" => BasicKind::U16,
            "u32" => BasicKind::U32,
            "u64" => BasicKind::U64,
            "u128" => BasicKind::U128,
            "usize" => BasicKind::Usize,
            "f32" => BasicKind::F32,
            "f64" => BasicKind::F64,
            "bool" => BasicKind::Bool,
            "char" => BasicKind::Char,
            "String" | "str" | "string" => BasicKind::String,
            _ => return None,
        };
        Some(kind)
    }

    /// Canonical name used in schema text
    pub fn name(self) -> &'static str {
        match self {
            BasicKind::I8 => "i8",
            BasicKind::I16 => "i16",
            BasicKind::I32 => "i32",
            BasicKind::I64 => "i64",
            BasicKind::I128 => "i128",
            BasicKind::Isize => "isize",
            BasicKind::U8 => "u8",
            BasicKind::U16 => "u16",
            BasicKind::U32 => "u32",
            BasicKind::U64 => "u64",
            BasicKind::U128 => "u128",
            BasicKind::Usize => "usize",
            BasicKind::F32 => "f32",
            BasicKind::F64 => "f64",
            BasicKind::Bool => "bool",
            BasicKind::Char => "char",
            BasicKind::String => "string",
        }
    }
}

/// A struct field as seen by serialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    /// Serialized name (after serde renames)
    pub name: String,
    /// Identifier in source, used to type field-access expressions
    pub ident: String,
    pub ty: TypeId,
    /// Whether the field appears in the encoded output
    pub exported: bool,
}

/// One node of the resolved type graph.
///
/// The set of kinds is closed; every consumer matches exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeNode {
    Basic(BasicKind),
    /// A declared type. `underlying` is filled in once the binder completes it.
    Named {
        qualifier: String,
        underlying: Option<TypeId>,
    },
    /// Fields in declaration order
    Struct(Vec<Field>),
    Slice(TypeId),
    Pointer(TypeId),
    Unsupported(String),
}

/// Arena of resolved types.
///
/// `Basic`, `Slice`, `Pointer` and `Unsupported` nodes are interned, so structurally equal
/// nodes share one [`TypeId`]. `Named` and `Struct` nodes are created once per declaration
/// by the binder and are never interned.
#[derive(Debug, Default)]
pub struct TypeGraph {
    nodes: Vec<TypeNode>,
    interned: HashMap<TypeNode, TypeId>,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: TypeId) -> &TypeNode {
        &self.nodes[id.index()]
    }

    fn push(&mut self, node: TypeNode) -> TypeId {
        let id = TypeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn intern(&mut self, node: TypeNode) -> TypeId {
        if let Some(id) = self.interned.get(&node) {
            return *id;
        }
        let id = self.push(node.clone());
        self.interned.insert(node, id);
        id
    }

    pub fn basic(&mut self, kind: BasicKind) -> TypeId {
        self.intern(TypeNode::Basic(kind))
    }

    pub fn slice(&mut self, elem: TypeId) -> TypeId {
        self.intern(TypeNode::Slice(elem))
    }

    pub fn pointer(&mut self, pointee: TypeId) -> TypeId {
        self.intern(TypeNode::Pointer(pointee))
    }

    pub fn unsupported(&mut self, diagnostic: impl Into<String>) -> TypeId {
        self.intern(TypeNode::Unsupported(diagnostic.into()))
    }

    /// Adds a fresh named node with no underlying type yet
    pub fn add_named(&mut self, qualifier: impl Into<String>) -> TypeId {
        self.push(TypeNode::Named {
            qualifier: qualifier.into(),
            underlying: None,
        })
    }

    pub fn add_struct(&mut self, fields: Vec<Field>) -> TypeId {
        self.push(TypeNode::Struct(fields))
    }

    /// Sets the underlying type of a named node. Other nodes are left untouched.
    pub fn set_underlying(&mut self, named: TypeId, target: TypeId) {
        if let TypeNode::Named { underlying, .. } = &mut self.nodes[named.index()] {
            *underlying = Some(target);
        }
    }

    /// Strips every pointer layer
    pub fn deref(&self, mut id: TypeId) -> TypeId {
        while let TypeNode::Pointer(inner) = self.node(id) {
            id = *inner;
        }
        id
    }

    pub fn is_identical(&self, a: TypeId, b: TypeId) -> bool {
        a == b
    }

    /// Short human-readable form for logs and diagnostics
    pub fn short_name(&self, id: TypeId) -> String {
        match self.node(id) {
            TypeNode::Basic(kind) => kind.name().to_string(),
            TypeNode::Named { qualifier, .. } => qualifier.clone(),
            TypeNode::Struct(fields) => format!("struct with {} fields", fields.len()),
            TypeNode::Slice(elem) => format!("[{}]", self.short_name(*elem)),
            TypeNode::Pointer(inner) => format!("*{}", self.short_name(*inner)),
            TypeNode::Unsupported(diagnostic) => format!("unsupported({})", diagnostic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_nodes_are_interned() {
        let mut graph = TypeGraph::new();
        let int = graph.basic(BasicKind::I64);
        let a = graph.slice(int);
        let b = graph.slice(int);
        assert_eq!(a, b);
        assert_eq!(graph.pointer(a), graph.pointer(b));
        assert_eq!(graph.basic(BasicKind::I64), int);
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn test_named_nodes_are_distinct() {
        let mut graph = TypeGraph::new();
        let a = graph.add_named("users::User");
        let b = graph.add_named("admin::User");
        assert_ne!(a, b);
        assert!(!graph.is_identical(a, b));
    }

    #[test]
    fn test_set_underlying_and_deref() {
        let mut graph = TypeGraph::new();
        let named = graph.add_named("Node");
        let body = graph.add_struct(vec![]);
        graph.set_underlying(named, body);
        assert_eq!(
            graph.node(named),
            &TypeNode::Named {
                qualifier: "Node".to_string(),
                underlying: Some(body)
            }
        );

        let ptr = graph.pointer(named);
        let ptr_ptr = graph.pointer(ptr);
        assert_eq!(graph.deref(ptr_ptr), named);
        assert_eq!(graph.short_name(ptr_ptr), "**Node");
    }

    #[test]
    fn test_basic_names() {
        assert_eq!(BasicKind::from_name("str"), Some(BasicKind::String));
        assert_eq!(BasicKind::from_name("String").map(BasicKind::name), Some("string"));
        assert_eq!(BasicKind::from_name("usize").map(BasicKind::name), Some("usize"));
        assert_eq!(BasicKind::from_name("Vec"), None);
    }
}

use rest as api;

/// A node of the catalog tree.
#[derive(serde::Serialize)]
pub struct Category {
    pub name: String,
    pub parent: Option<Box<Category>>,
    pub children: Vec<Category>,
}

/// Browses the catalog.
pub struct CategoryResource;

impl CategoryResource {
    pub fn get(&self) -> api::Response {
        let root = Category {
            name: String::from("root"),
            parent: None,
            children: Vec::new(),
        };
        api::json(root)
    }
}

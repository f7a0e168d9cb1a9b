//! Serde attributes that change how a struct is encoded.

use log::debug;
use syn::meta::ParseNestedMeta;

/// Container-level `#[serde(...)]` settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerAttrs {
    pub rename_all: Option<RenameRule>,
    pub transparent: bool,
}

/// Field-level `#[serde(...)]` settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldAttrs {
    pub rename: Option<String>,
    /// `skip` or `skip_serializing`: the field never appears in encoded output
    pub skip: bool,
}

/// Case conversion applied by `rename_all`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    pub fn parse(rule: &str) -> Option<Self> {
        let rule = match rule {
            "lowercase" => RenameRule::Lower,
            "UPPERCASE" => RenameRule::Upper,
            "PascalCase" => RenameRule::Pascal,
            "camelCase" => RenameRule::Camel,
            "snake_case" => RenameRule::Snake,
            "SCREAMING_SNAKE_CASE" => RenameRule::ScreamingSnake,
            "kebab-case" => RenameRule::Kebab,
            "SCREAMING-KEBAB-CASE" => RenameRule::ScreamingKebab,
            _ => return None,
        };
        Some(rule)
    }

    /// Applies the rule to a snake_case field identifier
    pub fn apply(self, field: &str) -> String {
        match self {
            RenameRule::Lower | RenameRule::Snake => field.to_string(),
            RenameRule::Upper | RenameRule::ScreamingSnake => field.to_ascii_uppercase(),
            RenameRule::Kebab => field.replace('_', "-"),
            RenameRule::ScreamingKebab => field.replace('_', "-").to_ascii_uppercase(),
            RenameRule::Pascal => pascal_case(field),
            RenameRule::Camel => {
                let pascal = pascal_case(field);
                let mut chars = pascal.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                    None => pascal,
                }
            }
        }
    }
}

fn pascal_case(field: &str) -> String {
    field
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

impl ContainerAttrs {
    pub fn parse(attrs: &[syn::Attribute]) -> Self {
        let mut parsed = ContainerAttrs::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
            let result = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename_all") {
                    if let Some(rule) = serialize_string(&meta)? {
                        parsed.rename_all = RenameRule::parse(&rule);
                    }
                } else if meta.path.is_ident("transparent") {
                    parsed.transparent = true;
                } else {
                    skip_value(&meta)?;
                }
                Ok(())
            });
            if let Err(e) = result {
                debug!("Ignoring malformed serde container attribute: {}", e);
            }
        }
        parsed
    }
}

impl FieldAttrs {
    pub fn parse(attrs: &[syn::Attribute]) -> Self {
        let mut parsed = FieldAttrs::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
            let result = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    parsed.rename = serialize_string(&meta)?;
                } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                    parsed.skip = true;
                } else {
                    skip_value(&meta)?;
                }
                Ok(())
            });
            if let Err(e) = result {
                debug!("Ignoring malformed serde field attribute: {}", e);
            }
        }
        parsed
    }
}

/// Reads `key = "value"` or the `serialize` half of `key(serialize = "..", deserialize = "..")`
fn serialize_string(meta: &ParseNestedMeta) -> syn::Result<Option<String>> {
    if meta.input.peek(syn::Token![=]) {
        let value: syn::LitStr = meta.value()?.parse()?;
        return Ok(Some(value.value()));
    }

    let mut found = None;
    if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|nested| {
            if nested.path.is_ident("serialize") {
                let value: syn::LitStr = nested.value()?.parse()?;
                found = Some(value.value());
            } else {
                skip_value(&nested)?;
            }
            Ok(())
        })?;
    }
    Ok(found)
}

fn skip_value(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(syn::Token![=]) {
        let _: syn::Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|nested| skip_value(&nested))?;
    }
    Ok(())
}

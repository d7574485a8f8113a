//! Identifier casing and type naming for generated code.

use crate::design::{ProjectedMediaType, ProjectedShape};

/// Package generated types live in when no target package is configured.
pub const DEFAULT_TARGET: &str = "app";

/// Convert a snake_case (or otherwise delimited) string to CamelCase
///
/// Characters that are not ASCII alphanumerics act as word separators. The
/// rest of each word is kept as written, so acronyms survive.
///
/// # Example
///
/// ```rust
/// use bootgen::naming::to_camel_case;
/// assert_eq!(to_camel_case("user_profile"), "UserProfile");
/// assert_eq!(to_camel_case("list-all"), "ListAll");
/// assert_eq!(to_camel_case("OK"), "OK");
/// ```
pub fn to_camel_case(s: &str) -> String {
    s.split(|c: char| !c.is_ascii_alphanumeric())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Convert a name to lowercase snake_case
///
/// Splits on non-alphanumerics and on case boundaries, keeping acronyms
/// together: `OKTiny` becomes `ok_tiny`, `HTTPServer` becomes `http_server`.
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_alphanumeric() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            let boundary = prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_lower);
            if boundary && !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
        }
        out.push(c.to_ascii_lowercase());
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Make `name` usable as a Rust identifier.
///
/// Invalid characters become underscores and a leading digit gets an
/// underscore prefix.
pub fn sanitize_identifier(name: &str) -> String {
    let mut s: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if s.is_empty() {
        s = "_".to_string();
    }
    if s.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        s.insert(0, '_');
    }
    s
}

/// Untyped equivalent of a projected media type, used in generated comments
/// and logs.
pub fn native_type(projected: &ProjectedMediaType) -> &'static str {
    match projected.shape {
        ProjectedShape::Object { .. } => "serde_json::Map<String, serde_json::Value>",
        ProjectedShape::Collection(_) => "Vec<serde_json::Value>",
    }
}

/// Type a handler uses to build a response payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeReference {
    /// Type name, qualified only when produced with the default package.
    pub name: String,
    /// Construct behind a `Box` rather than by value.
    pub pointer: bool,
    /// Field identifiers the payload must populate.
    pub required_fields: Vec<String>,
}

impl TypeReference {
    /// Type name qualified with the `target` package.
    pub fn qualified(&self, target: &str) -> String {
        if self.name.contains("::") {
            self.name.clone()
        } else {
            format!("{}::{}", target, self.name)
        }
    }

    /// Expression building a zero-valued instance.
    pub fn zero_value(&self, target: &str) -> String {
        let value = format!("{}::default()", self.qualified(target));
        if self.pointer {
            format!("Box::new({value})")
        } else {
            value
        }
    }
}

/// Type reference for a projected media type.
///
/// Object shapes are referenced through a pointer whenever `pointer_depth` is
/// positive; collections are always constructed by value. With
/// `use_default_pkg` the name comes back qualified with [`DEFAULT_TARGET`],
/// otherwise it is left for the caller to qualify.
pub fn type_ref(
    projected: &ProjectedMediaType,
    required: &[String],
    pointer_depth: usize,
    use_default_pkg: bool,
) -> TypeReference {
    let pointer = pointer_depth > 0 && matches!(projected.shape, ProjectedShape::Object { .. });
    let name = if use_default_pkg {
        format!("{DEFAULT_TARGET}::{}", projected.type_name)
    } else {
        projected.type_name.clone()
    };
    TypeReference {
        name,
        pointer,
        required_fields: required
            .iter()
            .map(|r| sanitize_identifier(&to_snake_case(r)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(type_name: &str) -> ProjectedMediaType {
        ProjectedMediaType {
            identifier: "application/vnd.x".to_string(),
            type_name: type_name.to_string(),
            view: "default".to_string(),
            shape: ProjectedShape::Object {
                attributes: vec![],
                required: vec![],
                links: vec![],
            },
            error: false,
        }
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("Bottle"), "bottle");
        assert_eq!(to_snake_case("BottleAccount"), "bottle_account");
        assert_eq!(to_snake_case("OKTiny"), "ok_tiny");
        assert_eq!(to_snake_case("HTTPServer"), "http_server");
        assert_eq!(to_snake_case("user-profile v2"), "user_profile_v2");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("9lives"), "_9lives");
        assert_eq!(sanitize_identifier("a.b"), "a_b");
        assert_eq!(sanitize_identifier(""), "_");
    }

    #[test]
    fn object_types_are_pointers() {
        let reference = type_ref(&object("Bottle"), &["createdAt".to_string()], 1, false);
        assert!(reference.pointer);
        assert_eq!(reference.required_fields, vec!["created_at"]);
        assert_eq!(
            reference.zero_value("app"),
            "Box::new(app::Bottle::default())"
        );
        assert!(!type_ref(&object("Bottle"), &[], 0, false).pointer);
    }

    #[test]
    fn collections_are_values() {
        let collection = ProjectedMediaType {
            type_name: "BottleCollection".to_string(),
            shape: ProjectedShape::Collection(Box::new(object("Bottle"))),
            ..object("BottleCollection")
        };
        let reference = type_ref(&collection, &[], 1, false);
        assert!(!reference.pointer);
        assert_eq!(reference.zero_value("api"), "api::BottleCollection::default()");
        assert_eq!(native_type(&collection), "Vec<serde_json::Value>");
    }

    #[test]
    fn default_package_qualification_is_kept() {
        let reference = type_ref(&object("Bottle"), &[], 1, true);
        assert_eq!(reference.qualified("other"), "app::Bottle");
    }
}

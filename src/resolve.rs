//! type reference resolution
//!
//! turns descriptor type specs and introspection references into names and
//! query type nodes. nothing here fails hard: an unresolvable reference is the
//! typed outcome [`Unresolved`], which the mutation builders use as the signal
//! to fall back to raw input mode.

use crate::schema::{CleanTypeRef, TypeKind};
use graphql_parser::query::Type;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// type name substitutions applied to resolved names
pub type TypeNameOverrides = BTreeMap<String, String>;

/// name printed in place of a type that could not be resolved
pub const FALLBACK_TYPE_NAME: &str = "JSON";

/// query type node
pub type TypeNode = Type<'static, String>;

/// a type as written in a descriptor: a bare name, a `{name}` object, or a
/// full wrapped reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSpec {
    Name(String),
    Ref(CleanTypeRef),
    Named { name: Option<String> },
}

impl From<&str> for TypeSpec {
    fn from(name: &str) -> Self {
        TypeSpec::Name(name.to_string())
    }
}

/// a type reference that did not lead to any named type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not resolve type of `{field}`")]
pub struct Unresolved {
    pub field: String,
}

fn apply_override(name: &str, overrides: &TypeNameOverrides) -> String {
    overrides
        .get(name)
        .cloned()
        .unwrap_or_else(|| name.to_string())
}

/// best-effort type name for `field`
///
/// a string spec is taken as-is (after overrides); an object spec prefers its
/// own name, then the innermost named type of its `ofType` chain.
pub fn resolve_type_name(
    field: &str,
    spec: Option<&TypeSpec>,
    overrides: &TypeNameOverrides,
) -> Result<String, Unresolved> {
    let name = match spec {
        Some(TypeSpec::Name(name)) => Some(name.trim_end_matches('!')),
        Some(TypeSpec::Ref(r)) => r.base_name(),
        Some(TypeSpec::Named { name }) => name.as_deref(),
        None => None,
    };

    match name {
        Some(name) if !name.is_empty() => Ok(apply_override(name, overrides)),
        _ => Err(Unresolved {
            field: field.to_string(),
        }),
    }
}

/// name used when printing a resolution outcome
pub fn type_name_or_fallback(resolved: &Result<String, Unresolved>) -> &str {
    resolved.as_deref().unwrap_or(FALLBACK_TYPE_NAME)
}

/// mirror a reference's NON_NULL/LIST wrapping into a query type node
///
/// returns `None` when the chain ends without a name.
pub fn ref_to_type_node(r: &CleanTypeRef, overrides: &TypeNameOverrides) -> Option<TypeNode> {
    match r.kind {
        TypeKind::NonNull => {
            let inner = ref_to_type_node(r.of_type.as_deref()?, overrides)?;
            Some(Type::NonNullType(Box::new(inner)))
        }
        TypeKind::List => {
            let inner = ref_to_type_node(r.of_type.as_deref()?, overrides)?;
            Some(Type::ListType(Box::new(inner)))
        }
        _ => {
            let name = r.name.as_deref()?;
            Some(Type::NamedType(apply_override(name, overrides)))
        }
    }
}

/// wrapping flags carried by descriptor properties and table columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeFlags {
    pub not_null: bool,
    pub is_array: bool,
    pub array_not_null: bool,
}

/// build a type node from a base name and wrapping flags
///
/// `[Name!]!` reads as: array_not_null wraps the item, not_null wraps the
/// outer node.
pub fn flags_to_type_node(name: &str, flags: TypeFlags) -> TypeNode {
    let named = Type::NamedType(name.to_string());
    let node = if flags.is_array {
        let item = if flags.array_not_null {
            Type::NonNullType(Box::new(named))
        } else {
            named
        };
        Type::ListType(Box::new(item))
    } else {
        named
    };

    if flags.not_null {
        Type::NonNullType(Box::new(node))
    } else {
        node
    }
}

/// innermost name of a type node
pub fn type_node_name(node: &TypeNode) -> &str {
    match node {
        Type::NamedType(name) => name,
        Type::ListType(inner) | Type::NonNullType(inner) => type_node_name(inner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(node: &TypeNode) -> String {
        match node {
            Type::NamedType(name) => name.clone(),
            Type::ListType(inner) => format!("[{}]", render(inner)),
            Type::NonNullType(inner) => format!("{}!", render(inner)),
        }
    }

    fn node_depth(node: &TypeNode) -> usize {
        match node {
            Type::NamedType(_) => 0,
            Type::ListType(inner) | Type::NonNullType(inner) => 1 + node_depth(inner),
        }
    }

    #[test]
    fn test_resolve_string_spec() {
        let overrides = TypeNameOverrides::new();
        let spec = TypeSpec::from("UUID");
        assert_eq!(
            resolve_type_name("id", Some(&spec), &overrides).unwrap(),
            "UUID"
        );
    }

    #[test]
    fn test_resolve_applies_override() {
        let mut overrides = TypeNameOverrides::new();
        overrides.insert("Datetime".to_string(), "DateTime".to_string());
        let spec = TypeSpec::from("Datetime");
        assert_eq!(
            resolve_type_name("createdAt", Some(&spec), &overrides).unwrap(),
            "DateTime"
        );
    }

    #[test]
    fn test_resolve_unwraps_of_type_chain() {
        let spec = TypeSpec::Ref(CleanTypeRef::non_null(CleanTypeRef::list(
            CleanTypeRef::named(TypeKind::Scalar, "Int"),
        )));
        assert_eq!(
            resolve_type_name("ids", Some(&spec), &TypeNameOverrides::new()).unwrap(),
            "Int"
        );
    }

    #[test]
    fn test_unresolved_falls_back_to_json() {
        let overrides = TypeNameOverrides::new();
        let missing = resolve_type_name("data", None, &overrides);
        assert_eq!(
            missing,
            Err(Unresolved {
                field: "data".to_string()
            })
        );
        assert_eq!(type_name_or_fallback(&missing), "JSON");

        let nameless = TypeSpec::Named { name: None };
        assert!(resolve_type_name("data", Some(&nameless), &overrides).is_err());
    }

    #[test]
    fn test_literal_json_scalar_is_resolved() {
        let spec = TypeSpec::from("JSON");
        assert!(resolve_type_name("meta", Some(&spec), &TypeNameOverrides::new()).is_ok());
    }

    #[test]
    fn test_type_spec_deserialize_shapes() {
        let name: TypeSpec = serde_json::from_str("\"String\"").unwrap();
        assert_eq!(name, TypeSpec::Name("String".to_string()));
        let named: TypeSpec = serde_json::from_str(r#"{"name": "UUID"}"#).unwrap();
        assert_eq!(
            named,
            TypeSpec::Named {
                name: Some("UUID".to_string())
            }
        );
        let wrapped: TypeSpec = serde_json::from_str(
            r#"{"kind": "NON_NULL", "name": null, "ofType": {"kind": "SCALAR", "name": "UUID"}}"#,
        )
        .unwrap();
        assert!(matches!(wrapped, TypeSpec::Ref(_)));
    }

    #[test]
    fn test_ref_to_type_node_preserves_depth() {
        let overrides = TypeNameOverrides::new();
        let refs = [
            CleanTypeRef::named(TypeKind::Scalar, "String"),
            CleanTypeRef::non_null(CleanTypeRef::named(TypeKind::Scalar, "String")),
            CleanTypeRef::list(CleanTypeRef::non_null(CleanTypeRef::named(
                TypeKind::Enum,
                "Role",
            ))),
            CleanTypeRef::non_null(CleanTypeRef::list(CleanTypeRef::non_null(
                CleanTypeRef::named(TypeKind::InputObject, "UserInput"),
            ))),
        ];
        for r in &refs {
            let node = ref_to_type_node(r, &overrides).unwrap();
            assert_eq!(node_depth(&node), r.wrapper_depth());
        }
        let printed = render(&ref_to_type_node(&refs[3], &overrides).unwrap());
        assert_eq!(printed, "[UserInput!]!");
    }

    #[test]
    fn test_ref_to_type_node_overrides_base_name() {
        let mut overrides = TypeNameOverrides::new();
        overrides.insert("BigInt".to_string(), "String".to_string());
        let r = CleanTypeRef::non_null(CleanTypeRef::named(TypeKind::Scalar, "BigInt"));
        let node = ref_to_type_node(&r, &overrides).unwrap();
        assert_eq!(type_node_name(&node), "String");
    }

    #[test]
    fn test_ref_without_name_is_none() {
        let r = CleanTypeRef {
            kind: TypeKind::NonNull,
            name: None,
            of_type: None,
        };
        assert!(ref_to_type_node(&r, &TypeNameOverrides::new()).is_none());
    }

    #[test]
    fn test_flags_to_type_node() {
        let cases = [
            (TypeFlags::default(), "UUID"),
            (
                TypeFlags {
                    not_null: true,
                    ..TypeFlags::default()
                },
                "UUID!",
            ),
            (
                TypeFlags {
                    is_array: true,
                    ..TypeFlags::default()
                },
                "[UUID]",
            ),
            (
                TypeFlags {
                    not_null: true,
                    is_array: true,
                    array_not_null: true,
                },
                "[UUID!]!",
            ),
        ];
        for (flags, expected) in cases {
            assert_eq!(render(&flags_to_type_node("UUID", flags)), expected);
        }
    }
}

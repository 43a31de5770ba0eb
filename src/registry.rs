//! type registry
//!
//! catalog of the introspected schema's types, consulted by the builders to
//! resolve exact variable types instead of guessing from table metadata.
//! build one with [`TypeRegistry::from_introspection`] or
//! [`TypeRegistry::from_sdl`].

use crate::error::{Error, Result};
use crate::introspection::{parse_introspection, IntrospectionSchema};
use crate::schema::{CleanTypeRef, TypeKind};
use graphql_parser::schema::{parse_schema, Definition, Type, TypeDefinition};
use std::collections::BTreeMap;

/// output field of an object or interface type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    pub name: String,
    pub type_ref: CleanTypeRef,
}

/// field of an input object type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInputField {
    pub name: String,
    pub type_ref: CleanTypeRef,
}

/// a named schema type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    pub kind: TypeKind,
    pub name: String,
    pub fields: Vec<ResolvedField>,
    pub input_fields: Vec<ResolvedInputField>,
    pub enum_values: Vec<String>,
    pub possible_types: Vec<String>,
}

impl ResolvedType {
    pub fn new(kind: TypeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            fields: Vec::new(),
            input_fields: Vec::new(),
            enum_values: Vec::new(),
            possible_types: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&ResolvedField> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn input_field(&self, name: &str) -> Option<&ResolvedInputField> {
        self.input_fields.iter().find(|field| field.name == name)
    }
}

/// read-only lookup contract the builders consume
pub trait TypeIndex {
    /// named type lookup
    fn by_name(&self, name: &str) -> Option<&ResolvedType>;

    /// declared type of `field_name` on input object `type_name`
    fn input_field_type(&self, type_name: &str, field_name: &str) -> Option<&CleanTypeRef> {
        self.by_name(type_name)?
            .input_field(field_name)
            .map(|field| &field.type_ref)
    }

    /// kind of a named type
    fn kind_of(&self, name: &str) -> Option<TypeKind> {
        self.by_name(name).map(|ty| ty.kind)
    }
}

/// in-memory type registry
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: BTreeMap<String, ResolvedType>,
    query_type: Option<String>,
    mutation_type: Option<String>,
}

impl TypeIndex for TypeRegistry {
    fn by_name(&self, name: &str) -> Option<&ResolvedType> {
        self.types.get(name)
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ty: ResolvedType) {
        self.types.insert(ty.name.clone(), ty);
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn types(&self) -> impl Iterator<Item = &ResolvedType> {
        self.types.values()
    }

    pub fn query_type(&self) -> Option<&str> {
        self.query_type.as_deref()
    }

    pub fn mutation_type(&self) -> Option<&str> {
        self.mutation_type.as_deref()
    }

    /// build from an introspection response (`data` envelope optional)
    pub fn from_introspection(value: serde_json::Value) -> Result<Self> {
        let schema = parse_introspection(value)?;
        Ok(Self::from_schema(schema))
    }

    pub fn from_schema(schema: IntrospectionSchema) -> Self {
        let mut registry = Self {
            query_type: schema.query_type.map(|t| t.name),
            mutation_type: schema.mutation_type.map(|t| t.name),
            ..Self::default()
        };

        for ty in schema.types {
            let mut resolved = ResolvedType::new(ty.kind, ty.name);
            resolved.fields = ty
                .fields
                .unwrap_or_default()
                .into_iter()
                .map(|field| ResolvedField {
                    name: field.name,
                    type_ref: field.field_type,
                })
                .collect();
            resolved.input_fields = ty
                .input_fields
                .unwrap_or_default()
                .into_iter()
                .map(|field| ResolvedInputField {
                    name: field.name,
                    type_ref: field.value_type,
                })
                .collect();
            resolved.enum_values = ty
                .enum_values
                .unwrap_or_default()
                .into_iter()
                .map(|value| value.name)
                .collect();
            resolved.possible_types = ty
                .possible_types
                .unwrap_or_default()
                .into_iter()
                .filter_map(|r| r.name)
                .collect();
            registry.insert(resolved);
        }

        registry
    }

    /// build from schema definition language text
    pub fn from_sdl(sdl: &str) -> Result<Self> {
        let document =
            parse_schema::<String>(sdl).map_err(|err| Error::Schema(err.to_string()))?;

        let mut registry = Self::default();
        let mut explicit_query = None;
        let mut explicit_mutation = None;

        for def in document.definitions {
            match def {
                Definition::TypeDefinition(ty) => registry.insert(resolve_sdl_type(ty)),
                Definition::SchemaDefinition(schema) => {
                    explicit_query = schema.query;
                    explicit_mutation = schema.mutation;
                }
                _ => continue,
            }
        }

        registry.query_type =
            explicit_query.or_else(|| registry.types.contains_key("Query").then(|| "Query".into()));
        registry.mutation_type = explicit_mutation
            .or_else(|| registry.types.contains_key("Mutation").then(|| "Mutation".into()));
        registry.normalize_kinds();

        Ok(registry)
    }
}

fn resolve_sdl_type(ty: TypeDefinition<'_, String>) -> ResolvedType {
    match ty {
        TypeDefinition::Scalar(scalar) => ResolvedType::new(TypeKind::Scalar, scalar.name),
        TypeDefinition::Object(obj) => {
            let mut resolved = ResolvedType::new(TypeKind::Object, obj.name);
            resolved.fields = obj
                .fields
                .iter()
                .map(|field| ResolvedField {
                    name: field.name.clone(),
                    type_ref: sdl_type_ref(&field.field_type),
                })
                .collect();
            resolved
        }
        TypeDefinition::Interface(iface) => {
            let mut resolved = ResolvedType::new(TypeKind::Interface, iface.name);
            resolved.fields = iface
                .fields
                .iter()
                .map(|field| ResolvedField {
                    name: field.name.clone(),
                    type_ref: sdl_type_ref(&field.field_type),
                })
                .collect();
            resolved
        }
        TypeDefinition::Union(union_ty) => {
            let mut resolved = ResolvedType::new(TypeKind::Union, union_ty.name);
            resolved.possible_types = union_ty.types;
            resolved
        }
        TypeDefinition::Enum(enum_ty) => {
            let mut resolved = ResolvedType::new(TypeKind::Enum, enum_ty.name);
            resolved.enum_values = enum_ty.values.into_iter().map(|v| v.name).collect();
            resolved
        }
        TypeDefinition::InputObject(input_ty) => {
            let mut resolved = ResolvedType::new(TypeKind::InputObject, input_ty.name);
            resolved.input_fields = input_ty
                .fields
                .iter()
                .map(|field| ResolvedInputField {
                    name: field.name.clone(),
                    type_ref: sdl_type_ref(&field.value_type),
                })
                .collect();
            resolved
        }
    }
}

// named kinds are unknown while walking the sdl; normalize_kinds fills them in
fn sdl_type_ref(ty: &Type<'_, String>) -> CleanTypeRef {
    match ty {
        Type::NamedType(name) => CleanTypeRef::named(TypeKind::Scalar, name.clone()),
        Type::ListType(inner) => CleanTypeRef::list(sdl_type_ref(inner)),
        Type::NonNullType(inner) => CleanTypeRef::non_null(sdl_type_ref(inner)),
    }
}

impl TypeRegistry {
    /// rewrite the kind of every named reference to match the registry
    fn normalize_kinds(&mut self) {
        let kinds: BTreeMap<String, TypeKind> = self
            .types
            .iter()
            .map(|(name, ty)| (name.clone(), ty.kind))
            .collect();

        fn fix(r: &mut CleanTypeRef, kinds: &BTreeMap<String, TypeKind>) {
            if let Some(inner) = r.of_type.as_deref_mut() {
                fix(inner, kinds);
            } else if let Some(kind) = r.name.as_ref().and_then(|name| kinds.get(name)) {
                r.kind = *kind;
            }
        }

        for ty in self.types.values_mut() {
            for field in &mut ty.fields {
                fix(&mut field.type_ref, &kinds);
            }
            for field in &mut ty.input_fields {
                fix(&mut field.type_ref, &kinds);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SDL: &str = r#"
        scalar UUID
        type Query { user(id: UUID!): User }
        type User { id: UUID! email: String posts: [Post!]! }
        type Post { id: UUID! title: String }
        input UserInput { id: UUID email: String tags: [String!] }
        enum UsersOrderBy { NATURAL ID_ASC }
        union Node = User | Post
    "#;

    #[test]
    fn test_from_sdl() {
        let registry = TypeRegistry::from_sdl(SDL).unwrap();
        assert_eq!(registry.query_type(), Some("Query"));
        assert_eq!(registry.mutation_type(), None);
        assert_eq!(registry.kind_of("User"), Some(TypeKind::Object));
        assert_eq!(registry.kind_of("UserInput"), Some(TypeKind::InputObject));

        let tags = registry.input_field_type("UserInput", "tags").unwrap();
        assert_eq!(tags.kind, TypeKind::List);
        assert_eq!(tags.base_name(), Some("String"));

        let orders = registry.by_name("UsersOrderBy").unwrap();
        assert_eq!(orders.enum_values, vec!["NATURAL", "ID_ASC"]);

        let node = registry.by_name("Node").unwrap();
        assert_eq!(node.possible_types, vec!["User", "Post"]);
    }

    #[test]
    fn test_from_sdl_resolves_object_kinds() {
        let registry = TypeRegistry::from_sdl(SDL).unwrap();
        let posts = registry.by_name("User").unwrap().field("posts").unwrap();
        assert_eq!(posts.type_ref.base().kind, TypeKind::Object);
        let email = registry.by_name("User").unwrap().field("email").unwrap();
        assert_eq!(email.type_ref.base().kind, TypeKind::Scalar);
    }

    #[test]
    fn test_from_sdl_parse_error() {
        let err = TypeRegistry::from_sdl("type {").unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_from_introspection() {
        let registry = TypeRegistry::from_introspection(json!({
            "data": {
                "__schema": {
                    "queryType": {"name": "Query"},
                    "mutationType": {"name": "Mutation"},
                    "types": [
                        {
                            "kind": "INPUT_OBJECT",
                            "name": "UserInput",
                            "inputFields": [{
                                "name": "id",
                                "type": {"kind": "NON_NULL", "name": null, "ofType": {"kind": "SCALAR", "name": "UUID", "ofType": null}}
                            }]
                        },
                        {
                            "kind": "OBJECT",
                            "name": "User",
                            "fields": [{"name": "id", "args": [], "type": {"kind": "SCALAR", "name": "UUID"}}]
                        }
                    ]
                }
            }
        }))
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.mutation_type(), Some("Mutation"));
        let id = registry.input_field_type("UserInput", "id").unwrap();
        assert_eq!(id.kind, TypeKind::NonNull);
        assert!(registry.input_field_type("UserInput", "missing").is_none());
        assert!(registry.by_name("User").unwrap().field("id").is_some());
    }
}

//! clean schema model
//!
//! normalized table descriptions and type references produced by schema
//! introspection. everything here is read-only input to the builders.

use serde::{Deserialize, Serialize};

/// graphql type kind as reported by introspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

impl TypeKind {
    /// true for the NON_NULL and LIST wrapper kinds
    pub fn is_wrapper(self) -> bool {
        matches!(self, TypeKind::NonNull | TypeKind::List)
    }
}

/// recursive type reference mirroring graphql NON_NULL/LIST wrapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanTypeRef {
    pub kind: TypeKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub of_type: Option<Box<CleanTypeRef>>,
}

impl CleanTypeRef {
    /// named (unwrapped) reference
    pub fn named(kind: TypeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: Some(name.into()),
            of_type: None,
        }
    }

    /// wrap in NON_NULL
    pub fn non_null(inner: CleanTypeRef) -> Self {
        Self {
            kind: TypeKind::NonNull,
            name: None,
            of_type: Some(Box::new(inner)),
        }
    }

    /// wrap in LIST
    pub fn list(inner: CleanTypeRef) -> Self {
        Self {
            kind: TypeKind::List,
            name: None,
            of_type: Some(Box::new(inner)),
        }
    }

    /// innermost reference after unwrapping NON_NULL/LIST
    pub fn base(&self) -> &CleanTypeRef {
        match (&self.kind, &self.of_type) {
            (kind, Some(inner)) if kind.is_wrapper() => inner.base(),
            _ => self,
        }
    }

    /// name of the innermost named type, if any
    pub fn base_name(&self) -> Option<&str> {
        self.name.as_deref().or_else(|| self.base().name.as_deref())
    }

    /// number of NON_NULL/LIST wrappers above the named type
    pub fn wrapper_depth(&self) -> usize {
        match (&self.kind, &self.of_type) {
            (kind, Some(inner)) if kind.is_wrapper() => 1 + inner.wrapper_depth(),
            _ => 0,
        }
    }
}

/// storage and graphql type of a table column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanFieldType {
    pub gql_type: String,
    #[serde(default)]
    pub pg_type: Option<String>,
    #[serde(default)]
    pub is_array: bool,
    #[serde(default)]
    pub is_not_null: bool,
}

impl CleanFieldType {
    /// graphql type name without a trailing `!`
    pub fn base_gql_type(&self) -> &str {
        self.gql_type.trim_end_matches('!')
    }

    /// true when flagged not-null or written as `Type!`
    pub fn not_null(&self) -> bool {
        self.is_not_null || self.gql_type.ends_with('!')
    }
}

/// table column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: CleanFieldType,
}

impl CleanField {
    pub fn new(name: impl Into<String>, gql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: CleanFieldType {
                gql_type: gql_type.into(),
                ..CleanFieldType::default()
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BelongsToRelation {
    #[serde(default)]
    pub field_name: Option<String>,
    pub references_table: String,
    #[serde(default)]
    pub keys: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HasRelation {
    #[serde(default)]
    pub field_name: Option<String>,
    pub referenced_by_table: String,
    #[serde(default)]
    pub keys: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManyToManyRelation {
    #[serde(default)]
    pub field_name: Option<String>,
    pub right_table: String,
    #[serde(default)]
    pub junction_table: Option<String>,
    #[serde(default)]
    pub junction_left_keys: Vec<String>,
    #[serde(default)]
    pub junction_right_keys: Vec<String>,
}

/// relation category of a relational field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    BelongsTo,
    HasOne,
    HasMany,
    ManyToMany,
}

impl RelationKind {
    /// true when the related side is a connection rather than a single row
    pub fn is_collection(self) -> bool {
        matches!(self, RelationKind::HasMany | RelationKind::ManyToMany)
    }
}

/// relation resolved by field name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationRef<'a> {
    pub kind: RelationKind,
    pub field_name: &'a str,
    pub related_table: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanRelations {
    #[serde(default)]
    pub belongs_to: Vec<BelongsToRelation>,
    #[serde(default)]
    pub has_one: Vec<HasRelation>,
    #[serde(default)]
    pub has_many: Vec<HasRelation>,
    #[serde(default)]
    pub many_to_many: Vec<ManyToManyRelation>,
}

impl CleanRelations {
    /// every named relation, in category order
    pub fn iter(&self) -> impl Iterator<Item = RelationRef<'_>> {
        let belongs = self.belongs_to.iter().filter_map(|rel| {
            Some(RelationRef {
                kind: RelationKind::BelongsTo,
                field_name: rel.field_name.as_deref()?,
                related_table: &rel.references_table,
            })
        });
        let has_one = self.has_one.iter().filter_map(|rel| {
            Some(RelationRef {
                kind: RelationKind::HasOne,
                field_name: rel.field_name.as_deref()?,
                related_table: &rel.referenced_by_table,
            })
        });
        let has_many = self.has_many.iter().filter_map(|rel| {
            Some(RelationRef {
                kind: RelationKind::HasMany,
                field_name: rel.field_name.as_deref()?,
                related_table: &rel.referenced_by_table,
            })
        });
        let many = self.many_to_many.iter().filter_map(|rel| {
            Some(RelationRef {
                kind: RelationKind::ManyToMany,
                field_name: rel.field_name.as_deref()?,
                related_table: &rel.right_table,
            })
        });
        belongs.chain(has_one).chain(has_many).chain(many)
    }

    pub fn find(&self, field_name: &str) -> Option<RelationRef<'_>> {
        self.iter().find(|rel| rel.field_name == field_name)
    }
}

/// resolved root operation names for a table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryNames {
    #[serde(default)]
    pub all: Option<String>,
    #[serde(default)]
    pub one: Option<String>,
    #[serde(default)]
    pub create: Option<String>,
    #[serde(default)]
    pub update: Option<String>,
    #[serde(default)]
    pub delete: Option<String>,
}

/// normalized table description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanTable {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<CleanField>,
    #[serde(default)]
    pub relations: CleanRelations,
    #[serde(default)]
    pub query: Option<QueryNames>,
    #[serde(default)]
    pub inflection: Option<serde_json::Value>,
    #[serde(default)]
    pub constraints: Option<serde_json::Value>,
}

impl CleanTable {
    pub fn field(&self, name: &str) -> Option<&CleanField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// true when `name` is the field name of one of the table's relations
    pub fn is_relational_field(&self, name: &str) -> bool {
        self.relations.find(name).is_some()
    }

    /// columns that are not relation fields, in declaration order
    pub fn scalar_fields(&self) -> impl Iterator<Item = &CleanField> {
        self.fields
            .iter()
            .filter(|field| !self.is_relational_field(&field.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user_table() -> CleanTable {
        serde_json::from_value(json!({
            "name": "User",
            "fields": [
                {"name": "id", "type": {"gqlType": "UUID", "isNotNull": true}},
                {"name": "email", "type": {"gqlType": "String"}},
                {"name": "tags", "type": {"gqlType": "String", "isArray": true}}
            ],
            "relations": {
                "hasMany": [{"fieldName": "posts", "referencedByTable": "Post"}],
                "belongsTo": [{"fieldName": "org", "referencesTable": "Org"}],
                "manyToMany": [{"fieldName": "groups", "rightTable": "Group"}]
            },
            "query": {"all": "users", "one": "user"}
        }))
        .unwrap()
    }

    #[test]
    fn test_deserialize_table() {
        let table = user_table();
        assert_eq!(table.fields.len(), 3);
        assert!(table.fields[0].field_type.not_null());
        assert!(table.fields[2].field_type.is_array);
        assert_eq!(table.query.unwrap().all.as_deref(), Some("users"));
    }

    #[test]
    fn test_relation_lookup() {
        let table = user_table();
        let posts = table.relations.find("posts").unwrap();
        assert_eq!(posts.kind, RelationKind::HasMany);
        assert_eq!(posts.related_table, "Post");
        assert!(posts.kind.is_collection());
        assert_eq!(
            table.relations.find("org").unwrap().kind,
            RelationKind::BelongsTo
        );
        assert!(table.is_relational_field("groups"));
        assert!(!table.is_relational_field("email"));
    }

    #[test]
    fn test_type_ref_unwrap() {
        let r = CleanTypeRef::non_null(CleanTypeRef::list(CleanTypeRef::non_null(
            CleanTypeRef::named(TypeKind::Scalar, "String"),
        )));
        assert_eq!(r.wrapper_depth(), 3);
        assert_eq!(r.base_name(), Some("String"));
        assert_eq!(r.base().kind, TypeKind::Scalar);
    }

    #[test]
    fn test_bang_suffix_is_not_null() {
        let ty = CleanFieldType {
            gql_type: "UUID!".to_string(),
            ..CleanFieldType::default()
        };
        assert!(ty.not_null());
        assert_eq!(ty.base_gql_type(), "UUID");
    }
}

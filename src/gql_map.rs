//! operation descriptors
//!
//! a [`GqlMap`] lists every root operation to generate, keyed by operation
//! name. descriptors usually come from an introspection step as json; they
//! can also be derived from clean tables with [`gql_map_from_tables`].

use crate::custom_ast::requires_subfield_selection;
use crate::naming::{camelize, classify, model_key, pluralize, singularize};
use crate::resolve::{TypeFlags, TypeSpec};
use crate::schema::{CleanField, CleanFieldType, CleanTable, QueryNames};
use crate::selection::{
    convert_to_selection_options, find_table, FieldSelection, SelectionOptions, SelectionValue,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// operation name -> descriptor, in generation order
pub type GqlMap = IndexMap<String, GqlField>;

/// input property of an operation, possibly with nested properties
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub type_spec: Option<TypeSpec>,
    #[serde(default)]
    pub is_not_null: bool,
    #[serde(default)]
    pub is_array: bool,
    #[serde(default)]
    pub is_array_not_null: bool,
    #[serde(default)]
    pub properties: Option<IndexMap<String, PropertySpec>>,
}

impl PropertySpec {
    pub fn typed(type_name: impl Into<String>) -> Self {
        Self {
            type_spec: Some(TypeSpec::Name(type_name.into())),
            ..Self::default()
        }
    }

    pub fn not_null(mut self) -> Self {
        self.is_not_null = true;
        self
    }

    pub fn with_properties(mut self, properties: IndexMap<String, PropertySpec>) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn flags(&self) -> TypeFlags {
        let bang = matches!(&self.type_spec, Some(TypeSpec::Name(name)) if name.ends_with('!'));
        TypeFlags {
            not_null: self.is_not_null || bang,
            is_array: self.is_array,
            array_not_null: self.is_array_not_null,
        }
    }
}

/// declared output field of a mutation payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub name: String,
    #[serde(default, rename = "type")]
    pub type_spec: Option<TypeSpec>,
}

/// nested selection; `qtype: getMany` marks a connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedSelection {
    pub name: String,
    #[serde(default)]
    pub qtype: Option<String>,
    pub selection: Vec<SelectionItem>,
    #[serde(default)]
    pub variables: IndexMap<String, serde_json::Value>,
}

impl NestedSelection {
    pub fn is_connection(&self) -> bool {
        self.qtype.as_deref() == Some("getMany")
    }
}

/// scalar selection that carries its column type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedSelection {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: CleanFieldType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectionItem {
    Field(String),
    Nested(NestedSelection),
    Typed(TypedSelection),
}

impl SelectionItem {
    pub fn name(&self) -> &str {
        match self {
            SelectionItem::Field(name) => name,
            SelectionItem::Nested(nested) => &nested.name,
            SelectionItem::Typed(typed) => &typed.name,
        }
    }
}

/// kind of mutation a descriptor asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Patch,
    Delete,
    /// any other mutation (custom database functions)
    Custom,
}

/// typed reading of a descriptor's `qtype`/`mutationType`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GetOne,
    GetMany,
    Mutation(MutationKind),
}

/// per-operation descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GqlField {
    pub qtype: String,
    #[serde(default)]
    pub mutation_type: Option<String>,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub properties: IndexMap<String, PropertySpec>,
    /// payload type of a mutation
    #[serde(default)]
    pub output: Option<TypeSpec>,
    #[serde(default)]
    pub outputs: Vec<OutputSpec>,
    #[serde(default)]
    pub selection: Vec<SelectionItem>,
}

impl GqlField {
    /// `None` for a `qtype` this crate does not generate
    pub fn operation(&self) -> Option<Operation> {
        match self.qtype.as_str() {
            "getOne" => Some(Operation::GetOne),
            "getMany" => Some(Operation::GetMany),
            "mutation" => Some(Operation::Mutation(
                match self.mutation_type.as_deref() {
                    Some("create") => MutationKind::Create,
                    Some("patch" | "update") => MutationKind::Patch,
                    Some("delete") => MutationKind::Delete,
                    _ => MutationKind::Custom,
                },
            )),
            _ => None,
        }
    }

    /// the `input` property when it declares nested properties
    pub fn input_properties(&self) -> Option<&IndexMap<String, PropertySpec>> {
        self.properties.get("input")?.properties.as_ref()
    }
}

/// fields that never travel in create/patch inputs
pub const NON_MUTABLE_PROPS: [&str; 5] = ["id", "createdAt", "createdBy", "updatedAt", "updatedBy"];

/// derive descriptors for every table: `getMany`, `getOne`, and
/// create/patch/delete mutations
///
/// `getOne`, patch, and delete need an `id` column and are skipped without one.
pub fn gql_map_from_tables(tables: &[CleanTable], selection: Option<&FieldSelection>) -> GqlMap {
    let mut map = GqlMap::new();

    for table in tables {
        let names = operation_names(table);
        let options = convert_to_selection_options(table, tables, selection).unwrap_or_default();
        let items = selection_items(table, tables, &options);
        let id = table.field("id");

        map.insert(
            names.all.clone().unwrap_or_default(),
            GqlField {
                qtype: "getMany".into(),
                model: table.name.clone(),
                selection: items.clone(),
                ..GqlField::default()
            },
        );

        if let Some(id) = id {
            let mut properties = IndexMap::new();
            properties.insert("id".to_string(), id_property(id));
            map.insert(
                names.one.clone().unwrap_or_default(),
                GqlField {
                    qtype: "getOne".into(),
                    model: table.name.clone(),
                    properties,
                    selection: items,
                    ..GqlField::default()
                },
            );
        }

        let pascal = classify(&singularize(&table.name));
        let key = model_key(&table.name);

        let mut model_input = IndexMap::new();
        model_input.insert(
            key.clone(),
            PropertySpec::typed(format!("{pascal}Input"))
                .not_null()
                .with_properties(column_properties(table, false)),
        );
        map.insert(
            names.create.clone().unwrap_or_default(),
            mutation_descriptor(
                "create",
                table,
                format!("Create{pascal}Input"),
                model_input,
            ),
        );

        let Some(id) = id else {
            continue;
        };

        let mut patch_input = IndexMap::new();
        patch_input.insert("id".to_string(), id_property(id));
        patch_input.insert(
            "patch".to_string(),
            PropertySpec::typed(format!("{pascal}Patch"))
                .not_null()
                .with_properties(column_properties(table, true)),
        );
        map.insert(
            names.update.clone().unwrap_or_default(),
            mutation_descriptor(
                "patch",
                table,
                format!("Update{pascal}Input"),
                patch_input,
            ),
        );

        let mut delete_input = IndexMap::new();
        delete_input.insert("id".to_string(), id_property(id));
        map.insert(
            names.delete.clone().unwrap_or_default(),
            mutation_descriptor(
                "delete",
                table,
                format!("Delete{pascal}Input"),
                delete_input,
            ),
        );
    }

    map
}

/// table query names with inflected defaults filled in
pub fn operation_names(table: &CleanTable) -> QueryNames {
    let given = table.query.clone().unwrap_or_default();
    let singular = singularize(&table.name);
    let pascal = classify(&singular);
    QueryNames {
        all: given.all.or_else(|| Some(camelize(&pluralize(&singular)))),
        one: given.one.or_else(|| Some(camelize(&singular))),
        create: given.create.or_else(|| Some(format!("create{pascal}"))),
        update: given.update.or_else(|| Some(format!("update{pascal}"))),
        delete: given.delete.or_else(|| Some(format!("delete{pascal}"))),
    }
}

fn mutation_descriptor(
    mutation_type: &str,
    table: &CleanTable,
    input_type: String,
    input_properties: IndexMap<String, PropertySpec>,
) -> GqlField {
    let mut properties = IndexMap::new();
    properties.insert(
        "input".to_string(),
        PropertySpec::typed(input_type)
            .not_null()
            .with_properties(input_properties),
    );
    GqlField {
        qtype: "mutation".into(),
        mutation_type: Some(mutation_type.into()),
        model: table.name.clone(),
        properties,
        ..GqlField::default()
    }
}

fn id_property(id: &CleanField) -> PropertySpec {
    PropertySpec {
        name: Some(id.name.clone()),
        ..PropertySpec::typed(id.field_type.base_gql_type())
    }
    .not_null()
}

/// column properties of a model input; patch inputs and defaulted
/// bookkeeping columns are optional
fn column_properties(table: &CleanTable, patch: bool) -> IndexMap<String, PropertySpec> {
    table
        .scalar_fields()
        .map(|field| {
            let ty = &field.field_type;
            let defaulted = NON_MUTABLE_PROPS.contains(&field.name.as_str());
            let spec = PropertySpec {
                name: Some(field.name.clone()),
                type_spec: Some(TypeSpec::Name(ty.base_gql_type().to_string())),
                is_not_null: ty.not_null() && !patch && !defaulted,
                is_array: ty.is_array,
                is_array_not_null: false,
                properties: None,
            };
            (field.name.clone(), spec)
        })
        .collect()
}

fn selection_items(
    table: &CleanTable,
    all_tables: &[CleanTable],
    options: &SelectionOptions,
) -> Vec<SelectionItem> {
    options
        .iter()
        .map(|(name, value)| match value {
            SelectionValue::Field => column_item(table.field(name), name),
            SelectionValue::Relation { select, variables } => {
                let relation = table.relations.find(name);
                let related =
                    relation.and_then(|rel| find_table(all_tables, rel.related_table));
                let selection = select
                    .keys()
                    .map(|child| column_item(related.and_then(|t| t.field(child)), child))
                    .collect();
                SelectionItem::Nested(NestedSelection {
                    name: name.clone(),
                    qtype: relation
                        .filter(|rel| rel.kind.is_collection())
                        .map(|_| "getMany".to_string()),
                    selection,
                    variables: variables.clone(),
                })
            }
        })
        .collect()
}

fn column_item(field: Option<&CleanField>, name: &str) -> SelectionItem {
    match field {
        Some(field)
            if requires_subfield_selection(field)
                || matches!(
                    field.field_type.pg_type.as_deref(),
                    Some("geometry" | "interval")
                ) =>
        {
            SelectionItem::Typed(TypedSelection {
                name: field.name.clone(),
                field_type: field.field_type.clone(),
            })
        }
        _ => SelectionItem::Field(name.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tables() -> Vec<CleanTable> {
        serde_json::from_value(json!([
            {
                "name": "User",
                "fields": [
                    {"name": "id", "type": {"gqlType": "UUID", "isNotNull": true}},
                    {"name": "email", "type": {"gqlType": "String", "isNotNull": true}},
                    {"name": "location", "type": {"gqlType": "GeometryPoint"}},
                    {"name": "createdAt", "type": {"gqlType": "Datetime", "isNotNull": true}}
                ],
                "relations": {"hasMany": [{"fieldName": "posts", "referencedByTable": "Post"}]},
                "query": {"all": "users", "one": "user", "create": "createUser", "update": "updateUser", "delete": "deleteUser"}
            },
            {
                "name": "Post",
                "fields": [
                    {"name": "id", "type": {"gqlType": "UUID"}},
                    {"name": "title", "type": {"gqlType": "String"}}
                ]
            },
            {
                "name": "AuditLog",
                "fields": [{"name": "message", "type": {"gqlType": "String"}}]
            }
        ]))
        .unwrap()
    }

    #[test]
    fn test_operation_classification() {
        let mut field = GqlField {
            qtype: "mutation".into(),
            mutation_type: Some("create".into()),
            ..GqlField::default()
        };
        assert_eq!(
            field.operation(),
            Some(Operation::Mutation(MutationKind::Create))
        );
        field.mutation_type = Some("login".into());
        assert_eq!(
            field.operation(),
            Some(Operation::Mutation(MutationKind::Custom))
        );
        field.qtype = "getOne".into();
        assert_eq!(field.operation(), Some(Operation::GetOne));
        field.qtype = "subscription".into();
        assert_eq!(field.operation(), None);
    }

    #[test]
    fn test_descriptor_json() {
        let field: GqlField = serde_json::from_value(json!({
            "qtype": "getMany",
            "model": "User",
            "selection": [
                "id",
                {"name": "posts", "qtype": "getMany", "selection": ["id", "title"], "variables": {"first": 5}},
                {"name": "location", "type": {"gqlType": "GeometryPoint"}}
            ]
        }))
        .unwrap();
        assert_eq!(field.selection.len(), 3);
        let SelectionItem::Nested(posts) = &field.selection[1] else {
            panic!("expected nested selection");
        };
        assert!(posts.is_connection());
        assert_eq!(posts.variables["first"], json!(5));
        assert!(matches!(field.selection[2], SelectionItem::Typed(_)));
    }

    #[test]
    fn test_operation_names_defaults() {
        let tables = tables();
        let names = operation_names(&tables[1]);
        assert_eq!(names.all.as_deref(), Some("posts"));
        assert_eq!(names.one.as_deref(), Some("post"));
        assert_eq!(names.create.as_deref(), Some("createPost"));
        assert_eq!(names.update.as_deref(), Some("updatePost"));
        assert_eq!(names.delete.as_deref(), Some("deletePost"));
    }

    #[test]
    fn test_map_from_tables() {
        let tables = tables();
        let map = gql_map_from_tables(&tables, None);
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(
            &keys[..5],
            &["users", "user", "createUser", "updateUser", "deleteUser"]
        );
        assert!(map.contains_key("auditLogs"));
        assert!(map.contains_key("createAuditLog"));
        assert!(!map.contains_key("auditLog"));
        assert!(!map.contains_key("deleteAuditLog"));

        let create = &map["createUser"];
        let user = &create.input_properties().unwrap()["user"];
        let columns = user.properties.as_ref().unwrap();
        assert!(columns["email"].is_not_null);
        assert!(!columns["id"].is_not_null);
        assert!(!columns["createdAt"].is_not_null);

        let patch = map["updateUser"].input_properties().unwrap();
        assert!(patch["id"].is_not_null);
        assert!(!patch["patch"].properties.as_ref().unwrap()["email"].is_not_null);
    }

    #[test]
    fn test_map_selection_items() {
        let tables = tables();
        let full = FieldSelection::Preset(crate::selection::SelectionPreset::Full);
        let map = gql_map_from_tables(&tables, Some(&full));
        let users = &map["users"];
        assert!(matches!(
            users.selection.iter().find(|i| i.name() == "location"),
            Some(SelectionItem::Typed(_))
        ));
        let Some(SelectionItem::Nested(posts)) =
            users.selection.iter().find(|i| i.name() == "posts")
        else {
            panic!("expected posts relation");
        };
        assert!(posts.is_connection());
        let names: Vec<&str> = posts.selection.iter().map(SelectionItem::name).collect();
        assert_eq!(names, vec!["id", "title"]);
    }

    #[test]
    fn test_related_table_found_by_inflected_name() {
        let tables: Vec<CleanTable> = serde_json::from_value(json!([
            {
                "name": "User",
                "fields": [{"name": "id", "type": {"gqlType": "UUID", "isNotNull": true}}],
                "relations": {"hasMany": [{"fieldName": "posts", "referencedByTable": "posts"}]}
            },
            {
                "name": "Post",
                "fields": [
                    {"name": "id", "type": {"gqlType": "UUID"}},
                    {"name": "location", "type": {"gqlType": "GeometryPoint"}}
                ]
            }
        ]))
        .unwrap();
        let selection: FieldSelection =
            serde_json::from_value(json!({"include": {"posts": ["id", "location"]}})).unwrap();
        let map = gql_map_from_tables(&tables, Some(&selection));

        let Some(SelectionItem::Nested(posts)) =
            map["users"].selection.iter().find(|i| i.name() == "posts")
        else {
            panic!("expected posts relation");
        };
        assert!(matches!(posts.selection[0], SelectionItem::Field(_)));
        let Some(SelectionItem::Typed(location)) = posts.selection.get(1) else {
            panic!("expected typed location");
        };
        assert_eq!(location.field_type.gql_type, "GeometryPoint");
    }
}

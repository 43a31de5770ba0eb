use graphile_codegen::ast::{field_names, find_field, root_selections, variables_of};
use graphile_codegen::builder::{create_one, get_one, patch_one};
use graphile_codegen::{
    generate, gql_map_from_tables, BuildContext, CleanTable, CleanTypeRef, GqlField, NamedDocument,
    ResolvedField, ResolvedType, TypeKind, TypeRegistry,
};
use serde_json::json;

fn user_table() -> Vec<CleanTable> {
    serde_json::from_value(json!([{
        "name": "User",
        "fields": [
            {"name": "id", "type": {"gqlType": "UUID", "isNotNull": true}},
            {"name": "email", "type": {"gqlType": "String"}},
            {"name": "name", "type": {"gqlType": "String"}}
        ],
        "relations": {"hasMany": [{"fieldName": "posts", "referencedByTable": "Post"}]},
        "query": {
            "all": "users",
            "one": "user",
            "create": "createUser",
            "update": "updateUser",
            "delete": "deleteUser"
        }
    }]))
    .unwrap()
}

fn assert_parses(doc: &NamedDocument) {
    let printed = doc.print();
    graphql_parser::parse_query::<String>(&printed)
        .unwrap_or_else(|err| panic!("{} does not parse: {err}\n{printed}", doc.name));
}

#[test]
fn create_user_without_registry() {
    let map = gql_map_from_tables(&user_table(), None);
    let doc = create_one("createUser", &map["createUser"], &BuildContext::default()).unwrap();
    assert_parses(&doc);

    assert_eq!(doc.name, "createUserMutation");
    assert!(!doc.raw_input);
    let vars: Vec<&str> = variables_of(&doc.ast).iter().map(|v| v.name.as_str()).collect();
    assert_eq!(vars, vec!["email", "name"]);
    assert!(doc
        .print()
        .contains("createUser(input: {user: {email: $email, name: $name}})"));

    let root = find_field(root_selections(&doc.ast), "createUser").unwrap();
    assert_eq!(
        field_names(&root.selection_set.items),
        vec!["user", "clientMutationId"]
    );
    let user = find_field(&root.selection_set.items, "user").unwrap();
    assert_eq!(field_names(&user.selection_set.items), vec!["id"]);
}

#[test]
fn get_user_with_fields() {
    let map = gql_map_from_tables(&user_table(), None);
    let fields = vec!["id".to_string(), "email".to_string()];
    let doc = get_one("user", &map["user"], &fields, &BuildContext::default()).unwrap();
    assert_parses(&doc);

    assert_eq!(doc.name, "getUserQuery");
    let root = find_field(root_selections(&doc.ast), "user").unwrap();
    assert_eq!(field_names(&root.selection_set.items), vec!["id", "email"]);
}

#[test]
fn extension_patch_drops_id_even_when_schema_has_it() {
    let mut registry = TypeRegistry::new();
    registry.insert(ResolvedType {
        fields: vec![ResolvedField {
            name: "id".into(),
            type_ref: CleanTypeRef::non_null(CleanTypeRef::named(TypeKind::Scalar, "UUID")),
        }],
        ..ResolvedType::new(TypeKind::Object, "ProfileExtension")
    });

    let mutation: GqlField = serde_json::from_value(json!({
        "qtype": "mutation",
        "mutationType": "patch",
        "model": "ProfileExtension",
        "properties": {"input": {"type": "UpdateProfileExtensionInput", "properties": {
            "id": {"type": "UUID", "isNotNull": true},
            "patch": {"type": "ProfileExtensionPatch", "properties": {
                "bio": {"type": "String"}
            }}
        }}}
    }))
    .unwrap();

    let ctx = BuildContext::default().with_type_index(&registry);
    let doc = patch_one("updateProfileExtension", &mutation, &ctx).unwrap();
    assert_parses(&doc);

    let root = find_field(root_selections(&doc.ast), "updateProfileExtension").unwrap();
    assert!(find_field(&root.selection_set.items, "id").is_none());
    assert!(find_field(&root.selection_set.items, "profileExtension").is_none());
    assert_eq!(field_names(&root.selection_set.items), vec!["clientMutationId"]);
}

#[test]
fn generation_is_idempotent() {
    let map = gql_map_from_tables(&user_table(), None);
    let ctx = BuildContext::default();
    let first = generate(&map, &ctx);
    let second = generate(&map, &ctx);

    assert_eq!(first.ast_map.len(), second.ast_map.len());
    for (key, doc) in &first.ast_map {
        assert_parses(doc);
        assert_eq!(doc.print(), second.ast_map[key].print());
    }
}

#[test]
fn generates_every_table_operation() {
    let map = gql_map_from_tables(&user_table(), None);
    let out = generate(&map, &BuildContext::default());
    for key in [
        "getUsersQuery",
        "getUsersPaginated",
        "getUsersOrderByEnums",
        "userFragment",
        "getUserQuery",
        "createUserMutation",
        "updateUserMutation",
        "deleteUserMutation",
    ] {
        assert!(out.ast_map.contains_key(key), "missing {key}");
    }
    assert!(out.diagnostics.is_empty());
}

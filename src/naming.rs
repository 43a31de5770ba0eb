//! naming conventions
//!
//! inflection helpers for operation, type, and variable names, plus the file
//! naming conventions used when documents are written out.

use inflector::Inflector;
use serde::{Deserialize, Serialize};

/// `some_name` / `someName` -> `someName`
pub fn camelize(value: &str) -> String {
    value.to_camel_case()
}

/// `some_name` / `someName` -> `SomeName`
pub fn classify(value: &str) -> String {
    value.to_pascal_case()
}

/// `someName` -> `some_name`
pub fn underscore(value: &str) -> String {
    value.to_snake_case()
}

/// endings inflection would strip from words that are already singular
/// (`Status` -> `Statu`, `Analysis` -> `Analysi`, `Data` -> `Daum`)
const SINGULAR_ENDINGS: [&str; 4] = ["us", "is", "ss", "data"];

/// singular form; names that already read as singular are kept
pub fn singularize(value: &str) -> String {
    let lower = value.to_ascii_lowercase();
    if SINGULAR_ENDINGS.iter().any(|ending| lower.ends_with(ending)) {
        return value.to_string();
    }
    value.to_singular()
}

pub fn pluralize(value: &str) -> String {
    value.to_plural()
}

/// key of the model object inside inputs and payloads: `Users` -> `user`
pub fn model_key(model: &str) -> String {
    camelize(&singularize(model))
}

/// join parts with `_` and camelize: `["get", "users", "query"]` -> `getUsersQuery`
pub fn camel_join(parts: &[&str]) -> String {
    let joined = parts
        .iter()
        .map(|part| underscore(part))
        .collect::<Vec<_>>()
        .join("_");
    camelize(&joined)
}

/// document naming for getOne/getMany: `user` -> `getUserQuery`
pub fn query_document_name(operation: &str) -> String {
    camel_join(&["get", operation, "query"])
}

/// `createUser` -> `createUserMutation`
pub fn mutation_document_name(operation: &str) -> String {
    camel_join(&[operation, "mutation"])
}

/// suffix check behind the id-suppression heuristic
///
/// models whose name ends in `Extension` (any case) never get `id` selected
/// on mutation payloads: extension tables share the parent's key and the
/// schema does not expose an `id` on them.
pub fn is_id_suppressed_model(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with("extension")
}

/// file naming convention for emitted documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentConvention {
    #[serde(rename = "underscore")]
    Underscore,
    #[default]
    #[serde(rename = "dashed")]
    Dashed,
    #[serde(rename = "camelcase")]
    Camelcase,
    #[serde(rename = "camelUpper")]
    CamelUpper,
}

impl DocumentConvention {
    /// file stem for an operation name
    pub fn file_stem(self, name: &str) -> String {
        match self {
            DocumentConvention::Underscore => name.to_snake_case(),
            DocumentConvention::Dashed => name.to_kebab_case(),
            DocumentConvention::Camelcase => name.to_camel_case(),
            DocumentConvention::CamelUpper => name.to_pascal_case(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_names() {
        assert_eq!(query_document_name("user"), "getUserQuery");
        assert_eq!(query_document_name("users"), "getUsersQuery");
        assert_eq!(mutation_document_name("createUser"), "createUserMutation");
        assert_eq!(
            mutation_document_name("updateProfileExtension"),
            "updateProfileExtensionMutation"
        );
        assert_eq!(camel_join(&["get", "users", "paginated"]), "getUsersPaginated");
    }

    #[test]
    fn test_model_key() {
        assert_eq!(model_key("User"), "user");
        assert_eq!(model_key("users"), "user");
        assert_eq!(model_key("ProfileExtension"), "profileExtension");
    }

    #[test]
    fn test_singular_names_survive() {
        for name in ["OrderStatus", "Analysis", "Campus", "Address", "Data", "Metadata"] {
            assert_eq!(singularize(name), name);
        }
        assert_eq!(model_key("OrderStatus"), "orderStatus");
        assert_eq!(classify(&singularize("order_status")), "OrderStatus");
        assert_eq!(singularize("Users"), "User");
    }

    #[test]
    fn test_inflection() {
        assert_eq!(pluralize("User"), "Users");
        assert_eq!(singularize("posts"), "post");
        assert_eq!(classify("user"), "User");
        assert_eq!(underscore("createUser"), "create_user");
    }

    #[test]
    fn test_id_suppressed_model() {
        assert!(is_id_suppressed_model("ProfileExtension"));
        assert!(is_id_suppressed_model("userEXTENSION"));
        assert!(!is_id_suppressed_model("Extensions"));
        assert!(!is_id_suppressed_model("User"));
    }

    #[test]
    fn test_file_stems() {
        let name = "getUserQuery";
        assert_eq!(DocumentConvention::Underscore.file_stem(name), "get_user_query");
        assert_eq!(DocumentConvention::Dashed.file_stem(name), "get-user-query");
        assert_eq!(DocumentConvention::Camelcase.file_stem(name), "getUserQuery");
        assert_eq!(DocumentConvention::CamelUpper.file_stem(name), "GetUserQuery");
    }

    #[test]
    fn test_convention_deserialize() {
        let convention: DocumentConvention = serde_json::from_str("\"camelUpper\"").unwrap();
        assert_eq!(convention, DocumentConvention::CamelUpper);
        assert_eq!(DocumentConvention::default(), DocumentConvention::Dashed);
    }
}

//! Compatibility Rules - constructs the integration platform drops or rejects
//!
//! Every finding here is a warning. None of them block an upload.

use serde_json::Value;

use crate::validation::{DocumentRule, Finding, Validator};

/// HTTP methods that declare an operation under a path item.
pub const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Parameter names the platform uses for its own request handling.
pub const RESERVED_PARAMETER_NAMES: &[&str] = &[
    "body",
    "id",
    "ids",
    "filter",
    "filters",
    "query",
    "q",
    "search",
    "headers",
    "header",
    "page",
    "page_size",
    "per_page",
    "limit",
    "offset",
    "cursor",
];

pub fn is_reserved_name(name: &str) -> bool {
    RESERVED_PARAMETER_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
}

/// One method entry under a path item.
pub struct Operation<'a> {
    pub route: &'a str,
    pub method: &'a str,
    pub node: &'a Value,
}

impl Operation<'_> {
    pub fn location(&self) -> String {
        format!("{}.{}", path_item_location(self.route), self.method)
    }

    fn label(&self) -> String {
        format!("{} {}", self.method.to_uppercase(), self.route)
    }
}

fn path_item_location(route: &str) -> String {
    format!("$.paths['{}']", route)
}

/// Path items in document order.
fn path_items(document: &Value) -> impl Iterator<Item = (&str, &Value)> {
    document
        .get("paths")
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|paths| paths.iter().map(|(route, item)| (route.as_str(), item)))
}

/// Operations in document order, skipping non-method keys.
pub fn operations(document: &Value) -> Vec<Operation<'_>> {
    let mut ops = vec![];
    for (route, item) in path_items(document) {
        let Some(entries) = item.as_object() else { continue };
        for (key, node) in entries {
            if let Some(method) = HTTP_METHODS.iter().find(|m| **m == key.as_str()) {
                ops.push(Operation { route, method: *method, node });
            }
        }
    }
    ops
}

/// Follow a local `#/...` reference once. Anything else is returned as-is.
fn resolve<'a>(document: &'a Value, node: &'a Value) -> Option<&'a Value> {
    match node.get("$ref").and_then(Value::as_str) {
        Some(reference) => reference
            .strip_prefix('#')
            .and_then(|pointer| document.pointer(pointer)),
        None => Some(node),
    }
}

fn non_empty_str(node: &Value, key: &str) -> bool {
    node.get(key)
        .and_then(Value::as_str)
        .map_or(false, |s| !s.is_empty())
}

// --- Concrete Rules ---

/// Operations without a summary or operationId, and deprecated operations,
/// are dropped on import.
pub struct OperationVisibilityRule;

impl DocumentRule for OperationVisibilityRule {
    fn name(&self) -> &'static str { "operation-visibility" }

    fn check(&self, document: &Value) -> Vec<Finding> {
        let mut findings = vec![];

        for op in operations(document) {
            if !non_empty_str(op.node, "summary") && !non_empty_str(op.node, "operationId") {
                findings.push(
                    Finding::warning(
                        op.location(),
                        format!(
                            "Operation {} has neither a summary nor an operationId and will be dropped on import.",
                            op.label()
                        ),
                    )
                    .with_code("operation-unnamed"),
                );
            }

            if op.node.get("deprecated").and_then(Value::as_bool) == Some(true) {
                findings.push(
                    Finding::warning(
                        op.location(),
                        format!(
                            "Operation {} is deprecated and will be dropped on import.",
                            op.label()
                        ),
                    )
                    .with_code("operation-deprecated"),
                );
            }
        }

        findings
    }
}

/// Cookie parameters are ignored downstream; reserved names may collide
/// with internal fields.
pub struct ParameterCompatibilityRule;

impl ParameterCompatibilityRule {
    fn check_parameters(
        &self,
        document: &Value,
        owner: &Value,
        owner_location: &str,
        findings: &mut Vec<Finding>,
    ) {
        let Some(parameters) = owner.get("parameters").and_then(Value::as_array) else {
            return;
        };

        for (index, declared) in parameters.iter().enumerate() {
            let Some(param) = resolve(document, declared) else {
                tracing::debug!(location = owner_location, index, "unresolved parameter reference");
                continue;
            };
            let location = format!("{}.parameters[{}]", owner_location, index);
            let name = param.get("name").and_then(Value::as_str).unwrap_or_default();

            if param.get("in").and_then(Value::as_str) == Some("cookie") {
                findings.push(
                    Finding::warning(
                        location.clone(),
                        format!(
                            "Cookie parameter '{}' is not supported and will be ignored.",
                            name
                        ),
                    )
                    .with_code("cookie-parameter"),
                );
            }

            if is_reserved_name(name) {
                findings.push(
                    Finding::warning(
                        location,
                        format!(
                            "Parameter name '{}' is reserved and may collide with internal processing.",
                            name
                        ),
                    )
                    .with_code("reserved-parameter-name"),
                );
            }
        }
    }
}

impl DocumentRule for ParameterCompatibilityRule {
    fn name(&self) -> &'static str { "parameter-compatibility" }

    fn check(&self, document: &Value) -> Vec<Finding> {
        let mut findings = vec![];

        for (route, item) in path_items(document) {
            let item_location = path_item_location(route);
            self.check_parameters(document, item, &item_location, &mut findings);

            let Some(entries) = item.as_object() else { continue };
            for (key, node) in entries {
                if HTTP_METHODS.contains(&key.as_str()) {
                    let location = format!("{}.{}", item_location, key);
                    self.check_parameters(document, node, &location, &mut findings);
                }
            }
        }

        findings
    }
}

impl Validator {
    /// Naming and compatibility checks.
    pub fn compatibility() -> Self {
        Self::new(vec![
            Box::new(OperationVisibilityRule),
            Box::new(ParameterCompatibilityRule),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn codes(findings: &[Finding]) -> Vec<&str> {
        findings.iter().filter_map(|f| f.code.as_deref()).collect()
    }

    #[test]
    fn test_named_operation_is_clean() {
        let doc = json!({"paths": {"/pets": {"get": {"summary": "List pets"}}}});
        assert!(OperationVisibilityRule.check(&doc).is_empty());
    }

    #[test]
    fn test_unnamed_operation_warns_once() {
        let doc = json!({"paths": {"/pets": {"get": {}, "post": {"operationId": "createPet"}}}});
        let findings = OperationVisibilityRule.check(&doc);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].path, "$.paths['/pets'].get");
        assert!(findings[0].message.contains("GET /pets"));
    }

    #[test]
    fn test_deprecated_adds_one_warning() {
        let doc = json!({"paths": {"/old": {"delete": {"deprecated": true}}}});
        let findings = OperationVisibilityRule.check(&doc);
        assert_eq!(codes(&findings), vec!["operation-unnamed", "operation-deprecated"]);
    }

    #[test]
    fn test_non_method_keys_are_skipped() {
        let doc = json!({"paths": {"/pets": {"summary": "x", "servers": [], "x-internal": {}}}});
        assert!(operations(&doc).is_empty());
    }

    #[test]
    fn test_reserved_name_any_case_any_location() {
        let doc = json!({"paths": {"/pets": {
            "parameters": [{"name": "Limit", "in": "query"}],
            "get": {
                "summary": "s",
                "parameters": [{"name": "ID", "in": "path"}, {"name": "BODY", "in": "header"}]
            }
        }}});
        let findings = ParameterCompatibilityRule.check(&doc);
        assert_eq!(findings.len(), 3);
        assert_eq!(findings[0].path, "$.paths['/pets'].parameters[0]");
        assert_eq!(findings[2].path, "$.paths['/pets'].get.parameters[1]");
        assert!(findings.iter().all(|f| !f.is_error()));
    }

    #[test]
    fn test_cookie_parameter_warns() {
        let doc = json!({"paths": {"/me": {"get": {
            "summary": "s",
            "parameters": [{"name": "session", "in": "cookie"}]
        }}}});
        let findings = ParameterCompatibilityRule.check(&doc);
        assert_eq!(codes(&findings), vec!["cookie-parameter"]);
    }

    #[test]
    fn test_cookie_with_reserved_name_warns_twice() {
        let doc = json!({"paths": {"/me": {"get": {
            "parameters": [{"name": "filter", "in": "cookie"}]
        }}}});
        let findings = ParameterCompatibilityRule.check(&doc);
        assert_eq!(codes(&findings), vec!["cookie-parameter", "reserved-parameter-name"]);
    }

    #[test]
    fn test_local_parameter_reference_resolves() {
        let doc = json!({
            "paths": {"/pets": {"get": {
                "summary": "s",
                "parameters": [
                    {"$ref": "#/components/parameters/Page"},
                    {"$ref": "#/components/parameters/Missing"}
                ]
            }}},
            "components": {"parameters": {"Page": {"name": "page", "in": "query"}}}
        });
        let findings = ParameterCompatibilityRule.check(&doc);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].path, "$.paths['/pets'].get.parameters[0]");
    }

    #[test]
    fn test_compatibility_stage_never_fails() {
        let doc = json!({"paths": {"/x": {"get": {"deprecated": true,
            "parameters": [{"name": "q", "in": "cookie"}]}}}});
        let result = Validator::compatibility().validate(&doc);
        assert!(result.success);
        assert_eq!(result.warnings.len(), 4);
    }

    #[test]
    fn test_reserved_lookup() {
        assert!(is_reserved_name("Page_Size"));
        assert!(!is_reserved_name("petId"));
    }
}

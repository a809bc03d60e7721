//! API example handling
//!
//! Reduces a swagger-style example file (a request/response pair from an
//! API specification) to the shape the engine consumes: a resource
//! identifier, an api-version, and a request body tree.

use meridian_core::armid;
use meridian_core::definition::Definition;
use meridian_core::reference::BlockKind;
use meridian_core::resolver::default_label;
use meridian_core::value::Value;
use regex::Regex;

/// Example errors
#[derive(Debug, thiserror::Error)]
pub enum ExampleError {
    #[error("example has no \"parameters\" object")]
    MissingParameters,

    #[error("example has no api-version parameter")]
    MissingApiVersion,

    #[error("cannot determine a target identifier; pass --id or --path")]
    MissingId,

    #[error("\"{0}\" is not a resource or action identifier")]
    InvalidId(String),
}

/// Target extracted from an API example.
#[derive(Debug, Clone)]
pub struct GenerateTarget {
    pub id: String,
    pub api_version: String,
    pub body: serde_json::Value,
}

/// Extract a target from an example file. The identifier comes from
/// `--id` when given, else from the API path template with `{param}`
/// segments substituted from the example's parameters map. The request
/// body is the first object-valued parameter.
pub fn target_from_example(
    example: &serde_json::Value,
    path_template: Option<&str>,
    id_override: Option<&str>,
) -> Result<GenerateTarget, ExampleError> {
    let parameters = example
        .get("parameters")
        .and_then(|p| p.as_object())
        .ok_or(ExampleError::MissingParameters)?;
    let api_version = parameters
        .get("api-version")
        .and_then(|v| v.as_str())
        .ok_or(ExampleError::MissingApiVersion)?
        .to_string();
    let id = match (id_override, path_template) {
        (Some(id), _) => id.to_string(),
        (None, Some(template)) => substitute_path(template, parameters),
        (None, None) => return Err(ExampleError::MissingId),
    };
    if !armid::is_resource_id(&id) && !armid::is_action_id(&id) {
        return Err(ExampleError::InvalidId(id));
    }
    let body = parameters
        .values()
        .find(|v| v.is_object())
        .cloned()
        .unwrap_or(serde_json::Value::Null);
    Ok(GenerateTarget {
        id,
        api_version,
        body,
    })
}

/// Replace `{param}` segments with string values from the parameters
/// map, matched case-insensitively. Unmatched segments are kept so the
/// degraded identifier is still visible in the output.
fn substitute_path(template: &str, parameters: &serde_json::Map<String, serde_json::Value>) -> String {
    let Ok(re) = Regex::new(r"\{([A-Za-z0-9_]+)\}") else {
        return template.to_string();
    };
    re.replace_all(template, |caps: &regex::Captures<'_>| {
        let name = &caps[1];
        parameters
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, value)| value.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| caps[0].to_string())
    })
    .into_owned()
}

/// Build the top-level Definition for a target: generic resources for
/// resource identifiers, action invocations for action identifiers.
/// `name` and `location` are hoisted out of the body into block fields
/// so the document normalizations can centralize them.
pub fn definition_from_target(target: &GenerateTarget) -> Definition {
    if armid::is_action_id(&target.id) {
        let action = target.id.rsplit('/').next().unwrap_or("").to_string();
        let resource_id = armid::parent_id(&target.id).unwrap_or_else(|| "/".to_string());
        let resource_type = armid::resource_type_of(&resource_id);
        return Definition::new(
            &target.id,
            BlockKind::Resource,
            "azapi_resource_action",
            &action,
            resource_type,
            &target.api_version,
        )
        .with_body(target.body.clone())
        .with_field("resource_id", Value::literal(resource_id))
        .with_field("action", Value::literal(action))
        .with_field("method", Value::literal("POST"));
    }

    let resource_type = armid::resource_type_of(&target.id);
    let label = default_label(&resource_type);
    let mut body = target.body.clone();
    let mut def = Definition::new(
        &target.id,
        BlockKind::Resource,
        "azapi_resource",
        label,
        resource_type,
        &target.api_version,
    );
    if let serde_json::Value::Object(map) = &mut body {
        if let Some(serde_json::Value::String(location)) = map.get("location").cloned() {
            map.remove("location");
            def.set_field("location", Value::literal(location));
        }
        map.remove("name");
    }
    if let Some(name) = armid::name_of(&target.id) {
        def.set_field("name", Value::literal(name));
    }
    if let Some(parent) = armid::parent_id(&target.id) {
        def.set_field("parent_id", Value::literal(parent));
    }
    def.with_body(body)
}

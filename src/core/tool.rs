use std::sync::Arc;

use rmcp::model::{JsonObject, Tool};

/// Minimal metadata every tool must expose.
pub trait ToolSpec {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn input_schema(&self) -> JsonObject;

    /// Wire-visible descriptor handed to the dispatcher on `tools/list`.
    fn descriptor(&self) -> Tool {
        Tool::new(self.name(), self.description(), Arc::new(self.input_schema()))
    }
}

/// Turn a `json!({...})` literal into a schema object. Non-object values
/// collapse to an empty schema.
pub fn schema_object(value: serde_json::Value) -> JsonObject {
    match value {
        serde_json::Value::Object(map) => map,
        _ => JsonObject::new(),
    }
}

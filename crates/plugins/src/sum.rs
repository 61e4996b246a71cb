//! `core.sum`: sums two numbers.

use serde::Deserialize;
use serde_json::Value;

use ag_domain::error::Result;
use ag_domain::types::PluginManifest;

use crate::{parse_args, ToolContext, ToolPlugin};

pub struct SumPlugin;

#[derive(Debug, Deserialize)]
struct SumInput {
    a: f64,
    b: f64,
}

#[async_trait::async_trait]
impl ToolPlugin for SumPlugin {
    fn manifest(&self) -> PluginManifest {
        PluginManifest::new("core.sum", "Sum", "Returns the sum of two numbers.", [])
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "a": {"type": "number", "description": "First number"},
                "b": {"type": "number", "description": "Second number"}
            },
            "required": ["a", "b"]
        })
    }

    async fn execute(&self, _ctx: &ToolContext, args: Value) -> Result<String> {
        let input: SumInput = parse_args(args)?;
        let result = input.a + input.b;
        // Whole results render without a decimal point.
        if result.fract() == 0.0 && result.is_finite() {
            Ok(format!("{}", result as i64))
        } else {
            Ok(result.to_string())
        }
    }
}

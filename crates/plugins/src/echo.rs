//! `core.echo`: returns the input text unchanged.

use serde::Deserialize;
use serde_json::Value;

use ag_domain::error::Result;
use ag_domain::types::PluginManifest;

use crate::{parse_args, ToolContext, ToolPlugin};

pub struct EchoPlugin;

#[derive(Debug, Deserialize)]
struct EchoInput {
    text: String,
}

#[async_trait::async_trait]
impl ToolPlugin for EchoPlugin {
    fn manifest(&self) -> PluginManifest {
        PluginManifest::new("core.echo", "Echo", "Returns the input text unchanged.", [])
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "text": {"type": "string", "description": "Text to echo back"}
            },
            "required": ["text"]
        })
    }

    async fn execute(&self, _ctx: &ToolContext, args: Value) -> Result<String> {
        let input: EchoInput = parse_args(args)?;
        Ok(input.text)
    }
}

//! Deobfuscation tools.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use unravel_engine::{DeobfuscateRequest, DeobfuscateResponse, Deobfuscator, EngineError, Technique, VmDetected};
use unravel_protocols::error::ToolError;
use unravel_protocols::tool::{Tool, ToolContext, ToolDefinition, ToolResult};

fn request_schema(include_pipeline_options: bool) -> serde_json::Value {
    let mut properties = serde_json::json!({
        "code": {
            "type": "string",
            "description": "Obfuscated JavaScript source"
        },
        "aggressiveVM": {
            "type": "boolean",
            "description": "Attempt to lift VM-protected code",
            "default": false
        },
        "timeout": {
            "type": "number",
            "description": "Time budget in milliseconds",
            "default": 60000
        }
    });
    if include_pipeline_options {
        properties["detectOnly"] = serde_json::json!({
            "type": "boolean",
            "description": "Only report detected techniques",
            "default": false
        });
        properties["useASTOptimization"] = serde_json::json!({
            "type": "boolean",
            "description": "Run the AST optimizer after targeted transforms",
            "default": true
        });
    }
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": ["code"]
    })
}

fn parse_request(params: serde_json::Value) -> Result<DeobfuscateRequest, ToolError> {
    serde_json::from_value(params)
        .map_err(|e| ToolError::InvalidParameters(format!("Invalid input: {}", e)))
}

async fn run(
    engine: &Deobfuscator,
    request: DeobfuscateRequest,
    ctx: &ToolContext,
) -> Result<DeobfuscateResponse, ToolError> {
    engine
        .deobfuscate_with_cancel(request, ctx.cancellation.clone())
        .await
        .map_err(|e| match e {
            EngineError::EmptyInput => ToolError::InvalidParameters(e.to_string()),
        })
}

fn to_json<T: Serialize>(value: &T) -> Result<(String, serde_json::Value), ToolError> {
    let structured =
        serde_json::to_value(value).map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;
    let text = serde_json::to_string_pretty(&structured)
        .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;
    Ok((text, structured))
}

/// Full deobfuscation tool.
pub struct DeobfuscateTool {
    definition: ToolDefinition,
    engine: Arc<Deobfuscator>,
}

impl DeobfuscateTool {
    pub fn new(engine: Arc<Deobfuscator>) -> Self {
        Self {
            definition: ToolDefinition::new(
                "deobfuscate",
                "Deobfuscate JavaScript",
                "Detect obfuscation techniques in JavaScript and rewrite the code into a readable form",
            )
            .with_parameters_schema(request_schema(true)),
            engine,
        }
    }
}

#[async_trait]
impl Tool for DeobfuscateTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let request = parse_request(params)?;
        debug!(
            correlation_id = %ctx.correlation_id,
            bytes = request.code.len(),
            detect_only = request.detect_only,
            "Running deobfuscate tool"
        );

        let response = run(&self.engine, request, &ctx).await?;
        let (text, structured) = to_json(&response)?;
        Ok(ToolResult::success_json(text, structured)
            .with_metadata("confidence", serde_json::json!(response.confidence)))
    }
}

/// Detection-only report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionSummary {
    pub detected_techniques: Vec<Technique>,
    pub confidence: f64,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vm_detected: Option<VmDetected>,
}

impl From<DeobfuscateResponse> for DetectionSummary {
    fn from(response: DeobfuscateResponse) -> Self {
        Self {
            detected_techniques: response.detected_techniques,
            confidence: response.confidence,
            warnings: response.warnings,
            vm_detected: response.vm_detected,
        }
    }
}

/// Detection-only tool. Never rewrites the code.
pub struct DetectObfuscationTool {
    definition: ToolDefinition,
    engine: Arc<Deobfuscator>,
}

impl DetectObfuscationTool {
    pub fn new(engine: Arc<Deobfuscator>) -> Self {
        Self {
            definition: ToolDefinition::new(
                "detect_obfuscation",
                "Detect Obfuscation",
                "Report which obfuscation techniques a JavaScript sample uses without modifying it",
            )
            .with_parameters_schema(request_schema(false)),
            engine,
        }
    }
}

#[async_trait]
impl Tool for DetectObfuscationTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let request = parse_request(params)?.detect_only();
        debug!(correlation_id = %ctx.correlation_id, bytes = request.code.len(), "Running detect_obfuscation tool");

        let summary = DetectionSummary::from(run(&self.engine, request, &ctx).await?);
        let (text, structured) = to_json(&summary)?;
        Ok(ToolResult::success_json(text, structured))
    }
}

#[cfg(test)]
#[path = "tools_tests.rs"]
mod tests;

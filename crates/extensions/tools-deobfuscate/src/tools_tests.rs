use super::*;
use unravel_engine::EngineOptions;

fn engine() -> Arc<Deobfuscator> {
    Arc::new(Deobfuscator::new(EngineOptions::default(), None))
}

fn create_test_context() -> ToolContext {
    ToolContext::new("test")
}

#[test]
fn test_deobfuscate_tool_definition() {
    let tool = DeobfuscateTool::new(engine());
    assert_eq!(tool.definition().id, "deobfuscate");
    let schema = tool.definition().parameters_schema.as_ref().unwrap();
    assert_eq!(schema["required"][0], "code");
    assert!(schema["properties"].get("useASTOptimization").is_some());
    assert!(schema["properties"].get("detectOnly").is_some());
}

#[test]
fn test_detect_tool_definition() {
    let tool = DetectObfuscationTool::new(engine());
    assert_eq!(tool.definition().id, "detect_obfuscation");
    let schema = tool.definition().parameters_schema.as_ref().unwrap();
    assert!(schema["properties"].get("detectOnly").is_none());
    assert_eq!(tool.definition().to_mcp_tool()["name"], "detect_obfuscation");
}

#[tokio::test]
async fn test_deobfuscate_resolves_dead_branch() {
    let tool = DeobfuscateTool::new(engine());
    let result = tool
        .execute(
            serde_json::json!({"code": "if (false) { evil(); } else { good(); }"}),
            create_test_context(),
        )
        .await
        .unwrap();

    assert!(result.success);
    let output = result.structured_output.unwrap();
    let code = output["code"].as_str().unwrap();
    assert!(code.contains("good()"));
    assert!(!code.contains("evil()"));
    assert!(output["detectedTechniques"]
        .as_array()
        .unwrap()
        .contains(&serde_json::json!("dead-code-injection")));
    assert!(result.content.contains("\"confidence\""));
    assert!(result.metadata.contains_key("confidence"));
}

#[tokio::test]
async fn test_deobfuscate_honours_request_flags() {
    let tool = DeobfuscateTool::new(engine());
    let result = tool
        .execute(
            serde_json::json!({
                "code": "var a = 1; var b = a + 2;",
                "useASTOptimization": false
            }),
            create_test_context(),
        )
        .await
        .unwrap();

    let output = result.structured_output.unwrap();
    assert!(output.get("astOptimized").is_none());
    assert!(output["code"].as_str().unwrap().contains("a + 2"));
}

#[tokio::test]
async fn test_deobfuscate_empty_code_rejected() {
    let tool = DeobfuscateTool::new(engine());
    let err = tool
        .execute(serde_json::json!({"code": "   "}), create_test_context())
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::InvalidParameters(_)));
}

#[tokio::test]
async fn test_deobfuscate_missing_code_rejected() {
    let tool = DeobfuscateTool::new(engine());
    match tool.execute(serde_json::json!({}), create_test_context()).await {
        Err(ToolError::InvalidParameters(msg)) => assert!(msg.contains("code")),
        other => panic!("Expected InvalidParameters, got {:?}", other.map(|r| r.content)),
    }
}

#[tokio::test]
async fn test_deobfuscate_cancelled_context() {
    let tool = DeobfuscateTool::new(engine());
    let ctx = create_test_context();
    ctx.cancellation.cancel();

    let result = tool
        .execute(
            serde_json::json!({"code": "if (false) { evil(); }"}),
            ctx,
        )
        .await
        .unwrap();

    let output = result.structured_output.unwrap();
    let warnings = output["warnings"].as_array().unwrap();
    assert!(warnings.iter().any(|w| w.as_str().unwrap().contains("cancelled")));
}

#[tokio::test]
async fn test_detect_reports_without_code() {
    let tool = DetectObfuscationTool::new(engine());
    let result = tool
        .execute(
            serde_json::json!({"code": "var s = String.fromCharCode(72, 105);"}),
            create_test_context(),
        )
        .await
        .unwrap();

    let output = result.structured_output.unwrap();
    assert!(output.get("code").is_none());
    assert_eq!(output["detectedTechniques"][0], "string-encoding");
    let confidence = output["confidence"].as_f64().unwrap();
    assert!((0.1..=0.95).contains(&confidence));
}

#[tokio::test]
async fn test_detect_overrides_detect_only_false() {
    let tool = DetectObfuscationTool::new(engine());
    let ctx = create_test_context();
    ctx.cancellation.cancel();

    // A cancelled run only warns when the pipeline would have transformed.
    let result = tool
        .execute(
            serde_json::json!({"code": "if (false) { x(); }", "detectOnly": false}),
            ctx,
        )
        .await
        .unwrap();
    let output = result.structured_output.unwrap();
    assert!(output["warnings"].as_array().unwrap().is_empty());
}

#[test]
fn test_detection_summary_from_response() {
    let response = DeobfuscateResponse {
        code: "x".to_string(),
        detected_techniques: vec![Technique::VmProtection],
        confidence: 0.4,
        warnings: vec!["w".to_string()],
        ast_optimized: None,
        vm_detected: Some(VmDetected {
            vm_type: "switch-dispatch".to_string(),
            instructions: 5,
            deobfuscated: false,
        }),
    };
    let summary = DetectionSummary::from(response);
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["detectedTechniques"][0], "vm-protection");
    assert_eq!(json["vmDetected"]["type"], "switch-dispatch");
    assert_eq!(json["warnings"][0], "w");
}

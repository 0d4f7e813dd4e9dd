use std::time::Duration;

use async_trait::async_trait;

use super::*;
use crate::oracle::{ChatReply, MockOracle};
use crate::vm::VmDeobfuscation;

fn engine() -> Deobfuscator {
    Deobfuscator::new(EngineOptions::default(), None)
}

fn engine_with_oracle(oracle: MockOracle) -> Deobfuscator {
    Deobfuscator::new(EngineOptions::default(), Some(Arc::new(oracle)))
}

const FLATTENED: &str = "var o = '1|0'.split('|'), i = 0; while (!![]) { switch (o[i++]) { case '0': b(); continue; case '1': a(); continue; } break; }";

/// Always detects a VM and lifts it to a fixed program.
struct LiftingVm {
    lifted: &'static str,
}

#[async_trait]
impl VmAnalyzer for LiftingVm {
    fn detect(&self, _normalized: &str) -> VmProtectionInfo {
        VmProtectionInfo {
            detected: true,
            vm_type: "test-vm".to_string(),
            instruction_count: 3,
        }
    }

    async fn deobfuscate(&self, _code: &str, _info: &VmProtectionInfo) -> VmDeobfuscation {
        VmDeobfuscation {
            success: true,
            code: self.lifted.to_string(),
        }
    }
}

#[tokio::test]
async fn test_empty_input_rejected() {
    let err = engine()
        .deobfuscate(DeobfuscateRequest::new("   \n"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::EmptyInput));
}

#[tokio::test]
async fn test_detect_only_returns_input() {
    let source = "if (false) { a(); }";
    let response = engine()
        .deobfuscate(DeobfuscateRequest::new(source).detect_only())
        .await
        .unwrap();
    assert_eq!(response.code, source);
    assert_eq!(response.detected_techniques, vec![Technique::DeadCodeInjection]);
    assert!(response.ast_optimized.is_none());
}

#[tokio::test]
async fn test_clean_code_reports_optimizer_flag() {
    let response = engine()
        .deobfuscate(DeobfuscateRequest::new("function f(a) { return a; }"))
        .await
        .unwrap();
    assert!(response.detected_techniques.is_empty());
    assert_eq!(response.ast_optimized, Some(false));
    assert!(response.warnings.is_empty());
}

#[tokio::test]
async fn test_optimizer_can_be_disabled() {
    let response = engine()
        .deobfuscate(DeobfuscateRequest::new("x = 1 + 2;").with_ast_optimization(false))
        .await
        .unwrap();
    assert!(response.ast_optimized.is_none());
    assert_eq!(response.code, "x = 1 + 2;");
}

#[tokio::test]
async fn test_engine_default_disables_optimizer() {
    let options = EngineOptions {
        use_ast_optimization: false,
        ..Default::default()
    };
    let response = Deobfuscator::new(options, None)
        .deobfuscate(DeobfuscateRequest::new("x = 1 + 2;"))
        .await
        .unwrap();
    assert!(response.ast_optimized.is_none());
}

#[tokio::test]
async fn test_ast_optimized_marker_appended_last() {
    let response = engine()
        .deobfuscate(DeobfuscateRequest::new("if (false) { a(); } x = 1 + 2;"))
        .await
        .unwrap();
    assert_eq!(
        response.detected_techniques,
        vec![Technique::DeadCodeInjection, Technique::AstOptimized]
    );
    assert_eq!(response.ast_optimized, Some(true));
    assert!(response.code.contains("x = 3"));
}

#[tokio::test]
async fn test_unparseable_input_returned_unchanged() {
    let source = "if (false) { a(; }";
    let response = engine()
        .deobfuscate(DeobfuscateRequest::new(source))
        .await
        .unwrap();
    assert_eq!(response.code, source);
    assert_eq!(response.warnings.len(), 1);
    assert!(response.confidence >= 0.1);
}

#[tokio::test]
async fn test_zero_timeout_returns_partial_result() {
    let source = "if (false) { a(); }";
    let response = engine()
        .deobfuscate(DeobfuscateRequest::new(source).with_timeout(0))
        .await
        .unwrap();
    assert_eq!(response.code, source);
    assert!(response.warnings.iter().any(|w| w.contains("timed out")));
}

#[tokio::test]
async fn test_cancelled_request() {
    let token = CancellationToken::new();
    token.cancel();
    let response = engine()
        .deobfuscate_with_cancel(DeobfuscateRequest::new("if (false) { a(); }"), token)
        .await
        .unwrap();
    assert!(response.warnings.iter().any(|w| w.contains("cancelled")));
}

#[tokio::test]
async fn test_unflatten_uses_oracle_reply() {
    let mut oracle = MockOracle::new();
    oracle
        .expect_chat()
        .times(2)
        .returning(|messages, _| {
            if messages[0].content.contains("flattened") {
                Ok(ChatReply::new("```js\na();\nb();\n```"))
            } else {
                Ok(ChatReply::new("```js\nfirst();\nsecond();\n```"))
            }
        });

    let response = engine_with_oracle(oracle)
        .deobfuscate(DeobfuscateRequest::new(FLATTENED))
        .await
        .unwrap();
    assert!(response.has_technique(Technique::ControlFlowFlattening));
    assert_eq!(response.code.trim(), "first();\nsecond();");
    assert!(response.warnings.is_empty());
}

#[tokio::test]
async fn test_rejected_cleanup_keeps_previous_code() {
    let mut oracle = MockOracle::new();
    oracle
        .expect_chat()
        .times(1)
        .returning(|_, _| Ok(ChatReply::new("```js\nthis is not code (\n```")));

    let response = engine_with_oracle(oracle)
        .deobfuscate(DeobfuscateRequest::new("if (false) { a(); } b();"))
        .await
        .unwrap();
    assert_eq!(response.code.trim(), "b();");
    assert_eq!(response.warnings.len(), 1);
    assert!(response.warnings[0].contains("invalid code"));
}

#[tokio::test]
async fn test_cleanup_disabled_by_options() {
    let mut oracle = MockOracle::new();
    oracle.expect_chat().never();
    let options = EngineOptions {
        llm_cleanup: false,
        ..Default::default()
    };
    let response = Deobfuscator::new(options, Some(Arc::new(oracle)))
        .deobfuscate(DeobfuscateRequest::new("if (false) { a(); } b();"))
        .await
        .unwrap();
    assert!(response.warnings.is_empty());
}

#[tokio::test]
async fn test_cleanup_skipped_for_clean_code() {
    let mut oracle = MockOracle::new();
    oracle.expect_chat().never();
    let response = engine_with_oracle(oracle)
        .deobfuscate(DeobfuscateRequest::new("run();"))
        .await
        .unwrap();
    assert_eq!(response.code.trim(), "run();");
}

/// Never answers within any reasonable budget.
struct StallingOracle;

#[async_trait]
impl Oracle for StallingOracle {
    async fn chat(
        &self,
        _messages: Vec<unravel_protocols::Message>,
        _options: crate::oracle::ChatOptions,
    ) -> Result<ChatReply, crate::error::OracleError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(ChatReply::new("late();"))
    }
}

#[tokio::test(start_paused = true)]
async fn test_stalled_oracle_hits_timeout() {
    let engine = Deobfuscator::new(EngineOptions::default(), Some(Arc::new(StallingOracle)));
    let response = engine
        .deobfuscate(DeobfuscateRequest::new(FLATTENED).with_timeout(50))
        .await
        .unwrap();
    assert!(response.code.contains("switch"));
    assert!(response.has_technique(Technique::ControlFlowFlattening));
    assert_eq!(response.warnings.len(), 1);
    assert!(response.warnings[0].contains("timed out after 50 ms"));
}

#[tokio::test]
async fn test_vm_lifted_when_aggressive() {
    let engine = engine().with_vm_analyzer(Arc::new(LiftingVm { lifted: "lifted();" }));
    let response = engine
        .deobfuscate(DeobfuscateRequest::new("vm();").with_aggressive_vm(true))
        .await
        .unwrap();
    assert_eq!(response.code.trim(), "lifted();");
    let vm = response.vm_detected.unwrap();
    assert_eq!(vm.vm_type, "test-vm");
    assert_eq!(vm.instructions, 3);
    assert!(vm.deobfuscated);
}

#[tokio::test]
async fn test_vm_untouched_without_aggressive_flag() {
    let engine = engine().with_vm_analyzer(Arc::new(LiftingVm { lifted: "lifted();" }));
    let response = engine
        .deobfuscate(DeobfuscateRequest::new("vm();"))
        .await
        .unwrap();
    assert_eq!(response.code.trim(), "vm();");
    assert!(!response.vm_detected.unwrap().deobfuscated);
    assert_eq!(response.detected_techniques, vec![Technique::VmProtection]);
}

#[tokio::test]
async fn test_vm_failure_is_a_warning() {
    let engine = engine().with_vm_analyzer(Arc::new(LiftingVm { lifted: "not valid (" }));
    let response = engine
        .deobfuscate(DeobfuscateRequest::new("vm();").with_aggressive_vm(true))
        .await
        .unwrap();
    assert_eq!(response.code.trim(), "vm();");
    assert!(response.warnings[0].contains("VM deobfuscation failed"));
}

//! VM protection: detection and (optional) devirtualization.
//!
//! Virtualizing obfuscators compile the program to a private bytecode and
//! ship an interpreter for it. The engine only needs two capabilities, so
//! they sit behind [`VmAnalyzer`] and can be swapped for a real devirtualizer.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// What a VM detector found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmProtectionInfo {
    pub detected: bool,
    pub vm_type: String,
    pub instruction_count: usize,
}

impl VmProtectionInfo {
    pub fn none() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmDeobfuscation {
    pub success: bool,
    pub code: String,
}

#[async_trait]
pub trait VmAnalyzer: Send + Sync {
    /// Inspect normalized source for an embedded interpreter.
    fn detect(&self, normalized: &str) -> VmProtectionInfo;

    /// Attempt to lift the protected code back to source.
    async fn deobfuscate(&self, code: &str, info: &VmProtectionInfo) -> VmDeobfuscation;
}

/// Minimum number of `case` handlers before a dispatch switch counts as an
/// interpreter rather than ordinary branching.
const MIN_HANDLERS: usize = 4;

static DISPATCH_SWITCH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"switch\s*\(\s*[A-Za-z_$][\w$]*\s*\[\s*[A-Za-z_$][\w$]*\s*\+\+\s*\]\s*\)\s*\{")
        .expect("dispatch switch pattern")
});

static LOOP_HEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:while|for)\s*\(").expect("loop head pattern"));

static BYTECODE_ARRAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\s*(?:-?(?:0[xX][0-9a-fA-F]+|\d+)\s*,\s*){15,}-?(?:0[xX][0-9a-fA-F]+|\d+)\s*\]")
        .expect("bytecode array pattern")
});

static CASE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bcase\b").expect("case label pattern"));

/// Recognizes switch-dispatch interpreters.
///
/// Requires all of: a loop around `switch (code[pc++])`, at least
/// [`MIN_HANDLERS`] case labels in that switch, and a numeric array literal
/// long enough to be bytecode. The last condition keeps string-order control
/// flow flattening (`switch (order[i++])` over `'1|0|2'.split('|')`) out.
///
/// It cannot devirtualize; [`VmAnalyzer::deobfuscate`] always reports
/// failure and hands back the input.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicVmAnalyzer;

#[async_trait]
impl VmAnalyzer for HeuristicVmAnalyzer {
    fn detect(&self, normalized: &str) -> VmProtectionInfo {
        let Some(dispatch) = DISPATCH_SWITCH.find(normalized) else {
            return VmProtectionInfo::none();
        };
        if !LOOP_HEAD.is_match(&normalized[..dispatch.start()])
            || !BYTECODE_ARRAY.is_match(normalized)
        {
            return VmProtectionInfo::none();
        }

        let body = switch_body(&normalized[dispatch.end()..]);
        let handlers = CASE_LABEL.find_iter(body).count();
        if handlers < MIN_HANDLERS {
            return VmProtectionInfo::none();
        }

        VmProtectionInfo {
            detected: true,
            vm_type: "switch-dispatch".to_string(),
            instruction_count: handlers,
        }
    }

    async fn deobfuscate(&self, code: &str, _info: &VmProtectionInfo) -> VmDeobfuscation {
        VmDeobfuscation {
            success: false,
            code: code.to_string(),
        }
    }
}

/// Text up to the brace closing an already opened block.
fn switch_body(after_open: &str) -> &str {
    let mut depth = 1usize;
    for (index, c) in after_open.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return &after_open[..index];
                }
            }
            _ => {}
        }
    }
    after_open
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::normalize;

    const INTERPRETER: &str = r#"
var code = [1, 4, 2, 0, 3, 1, 4, 2, 0, 3, 1, 4, 2, 0, 3, 5, 0];
var pc = 0, stack = [];
while (true) {
    switch (code[pc++]) {
        case 0: stack.push(code[pc++]); break;
        case 1: stack.push(stack.pop() + stack.pop()); break;
        case 2: console.log(stack.pop()); break;
        case 3: pc = code[pc]; break;
        case 4: { stack.pop(); } break;
        case 5: return;
    }
}
"#;

    #[test]
    fn test_detects_switch_interpreter() {
        let info = HeuristicVmAnalyzer.detect(&normalize(INTERPRETER));
        assert!(info.detected);
        assert_eq!(info.vm_type, "switch-dispatch");
        assert_eq!(info.instruction_count, 6);
    }

    #[test]
    fn test_flattened_control_flow_is_not_a_vm() {
        let source = "var o = '2|0|1|3|4'.split('|'), i = 0; while (!![]) { switch (o[i++]) { case '0': a(); continue; case '1': b(); continue; case '2': c(); continue; case '3': d(); continue; case '4': e(); continue; } break; }";
        assert!(!HeuristicVmAnalyzer.detect(&normalize(source)).detected);
    }

    #[test]
    fn test_requires_loop() {
        let source = INTERPRETER.replace("while (true)", "if (ready)");
        assert!(!HeuristicVmAnalyzer.detect(&normalize(&source)).detected);
    }

    #[test]
    fn test_plain_code() {
        assert_eq!(
            HeuristicVmAnalyzer.detect("function f() { return 1; }"),
            VmProtectionInfo::none()
        );
    }

    #[tokio::test]
    async fn test_deobfuscate_reports_failure() {
        let info = HeuristicVmAnalyzer.detect(&normalize(INTERPRETER));
        let result = HeuristicVmAnalyzer.deobfuscate(INTERPRETER, &info).await;
        assert!(!result.success);
        assert_eq!(result.code, INTERPRETER);
    }

    #[test]
    fn test_switch_body_stops_at_matching_brace() {
        assert_eq!(switch_body("case 0: { a(); } } rest"), "case 0: { a(); } ");
    }
}

//! The deobfuscation orchestrator.

use std::sync::Arc;

use swc_core::ecma::visit::VisitMutWith;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::budget::Budget;
use crate::complexity::{UNPARSEABLE_COMPLEXITY, program_complexity};
use crate::confidence::score_confidence;
use crate::detector::{self, normalize};
use crate::error::{EngineError, OracleError};
use crate::flatten::BlockFlattener;
use crate::optimizer::{AstOptimizer, OptimizerConfig};
use crate::oracle::Oracle;
use crate::pass::TreePass;
use crate::syntax::{self, SourceUnit, SyntaxTree};
use crate::transforms::{
    DeadCodeRemover, OpaquePredicateRemover, RotationRemover, StringDecoder,
    decode_invisible_unicode, llm_cleanup, unflatten_control_flow,
};
use crate::types::{DeobfuscateRequest, DeobfuscateResponse, Technique, VmDetected};
use crate::vm::{HeuristicVmAnalyzer, VmAnalyzer, VmProtectionInfo};

/// Engine-wide defaults and limits.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    /// Budget for requests that do not carry their own `timeout`.
    pub default_timeout_ms: u64,
    /// Whether the optimizer runs for requests that do not say.
    pub use_ast_optimization: bool,
    pub optimizer: OptimizerConfig,
    /// Characters of source sent to the oracle for control-flow recovery.
    pub oracle_snippet_limit: usize,
    /// Run the final oracle cleanup stage.
    pub llm_cleanup: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            default_timeout_ms: 60_000,
            use_ast_optimization: true,
            optimizer: OptimizerConfig::default(),
            oracle_snippet_limit: 2000,
            llm_cleanup: true,
        }
    }
}

/// Detects obfuscation techniques in a source unit and undoes them.
///
/// Stages run in a fixed order: detection, one targeted rewrite per detected
/// technique, the AST optimizer, an optional oracle cleanup, and scoring.
/// Every stage failure degrades to a no-op or a warning; only empty input is
/// an error.
pub struct Deobfuscator {
    options: EngineOptions,
    oracle: Option<Arc<dyn Oracle>>,
    vm: Arc<dyn VmAnalyzer>,
}

/// Mutable state of a single run.
struct Run {
    unit: SourceUnit,
    techniques: Vec<Technique>,
    warnings: Vec<String>,
    vm_info: VmProtectionInfo,
    vm_detected: Option<VmDetected>,
    budget: Budget,
}

impl Deobfuscator {
    pub fn new(options: EngineOptions, oracle: Option<Arc<dyn Oracle>>) -> Self {
        Self {
            options,
            oracle,
            vm: Arc::new(HeuristicVmAnalyzer),
        }
    }

    pub fn with_vm_analyzer(mut self, vm: Arc<dyn VmAnalyzer>) -> Self {
        self.vm = vm;
        self
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn has_oracle(&self) -> bool {
        self.oracle.is_some()
    }

    pub async fn deobfuscate(
        &self,
        request: DeobfuscateRequest,
    ) -> Result<DeobfuscateResponse, EngineError> {
        self.deobfuscate_with_cancel(request, CancellationToken::new())
            .await
    }

    /// Like [`deobfuscate`](Self::deobfuscate), but also stops early when
    /// `cancel` fires. The best partial result is returned with a warning.
    pub async fn deobfuscate_with_cancel(
        &self,
        request: DeobfuscateRequest,
        cancel: CancellationToken,
    ) -> Result<DeobfuscateResponse, EngineError> {
        if request.code.trim().is_empty() {
            return Err(EngineError::EmptyInput);
        }

        let timeout_ms = request.timeout.unwrap_or(self.options.default_timeout_ms);
        let normalized = normalize(&request.code);
        let found = detector::detect(&normalized);
        let vm_info = self.vm.detect(&normalized);

        let techniques: Vec<Technique> = Technique::DETECTABLE
            .into_iter()
            .filter(|technique| match technique {
                Technique::VmProtection => vm_info.detected,
                other => found.contains(other),
            })
            .collect();
        debug!(techniques = ?techniques, "Detection complete");

        let vm_detected = vm_info.detected.then(|| VmDetected {
            vm_type: vm_info.vm_type.clone(),
            instructions: vm_info.instruction_count,
            deobfuscated: false,
        });

        let mut run = Run {
            unit: SourceUnit::new(request.code.clone()),
            techniques,
            warnings: Vec::new(),
            vm_info,
            vm_detected,
            budget: Budget::new(timeout_ms, cancel),
        };

        let mut ast_optimized = None;
        if !request.detect_only {
            let completed = self.transform(&mut run, &request).await;
            if completed {
                let use_ast = request
                    .use_ast_optimization
                    .unwrap_or(self.options.use_ast_optimization);
                if use_ast {
                    ast_optimized = Some(self.optimize(&mut run));
                }
                self.cleanup(&mut run).await;
            }
            if run.budget.exhausted() {
                run.warnings.push(if run.budget.is_cancelled() {
                    "Deobfuscation cancelled; returning partial result".to_string()
                } else {
                    format!(
                        "Deobfuscation timed out after {} ms; returning partial result",
                        run.budget.timeout_ms()
                    )
                });
            }
        }

        let mut code = run.unit.into_text();
        let complexity = match SyntaxTree::parse(&code) {
            Ok(tree) => program_complexity(&tree.program),
            Err(err) => {
                warn!(error = %err, "Result does not parse; returning input unchanged");
                run.warnings
                    .push(format!("Code could not be parsed ({err}); returned unchanged"));
                code = request.code;
                UNPARSEABLE_COMPLEXITY
            }
        };

        let confidence = score_confidence(&run.techniques, run.warnings.len(), complexity);
        info!(
            techniques = run.techniques.len(),
            warnings = run.warnings.len(),
            complexity,
            confidence,
            "Deobfuscation complete"
        );

        Ok(DeobfuscateResponse {
            code,
            detected_techniques: run.techniques,
            confidence,
            warnings: run.warnings,
            ast_optimized,
            vm_detected: run.vm_detected,
        })
    }

    /// Apply the targeted rewrite for each detected technique, in order.
    /// Returns false if the budget ran out before all of them ran.
    async fn transform(&self, run: &mut Run, request: &DeobfuscateRequest) -> bool {
        for technique in run.techniques.clone() {
            if run.budget.exhausted() {
                return false;
            }
            match technique {
                Technique::InvisibleUnicode => {
                    if let Some(decoded) = decode_invisible_unicode(run.unit.text()) {
                        run.unit.replace_text(decoded);
                    }
                }
                Technique::StringEncoding => apply_pass(&mut run.unit, StringDecoder::default()),
                Technique::VmProtection if request.aggressive_vm => self.devirtualize(run).await,
                Technique::ControlFlowFlattening => {
                    if let Some(oracle) = &self.oracle {
                        let source = run.unit.text().to_string();
                        let limit = self.options.oracle_snippet_limit;
                        if let Some(code) =
                            unflatten_control_flow(oracle.as_ref(), &source, limit, &run.budget)
                                .await
                        {
                            run.unit.replace_text(code);
                        }
                    }
                }
                Technique::StringArrayRotation => {
                    apply_pass(&mut run.unit, RotationRemover::default())
                }
                Technique::DeadCodeInjection => {
                    apply_pass(&mut run.unit, DeadCodeRemover::default())
                }
                Technique::OpaquePredicates => {
                    apply_pass(&mut run.unit, OpaquePredicateRemover::default())
                }
                Technique::VmProtection | Technique::AstOptimized => {}
            }
        }
        !run.budget.exhausted()
    }

    async fn devirtualize(&self, run: &mut Run) {
        let source = run.unit.text().to_string();
        let attempt = run
            .budget
            .guard(async { Ok::<_, OracleError>(self.vm.deobfuscate(&source, &run.vm_info).await) })
            .await;

        match attempt {
            Ok(result) if result.success && syntax::parses(&result.code) => {
                run.unit.replace_text(result.code);
                if let Some(vm) = run.vm_detected.as_mut() {
                    vm.deobfuscated = true;
                }
            }
            Ok(_) => run
                .warnings
                .push("VM deobfuscation failed; protected code left in place".to_string()),
            Err(err) => run
                .warnings
                .push(format!("VM deobfuscation did not finish: {err}")),
        }
    }

    /// Run the optimizer and report whether it changed the printed code.
    fn optimize(&self, run: &mut Run) -> bool {
        if run.budget.exhausted() {
            return false;
        }
        let optimizer = AstOptimizer::new(self.options.optimizer);
        let outcome = run.unit.with_tree(|tree| {
            let before = tree.print().ok();
            let report = optimizer.optimize(&mut tree.program);
            if report.mutations == 0 {
                return (false, false);
            }
            let after = tree.print().ok();
            (before.is_some() && before != after, true)
        });

        match outcome {
            Ok(changed) => {
                if changed {
                    run.techniques.push(Technique::AstOptimized);
                }
                changed
            }
            Err(err) => {
                debug!(error = %err, "Skipping optimizer: source does not parse");
                false
            }
        }
    }

    async fn cleanup(&self, run: &mut Run) {
        let Some(oracle) = &self.oracle else { return };
        if !self.options.llm_cleanup || run.techniques.is_empty() || run.budget.exhausted() {
            return;
        }

        let source = run.unit.text().to_string();
        match llm_cleanup(oracle.as_ref(), &source, &run.techniques, &run.budget).await {
            Ok(code) => run.unit.replace_text(code),
            Err(warning) => {
                warn!(warning = %warning, "Oracle cleanup rejected");
                run.warnings.push(warning);
            }
        }
    }
}

/// Run a tree pass against the unit. Parse failure makes it a no-op.
fn apply_pass(unit: &mut SourceUnit, mut pass: impl TreePass) {
    let outcome = unit.with_tree(|tree| {
        let changed = pass.run(&mut tree.program);
        if changed > 0 {
            tree.program.visit_mut_with(&mut BlockFlattener);
        }
        (changed, changed > 0)
    });
    match outcome {
        Ok(changed) => debug!(pass = pass.name(), changed, "Applied transform"),
        Err(err) => debug!(pass = pass.name(), error = %err, "Skipping transform: source does not parse"),
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;

//! Bounded multi-pass AST optimizer.
//!
//! Each iteration runs eight passes in a fixed order. The loop stops after
//! `iterations` rounds or as soon as a full round changes nothing; it is a
//! bounded effort, not a fixed-point solver.

mod dce;
mod fold;
mod inline;
mod properties;
mod propagate;
mod sequence;
mod simplify;

use swc_core::ecma::ast::Program;
use swc_core::ecma::visit::VisitMutWith;
use tracing::debug;

use crate::flatten::BlockFlattener;
use crate::pass::TreePass;

pub use dce::DeadBranchEliminator;
pub use fold::ConstantFolder;
pub use inline::VariableInliner;
pub use propagate::ConstantPropagator;
pub use properties::{ComputedKeyResolver, PropertyUnfolder};
pub use sequence::SequenceExpander;
pub use simplify::ExpressionSimplifier;

pub const DEFAULT_ITERATIONS: usize = 3;
pub const DEFAULT_INLINE_THRESHOLD: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizerConfig {
    pub iterations: usize,
    pub inline_threshold: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            inline_threshold: DEFAULT_INLINE_THRESHOLD,
        }
    }
}

/// Summary of one optimizer run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptimizationReport {
    pub iterations: usize,
    pub mutations: usize,
}

#[derive(Debug, Clone, Default)]
pub struct AstOptimizer {
    config: OptimizerConfig,
}

impl AstOptimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    fn passes(&self) -> Vec<Box<dyn TreePass>> {
        vec![
            Box::new(ConstantFolder::default()),
            Box::new(ConstantPropagator::default()),
            Box::new(DeadBranchEliminator::default()),
            Box::new(ExpressionSimplifier::default()),
            Box::new(VariableInliner::new(self.config.inline_threshold)),
            Box::new(PropertyUnfolder::default()),
            Box::new(ComputedKeyResolver::default()),
            Box::new(SequenceExpander::default()),
        ]
    }

    pub fn optimize(&self, program: &mut Program) -> OptimizationReport {
        let mut report = OptimizationReport::default();

        for iteration in 0..self.config.iterations {
            let mut mutations = 0;
            for mut pass in self.passes() {
                let changed = pass.run(program);
                if changed > 0 {
                    program.visit_mut_with(&mut BlockFlattener);
                    debug!(iteration, pass = pass.name(), changed, "Optimizer pass changed tree");
                }
                mutations += changed;
            }

            report.iterations += 1;
            report.mutations += mutations;
            if mutations == 0 {
                break;
            }
        }

        debug!(
            iterations = report.iterations,
            mutations = report.mutations,
            "Optimizer finished"
        );
        report
    }
}

#[cfg(test)]
#[path = "optimizer_tests.rs"]
mod tests;

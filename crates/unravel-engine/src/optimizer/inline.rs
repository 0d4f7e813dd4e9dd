use swc_core::ecma::ast::*;
use swc_core::ecma::visit::{VisitMutWith, VisitWith};

use super::propagate::{CollectBindings, LiteralBindings, LiteralReplacer, ReferenceCounter};
use crate::pass::TreePass;

/// Inlines literal-bound variables referenced at most `threshold` times.
///
/// Shares the flat binding table and its unsoundness with
/// [`ConstantPropagator`](super::ConstantPropagator); after propagation has
/// run it usually finds nothing left to do, and exists for configurations
/// that lower the iteration count.
#[derive(Debug)]
pub struct VariableInliner {
    threshold: usize,
    changed: usize,
}

impl VariableInliner {
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold,
            changed: 0,
        }
    }
}

impl TreePass for VariableInliner {
    fn name(&self) -> &'static str {
        "variable-inlining"
    }

    fn run(&mut self, program: &mut Program) -> usize {
        let mut bindings = LiteralBindings::collect(program);
        if bindings.is_empty() {
            return 0;
        }

        let mut counter = ReferenceCounter::default();
        program.visit_with(&mut counter);
        bindings.retain(|name, _| {
            counter
                .counts
                .get(name)
                .is_some_and(|&uses| uses <= self.threshold)
        });
        if bindings.is_empty() {
            return 0;
        }

        let mut replacer = LiteralReplacer::new(&bindings);
        program.visit_mut_with(&mut replacer);
        self.changed = replacer.replaced;
        self.changed
    }
}

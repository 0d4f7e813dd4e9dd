use std::collections::HashMap;

use swc_core::ecma::ast::*;
use swc_core::ecma::visit::{Visit, VisitMut, VisitMutWith, VisitWith};

use crate::pass::TreePass;

/// Replaces references to literal-initialized variables with the literal.
///
/// The binding table is flat: one entry per name for the whole program, the
/// last declarator seen wins, and neither reassignment nor shadowing is
/// checked. This is unsound on general code and intended for obfuscator
/// output, where every such name is typically bound once. `x++` and other
/// update targets are never replaced since that would not parse.
#[derive(Debug, Default)]
pub struct ConstantPropagator {
    changed: usize,
}

impl TreePass for ConstantPropagator {
    fn name(&self) -> &'static str {
        "constant-propagation"
    }

    fn run(&mut self, program: &mut Program) -> usize {
        let bindings = LiteralBindings::collect(program);
        if bindings.is_empty() {
            return 0;
        }
        let mut replacer = LiteralReplacer::new(&bindings);
        program.visit_mut_with(&mut replacer);
        self.changed = replacer.replaced;
        self.changed
    }
}

/// Names bound to a primitive literal by some declarator.
pub(crate) type LiteralBindings = HashMap<String, Expr>;

pub(crate) trait CollectBindings {
    fn collect(program: &Program) -> Self;
}

impl CollectBindings for LiteralBindings {
    fn collect(program: &Program) -> Self {
        let mut collector = BindingCollector::default();
        program.visit_with(&mut collector);
        collector.bindings
    }
}

fn is_propagatable(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Lit(Lit::Str(_) | Lit::Num(_) | Lit::Bool(_) | Lit::Null(_) | Lit::BigInt(_))
    )
}

#[derive(Default)]
struct BindingCollector {
    bindings: LiteralBindings,
}

impl Visit for BindingCollector {
    fn visit_var_declarator(&mut self, declarator: &VarDeclarator) {
        if let (Pat::Ident(binding), Some(init)) = (&declarator.name, &declarator.init) {
            if is_propagatable(init) {
                self.bindings.insert(binding.id.sym.to_string(), (**init).clone());
            }
        }
        declarator.visit_children_with(self);
    }
}

/// Substitutes every non-binding identifier reference found in `bindings`.
pub(crate) struct LiteralReplacer<'a> {
    bindings: &'a LiteralBindings,
    pub(crate) replaced: usize,
}

impl<'a> LiteralReplacer<'a> {
    pub(crate) fn new(bindings: &'a LiteralBindings) -> Self {
        Self {
            bindings,
            replaced: 0,
        }
    }
}

impl VisitMut for LiteralReplacer<'_> {
    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        if let Expr::Ident(ident) = expr {
            if let Some(literal) = self.bindings.get(&*ident.sym) {
                *expr = literal.clone();
                self.replaced += 1;
            }
            return;
        }
        expr.visit_mut_children_with(self);
    }

    fn visit_mut_update_expr(&mut self, update: &mut UpdateExpr) {
        if !matches!(*update.arg, Expr::Ident(_)) {
            update.arg.visit_mut_children_with(self);
        }
    }
}

/// Counts non-binding references per name, with the same notion of
/// reference the replacer uses.
#[derive(Default)]
pub(crate) struct ReferenceCounter {
    pub(crate) counts: HashMap<String, usize>,
}

impl Visit for ReferenceCounter {
    fn visit_expr(&mut self, expr: &Expr) {
        if let Expr::Ident(ident) = expr {
            *self.counts.entry(ident.sym.to_string()).or_default() += 1;
            return;
        }
        expr.visit_children_with(self);
    }
}

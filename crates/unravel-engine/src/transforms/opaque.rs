use swc_core::ecma::ast::*;
use swc_core::ecma::visit::{VisitMut, VisitMutWith};

use crate::pass::TreePass;
use crate::util::{compare_numbers, numeric_value, take_branch, unparen};

/// Resolves `if` statements guarded by a predicate whose value is fixed:
/// a comparison between two numeric literals, or `(x * 0) === 0`.
///
/// The `x * 0` rule assumes `x` is finite. `Infinity * 0` is `NaN`, so the
/// rewrite is wrong for such inputs; obfuscators do not emit them.
#[derive(Debug, Default)]
pub struct OpaquePredicateRemover {
    changed: usize,
}

impl TreePass for OpaquePredicateRemover {
    fn name(&self) -> &'static str {
        "opaque-predicate-remover"
    }

    fn run(&mut self, program: &mut Program) -> usize {
        self.changed = 0;
        program.visit_mut_with(self);
        self.changed
    }
}

impl VisitMut for OpaquePredicateRemover {
    fn visit_mut_stmt(&mut self, stmt: &mut Stmt) {
        stmt.visit_mut_children_with(self);

        let Stmt::If(if_stmt) = stmt else { return };
        let Some(value) = evaluate_predicate(&if_stmt.test) else {
            return;
        };
        let branch = if value {
            Some(std::mem::replace(
                &mut if_stmt.cons,
                Box::new(Stmt::Empty(EmptyStmt {
                    span: swc_core::common::DUMMY_SP,
                })),
            ))
        } else {
            if_stmt.alt.take()
        };
        *stmt = take_branch(branch);
        self.changed += 1;
    }
}

fn evaluate_predicate(test: &Expr) -> Option<bool> {
    let Expr::Bin(bin) = unparen(test) else {
        return None;
    };
    if let (Some(left), Some(right)) = (numeric_value(&bin.left), numeric_value(&bin.right)) {
        return compare_numbers(bin.op, left, right);
    }
    let is_equality = matches!(bin.op, BinaryOp::EqEqEq | BinaryOp::EqEq);
    let zero_product_vs_zero = (is_times_zero(&bin.left) && is_zero(&bin.right))
        || (is_zero(&bin.left) && is_times_zero(&bin.right));
    (is_equality && zero_product_vs_zero).then_some(true)
}

fn is_zero(expr: &Expr) -> bool {
    numeric_value(expr) == Some(0.0)
}

fn is_times_zero(expr: &Expr) -> bool {
    match unparen(expr) {
        Expr::Bin(bin) if bin.op == BinaryOp::Mul => is_zero(&bin.left) || is_zero(&bin.right),
        _ => false,
    }
}

use swc_core::common::{DUMMY_SP, SyntaxContext};
use swc_core::common::util::take::Take;
use swc_core::ecma::ast::*;
use swc_core::ecma::visit::{VisitMut, VisitMutWith};

use crate::pass::TreePass;
use crate::util::{ident_expr, number_expr, numeric_value, unparen};

/// Identity laws and double negation.
///
/// `x + 0` and `x * 1` become `x`, `x * 0` becomes `0` (also with the
/// literal on the left for `*`), and `!!x` becomes `Boolean(x)`. As in the
/// opaque predicate rules, `x * 0` assumes finite numeric `x`, and `x + 0`
/// assumes `x` is not a string.
#[derive(Debug, Default)]
pub struct ExpressionSimplifier {
    changed: usize,
}

impl TreePass for ExpressionSimplifier {
    fn name(&self) -> &'static str {
        "expression-simplification"
    }

    fn run(&mut self, program: &mut Program) -> usize {
        self.changed = 0;
        program.visit_mut_with(self);
        self.changed
    }
}

impl VisitMut for ExpressionSimplifier {
    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        expr.visit_mut_children_with(self);

        let simplified = match expr {
            Expr::Bin(bin) => simplify_identity(bin),
            Expr::Unary(UnaryExpr {
                op: UnaryOp::Bang,
                arg,
                ..
            }) => match &mut **arg {
                Expr::Unary(UnaryExpr {
                    op: UnaryOp::Bang,
                    arg: inner,
                    ..
                }) => Some(boolean_call(inner.take())),
                _ => None,
            },
            _ => None,
        };
        if let Some(simplified) = simplified {
            *expr = simplified;
            self.changed += 1;
        }
    }
}

fn simplify_identity(bin: &mut BinExpr) -> Option<Expr> {
    let left = numeric_value(&bin.left);
    let right = numeric_value(&bin.right);
    // Both sides literal is constant folding's job.
    if left.is_some() && right.is_some() {
        return None;
    }
    let is = |side: Option<f64>, value: f64| side == Some(value);
    match bin.op {
        BinaryOp::Add if is(right, 0.0) => Some(*bin.left.take()),
        BinaryOp::Mul if is(right, 1.0) => Some(*bin.left.take()),
        BinaryOp::Mul if is(left, 1.0) => Some(*bin.right.take()),
        BinaryOp::Mul if is(left, 0.0) || is(right, 0.0) => Some(number_expr(0.0)),
        _ => None,
    }
}

fn boolean_call(arg: Box<Expr>) -> Expr {
    let arg = match *arg {
        Expr::Paren(paren) if !matches!(unparen(&paren.expr), Expr::Seq(_)) => paren.expr,
        other => Box::new(other),
    };
    Expr::Call(CallExpr {
        span: DUMMY_SP,
        ctxt: SyntaxContext::empty(),
        callee: Callee::Expr(Box::new(ident_expr("Boolean"))),
        args: vec![ExprOrSpread { spread: None, expr: arg }],
        type_args: None,
    })
}

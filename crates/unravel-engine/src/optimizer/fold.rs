use swc_core::ecma::ast::*;
use swc_core::ecma::visit::{VisitMut, VisitMutWith};

use crate::pass::TreePass;
use crate::util::{
    bool_expr, compare_numbers, literal_to_number, literal_to_string, literal_truthiness,
    number_expr, numeric_value, str_expr, unparen,
};

/// Evaluates arithmetic, numeric comparisons, string concatenation and unary
/// operators over literal operands with IEEE-754 double semantics.
#[derive(Debug, Default)]
pub struct ConstantFolder {
    changed: usize,
}

impl TreePass for ConstantFolder {
    fn name(&self) -> &'static str {
        "constant-folding"
    }

    fn run(&mut self, program: &mut Program) -> usize {
        self.changed = 0;
        program.visit_mut_with(self);
        self.changed
    }
}

impl VisitMut for ConstantFolder {
    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        expr.visit_mut_children_with(self);

        let folded = match expr {
            Expr::Bin(bin) => fold_binary(bin),
            Expr::Unary(unary) => fold_unary(unary),
            _ => None,
        };
        if let Some(folded) = folded {
            *expr = folded;
            self.changed += 1;
        }
    }
}

fn is_string(expr: &Expr) -> bool {
    matches!(unparen(expr), Expr::Lit(Lit::Str(_)))
}

fn fold_binary(bin: &BinExpr) -> Option<Expr> {
    if bin.op == BinaryOp::Add && (is_string(&bin.left) || is_string(&bin.right)) {
        let left = literal_to_string(&bin.left)?;
        let right = literal_to_string(&bin.right)?;
        return Some(str_expr(left + right.as_str()));
    }

    let left = numeric_value(&bin.left)?;
    let right = numeric_value(&bin.right)?;
    if let Some(result) = compare_numbers(bin.op, left, right) {
        return Some(bool_expr(result));
    }
    let value = match bin.op {
        BinaryOp::Add => left + right,
        BinaryOp::Sub => left - right,
        BinaryOp::Mul => left * right,
        BinaryOp::Div => left / right,
        BinaryOp::Mod => left % right,
        BinaryOp::Exp => left.powf(right),
        _ => return None,
    };
    Some(number_expr(value))
}

fn fold_unary(unary: &UnaryExpr) -> Option<Expr> {
    match unary.op {
        UnaryOp::Bang => literal_truthiness(&unary.arg).map(|truthy| bool_expr(!truthy)),
        UnaryOp::Plus => literal_to_number(&unary.arg).map(number_expr),
        UnaryOp::Minus => {
            // `-5` is already in canonical form.
            if matches!(unparen(&unary.arg), Expr::Lit(Lit::Num(_))) {
                return None;
            }
            literal_to_number(&unary.arg).map(|value| number_expr(-value))
        }
        _ => None,
    }
}

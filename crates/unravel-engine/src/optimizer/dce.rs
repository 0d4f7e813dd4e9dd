use swc_core::common::DUMMY_SP;
use swc_core::ecma::ast::*;
use swc_core::ecma::visit::{VisitMut, VisitMutWith};

use crate::pass::TreePass;
use crate::util::{bool_literal, take_branch};

/// Reduces `if`, `?:`, `&&` and `||` with a boolean literal test to their
/// live branch.
#[derive(Debug, Default)]
pub struct DeadBranchEliminator {
    changed: usize,
}

impl TreePass for DeadBranchEliminator {
    fn name(&self) -> &'static str {
        "dead-code-elimination"
    }

    fn run(&mut self, program: &mut Program) -> usize {
        self.changed = 0;
        program.visit_mut_with(self);
        self.changed
    }
}

impl VisitMut for DeadBranchEliminator {
    fn visit_mut_stmt(&mut self, stmt: &mut Stmt) {
        stmt.visit_mut_children_with(self);

        let Stmt::If(if_stmt) = stmt else { return };
        let Some(value) = bool_literal(&if_stmt.test) else {
            return;
        };
        let branch = if value {
            Some(std::mem::replace(
                &mut if_stmt.cons,
                Box::new(Stmt::Empty(EmptyStmt { span: DUMMY_SP })),
            ))
        } else {
            if_stmt.alt.take()
        };
        *stmt = take_branch(branch);
        self.changed += 1;
    }

    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        expr.visit_mut_children_with(self);

        let live = match expr {
            Expr::Cond(cond) => bool_literal(&cond.test).map(|value| {
                if value {
                    std::mem::replace(&mut cond.cons, placeholder())
                } else {
                    std::mem::replace(&mut cond.alt, placeholder())
                }
            }),
            Expr::Bin(bin) if matches!(bin.op, BinaryOp::LogicalAnd | BinaryOp::LogicalOr) => {
                bool_literal(&bin.left).map(|value| {
                    // `true && x` and `false || x` evaluate to `x`; the other
                    // two short-circuit to the literal itself.
                    let takes_right = value == (bin.op == BinaryOp::LogicalAnd);
                    if takes_right {
                        std::mem::replace(&mut bin.right, placeholder())
                    } else {
                        std::mem::replace(&mut bin.left, placeholder())
                    }
                })
            }
            _ => None,
        };
        if let Some(live) = live {
            *expr = *live;
            self.changed += 1;
        }
    }
}

fn placeholder() -> Box<Expr> {
    Box::new(Expr::Invalid(Invalid { span: DUMMY_SP }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::BlockFlattener;
    use crate::syntax::SyntaxTree;

    fn eliminate(source: &str) -> (String, usize) {
        let mut tree = SyntaxTree::parse(source).unwrap();
        let changed = DeadBranchEliminator::default().run(&mut tree.program);
        tree.program.visit_mut_with(&mut BlockFlattener);
        (tree.print().unwrap().trim().to_string(), changed)
    }

    #[test]
    fn test_if_true() {
        assert_eq!(eliminate("if (true) { a(); } else { b(); }").0, "a();");
    }

    #[test]
    fn test_if_false_without_else() {
        let (out, changed) = eliminate("if (false) a(); c();");
        assert_eq!(changed, 1);
        assert_eq!(out, "c();");
    }

    #[test]
    fn test_conditional_expression() {
        assert_eq!(eliminate("x = true ? a : b;").0, "x = a;");
        assert_eq!(eliminate("x = false ? a : b;").0, "x = b;");
    }

    #[test]
    fn test_logical_expressions() {
        assert_eq!(eliminate("x = true && a;").0, "x = a;");
        assert_eq!(eliminate("x = false && a;").0, "x = false;");
        assert_eq!(eliminate("x = true || a;").0, "x = true;");
        assert_eq!(eliminate("x = false || a;").0, "x = a;");
    }

    #[test]
    fn test_non_literal_tests_kept() {
        let (_, changed) = eliminate("if (!![]) a(); x = 1 ? a : b; y = c && d;");
        assert_eq!(changed, 0);
    }
}

use swc_core::common::{DUMMY_SP, SyntaxContext};
use swc_core::ecma::ast::*;
use swc_core::ecma::visit::{VisitMut, VisitMutWith};

use crate::pass::TreePass;
use crate::util::unparen;

/// Unwraps single-element sequences and splits statement-level sequences
/// `a(), b();` into `a(); b();`.
///
/// The split statements come back in a dummy-span block that the flattener
/// splices into the enclosing list.
#[derive(Debug, Default)]
pub struct SequenceExpander {
    changed: usize,
}

impl TreePass for SequenceExpander {
    fn name(&self) -> &'static str {
        "sequence-expansion"
    }

    fn run(&mut self, program: &mut Program) -> usize {
        self.changed = 0;
        program.visit_mut_with(self);
        self.changed
    }
}

impl VisitMut for SequenceExpander {
    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        expr.visit_mut_children_with(self);

        if let Expr::Seq(seq) = expr {
            if seq.exprs.len() == 1 {
                if let Some(only) = seq.exprs.pop() {
                    *expr = *only;
                    self.changed += 1;
                }
            }
        }
    }

    fn visit_mut_stmt(&mut self, stmt: &mut Stmt) {
        stmt.visit_mut_children_with(self);

        let Stmt::Expr(expr_stmt) = stmt else { return };
        let Expr::Seq(seq) = unparen(&expr_stmt.expr) else {
            return;
        };
        // A leading string literal statement would turn into a directive.
        if seq
            .exprs
            .iter()
            .any(|e| matches!(unparen(e), Expr::Lit(Lit::Str(_))))
        {
            return;
        }
        let stmts = seq
            .exprs
            .iter()
            .map(|e| {
                Stmt::Expr(ExprStmt {
                    span: DUMMY_SP,
                    expr: e.clone(),
                })
            })
            .collect();
        *stmt = Stmt::Block(BlockStmt {
            span: DUMMY_SP,
            ctxt: SyntaxContext::empty(),
            stmts,
        });
        self.changed += 1;
    }
}

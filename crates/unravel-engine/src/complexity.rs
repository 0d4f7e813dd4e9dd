//! Structural complexity estimate of a source unit.

use swc_core::ecma::ast::*;
use swc_core::ecma::visit::{Visit, VisitWith};

use crate::syntax::SyntaxTree;

/// Reported when the source cannot be parsed at all.
pub const UNPARSEABLE_COMPLEXITY: u32 = 100;

/// Weighted count of functions, branches, loops and `try` blocks.
///
/// Parse failure yields [`UNPARSEABLE_COMPLEXITY`]; it never errors.
pub fn estimate_complexity(source: &str) -> u32 {
    match SyntaxTree::parse(source) {
        Ok(tree) => program_complexity(&tree.program),
        Err(_) => UNPARSEABLE_COMPLEXITY,
    }
}

pub fn program_complexity(program: &Program) -> u32 {
    let mut counter = ComplexityCounter::default();
    program.visit_with(&mut counter);
    counter.score
}

#[derive(Default)]
struct ComplexityCounter {
    score: u32,
}

macro_rules! weigh {
    ($method:ident, $node:ty, $weight:expr) => {
        fn $method(&mut self, node: &$node) {
            self.score += $weight;
            node.visit_children_with(self);
        }
    };
}

impl Visit for ComplexityCounter {
    weigh!(visit_fn_decl, FnDecl, 2);
    weigh!(visit_fn_expr, FnExpr, 2);
    weigh!(visit_arrow_expr, ArrowExpr, 2);
    weigh!(visit_if_stmt, IfStmt, 1);
    weigh!(visit_switch_stmt, SwitchStmt, 2);
    weigh!(visit_cond_expr, CondExpr, 1);
    weigh!(visit_while_stmt, WhileStmt, 2);
    weigh!(visit_do_while_stmt, DoWhileStmt, 2);
    weigh!(visit_for_stmt, ForStmt, 2);
    weigh!(visit_try_stmt, TryStmt, 3);
}

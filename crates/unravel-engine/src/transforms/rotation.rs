use swc_core::ecma::ast::*;
use swc_core::ecma::visit::{Visit, VisitMut, VisitMutWith, VisitWith};

use crate::pass::TreePass;
use crate::util::{StmtItem, unparen};

/// Removes string-array rotation IIFEs.
///
/// Matches an expression statement that immediately invokes a function whose
/// body contains a `while` loop and mentions both `push` and `shift`. The
/// whole statement is dropped, so if the array it rotated is still read
/// elsewhere, the indices those reads assume will now be off.
#[derive(Debug, Default)]
pub struct RotationRemover {
    removed: usize,
}

impl TreePass for RotationRemover {
    fn name(&self) -> &'static str {
        "rotation-remover"
    }

    fn run(&mut self, program: &mut Program) -> usize {
        self.removed = 0;
        program.visit_mut_with(self);
        self.removed
    }
}

impl VisitMut for RotationRemover {
    fn visit_mut_stmts(&mut self, stmts: &mut Vec<Stmt>) {
        stmts.visit_mut_children_with(self);
        self.removed += remove_rotations(stmts);
    }

    fn visit_mut_module_items(&mut self, items: &mut Vec<ModuleItem>) {
        items.visit_mut_children_with(self);
        self.removed += remove_rotations(items);
    }
}

fn remove_rotations<T: StmtItem>(items: &mut Vec<T>) -> usize {
    let before = items.len();
    items.retain(|item| !item.as_stmt().is_some_and(is_rotation_stmt));
    before - items.len()
}

fn is_rotation_stmt(stmt: &Stmt) -> bool {
    let Stmt::Expr(ExprStmt { expr, .. }) = stmt else {
        return false;
    };
    let Expr::Call(call) = strip_invocation_wrappers(expr) else {
        return false;
    };
    let Callee::Expr(callee) = &call.callee else {
        return false;
    };

    let mut scan = RotationScan::default();
    match unparen(callee) {
        Expr::Fn(func) => func.function.visit_with(&mut scan),
        Expr::Arrow(arrow) => arrow.body.visit_with(&mut scan),
        _ => return false,
    }
    scan.has_while && scan.saw_push && scan.saw_shift
}

/// `(function(){})()`, `!function(){}()` and friends.
fn strip_invocation_wrappers(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(paren) => strip_invocation_wrappers(&paren.expr),
        Expr::Unary(UnaryExpr {
            op: UnaryOp::Bang,
            arg,
            ..
        }) => strip_invocation_wrappers(arg),
        _ => expr,
    }
}

#[derive(Default)]
struct RotationScan {
    has_while: bool,
    saw_push: bool,
    saw_shift: bool,
}

impl RotationScan {
    fn note(&mut self, word: &str) {
        self.saw_push |= word == "push";
        self.saw_shift |= word == "shift";
    }
}

impl Visit for RotationScan {
    fn visit_while_stmt(&mut self, node: &WhileStmt) {
        self.has_while = true;
        node.visit_children_with(self);
    }

    fn visit_ident(&mut self, node: &Ident) {
        self.note(&node.sym);
    }

    fn visit_ident_name(&mut self, node: &IdentName) {
        self.note(&node.sym);
    }

    fn visit_str(&mut self, node: &Str) {
        self.note(&node.value);
    }
}

use swc_core::ecma::ast::*;
use swc_core::ecma::visit::{VisitMut, VisitMutWith};

use crate::pass::TreePass;
use crate::util::{bool_literal, take_branch, unparen};

/// Resolves `if` statements with a statically known test and drops
/// statements that follow a `return` or `throw` in the same block.
///
/// `!![]` reads as `true` and `![]` as `false`, the forms obfuscators use in
/// place of boolean literals.
#[derive(Debug, Default)]
pub struct DeadCodeRemover {
    changed: usize,
}

impl TreePass for DeadCodeRemover {
    fn name(&self) -> &'static str {
        "dead-code-remover"
    }

    fn run(&mut self, program: &mut Program) -> usize {
        self.changed = 0;
        program.visit_mut_with(self);
        self.changed
    }
}

impl VisitMut for DeadCodeRemover {
    fn visit_mut_stmt(&mut self, stmt: &mut Stmt) {
        stmt.visit_mut_children_with(self);

        let Stmt::If(if_stmt) = stmt else { return };
        let Some(value) = static_test(&if_stmt.test) else {
            return;
        };
        let branch = if value {
            Some(std::mem::replace(&mut if_stmt.cons, empty_stmt()))
        } else {
            if_stmt.alt.take()
        };
        *stmt = take_branch(branch);
        self.changed += 1;
    }

    fn visit_mut_block_stmt(&mut self, block: &mut BlockStmt) {
        block.visit_mut_children_with(self);

        let Some(exit) = block
            .stmts
            .iter()
            .position(|stmt| matches!(stmt, Stmt::Return(_) | Stmt::Throw(_)))
        else {
            return;
        };
        let before = block.stmts.len();
        let mut index = 0;
        // Function declarations are hoisted, so they stay reachable.
        block.stmts.retain(|stmt| {
            let keep = index <= exit || matches!(stmt, Stmt::Decl(Decl::Fn(_)));
            index += 1;
            keep
        });
        self.changed += before - block.stmts.len();
    }
}

fn empty_stmt() -> Box<Stmt> {
    Box::new(Stmt::Empty(EmptyStmt {
        span: swc_core::common::DUMMY_SP,
    }))
}

fn static_test(test: &Expr) -> Option<bool> {
    if let Some(value) = bool_literal(test) {
        return Some(value);
    }
    match unparen(test) {
        Expr::Unary(UnaryExpr {
            op: UnaryOp::Bang,
            arg,
            ..
        }) => match unparen(arg) {
            Expr::Array(array) if array.elems.is_empty() => Some(false),
            Expr::Unary(UnaryExpr {
                op: UnaryOp::Bang,
                arg,
                ..
            }) => matches!(unparen(arg), Expr::Array(array) if array.elems.is_empty())
                .then_some(true),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::BlockFlattener;
    use crate::syntax::SyntaxTree;

    fn remove(source: &str) -> (String, usize) {
        let mut tree = SyntaxTree::parse(source).unwrap();
        let changed = DeadCodeRemover::default().run(&mut tree.program);
        tree.program.visit_mut_with(&mut BlockFlattener);
        (tree.print().unwrap(), changed)
    }

    #[test]
    fn test_if_false_removed() {
        let (out, changed) = remove("if (false) { evil(); } ok();");
        assert_eq!(changed, 1);
        assert!(!out.contains("evil"));
        assert!(out.contains("ok()"));
    }

    #[test]
    fn test_if_false_keeps_else() {
        let (out, _) = remove("if (false) { a(); } else { b(); }");
        assert!(!out.contains("a()"));
        assert!(out.contains("b()"));
        assert!(!out.contains('{'));
    }

    #[test]
    fn test_truthy_empty_array() {
        let (out, _) = remove("if (!![]) { a(); } else { b(); }");
        assert!(out.contains("a()"));
        assert!(!out.contains("b()"));
    }

    #[test]
    fn test_falsy_empty_array() {
        let (out, _) = remove("if (![]) { a(); } else { b(); }");
        assert!(!out.contains("a()"));
        assert!(out.contains("b()"));
    }

    #[test]
    fn test_unknown_test_kept() {
        let (out, changed) = remove("if (x) { a(); }");
        assert_eq!(changed, 0);
        assert!(out.contains("if (x)"));
    }

    #[test]
    fn test_code_after_return_dropped() {
        let (out, changed) = remove(
            "function f() { return 1; dead(); function helper() {} more(); }",
        );
        assert_eq!(changed, 2);
        assert!(!out.contains("dead"));
        assert!(!out.contains("more"));
        assert!(out.contains("function helper"));
    }

    #[test]
    fn test_code_after_throw_dropped() {
        let (out, _) = remove("function f() { throw new Error('x'); cleanup(); }");
        assert!(!out.contains("cleanup"));
    }

    #[test]
    fn test_else_if_chain() {
        let (out, _) = remove("if (x) { a(); } else if (false) { b(); } else { c(); }");
        assert!(!out.contains("b()"));
        assert!(out.contains("c()"));
        assert!(out.contains("if (x)"));
    }
}

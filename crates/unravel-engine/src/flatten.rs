//! Splices rewrite-generated blocks back into their enclosing statement list.
//!
//! Rewrites that turn one statement into several (a taken `if` branch, an
//! expanded sequence) emit a block with a dummy span, and rewrites that delete
//! a statement leave a dummy-span empty statement. Source-level blocks and
//! empties always carry a real span, so they are never touched here.

use swc_core::ecma::ast::*;
use swc_core::ecma::visit::{VisitMut, VisitMutWith};

use crate::util::StmtItem;

pub(crate) struct BlockFlattener;

impl VisitMut for BlockFlattener {
    fn visit_mut_stmts(&mut self, stmts: &mut Vec<Stmt>) {
        stmts.visit_mut_children_with(self);
        splice_generated(stmts);
    }

    fn visit_mut_module_items(&mut self, items: &mut Vec<ModuleItem>) {
        items.visit_mut_children_with(self);
        splice_generated(items);
    }
}

fn splice_generated<T: StmtItem>(items: &mut Vec<T>) {
    if !items
        .iter()
        .any(|item| item.as_stmt().is_some_and(is_generated))
    {
        return;
    }
    for item in std::mem::take(items) {
        match item.into_stmt() {
            Ok(Stmt::Empty(empty)) if empty.span.is_dummy() => {}
            Ok(Stmt::Block(block)) if is_spliceable(&block) => {
                let mut inner: Vec<T> = block.stmts.into_iter().map(T::from_stmt).collect();
                splice_generated(&mut inner);
                items.extend(inner);
            }
            Ok(stmt) => items.push(T::from_stmt(stmt)),
            Err(item) => items.push(item),
        }
    }
}

fn is_generated(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Empty(empty) => empty.span.is_dummy(),
        Stmt::Block(block) => is_spliceable(block),
        _ => false,
    }
}

/// Blocks holding block-scoped declarations keep their scope.
fn is_spliceable(block: &BlockStmt) -> bool {
    block.span.is_dummy()
        && !block.stmts.iter().any(|stmt| match stmt {
            Stmt::Decl(Decl::Var(var)) => var.kind != VarDeclKind::Var,
            Stmt::Decl(_) => true,
            _ => false,
        })
}

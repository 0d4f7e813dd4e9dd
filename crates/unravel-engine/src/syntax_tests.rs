use super::*;
use swc_core::ecma::ast::{ModuleItem, Stmt};

#[test]
fn test_parse_and_print_script() {
    let mut tree = SyntaxTree::parse("var a = 1;\nfoo(a);").unwrap();
    let printed = tree.print().unwrap();
    assert!(printed.contains("var a = 1;"));
    assert!(printed.contains("foo(a);"));
}

#[test]
fn test_parse_accepts_modules_and_jsx() {
    assert!(parses("import x from 'y'; export const z = x;"));
    assert!(parses("const el = <div className=\"a\">{value}</div>;"));
}

#[test]
fn test_parse_falls_back_to_typescript() {
    assert!(parses("function f(a: number): string { return String(a); }"));
}

#[test]
fn test_parse_rejects_garbage() {
    let err = SyntaxTree::parse("function (").err().unwrap();
    assert!(!err.message.is_empty());
    assert!(!parses("var = ;"));
}

#[test]
fn test_unit_text_unchanged_until_tree_edit() {
    let mut unit = SourceUnit::new("var   a=1");
    let count = unit.with_tree(|_tree| (0usize, false)).unwrap();
    assert_eq!(count, 0);
    assert_eq!(unit.text(), "var   a=1");
}

#[test]
fn test_unit_reprints_after_tree_edit() {
    let mut unit = SourceUnit::new("var a = 1; var b = 2;");
    unit.with_tree(|tree| {
        if let Program::Script(script) = &mut tree.program {
            script.body.truncate(1);
        }
        if let Program::Module(module) = &mut tree.program {
            module.body.retain(|item| matches!(item, ModuleItem::Stmt(Stmt::Decl(_))));
            module.body.truncate(1);
        }
        ((), true)
    })
    .unwrap();
    let text = unit.text().to_string();
    assert!(text.contains("var a = 1"));
    assert!(!text.contains("var b"));
}

#[test]
fn test_unit_replace_text_drops_tree() {
    let mut unit = SourceUnit::new("var a = 1;");
    unit.with_tree(|_| ((), false)).unwrap();
    unit.replace_text("let b = 2;".to_string());
    assert_eq!(unit.text(), "let b = 2;");
    let printed = unit
        .with_tree(|tree| (tree.print().unwrap(), false))
        .unwrap();
    assert!(printed.contains("let b = 2"));
}

#[test]
fn test_unit_parse_error_propagates() {
    let mut unit = SourceUnit::new("if (");
    assert!(unit.with_tree(|_| ((), false)).is_err());
    assert_eq!(unit.into_text(), "if (");
}

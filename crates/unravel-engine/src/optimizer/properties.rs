use swc_core::ecma::ast::*;
use swc_core::ecma::visit::{VisitMut, VisitMutWith};

use crate::pass::TreePass;
use crate::util::{is_identifier_name, unparen};

fn identifier_key(expr: &Expr) -> Option<&Str> {
    match unparen(expr) {
        Expr::Lit(Lit::Str(s)) if is_identifier_name(&s.value) => Some(s),
        _ => None,
    }
}

/// `obj['prop']` to `obj.prop` when `prop` is identifier-shaped.
#[derive(Debug, Default)]
pub struct PropertyUnfolder {
    changed: usize,
}

impl TreePass for PropertyUnfolder {
    fn name(&self) -> &'static str {
        "object-property-unfolding"
    }

    fn run(&mut self, program: &mut Program) -> usize {
        self.changed = 0;
        program.visit_mut_with(self);
        self.changed
    }
}

impl VisitMut for PropertyUnfolder {
    fn visit_mut_member_prop(&mut self, prop: &mut MemberProp) {
        prop.visit_mut_children_with(self);

        let MemberProp::Computed(computed) = prop else {
            return;
        };
        let Some(key) = identifier_key(&computed.expr) else {
            return;
        };
        *prop = MemberProp::Ident(IdentName {
            span: computed.span,
            sym: key.value.clone(),
        });
        self.changed += 1;
    }
}

/// Identifier-shaped string keys in object literals and classes become bare
/// identifiers: `{ 'a': 1, ['b']: 2 }` to `{ a: 1, b: 2 }`.
///
/// Computed `['__proto__']` and `['constructor']` keep their brackets, since
/// the bare form means something different for those two names.
#[derive(Debug, Default)]
pub struct ComputedKeyResolver {
    changed: usize,
}

impl TreePass for ComputedKeyResolver {
    fn name(&self) -> &'static str {
        "computed-property-resolution"
    }

    fn run(&mut self, program: &mut Program) -> usize {
        self.changed = 0;
        program.visit_mut_with(self);
        self.changed
    }
}

impl VisitMut for ComputedKeyResolver {
    fn visit_mut_prop_name(&mut self, name: &mut PropName) {
        name.visit_mut_children_with(self);

        let resolved = match name {
            PropName::Str(s) if is_identifier_name(&s.value) => Some(IdentName {
                span: s.span,
                sym: s.value.clone(),
            }),
            PropName::Computed(computed) => identifier_key(&computed.expr)
                .filter(|key| !matches!(&*key.value, "__proto__" | "constructor"))
                .map(|key| IdentName {
                    span: computed.span,
                    sym: key.value.clone(),
                }),
            _ => None,
        };
        if let Some(ident) = resolved {
            *name = PropName::Ident(ident);
            self.changed += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SyntaxTree;

    fn run_pass(pass: &mut dyn TreePass, source: &str) -> (String, usize) {
        let mut tree = SyntaxTree::parse(source).unwrap();
        let changed = pass.run(&mut tree.program);
        (tree.print().unwrap().trim().to_string(), changed)
    }

    #[test]
    fn test_member_access_unfolded() {
        let (out, changed) = run_pass(&mut PropertyUnfolder::default(), "a['log'](b['c']['d']);");
        assert_eq!(changed, 3);
        assert_eq!(out, "a.log(b.c.d);");
    }

    #[test]
    fn test_non_identifier_member_kept() {
        let (out, changed) =
            run_pass(&mut PropertyUnfolder::default(), "a['data-x']; a['0']; a[k];");
        assert_eq!(changed, 0);
        assert!(out.contains("a[\"data-x\"]") || out.contains("a['data-x']"));
    }

    #[test]
    fn test_reserved_word_member_allowed() {
        let (out, _) = run_pass(&mut PropertyUnfolder::default(), "a['default'];");
        assert_eq!(out, "a.default;");
    }

    #[test]
    fn test_object_keys_resolved() {
        let (out, changed) = run_pass(
            &mut ComputedKeyResolver::default(),
            "var o = { 'a': 1, ['b']: 2, 'c-d': 3, [e]: 4 };",
        );
        assert_eq!(changed, 2);
        assert!(out.contains("a: 1"));
        assert!(out.contains("b: 2"));
        assert!(out.contains("\"c-d\": 3") || out.contains("'c-d': 3"));
        assert!(out.contains("[e]: 4"));
    }

    #[test]
    fn test_proto_key_keeps_brackets() {
        let (out, changed) =
            run_pass(&mut ComputedKeyResolver::default(), "var o = { ['__proto__']: p };");
        assert_eq!(changed, 0);
        assert!(out.contains("__proto__"));
        assert!(out.contains('['));
    }

    #[test]
    fn test_class_method_keys() {
        let (out, _) =
            run_pass(&mut ComputedKeyResolver::default(), "class A { ['run']() {} }");
        assert!(out.contains("run()"), "{out}");
    }
}

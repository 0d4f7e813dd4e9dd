use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use swc_core::ecma::ast::*;
use swc_core::ecma::visit::{VisitMut, VisitMutWith};

use crate::pass::TreePass;
use crate::util::{numeric_value, str_expr, unparen};

/// Folds encoded string forms into plain literals.
///
/// - `String.fromCharCode(72, 105)` with all-numeric arguments
/// - `atob("aGk=")` with a literal argument
/// - literals written with `\xHH` / `\uHHHH` escapes are re-emitted decoded
#[derive(Debug, Default)]
pub struct StringDecoder {
    changed: usize,
}

impl TreePass for StringDecoder {
    fn name(&self) -> &'static str {
        "string-decoder"
    }

    fn run(&mut self, program: &mut Program) -> usize {
        self.changed = 0;
        program.visit_mut_with(self);
        self.changed
    }
}

impl VisitMut for StringDecoder {
    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        expr.visit_mut_children_with(self);

        let Expr::Call(call) = expr else { return };
        let decoded = if is_member_call(&call.callee, "String", "fromCharCode") {
            from_char_code(&call.args)
        } else if is_global_call(&call.callee, "atob") {
            atob(&call.args)
        } else {
            None
        };
        if let Some(text) = decoded {
            *expr = str_expr(text);
            self.changed += 1;
        }
    }

    fn visit_mut_str(&mut self, s: &mut Str) {
        if s.raw.as_deref().is_some_and(has_hex_or_unicode_escape) {
            s.raw = None;
            self.changed += 1;
        }
    }
}

fn is_global_call(callee: &Callee, name: &str) -> bool {
    match callee {
        Callee::Expr(expr) => matches!(unparen(expr), Expr::Ident(ident) if &*ident.sym == name),
        _ => false,
    }
}

fn is_member_call(callee: &Callee, object: &str, method: &str) -> bool {
    let Callee::Expr(expr) = callee else {
        return false;
    };
    let Expr::Member(member) = unparen(expr) else {
        return false;
    };
    let object_matches =
        matches!(unparen(&member.obj), Expr::Ident(ident) if &*ident.sym == object);
    let method_matches = match &member.prop {
        MemberProp::Ident(prop) => &*prop.sym == method,
        MemberProp::Computed(computed) => {
            matches!(unparen(&computed.expr), Expr::Lit(Lit::Str(s)) if &*s.value == method)
        }
        MemberProp::PrivateName(_) => false,
    };
    object_matches && method_matches
}

/// `String.fromCharCode` semantics: each argument is truncated to a UTF-16
/// code unit. Lone surrogates cannot live in a Rust string, so a call that
/// would produce one is left alone.
fn from_char_code(args: &[ExprOrSpread]) -> Option<String> {
    let units = args
        .iter()
        .map(|arg| {
            if arg.spread.is_some() {
                return None;
            }
            numeric_value(&arg.expr).map(to_uint16)
        })
        .collect::<Option<Vec<u16>>>()?;
    String::from_utf16(&units).ok()
}

fn to_uint16(value: f64) -> u16 {
    if !value.is_finite() {
        return 0;
    }
    (value.trunc().rem_euclid(65536.0)) as u16
}

fn atob(args: &[ExprOrSpread]) -> Option<String> {
    let [arg] = args else { return None };
    if arg.spread.is_some() {
        return None;
    }
    let Expr::Lit(Lit::Str(s)) = unparen(&arg.expr) else {
        return None;
    };
    let cleaned: String = s.value.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD.decode(cleaned.as_bytes()).ok()?;
    // atob yields a binary string: one char per byte.
    Some(bytes.into_iter().map(char::from).collect())
}

fn has_hex_or_unicode_escape(raw: &str) -> bool {
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('x' | 'u') => return true,
                _ => continue,
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SyntaxTree;

    fn decode(source: &str) -> (String, usize) {
        let mut tree = SyntaxTree::parse(source).unwrap();
        let changed = StringDecoder::default().run(&mut tree.program);
        (tree.print().unwrap(), changed)
    }

    #[test]
    fn test_from_char_code_folded() {
        let (out, changed) = decode("var s = String.fromCharCode(72, 101, 108, 108, 111);");
        assert_eq!(changed, 1);
        assert!(out.contains("\"Hello\""), "{out}");
    }

    #[test]
    fn test_from_char_code_computed_member() {
        let (out, _) = decode("var s = String['fromCharCode'](0x41);");
        assert!(out.contains("\"A\""), "{out}");
    }

    #[test]
    fn test_from_char_code_with_variable_untouched() {
        let (out, changed) = decode("var s = String.fromCharCode(x, 65);");
        assert_eq!(changed, 0);
        assert!(out.contains("fromCharCode"));
    }

    #[test]
    fn test_from_char_code_wraps_to_uint16() {
        assert_eq!(to_uint16(65536.0 + 65.0), 65);
        assert_eq!(to_uint16(-1.0), 65535);
        assert_eq!(to_uint16(f64::NAN), 0);
    }

    #[test]
    fn test_lone_surrogate_left_alone() {
        let (_, changed) = decode("String.fromCharCode(0xD800);");
        assert_eq!(changed, 0);
    }

    #[test]
    fn test_hex_escapes_reemitted_decoded() {
        let (out, changed) = decode(r#"var s = "\x48\x69";"#);
        assert_eq!(changed, 1);
        assert!(out.contains("\"Hi\""), "{out}");
    }

    #[test]
    fn test_unicode_escapes_reemitted_decoded() {
        let (out, changed) = decode(r#"var s = '\u0041BC';"#);
        assert_eq!(changed, 1);
        assert!(out.contains("ABC"), "{out}");
    }

    #[test]
    fn test_escaped_backslash_is_not_an_escape() {
        assert!(!has_hex_or_unicode_escape(r#""\\x41""#));
        assert!(has_hex_or_unicode_escape(r#""\x41""#));
    }

    #[test]
    fn test_atob_literal() {
        let (out, changed) = decode("var s = atob('aGVsbG8=');");
        assert_eq!(changed, 1);
        assert!(out.contains("\"hello\""), "{out}");
    }

    #[test]
    fn test_atob_invalid_base64_untouched() {
        let (out, changed) = decode("var s = atob('***');");
        assert_eq!(changed, 0);
        assert!(out.contains("atob"));
    }
}

use super::*;

fn num(value: f64) -> Expr {
    Expr::Lit(Lit::Num(Number {
        span: DUMMY_SP,
        value,
        raw: None,
    }))
}

#[test]
fn test_numeric_value_reads_negated_literal() {
    assert_eq!(numeric_value(&num(3.0)), Some(3.0));
    assert_eq!(numeric_value(&number_expr(-4.5)), Some(-4.5));
    assert_eq!(numeric_value(&ident_expr("x")), None);
}

#[test]
fn test_number_expr_non_finite() {
    assert!(matches!(number_expr(f64::NAN), Expr::Ident(ref i) if &*i.sym == "NaN"));
    assert!(matches!(number_expr(f64::INFINITY), Expr::Ident(ref i) if &*i.sym == "Infinity"));
    assert!(matches!(
        number_expr(f64::NEG_INFINITY),
        Expr::Unary(UnaryExpr { op: UnaryOp::Minus, .. })
    ));
}

#[test]
fn test_number_expr_negative_is_unary_minus() {
    match number_expr(-5.0) {
        Expr::Unary(UnaryExpr { op, arg, .. }) => {
            assert_eq!(op, UnaryOp::Minus);
            assert_eq!(numeric_value(&arg), Some(5.0));
        }
        other => panic!("expected unary minus, got {other:?}"),
    }
}

#[test]
fn test_number_to_string() {
    assert_eq!(number_to_string(42.0).as_deref(), Some("42"));
    assert_eq!(number_to_string(-0.0).as_deref(), Some("0"));
    assert_eq!(number_to_string(1.5).as_deref(), Some("1.5"));
    assert_eq!(number_to_string(f64::NAN).as_deref(), Some("NaN"));
    assert_eq!(number_to_string(1e-9), None);
}

#[test]
fn test_literal_to_number_strings() {
    assert_eq!(literal_to_number(&str_expr("  12 ")), Some(12.0));
    assert_eq!(literal_to_number(&str_expr("")), Some(0.0));
    assert_eq!(literal_to_number(&str_expr("0x1f")), Some(31.0));
    assert!(literal_to_number(&str_expr("abc")).unwrap().is_nan());
    assert!(literal_to_number(&str_expr("inf")).unwrap().is_nan());
    assert_eq!(literal_to_number(&str_expr("-Infinity")), Some(f64::NEG_INFINITY));
}

#[test]
fn test_literal_truthiness() {
    assert_eq!(literal_truthiness(&num(0.0)), Some(false));
    assert_eq!(literal_truthiness(&str_expr("a")), Some(true));
    assert_eq!(literal_truthiness(&str_expr("")), Some(false));
    assert_eq!(literal_truthiness(&ident_expr("x")), None);
}

#[test]
fn test_is_identifier_name() {
    assert!(is_identifier_name("foo"));
    assert!(is_identifier_name("$_a1"));
    assert!(!is_identifier_name("1a"));
    assert!(!is_identifier_name("a-b"));
    assert!(!is_identifier_name(""));
}

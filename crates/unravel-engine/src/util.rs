//! Literal helpers shared by the transforms and the optimizer.

use swc_core::common::DUMMY_SP;
use swc_core::ecma::ast::*;

/// Strip any number of wrapping parentheses.
pub(crate) fn unparen(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(paren) => unparen(&paren.expr),
        _ => expr,
    }
}

/// Numeric value of a number literal, or of unary minus over one.
///
/// `-5` is a unary expression in the tree, but it is the canonical way the
/// engine writes negative numbers back, so it counts as a literal here.
pub(crate) fn numeric_value(expr: &Expr) -> Option<f64> {
    match unparen(expr) {
        Expr::Lit(Lit::Num(num)) => Some(num.value),
        Expr::Unary(UnaryExpr {
            op: UnaryOp::Minus,
            arg,
            ..
        }) => match unparen(arg) {
            Expr::Lit(Lit::Num(num)) => Some(-num.value),
            _ => None,
        },
        _ => None,
    }
}

pub(crate) fn bool_literal(expr: &Expr) -> Option<bool> {
    match unparen(expr) {
        Expr::Lit(Lit::Bool(b)) => Some(b.value),
        _ => None,
    }
}

/// JS truthiness of a primitive literal.
pub(crate) fn literal_truthiness(expr: &Expr) -> Option<bool> {
    if let Some(value) = numeric_value(expr) {
        return Some(value != 0.0 && !value.is_nan());
    }
    match unparen(expr) {
        Expr::Lit(Lit::Bool(b)) => Some(b.value),
        Expr::Lit(Lit::Str(s)) => Some(!s.value.is_empty()),
        Expr::Lit(Lit::Null(_)) => Some(false),
        _ => None,
    }
}

/// Relational and equality operators over two numbers. Loose and strict
/// equality agree when both sides are numbers.
pub(crate) fn compare_numbers(op: BinaryOp, left: f64, right: f64) -> Option<bool> {
    Some(match op {
        BinaryOp::EqEqEq | BinaryOp::EqEq => left == right,
        BinaryOp::NotEqEq | BinaryOp::NotEq => left != right,
        BinaryOp::Gt => left > right,
        BinaryOp::GtEq => left >= right,
        BinaryOp::Lt => left < right,
        BinaryOp::LtEq => left <= right,
        _ => return None,
    })
}

/// `ToNumber` applied to a primitive literal.
pub(crate) fn literal_to_number(expr: &Expr) -> Option<f64> {
    if let Some(value) = numeric_value(expr) {
        return Some(value);
    }
    match unparen(expr) {
        Expr::Lit(Lit::Bool(b)) => Some(if b.value { 1.0 } else { 0.0 }),
        Expr::Lit(Lit::Null(_)) => Some(0.0),
        Expr::Lit(Lit::Str(s)) => Some(string_to_number(&s.value)),
        _ => None,
    }
}

/// `ToString` applied to a primitive literal, when it can be done exactly.
pub(crate) fn literal_to_string(expr: &Expr) -> Option<String> {
    if let Some(value) = numeric_value(expr) {
        return number_to_string(value);
    }
    match unparen(expr) {
        Expr::Lit(Lit::Str(s)) => Some(s.value.to_string()),
        Expr::Lit(Lit::Bool(b)) => Some(b.value.to_string()),
        Expr::Lit(Lit::Null(_)) => Some("null".to_string()),
        _ => None,
    }
}

fn string_to_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    let radix = match trimmed.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&trimmed[2..], radix)
            .map(|v| v as f64)
            .unwrap_or(f64::NAN);
    }
    let unsigned = trimmed.trim_start_matches(['+', '-']);
    if unsigned == "Infinity" {
        return if trimmed.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }
    // Rust also accepts "inf" and "nan", which JS does not.
    let decimal = unsigned
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !decimal || trimmed.len() - unsigned.len() > 1 {
        return f64::NAN;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

/// JS `Number.prototype.toString()` for the values where Rust's shortest
/// round-trip formatting produces the same text.
pub(crate) fn number_to_string(value: f64) -> Option<String> {
    const MAX_SAFE: f64 = 9_007_199_254_740_992.0;
    if value.is_nan() {
        return Some("NaN".to_string());
    }
    if value.is_infinite() {
        return Some(if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string());
    }
    if value == 0.0 {
        return Some("0".to_string());
    }
    if value.fract() == 0.0 {
        return (value.abs() <= MAX_SAFE).then(|| format!("{}", value as i64));
    }
    (value.abs() >= 1e-6 && value.abs() < 1e21).then(|| format!("{value}"))
}

pub(crate) fn ident_expr(name: &str) -> Expr {
    Expr::Ident(Ident::new_no_ctxt(name.into(), DUMMY_SP))
}

pub(crate) fn str_expr(value: impl Into<String>) -> Expr {
    let value: String = value.into();
    Expr::Lit(Lit::Str(Str {
        span: DUMMY_SP,
        value: value.into(),
        raw: None,
    }))
}

pub(crate) fn bool_expr(value: bool) -> Expr {
    Expr::Lit(Lit::Bool(Bool {
        span: DUMMY_SP,
        value,
    }))
}

/// Build the node for a number the way it would be written in source:
/// negatives as unary minus, non-finite values as the global identifiers.
pub(crate) fn number_expr(value: f64) -> Expr {
    if value.is_nan() {
        return ident_expr("NaN");
    }
    if value.is_infinite() {
        let infinity = ident_expr("Infinity");
        return if value > 0.0 {
            infinity
        } else {
            negate(infinity)
        };
    }
    if value.is_sign_negative() {
        return negate(positive_number(-value));
    }
    positive_number(value)
}

fn positive_number(value: f64) -> Expr {
    Expr::Lit(Lit::Num(Number {
        span: DUMMY_SP,
        value,
        raw: None,
    }))
}

fn negate(arg: Expr) -> Expr {
    Expr::Unary(UnaryExpr {
        span: DUMMY_SP,
        op: UnaryOp::Minus,
        arg: Box::new(arg),
    })
}

/// Whether `name` can be written as a bare identifier (`obj.name`).
pub(crate) fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Statement-like list items, so list rewrites work for both function
/// bodies (`Vec<Stmt>`) and module top levels (`Vec<ModuleItem>`).
pub(crate) trait StmtItem: Sized {
    fn as_stmt(&self) -> Option<&Stmt>;

    fn from_stmt(stmt: Stmt) -> Self;

    fn into_stmt(self) -> Result<Stmt, Self>;
}

impl StmtItem for Stmt {
    fn as_stmt(&self) -> Option<&Stmt> {
        Some(self)
    }

    fn from_stmt(stmt: Stmt) -> Self {
        stmt
    }

    fn into_stmt(self) -> Result<Stmt, Self> {
        Ok(self)
    }
}

impl StmtItem for ModuleItem {
    fn as_stmt(&self) -> Option<&Stmt> {
        match self {
            ModuleItem::Stmt(stmt) => Some(stmt),
            ModuleItem::ModuleDecl(_) => None,
        }
    }

    fn from_stmt(stmt: Stmt) -> Self {
        ModuleItem::Stmt(stmt)
    }

    fn into_stmt(self) -> Result<Stmt, Self> {
        match self {
            ModuleItem::Stmt(stmt) => Ok(stmt),
            other => Err(other),
        }
    }
}

/// Pick the surviving branch of a statically decided `if`.
///
/// A block branch is rewrapped in a fresh dummy-span block so the flattener
/// can splice it into the enclosing list; a missing branch becomes a
/// dummy-span empty statement that the flattener drops.
pub(crate) fn take_branch(branch: Option<Box<Stmt>>) -> Stmt {
    match branch.map(|stmt| *stmt) {
        None => Stmt::Empty(EmptyStmt { span: DUMMY_SP }),
        Some(Stmt::Block(block)) => Stmt::Block(BlockStmt {
            span: DUMMY_SP,
            ctxt: block.ctxt,
            stmts: block.stmts,
        }),
        Some(other) => other,
    }
}

#[cfg(test)]
#[path = "util_tests.rs"]
mod tests;

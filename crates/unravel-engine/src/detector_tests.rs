use super::*;

fn detect_raw(source: &str) -> Vec<Technique> {
    detect(&normalize(source))
}

#[test]
fn test_normalize_strips_comments_and_collapses_space() {
    let out = normalize("var a = 1; // trailing\n/* block\ncomment */   var   b\t=\n2;");
    assert_eq!(out, "var a = 1; var b = 2;");
}

#[test]
fn test_normalize_keeps_comment_markers_in_strings() {
    let out = normalize("var url = \"http://x\"; var s = '/* no */';");
    assert!(out.contains("http://x"));
    assert!(out.contains("/* no */"));
}

#[test]
fn test_normalize_keeps_invisible_characters() {
    let out = normalize("a\u{200B}\u{200C}b");
    assert_eq!(out, "a\u{200B}\u{200C}b");
}

#[test]
fn test_detect_string_encoding() {
    assert_eq!(detect_raw(r#"var s = "\x48\x69";"#), vec![Technique::StringEncoding]);
    assert_eq!(
        detect_raw("var s = String.fromCharCode(72, 105);"),
        vec![Technique::StringEncoding]
    );
    assert_eq!(detect_raw("atob('aGk=')"), vec![Technique::StringEncoding]);
}

#[test]
fn test_detect_control_flow_flattening() {
    let src = "var o = '1|0'.split('|'), i = 0; while (!![]) { switch (o[i++]) { case '0': a(); continue; case '1': b(); continue; } break; }";
    assert!(detect_raw(src).contains(&Technique::ControlFlowFlattening));
}

#[test]
fn test_detect_rotation_arithmetic_alone() {
    assert_eq!(detect_raw("x = y + 0x1f;"), vec![Technique::StringArrayRotation]);
}

#[test]
fn test_detect_rotation_with_bracket_push() {
    let src = "(function(a, b){ var c = function(d){ while(--d){ a['push'](a['shift']()); } }; c(b = b + 0x1a3); })(arr, 0x12);";
    assert!(detect_raw(src).contains(&Technique::StringArrayRotation));
}

#[test]
fn test_rotation_ignores_decimal_increment() {
    assert!(!detect_raw("arr.push(1); x = y + 16;").contains(&Technique::StringArrayRotation));
}

#[test]
fn test_detect_dead_code() {
    assert_eq!(detect_raw("if (false) { a(); }"), vec![Technique::DeadCodeInjection]);
    assert_eq!(detect_raw("if(!![]){a();}"), vec![Technique::DeadCodeInjection]);
}

#[test]
fn test_detect_opaque_predicates() {
    assert_eq!(detect_raw("if (1 === 1) { a(); }"), vec![Technique::OpaquePredicates]);
    assert_eq!(detect_raw("if (0x10 > 3) a();"), vec![Technique::OpaquePredicates]);
    assert!(detect_raw("if (a === 1) {}").is_empty());
}

#[test]
fn test_detect_invisible_unicode() {
    assert_eq!(
        detect_raw("var s = '\u{200B}\u{200C}';"),
        vec![Technique::InvisibleUnicode]
    );
}

#[test]
fn test_comments_cannot_fake_signatures() {
    assert!(detect_raw("// if (false) {}\nvar a = 1;").is_empty());
    assert!(detect_raw("/* String.fromCharCode */ a();").is_empty());
}

#[test]
fn test_clean_code_detects_nothing() {
    assert!(detect_raw("function add(a, b) { return a + b; }").is_empty());
}

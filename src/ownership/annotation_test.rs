use super::*;

#[test]
fn no_marker() {
    assert_eq!(scan(b"def main():\n    pass\n"), None);
    assert_eq!(scan(b""), None);
}

#[test]
fn single_marker() {
    assert_eq!(
        scan(b"# @owner alice@example.com\nimport os\n"),
        Some("alice@example.com".to_string())
    );
}

#[test]
fn markers_joined_in_order() {
    let content = b"// @owner alice\nvar x = 1;\n// @owner bob\n";
    assert_eq!(scan(content), Some("alice;bob".to_string()));
}

#[test]
fn marker_case_insensitive() {
    assert_eq!(scan(b"/* @OWNER Carol */"), Some("Carol */".to_string()));
    assert_eq!(scan(b"# @Owner dave"), Some("dave".to_string()));
}

#[test]
fn whitespace_tolerant() {
    assert_eq!(scan(b"#  @owner \t  erin  \r\n"), Some("erin".to_string()));
}

#[test]
fn marker_without_name_ignored() {
    assert_eq!(scan(b"# @owner\n# @owner   \n"), None);
    assert_eq!(scan(b"# @owners: team\n"), None);
}

#[test]
fn name_keeps_inner_spaces() {
    assert_eq!(
        scan(b"# @owner Team Payments <pay@x.com>\n"),
        Some("Team Payments <pay@x.com>".to_string())
    );
}

#[test]
fn invalid_utf8_does_not_abort() {
    let mut content = b"\xff\xfe garbage\n".to_vec();
    content.extend_from_slice(b"# @owner frank\n");
    assert_eq!(scan(&content), Some("frank".to_string()));
}

#[test]
fn invalid_utf8_inside_name_replaced() {
    let owner = scan(b"# @owner gr\xe9ta\n").unwrap();
    assert_eq!(owner, "gr\u{FFFD}ta");
}

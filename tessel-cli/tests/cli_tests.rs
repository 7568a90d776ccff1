use std::path::PathBuf;

use tessel_template::Value;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn tokens_lists_one_token_per_line() {
    let out = tessel_cli::tokens_cmd(&fixture("card.html")).expect("tokens");
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], r#"ELEMENT_START_OPEN "article""#);
    assert_eq!(lines[1], r#"ATTRIBUTE_NAME "class""#);
    assert_eq!(lines[2], r#"ATTRIBUTE_VALUE "card ""#);
    assert_eq!(lines[3], "PLACEHOLDER");
    assert_eq!(lines.iter().filter(|l| **l == "PLACEHOLDER").count(), 3);
}

#[test]
fn tree_is_indented_by_depth() {
    let out = tessel_cli::tree_cmd(&fixture("card.html")).expect("tree");
    assert_eq!(
        out,
        "<article> class=\"card {}\"\n  <h2>\n    placeholder\n  <input> disabled=\"{}\"\n"
    );
}

#[test]
fn bindings_show_paths_and_indices() {
    let out = tessel_cli::bindings_cmd(&fixture("card.html")).expect("bindings");
    assert_eq!(
        out,
        "placeholders: 3\n\
         attribute [0] class = \"card \" + $0\n\
         attribute [0, 1] disabled = $2\n\
         content [0, 0, 0] = $1\n"
    );
}

#[test]
fn render_applies_values_in_order() {
    let values = ["wide".to_string(), "Title".to_string(), "false".to_string()];
    let out = tessel_cli::render_cmd(&fixture("card.html"), &values).expect("render");
    assert_eq!(
        out,
        r#"<article class="card wide"><h2><!---->Title<!----></h2><input></article>"#
    );

    // missing values are undefined
    let out = tessel_cli::render_cmd(&fixture("card.html"), &[]).expect("render");
    assert_eq!(
        out,
        r#"<article class="card "><h2><!----><!----></h2><input></article>"#
    );
}

#[test]
fn value_arguments_are_typed() {
    assert_eq!(tessel_cli::parse_value("null"), Value::Null);
    assert_eq!(tessel_cli::parse_value("2"), Value::Number(2.0));
    assert_eq!(tessel_cli::parse_value("true"), Value::Bool(true));
    assert_eq!(tessel_cli::parse_value("x"), Value::from("x"));
}

#[test]
fn errors_carry_context() {
    let err = tessel_cli::tree_cmd(&fixture("broken.html")).unwrap_err();
    assert!(err.to_string().starts_with("failed to parse"));
    assert_eq!(err.root_cause().to_string(), "the li element is never closed");

    let err = tessel_cli::tokens_cmd(&fixture("missing.html")).unwrap_err();
    assert!(err.to_string().starts_with("failed to read"));
}

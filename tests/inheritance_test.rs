use serde_json::json;
use std::fs;
use tempfile::TempDir;
use umicro::{TemplateError, Templater};

fn setup(files: &[(&str, &str)]) -> (TempDir, Templater) {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        fs::write(dir.path().join(name), content).unwrap();
    }
    let t = Templater::new(dir.path()).unwrap();
    (dir, t)
}

#[test]
fn test_override_law() {
    let (_dir, t) = setup(&[
        ("base.html", "<{% block title %}P{% endblock %}>"),
        ("child.html", "{% extends base.html %}{% block title %}C{% endblock %}"),
    ]);
    assert_eq!(t.render("child.html", &json!({})).unwrap(), "<C>");
    assert_eq!(t.render("base.html", &json!({})).unwrap(), "<P>");
}

#[test]
fn test_extends_position_and_quoting() {
    let (_dir, t) = setup(&[
        ("base.html", "[{% block body %}{% endblock %}]"),
        ("child.html", "{% block body %}{{ who }}{% endblock %}{% extends \"base.html\" %}"),
    ]);
    assert_eq!(t.render("child.html", &json!({ "who": "me" })).unwrap(), "[me]");
}

#[test]
fn test_three_level_chain() {
    let (_dir, t) = setup(&[
        (
            "root.html",
            "{% block head %}R{% endblock %}|{% block body %}r{% endblock %}|{% block foot %}f{% endblock %}",
        ),
        (
            "mid.html",
            "{% extends root.html %}{% block body %}m{% endblock %}{% block foot %}M{% endblock %}",
        ),
        (
            "leaf.html",
            "{% extends 'mid.html' %}{% block head %}L{% endblock %}{% block foot %}F{% endblock %}",
        ),
    ]);
    assert_eq!(t.render("leaf.html", &json!({})).unwrap(), "L|m|F");
    assert_eq!(t.render("mid.html", &json!({})).unwrap(), "R|m|M");
    assert_eq!(t.compile("leaf.html").unwrap().chain(), vec!["leaf.html", "mid.html", "root.html"]);
}

#[test]
fn test_unmatched_overrides_and_loose_content_ignored() {
    let (_dir, t) = setup(&[
        ("base.html", "<{% block a %}A{% endblock %}>"),
        (
            "child.html",
            "{% extends base.html %}loose {{ x }}{% block zzz %}Z{% endblock %}{% block a %}{% if x %}X{% endif %}{% endblock %}",
        ),
    ]);
    assert_eq!(t.render("child.html", &json!({ "x": true })).unwrap(), "<X>");
}

#[test]
fn test_parent_sees_context() {
    let (_dir, t) = setup(&[
        ("base.html", "<title>{{ title }}</title>{% block body %}{% endblock %}"),
        (
            "child.html",
            "{% extends base.html %}{% block body %}{% for i, v of rows %}{{ i }}={{ v }};{% endfor %}{% endblock %}",
        ),
    ]);
    let html = t
        .render("child.html", &json!({ "title": "T", "rows": ["a", "b"] }))
        .unwrap();
    assert_eq!(html, "<title>T</title>0=a;1=b;");
}

#[test]
fn test_missing_parent() {
    let (_dir, t) = setup(&[("child.html", "{% extends nope.html %}")]);
    match t.render("child.html", &json!({})) {
        Err(TemplateError::TemplateNotFound(name)) => assert_eq!(name, "nope.html"),
        other => panic!("Expected TemplateNotFound, got {:?}", other),
    }
}

#[test]
fn test_inheritance_cycle() {
    let (_dir, t) = setup(&[
        ("a.html", "{% extends b.html %}"),
        ("b.html", "{% extends a.html %}"),
    ]);
    match t.render("a.html", &json!({})) {
        Err(TemplateError::Parse { template, message, .. }) => {
            assert_eq!(template, "b.html");
            assert!(message.contains("a.html -> b.html -> a.html"), "{}", message);
        }
        other => panic!("Expected Parse error, got {:?}", other),
    }
}

#[test]
fn test_compile_errors_carry_positions() {
    let (_dir, t) = setup(&[
        ("open.html", "ok\n{% block body %}never closed"),
        ("expr.html", "{% extends base.html %}{% block b %}{{ a == }}{% endblock %}"),
        ("base.html", "{% block b %}{% endblock %}"),
    ]);
    match t.render("open.html", &json!({})) {
        Err(e @ TemplateError::UnterminatedBlock { .. }) => assert_eq!(e.offset(), Some(3)),
        other => panic!("Expected UnterminatedBlock, got {:?}", other),
    }
    match t.render("expr.html", &json!({})) {
        Err(TemplateError::Expression { template, offset, .. }) => {
            assert_eq!(template, "expr.html");
            assert_eq!(offset, 36);
        }
        other => panic!("Expected Expression error, got {:?}", other),
    }
}

use std::fs;

use clap::Parser;
use tempfile::tempdir;

use armilla_cli::Args;

const SAMPLE_DIAGRAM: &str = r#"{
    "astVersion": "1.0",
    "title": "Checkout",
    "direction": "LR",
    "nodes": [
        { "id": "web", "label": "Web" },
        { "id": "api", "label": "API", "shape": "rounded" },
        { "id": "db", "label": "Orders", "shape": "cylinder" }
    ],
    "edges": [
        { "from": "web", "to": "api", "label": "HTTPS" },
        { "from": "api", "to": "db", "line": "dashed" }
    ],
    "containers": [
        {
            "id": "backend",
            "label": "Backend",
            "children": ["api", "db"],
            "collapse": { "redirectEdges": true }
        }
    ]
}"#;

fn args_for(input: &str, output: &str, extra: &[&str]) -> Args {
    let mut argv = vec!["armilla", input, "-o", output, "--log-level", "off"];
    argv.extend_from_slice(extra);
    Args::parse_from(argv)
}

#[test]
fn compiles_a_sample_diagram_to_svg() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("diagram.json");
    let output = dir.path().join("diagram.svg");
    fs::write(&input, SAMPLE_DIAGRAM).unwrap();

    let args = args_for(
        input.to_str().unwrap(),
        output.to_str().unwrap(),
        &[],
    );
    armilla_cli::run(&args).expect("sample diagram compiles");

    let svg = fs::read_to_string(&output).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("Backend"));
    assert!(svg.contains("data-node-id=\"web\""));
}

#[test]
fn strict_flag_strips_data_attributes() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("diagram.json");
    let output = dir.path().join("diagram.svg");
    fs::write(&input, SAMPLE_DIAGRAM).unwrap();

    let args = args_for(
        input.to_str().unwrap(),
        output.to_str().unwrap(),
        &["--strict"],
    );
    armilla_cli::run(&args).unwrap();

    let svg = fs::read_to_string(&output).unwrap();
    assert!(!svg.contains("data-node-id"));
}

#[test]
fn collapse_flag_collapses_the_container() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("diagram.json");
    let output = dir.path().join("diagram.svg");
    fs::write(&input, SAMPLE_DIAGRAM).unwrap();

    let args = args_for(
        input.to_str().unwrap(),
        output.to_str().unwrap(),
        &["--collapse", "backend"],
    );
    armilla_cli::run(&args).unwrap();

    let svg = fs::read_to_string(&output).unwrap();
    assert!(svg.contains("data-collapse-state=\"collapsed\""));
    assert!(!svg.contains("data-node-id=\"api\""));
}

#[test]
fn malformed_json_is_reported() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("broken.json");
    let output = dir.path().join("out.svg");
    fs::write(&input, "{ not json").unwrap();

    let args = args_for(input.to_str().unwrap(), output.to_str().unwrap(), &[]);
    let err = armilla_cli::run(&args).unwrap_err();
    assert!(err.to_string().contains("parse diagram JSON"));
}

#[test]
fn unknown_constraint_fails_with_itemized_errors() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("diagram.json");
    let output = dir.path().join("out.svg");
    fs::write(&input, SAMPLE_DIAGRAM).unwrap();

    let args = args_for(
        input.to_str().unwrap(),
        output.to_str().unwrap(),
        &["--constraint", "mindmap"],
    );
    let err = armilla_cli::run(&args).unwrap_err();
    assert!(err.to_string().contains("unknown diagram type constraint"));
    assert!(!output.exists(), "no partial output on failure");
}

//! Integration tests for the snil-graph pipeline.
//!
//! These tests drive the parser through its public API and the `snil-graph`
//! binary end to end.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use sg_core::{NodeId, NodeType, NodeTypeConfig, ParseWarningCode, ScriptEdge, SectionGraph};
use sg_parser::{LineClassifier, dialogue_line, extract_dialogues, parse, parse_with_classifier};

const TAVERN_SCRIPT: &str = "name: Tavern
Start
Show Innkeeper
Innkeeper: Welcome, traveller.
If Show Variant
Variants:
Option Rich
Option Poor
True:
Call offer_room
Jump To Upstairs
False:
Innkeeper: Out you go.
endif
Wait 1
End
---
name: Upstairs
Start
Show Bed
End
";

fn snil_graph(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_snil-graph"))
        .args(args)
        .output()
        .expect("run snil-graph")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "snil-graph failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

fn edge_pairs(section: &SectionGraph) -> Vec<(usize, usize)> {
    section
        .edges
        .iter()
        .map(|edge| (edge.from.index(), edge.to.index()))
        .collect()
}

#[test]
fn tavern_script_builds_branching_graph() {
    let result = parse(TAVERN_SCRIPT);
    assert!(result.warnings.is_empty(), "warnings: {:?}", result.warnings);
    assert_eq!(result.sections.len(), 2);

    let tavern = result.section("Tavern").expect("tavern section");
    let types: Vec<&str> = tavern.nodes.iter().map(|node| node.node_type.as_str()).collect();
    assert_eq!(
        types,
        [
            "start", "show", "dialogue", "condition", "function", "jump", "dialogue", "wait",
            "end"
        ]
    );
    assert_eq!(
        edge_pairs(tavern),
        [
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 4),
            (4, 5),
            (3, 6),
            (5, 7),
            (6, 7),
            (7, 8)
        ]
    );
    assert_eq!(
        tavern.nodes[3].content,
        "If Show Variant\nVariants:\nOption Rich\nOption Poor"
    );
}

#[test]
fn sections_restart_ids_and_never_share_edges() {
    let result = parse(TAVERN_SCRIPT);
    let upstairs = result.section("Upstairs").expect("upstairs section");
    assert_eq!(upstairs.nodes[0].id, NodeId(0));
    assert_eq!(
        upstairs.edges,
        vec![
            ScriptEdge::new(NodeId(0), NodeId(1)),
            ScriptEdge::new(NodeId(1), NodeId(2))
        ]
    );
}

#[test]
fn reparse_is_deterministic() {
    assert_eq!(parse(TAVERN_SCRIPT), parse(TAVERN_SCRIPT));
}

#[test]
fn every_section_graph_is_acyclic() {
    let result = parse(TAVERN_SCRIPT);
    for section in &result.sections {
        assert!(section.is_forward_only(), "{} has a back edge", section.name);
    }
}

#[test]
fn warnings_report_document_lines_across_sections() {
    let script = "Start\nEnd\n---\nname: Broken\nStart\nif gold\nTrue:\nif silver\nShow Coin";
    let result = parse(script);
    let found: Vec<(ParseWarningCode, usize)> = result
        .warnings
        .iter()
        .map(|warning| (warning.code, warning.line))
        .collect();
    assert_eq!(
        found,
        [
            (ParseWarningCode::NestedConditional, 8),
            (ParseWarningCode::UnterminatedConditional, 6)
        ]
    );
}

#[test]
fn custom_configuration_replaces_builtin_rules() {
    let config = NodeTypeConfig::from_json_str(
        r##"{
            "node_types": [
                {"name": "sfx", "pattern": "play\\s+", "description": "Sound effect"},
                {"name": "function_call", "pattern": "call\\s+"}
            ],
            "default_node_type": "line",
            "ignore_patterns": ["#"]
        }"##,
    )
    .expect("config parses");
    let classifier = LineClassifier::from_config(&config).expect("config compiles");
    let result = parse_with_classifier("# comment\nPlay thunder\nCall storm\nStart", &classifier);

    let types: Vec<NodeType> = result.sections[0]
        .nodes
        .iter()
        .map(|node| node.node_type.clone())
        .collect();
    assert_eq!(
        types,
        [
            NodeType::Other("sfx".to_string()),
            NodeType::Function,
            NodeType::Other("line".to_string())
        ]
    );
}

#[test]
fn dialogue_map_points_at_name_lines() {
    let entries = extract_dialogues(TAVERN_SCRIPT);
    assert_eq!(dialogue_line(&entries, "Tavern"), Some(1));
    assert_eq!(dialogue_line(&entries, "Upstairs"), Some(18));
    assert_eq!(
        TAVERN_SCRIPT.lines().nth(17),
        Some("name: Upstairs")
    );
}

#[test]
fn cli_parse_prints_summary_evidence() {
    let evidence = stdout_json(&snil_graph(&["parse", TAVERN_SCRIPT]));
    assert_eq!(evidence["section_count"], 2);
    assert_eq!(evidence["node_count"], 12);
    assert_eq!(evidence["edge_count"], 11);
    assert_eq!(evidence["warning_count"], 0);
}

#[test]
fn cli_parse_full_prints_section_graphs() {
    let sections = stdout_json(&snil_graph(&["parse", "--full", "Start\nWait 2\nEnd"]));
    assert_eq!(
        sections,
        serde_json::json!([{
            "name": "Section 1",
            "nodes": [
                {"id": "n_0", "type": "start", "content": "Start"},
                {"id": "n_1", "type": "wait", "content": "Wait 2"},
                {"id": "n_2", "type": "end", "content": "End"}
            ],
            "edges": [
                {"from_id": "n_0", "to_id": "n_1"},
                {"from_id": "n_1", "to_id": "n_2"}
            ]
        }])
    );
}

#[test]
fn cli_reads_script_from_stdin_by_default() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_snil-graph"))
        .args(["sections", "--json"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn snil-graph");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(TAVERN_SCRIPT.as_bytes())
        .expect("write script to stdin");
    let output = child.wait_with_output().expect("wait for snil-graph");

    let sections = stdout_json(&output);
    assert_eq!(sections[0]["name"], "Tavern");
    assert_eq!(sections[0]["node_count"], 9);
    assert_eq!(sections[1]["name"], "Upstairs");
}

#[test]
fn cli_reads_script_and_config_files() {
    let mut script = tempfile::NamedTempFile::new().expect("create script");
    write!(script, "Pan left\nStart").expect("write script");
    let mut config = tempfile::NamedTempFile::new().expect("create config");
    write!(
        config,
        r#"{{"node_types": [{{"name": "camera", "pattern": "pan\\s+"}}]}}"#
    )
    .expect("write config");

    let script_path = script.path().to_str().expect("utf-8 path");
    let config_path = config.path().to_str().expect("utf-8 path");
    let sections = stdout_json(&snil_graph(&[
        "parse",
        script_path,
        "--config",
        config_path,
        "--full",
    ]));
    assert_eq!(sections[0]["nodes"][0]["type"], "camera");
    assert_eq!(sections[0]["nodes"][1]["type"], "dialogue");
}

#[test]
fn cli_sections_json_lists_counts() {
    let sections = stdout_json(&snil_graph(&["sections", "--json", TAVERN_SCRIPT]));
    assert_eq!(sections[0]["name"], "Tavern");
    assert_eq!(sections[0]["node_count"], 9);
    assert_eq!(sections[0]["condition_count"], 1);
    assert_eq!(sections[1]["name"], "Upstairs");
}

#[test]
fn cli_dialogues_json_lists_entries() {
    let entries = stdout_json(&snil_graph(&["dialogues", "--json", TAVERN_SCRIPT]));
    assert_eq!(
        entries,
        serde_json::json!([
            {"line": 1, "name": "Tavern"},
            {"line": 18, "name": "Upstairs"}
        ])
    );
}

#[test]
fn cli_config_prints_builtin_defaults() {
    let config = stdout_json(&snil_graph(&["config"]));
    let expected = serde_json::to_value(NodeTypeConfig::default()).expect("serialize defaults");
    assert_eq!(config, expected);
}

#[test]
fn cli_config_rejects_invalid_patterns() {
    let mut config = tempfile::NamedTempFile::new().expect("create config");
    write!(config, r#"{{"ignore_patterns": ["(open"]}}"#).expect("write config");
    let output = snil_graph(&["config", "--config", config.path().to_str().expect("utf-8 path")]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("(open"));
}

use super::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_parse_config() {
    let content = r#"---
project:
  name: test-project

tickets:
  dir: work
  default_priority: high
---

# Config
"#;
    let config = Config::parse(content).unwrap();
    assert_eq!(config.project.name, "test-project");
    assert_eq!(config.tickets.dir, "work");
    assert_eq!(config.tickets.default_priority, Priority::High);
    assert_eq!(config.tickets.id_width, 4); // default
}

#[test]
fn test_parse_minimal_config() {
    let content = r#"---
project:
  name: minimal
---
"#;
    let config = Config::parse(content).unwrap();
    assert_eq!(config.project.name, "minimal");
    assert_eq!(config.tickets.dir, "tasks");
    assert_eq!(config.tickets.default_priority, Priority::Medium);
    assert!(config.schemas.dir.is_none());
    assert_eq!(config.workflow.self_transition, SelfTransitionPolicy::Allow);
}

#[test]
fn test_parse_without_frontmatter_fails() {
    let err = Config::parse("# just markdown\n").unwrap_err();
    assert!(err.to_string().contains("Failed to extract frontmatter"));
}

#[test]
fn test_rendered_default_parses() {
    let config = Config::parse(&Config::render_default("my: project")).unwrap();
    assert_eq!(config.project.name, "my: project");
    assert_eq!(config.tickets.dir, "tasks");
}

#[test]
fn test_invalid_id_width() {
    let content = r#"---
tickets:
  id_width: 2
---
"#;
    let err = Config::parse(content).unwrap_err();
    assert!(err.to_string().contains("id_width"));
}

/// A schemas dir whose task schema accepts the todo/doing/done statuses.
fn custom_task_statuses(root: &Path) {
    fs::create_dir_all(root.join("schemas")).unwrap();
    fs::write(
        root.join("schemas/task.json"),
        r#"{"type": "object", "properties": {"status": {"enum": ["todo", "doing", "done"]}}}"#,
    )
    .unwrap();
}

#[test]
fn test_workflow_config() {
    let tmp = TempDir::new().unwrap();
    custom_task_statuses(tmp.path());
    let content = r#"---
schemas:
  dir: schemas
workflow:
  self_transition: reject
  transitions:
    task:
      todo: [doing]
      doing: [done, todo]
---
"#;
    let config = Config::parse(content).unwrap();
    let workflow = config.workflow_validator(tmp.path()).unwrap();
    assert_eq!(workflow.policy(), SelfTransitionPolicy::Reject);
    assert!(workflow
        .validate_status_transition("task", "todo", "doing")
        .is_valid());
    assert!(!workflow
        .validate_status_transition("task", "todo", "todo")
        .is_valid());
    assert!(workflow
        .validate_status_transition("issue", "open", "in_progress")
        .is_valid());
}

#[test]
fn test_workflow_statuses_must_match_schema() {
    let tmp = TempDir::new().unwrap();
    let content = r#"---
workflow:
  transitions:
    task:
      open: [done]
---
"#;
    let config = Config::parse(content).unwrap();
    let err = config.workflow_validator(tmp.path()).unwrap_err();
    assert!(err.to_string().contains("status 'done'"), "{}", err);

    let content = r#"---
workflow:
  transitions:
    task:
      open: [completed]
      completed: [open]
---
"#;
    let config = Config::parse(content).unwrap();
    assert!(config.workflow_validator(tmp.path()).is_ok());
}

#[test]
#[serial_test::serial]
fn test_load_rejects_workflow_outside_schema() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join(".aitrackdown")).unwrap();
    fs::write(
        tmp.path().join(crate::paths::CONFIG_FILE),
        "---\nworkflow:\n  transitions:\n    epic:\n      planning: [shipped]\n---\n",
    )
    .unwrap();

    std::env::set_var(GLOBAL_CONFIG_ENV, tmp.path().join("no-global.md"));
    let result = Config::load(tmp.path());
    std::env::remove_var(GLOBAL_CONFIG_ENV);

    assert!(result.unwrap_err().to_string().contains("'shipped'"));
}

#[test]
fn test_workflow_config_unknown_type_rejected() {
    let content = r#"---
workflow:
  transitions:
    story:
      open: [closed]
---
"#;
    assert!(Config::parse(content).is_err());
}

#[test]
fn test_load_merged_no_global() {
    let tmp = TempDir::new().unwrap();
    let project_path = tmp.path().join("config.md");
    fs::write(
        &project_path,
        r#"---
project:
  name: my-project
tickets:
  id_width: 5
---
"#,
    )
    .unwrap();

    let config = Config::load_merged_from(None, &project_path).unwrap();
    assert_eq!(config.project.name, "my-project");
    assert_eq!(config.tickets.id_width, 5);
}

#[test]
fn test_load_merged_project_overrides_global() {
    let tmp = TempDir::new().unwrap();
    let global_path = tmp.path().join("global.md");
    let project_path = tmp.path().join("project.md");

    fs::write(
        &global_path,
        r#"---
project:
  description: shared
tickets:
  dir: global-tickets
  default_priority: low
  default_assignee: bot
workflow:
  self_transition: reject
  transitions:
    task:
      a: [b]
    epic:
      x: [y]
---
"#,
    )
    .unwrap();
    fs::write(
        &project_path,
        r#"---
project:
  name: proj
tickets:
  default_priority: critical
workflow:
  transitions:
    task:
      open: [closed]
---
"#,
    )
    .unwrap();

    let config = Config::load_merged_from(Some(&global_path), &project_path).unwrap();
    assert_eq!(config.project.name, "proj");
    assert_eq!(config.project.description.as_deref(), Some("shared"));
    assert_eq!(config.tickets.dir, "global-tickets");
    assert_eq!(config.tickets.default_priority, Priority::Critical);
    assert_eq!(config.tickets.default_assignee.as_deref(), Some("bot"));
    assert_eq!(config.workflow.self_transition, SelfTransitionPolicy::Reject);
    assert_eq!(
        config.workflow.transitions["task"]["open"],
        vec!["closed".to_string()]
    );
    assert!(config.workflow.transitions.contains_key("epic"));
}

#[test]
fn test_load_merged_missing_global_is_ignored() {
    let tmp = TempDir::new().unwrap();
    let project_path = tmp.path().join("project.md");
    fs::write(&project_path, "---\nproject:\n  name: p\n---\n").unwrap();

    let config =
        Config::load_merged_from(Some(&tmp.path().join("missing.md")), &project_path).unwrap();
    assert_eq!(config.project.name, "p");
}

#[test]
fn test_load_merged_missing_project_fails() {
    let tmp = TempDir::new().unwrap();
    assert!(Config::load_merged_from(None, &tmp.path().join("nope.md")).is_err());
}

#[test]
#[serial_test::serial]
fn test_global_config_path_env_override() {
    std::env::set_var(GLOBAL_CONFIG_ENV, "/tmp/aitd/global.md");
    let path = global_config_path().unwrap();
    std::env::remove_var(GLOBAL_CONFIG_ENV);
    assert_eq!(path, PathBuf::from("/tmp/aitd/global.md"));
}

#[test]
#[serial_test::serial]
fn test_load_uses_project_root() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join(".aitrackdown")).unwrap();
    fs::write(
        tmp.path().join(crate::paths::CONFIG_FILE),
        Config::render_default("rooted"),
    )
    .unwrap();

    std::env::set_var(GLOBAL_CONFIG_ENV, tmp.path().join("no-global.md"));
    let config = Config::load(tmp.path());
    std::env::remove_var(GLOBAL_CONFIG_ENV);

    let config = config.unwrap();
    assert_eq!(config.project.name, "rooted");
    assert_eq!(config.tickets_dir(tmp.path()), tmp.path().join("tasks"));
}

#[test]
fn test_get_dotted_key() {
    let config = Config::parse(&Config::render_default("demo")).unwrap();
    assert_eq!(config.get("project.name").unwrap(), Some(Value::from("demo")));
    assert_eq!(config.get("tickets.id_width").unwrap(), Some(Value::from(4)));
    assert_eq!(config.get("tickets.nope").unwrap(), None);
    assert!(config.get("tickets").unwrap().unwrap().is_object());
}

#[test]
fn test_entries_are_dotted_leaves() {
    let config = Config::parse(&Config::render_default("demo")).unwrap();
    let entries = config.entries().unwrap();
    let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
    assert!(keys.contains(&"project.name"));
    assert!(keys.contains(&"tickets.id_width"));
    assert!(keys.contains(&"workflow.self_transition"));
    assert!(!keys.contains(&"tickets"));

    let width = entries.iter().find(|(k, _)| k == "tickets.id_width").unwrap();
    assert_eq!(width.1, Value::from(4));
}

#[test]
fn test_schema_dir_is_used() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("schemas")).unwrap();
    fs::write(
        tmp.path().join("schemas/task.json"),
        r#"{"type": "object", "required": ["owner"]}"#,
    )
    .unwrap();

    let config = Config::parse("---\nschemas:\n  dir: schemas\n---\n").unwrap();
    let validator = config.schema_validator(tmp.path());
    let result = validator
        .validate_ticket(&serde_json::json!({"id": "TSK-0001"}), "task")
        .unwrap();
    assert!(!result.is_valid());
    assert!(result.errors()[0].contains("owner"));
}

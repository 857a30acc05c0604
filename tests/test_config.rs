//! The shipped config/default.toml must load cleanly.

use std::path::Path;

use tutor_bot::config;

#[test]
fn test_default_config_parses() {
    let cfg = config::load_from(Path::new("config/default.toml"), Some("/tmp/tutor-test"), None)
        .expect("default.toml should load");
    assert_eq!(cfg.app_name, "tutor-bot");
    assert_eq!(cfg.work_dir, Path::new("/tmp/tutor-test"));
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.http.bind, "127.0.0.1:8080");
    assert_eq!(cfg.llm.provider, "dummy");
    assert_eq!(cfg.llm.openai.max_tokens, 512);
    assert!(!cfg.render.escape_html);
}

#[test]
fn test_default_config_prompts_dir_is_relative_to_file() {
    let cfg = config::load_from(Path::new("config/default.toml"), Some("/tmp/tutor-test"), None)
        .unwrap();
    assert_eq!(cfg.prompts_dir.as_deref(), Some(Path::new("config/prompts")));
}

#[test]
fn test_log_level_override() {
    let cfg = config::load_from(Path::new("config/default.toml"), Some("/tmp/tutor-test"), Some("debug"))
        .unwrap();
    assert_eq!(cfg.log_level, "debug");
}

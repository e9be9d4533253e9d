use std::path::PathBuf;

use gemtalk::config::{
    ConfigFlags, ThemeMode, load_config_flags, parse_flag_tokens, resolve_api_key,
};

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".gemtalkrc");
    let content = r#"
# comment
--no-welcome

--theme light

--log-file=chat.log
--history 8
"#;
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert!(flags.no_welcome);
    assert_eq!(flags.theme, Some(ThemeMode::Light));
    assert_eq!(flags.log_file, Some(PathBuf::from("chat.log")));
    assert_eq!(flags.history, Some(8));
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".gemtalkrc");
    let content = "--no-welcome\n--theme light\n--log-file file.log\n--model gemini-2.5-pro\n";
    std::fs::write(&path, content).unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_args = vec![
        "gemtalk".to_string(),
        "--theme".to_string(),
        "dark".to_string(),
        "--history".to_string(),
        "4".to_string(),
    ];
    let cli_flags = parse_flag_tokens(&cli_args).unwrap();

    let effective = file_flags.union(&cli_flags);
    assert!(effective.no_welcome, "file flags should remain enabled");
    assert_eq!(effective.history, Some(4), "cli flags should be applied");
    assert_eq!(effective.theme, Some(ThemeMode::Dark), "cli should override theme");
    assert_eq!(
        effective.log_file,
        Some(PathBuf::from("file.log")),
        "file config should be preserved when CLI does not override"
    );
    assert_eq!(effective.model.as_deref(), Some("gemini-2.5-pro"));
}

#[test]
fn test_global_local_cli_precedence() {
    let dir = tempfile::tempdir().unwrap();
    let global = dir.path().join("config");
    let local = dir.path().join(".gemtalkrc");
    std::fs::write(&global, "--history 30\n--timeout 45\n--model global-model\n").unwrap();
    std::fs::write(&local, "--history 10\n").unwrap();

    let file_flags = load_config_flags(&global)
        .unwrap()
        .union(&load_config_flags(&local).unwrap());
    let cli_flags = parse_flag_tokens(&["--model=cli-model".to_string()]).unwrap();
    let effective = file_flags.union(&cli_flags);

    assert_eq!(effective.history, Some(10));
    assert_eq!(effective.timeout_secs, Some(45));
    assert_eq!(effective.model.as_deref(), Some("cli-model"));
}

#[test]
fn test_invalid_history_in_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".gemtalkrc");
    std::fs::write(&path, "--history -5\n").unwrap();

    let err = load_config_flags(&path).unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("Invalid config"), "{chain}");
    assert!(chain.contains("must not be negative"), "{chain}");
}

#[test]
fn test_missing_config_file_is_default() {
    let dir = tempfile::tempdir().unwrap();
    let flags = load_config_flags(&dir.path().join("absent")).unwrap();
    assert_eq!(flags, ConfigFlags::default());
}

#[test]
fn test_api_key_falls_back_to_credentials_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    assert_eq!(resolve_api_key(None, &path).unwrap(), None);

    std::fs::write(&path, r#"{ "ApiKey": "abc123" }"#).unwrap();
    assert_eq!(resolve_api_key(None, &path).unwrap().as_deref(), Some("abc123"));
}

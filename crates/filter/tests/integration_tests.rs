//! 통합 테스트 — 규칙 파일 작성부터 분류까지의 전체 흐름 검증
//!
//! 실제 파일시스템(tempdir)에 logcheck 스타일 규칙 트리를 만들어
//! 로더 → 엔진 → 스테이지 경로를 검증합니다.

use std::path::{Path, PathBuf};

use logwarden_core::types::LogRecord;
use logwarden_filter::{
    FilterConfigBuilder, FilterStage, RuleEngine, RuleKind, RuleLoader, RuleSource,
};

async fn write_rules(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.expect("create rule dir");
    }
    tokio::fs::write(&path, content).await.expect("write rule file");
    path
}

/// sshd 노이즈 무시 규칙과 로그인 실패 탐지 규칙이 겹치면 알림이 이깁니다.
#[tokio::test]
async fn security_rule_beats_overlapping_ignore_rule() {
    let dir = tempfile::tempdir().unwrap();
    let ignore = write_rules(dir.path(), "ignore.d/sshd", "^.*sshd.*$\n").await;
    let cracking =
        write_rules(dir.path(), "cracking.d/ssh", "^.*Failed password.*$\n").await;

    let loader = RuleLoader::new();
    let mut engine = RuleEngine::new();
    engine.add_rule_set(loader.load_file(&ignore, None).await.unwrap());
    engine.add_rule_set(loader.load_file(&cracking, None).await.unwrap());

    let decision =
        engine.filter("web-01 sshd[412]: Failed password for root from 10.0.0.7 port 22");
    assert!(decision.is_alert());
    assert_eq!(decision.rule().unwrap().kind(), RuleKind::Cracking);
}

/// ignore 규칙만 매칭되면 드롭, 아무것도 매칭되지 않으면 통과입니다.
#[tokio::test]
async fn ignore_only_and_no_match_paths() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rules(
        dir.path(),
        "ignore.d/systemd",
        "^.*systemd.*Started.*$\n",
    )
    .await;

    let loader = RuleLoader::new();
    let mut engine = RuleEngine::new();
    engine.add_rule_set(loader.load_file(&path, None).await.unwrap());

    let decision = engine.filter("host systemd[1]: Started nginx.service.");
    assert!(decision.is_ignore());

    let decision = engine.filter("host myapp: started fine");
    assert!(decision.is_pass());
    assert!(decision.rule().is_none());
}

/// cracking.d 경로에서 규칙 종류가 자동 감지됩니다.
#[tokio::test]
async fn kind_autodetected_from_path_convention() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rules(dir.path(), "cracking.d/ssh", "Invalid user\n").await;

    let set = RuleLoader::new().load_file(&path, None).await.unwrap();
    assert_eq!(set.kind(), RuleKind::Cracking);
}

/// 잘못된 패턴 2줄이 섞인 5줄짜리 파일은 3개 규칙으로 로드됩니다.
#[tokio::test]
async fn malformed_patterns_are_skipped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rules(
        dir.path(),
        "violations.d/mixed",
        "valid_pattern\n[unterminated\nanother_valid\n(unclosed\nthird_valid\n",
    )
    .await;

    let set = RuleLoader::new().load_file(&path, None).await.unwrap();
    assert_eq!(set.len(), 3);
    let patterns: Vec<_> = set.rules().iter().map(|r| r.raw_pattern()).collect();
    assert_eq!(patterns, vec!["valid_pattern", "another_valid", "third_valid"]);
    // 살아남은 규칙의 라인 번호는 원본 파일 기준
    assert_eq!(set.rules()[1].line_number(), 3);
}

/// 주석과 빈 줄만 있는 파일은 에러가 아니라 빈 집합입니다.
#[tokio::test]
async fn comment_only_file_yields_empty_set() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rules(
        dir.path(),
        "ignore.d/comments",
        "# header comment\n\n   \n# another comment\n",
    )
    .await;

    let set = RuleLoader::new().load_file(&path, None).await.unwrap();
    assert_eq!(set.len(), 0);
}

/// 규칙이 하나도 없으면 모든 라인이 통과로 집계됩니다.
#[tokio::test]
async fn empty_engine_passes_everything() {
    let mut engine = RuleEngine::new();
    for i in 0..1000 {
        let line = format!("arbitrary log line {i}");
        assert!(engine.filter(&line).is_pass());
    }
    assert_eq!(engine.statistics().passed_messages, 1000);
    assert_eq!(engine.total_rule_count(), 0);
}

/// 설정 → 스테이지 → 레코드 주석까지의 전체 흐름.
#[tokio::test]
async fn stage_annotates_and_drops_per_config() {
    let dir = tempfile::tempdir().unwrap();
    write_rules(dir.path(), "rules.d/ignore.d/cron", "^.*CRON.*$\n").await;
    write_rules(
        dir.path(),
        "rules.d/cracking.d/ssh",
        "^.*Failed password.*$\n",
    )
    .await;

    let config = FilterConfigBuilder::new()
        .source(RuleSource::new(dir.path().join("rules.d")).with_recursive(true))
        .field_prefix("warden")
        .build()
        .unwrap();

    let mut stage = FilterStage::from_config(&config).await.unwrap();
    assert_eq!(stage.engine().rule_set_count(), 2);

    // 드롭
    let dropped = stage.apply(LogRecord::new("syslog", "CRON[1]: session opened"));
    assert!(dropped.is_none());

    // 알림 + 주석
    let alerted = stage
        .apply(LogRecord::new(
            "syslog",
            "sshd[2]: Failed password for invalid user admin",
        ))
        .expect("alert keeps record");
    assert_eq!(alerted.field("warden_alert"), Some("true"));
    assert_eq!(alerted.field("warden_rule_kind"), Some("cracking"));
    assert!(
        alerted
            .field("warden_rule_source")
            .unwrap()
            .contains("cracking.d")
    );

    // 통과
    let passed = stage
        .apply(LogRecord::new("syslog", "nginx: GET /healthz 200"))
        .expect("pass keeps record");
    assert!(passed.fields.is_empty());

    let stats = stage.engine().statistics();
    assert_eq!(stats.total_messages, 3);
    assert_eq!(stats.ignored_messages, 1);
    assert_eq!(stats.alert_messages, 1);
    assert_eq!(stats.passed_messages, 1);
}

/// 파일당 규칙 상한이 설정에서 로더까지 전달됩니다.
#[tokio::test]
async fn max_rules_cap_flows_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let many = (0..50)
        .map(|i| format!("pattern_{i}"))
        .collect::<Vec<_>>()
        .join("\n");
    write_rules(dir.path(), "ignore.d/many", &many).await;

    let config = FilterConfigBuilder::new()
        .source(RuleSource::new(dir.path().join("ignore.d")))
        .max_rules_per_file(10)
        .build()
        .unwrap();

    let mut engine = RuleEngine::new();
    let loaded = engine.load_sources(&config).await.unwrap();
    assert_eq!(loaded, 10);
    assert_eq!(engine.total_rule_count(), 10);
}

/// 존재하지 않는 소스 루트는 하드 실패로 전파됩니다.
#[tokio::test]
async fn missing_source_root_is_a_hard_error() {
    let config = FilterConfigBuilder::new()
        .source(RuleSource::new("/definitely/not/here"))
        .build()
        .unwrap();

    let mut engine = RuleEngine::new();
    assert!(engine.load_sources(&config).await.is_err());
}

/// 디렉토리 스캔은 백업/닷파일/문서 파일을 건너뛰고도 계속됩니다.
#[tokio::test]
async fn directory_scan_survives_junk_files() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("ignore.d");
    tokio::fs::create_dir(&root).await.unwrap();
    write_rules(dir.path(), "ignore.d/sshd", "sshd\n").await;
    write_rules(dir.path(), "ignore.d/sshd.bak", "stale\n").await;
    write_rules(dir.path(), "ignore.d/.swp", "junk\n").await;
    write_rules(dir.path(), "ignore.d/README.md", "# docs\n").await;

    let sets = RuleLoader::new().load_directory(&root, None).await.unwrap();
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].len(), 1);
}

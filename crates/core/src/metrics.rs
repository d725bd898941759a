//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`
//! 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `logwarden_`
//! - 모듈명: `filter_`
//! - 접미어: `_total` (counter), 없음 (gauge)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 규칙 종류 레이블 키 (ignore, cracking, violations)
pub const LABEL_RULE_KIND: &str = "kind";

// ─── Filter 메트릭 ─────────────────────────────────────────────────

/// Filter: 평가된 전체 메시지 수 (counter)
pub const FILTER_MESSAGES_TOTAL: &str = "logwarden_filter_messages_total";

/// Filter: ignore 규칙으로 드롭된 메시지 수 (counter)
pub const FILTER_IGNORED_TOTAL: &str = "logwarden_filter_ignored_total";

/// Filter: 알림으로 분류된 메시지 수 (counter)
pub const FILTER_ALERTS_TOTAL: &str = "logwarden_filter_alerts_total";

/// Filter: 어떤 규칙에도 매칭되지 않은 메시지 수 (counter)
pub const FILTER_PASSED_TOTAL: &str = "logwarden_filter_passed_total";

/// Filter: 규칙 종류별 매칭 수 (counter, label: kind)
pub const FILTER_RULE_MATCHES_TOTAL: &str = "logwarden_filter_rule_matches_total";

/// Filter: 로드된 규칙 수 (gauge)
pub const FILTER_RULES_LOADED: &str = "logwarden_filter_rules_loaded";

/// Filter: 로딩 중 건너뛴 잘못된 패턴 수 (counter)
pub const FILTER_INVALID_PATTERNS_TOTAL: &str = "logwarden_filter_invalid_patterns_total";

/// 모든 메트릭의 설명을 recorder에 등록합니다.
///
/// recorder 설치 직후 한 번 호출하세요. recorder가 없으면 no-op입니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge};

    describe_counter!(FILTER_MESSAGES_TOTAL, "Total messages evaluated by the filter");
    describe_counter!(FILTER_IGNORED_TOTAL, "Messages dropped by ignore rules");
    describe_counter!(FILTER_ALERTS_TOTAL, "Messages classified as alerts");
    describe_counter!(FILTER_PASSED_TOTAL, "Messages that matched no rule");
    describe_counter!(
        FILTER_RULE_MATCHES_TOTAL,
        "Rule matches by kind, regardless of final disposition"
    );
    describe_gauge!(FILTER_RULES_LOADED, "Rules currently loaded in the engine");
    describe_counter!(
        FILTER_INVALID_PATTERNS_TOTAL,
        "Rule lines skipped at load time due to invalid patterns"
    );
}

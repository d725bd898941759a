//! 규칙 엔진 — logcheck 스타일 규칙 로딩 및 우선순위 매칭
//!
//! 규칙 파일(`ignore` / `cracking` / `violations`)을 로드하여 입력 라인을
//! 하나의 [`FilterDecision`]으로 분류합니다.
//!
//! # 규칙 파일 형식
//! ```text
//! # SSH 로그인 실패 탐지
//! ^.*sshd\[\d+\]: Failed password.*$
//! ^.*sshd\[\d+\]: Invalid user.*$
//! ```
//!
//! # 아키텍처
//! - [`RuleEngine`]: 규칙 집합 관리, 우선순위 해소, 통계
//! - [`loader`]: 규칙 파일/디렉토리 로딩 및 종류 자동 감지
//! - [`set`]: 파일 단위 규칙 집합 (first-match 질의)
//! - [`types`]: 규칙 데이터 구조 정의

pub mod loader;
pub mod set;
pub mod types;

pub use loader::RuleLoader;
pub use set::RuleSet;
pub use types::{Rule, RuleKind, RuleMetadata};

use std::collections::HashMap;

use serde::Serialize;

use logwarden_core::metrics as m;

use crate::config::FilterConfig;
use crate::decision::FilterDecision;
use crate::error::FilterError;

/// 규칙 종류 우선순위 — 높은 것부터 나열한 순열
///
/// 여러 종류의 규칙이 같은 라인에 매칭될 때 하나의 처분을 고르는 고정
/// 순위입니다. 세 종류를 정확히 한 번씩 포함해야 하며, 설정 시점에
/// 즉시 검증됩니다.
#[derive(Debug, Clone)]
pub struct Precedence {
    order: Vec<RuleKind>,
}

impl Default for Precedence {
    /// logcheck 관례: `cracking > violations > ignore`
    fn default() -> Self {
        Self {
            order: vec![RuleKind::Cracking, RuleKind::Violations, RuleKind::Ignore],
        }
    }
}

impl Precedence {
    /// 우선순위 목록을 검증하고 생성합니다.
    ///
    /// # Errors
    /// 목록이 비었거나, 중복이 있거나, 세 종류를 모두 포함하지 않으면
    /// [`FilterError::Precedence`]입니다.
    pub fn new(order: Vec<RuleKind>) -> Result<Self, FilterError> {
        if order.is_empty() {
            return Err(FilterError::Precedence {
                reason: "precedence must not be empty".to_owned(),
            });
        }
        for (idx, kind) in order.iter().enumerate() {
            if order[..idx].contains(kind) {
                return Err(FilterError::Precedence {
                    reason: format!("duplicate rule kind '{kind}'"),
                });
            }
        }
        for kind in RuleKind::ALL {
            if !order.contains(&kind) {
                return Err(FilterError::Precedence {
                    reason: format!("missing rule kind '{kind}'"),
                });
            }
        }
        Ok(Self { order })
    }

    /// 설정 파일의 이름 목록에서 우선순위를 생성합니다.
    pub fn from_names(names: &[String]) -> Result<Self, FilterError> {
        let order = names
            .iter()
            .map(|name| name.parse::<RuleKind>())
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(order)
    }

    /// 순위를 반환합니다 (0이 최고 순위).
    ///
    /// 순열임이 생성 시 보장되므로 모든 종류에 대해 정의됩니다.
    pub fn rank(&self, kind: RuleKind) -> usize {
        self.order
            .iter()
            .position(|k| *k == kind)
            .unwrap_or(self.order.len())
    }

    /// 우선순위 순서 (높은 것부터)
    pub fn order(&self) -> &[RuleKind] {
        &self.order
    }
}

/// 필터 통계 스냅샷
///
/// 카운터는 리셋 사이에 단조 증가합니다. `rule_matches`는 최종 처분과
/// 무관하게, 매칭이 발생한 모든 규칙 집합의 종류별로 집계됩니다.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilterStats {
    /// 평가된 전체 메시지 수
    pub total_messages: u64,
    /// ignore로 드롭된 메시지 수
    pub ignored_messages: u64,
    /// 알림으로 분류된 메시지 수
    pub alert_messages: u64,
    /// 어떤 규칙에도 매칭되지 않은 메시지 수
    pub passed_messages: u64,
    /// 규칙 종류별 매칭 수
    pub rule_matches: HashMap<RuleKind, u64>,
}

/// 규칙 엔진 — 규칙 집합 관리 및 우선순위 매칭 코디네이터
///
/// 로드된 모든 규칙 집합에 대해 입력 라인을 평가하고, 고정 우선순위로
/// 단일 처분을 결정합니다.
///
/// # 동시성
/// `filter()`는 내부 잠금 없이 통계 카운터를 갱신하므로 엔진 하나를
/// 스레드 간에 공유할 수 없습니다. 워커마다 독립 인스턴스를 두거나
/// 외부에서 동기화하세요.
///
/// # 사용 예시
/// ```ignore
/// let mut engine = RuleEngine::new();
/// engine.load_sources(&filter_config).await?;
///
/// let decision = engine.filter("sshd[1]: Failed password for root");
/// if decision.is_alert() { /* 알림 처리 */ }
/// ```
pub struct RuleEngine {
    /// 로드된 규칙 집합 (삽입 순서 유지 — 동률 해소에 관여)
    rule_sets: Vec<RuleSet>,
    /// 종류 우선순위
    precedence: Precedence,
    /// 누적 통계
    stats: FilterStats,
}

impl RuleEngine {
    /// 기본 우선순위(`cracking > violations > ignore`)의 엔진을 생성합니다.
    pub fn new() -> Self {
        Self::with_precedence(Precedence::default())
    }

    /// 지정한 우선순위의 엔진을 생성합니다.
    pub fn with_precedence(precedence: Precedence) -> Self {
        Self {
            rule_sets: Vec::new(),
            precedence,
            stats: FilterStats::default(),
        }
    }

    /// 규칙 집합을 추가합니다. 같은 종류의 집합 간 병합/중복 제거는 없습니다.
    pub fn add_rule_set(&mut self, set: RuleSet) {
        self.rule_sets.push(set);
        metrics::gauge!(m::FILTER_RULES_LOADED).set(self.total_rule_count() as f64);
    }

    /// 여러 규칙 집합을 순서대로 추가합니다.
    pub fn add_rule_sets(&mut self, sets: impl IntoIterator<Item = RuleSet>) {
        for set in sets {
            self.add_rule_set(set);
        }
    }

    /// 모든 규칙 집합을 제거합니다. 통계는 별도 관심사이므로 유지됩니다.
    pub fn clear_rule_sets(&mut self) {
        self.rule_sets.clear();
        metrics::gauge!(m::FILTER_RULES_LOADED).set(0.0);
    }

    /// 로드된 규칙 집합 수
    pub fn rule_set_count(&self) -> usize {
        self.rule_sets.len()
    }

    /// 전체 규칙 수
    pub fn total_rule_count(&self) -> usize {
        self.rule_sets.iter().map(RuleSet::len).sum()
    }

    /// 규칙 집합 슬라이스 (열거/진단용 — 매칭 의미에는 순서가 동률
    /// 해소 외에 영향을 주지 않습니다)
    pub fn rule_sets(&self) -> &[RuleSet] {
        &self.rule_sets
    }

    /// 설정의 모든 규칙 소스를 로드하여 엔진에 추가합니다.
    ///
    /// 로드된 규칙 수를 반환합니다. 소스 루트가 없으면
    /// [`FilterError::FileNotFound`]로 전파됩니다 — 그대로 진행할지는
    /// 호출자가 결정합니다. 디렉토리 내부의 개별 파일 실패는 로더가
    /// 흡수합니다.
    pub async fn load_sources(&mut self, config: &FilterConfig) -> Result<usize, FilterError> {
        let mut loaded = 0usize;

        for source in &config.sources {
            let loader = RuleLoader::new()
                .with_max_rules(config.max_rules_per_file)
                .with_recursive(source.recursive.unwrap_or(config.recursive_scan));

            let metadata = tokio::fs::metadata(&source.path).await.map_err(|_| {
                FilterError::FileNotFound {
                    path: source.path.display().to_string(),
                }
            })?;

            if metadata.is_dir() {
                let sets = loader.load_directory(&source.path, source.kind).await?;
                for set in sets {
                    loaded += set.len();
                    self.add_rule_set(set);
                }
            } else {
                let set = loader.load_file(&source.path, source.kind).await?;
                if !set.is_empty() {
                    loaded += set.len();
                    self.add_rule_set(set);
                }
            }
        }

        tracing::info!(
            rules = loaded,
            sets = self.rule_set_count(),
            "rule sources loaded"
        );
        Ok(loaded)
    }

    /// 입력 라인을 분류합니다.
    ///
    /// 모든 규칙 집합의 first-match를 수집한 뒤, 고정 우선순위에서 가장
    /// 높은 종류의 규칙을 선택합니다. 같은 최고 순위 종류의 집합이 여럿
    /// 매칭되면 먼저 추가된 집합이 이깁니다 — 삽입 순서에 의존하는 의도된
    /// 동작입니다. 매칭 중 내부 에러가 난 집합은 경고 후 매칭 없음으로
    /// 취급합니다 (fail open).
    pub fn filter(&mut self, text: &str) -> FilterDecision<'_> {
        self.stats.total_messages += 1;
        metrics::counter!(m::FILTER_MESSAGES_TOTAL).increment(1);

        let mut winner: Option<(usize, &Rule)> = None;

        for set in &self.rule_sets {
            let hit = match set.first_match(text) {
                Ok(Some(rule)) => rule,
                Ok(None) => continue,
                Err(e) => {
                    // 로드 시 사전 컴파일을 통과한 규칙은 여기 오지 않음
                    tracing::warn!(
                        source = %set.source_path().display(),
                        error = %e,
                        "rule match failed, treating set as no-match"
                    );
                    continue;
                }
            };

            // 최종 처분과 무관하게 모든 매칭을 집계
            *self.stats.rule_matches.entry(hit.kind()).or_insert(0) += 1;
            metrics::counter!(
                m::FILTER_RULE_MATCHES_TOTAL,
                m::LABEL_RULE_KIND => hit.kind().as_str()
            )
            .increment(1);

            let rank = self.precedence.rank(hit.kind());
            let better = match winner {
                Some((best_rank, _)) => rank < best_rank,
                None => true,
            };
            if better {
                winner = Some((rank, hit));
            }
        }

        match winner {
            None => {
                self.stats.passed_messages += 1;
                metrics::counter!(m::FILTER_PASSED_TOTAL).increment(1);
                FilterDecision::pass(text)
            }
            Some((_, rule)) => {
                let decision = FilterDecision::matched(rule, text);
                if decision.is_alert() {
                    self.stats.alert_messages += 1;
                    metrics::counter!(m::FILTER_ALERTS_TOTAL).increment(1);
                } else {
                    self.stats.ignored_messages += 1;
                    metrics::counter!(m::FILTER_IGNORED_TOTAL).increment(1);
                }
                decision
            }
        }
    }

    /// 통계 스냅샷을 반환합니다. 이후 엔진 상태 변화의 영향을 받지 않습니다.
    pub fn statistics(&self) -> FilterStats {
        self.stats.clone()
    }

    /// 종류별 매칭 맵을 포함한 모든 카운터를 0으로 리셋합니다.
    pub fn reset_statistics(&mut self) {
        self.stats = FilterStats::default();
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_with(kind: RuleKind, source: &str, patterns: &[&str]) -> RuleSet {
        let mut set = RuleSet::new(kind, source);
        for (idx, p) in patterns.iter().enumerate() {
            set.push(Rule::new(*p, kind, source, idx + 1));
        }
        set
    }

    #[test]
    fn engine_starts_empty() {
        let engine = RuleEngine::new();
        assert_eq!(engine.rule_set_count(), 0);
        assert_eq!(engine.total_rule_count(), 0);
    }

    #[test]
    fn no_rules_means_pass() {
        let mut engine = RuleEngine::new();
        let decision = engine.filter("anything at all");
        assert!(decision.is_pass());
        assert!(decision.rule().is_none());
    }

    #[test]
    fn unmatched_line_passes() {
        let mut engine = RuleEngine::new();
        engine.add_rule_set(set_with(RuleKind::Ignore, "/r/ignore.d/a", &["systemd"]));
        let decision = engine.filter("myapp: started fine");
        assert!(decision.is_pass());
    }

    #[test]
    fn ignore_match_yields_ignore() {
        let mut engine = RuleEngine::new();
        engine.add_rule_set(set_with(
            RuleKind::Ignore,
            "/r/ignore.d/systemd",
            &["^.*systemd.*Started.*$"],
        ));
        let decision = engine.filter("host systemd[1]: Started nginx.service.");
        assert!(decision.is_ignore());
        assert_eq!(decision.rule().unwrap().kind(), RuleKind::Ignore);
    }

    #[test]
    fn cracking_beats_ignore_regardless_of_insertion_order() {
        let text = "host sshd[1]: Failed password for root from 10.0.0.1";

        for flipped in [false, true] {
            let ignore = set_with(RuleKind::Ignore, "/r/ignore.d/sshd", &["^.*sshd.*$"]);
            let cracking = set_with(
                RuleKind::Cracking,
                "/r/cracking.d/ssh",
                &["^.*Failed password.*$"],
            );

            let mut engine = RuleEngine::new();
            if flipped {
                engine.add_rule_sets([cracking, ignore]);
            } else {
                engine.add_rule_sets([ignore, cracking]);
            }

            let decision = engine.filter(text);
            assert!(decision.is_alert(), "flipped={flipped}");
            assert_eq!(decision.rule().unwrap().kind(), RuleKind::Cracking);
        }
    }

    #[test]
    fn precedence_is_pairwise_transitive() {
        // cracking > violations, violations > ignore, cracking > ignore
        let cases = [
            (RuleKind::Cracking, RuleKind::Violations, RuleKind::Cracking),
            (RuleKind::Violations, RuleKind::Ignore, RuleKind::Violations),
            (RuleKind::Cracking, RuleKind::Ignore, RuleKind::Cracking),
        ];
        for (a, b, expected) in cases {
            let mut engine = RuleEngine::new();
            engine.add_rule_set(set_with(a, "/r/a", &["match"]));
            engine.add_rule_set(set_with(b, "/r/b", &["match"]));
            let decision = engine.filter("this should match");
            assert_eq!(decision.rule().unwrap().kind(), expected, "{a} vs {b}");
        }
    }

    #[test]
    fn same_kind_tie_resolved_by_insertion_order() {
        let mut engine = RuleEngine::new();
        engine.add_rule_set(set_with(RuleKind::Cracking, "/r/first", &["match"]));
        engine.add_rule_set(set_with(RuleKind::Cracking, "/r/second", &["match"]));

        let decision = engine.filter("match this");
        assert!(
            decision
                .rule()
                .unwrap()
                .source_file()
                .ends_with("first")
        );
    }

    #[test]
    fn custom_precedence_reverses_outcome() {
        let precedence = Precedence::new(vec![
            RuleKind::Ignore,
            RuleKind::Violations,
            RuleKind::Cracking,
        ])
        .unwrap();
        let mut engine = RuleEngine::with_precedence(precedence);
        engine.add_rule_set(set_with(RuleKind::Cracking, "/r/c", &["match"]));
        engine.add_rule_set(set_with(RuleKind::Ignore, "/r/i", &["match"]));

        let decision = engine.filter("match");
        assert!(decision.is_ignore());
    }

    #[test]
    fn statistics_account_for_every_outcome() {
        let mut engine = RuleEngine::new();
        engine.add_rule_set(set_with(RuleKind::Ignore, "/r/i", &["noise"]));
        engine.add_rule_set(set_with(RuleKind::Cracking, "/r/c", &["attack"]));

        // 2 ignore, 3 alert, 1 pass
        engine.filter("noise line");
        engine.filter("more noise");
        engine.filter("attack detected");
        engine.filter("attack again");
        engine.filter("attack once more");
        engine.filter("clean line");

        let stats = engine.statistics();
        assert_eq!(stats.total_messages, 6);
        assert_eq!(stats.ignored_messages, 2);
        assert_eq!(stats.alert_messages, 3);
        assert_eq!(stats.passed_messages, 1);
        assert_eq!(stats.rule_matches.get(&RuleKind::Ignore), Some(&2));
        assert_eq!(stats.rule_matches.get(&RuleKind::Cracking), Some(&3));
    }

    #[test]
    fn overlapping_match_counts_both_kinds() {
        // 두 집합 모두 매칭되면 처분과 무관하게 둘 다 집계됨
        let mut engine = RuleEngine::new();
        engine.add_rule_set(set_with(RuleKind::Ignore, "/r/i", &["sshd"]));
        engine.add_rule_set(set_with(RuleKind::Cracking, "/r/c", &["sshd"]));

        engine.filter("sshd: something");

        let stats = engine.statistics();
        assert_eq!(stats.rule_matches.get(&RuleKind::Ignore), Some(&1));
        assert_eq!(stats.rule_matches.get(&RuleKind::Cracking), Some(&1));
        assert_eq!(stats.alert_messages, 1);
        assert_eq!(stats.ignored_messages, 0);
    }

    #[test]
    fn reset_statistics_zeroes_everything() {
        let mut engine = RuleEngine::new();
        engine.add_rule_set(set_with(RuleKind::Ignore, "/r/i", &["x"]));
        engine.filter("x");
        engine.filter("y");

        engine.reset_statistics();
        let stats = engine.statistics();
        assert_eq!(stats.total_messages, 0);
        assert_eq!(stats.ignored_messages, 0);
        assert_eq!(stats.alert_messages, 0);
        assert_eq!(stats.passed_messages, 0);
        assert!(stats.rule_matches.is_empty());
    }

    #[test]
    fn statistics_snapshot_is_detached() {
        let mut engine = RuleEngine::new();
        engine.filter("a");
        let snapshot = engine.statistics();
        engine.filter("b");
        assert_eq!(snapshot.total_messages, 1);
        assert_eq!(engine.statistics().total_messages, 2);
    }

    #[test]
    fn clear_rule_sets_keeps_statistics() {
        let mut engine = RuleEngine::new();
        engine.add_rule_set(set_with(RuleKind::Ignore, "/r/i", &["x"]));
        engine.filter("x");

        engine.clear_rule_sets();
        assert_eq!(engine.rule_set_count(), 0);
        assert_eq!(engine.statistics().total_messages, 1);
        assert_eq!(engine.statistics().ignored_messages, 1);
    }

    #[test]
    fn thousand_lines_with_no_rules_all_pass() {
        let mut engine = RuleEngine::new();
        for i in 0..1000 {
            let line = format!("line number {i}");
            let decision = engine.filter(&line);
            assert!(decision.is_pass());
        }
        assert_eq!(engine.statistics().passed_messages, 1000);
        assert_eq!(engine.total_rule_count(), 0);
    }

    // --- Precedence 검증 ---

    #[test]
    fn precedence_default_order() {
        let p = Precedence::default();
        assert_eq!(
            p.order(),
            &[RuleKind::Cracking, RuleKind::Violations, RuleKind::Ignore]
        );
        assert_eq!(p.rank(RuleKind::Cracking), 0);
        assert_eq!(p.rank(RuleKind::Ignore), 2);
    }

    #[test]
    fn precedence_rejects_empty() {
        assert!(matches!(
            Precedence::new(vec![]),
            Err(FilterError::Precedence { .. })
        ));
    }

    #[test]
    fn precedence_rejects_duplicates() {
        let result = Precedence::new(vec![
            RuleKind::Cracking,
            RuleKind::Cracking,
            RuleKind::Ignore,
        ]);
        assert!(matches!(result, Err(FilterError::Precedence { .. })));
    }

    #[test]
    fn precedence_rejects_missing_kind() {
        let result = Precedence::new(vec![RuleKind::Cracking, RuleKind::Ignore]);
        assert!(matches!(result, Err(FilterError::Precedence { .. })));
    }

    #[test]
    fn precedence_from_names() {
        let names: Vec<String> = ["violations", "cracking", "ignore"]
            .iter()
            .map(|s| (*s).to_owned())
            .collect();
        let p = Precedence::from_names(&names).unwrap();
        assert_eq!(p.rank(RuleKind::Violations), 0);
    }

    #[test]
    fn precedence_from_names_rejects_unknown() {
        let names = vec!["cracking".to_owned(), "noise".to_owned()];
        assert!(matches!(
            Precedence::from_names(&names),
            Err(FilterError::UnknownKind { .. })
        ));
    }
}

//! 필터 결정 — 한 줄의 분류 결과

use std::fmt;

use serde::Serialize;

use crate::rule::types::Rule;

/// 라인 처분
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    /// 라인 드롭 (노이즈 억제)
    Ignore,
    /// 라인 유지 + 알림 표시
    Alert,
    /// 변경 없이 통과
    Pass,
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Disposition::Ignore => "ignore",
            Disposition::Alert => "alert",
            Disposition::Pass => "pass",
        };
        f.write_str(s)
    }
}

/// 필터 결정 — 엔진이 라인마다 새로 생성하는 불변 결과 값
///
/// 불변식: 처분이 [`Disposition::Pass`]인 것과 `rule`이 없는 것은
/// 동치입니다. 규칙이 있으면 처분은 규칙 종류에서 유도됩니다.
///
/// `rule`은 엔진이 소유한 규칙에 대한 비소유 참조이므로, 결정은
/// 호출 직후 소비되어야 하며 엔진보다 오래 살 수 없습니다.
#[derive(Debug)]
pub struct FilterDecision<'a> {
    disposition: Disposition,
    rule: Option<&'a Rule>,
    message: String,
}

impl<'a> FilterDecision<'a> {
    /// 어떤 규칙에도 매칭되지 않은 라인의 결정을 생성합니다.
    pub(crate) fn pass(message: &str) -> Self {
        Self {
            disposition: Disposition::Pass,
            rule: None,
            message: message.to_owned(),
        }
    }

    /// 규칙에 매칭된 라인의 결정을 생성합니다.
    /// 처분은 규칙 종류에서 유도됩니다.
    pub(crate) fn matched(rule: &'a Rule, message: &str) -> Self {
        Self {
            disposition: rule.kind().disposition(),
            rule: Some(rule),
            message: message.to_owned(),
        }
    }

    /// 처분
    pub fn disposition(&self) -> Disposition {
        self.disposition
    }

    /// 매칭된 규칙 (pass면 없음)
    pub fn rule(&self) -> Option<&'a Rule> {
        self.rule
    }

    /// 입력 텍스트
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 라인을 드롭해야 하는지
    pub fn is_ignore(&self) -> bool {
        self.disposition == Disposition::Ignore
    }

    /// 알림으로 표시해야 하는지
    pub fn is_alert(&self) -> bool {
        self.disposition == Disposition::Alert
    }

    /// 변경 없이 통과시켜야 하는지
    pub fn is_pass(&self) -> bool {
        self.disposition == Disposition::Pass
    }

    /// 사람이 읽을 수 있는 설명을 반환합니다.
    pub fn describe(&self) -> String {
        match self.rule {
            Some(rule) => format!(
                "{}: matched {} rule '{}' ({}:{})",
                self.disposition,
                rule.kind(),
                rule.raw_pattern(),
                rule.source_file().display(),
                rule.line_number(),
            ),
            None => "pass: no rule matched".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::types::RuleKind;

    #[test]
    fn pass_decision_has_no_rule() {
        let decision = FilterDecision::pass("some line");
        assert!(decision.is_pass());
        assert!(decision.rule().is_none());
        assert_eq!(decision.message(), "some line");
    }

    #[test]
    fn matched_decision_derives_disposition_from_kind() {
        let ignore = Rule::new("x", RuleKind::Ignore, "/r/ignore.d/f", 1);
        let cracking = Rule::new("x", RuleKind::Cracking, "/r/cracking.d/f", 1);

        let d = FilterDecision::matched(&ignore, "x");
        assert!(d.is_ignore());
        assert!(d.rule().is_some());

        let d = FilterDecision::matched(&cracking, "x");
        assert!(d.is_alert());
    }

    #[test]
    fn describe_includes_rule_provenance() {
        let rule = Rule::new("^.*Failed password.*$", RuleKind::Cracking, "/r/cracking.d/ssh", 2);
        let decision = FilterDecision::matched(&rule, "Failed password for root");
        let desc = decision.describe();
        assert!(desc.contains("alert"));
        assert!(desc.contains("cracking"));
        assert!(desc.contains("Failed password"));
        assert!(desc.contains("cracking.d/ssh"));
    }

    #[test]
    fn describe_pass_is_plain() {
        assert_eq!(FilterDecision::pass("x").describe(), "pass: no rule matched");
    }
}

//! 필터 스테이지 — 호스트 파이프라인과의 접점
//!
//! [`FilterStage`]는 [`RuleEngine`]의 결정을 레코드 단위 동작으로
//! 옮깁니다: `ignore`는 레코드 드롭, `alert`는 메타데이터 필드를 붙여
//! 유지, `pass`는 변경 없이 유지. core의
//! [`RecordFilter`](logwarden_core::pipeline::RecordFilter) trait을
//! 구현하여 호스트가 다른 스테이지와 동일한 인터페이스로 사용합니다.

use logwarden_core::error::LogwardenError;
use logwarden_core::pipeline::RecordFilter;
use logwarden_core::types::LogRecord;

use crate::config::FilterConfig;
use crate::decision::Disposition;
use crate::error::FilterError;
use crate::rule::RuleEngine;

/// 필터 스테이지
///
/// 엔진과 알림 필드 접두어를 묶습니다. 알림 레코드에는
/// `{prefix}_alert`, `{prefix}_rule_kind`, `{prefix}_rule_pattern`,
/// `{prefix}_rule_source` 필드가 부착됩니다.
pub struct FilterStage {
    /// 규칙 엔진
    engine: RuleEngine,
    /// 알림 메타데이터 필드 접두어
    field_prefix: String,
}

impl FilterStage {
    /// 구성 완료된 엔진으로 스테이지를 생성합니다.
    pub fn new(engine: RuleEngine, field_prefix: impl Into<String>) -> Self {
        Self {
            engine,
            field_prefix: field_prefix.into(),
        }
    }

    /// 설정에서 스테이지를 생성합니다.
    ///
    /// 설정을 검증하고, 우선순위를 적용한 엔진을 만들어 모든 규칙
    /// 소스를 로드합니다.
    pub async fn from_config(config: &FilterConfig) -> Result<Self, FilterError> {
        config.validate()?;
        let mut engine = RuleEngine::with_precedence(config.precedence.clone());
        engine.load_sources(config).await?;
        Ok(Self::new(engine, config.field_prefix.clone()))
    }

    /// 내부 엔진 참조 (통계/진단용)
    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    /// 내부 엔진 가변 참조
    pub fn engine_mut(&mut self) -> &mut RuleEngine {
        &mut self.engine
    }

    /// 레코드를 분류하여 드롭 / 주석 / 통과를 수행합니다.
    ///
    /// `None`은 드롭입니다. 분류할 수 없는 내부 에러는 엔진이
    /// fail open으로 처리하므로 여기서는 항상 결정이 나옵니다 —
    /// 보안 관련 라인이 에러로 인해 조용히 사라지는 일은 없습니다.
    pub fn apply(&mut self, mut record: LogRecord) -> Option<LogRecord> {
        let (disposition, matched) = {
            let decision = self.engine.filter(&record.message);
            let matched = decision.rule().map(|rule| {
                (
                    rule.kind().as_str(),
                    rule.raw_pattern().to_owned(),
                    rule.source_file().display().to_string(),
                )
            });
            (decision.disposition(), matched)
        };

        match disposition {
            Disposition::Ignore => None,
            Disposition::Pass => Some(record),
            Disposition::Alert => {
                if let Some((kind, pattern, source)) = matched {
                    record.set_field(format!("{}_alert", self.field_prefix), "true");
                    record.set_field(format!("{}_rule_kind", self.field_prefix), kind);
                    record.set_field(format!("{}_rule_pattern", self.field_prefix), pattern);
                    record.set_field(format!("{}_rule_source", self.field_prefix), source);
                }
                Some(record)
            }
        }
    }
}

impl RecordFilter for FilterStage {
    fn name(&self) -> &str {
        "logwarden-filter"
    }

    fn process(&mut self, record: LogRecord) -> Result<Option<LogRecord>, LogwardenError> {
        Ok(self.apply(record))
    }
}

//! 필터 설정
//!
//! [`FilterConfig`]는 core의
//! [`FilterSectionConfig`](logwarden_core::config::FilterSectionConfig)를
//! 기반으로 필터 크레이트 전용의 타입 있는 설정을 제공합니다.
//! 우선순위 목록은 여기서 [`Precedence`]로 변환되며, 변환 자체가
//! 검증이므로 잘못된 설정은 첫 매칭이 아니라 설정 시점에 실패합니다.
//!
//! # 사용 예시
//! ```ignore
//! use logwarden_core::config::LogwardenConfig;
//! use logwarden_filter::config::FilterConfig;
//!
//! let core_config = LogwardenConfig::default();
//! let config = FilterConfig::from_core(&core_config.filter)?;
//! ```

use std::path::PathBuf;

use logwarden_core::config::FilterSectionConfig;

use crate::error::FilterError;
use crate::rule::{Precedence, RuleKind};

/// 규칙 소스 — 파일 또는 디렉토리 하나
#[derive(Debug, Clone)]
pub struct RuleSource {
    /// 규칙 파일 또는 디렉토리 경로
    pub path: PathBuf,
    /// 규칙 종류 명시 (없으면 경로 관례로 자동 감지)
    pub kind: Option<RuleKind>,
    /// 이 소스만의 재귀 탐색 오버라이드
    pub recursive: Option<bool>,
}

impl RuleSource {
    /// 자동 감지 종류의 소스를 생성합니다.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: None,
            recursive: None,
        }
    }

    /// 규칙 종류를 명시합니다 (자동 감지보다 우선).
    pub fn with_kind(mut self, kind: RuleKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// 재귀 탐색 여부를 이 소스에만 지정합니다.
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = Some(recursive);
        self
    }
}

/// 필터 설정
///
/// core의 `[filter]` 섹션에서 파생되며, 엔진이 직접 사용하는 타입으로
/// 변환된 형태입니다.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// 규칙 소스 목록
    pub sources: Vec<RuleSource>,
    /// 파일당 최대 규칙 수
    pub max_rules_per_file: usize,
    /// 디렉토리 소스의 기본 재귀 탐색 여부
    pub recursive_scan: bool,
    /// 규칙 종류 우선순위
    pub precedence: Precedence,
    /// 알림 메타데이터 필드 접두어
    pub field_prefix: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            max_rules_per_file: 10_000,
            recursive_scan: false,
            precedence: Precedence::default(),
            field_prefix: "logwarden".to_owned(),
        }
    }
}

impl FilterConfig {
    /// core의 `[filter]` 섹션에서 필터 설정을 생성합니다.
    ///
    /// 우선순위 이름과 소스의 종류 이름을 파싱/검증합니다.
    pub fn from_core(core: &FilterSectionConfig) -> Result<Self, FilterError> {
        let precedence = Precedence::from_names(&core.precedence)?;

        let sources = core
            .sources
            .iter()
            .map(|s| {
                Ok(RuleSource {
                    path: PathBuf::from(&s.path),
                    kind: s.kind.as_deref().map(str::parse::<RuleKind>).transpose()?,
                    recursive: s.recursive,
                })
            })
            .collect::<Result<Vec<_>, FilterError>>()?;

        let config = Self {
            sources,
            max_rules_per_file: core.max_rules_per_file,
            recursive_scan: core.recursive_scan,
            precedence,
            field_prefix: core.field_prefix.clone(),
        };
        config.validate()?;
        Ok(config)
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.max_rules_per_file == 0 {
            return Err(FilterError::Config {
                field: "max_rules_per_file".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.field_prefix.is_empty() {
            return Err(FilterError::Config {
                field: "field_prefix".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }
        if !self
            .field_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(FilterError::Config {
                field: "field_prefix".to_owned(),
                reason: "must contain only [a-zA-Z0-9_]".to_owned(),
            });
        }

        Ok(())
    }
}

/// 필터 설정 빌더
///
/// 필드가 많으므로 빌더 패턴을 사용합니다. `build()`에서 검증합니다.
#[derive(Default)]
pub struct FilterConfigBuilder {
    config: FilterConfig,
}

impl FilterConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 규칙 소스를 추가합니다.
    pub fn source(mut self, source: RuleSource) -> Self {
        self.config.sources.push(source);
        self
    }

    /// 파일당 최대 규칙 수를 설정합니다.
    pub fn max_rules_per_file(mut self, max: usize) -> Self {
        self.config.max_rules_per_file = max;
        self
    }

    /// 기본 재귀 탐색 여부를 설정합니다.
    pub fn recursive_scan(mut self, recursive: bool) -> Self {
        self.config.recursive_scan = recursive;
        self
    }

    /// 규칙 종류 우선순위를 설정합니다.
    pub fn precedence(mut self, precedence: Precedence) -> Self {
        self.config.precedence = precedence;
        self
    }

    /// 알림 메타데이터 필드 접두어를 설정합니다.
    pub fn field_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.field_prefix = prefix.into();
        self
    }

    /// 설정을 검증하고 `FilterConfig`를 생성합니다.
    pub fn build(self) -> Result<FilterConfig, FilterError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

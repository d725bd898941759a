//! 설정 관리 — logwarden.toml 파싱 및 런타임 설정
//!
//! [`LogwardenConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`LOGWARDEN_FILTER_RECURSIVE_SCAN=true` 형식)
//! 3. 설정 파일 (`logwarden.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), logwarden_core::error::LogwardenError> {
//! use logwarden_core::config::LogwardenConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LogwardenConfig::load("logwarden.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = LogwardenConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, LogwardenError};

/// 필터가 인식하는 규칙 종류 이름 (precedence 검증에 사용)
pub const RULE_KIND_NAMES: &[&str] = &["ignore", "cracking", "violations"];

/// Logwarden 통합 설정
///
/// `logwarden.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 모듈은 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogwardenConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 필터 스테이지 설정
    #[serde(default)]
    pub filter: FilterSectionConfig,
}

impl LogwardenConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LogwardenError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LogwardenError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogwardenError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LogwardenError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LogwardenError> {
        toml::from_str(toml_str).map_err(|e| {
            LogwardenError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOGWARDEN_{SECTION}_{FIELD}`
    /// 예: `LOGWARDEN_GENERAL_LOG_LEVEL=debug`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LOGWARDEN_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOGWARDEN_GENERAL_LOG_FORMAT");

        // Filter
        override_bool(&mut self.filter.enabled, "LOGWARDEN_FILTER_ENABLED");
        override_usize(
            &mut self.filter.max_rules_per_file,
            "LOGWARDEN_FILTER_MAX_RULES_PER_FILE",
        );
        override_bool(
            &mut self.filter.recursive_scan,
            "LOGWARDEN_FILTER_RECURSIVE_SCAN",
        );
        override_string(&mut self.filter.field_prefix, "LOGWARDEN_FILTER_FIELD_PREFIX");
        override_csv(&mut self.filter.precedence, "LOGWARDEN_FILTER_PRECEDENCE");
    }

    /// 설정값의 유효성을 검증합니다.
    ///
    /// precedence 목록은 여기서 즉시 검증됩니다 — 엔진이 첫 메시지를
    /// 처리할 때가 아니라 설정 시점에 실패해야 합니다.
    pub fn validate(&self) -> Result<(), LogwardenError> {
        const MAX_RULES_PER_FILE_LIMIT: usize = 1_000_000;

        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        // max_rules_per_file 검증
        if self.filter.max_rules_per_file == 0
            || self.filter.max_rules_per_file > MAX_RULES_PER_FILE_LIMIT
        {
            return Err(ConfigError::InvalidValue {
                field: "filter.max_rules_per_file".to_owned(),
                reason: format!("must be 1-{}", MAX_RULES_PER_FILE_LIMIT),
            }
            .into());
        }

        // field_prefix 검증
        if self.filter.field_prefix.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "filter.field_prefix".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }
        if !self
            .filter
            .field_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ConfigError::InvalidValue {
                field: "filter.field_prefix".to_owned(),
                reason: "must contain only [a-zA-Z0-9_]".to_owned(),
            }
            .into());
        }

        // precedence 검증: 비어있지 않고, 중복 없이, 알려진 종류만
        if self.filter.precedence.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "filter.precedence".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }
        for (idx, name) in self.filter.precedence.iter().enumerate() {
            if !RULE_KIND_NAMES.contains(&name.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "filter.precedence".to_owned(),
                    reason: format!(
                        "unknown rule kind '{}' at position {} (expected one of: {})",
                        name,
                        idx,
                        RULE_KIND_NAMES.join(", ")
                    ),
                }
                .into());
            }
            if self.filter.precedence[..idx].contains(name) {
                return Err(ConfigError::InvalidValue {
                    field: "filter.precedence".to_owned(),
                    reason: format!("duplicate rule kind '{}'", name),
                }
                .into());
            }
        }

        // sources 검증: 빈 경로 금지
        for (idx, source) in self.filter.sources.iter().enumerate() {
            if source.path.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("filter.sources[{}].path", idx),
                    reason: "must not be empty".to_owned(),
                }
                .into());
            }
            if let Some(ref kind) = source.kind {
                if !RULE_KIND_NAMES.contains(&kind.as_str()) {
                    return Err(ConfigError::InvalidValue {
                        field: format!("filter.sources[{}].kind", idx),
                        reason: format!(
                            "unknown rule kind '{}' (expected one of: {})",
                            kind,
                            RULE_KIND_NAMES.join(", ")
                        ),
                    }
                    .into());
                }
            }
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 필터 스테이지 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSectionConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 규칙 소스 목록 (파일 또는 디렉토리)
    pub sources: Vec<RuleSourceConfig>,
    /// 파일당 최대 규칙 수
    pub max_rules_per_file: usize,
    /// 디렉토리 소스의 기본 재귀 탐색 여부
    pub recursive_scan: bool,
    /// 규칙 종류 우선순위 (높은 것부터)
    pub precedence: Vec<String>,
    /// 알림 메타데이터 필드 접두어
    pub field_prefix: String,
}

impl Default for FilterSectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sources: Vec::new(),
            max_rules_per_file: 10_000,
            recursive_scan: false,
            precedence: vec![
                "cracking".to_owned(),
                "violations".to_owned(),
                "ignore".to_owned(),
            ],
            field_prefix: "logwarden".to_owned(),
        }
    }
}

/// 규칙 소스 설정 항목
///
/// `kind`를 생략하면 경로의 `ignore.d` / `cracking.d` / `violations.d`
/// 관례로부터 자동 감지됩니다. `recursive`를 생략하면 섹션의
/// `recursive_scan` 기본값이 적용됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSourceConfig {
    /// 규칙 파일 또는 디렉토리 경로
    pub path: String,
    /// 규칙 종류 명시 (자동 감지보다 우선)
    #[serde(default)]
    pub kind: Option<String>,
    /// 이 소스만의 재귀 탐색 오버라이드
    #[serde(default)]
    pub recursive: Option<bool>,
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val.split(',').map(|s| s.trim().to_owned()).collect();
    }
}

//! 규칙 데이터 타입
//!
//! 규칙 파일의 한 줄에 대응하는 [`Rule`]과 닫힌 규칙 종류 열거형
//! [`RuleKind`]를 정의합니다.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::decision::Disposition;
use crate::error::FilterError;

/// 규칙 종류 — logcheck 관례의 세 가지 분류
///
/// 문자열이 아닌 닫힌 열거형으로 모델링하여 우선순위 매핑과
/// 검증이 컴파일 타임에 전수 검사되도록 합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// 노이즈 억제 규칙 (매칭 시 라인 드롭)
    Ignore,
    /// 침입 시도 탐지 규칙 (매칭 시 알림)
    Cracking,
    /// 정책 위반 탐지 규칙 (매칭 시 알림)
    Violations,
}

impl RuleKind {
    /// 모든 규칙 종류 (우선순위 순서 아님)
    pub const ALL: [RuleKind; 3] = [RuleKind::Ignore, RuleKind::Cracking, RuleKind::Violations];

    /// 소문자 이름을 반환합니다. 디렉토리 관례와 메트릭 레이블에 사용됩니다.
    pub fn as_str(self) -> &'static str {
        match self {
            RuleKind::Ignore => "ignore",
            RuleKind::Cracking => "cracking",
            RuleKind::Violations => "violations",
        }
    }

    /// 이 종류에 매칭된 라인의 처분을 반환합니다.
    ///
    /// 보안 관련 종류(`cracking`, `violations`)는 알림, `ignore`는 드롭입니다.
    pub fn disposition(self) -> Disposition {
        match self {
            RuleKind::Ignore => Disposition::Ignore,
            RuleKind::Cracking | RuleKind::Violations => Disposition::Alert,
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleKind {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ignore" => Ok(RuleKind::Ignore),
            "cracking" => Ok(RuleKind::Cracking),
            "violations" => Ok(RuleKind::Violations),
            other => Err(FilterError::UnknownKind {
                name: other.to_owned(),
            }),
        }
    }
}

/// 단일 규칙 — 컴파일된 패턴 하나와 그 출처
///
/// 패턴은 첫 접근 시 한 번만 컴파일되어 캐싱됩니다. 컴파일 실패도
/// 캐싱되므로([`OnceLock`]에 `Result`를 저장) 재시도는 항상 같은
/// 종류의 에러를 반환합니다.
///
/// 매칭은 작성된 그대로 수행됩니다 — 암묵적 대소문자 무시, 멀티라인
/// 모드, 전체 문자열 앵커링을 추가하지 않습니다. `regex` 크레이트의
/// 기본 동작상 `.`은 개행을 넘지 않으므로 `line1.*line2` 같은 패턴이
/// 개행을 사이에 둔 텍스트에 매칭되지 않습니다.
#[derive(Debug)]
pub struct Rule {
    /// 원본 패턴 텍스트 (주석/공백 제거 후)
    raw_pattern: String,
    /// 규칙 종류
    kind: RuleKind,
    /// 출처 파일 경로
    source_file: PathBuf,
    /// 출처 파일 내 1-기반 라인 번호
    line_number: usize,
    /// 컴파일 결과 캐시 (성공/실패 모두 1회만)
    compiled: OnceLock<Result<Regex, regex::Error>>,
}

impl Rule {
    /// 새 규칙을 생성합니다. 패턴 컴파일은 지연됩니다.
    pub fn new(
        raw_pattern: impl Into<String>,
        kind: RuleKind,
        source_file: impl Into<PathBuf>,
        line_number: usize,
    ) -> Self {
        Self {
            raw_pattern: raw_pattern.into(),
            kind,
            source_file: source_file.into(),
            line_number,
            compiled: OnceLock::new(),
        }
    }

    /// 원본 패턴 텍스트
    pub fn raw_pattern(&self) -> &str {
        &self.raw_pattern
    }

    /// 규칙 종류
    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    /// 출처 파일 경로
    pub fn source_file(&self) -> &Path {
        &self.source_file
    }

    /// 출처 파일 내 1-기반 라인 번호
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// 컴파일된 패턴을 반환합니다.
    ///
    /// 첫 호출에서 컴파일하고, 이후 호출은 항상 동일한 객체를
    /// 반환합니다 (참조 동일성 보장 — 호출자가 캐시 키로 사용 가능).
    /// 컴파일 실패는 고정적입니다: 재호출해도 같은 에러가 반환됩니다.
    pub fn pattern(&self) -> Result<&Regex, FilterError> {
        self.compiled
            .get_or_init(|| Regex::new(&self.raw_pattern))
            .as_ref()
            .map_err(|e| FilterError::PatternCompile {
                pattern: self.raw_pattern.clone(),
                path: self.source_file.display().to_string(),
                line: self.line_number,
                reason: e.to_string(),
            })
    }

    /// 텍스트가 이 규칙에 매칭되는지 평가합니다.
    ///
    /// 빈 입력은 에러 없이 `false`입니다. 패턴 컴파일 실패는
    /// [`FilterError::PatternCompile`]로 전파됩니다 (로드 시 사전
    /// 컴파일을 통과한 규칙이라면 도달하지 않습니다).
    pub fn matches(&self, text: &str) -> Result<bool, FilterError> {
        if text.is_empty() {
            return Ok(false);
        }
        Ok(self.pattern()?.is_match(text))
    }

    /// 로깅/진단용 읽기 전용 스냅샷을 반환합니다.
    pub fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            kind: self.kind,
            source_file: self.source_file.clone(),
            line_number: self.line_number,
            pattern: self.raw_pattern.clone(),
        }
    }
}

/// 규칙 메타데이터 스냅샷 (로깅/진단용)
#[derive(Debug, Clone, Serialize)]
pub struct RuleMetadata {
    /// 규칙 종류
    pub kind: RuleKind,
    /// 출처 파일 경로
    pub source_file: PathBuf,
    /// 출처 파일 내 1-기반 라인 번호
    pub line_number: usize,
    /// 원본 패턴 텍스트
    pub pattern: String,
}

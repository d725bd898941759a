//! 필터 도메인 에러 타입
//!
//! [`FilterError`]는 규칙 로딩과 매칭에서 발생하는 모든 에러를 표현합니다.
//! `From<FilterError> for LogwardenError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.
//!
//! # 전파 정책
//!
//! 하드 실패로 전파되는 것은 두 가지뿐입니다: 로드 요청의 루트 경로가
//! 존재하지 않는 경우([`FilterError::FileNotFound`])와, 명시적 단일 파일
//! 로드에서 규칙 종류를 결정할 수 없는 경우([`FilterError::KindDetect`]).
//! 라인 단위 / 디렉토리 엔트리 단위 실패는 로더가 로그를 남기고 흡수합니다.

use logwarden_core::error::{LogwardenError, StageError};

/// 필터 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// 로드 대상 루트 파일/디렉토리가 존재하지 않음
    #[error("rule source not found: {path}")]
    FileNotFound {
        /// 요청된 경로
        path: String,
    },

    /// 규칙 종류를 결정할 수 없음 (명시 없음 + 경로 관례 불일치)
    #[error(
        "cannot determine rule kind for '{path}': \
         no ignore.d/cracking.d/violations.d marker and no explicit kind"
    )]
    KindDetect {
        /// 문제가 된 파일 경로
        path: String,
    },

    /// 개별 패턴 컴파일 실패
    #[error("invalid pattern '{pattern}' at {path}:{line}: {reason}")]
    PatternCompile {
        /// 원본 패턴 텍스트
        pattern: String,
        /// 규칙 파일 경로
        path: String,
        /// 규칙 파일 내 1-기반 라인 번호
        line: usize,
        /// 컴파일 실패 사유
        reason: String,
    },

    /// 알 수 없는 규칙 종류 이름
    #[error("unknown rule kind: {name}")]
    UnknownKind {
        /// 파싱에 실패한 이름
        name: String,
    },

    /// 우선순위 목록 검증 실패
    #[error("invalid precedence: {reason}")]
    Precedence {
        /// 검증 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<FilterError> for LogwardenError {
    fn from(err: FilterError) -> Self {
        LogwardenError::Stage(StageError::InitFailed(err.to_string()))
    }
}

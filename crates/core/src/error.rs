//! 에러 타입 — 도메인별 에러 정의

/// Logwarden 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum LogwardenError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 필터 스테이지 처리 에러
    #[error("stage error: {0}")]
    Stage(#[from] StageError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 필터 스테이지 처리 에러
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    /// 스테이지 초기화 실패 (규칙 로딩 등)
    #[error("stage init failed: {0}")]
    InitFailed(String),

    /// 레코드 처리 중 에러
    #[error("record processing failed: {0}")]
    Process(String),
}

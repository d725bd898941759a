#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`rule`]: 규칙 데이터 모델, 파일/디렉토리 로더, 우선순위 엔진
//! - [`decision`]: 라인별 분류 결과 (`FilterDecision`)
//! - [`stage`]: 레코드 필터 스테이지 (드롭 / 주석 / 통과)
//! - [`config`]: 필터 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! rule files -> RuleLoader -> RuleSets -> RuleEngine -> FilterDecision
//!                  |                          |              |
//!            kind autodetect            precedence      FilterStage
//!            malformed tolerance     cracking>violations>ignore
//! ```

pub mod config;
pub mod decision;
pub mod error;
pub mod stage;

pub mod rule;

// --- 주요 타입 re-export ---

// 설정
pub use config::{FilterConfig, FilterConfigBuilder, RuleSource};

// 결정
pub use decision::{Disposition, FilterDecision};

// 에러
pub use error::FilterError;

// 규칙 엔진
pub use rule::{
    FilterStats, Precedence, Rule, RuleEngine, RuleKind, RuleLoader, RuleMetadata, RuleSet,
};

// 스테이지
pub use stage::FilterStage;

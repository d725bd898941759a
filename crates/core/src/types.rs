//! 도메인 타입 — 시스템 전역에서 사용되는 공통 타입
//!
//! 필터 스테이지와 CLI가 공유하는 로그 레코드 구조를 정의합니다.

use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// 로그 레코드
///
/// 호스트 파이프라인에서 넘어온 한 줄의 로그를 나타냅니다.
/// 필터 스테이지는 `message`를 분류 대상으로 사용하고,
/// 분류 결과 메타데이터를 `fields`에 부착합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// 원본 소스 (파일 경로, syslog 등)
    pub source: String,
    /// 수신 시각
    pub timestamp: SystemTime,
    /// 로그 메시지 (분류 대상 텍스트)
    pub message: String,
    /// 추가 필드 (key-value 쌍, 삽입 순서 유지)
    pub fields: Vec<(String, String)>,
}

impl LogRecord {
    /// 메시지만으로 레코드를 생성합니다.
    pub fn new(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            timestamp: SystemTime::now(),
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// 필드 값을 조회합니다.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 필드를 설정합니다. 같은 키가 있으면 덮어씁니다.
    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.fields.push((key, value)),
        }
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.source, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_has_no_fields() {
        let record = LogRecord::new("syslog", "sshd[1]: session opened");
        assert!(record.fields.is_empty());
        assert_eq!(record.message, "sshd[1]: session opened");
    }

    #[test]
    fn set_field_overwrites_existing_key() {
        let mut record = LogRecord::new("syslog", "msg");
        record.set_field("pid", "100");
        record.set_field("pid", "200");
        assert_eq!(record.field("pid"), Some("200"));
        assert_eq!(record.fields.len(), 1);
    }

    #[test]
    fn field_returns_none_for_missing_key() {
        let record = LogRecord::new("syslog", "msg");
        assert_eq!(record.field("nope"), None);
    }

    #[test]
    fn display_includes_source_and_message() {
        let record = LogRecord::new("/var/log/auth.log", "Failed password");
        let s = record.to_string();
        assert!(s.contains("/var/log/auth.log"));
        assert!(s.contains("Failed password"));
    }
}

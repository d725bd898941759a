//! 규칙 파일 로더 — logcheck 스타일 규칙 파일을 디스크에서 로드합니다.
//!
//! 규칙 파일은 한 줄에 패턴 하나인 UTF-8 텍스트입니다. `#` 이후는 주석으로
//! 제거되고(`\#`는 리터럴 `#`로 이스케이프), 앞뒤 공백을 제거한 뒤 빈 줄은
//! 건너뜁니다. 살아남은 각 줄은 즉시 컴파일됩니다 — 잘못된 패턴은 경고
//! 로그를 남기고 건너뛰며, 파일의 나머지 규칙 로딩은 계속됩니다.
//!
//! 규칙 종류가 명시되지 않으면 경로의 `ignore.d` / `cracking.d` /
//! `violations.d` 관례로부터 자동 감지합니다 (이 순서로 검사, 첫 매칭 우선).

use std::path::{Path, PathBuf};

use logwarden_core::metrics as m;

use crate::error::FilterError;

use super::set::RuleSet;
use super::types::{Rule, RuleKind};

/// 디렉토리 스캔에서 건너뛰는 백업 접미사
const BACKUP_SUFFIXES: &[&str] = &["bak", "orig", "tmp"];

/// 규칙 파일이 아닐 가능성이 높은 확장자 (휴리스틱)
const NON_RULE_EXTENSIONS: &[&str] = &["log", "txt", "md", "yml", "yaml", "json", "xml"];

/// 규칙 파일 로더
///
/// 파일/디렉토리 단위 로딩 옵션(파일당 규칙 상한, 재귀 탐색)을 담습니다.
/// 로더 자체는 상태가 없으므로 소스마다 새로 만들어도 무방합니다.
#[derive(Debug, Clone, Default)]
pub struct RuleLoader {
    /// 파일당 최대 규칙 수 (None = 무제한)
    max_rules_per_file: Option<usize>,
    /// 디렉토리 재귀 탐색 여부
    recursive: bool,
}

impl RuleLoader {
    /// 기본 옵션(상한 없음, 비재귀)의 로더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 파일당 최대 규칙 수를 설정합니다.
    pub fn with_max_rules(mut self, max: usize) -> Self {
        self.max_rules_per_file = Some(max);
        self
    }

    /// 디렉토리 재귀 탐색 여부를 설정합니다.
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 단일 규칙 파일을 로드합니다.
    ///
    /// `kind`가 없으면 경로 관례로부터 자동 감지하며, 감지 실패는
    /// [`FilterError::KindDetect`]입니다 — 조용히 기본값을 적용하지 않습니다.
    ///
    /// # Errors
    /// - [`FilterError::FileNotFound`]: `path`가 존재하는 일반 파일이 아님
    /// - [`FilterError::KindDetect`]: 종류 미명시 + 경로 관례 불일치
    ///
    /// 존재 확인 이후의 읽기/인코딩 실패는 전파되지 않습니다 — 에러 로그를
    /// 남기고 빈 규칙 집합으로 강등됩니다.
    pub async fn load_file(
        &self,
        path: impl AsRef<Path>,
        kind: Option<RuleKind>,
    ) -> Result<RuleSet, FilterError> {
        let path = path.as_ref();

        let metadata = tokio::fs::metadata(path).await.map_err(|_| {
            FilterError::FileNotFound {
                path: path.display().to_string(),
            }
        })?;
        if !metadata.is_file() {
            return Err(FilterError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let kind = match kind.or_else(|| Self::detect_kind(path)) {
            Some(kind) => kind,
            None => {
                return Err(FilterError::KindDetect {
                    path: path.display().to_string(),
                });
            }
        };

        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                // 존재 확인은 통과했으므로 읽기 실패는 규칙 0개로 강등
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "failed to read rule file, loading no rules from it"
                );
                return Ok(RuleSet::new(kind, path));
            }
        };

        Ok(self.parse_rules(&content, kind, path))
    }

    /// 디렉토리에서 규칙 파일들을 로드합니다.
    ///
    /// 안정적인(정렬된) 순서로 엔트리를 순회하며, 파일마다 하나의
    /// [`RuleSet`]을 생성합니다. 종류를 결정할 수 없는 파일과 로드에
    /// 실패한 파일은 건너뛰고 스캔은 계속됩니다 — 부분 성공이 정상
    /// 결과입니다. 빈 규칙 집합은 결과에서 제외됩니다.
    ///
    /// # Errors
    /// - [`FilterError::FileNotFound`]: `path`가 존재하는 디렉토리가 아님
    pub async fn load_directory(
        &self,
        path: impl AsRef<Path>,
        kind: Option<RuleKind>,
    ) -> Result<Vec<RuleSet>, FilterError> {
        let path = path.as_ref();

        let metadata = tokio::fs::metadata(path).await.map_err(|_| {
            FilterError::FileNotFound {
                path: path.display().to_string(),
            }
        })?;
        if !metadata.is_dir() {
            return Err(FilterError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let files = self.collect_rule_files(path).await;

        let mut sets = Vec::new();
        for file in files {
            match self.load_file(&file, kind).await {
                Ok(set) => {
                    if set.is_empty() {
                        tracing::debug!(path = %file.display(), "rule file yielded no rules");
                    } else {
                        sets.push(set);
                    }
                }
                Err(e @ FilterError::KindDetect { .. }) => {
                    tracing::debug!(
                        path = %file.display(),
                        error = %e,
                        "skipping file with undetectable rule kind"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        path = %file.display(),
                        error = %e,
                        "failed to load rule file, skipping"
                    );
                }
            }
        }

        tracing::info!(
            dir = %path.display(),
            sets = sets.len(),
            rules = sets.iter().map(RuleSet::len).sum::<usize>(),
            "loaded rule files"
        );

        Ok(sets)
    }

    /// 후보 규칙 파일을 수집합니다.
    ///
    /// 엔트리 순서는 파일시스템에 따라 달라지므로 전체 목록을 정렬하여
    /// 결정적 순서를 보장합니다. 디렉토리 읽기 실패는 해당 디렉토리만
    /// 건너뜁니다.
    async fn collect_rule_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut pending = vec![root.to_path_buf()];
        let mut files = Vec::new();

        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::error!(
                        dir = %dir.display(),
                        error = %e,
                        "failed to read directory, skipping"
                    );
                    continue;
                }
            };

            loop {
                match entries.next_entry().await {
                    Ok(Some(entry)) => {
                        let path = entry.path();
                        let file_type = match entry.file_type().await {
                            Ok(ft) => ft,
                            Err(e) => {
                                tracing::warn!(
                                    path = %path.display(),
                                    error = %e,
                                    "failed to stat directory entry, skipping"
                                );
                                continue;
                            }
                        };
                        if file_type.is_dir() {
                            if self.recursive {
                                pending.push(path);
                            }
                        } else if file_type.is_file() && !Self::should_skip_entry(&path) {
                            files.push(path);
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!(
                            dir = %dir.display(),
                            error = %e,
                            "failed to read directory entry, aborting this directory"
                        );
                        break;
                    }
                }
            }
        }

        files.sort();
        files
    }

    /// 경로 관례로부터 규칙 종류를 추론합니다.
    ///
    /// 경로 어딘가에 `ignore.d` / `cracking.d` / `violations.d` 부분
    /// 문자열이 있으면 해당 종류입니다. 이 순서로 검사하며 첫 매칭이
    /// 이깁니다.
    pub fn detect_kind(path: &Path) -> Option<RuleKind> {
        let path_str = path.to_string_lossy();
        for kind in [RuleKind::Ignore, RuleKind::Cracking, RuleKind::Violations] {
            if path_str.contains(&format!("{}.d", kind)) {
                return Some(kind);
            }
        }
        None
    }

    /// 디렉토리 엔트리를 건너뛸지 결정하는 순수 필터 정책
    ///
    /// 닷파일, 백업 파일(`~`, `.bak`, `.orig`, `.tmp`), 규칙이 아닐
    /// 가능성이 높은 확장자(`.log`, `.txt`, `.md`, `.yml`, `.yaml`,
    /// `.json`, `.xml`)를 건너뜁니다. 휴리스틱일 뿐 보장은 아닙니다 —
    /// 그 외의 확장자는 규칙 파일 후보로 취급합니다.
    pub fn should_skip_entry(path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return true;
        };

        if name.starts_with('.') || name.ends_with('~') {
            return true;
        }

        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            let ext = ext.to_ascii_lowercase();
            if BACKUP_SUFFIXES.contains(&ext.as_str()) {
                return true;
            }
            if NON_RULE_EXTENSIONS.contains(&ext.as_str()) {
                return true;
            }
        }

        false
    }

    /// 첫 번째 이스케이프되지 않은 `#`부터 끝까지 제거합니다.
    ///
    /// `\#`는 리터럴 `#`로 남습니다 (이스케이프 백슬래시는 제거).
    /// 그 외의 백슬래시 시퀀스는 정규식 이스케이프이므로 그대로 둡니다.
    pub fn strip_comment(line: &str) -> String {
        let mut out = String::with_capacity(line.len());
        let mut chars = line.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some('#') => out.push('#'),
                    Some(other) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => out.push('\\'),
                },
                '#' => break,
                _ => out.push(c),
            }
        }
        out
    }

    /// 파일 내용을 규칙 집합으로 파싱합니다.
    ///
    /// 라인 번호는 1-기반으로 파일 순서를 따릅니다. 컴파일 실패 라인은
    /// 경고 후 건너뛰며, 파일당 상한에 도달하면 나머지 라인은 더 이상
    /// 검사하지 않습니다.
    fn parse_rules(&self, content: &str, kind: RuleKind, path: &Path) -> RuleSet {
        let mut set = RuleSet::new(kind, path);

        for (idx, raw_line) in content.lines().enumerate() {
            let line_number = idx + 1;

            let stripped = Self::strip_comment(raw_line);
            let pattern = stripped.trim();
            if pattern.is_empty() {
                continue;
            }

            let rule = Rule::new(pattern, kind, path, line_number);
            // 로드 시점에 즉시 컴파일하여 매칭 단계의 실패를 차단
            match rule.pattern() {
                Ok(_) => set.push(rule),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        line = line_number,
                        error = %e,
                        "skipping rule with invalid pattern"
                    );
                    metrics::counter!(m::FILTER_INVALID_PATTERNS_TOTAL).increment(1);
                    continue;
                }
            }

            if let Some(max) = self.max_rules_per_file {
                if set.len() >= max {
                    tracing::warn!(
                        path = %path.display(),
                        max,
                        "per-file rule cap reached, ignoring remaining lines"
                    );
                    break;
                }
            }
        }

        set
    }
}

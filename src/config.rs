// ============================================
// src/config.rs
// 設定ファイルの読み込みと既定値
// ============================================

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::session::Timing;

/// キャンバスの大きさ (540x960 の縦長ウィンドウを 10x20px のセルで換算)
pub const CANVAS_WIDTH: u16 = 54;
pub const CANVAS_HEIGHT: u16 = 48;

pub const DEFAULT_API_URL: &str = "https://opentdb.com/api.php";

const CONFIG_FILE: &str = "config.json";

/// ゲーム全体の設定
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    /// 1回のリクエストで取得する問題数
    pub batch_size: u32,
    pub question_time_ms: u64,
    pub answer_time_ms: u64,
    pub session_length_ms: u64,
    pub intro_time_ms: u64,
    pub outro_time_ms: u64,
    pub fps: u32,
    /// `characters/` と `common_sounds/` を含むディレクトリ
    pub asset_root: PathBuf,
    /// 未指定ならデータディレクトリの `used_questions.json`
    pub used_questions_path: Option<PathBuf>,
    pub volume: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            batch_size: 6,
            question_time_ms: 9_000,
            answer_time_ms: 2_000,
            session_length_ms: 61_000,
            intro_time_ms: 4_000,
            outro_time_ms: 6_000,
            fps: 60,
            asset_root: PathBuf::from("."),
            used_questions_path: None,
            volume: 0.5,
        }
    }
}

impl Config {
    /// MARK:設定の読み込み
    ///
    /// `explicit` が指定されていればそのファイルを読み、失敗はエラーにする。
    /// 指定がなければ設定ディレクトリの `config.json` を探し、
    /// 無ければ既定値、壊れていれば警告を出して既定値を使う。
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let config = Self::from_file(path)?;
            info!(path = %path.display(), "loaded config");
            return Ok(config);
        }

        let Some(path) = default_config_path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        match Self::from_file(&path) {
            Ok(config) => {
                info!(path = %path.display(), "loaded config");
                Ok(config)
            }
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(path = %path.display(), error = %reason, "ignoring broken config file");
                Ok(Self::default())
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn timing(&self) -> Timing {
        Timing {
            question: Duration::from_millis(self.question_time_ms),
            answer: Duration::from_millis(self.answer_time_ms),
            session: Duration::from_millis(self.session_length_ms),
        }
    }

    pub fn intro_time(&self) -> Duration {
        Duration::from_millis(self.intro_time_ms)
    }

    pub fn outro_time(&self) -> Duration {
        Duration::from_millis(self.outro_time_ms)
    }

    /// 1フレームあたりの時間
    pub fn frame_time(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }

    pub fn used_questions_file(&self) -> PathBuf {
        self.used_questions_path
            .clone()
            .unwrap_or_else(|| data_dir().join("used_questions.json"))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("jp", "Fukumoto0141", "QUIZ_MASTER")
}

fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// MARK:データ保存用ディレクトリ
///
/// 作成できなければカレントディレクトリにフォールバックする。
pub fn data_dir() -> PathBuf {
    if let Some(proj_dirs) = project_dirs() {
        let dir = proj_dirs.data_dir();
        if dir.exists() || fs::create_dir_all(dir).is_ok() {
            return dir.to_path_buf();
        }
    }
    PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_the_show_format() {
        let config = Config::default();
        let timing = config.timing();
        assert_eq!(timing.question, Duration::from_millis(9_000));
        assert_eq!(timing.answer, Duration::from_millis(2_000));
        assert_eq!(timing.session, Duration::from_millis(61_000));
        assert_eq!(config.batch_size, 6);
        assert_eq!(config.frame_time(), Duration::from_secs(1) / 60);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"question_time_ms": 5000, "asset_root": "/srv/quiz"}}"#).unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.question_time_ms, 5_000);
        assert_eq!(config.asset_root, PathBuf::from("/srv/quiz"));
        assert_eq!(config.answer_time_ms, 2_000);
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn explicit_broken_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(Config::load(Some(file.path())).is_err());
    }

    #[test]
    fn explicit_used_path_wins() {
        let config = Config {
            used_questions_path: Some(PathBuf::from("/tmp/used.json")),
            ..Config::default()
        };
        assert_eq!(config.used_questions_file(), PathBuf::from("/tmp/used.json"));
    }

    #[test]
    fn zero_fps_does_not_divide_by_zero() {
        let config = Config { fps: 0, ..Config::default() };
        assert_eq!(config.frame_time(), Duration::from_secs(1));
    }
}

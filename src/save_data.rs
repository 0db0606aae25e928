// ============================================
// src/save_data.rs
// 出題済み問題の記録と読み書きロジック
// ============================================

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

/// 過去に答えを表示した問題の ID 集合
///
/// セッション中は増えるだけで、減ることはない。
#[derive(Debug, Clone)]
pub struct UsedQuestions {
    ids: HashSet<String>,
    path: PathBuf,
}

impl UsedQuestions {
    /// 空の記録 (保存先だけ決めておく)
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            ids: HashSet::new(),
            path: path.into(),
        }
    }

    /// MARK:ファイルから記録を読み込む
    ///
    /// ファイルが無い・読めない・壊れている場合は空として扱う。
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let mut used = Self::empty(path);
        if !used.path.exists() {
            info!(path = %used.path.display(), "no used-question file yet");
            return used;
        }

        let parsed = File::open(&used.path)
            .map_err(anyhow::Error::from)
            .and_then(|file| {
                let reader = BufReader::new(file);
                serde_json::from_reader::<_, Vec<String>>(reader).map_err(anyhow::Error::from)
            });
        match parsed {
            Ok(ids) => {
                used.ids = ids.into_iter().collect();
                info!(count = used.ids.len(), "loaded used questions");
            }
            Err(err) => {
                warn!(path = %used.path.display(), error = %err, "error loading used questions, starting empty");
            }
        }
        used
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// 新しく追加されたら true
    pub fn insert(&mut self, id: &str) -> bool {
        self.ids.insert(id.to_string())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// MARK:記録をファイルに保存する (JSON 配列、上書き)
    pub fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }

        // 順序を固定して書く
        let mut ids: Vec<&str> = self.ids.iter().map(String::as_str).collect();
        ids.sort_unstable();

        let file = File::create(&self.path)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &ids)?;
        writer.flush()?;
        info!(count = ids.len(), path = %self.path.display(), "saved used questions");
        Ok(())
    }

    /// 記録ファイルを削除する (`--reset-used`)
    pub fn clear_file(path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path).with_context(|| format!("failed to remove {}", path.display()))?;
        Ok(true)
    }
}

// ============================================
// src/logging.rs
// ログ出力の初期化 (画面は TUI が使うのでファイルへ書く)
// ============================================

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "quizmaster=info";

/// `RUST_LOG` が無ければ `quizmaster=info`。
/// ログファイルが開けない場合は捨てる。
pub fn init(log_path: &Path) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false);

    let file = File::options().create(true).append(true).open(log_path);
    let _ = match file {
        Ok(file) => builder.with_writer(Mutex::new(file)).try_init(),
        Err(_) => builder.with_writer(io::sink).try_init(),
    };
}

// ============================================
// src/main.rs (メインファイル)
// ============================================

use std::io::{self, Stdout, stdout};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

mod app;
mod assets;
mod audio;
mod config;
mod entities;
mod error;
mod logging;
mod questions;
mod save_data;
mod session;
mod trivia_api;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use console::{Term, style};
use crossterm::{
    ExecutableCommand,
    cursor::{Hide, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use dialoguer::Confirm;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::prelude::*;
use tracing::{error, info};

use app::App;
use audio::SoundBoard;
use config::Config;
use save_data::UsedQuestions;
use session::Session;
use trivia_api::OpenTriviaClient;

/// ターミナルで遊ぶ時間制限つきクイズ
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// 設定ファイル (JSON)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// 乱数のシード (同じ値なら同じキャラクター・選択肢の並びになる)
    #[arg(long)]
    seed: Option<u64>,

    /// 出題済みリストを消して終了する
    #[arg(long)]
    reset_used: bool,
}

// --------------------------------------------------
// メイン関数
// --------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let reason = format!("{err:#}");
            error!(error = %reason, "quiz master stopped");
            let _ = Term::stderr().write_line(&format!("{} {reason}", style("error:").red().bold()));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    logging::init(&config::data_dir().join("quizmaster.log"));
    let config = Config::load(cli.config.as_deref())?;
    let used_path = config.used_questions_file();

    if cli.reset_used {
        return reset_used(&used_path);
    }

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    // MARK:起動時の読み込み (ここまでは通常の画面で行う)
    let used = UsedQuestions::load(&used_path);
    let character = assets::pick_character(&config.asset_root.join("characters"), &mut rng);
    let common = assets::load_sound_dir(&config.asset_root.join("common_sounds"));
    let sounds = SoundBoard::new(audio::open_output(config.volume), common);

    let client = OpenTriviaClient::new(config.api_url.clone());
    let questions = questions::load_questions(&client, config.batch_size, &used, &mut rng)
        .context("could not start the quiz")?;

    let session = Session::new(questions, config.timing());
    info!(questions = session.len(), "questions ready");
    let mut app = App::new(session, used, character, sounds, rng, &config);

    let mut terminal = match setup_terminal() {
        Ok(terminal) => terminal,
        Err(err) => {
            let _ = restore_terminal();
            return Err(err).context("failed to set up the terminal");
        }
    };
    let result = run_app(&mut terminal, &mut app, config.frame_time());
    let restored = restore_terminal().context("failed to restore the terminal");
    let saved = app.shutdown();

    result?;
    restored?;
    saved
}

/// 確認してから出題済みリストを消す
fn reset_used(path: &Path) -> Result<()> {
    let confirmed = Confirm::new()
        .with_prompt(format!("Forget every asked question in {}?", path.display()))
        .default(false)
        .interact()?;
    if !confirmed {
        println!("{}", style("Nothing changed.").dim());
        return Ok(());
    }

    if UsedQuestions::clear_file(path)? {
        info!(path = %path.display(), "used question list cleared");
        println!("{} {}", style("Cleared").green().bold(), path.display());
    } else {
        println!("{}", style("No used question list to clear.").dim());
    }
    Ok(())
}

// --------------------------------------------------
// TUIセットアップと実行ループ
// --------------------------------------------------

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?; // 代替スクリーンを使用
    stdout().execute(Hide)?; // カーソルを非表示
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

fn restore_terminal() -> io::Result<()> {
    stdout().execute(Show)?; // カーソルを再表示
    stdout().execute(LeaveAlternateScreen)?; // 代替スクリーンを終了
    disable_raw_mode()
}

fn run_app<R: Rng>(
    terminal: &mut Terminal<impl Backend>,
    app: &mut App<R>,
    frame_time: Duration,
) -> Result<()> {
    let epoch = Instant::now();
    app.begin(Duration::ZERO);

    loop {
        let frame_start = Instant::now();
        let now = epoch.elapsed();

        app.tick(now);
        if app.is_finished() {
            break;
        }
        terminal.draw(|f| ui::draw(f, &app.scene(now)))?;

        // 残りのフレーム時間だけ入力を待つ
        let budget = frame_time.saturating_sub(frame_start.elapsed());
        if event::poll(budget)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && is_quit_key(&key) {
                    info!("quit by user");
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Esc / q / Ctrl-C
fn is_quit_key(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

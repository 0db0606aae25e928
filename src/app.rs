// ============================================
// src/app.rs
// イントロ -> 出題 -> アウトロ の進行と効果音のきっかけ
// ============================================

use std::time::Duration;

use anyhow::{Context, Result};
use rand::Rng;
use tracing::{debug, info};

use crate::assets::{Character, Stage};
use crate::audio::SoundBoard;
use crate::config::Config;
use crate::save_data::UsedQuestions;
use crate::session::{Phase, Session};
use crate::ui::{QuizView, Scene};

const TIMER_SOUND: &str = "timer";
const ANSWER_SOUND: &str = "answer";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Intro { since: Duration },
    Quiz,
    Outro { since: Duration },
    Finished,
}

/// 1回のプレイ全体
pub struct App<R: Rng> {
    session: Session,
    used: UsedQuestions,
    character: Option<Character>,
    sounds: SoundBoard,
    rng: R,
    screen: Screen,
    pose: usize,
    /// 正解の効果音を鳴らし済みの問題番号
    cued_reveal: Option<usize>,
    quiz_started: bool,
    intro_time: Duration,
    outro_time: Duration,
}

impl<R: Rng> App<R> {
    pub fn new(
        session: Session,
        used: UsedQuestions,
        character: Option<Character>,
        sounds: SoundBoard,
        rng: R,
        config: &Config,
    ) -> Self {
        Self {
            session,
            used,
            character,
            sounds,
            rng,
            screen: Screen::Intro {
                since: Duration::ZERO,
            },
            pose: 0,
            cued_reveal: None,
            quiz_started: false,
            intro_time: config.intro_time(),
            outro_time: config.outro_time(),
        }
    }

    /// イントロを始める
    pub fn begin(&mut self, now: Duration) {
        self.screen = Screen::Intro { since: now };
        self.sounds.play_voice(self.character.as_ref(), "intro");
        info!(
            character = self.character.as_ref().map_or("-", |c| c.name()),
            "intro started"
        );
    }

    /// MARK:1フレーム分進める
    pub fn tick(&mut self, now: Duration) {
        match self.screen {
            Screen::Intro { since } => {
                if now.saturating_sub(since) >= self.intro_time {
                    self.start_quiz(now);
                }
            }
            Screen::Quiz => self.tick_quiz(now),
            Screen::Outro { since } => {
                if now.saturating_sub(since) >= self.outro_time {
                    self.screen = Screen::Finished;
                    info!("outro finished");
                }
            }
            Screen::Finished => {}
        }
    }

    fn start_quiz(&mut self, now: Duration) {
        self.session.start(now);
        self.quiz_started = true;
        self.screen = Screen::Quiz;
        self.next_pose();
        self.tick_quiz(now);
    }

    fn tick_quiz(&mut self, now: Duration) {
        let step = self.session.update(now, &mut self.used);
        if step.question_ended {
            self.next_pose();
        }
        if step.session_ended || self.session.has_ended() {
            self.enter_outro(now);
            return;
        }
        self.cue_sounds();
    }

    /// 考え中はタイマー音を鳴らし続け、正解表示に入ったら1回だけ正解音とボイスを鳴らす
    /// (前の正解音がまだ鳴っていれば両方とも見送る)
    fn cue_sounds(&mut self) {
        let Some(current) = self.session.current() else {
            return;
        };
        match current.phase {
            Phase::Thinking => {
                if !self.sounds.common_playing(TIMER_SOUND) {
                    self.sounds.play_common(TIMER_SOUND);
                }
            }
            Phase::Revealed => {
                let index = self.session.current_index();
                if self.cued_reveal == Some(index) {
                    return;
                }
                self.cued_reveal = Some(index);
                let letter = current.question.correct_letter().to_string();
                debug!(
                    number = current.number,
                    answer = current.question.correct_choice(),
                    "answer revealed"
                );

                self.sounds.stop_common(TIMER_SOUND);
                // ボイスは正解音と一緒に鳴らす
                if !self.sounds.common_playing(ANSWER_SOUND) {
                    self.sounds.play_common(ANSWER_SOUND);
                    self.sounds.play_voice(self.character.as_ref(), &letter);
                }
            }
        }
    }

    fn enter_outro(&mut self, now: Duration) {
        self.sounds.stop_common(TIMER_SOUND);
        self.screen = Screen::Outro { since: now };
        self.sounds.play_voice(self.character.as_ref(), "outro");
        info!(asked = self.session.current_index(), used = self.used.len(), "outro started");
    }

    fn next_pose(&mut self) {
        self.pose = match &self.character {
            Some(character) => character.pick_pose(&mut self.rng),
            None => 0,
        };
    }

    /// 描画用のスナップショット
    pub fn scene(&self, now: Duration) -> Scene<'_> {
        let (stage, stage_elapsed, quiz) = match self.screen {
            Screen::Intro { since } => (Stage::Intro, now.saturating_sub(since), None),
            Screen::Quiz => match self.session.current() {
                Some(current) => {
                    let stage = match current.phase {
                        Phase::Thinking => Stage::Thinking,
                        Phase::Revealed => Stage::Correct,
                    };
                    let quiz = QuizView {
                        question: current.question,
                        number: current.number,
                        total: current.total,
                        reveal_elapsed: current.revealed_at.map(|at| now.saturating_sub(at)),
                    };
                    (stage, now.saturating_sub(current.question_started), Some(quiz))
                }
                None => (Stage::Bye, Duration::ZERO, None),
            },
            Screen::Outro { since } => (Stage::Bye, now.saturating_sub(since), None),
            Screen::Finished => (Stage::Bye, self.outro_time, None),
        };

        Scene {
            stage,
            stage_elapsed,
            quiz,
            character: self.character.as_ref(),
            pose: self.pose,
            timing: self.session.timing(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.screen == Screen::Finished
    }

    /// MARK:終了処理
    ///
    /// 音を止め、出題が始まっていれば出題済みリストを保存する。
    pub fn shutdown(&mut self) -> Result<()> {
        self.sounds.stop_all();
        if !self.quiz_started {
            return Ok(());
        }
        self.used
            .save()
            .context("failed to save the used question list")
    }
}

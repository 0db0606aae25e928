// ============================================
// src/session.rs
// 出題セッションの時間管理 (考え中 -> 正解表示 -> 次の問題)
// ============================================

use std::time::Duration;

use tracing::{debug, info};

use crate::questions::Question;
use crate::save_data::UsedQuestions;

/// 各フェーズの長さ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// 問題を表示している時間
    pub question: Duration,
    /// 正解を表示している時間
    pub answer: Duration,
    /// セッション全体の目安。超えたら次の切り替えで終了
    pub session: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            question: Duration::from_millis(9_000),
            answer: Duration::from_millis(2_000),
            session: Duration::from_millis(61_000),
        }
    }
}

impl Timing {
    /// 1問あたりの合計時間
    pub fn question_span(&self) -> Duration {
        self.question + self.answer
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// 問題表示中 (答えはまだ)
    Thinking,
    /// 正解表示中
    Revealed,
}

/// `update` 1回分の結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Step {
    pub session_ended: bool,
    pub question_ended: bool,
}

/// 現在の問題の表示に必要な情報
#[derive(Debug, Clone, Copy)]
pub struct Current<'a> {
    pub question: &'a Question,
    /// 1始まりの問題番号
    pub number: usize,
    pub total: usize,
    pub phase: Phase,
    pub question_started: Duration,
    pub revealed_at: Option<Duration>,
}

/// セッションの状態
///
/// 時刻はすべて呼び出し側の単調増加クロックの値 (起点からの経過時間)。
#[derive(Debug)]
pub struct Session {
    questions: Vec<Question>,
    timing: Timing,
    current_index: usize,
    show_answer: bool,
    last_switch: Duration,
    revealed_at: Duration,
    started_at: Duration,
    /// 時間切れのラッチ。立ったら現在の問題の正解表示後に終わる
    should_end: bool,
    ended: bool,
}

impl Session {
    pub fn new(questions: Vec<Question>, timing: Timing) -> Self {
        Self {
            questions,
            timing,
            current_index: 0,
            show_answer: false,
            last_switch: Duration::ZERO,
            revealed_at: Duration::ZERO,
            started_at: Duration::ZERO,
            should_end: false,
            ended: false,
        }
    }

    /// 最初の問題から始める
    pub fn start(&mut self, now: Duration) {
        self.current_index = 0;
        self.show_answer = false;
        self.last_switch = now;
        self.revealed_at = now;
        self.started_at = now;
        self.should_end = false;
        self.ended = self.questions.is_empty();
        info!(questions = self.questions.len(), "session started");
    }

    /// MARK:時間を進める
    ///
    /// 問題の正解表示が終わったタイミングでその ID を `used` に記録する。
    pub fn update(&mut self, now: Duration, used: &mut UsedQuestions) -> Step {
        if self.ended {
            return Step {
                session_ended: true,
                question_ended: false,
            };
        }

        let mut step = Step::default();

        if !self.should_end && now.saturating_sub(self.started_at) >= self.timing.session {
            self.should_end = true;
            debug!("session time budget used up");
        }

        if !self.show_answer && now.saturating_sub(self.last_switch) >= self.timing.question {
            self.show_answer = true;
            self.revealed_at = now;
        }

        if self.show_answer && now.saturating_sub(self.revealed_at) >= self.timing.answer {
            let finished = &self.questions[self.current_index];
            used.insert(&finished.id);
            self.current_index += 1;
            step.question_ended = true;

            if self.current_index >= self.questions.len() || self.should_end {
                self.ended = true;
                step.session_ended = true;
                info!(asked = self.current_index, "session finished");
            } else {
                self.last_switch = now;
                self.show_answer = false;
            }
        }

        step
    }

    /// 表示中の問題。セッション終了後は None
    pub fn current(&self) -> Option<Current<'_>> {
        if self.ended {
            return None;
        }
        let question = self.questions.get(self.current_index)?;
        Some(Current {
            question,
            number: self.current_index + 1,
            total: self.questions.len(),
            phase: self.phase(),
            question_started: self.last_switch,
            revealed_at: self.show_answer.then_some(self.revealed_at),
        })
    }

    pub fn phase(&self) -> Phase {
        if self.show_answer {
            Phase::Revealed
        } else {
            Phase::Thinking
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn has_ended(&self) -> bool {
        self.ended
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }
}

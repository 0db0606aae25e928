// ============================================
// src/ui/mod.rs
// 1フレーム分の描画
// ============================================

pub mod anim;
pub mod layout;
pub mod theme;

use std::time::Duration;

use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Gauge, Paragraph, Wrap},
};

use crate::assets::{ANIMATION_FPS, Character, Stage};
use crate::config::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::questions::{Question, choice_letter};
use crate::session::Timing;

use anim::{REVEAL_DURATION, lerp_color, progress, remaining_fraction, reveal_scale, seconds_left};
use layout::{Card, LETTER_WIDTH, QuizLayout, centered, layout_quiz, scale_rect};
use theme::*;

/// 表示中の問題
#[derive(Debug, Clone, Copy)]
pub struct QuizView<'a> {
    pub question: &'a Question,
    pub number: usize,
    pub total: usize,
    /// 正解表示が始まってからの時間 (考え中は None)
    pub reveal_elapsed: Option<Duration>,
}

/// 描画に必要なものをまとめたもの (状態は持たない)
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub stage: Stage,
    /// イントロ・アウトロはその開始から、問題中は問題の開始からの時間
    pub stage_elapsed: Duration,
    pub quiz: Option<QuizView<'a>>,
    pub character: Option<&'a Character>,
    pub pose: usize,
    pub timing: Timing,
}

// --------------------------------------------------
// UI描画
// --------------------------------------------------

pub fn draw(f: &mut Frame, scene: &Scene) {
    let area = f.area();
    if area.width < CANVAS_WIDTH || area.height < CANVAS_HEIGHT {
        draw_too_small(f, area);
        return;
    }

    let canvas = centered(area, CANVAS_WIDTH, CANVAS_HEIGHT);
    f.render_widget(Block::new().style(Style::new().bg(WHITE.into())), canvas);

    match &scene.quiz {
        Some(quiz) => draw_quiz(f, canvas, scene, quiz),
        None => draw_title_screen(f, canvas, scene),
    }
}

fn draw_too_small(f: &mut Frame, area: Rect) {
    let message = format!(
        "Terminal too small: need {}x{}, have {}x{}",
        CANVAS_WIDTH, CANVAS_HEIGHT, area.width, area.height
    );
    f.render_widget(
        Paragraph::new(message)
            .wrap(Wrap { trim: true })
            .centered(),
        area,
    );
}

/// イントロ・アウトロ
fn draw_title_screen(f: &mut Frame, canvas: Rect, scene: &Scene) {
    let title = match scene.stage {
        Stage::Bye => "Thanks for playing!",
        _ => "Welcome to Quiz Master!",
    };
    let middle = canvas.y + canvas.height / 2;

    if let Some(lines) = character_frame(scene) {
        let art_area = Rect::new(
            canvas.x,
            middle + 2,
            canvas.width,
            canvas.bottom().saturating_sub(middle + 3),
        );
        draw_art(f, art_area, lines);
    }

    f.render_widget(
        Paragraph::new(title)
            .style(Style::new().fg(PRIMARY.into()).bold())
            .centered(),
        Rect::new(canvas.x, middle, canvas.width, 1),
    );
}

/// MARK:問題画面
fn draw_quiz(f: &mut Frame, canvas: Rect, scene: &Scene, quiz: &QuizView) {
    let layout = layout_quiz(quiz.question, canvas);

    if let Some(lines) = character_frame(scene) {
        draw_art(f, layout.character, lines);
    }

    draw_header(f, canvas, quiz.question);
    draw_question_card(f, &layout.question, quiz);

    let revealed = quiz.reveal_elapsed.is_some();
    let t = quiz
        .reveal_elapsed
        .map(|elapsed| progress(elapsed, REVEAL_DURATION));
    for (i, card) in layout.choices.iter().enumerate() {
        let highlight = t.filter(|_| i == quiz.question.answer);
        draw_choice(f, canvas, card, i, highlight, revealed);
    }

    if !revealed {
        draw_timer(f, &layout, scene.stage_elapsed, scene.timing.question);
    }
}

/// タイトルと難易度バッジ
fn draw_header(f: &mut Frame, canvas: Rect, question: &Question) {
    f.render_widget(
        Paragraph::new("Quiz Master")
            .style(Style::new().fg(PRIMARY.into()).bold())
            .centered(),
        Rect::new(canvas.x, canvas.y + 1, canvas.width, 1),
    );

    let label = format!(" {} ", question.difficulty.label().to_uppercase());
    let row = Rect::new(canvas.x, canvas.y + 3, canvas.width, 1);
    let badge = centered(row, label.chars().count() as u16 + 2, 1);
    f.render_widget(
        Paragraph::new(label)
            .style(
                Style::new()
                    .fg(WHITE.into())
                    .bg(badge_color(question.difficulty).into())
                    .bold(),
            )
            .centered(),
        badge,
    );
}

fn draw_question_card(f: &mut Frame, card: &Card, quiz: &QuizView) {
    f.render_widget(
        Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::new().fg(BORDER.into()))
            .style(Style::new().bg(CARD.into())),
        card.area,
    );

    let inner = card.inner();
    let number = format!("Question {} / {}", quiz.number, quiz.total);
    f.render_widget(
        Paragraph::new(number).style(Style::new().fg(LIGHT_TEXT.into())),
        rows(inner, 0, 1).inner(Margin::new(1, 0)),
    );

    let text: Vec<Line> = card.lines.iter().map(|line| Line::from(line.as_str())).collect();
    f.render_widget(
        Paragraph::new(text)
            .style(Style::new().fg(TEXT.into()))
            .centered(),
        rows(inner, 2, inner.height),
    );
}

/// 選択肢カード。`highlight` は正解カードのアニメーション進捗
fn draw_choice(
    f: &mut Frame,
    canvas: Rect,
    card: &Card,
    index: usize,
    highlight: Option<f64>,
    revealed: bool,
) {
    let (block, text_color, letter_bg, letter_fg) = match highlight {
        Some(t) => {
            let bg = lerp_color(CARD, SUCCESS, t);
            let area = scale_rect(card.area, reveal_scale(t), canvas);
            f.render_widget(Block::new().style(Style::new().bg(bg.into())), area);
            (
                None,
                lerp_color(TEXT, WHITE, t),
                lerp_color(LETTER_BG, LETTER_BG_CORRECT, t),
                WHITE,
            )
        }
        None => {
            // 正解表示中は他のカードの枠を消す
            let borders = if revealed { Borders::NONE } else { Borders::ALL };
            let block = Block::new()
                .borders(borders)
                .border_type(BorderType::Rounded)
                .border_style(Style::new().fg(BORDER.into()))
                .style(Style::new().bg(CARD.into()));
            (Some(block), TEXT, LETTER_BG, PRIMARY)
        }
    };
    if let Some(block) = block {
        f.render_widget(block, card.area);
    }

    let inner = card.inner();
    let letter_row = inner.y + inner.height.saturating_sub(1) / 2;
    let letter_area = Rect::new(inner.x + 1, letter_row, 3, 1).intersection(inner);
    f.render_widget(
        Paragraph::new(format!(" {} ", choice_letter(index))).style(
            Style::new()
                .fg(letter_fg.into())
                .bg(letter_bg.into())
                .bold(),
        ),
        letter_area,
    );

    let text_x = inner.x + 1 + LETTER_WIDTH;
    let text_area = Rect::new(
        text_x,
        inner.y,
        inner.right().saturating_sub(text_x + 1),
        inner.height,
    )
    .intersection(inner);
    let text: Vec<Line> = card.lines.iter().map(|line| Line::from(line.as_str())).collect();
    f.render_widget(
        Paragraph::new(text).style(Style::new().fg(text_color.into())),
        text_area,
    );
}

/// 残り時間のバーと秒数 (考え中のみ)
fn draw_timer(f: &mut Frame, layout: &QuizLayout, elapsed: Duration, question_time: Duration) {
    let remaining = remaining_fraction(elapsed, question_time).clamp(0.0, 1.0);
    f.render_widget(
        Gauge::default()
            .gauge_style(
                Style::new()
                    .fg(timer_color(remaining).into())
                    .bg(BORDER.into()),
            )
            .ratio(remaining)
            .use_unicode(true)
            .label(""),
        layout.timer_bar,
    );

    f.render_widget(
        Paragraph::new(format!("{}s", seconds_left(elapsed, question_time)))
            .style(Style::new().fg(LIGHT_TEXT.into()))
            .centered(),
        layout.timer_text,
    );
}

/// キャラクターの現在のフレーム
fn character_frame<'a>(scene: &Scene<'a>) -> Option<&'a [String]> {
    let character = scene.character?;
    let animation = character.frames_for(scene.stage, scene.pose)?;
    match scene.stage {
        Stage::Intro | Stage::Bye => animation.frame_at_fps(scene.stage_elapsed, ANIMATION_FPS),
        Stage::Thinking | Stage::Correct => {
            animation.frame_spanning(scene.stage_elapsed, scene.timing.question_span())
        }
    }
}

/// アスキーアートを領域の中央に置く (はみ出す分は切る)
fn draw_art(f: &mut Frame, area: Rect, lines: &[String]) {
    if area.is_empty() {
        return;
    }
    let width = lines
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0) as u16;
    let target = centered(area, width, lines.len() as u16);
    let text: Vec<Line> = lines.iter().map(|line| Line::from(line.as_str())).collect();
    f.render_widget(
        Paragraph::new(text).style(Style::new().fg(TEXT.into())),
        target,
    );
}

/// `area` の `skip` 行目から最大 `count` 行
fn rows(area: Rect, skip: u16, count: u16) -> Rect {
    let skip = skip.min(area.height);
    Rect::new(
        area.x,
        area.y + skip,
        area.width,
        count.min(area.height - skip),
    )
}

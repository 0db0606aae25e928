// ============================================
// src/ui/layout.rs
// 問題カード・選択肢カードの配置計算
// ============================================

use ratatui::layout::Rect;

use crate::questions::Question;

/// 問題カードの左右の余白
const QUESTION_MARGIN: u16 = 2;
/// 選択肢カードの左右の余白
const CHOICE_MARGIN: u16 = 3;
/// 問題カードの開始行 (タイトル・難易度バッジの下)
const QUESTION_TOP: u16 = 5;
/// 選択肢カード同士の間隔
const CHOICE_SPACING: u16 = 1;
/// 選択肢の記号バッジ (" A ") と後ろの空白
pub const LETTER_WIDTH: u16 = 4;

/// カード1枚分 (枠の矩形と折り返し済みの本文)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub area: Rect,
    pub lines: Vec<String>,
}

impl Card {
    /// 枠の内側
    pub fn inner(&self) -> Rect {
        inset(self.area, 1, 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizLayout {
    pub question: Card,
    pub choices: Vec<Card>,
    /// タイマーバーの行
    pub timer_bar: Rect,
    /// タイマー秒数の行
    pub timer_text: Rect,
    /// 選択肢の下からタイマーまでの空き (キャラクター用)
    pub character: Rect,
}

/// 単語単位で折り返す。1語が幅を超える場合はその語を分割する
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let max_width = max_width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word.to_string();
        while word.chars().count() > max_width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let head: String = word.chars().take(max_width).collect();
            word = word.chars().skip(max_width).collect();
            lines.push(head);
        }
        if word.is_empty() {
            continue;
        }

        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed <= max_width {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&word);
        } else {
            lines.push(std::mem::replace(&mut current, word));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// MARK:問題画面の配置
pub fn layout_quiz(question: &Question, canvas: Rect) -> QuizLayout {
    // 問題カード: 枠 + 番号行 + 空行 + 本文
    let question_width = canvas.width.saturating_sub(QUESTION_MARGIN * 2);
    let question_text_width = question_width.saturating_sub(4) as usize;
    let question_lines = wrap_text(&question.text, question_text_width);
    let question_area = clip(
        Rect::new(
            canvas.x + QUESTION_MARGIN,
            canvas.y + QUESTION_TOP,
            question_width,
            question_lines.len() as u16 + 4,
        ),
        canvas,
    );

    // 選択肢カード: 枠 + 記号バッジ + 本文
    let choice_width = canvas.width.saturating_sub(CHOICE_MARGIN * 2);
    let choice_text_width = choice_width.saturating_sub(2 + 2 + LETTER_WIDTH) as usize;
    let mut y = question_area.bottom() + 1;
    let mut choices = Vec::with_capacity(question.choices.len());
    for choice in &question.choices {
        let lines = wrap_text(choice, choice_text_width);
        let height = lines.len().max(1) as u16 + 2;
        let area = clip(Rect::new(canvas.x + CHOICE_MARGIN, y, choice_width, height), canvas);
        y = area.bottom() + CHOICE_SPACING;
        choices.push(Card { area, lines });
    }

    let timer_bar = clip(
        Rect::new(
            canvas.x + 2,
            canvas.bottom().saturating_sub(3),
            canvas.width.saturating_sub(4),
            1,
        ),
        canvas,
    );
    let timer_text = clip(
        Rect::new(canvas.x, canvas.bottom().saturating_sub(2), canvas.width, 1),
        canvas,
    );

    let character_top = choices
        .last()
        .map_or(question_area.bottom(), |card| card.area.bottom())
        + 1;
    let character = Rect::new(
        canvas.x,
        character_top.min(timer_bar.y),
        canvas.width,
        timer_bar.y.saturating_sub(character_top + 1),
    );

    QuizLayout {
        question: Card {
            area: question_area,
            lines: question_lines,
        },
        choices,
        timer_bar,
        timer_text,
        character,
    }
}

/// 中心を保ったまま拡大する (キャンバスからははみ出さない)
pub fn scale_rect(rect: Rect, scale: f64, bounds: Rect) -> Rect {
    let width = (rect.width as f64 * scale).round() as u16;
    let height = (rect.height as f64 * scale).round() as u16;
    let grow_x = width.saturating_sub(rect.width) / 2;
    let grow_y = height.saturating_sub(rect.height) / 2;
    let scaled = Rect::new(
        rect.x.saturating_sub(grow_x),
        rect.y.saturating_sub(grow_y),
        rect.width + grow_x * 2,
        rect.height + grow_y * 2,
    );
    clip(scaled, bounds)
}

/// `area` の中央に `width` x `height` の矩形を置く (収まらない分は切る)
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn inset(rect: Rect, horizontal: u16, vertical: u16) -> Rect {
    Rect::new(
        rect.x + horizontal.min(rect.width / 2),
        rect.y + vertical.min(rect.height / 2),
        rect.width.saturating_sub(horizontal * 2),
        rect.height.saturating_sub(vertical * 2),
    )
}

/// 交差部分。重ならないときは bounds の端に大きさ 0 で置く
fn clip(rect: Rect, bounds: Rect) -> Rect {
    let clipped = rect.intersection(bounds);
    Rect {
        x: clipped.x.min(bounds.right()),
        y: clipped.y.min(bounds.bottom()),
        ..clipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CANVAS_HEIGHT, CANVAS_WIDTH};
    use crate::questions::{Difficulty, QuestionKind};

    fn canvas() -> Rect {
        Rect::new(0, 0, CANVAS_WIDTH, CANVAS_HEIGHT)
    }

    fn question(text: &str, choices: &[&str]) -> Question {
        Question {
            id: format!("{text}|{}", choices[0]),
            text: text.to_string(),
            choices: choices.iter().map(|s| s.to_string()).collect(),
            answer: 0,
            difficulty: Difficulty::Medium,
            kind: QuestionKind::Multiple,
        }
    }

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(
            wrap_text("the quick brown fox jumps over the lazy dog", 10),
            ["the quick", "brown fox", "jumps over", "the lazy", "dog"]
        );
    }

    #[test]
    fn splits_words_longer_than_a_line() {
        assert_eq!(wrap_text("ab abcdefgh", 4), ["ab", "abcd", "efgh"]);
    }

    #[test]
    fn empty_text_has_no_lines() {
        assert!(wrap_text("", 10).is_empty());
        assert!(wrap_text("   ", 10).is_empty());
    }

    #[test]
    fn wrapped_lines_fit_the_width() {
        let text = "In which year did the Berlin Wall fall, ending decades of division in Germany?";
        for line in wrap_text(text, 46) {
            assert!(line.chars().count() <= 46);
        }
    }

    #[test]
    fn cards_stack_without_overlap() {
        let q = question(
            "Which of these planets has the most moons according to current counts?",
            &["Saturn", "Jupiter", "Uranus", "Neptune"],
        );
        let layout = layout_quiz(&q, canvas());

        assert_eq!(layout.choices.len(), 4);
        assert_eq!(layout.question.area.y, QUESTION_TOP);
        assert_eq!(layout.question.area.height, layout.question.lines.len() as u16 + 4);

        let mut previous_bottom = layout.question.area.bottom();
        for card in &layout.choices {
            assert!(card.area.y > previous_bottom);
            assert_eq!(card.area.height, 3);
            previous_bottom = card.area.bottom();
        }
        assert!(layout.character.bottom() <= layout.timer_bar.y);
        assert!(layout.character.height > 0);
    }

    #[test]
    fn boolean_questions_get_two_cards() {
        let q = question("The Great Wall of China is visible from space.", &["True", "False"]);
        let layout = layout_quiz(&q, canvas());
        assert_eq!(layout.choices.len(), 2);
    }

    #[test]
    fn everything_stays_on_the_canvas() {
        let long = "word ".repeat(200);
        let q = question(&long, &[&long, &long, &long, &long]);
        let layout = layout_quiz(&q, canvas());
        for card in std::iter::once(&layout.question).chain(&layout.choices) {
            assert!(card.area.bottom() <= CANVAS_HEIGHT);
            assert!(card.area.right() <= CANVAS_WIDTH);
        }
    }

    #[test]
    fn scaling_keeps_the_center() {
        let rect = Rect::new(3, 20, 48, 3);
        let scaled = scale_rect(rect, 1.05, canvas());
        assert_eq!(scaled, Rect::new(2, 20, 50, 3));
        assert_eq!(scale_rect(rect, 1.0, canvas()), rect);
    }

    #[test]
    fn centered_rect_is_clipped_to_the_area() {
        let area = Rect::new(10, 5, 20, 10);
        assert_eq!(centered(area, 10, 4), Rect::new(15, 8, 10, 4));
        assert_eq!(centered(area, 40, 40), area);
    }
}

// ============================================
// src/ui/theme.rs
// 配色
// ============================================

use ratatui::style::Color;

use crate::questions::Difficulty;

/// 補間できるように RGB で持つ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl From<Rgb> for Color {
    fn from(Rgb(r, g, b): Rgb) -> Self {
        Color::Rgb(r, g, b)
    }
}

pub const WHITE: Rgb = Rgb(255, 255, 255);
pub const CARD: Rgb = Rgb(255, 255, 255);
pub const PRIMARY: Rgb = Rgb(99, 102, 241);
pub const SUCCESS: Rgb = Rgb(34, 197, 94);
pub const WARNING: Rgb = Rgb(245, 158, 11);
pub const DANGER: Rgb = Rgb(239, 68, 68);
pub const TEXT: Rgb = Rgb(31, 41, 55);
pub const LIGHT_TEXT: Rgb = Rgb(107, 114, 128);
pub const BORDER: Rgb = Rgb(229, 231, 235);
pub const LETTER_BG: Rgb = Rgb(237, 233, 254);
pub const LETTER_BG_CORRECT: Rgb = Rgb(22, 163, 74);

/// 難易度バッジの色
pub fn badge_color(difficulty: Difficulty) -> Rgb {
    match difficulty {
        Difficulty::Easy => SUCCESS,
        Difficulty::Medium => WARNING,
        Difficulty::Hard => DANGER,
    }
}

/// 残り時間の割合でタイマーバーの色を変える
pub fn timer_color(remaining: f64) -> Rgb {
    if remaining > 0.5 {
        SUCCESS
    } else if remaining > 0.25 {
        WARNING
    } else {
        DANGER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn badge_follows_difficulty() {
        assert_eq!(badge_color(Difficulty::Easy), SUCCESS);
        assert_eq!(badge_color(Difficulty::Medium), WARNING);
        assert_eq!(badge_color(Difficulty::Hard), DANGER);
    }

    #[test]
    fn timer_turns_red_near_the_end() {
        assert_eq!(timer_color(1.0), SUCCESS);
        assert_eq!(timer_color(0.5), WARNING);
        assert_eq!(timer_color(0.26), WARNING);
        assert_eq!(timer_color(0.25), DANGER);
        assert_eq!(timer_color(0.0), DANGER);
    }
}

// ============================================
// src/ui/anim.rs
// 正解表示のアニメーションとタイマーの計算
// ============================================

use std::time::Duration;

use super::theme::Rgb;

/// 正解カードの色・拡大アニメーションの長さ
pub const REVEAL_DURATION: Duration = Duration::from_millis(500);
/// 正解カードの最大拡大率
pub const REVEAL_SCALE: f64 = 0.05;

/// 3次のイーズアウト
pub fn ease_out_cubic(x: f64) -> f64 {
    1.0 - (1.0 - x).powi(3)
}

/// 経過時間を [0, 1] に正規化してイージングをかける
pub fn progress(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    let linear = (elapsed.as_secs_f64() / duration.as_secs_f64()).min(1.0);
    ease_out_cubic(linear)
}

pub fn lerp_color(from: Rgb, to: Rgb, t: f64) -> Rgb {
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t) as u8;
    Rgb(mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}

/// 正解カードの拡大率
pub fn reveal_scale(t: f64) -> f64 {
    1.0 + REVEAL_SCALE * t
}

/// タイマーバーの残り割合 (1 -> 0)
pub fn remaining_fraction(elapsed: Duration, question_time: Duration) -> f64 {
    if question_time.is_zero() {
        return 0.0;
    }
    (1.0 - elapsed.as_secs_f64() / question_time.as_secs_f64()).max(0.0)
}

/// 残り秒数 (切り捨て)
pub fn seconds_left(elapsed: Duration, question_time: Duration) -> u64 {
    question_time.saturating_sub(elapsed).as_secs()
}

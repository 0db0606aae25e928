/*
 * src/questions.rs
 * 問題データを管理するモジュール
 * (API の生データ -> 表示用の Question へ正規化)
 */

use std::fmt;

use rand::Rng;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::entities::unescape;
use crate::error::SourceError;
use crate::save_data::UsedQuestions;
use crate::trivia_api::QuestionFeed;

/// 難易度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 問題形式 (○× か 4択)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Boolean,
    Multiple,
}

/// API が返す1問分の生データ (文字列は HTML エスケープされたまま)
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestion {
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub difficulty: Difficulty,
    pub question: String,
    pub correct_answer: String,
    #[serde(default)]
    pub incorrect_answers: Vec<String>,
}

impl RawQuestion {
    /// 重複判定用の ID (デコード前の問題文と正解をつなげたもの)
    pub fn id(&self) -> String {
        format!("{}|{}", self.question, self.correct_answer)
    }
}

/// 表示用の問題 (作成後は変更しない)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub choices: Vec<String>,
    /// `choices` の中の正解の位置
    pub answer: usize,
    pub difficulty: Difficulty,
    pub kind: QuestionKind,
}

impl Question {
    /// 生データを正規化する
    ///
    /// ○×問題は常に `True`, `False` の順。
    /// 4択問題は不正解の並びの中に、正解をランダムな位置へ差し込む。
    pub fn from_raw<R: Rng + ?Sized>(raw: RawQuestion, rng: &mut R) -> Self {
        let id = raw.id();
        let (choices, answer) = match raw.kind {
            QuestionKind::Boolean => {
                let answer = if raw.correct_answer == "True" { 0 } else { 1 };
                (vec!["True".to_string(), "False".to_string()], answer)
            }
            QuestionKind::Multiple => {
                let mut choices: Vec<String> =
                    raw.incorrect_answers.iter().map(|s| unescape(s)).collect();
                let slot = rng.random_range(0..=choices.len());
                choices.insert(slot, unescape(&raw.correct_answer));
                (choices, slot)
            }
        };

        Self {
            id,
            text: unescape(&raw.question),
            choices,
            answer,
            difficulty: raw.difficulty,
            kind: raw.kind,
        }
    }

    pub fn correct_choice(&self) -> &str {
        &self.choices[self.answer]
    }

    /// 正解の記号 (A, B, C, D)
    pub fn correct_letter(&self) -> char {
        choice_letter(self.answer)
    }
}

/// 選択肢の番号を記号にする (0 -> A)
pub fn choice_letter(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

/// 出題済みのものを除いて正規化する
pub fn select_new<R: Rng + ?Sized>(
    batch: Vec<RawQuestion>,
    used: &UsedQuestions,
    rng: &mut R,
) -> Vec<Question> {
    batch
        .into_iter()
        .filter(|raw| {
            let fresh = !used.contains(&raw.id());
            if !fresh {
                debug!(question = %raw.question, "skipping used question");
            }
            fresh
        })
        .map(|raw| Question::from_raw(raw, rng))
        .collect()
}

/// MARK:起動時の問題読み込み
///
/// 1問も残らなければエラー (部分的なフォールバックはしない)。
pub fn load_questions<F, R>(
    feed: &F,
    amount: u32,
    used: &UsedQuestions,
    rng: &mut R,
) -> Result<Vec<Question>, SourceError>
where
    F: QuestionFeed + ?Sized,
    R: Rng + ?Sized,
{
    let batch = match feed.fetch(amount) {
        Ok(batch) => batch,
        Err(err) => {
            warn!(error = %err, "error fetching questions");
            return Err(SourceError::Unreachable(err));
        }
    };

    let fetched = batch.len();
    let questions = select_new(batch, used, rng);
    info!(fetched, fresh = questions.len(), "processed questions");

    if questions.is_empty() {
        return Err(SourceError::Exhausted { fetched });
    }
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn multiple(question: &str, correct: &str, incorrect: &[&str]) -> RawQuestion {
        RawQuestion {
            kind: QuestionKind::Multiple,
            difficulty: Difficulty::Medium,
            question: question.to_string(),
            correct_answer: correct.to_string(),
            incorrect_answers: incorrect.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn boolean(question: &str, correct: &str) -> RawQuestion {
        RawQuestion {
            kind: QuestionKind::Boolean,
            difficulty: Difficulty::Easy,
            question: question.to_string(),
            correct_answer: correct.to_string(),
            incorrect_answers: vec![if correct == "True" { "False" } else { "True" }.to_string()],
        }
    }

    struct FixedFeed(Vec<RawQuestion>);

    impl QuestionFeed for FixedFeed {
        fn fetch(&self, _amount: u32) -> Result<Vec<RawQuestion>, FetchError> {
            Ok(self.0.clone())
        }
    }

    struct DownFeed;

    impl QuestionFeed for DownFeed {
        fn fetch(&self, _amount: u32) -> Result<Vec<RawQuestion>, FetchError> {
            Err(FetchError::Api(5))
        }
    }

    #[test]
    fn boolean_choices_are_fixed() {
        let mut rng = StdRng::seed_from_u64(1);
        let yes = Question::from_raw(boolean("Is the sky blue?", "True"), &mut rng);
        let no = Question::from_raw(boolean("Is fire cold?", "False"), &mut rng);

        assert_eq!(yes.choices, ["True", "False"]);
        assert_eq!(yes.answer, 0);
        assert_eq!(no.choices, ["True", "False"]);
        assert_eq!(no.answer, 1);
        assert_eq!(no.correct_letter(), 'B');
    }

    #[test]
    fn correct_answer_lands_where_the_index_says() {
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let q = Question::from_raw(
                multiple("Largest planet?", "Jupiter", &["Mars", "Venus", "Earth"]),
                &mut rng,
            );
            assert_eq!(q.choices.len(), 4);
            assert_eq!(q.correct_choice(), "Jupiter");
            let wrong: Vec<&str> = q
                .choices
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != q.answer)
                .map(|(_, c)| c.as_str())
                .collect();
            assert_eq!(wrong, ["Mars", "Venus", "Earth"]);
        }
    }

    #[test]
    fn every_slot_is_reachable() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = [false; 4];
        for _ in 0..200 {
            let q = Question::from_raw(multiple("q", "right", &["w1", "w2", "w3"]), &mut rng);
            seen[q.answer] = true;
        }
        assert_eq!(seen, [true; 4]);
    }

    #[test]
    fn same_seed_same_layout() {
        let raw = multiple("q", "right", &["w1", "w2", "w3"]);
        let a = Question::from_raw(raw.clone(), &mut StdRng::seed_from_u64(42));
        let b = Question::from_raw(raw, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn text_is_decoded_but_id_is_not() {
        let mut rng = StdRng::seed_from_u64(3);
        let q = Question::from_raw(
            multiple("Who wrote &quot;Hamlet&quot;?", "Shakespeare", &["Marlowe", "Jonson", "Kyd"]),
            &mut rng,
        );
        assert_eq!(q.text, "Who wrote \"Hamlet\"?");
        assert_eq!(q.id, "Who wrote &quot;Hamlet&quot;?|Shakespeare");
    }

    #[test]
    fn used_questions_are_filtered_out() {
        let mut used = UsedQuestions::empty("unused.json");
        used.insert("Is the sky blue?|True");

        let batch = vec![
            boolean("Is the sky blue?", "True"),
            boolean("Is fire cold?", "False"),
            multiple("Largest planet?", "Jupiter", &["Mars", "Venus", "Earth"]),
        ];
        let questions = select_new(batch, &used, &mut StdRng::seed_from_u64(0));

        assert_eq!(questions.len(), 2);
        assert!(questions.iter().all(|q| !used.contains(&q.id)));
        assert_eq!(questions[0].text, "Is fire cold?");
    }

    #[test]
    fn all_used_is_exhausted() {
        let mut used = UsedQuestions::empty("unused.json");
        used.insert("Is the sky blue?|True");
        let feed = FixedFeed(vec![boolean("Is the sky blue?", "True")]);

        let err = load_questions(&feed, 6, &used, &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(err, SourceError::Exhausted { fetched: 1 }));
    }

    #[test]
    fn feed_failure_is_unreachable() {
        let used = UsedQuestions::empty("unused.json");
        let err = load_questions(&DownFeed, 6, &used, &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(err, SourceError::Unreachable(FetchError::Api(5))));
    }

    #[test]
    fn raw_question_parses_api_json() {
        let raw: RawQuestion = serde_json::from_str(
            r#"{
                "type": "multiple",
                "difficulty": "hard",
                "category": "Science: Computers",
                "question": "What does CPU stand for?",
                "correct_answer": "Central Processing Unit",
                "incorrect_answers": ["Central Process Unit", "Computer Personal Unit", "Central Processor Unit"]
            }"#,
        )
        .unwrap();
        assert_eq!(raw.kind, QuestionKind::Multiple);
        assert_eq!(raw.difficulty, Difficulty::Hard);
        assert_eq!(raw.difficulty.to_string(), "Hard");
        assert_eq!(raw.incorrect_answers.len(), 3);
    }
}

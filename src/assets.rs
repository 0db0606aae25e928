// ============================================
// src/assets.rs
// キャラクター (アスキーアートのアニメーション・ボイス) と効果音の読み込み
// ============================================

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, info, warn};

/// アニメーションファイル内のフレーム区切り行
pub const FRAME_SEPARATOR: &str = "===";
/// イントロ・アウトロの再生速度
pub const ANIMATION_FPS: u64 = 30;

const SOUND_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac"];

/// 画面の段階 (キャラクターの絵もこれで選ぶ)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Intro,
    Thinking,
    Correct,
    Bye,
}

/// アスキーアートのフレーム列 (静止画は1フレーム)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
    frames: Vec<Vec<String>>,
}

impl Animation {
    /// `===` だけの行でフレームを区切る
    pub fn parse(text: &str) -> Self {
        let mut frames = Vec::new();
        let mut current: Vec<String> = Vec::new();
        for line in text.lines() {
            if line.trim_end() == FRAME_SEPARATOR {
                frames.push(std::mem::take(&mut current));
            } else {
                current.push(line.trim_end().to_string());
            }
        }
        frames.push(current);

        // 空のフレーム (末尾の区切りなど) は捨てる
        frames.retain(|frame| frame.iter().any(|line| !line.trim().is_empty()));
        Self { frames }
    }

    /// 読めなければ None (描画をスキップするだけ)
    pub fn load(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        let started = Instant::now();
        match fs::read_to_string(path) {
            Ok(text) => {
                let animation = Self::parse(&text);
                debug!(
                    path = %path.display(),
                    frames = animation.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "animation loaded"
                );
                (!animation.is_empty()).then_some(animation)
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "could not read animation");
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, index: usize) -> Option<&[String]> {
        self.frames.get(index).map(Vec::as_slice)
    }

    /// `span` の間に全フレームを均等に割り当てる。超えたら最後のフレーム
    pub fn frame_spanning(&self, elapsed: Duration, span: Duration) -> Option<&[String]> {
        let index = span_index(elapsed, span, self.len())?;
        self.frame(index)
    }

    /// 固定 FPS で再生する。最後まで行ったら最後のフレームで止める
    pub fn frame_at_fps(&self, elapsed: Duration, fps: u64) -> Option<&[String]> {
        let index = fps_index(elapsed, fps, self.len())?;
        self.frame(index)
    }
}

/// 経過時間をフレーム番号に写す (`floor(elapsed / span * len)`、末尾でクランプ)
pub fn span_index(elapsed: Duration, span: Duration, frame_count: usize) -> Option<usize> {
    if frame_count == 0 {
        return None;
    }
    if span.is_zero() {
        return Some(frame_count - 1);
    }
    let index = elapsed.as_millis() * frame_count as u128 / span.as_millis().max(1);
    Some((index as usize).min(frame_count - 1))
}

pub fn fps_index(elapsed: Duration, fps: u64, frame_count: usize) -> Option<usize> {
    if frame_count == 0 {
        return None;
    }
    let index = elapsed.as_millis() * fps as u128 / 1000;
    Some((index as usize).min(frame_count - 1))
}

/// キャラクターの絵
#[derive(Debug, Clone, Default)]
pub enum Visuals {
    /// `video/` のアニメーション。ポーズは問題ごとに1つ選ぶ
    Video {
        intro: Option<Animation>,
        outro: Option<Animation>,
        poses: Vec<Animation>,
    },
    /// `image/` の静止画。question / answer は両方揃っているときだけ使う
    Stills {
        intro: Option<Animation>,
        outro: Option<Animation>,
        pose: Option<(Animation, Animation)>,
    },
    #[default]
    None,
}

/// 効果音・ボイス1つ分 (デコード前のバイト列)
#[derive(Debug, Clone)]
pub struct SoundClip {
    name: String,
    data: Arc<[u8]>,
}

impl SoundClip {
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    pub fn load(path: &Path) -> Option<Self> {
        let name = path.file_stem()?.to_str()?.to_string();
        match fs::read(path) {
            Ok(bytes) => Some(Self::from_bytes(name, bytes)),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "could not read sound");
                None
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> Arc<[u8]> {
        Arc::clone(&self.data)
    }
}

/// ディレクトリ内の音声ファイルをファイル名 (拡張子なし) で引けるようにする
pub fn load_sound_dir(dir: &Path) -> HashMap<String, SoundClip> {
    let mut sounds = HashMap::new();
    for path in sorted_entries(dir) {
        let is_sound = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| SOUND_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
        if !is_sound {
            continue;
        }
        if let Some(clip) = SoundClip::load(&path) {
            debug!(name = clip.name(), "loaded sound");
            sounds.insert(clip.name().to_string(), clip);
        }
    }
    sounds
}

/// 1回のプレイで使うキャラクター (読み込み後は変更しない)
#[derive(Debug, Clone)]
pub struct Character {
    name: String,
    visuals: Visuals,
    voices: HashMap<String, SoundClip>,
}

impl Character {
    pub fn new(name: impl Into<String>, visuals: Visuals, voices: HashMap<String, SoundClip>) -> Self {
        Self {
            name: name.into(),
            visuals,
            voices,
        }
    }

    /// MARK:キャラクターディレクトリの読み込み
    ///
    /// `video/` があればアニメーション、無ければ `image/` の静止画を使う。
    /// 見つからないファイルはそのまま無しとして扱う。
    pub fn load(dir: &Path) -> Self {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!(character = %name, "loading character");
        let started = Instant::now();

        let video_dir = dir.join("video");
        let image_dir = dir.join("image");

        let visuals = if video_dir.is_dir() {
            let poses: Vec<Animation> = sorted_entries(&video_dir)
                .into_iter()
                .filter(|path| {
                    let file = path.file_name().and_then(|f| f.to_str()).unwrap_or_default();
                    file.starts_with("pose") && file.ends_with(".anim")
                })
                .filter_map(|path| Animation::load(&path))
                .collect();
            Visuals::Video {
                intro: Animation::load(&video_dir.join("intro.anim")),
                outro: Animation::load(&video_dir.join("outro.anim")),
                poses,
            }
        } else if image_dir.is_dir() {
            let question = Animation::load(&image_dir.join("question.txt"));
            let answer = Animation::load(&image_dir.join("answer.txt"));
            Visuals::Stills {
                intro: Animation::load(&image_dir.join("intro.txt")),
                outro: Animation::load(&image_dir.join("outro.txt")),
                pose: question.zip(answer),
            }
        } else {
            Visuals::None
        };

        let voices = load_sound_dir(&dir.join("voice"));
        info!(
            character = %name,
            voices = voices.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "character loaded"
        );
        Self::new(name, visuals, voices)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 段階に応じた絵。`pose` は問題ごとに選ばれたポーズ番号
    pub fn frames_for(&self, stage: Stage, pose: usize) -> Option<&Animation> {
        match (&self.visuals, stage) {
            (Visuals::Video { intro, .. }, Stage::Intro)
            | (Visuals::Stills { intro, .. }, Stage::Intro) => intro.as_ref(),
            (Visuals::Video { outro, .. }, Stage::Bye)
            | (Visuals::Stills { outro, .. }, Stage::Bye) => outro.as_ref(),
            (Visuals::Video { poses, .. }, _) => {
                if poses.is_empty() {
                    None
                } else {
                    poses.get(pose % poses.len())
                }
            }
            (Visuals::Stills { pose: pair, .. }, Stage::Thinking) => {
                pair.as_ref().map(|(question, _)| question)
            }
            (Visuals::Stills { pose: pair, .. }, _) => pair.as_ref().map(|(_, answer)| answer),
            (Visuals::None, _) => None,
        }
    }

    pub fn pose_count(&self) -> usize {
        match &self.visuals {
            Visuals::Video { poses, .. } => poses.len(),
            _ => 0,
        }
    }

    /// 次の問題で使うポーズを選ぶ
    pub fn pick_pose<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        match self.pose_count() {
            0 | 1 => 0,
            n => rng.random_range(0..n),
        }
    }

    pub fn voice(&self, name: &str) -> Option<&SoundClip> {
        self.voices.get(name)
    }
}

/// `characters/` 直下のディレクトリ名一覧
pub fn list_characters(root: &Path) -> Vec<PathBuf> {
    sorted_entries(root)
        .into_iter()
        .filter(|path| path.is_dir())
        .collect()
}

/// MARK:ランダムに1人選んで読み込む
pub fn pick_character<R: Rng + ?Sized>(root: &Path, rng: &mut R) -> Option<Character> {
    let candidates = list_characters(root);
    let Some(dir) = candidates.choose(rng) else {
        info!(root = %root.display(), "no characters found");
        return None;
    };
    Some(Character::load(dir))
}

fn sorted_entries(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    paths.sort();
    paths
}

// ============================================
// src/audio.rs
// 効果音・ボイスの再生
// ============================================

use std::collections::HashMap;

use tracing::debug;

use crate::assets::{Character, SoundClip};

/// 再生先。チャンネル名ごとに「今鳴っているか」を問い合わせられる
pub trait AudioOut {
    /// チャンネルで新しく鳴らす (鳴っている音は最後まで流す)
    fn start(&mut self, channel: &str, clip: &SoundClip);
    fn stop(&mut self, channel: &str);
    fn stop_all(&mut self);
    fn is_playing(&self, channel: &str) -> bool;
}

/// 音を出さない再生先 (音声デバイスが無いとき)
#[derive(Debug, Default)]
pub struct Silent;

impl AudioOut for Silent {
    fn start(&mut self, _channel: &str, _clip: &SoundClip) {}
    fn stop(&mut self, _channel: &str) {}
    fn stop_all(&mut self) {}
    fn is_playing(&self, _channel: &str) -> bool {
        false
    }
}

#[cfg(feature = "audio")]
mod device {
    use std::collections::HashMap;
    use std::io::Cursor;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
    use tracing::warn;

    use super::AudioOut;
    use crate::assets::SoundClip;

    /// rodio による再生。チャンネルごとに Sink を1つ持つ
    pub struct RodioOut {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sinks: HashMap<String, Sink>,
        volume: f32,
    }

    impl RodioOut {
        pub fn open(volume: f32) -> Result<Self, rodio::StreamError> {
            let (stream, handle) = OutputStream::try_default()?;
            Ok(Self {
                _stream: stream,
                handle,
                sinks: HashMap::new(),
                volume,
            })
        }
    }

    impl AudioOut for RodioOut {
        fn start(&mut self, channel: &str, clip: &SoundClip) {
            let Ok(sink) = Sink::try_new(&self.handle) else {
                return;
            };
            sink.set_volume(self.volume);

            let source = match Decoder::new(Cursor::new(clip.data())) {
                Ok(source) => source,
                Err(err) => {
                    warn!(sound = clip.name(), error = %err, "could not decode sound");
                    return;
                }
            };
            sink.append(source);

            // 前の音は切らずに最後まで鳴らす
            if let Some(previous) = self.sinks.insert(channel.to_string(), sink) {
                previous.detach();
            }
        }

        fn stop(&mut self, channel: &str) {
            if let Some(sink) = self.sinks.remove(channel) {
                sink.stop();
            }
        }

        fn stop_all(&mut self) {
            for (_, sink) in self.sinks.drain() {
                sink.stop();
            }
        }

        fn is_playing(&self, channel: &str) -> bool {
            self.sinks.get(channel).is_some_and(|sink| !sink.empty())
        }
    }
}

/// 音声出力を開く。開けなければ無音
pub fn open_output(volume: f32) -> Box<dyn AudioOut> {
    #[cfg(feature = "audio")]
    {
        match device::RodioOut::open(volume) {
            Ok(out) => return Box::new(out),
            Err(err) => tracing::warn!(error = %err, "no audio output, continuing silently"),
        }
    }
    #[cfg(not(feature = "audio"))]
    {
        debug!(volume, "built without audio support, continuing silently");
    }
    Box::new(Silent)
}

/// MARK:共通効果音とボイスの管理
///
/// プレイ全体で1つだけ作り、ループから参照を渡して使う。
pub struct SoundBoard {
    out: Box<dyn AudioOut>,
    common: HashMap<String, SoundClip>,
}

impl SoundBoard {
    pub fn new(out: Box<dyn AudioOut>, common: HashMap<String, SoundClip>) -> Self {
        Self { out, common }
    }

    pub fn play_common(&mut self, name: &str) {
        if let Some(clip) = self.common.get(name) {
            debug!(sound = name, "play");
            self.out.start(&common_channel(name), clip);
        }
    }

    pub fn stop_common(&mut self, name: &str) {
        if self.common.contains_key(name) {
            self.out.stop(&common_channel(name));
        }
    }

    pub fn common_playing(&self, name: &str) -> bool {
        self.out.is_playing(&common_channel(name))
    }

    /// キャラクターのボイス (`intro`, `outro`, `A`..`D`)。無ければ何もしない
    pub fn play_voice(&mut self, character: Option<&Character>, name: &str) {
        let Some(clip) = character.and_then(|c| c.voice(name)) else {
            return;
        };
        debug!(voice = name, "play");
        self.out.start(&voice_channel(name), clip);
    }

    pub fn stop_all(&mut self) {
        self.out.stop_all();
    }
}

fn common_channel(name: &str) -> String {
    format!("common/{name}")
}

fn voice_channel(name: &str) -> String {
    format!("voice/{name}")
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    use super::AudioOut;
    use crate::assets::SoundClip;

    /// 呼び出しを記録するだけの再生先
    #[derive(Clone, Default)]
    pub struct Recorder {
        pub log: Rc<RefCell<Vec<String>>>,
        pub playing: Rc<RefCell<HashSet<String>>>,
    }

    impl Recorder {
        pub fn events(&self) -> Vec<String> {
            self.log.borrow().clone()
        }

        /// 再生が終わったことにする
        pub fn finish(&self, channel: &str) {
            self.playing.borrow_mut().remove(channel);
        }
    }

    impl AudioOut for Recorder {
        fn start(&mut self, channel: &str, _clip: &SoundClip) {
            self.log.borrow_mut().push(format!("start {channel}"));
            self.playing.borrow_mut().insert(channel.to_string());
        }

        fn stop(&mut self, channel: &str) {
            self.log.borrow_mut().push(format!("stop {channel}"));
            self.playing.borrow_mut().remove(channel);
        }

        fn stop_all(&mut self) {
            self.log.borrow_mut().push("stop all".to_string());
            self.playing.borrow_mut().clear();
        }

        fn is_playing(&self, channel: &str) -> bool {
            self.playing.borrow().contains(channel)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::Recorder;
    use super::*;
    use crate::assets::Visuals;

    fn board(recorder: &Recorder) -> SoundBoard {
        let common = ["timer", "answer"]
            .into_iter()
            .map(|name| (name.to_string(), SoundClip::from_bytes(name, vec![0u8; 4])))
            .collect();
        SoundBoard::new(Box::new(recorder.clone()), common)
    }

    #[test]
    fn unknown_common_sounds_are_ignored() {
        let recorder = Recorder::default();
        let mut board = board(&recorder);
        board.play_common("fanfare");
        board.stop_common("fanfare");
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn common_sounds_use_their_own_channel() {
        let recorder = Recorder::default();
        let mut board = board(&recorder);
        board.play_common("timer");
        assert!(board.common_playing("timer"));
        assert!(!board.common_playing("answer"));
        board.stop_common("timer");
        assert!(!board.common_playing("timer"));
        assert_eq!(recorder.events(), ["start common/timer", "stop common/timer"]);
    }

    #[test]
    fn voices_need_a_character_with_that_clip() {
        let recorder = Recorder::default();
        let mut board = board(&recorder);
        board.play_voice(None, "A");

        let voices = [("A".to_string(), SoundClip::from_bytes("A", vec![1u8]))]
            .into_iter()
            .collect();
        let character = Character::new("robo", Visuals::None, voices);
        board.play_voice(Some(&character), "B");
        board.play_voice(Some(&character), "A");

        assert_eq!(recorder.events(), ["start voice/A"]);
    }

    #[test]
    fn silent_output_never_plays() {
        let mut board = SoundBoard::new(Box::new(Silent), HashMap::new());
        board.play_common("timer");
        assert!(!board.common_playing("timer"));
        board.stop_all();
    }
}

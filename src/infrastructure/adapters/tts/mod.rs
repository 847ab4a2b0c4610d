//! TTS Adapter - 语音引擎实现

mod command_speech_client;
mod fake_speech_client;

pub use command_speech_client::{CommandSpeechClient, CommandSpeechClientConfig};
pub use fake_speech_client::{FakeSpeechClient, SpeechScript};

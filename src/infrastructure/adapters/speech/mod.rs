//! Speech Adapter - 语音识别客户端实现

mod fake_speech_recognizer;
mod http_speech_client;

pub use fake_speech_recognizer::FakeSpeechRecognizer;
pub use http_speech_client::*;

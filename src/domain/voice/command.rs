//! Voice Context - 关键词匹配
//!
//! 按表顺序做子串匹配，第一个命中的动作生效

use serde::{Deserialize, Serialize};

/// 播放动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceAction {
    /// 回到上次播放位置
    GoBack,
    /// 停止播放
    Stop,
    /// 开始播放
    Play,
}

impl VoiceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceAction::GoBack => "go_back",
            VoiceAction::Stop => "stop",
            VoiceAction::Play => "play",
        }
    }

    /// 返回给前端的提示信息
    pub fn message(&self) -> &'static str {
        match self {
            VoiceAction::GoBack => "前回再生位置に戻ります",
            VoiceAction::Stop => "再生を停止します",
            VoiceAction::Play => "再生を開始します",
        }
    }
}

/// 关键词表（顺序即优先级）
///
/// "とめて" 不包含 "とめる"，单独列出
pub const KEYWORD_TABLE: &[(VoiceAction, &[&str])] = &[
    (VoiceAction::GoBack, &["戻って", "もどって"]),
    (VoiceAction::Stop, &["停止", "とめる", "とめて"]),
    (VoiceAction::Play, &["再生", "さいせい"]),
];

/// 将识别文本匹配为播放动作
pub fn match_command(text: &str) -> Option<VoiceAction> {
    KEYWORD_TABLE
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(action, _)| *action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_each_action() {
        assert_eq!(match_command("再生して"), Some(VoiceAction::Play));
        assert_eq!(match_command("ちょっと戻って"), Some(VoiceAction::GoBack));
        assert_eq!(match_command("とめて"), Some(VoiceAction::Stop));
        assert_eq!(match_command("停止"), Some(VoiceAction::Stop));
        assert_eq!(match_command("さいせい"), Some(VoiceAction::Play));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(match_command("こんにちは"), None);
        assert_eq!(match_command(""), None);
    }

    #[test]
    fn test_first_match_wins() {
        // go_back 排在 play 之前
        assert_eq!(match_command("戻って再生"), Some(VoiceAction::GoBack));
        // stop 排在 play 之前
        assert_eq!(match_command("再生を停止"), Some(VoiceAction::Stop));
    }

    #[test]
    fn test_action_wire_names() {
        assert_eq!(VoiceAction::GoBack.as_str(), "go_back");
        assert_eq!(
            serde_json::to_string(&VoiceAction::GoBack).unwrap(),
            "\"go_back\""
        );
    }
}

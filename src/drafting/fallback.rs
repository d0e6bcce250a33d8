//! Canned letter returned when no backend key is configured.
//!
//! Lets the whole draft → review → layout flow run without credentials.

use super::models::{LetterRequest, Tone};

pub const SIMULATED_NOTICE: &str = "（此為模擬回應，請設定 API 金鑰以啟用完整功能）";

fn tone_label(tone: Tone) -> Option<&'static str> {
    match tone {
        Tone::Professional => None,
        Tone::Aggressive => Some("（語氣：強硬）"),
        Tone::Soft => Some("（語氣：溫和）"),
    }
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        placeholder
    } else {
        trimmed
    }
}

/// Deterministic four-part letter for the given request.
pub fn fallback_letter(request: &LetterRequest) -> String {
    let receiver = or_placeholder(&request.receiver_name, "[收件人]");
    let sender = or_placeholder(&request.sender_name, "[寄件人]");

    let mut paragraphs = vec![format!(
        "查台端{receiver}向本人{sender}承租位於[租屋地址]之房屋，雙方約定每月租金[金額]元。{SIMULATED_NOTICE}"
    )];
    if let Some(label) = tone_label(request.tone) {
        paragraphs.push(label.to_string());
    }
    paragraphs.push(
        "惟台端自民國[年份]年[月份]月起，即未依約給付租金，迄今已積欠租金達三個月。".to_string(),
    );
    paragraphs.push(
        "茲特函通知台端，請將上開積欠之租金全數匯入本人指定之帳戶。".to_string(),
    );
    paragraphs.push(
        "限台端於函到七日內履行，若屆期仍未履行，本人將依民法第440條規定終止租賃契約，並請求遷讓房屋及依法追討積欠款項，希勿自誤，以免訟累。"
            .to_string(),
    );

    paragraphs.join("\n\n")
}

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Code listing and free-text explanation split out of one reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedResult {
    pub code: String,
    pub explanation: String,
}

impl GeneratedResult {
    pub fn has_code(&self) -> bool {
        !self.code.is_empty()
    }
}

fn first_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)```(?:veriloga|verilog|vams)?([\s\S]*?)```")
            .expect("fence pattern is valid")
    })
}

fn any_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"```[\s\S]*?```").expect("fence pattern is valid"))
}

/// Splits a reply into the first fenced block (code) and everything outside
/// all fenced blocks (explanation). A reply without fences yields empty code
/// and the whole trimmed text as explanation.
pub fn extract_reply(reply: &str) -> GeneratedResult {
    let code = first_fence()
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    let explanation = any_fence().replace_all(reply, "").trim().to_string();

    GeneratedResult { code, explanation }
}

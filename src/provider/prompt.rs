//! Prompt construction for a single target.

use crate::types::{Target, Tone};

/// Messages and sampling settings for one provider call.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    /// Build the system instruction and task payload for `target` in `tone`.
    pub fn build(text: &str, target: &Target, tone: &Tone) -> Self {
        Self {
            system: system_instruction(target, tone),
            user: format!("Please repurpose this content:\n\n{}", text),
        }
    }
}

fn system_instruction(target: &Target, tone: &Tone) -> String {
    format!(
        "You are a professional social media strategist and content creator.\n\
         Your task is to repurpose the given content for {}.\n\
         Tone: {}\n\
         \n\
         Guidelines:\n\
         - Optimize for engagement, clarity, and platform-specific norms\n\
         - Maintain the core message while adapting the format\n\
         - Use appropriate formatting (emojis, line breaks, hashtags) based on the platform\n\
         - Make it compelling and shareable\n\
         - Only output the final post content, nothing else",
        target.guidance(),
        tone.guidance()
    )
}

use serde::{Deserialize, Serialize};

/// Destination platforms we rewrite for.
///
/// Ids outside the catalogue are carried as `Other` so newer clients can send
/// platforms this build does not know yet. Their guidance is the raw id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Target {
    Instagram,
    Facebook,
    Linkedin,
    Twitter,
    Other(String),
}

impl Target {
    pub fn id(&self) -> &str {
        match self {
            Target::Instagram => "instagram",
            Target::Facebook => "facebook",
            Target::Linkedin => "linkedin",
            Target::Twitter => "twitter",
            Target::Other(id) => id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Target::Instagram => "Instagram",
            Target::Facebook => "Facebook",
            Target::Linkedin => "LinkedIn",
            Target::Twitter => "X/Twitter",
            Target::Other(id) => id,
        }
    }

    /// Formatting, length and style directive for the prompt.
    pub fn guidance(&self) -> &str {
        match self {
            Target::Instagram => {
                "Instagram (use emojis, hashtags, engaging captions, keep it visual-friendly, max 2200 characters)"
            }
            Target::Facebook => {
                "Facebook (conversational, can be longer, encourage engagement and shares)"
            }
            Target::Linkedin => {
                "LinkedIn (professional, insightful, thought leadership, use line breaks for readability)"
            }
            Target::Twitter => {
                "X/Twitter (concise, punchy, max 280 characters, use relevant hashtags sparingly)"
            }
            Target::Other(id) => id,
        }
    }
}

impl From<&str> for Target {
    fn from(id: &str) -> Self {
        match id {
            "instagram" => Target::Instagram,
            "facebook" => Target::Facebook,
            "linkedin" => Target::Linkedin,
            "twitter" => Target::Twitter,
            other => Target::Other(other.to_string()),
        }
    }
}

impl From<String> for Target {
    fn from(id: String) -> Self {
        match Target::from(id.as_str()) {
            Target::Other(_) => Target::Other(id),
            known => known,
        }
    }
}

impl From<Target> for String {
    fn from(target: Target) -> Self {
        match target {
            Target::Other(id) => id,
            known => known.id().to_string(),
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Style directive applied uniformly across all targets of one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Tone {
    Professional,
    Casual,
    Viral,
    Friendly,
    Other(String),
}

impl Tone {
    pub fn id(&self) -> &str {
        match self {
            Tone::Professional => "professional",
            Tone::Casual => "casual",
            Tone::Viral => "viral",
            Tone::Friendly => "friendly",
            Tone::Other(id) => id,
        }
    }

    pub fn guidance(&self) -> &str {
        match self {
            Tone::Professional => {
                "Professional: formal, authoritative, credible, and business-appropriate"
            }
            Tone::Casual => "Casual: relaxed, friendly, conversational, like talking to a friend",
            Tone::Viral => "Viral: attention-grabbing, shareable, uses hooks and curiosity gaps",
            Tone::Friendly => "Friendly: warm, approachable, positive, and engaging",
            Tone::Other(id) => id,
        }
    }
}

impl From<&str> for Tone {
    fn from(id: &str) -> Self {
        match id {
            "professional" => Tone::Professional,
            "casual" => Tone::Casual,
            "viral" => Tone::Viral,
            "friendly" => Tone::Friendly,
            other => Tone::Other(other.to_string()),
        }
    }
}

impl From<String> for Tone {
    fn from(id: String) -> Self {
        match Tone::from(id.as_str()) {
            Tone::Other(_) => Tone::Other(id),
            known => known,
        }
    }
}

impl From<Tone> for String {
    fn from(tone: Tone) -> Self {
        match tone {
            Tone::Other(id) => id,
            known => known.id().to_string(),
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

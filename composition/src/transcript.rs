//! Debate transcript: raw model text plus a best-effort turn structure.
//!
//! The model is asked for two rounds of `Analyzer:` / `Perspective:` /
//! `Skeptic:` turns but nothing enforces that shape. `raw` is always the
//! exact model text and is what gets displayed; `turns` is parsed from it
//! for inspection and tests and may be empty.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Matches a speaker label at the start of a line, tolerating markdown
/// decoration such as `**Skeptic:**` or `- Analyzer Agent:`.
static SPEAKER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[\s>*_#-]*(analyzer|perspective|skeptic)(?:\s+agent)?[\s*_]*:[\s*_]*(.*)$")
        .expect("SPEAKER_LINE regex should compile")
});

/// Round headers (`Round 1`, `### Round 2:`) are structure, not speech.
static ROUND_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[\s#*_]*round\s+\d+[\s*_:]*$").expect("ROUND_HEADER regex should compile")
});

/// A debate participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Speaker {
    Analyzer,
    Perspective,
    Skeptic,
}

impl Speaker {
    fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "analyzer" => Some(Self::Analyzer),
            "perspective" => Some(Self::Perspective),
            "skeptic" => Some(Self::Skeptic),
            _ => None,
        }
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Analyzer => write!(f, "Analyzer"),
            Self::Perspective => write!(f, "Perspective"),
            Self::Skeptic => write!(f, "Skeptic"),
        }
    }
}

/// One speaker turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebateTurn {
    pub speaker: Speaker,
    pub text: String,
}

/// A synthesized debate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebateTranscript {
    /// Exact model output.
    pub raw: String,
    /// Parsed speaker turns in order of appearance.
    pub turns: Vec<DebateTurn>,
}

impl DebateTranscript {
    /// Parse model output into turns. Never fails.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let mut turns: Vec<DebateTurn> = Vec::new();

        for line in raw.lines() {
            if ROUND_HEADER.is_match(line) {
                continue;
            }
            if let Some(caps) = SPEAKER_LINE.captures(line) {
                if let Some(speaker) = Speaker::from_label(&caps[1]) {
                    turns.push(DebateTurn {
                        speaker,
                        text: caps[2].trim().to_string(),
                    });
                    continue;
                }
            }
            if let Some(current) = turns.last_mut() {
                if !current.text.is_empty() {
                    current.text.push('\n');
                }
                current.text.push_str(line);
            }
        }

        for turn in &mut turns {
            turn.text = turn.text.trim().to_string();
        }

        Self { raw, turns }
    }

    /// Number of complete rounds, i.e. how many times every speaker spoke.
    pub fn rounds(&self) -> usize {
        [Speaker::Analyzer, Speaker::Perspective, Speaker::Skeptic]
            .iter()
            .map(|s| self.turns_by(*s).count())
            .min()
            .unwrap_or(0)
    }

    pub fn turns_by(&self, speaker: Speaker) -> impl Iterator<Item = &DebateTurn> {
        self.turns.iter().filter(move |t| t.speaker == speaker)
    }

    /// `true` when at least one speaker turn was recognised.
    pub fn is_structured(&self) -> bool {
        !self.turns.is_empty()
    }
}

impl std::fmt::Display for DebateTranscript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

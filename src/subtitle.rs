use std::fmt;
use std::str::FromStr;
use tracing::info;

use crate::error::{CutsubError, Result};
use crate::prompt::PromptProvider;

const MODE_QUESTION: &str = "\nSubtitle mode:\n  1. burn-in (render subtitles into the picture)\n  2. soft (add a selectable subtitle track)\nEnter 1 or 2 (default 1): ";

/// How the subtitle file ends up in the final video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubtitleMode {
    /// Rendered permanently into the video stream
    #[default]
    BurnIn,
    /// Carried as a separate, selectable track
    Soft,
}

impl SubtitleMode {
    /// Tag appended to the final video name
    pub fn tag(&self) -> &'static str {
        match self {
            SubtitleMode::BurnIn => "burn-in",
            SubtitleMode::Soft => "soft",
        }
    }

    /// Interpret an interactive answer. Only `2` selects soft subtitles.
    pub fn from_choice(choice: &str) -> Self {
        if choice.trim() == "2" {
            SubtitleMode::Soft
        } else {
            SubtitleMode::BurnIn
        }
    }
}

impl fmt::Display for SubtitleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for SubtitleMode {
    type Err = CutsubError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "burn-in" | "burnin" | "hard" | "1" => Ok(SubtitleMode::BurnIn),
            "soft" | "2" => Ok(SubtitleMode::Soft),
            _ => Err(CutsubError::Config(format!(
                "Invalid subtitle mode '{}'. Valid modes: burn-in, soft",
                s
            ))),
        }
    }
}

/// Ask the operator how subtitles should be merged
pub fn select_subtitle_mode(prompt: &mut dyn PromptProvider) -> Result<SubtitleMode> {
    let answer = prompt.ask(MODE_QUESTION)?;
    let mode = SubtitleMode::from_choice(&answer);
    info!("Subtitle mode: {}", mode);
    Ok(mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::CannedPrompt;

    #[test]
    fn two_selects_soft() {
        let mut prompt = CannedPrompt::new(["2"]);
        assert_eq!(select_subtitle_mode(&mut prompt).unwrap(), SubtitleMode::Soft);
        assert!(prompt.questions()[0].contains("burn-in"));
    }

    #[test]
    fn anything_else_is_burn_in() {
        for answer in ["", "1", "3", "soft", " x ", "22"] {
            let mut prompt = CannedPrompt::new([answer]);
            assert_eq!(
                select_subtitle_mode(&mut prompt).unwrap(),
                SubtitleMode::BurnIn,
                "answer {:?}",
                answer
            );
        }
    }

    #[test]
    fn no_answer_defaults_to_burn_in() {
        let mut prompt = CannedPrompt::default();
        assert_eq!(select_subtitle_mode(&mut prompt).unwrap(), SubtitleMode::BurnIn);
    }

    #[test]
    fn parses_flag_values() {
        assert_eq!("Soft".parse::<SubtitleMode>().unwrap(), SubtitleMode::Soft);
        assert_eq!("burn-in".parse::<SubtitleMode>().unwrap(), SubtitleMode::BurnIn);
        assert_eq!("1".parse::<SubtitleMode>().unwrap(), SubtitleMode::BurnIn);
        assert!(matches!("subtle".parse::<SubtitleMode>(), Err(CutsubError::Config(_))));
    }

    #[test]
    fn tags_name_the_final_video() {
        assert_eq!(SubtitleMode::BurnIn.tag(), "burn-in");
        assert_eq!(SubtitleMode::Soft.to_string(), "soft");
    }
}

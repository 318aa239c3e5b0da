//! Summarization prompts for fresh and continued summaries

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::RecapError;

/// Kind of audio being summarized, fixed for the life of an audio item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioType {
    /// Two or more speakers
    Dialogue,
    /// A single speaker
    SingleSpeech,
}

impl AudioType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dialogue => "dialogue",
            Self::SingleSpeech => "single_speech",
        }
    }

    /// Noun used in the prompt text
    fn noun(&self) -> &'static str {
        match self {
            Self::Dialogue => "dialogue",
            Self::SingleSpeech => "speech",
        }
    }
}

impl FromStr for AudioType {
    type Err = RecapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dialogue" => Ok(Self::Dialogue),
            "single_speech" => Ok(Self::SingleSpeech),
            other => Err(RecapError::InvalidAudioType(other.to_string())),
        }
    }
}

impl fmt::Display for AudioType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the summarization prompt for a raw `type_of_audio` value.
pub fn compose(
    new_content: &str,
    type_of_audio: &str,
    prior_summary: Option<&str>,
) -> Result<String, RecapError> {
    let audio_type = type_of_audio.parse::<AudioType>()?;
    Ok(compose_for(new_content, audio_type, prior_summary))
}

/// Build the summarization prompt.
///
/// Without a prior summary the model summarizes `new_content` alone; with one
/// it merges both into a single summary.
pub fn compose_for(new_content: &str, audio_type: AudioType, prior_summary: Option<&str>) -> String {
    let noun = audio_type.noun();
    match prior_summary {
        None => format!(
            "Summarize a {noun}. The transcript of the {noun} is as follows:\n\
\n\
{new_content}\n\
\n\
Write the summary in the same language as the data. Do not provide a preamble."
        ),
        Some(existing) => format!(
            "I need to summarize a {noun}. There is a pre-existing summary:\n\
\n\
{existing}\n\
\n\
And the new transcript of the {noun} is as follows:\n\
\n\
{new_content}\n\
\n\
Write one single summary for the whole {noun} in the same language as the data. \
Do not provide a preamble."
        ),
    }
}

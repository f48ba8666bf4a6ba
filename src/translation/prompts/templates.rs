/*!
 * Prompt templates and batch framing for LLM backends.
 *
 * A batch of spans is sent as one user message where each span is preceded
 * by an `<<ENTRY_n>>` marker and the message ends with `<<END>>`. The model
 * is asked to echo the markers so the reply can be split back into spans.
 */

use crate::errors::BackendError;
use crate::language_utils;

/// System prompt template with `{source_language}` / `{target_language}` slots.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Instructions appended when more than one span is sent at once.
    pub const BATCH_INSTRUCTIONS: &'static str = "The input contains several segments, each introduced by a marker like <<ENTRY_0>> and terminated by <<END>>. Translate each segment independently, keep every marker exactly as given and in the same order, and output nothing but the markers and the translated segments.";

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Render the template, expanding language codes to their English names.
    pub fn render(&self, source_language: &str, target_language: &str) -> String {
        self.template
            .replace("{source_language}", &language_utils::display_name(source_language))
            .replace("{target_language}", &language_utils::display_name(target_language))
    }

    /// Render the template followed by the batch instructions.
    pub fn render_for_batch(&self, source_language: &str, target_language: &str) -> String {
        format!(
            "{}\n\n{}",
            self.render(source_language, target_language),
            Self::BATCH_INSTRUCTIONS
        )
    }
}

const END_MARKER: &str = "<<END>>";

fn entry_marker(index: usize) -> String {
    format!("<<ENTRY_{}>>", index)
}

/// Frame several spans into one message.
pub fn frame_batch(texts: &[String]) -> String {
    let mut combined = String::new();
    for (index, text) in texts.iter().enumerate() {
        combined.push_str(&entry_marker(index));
        combined.push('\n');
        combined.push_str(text);
        combined.push('\n');
    }
    combined.push_str(END_MARKER);
    combined
}

/// Split a framed reply back into `expected` spans.
///
/// A missing marker makes the whole reply unusable and is reported as a
/// malformed response so the retry controller can try again.
pub fn parse_batch(reply: &str, expected: usize) -> Result<Vec<String>, BackendError> {
    let mut segments = Vec::with_capacity(expected);
    let mut cursor = 0;

    for index in 0..expected {
        let start_marker = entry_marker(index);
        let end_marker = if index + 1 == expected {
            END_MARKER.to_string()
        } else {
            entry_marker(index + 1)
        };

        let start = reply[cursor..]
            .find(&start_marker)
            .map(|pos| cursor + pos + start_marker.len())
            .ok_or_else(|| {
                BackendError::MalformedResponse(format!("missing marker {}", start_marker))
            })?;

        // A trailing END marker is sometimes dropped; accept end of reply for the last entry
        let end = match reply[start..].find(&end_marker) {
            Some(pos) => start + pos,
            None if index + 1 == expected => reply.len(),
            None => {
                return Err(BackendError::MalformedResponse(format!(
                    "missing marker {}",
                    end_marker
                )));
            }
        };

        segments.push(reply[start..end].trim().to_string());
        cursor = end;
    }

    Ok(segments)
}

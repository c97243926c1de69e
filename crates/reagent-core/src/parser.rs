//! Response Parser
//!
//! Extracts a structured intent from raw model output. Models routinely
//! wrap the JSON they were asked for in prose, so extraction is greedy
//! (first `{` through last `}`) rather than anchored to the whole string;
//! a strict full-string decode would reject most otherwise-usable
//! responses.

use serde_json::Value;
use thiserror::Error;

/// Structured intent recovered from one model response
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParsedIntent {
    /// The model wants a tool invoked with a string input
    ToolCall {
        thought: String,
        action: String,
        action_input: String,
    },
    /// The model produced its final answer
    FinalAnswer {
        thought: String,
        final_answer: String,
    },
}

/// Reasons a model response yields no usable intent.
///
/// Each failure maps to a fixed corrective instruction the loop feeds
/// back as the next user turn.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseFailure {
    /// No brace-delimited region in the response at all
    #[error("no JSON object found in model output")]
    NoJson,

    /// A brace-delimited region exists but does not decode as JSON
    #[error("model output is not valid JSON")]
    InvalidJson,

    /// Valid JSON, but neither a final answer nor a complete tool call
    #[error("decoded object has neither 'final_answer' nor 'action'/'action_input'")]
    MissingKeys,
}

impl ParseFailure {
    /// The corrective instruction sent back to the model for this failure.
    pub fn corrective_instruction(&self) -> &'static str {
        match self {
            ParseFailure::NoJson | ParseFailure::InvalidJson => {
                "Please respond with valid JSON only."
            }
            ParseFailure::MissingKeys => {
                "Please provide either 'final_answer' or both 'action' and 'action_input'."
            }
        }
    }
}

/// Parse raw model output into a [`ParsedIntent`].
///
/// Extraction takes the span from the first `{` to the last `}` and
/// decodes it with `serde_json`. Classification checks `final_answer`
/// first (final-answer priority: an object carrying both a final answer
/// and a tool call is treated as a final answer), then requires both
/// `action` and `action_input` for a tool call. A missing `thought`
/// defaults to empty.
///
/// Known hazard: when the output contains multiple independent
/// brace-delimited regions (e.g. an example object inside the reasoning),
/// the greedy span covers all of them and the decode usually fails,
/// recovering via the corrective-instruction path. No attempt is made to
/// pick the "right" object.
///
/// Never panics and never returns anything but a [`ParseFailure`] on bad
/// input.
pub fn parse(raw: &str) -> Result<ParsedIntent, ParseFailure> {
    let start = raw.find('{').ok_or(ParseFailure::NoJson)?;
    let end = raw.rfind('}').ok_or(ParseFailure::NoJson)?;
    if end < start {
        return Err(ParseFailure::NoJson);
    }

    let value: Value =
        serde_json::from_str(&raw[start..=end]).map_err(|_| ParseFailure::InvalidJson)?;

    let Value::Object(object) = value else {
        return Err(ParseFailure::InvalidJson);
    };

    let thought = object.get("thought").map(text_of).unwrap_or_default();

    // Final-answer priority: checked before the tool-call keys.
    if let Some(answer) = object.get("final_answer") {
        return Ok(ParsedIntent::FinalAnswer {
            thought,
            final_answer: text_of(answer),
        });
    }

    match (object.get("action"), object.get("action_input")) {
        (Some(action), Some(input)) => Ok(ParsedIntent::ToolCall {
            thought,
            action: text_of(action),
            action_input: text_of(input),
        }),
        _ => Err(ParseFailure::MissingKeys),
    }
}

/// Coerce a JSON value to the text the loop works with.
///
/// Models occasionally emit numbers or booleans where a string was asked
/// for (`"final_answer": 42`); those render as their plain text form.
fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::schemas::{ToolCall, ToolName};

use super::{
    extract_from_codeblock, parse_partial_json, remove_thought, Instructor, OutputParseError,
    ParsedStep,
};

const REACT_SUFFIX: &str = r#"

AVAILABLE TOOLS:
{{tools}}

OUTPUT FORMAT (use exactly this structure):
THOUGHT: [your reasoning about what to do next]
ACTION: tool_name{"param": "value"}

After receiving an OBSERVATION, continue with another THOUGHT-ACTION cycle or provide:
FINAL ANSWER: [concise answer to the user's question]

RULES:
1. Always start with THOUGHT
2. Use ACTION with valid JSON parameters
3. Explore schema before querying (list_tables, describe_table)
4. Only use SELECT queries
5. Write exactly one ACTION per response and stop; never write the OBSERVATION yourself
6. Provide FINAL ANSWER when you have the complete answer

EXAMPLE:
User: How many users are there?
THOUGHT: I need to find tables first
ACTION: list_tables{}
[After observation]
THOUGHT: Found users table, let me check its schema
ACTION: describe_table{"table_name": "users"}
[After observation]
THOUGHT: Now I can count the rows
ACTION: query_database{"query": "SELECT COUNT(*) FROM users"}
[After observation]
FINAL ANSWER: There are 150 users in the database."#;

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*(THOUGHT|ACTION|OBSERVATION|FINAL[ _]ANSWER)[ \t]*:")
        .expect("Static regex is valid")
});
static TOOL_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_\-]*)").expect("Static regex is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Thought,
    Action,
    Observation,
    FinalAnswer,
}

impl Marker {
    fn from_match(label: &str) -> Self {
        match label.as_bytes().first().map(u8::to_ascii_uppercase) {
            Some(b'T') => Marker::Thought,
            Some(b'A') => Marker::Action,
            Some(b'O') => Marker::Observation,
            _ => Marker::FinalAnswer,
        }
    }
}

struct Segment<'a> {
    marker: Marker,
    body: &'a str,
}

/// Splits `text` at every marker that opens a line. Returns whatever precedes the first marker
/// and the marked segments in order of appearance.
fn split_segments(text: &str) -> (&str, Vec<Segment<'_>>) {
    let matches = MARKER_RE.captures_iter(text).collect::<Vec<_>>();
    let preamble_end = matches
        .first()
        .and_then(|c| c.get(0))
        .map(|m| m.start())
        .unwrap_or(text.len());

    let mut segments = Vec::with_capacity(matches.len());
    for (i, captures) in matches.iter().enumerate() {
        let (Some(whole), Some(label)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let end = matches
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(text.len());
        segments.push(Segment {
            marker: Marker::from_match(label.as_str()),
            body: text[whole.end()..end].trim(),
        });
    }

    (text[..preamble_end].trim(), segments)
}

/// Reads the `THOUGHT: … / ACTION: tool{json}` and `FINAL ANSWER: …` format.
///
/// When a completion carries both an action and a final answer, the one
/// written first wins; anything after an action is the model guessing at an
/// observation it has not seen. A completion without any marker is taken as a
/// final answer.
#[derive(Debug, Clone, Default)]
pub struct ReActParser;

impl ReActParser {
    pub fn new() -> Self {
        Self
    }

    fn parse_action(body: &str) -> Result<ToolCall, OutputParseError> {
        let name = TOOL_NAME_RE
            .captures(body)
            .and_then(|c| c.get(1))
            .ok_or(OutputParseError::MissingToolName)?;
        let tool_name = name.as_str().parse::<ToolName>()?;
        let arguments = Self::parse_arguments(body[name.end()..].trim())?;
        Ok(ToolCall::new(tool_name, arguments))
    }

    fn parse_arguments(text: &str) -> Result<Map<String, Value>, OutputParseError> {
        let text = text
            .strip_prefix('(')
            .and_then(|t| t.strip_suffix(')'))
            .map(str::trim)
            .unwrap_or(text);
        let text = extract_from_codeblock(text);
        if text.is_empty() {
            return Ok(Map::new());
        }

        let Some(start) = text.find('{') else {
            return Err(OutputParseError::InvalidArguments(format!(
                "expected a JSON object, got `{text}`"
            )));
        };
        let end = closing_brace(text, start).unwrap_or(text.len());
        let json = &text[start..end];

        match parse_partial_json(json) {
            Some(Value::Object(arguments)) => Ok(arguments),
            Some(other) => Err(OutputParseError::InvalidArguments(format!(
                "expected a JSON object, got {other}"
            ))),
            None => Err(OutputParseError::InvalidArguments(format!(
                "invalid JSON `{json}`"
            ))),
        }
    }
}

/// Byte offset just past the `}` that closes the object opened at `start`.
/// Braces inside JSON strings are skipped. `None` when the object never closes.
fn closing_brace(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(start + i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

impl Instructor for ReActParser {
    fn create_suffix(&self, tools: &str) -> String {
        REACT_SUFFIX.replace("{{tools}}", tools)
    }

    fn parse(&self, output: &str) -> ParsedStep {
        let text = remove_thought(output).trim();
        if text.is_empty() {
            return ParsedStep::ParseError {
                thought: String::new(),
                raw: output.to_string(),
                error: OutputParseError::EmptyResponse,
            };
        }

        let (preamble, segments) = split_segments(text);
        let marked_thought = segments
            .iter()
            .find(|s| s.marker == Marker::Thought)
            .map(|s| s.body);
        let thought = marked_thought.unwrap_or(preamble).to_string();

        let decisive = segments
            .iter()
            .find(|s| matches!(s.marker, Marker::Action | Marker::FinalAnswer));

        match decisive {
            Some(Segment {
                marker: Marker::FinalAnswer,
                body,
            }) if body.is_empty() => ParsedStep::ParseError {
                thought,
                raw: text.to_string(),
                error: OutputParseError::EmptyFinalAnswer,
            },
            Some(Segment {
                marker: Marker::FinalAnswer,
                body,
            }) => ParsedStep::Final {
                thought,
                answer: body.to_string(),
            },
            Some(Segment { body, .. }) => match Self::parse_action(body) {
                Ok(call) => ParsedStep::Action { thought, call },
                Err(error) => ParsedStep::ParseError {
                    thought,
                    raw: text.to_string(),
                    error,
                },
            },
            None => {
                let answer = match marked_thought {
                    Some(t) if !t.is_empty() => t,
                    _ => text,
                };
                log::debug!("no ACTION or FINAL ANSWER marker, treating output as final answer");
                ParsedStep::Final {
                    thought: String::new(),
                    answer: answer.to_string(),
                }
            }
        }
    }
}

//! # Action Decoder
//!
//! Turns model output into a typed [`Action`]. Model output is untrusted: it
//! may be wrapped in a markdown code fence, may not be JSON at all, and may
//! name actions or omit fields arbitrarily. Decoding is a pure function of
//! the input text.

use actuator_core::{Action, ActionKind};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::DecodeError;

const FENCE: &str = "```";

/// Remove one leading and one trailing markdown fence marker, if present.
///
/// The leading marker may carry an info string such as `json`. Whitespace
/// around the payload is trimmed. Text without fences is returned trimmed.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix(FENCE) {
        let tag_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(rest.len());
        text = rest[tag_len..].trim_start();
    }

    if let Some(rest) = text.trim_end().strip_suffix(FENCE) {
        text = rest;
    }

    text.trim()
}

/// Decode a raw payload into an [`Action`].
pub fn decode(raw: &str) -> Result<Action, DecodeError> {
    let payload = strip_code_fence(raw);

    let value: Value = serde_json::from_str(payload).map_err(|e| {
        debug!(error = %e, "action payload is not valid JSON");
        DecodeError::MalformedPayload
    })?;

    match value {
        Value::Object(object) => decode_object(&object),
        _ => {
            debug!("action payload is JSON but not an object");
            Err(DecodeError::MalformedPayload)
        }
    }
}

/// Decode an already-parsed action object.
pub(crate) fn decode_object(object: &Map<String, Value>) -> Result<Action, DecodeError> {
    let kind = match object.get("action") {
        Some(Value::String(name)) => ActionKind::from_wire(name)
            .ok_or_else(|| DecodeError::UnknownAction(name.clone()))?,
        Some(other) => return Err(DecodeError::UnknownAction(other.to_string())),
        None => return Err(DecodeError::UnknownAction(Value::Null.to_string())),
    };

    match kind {
        ActionKind::CreateFile => Ok(Action::CreateFile {
            path: non_empty_str(object, kind, "file_path")?,
            content: any_str(object, kind, "content")?,
        }),
        ActionKind::AppendFile => Ok(Action::AppendFile {
            path: non_empty_str(object, kind, "file_path")?,
            content: any_str(object, kind, "content")?,
        }),
        ActionKind::RunCommand => Ok(Action::RunCommand {
            command: non_empty_str(object, kind, "command")?,
        }),
    }
}

/// A string field where the empty string is as good as missing.
fn non_empty_str(
    object: &Map<String, Value>,
    kind: ActionKind,
    field: &'static str,
) -> Result<String, DecodeError> {
    match object.get(field) {
        Some(Value::String(value)) if !value.is_empty() => Ok(value.clone()),
        _ => Err(DecodeError::MissingField { kind, field }),
    }
}

/// A string field where the empty string is valid content.
fn any_str(
    object: &Map<String, Value>,
    kind: ActionKind,
    field: &'static str,
) -> Result<String, DecodeError> {
    match object.get(field) {
        Some(Value::String(value)) => Ok(value.clone()),
        _ => Err(DecodeError::MissingField { kind, field }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence_variants() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("  {\"a\": 1}  "), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```JSON {\"a\": 1}```"), "{\"a\": 1}");
        // Only a leading marker
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}"), "{\"a\": 1}");
        // Only a trailing marker
        assert_eq!(strip_code_fence("{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_code_fence_removes_one_marker_each_side() {
        assert_eq!(strip_code_fence("``````x``````"), "```x```");
    }

    #[test]
    fn test_decode_create_file() {
        let action = decode(
            r#"{"action": "create_file", "file_path": "/tmp/a.txt", "content": "hello"}"#,
        )
        .unwrap();
        assert_eq!(
            action,
            Action::CreateFile {
                path: "/tmp/a.txt".to_string(),
                content: "hello".to_string(),
            }
        );
    }

    #[test]
    fn test_decode_append_with_empty_content() {
        let action = decode(
            r#"{"action": "append_to_file", "file_path": "log.txt", "content": ""}"#,
        )
        .unwrap();
        assert_eq!(
            action,
            Action::AppendFile {
                path: "log.txt".to_string(),
                content: String::new(),
            }
        );
    }

    #[test]
    fn test_decode_run_command_verbatim() {
        let action =
            decode(r#"{"action": "run_command", "command": "  ls -la | grep x  "}"#).unwrap();
        assert_eq!(
            action,
            Action::RunCommand {
                command: "  ls -la | grep x  ".to_string(),
            }
        );
    }

    #[test]
    fn test_decode_ignores_extra_fields() {
        let action = decode(
            r#"{"action": "run_command", "command": "pwd", "reasoning": "where am I"}"#,
        )
        .unwrap();
        assert_eq!(action.kind(), ActionKind::RunCommand);
    }

    #[test]
    fn test_decode_discriminator_must_match_exactly() {
        assert_eq!(
            decode(r#"{"action": "RUN_COMMAND", "command": "pwd"}"#),
            Err(DecodeError::UnknownAction("RUN_COMMAND".to_string()))
        );
        assert_eq!(
            decode(r#"{"action": " Create_File ", "file_path": "x", "content": ""}"#),
            Err(DecodeError::UnknownAction(" Create_File ".to_string()))
        );
    }

    #[test]
    fn test_decode_blank_discriminator() {
        assert_eq!(
            decode(r#"{"action": "   ", "command": "pwd"}"#),
            Err(DecodeError::UnknownAction("   ".to_string()))
        );
        assert_eq!(
            decode(r#"{"action": "", "command": "pwd"}"#),
            Err(DecodeError::UnknownAction(String::new()))
        );
        assert_eq!(
            DecodeError::UnknownAction("   ".to_string()).to_string(),
            "Unknown action: '   '"
        );
    }

    #[test]
    fn test_decode_fenced_matches_bare() {
        let bare = r#"{"action": "create_file", "file_path": "x", "content": "y"}"#;
        let fenced = format!("```json\n{}\n```", bare);
        assert_eq!(decode(&fenced), decode(bare));
        assert!(decode(&fenced).is_ok());
    }

    #[test]
    fn test_decode_malformed() {
        assert_eq!(decode("{ not valid json"), Err(DecodeError::MalformedPayload));
        assert_eq!(decode(""), Err(DecodeError::MalformedPayload));
        assert_eq!(decode("[1, 2]"), Err(DecodeError::MalformedPayload));
        assert_eq!(decode("\"create_file\""), Err(DecodeError::MalformedPayload));
    }

    #[test]
    fn test_decode_unknown_action() {
        assert_eq!(
            decode(r#"{"action": "delete_file", "file_path": "/etc/passwd"}"#),
            Err(DecodeError::UnknownAction("delete_file".to_string()))
        );
        assert_eq!(
            decode(r#"{"file_path": "/tmp/x"}"#),
            Err(DecodeError::UnknownAction("null".to_string()))
        );
        assert_eq!(
            decode(r#"{"action": 7}"#),
            Err(DecodeError::UnknownAction("7".to_string()))
        );
    }

    #[test]
    fn test_decode_missing_fields() {
        assert_eq!(
            decode(r#"{"action": "create_file", "file_path": "/tmp/x"}"#),
            Err(DecodeError::MissingField {
                kind: ActionKind::CreateFile,
                field: "content",
            })
        );
        assert_eq!(
            decode(r#"{"action": "create_file", "file_path": "", "content": "x"}"#),
            Err(DecodeError::MissingField {
                kind: ActionKind::CreateFile,
                field: "file_path",
            })
        );
        assert_eq!(
            decode(r#"{"action": "append_to_file", "file_path": "a", "content": null}"#),
            Err(DecodeError::MissingField {
                kind: ActionKind::AppendFile,
                field: "content",
            })
        );
        assert_eq!(
            decode(r#"{"action": "run_command", "command": ""}"#),
            Err(DecodeError::MissingField {
                kind: ActionKind::RunCommand,
                field: "command",
            })
        );
        assert_eq!(
            decode(r#"{"action": "run_command", "command": ["ls"]}"#),
            Err(DecodeError::MissingField {
                kind: ActionKind::RunCommand,
                field: "command",
            })
        );
    }
}

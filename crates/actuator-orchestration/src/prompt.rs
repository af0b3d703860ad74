//! System instructions that pin the model to the action vocabulary the
//! engine understands.

pub const ACTION_INSTRUCTIONS: &str = r#"You translate a developer's request into exactly one action for a local machine.
Use one of these JSON shapes:
{"action": "create_file", "file_path": "<path>", "content": "<full file contents>"}
{"action": "append_to_file", "file_path": "<path>", "content": "<text to append>"}
{"action": "run_command", "command": "<shell command>"}

Paths are relative to the current working directory unless the request names an absolute path.
Respond ONLY with the JSON object. Do not wrap it in ```."#;

pub const PLAN_INSTRUCTIONS: &str = r#"You are an expert software project planner. Turn the developer's request into an ordered list of actions for a local machine.
Respond with a JSON object of the form {"steps": [...]}, where every step has a short "title" and is one of:
{"title": "<title>", "action": "create_file", "file_path": "<path>", "content": "<full file contents>"}
{"title": "<title>", "action": "append_to_file", "file_path": "<path>", "content": "<text to append>"}
{"title": "<title>", "action": "run_command", "command": "<shell command>"}

Steps run in order, in the current working directory. Create files before running commands that need them.
Respond ONLY with the JSON object. Do not wrap it in ```."#;

#[cfg(test)]
mod tests {
    use super::*;
    use actuator_core::ActionKind;

    #[test]
    fn test_instructions_name_every_action() {
        for kind in ActionKind::ALL {
            assert!(ACTION_INSTRUCTIONS.contains(kind.as_str()));
            assert!(PLAN_INSTRUCTIONS.contains(kind.as_str()));
            for field in kind.required_fields() {
                assert!(ACTION_INSTRUCTIONS.contains(field));
            }
        }
        assert!(PLAN_INSTRUCTIONS.contains("\"steps\""));
    }
}

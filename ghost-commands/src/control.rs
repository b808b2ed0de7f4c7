use anyhow::Context as _;
use serde::Deserialize;

use ghost_utils::formatting::parse_bool_flag;

use crate::{CommandMeta, find_command};

/// One operator command from the management surface.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum ControlCommand {
    Start,
    Stop,
    SetReply {
        text: String,
    },
    #[serde(rename = "toggleLLM", alias = "toggleLlm")]
    ToggleLlm {
        enabled: bool,
    },
    SetSystemPrompt {
        prompt: String,
    },
    SetModel {
        model: String,
    },
    SendMessage {
        #[serde(rename = "userId")]
        user_id: u64,
        text: String,
    },
    FetchMessages {
        #[serde(rename = "userId")]
        user_id: u64,
        #[serde(default, rename = "offsetId")]
        offset_id: u64,
    },
    Help,
}

/// Parse a control line: a JSON object (`{"command":"setModel","model":"..."}`)
/// or the plain form `<command> <args...>`.
pub fn parse_command_line(line: &str) -> anyhow::Result<ControlCommand> {
    let line = line.trim();
    if line.is_empty() {
        anyhow::bail!("empty command");
    }

    if line.starts_with('{') {
        return serde_json::from_str(line).context("invalid JSON control command");
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    let meta = find_command(name)
        .with_context(|| format!("unknown command `{name}`; type `help` for a list"))?;

    let command = match meta.name {
        "start" => ControlCommand::Start,
        "stop" => ControlCommand::Stop,
        "help" => ControlCommand::Help,
        "setReply" => ControlCommand::SetReply {
            text: require_text(rest, meta)?,
        },
        "toggleLLM" => ControlCommand::ToggleLlm {
            enabled: parse_bool_flag(rest).with_context(|| usage(meta))?,
        },
        "setSystemPrompt" => ControlCommand::SetSystemPrompt {
            prompt: require_text(rest, meta)?,
        },
        "setModel" => {
            let model = require_text(rest, meta)?;
            if model.contains(char::is_whitespace) {
                anyhow::bail!(usage(meta));
            }
            ControlCommand::SetModel { model }
        }
        "sendMessage" => {
            let (raw_user, text) = rest.split_once(char::is_whitespace).with_context(|| usage(meta))?;
            ControlCommand::SendMessage {
                user_id: parse_user_id(raw_user, meta)?,
                text: require_text(text, meta)?,
            }
        }
        "fetchMessages" => {
            let mut args = rest.split_whitespace();
            let user_id = parse_user_id(args.next().unwrap_or_default(), meta)?;
            let offset_id = match args.next() {
                Some(raw) => raw.parse::<u64>().with_context(|| usage(meta))?,
                None => 0,
            };
            if args.next().is_some() {
                anyhow::bail!(usage(meta));
            }
            ControlCommand::FetchMessages { user_id, offset_id }
        }
        other => anyhow::bail!("command `{other}` has no parser"),
    };

    Ok(command)
}

fn usage(meta: &CommandMeta) -> String {
    format!("Usage: `{}`", meta.usage)
}

fn require_text(raw: &str, meta: &CommandMeta) -> anyhow::Result<String> {
    let text = raw.trim();
    if text.is_empty() {
        anyhow::bail!(usage(meta));
    }
    Ok(text.to_owned())
}

fn parse_user_id(raw: &str, meta: &CommandMeta) -> anyhow::Result<u64> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|id| *id > 0)
        .with_context(|| usage(meta))
}

#[cfg(test)]
mod tests {
    use super::{ControlCommand, parse_command_line};

    #[test]
    fn parses_json_commands() {
        assert_eq!(
            parse_command_line(r#"{"command":"start"}"#).unwrap(),
            ControlCommand::Start
        );
        assert_eq!(
            parse_command_line(r#"{"command":"setReply","text":"back soon"}"#).unwrap(),
            ControlCommand::SetReply {
                text: "back soon".to_owned()
            }
        );
        assert_eq!(
            parse_command_line(r#"{"command":"toggleLLM","enabled":true}"#).unwrap(),
            ControlCommand::ToggleLlm { enabled: true }
        );
        assert_eq!(
            parse_command_line(r#"{"command":"sendMessage","userId":42,"text":"hey"}"#).unwrap(),
            ControlCommand::SendMessage {
                user_id: 42,
                text: "hey".to_owned()
            }
        );
        assert_eq!(
            parse_command_line(r#"{"command":"fetchMessages","userId":42}"#).unwrap(),
            ControlCommand::FetchMessages {
                user_id: 42,
                offset_id: 0
            }
        );
    }

    #[test]
    fn parses_plain_commands() {
        assert_eq!(parse_command_line("  stop ").unwrap(), ControlCommand::Stop);
        assert_eq!(
            parse_command_line("setModel together/mistral-7b").unwrap(),
            ControlCommand::SetModel {
                model: "together/mistral-7b".to_owned()
            }
        );
        assert_eq!(
            parse_command_line("togglellm off").unwrap(),
            ControlCommand::ToggleLlm { enabled: false }
        );
        assert_eq!(
            parse_command_line("setSystemPrompt Keep it short.  Be kind.").unwrap(),
            ControlCommand::SetSystemPrompt {
                prompt: "Keep it short.  Be kind.".to_owned()
            }
        );
        assert_eq!(
            parse_command_line("sendMessage 42 hello there").unwrap(),
            ControlCommand::SendMessage {
                user_id: 42,
                text: "hello there".to_owned()
            }
        );
        assert_eq!(
            parse_command_line("fetchMessages 42 1337").unwrap(),
            ControlCommand::FetchMessages {
                user_id: 42,
                offset_id: 1337
            }
        );
    }

    #[test]
    fn rejects_bad_input_with_usage() {
        for line in [
            "",
            "reboot",
            "setReply",
            "toggleLLM maybe",
            "setModel two words",
            "sendMessage 42",
            "sendMessage abc hi",
            "sendMessage 0 hi",
            "fetchMessages",
            "fetchMessages 42 x",
            "fetchMessages 42 1 2",
            r#"{"command":"setReply"}"#,
            r#"{"command":"selfDestruct"}"#,
            "{not json",
        ] {
            assert!(parse_command_line(line).is_err(), "{line}");
        }

        let err = parse_command_line("sendMessage 42").unwrap_err();
        assert!(err.to_string().contains("sendMessage <user-id> <text>"));
    }
}

pub mod control;
pub mod execute;

pub use control::{ControlCommand, parse_command_line};
pub use execute::{CommandResponse, MessagesPayload, execute};

pub struct CommandMeta {
    pub name: &'static str,
    pub desc: &'static str,
    pub usage: &'static str,
}

pub const COMMANDS: &[CommandMeta] = &[
    CommandMeta {
        name: "start",
        desc: "Log in and start replying to direct messages.",
        usage: "start",
    },
    CommandMeta {
        name: "stop",
        desc: "Disconnect from the chat network.",
        usage: "stop",
    },
    CommandMeta {
        name: "setReply",
        desc: "Set the static reply used while LLM replies are off.",
        usage: "setReply <text>",
    },
    CommandMeta {
        name: "toggleLLM",
        desc: "Enable or disable LLM-generated replies.",
        usage: "toggleLLM <on|off>",
    },
    CommandMeta {
        name: "setSystemPrompt",
        desc: "Replace the system prompt sent to the model.",
        usage: "setSystemPrompt <text>",
    },
    CommandMeta {
        name: "setModel",
        desc: "Select the model; prefixes huggingface/, together/, deepinfra/ pick the provider.",
        usage: "setModel <model-id>",
    },
    CommandMeta {
        name: "sendMessage",
        desc: "Send a message to a user now and record it in their history.",
        usage: "sendMessage <user-id> <text>",
    },
    CommandMeta {
        name: "fetchMessages",
        desc: "Print up to 20 recent messages of a conversation as JSON.",
        usage: "fetchMessages <user-id> [offset-id]",
    },
    CommandMeta {
        name: "help",
        desc: "List control commands.",
        usage: "help",
    },
];

pub fn find_command(name: &str) -> Option<&'static CommandMeta> {
    COMMANDS
        .iter()
        .find(|meta| meta.name.eq_ignore_ascii_case(name))
}

pub fn help_text() -> String {
    let width = COMMANDS
        .iter()
        .map(|meta| meta.usage.len())
        .max()
        .unwrap_or_default();

    COMMANDS
        .iter()
        .map(|meta| format!("{:width$}  {}", meta.usage, meta.desc, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

use std::{fs, path::Path};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You're a chill dude. Keep it short, cool, and casual. \
No big texts, use emojis very rarely. You have a black profile picture and no name, so people \
think of you as a ghost. You use few words, you are savage, silent, and mature, and you never \
trail off with \"...\". Reply in the language people talk to you in, otherwise reply in English.";

/// Initial system prompt: `SYSTEM_PROMPT.md` when present and non-empty, else the built-in persona.
pub fn system_prompt() -> String {
    let prompt_file = Path::new("SYSTEM_PROMPT.md");
    match fs::read_to_string(prompt_file) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => DEFAULT_SYSTEM_PROMPT.to_owned(),
    }
}

/// Build the human-facing name for a chat user.
///
/// `"first last"` trimmed, `"Unknown"` when both are blank, with `" (username)"`
/// appended whenever a username is known.
pub fn format_display_name(first_name: &str, last_name: &str, username: &str) -> String {
    let full_name = format!("{} {}", first_name.trim(), last_name.trim());
    let full_name = full_name.trim();

    let mut display = if full_name.is_empty() {
        "Unknown".to_owned()
    } else {
        full_name.to_owned()
    };

    let username = username.trim();
    if !username.is_empty() {
        display.push_str(&format!(" ({})", username));
    }

    display
}

/// Display name used when the directory lookup for a user failed.
pub fn fallback_display_name(user_id: u64) -> String {
    format!("User {}", user_id)
}

/// Shorten free text for log lines (e.g. prompts), appending `...` when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Parse the loose boolean spellings accepted from env vars and control commands.
pub fn parse_bool_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "enable" | "enabled" => Some(true),
        "0" | "false" | "no" | "off" | "disable" | "disabled" => Some(false),
        _ => None,
    }
}

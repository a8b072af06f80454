//! Parsing of chat prompt lines

/// One line typed at the chat prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput<'a> {
    Quit,
    History,
    Record,
    /// `/image` with its path, `None` when the path is missing
    Image(Option<&'a str>),
    /// Anything else is sent as text
    Text(&'a str),
}

pub fn parse(line: &str) -> ChatInput<'_> {
    let input = line.trim();
    let (command, rest) = match input.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (input, ""),
    };

    match command {
        "/quit" | "/exit" if rest.is_empty() => ChatInput::Quit,
        "/history" if rest.is_empty() => ChatInput::History,
        "/record" if rest.is_empty() => ChatInput::Record,
        "/image" if rest.is_empty() => ChatInput::Image(None),
        "/image" => ChatInput::Image(Some(rest)),
        _ => ChatInput::Text(input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands() {
        assert_eq!(parse("/quit"), ChatInput::Quit);
        assert_eq!(parse("  /history "), ChatInput::History);
        assert_eq!(parse("/record"), ChatInput::Record);
        assert_eq!(parse("/image"), ChatInput::Image(None));
        assert_eq!(parse("/image  ~/cat.png "), ChatInput::Image(Some("~/cat.png")));
    }

    #[test]
    fn test_command_prefix_is_plain_text() {
        assert_eq!(parse("/imagefoo"), ChatInput::Text("/imagefoo"));
        assert_eq!(parse("/recording"), ChatInput::Text("/recording"));
        assert_eq!(parse("bonjour /image"), ChatInput::Text("bonjour /image"));
    }
}

//! Terminal rendering of chat messages

use console::style;
use talkwave_core::{Content, Message, Sender};

/// Plain text of a message body
pub fn body(message: &Message) -> String {
    match &message.content {
        Content::Text(text) => text.clone(),
        Content::Image(reference) => format!("[image] {}", reference),
        Content::Empty => String::new(),
    }
}

/// One styled line: `name: body`
pub fn line(message: &Message) -> String {
    let name = match message.sender {
        Sender::LocalUser => style(message.display_name()).cyan().bold(),
        Sender::RemoteUser => style(message.display_name()).green().bold(),
        Sender::AutomatedAgent => style(message.display_name()).yellow().bold(),
    };
    format!("{}: {}", name, body(message))
}

pub fn print_history(messages: &[Message]) {
    if messages.is_empty() {
        println!("{}", style("No messages yet.").dim());
        return;
    }
    for message in messages {
        println!("{}", line(message));
    }
}

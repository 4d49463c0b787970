use std::error::Error;
use std::io::Write;
use tokio::io::{ AsyncBufReadExt, BufReader };
use log::error;

use crate::models::chat::{ ChatMessage, Role };
use crate::session::{ Session, SessionError };

const EXIT_COMMANDS: [&str; 2] = ["exit", "quit"];

pub fn format_message(msg: &ChatMessage) -> String {
    let speaker = match msg.role {
        Role::User => "You",
        Role::Assistant => "Assistant",
        Role::System => "System",
    };
    format!("{}: {}", speaker, msg.content)
}

pub fn print_history(history: &[ChatMessage]) {
    for msg in history {
        println!("{}\n", format_message(msg));
    }
}

/// Reads one message per line from stdin until EOF or `exit`. A provider
/// failure ends only the current turn.
pub async fn run_interactive(session: &mut Session) -> Result<(), Box<dyn Error + Send + Sync>> {
    print_history(session.history());
    println!("Ask a question or describe your task (type 'exit' to quit).");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if EXIT_COMMANDS.contains(&input.to_lowercase().as_str()) {
            break;
        }

        match session.send_message(input).await {
            Ok(reply) => println!("\nAssistant: {}\n", reply),
            Err(e @ SessionError::Provider(_)) => {
                error!("{}", e);
                println!("\nThe assistant could not answer; try again.\n");
            }
            Err(e) => return Err(Box::new(e)),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_speakers() {
        assert_eq!(format_message(&ChatMessage::user("hello")), "You: hello");
        assert_eq!(format_message(&ChatMessage::assistant("hi there")), "Assistant: hi there");
    }
}

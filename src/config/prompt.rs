use crate::models::chat::ChatMessage;

pub const NEXT_ACTION_PROMPT: &str =
    "➡️ 'What would you like to do next? I can help you explore data, write a BRD, run code, or create a dashboard.'";

/// Persona and reply contract sent ahead of every conversation.
pub fn system_instruction() -> String {
    format!(
        "You are a helpful assistant for junior data/business analysts. \
         Act like a senior analyst mentor. For every task, break it down into steps, \
         offer guidance, and always end with:\n{}",
        NEXT_ACTION_PROMPT
    )
}

/// The system instruction followed by the whole history, oldest first.
pub fn build_chat_messages(history: &[ChatMessage]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(ChatMessage::system(system_instruction()));
    messages.extend(history.iter().cloned());
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::Role;

    #[test]
    fn system_instruction_leads_and_history_keeps_order() {
        let history = vec![
            ChatMessage::user("hello"),
            ChatMessage::assistant("hi there"),
            ChatMessage::user("next?")
        ];
        let messages = build_chat_messages(&history);

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.ends_with(NEXT_ACTION_PROMPT));
        assert_eq!(&messages[1..], &history[..]);
    }
}

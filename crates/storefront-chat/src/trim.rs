use storefront_llm::Message;

/// Bound a transcript to `max` messages.
///
/// A leading system message is always kept, followed by the most recent
/// `max - 1` messages.
pub fn trim_transcript(messages: &[Message], max: usize) -> Vec<Message> {
    if messages.len() <= max {
        return messages.to_vec();
    }
    if max == 0 {
        return Vec::new();
    }

    match messages.split_first() {
        Some((first, rest)) if first.is_system() => {
            let keep = max - 1;
            let mut trimmed = Vec::with_capacity(max);
            trimmed.push(first.clone());
            trimmed.extend_from_slice(&rest[rest.len() - keep..]);
            trimmed
        }
        _ => messages[messages.len() - max..].to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turns(n: usize) -> Vec<Message> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    Message::human(format!("q{i}"))
                } else {
                    Message::ai(format!("a{i}"))
                }
            })
            .collect()
    }

    #[test]
    fn test_system_message_survives_trimming() {
        let mut messages = vec![Message::system("inventory")];
        messages.extend(turns(15));

        let trimmed = trim_transcript(&messages, 10);

        assert_eq!(trimmed.len(), 10);
        assert_eq!(trimmed[0], messages[0]);
        assert_eq!(&trimmed[1..], &messages[7..]);
    }

    #[test]
    fn test_short_transcript_untouched() {
        let messages = turns(4);
        assert_eq!(trim_transcript(&messages, 10), messages);
    }

    #[test]
    fn test_without_system_keeps_latest() {
        let messages = turns(12);
        let trimmed = trim_transcript(&messages, 10);
        assert_eq!(trimmed, messages[2..].to_vec());
    }
}

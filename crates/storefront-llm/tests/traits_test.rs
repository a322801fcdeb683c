use storefront_llm::{ChatOptions, ChatRequest, Message};

#[test]
fn test_chat_request_creation() {
    let request = ChatRequest::new("gpt-4o", vec![Message::human("Hello")]);
    
    assert_eq!(request.model, "gpt-4o");
    assert_eq!(request.messages.len(), 1);
    assert_eq!(request.options, ChatOptions::default());
}

#[test]
fn test_chat_options_builder() {
    let options = ChatOptions::new()
        .temperature(0.5)
        .user("user_bob");
    
    assert_eq!(options.temperature, Some(0.5));
    assert_eq!(options.user.as_deref(), Some("user_bob"));
}

use anyhow::Result;
use futures::StreamExt;
use std::io::Write;
use storefront_llm::{ChatClient, ChatOptions, ChatRequest, Message, OpenAIClient, StreamEvent};

#[tokio::main]
async fn main() -> Result<()> {
    let api_key = std::env::var("OPENAI_API_KEY")?;
    let client = OpenAIClient::new(api_key)?;

    let request = ChatRequest::new(
        "gpt-4o-mini",
        vec![
            Message::system("You are a helpful e-commerce assistant."),
            Message::human("Which laptop would you suggest for office work?"),
        ],
    )
    .with_options(ChatOptions::new().temperature(0.7).user("user_demo"));

    let mut stream = client.chat_stream(request).await?;
    while let Some(event) = stream.next().await {
        match event? {
            StreamEvent::Message { content } => {
                print!("{}", content);
                std::io::stdout().flush()?;
            }
            StreamEvent::Done { .. } => println!(),
        }
    }

    Ok(())
}

//! A line-oriented chat client for the terminal.
//!
//! ```text
//! terminal-chat <name> [avatar-id] [endpoint]
//! ```
//!
//! Type a line to send it. `/image <path>` and `/video <path>` send a file,
//! `/avatars` lists the avatar ids, `/quit` leaves.

use roomlink::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};

// ---------------------------------------------------------------------------
// Input parsing
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Text(&'a str),
    Attach(&'a str),
    Avatars,
    Quit,
    Unknown(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    let Some(command) = line.strip_prefix('/') else {
        return Input::Text(line);
    };

    let (name, arg) = command.split_once(' ').unwrap_or((command, ""));
    match (name, arg.trim()) {
        ("image" | "video", path) if !path.is_empty() => Input::Attach(path),
        ("avatars", _) => Input::Avatars,
        ("quit", _) => Input::Quit,
        _ => Input::Unknown(name),
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::SystemNotice(text) => Some(format!("* {text}")),
        SessionEvent::UserMessage {
            user,
            message,
            outgoing,
        } => {
            let who = if *outgoing { "you" } else { user.name.as_str() };
            let body = match message.message_type {
                MessageType::Text => message.content.clone(),
                other => format!("[{other}, {} bytes]", message.content.len()),
            };
            Some(format!("<{who}> {body}"))
        }
        SessionEvent::RosterChanged { users, online } => {
            let names: Vec<&str> = users.iter().map(|u| u.name.as_str()).collect();
            Some(format!("* {online} online: {}", names.join(", ")))
        }
        SessionEvent::JoinRejected(e) => Some(format!("! {e}")),
        SessionEvent::ComposeCleared => None,
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    roomlink::logging::init();

    let mut args = std::env::args().skip(1);
    let Some(name) = args.next() else {
        eprintln!("usage: terminal-chat <name> [avatar-id] [endpoint]");
        std::process::exit(2);
    };
    let avatar = args.next().unwrap_or_else(|| "1".to_string());
    let mut config = SessionConfig::default();
    if let Some(endpoint) = args.next() {
        config = config.with_endpoint(endpoint);
    }

    eprintln!("connecting to {} as {name}", config.endpoint);
    let (session, mut events, task) = SessionController::spawn(config, WebSocketConnector::new());
    session.join(&name, &avatar)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(SessionEvent::JoinRejected(e)) => return Err(e.into()),
                Some(event) => {
                    if let Some(line) = render(&event) {
                        println!("{line}");
                    }
                }
                None => break,
            },
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    Input::Text(text) => session.send_text(text)?,
                    Input::Attach(path) => match roomlink::media::load_attachment(path).await {
                        Ok(file) => session.send_message(file.message_type, file.content)?,
                        Err(e) => eprintln!("! {e}"),
                    },
                    Input::Avatars => {
                        println!("* avatars: {}", avatar_ids().collect::<Vec<_>>().join(" "));
                    }
                    Input::Quit => break,
                    Input::Unknown(command) => eprintln!("! unknown command /{command}"),
                }
            }
        }
    }

    session.shutdown()?;
    task.await?;
    tracing::info!("bye");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input_plain_text() {
        assert_eq!(parse_input("  hi there "), Input::Text("hi there"));
    }

    #[test]
    fn test_parse_input_commands() {
        assert_eq!(parse_input("/image cat.png"), Input::Attach("cat.png"));
        assert_eq!(parse_input("/video  clip.mp4 "), Input::Attach("clip.mp4"));
        assert_eq!(parse_input("/image"), Input::Unknown("image"));
        assert_eq!(parse_input("/avatars"), Input::Avatars);
        assert_eq!(parse_input("/quit"), Input::Quit);
        assert_eq!(parse_input("/dance"), Input::Unknown("dance"));
    }

    #[test]
    fn test_render_marks_own_messages() {
        let event = SessionEvent::UserMessage {
            user: User::new(1, "Alice", ""),
            message: ChatMessage {
                message_type: MessageType::Text,
                content: "hi".into(),
                timestamp: roomlink::protocol::Timestamp::Millis(0),
            },
            outgoing: true,
        };
        assert_eq!(render(&event).as_deref(), Some("<you> hi"));
        assert_eq!(render(&SessionEvent::ComposeCleared), None);
    }
}

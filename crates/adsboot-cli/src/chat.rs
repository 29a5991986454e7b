//! Line-oriented chat REPL

use std::io::Write;

use adsboot_gateway::{AdGateway, CallOptions, ChatSurface, GatewayError, QUICK_PROMPTS};
use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::interrupt::Interrupt;
use crate::render;

#[derive(Debug, PartialEq, Eq)]
enum ReplCommand<'a> {
    Quit,
    Clear,
    Prompts,
    /// One of the canned prompts, 1-based as listed
    Quick(usize),
    Message(&'a str),
    Empty,
    Unknown(&'a str),
}

fn parse_line(line: &str) -> ReplCommand<'_> {
    let line = line.trim();
    if line.is_empty() {
        return ReplCommand::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return ReplCommand::Message(line);
    };
    let mut words = command.split_whitespace();
    match (words.next(), words.next()) {
        (Some("quit" | "exit"), None) => ReplCommand::Quit,
        (Some("clear"), None) => ReplCommand::Clear,
        (Some("prompts"), None) => ReplCommand::Prompts,
        (Some("prompt"), Some(n)) => match n.parse::<usize>() {
            Ok(n) if (1..=QUICK_PROMPTS.len()).contains(&n) => ReplCommand::Quick(n),
            _ => ReplCommand::Unknown(line),
        },
        _ => ReplCommand::Unknown(line),
    }
}

pub async fn run(
    gateway: &AdGateway,
    surface: ChatSurface,
    context: Option<String>,
    options: &CallOptions,
) -> Result<()> {
    let mut thread = surface.new_thread(context);
    println!("== {} ==\n\n{}\n", surface.title(), surface.seed_message());
    if surface == ChatSurface::Assistant {
        render::quick_prompts();
    }
    println!("Commands: /prompt <n>, /prompts, /clear, /quit\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };

        let text = match parse_line(&line) {
            ReplCommand::Quit => break,
            ReplCommand::Empty => continue,
            ReplCommand::Clear => {
                thread.reset(surface.seed_turn());
                println!("\n{}\n", surface.seed_message());
                continue;
            }
            ReplCommand::Prompts => {
                render::quick_prompts();
                continue;
            }
            ReplCommand::Unknown(command) => {
                eprintln!("Unknown command: {command}");
                continue;
            }
            ReplCommand::Quick(n) => QUICK_PROMPTS[n - 1].prompt,
            ReplCommand::Message(text) => text,
        };

        let interrupt = Interrupt::arm();
        let call_options = options.clone().with_cancel(interrupt.token());
        match gateway.send_chat_turn(&mut thread, text, &call_options).await {
            Ok(turn) => println!("\n{}\n", turn.text),
            Err(GatewayError::Cancelled) => println!("\n(cancelled)\n"),
            Err(e) => eprintln!("\n{}: {}\n", render::hint_for(&e), e),
        }
    }

    log::info!("Chat ended after {} turns", thread.len());
    Ok(())
}

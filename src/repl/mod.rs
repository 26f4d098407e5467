//! 交互式命令行
//!
//! rustyline 行编辑 + 斜杠命令补全/提示；普通输入走 Agent 聊天回合。
//! Ctrl-C / Ctrl-D 与 /quit 一样走保存退出路径。

pub mod command;

use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use crate::memory::{Message, Role};
use crate::orchestrator::Agent;
use crate::session::SessionManager;
use command::{parse, Command, COMMAND_NAMES};

/// /history 展示时每条消息的最大字符数
const HISTORY_SNIPPET_CHARS: usize = 100;

/// rustyline Helper：斜杠命令补全、内联提示、命令行高亮
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMAND_NAMES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Validator for CliHelper {}

/// REPL：一行一事件的主循环
pub struct Repl {
    agent: Agent,
    sessions: SessionManager,
    model_label: String,
}

impl Repl {
    pub fn new(agent: Agent, sessions: SessionManager, model_label: String) -> Self {
        Self {
            agent,
            sessions,
            model_label,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        let mut rl = Editor::new()?;
        rl.set_helper(Some(CliHelper::new()));

        self.print_welcome();

        loop {
            match rl.readline("you> ") {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(&line);

                    if let Some(cmd) = parse(trimmed) {
                        if !self.handle_command(cmd) {
                            break;
                        }
                        continue;
                    }

                    let reply = self.agent.chat(&self.sessions, trimmed).await;
                    print_reply(&reply);
                }
                // Ctrl-C / Ctrl-D：与 /quit 相同的保存退出
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    self.save_and_say_goodbye();
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// 处理斜杠命令；返回 false 表示退出主循环
    fn handle_command(&self, cmd: Command) -> bool {
        match cmd {
            Command::Quit => {
                self.save_and_say_goodbye();
                return false;
            }
            Command::Help => self.print_help(),
            Command::History => self.print_history(),
            Command::Clear => match self.sessions.clear_current() {
                Ok(()) => println!("{}", "Chat history cleared.".yellow()),
                Err(e) => println!("{}", format!("Clear failed: {}", e).red()),
            },
            Command::Session => self.print_session_info(),
            Command::New => {
                let id = self.sessions.new_session();
                println!("{}", format!("New session started: {}...", &id[..8]).green());
            }
            Command::Tools => self.print_tools(),
            Command::Unknown(raw) => {
                println!(
                    "{}",
                    format!("Unknown command: {}. Type /help for available commands.", raw)
                        .bright_black()
                );
            }
        }
        true
    }

    fn save_and_say_goodbye(&self) {
        if let Err(e) = self.sessions.flush() {
            tracing::warn!(error = %e, "final flush failed");
        }
        println!("{}", "Goodbye!".bright_green());
    }

    fn print_welcome(&self) {
        let id = self.sessions.active_session_id();
        println!("{}", "wasp - chat with tools".bright_magenta().bold());
        println!("{}", format!("session {}...  model {}", &id[..8], self.model_label).bright_black());
        println!(
            "{}",
            "Type a message to chat, /help for commands, /tools for the tool list.".bright_black()
        );
        println!();
    }

    fn print_help(&self) {
        println!("Available commands:");
        println!("  /help     - show this help message");
        println!("  /history  - show chat history");
        println!("  /clear    - clear chat history and its file");
        println!("  /session  - show current session info");
        println!("  /new      - start a new chat session");
        println!("  /tools    - show available tools");
        println!("  /quit     - exit (alias: /exit)");
    }

    fn print_history(&self) {
        let messages = self.sessions.messages();
        if messages.is_empty() {
            println!("{}", "No chat history yet.".bright_black());
            return;
        }
        for (i, m) in messages.iter().enumerate() {
            println!("{}", format_history_line(i + 1, m));
        }
    }

    fn print_session_info(&self) {
        let (prompt_tokens, completion_tokens, total_tokens) = self.agent.token_usage();
        println!("Session:  {}", self.sessions.active_session_id());
        println!("Messages: {}", self.sessions.message_count());
        println!("Model:    {}", self.model_label);
        println!("Tools:    {}", self.agent.tool_count());
        println!(
            "Tokens:   {} prompt + {} completion = {}",
            prompt_tokens, completion_tokens, total_tokens
        );
    }

    fn print_tools(&self) {
        println!("Available tools:");
        for (name, description) in self.agent.tool_descriptors() {
            println!("  {:<16} {}", name.bright_cyan(), description);
        }
        println!();
        println!("{}", "Just ask naturally, e.g. \"what time is it?\" or \"calculate 15 * 23 + 7\".".bright_black());
    }
}

fn print_reply(reply: &str) {
    for line in reply.lines() {
        println!("{} {}", "ai>".bright_magenta(), line.bright_blue());
    }
    println!();
}

/// 一条历史记录行：序号、时间、角色、截断后的内容
fn format_history_line(index: usize, message: &Message) -> String {
    let time = message
        .timestamp
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string());
    let role = match message.role {
        Role::User => "you".green(),
        Role::Assistant => "ai ".blue(),
        Role::System => "sys".bright_black(),
    };
    let content: String = if message.content.chars().count() > HISTORY_SNIPPET_CHARS {
        format!(
            "{}...",
            message.content.chars().take(HISTORY_SNIPPET_CHARS).collect::<String>()
        )
    } else {
        message.content.clone()
    };
    format!("{:>3}. [{}] {}: {}", index, time, role, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_line_truncates_long_content() {
        let m = Message::user("y".repeat(250));
        let line = format_history_line(1, &m);
        assert!(line.ends_with("..."));
        assert!(line.chars().count() < 250);
    }

    #[test]
    fn test_completion_only_for_slash_prefix() {
        let helper = CliHelper::new();
        let hint = helper.commands.iter().filter(|c| c.starts_with("/he")).count();
        assert_eq!(hint, 1); // /help
    }
}

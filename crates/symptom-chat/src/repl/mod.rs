//! Interactive terminal chat.
//!
//! Renders the conversation as `Role: content` lines and accepts free text or
//! slash commands. One submission is processed at a time; the prompt returns
//! only after the relay has answered.

mod command;

use std::io::{self, Write};

use reedline::{DefaultPrompt, DefaultPromptSegment, Reedline, Signal};
use tracing::debug;

use crate::models::{MAX_TOKENS, ModelRegistry, TEMPERATURE, TOP_P};
use crate::relay::CompletionRelay;
use crate::session::{ChatSession, Render, Turn};

pub use command::{Command, CommandError, HELP, parse};

/// What the input loop does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Clear the screen and draw the whole transcript.
    Redraw,
    Quit,
}

impl From<Render> for Flow {
    fn from(render: Render) -> Self {
        match render {
            Render::Full => Flow::Redraw,
        }
    }
}

/// Terminal front end bound to a single session.
pub struct Repl {
    session: ChatSession,
    relay: CompletionRelay,
    models: ModelRegistry,
}

impl Repl {
    pub fn new(session: ChatSession, relay: CompletionRelay, models: ModelRegistry) -> Self {
        Self {
            session,
            relay,
            models,
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Run the input loop until the user quits or closes stdin.
    pub async fn run(mut self) -> io::Result<()> {
        let mut editor = Reedline::create();
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic(self.session.settings.model.label.to_string()),
            DefaultPromptSegment::Empty,
        );
        let mut out = io::stdout();

        writeln!(out, "Symptoms Chatbot (type /help for commands)")?;
        self.render_transcript(&mut out)?;

        loop {
            let line = match tokio::task::block_in_place(|| editor.read_line(&prompt))? {
                Signal::Success(line) => line,
                Signal::CtrlD => break,
                _ => continue,
            };

            let command = match parse(&line) {
                Ok(command) => command,
                Err(e) => {
                    writeln!(out, "{e}")?;
                    continue;
                }
            };

            match self.handle(command, &mut out).await? {
                Flow::Continue => {}
                Flow::Redraw => {
                    editor.clear_screen()?;
                    self.render_transcript(&mut out)?;
                }
                Flow::Quit => break,
            }
        }

        debug!(
            session_id = %self.session.id,
            turns = self.session.conversation.len(),
            "Terminal chat finished"
        );
        Ok(())
    }

    /// Apply one command, writing any output to `out`.
    pub async fn handle<W: Write>(&mut self, command: Command, out: &mut W) -> io::Result<Flow> {
        match command {
            Command::Nothing => Ok(Flow::Continue),
            Command::Say(text) => {
                writeln!(out, "{}", render_turn(&Turn::user(text.clone())))?;
                writeln!(out, "Thinking...")?;
                out.flush()?;

                let reply = self.session.submit(&self.relay, text).await;
                if let Some(notice) = reply.notification() {
                    writeln!(out, "[error] {notice}")?;
                }
                if let Some(turn) = self.session.conversation.turns().last() {
                    writeln!(out, "{}", render_turn(turn))?;
                }
                Ok(Flow::Continue)
            }
            Command::Clear => Ok(self.session.clear().into()),
            Command::History => Ok(Flow::Redraw),
            Command::Model(None) => {
                let model = self.session.settings.model;
                writeln!(out, "model: {} ({})", model.label, model.provider_id)?;
                Ok(Flow::Continue)
            }
            Command::Model(Some(label)) => {
                match self.models.resolve(&label) {
                    Ok(model) => {
                        self.session.settings.model = model;
                        writeln!(out, "model: {} ({})", model.label, model.provider_id)?;
                    }
                    Err(e) => {
                        writeln!(out, "{e}; choose one of {}", self.models.labels().join(", "))?
                    }
                }
                Ok(Flow::Continue)
            }
            Command::Models => {
                let current = self.session.settings.model.label;
                for model in self.models.all() {
                    let marker = if model.label == current { '*' } else { ' ' };
                    writeln!(out, "{marker} {:<14} {}", model.label, model.provider_id)?;
                }
                Ok(Flow::Continue)
            }
            Command::Temperature(value) => {
                match self.session.settings.params.set_temperature(value) {
                    Ok(stored) => writeln!(out, "temperature: {stored:.2}")?,
                    Err(e) => writeln!(out, "{e}")?,
                }
                Ok(Flow::Continue)
            }
            Command::TopP(value) => {
                match self.session.settings.params.set_top_p(value) {
                    Ok(stored) => writeln!(out, "top-p: {stored:.2}")?,
                    Err(e) => writeln!(out, "{e}")?,
                }
                Ok(Flow::Continue)
            }
            Command::MaxTokens(value) => {
                let stored = self.session.settings.params.set_max_tokens(value);
                writeln!(out, "max tokens: {stored}")?;
                Ok(Flow::Continue)
            }
            Command::Params => {
                let params = self.session.settings.params;
                writeln!(out, "model:       {}", self.session.settings.model.label)?;
                writeln!(
                    out,
                    "temperature: {:.2}  [{} - {}]",
                    params.temperature(),
                    TEMPERATURE.min,
                    TEMPERATURE.max
                )?;
                writeln!(
                    out,
                    "top-p:       {:.2}  [{} - {}]",
                    params.top_p(),
                    TOP_P.min,
                    TOP_P.max
                )?;
                writeln!(
                    out,
                    "max tokens:  {}  [{} - {}]",
                    params.max_tokens(),
                    MAX_TOKENS.min,
                    MAX_TOKENS.max
                )?;
                Ok(Flow::Continue)
            }
            Command::Help => {
                writeln!(out, "{HELP}")?;
                Ok(Flow::Continue)
            }
            Command::Quit => Ok(Flow::Quit),
        }
    }

    pub fn render_transcript<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for turn in self.session.conversation.turns() {
            writeln!(out, "{}", render_turn(turn))?;
        }
        out.flush()
    }
}

pub fn render_turn(turn: &Turn) -> String {
    format!("{}: {}", turn.role().label(), turn.content())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::instructions::{CONNECTION_FALLBACK, GREETING};
    use crate::llm::{ChatRequest, ChatResponse, LLMError, LLMProvider, Role};
    use crate::models::GenerationSettings;

    struct FixedProvider(Option<&'static str>);

    #[async_trait]
    impl LLMProvider for FixedProvider {
        async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse, LLMError> {
            match self.0 {
                Some(content) => Ok(serde_json::from_value(serde_json::json!({
                    "choices": [{"message": {"role": "assistant", "content": content}}]
                }))
                .unwrap()),
                None => Err(LLMError::Api {
                    status: 500,
                    message: "boom".to_string(),
                }),
            }
        }
    }

    fn repl(reply: Option<&'static str>) -> Repl {
        Repl::new(
            ChatSession::new("term", GenerationSettings::default()),
            CompletionRelay::new(Arc::new(FixedProvider(reply))),
            ModelRegistry::builtin(),
        )
    }

    async fn run(repl: &mut Repl, line: &str) -> (Flow, String) {
        let mut out = Vec::new();
        let flow = repl.handle(parse(line).unwrap(), &mut out).await.unwrap();
        (flow, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn say_prints_reply_and_records_turns() {
        let mut repl = repl(Some("Drink fluids."));
        let (flow, output) = run(&mut repl, "sore throat").await;

        assert_eq!(flow, Flow::Continue);
        assert!(output.contains("User: sore throat"));
        assert!(output.contains("Assistant: Drink fluids."));
        assert_eq!(repl.session().conversation.len(), 3);
    }

    #[tokio::test]
    async fn failure_prints_notification_and_fallback() {
        let mut repl = repl(None);
        let (_, output) = run(&mut repl, "sore throat").await;

        assert!(output.contains("[error] Error connecting to the API:"));
        assert!(output.contains(&format!("Assistant: {CONNECTION_FALLBACK}")));
    }

    #[tokio::test]
    async fn clear_requests_redraw() {
        let mut repl = repl(Some("ok"));
        run(&mut repl, "cough").await;
        let (flow, _) = run(&mut repl, "/clear").await;

        assert_eq!(flow, Flow::Redraw);
        let turns = repl.session().conversation.turns();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role(), Role::System);
    }

    #[tokio::test]
    async fn model_switch_and_params() {
        let mut repl = repl(Some("ok"));
        let (_, output) = run(&mut repl, "/model microsoft-phi").await;
        assert!(output.contains("microsoft/Phi-3-mini-4k-instruct"));

        let (_, output) = run(&mut repl, "/model gpt").await;
        assert!(output.contains("unknown model 'gpt'"));
        assert_eq!(repl.session().settings.model.label, "Microsoft-Phi");

        let (_, output) = run(&mut repl, "/temperature 3").await;
        assert_eq!(output.trim(), "temperature: 2.00");

        let (_, output) = run(&mut repl, "/max-tokens 500").await;
        assert_eq!(output.trim(), "max tokens: 148");

        let (_, output) = run(&mut repl, "/temperature NaN").await;
        assert!(output.contains("finite"));
        assert_eq!(repl.session().settings.params.temperature(), 2.0);
    }

    #[tokio::test]
    async fn models_marks_current() {
        let mut repl = repl(Some("ok"));
        let (_, output) = run(&mut repl, "/models").await;
        assert_eq!(output.lines().count(), 4);
        assert!(output.lines().next().unwrap().starts_with("* Meta-Llama"));
    }

    #[tokio::test]
    async fn quit_stops() {
        let mut repl = repl(Some("ok"));
        let (flow, _) = run(&mut repl, "/quit").await;
        assert_eq!(flow, Flow::Quit);
    }

    #[test]
    fn transcript_renders_role_prefixed_lines() {
        let repl = repl(Some("ok"));
        let mut out = Vec::new();
        repl.render_transcript(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("Assistant: {GREETING}\n")
        );
    }
}

//! Parsing of terminal chat input.

use thiserror::Error;

/// One line of user input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Free text, exactly as typed: submit as a symptom description.
    Say(String),
    Clear,
    /// Show the current model, or switch to the labelled one.
    Model(Option<String>),
    Models,
    Temperature(f32),
    TopP(f32),
    MaxTokens(i64),
    Params,
    History,
    Help,
    Quit,
    /// Blank line.
    Nothing,
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("unknown command '/{0}', try /help")]
    Unknown(String),

    #[error("/{command} expects a number, got '{value}'")]
    NotANumber { command: &'static str, value: String },

    #[error("/{0} expects a value")]
    MissingValue(&'static str),
}

pub const HELP: &str = "\
Describe your symptoms and press Enter. Start a message with // to send
text that begins with a slash.

  /clear              clear chat history
  /model [label]      show or switch the model
  /models             list available models
  /temperature <v>    sampling temperature (0.01 - 2.0)
  /top-p <v>          nucleus sampling threshold (0.01 - 1.0)
  /max-tokens <n>     maximum reply length (64 - 148)
  /params             show current generation settings
  /history            redraw the conversation
  /help               show this help
  /quit               leave";

/// Parse one input line. Commands are recognised after trimming; free text is
/// kept verbatim so it reaches the relay unchanged.
pub fn parse(line: &str) -> Result<Command, CommandError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(Command::Nothing);
    }

    if trimmed.starts_with("//") {
        return Ok(Command::Say(line.replacen('/', "", 1)));
    }
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Ok(Command::Say(line.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
        None => (rest, None),
    };

    match name.to_ascii_lowercase().as_str() {
        "clear" => Ok(Command::Clear),
        "model" => Ok(Command::Model(arg.map(String::from))),
        "models" => Ok(Command::Models),
        "temperature" | "temp" => number("temperature", arg).map(Command::Temperature),
        "top-p" | "top_p" => number("top-p", arg).map(Command::TopP),
        "max-tokens" | "max_tokens" => number("max-tokens", arg).map(Command::MaxTokens),
        "params" => Ok(Command::Params),
        "history" => Ok(Command::History),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        _ => Err(CommandError::Unknown(name.to_string())),
    }
}

fn number<T: std::str::FromStr>(
    command: &'static str,
    arg: Option<&str>,
) -> Result<T, CommandError> {
    let value = arg.ok_or(CommandError::MissingValue(command))?;
    value.parse().map_err(|_| CommandError::NotANumber {
        command,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_text_is_submitted_as_typed() {
        assert_eq!(
            parse("  I have a headache and fever "),
            Ok(Command::Say("  I have a headache and fever ".to_string()))
        );
        assert_eq!(parse("   "), Ok(Command::Nothing));
    }

    #[test]
    fn double_slash_sends_leading_slash_text() {
        assert_eq!(
            parse("//clear is the only word I can say"),
            Ok(Command::Say("/clear is the only word I can say".to_string()))
        );
        assert_eq!(parse("  //  "), Ok(Command::Say("  /  ".to_string())));
    }

    #[test]
    fn slash_commands() {
        assert_eq!(parse("/clear"), Ok(Command::Clear));
        assert_eq!(parse("/CLEAR"), Ok(Command::Clear));
        assert_eq!(parse("/model"), Ok(Command::Model(None)));
        assert_eq!(
            parse("/model  Google-Gemma "),
            Ok(Command::Model(Some("Google-Gemma".to_string())))
        );
        assert_eq!(parse("/models"), Ok(Command::Models));
        assert_eq!(parse("/params"), Ok(Command::Params));
        assert_eq!(parse("/quit"), Ok(Command::Quit));
    }

    #[test]
    fn numeric_commands() {
        assert_eq!(parse("/temperature 1.2"), Ok(Command::Temperature(1.2)));
        assert_eq!(parse("/top-p 0.4"), Ok(Command::TopP(0.4)));
        assert_eq!(parse("/max-tokens 96"), Ok(Command::MaxTokens(96)));
        assert_eq!(parse("/max-tokens -5"), Ok(Command::MaxTokens(-5)));
    }

    #[test]
    fn numeric_command_errors() {
        assert_eq!(
            parse("/temperature"),
            Err(CommandError::MissingValue("temperature"))
        );
        assert_eq!(
            parse("/max-tokens lots"),
            Err(CommandError::NotANumber {
                command: "max-tokens",
                value: "lots".to_string(),
            })
        );
    }

    #[test]
    fn unknown_command() {
        let err = parse("/dance").unwrap_err();
        assert_eq!(err, CommandError::Unknown("dance".to_string()));
        assert!(err.to_string().contains("/help"));
    }
}

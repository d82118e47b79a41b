use std::fmt::Display;
use std::io::{self, BufRead, StdinLock, Stdout, Write};

use colored::Colorize;
use tracing::{debug, warn};

use crate::session::{Outcome, Prompt};

/// Line-based terminal: reads commands and answers, prints results.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl Console<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Console::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Console { input, output }
    }

    /// Shows `prompt` and reads one line. `None` once input is exhausted.
    pub fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}> ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    pub fn say(&mut self, message: &str) {
        if let Err(error) = writeln!(self.output, "{message}") {
            warn!("Failed to write to the console: {}", error);
        }
    }

    pub fn error(&mut self, error: &dyn Display) {
        let line = format!("Err: {error}");
        self.say(&line.red().to_string());
    }

    pub fn render(&mut self, outcome: &Outcome) {
        for message in &outcome.messages {
            self.say(message);
        }
        for error in &outcome.errors {
            debug!("Command failed ({}): {:?}", error.kind(), error);
            self.error(error);
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Prompt for Console<R, W> {
    /// Asks until the answer is Y or N. Running out of input means no.
    fn confirm(&mut self, question: &str) -> bool {
        loop {
            match self.read_line(&format!("{question} (Y/N) ")) {
                Ok(Some(answer)) => match answer.trim().to_uppercase().as_str() {
                    "Y" => return true,
                    "N" => return false,
                    _ => self.say("Please answer Y or N."),
                },
                Ok(None) => return false,
                Err(error) => {
                    warn!("Failed to read an answer: {}", error);
                    return false;
                }
            }
        }
    }

    fn ask(&mut self, question: &str) -> Option<String> {
        match self.read_line(&format!("{question} ")) {
            Ok(answer) => answer.map(|answer| answer.trim().to_string()),
            Err(error) => {
                warn!("Failed to read an answer: {}", error);
                None
            }
        }
    }
}

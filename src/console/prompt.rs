// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::Result;
use std::fmt::Display;
use std::io::{BufRead, Write};
use std::str::FromStr;
use thiserror::Error;

/// Standard input reached end of file while a prompt was waiting for an answer.
#[derive(Debug, Error)]
#[error("Input was closed")]
pub struct InputClosed;

/// Line-oriented question and answer over a reader and a writer.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(InputClosed.into());
        }
        Ok(line.trim().to_string())
    }

    /// Asks once and returns the trimmed answer, which may be empty.
    pub fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{prompt}: ")?;
        self.output.flush()?;
        self.read_line()
    }

    /// Asks until a non-empty answer parses as `T`. `expected` names the kind of value in the
    /// retry message.
    pub fn ask_parsed<T>(&mut self, prompt: &str, expected: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        loop {
            let answer = self.ask(prompt)?;
            if answer.is_empty() {
                writeln!(self.output, " Input cannot be empty. Please try again.")?;
                continue;
            }
            match answer.parse::<T>() {
                Ok(value) => return Ok(value),
                Err(_) => {
                    writeln!(
                        self.output,
                        " Invalid input. Expected {expected}. Please try again."
                    )?;
                }
            }
        }
    }

    pub fn ask_with_default(&mut self, prompt: &str, default: &str) -> Result<String> {
        let answer = self.ask(prompt)?;
        if answer.is_empty() {
            return Ok(default.to_string());
        }
        Ok(answer)
    }

    pub fn ask_optional(&mut self, prompt: &str) -> Result<Option<String>> {
        let answer = self.ask(prompt)?;
        Ok(Some(answer).filter(|answer| !answer.is_empty()))
    }

    pub fn pause(&mut self) -> Result<()> {
        write!(self.output, "\nPress Enter to continue...")?;
        self.output.flush()?;
        self.read_line()?;
        Ok(())
    }
}

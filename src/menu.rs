//! Interactive menu
//!
//! A read-dispatch loop over any [`SchemaLifecycle`]. Each pass prints the
//! menu, reads one line, and either runs an operation, rejects the input, or
//! stops. Store errors end the loop.

use crate::db::SchemaLifecycle;
use crate::error::AppResult;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

const MENU: &str = "\nMENU:\n\
1. Create Tables\n\
2. Populate Tables\n\
3. Query Tables\n\
4. Drop Tables\n\
5. Exit\n";

const PROMPT: &str = "Select an option: ";

/// A recognised menu selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Create,
    Populate,
    Query,
    Drop,
    Exit,
}

impl Choice {
    /// Map a line of input to a choice; surrounding whitespace is ignored
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Choice::Create),
            "2" => Some(Choice::Populate),
            "3" => Some(Choice::Query),
            "4" => Some(Choice::Drop),
            "5" => Some(Choice::Exit),
            _ => None,
        }
    }
}

/// Whether the loop keeps going after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Menu<'a, S, R, W> {
    store: &'a S,
    input: R,
    output: W,
}

impl<'a, S, R, W> Menu<'a, S, R, W>
where
    S: SchemaLifecycle,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(store: &'a S, input: R, output: W) -> Self {
        Self {
            store,
            input,
            output,
        }
    }

    /// Run until Exit is chosen, input ends, or an operation fails
    pub async fn run(&mut self) -> AppResult<()> {
        while self.step().await? == Flow::Continue {}
        Ok(())
    }

    /// One prompt, one line, one dispatch
    pub async fn step(&mut self) -> AppResult<Flow> {
        write!(self.output, "{MENU}{PROMPT}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            debug!("Input closed, leaving menu");
            writeln!(self.output)?;
            return Ok(Flow::Exit);
        }

        match Choice::parse(&line) {
            Some(choice) => self.dispatch(choice).await,
            None => {
                debug!("Rejected menu input {:?}", line.trim());
                writeln!(self.output, "Invalid choice, try again.")?;
                Ok(Flow::Continue)
            }
        }
    }

    async fn dispatch(&mut self, choice: Choice) -> AppResult<Flow> {
        debug!("Menu choice: {:?}", choice);

        match choice {
            Choice::Create => {
                self.store.create_tables().await?;
                writeln!(self.output, "Tables created successfully!")?;
            }
            Choice::Populate => {
                self.store.populate_tables().await?;
                writeln!(self.output, "Tables populated with sample data!")?;
            }
            Choice::Query => {
                let output = &mut self.output;
                self.store
                    .query_tables(|line| Ok(writeln!(output, "{line}")?))
                    .await?;
            }
            Choice::Drop => {
                self.store.drop_tables().await?;
                writeln!(self.output, "Tables dropped!")?;
            }
            Choice::Exit => {
                writeln!(self.output, "Exiting...")?;
                return Ok(Flow::Exit);
            }
        }

        Ok(Flow::Continue)
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.output
    }
}

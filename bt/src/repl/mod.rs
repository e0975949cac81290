//! Console front end
//!
//! Line input via rustyline and colored progress output for the story loop.

mod report;

pub use report::{ConsoleReporter, render_story, render_summary};

use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// Read one line from the terminal
///
/// Returns `None` on Ctrl+C or Ctrl+D. The line is returned untrimmed.
pub fn read_line(prompt: &str) -> Result<Option<String>> {
    let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;
    match rl.readline(prompt) {
        Ok(line) => Ok(Some(line)),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
            println!();
            Ok(None)
        }
        Err(err) => Err(eyre::eyre!("Readline error: {}", err)),
    }
}

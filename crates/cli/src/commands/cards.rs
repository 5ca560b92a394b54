use std::fs;
use std::io::{self, Read};
use std::path::Path;

use mater_core::cards::CardExtractor;

use crate::commands::{CommandResult, EXIT_INPUT};

const COMMAND: &str = "cards";

/// Extracts card blocks from `path`, or from stdin when no path is given.
pub fn run(path: Option<&Path>) -> CommandResult {
    let text = match path {
        Some(path) => fs::read_to_string(path)
            .map_err(|error| format!("could not read `{}`: {error}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map(|_| buffer)
                .map_err(|error| format!("could not read stdin: {error}"))
        }
    };
    match text {
        Ok(text) => extract(&text),
        Err(message) => CommandResult::failure(COMMAND, "io", message, EXIT_INPUT),
    }
}

pub fn extract(text: &str) -> CommandResult {
    let extraction = CardExtractor::default().extract(text);
    let message = format!("{} card(s) extracted", extraction.cards.len());
    CommandResult::success_with(COMMAND, message, Some(&extraction))
}

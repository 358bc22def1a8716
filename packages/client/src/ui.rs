//! UI utilities for the client.

use std::io::Write;

pub const PROMPT: &str = "> ";

/// Print output produced while the user is typing, then redisplay the prompt
pub fn print_above_prompt(output: &str) {
    print!("{}{}", output, PROMPT);
    std::io::stdout().flush().ok();
}

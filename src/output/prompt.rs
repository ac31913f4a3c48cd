//! Interactive prompts.

use super::terminal::ARROW;
use colored::Colorize;
use std::error::Error;
use std::io::Write;

/// Display a styled prompt and read one trimmed line from stdin.
pub fn styled_input(prompt: &str) -> Result<String, Box<dyn Error>> {
    print!("  {} {}", ARROW.green(), prompt.bold());
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// y/n confirmation; anything but y/yes is a no.
pub fn confirm_yes(prompt: &str) -> Result<bool, Box<dyn Error>> {
    let answer = styled_input(prompt)?.to_lowercase();
    Ok(matches!(answer.as_str(), "y" | "yes"))
}

/// Exact-token confirmation for destructive operations.
pub fn confirm_token(prompt: &str, token: &str) -> Result<bool, Box<dyn Error>> {
    Ok(styled_input(prompt)? == token)
}

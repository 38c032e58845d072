use std::io;

use console::{Term, style};

/// Print `question` and read one trimmed line. A terminal that is not
/// attended reads as an empty answer.
pub fn ask(term: &Term, question: &str) -> io::Result<String> {
    term.write_str(&format!("{} ", style(question).bold()))?;
    Ok(term.read_line()?.trim().to_string())
}

/// `(y/n)` question; the answer comes back lower-cased.
pub fn ask_yes_no(term: &Term, question: &str) -> io::Result<String> {
    Ok(ask(term, &format!("{question} (y/n):"))?.to_lowercase())
}

use std::io::{BufRead, Lines};

use super::Result;

pub(super) fn is_comment(line: &str) -> bool {
    let line = line.trim_start();
    line.is_empty() || line.starts_with(['#', '%', 'c'])
}

/// Skips comments and blank lines
pub(super) fn next_content_line<R: BufRead>(lines: &mut Lines<R>) -> Result<Option<String>> {
    for line in lines {
        let line = line?;
        if !is_comment(&line) {
            return Ok(Some(line));
        }
    }
    Ok(None)
}

pub(super) fn tokens(line: &str) -> impl Iterator<Item = &str> {
    line.split_whitespace()
}

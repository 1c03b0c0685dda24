//! # Overwrite Prompt
//!
//! Interactive confirmation before an existing archive is replaced.

use std::io::{self, BufRead, Write};
use std::path::Path;

/// Ask whether an existing archive at `path` may be overwritten.
///
/// Only the exact answers `yes` and `no` are accepted; anything else asks
/// again. End of input counts as `no`.
pub fn confirm_overwrite<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    path: &Path,
) -> io::Result<bool> {
    write!(
        output,
        "warning: archive \"{}\" already exists, overwrite it? (yes or no): ",
        path.display()
    )?;
    output.flush()?;

    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(false);
        }

        match line.trim_end_matches(['\r', '\n']) {
            "yes" => return Ok(true),
            "no" => return Ok(false),
            _ => {
                write!(output, "yes or no: ")?;
                output.flush()?;
            }
        }
    }
}

/// [`confirm_overwrite`] on the process's stdin and stderr.
pub fn confirm_overwrite_stdin(path: &Path) -> io::Result<bool> {
    confirm_overwrite(io::stdin().lock(), io::stderr(), path)
}

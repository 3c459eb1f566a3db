use std::io::Write;

use serde::Serialize;

use crate::error::CliError;

/// Writes the command summary as a single JSON document on stdout.
pub fn render<T>(summary: &T, pretty: bool) -> Result<(), CliError>
where
    T: Serialize,
{
    let body = if pretty {
        serde_json::to_string_pretty(summary)?
    } else {
        serde_json::to_string(summary)?
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{body}")?;
    stdout.flush()?;
    Ok(())
}

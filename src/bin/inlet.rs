use anyhow::{Context, Result};
use std::io::{self, Read, Write};

use reply_tally_hooks::config::{load_dotenv, load_valves};
use reply_tally_hooks::{logging, Filter, WordCountFilter};

fn main() -> Result<()> {
    load_dotenv();
    logging::init();

    // Read request body from stdin
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read stdin")?;

    let mut stdout = io::stdout().lock();

    // Fail open: anything that is not JSON goes back to the host untouched
    let body: serde_json::Value = match serde_json::from_str(&buffer) {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(error=%e, "inlet body is not JSON, passing through");
            stdout.write_all(buffer.as_bytes()).context("Failed to write stdout")?;
            return Ok(());
        }
    };

    let filter = WordCountFilter::new(load_valves());
    let body = filter.inlet(body, None);

    serde_json::to_writer(&mut stdout, &body).context("Failed to serialize body")?;
    writeln!(stdout).context("Failed to write stdout")?;
    Ok(())
}

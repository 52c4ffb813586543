use anyhow::{Context, Result};
use gcodepilot::{compile, init_logging, JobFile};

fn main() -> Result<()> {
    init_logging()?;

    let path = std::env::args()
        .nth(1)
        .context("usage: gcodepilot <job.json>")?;
    let text =
        std::fs::read_to_string(&path).with_context(|| format!("failed to read {path}"))?;
    let job: JobFile = serde_json::from_str(&text).context("invalid job file")?;

    tracing::info!(
        operations = job.operations.len(),
        stock = %job.stock.describe(),
        "compiling job"
    );

    let output = compile(&job.stock, &job.operations, &job.explanation);
    print!("{}", output.program);

    Ok(())
}

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use crate::sync::local::LocalTaskStore;
use crate::sync::wire::handle_request;

/// Answer JSON requests from stdin on stdout until stdin closes.
pub async fn run(store: &LocalTaskStore) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    info!("serving requests on stdin");

    let mut served = 0u64;
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let reply = handle_request(store, &line).await;
        stdout.write_all(reply.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
        served += 1;
    }

    info!(served, "stdin closed, stopping");
    Ok(())
}

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use serde_json::Value;

use crate::api::{Api, ApiError, Reply, Request};
use crate::cli::subcommands::ReplayArgs;
use crate::context::AppContext;

/// Handle `omap replay`: run a JSONL batch in file order.
pub async fn handle(args: &ReplayArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let api = ctx.api();
    let replies = replay_file(&api, &args.file).await?;

    match &args.output {
        Some(path) => serde_jsonlines::write_json_lines(path, &replies)
            .with_context(|| format!("failed to write replies to {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            for reply in &replies {
                serde_json::to_writer(&mut stdout, reply)?;
                stdout.write_all(b"\n")?;
            }
        }
    }

    let failed = replies.iter().filter(|reply| reply.status >= 400).count();
    tracing::info!(total = replies.len(), failed, "replay finished");
    Ok(())
}

/// Answer each request of a JSONL file sequentially, so later lines see
/// the effects (and sessions) of earlier ones.
///
/// A line that is not valid JSON produces a 400 reply; it does not abort the batch.
pub async fn replay_file(api: &Api, path: &Path) -> anyhow::Result<Vec<Reply>> {
    let lines = serde_jsonlines::json_lines::<Value, _>(path)
        .with_context(|| format!("failed to open request file {}", path.display()))?;

    let mut replies = Vec::new();
    for line in lines {
        let reply = match line {
            Ok(value) => match Request::from_value(value) {
                Ok(request) => api.handle(request).await,
                Err(reply) => reply,
            },
            Err(error) => Reply::from_error(None, &ApiError::BadRequest(error.to_string())),
        };
        replies.push(reply);
    }
    Ok(replies)
}

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};

use crate::api::{Api, Reply};
use crate::context::AppContext;

/// Replies waiting for the writer before request tasks start to block.
const REPLY_BUFFER: usize = 256;

/// Handle `omap serve`: requests on stdin, replies on stdout.
pub async fn handle(ctx: &AppContext) -> anyhow::Result<()> {
    let api = Arc::new(ctx.api());
    let stdin = BufReader::new(tokio::io::stdin());
    tracing::info!(database = %ctx.config.database.path, "serving requests from stdin");
    serve_lines(api, stdin, tokio::io::stdout()).await?;
    Ok(())
}

/// Answer every request line of `input`, each on its own task.
///
/// Replies are written to `output` in completion order, one JSON object per
/// line, by a single writer task. Finished request tasks are reaped while
/// input is still open. Returns the writer once input is exhausted and every
/// reply is flushed.
pub async fn serve_lines<R, W>(api: Arc<Api>, input: R, output: W) -> anyhow::Result<W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<Reply>(REPLY_BUFFER);
    let writer = tokio::spawn(write_replies(rx, output));

    let mut tasks = JoinSet::new();
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await.context("failed to read request line")? {
        if line.trim().is_empty() {
            continue;
        }
        let api = Arc::clone(&api);
        let tx = tx.clone();
        tasks.spawn(async move {
            let reply = api.handle_line(&line).await;
            if tx.send(reply).await.is_err() {
                tracing::error!("reply writer stopped; dropping reply");
            }
        });
        reap_finished(&mut tasks);
    }

    while let Some(joined) = tasks.join_next().await {
        log_join(joined);
    }
    drop(tx);

    writer.await.context("reply writer task failed")?
}

/// Drop every request task that has already completed. Returns how many were reaped.
fn reap_finished(tasks: &mut JoinSet<()>) -> usize {
    let mut reaped = 0;
    while let Some(joined) = tasks.try_join_next() {
        log_join(joined);
        reaped += 1;
    }
    reaped
}

fn log_join(joined: Result<(), JoinError>) {
    if let Err(error) = joined {
        tracing::error!(%error, "request task panicked");
    }
}

async fn write_replies<W>(mut rx: mpsc::Receiver<Reply>, mut output: W) -> anyhow::Result<W>
where
    W: AsyncWrite + Unpin,
{
    while let Some(reply) = rx.recv().await {
        let mut line = serde_json::to_vec(&reply)?;
        line.push(b'\n');
        output.write_all(&line).await?;
        output.flush().await?;
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use om_auth::SessionCache;
    use om_auth::password::hash_password;
    use om_db::{OmDb, OmService};
    use pretty_assertions::assert_eq;

    use super::*;

    async fn api() -> Arc<Api> {
        let service = OmService::from_db(OmDb::open_local(":memory:").await.unwrap());
        service
            .create_user("org-1", "admin@one.test", "Admin", &hash_password("pw").unwrap(), true)
            .await
            .unwrap();
        Arc::new(Api::new(
            Arc::new(service),
            Arc::new(SessionCache::new()),
            "serve-secret".into(),
        ))
    }

    fn parse(output: &[u8]) -> HashMap<String, Reply> {
        std::str::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str::<Reply>(line).unwrap())
            .map(|reply| (reply.id.clone().unwrap_or_default(), reply))
            .collect()
    }

    #[tokio::test]
    async fn answers_every_line_with_its_id() {
        let api = api().await;
        let input = concat!(
            r#"{"id":"a","op":"login","email":"admin@one.test","password":"pw"}"#,
            "\n",
            "\n",
            r#"{"id":"b","op":"list_projects"}"#,
            "\n",
            r#"{"id":"c","op":"nope"}"#,
            "\n",
        );

        let output = serve_lines(api, input.as_bytes(), Vec::new()).await.unwrap();
        let replies = parse(&output);

        assert_eq!(replies.len(), 3);
        assert_eq!(replies["a"].status, 200);
        assert_eq!(replies["a"].message, "login success");
        assert_eq!(replies["b"].status, 401);
        assert_eq!(replies["c"].status, 400);
    }

    #[tokio::test]
    async fn requests_share_the_session_cache() {
        let api = api().await;
        let key = api.login("admin@one.test", "pw").await.unwrap();
        let mut input = String::new();
        for i in 0..16 {
            input.push_str(&format!(
                "{{\"id\":\"p{i}\",\"api_key\":\"{key}\",\"op\":\"add_project\",\"project\":{{\"project_name\":\"P{i}\"}}}}\n"
            ));
        }

        let output = serve_lines(Arc::clone(&api), input.as_bytes(), Vec::new())
            .await
            .unwrap();
        let replies = parse(&output);
        assert_eq!(replies.len(), 16);
        assert!(replies.values().all(|reply| reply.status == 200));

        let projects = api.list_projects(Some(&key)).await.unwrap();
        assert_eq!(projects.len(), 16);
    }

    #[tokio::test]
    async fn replies_while_input_stays_open() {
        let api = api().await;
        let (mut requests, input) = tokio::io::duplex(4096);
        let (output, replies) = tokio::io::duplex(4096);
        let server = tokio::spawn(serve_lines(api, BufReader::new(input), output));

        let mut replies = BufReader::new(replies).lines();
        for i in 0..200 {
            requests
                .write_all(format!("{{\"id\":\"r{i}\",\"op\":\"list_projects\"}}\n").as_bytes())
                .await
                .unwrap();
            let line = replies.next_line().await.unwrap().unwrap();
            let reply: Reply = serde_json::from_str(&line).unwrap();
            assert_eq!(reply.id, Some(format!("r{i}")));
            assert_eq!(reply.status, 401);
        }

        drop(requests);
        server.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn finished_tasks_are_reaped_without_waiting() {
        let mut tasks = JoinSet::new();
        for _ in 0..64 {
            tasks.spawn(async {});
        }
        tasks.spawn(async { panic!("request blew up") });
        let pending = tasks.spawn(std::future::pending::<()>());

        // Let the current-thread runtime run everything that can finish.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        assert_eq!(reap_finished(&mut tasks), 65);
        assert_eq!(tasks.len(), 1);
        assert_eq!(reap_finished(&mut tasks), 0);
        pending.abort();
    }

    #[tokio::test]
    async fn empty_input_writes_nothing() {
        let output = serve_lines(api().await, &b""[..], Vec::new()).await.unwrap();
        assert!(output.is_empty());
    }
}

//! JSON-lines 指令/事件介面。
//!
//! 每行輸入是一個 `Command`，每個輸出事件序列化成一行 JSON。輸入結束後
//! 仍會持續轉送事件，直到 shutdown。

use crate::core::commands::CommandSurface;
use crate::domain::model::{Command, ScanEvent};
use crate::utils::error::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

pub async fn run_console<R, W>(
    surface: CommandSurface,
    mut input: R,
    mut output: W,
    shutdown: CancellationToken,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut events = surface.subscribe();
    // 以位元組讀入，非 UTF-8 的行也只會被當成格式錯誤的指令
    let mut buf = Vec::new();
    let mut input_open = true;

    write_event(&mut output, &surface.init_event()).await?;

    loop {
        tokio::select! {
            biased;

            read = input.read_until(b'\n', &mut buf), if input_open => {
                match read {
                    Ok(0) => {
                        tracing::debug!("Command input closed, continuing to stream events");
                        input_open = false;
                    }
                    Ok(_) => {
                        let line = String::from_utf8_lossy(&buf).into_owned();
                        buf.clear();
                        if let Some(reply) = dispatch(&surface, &line) {
                            write_event(&mut output, &reply).await?;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Command input failed, no longer reading commands: {}", e);
                        input_open = false;
                    }
                }
            }
            event = events.recv() => {
                match event {
                    Ok(event) => write_event(&mut output, &event).await?,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("Console lagged behind, {} events dropped", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            _ = shutdown.cancelled() => break,
        }
    }

    output.flush().await?;
    Ok(())
}

fn dispatch(surface: &CommandSurface, line: &str) -> Option<ScanEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    match serde_json::from_str::<Command>(line) {
        Ok(command) => {
            tracing::debug!("Command received: {:?}", command);
            surface.handle(command)
        }
        Err(e) => {
            tracing::warn!("Ignoring malformed command '{}': {}", line, e);
            None
        }
    }
}

async fn write_event<W: AsyncWrite + Unpin>(output: &mut W, event: &ScanEvent) -> Result<()> {
    let mut line = serde_json::to_string(event)?;
    line.push('\n');
    output.write_all(line.as_bytes()).await?;
    output.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dedup::DedupStore;
    use crate::core::events::EventBus;
    use crate::core::state::{ScanState, SharedState};

    #[tokio::test]
    async fn test_commands_and_export_reply() {
        let state = SharedState::new(ScanState::rehydrated(
            DedupStore::new(),
            vec!["a".to_string(), "b".to_string()],
        ));
        let surface = CommandSurface::new(state.clone(), EventBus::default());
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let input: &[u8] = b"{\"command\":\"start\"}\n\
            not json\n\
            {\"command\":\"set_strategy\",\"value\":\"hybrid\"}\n\
            {\"command\":\"export\",\"format\":\"csv\"}\n";
        let mut output = Vec::new();

        run_console(surface, input, &mut output, shutdown)
            .await
            .unwrap();

        let text = String::from_utf8(output).unwrap();
        let events: Vec<ScanEvent> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ScanEvent::Init(_)));
        assert!(matches!(
            &events[1],
            ScanEvent::Export { blob, .. } if blob == "a,b"
        ));

        let run = state.run_state();
        assert!(run.running);
        assert_eq!(run.strategy.as_str(), "hybrid");
    }

    #[tokio::test]
    async fn test_non_utf8_line_is_ignored() {
        let state = SharedState::default();
        let surface = CommandSurface::new(state.clone(), EventBus::default());
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let input: &[u8] = b"\xff\xfe\n{\"command\":\"start\"}\n";
        let mut output = Vec::new();

        run_console(surface, input, &mut output, shutdown)
            .await
            .unwrap();

        assert!(state.run_state().running);
    }

    #[tokio::test]
    async fn test_forwards_bus_events() {
        let bus = EventBus::default();
        let surface = CommandSurface::new(SharedState::default(), bus.clone());
        let shutdown = CancellationToken::new();

        let (client, server) = tokio::io::duplex(4096);
        let (_read_half, write_half) = tokio::io::split(server);
        let (client_read, _client_write) = tokio::io::split(client);

        let task = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                run_console(surface, tokio::io::BufReader::new(tokio::io::empty()), write_half, shutdown).await
            })
        };

        // 等 console 訂閱完成
        let mut reader = tokio::io::BufReader::new(client_read).lines();
        let first = reader.next_line().await.unwrap().unwrap();
        assert!(first.contains("\"init\""));

        bus.publish(ScanEvent::Found {
            identifier: "star42".to_string(),
        });
        let second = reader.next_line().await.unwrap().unwrap();
        let event: ScanEvent = serde_json::from_str(&second).unwrap();
        assert_eq!(
            event,
            ScanEvent::Found {
                identifier: "star42".to_string()
            }
        );

        shutdown.cancel();
        task.await.unwrap().unwrap();
    }
}

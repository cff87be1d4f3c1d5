//! JSON-lines request loop.
//!
//! Requests are dispatched as soon as their line is read, so a `status`
//! poll is answered while a `scan` is still waiting for a finger, and a
//! second `scan` fails fast. Envelopes are written in completion order;
//! clients tag requests with an `id` to match them up.

use anyhow::Result;
use futures::future::LocalBoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use rollcall_hardware::HidBackend;
use rollcall_service::{Envelope, FingerprintService};
use rollcall_storage::StudentRepository;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Answer every request line read from `input` with one envelope line on
/// `output`.
///
/// Blank lines are skipped. Returns once `input` reaches EOF and every
/// request in flight has been answered, with the number of requests
/// answered.
pub async fn serve_lines<B, R, I, O>(
    service: &FingerprintService<B, R>,
    input: I,
    mut output: O,
) -> Result<usize>
where
    B: HidBackend,
    R: StudentRepository,
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut in_flight: FuturesUnordered<LocalBoxFuture<'_, Envelope>> = FuturesUnordered::new();
    let mut input_open = true;
    let mut answered = 0;

    loop {
        tokio::select! {
            Some(envelope) = in_flight.next(), if !in_flight.is_empty() => {
                write_envelope(&mut output, &envelope).await?;
                answered += 1;
            }
            line = lines.next_line(), if input_open => {
                match line? {
                    Some(line) => {
                        let line = line.trim().to_string();
                        if !line.is_empty() {
                            in_flight.push(async move { service.dispatch_json(&line).await }.boxed_local());
                        }
                    }
                    None => {
                        debug!("Input closed with {} request(s) in flight", in_flight.len());
                        input_open = false;
                    }
                }
            }
            else => break,
        }
    }

    debug!("Answered {} request(s)", answered);
    Ok(answered)
}

async fn write_envelope<O: AsyncWrite + Unpin>(output: &mut O, envelope: &Envelope) -> Result<()> {
    output.write_all(envelope.to_json_line().as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}

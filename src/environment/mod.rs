//! Signals from the hosting environment: a one-time "ready" and visibility changes.
//!
//! The binary reads them from stdin, one per line (`ready`, `visible`, `hidden`).
//! Stdin is read on its own OS thread: a blocked read must not hold up runtime shutdown.

use log::{debug, info, warn};
use std::io::{self, BufRead, BufReader};
use std::str::FromStr;
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::models::Visibility;

#[derive(Debug, Error)]
#[error("unknown environment signal: {0:?}")]
pub struct UnknownSignal(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentSignal {
    Ready,
    Visibility(Visibility),
}

impl FromStr for EnvironmentSignal {
    type Err = UnknownSignal;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("ready") {
            return Ok(EnvironmentSignal::Ready);
        }
        s.parse()
            .map(EnvironmentSignal::Visibility)
            .map_err(|_| UnknownSignal(s.trim().to_string()))
    }
}

/// Whether the environment is ready for interaction at startup.
pub enum Readiness {
    Ready,
    Pending(oneshot::Receiver<()>),
}

impl Readiness {
    /// Resolves once the environment is ready.
    pub async fn wait(self) {
        if let Readiness::Pending(rx) = self {
            info!("Waiting for the environment to become ready");
            if rx.await.is_err() {
                warn!("Environment closed before signalling ready, starting anyway");
            }
        }
    }
}

/// Routes parsed signals: visibility to the scheduler, the first `ready` to startup.
pub struct SignalRouter {
    visibility_tx: mpsc::UnboundedSender<Visibility>,
    ready_tx: Option<oneshot::Sender<()>>,
}

impl SignalRouter {
    pub fn new(wait_for_ready: bool) -> (Self, Readiness, mpsc::UnboundedReceiver<Visibility>) {
        let (visibility_tx, visibility_rx) = mpsc::unbounded_channel();
        let (ready_tx, readiness) = if wait_for_ready {
            let (tx, rx) = oneshot::channel();
            (Some(tx), Readiness::Pending(rx))
        } else {
            (None, Readiness::Ready)
        };

        let router = Self {
            visibility_tx,
            ready_tx,
        };
        (router, readiness, visibility_rx)
    }

    pub fn dispatch(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }

        match line.parse::<EnvironmentSignal>() {
            Ok(EnvironmentSignal::Ready) => match self.ready_tx.take() {
                Some(tx) => {
                    let _ = tx.send(());
                }
                None => debug!("Ignoring repeated ready signal"),
            },
            Ok(EnvironmentSignal::Visibility(visibility)) => {
                if self.visibility_tx.send(visibility).is_err() {
                    debug!("Scheduler gone, dropping visibility change");
                }
            }
            Err(e) => warn!("Ignoring environment signal: {e}"),
        }
    }

    /// Reads signals line by line until the reader is exhausted. Blocks.
    pub fn listen<R: BufRead>(mut self, reader: R) {
        for line in reader.lines() {
            match line {
                Ok(line) => self.dispatch(&line),
                Err(e) => {
                    warn!("Failed to read environment signal: {}", e);
                    break;
                }
            }
        }
        info!("Environment signal stream closed");
    }
}

/// Listens to `reader` on a dedicated thread.
///
/// The thread is never joined on shutdown; if it is still blocked in a read
/// it goes away with the process.
pub fn spawn_listener<R>(
    wait_for_ready: bool,
    reader: R,
) -> io::Result<(Readiness, mpsc::UnboundedReceiver<Visibility>, JoinHandle<()>)>
where
    R: BufRead + Send + 'static,
{
    let (router, readiness, visibility_rx) = SignalRouter::new(wait_for_ready);
    let handle = thread::Builder::new()
        .name("environment-signals".into())
        .spawn(move || router.listen(reader))?;
    Ok((readiness, visibility_rx, handle))
}

pub fn spawn_stdin_listener(
    wait_for_ready: bool,
) -> io::Result<(Readiness, mpsc::UnboundedReceiver<Visibility>, JoinHandle<()>)> {
    spawn_listener(wait_for_ready, BufReader::new(io::stdin()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::sync::mpsc as std_mpsc;

    /// A reader that blocks until the test hands it bytes, like an idle stdin.
    struct BlockingReader {
        chunks: std_mpsc::Receiver<Vec<u8>>,
        pending: Vec<u8>,
    }

    impl Read for BlockingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.pending.is_empty() {
                match self.chunks.recv() {
                    Ok(chunk) => self.pending = chunk,
                    // Sender dropped: end of input
                    Err(_) => return Ok(0),
                }
            }
            let n = buf.len().min(self.pending.len());
            buf[..n].copy_from_slice(&self.pending[..n]);
            self.pending.drain(..n);
            Ok(n)
        }
    }

    #[test]
    fn test_parse_signals() {
        assert_eq!("ready".parse::<EnvironmentSignal>().unwrap(), EnvironmentSignal::Ready);
        assert_eq!(
            "HIDDEN".parse::<EnvironmentSignal>().unwrap(),
            EnvironmentSignal::Visibility(Visibility::Hidden)
        );
        assert!("loading".parse::<EnvironmentSignal>().is_err());
    }

    #[test]
    fn test_unknown_signal_error() {
        let err = " loading ".parse::<EnvironmentSignal>().unwrap_err();
        assert_eq!(err.0, "loading");
        assert_eq!(err.to_string(), "unknown environment signal: \"loading\"");
    }

    #[tokio::test]
    async fn test_listen_routes_signals() {
        let (router, readiness, mut visibility_rx) = SignalRouter::new(true);
        let input: &[u8] = b"hidden\nbogus\n\nready\nready\nvisible\n";

        router.listen(input);

        readiness.wait().await;
        assert_eq!(visibility_rx.recv().await, Some(Visibility::Hidden));
        assert_eq!(visibility_rx.recv().await, Some(Visibility::Visible));
        assert_eq!(visibility_rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_ready_immediately_when_not_waiting() {
        let (_router, readiness, _rx) = SignalRouter::new(false);
        assert!(matches!(readiness, Readiness::Ready));
        readiness.wait().await;
    }

    #[tokio::test]
    async fn test_closed_before_ready_still_starts() {
        let (router, readiness, _rx) = SignalRouter::new(true);
        drop(router);
        readiness.wait().await;
    }

    #[test]
    fn test_blocked_listener_does_not_hold_up_runtime_shutdown() {
        let (chunks_tx, chunks) = std_mpsc::channel();
        let reader = BufReader::new(BlockingReader {
            chunks,
            pending: Vec::new(),
        });
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let (readiness, mut visibility_rx, handle) = spawn_listener(true, reader).unwrap();
        chunks_tx.send(b"ready\nhidden\n".to_vec()).unwrap();
        runtime.block_on(async {
            readiness.wait().await;
            assert_eq!(visibility_rx.recv().await, Some(Visibility::Hidden));
        });

        // The listener is now blocked in a read that will not return on its own
        drop(runtime);
        assert!(!handle.is_finished());

        drop(chunks_tx);
        handle.join().unwrap();
    }
}

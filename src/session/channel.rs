//! Channel Session
//!
//! Runs one peer's live-update channel from upgrade to teardown.

use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use super::config::SessionConfig;
use super::error::{CloseReason, SessionError};
use super::signal::CloseSignal;
use super::timers::{SessionTimers, Tick};
use super::transport::{Frame, FrameSink, FrameStream, Transport};
use crate::render::PayloadSource;

/// Counters kept by the write-loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    /// Payload text frames written
    pub payloads_sent: u64,
    /// Ping probes written
    pub pings_sent: u64,
    /// Push ticks skipped because the payload could not be rendered
    pub render_failures: u64,
}

/// How a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub session_id: String,
    pub reason: CloseReason,
    pub stats: WriteStats,
}

/// One peer's live-push channel
pub struct ChannelSession {
    id: String,
    config: SessionConfig,
    payload: Arc<dyn PayloadSource>,
}

impl ChannelSession {
    pub fn new(config: SessionConfig, payload: Arc<dyn PayloadSource>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            config,
            payload,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Split the connection and run the session until it is torn down
    pub async fn start<T: Transport>(self, connection: T) -> SessionOutcome {
        let (sink, stream) = connection.split();
        self.run(sink, stream).await
    }

    /// Run the session over an already split connection
    ///
    /// The write-loop is spawned; the read-loop runs on the calling task.
    /// Returns once both loops have exited and the sink has been closed.
    pub async fn run<S, R>(self, sink: S, mut stream: R) -> SessionOutcome
    where
        S: FrameSink + 'static,
        R: FrameStream,
    {
        let signal = Arc::new(CloseSignal::new());

        tracing::info!(
            session_id = %self.id,
            push_interval = ?self.config.push_interval,
            ping_period = ?self.config.ping_period,
            "Session started"
        );

        let writer = WriteLoop {
            session_id: self.id.clone(),
            config: self.config,
            payload: Arc::clone(&self.payload),
            signal: Arc::clone(&signal),
        };
        let write_task = tokio::spawn(writer.run(sink));

        if let Some(reason) = read_loop(&self.id, &mut stream, self.config.pong_wait, &signal).await {
            signal.close(reason);
        }

        let stats = match write_task.await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::error!(session_id = %self.id, error = %e, "Write loop aborted");
                signal.close(SessionError::WriteLoopAborted(e.to_string()).into());
                WriteStats::default()
            }
        };

        let reason = signal.reason().cloned().unwrap_or(CloseReason::PeerClosed);

        tracing::info!(
            session_id = %self.id,
            reason = %reason,
            payloads_sent = stats.payloads_sent,
            pings_sent = stats.pings_sent,
            render_failures = stats.render_failures,
            "Session closed"
        );

        SessionOutcome {
            session_id: self.id,
            reason,
            stats,
        }
    }
}

/// Consume inbound frames until the peer goes away, goes silent, or the
/// session is closed from the write side
///
/// Returns `None` when stopped by the close signal.
async fn read_loop<R: FrameStream>(
    session_id: &str,
    stream: &mut R,
    liveness: Duration,
    signal: &CloseSignal,
) -> Option<CloseReason> {
    loop {
        // A fresh deadline per frame: any inbound frame counts as liveness
        let next = tokio::select! {
            biased;
            _ = signal.closed() => return None,
            next = tokio::time::timeout(liveness, stream.next_frame()) => next,
        };

        match next {
            Ok(Some(Ok(Frame::Close))) => {
                tracing::debug!(session_id = %session_id, "Peer requested close");
                return Some(CloseReason::PeerClosed);
            }
            Ok(Some(Ok(frame))) => {
                tracing::trace!(session_id = %session_id, kind = frame.kind(), "Inbound frame");
            }
            Ok(Some(Err(e))) => {
                tracing::debug!(session_id = %session_id, error = %e, "Read failed");
                return Some(SessionError::Read(e).into());
            }
            Ok(None) => {
                tracing::debug!(session_id = %session_id, "Peer stream ended");
                return Some(CloseReason::PeerClosed);
            }
            Err(_) => {
                tracing::debug!(session_id = %session_id, window = ?liveness, "Liveness window elapsed");
                return Some(SessionError::LivenessTimeout(liveness).into());
            }
        }
    }
}

/// The single writer of a session
struct WriteLoop {
    session_id: String,
    config: SessionConfig,
    payload: Arc<dyn PayloadSource>,
    signal: Arc<CloseSignal>,
}

/// Closes the signal if the write-loop unwinds, so the read-loop stops too
struct AbortGuard<'a> {
    signal: &'a CloseSignal,
}

impl Drop for AbortGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.signal
                .close(SessionError::WriteLoopAborted("write loop panicked".into()).into());
        }
    }
}

impl WriteLoop {
    async fn run<S: FrameSink>(self, mut sink: S) -> WriteStats {
        let _guard = AbortGuard {
            signal: &self.signal,
        };
        let mut timers = SessionTimers::new(&self.config);
        let mut stats = WriteStats::default();

        loop {
            let tick = tokio::select! {
                biased;
                _ = self.signal.closed() => break,
                tick = timers.next() => tick,
            };

            let frame = match tick {
                Tick::Push => match self.payload.render() {
                    Ok(body) => Frame::Text(body),
                    Err(e) => {
                        stats.render_failures += 1;
                        tracing::warn!(
                            session_id = %self.session_id,
                            error = %e,
                            "Payload render failed, skipping tick"
                        );
                        continue;
                    }
                },
                Tick::Heartbeat => Frame::Ping(Vec::new()),
            };

            // Closing may have begun while rendering
            if self.signal.is_closed() {
                break;
            }

            if let Err(e) = self.send(&mut sink, frame).await {
                tracing::debug!(session_id = %self.session_id, error = %e, "Write failed");
                self.signal.close(e.into());
                break;
            }

            match tick {
                Tick::Push => stats.payloads_sent += 1,
                Tick::Heartbeat => stats.pings_sent += 1,
            }
        }

        drop(timers);

        // Sole owner of the sink, so this is the only close
        match tokio::time::timeout(self.config.write_wait, sink.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::debug!(session_id = %self.session_id, error = %e, "Close after teardown failed");
            }
            Err(_) => {
                tracing::debug!(session_id = %self.session_id, "Close after teardown timed out");
            }
        }

        stats
    }

    async fn send<S: FrameSink>(&self, sink: &mut S, frame: Frame) -> Result<(), SessionError> {
        let wait = self.config.write_wait;
        match tokio::time::timeout(wait, sink.send(frame)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(SessionError::Write(e)),
            Err(_) => Err(SessionError::WriteTimeout(wait)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderError;
    use crate::session::TransportError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::mpsc;
    use tokio::time::Instant;

    type Inbound = Result<Frame, TransportError>;

    /// What the mock peer saw and how it misbehaves
    #[derive(Default)]
    struct PeerState {
        sent: Vec<Frame>,
        send_attempts: usize,
        close_calls: usize,
        in_flight: bool,
        overlapped: bool,
        fail_on_send: Option<usize>,
        fail_pings: bool,
        stall_sends: bool,
    }

    #[derive(Clone, Default)]
    struct MockPeer {
        state: Arc<Mutex<PeerState>>,
    }

    impl MockPeer {
        fn sent(&self) -> Vec<Frame> {
            self.state.lock().unwrap().sent.clone()
        }

        fn texts(&self) -> Vec<String> {
            self.sent()
                .into_iter()
                .filter_map(|f| match f {
                    Frame::Text(t) => Some(t),
                    _ => None,
                })
                .collect()
        }

        fn close_calls(&self) -> usize {
            self.state.lock().unwrap().close_calls
        }

        fn overlapped(&self) -> bool {
            self.state.lock().unwrap().overlapped
        }
    }

    struct MockSink {
        peer: MockPeer,
        auto_pong: Option<mpsc::UnboundedSender<Inbound>>,
    }

    #[async_trait]
    impl FrameSink for MockSink {
        async fn send(&mut self, frame: Frame) -> Result<(), TransportError> {
            let stall = {
                let mut state = self.peer.state.lock().unwrap();
                if state.in_flight {
                    state.overlapped = true;
                }
                state.in_flight = true;
                state.send_attempts += 1;
                state.stall_sends
            };

            if stall {
                std::future::pending::<()>().await;
            }
            // Let the other loop run while this send is "on the wire"
            tokio::task::yield_now().await;

            let mut state = self.peer.state.lock().unwrap();
            state.in_flight = false;

            let is_ping = matches!(frame, Frame::Ping(_));
            if state.fail_on_send == Some(state.send_attempts) || (is_ping && state.fail_pings) {
                return Err(TransportError::Io("broken pipe".into()));
            }

            state.sent.push(frame);
            if is_ping {
                if let Some(tx) = &self.auto_pong {
                    let _ = tx.send(Ok(Frame::Pong(Vec::new())));
                }
            }
            Ok(())
        }

        async fn close(&mut self) -> Result<(), TransportError> {
            let mut state = self.peer.state.lock().unwrap();
            state.close_calls += 1;
            if state.close_calls > 1 {
                return Err(TransportError::Closed);
            }
            Ok(())
        }
    }

    struct MockStream {
        rx: mpsc::UnboundedReceiver<Inbound>,
    }

    #[async_trait]
    impl FrameStream for MockStream {
        async fn next_frame(&mut self) -> Option<Inbound> {
            self.rx.recv().await
        }
    }

    struct Harness {
        peer: MockPeer,
        inbound: mpsc::UnboundedSender<Inbound>,
        sink: MockSink,
        stream: MockStream,
    }

    fn harness(auto_pong: bool) -> Harness {
        let peer = MockPeer::default();
        let (tx, rx) = mpsc::unbounded_channel();
        Harness {
            sink: MockSink {
                peer: peer.clone(),
                auto_pong: auto_pong.then(|| tx.clone()),
            },
            stream: MockStream { rx },
            peer,
            inbound: tx,
        }
    }

    /// Payload source returning "T1", "T2", ...
    fn numbered() -> Arc<dyn PayloadSource> {
        let counter = AtomicUsize::new(0);
        Arc::new(move || -> Result<String, RenderError> {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("T{}", n))
        })
    }

    fn quiet_heartbeat() -> SessionConfig {
        SessionConfig::new(
            Duration::from_secs(1),
            Duration::from_secs(10),
            Duration::from_secs(3600),
        )
    }

    fn session(config: SessionConfig, payload: Arc<dyn PayloadSource>) -> ChannelSession {
        ChannelSession::new(config, payload)
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_push_ticks_send_two_frames_in_order() {
        let h = harness(false);
        let task = tokio::spawn(session(quiet_heartbeat(), numbered()).run(h.sink, h.stream));

        tokio::time::sleep(Duration::from_millis(2500)).await;
        h.inbound.send(Ok(Frame::Close)).unwrap();

        let outcome = task.await.unwrap();
        assert_eq!(outcome.reason, CloseReason::PeerClosed);
        assert_eq!(h.peer.sent(), vec![Frame::Text("T1".into()), Frame::Text("T2".into())]);
        assert_eq!(outcome.stats.payloads_sent, 2);
        assert_eq!(outcome.stats.pings_sent, 0);
        assert_eq!(h.peer.close_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_failure_on_third_tick() {
        let h = harness(false);
        h.peer.state.lock().unwrap().fail_on_send = Some(3);

        let outcome = session(quiet_heartbeat(), numbered()).run(h.sink, h.stream).await;

        assert!(matches!(
            outcome.reason,
            CloseReason::Failed(SessionError::Write(TransportError::Io(_)))
        ));
        assert_eq!(outcome.stats.payloads_sent, 2);
        assert_eq!(h.peer.texts(), vec!["T1", "T2"]);
        assert_eq!(h.peer.close_calls(), 1);

        // Timers went with the write-loop: nothing else is ever sent
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(h.peer.sent().len(), 2);
        assert_eq!(h.peer.state.lock().unwrap().send_attempts, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_text_frames_match_ticks_before_failure() {
        for fail_at in 1..=5 {
            let h = harness(false);
            h.peer.state.lock().unwrap().fail_on_send = Some(fail_at);

            let outcome = session(quiet_heartbeat(), numbered()).run(h.sink, h.stream).await;

            assert_eq!(outcome.stats.payloads_sent as usize, fail_at - 1);
            assert_eq!(h.peer.texts().len(), fail_at - 1);
            assert!(outcome.reason.is_error());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_failure_closes_before_liveness_window() {
        let h = harness(false);
        h.peer.state.lock().unwrap().fail_pings = true;

        let config = SessionConfig::new(
            Duration::from_secs(3600),
            Duration::from_secs(10),
            Duration::from_secs(60),
        );
        let start = Instant::now();
        let outcome = session(config, numbered()).run(h.sink, h.stream).await;

        assert!(matches!(outcome.reason, CloseReason::Failed(SessionError::Write(_))));
        assert_eq!(start.elapsed(), Duration::from_secs(54));
        assert_eq!(outcome.stats.pings_sent, 0);
        assert_eq!(h.peer.close_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_peer_times_out_after_liveness_window() {
        let h = harness(false);
        let config = SessionConfig::new(
            Duration::from_secs(3600),
            Duration::from_secs(10),
            Duration::from_secs(60),
        );

        let start = Instant::now();
        let outcome = session(config, numbered()).run(h.sink, h.stream).await;

        assert_eq!(
            outcome.reason,
            CloseReason::Failed(SessionError::LivenessTimeout(Duration::from_secs(60)))
        );
        assert_eq!(start.elapsed(), Duration::from_secs(60));
        // One probe went out at 54s but nothing came back
        assert_eq!(outcome.stats.pings_sent, 1);
        assert_eq!(h.peer.close_calls(), 1);
        drop(h.inbound);
    }

    #[tokio::test(start_paused = true)]
    async fn test_liveness_window_counts_from_last_frame() {
        let h = harness(false);
        let config = SessionConfig::new(
            Duration::from_secs(3600),
            Duration::from_secs(10),
            Duration::from_secs(60),
        );

        let start = Instant::now();
        let task = tokio::spawn(session(config, numbered()).run(h.sink, h.stream));

        tokio::time::sleep(Duration::from_secs(30)).await;
        h.inbound.send(Ok(Frame::Text("hello".into()))).unwrap();

        let outcome = task.await.unwrap();
        assert!(matches!(
            outcome.reason,
            CloseReason::Failed(SessionError::LivenessTimeout(_))
        ));
        assert_eq!(start.elapsed(), Duration::from_secs(90));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ponging_peer_never_times_out() {
        let h = harness(true);
        let task = tokio::spawn(session(SessionConfig::default(), numbered()).run(h.sink, h.stream));

        tokio::time::sleep(Duration::from_millis(299_500)).await;
        assert!(!task.is_finished());

        h.inbound.send(Ok(Frame::Close)).unwrap();
        let outcome = task.await.unwrap();

        assert_eq!(outcome.reason, CloseReason::PeerClosed);
        assert_eq!(outcome.stats.pings_sent, 5);
        assert_eq!(outcome.stats.payloads_sent, 299);
        assert!(!h.peer.overlapped());
    }

    #[tokio::test(start_paused = true)]
    async fn test_coinciding_timers_never_overlap_sends() {
        let h = harness(true);
        let config = SessionConfig::new(
            Duration::from_secs(1),
            Duration::from_secs(10),
            Duration::from_secs(2),
        )
        .with_ping_period(Duration::from_secs(1));

        let task = tokio::spawn(session(config, numbered()).run(h.sink, h.stream));

        tokio::time::sleep(Duration::from_millis(9500)).await;
        h.inbound.send(Ok(Frame::Close)).unwrap();
        let outcome = task.await.unwrap();

        assert!(!h.peer.overlapped());
        assert_eq!(outcome.stats.payloads_sent, 9);
        assert_eq!(outcome.stats.pings_sent, 9);
        // Payloads keep their order despite interleaved pings
        let expected: Vec<String> = (1..=9).map(|n| format!("T{}", n)).collect();
        assert_eq!(h.peer.texts(), expected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_failure_skips_tick() {
        let h = harness(false);
        let calls = AtomicUsize::new(0);
        let payload: Arc<dyn PayloadSource> = Arc::new(move || -> Result<String, RenderError> {
            match calls.fetch_add(1, Ordering::SeqCst) {
                1 => Err(RenderError::Other("canvas unavailable".into())),
                n => Ok(format!("frame-{}", n)),
            }
        });

        let task = tokio::spawn(session(quiet_heartbeat(), payload).run(h.sink, h.stream));

        tokio::time::sleep(Duration::from_millis(3500)).await;
        h.inbound.send(Ok(Frame::Close)).unwrap();
        let outcome = task.await.unwrap();

        assert_eq!(outcome.reason, CloseReason::PeerClosed);
        assert_eq!(outcome.stats.render_failures, 1);
        assert_eq!(outcome.stats.payloads_sent, 2);
        assert_eq!(h.peer.texts(), vec!["frame-0", "frame-2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_error_terminates_session() {
        let h = harness(false);
        let task = tokio::spawn(session(quiet_heartbeat(), numbered()).run(h.sink, h.stream));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        h.inbound
            .send(Err(TransportError::Io("connection reset".into())))
            .unwrap();

        let outcome = task.await.unwrap();
        assert_eq!(
            outcome.reason,
            CloseReason::Failed(SessionError::Read(TransportError::Io("connection reset".into())))
        );
        assert_eq!(outcome.stats.payloads_sent, 1);
        assert_eq!(h.peer.close_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_end_is_peer_close() {
        let h = harness(false);
        drop(h.inbound);

        let outcome = session(quiet_heartbeat(), numbered()).run(h.sink, h.stream).await;

        assert_eq!(outcome.reason, CloseReason::PeerClosed);
        assert_eq!(outcome.stats, WriteStats::default());
        assert_eq!(h.peer.close_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_write_times_out() {
        let h = harness(false);
        h.peer.state.lock().unwrap().stall_sends = true;

        let start = Instant::now();
        let task = tokio::spawn(session(quiet_heartbeat(), numbered()).run(h.sink, h.stream));
        let outcome = task.await.unwrap();

        assert_eq!(
            outcome.reason,
            CloseReason::Failed(SessionError::WriteTimeout(Duration::from_secs(10)))
        );
        // First push at 1s, then the 10s write deadline
        assert_eq!(start.elapsed(), Duration::from_secs(11));
        assert_eq!(h.peer.close_calls(), 1);
        drop(h.inbound);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_splits_transport() {
        struct MockTransport(MockSink, MockStream);

        impl Transport for MockTransport {
            type Sink = MockSink;
            type Stream = MockStream;

            fn split(self) -> (MockSink, MockStream) {
                (self.0, self.1)
            }
        }

        let h = harness(false);
        h.inbound.send(Ok(Frame::Close)).unwrap();

        let session = session(quiet_heartbeat(), numbered());
        let id = session.id().to_string();
        let outcome = session.start(MockTransport(h.sink, h.stream)).await;

        assert_eq!(outcome.session_id, id);
        assert_eq!(outcome.reason, CloseReason::PeerClosed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_source_tears_session_down() {
        let h = harness(false);
        let payload: Arc<dyn PayloadSource> =
            Arc::new(|| -> Result<String, RenderError> { panic!("renderer bug") });

        let start = Instant::now();
        let outcome = session(quiet_heartbeat(), payload).run(h.sink, h.stream).await;

        assert!(matches!(
            outcome.reason,
            CloseReason::Failed(SessionError::WriteLoopAborted(_))
        ));
        // Torn down at the first push tick, not at the liveness window
        assert_eq!(start.elapsed(), Duration::from_secs(1));
        assert!(h.peer.close_calls() <= 1);
        assert!(h.peer.sent().is_empty());
        drop(h.inbound);
    }
}

use std::ops::ControlFlow;

use log::{debug, info, warn};
use serde::Serialize;

use super::patterns;
use super::{DriverConfig, DriverError, Pattern};
use crate::cancel::CancelToken;
use crate::protocol::{Message, encode};
use crate::transport::{FrameSink, TransportError};

/// Outcome of one driver run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub pattern: Pattern,
    /// Frames the sink accepted, cleanup included.
    pub frames_sent: u64,
    /// Frames the sink rejected; the sequence carried on after each one.
    pub send_failures: u64,
    /// The sequence was cancelled before it finished.
    pub interrupted: bool,
    /// First failure of the safe-state cleanup, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Completed,
    Interrupted,
}

#[derive(Debug, Default)]
struct Counters {
    sent: u64,
    failed: u64,
}

/// Plays one pattern onto a frame sink.
///
/// Transport failures are best-effort: each one is logged and counted, and
/// the sequence continues. A sequence that stops early, through cancellation
/// or an encoding error, is always followed by exactly one `Clear` and one
/// `Show`.
///
/// # Examples
/// ```
/// use lumigrid_core::{AnimationDriver, CancelToken, DriverConfig, MemorySink, Message, Pattern};
///
/// let config = DriverConfig {
///     pattern: Pattern::Solid,
///     ..DriverConfig::default()
/// };
/// let mut driver = AnimationDriver::new(config, MemorySink::new());
/// let summary = driver.run(&CancelToken::new())?;
/// assert_eq!(summary.frames_sent, 2);
/// assert_eq!(driver.sink().messages()?.last(), Some(&Message::Show));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct AnimationDriver<S> {
    config: DriverConfig,
    sink: S,
    counters: Counters,
}

impl<S: FrameSink> AnimationDriver<S> {
    pub fn new(config: DriverConfig, sink: S) -> Self {
        Self {
            config,
            sink,
            counters: Counters::default(),
        }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn run(&mut self, cancel: &CancelToken) -> Result<RunSummary, DriverError> {
        self.config.validate()?;
        self.counters = Counters::default();
        info!(
            "playing {} pattern ({} pixels)",
            self.config.pattern, self.config.count
        );

        let played = self.play(cancel);
        let cleanup_error = match played {
            Ok(Outcome::Completed) => None,
            Ok(Outcome::Interrupted) => {
                info!("interrupted, restoring safe state");
                self.restore_safe_state()
            }
            Err(ref err) => {
                warn!("aborting {} pattern: {err}", self.config.pattern);
                self.restore_safe_state()
            }
        };
        let outcome = played?;

        Ok(RunSummary {
            pattern: self.config.pattern,
            frames_sent: self.counters.sent,
            send_failures: self.counters.failed,
            interrupted: outcome == Outcome::Interrupted,
            cleanup_error,
        })
    }

    fn play(&mut self, cancel: &CancelToken) -> Result<Outcome, DriverError> {
        match self.config.pattern {
            Pattern::Solid => self.play_solid(cancel),
            Pattern::Chase => self.play_chase(cancel),
            Pattern::Rainbow => self.play_rainbow(cancel),
        }
    }

    fn play_solid(&mut self, cancel: &CancelToken) -> Result<Outcome, DriverError> {
        for message in patterns::solid_fill(self.config.color()) {
            if self.emit(cancel, &message)?.is_break() {
                return Ok(Outcome::Interrupted);
            }
        }
        Ok(Outcome::Completed)
    }

    fn play_chase(&mut self, cancel: &CancelToken) -> Result<Outcome, DriverError> {
        let color = self.config.color();
        for step in 0..self.config.steps {
            let position = patterns::chase_position(step, self.config.count);
            for message in patterns::chase_step(position, color)? {
                if self.emit(cancel, &message)?.is_break() {
                    return Ok(Outcome::Interrupted);
                }
            }
            if cancel.wait_timeout(self.config.step_delay) {
                return Ok(Outcome::Interrupted);
            }
        }
        Ok(Outcome::Completed)
    }

    fn play_rainbow(&mut self, cancel: &CancelToken) -> Result<Outcome, DriverError> {
        let count = self.config.count;
        for index in 0..count {
            let message = patterns::rainbow_pixel(index, count)?;
            if self.emit(cancel, &message)?.is_break() {
                return Ok(Outcome::Interrupted);
            }
        }
        if self.emit(cancel, &Message::Show)?.is_break() {
            return Ok(Outcome::Interrupted);
        }
        Ok(Outcome::Completed)
    }

    /// Encode and send one pattern message unless cancellation was requested.
    fn emit(
        &mut self,
        cancel: &CancelToken,
        message: &Message,
    ) -> Result<ControlFlow<()>, DriverError> {
        if cancel.is_cancelled() {
            return Ok(ControlFlow::Break(()));
        }
        let frame = encode(message)?;
        if let Err(err) = self.dispatch(message, &frame) {
            warn!("{} frame dropped: {err}", message.kind());
        }
        Ok(ControlFlow::Continue(()))
    }

    fn dispatch(&mut self, message: &Message, frame: &[u8]) -> Result<(), TransportError> {
        match self.sink.send_frame(frame) {
            Ok(()) => {
                self.counters.sent += 1;
                debug!("sent {} ({} bytes)", message.kind(), frame.len());
                Ok(())
            }
            Err(err) => {
                self.counters.failed += 1;
                Err(err)
            }
        }
    }

    /// Send `Clear` then `Show` once each, ignoring cancellation.
    fn restore_safe_state(&mut self) -> Option<String> {
        let mut first_failure = None;
        for message in patterns::safe_state() {
            let sent = encode(&message)
                .map_err(|err| err.to_string())
                .and_then(|frame| {
                    self.dispatch(&message, &frame)
                        .map_err(|err| err.to_string())
                });
            if let Err(err) = sent {
                warn!("safe-state {} failed: {err}", message.kind());
                first_failure.get_or_insert(err);
            }
        }
        first_failure
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::AnimationDriver;
    use crate::animation::{DriverConfig, DriverError, Pattern};
    use crate::cancel::CancelToken;
    use crate::color::Color;
    use crate::protocol::{Message, decode};
    use crate::transport::{FrameSink, MemorySink, TransportError};

    fn config(pattern: Pattern, count: u32) -> DriverConfig {
        DriverConfig {
            pattern,
            count,
            step_delay: Duration::ZERO,
            ..DriverConfig::default()
        }
    }

    /// Records frames and cancels the token once `limit` frames went out.
    struct CancelAfter {
        limit: usize,
        token: CancelToken,
        frames: Vec<Vec<u8>>,
    }

    impl FrameSink for CancelAfter {
        fn send_frame(&mut self, frame: &[u8]) -> Result<(), TransportError> {
            self.frames.push(frame.to_vec());
            if self.frames.len() == self.limit {
                self.token.cancel();
            }
            Ok(())
        }
    }

    /// Fails every `n`th frame.
    struct Flaky {
        every: usize,
        seen: usize,
        delivered: Vec<Vec<u8>>,
    }

    impl FrameSink for Flaky {
        fn send_frame(&mut self, frame: &[u8]) -> Result<(), TransportError> {
            self.seen += 1;
            if self.seen % self.every == 0 {
                return Err(TransportError::PermissionDenied {
                    destination: "test".to_string(),
                });
            }
            self.delivered.push(frame.to_vec());
            Ok(())
        }
    }

    struct Unreachable;

    impl FrameSink for Unreachable {
        fn send_frame(&mut self, _frame: &[u8]) -> Result<(), TransportError> {
            Err(TransportError::Resolve {
                destination: "nowhere:1".to_string(),
                reason: "test".to_string(),
            })
        }
    }

    fn decode_all(frames: &[Vec<u8>]) -> Vec<Message> {
        frames.iter().map(|frame| decode(frame).unwrap()).collect()
    }

    #[test]
    fn solid_sends_fill_then_show() {
        let mut driver = AnimationDriver::new(config(Pattern::Solid, 10), MemorySink::new());
        let summary = driver.run(&CancelToken::new()).unwrap();

        assert_eq!(summary.frames_sent, 2);
        assert!(!summary.interrupted);
        let frames = driver.sink().frames();
        assert_eq!(frames[0], vec![0x03, 0x03, 0x00, 0xff, 0x00, 0x00]);
        assert_eq!(frames[1], vec![0x04, 0x00, 0x00]);
    }

    #[test]
    fn chase_positions_wrap_with_period_count() {
        let mut driver = AnimationDriver::new(config(Pattern::Chase, 3), MemorySink::new());
        let summary = driver.run(&CancelToken::new()).unwrap();
        assert_eq!(summary.frames_sent, 150);

        let messages = driver.sink().messages().unwrap();
        for (step, chunk) in messages.chunks(3).enumerate() {
            assert_eq!(
                chunk,
                &[
                    Message::Clear,
                    Message::SetPixel {
                        index: (step % 3) as u16,
                        color: Color::GREEN
                    },
                    Message::Show
                ]
            );
        }
    }

    #[test]
    fn chase_honours_step_budget_and_color() {
        let mut cfg = config(Pattern::Chase, 10);
        cfg.steps = 4;
        cfg.color = Some(Color::new(0, 0, 9));
        let mut driver = AnimationDriver::new(cfg, MemorySink::new());
        driver.run(&CancelToken::new()).unwrap();

        let messages = driver.sink().messages().unwrap();
        assert_eq!(messages.len(), 12);
        assert_eq!(
            messages[10],
            Message::SetPixel {
                index: 3,
                color: Color::new(0, 0, 9)
            }
        );
    }

    #[test]
    fn rainbow_shows_once_after_all_pixels() {
        let mut driver = AnimationDriver::new(config(Pattern::Rainbow, 4), MemorySink::new());
        driver.run(&CancelToken::new()).unwrap();

        let messages = driver.sink().messages().unwrap();
        assert_eq!(messages.len(), 5);
        assert!(messages[..4]
            .iter()
            .all(|m| matches!(m, Message::SetPixel { .. })));
        assert_eq!(messages[4], Message::Show);
        assert_eq!(
            messages.iter().filter(|m| **m == Message::Show).count(),
            1
        );
    }

    #[test]
    fn rainbow_of_four_pixels_has_stable_bytes() {
        let mut driver = AnimationDriver::new(config(Pattern::Rainbow, 4), MemorySink::new());
        driver.run(&CancelToken::new()).unwrap();

        // hue bytes 0, 63, 127, 191; channels truncated
        let expected: [&[u8]; 5] = [
            &[0x01, 0x05, 0x00, 0x00, 0x00, 255, 0, 0],
            &[0x01, 0x05, 0x00, 0x01, 0x00, 131, 255, 0],
            &[0x01, 0x05, 0x00, 0x02, 0x00, 0, 255, 252],
            &[0x01, 0x05, 0x00, 0x03, 0x00, 126, 0, 255],
            &[0x04, 0x00, 0x00],
        ];
        let frames = driver.into_sink().into_frames();
        assert_eq!(frames.len(), expected.len());
        for (frame, want) in frames.iter().zip(expected) {
            assert_eq!(frame.as_slice(), want);
        }
    }

    #[test]
    fn interrupt_mid_chase_ends_with_safe_state() {
        for limit in 1..=12 {
            let token = CancelToken::new();
            let sink = CancelAfter {
                limit,
                token: token.clone(),
                frames: Vec::new(),
            };
            let mut driver = AnimationDriver::new(config(Pattern::Chase, 3), sink);
            let summary = driver.run(&token).unwrap();

            assert!(summary.interrupted, "limit {limit}");
            let messages = decode_all(&driver.sink().frames);
            assert_eq!(messages.len(), limit + 2, "limit {limit}");
            assert_eq!(
                &messages[limit..],
                &[Message::Clear, Message::Show],
                "limit {limit}"
            );
        }
    }

    #[test]
    fn interrupt_mid_rainbow_stops_pixel_loop() {
        let token = CancelToken::new();
        let sink = CancelAfter {
            limit: 5,
            token: token.clone(),
            frames: Vec::new(),
        };
        let mut driver = AnimationDriver::new(config(Pattern::Rainbow, 100), sink);
        let summary = driver.run(&token).unwrap();

        assert!(summary.interrupted);
        assert_eq!(summary.frames_sent, 7);
        let messages = decode_all(&driver.sink().frames);
        assert!(messages[..5]
            .iter()
            .all(|m| matches!(m, Message::SetPixel { .. })));
        assert_eq!(&messages[5..], &[Message::Clear, Message::Show]);
    }

    #[test]
    fn cancelled_before_start_only_restores_safe_state() {
        let token = CancelToken::new();
        token.cancel();
        let mut driver = AnimationDriver::new(config(Pattern::Solid, 1), MemorySink::new());
        let summary = driver.run(&token).unwrap();

        assert!(summary.interrupted);
        assert_eq!(
            driver.sink().messages().unwrap(),
            vec![Message::Clear, Message::Show]
        );
    }

    #[test]
    fn completed_run_sends_no_cleanup() {
        let token = CancelToken::new();
        let mut driver = AnimationDriver::new(config(Pattern::Solid, 1), MemorySink::new());
        driver.run(&token).unwrap();
        token.cancel();
        assert_eq!(driver.sink().frames().len(), 2);
    }

    #[test]
    fn send_failures_do_not_stop_the_sequence() {
        let sink = Flaky {
            every: 2,
            seen: 0,
            delivered: Vec::new(),
        };
        let mut driver = AnimationDriver::new(config(Pattern::Rainbow, 10), sink);
        let summary = driver.run(&CancelToken::new()).unwrap();

        assert_eq!(summary.send_failures, 5);
        assert_eq!(summary.frames_sent, 6);
        assert!(!summary.interrupted);
    }

    #[test]
    fn failed_cleanup_is_reported_not_raised() {
        let token = CancelToken::new();
        token.cancel();
        let mut driver = AnimationDriver::new(config(Pattern::Chase, 5), Unreachable);
        let summary = driver.run(&token).unwrap();

        assert!(summary.interrupted);
        assert_eq!(summary.send_failures, 2);
        let cleanup = summary.cleanup_error.expect("cleanup error");
        assert!(cleanup.contains("nowhere:1"));
    }

    #[test]
    fn invalid_config_sends_nothing() {
        let mut driver = AnimationDriver::new(config(Pattern::Rainbow, 0), MemorySink::new());
        let err = driver.run(&CancelToken::new()).unwrap_err();
        assert!(matches!(err, DriverError::Config(_)));
        assert_eq!(driver.config().count, 0);
        assert!(driver.sink().frames().is_empty());
    }

    #[test]
    fn summary_serializes_without_cleanup_error() {
        let mut driver = AnimationDriver::new(config(Pattern::Solid, 1), MemorySink::new());
        let summary = driver.run(&CancelToken::new()).unwrap();
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["pattern"], "solid");
        assert_eq!(value["frames_sent"], 2);
        assert!(value.get("cleanup_error").is_none());
    }
}

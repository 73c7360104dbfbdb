//! Spin timeline: the awaitable that stands in for a visual animation.

use std::time::Duration;

use tokio::sync::watch;
use tracing::trace;

use crate::easing::BezierEase;

/// How the pacer advances time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacerMode {
    /// Step frames with real sleeps.
    Realtime { fps: u32 },
    /// Resolve without sleeping; headless runs and tests.
    Immediate,
}

/// Drives one animated rotation at a time and owns the persistent absolute
/// rotation across spins (reset to 0 on mount, read back before every spin,
/// updated after every completed spin). Frames go out on a watch channel so
/// a renderer can subscribe without the engine knowing about it.
#[derive(Debug)]
pub struct SpinPacer {
    current_rotation: f64,
    attached: bool,
    mode: PacerMode,
    frames: watch::Sender<f64>,
}

impl SpinPacer {
    pub fn new(mode: PacerMode) -> Self {
        let (frames, _) = watch::channel(0.0);
        Self {
            current_rotation: 0.0,
            attached: true,
            mode,
            frames,
        }
    }

    /// A pacer with no attached target: every `animate` resolves immediately
    /// to 0. Degraded path, not an error.
    pub fn detached() -> Self {
        let mut pacer = Self::new(PacerMode::Immediate);
        pacer.attached = false;
        pacer
    }

    pub fn current_rotation(&self) -> f64 {
        self.current_rotation
    }

    /// Mount-time reset.
    pub fn reset(&mut self) {
        self.current_rotation = 0.0;
        let _ = self.frames.send(0.0);
    }

    /// Frame-by-frame absolute rotation for renderers/overlays.
    pub fn frames(&self) -> watch::Receiver<f64> {
        self.frames.subscribe()
    }

    /// Rotate by `delta` degrees over `duration` along `curve`, resolving to
    /// the final absolute rotation once the timeline completes. Successive
    /// spins compose additively from the rotation read back here.
    pub async fn animate(&mut self, delta: f64, duration: Duration, curve: &BezierEase) -> f64 {
        if !self.attached {
            return 0.0;
        }
        let from = self.current_rotation;
        let to = from + delta;
        if let PacerMode::Realtime { fps } = self.mode {
            let total = duration.as_secs_f64();
            if total > 0.0 {
                let fps = fps.max(1);
                let frame_count = (total * fps as f64).ceil().max(1.0) as u64;
                let step = Duration::from_secs_f64(total / frame_count as f64);
                for frame in 1..=frame_count {
                    tokio::time::sleep(step).await;
                    let x = frame as f64 / frame_count as f64;
                    let _ = self.frames.send(from + delta * curve.progress(x));
                }
            }
        }
        self.current_rotation = to;
        let _ = self.frames.send(to);
        trace!(from, to, "spin settled");
        to
    }
}

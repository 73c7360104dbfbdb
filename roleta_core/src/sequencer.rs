//! Round sequencing: one spin at a time, strictly ordered, from seed draw to
//! settled elimination.

use std::f64::consts::TAU;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use roleta_shared::{BroadcastEvent, DropoutVariant, Participant, SelectionFormat, WheelSettings};

use crate::angle::{self, Segment};
use crate::easing::BezierEase;
use crate::error::WheelError;
use crate::format::{FormatEngine, RoundResult, DEFAULT_REMOVAL_DELAY};
use crate::item::Item;
use crate::pacing::SpinPacer;
use crate::rng::{LocalRng, SeedSource};

/// Seed + duration pair consumed by exactly one spin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinParams {
    pub seed: f64,
    pub duration: Duration,
}

/// Everything one settled spin produced.
#[derive(Debug, Clone)]
pub struct SpinOutcome {
    pub round: RoundResult,
    pub params: SpinParams,
    pub final_rotation: f64,
}

/// Owns the whole spin pipeline. `&mut self` keeps rounds strictly
/// sequential: seed generation completes before angle resolution, angles
/// before the animation, and the next round's seed is not requested until
/// `on_spin_end` has settled. The item set is never mutated before that
/// point, so an abandoned round leaves it intact.
pub struct WheelController {
    settings: WheelSettings,
    initial_items: Vec<Item>,
    engine: FormatEngine,
    pacer: SpinPacer,
    seed_source: SeedSource,
    /// Always-available recovery when a network source fails.
    local_fallback: LocalRng,
    curve_rng: StdRng,
    removal_delay: Duration,
    broadcast: Option<mpsc::UnboundedSender<BroadcastEvent>>,
}

impl WheelController {
    pub fn new(
        items: Vec<Item>,
        settings: WheelSettings,
        pacer: SpinPacer,
        seed_source: SeedSource,
    ) -> Self {
        let engine = FormatEngine::new(settings.format, settings.dropout_variant, items.clone());
        Self {
            settings,
            initial_items: items,
            engine,
            pacer,
            seed_source,
            local_fallback: LocalRng::from_entropy(),
            curve_rng: StdRng::from_entropy(),
            removal_delay: DEFAULT_REMOVAL_DELAY,
            broadcast: None,
        }
    }

    /// Skip or shorten the eaten-animation wait; headless simulations use
    /// `Duration::ZERO`.
    pub fn set_removal_delay(&mut self, delay: Duration) {
        self.removal_delay = delay;
        self.rebuild_engine();
    }

    pub fn set_broadcast(&mut self, tx: mpsc::UnboundedSender<BroadcastEvent>) {
        self.broadcast = Some(tx);
        self.publish_participants();
    }

    pub fn settings(&self) -> &WheelSettings {
        &self.settings
    }

    /// Active items as the current format displays them.
    pub fn items(&self) -> Vec<Item> {
        self.engine.items()
    }

    /// Rendered wedge layout honoring the split setting.
    pub fn segments(&self) -> Vec<Segment> {
        angle::layout(&self.engine.items(), self.settings.split)
    }

    /// Swap in a new item list. All round state is discarded.
    pub fn set_items(&mut self, items: Vec<Item>) {
        self.initial_items = items;
        self.rebuild_engine();
        self.publish_participants();
    }

    /// Switch format or dropout variant. In-progress elimination state is
    /// discarded and the engine is rebuilt from the initial item list.
    pub fn set_format(&mut self, format: SelectionFormat, variant: DropoutVariant) {
        self.settings.format = format;
        self.settings.dropout_variant = variant;
        self.rebuild_engine();
    }

    fn rebuild_engine(&mut self) {
        self.engine = FormatEngine::with_removal_delay(
            self.settings.format,
            self.settings.dropout_variant,
            self.initial_items.clone(),
            self.removal_delay,
        );
    }

    async fn draw_seed(&mut self) -> Result<f64, WheelError> {
        match self.seed_source.generate_seed().await {
            Ok(seed) => Ok(seed),
            Err(WheelError::RandomnessUnavailable(reason)) => {
                warn!(%reason, "seed source unavailable, falling back to local rng");
                Ok(self.local_fallback.next_seed())
            }
            Err(other) => Err(other),
        }
    }

    /// Run one round to completion.
    pub async fn spin(&mut self) -> Result<SpinOutcome, WheelError> {
        let duration = Duration::from_secs(self.settings.spin_time_secs.max(1));
        let seed = self.draw_seed().await?;
        let params = SpinParams { seed, duration };
        let round = self.engine.next_winner(seed)?;
        debug!(winner = %round.winner_id, seed, "round resolved");

        let current = self.pacer.current_rotation();
        let distance = self
            .engine
            .spin_distance(&round.winner_id, seed, duration, current)
            .unwrap_or_else(|| angle::distance_to_angle(seed * TAU, duration, current));
        let curve = if self.settings.random_curve_enabled {
            BezierEase::randomized(&mut self.curve_rng)
        } else {
            BezierEase::standard()
        };
        let final_rotation = self.pacer.animate(distance, duration, &curve).await;

        // Translate the resting angle back to the landed sector. The
        // engine's pick stays authoritative; a mismatch flags drifted angle
        // math. A detached pacer resolves to 0 and skips the check.
        if final_rotation != 0.0 {
            let angles = angle::define_angle(&self.engine.items());
            if let Some(landed) = angle::find_sector(&angles, angle::wheel_angle(final_rotation)) {
                if landed.item.id != round.winner_id {
                    warn!(
                        landed = %landed.item.id,
                        resolved = %round.winner_id,
                        "landed sector disagrees with resolved winner"
                    );
                }
            }
        }

        self.engine.on_spin_end(&round.winner_id).await;
        self.publish_spin(final_rotation, duration, &round.winner_id);
        if !matches!(self.engine, FormatEngine::Normal(_)) {
            self.publish_participants();
        }
        info!(winner = %round.winner_id, final_spin = round.is_final_spin, "spin settled");
        Ok(SpinOutcome {
            round,
            params,
            final_rotation,
        })
    }

    /// Spin until the active format reports its terminal round.
    pub async fn run_to_completion(&mut self) -> Result<Vec<RoundResult>, WheelError> {
        let mut rounds = Vec::new();
        loop {
            let outcome = self.spin().await?;
            let done = outcome.round.is_final_spin;
            rounds.push(outcome.round);
            if done {
                return Ok(rounds);
            }
        }
    }

    fn publish_spin(&self, angle: f64, duration: Duration, winner: &str) {
        if !self.settings.broadcast_enabled {
            return;
        }
        if let Some(tx) = &self.broadcast {
            let _ = tx.send(BroadcastEvent::Spin {
                angle,
                duration: duration.as_secs_f64(),
                winner: winner.to_string(),
            });
        }
    }

    fn publish_participants(&self) {
        if !self.settings.broadcast_enabled {
            return;
        }
        if let Some(tx) = &self.broadcast {
            let participants = self
                .engine
                .items()
                .iter()
                .map(|item| Participant {
                    id: item.id.clone(),
                    name: item.name.clone(),
                    color: item.color.clone(),
                    amount: item.display_amount(),
                })
                .collect();
            let _ = tx.send(BroadcastEvent::ParticipantsChanged { participants });
        }
    }
}

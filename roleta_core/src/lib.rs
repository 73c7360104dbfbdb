pub mod angle;
pub mod easing;
pub mod error;
pub mod format;
pub mod item;
pub mod pacing;
pub mod rng;
pub mod sequencer;

pub use crate::angle::{
    chance_percent, chance_table, define_angle, distance_to_angle, find_sector, layout,
    split_segments, wheel_angle, ItemAngle, Segment, POINTER_OFFSET_DEG,
};
pub use crate::easing::{BezierEase, Guide};
pub use crate::error::WheelError;
pub use crate::format::{simulate_elimination_order, FormatEngine, RoundResult};
pub use crate::item::Item;
pub use crate::pacing::{PacerMode, SpinPacer};
pub use crate::rng::{
    derive_floats, derive_hash_hex, ExternalSeedClient, FairRng, LocalRng, SeedSource, SEED_TIMEOUT,
};
pub use crate::sequencer::{SpinOutcome, SpinParams, WheelController};
pub use roleta_shared::{DropoutVariant, SelectionFormat, WheelSettings};

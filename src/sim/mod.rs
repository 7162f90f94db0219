//! Engine-independent simulation: clock, blips, drag interaction, input intents.

pub mod blips;
pub mod clock;
pub mod input;
pub mod interaction;

pub use blips::{Blip, BlipField, BlipId, BlipSpawn, BlipVisual, PopulationChange};
pub use clock::SimClock;
pub use input::{IntentQueue, ViewerHandle, ViewerIntent, ViewerOutputs};
pub use interaction::{DragController, RotationState};

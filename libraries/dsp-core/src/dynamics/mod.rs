//! Level detection and waveshaping
//!
//! - **RmsDetector**: one-pole envelope follower on the squared signal
//! - **apply_gain / soft_clip / limiter_process**: stateless block transforms

mod rms;
mod shaper;

pub use rms::RmsDetector;
pub use shaper::{apply_gain, limiter_process, soft_clip, Gain, HardLimiter, SoftClip};

pub mod blend;
pub mod channel;
pub mod clip;
pub mod fade;
pub mod pose;
pub mod values;

pub use channel::{ChannelState, Playback, PoseChannel, REPEAT_FOREVER};
pub use clip::{Animation, FRAME_TIME, Frame};
pub use fade::{FadeDuration, PoseFade};
pub use pose::Pose;
pub use values::{Interpolatable, nlerp, smoothstep};

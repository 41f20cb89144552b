#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod animation;
pub mod errors;
pub mod scene;
pub mod settings;

pub use animation::{
    Animation, ChannelState, FRAME_TIME, FadeDuration, Frame, Pose, PoseChannel, PoseFade,
    REPEAT_FOREVER,
};
pub use errors::{PoseError, Result};
pub use scene::{Model, Node, NodeHandle, NodeKind, NodeTree, PoseGroup, Transform, WeightGroup};
pub use settings::PoseSettings;

//! First-person fly camera for shader previews.
//!
//! The crate is pure state and math: the windowing layer feeds raw pointer
//! positions and a per-frame [`KeyState`] snapshot in, and reads position,
//! direction, and auxiliary shader parameters back out. Nothing here
//! depends on a graphics or window library.

mod camera;
mod input;
mod math;

pub use camera::{CameraTuning, FlyCamera};
pub use input::KeyState;
pub use math::rotate_axis_angle;

pub use glam::{Vec3, Vec4};

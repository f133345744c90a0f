/// Snapshot of the held keys the camera reacts to, sampled once per frame
/// by the windowing layer. Slider entries are indexed x, y, z, w.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub precision: bool,
    pub speed_up: bool,
    pub speed_down: bool,
    pub slider_up: [bool; 4],
    pub slider_down: [bool; 4],
}

use bytemuck::{Pod, Zeroable};
use flycam::FlyCamera;

/// CPU mirror of the `FlightParams` std140 block injected ahead of every
/// user shader. Field order and padding must match the GLSL header in
/// `compile.rs`.
#[repr(C, align(16))]
#[derive(Clone, Copy)]
pub(crate) struct FlightUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub speed: f32,
    pub position: [f32; 3],
    _pad0: f32,
    pub position_fixed: [f32; 3],
    _pad1: f32,
    pub direction: [f32; 3],
    _pad2: f32,
    pub sliders: [f32; 4],
}

unsafe impl Zeroable for FlightUniforms {}
unsafe impl Pod for FlightUniforms {}

impl FlightUniforms {
    /// Initial uniform values for a preview at the given render size: origin
    /// position, forward along +Z, zeroed sliders and clock.
    pub fn new(render_width: u32, render_height: u32) -> Self {
        Self {
            resolution: [render_width as f32, render_height as f32],
            time: 0.0,
            speed: 1.0,
            position: [0.0; 3],
            _pad0: 0.0,
            position_fixed: [0.0; 3],
            _pad1: 0.0,
            direction: [0.0, 0.0, 1.0],
            _pad2: 0.0,
            sliders: [0.0; 4],
        }
    }

    /// Copies the per-frame camera outputs into the block.
    pub fn set_camera(&mut self, camera: &FlyCamera) {
        self.position = camera.position().to_array();
        self.position_fixed = camera.position_fixed().to_array();
        self.direction = camera.direction().to_array();
        self.sliders = camera.sliders().to_array();
        self.speed = camera.speed_factor();
    }

    pub fn set_time(&mut self, seconds: f32) {
        self.time = seconds;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sanity-checks the CPU mirror against the std140 layout baked into the
    /// GLSL header: vec2 at 0, two scalars, then three vec3s padded out to
    /// 16-byte strides, then the vec4 sliders.
    #[test]
    fn flight_uniforms_follow_std140_layout() {
        let uniforms = FlightUniforms::new(320, 180);
        let base = &uniforms as *const _ as usize;

        assert_eq!(std::mem::align_of::<FlightUniforms>(), 16);
        assert_eq!(std::mem::size_of::<FlightUniforms>(), 80);
        assert_eq!((&uniforms.resolution as *const _ as usize) - base, 0);
        assert_eq!((&uniforms.time as *const _ as usize) - base, 8);
        assert_eq!((&uniforms.speed as *const _ as usize) - base, 12);
        assert_eq!((&uniforms.position as *const _ as usize) - base, 16);
        assert_eq!((&uniforms.position_fixed as *const _ as usize) - base, 32);
        assert_eq!((&uniforms.direction as *const _ as usize) - base, 48);
        assert_eq!((&uniforms.sliders as *const _ as usize) - base, 64);
    }

    #[test]
    fn camera_outputs_land_in_the_block() {
        let mut camera = FlyCamera::new(flycam::CameraTuning::default());
        let keys = flycam::KeyState {
            forward: true,
            ..flycam::KeyState::default()
        };
        camera.update(&keys);

        let mut uniforms = FlightUniforms::new(320, 180);
        uniforms.set_camera(&camera);
        assert_eq!(uniforms.position, [0.0, 0.0, 1.5]);
        assert_eq!(uniforms.position_fixed, [0.0, 0.0, 1.5]);
        assert_eq!(uniforms.direction, [0.0, 0.0, 1.0]);
        assert_eq!(uniforms.speed, 1.0);
    }
}

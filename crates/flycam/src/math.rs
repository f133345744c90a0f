use glam::Vec3;

/// Rotates `v` about `axis` by `angle` radians using Rodrigues' formula:
/// `v' = v cos θ + (axis × v) sin θ + axis (axis · v)(1 - cos θ)`.
///
/// The axis is renormalized internally, so callers may pass a near-unit
/// vector accumulated over many frames.
pub fn rotate_axis_angle(v: Vec3, axis: Vec3, angle: f32) -> Vec3 {
    let axis = axis.normalize();
    let (sin, cos) = angle.sin_cos();
    v * cos + axis.cross(v) * sin + axis * axis.dot(v) * (1.0 - cos)
}

//! Camera state and view frustum.

use glam::{DMat4, DVec2, DVec3};

/// Snapshot of the render camera consumed once per frame.
///
/// `transform` maps camera (view) space into world space. In view space the
/// camera looks down `-Z` with `+Y` up, so the ground plane of the world is
/// spanned by the `x` and `z` axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Vertical field of view in radians.
    pub vertical_fov: f64,
    /// Width divided by height of the viewport.
    pub aspect: f64,
    /// Near plane distance in meters.
    pub near: f64,
    /// Far plane distance in meters.
    pub far: f64,
    /// Camera-to-world transform.
    pub transform: DMat4,
}

impl Camera {
    /// Create a camera from projection parameters and a world transform.
    pub fn new(vertical_fov: f64, aspect: f64, near: f64, far: f64, transform: DMat4) -> Self {
        Self {
            vertical_fov,
            aspect,
            near,
            far,
            transform,
        }
    }

    /// Create a camera at `eye` looking at `target`.
    pub fn looking_at(
        vertical_fov: f64,
        aspect: f64,
        near: f64,
        far: f64,
        eye: DVec3,
        target: DVec3,
    ) -> Self {
        let view = DMat4::look_at_rh(eye, target, DVec3::Y);
        Self::new(vertical_fov, aspect, near, far, view.inverse())
    }

    /// World-space camera position.
    pub fn position(&self) -> DVec3 {
        self.transform.w_axis.truncate()
    }

    /// Camera position projected onto the ground plane `(x, z)`.
    pub fn ground_position(&self) -> DVec2 {
        let p = self.position();
        DVec2::new(p.x, p.z)
    }
}

/// The 8 corners of a view frustum, stored in view space.
#[derive(Debug, Clone, PartialEq)]
pub struct Frustum {
    vertical_fov: f64,
    aspect: f64,
    near: f64,
    far: f64,
    near_quad: [DVec3; 4],
    far_quad: [DVec3; 4],
}

impl Frustum {
    /// Build the frustum and compute its view-space corner vertices.
    pub fn new(vertical_fov: f64, aspect: f64, near: f64, far: f64) -> Self {
        let tan_half = (vertical_fov * 0.5).tan();
        let quad = |distance: f64| {
            let half_h = distance * tan_half;
            let half_w = half_h * aspect;
            [
                DVec3::new(-half_w, -half_h, -distance),
                DVec3::new(half_w, -half_h, -distance),
                DVec3::new(half_w, half_h, -distance),
                DVec3::new(-half_w, half_h, -distance),
            ]
        };

        Self {
            vertical_fov,
            aspect,
            near,
            far,
            near_quad: quad(near),
            far_quad: quad(far),
        }
    }

    /// Whether this frustum was built from the given parameters.
    pub fn matches(&self, vertical_fov: f64, aspect: f64, near: f64, far: f64) -> bool {
        self.vertical_fov == vertical_fov
            && self.aspect == aspect
            && self.near == near
            && self.far == far
    }

    /// Far plane distance.
    pub fn far(&self) -> f64 {
        self.far
    }

    /// Corner vertices in view space: near quad first, then far quad.
    pub fn view_vertices(&self) -> [DVec3; 8] {
        let mut out = [DVec3::ZERO; 8];
        out[..4].copy_from_slice(&self.near_quad);
        out[4..].copy_from_slice(&self.far_quad);
        out
    }

    /// Corner vertices transformed into world space.
    pub fn world_vertices(&self, transform: &DMat4) -> [DVec3; 8] {
        self.view_vertices()
            .map(|v| transform.transform_point3(v))
    }
}

//! Perspective camera: projection to the overlay and rays back into the scene.

use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

use crate::config::CameraConfig;
use crate::constants::FAR_CLIP_DEPTH;

/// Viewport size in CSS-style pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    /// Pixel (origin top-left, y down) to NDC (origin centre, y up).
    pub fn pixel_to_ndc(&self, px: f32, py: f32) -> Vec2 {
        Vec2::new(px / self.width * 2.0 - 1.0, -(py / self.height * 2.0 - 1.0))
    }

    pub fn ndc_to_pixel(&self, ndc: Vec2) -> Vec2 {
        Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.width,
            (1.0 - ndc.y) * 0.5 * self.height,
        )
    }
}

/// Half-line from `origin` along the unit vector `direction`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

/// Result of projecting a world point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub ndc: Vec3,
    /// Behind the camera or past the far plane.
    pub clipped: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub orientation: Quat,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub viewport: Viewport,
}

impl Camera {
    pub fn new(config: &CameraConfig) -> Self {
        let mut camera = Self {
            position: Vec3::from_array(config.intro_position),
            orientation: Quat::IDENTITY,
            fov_y_degrees: config.fov_y_degrees,
            near: config.near,
            far: config.far,
            viewport: Viewport::new(config.viewport[0], config.viewport[1]),
        };
        camera.look_at(Vec3::ZERO);
        camera
    }

    /// Re-orient to face `target`, keeping +Y up.
    pub fn look_at(&mut self, target: Vec3) {
        let forward = target - self.position;
        if forward.length_squared() < 1e-12 {
            return;
        }
        let up = if forward.normalize().cross(Vec3::Y).length_squared() < 1e-8 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let view = Mat4::look_at_rh(self.position, target, up);
        let (_, rotation, _) = view.inverse().to_scale_rotation_translation();
        self.orientation = rotation.normalize();
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.orientation * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Viewport::new(width, height);
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position).inverse()
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_degrees.to_radians(),
            self.viewport.aspect(),
            self.near,
            self.far,
        )
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// World point to NDC. Depth runs 0 (near) to 1 (far).
    pub fn project(&self, world: Vec3) -> Projection {
        let clip = self.view_projection() * Vec4::new(world.x, world.y, world.z, 1.0);
        if clip.w <= 0.0 {
            return Projection {
                ndc: Vec3::new(0.0, 0.0, FAR_CLIP_DEPTH),
                clipped: true,
            };
        }
        let ndc = clip.truncate() / clip.w;
        Projection {
            ndc,
            clipped: ndc.z >= FAR_CLIP_DEPTH,
        }
    }

    /// World point to viewport pixels, `None` when clipped.
    pub fn project_to_pixel(&self, world: Vec3) -> Option<Vec2> {
        let p = self.project(world);
        if p.clipped {
            None
        } else {
            Some(self.viewport.ndc_to_pixel(p.ndc.truncate()))
        }
    }

    /// Ray from the camera through an NDC point.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv = self.view_projection().inverse();
        let near = inv.project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
        let far = inv.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        let direction = (far - near).normalize_or(self.forward());
        Ray {
            origin: self.position,
            direction,
        }
    }

    pub fn ray_from_pixel(&self, px: f32, py: f32) -> Ray {
        self.ray_from_ndc(self.viewport.pixel_to_ndc(px, py))
    }
}

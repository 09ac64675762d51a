//! Scene lights.

use cgmath::{InnerSpace, Matrix4, Point3, Vector3};

use crate::camera::OPENGL_TO_WGPU_MATRIX;

/// Orthographic frustum a directional light renders its shadow map with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowCamera {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub near: f32,
    pub far: f32,
    /// Width and height of the square shadow map in texels.
    pub map_size: u32,
}

impl Default for ShadowCamera {
    fn default() -> Self {
        Self {
            left: -5.0,
            right: 5.0,
            top: 5.0,
            bottom: -5.0,
            near: 0.5,
            far: 500.0,
            map_size: 512,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    /// Uniform light hitting every surface from every direction.
    Ambient { colour: [f32; 3], intensity: f32 },
    /// Parallel light shining from `position` towards `target`.
    Directional {
        colour: [f32; 3],
        intensity: f32,
        position: Point3<f32>,
        target: Point3<f32>,
        shadow: Option<ShadowCamera>,
    },
}

impl Light {
    /// Colour premultiplied with the intensity.
    pub fn radiance(&self) -> [f32; 3] {
        let (colour, intensity) = match self {
            Light::Ambient { colour, intensity } => (colour, intensity),
            Light::Directional {
                colour, intensity, ..
            } => (colour, intensity),
        };
        [
            colour[0] * intensity,
            colour[1] * intensity,
            colour[2] * intensity,
        ]
    }

    /// Unit vector pointing from the surface towards a directional light.
    pub fn direction_to_light(&self) -> Option<Vector3<f32>> {
        match self {
            Light::Directional {
                position, target, ..
            } => {
                let dir = *position - *target;
                (dir.magnitude2() > 0.0).then(|| dir.normalize())
            }
            Light::Ambient { .. } => None,
        }
    }

    /// View-projection matrix of the shadow camera, if this light casts shadows.
    pub fn shadow_view_proj(&self) -> Option<Matrix4<f32>> {
        match self {
            Light::Directional {
                position,
                target,
                shadow: Some(shadow),
                ..
            } => {
                let forward = (*target - *position).normalize();
                // avoid a degenerate look_at when the light points straight down
                let up = if forward.y.abs() > 0.999 {
                    Vector3::unit_z()
                } else {
                    Vector3::unit_y()
                };
                let view = Matrix4::look_at_rh(*position, *target, up);
                let proj = cgmath::ortho(
                    shadow.left,
                    shadow.right,
                    shadow.bottom,
                    shadow.top,
                    shadow.near,
                    shadow.far,
                );
                Some(OPENGL_TO_WGPU_MATRIX * proj * view)
            }
            _ => None,
        }
    }

    pub fn shadow(&self) -> Option<&ShadowCamera> {
        match self {
            Light::Directional { shadow, .. } => shadow.as_ref(),
            Light::Ambient { .. } => None,
        }
    }
}

//! Orbit controls: rotate, dolly and pan a camera around a target point.
//!
//! Input handlers only accumulate a spherical delta, a pan offset and a dolly
//! scale. [`OrbitControls::update`] applies them once per frame. With damping
//! enabled only a fraction of the pending delta is applied each frame and the
//! rest decays, which gives the camera its inertia.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Point3, Vector3, Zero};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent};

use crate::{camera::Camera, viewport::Viewport};

/// Keeps the polar angle away from the poles where `look_at` degenerates.
/// Much closer than this and `f32` rounds the camera onto the pole.
const EPS: f32 = 1e-3;
/// Below this a damped delta counts as settled.
const SETTLED: f32 = 1e-6;

/// Radius and angles of a point relative to the orbit target, y-up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    /// Polar angle from +Y.
    pub phi: f32,
    /// Azimuth around +Y, zero along +Z.
    pub theta: f32,
}

impl Spherical {
    pub fn from_vector(v: Vector3<f32>) -> Self {
        let radius = v.magnitude();
        if radius == 0.0 {
            return Self {
                radius: 0.0,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_vector(self) -> Vector3<f32> {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vector3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Drag {
    None,
    Rotate,
    Pan,
}

#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub target: Point3<f32>,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    spherical_delta: Spherical,
    pan_offset: Vector3<f32>,
    scale: f32,
    drag: Drag,
    cursor: Option<(f64, f64)>,
}

impl OrbitControls {
    pub fn new<T: Into<Point3<f32>>>(target: T) -> Self {
        Self {
            target: target.into(),
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            spherical_delta: Spherical {
                radius: 0.0,
                phi: 0.0,
                theta: 0.0,
            },
            pan_offset: Vector3::zero(),
            scale: 1.0,
            drag: Drag::None,
            cursor: None,
        }
    }

    pub fn with_damping(mut self, damping_factor: f32) -> Self {
        self.enable_damping = true;
        self.damping_factor = damping_factor.clamp(0.0, 1.0);
        self
    }

    /// Rotate the camera left around the target by `angle` radians.
    pub fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    /// Rotate the camera up over the target by `angle` radians.
    pub fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    /// Rotate by a pointer movement of `dx`/`dy` pixels on a viewport `height` pixels high.
    pub fn rotate_by_pixels(&mut self, dx: f32, dy: f32, height: f32) {
        let height = height.max(1.0);
        self.rotate_left(2.0 * PI * dx / height * self.rotate_speed);
        self.rotate_up(2.0 * PI * dy / height * self.rotate_speed);
    }

    /// Move closer by one zoom step per notch; negative notches move away.
    pub fn dolly(&mut self, notches: f32) {
        if notches == 0.0 {
            return;
        }
        let step = 0.95f32.powf(self.zoom_speed);
        self.scale *= step.powf(notches);
    }

    /// Pan by a pointer movement in pixels, so the scene follows the pointer.
    pub fn pan_by_pixels(&mut self, camera: &Camera, fovy: cgmath::Rad<f32>, dx: f32, dy: f32, height: f32) {
        let height = height.max(1.0);
        let offset = camera.position - self.target;
        // half of the fov is from the centre to the top of the screen
        let target_distance = offset.magnitude() * (fovy.0 / 2.0).tan();
        let left = 2.0 * dx * target_distance / height * self.pan_speed;
        let up = 2.0 * dy * target_distance / height * self.pan_speed;
        self.pan_offset += camera.right() * -left + camera.up() * up;
    }

    /// Feed a window event. Returns whether the event was used.
    pub fn handle_window_event(
        &mut self,
        event: &WindowEvent,
        camera: &Camera,
        fovy: cgmath::Rad<f32>,
        viewport: &Viewport,
    ) -> bool {
        let height = viewport.height() as f32;
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                self.drag = match (state, button) {
                    (ElementState::Pressed, MouseButton::Left) => Drag::Rotate,
                    (ElementState::Pressed, MouseButton::Right) => Drag::Pan,
                    (ElementState::Released, _) => Drag::None,
                    _ => return false,
                };
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f64>(viewport.scale_factor());
                let current = (logical.x, logical.y);
                let used = match (self.drag, self.cursor) {
                    (Drag::Rotate, Some(last)) => {
                        self.rotate_by_pixels(
                            (current.0 - last.0) as f32,
                            (current.1 - last.1) as f32,
                            height,
                        );
                        true
                    }
                    (Drag::Pan, Some(last)) => {
                        self.pan_by_pixels(
                            camera,
                            fovy,
                            (current.0 - last.0) as f32,
                            (current.1 - last.1) as f32,
                            height,
                        );
                        true
                    }
                    _ => false,
                };
                self.cursor = Some(current);
                used
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let notches = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    // browsers report roughly 100 pixels per wheel notch
                    MouseScrollDelta::PixelDelta(p) => (p.y / 100.0) as f32,
                };
                self.dolly(notches);
                true
            }
            WindowEvent::Touch(touch) => {
                let logical = touch.location.to_logical::<f64>(viewport.scale_factor());
                let current = (logical.x, logical.y);
                match touch.phase {
                    TouchPhase::Started => {
                        self.drag = Drag::Rotate;
                        self.cursor = Some(current);
                    }
                    TouchPhase::Moved => {
                        if let (Drag::Rotate, Some(last)) = (self.drag, self.cursor) {
                            self.rotate_by_pixels(
                                (current.0 - last.0) as f32,
                                (current.1 - last.1) as f32,
                                height,
                            );
                        }
                        self.cursor = Some(current);
                    }
                    TouchPhase::Ended | TouchPhase::Cancelled => {
                        self.drag = Drag::None;
                        self.cursor = None;
                    }
                }
                true
            }
            _ => false,
        }
    }

    /// Whether no input is waiting to be applied.
    pub fn is_settled(&self) -> bool {
        self.spherical_delta.theta == 0.0
            && self.spherical_delta.phi == 0.0
            && self.pan_offset.is_zero()
            && self.scale == 1.0
    }

    /// Apply pending input to `camera`. Returns whether the camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        if self.is_settled() {
            return false;
        }
        let offset = camera.position - self.target;
        let mut spherical = Spherical::from_vector(offset);

        if self.enable_damping {
            spherical.theta += self.spherical_delta.theta * self.damping_factor;
            spherical.phi += self.spherical_delta.phi * self.damping_factor;
        } else {
            spherical.theta += self.spherical_delta.theta;
            spherical.phi += self.spherical_delta.phi;
        }

        spherical.phi = spherical
            .phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(EPS, PI - EPS);

        if self.enable_damping {
            self.target += self.pan_offset * self.damping_factor;
        } else {
            self.target += self.pan_offset;
        }

        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        let old_position = camera.position;
        camera.position = self.target + spherical.to_vector();
        camera.target = self.target;

        if self.enable_damping {
            let decay = 1.0 - self.damping_factor;
            self.spherical_delta.theta *= decay;
            self.spherical_delta.phi *= decay;
            self.pan_offset *= decay;
            if self.spherical_delta.theta.abs() < SETTLED {
                self.spherical_delta.theta = 0.0;
            }
            if self.spherical_delta.phi.abs() < SETTLED {
                self.spherical_delta.phi = 0.0;
            }
            if self.pan_offset.magnitude2() < SETTLED * SETTLED {
                self.pan_offset = Vector3::zero();
            }
        } else {
            self.spherical_delta.theta = 0.0;
            self.spherical_delta.phi = 0.0;
            self.pan_offset = Vector3::zero();
        }
        self.scale = 1.0;

        (camera.position - old_position).magnitude2() > f32::EPSILON * f32::EPSILON
    }
}

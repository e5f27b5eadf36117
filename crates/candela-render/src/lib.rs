//! Candela renderer crate.
//!
//! Clustered deferred shading on wgpu: a geometry pass writes per-pixel
//! surface attributes (world position, normal, albedo) into a G-buffer, a
//! compute stage assigns lights to screen-tile × depth-slice clusters, and a
//! fullscreen resolve pass shades each pixel against only the lights in its
//! cluster. All three stages are recorded into a single command encoder per
//! frame; ordering between them relies on submission-order execution on one
//! queue.

pub mod camera;
pub mod device;
pub mod lights;
pub mod logging;
pub mod render;
pub mod scene;

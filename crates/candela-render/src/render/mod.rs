//! Clustered deferred rendering core.
//!
//! Responsibilities:
//! - allocate the G-buffer attachments and their bind groups
//! - build the geometry and lighting-resolve pipelines
//! - sequence clustering compute → geometry pass → resolve pass on a single
//!   command encoder per frame
//!
//! Bind-group slot order is fixed and shared with the WGSL sources below;
//! the constants here are the single Rust-side authority.

mod bindings;
mod deferred;
mod gbuffer;
mod pipelines;

pub use bindings::{GBufferBindings, SceneBindings};
pub use deferred::ClusteredDeferredRenderer;
pub use gbuffer::{
    ALBEDO_FORMAT, ATTACHMENT_USAGES, DEPTH_FORMAT, GBuffer, NORMAL_FORMAT, POSITION_FORMAT,
};

/// Slot of the scene bind group (camera + lights + clusters), both pipelines.
pub const SCENE_GROUP: u32 = 0;
/// Slot of the per-node model bind group, geometry pipeline.
pub const MODEL_GROUP: u32 = 1;
/// Slot of the per-material bind group, geometry pipeline.
pub const MATERIAL_GROUP: u32 = 2;
/// Slot of the G-buffer bind group, resolve pipeline.
pub const GBUFFER_GROUP: u32 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_pass_slot_order() {
        assert_eq!(
            [SCENE_GROUP, MODEL_GROUP, MATERIAL_GROUP],
            [0, 1, 2],
            "geometry pipeline layout order is {{scene, model, material}}"
        );
    }

    #[test]
    fn resolve_pass_slot_order() {
        assert_eq!(
            [SCENE_GROUP, GBUFFER_GROUP],
            [0, 1],
            "resolve pipeline layout order is {{scene, gbuffer}}"
        );
    }
}

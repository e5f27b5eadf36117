//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface (swapchain)
//! - acquiring frames and providing encoders/views for rendering
//!
//! Everything downstream receives the device/queue through explicit
//! references; there is no global graphics state.

mod gpu;

pub use gpu::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction};

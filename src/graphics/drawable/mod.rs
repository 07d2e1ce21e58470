//! Objects the renderer knows how to draw.
//!
//! Each drawable owns its pipeline, its geometry and one uniform buffer per
//! frame in flight. The renderer only opens the render pass and hands the
//! command buffer over.

use std::sync::Arc;

use cgmath::Matrix4;
use vulkano::{
    command_buffer::{AutoCommandBufferBuilder, PrimaryAutoCommandBuffer},
    descriptor_set::allocator::StandardDescriptorSetAllocator,
    device::{Device, Features},
    memory::allocator::StandardMemoryAllocator,
    pipeline::graphics::viewport::Viewport,
    render_pass::RenderPass,
};

use crate::config::{Shape, TessellationConfig};

use super::geometry;

pub use self::patch::PatchMesh;
pub use self::solid::SolidMesh;

mod patch;
mod solid;

/// Matrices in the math crate's GL clip conventions.
#[derive(Debug, Clone, Copy)]
pub struct FrameMatrices {
    pub model: Matrix4<f32>,
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
}

impl FrameMatrices {
    /// Projection remapped to Vulkan clip space: Y points down, depth spans 0..1.
    pub fn vulkan_projection(&self) -> Matrix4<f32> {
        clip_correction() * self.projection
    }
}

#[rustfmt::skip]
fn clip_correction() -> Matrix4<f32> {
    Matrix4::new(
        1.0,  0.0, 0.0, 0.0,
        0.0, -1.0, 0.0, 0.0,
        0.0,  0.0, 0.5, 0.0,
        0.0,  0.0, 0.5, 1.0,
    )
}

pub trait Drawable {
    /// Uploads this frame's matrices. The slot must not be in use by the GPU.
    fn write_uniforms(&self, frame_index: usize, matrices: &FrameMatrices) -> anyhow::Result<()>;

    fn record(
        &self,
        builder: &mut AutoCommandBufferBuilder<PrimaryAutoCommandBuffer>,
        frame_index: usize,
        viewport: &Viewport,
    ) -> anyhow::Result<()>;
}

/// What a drawable needs from the device to build its GPU resources.
pub struct DrawableContext<'a> {
    pub device: Arc<Device>,
    pub memory_allocator: Arc<StandardMemoryAllocator>,
    pub descriptor_set_allocator: &'a StandardDescriptorSetAllocator,
    pub render_pass: Arc<RenderPass>,
    pub frames_in_flight: usize,
}

/// Device features a shape cannot be drawn without.
pub fn required_features(shape: Shape) -> Features {
    match shape {
        Shape::Cube | Shape::Icosahedron => Features::empty(),
        Shape::Patches => Features {
            tessellation_shader: true,
            geometry_shader: true,
            ..Features::empty()
        },
    }
}

pub fn create(
    shape: Shape,
    context: &DrawableContext<'_>,
    tessellation: &TessellationConfig,
) -> anyhow::Result<Box<dyn Drawable>> {
    let drawable: Box<dyn Drawable> = match shape {
        Shape::Cube => Box::new(SolidMesh::new(
            context,
            geometry::CUBE_VERTICES.to_vec(),
            geometry::CUBE_INDICES.to_vec(),
        )?),
        Shape::Icosahedron => Box::new(SolidMesh::new(
            context,
            geometry::icosahedron_vertices(),
            geometry::icosahedron_indices(),
        )?),
        Shape::Patches => Box::new(PatchMesh::new(
            context,
            geometry::patch_sheet(),
            tessellation,
        )?),
    };
    Ok(drawable)
}

#[cfg(test)]
mod tests {
    use cgmath::{perspective, Deg, SquareMatrix, Vector4};

    use super::*;

    fn matrices() -> FrameMatrices {
        FrameMatrices {
            model: Matrix4::identity(),
            view: Matrix4::identity(),
            projection: perspective(Deg(60.0), 1.0, 1.0, 100.0),
        }
    }

    fn ndc(clip: Vector4<f32>) -> Vector4<f32> {
        clip / clip.w
    }

    #[test]
    fn near_and_far_planes_map_to_unit_depth() {
        let projection = matrices().vulkan_projection();
        let near = ndc(projection * Vector4::new(0.0, 0.0, -1.0, 1.0));
        let far = ndc(projection * Vector4::new(0.0, 0.0, -100.0, 1.0));
        assert!(near.z.abs() < 1e-5, "near depth {}", near.z);
        assert!((far.z - 1.0).abs() < 1e-5, "far depth {}", far.z);
    }

    #[test]
    fn up_in_the_scene_is_up_on_screen() {
        let m = matrices();
        let point = Vector4::new(0.0, 0.5, -2.0, 1.0);
        let gl = ndc(m.projection * point);
        let vk = ndc(m.vulkan_projection() * point);
        assert!(gl.y > 0.0);
        assert!((vk.y + gl.y).abs() < 1e-6);
    }

    #[test]
    fn patches_need_tessellation_and_geometry_stages() {
        let features = required_features(Shape::Patches);
        assert!(features.tessellation_shader);
        assert!(features.geometry_shader);
        assert!(!required_features(Shape::Cube).tessellation_shader);
        assert!(!required_features(Shape::Icosahedron).geometry_shader);
    }
}

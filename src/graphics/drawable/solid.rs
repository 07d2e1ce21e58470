use std::sync::Arc;

use anyhow::Context;
use vulkano::{
    buffer::{Buffer, BufferCreateInfo, BufferUsage, Subbuffer},
    command_buffer::{AutoCommandBufferBuilder, PrimaryAutoCommandBuffer},
    descriptor_set::{PersistentDescriptorSet, WriteDescriptorSet},
    pipeline::{
        graphics::{
            input_assembly::PrimitiveTopology,
            rasterization::CullMode,
            vertex_input::{Vertex, VertexDefinition},
            viewport::Viewport,
        },
        GraphicsPipeline, Pipeline, PipelineBindPoint,
    },
};

use crate::graphics::{
    helpers::{self, PipelineDescription},
    mesh::{upload_allocation, MeshBuilder},
    shaders::{fs_basic, vs_position_color, VertexPositionColor},
};

use super::{Drawable, DrawableContext, FrameMatrices};

type FrameBuffer = Subbuffer<vs_position_color::FrameData>;

/// Indexed triangle list with per-vertex colors.
pub struct SolidMesh {
    pipeline: Arc<GraphicsPipeline>,
    vertex_buffer: Subbuffer<[VertexPositionColor]>,
    index_buffer: Subbuffer<[u16]>,
    uniform_buffers: Vec<FrameBuffer>,
    uniform_buffer_sets: Vec<Arc<PersistentDescriptorSet>>,
}

impl SolidMesh {
    pub fn new(
        context: &DrawableContext<'_>,
        vertices: Vec<VertexPositionColor>,
        indices: Vec<u16>,
    ) -> anyhow::Result<Self> {
        let device = &context.device;

        let vs = vs_position_color::load(device.clone())
            .context("failed to create shader module")?
            .entry_point("main")
            .context("getting vs entry point")?;
        let fs = fs_basic::load(device.clone())
            .context("failed to create shader module")?
            .entry_point("main")
            .context("getting fs entry point")?;

        let vertex_input_state = VertexPositionColor::per_vertex()
            .definition(&vs.info().input_interface)
            .context("creating vertex input state")?;

        let pipeline = helpers::get_pipeline(
            device.clone(),
            context.render_pass.clone(),
            PipelineDescription {
                stages: vec![vs, fs],
                vertex_input_state,
                topology: PrimitiveTopology::TriangleList,
                patch_control_points: None,
                cull_mode: CullMode::Back,
            },
        )?;

        let mesh = MeshBuilder::default()
            .with_vertices(vertices)
            .with_indices(indices)
            .build(context.memory_allocator.clone())
            .context("building mesh")?;
        let index_buffer = mesh.index_buffer.context("solid mesh without indices")?;

        let uniform_buffers = (0..context.frames_in_flight)
            .map(|_| {
                Buffer::new_sized(
                    context.memory_allocator.clone(),
                    BufferCreateInfo {
                        usage: BufferUsage::UNIFORM_BUFFER,
                        ..Default::default()
                    },
                    upload_allocation(),
                )
                .context("creating uniform buffer")
            })
            .collect::<anyhow::Result<Vec<FrameBuffer>>>()?;

        let uniform_buffer_sets = uniform_buffers
            .iter()
            .map(|buffer| {
                PersistentDescriptorSet::new(
                    context.descriptor_set_allocator,
                    pipeline.layout().set_layouts()[0].clone(),
                    [WriteDescriptorSet::buffer(0, buffer.clone())],
                    [],
                )
                .context("Creating Descriptor Set")
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(SolidMesh {
            pipeline,
            vertex_buffer: mesh.vertex_buffer,
            index_buffer,
            uniform_buffers,
            uniform_buffer_sets,
        })
    }
}

impl Drawable for SolidMesh {
    fn write_uniforms(&self, frame_index: usize, matrices: &FrameMatrices) -> anyhow::Result<()> {
        *self.uniform_buffers[frame_index].write()? = vs_position_color::FrameData {
            model: matrices.model.into(),
            view: matrices.view.into(),
            proj: matrices.vulkan_projection().into(),
        };
        Ok(())
    }

    fn record(
        &self,
        builder: &mut AutoCommandBufferBuilder<PrimaryAutoCommandBuffer>,
        frame_index: usize,
        viewport: &Viewport,
    ) -> anyhow::Result<()> {
        builder
            .bind_pipeline_graphics(self.pipeline.clone())?
            .set_viewport(0, [viewport.clone()].into_iter().collect())?
            .bind_descriptor_sets(
                PipelineBindPoint::Graphics,
                self.pipeline.layout().clone(),
                0,
                self.uniform_buffer_sets[frame_index].clone(),
            )?
            .bind_vertex_buffers(0, self.vertex_buffer.clone())?
            .bind_index_buffer(self.index_buffer.clone())?
            .draw_indexed(self.index_buffer.len() as u32, 1, 0, 0, 0)?;
        Ok(())
    }
}

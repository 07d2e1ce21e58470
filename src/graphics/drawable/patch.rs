use std::sync::Arc;

use anyhow::Context;
use cgmath::{Matrix, Matrix4};
use log::info;
use vulkano::{
    buffer::{Buffer, BufferCreateInfo, BufferUsage, Subbuffer},
    command_buffer::{AutoCommandBufferBuilder, PrimaryAutoCommandBuffer},
    descriptor_set::{PersistentDescriptorSet, WriteDescriptorSet},
    device::Device,
    pipeline::{
        graphics::{
            input_assembly::PrimitiveTopology,
            rasterization::CullMode,
            vertex_input::{Vertex, VertexDefinition},
            viewport::Viewport,
        },
        GraphicsPipeline, Pipeline, PipelineBindPoint,
    },
    shader::{EntryPoint, ShaderModule},
    Validated, VulkanError,
};

use crate::{
    config::TessellationConfig,
    graphics::{
        geometry::{BEZIER_BASIS, PATCH_CONTROL_POINTS},
        helpers::{self, PipelineDescription},
        mesh::{upload_allocation, MeshBuilder},
        shaders::{fs_patch, gs_patch, tcs_patch, tes_patch, vs_patch, Position},
    },
};

use super::{Drawable, DrawableContext, FrameMatrices};

type FrameBuffer = Subbuffer<tes_patch::FrameData>;

/// Bicubic Bezier patches expanded on the GPU, facet shaded with wireframe edges.
pub struct PatchMesh {
    pipeline: Arc<GraphicsPipeline>,
    vertex_buffer: Subbuffer<[Position]>,
    uniform_buffers: Vec<FrameBuffer>,
    uniform_buffer_sets: Vec<Arc<PersistentDescriptorSet>>,
}

impl PatchMesh {
    pub fn new(
        context: &DrawableContext<'_>,
        control_points: Vec<Position>,
        tessellation: &TessellationConfig,
    ) -> anyhow::Result<Self> {
        let device = &context.device;

        let vs = entry_point(vs_patch::load, device, "vertex")?;
        let tcs = entry_point(tcs_patch::load, device, "tessellation control")?;
        let tes = entry_point(tes_patch::load, device, "tessellation evaluation")?;
        let gs = entry_point(gs_patch::load, device, "geometry")?;
        let fs = entry_point(fs_patch::load, device, "fragment")?;

        let vertex_input_state = Position::per_vertex()
            .definition(&vs.info().input_interface)
            .context("creating vertex input state")?;

        let pipeline = helpers::get_pipeline(
            device.clone(),
            context.render_pass.clone(),
            PipelineDescription {
                stages: vec![vs, tcs, tes, gs, fs],
                vertex_input_state,
                topology: PrimitiveTopology::PatchList,
                patch_control_points: Some(PATCH_CONTROL_POINTS),
                // the sheet is open, both sides are visible
                cull_mode: CullMode::None,
            },
        )?;

        info!(
            "Tessellating {} patches, inner level {}, outer level {}",
            control_points.len() / PATCH_CONTROL_POINTS as usize,
            tessellation.inner,
            tessellation.outer
        );

        let mesh = MeshBuilder::default()
            .with_vertices(control_points)
            .build(context.memory_allocator.clone())
            .context("building patch mesh")?;

        let basis = Matrix4::from(BEZIER_BASIS);
        let params = Buffer::from_data(
            context.memory_allocator.clone(),
            BufferCreateInfo {
                usage: BufferUsage::UNIFORM_BUFFER,
                ..Default::default()
            },
            upload_allocation(),
            tes_patch::PatchParams {
                basis: basis.into(),
                basis_transposed: basis.transpose().into(),
                inner: tessellation.inner,
                outer: tessellation.outer,
            },
        )
        .context("creating patch parameters buffer")?;

        let material = Buffer::from_data(
            context.memory_allocator.clone(),
            BufferCreateInfo {
                usage: BufferUsage::UNIFORM_BUFFER,
                ..Default::default()
            },
            upload_allocation(),
            fs_patch::Material {
                light_position: [0.25, 0.25, 1.0, 0.0],
                ambient: [0.04, 0.04, 0.04, 1.0],
                diffuse: [0.0, 0.75, 0.75, 1.0],
                specular: [0.5, 0.5, 0.5, 1.0],
                shininess: 50.0,
            },
        )
        .context("creating material buffer")?;

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
                    [
                        WriteDescriptorSet::buffer(0, buffer.clone()),
                        WriteDescriptorSet::buffer(1, params.clone()),
                        WriteDescriptorSet::buffer(2, material.clone()),
                    ],
                    [],
                )
                .context("Creating Descriptor Set")
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(PatchMesh {
            pipeline,
            vertex_buffer: mesh.vertex_buffer,
            uniform_buffers,
            uniform_buffer_sets,
        })
    }
}

fn entry_point(
    load: fn(Arc<Device>) -> Result<Arc<ShaderModule>, Validated<VulkanError>>,
    device: &Arc<Device>,
    stage: &str,
) -> anyhow::Result<EntryPoint> {
    load(device.clone())
        .with_context(|| format!("failed to create {stage} shader module"))?
        .entry_point("main")
        .with_context(|| format!("getting {stage} entry point"))
}

impl Drawable for PatchMesh {
    fn write_uniforms(&self, frame_index: usize, matrices: &FrameMatrices) -> anyhow::Result<()> {
        *self.uniform_buffers[frame_index].write()? = tes_patch::FrameData {
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
            .draw(self.vertex_buffer.len() as u32, 1, 0, 0)?;
        Ok(())
    }
}

use std::sync::Arc;

use anyhow::{anyhow, Context};
use vulkano::{
    device::{
        physical::{PhysicalDevice, PhysicalDeviceType},
        Device, DeviceExtensions, Features, QueueFlags,
    },
    format::Format,
    image::{view::ImageView, Image, ImageCreateInfo, ImageType, ImageUsage},
    instance::Instance,
    memory::allocator::{AllocationCreateInfo, StandardMemoryAllocator},
    pipeline::{
        graphics::{
            color_blend::{ColorBlendAttachmentState, ColorBlendState},
            depth_stencil::{DepthState, DepthStencilState},
            input_assembly::{InputAssemblyState, PrimitiveTopology},
            multisample::MultisampleState,
            rasterization::{CullMode, FrontFace, RasterizationState},
            tessellation::TessellationState,
            vertex_input::VertexInputState,
            viewport::ViewportState,
            GraphicsPipelineCreateInfo,
        },
        layout::PipelineDescriptorSetLayoutCreateInfo,
        DynamicState, GraphicsPipeline, PipelineLayout, PipelineShaderStageCreateInfo,
    },
    render_pass::{Framebuffer, FramebufferCreateInfo, RenderPass, Subpass},
    shader::EntryPoint,
    swapchain::Surface,
};

const DEPTH_FORMAT: Format = Format::D16_UNORM;

pub fn select_physical_device(
    instance: &Arc<Instance>,
    surface: &Arc<Surface>,
    device_extensions: &DeviceExtensions,
    features: &Features,
) -> anyhow::Result<(Arc<PhysicalDevice>, u32)> {
    instance
        .enumerate_physical_devices()
        .context("enumerating physical devices")?
        .filter(|p| p.supported_extensions().contains(device_extensions))
        .filter(|p| p.supported_features().contains(features))
        .filter_map(|p| {
            p.queue_family_properties()
                .iter()
                .enumerate()
                .position(|(i, q)| {
                    q.queue_flags.contains(QueueFlags::GRAPHICS)
                        && p.surface_support(i as u32, surface).unwrap_or(false)
                })
                .map(|q| (p, q as u32))
        })
        .min_by_key(|(p, _)| match p.properties().device_type {
            PhysicalDeviceType::DiscreteGpu => 0,
            PhysicalDeviceType::IntegratedGpu => 1,
            PhysicalDeviceType::VirtualGpu => 2,
            PhysicalDeviceType::Cpu => 3,
            _ => 4,
        })
        .ok_or_else(|| {
            anyhow!(
                "no graphics device supports presenting with features {:?}",
                features
            )
        })
}

pub fn get_render_pass(device: Arc<Device>, format: Format) -> anyhow::Result<Arc<RenderPass>> {
    vulkano::single_pass_renderpass!(
        device,
        attachments: {
            color: {
                format: format,
                samples: 1,
                load_op: Clear,
                store_op: Store,
            },
            depth_stencil: {
                format: DEPTH_FORMAT,
                samples: 1,
                load_op: Clear,
                store_op: DontCare,
            },
        },
        pass: {
            color: [color],
            depth_stencil: {depth_stencil},
        },
    )
    .context("Creating RenderPass")
}

pub fn get_framebuffers(
    images: &[Arc<Image>],
    render_pass: Arc<RenderPass>,
    memory_allocator: Arc<StandardMemoryAllocator>,
) -> anyhow::Result<Vec<Arc<Framebuffer>>> {
    images
        .iter()
        .map(|image| {
            let depth_buffer = ImageView::new_default(Image::new(
                memory_allocator.clone(),
                ImageCreateInfo {
                    image_type: ImageType::Dim2d,
                    format: DEPTH_FORMAT,
                    extent: image.extent(),
                    usage: ImageUsage::DEPTH_STENCIL_ATTACHMENT | ImageUsage::TRANSIENT_ATTACHMENT,
                    ..Default::default()
                },
                AllocationCreateInfo::default(),
            )?)?;
            let view = ImageView::new_default(image.clone())?;
            Framebuffer::new(
                render_pass.clone(),
                FramebufferCreateInfo {
                    attachments: vec![view, depth_buffer],
                    ..Default::default()
                },
            )
            .context("Creating Framebuffer")
        })
        .collect::<anyhow::Result<Vec<Arc<Framebuffer>>>>()
}

/// The parts of a graphics pipeline that differ between drawables.
pub struct PipelineDescription {
    pub stages: Vec<EntryPoint>,
    pub vertex_input_state: VertexInputState,
    pub topology: PrimitiveTopology,
    /// Set for patch lists only
    pub patch_control_points: Option<u32>,
    pub cull_mode: CullMode,
}

/// Builds a pipeline with depth testing and a dynamic viewport.
pub fn get_pipeline(
    device: Arc<Device>,
    render_pass: Arc<RenderPass>,
    description: PipelineDescription,
) -> anyhow::Result<Arc<GraphicsPipeline>> {
    let stages: Vec<_> = description
        .stages
        .into_iter()
        .map(PipelineShaderStageCreateInfo::new)
        .collect();

    let layout = PipelineLayout::new(
        device.clone(),
        PipelineDescriptorSetLayoutCreateInfo::from_stages(&stages)
            .into_pipeline_layout_create_info(device.clone())
            .context("creating pipeline layout info")?,
    )?;

    let subpass =
        Subpass::from(render_pass.clone(), 0).context("getting subpass from renderpass")?;

    let tessellation_state =
        description
            .patch_control_points
            .map(|patch_control_points| TessellationState {
                patch_control_points,
                ..Default::default()
            });

    GraphicsPipeline::new(
        device.clone(),
        None,
        GraphicsPipelineCreateInfo {
            stages: stages.into_iter().collect(),
            vertex_input_state: Some(description.vertex_input_state),
            input_assembly_state: Some(InputAssemblyState {
                topology: description.topology,
                ..Default::default()
            }),
            tessellation_state,
            viewport_state: Some(ViewportState::default()),
            rasterization_state: Some(RasterizationState {
                cull_mode: description.cull_mode,
                front_face: FrontFace::CounterClockwise,
                ..Default::default()
            }),
            multisample_state: Some(MultisampleState::default()),
            color_blend_state: Some(ColorBlendState::with_attachment_states(
                subpass.num_color_attachments(),
                ColorBlendAttachmentState::default(),
            )),
            depth_stencil_state: Some(DepthStencilState {
                depth: Some(DepthState::simple()),
                ..Default::default()
            }),
            dynamic_state: [DynamicState::Viewport].into_iter().collect(),
            subpass: Some(subpass.into()),
            ..GraphicsPipelineCreateInfo::layout(layout)
        },
    )
    .context("Creating Pipeline")
}

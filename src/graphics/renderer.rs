use std::sync::Arc;

use anyhow::Context;
use log::{debug, error, info, warn};
use tracing::{span, Level};

#[cfg(target_os = "macos")]
use vulkano::instance::InstanceCreateFlags;

use vulkano::{
    command_buffer::{
        allocator::StandardCommandBufferAllocator, AutoCommandBufferBuilder,
        CommandBufferExecFuture, CommandBufferUsage, RenderPassBeginInfo, SubpassBeginInfo,
        SubpassContents,
    },
    descriptor_set::allocator::StandardDescriptorSetAllocator,
    device::{Device, DeviceCreateInfo, DeviceExtensions, Queue, QueueCreateInfo},
    image::ImageUsage,
    instance::{
        debug::{
            DebugUtilsMessageSeverity, DebugUtilsMessenger, DebugUtilsMessengerCallback,
            DebugUtilsMessengerCreateInfo,
        },
        Instance, InstanceCreateInfo, InstanceExtensions,
    },
    memory::allocator::StandardMemoryAllocator,
    pipeline::graphics::viewport::Viewport,
    render_pass::{Framebuffer, RenderPass},
    swapchain::{
        self, PresentFuture, Surface, Swapchain, SwapchainAcquireFuture, SwapchainCreateInfo,
        SwapchainPresentInfo,
    },
    sync::{
        self,
        future::{FenceSignalFuture, JoinFuture},
        GpuFuture,
    },
    Validated, VulkanError, VulkanLibrary,
};
use winit::{dpi::PhysicalSize, window::Window};

use crate::config::{DebugConfig, Shape, TessellationConfig};

use super::{
    drawable::{self, Drawable, DrawableContext, FrameMatrices},
    helpers,
};

type MyJoinFuture = JoinFuture<Box<dyn GpuFuture>, SwapchainAcquireFuture>;
type MyCommandBufferFuture = CommandBufferExecFuture<MyJoinFuture>;
type MyPresentFuture = PresentFuture<MyCommandBufferFuture>;
type MyFenceSignalFuture = FenceSignalFuture<MyPresentFuture>;
type FenceSignalFuturesList = Vec<Option<Arc<MyFenceSignalFuture>>>;

const VALIDATION_LAYER: &str = "VK_LAYER_KHRONOS_validation";
const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

pub struct Renderer {
    device: Arc<Device>,
    swapchain: Arc<Swapchain>,

    viewport: Viewport,
    window_resized: bool,
    dimensions: PhysicalSize<u32>,
    need_swapchain_recreation: bool,

    memory_allocator: Arc<StandardMemoryAllocator>,
    descriptor_set_allocator: StandardDescriptorSetAllocator,
    command_buffer_allocator: StandardCommandBufferAllocator,
    queue: Arc<Queue>,

    render_pass: Arc<RenderPass>,
    framebuffers: Vec<Arc<Framebuffer>>,

    // Per Frame Data
    previous_fence_i: u32,
    fences: FenceSignalFuturesList,

    shape: Shape,
    tessellation: TessellationConfig,
    drawable: Box<dyn Drawable>,
    _debug_messenger: Option<DebugUtilsMessenger>,
}

impl Renderer {
    pub fn new(
        extensions: InstanceExtensions,
        window: Arc<Window>,
        shape: Shape,
        tessellation: &TessellationConfig,
        debug: &DebugConfig,
    ) -> anyhow::Result<Self> {
        let library = VulkanLibrary::new().context("no local Vulkan library/DLL")?;

        let enabled_layers = if debug.validation {
            validation_layers(&library)?
        } else {
            vec![]
        };

        let create_info = InstanceCreateInfo {
            #[cfg(target_os = "macos")]
            flags: InstanceCreateFlags::ENUMERATE_PORTABILITY,
            enabled_extensions: InstanceExtensions {
                #[cfg(target_os = "macos")]
                khr_portability_enumeration: true,
                ext_debug_utils: !enabled_layers.is_empty(),
                ..extensions
            },
            enabled_layers: enabled_layers.clone(),
            ..Default::default()
        };

        let instance = Instance::new(library, create_info).context("creating instance")?;

        let debug_messenger = if enabled_layers.is_empty() {
            None
        } else {
            debug_messenger(&instance)
        };

        let surface = Surface::from_window(instance.clone(), window.clone())
            .context("Getting Surface from Window")?;

        let device_extensions = DeviceExtensions {
            khr_swapchain: true,
            ..DeviceExtensions::empty()
        };

        let features = drawable::required_features(shape);

        let (physical_device, queue_family_index) = helpers::select_physical_device(
            &instance,
            &surface,
            &device_extensions,
            &features,
        )?;

        info!(
            "Current Graphics Device is {}, Vulkan {}",
            physical_device.properties().device_name,
            physical_device.api_version()
        );

        let (device, mut queues) = Device::new(
            physical_device.clone(),
            DeviceCreateInfo {
                queue_create_infos: vec![QueueCreateInfo {
                    queue_family_index,
                    ..Default::default()
                }],
                enabled_extensions: device_extensions,
                enabled_features: features,
                ..Default::default()
            },
        )
        .context("creating logical device")?;

        let queue = queues.next().context("getting a queue")?;

        let (swapchain, images) = {
            let caps = physical_device
                .surface_capabilities(&surface, Default::default())
                .context("getting surface capabilities")?;

            let dimensions = window.inner_size();
            let composite_alpha = caps
                .supported_composite_alpha
                .into_iter()
                .next()
                .context("getting supported composite alpha")?;
            let image_format = physical_device
                .surface_formats(&surface, Default::default())
                .context("getting surface formats")?[0]
                .0;

            Swapchain::new(
                device.clone(),
                surface,
                SwapchainCreateInfo {
                    min_image_count: caps.min_image_count.max(2),
                    image_format,
                    image_extent: dimensions.into(),
                    image_usage: ImageUsage::COLOR_ATTACHMENT,
                    composite_alpha,
                    ..Default::default()
                },
            )
            .context("Creating Swapchain")?
        };

        let render_pass = helpers::get_render_pass(device.clone(), swapchain.image_format())?;

        let memory_allocator = Arc::new(StandardMemoryAllocator::new_default(device.clone()));

        let framebuffers =
            helpers::get_framebuffers(&images, render_pass.clone(), memory_allocator.clone())?;

        let viewport = Viewport {
            offset: [0.0, 0.0],
            extent: window.inner_size().into(),
            depth_range: 0.0..=1.0,
        };

        let descriptor_set_allocator =
            StandardDescriptorSetAllocator::new(device.clone(), Default::default());

        let command_buffer_allocator =
            StandardCommandBufferAllocator::new(device.clone(), Default::default());

        let frames_in_flight = images.len();

        let drawable = drawable::create(
            shape,
            &DrawableContext {
                device: device.clone(),
                memory_allocator: memory_allocator.clone(),
                descriptor_set_allocator: &descriptor_set_allocator,
                render_pass: render_pass.clone(),
                frames_in_flight,
            },
            tessellation,
        )
        .with_context(|| format!("setting up {shape:?}"))?;

        info!("Drawing {:?} with {} frames in flight", shape, frames_in_flight);

        Ok(Renderer {
            device,
            swapchain,
            viewport,
            window_resized: false,
            dimensions: window.inner_size(),
            need_swapchain_recreation: false,
            memory_allocator,
            descriptor_set_allocator,
            command_buffer_allocator,
            queue,
            render_pass,
            framebuffers,
            previous_fence_i: 0,
            fences: vec![None; frames_in_flight],
            shape,
            tessellation: tessellation.clone(),
            drawable,
            _debug_messenger: debug_messenger,
        })
    }

    pub fn window_resized(&mut self, new_size: PhysicalSize<u32>) {
        self.window_resized = true;
        self.dimensions = new_size;
    }

    pub fn draw(&mut self, matrices: &FrameMatrices) -> anyhow::Result<()> {
        let is_zero_sized_window = self.dimensions.height == 0 || self.dimensions.width == 0;
        if is_zero_sized_window {
            return Ok(());
        }

        if self.window_resized || self.need_swapchain_recreation {
            self.resize_swapchain()?;
        }

        let acquire_image = span!(Level::INFO, "acquiring swapchain image").entered();
        let (image_i, suboptimal, acquire_future) =
            match swapchain::acquire_next_image(self.swapchain.clone(), None)
                .map_err(Validated::unwrap)
            {
                Ok(r) => r,
                Err(VulkanError::OutOfDate) => {
                    self.need_swapchain_recreation = true;
                    return Ok(());
                }
                Err(e) => return Err(e).context("failed to acquire next image"),
            };

        if suboptimal {
            self.need_swapchain_recreation = true;
        }
        acquire_image.exit();

        let fence_wait = span!(Level::INFO, "awaiting fence").entered();
        // wait for the fence related to this image to finish (normally this would be the oldest fence)
        if let Some(image_fence) = &self.fences[image_i as usize] {
            image_fence.wait(None)?;
        }

        let previous_future = match self.fences[self.previous_fence_i as usize].clone() {
            None => {
                let mut now = sync::now(self.device.clone());
                now.cleanup_finished();
                now.boxed()
            }
            Some(fence) => fence.boxed(),
        };
        fence_wait.exit();

        self.drawable.write_uniforms(image_i as usize, matrices)?;

        let mut builder = AutoCommandBufferBuilder::primary(
            &self.command_buffer_allocator,
            self.queue.queue_family_index(),
            CommandBufferUsage::OneTimeSubmit,
        )
        .context("Creating command buffer builder")?;

        builder.begin_render_pass(
            RenderPassBeginInfo {
                clear_values: vec![Some(CLEAR_COLOR.into()), Some(1f32.into())],
                ..RenderPassBeginInfo::framebuffer(self.framebuffers[image_i as usize].clone())
            },
            SubpassBeginInfo {
                contents: SubpassContents::Inline,
                ..Default::default()
            },
        )?;

        self.drawable
            .record(&mut builder, image_i as usize, &self.viewport)?;

        builder.end_render_pass(Default::default())?;

        let command_buffer = builder.build().context("Building Command Buffer")?;

        let span = span!(Level::INFO, "present").entered();
        let future = previous_future
            .join(acquire_future)
            .then_execute(self.queue.clone(), command_buffer)
            .context("Executing Queue")?
            .then_swapchain_present(
                self.queue.clone(),
                SwapchainPresentInfo::swapchain_image_index(self.swapchain.clone(), image_i),
            )
            .then_signal_fence_and_flush();
        span.exit();

        self.fences[image_i as usize] = match future.map_err(Validated::unwrap) {
            #[allow(clippy::arc_with_non_send_sync)]
            Ok(value) => Some(Arc::new(value)),
            Err(VulkanError::OutOfDate) => {
                self.need_swapchain_recreation = true;
                None
            }
            Err(e) => return Err(e).context("failed to flush future"),
        };

        self.previous_fence_i = image_i;
        Ok(())
    }

    fn resize_swapchain(&mut self) -> anyhow::Result<()> {
        let _resize_swapchain = span!(Level::INFO, "resizing swapchain").entered();
        debug!("recreating swapchain at {:?}", self.dimensions);
        self.need_swapchain_recreation = false;

        let (new_swapchain, new_images) = self
            .swapchain
            .recreate(SwapchainCreateInfo {
                image_extent: self.dimensions.into(),
                ..self.swapchain.create_info()
            })
            .context("failed to recreate swapchain")?;

        self.swapchain = new_swapchain;

        self.framebuffers = helpers::get_framebuffers(
            &new_images,
            self.render_pass.clone(),
            self.memory_allocator.clone(),
        )
        .context("recreating framebuffers")?;

        if self.window_resized {
            self.viewport.extent = self.dimensions.into();
            self.window_resized = false;
        }

        if new_images.len() != self.fences.len() {
            self.rebuild_frame_slots(new_images.len())?;
        }

        Ok(())
    }

    /// Resizes the per-image fences and the drawable's per-frame uniforms
    /// after the swapchain came back with a different image count.
    fn rebuild_frame_slots(&mut self, frames_in_flight: usize) -> anyhow::Result<()> {
        info!(
            "Swapchain image count changed from {} to {}",
            self.fences.len(),
            frames_in_flight
        );

        // the old uniform buffers may still be read by queued frames
        for fence in self.fences.iter().flatten() {
            fence.wait(None)?;
        }
        resize_frame_slots(&mut self.fences, frames_in_flight);
        self.previous_fence_i = 0;

        self.drawable = drawable::create(
            self.shape,
            &DrawableContext {
                device: self.device.clone(),
                memory_allocator: self.memory_allocator.clone(),
                descriptor_set_allocator: &self.descriptor_set_allocator,
                render_pass: self.render_pass.clone(),
                frames_in_flight,
            },
            &self.tessellation,
        )
        .with_context(|| format!("rebuilding {:?}", self.shape))?;
        Ok(())
    }
}

/// Drops every tracked frame and makes room for `count` images.
fn resize_frame_slots<T>(slots: &mut Vec<Option<T>>, count: usize) {
    slots.clear();
    slots.resize_with(count, || None);
}

fn validation_layers(library: &VulkanLibrary) -> anyhow::Result<Vec<String>> {
    let available = library
        .layer_properties()
        .context("enumerating instance layers")?
        .any(|layer| layer.name() == VALIDATION_LAYER);

    if available {
        info!("Enabling {}", VALIDATION_LAYER);
        Ok(vec![VALIDATION_LAYER.to_owned()])
    } else {
        warn!("{} requested but not installed", VALIDATION_LAYER);
        Ok(vec![])
    }
}

fn debug_messenger(instance: &Arc<Instance>) -> Option<DebugUtilsMessenger> {
    unsafe {
        DebugUtilsMessenger::new(
            instance.clone(),
            DebugUtilsMessengerCreateInfo::user_callback(DebugUtilsMessengerCallback::new(
                |message_severity, _message_type, callback_data| {
                    if message_severity.intersects(DebugUtilsMessageSeverity::ERROR) {
                        error!("{}", callback_data.message);
                    } else if message_severity.intersects(DebugUtilsMessageSeverity::WARNING) {
                        warn!("{}", callback_data.message);
                    } else {
                        debug!("{}", callback_data.message);
                    }
                },
            )),
        )
        .map_err(|e| warn!("debug messenger unavailable: {e}"))
        .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_slots_grow_with_the_image_count() {
        let mut slots = vec![Some(1), None];
        resize_frame_slots(&mut slots, 3);
        assert_eq!(slots, vec![None, None, None]);
    }

    #[test]
    fn frame_slots_shrink_with_the_image_count() {
        let mut slots = vec![Some(1), Some(2), Some(3)];
        resize_frame_slots(&mut slots, 2);
        assert_eq!(slots, vec![None, None]);
    }
}

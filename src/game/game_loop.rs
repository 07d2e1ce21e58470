use log::info;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::{event, span, Level};
use vulkano::instance::InstanceExtensions;
use winit::{dpi::PhysicalSize, window::Window};

#[cfg(feature = "tracing")]
use tracy_client::frame_mark;

use crate::{
    config::AppConfig,
    graphics::{Camera, FrameMatrices, Renderer},
};

use super::{
    camera::FixedCamera,
    fps::{window_title, FrameCounter},
    State,
};

pub struct GameLoop {
    window: Arc<Window>,
    renderer: Renderer,
    camera: FixedCamera,
    state: State,
    frame_counter: FrameCounter,
    previous_instant: Option<Instant>,
    degrees_per_second: f32,
    title_prefix: String,
}

impl GameLoop {
    pub fn new(
        required_extensions: InstanceExtensions,
        window: Arc<Window>,
        config: &AppConfig,
    ) -> anyhow::Result<Self> {
        let renderer = Renderer::new(
            required_extensions,
            window.clone(),
            config.scene.shape,
            &config.tessellation,
            &config.debug,
        )?;

        let camera = FixedCamera::new(&config.camera, window.inner_size());

        info!("Initialized {:?} scene", config.scene.shape);

        Ok(GameLoop {
            window,
            renderer,
            camera,
            state: State::default(),
            frame_counter: FrameCounter::new(config.scene.title_interval()),
            previous_instant: None,
            degrees_per_second: config.scene.degrees_per_second,
            title_prefix: config.window.title_prefix.clone(),
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.renderer.window_resized(new_size);
        if self.camera.resize(new_size) {
            event!(
                Level::INFO,
                aspect_ratio = self.camera.aspect_ratio(),
                "projection recomputed"
            );
        }
    }

    /// Advances the rotation by the time since the previous frame and draws.
    pub fn update(&mut self) -> anyhow::Result<()> {
        let _update = span!(Level::INFO, "frame", rotation = self.state.cube_rotation).entered();

        let current_instant = Instant::now();

        // the first frame does not rotate
        let elapsed = self
            .previous_instant
            .map(|previous| current_instant.duration_since(previous))
            .unwrap_or(Duration::ZERO);

        event!(Level::TRACE, elapsed = elapsed.as_secs_f32());

        self.state = self.state.advance(elapsed, self.degrees_per_second);
        self.previous_instant = Some(current_instant);

        let (projection, view) = self.camera.calculate_matrices();
        let matrices = FrameMatrices {
            model: self.state.model_matrix(),
            view,
            projection,
        };

        self.renderer.draw(&matrices)?;

        #[cfg(feature = "tracing")]
        frame_mark();

        self.frame_counter.frame();
        if let Some(fps) = self.frame_counter.poll(Instant::now()) {
            self.window.set_title(&window_title(
                &self.title_prefix,
                fps,
                self.window.inner_size(),
            ));
        }

        Ok(())
    }
}

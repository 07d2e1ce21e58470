use std::sync::Arc;

use anyhow::Context;
use log::{error, info};
use vulkano::swapchain::Surface;
use winit::{
    dpi::PhysicalSize,
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    window::{Window, WindowBuilder},
};

use crate::{config::AppConfig, game::GameLoop};

pub struct App {
    event_loop: EventLoop<()>,
    window: Arc<Window>,
    game: GameLoop,
}

impl App {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new().context("creating event loop")?;
        let required_extensions = Surface::required_extensions(&event_loop);

        let window = Arc::new(
            WindowBuilder::new()
                .with_title(config.window.title_prefix.as_str())
                .with_inner_size(PhysicalSize::new(config.window.width, config.window.height))
                .build(&event_loop)
                .context("Could not create a new rendering window")?,
        );

        let game = GameLoop::new(required_extensions, window.clone(), config)?;

        Ok(App {
            event_loop,
            window,
            game,
        })
    }

    /// Runs until the window is closed or a frame fails.
    pub fn run(self) -> anyhow::Result<()> {
        let App {
            event_loop,
            window,
            mut game,
        } = self;

        let mut failure: Option<anyhow::Error> = None;

        event_loop
            .run(|event, elwt: &EventLoopWindowTarget<()>| {
                elwt.set_control_flow(ControlFlow::Poll);
                match event {
                    Event::WindowEvent {
                        event: WindowEvent::CloseRequested,
                        ..
                    } => {
                        info!("Window closed");
                        elwt.exit();
                    }
                    Event::WindowEvent {
                        event: WindowEvent::Resized(new_size),
                        ..
                    } => {
                        game.resize(new_size);
                    }
                    Event::WindowEvent {
                        event: WindowEvent::RedrawRequested,
                        ..
                    } => {
                        if let Err(e) = game.update() {
                            error!("{e:#}");
                            failure = Some(e);
                            elwt.exit();
                        }
                    }
                    Event::AboutToWait => {
                        window.request_redraw();
                    }
                    _ => (),
                }
            })
            .context("Processing EventLoop")?;

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

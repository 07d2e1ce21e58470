pub use game_loop::GameLoop;
pub use state::State;

mod camera;
mod fps;
mod game_loop;
mod state;

// Note to self: all the pub use statements here define the public api of the 'graphics' module
pub use self::camera::Camera;
pub use self::drawable::FrameMatrices;
pub use self::renderer::Renderer;

mod camera;
mod drawable;
mod geometry;
mod helpers;
mod mesh;
mod renderer;
mod shaders;

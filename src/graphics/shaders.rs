use vulkano::{buffer::BufferContents, pipeline::graphics::vertex_input::Vertex};

/// Bezier control point.
#[derive(BufferContents, Vertex, Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct Position {
    #[format(R32G32B32_SFLOAT)]
    pub position: [f32; 3],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, BufferContents, Vertex)]
pub struct VertexPositionColor {
    #[format(R32G32B32A32_SFLOAT)]
    pub position: [f32; 4],
    #[format(R32G32B32A32_SFLOAT)]
    pub color: [f32; 4],
}

pub mod vs_position_color {
    vulkano_shaders::shader! {
        ty: "vertex",
        path: "assets/shaders/basic/vert.glsl"
    }
}

pub mod fs_basic {
    vulkano_shaders::shader! {
        ty: "fragment",
        path: "assets/shaders/basic/frag.glsl"
    }
}

pub mod vs_patch {
    vulkano_shaders::shader! {
        ty: "vertex",
        path: "assets/shaders/patch/vert.glsl"
    }
}

pub mod tcs_patch {
    vulkano_shaders::shader! {
        ty: "tess_ctrl",
        path: "assets/shaders/patch/tesc.glsl"
    }
}

pub mod tes_patch {
    vulkano_shaders::shader! {
        ty: "tess_eval",
        path: "assets/shaders/patch/tese.glsl"
    }
}

pub mod gs_patch {
    vulkano_shaders::shader! {
        ty: "geometry",
        path: "assets/shaders/patch/geom.glsl"
    }
}

pub mod fs_patch {
    vulkano_shaders::shader! {
        ty: "fragment",
        path: "assets/shaders/patch/frag.glsl"
    }
}

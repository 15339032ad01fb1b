//! Shader file locations and uniform names.

/// Vertex stage source, relative to the working directory
pub const VERTEX_SHADER_PATH: &str = "shaders/vertex_shader.glsl";
/// Fragment stage source, relative to the working directory
pub const FRAGMENT_SHADER_PATH: &str = "shaders/fragment_shader.glsl";

pub const UNIFORM_ZOOM: &str = "u_zoom";
pub const UNIFORM_CENTER: &str = "u_center";
pub const UNIFORM_MAX_ITERATIONS: &str = "u_max_iterations";
pub const UNIFORM_PALETTE: &str = "u_palette";
pub const UNIFORM_USE_PALETTE: &str = "u_use_palette";

use crate::config::ConfigError;
use crate::shader::ShaderError;
use thiserror::Error;

/// Anything that ends the session.
#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("window creation failed: {0}")]
    Window(String),
    #[error("OpenGL context error: {0}")]
    Context(#[from] glutin::error::Error),
    #[error("OpenGL error: {0}")]
    Gl(String),
    #[error(transparent)]
    Shader(#[from] ShaderError),
}

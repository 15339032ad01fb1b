//! Shader program loading and hot reload.
//!
//! Sources are read from disk on every compile so edits can be picked up with a
//! reload. A reload builds a complete new program first and only then replaces
//! the old one; any failure leaves the current program in place.

use glow::HasContext;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn gl_enum(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("failed to open shader file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to create {0}")]
    Create(String),
    #[error("{stage} shader compilation failed ({}): {log}", .path.display())]
    Compile {
        stage: ShaderStage,
        path: PathBuf,
        log: String,
    },
    #[error("shader linking failed: {0}")]
    Link(String),
}

/// Where the program is in its reload cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReloadState {
    #[default]
    Compiled,
    ReloadRequested,
    Recompiling,
}

/// Tracks reload requests between the key press and the next frame.
#[derive(Debug, Default)]
pub struct ReloadTracker {
    state: ReloadState,
}

impl ReloadTracker {
    pub fn state(&self) -> ReloadState {
        self.state
    }

    /// Key press. Repeated requests before the next frame collapse into one.
    pub fn request(&mut self) {
        if self.state == ReloadState::Compiled {
            self.state = ReloadState::ReloadRequested;
        }
    }

    /// Frame tick. Returns `true` if a recompile should run now.
    pub fn begin(&mut self) -> bool {
        if self.state == ReloadState::ReloadRequested {
            self.state = ReloadState::Recompiling;
            true
        } else {
            false
        }
    }

    /// Recompile finished, whether it succeeded or not.
    pub fn finish(&mut self) {
        self.state = ReloadState::Compiled;
    }
}

pub struct ShaderProgram {
    gl: Arc<glow::Context>,
    program: glow::Program,
    vertex_path: PathBuf,
    fragment_path: PathBuf,
}

impl ShaderProgram {
    pub fn new(
        gl: Arc<glow::Context>,
        vertex_path: &Path,
        fragment_path: &Path,
    ) -> Result<Self, ShaderError> {
        let program = build_program(&gl, vertex_path, fragment_path)?;
        Ok(Self {
            gl,
            program,
            vertex_path: vertex_path.to_path_buf(),
            fragment_path: fragment_path.to_path_buf(),
        })
    }

    /// Rebuild from the source files. The previous program stays current on
    /// error. Uniform locations from before the call are invalid afterwards.
    pub fn reload(&mut self) -> Result<(), ShaderError> {
        let program = build_program(&self.gl, &self.vertex_path, &self.fragment_path)?;
        unsafe {
            self.gl.delete_program(self.program);
        }
        self.program = program;
        Ok(())
    }

    pub fn use_program(&self) {
        unsafe {
            self.gl.use_program(Some(self.program));
        }
    }

    pub fn uniform_location(&self, name: &str) -> Option<glow::UniformLocation> {
        unsafe { self.gl.get_uniform_location(self.program, name) }
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_program(self.program);
        }
    }
}

fn read_source(path: &Path) -> Result<String, ShaderError> {
    std::fs::read_to_string(path).map_err(|source| {
        tracing::error!(path = %path.display(), "failed to open shader file");
        ShaderError::Read {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Compile one stage from a source file.
pub fn compile(
    gl: &glow::Context,
    stage: ShaderStage,
    path: &Path,
) -> Result<glow::Shader, ShaderError> {
    let source = read_source(path)?;
    unsafe {
        let shader = gl
            .create_shader(stage.gl_enum())
            .map_err(|e| ShaderError::Create(format!("{stage} shader: {e}")))?;
        gl.shader_source(shader, &source);
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            tracing::error!(%stage, path = %path.display(), "shader compilation failed: {log}");
            return Err(ShaderError::Compile {
                stage,
                path: path.to_path_buf(),
                log,
            });
        }

        Ok(shader)
    }
}

/// Link a vertex and fragment shader into a program. The shaders are detached
/// but not deleted.
pub fn link(
    gl: &glow::Context,
    vertex: glow::Shader,
    fragment: glow::Shader,
) -> Result<glow::Program, ShaderError> {
    unsafe {
        let program = gl
            .create_program()
            .map_err(|e| ShaderError::Create(format!("program: {e}")))?;
        gl.attach_shader(program, vertex);
        gl.attach_shader(program, fragment);
        gl.link_program(program);
        gl.detach_shader(program, vertex);
        gl.detach_shader(program, fragment);

        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            tracing::error!("shader linking failed: {log}");
            return Err(ShaderError::Link(log));
        }

        Ok(program)
    }
}

fn build_program(
    gl: &glow::Context,
    vertex_path: &Path,
    fragment_path: &Path,
) -> Result<glow::Program, ShaderError> {
    let vertex = compile(gl, ShaderStage::Vertex, vertex_path)?;
    let fragment = match compile(gl, ShaderStage::Fragment, fragment_path) {
        Ok(fragment) => fragment,
        Err(e) => {
            unsafe { gl.delete_shader(vertex) };
            return Err(e);
        }
    };

    let program = link(gl, vertex, fragment);
    unsafe {
        gl.delete_shader(vertex);
        gl.delete_shader(fragment);
    }
    program
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_cycle() {
        let mut tracker = ReloadTracker::default();
        assert_eq!(tracker.state(), ReloadState::Compiled);
        assert!(!tracker.begin());

        tracker.request();
        assert_eq!(tracker.state(), ReloadState::ReloadRequested);
        assert!(tracker.begin());
        assert_eq!(tracker.state(), ReloadState::Recompiling);

        tracker.finish();
        assert_eq!(tracker.state(), ReloadState::Compiled);
        assert!(!tracker.begin());
    }

    #[test]
    fn test_repeated_requests_collapse() {
        let mut tracker = ReloadTracker::default();
        tracker.request();
        tracker.request();
        assert!(tracker.begin());
        assert!(!tracker.begin());
    }

    #[test]
    fn test_request_during_recompile_is_dropped() {
        let mut tracker = ReloadTracker::default();
        tracker.request();
        tracker.begin();
        tracker.request();
        assert_eq!(tracker.state(), ReloadState::Recompiling);
        tracker.finish();
        assert!(!tracker.begin());
    }

    #[test]
    fn test_missing_source_is_read_error() {
        let path = std::env::temp_dir().join("mandelbrot-explorer-missing.glsl");
        let _ = std::fs::remove_file(&path);
        assert!(matches!(read_source(&path), Err(ShaderError::Read { .. })));
    }

    #[test]
    fn test_error_messages() {
        let err = ShaderError::Compile {
            stage: ShaderStage::Fragment,
            path: PathBuf::from("shaders/fragment_shader.glsl"),
            log: "0:12: syntax error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "fragment shader compilation failed (shaders/fragment_shader.glsl): 0:12: syntax error"
        );
        assert_eq!(
            ShaderError::Link("missing main".to_string()).to_string(),
            "shader linking failed: missing main"
        );
    }
}

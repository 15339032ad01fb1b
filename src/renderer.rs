use crate::config::ShaderConfig;
use crate::error::ExplorerError;
use crate::shader::{ReloadTracker, ShaderError, ShaderProgram};
use crate::uniforms::UniformLocations;
use crate::viewport::ViewportState;
use glow::*;
use image::RgbImage;
use std::mem;
use std::sync::Arc;

/// Full-screen quad as a triangle strip, in normalized device coordinates
const QUAD_VERTICES: [f32; 8] = [
    -1.0, -1.0, // bottom-left
    -1.0, 1.0, // top-left
    1.0, -1.0, // bottom-right
    1.0, 1.0, // top-right
];

const PALETTE_TEXTURE_UNIT: u32 = 0;

pub struct Renderer {
    gl: Arc<glow::Context>,
    shader: ShaderProgram,
    uniforms: UniformLocations<UniformLocation>,
    reload: ReloadTracker,
    vao: VertexArray,
    vbo: Buffer,
    palette: Option<Texture>,
    viewport_size: (i32, i32),
}

impl Renderer {
    pub fn new(
        gl: Arc<glow::Context>,
        shaders: &ShaderConfig,
        palette: Option<&RgbImage>,
        width: u32,
        height: u32,
    ) -> Result<Self, ExplorerError> {
        let shader = ShaderProgram::new(gl.clone(), &shaders.vertex, &shaders.fragment)?;

        unsafe {
            let vao = gl
                .create_vertex_array()
                .map_err(|e| ExplorerError::Gl(format!("Failed to create VAO: {}", e)))?;
            gl.bind_vertex_array(Some(vao));

            let vbo = gl
                .create_buffer()
                .map_err(|e| ExplorerError::Gl(format!("Failed to create VBO: {}", e)))?;
            gl.bind_buffer(ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(ARRAY_BUFFER, as_u8_slice(&QUAD_VERTICES), STATIC_DRAW);

            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 2, FLOAT, false, 8, 0);

            gl.bind_vertex_array(None);

            let palette = match palette {
                Some(img) => Some(create_palette_texture(&gl, img)?),
                None => None,
            };

            let uniforms = UniformLocations::fetch(&shader);

            let renderer = Self {
                gl,
                shader,
                uniforms,
                reload: ReloadTracker::default(),
                vao,
                vbo,
                palette,
                viewport_size: (width as i32, height as i32),
            };
            renderer.sync_palette();
            Ok(renderer)
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.viewport_size = (width as i32, height as i32);
            unsafe {
                self.gl.viewport(0, 0, width as i32, height as i32);
            }
        }
    }

    /// Push the viewport to the fractal program.
    pub fn sync_uniforms(&self, viewport: &ViewportState) {
        // The overlay binds its own program while painting
        self.shader.use_program();
        self.uniforms.sync(self.gl.as_ref(), viewport);
    }

    fn sync_palette(&self) {
        self.shader.use_program();
        let unit = self.palette.map(|_| PALETTE_TEXTURE_UNIT as i32);
        self.uniforms.sync_palette(self.gl.as_ref(), unit);
    }

    pub fn request_reload(&mut self) {
        self.reload.request();
    }

    /// Run a pending reload. On success the uniform locations are refetched and
    /// the viewport is re-applied; on failure the previous program stays bound.
    /// Returns whether a reload ran.
    pub fn process_reload(&mut self, viewport: &ViewportState) -> Result<bool, ShaderError> {
        if !self.reload.begin() {
            return Ok(false);
        }

        tracing::info!(state = ?self.reload.state(), "Reloading shaders");
        let result = self.shader.reload();
        self.reload.finish();
        result?;

        self.uniforms = UniformLocations::fetch(&self.shader);
        self.sync_palette();
        self.sync_uniforms(viewport);
        tracing::info!("Shaders reloaded");
        Ok(true)
    }

    pub fn render(&self) {
        puffin::profile_function!();

        unsafe {
            let (width, height) = self.viewport_size;
            self.gl.viewport(0, 0, width, height);
            self.gl.disable(SCISSOR_TEST);
            self.gl.disable(BLEND);

            self.gl.clear_color(0.0, 0.0, 0.0, 1.0);
            self.gl.clear(COLOR_BUFFER_BIT);

            self.shader.use_program();
            if let Some(texture) = self.palette {
                self.gl.active_texture(TEXTURE0 + PALETTE_TEXTURE_UNIT);
                self.gl.bind_texture(TEXTURE_2D, Some(texture));
            }

            self.gl.bind_vertex_array(Some(self.vao));
            self.gl.draw_arrays(TRIANGLE_STRIP, 0, 4);
            self.gl.bind_vertex_array(None);
        }
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_vertex_array(self.vao);
            self.gl.delete_buffer(self.vbo);
            if let Some(texture) = self.palette.take() {
                self.gl.delete_texture(texture);
            }
        }
    }
}

/// Upload the first row of `img` as a `width x 1` lookup texture.
unsafe fn create_palette_texture(
    gl: &glow::Context,
    img: &RgbImage,
) -> Result<Texture, ExplorerError> {
    let row = palette_row(img);

    let texture = gl
        .create_texture()
        .map_err(|e| ExplorerError::Gl(format!("Failed to create palette texture: {}", e)))?;
    gl.bind_texture(TEXTURE_2D, Some(texture));

    gl.tex_parameter_i32(TEXTURE_2D, TEXTURE_MIN_FILTER, LINEAR as i32);
    gl.tex_parameter_i32(TEXTURE_2D, TEXTURE_MAG_FILTER, LINEAR as i32);
    gl.tex_parameter_i32(TEXTURE_2D, TEXTURE_WRAP_S, REPEAT as i32);
    gl.tex_parameter_i32(TEXTURE_2D, TEXTURE_WRAP_T, CLAMP_TO_EDGE as i32);

    // RGB rows are not 4-byte aligned in general
    gl.pixel_store_i32(UNPACK_ALIGNMENT, 1);
    gl.tex_image_2d(
        TEXTURE_2D,
        0,
        RGB8 as i32,
        img.width() as i32,
        1,
        0,
        RGB,
        UNSIGNED_BYTE,
        Some(row),
    );
    gl.pixel_store_i32(UNPACK_ALIGNMENT, 4);

    gl.bind_texture(TEXTURE_2D, None);
    tracing::info!(colors = img.width(), "palette texture uploaded");
    Ok(texture)
}

/// Bytes of the first image row.
fn palette_row(img: &RgbImage) -> &[u8] {
    let row_len = img.width() as usize * 3;
    &img.as_raw()[..row_len.min(img.as_raw().len())]
}

fn as_u8_slice<T>(data: &[T]) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(
            data.as_ptr() as *const u8,
            data.len() * mem::size_of::<T>(),
        )
    }
}

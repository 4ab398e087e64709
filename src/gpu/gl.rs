//! The GL-style function table consumed by the filter pipeline.
//!
//! The crate does not load GL itself. Embedders implement [`GlFunctions`] on top of whatever
//! binding they already own (a `glow` context, an EGL/ANGLE wrapper, a WebGL shim) and hand it to
//! [`crate::Context`]. Every call is context-bound and must happen on the thread that owns the
//! context.

use std::rc::Rc;

/// GL enum values used by this crate.
pub mod consts {
    #![allow(missing_docs)]

    pub const NO_ERROR: u32 = 0;
    pub const INVALID_ENUM: u32 = 0x0500;
    pub const INVALID_VALUE: u32 = 0x0501;
    pub const INVALID_OPERATION: u32 = 0x0502;
    pub const OUT_OF_MEMORY: u32 = 0x0505;

    pub const VERTEX_SHADER: u32 = 0x8B31;
    pub const FRAGMENT_SHADER: u32 = 0x8B30;

    pub const ARRAY_BUFFER: u32 = 0x8892;
    pub const ELEMENT_ARRAY_BUFFER: u32 = 0x8893;
    pub const STATIC_DRAW: u32 = 0x88E4;
    pub const STREAM_DRAW: u32 = 0x88E0;

    pub const FLOAT: u32 = 0x1406;
    pub const UNSIGNED_SHORT: u32 = 0x1403;

    pub const TRIANGLES: u32 = 0x0004;
    pub const TRIANGLE_STRIP: u32 = 0x0005;

    pub const BLEND: u32 = 0x0BE2;
    pub const SCISSOR_TEST: u32 = 0x0C11;
    pub const MULTISAMPLE: u32 = 0x809D;
    pub const FUNC_ADD: u32 = 0x8006;
    pub const ONE: u32 = 1;
    pub const ONE_MINUS_SRC_ALPHA: u32 = 0x0303;

    pub const FRAMEBUFFER: u32 = 0x8D40;
    pub const TEXTURE0: u32 = 0x84C0;
    pub const TEXTURE1: u32 = 0x84C1;
    pub const TEXTURE_2D: u32 = 0x0DE1;
}

/// Raw GL entry points.
///
/// Object handles are `u32` names where `0` means "no object". Attribute and uniform locations
/// are `i32` where `-1` means "not found".
pub trait GlFunctions {
    /// Pop one code from the error queue (`NO_ERROR` when empty).
    fn get_error(&self) -> u32;

    /// Create a shader object of `kind`.
    fn create_shader(&self, kind: u32) -> u32;
    /// Replace the source of `shader`.
    fn shader_source(&self, shader: u32, source: &str);
    /// Compile `shader`.
    fn compile_shader(&self, shader: u32);
    /// Whether the last compile of `shader` succeeded.
    fn get_shader_compile_status(&self, shader: u32) -> bool;
    /// Compiler output for `shader`.
    fn get_shader_info_log(&self, shader: u32) -> String;
    /// Delete `shader`.
    fn delete_shader(&self, shader: u32);

    /// Create a program object.
    fn create_program(&self) -> u32;
    /// Attach `shader` to `program`.
    fn attach_shader(&self, program: u32, shader: u32);
    /// Link `program`.
    fn link_program(&self, program: u32);
    /// Whether the last link of `program` succeeded.
    fn get_program_link_status(&self, program: u32) -> bool;
    /// Linker output for `program`.
    fn get_program_info_log(&self, program: u32) -> String;
    /// Delete `program`.
    fn delete_program(&self, program: u32);
    /// Make `program` current.
    fn use_program(&self, program: u32);

    /// Location of attribute `name` in `program`.
    fn get_attrib_location(&self, program: u32, name: &str) -> i32;
    /// Location of uniform `name` in `program`.
    fn get_uniform_location(&self, program: u32, name: &str) -> i32;

    /// Allocate a buffer name.
    fn gen_buffer(&self) -> u32;
    /// Delete buffer `buffer`.
    fn delete_buffer(&self, buffer: u32);
    /// Bind `buffer` to `target`.
    fn bind_buffer(&self, target: u32, buffer: u32);
    /// Upload float data into the buffer bound at `target`.
    fn buffer_data_f32(&self, target: u32, data: &[f32], usage: u32);
    /// Upload 16-bit index data into the buffer bound at `target`.
    fn buffer_data_u16(&self, target: u32, data: &[u16], usage: u32);

    /// Allocate a vertex array name.
    fn gen_vertex_array(&self) -> u32;
    /// Delete vertex array `array`.
    fn delete_vertex_array(&self, array: u32);
    /// Bind vertex array `array` (`0` unbinds).
    fn bind_vertex_array(&self, array: u32);

    /// Describe attribute `index` inside the bound array buffer. `offset` is in bytes.
    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    );
    /// Enable attribute `index`.
    fn enable_vertex_attrib_array(&self, index: u32);

    /// Set an `int`/`sampler` uniform.
    fn uniform1i(&self, location: i32, x: i32);
    /// Set a `float` uniform.
    fn uniform1f(&self, location: i32, x: f32);
    /// Set a `vec2` uniform.
    fn uniform2f(&self, location: i32, x: f32, y: f32);
    /// Set a `vec3` uniform.
    fn uniform3f(&self, location: i32, x: f32, y: f32, z: f32);
    /// Set a `vec4` uniform.
    fn uniform4f(&self, location: i32, x: f32, y: f32, z: f32, w: f32);
    /// Set a column-major `mat3` uniform.
    fn uniform_matrix3fv(&self, location: i32, value: &[f32; 9]);

    /// Enable capability `cap`.
    fn enable(&self, cap: u32);
    /// Disable capability `cap`.
    fn disable(&self, cap: u32);
    /// Set the blend equation.
    fn blend_equation(&self, mode: u32);
    /// Set the blend factors.
    fn blend_func(&self, src: u32, dst: u32);
    /// Bind `framebuffer` to `target`.
    fn bind_framebuffer(&self, target: u32, framebuffer: u32);
    /// Set the viewport rectangle.
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    /// Select the active texture unit.
    fn active_texture(&self, unit: u32);
    /// Bind `texture` to `target` on the active unit.
    fn bind_texture(&self, target: u32, texture: u32);

    /// Draw `count` vertices from the bound attributes.
    fn draw_arrays(&self, mode: u32, first: i32, count: i32);
    /// Draw `count` indices from the bound element buffer, starting at byte `offset`.
    fn draw_elements(&self, mode: u32, count: i32, index_type: u32, offset: i32);
}

/// Optional hardware features the pipeline adapts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GlCaps {
    /// Vertex array objects are available.
    pub vertex_array_object_support: bool,
    /// `GL_MULTISAMPLE` may be toggled. Some platforms keep MSAA permanently on.
    pub multisample_disable_support: bool,
}

impl Default for GlCaps {
    fn default() -> Self {
        Self {
            vertex_array_object_support: true,
            multisample_disable_support: false,
        }
    }
}

/// A GL function table paired with the capabilities of the context it drives.
#[derive(Clone)]
pub struct GlInterface {
    /// Raw entry points.
    pub functions: Rc<dyn GlFunctions>,
    /// Capabilities of the context.
    pub caps: GlCaps,
}

impl std::fmt::Debug for GlInterface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlInterface")
            .field("functions_ptr", &Rc::as_ptr(&self.functions).cast::<()>())
            .field("caps", &self.caps)
            .finish()
    }
}

// A lost context keeps reporting errors; never spin on it.
const MAX_DRAINED_ERRORS: usize = 32;

/// Drain the GL error queue.
///
/// Returns `true` if no error was pending. Each drained code is logged.
pub fn check_gl_error(gl: &GlInterface) -> bool {
    let mut success = true;
    for _ in 0..MAX_DRAINED_ERRORS {
        let code = gl.functions.get_error();
        if code == consts::NO_ERROR {
            return success;
        }
        success = false;
        tracing::error!("gl error {code:#06x}");
    }
    success
}

/// Activate texture `unit` and bind `texture_id` to `target` on it.
pub fn active_texture(gl: &GlInterface, unit: u32, target: u32, texture_id: u32) {
    gl.functions.active_texture(unit);
    gl.functions.bind_texture(target, texture_id);
}

fn compile_shader(gl: &GlInterface, kind: u32, source: &str) -> u32 {
    let f = &gl.functions;
    let shader = f.create_shader(kind);
    if shader == 0 {
        return 0;
    }
    f.shader_source(shader, source);
    f.compile_shader(shader);
    if !f.get_shader_compile_status(shader) {
        let stage = if kind == consts::VERTEX_SHADER {
            "vertex"
        } else {
            "fragment"
        };
        tracing::warn!(
            stage,
            log = %f.get_shader_info_log(shader),
            "shader compilation failed"
        );
        f.delete_shader(shader);
        return 0;
    }
    shader
}

/// Compile and link a program from GLSL sources.
///
/// Returns `0` on any failure. Intermediate shader objects are always deleted.
pub fn create_gl_program(gl: &GlInterface, vertex: &str, fragment: &str) -> u32 {
    let f = &gl.functions;
    let vertex_shader = compile_shader(gl, consts::VERTEX_SHADER, vertex);
    if vertex_shader == 0 {
        return 0;
    }
    let fragment_shader = compile_shader(gl, consts::FRAGMENT_SHADER, fragment);
    if fragment_shader == 0 {
        f.delete_shader(vertex_shader);
        return 0;
    }

    let program = f.create_program();
    if program != 0 {
        f.attach_shader(program, vertex_shader);
        f.attach_shader(program, fragment_shader);
        f.link_program(program);
    }
    f.delete_shader(vertex_shader);
    f.delete_shader(fragment_shader);
    if program == 0 {
        return 0;
    }
    if !f.get_program_link_status(program) {
        tracing::warn!(log = %f.get_program_info_log(program), "program link failed");
        f.delete_program(program);
        return 0;
    }
    program
}

#[cfg(test)]
#[path = "../../tests/unit/gpu/gl.rs"]
mod tests;

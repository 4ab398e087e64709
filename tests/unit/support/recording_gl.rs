//! Recording GL double shared by unit tests.

use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, HashSet, VecDeque},
    rc::Rc,
};

use crate::gpu::{
    context::{Context, ContextOpts},
    gl::{GlCaps, GlFunctions, consts},
};

/// Every state-mutating call. Queries (errors, locations, statuses, logs) are not recorded.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum GlCall {
    CreateShader(u32),
    ShaderSource(u32),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader(u32, u32),
    LinkProgram(u32),
    DeleteProgram(u32),
    UseProgram(u32),
    GenBuffer(u32),
    DeleteBuffer(u32),
    BindBuffer(u32, u32),
    BufferDataF32 { target: u32, len: usize, usage: u32 },
    BufferDataU16 { target: u32, len: usize, usage: u32 },
    GenVertexArray(u32),
    DeleteVertexArray(u32),
    BindVertexArray(u32),
    VertexAttribPointer {
        index: u32,
        size: i32,
        stride: i32,
        offset: i32,
    },
    EnableVertexAttribArray(u32),
    Uniform1i(i32, i32),
    Uniform1f(i32, f32),
    Uniform2f(i32, f32, f32),
    Uniform3f(i32, f32, f32, f32),
    Uniform4f(i32, [f32; 4]),
    UniformMatrix3fv(i32, [f32; 9]),
    Enable(u32),
    Disable(u32),
    BlendEquation(u32),
    BlendFunc(u32, u32),
    BindFramebuffer(u32, u32),
    Viewport(i32, i32, i32, i32),
    ActiveTexture(u32),
    BindTexture(u32, u32),
    DrawArrays { mode: u32, first: i32, count: i32 },
    DrawElements {
        mode: u32,
        count: i32,
        index_type: u32,
        offset: i32,
    },
}

#[derive(Default)]
pub(crate) struct RecordingGl {
    calls: RefCell<Vec<GlCall>>,
    next_name: Cell<u32>,
    pending_errors: RefCell<VecDeque<u32>>,
    error_queries: Cell<usize>,
    shader_kinds: RefCell<HashMap<u32, u32>>,
    locations: RefCell<HashMap<String, i32>>,
    missing_names: RefCell<HashSet<String>>,
    last_f32_upload: RefCell<Vec<f32>>,
    last_program_sources: RefCell<Vec<String>>,

    pub(crate) fail_compile_kind: Cell<Option<u32>>,
    pub(crate) fail_link: Cell<bool>,
    pub(crate) fail_gen_buffer: Cell<bool>,
    pub(crate) error_after_link: Cell<Option<u32>>,
}

impl RecordingGl {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// A fresh recorder and a context driving it.
    pub(crate) fn context(caps: GlCaps) -> (Rc<Self>, Context) {
        let gl = Self::new();
        let ctx = Context::new(gl.clone(), caps, ContextOpts::default());
        (gl, ctx)
    }

    pub(crate) fn calls(&self) -> Vec<GlCall> {
        self.calls.borrow().clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub(crate) fn count(&self, pred: impl Fn(&GlCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    pub(crate) fn push_error(&self, code: u32) {
        self.pending_errors.borrow_mut().push_back(code);
    }

    pub(crate) fn error_queries(&self) -> usize {
        self.error_queries.get()
    }

    pub(crate) fn hide_location(&self, name: &str) {
        self.missing_names.borrow_mut().insert(name.to_string());
    }

    pub(crate) fn location_of(&self, name: &str) -> i32 {
        self.location(name)
    }

    pub(crate) fn last_f32_upload(&self) -> Vec<f32> {
        self.last_f32_upload.borrow().clone()
    }

    /// Sources passed to `shader_source`, in call order.
    pub(crate) fn sources(&self) -> Vec<String> {
        self.last_program_sources.borrow().clone()
    }

    fn record(&self, call: GlCall) {
        self.calls.borrow_mut().push(call);
    }

    fn next(&self) -> u32 {
        let n = self.next_name.get() + 1;
        self.next_name.set(n);
        n
    }

    fn location(&self, name: &str) -> i32 {
        if self.missing_names.borrow().contains(name) {
            return -1;
        }
        let mut locations = self.locations.borrow_mut();
        let next = locations.len() as i32;
        *locations.entry(name.to_string()).or_insert(next)
    }
}

impl GlFunctions for RecordingGl {
    fn get_error(&self) -> u32 {
        self.error_queries.set(self.error_queries.get() + 1);
        self.pending_errors
            .borrow_mut()
            .pop_front()
            .unwrap_or(consts::NO_ERROR)
    }

    fn create_shader(&self, kind: u32) -> u32 {
        let name = self.next();
        self.shader_kinds.borrow_mut().insert(name, kind);
        self.record(GlCall::CreateShader(name));
        name
    }

    fn shader_source(&self, shader: u32, source: &str) {
        self.last_program_sources
            .borrow_mut()
            .push(source.to_string());
        self.record(GlCall::ShaderSource(shader));
    }

    fn compile_shader(&self, shader: u32) {
        self.record(GlCall::CompileShader(shader));
    }

    fn get_shader_compile_status(&self, shader: u32) -> bool {
        let kind = self.shader_kinds.borrow().get(&shader).copied();
        kind.is_none() || kind != self.fail_compile_kind.get()
    }

    fn get_shader_info_log(&self, _shader: u32) -> String {
        "ERROR: 0:1: syntax error".to_string()
    }

    fn delete_shader(&self, shader: u32) {
        self.record(GlCall::DeleteShader(shader));
    }

    fn create_program(&self) -> u32 {
        let name = self.next();
        self.record(GlCall::CreateProgram(name));
        name
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        self.record(GlCall::AttachShader(program, shader));
    }

    fn link_program(&self, program: u32) {
        self.record(GlCall::LinkProgram(program));
        if let Some(code) = self.error_after_link.get() {
            self.push_error(code);
        }
    }

    fn get_program_link_status(&self, _program: u32) -> bool {
        !self.fail_link.get()
    }

    fn get_program_info_log(&self, _program: u32) -> String {
        "link failed".to_string()
    }

    fn delete_program(&self, program: u32) {
        self.record(GlCall::DeleteProgram(program));
    }

    fn use_program(&self, program: u32) {
        self.record(GlCall::UseProgram(program));
    }

    fn get_attrib_location(&self, _program: u32, name: &str) -> i32 {
        self.location(name)
    }

    fn get_uniform_location(&self, _program: u32, name: &str) -> i32 {
        self.location(name)
    }

    fn gen_buffer(&self) -> u32 {
        if self.fail_gen_buffer.get() {
            return 0;
        }
        let name = self.next();
        self.record(GlCall::GenBuffer(name));
        name
    }

    fn delete_buffer(&self, buffer: u32) {
        self.record(GlCall::DeleteBuffer(buffer));
    }

    fn bind_buffer(&self, target: u32, buffer: u32) {
        self.record(GlCall::BindBuffer(target, buffer));
    }

    fn buffer_data_f32(&self, target: u32, data: &[f32], usage: u32) {
        *self.last_f32_upload.borrow_mut() = data.to_vec();
        self.record(GlCall::BufferDataF32 {
            target,
            len: data.len(),
            usage,
        });
    }

    fn buffer_data_u16(&self, target: u32, data: &[u16], usage: u32) {
        self.record(GlCall::BufferDataU16 {
            target,
            len: data.len(),
            usage,
        });
    }

    fn gen_vertex_array(&self) -> u32 {
        let name = self.next();
        self.record(GlCall::GenVertexArray(name));
        name
    }

    fn delete_vertex_array(&self, array: u32) {
        self.record(GlCall::DeleteVertexArray(array));
    }

    fn bind_vertex_array(&self, array: u32) {
        self.record(GlCall::BindVertexArray(array));
    }

    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: i32,
        _data_type: u32,
        _normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        self.record(GlCall::VertexAttribPointer {
            index,
            size,
            stride,
            offset,
        });
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(GlCall::EnableVertexAttribArray(index));
    }

    fn uniform1i(&self, location: i32, x: i32) {
        self.record(GlCall::Uniform1i(location, x));
    }

    fn uniform1f(&self, location: i32, x: f32) {
        self.record(GlCall::Uniform1f(location, x));
    }

    fn uniform2f(&self, location: i32, x: f32, y: f32) {
        self.record(GlCall::Uniform2f(location, x, y));
    }

    fn uniform3f(&self, location: i32, x: f32, y: f32, z: f32) {
        self.record(GlCall::Uniform3f(location, x, y, z));
    }

    fn uniform4f(&self, location: i32, x: f32, y: f32, z: f32, w: f32) {
        self.record(GlCall::Uniform4f(location, [x, y, z, w]));
    }

    fn uniform_matrix3fv(&self, location: i32, value: &[f32; 9]) {
        self.record(GlCall::UniformMatrix3fv(location, *value));
    }

    fn enable(&self, cap: u32) {
        self.record(GlCall::Enable(cap));
    }

    fn disable(&self, cap: u32) {
        self.record(GlCall::Disable(cap));
    }

    fn blend_equation(&self, mode: u32) {
        self.record(GlCall::BlendEquation(mode));
    }

    fn blend_func(&self, src: u32, dst: u32) {
        self.record(GlCall::BlendFunc(src, dst));
    }

    fn bind_framebuffer(&self, target: u32, framebuffer: u32) {
        self.record(GlCall::BindFramebuffer(target, framebuffer));
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GlCall::Viewport(x, y, width, height));
    }

    fn active_texture(&self, unit: u32) {
        self.record(GlCall::ActiveTexture(unit));
    }

    fn bind_texture(&self, target: u32, texture: u32) {
        self.record(GlCall::BindTexture(target, texture));
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        self.record(GlCall::DrawArrays { mode, first, count });
    }

    fn draw_elements(&self, mode: u32, count: i32, index_type: u32, offset: i32) {
        self.record(GlCall::DrawElements {
            mode,
            count,
            index_type,
            offset,
        });
    }
}

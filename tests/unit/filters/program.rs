use super::*;
use crate::gpu::{
    gl::{GlCaps, consts},
    recording_gl::{GlCall, RecordingGl},
};

const VS: &str = "void main() { gl_Position = vec4(0.0); }";
const FS: &str = "void main() { gl_FragColor = vec4(1.0); }";

fn caps(vao: bool) -> GlCaps {
    GlCaps {
        vertex_array_object_support: vao,
        ..GlCaps::default()
    }
}

#[test]
fn allocates_vertex_array_only_when_supported() {
    let (gl, ctx) = RecordingGl::context(caps(true));
    let program = FilterProgram::make(&ctx, VS, FS).unwrap();
    assert_ne!(program.program(), 0);
    assert_ne!(program.vertex_array(), 0);
    assert_ne!(program.vertex_buffer(), 0);
    assert_eq!(gl.count(|c| matches!(c, GlCall::GenVertexArray(_))), 1);

    let (gl, ctx) = RecordingGl::context(caps(false));
    let program = FilterProgram::make(&ctx, VS, FS).unwrap();
    assert_eq!(program.vertex_array(), 0);
    assert_ne!(program.vertex_buffer(), 0);
    assert_eq!(gl.count(|c| matches!(c, GlCall::GenVertexArray(_))), 0);
}

#[test]
fn compile_failure_allocates_nothing_else() {
    let (gl, ctx) = RecordingGl::context(caps(true));
    gl.fail_compile_kind.set(Some(consts::FRAGMENT_SHADER));
    let err = FilterProgram::make(&ctx, VS, "broken").unwrap_err();
    assert!(matches!(err, WavyteError::Compile(_)));
    assert_eq!(gl.count(|c| matches!(c, GlCall::GenVertexArray(_))), 0);
    assert_eq!(gl.count(|c| matches!(c, GlCall::GenBuffer(_))), 0);
    assert_eq!(ctx.stats().resources, 0);
}

#[test]
fn buffer_failure_deletes_partial_objects() {
    let (gl, ctx) = RecordingGl::context(caps(true));
    gl.fail_gen_buffer.set(true);
    let err = FilterProgram::make(&ctx, VS, FS).unwrap_err();
    assert!(matches!(err, WavyteError::Gpu(_)));
    assert_eq!(gl.count(|c| matches!(c, GlCall::DeleteProgram(_))), 1);
    assert_eq!(gl.count(|c| matches!(c, GlCall::DeleteVertexArray(_))), 1);
}

#[test]
fn release_twice_deletes_each_object_once() {
    let (gl, ctx) = RecordingGl::context(caps(true));
    let program = FilterProgram::make(&ctx, VS, FS).unwrap();
    program.on_release(ctx.gl());
    program.on_release(ctx.gl());
    assert_eq!(program.program(), 0);
    assert_eq!(program.vertex_array(), 0);
    assert_eq!(program.vertex_buffer(), 0);

    drop(ctx);
    assert_eq!(gl.count(|c| matches!(c, GlCall::DeleteProgram(_))), 1);
    assert_eq!(gl.count(|c| matches!(c, GlCall::DeleteVertexArray(_))), 1);
    assert_eq!(gl.count(|c| matches!(c, GlCall::DeleteBuffer(_))), 1);
}

#[test]
fn release_without_vertex_array_skips_its_deletion() {
    let (gl, ctx) = RecordingGl::context(caps(false));
    let program = FilterProgram::make(&ctx, VS, FS).unwrap();
    program.on_release(ctx.gl());
    assert_eq!(gl.count(|c| matches!(c, GlCall::DeleteVertexArray(_))), 0);
    assert_eq!(gl.count(|c| matches!(c, GlCall::DeleteBuffer(_))), 1);
}

#[test]
fn shared_programs_compile_once_per_source_pair() {
    let (gl, ctx) = RecordingGl::context(caps(true));
    let a = FilterProgram::make_shared(&ctx, VS, FS).unwrap();
    let b = FilterProgram::make_shared(&ctx, VS, FS).unwrap();
    assert!(Rc::ptr_eq(&a, &b));
    assert_eq!(gl.count(|c| matches!(c, GlCall::LinkProgram(_))), 1);

    let c = FilterProgram::make_shared(&ctx, VS, "void main() {}").unwrap();
    assert!(!Rc::ptr_eq(&a, &c));
    assert_eq!(gl.count(|c| matches!(c, GlCall::LinkProgram(_))), 2);
}

#[test]
fn shared_key_separates_source_boundaries() {
    assert_ne!(shared_key("ab", "c"), shared_key("a", "bc"));
    assert_eq!(shared_key(VS, FS), shared_key(VS, FS));
}

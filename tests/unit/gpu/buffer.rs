use super::*;
use crate::gpu::{
    gl::GlCaps,
    recording_gl::{GlCall, RecordingGl},
};

static INDICES: [u16; 6] = [0, 1, 2, 2, 1, 3];

fn key_for(data: Option<&[u16]>, length: usize) -> RecycleKey {
    let mut key = RecycleKey::new();
    compute_recycle_key(&mut key, data.map(|d| d.as_ptr() as usize), length);
    key
}

#[test]
fn same_data_and_length_share_a_key() {
    let full = key_for(Some(&INDICES[..]), 6);
    assert_eq!(full, key_for(Some(&INDICES[..]), 6));
    assert_ne!(full, key_for(Some(&INDICES[..]), 3));
}

#[test]
fn absent_data_yields_kind_only_key() {
    let expected = RecycleKey::of_type(*BUFFER_TYPE);
    assert_eq!(key_for(None, 6), expected);
    assert_eq!(key_for(None, 4096), expected);
}

#[test]
fn instance_key_matches_construction_key() {
    let (_gl, ctx) = RecordingGl::context(GlCaps::default());
    let buffer = GlBuffer::make(&ctx, Some(&INDICES[..]), 6).unwrap();
    let mut key = RecycleKey::new();
    buffer.compute_recycle_key(&mut key);
    assert_eq!(key, key_for(Some(&INDICES[..]), 6));
}

#[test]
fn static_data_is_uploaded_once_and_recycled() {
    let (gl, ctx) = RecordingGl::context(GlCaps::default());
    let first = GlBuffer::make(&ctx, Some(&INDICES[..]), 6).unwrap();
    let id = first.buffer_id();
    assert_eq!(
        gl.count(|c| matches!(
            c,
            GlCall::BufferDataU16 {
                target: consts::ELEMENT_ARRAY_BUFFER,
                len: 6,
                usage: consts::STATIC_DRAW
            }
        )),
        1
    );
    drop(first);

    let second = GlBuffer::make(&ctx, Some(&INDICES[..]), 6).unwrap();
    assert_eq!(second.buffer_id(), id);
    assert_eq!(gl.count(|c| matches!(c, GlCall::GenBuffer(_))), 1);
    assert_eq!(gl.count(|c| matches!(c, GlCall::BufferDataU16 { .. })), 1);
}

#[test]
fn referenced_buffers_are_not_handed_out_twice() {
    let (gl, ctx) = RecordingGl::context(GlCaps::default());
    let a = GlBuffer::make(&ctx, None, 16).unwrap();
    let b = GlBuffer::make(&ctx, None, 16).unwrap();
    assert_ne!(a.buffer_id(), b.buffer_id());
    assert_eq!(gl.count(|c| matches!(c, GlCall::GenBuffer(_))), 2);
    assert_eq!(gl.count(|c| matches!(c, GlCall::BufferDataU16 { .. })), 0);
}

#[test]
fn release_is_idempotent() {
    let (gl, ctx) = RecordingGl::context(GlCaps::default());
    let buffer = GlBuffer::make(&ctx, None, 4).unwrap();
    buffer.on_release(ctx.gl());
    buffer.on_release(ctx.gl());
    assert_eq!(buffer.buffer_id(), 0);
    assert_eq!(gl.count(|c| matches!(c, GlCall::DeleteBuffer(_))), 1);

    drop(buffer);
    drop(ctx);
    assert_eq!(gl.count(|c| matches!(c, GlCall::DeleteBuffer(_))), 1);
}

#[test]
fn zero_handle_is_an_error() {
    let (gl, ctx) = RecordingGl::context(GlCaps::default());
    gl.fail_gen_buffer.set(true);
    let err = GlBuffer::make(&ctx, None, 4).unwrap_err();
    assert!(matches!(err, WavyteError::Gpu(_)));
    assert_eq!(ctx.stats().resources, 0);
}

#[test]
fn short_data_is_rejected() {
    let (_gl, ctx) = RecordingGl::context(GlCaps::default());
    let err = GlBuffer::make(&ctx, Some(&INDICES[..]), 7).unwrap_err();
    assert!(matches!(err, WavyteError::Validation(_)));
}

static OTHER_INDICES: [u16; 6] = [9, 9, 9, 9, 9, 9];

#[test]
fn distinct_tables_get_their_own_upload() {
    let (gl, ctx) = RecordingGl::context(GlCaps::default());
    let first = GlBuffer::make(&ctx, Some(&INDICES[..]), 6).unwrap();
    let first_id = first.buffer_id();
    drop(first);

    // Leaked data lives for the rest of the process, so its address is never handed out again.
    let leaked: &'static [u16] = Vec::from(OTHER_INDICES).leak();
    let second = GlBuffer::make(&ctx, Some(leaked), 6).unwrap();
    let third = GlBuffer::make(&ctx, Some(&OTHER_INDICES[..]), 6).unwrap();

    assert_ne!(second.buffer_id(), first_id);
    assert_ne!(third.buffer_id(), second.buffer_id());
    assert_eq!(gl.count(|c| matches!(c, GlCall::BufferDataU16 { .. })), 3);
}

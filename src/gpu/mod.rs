pub(crate) mod buffer;
pub(crate) mod context;
pub(crate) mod geometry_processor;
pub mod gl;
pub(crate) mod rect_drawer;
pub(crate) mod resource_cache;
pub(crate) mod resource_key;
pub(crate) mod shader_builder;

#[cfg(test)]
#[path = "../../tests/unit/support/recording_gl.rs"]
pub(crate) mod recording_gl;

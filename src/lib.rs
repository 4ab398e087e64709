//! `wavyte-fx` runs layer effects as GPU filters over offscreen textures.
//!
//! An effect or layer-style descriptor is dispatched to a concrete filter, the filter compiles
//! (or reuses) its program against a [`Context`], and each frame it is updated with the layer's
//! bounds and drawn from a source texture into a target framebuffer as one full-screen quad.
//!
//! # Pipeline overview
//!
//! 1. **Dispatch**: [`LayerFilter::from_effect`] / [`LayerFilter::from_layer_style`]
//! 2. **Initialize**: [`LayerFilter::initialize`] compiles and links through the context cache
//! 3. **Update**: [`LayerFilter::update`] records frame, content bounds, output bounds and scale
//! 4. **Draw**: [`LayerFilter::draw`] binds state, uploads the quad and issues the draw
//!
//! The crate never loads GL itself: embedders implement [`GlFunctions`] over the binding they
//! already use. Everything is single-threaded and bound to the thread owning the GL context.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod filters;
mod foundation;
mod gpu;

pub use filters::descriptor::{Effect, EffectType, LayerStyle, LayerStyleType, params_or_default};
pub use filters::layer_filter::{
    FRAGMENT_SHADER, FilterHooks, FilterPhase, LayerFilter, VERTEX_SHADER,
};
pub use filters::program::FilterProgram;
pub use filters::variants::{
    bulge::BulgeParams,
    corner_pin::CornerPinParams,
    displacement_map::{DisplacementChannel, DisplacementMapParams},
    drop_shadow::DropShadowParams,
    gauss_blur::{BlurDimensions, GaussBlurParams},
    glow::GlowParams,
    levels_individual::{ChannelLevels, LevelsIndividualParams},
    mosaic::MosaicParams,
    motion_tile::MotionTileParams,
    radial_blur::{RadialBlurMode, RadialBlurParams},
};
pub use filters::vertices::{
    FilterSource, FilterTarget, compute_vertices, compute_vertices_for_motion_blur_and_bulge,
    to_gl_texture_point, to_gl_vertex_point,
};
pub use foundation::core::{
    Affine, Color, FrameIndex, MAT3_IDENTITY, Mat3, Point, Rect, Vec2, mat3_from_affine,
};
pub use foundation::error::{WavyteError, WavyteResult};
pub use foundation::ids::UniqueId;
pub use gpu::buffer::GlBuffer;
pub use gpu::context::{Context, ContextOpts};
pub use gpu::gl::{
    GlCaps, GlFunctions, GlInterface, active_texture, check_gl_error, consts, create_gl_program,
};
pub use gpu::rect_drawer::RectDrawer;
pub use gpu::resource_cache::{Resource, ResourceCacheOpts, ResourceCacheStats};
pub use gpu::resource_key::RecycleKey;

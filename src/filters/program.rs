use std::{cell::Cell, rc::Rc, sync::LazyLock};

use xxhash_rust::xxh3::Xxh3;

use crate::{
    foundation::{
        error::{WavyteError, WavyteResult},
        ids::UniqueId,
    },
    gpu::{
        context::Context,
        gl::{GlInterface, create_gl_program},
        resource_cache::Resource,
        resource_key::RecycleKey,
    },
};

static FILTER_PROGRAM_TYPE: LazyLock<UniqueId> = LazyLock::new(UniqueId::next);

const XXH3_SEED: u64 = 0x5f3c_19a7_e2d4_6b81;

/// Unique key of the program compiled from `vertex` and `fragment`.
fn shared_key(vertex: &str, fragment: &str) -> RecycleKey {
    let mut h = Xxh3::with_seed(XXH3_SEED);
    h.update(&(vertex.len() as u64).to_le_bytes());
    h.update(vertex.as_bytes());
    h.update(fragment.as_bytes());
    let digest = h.digest128();

    let mut key = RecycleKey::of_type(*FILTER_PROGRAM_TYPE);
    key.write_u64((digest >> 64) as u64);
    key.write_u64(digest as u64);
    key
}

/// A linked filter program with its vertex array and vertex buffer.
///
/// Handles are zero once released. The vertex array is zero when the context lacks VAO support.
#[derive(Debug)]
pub struct FilterProgram {
    program: Cell<u32>,
    vertex_array: Cell<u32>,
    vertex_buffer: Cell<u32>,
}

impl FilterProgram {
    /// Compile `vertex`/`fragment` into a program owned by the caller.
    ///
    /// Nothing else is allocated when compilation or linking fails.
    #[tracing::instrument(skip_all)]
    pub fn make(context: &Context, vertex: &str, fragment: &str) -> WavyteResult<Rc<Self>> {
        let program = Self::create(context.gl(), vertex, fragment)?;
        context.wrap(program)
    }

    /// Like [`FilterProgram::make`], but programs with identical sources are shared through the
    /// context cache.
    #[tracing::instrument(skip_all)]
    pub fn make_shared(context: &Context, vertex: &str, fragment: &str) -> WavyteResult<Rc<Self>> {
        let key = shared_key(vertex, fragment);
        if let Some(program) = context.find_unique::<Self>(&key)
            && program.program() > 0
        {
            tracing::trace!(program = program.program(), "reusing shared filter program");
            return Ok(program);
        }
        let program = Self::create(context.gl(), vertex, fragment)?;
        context.wrap_unique(program, key)
    }

    fn create(gl: &GlInterface, vertex: &str, fragment: &str) -> WavyteResult<Self> {
        let program = create_gl_program(gl, vertex, fragment);
        if program == 0 {
            return Err(WavyteError::compile(
                "filter program failed to compile or link",
            ));
        }
        let created = Self {
            program: Cell::new(program),
            vertex_array: Cell::new(0),
            vertex_buffer: Cell::new(0),
        };

        let f = &gl.functions;
        if gl.caps.vertex_array_object_support {
            created.vertex_array.set(f.gen_vertex_array());
            if created.vertex_array.get() == 0 {
                created.on_release(gl);
                return Err(WavyteError::gpu("glGenVertexArrays returned 0"));
            }
        }
        created.vertex_buffer.set(f.gen_buffer());
        if created.vertex_buffer.get() == 0 {
            created.on_release(gl);
            return Err(WavyteError::gpu("glGenBuffers returned 0"));
        }
        Ok(created)
    }

    /// GL program name.
    pub fn program(&self) -> u32 {
        self.program.get()
    }

    /// Vertex array name, `0` when VAOs are unsupported.
    pub fn vertex_array(&self) -> u32 {
        self.vertex_array.get()
    }

    /// Streaming vertex buffer name.
    pub fn vertex_buffer(&self) -> u32 {
        self.vertex_buffer.get()
    }
}

impl Resource for FilterProgram {
    fn on_release(&self, gl: &GlInterface) {
        let f = &gl.functions;
        let program = self.program.replace(0);
        if program > 0 {
            f.delete_program(program);
        }
        let vertex_array = self.vertex_array.replace(0);
        if vertex_array > 0 {
            f.delete_vertex_array(vertex_array);
        }
        let vertex_buffer = self.vertex_buffer.replace(0);
        if vertex_buffer > 0 {
            f.delete_buffer(vertex_buffer);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/filters/program.rs"]
mod tests;

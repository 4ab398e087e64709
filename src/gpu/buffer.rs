use std::{cell::Cell, rc::Rc, sync::LazyLock};

use crate::{
    foundation::{
        error::{WavyteError, WavyteResult},
        ids::UniqueId,
    },
    gpu::{
        context::Context,
        gl::{GlInterface, consts},
        resource_cache::Resource,
        resource_key::RecycleKey,
    },
};

static BUFFER_TYPE: LazyLock<UniqueId> = LazyLock::new(UniqueId::next);

fn compute_recycle_key(key: &mut RecycleKey, identity: Option<usize>, length: usize) {
    key.write_u32(BUFFER_TYPE.as_u32());
    if let Some(addr) = identity {
        key.write_usize(addr);
        key.write_u32(length as u32);
    }
}

/// A GL element-array buffer of 16-bit indices.
///
/// Buffers made from a data slice are addressed by the slice's address and length. Only `'static`
/// data is accepted there, so an address can never be reused by different indices. Buffers made
/// without data are anonymous and fill a per-kind reuse pool.
#[derive(Debug)]
pub struct GlBuffer {
    buffer_id: Cell<u32>,
    length: usize,
    identity: Option<usize>,
}

impl GlBuffer {
    /// Return a recycled buffer matching `data`/`length` or allocate a new one.
    ///
    /// A recycled hit is returned as-is without re-uploading.
    pub fn make(
        context: &Context,
        data: Option<&'static [u16]>,
        length: usize,
    ) -> WavyteResult<Rc<Self>> {
        if let Some(data) = data
            && data.len() < length
        {
            return Err(WavyteError::validation(format!(
                "buffer data holds {} indices, {length} requested",
                data.len()
            )));
        }

        let identity = data.map(|d| d.as_ptr() as usize);
        let mut key = RecycleKey::new();
        compute_recycle_key(&mut key, identity, length);
        if let Some(recycled) = context.get_recycled::<Self>(&key) {
            return Ok(recycled);
        }

        let f = &context.gl().functions;
        let buffer_id = f.gen_buffer();
        if buffer_id == 0 {
            return Err(WavyteError::gpu("glGenBuffers returned 0"));
        }
        if let Some(data) = data {
            f.bind_buffer(consts::ELEMENT_ARRAY_BUFFER, buffer_id);
            f.buffer_data_u16(
                consts::ELEMENT_ARRAY_BUFFER,
                &data[..length],
                consts::STATIC_DRAW,
            );
            f.bind_buffer(consts::ELEMENT_ARRAY_BUFFER, 0);
        }
        context.wrap(Self {
            buffer_id: Cell::new(buffer_id),
            length,
            identity,
        })
    }

    /// The GL buffer name, `0` once released.
    pub fn buffer_id(&self) -> u32 {
        self.buffer_id.get()
    }

    /// Number of 16-bit indices.
    pub fn length(&self) -> usize {
        self.length
    }
}

impl Resource for GlBuffer {
    fn memory_usage(&self) -> usize {
        self.length * std::mem::size_of::<u16>()
    }

    fn compute_recycle_key(&self, key: &mut RecycleKey) {
        compute_recycle_key(key, self.identity, self.length);
    }

    fn on_release(&self, gl: &GlInterface) {
        let id = self.buffer_id.replace(0);
        if id > 0 {
            gl.functions.delete_buffer(id);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gpu/buffer.rs"]
mod tests;

use std::sync::Arc;

use anyhow::Context;
use vulkano::{
    buffer::{Buffer, BufferContents, BufferCreateInfo, BufferUsage, Subbuffer},
    memory::allocator::{AllocationCreateInfo, MemoryAllocator, MemoryTypeFilter},
};

pub struct MeshBuilder<V> {
    vertices: Option<Vec<V>>,
    indices: Option<Vec<u16>>,
}

impl<V> Default for MeshBuilder<V> {
    fn default() -> Self {
        MeshBuilder {
            vertices: None,
            indices: None,
        }
    }
}

impl<V: BufferContents> MeshBuilder<V> {
    pub fn with_vertices(mut self, value: Vec<V>) -> Self {
        self.vertices = Some(value);
        self
    }

    pub fn with_indices(mut self, value: Vec<u16>) -> Self {
        self.indices = Some(value);
        self
    }

    /// Uploads the vertices, and the indices if any were given.
    pub fn build(self, memory_allocator: Arc<dyn MemoryAllocator>) -> anyhow::Result<Mesh<V>> {
        let vertices = self.vertices.unwrap_or_default();

        let vertex_buffer = Buffer::from_iter(
            memory_allocator.clone(),
            BufferCreateInfo {
                usage: BufferUsage::VERTEX_BUFFER,
                ..Default::default()
            },
            upload_allocation(),
            vertices,
        )
        .context("creating vertex buffer")?;

        let index_buffer = match self.indices {
            Some(indices) => Some(
                Buffer::from_iter(
                    memory_allocator,
                    BufferCreateInfo {
                        usage: BufferUsage::INDEX_BUFFER,
                        ..Default::default()
                    },
                    upload_allocation(),
                    indices,
                )
                .context("creating index buffer")?,
            ),
            None => None,
        };

        Ok(Mesh {
            vertex_buffer,
            index_buffer,
        })
    }
}

pub struct Mesh<V> {
    pub vertex_buffer: Subbuffer<[V]>,
    pub index_buffer: Option<Subbuffer<[u16]>>,
}

pub fn upload_allocation() -> AllocationCreateInfo {
    AllocationCreateInfo {
        memory_type_filter: MemoryTypeFilter::PREFER_DEVICE
            | MemoryTypeFilter::HOST_SEQUENTIAL_WRITE,
        ..Default::default()
    }
}

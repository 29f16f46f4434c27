//! Per-instance vertex data for the instanced box draw

use bytemuck::{Pod, Zeroable};

use crate::scene::FlatInstance;

/// One box instance as the vertex shader sees it (locations 2..=7)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct InstanceRaw {
    /// Unit cube to world, column-major
    pub model: [[f32; 4]; 4],
    /// World rotation quaternion (x, y, z, w) for normals
    pub rotation: [f32; 4],
    /// Linear RGB, alpha unused
    pub color: [f32; 4],
}

impl InstanceRaw {
    const ATTRIBUTES: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

impl From<&FlatInstance> for InstanceRaw {
    fn from(f: &FlatInstance) -> Self {
        let [r, g, b] = f.color;
        Self {
            model: f.model.to_cols_array_2d(),
            rotation: f.rotation.to_array(),
            color: [r, g, b, 1.0],
        }
    }
}

/// Smallest allocation, in instances
const MIN_CAPACITY: usize = 256;

/// Capacity needed for `count` instances: next power of two, at least
/// [`MIN_CAPACITY`].
pub fn grown_capacity(count: usize) -> usize {
    count.max(MIN_CAPACITY).next_power_of_two()
}

/// Growable GPU vertex buffer of [`InstanceRaw`]
pub struct InstanceBuffer {
    buffer: wgpu::Buffer,
    capacity: usize,
    len: u32,
}

impl InstanceBuffer {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            buffer: Self::allocate(device, MIN_CAPACITY),
            capacity: MIN_CAPACITY,
            len: 0,
        }
    }

    fn allocate(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (capacity * std::mem::size_of::<InstanceRaw>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Replace the contents with `instances`, reallocating when they don't fit.
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, instances: &[FlatInstance]) {
        if instances.len() > self.capacity {
            let capacity = grown_capacity(instances.len());
            log::debug!("Growing instance buffer: {} -> {} instances", self.capacity, capacity);
            self.buffer = Self::allocate(device, capacity);
            self.capacity = capacity;
        }

        let raw: Vec<InstanceRaw> = instances.iter().map(InstanceRaw::from).collect();
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&raw));
        self.len = raw.len() as u32;
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Instances written by the last upload
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

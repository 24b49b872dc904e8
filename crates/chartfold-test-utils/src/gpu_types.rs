//! GPU resource wrappers that can be real or mock.
//!
//! Each wrapper hides whether it holds a live `wgpu` object or a mock record.
//! Code that needs the raw handle (command encoding) calls `as_wgpu()`, which
//! panics on mocks; mocks never reach an encoder in tests.

/// A storage, uniform or vertex buffer.
#[derive(Clone, Debug)]
pub struct GpuBuffer {
    inner: GpuBufferInner,
}

#[derive(Clone, Debug)]
enum GpuBufferInner {
    Real(wgpu::Buffer),
    #[cfg(feature = "mock")]
    Mock { id: usize, size: u64 },
}

impl GpuBuffer {
    /// Wrap a real buffer.
    pub fn from_wgpu(buffer: wgpu::Buffer) -> Self {
        Self {
            inner: GpuBufferInner::Real(buffer),
        }
    }

    /// Create a mock buffer record.
    #[cfg(feature = "mock")]
    pub fn mock(id: usize, size: u64) -> Self {
        Self {
            inner: GpuBufferInner::Mock { id, size },
        }
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        match &self.inner {
            GpuBufferInner::Real(buffer) => buffer.size(),
            #[cfg(feature = "mock")]
            GpuBufferInner::Mock { size, .. } => *size,
        }
    }

    /// Get the underlying `wgpu::Buffer`.
    ///
    /// # Panics
    /// Panics on a mock buffer.
    pub fn as_wgpu(&self) -> &wgpu::Buffer {
        match &self.inner {
            GpuBufferInner::Real(buffer) => buffer,
            #[cfg(feature = "mock")]
            GpuBufferInner::Mock { .. } => {
                panic!("Attempted to get wgpu::Buffer from mock buffer")
            }
        }
    }

    #[cfg(feature = "mock")]
    pub fn is_mock(&self) -> bool {
        matches!(self.inner, GpuBufferInner::Mock { .. })
    }

    #[cfg(feature = "mock")]
    pub fn mock_id(&self) -> Option<usize> {
        match &self.inner {
            GpuBufferInner::Mock { id, .. } => Some(*id),
            _ => None,
        }
    }
}

/// A 2D texture (off-screen targets and headless outputs).
#[derive(Clone, Debug)]
pub struct GpuTexture {
    inner: GpuTextureInner,
}

#[derive(Clone, Debug)]
enum GpuTextureInner {
    Real(wgpu::Texture),
    #[cfg(feature = "mock")]
    Mock {
        id: usize,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    },
}

impl GpuTexture {
    /// Wrap a real texture.
    pub fn from_wgpu(texture: wgpu::Texture) -> Self {
        Self {
            inner: GpuTextureInner::Real(texture),
        }
    }

    /// Create a mock texture record.
    #[cfg(feature = "mock")]
    pub fn mock(id: usize, width: u32, height: u32, format: wgpu::TextureFormat) -> Self {
        Self {
            inner: GpuTextureInner::Mock {
                id,
                width,
                height,
                format,
            },
        }
    }

    pub fn width(&self) -> u32 {
        match &self.inner {
            GpuTextureInner::Real(texture) => texture.width(),
            #[cfg(feature = "mock")]
            GpuTextureInner::Mock { width, .. } => *width,
        }
    }

    pub fn height(&self) -> u32 {
        match &self.inner {
            GpuTextureInner::Real(texture) => texture.height(),
            #[cfg(feature = "mock")]
            GpuTextureInner::Mock { height, .. } => *height,
        }
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        match &self.inner {
            GpuTextureInner::Real(texture) => texture.format(),
            #[cfg(feature = "mock")]
            GpuTextureInner::Mock { format, .. } => *format,
        }
    }

    /// Get the underlying `wgpu::Texture`.
    ///
    /// # Panics
    /// Panics on a mock texture.
    pub fn as_wgpu(&self) -> &wgpu::Texture {
        match &self.inner {
            GpuTextureInner::Real(texture) => texture,
            #[cfg(feature = "mock")]
            GpuTextureInner::Mock { .. } => {
                panic!("Attempted to get wgpu::Texture from mock texture")
            }
        }
    }

    #[cfg(feature = "mock")]
    pub fn is_mock(&self) -> bool {
        matches!(self.inner, GpuTextureInner::Mock { .. })
    }

    #[cfg(feature = "mock")]
    pub fn mock_id(&self) -> Option<usize> {
        match &self.inner {
            GpuTextureInner::Mock { id, .. } => Some(*id),
            _ => None,
        }
    }
}

/// Declares an opaque wrapper for a handle that carries no queryable state.
macro_rules! opaque_wrapper {
    ($(#[$meta:meta])* $name:ident, $inner:ident, $wgpu:ty) => {
        $(#[$meta])*
        #[derive(Clone, Debug)]
        pub struct $name {
            inner: $inner,
        }

        #[derive(Clone, Debug)]
        enum $inner {
            Real($wgpu),
            #[cfg(feature = "mock")]
            Mock { id: usize },
        }

        impl $name {
            pub fn from_wgpu(handle: $wgpu) -> Self {
                Self {
                    inner: $inner::Real(handle),
                }
            }

            #[cfg(feature = "mock")]
            pub fn mock(id: usize) -> Self {
                Self {
                    inner: $inner::Mock { id },
                }
            }

            /// # Panics
            /// Panics on a mock handle.
            pub fn as_wgpu(&self) -> &$wgpu {
                match &self.inner {
                    $inner::Real(handle) => handle,
                    #[cfg(feature = "mock")]
                    $inner::Mock { .. } => {
                        panic!(concat!("Attempted to get ", stringify!($wgpu), " from mock"))
                    }
                }
            }

            #[cfg(feature = "mock")]
            pub fn is_mock(&self) -> bool {
                matches!(self.inner, $inner::Mock { .. })
            }

            #[cfg(feature = "mock")]
            pub fn mock_id(&self) -> Option<usize> {
                match &self.inner {
                    $inner::Mock { id } => Some(*id),
                    _ => None,
                }
            }
        }
    };
}

opaque_wrapper!(
    /// A view onto a [`GpuTexture`].
    GpuTextureView,
    GpuTextureViewInner,
    wgpu::TextureView
);

opaque_wrapper!(
    /// A bind group layout shared by every chart using a pipeline.
    GpuBindGroupLayout,
    GpuBindGroupLayoutInner,
    wgpu::BindGroupLayout
);

opaque_wrapper!(
    /// A resource-binding set.
    GpuBindGroup,
    GpuBindGroupInner,
    wgpu::BindGroup
);

opaque_wrapper!(
    /// A texture sampler.
    GpuSampler,
    GpuSamplerInner,
    wgpu::Sampler
);

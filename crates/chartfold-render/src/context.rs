use std::sync::{Arc, OnceLock};

/// Errors raised while bringing up or using the GPU device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphicsError {
    /// No adapter satisfied the request (no GPU support).
    NoAdapter,
    /// The adapter refused to create a device.
    DeviceCreation(String),
    /// A presentation surface could not be created from a window handle.
    SurfaceCreation(String),
    /// The surface has no configuration compatible with the adapter.
    SurfaceUnsupported,
    /// The next surface texture could not be acquired.
    SurfaceAcquire(String),
}

impl std::fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoAdapter => write!(f, "No suitable GPU adapter found"),
            Self::DeviceCreation(msg) => write!(f, "Failed to create GPU device: {}", msg),
            Self::SurfaceCreation(msg) => write!(f, "Failed to create surface: {}", msg),
            Self::SurfaceUnsupported => write!(f, "Surface is not supported by the adapter"),
            Self::SurfaceAcquire(msg) => write!(f, "Failed to acquire surface texture: {}", msg),
        }
    }
}

impl std::error::Error for GraphicsError {}

/// The device shared by every chart the engine renders.
///
/// Created once per engine on `init` and held behind an `Arc`; charts keep
/// only wrapper handles, never the context itself.
pub struct GraphicsContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    lost: Arc<OnceLock<String>>,
}

impl GraphicsContext {
    /// Creates a context with the default descriptor.
    pub async fn new_owned() -> Result<Arc<Self>, GraphicsError> {
        Self::new_owned_with_descriptor(GraphicsContextDescriptor::default()).await
    }

    /// Blocking variant of [`GraphicsContext::new_owned`].
    pub fn new_owned_sync() -> Result<Arc<Self>, GraphicsError> {
        pollster::block_on(Self::new_owned())
    }

    /// Blocking variant of [`GraphicsContext::new_owned_with_descriptor`].
    pub fn new_owned_sync_with_descriptor(
        descriptor: GraphicsContextDescriptor,
    ) -> Result<Arc<Self>, GraphicsError> {
        pollster::block_on(Self::new_owned_with_descriptor(descriptor))
    }

    pub async fn new_owned_with_descriptor(
        descriptor: GraphicsContextDescriptor,
    ) -> Result<Arc<Self>, GraphicsError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: descriptor.backends,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: descriptor.power_preference,
                compatible_surface: None,
                force_fallback_adapter: descriptor.force_fallback_adapter,
            })
            .await
            .map_err(|_| GraphicsError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: descriptor.limits.clone(),
                label: descriptor.label,
                ..Default::default()
            })
            .await
            .map_err(|e| GraphicsError::DeviceCreation(e.to_string()))?;

        let lost = Arc::new(OnceLock::new());
        let lost_flag = lost.clone();
        device.set_device_lost_callback(move |reason, message| {
            tracing::error!("GPU device lost ({:?}): {}", reason, message);
            let _ = lost_flag.set(format!("{:?}: {}", reason, message));
        });

        let info = adapter.get_info();
        tracing::info!(
            "Created graphics context on {} ({:?})",
            info.name,
            info.backend
        );

        Ok(Arc::new(Self {
            instance,
            adapter,
            device,
            queue,
            lost,
        }))
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Get device info
    pub fn info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Get device limits
    pub fn limits(&self) -> wgpu::Limits {
        self.device.limits()
    }

    /// Reason the device was lost, once it has been.
    pub fn lost_reason(&self) -> Option<&str> {
        self.lost.get().map(String::as_str)
    }

    #[inline]
    pub fn max_texture_dimension_2d(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    #[inline]
    pub fn max_storage_buffer_binding_size(&self) -> u32 {
        self.device.limits().max_storage_buffer_binding_size
    }

    #[inline]
    pub fn max_compute_workgroups_per_dimension(&self) -> u32 {
        self.device.limits().max_compute_workgroups_per_dimension
    }
}

/// Descriptor for configuring graphics context creation.
#[derive(Debug, Clone)]
pub struct GraphicsContextDescriptor {
    /// GPU backends to use
    pub backends: wgpu::Backends,
    /// Power preference for adapter selection
    pub power_preference: wgpu::PowerPreference,
    /// Whether to force fallback adapter
    pub force_fallback_adapter: bool,
    /// Required device limits
    pub limits: wgpu::Limits,
    /// Optional label for debugging
    pub label: Option<&'static str>,
}

impl Default for GraphicsContextDescriptor {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::from_env().unwrap_or(wgpu::Backends::all()),
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            limits: wgpu::Limits::default(),
            label: Some("chartfold device"),
        }
    }
}

impl GraphicsContextDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn power_preference(mut self, preference: wgpu::PowerPreference) -> Self {
        self.power_preference = preference;
        self
    }

    pub fn backends(mut self, backends: wgpu::Backends) -> Self {
        self.backends = backends;
        self
    }

    pub fn limits(mut self, limits: wgpu::Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn force_fallback_adapter(mut self, force: bool) -> Self {
        self.force_fallback_adapter = force;
        self
    }

    pub fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }
}

//! # Errors
//!
//! Every fallible operation in the crate returns [`RenderError`]. Device and surface failures
//! come from `wgpu`, texture decoding failures from `image`; the rest are raised by the sample
//! itself when a request breaks one of its invariants (for instance, uploading more instances
//! than the instance buffer was sized for).
//!
//! None of these are recoverable from the sample's point of view. The application shell logs
//! them and shuts the event loop down.

/// Errors raised while creating GPU resources or rendering a frame.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The window or canvas could not back a `wgpu` surface.
    #[error("failed to create rendering surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    /// No adapter can present to the surface.
    #[error("no graphics adapter is compatible with the surface")]
    NoAdapter,

    /// The adapter refused the device request.
    #[error("failed to request a device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    /// Acquiring the frame's surface texture failed in a way that cannot be skipped.
    #[error("failed to acquire the next surface texture: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    /// The configured texture file could not be read or decoded.
    #[error("failed to load texture: {0}")]
    Texture(#[from] image::ImageError),

    /// A buffer size is zero, above the device limit, or not representable.
    #[error("buffer '{label}' has invalid size {size} (maximum is {max})")]
    InvalidBufferSize { label: String, size: u64, max: u64 },

    /// A static buffer was requested without initial contents.
    #[error("static buffer '{0}' must be created with initial contents")]
    MissingBufferContents(String),

    /// The instance array no longer fits into the storage reserved at start-up.
    #[error("{requested} instances requested but the instance buffer only holds {capacity}")]
    InstanceCapacityExceeded { requested: usize, capacity: usize },

    /// A resource binding named a slot the pipeline does not declare.
    #[error("pipeline has no shader resource named '{0}'")]
    UnknownShaderResource(String),

    /// A resource binding supplied a buffer for a texture slot, or the reverse.
    #[error("shader resource '{0}' was bound to a resource of the wrong kind")]
    ResourceKindMismatch(String),
}

//! wgpu rendering for the orrery: surface management, the shared sphere mesh,
//! the shadow, background and main passes, and GPU-free frame planning.

pub mod buffer;
pub mod depth;
pub mod frame;
pub mod gpu;
pub mod pass;
pub mod pipelines;
pub mod renderer;
pub mod shader;
pub mod shaders;
pub mod shadow;
pub mod sphere;
pub mod state;
pub mod texture;
pub mod uniforms;

pub use buffer::{BufferAllocator, IndexData, MeshBuffer, VertexPositionNormalUv};
pub use depth::{DepthBuffer, DepthConvention};
pub use frame::{CloudLayer, DrawCall, FramePlan, MaterialId, PassKind, PipelineId, PlanInputs, plan_frame};
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use pass::{FrameEncoder, RenderPassBuilder};
pub use renderer::{RendererError, RendererSettings, SceneRenderer, TexturePaths};
pub use shader::{ShaderError, ShaderLibrary};
pub use shadow::{ShadowTarget, ShadowTargetError};
pub use sphere::{SphereMesh, uv_sphere};
pub use state::{BindChanges, PipelineState};
pub use texture::{ColorSpace, Texture2d, TextureError};
pub use uniforms::{DrawUniforms, TextureSlot, UniformRing, UniformSlot};

//! Explicit bind state for one render pass.
//!
//! The renderer threads a [`PipelineState`] through every draw of a pass and
//! only issues the binds it reports as changed.

use crate::frame::{MaterialId, PipelineId};

/// Which binds must be issued before a draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindChanges {
    pub pipeline: bool,
    pub uniforms: bool,
    pub material: bool,
    pub mesh: bool,
}

impl BindChanges {
    pub fn any(&self) -> bool {
        self.pipeline || self.uniforms || self.material || self.mesh
    }
}

/// What is currently bound in the active pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineState {
    pipeline: Option<PipelineId>,
    uniform_offset: Option<u32>,
    material: Option<MaterialId>,
    mesh_bound: bool,
}

impl PipelineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything; a new pass starts with nothing bound.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Record the state a draw needs and report what differs from the
    /// current state. A pipeline switch invalidates the material group.
    pub fn prepare(
        &mut self,
        pipeline: PipelineId,
        uniform_offset: u32,
        material: Option<MaterialId>,
    ) -> BindChanges {
        let mut changes = BindChanges::default();

        if self.pipeline != Some(pipeline) {
            self.pipeline = Some(pipeline);
            self.material = None;
            changes.pipeline = true;
        }
        if self.uniform_offset != Some(uniform_offset) {
            self.uniform_offset = Some(uniform_offset);
            changes.uniforms = true;
        }
        if material.is_some() && self.material != material {
            self.material = material;
            changes.material = true;
        }
        if !self.mesh_bound {
            self.mesh_bound = true;
            changes.mesh = true;
        }
        changes
    }

    pub fn pipeline(&self) -> Option<PipelineId> {
        self.pipeline
    }

    pub fn material(&self) -> Option<MaterialId> {
        self.material
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_draw_binds_everything() {
        let mut state = PipelineState::new();
        let changes = state.prepare(PipelineId::RootPlanet, 0, Some(MaterialId::Earth));
        assert_eq!(
            changes,
            BindChanges {
                pipeline: true,
                uniforms: true,
                material: true,
                mesh: true,
            }
        );
        assert_eq!(state.pipeline(), Some(PipelineId::RootPlanet));
    }

    #[test]
    fn test_same_pipeline_and_material_only_rebinds_uniforms() {
        let mut state = PipelineState::new();
        state.prepare(PipelineId::GenericPlanet, 0, Some(MaterialId::Moon));
        let changes = state.prepare(PipelineId::GenericPlanet, 512, Some(MaterialId::Moon));
        assert_eq!(
            changes,
            BindChanges {
                uniforms: true,
                ..BindChanges::default()
            }
        );
    }

    #[test]
    fn test_identical_draw_needs_no_binds() {
        let mut state = PipelineState::new();
        state.prepare(PipelineId::Shadow, 256, None);
        assert!(!state.prepare(PipelineId::Shadow, 256, None).any());
    }

    #[test]
    fn test_pipeline_switch_invalidates_material() {
        let mut state = PipelineState::new();
        state.prepare(PipelineId::GenericPlanet, 0, Some(MaterialId::Moon));
        let changes = state.prepare(PipelineId::RootPlanet, 256, Some(MaterialId::Moon));
        assert!(changes.pipeline);
        assert!(changes.material);
        assert!(!changes.mesh);
    }

    #[test]
    fn test_reset_forgets_bindings() {
        let mut state = PipelineState::new();
        state.prepare(PipelineId::Shadow, 0, None);
        state.reset();
        assert_eq!(state, PipelineState::default());
        assert!(state.prepare(PipelineId::Shadow, 0, None).mesh);
    }

    #[test]
    fn test_draw_without_material_keeps_none() {
        let mut state = PipelineState::new();
        let changes = state.prepare(PipelineId::Shadow, 0, None);
        assert!(!changes.material);
        assert_eq!(state.material(), None);
    }
}

//! Parent-indexed orbital hierarchy.
//!
//! Bodies live in a flat arena and reference their parent by index. Every
//! non-root body follows a circular orbit in the XZ plane around its parent,
//! with the phase given directly by the simulation time, so a position can be
//! recomputed for any time without stepping through earlier frames.

use glam::{DVec3, Vec3};

/// Static orbital and visual parameters of one body.
#[derive(Debug, Clone, PartialEq)]
pub struct CelestialBody {
    /// Display name, used in logs and errors.
    pub name: String,
    /// Index of the parent body, or `None` for a root.
    pub parent: Option<usize>,
    /// Constant shift of the orbit center relative to the parent.
    /// Ignored for roots, which always sit at the origin.
    pub local_offset: Vec3,
    pub orbit_radius: f32,
    /// Orbital angular speed in radians per unit of simulation time.
    pub orbit_speed: f32,
    /// Spin about the local Y axis in radians per unit of simulation time.
    pub rotation_speed: f32,
    /// Uniform scale applied to the shared unit sphere.
    pub scale: f32,
}

impl CelestialBody {
    /// A stationary root body.
    pub fn root(name: impl Into<String>, scale: f32, rotation_speed: f32) -> Self {
        Self {
            name: name.into(),
            parent: None,
            local_offset: Vec3::ZERO,
            orbit_radius: 0.0,
            orbit_speed: 0.0,
            rotation_speed,
            scale,
        }
    }

    /// A body orbiting `parent` at `orbit_radius` with angular speed `orbit_speed`.
    pub fn satellite(
        name: impl Into<String>,
        parent: usize,
        orbit_radius: f32,
        orbit_speed: f32,
        rotation_speed: f32,
        scale: f32,
    ) -> Self {
        Self {
            name: name.into(),
            parent: Some(parent),
            local_offset: Vec3::ZERO,
            orbit_radius,
            orbit_speed,
            rotation_speed,
            scale,
        }
    }

    /// Offset from the orbit center at simulation time `t`.
    pub fn orbit_offset(&self, t: f64) -> DVec3 {
        let angle = t * f64::from(self.orbit_speed);
        let radius = f64::from(self.orbit_radius);
        DVec3::new(radius * angle.cos(), 0.0, radius * angle.sin())
    }

    fn first_non_finite_field(&self) -> Option<&'static str> {
        let fields = [
            ("orbit_radius", self.orbit_radius),
            ("orbit_speed", self.orbit_speed),
            ("rotation_speed", self.rotation_speed),
            ("scale", self.scale),
            ("local_offset.x", self.local_offset.x),
            ("local_offset.y", self.local_offset.y),
            ("local_offset.z", self.local_offset.z),
        ];
        fields
            .into_iter()
            .find(|(_, value)| !value.is_finite())
            .map(|(name, _)| name)
    }
}

/// Errors detected while validating a hierarchy at construction.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum HierarchyError {
    #[error("hierarchy has no bodies")]
    Empty,

    #[error("body {body} ({name}) references parent {parent}, but only {count} bodies exist")]
    ParentOutOfRange {
        body: usize,
        name: String,
        parent: usize,
        count: usize,
    },

    #[error("body {body} ({name}) is its own parent")]
    SelfParent { body: usize, name: String },

    #[error("body {body} ({name}) is part of a parent cycle")]
    Cycle { body: usize, name: String },

    #[error("body {body} ({name}) has a non-finite {field}")]
    NonFinite {
        body: usize,
        name: String,
        field: &'static str,
    },

    #[error("body {body} ({name}) has non-positive scale {scale}")]
    NonPositiveScale { body: usize, name: String, scale: f32 },
}

/// A validated forest of bodies with a precomputed parent-before-child order.
#[derive(Debug, Clone)]
pub struct OrbitalHierarchy {
    bodies: Vec<CelestialBody>,
    depths: Vec<usize>,
    /// Body indices sorted by depth, ties broken by index.
    order: Vec<usize>,
}

impl OrbitalHierarchy {
    /// Validate `bodies` and build the evaluation order.
    ///
    /// # Errors
    ///
    /// Returns a [`HierarchyError`] for an empty list, an out-of-range or
    /// self-referencing parent, a parent cycle, or invalid numeric parameters.
    pub fn new(bodies: Vec<CelestialBody>) -> Result<Self, HierarchyError> {
        if bodies.is_empty() {
            return Err(HierarchyError::Empty);
        }

        let count = bodies.len();
        for (index, body) in bodies.iter().enumerate() {
            if let Some(field) = body.first_non_finite_field() {
                return Err(HierarchyError::NonFinite {
                    body: index,
                    name: body.name.clone(),
                    field,
                });
            }
            if body.scale <= 0.0 {
                return Err(HierarchyError::NonPositiveScale {
                    body: index,
                    name: body.name.clone(),
                    scale: body.scale,
                });
            }
            match body.parent {
                Some(parent) if parent == index => {
                    return Err(HierarchyError::SelfParent {
                        body: index,
                        name: body.name.clone(),
                    });
                }
                Some(parent) if parent >= count => {
                    return Err(HierarchyError::ParentOutOfRange {
                        body: index,
                        name: body.name.clone(),
                        parent,
                        count,
                    });
                }
                _ => {}
            }
        }

        let depths = (0..count)
            .map(|index| depth_of(&bodies, index))
            .collect::<Result<Vec<_>, _>>()?;

        let mut order: Vec<usize> = (0..count).collect();
        order.sort_by_key(|&index| (depths[index], index));

        Ok(Self {
            bodies,
            depths,
            order,
        })
    }

    pub fn bodies(&self) -> &[CelestialBody] {
        &self.bodies
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Always `false`: construction rejects empty hierarchies.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Number of ancestors of `index` (0 for a root).
    pub fn depth(&self, index: usize) -> Option<usize> {
        self.depths.get(index).copied()
    }

    /// Evaluation order: every parent appears before its children.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// World positions of all bodies at simulation time `t`, in input order.
    ///
    /// Pure in `t`: equal inputs give bit-identical outputs.
    pub fn compute_world_positions(&self, t: f64) -> Vec<Vec3> {
        let mut buffer = PositionBuffer::default();
        self.update_world_positions(t, &mut buffer);
        buffer.positions
    }

    /// Like [`Self::compute_world_positions`], writing into `buffer` so the
    /// per-frame update does not allocate once the buffer has grown.
    pub fn update_world_positions(&self, t: f64, buffer: &mut PositionBuffer) {
        // Accumulate in f64 so deep chains at large t keep their precision.
        let world = &mut buffer.precise;
        world.clear();
        world.resize(self.bodies.len(), DVec3::ZERO);
        for &index in &self.order {
            let body = &self.bodies[index];
            world[index] = match body.parent {
                None => DVec3::ZERO,
                Some(parent) => world[parent] + body.local_offset.as_dvec3() + body.orbit_offset(t),
            };
        }

        buffer.positions.clear();
        buffer
            .positions
            .extend(world.iter().map(|position| position.as_vec3()));
    }
}

/// Reusable storage for [`OrbitalHierarchy::update_world_positions`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionBuffer {
    precise: Vec<DVec3>,
    positions: Vec<Vec3>,
}

impl PositionBuffer {
    pub fn as_slice(&self) -> &[Vec3] {
        &self.positions
    }
}

/// Walk the parent chain of `index`. A chain longer than the body count
/// can only happen through a cycle.
fn depth_of(bodies: &[CelestialBody], index: usize) -> Result<usize, HierarchyError> {
    let mut depth = 0;
    let mut current = index;
    while let Some(parent) = bodies[current].parent {
        depth += 1;
        if depth > bodies.len() {
            return Err(HierarchyError::Cycle {
                body: index,
                name: bodies[index].name.clone(),
            });
        }
        current = parent;
    }
    Ok(depth)
}

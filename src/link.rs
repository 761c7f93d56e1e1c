//! Links: the rigid bodies (nodes) of an [Armature](crate::Armature)

use crate::joint::JointIndex;
use crate::renderer::{Material, MeshHandle};
use crate::rigid::Rigid;
use core::fmt;

/// Index of a link in the arena of an [Armature](crate::Armature)
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Copy, Clone)]
pub struct LinkIndex(pub usize);

impl fmt::Display for LinkIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A rigid body with a cached world transform.
///
/// Links are only created through [Armature::add_link](crate::Armature::add_link) and only
/// mutated by the armature's propagation, which keeps the cache consistent.
#[derive(Debug, Clone)]
pub struct Link<B>
where
    B: Rigid,
{
    /// Index in the arena allocation
    pub(crate) index: LinkIndex,
    /// Identifier used to address the renderer
    pub(crate) id: u64,
    pub(crate) local_offset: B::Transformation,
    pub(crate) world: B::Transformation,
    /// Outgoing joints in insertion order
    pub(crate) children: Vec<JointIndex>,
    pub(crate) parent_joint: Option<JointIndex>,
    pub(crate) mesh: MeshHandle,
    pub(crate) material: Material,
}

impl<B> Link<B>
where
    B: Rigid,
{
    pub(crate) fn new(index: LinkIndex, id: u64, local_offset: B::Transformation, mesh: MeshHandle, material: Material) -> Self {
        Link {
            index,
            id,
            world: local_offset.clone(),
            local_offset,
            children: vec![],
            parent_joint: None,
            mesh,
            material,
        }
    }

    /// Overwrites the cached world transform with `parent_side · local_offset`
    pub(crate) fn set_world_transform(&mut self, parent_side: &B::Transformation) {
        self.world = B::concat(parent_side, &self.local_offset);
    }

    pub fn index(&self) -> LinkIndex {
        self.index
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn local_offset(&self) -> &B::Transformation {
        &self.local_offset
    }

    pub fn world_transform(&self) -> &B::Transformation {
        &self.world
    }

    /// Outgoing joints in the order they have been added
    pub fn joints(&self) -> &[JointIndex] {
        &self.children
    }

    pub fn parent_joint(&self) -> Option<JointIndex> {
        self.parent_joint
    }

    pub fn mesh(&self) -> &MeshHandle {
        &self.mesh
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn is_root(&self) -> bool {
        self.parent_joint.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl<B> fmt::Display for Link<B>
where
    B: Rigid,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Link {} (id {}, mesh {}), parent joint: {:?}, joints: {:?}",
            self.index, self.id, self.mesh, self.parent_joint, self.children
        )
    }
}

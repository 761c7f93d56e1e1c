/*! The interface to the external collaborator displaying the links.
 *
 * The kinematics only ever writes to a renderer: one `create_object` per link when it is constructed
 * and one `set_transform` whenever the link's world transform changes. Nothing is read back.
 */

use crate::rigid::HomogeneousMatrix;
use core::fmt;

/// Opaque reference to a mesh (e.g., a file path) that is only meaningful to the renderer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MeshHandle(pub String);

impl From<&str> for MeshHandle {
    fn from(value: &str) -> Self {
        MeshHandle(value.to_string())
    }
}

impl From<String> for MeshHandle {
    fn from(value: String) -> Self {
        MeshHandle(value)
    }
}

impl fmt::Display for MeshHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Material hint passed along with the mesh. Components are RGBA in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub rgba: [f64; 4],
}

impl Material {
    const PALETTE: [[f64; 4]; 4] = [
        [1.0, 0.0, 0.0, 1.0],
        [0.0, 1.0, 0.0, 1.0],
        [0.0, 0.0, 1.0, 1.0],
        [1.0, 0.0, 1.0, 1.0],
    ];

    pub fn new(rgba: [f64; 4]) -> Self {
        Material { rgba }
    }

    /// Default color for a link that has none assigned: cycles through red, green, blue and magenta
    pub fn palette(link_id: u64) -> Self {
        Material::new(Self::PALETTE[(link_id % Self::PALETTE.len() as u64) as usize])
    }

    pub fn is_transparent(&self) -> bool {
        self.rgba[3] < 1.0
    }
}

/// The renderer driven by an [Armature](crate::Armature).
pub trait Renderer {
    /// Called once when a link is constructed
    fn create_object(&mut self, link_id: u64, mesh: &MeshHandle, material: &Material);

    /// Called every time the world transform of a link changes
    fn set_transform(&mut self, link_id: u64, transform: &HomogeneousMatrix);
}

/// Discards all notifications
impl Renderer for () {
    fn create_object(&mut self, _link_id: u64, _mesh: &MeshHandle, _material: &Material) {}

    fn set_transform(&mut self, _link_id: u64, _transform: &HomogeneousMatrix) {}
}

impl<R> Renderer for &mut R
where
    R: Renderer + ?Sized,
{
    fn create_object(&mut self, link_id: u64, mesh: &MeshHandle, material: &Material) {
        (**self).create_object(link_id, mesh, material)
    }

    fn set_transform(&mut self, link_id: u64, transform: &HomogeneousMatrix) {
        (**self).set_transform(link_id, transform)
    }
}

/// A single notification received by a [Recorder]
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    Created {
        link_id: u64,
        mesh: MeshHandle,
        material: Material,
    },
    Transformed {
        link_id: u64,
        transform: HomogeneousMatrix,
    },
}

/// Records all notifications in the order they arrive.
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    events: Vec<RenderEvent>,
}

impl Recorder {
    pub fn events(&self) -> &[RenderEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Link ids in the order their transforms were set
    pub fn transformed_ids(&self) -> Vec<u64> {
        self.events
            .iter()
            .filter_map(|event| match event {
                RenderEvent::Transformed { link_id, .. } => Some(*link_id),
                RenderEvent::Created { .. } => None,
            })
            .collect()
    }

    /// The most recent transform sent for a link
    pub fn last_transform(&self, link_id: u64) -> Option<&HomogeneousMatrix> {
        self.events.iter().rev().find_map(|event| match event {
            RenderEvent::Transformed { link_id: id, transform } if *id == link_id => Some(transform),
            _ => None,
        })
    }
}

impl Renderer for Recorder {
    fn create_object(&mut self, link_id: u64, mesh: &MeshHandle, material: &Material) {
        self.events.push(RenderEvent::Created {
            link_id,
            mesh: mesh.clone(),
            material: *material,
        });
    }

    fn set_transform(&mut self, link_id: u64, transform: &HomogeneousMatrix) {
        self.events.push(RenderEvent::Transformed {
            link_id,
            transform: *transform,
        });
    }
}

/// Emits every notification as a `tracing` event (target `armature::renderer`).
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRenderer;

impl Renderer for TracingRenderer {
    fn create_object(&mut self, link_id: u64, mesh: &MeshHandle, material: &Material) {
        tracing::info!(link_id, %mesh, rgba = ?material.rgba, "Create object");
    }

    fn set_transform(&mut self, link_id: u64, transform: &HomogeneousMatrix) {
        let position = [transform[0][3], transform[1][3], transform[2][3]];
        tracing::debug!(link_id, ?position, "Set transform");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_cycles() {
        assert_eq!(Material::palette(0), Material::palette(4));
        assert_eq!(Material::palette(2).rgba, [0.0, 0.0, 1.0, 1.0]);
        assert!(!Material::palette(1).is_transparent());
        assert!(Material::new([0.3, 0.2, 0.15, 0.5]).is_transparent());
    }

    #[test]
    fn test_recorder() {
        let mut recorder = Recorder::default();
        let identity = [[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0], [0.0, 0.0, 0.0, 1.0]];
        let mut shifted = identity;
        shifted[0][3] = 2.0;

        fn feed<R: Renderer>(mut renderer: R, identity: &HomogeneousMatrix, shifted: &HomogeneousMatrix) {
            renderer.create_object(3, &"base.stl".into(), &Material::palette(3));
            renderer.set_transform(3, identity);
            renderer.set_transform(5, identity);
            renderer.set_transform(3, shifted);
        }
        feed(&mut recorder, &identity, &shifted);

        assert_eq!(recorder.events().len(), 4);
        assert_eq!(recorder.transformed_ids(), vec![3, 5, 3]);
        assert_eq!(recorder.last_transform(3), Some(&shifted));
        assert_eq!(recorder.last_transform(4), None);

        recorder.clear();
        assert!(recorder.events().is_empty());
    }
}

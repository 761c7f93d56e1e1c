/*! Bulk construction of an [Armature] from plain input records.
 *
 * All links are created first (addressable by their position in the input), then the joints in
 * input order. Each joint is updated once right after it has been added so that the whole
 * armature is consistent when loading finishes.
 */

use crate::armature::Armature;
use crate::errors::ArmatureError;
use crate::joint::{JointIndex, JointType, Motion};
use crate::link::LinkIndex;
use crate::renderer::{Material, MeshHandle, Renderer};
use crate::rigid::Rigid;
use itertools::{izip, Itertools};
use tracing_attributes::instrument;

/// Input record for a link
#[derive(Debug, Clone, PartialEq)]
pub struct LinkSpec {
    pub mesh: MeshHandle,
    /// Falls back to [Material::palette] if not set
    pub material: Option<Material>,
}

impl LinkSpec {
    pub fn new(mesh: impl Into<MeshHandle>) -> Self {
        LinkSpec {
            mesh: mesh.into(),
            material: None,
        }
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = Some(material);
        self
    }

    /// Zips parallel sequences of meshes and (optional) colors
    pub fn from_parallel(meshes: &[&str], colors: Option<&[[f64; 4]]>) -> Result<Vec<LinkSpec>, ArmatureError> {
        match colors {
            None => Ok(meshes.iter().map(|mesh| LinkSpec::new(*mesh)).collect_vec()),
            Some(colors) => {
                check_length(meshes.len(), colors.len())?;
                Ok(meshes
                    .iter()
                    .zip(colors)
                    .map(|(mesh, rgba)| LinkSpec::new(*mesh).with_material(Material::new(*rgba)))
                    .collect_vec())
            }
        }
    }
}

/// Input record for a joint. `parent` and `child` are positions in the link input.
#[derive(Debug, Clone, PartialEq)]
pub struct JointSpec {
    /// Translation between the parent and the joint's motion
    pub offset: [f64; 3],
    pub parent: usize,
    pub child: usize,
    /// Required for rotational and translational joints, ignored for fixed ones
    pub axis: Option<[f64; 3]>,
    /// Type tag, see [JointType]
    pub joint_type: String,
}

impl JointSpec {
    /// Zips parallel sequences of joint properties
    pub fn from_parallel(
        offsets: &[[f64; 3]],
        parents: &[usize],
        children: &[usize],
        axes: &[Option<[f64; 3]>],
        joint_types: &[&str],
    ) -> Result<Vec<JointSpec>, ArmatureError> {
        let expected = offsets.len();
        for actual in [parents.len(), children.len(), axes.len(), joint_types.len()] {
            check_length(expected, actual)?;
        }
        Ok(izip!(offsets, parents, children, axes, joint_types)
            .map(|(offset, parent, child, axis, joint_type)| JointSpec {
                offset: *offset,
                parent: *parent,
                child: *child,
                axis: *axis,
                joint_type: joint_type.to_string(),
            })
            .collect_vec())
    }

    fn motion(&self) -> Result<Motion, ArmatureError> {
        let joint_type: JointType = self.joint_type.parse()?;
        let axis = || {
            self.axis.ok_or_else(|| {
                ArmatureError::Configuration(format!("{joint_type} joint requires an axis"))
            })
        };
        match joint_type {
            JointType::Fixed => Ok(Motion::fixed()),
            JointType::Rotational => Ok(Motion::rotational(axis()?, 0.0)),
            JointType::Translational => Motion::translational(axis()?, 0.0),
        }
    }
}

/// Result of [load_links_and_joints]
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    /// In input order
    pub links: Vec<LinkIndex>,
    /// Successfully created joints in input order
    pub joints: Vec<JointIndex>,
    /// Joints that have been skipped (position in the input and reason)
    pub skipped: Vec<(usize, ArmatureError)>,
}

fn check_length(expected: usize, actual: usize) -> Result<(), ArmatureError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ArmatureError::DimensionMismatch { expected, actual })
    }
}

/// Adds all links and joints to `armature`.
///
/// Joints with an unknown type tag or a missing axis are reported and skipped; their child stays
/// a root. Any other error (unknown link position, second parent, zero translation axis) aborts
/// loading. Links and joints created up to that point remain in the armature.
#[instrument(level = "debug", skip_all, fields(links = links.len(), joints = joints.len()))]
pub fn load_links_and_joints<B, R>(
    armature: &mut Armature<B, R>,
    links: &[LinkSpec],
    joints: &[JointSpec],
) -> Result<Loaded, ArmatureError>
where
    B: Rigid,
    R: Renderer,
{
    let first_id = armature.next_id();
    let link_refs = links
        .iter()
        .enumerate()
        .map(|(position, spec)| {
            let material = spec
                .material
                .unwrap_or_else(|| Material::palette(first_id + position as u64));
            armature.add_link(B::neutral_element(), spec.mesh.clone(), material)
        })
        .collect_vec();

    let mut loaded = Loaded {
        links: link_refs,
        joints: vec![],
        skipped: vec![],
    };

    for (position, spec) in joints.iter().enumerate() {
        let parent = *loaded.links.get(spec.parent).ok_or(ArmatureError::UnknownLink(spec.parent))?;
        let child = *loaded.links.get(spec.child).ok_or(ArmatureError::UnknownLink(spec.child))?;

        let motion = match spec.motion() {
            Ok(motion) => motion,
            Err(err @ ArmatureError::Configuration(_)) => {
                tracing::error!(joint = position, %err, "Skipping joint");
                loaded.skipped.push((position, err));
                continue;
            }
            Err(err) => return Err(err),
        };

        let joint = armature.connect(parent, child, B::translation(&spec.offset), motion)?;
        loaded.joints.push(joint);
    }

    tracing::debug!(
        links = loaded.links.len(),
        joints = loaded.joints.len(),
        skipped = loaded.skipped.len(),
        "Loaded armature"
    );
    Ok(loaded)
}

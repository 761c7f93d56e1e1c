/*! Joints connect a parent link to a child link and produce the child's pose from the parent's.
 *
 * The set of joint kinds is closed: [Motion] is a tagged variant over fixed, rotational and
 * translational motion and computes the parametric part of the transformation.
 */

use crate::errors::ArmatureError;
use crate::link::LinkIndex;
use crate::rigid::{is_unit, normalize, Rigid};
use core::fmt;
use std::str::FromStr;

/// Index of a joint in the arena of an [Armature](crate::Armature)
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Copy, Clone)]
pub struct JointIndex(pub usize);

impl fmt::Display for JointIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Type tag of a joint as used in bulk input data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointType {
    Fixed,
    Rotational,
    Translational,
}

impl FromStr for JointType {
    type Err = ArmatureError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_lowercase().as_str() {
            "fixed" => Ok(JointType::Fixed),
            "rotation" | "rotational" | "revolute" => Ok(JointType::Rotational),
            "translation" | "translational" | "prismatic" => Ok(JointType::Translational),
            _ => Err(ArmatureError::Configuration(format!("Joint type {tag:?} not valid"))),
        }
    }
}

impl fmt::Display for JointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            JointType::Fixed => "fixed",
            JointType::Rotational => "rotation",
            JointType::Translational => "translation",
        };
        write!(f, "{tag}")
    }
}

/// The parametric part of a joint.
///
/// Parameters are staged with [Motion::set_parameter]; nothing is recomputed until the owning
/// armature updates the joint.
#[derive(Debug, Clone, PartialEq)]
pub enum Motion {
    /// No degree of freedom
    Fixed,
    /// Rotation about `axis`, which has to be a unit vector (it is not normalized)
    Rotational { axis: [f64; 3], base_angle: f64, angle: f64 },
    /// Translation along `axis`, normalized by [Motion::translational] or when attached to an armature
    Translational {
        axis: [f64; 3],
        base_offset: f64,
        distance: f64,
    },
}

impl Motion {
    pub fn fixed() -> Self {
        Motion::Fixed
    }

    pub fn rotational(axis: [f64; 3], base_angle: f64) -> Self {
        if !is_unit(&axis, 1e-6) {
            tracing::warn!(?axis, "Rotation axis is not a unit vector and will not be normalized");
        }
        Motion::Rotational {
            axis,
            base_angle,
            angle: base_angle,
        }
    }

    /// Fails with [ArmatureError::InvalidAxis] if the axis has zero length
    pub fn translational(axis: [f64; 3], base_offset: f64) -> Result<Self, ArmatureError> {
        Motion::Translational {
            axis,
            base_offset,
            distance: base_offset,
        }
        .validated()
    }

    /// Normalizes the axis of a translation. Motions written out as variants go through here
    /// before they are attached to an armature.
    pub(crate) fn validated(self) -> Result<Self, ArmatureError> {
        match self {
            Motion::Translational {
                axis,
                base_offset,
                distance,
            } => Ok(Motion::Translational {
                axis: normalize(&axis).ok_or(ArmatureError::InvalidAxis(axis))?,
                base_offset,
                distance,
            }),
            motion => Ok(motion),
        }
    }

    pub fn joint_type(&self) -> JointType {
        match self {
            Motion::Fixed => JointType::Fixed,
            Motion::Rotational { .. } => JointType::Rotational,
            Motion::Translational { .. } => JointType::Translational,
        }
    }

    /// Stores `base + value` as the current angle or distance.
    pub fn set_parameter(&mut self, value: f64) -> Result<(), ArmatureError> {
        match self {
            Motion::Fixed => Err(ArmatureError::UnsupportedOperation(
                "a fixed joint has no parameter".to_string(),
            )),
            Motion::Rotational { base_angle, angle, .. } => {
                *angle = *base_angle + value;
                Ok(())
            }
            Motion::Translational {
                base_offset, distance, ..
            } => {
                *distance = *base_offset + value;
                Ok(())
            }
        }
    }

    /// Current angle or distance (including the base value), `None` for fixed joints
    pub fn parameter(&self) -> Option<f64> {
        match self {
            Motion::Fixed => None,
            Motion::Rotational { angle, .. } => Some(*angle),
            Motion::Translational { distance, .. } => Some(*distance),
        }
    }

    pub fn axis(&self) -> Option<&[f64; 3]> {
        match self {
            Motion::Fixed => None,
            Motion::Rotational { axis, .. } | Motion::Translational { axis, .. } => Some(axis),
        }
    }

    pub fn transformation<B: Rigid>(&self) -> B::Transformation {
        match self {
            Motion::Fixed => B::neutral_element(),
            Motion::Rotational { axis, angle, .. } => B::rotation(axis, *angle),
            Motion::Translational { axis, distance, .. } => B::translation(&axis.map(|a| a * distance)),
        }
    }
}

/// A directed relation from a parent link to a child link.
#[derive(Debug, Clone)]
pub struct Joint<B>
where
    B: Rigid,
{
    pub(crate) index: JointIndex,
    pub(crate) parent: LinkIndex,
    pub(crate) child: LinkIndex,
    pub(crate) offset: B::Transformation,
    pub(crate) motion: Motion,
}

impl<B> Joint<B>
where
    B: Rigid,
{
    pub(crate) fn new(
        index: JointIndex,
        parent: LinkIndex,
        child: LinkIndex,
        offset: B::Transformation,
        motion: Motion,
    ) -> Self {
        Joint {
            index,
            parent,
            child,
            offset,
            motion,
        }
    }

    pub fn index(&self) -> JointIndex {
        self.index
    }

    pub fn parent(&self) -> LinkIndex {
        self.parent
    }

    pub fn child(&self) -> LinkIndex {
        self.child
    }

    pub fn offset(&self) -> &B::Transformation {
        &self.offset
    }

    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    pub fn joint_type(&self) -> JointType {
        self.motion.joint_type()
    }

    pub fn parameter(&self) -> Option<f64> {
        self.motion.parameter()
    }

    pub fn parametric_transform(&self) -> B::Transformation {
        self.motion.transformation::<B>()
    }

    /// `parent_world · offset · parametric`, i.e., the child's world transform without its local offset
    pub fn transform_from(&self, parent_world: &B::Transformation) -> B::Transformation {
        B::concat(&B::concat(parent_world, &self.offset), &self.parametric_transform())
    }
}

impl<B> fmt::Display for Joint<B>
where
    B: Rigid,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} joint {}: {} -> {}, parameter: {:?}",
            self.joint_type(),
            self.index,
            self.parent,
            self.child,
            self.parameter()
        )
    }
}

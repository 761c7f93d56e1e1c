//! ## About
//!
//! This crate contains kinematic trees for robotics and rigging: rigid bodies ("links") connected
//! by fixed, rotational and translational joints. Setting a joint's parameter recomputes the world
//! transform of every descendant link (depth-first) and notifies a [Renderer] about each new pose.
//! Linear algebra is provided by exchangeable backends ([ndarray](https://github.com/rust-ndarray/ndarray)
//! and [nalgebra](https://github.com/dimforge/nalgebra), selected with cargo features).
//!
//! See the [Armature] struct to get started, or [load_links_and_joints] to build one from plain data.
//!
//! ## Conventions
//!
//! A joint maps its parent's world transform to its child's as
//! `child.world = parent.world · joint.offset · joint.parametric · child.local_offset`.
//! Transformations are homogeneous 4x4 matrices; only rotations and translations are composed.
//!
//! ## Naming conventions
//! * Structs – substantives that indicate entities implementing a behavior
//! * Methods – imperative forms with the exception of getters and factories, which
//!             use substantives (i.e., omit a `get_` prefix) much like the standard library.

pub mod armature;
pub mod errors;
pub mod iterator;
pub mod joint;
pub mod link;
pub mod loader;
pub mod renderer;
pub mod rigid;

pub use armature::Armature;
pub use errors::ArmatureError;
pub use iterator::DepthFirstIterator;
pub use joint::{Joint, JointIndex, JointType, Motion};
pub use link::{Link, LinkIndex};
pub use loader::{load_links_and_joints, JointSpec, LinkSpec, Loaded};
pub use renderer::{Material, MeshHandle, RenderEvent, Recorder, Renderer, TracingRenderer};
pub use rigid::{accumulate, HomogeneousMatrix, Rigid};

// Backends
#[cfg(feature = "nalgebra")]
pub mod nalgebra;
#[cfg(feature = "ndarray")]
pub mod ndarray;

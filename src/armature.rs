/*! The arena owning all links and joints of a kinematic forest.
 *
 * Links reference their outgoing joints and their parent joint by index, joints reference their
 * parent and child link by index. Neither owns the other; the [Armature] owns everything.
 *
 * ## Staging and flushing
 *
 * Joint parameters can be staged with [Armature::set_parameter] without recomputing anything. Until
 * the joint (or an ancestor joint) is flushed with [Armature::update], the world transforms of the
 * descendants are stale. This allows setting many joints cheaply and propagating once:
 *
 * ```
 * # use armature::{nalgebra::NalgebraBackend, Armature, Material, Motion, Rigid};
 * let mut arm = Armature::<NalgebraBackend, _>::new(());
 * let base = arm.add_link(NalgebraBackend::neutral_element(), "base".into(), Material::palette(0));
 * let upper = arm.add_link(NalgebraBackend::neutral_element(), "upper".into(), Material::palette(1));
 * let lower = arm.add_link(NalgebraBackend::neutral_element(), "lower".into(), Material::palette(2));
 * let offset = NalgebraBackend::translation(&[1.0, 0.0, 0.0]);
 * let shoulder = arm.connect(base, upper, offset, Motion::rotational([0.0, 0.0, 1.0], 0.0)).unwrap();
 * let elbow = arm.connect(upper, lower, offset, Motion::rotational([0.0, 0.0, 1.0], 0.0)).unwrap();
 *
 * arm.set_parameter(elbow, 0.5).unwrap();
 * arm.set_parameter_and_update(shoulder, 0.25).unwrap(); // flushes the elbow as well
 * ```
 */

use crate::errors::ArmatureError;
use crate::iterator::DepthFirstIterator;
use crate::joint::{Joint, JointIndex, Motion};
use crate::link::{Link, LinkIndex};
use crate::renderer::{Material, MeshHandle, Renderer};
use crate::rigid::{accumulate, Rigid};
use itertools::Itertools;
use tracing_attributes::instrument;

/// Arena allocated forest of [Link]s connected by [Joint]s that drives a [Renderer].
///
/// Links and joints are never removed. Every link has at most one parent joint and there are
/// no cycles, which [Armature::add_joint] enforces.
pub struct Armature<B, R>
where
    B: Rigid,
    R: Renderer,
{
    pub(crate) links: Vec<Link<B>>,
    pub(crate) joints: Vec<Joint<B>>,
    renderer: R,
    /// Next renderer id handed out
    next_id: u64,
}

impl<B, R> Armature<B, R>
where
    B: Rigid,
    R: Renderer,
{
    pub fn new(renderer: R) -> Self {
        Self::with_first_id(renderer, 0)
    }

    /// Link ids (used to address the renderer) start at `first_id`. Useful when several armatures
    /// share the same renderer.
    pub fn with_first_id(renderer: R, first_id: u64) -> Self {
        Armature {
            links: vec![],
            joints: vec![],
            renderer,
            next_id: first_id,
        }
    }

    /// Creates a new, parentless link whose world transform equals its local offset and
    /// registers it with the renderer.
    #[instrument(level = "debug", skip(self, local_offset, material))]
    pub fn add_link(&mut self, local_offset: B::Transformation, mesh: MeshHandle, material: Material) -> LinkIndex {
        let index = LinkIndex(self.links.len());
        let id = self.next_id;
        self.next_id += 1;

        let link = Link::<B>::new(index, id, local_offset, mesh, material);
        self.renderer.create_object(id, &link.mesh, &link.material);
        self.renderer.set_transform(id, &B::to_matrix(&link.world));
        tracing::debug!(%index, id, "Added link");

        self.links.push(link);
        index
    }

    /// Connects `parent` to `child`. The transforms are **not** recomputed; call [Armature::update]
    /// (or use [Armature::connect]) afterwards.
    ///
    /// Fails if the child already has a parent joint, if the joint would close a cycle or if a
    /// translation axis has zero length. The armature is left untouched in that case. Translation
    /// axes are normalized.
    #[instrument(level = "debug", skip(self, offset))]
    pub fn add_joint(
        &mut self,
        parent: LinkIndex,
        child: LinkIndex,
        offset: B::Transformation,
        motion: Motion,
    ) -> Result<JointIndex, ArmatureError> {
        self.link(parent)?;
        let child_link = self.link(child)?;

        if let Some(existing) = child_link.parent_joint {
            return Err(ArmatureError::Structure(format!(
                "link {child} already has parent joint {existing}"
            )));
        }
        if self.ancestors(parent).contains(&child) {
            return Err(ArmatureError::Structure(format!(
                "connecting {parent} -> {child} would create a cycle"
            )));
        }
        let motion = motion.validated()?;

        let index = JointIndex(self.joints.len());
        self.joints.push(Joint::new(index, parent, child, offset, motion));
        self.links[parent.0].children.push(index);
        self.links[child.0].parent_joint = Some(index);
        tracing::debug!(%index, %parent, %child, "Added joint");
        Ok(index)
    }

    /// [Armature::add_joint] followed by an initial [Armature::update]
    #[instrument(level = "debug", skip(self, offset))]
    pub fn connect(
        &mut self,
        parent: LinkIndex,
        child: LinkIndex,
        offset: B::Transformation,
        motion: Motion,
    ) -> Result<JointIndex, ArmatureError> {
        let index = self.add_joint(parent, child, offset, motion)?;
        self.update(index)?;
        Ok(index)
    }

    /// Overwrites the world transform of a link with `transform · local_offset` and notifies the
    /// renderer. Descendants are left stale; see [Armature::set_world_transform_and_propagate].
    #[instrument(level = "trace", skip(self, transform))]
    pub fn set_world_transform(&mut self, link: LinkIndex, transform: &B::Transformation) -> Result<(), ArmatureError> {
        self.link(link)?;
        self.apply_world_transform(link, transform);
        Ok(())
    }

    /// Updates all outgoing joints of `link` in insertion order (and thereby the whole subtree)
    #[instrument(level = "trace", skip(self))]
    pub fn propagate(&mut self, link: LinkIndex) -> Result<(), ArmatureError> {
        self.link(link)?;
        self.flush_link(link);
        Ok(())
    }

    #[instrument(level = "trace", skip(self, transform))]
    pub fn set_world_transform_and_propagate(
        &mut self,
        link: LinkIndex,
        transform: &B::Transformation,
    ) -> Result<(), ArmatureError> {
        self.link(link)?;
        self.apply_world_transform(link, transform);
        self.flush_link(link);
        Ok(())
    }

    /// Recomputes the child's world transform from the parent's and propagates through the
    /// child's subtree.
    #[instrument(level = "trace", skip(self))]
    pub fn update(&mut self, joint: JointIndex) -> Result<(), ArmatureError> {
        self.joint(joint)?;
        self.flush_joint(joint);
        Ok(())
    }

    /// Stages a new parameter (`base + value`). Nothing is recomputed until the joint is updated.
    #[instrument(level = "trace", skip(self))]
    pub fn set_parameter(&mut self, joint: JointIndex, value: f64) -> Result<(), ArmatureError> {
        self.joints
            .get_mut(joint.0)
            .ok_or(ArmatureError::UnknownJoint(joint.0))?
            .motion
            .set_parameter(value)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn set_parameter_and_update(&mut self, joint: JointIndex, value: f64) -> Result<(), ArmatureError> {
        self.set_parameter(joint, value)?;
        self.update(joint)
    }

    /// Flushes every tree of the forest starting from the current pose of its root
    #[instrument(level = "debug", skip(self))]
    pub fn update_all(&mut self) {
        for root in self.roots() {
            self.flush_link(root);
        }
    }

    pub fn link(&self, link: LinkIndex) -> Result<&Link<B>, ArmatureError> {
        self.links.get(link.0).ok_or(ArmatureError::UnknownLink(link.0))
    }

    pub fn joint(&self, joint: JointIndex) -> Result<&Joint<B>, ArmatureError> {
        self.joints.get(joint.0).ok_or(ArmatureError::UnknownJoint(joint.0))
    }

    pub fn links(&self) -> &[Link<B>] {
        &self.links
    }

    pub fn joints(&self) -> &[Joint<B>] {
        &self.joints
    }

    /// Links without a parent joint in the order they have been added
    pub fn roots(&self) -> Vec<LinkIndex> {
        self.links
            .iter()
            .filter(|link| link.is_root())
            .map(|link| link.index)
            .collect_vec()
    }

    pub fn world_transform(&self, link: LinkIndex) -> Result<&B::Transformation, ArmatureError> {
        Ok(&self.link(link)?.world)
    }

    pub fn parent_link(&self, link: LinkIndex) -> Result<Option<LinkIndex>, ArmatureError> {
        Ok(self.link(link)?.parent_joint.map(|joint| self.joints[joint.0].parent))
    }

    /// Children of a link in insertion order of the connecting joints
    pub fn child_links(&self, link: LinkIndex) -> Result<Vec<LinkIndex>, ArmatureError> {
        Ok(self
            .link(link)?
            .children
            .iter()
            .map(|joint| self.joints[joint.0].child)
            .collect_vec())
    }

    /// Number of joints between the link and its root
    pub fn depth(&self, link: LinkIndex) -> Result<usize, ArmatureError> {
        self.link(link)?;
        Ok(self.ancestors(link).len() - 1)
    }

    /// Depth-first, pre-order iteration over the subtree rooted at `root`. This is the order in
    /// which propagation notifies the renderer.
    pub fn iter_depth(&self, root: LinkIndex) -> Result<DepthFirstIterator<'_, B, R>, ArmatureError> {
        self.link(root)?;
        Ok(DepthFirstIterator::new(self, root))
    }

    /// Recomputes the world transform of a link from the stored offsets and joint parameters on
    /// the path from its root (whose cached world transform is taken as is). Equals the cached
    /// value whenever no staged parameter is pending.
    pub fn expected_world_transform(&self, link: LinkIndex) -> Result<B::Transformation, ArmatureError> {
        self.link(link)?;
        let path = self.ancestors(link);
        // path is ordered from the link to the root
        let root = &self.links[path[path.len() - 1].0];
        let mut chain = vec![root.world.clone()];
        for index in path.iter().rev().skip(1) {
            let current = &self.links[index.0];
            // only the root has no parent joint
            if let Some(joint) = current.parent_joint {
                let joint = &self.joints[joint.0];
                chain.push(joint.offset.clone());
                chain.push(joint.parametric_transform());
                chain.push(current.local_offset.clone());
            }
        }
        Ok(accumulate::<B>(chain.iter()))
    }

    /// Renderer id the next link will receive
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// The link itself followed by all its ancestors up to the root
    fn ancestors(&self, link: LinkIndex) -> Vec<LinkIndex> {
        let mut result = vec![link];
        let mut current = link;
        while let Some(joint) = self.links[current.0].parent_joint {
            current = self.joints[joint.0].parent;
            result.push(current);
        }
        result
    }

    fn apply_world_transform(&mut self, link: LinkIndex, transform: &B::Transformation) {
        let link = &mut self.links[link.0];
        link.set_world_transform(transform);
        self.renderer.set_transform(link.id, &B::to_matrix(&link.world));
    }

    // Indices stored in links and joints are valid by construction

    fn flush_link(&mut self, link: LinkIndex) {
        for position in 0..self.links[link.0].children.len() {
            let joint = self.links[link.0].children[position];
            self.flush_joint(joint);
        }
    }

    fn flush_joint(&mut self, joint: JointIndex) {
        let joint = &self.joints[joint.0];
        let child = joint.child;
        let transform = joint.transform_from(&self.links[joint.parent.0].world);
        tracing::trace!(joint = %joint.index, %child, "Propagating");
        self.apply_world_transform(child, &transform);
        self.flush_link(child);
    }
}

/*! Depth-first (pre-order) traversal of the links of an [Armature] */
use crate::armature::Armature;
use crate::joint::JointIndex;
use crate::link::{Link, LinkIndex};
use crate::renderer::Renderer;
use crate::rigid::Rigid;

/// Iterator over a subtree in the same order in which propagation visits the links:
/// a link, then the subtrees of its joints in insertion order.
pub struct DepthFirstIterator<'a, B, R>
where
    B: Rigid,
    R: Renderer,
{
    armature: &'a Armature<B, R>,
    stack: Vec<std::slice::Iter<'a, JointIndex>>,
    root: Option<LinkIndex>,
}

impl<'a, B, R> DepthFirstIterator<'a, B, R>
where
    B: Rigid,
    R: Renderer,
{
    pub(crate) fn new(armature: &'a Armature<B, R>, root: LinkIndex) -> Self {
        DepthFirstIterator {
            armature,
            stack: Vec::with_capacity(8),
            root: Some(root),
        }
    }
}

impl<'a, B, R> Iterator for DepthFirstIterator<'a, B, R>
where
    B: Rigid,
    R: Renderer,
{
    type Item = &'a Link<B>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.root.take() {
            let root = &self.armature.links[root.0];
            self.stack.push(root.children.iter());
            Some(root)
        } else if let Some(last) = self.stack.last_mut() {
            if let Some(joint_ref) = last.next() {
                let link = &self.armature.links[self.armature.joints[joint_ref.0].child.0];
                self.stack.push(link.children.iter());
                Some(link)
            } else {
                self.stack.pop();
                self.next()
            }
        } else {
            None
        }
    }
}

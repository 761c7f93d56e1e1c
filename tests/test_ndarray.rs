#![cfg(feature = "ndarray")]

use approx::assert_abs_diff_eq;
use armature::ndarray::{position, NdarrayBackend};
use armature::{load_links_and_joints, Armature, JointSpec, LinkSpec, Loaded, Recorder, Rigid, TracingRenderer};
use itertools::Itertools;
use ndarray::prelude::*;
use std::f64::consts::PI;

/// A robot arm with a base, two rotational links, a rack on a translational joint, and a gripper
/// with two fingers (all offsets in millimeters)
fn robot_arm() -> (Vec<LinkSpec>, Vec<JointSpec>) {
    let meshes = [
        "base_assembled.stl",
        "link1_assembled.stl",
        "link2_assembled_without_rack.stl",
        "rack.stl",
        "gripper_link_1.stl",
        "gripper_link_2.stl",
        "gripper_link_3_1.stl",
        "gripper_link_3_2.stl",
    ];
    let colors = [
        [0.5, 0.5, 0.5, 1.0],
        [0.3, 0.3, 0.3, 1.0],
        [0.5, 0.5, 0.5, 1.0],
        [0.2, 0.2, 0.2, 1.0],
        [0.2, 0.2, 0.2, 1.0],
        [0.4, 0.4, 0.4, 1.0],
        [0.3, 0.2, 0.15, 1.0],
        [0.3, 0.2, 0.15, 1.0],
    ];
    let offsets = [
        [0.0, 0.0, 479.42],
        [447.76, 0.0, 33.4],
        [293.37, -20.33, -8.04],
        [6.35, 0.0, -303.0],
        [24.7, 0.0, -85.77],
        [19.5, 15.52 - 36.0, 39.0],
        [19.5, 15.52, 39.0],
    ];
    let z = Some([0.0, 0.0, 1.0]);
    let axes = [z, z, z, None, Some([1.0, 0.0, 0.0]), z, z];
    let types = ["rotation", "rotation", "translation", "fixed", "rotation", "rotation", "rotation"];

    let links = LinkSpec::from_parallel(&meshes, Some(&colors[..])).unwrap();
    let joints = JointSpec::from_parallel(&offsets, &[0, 1, 2, 3, 4, 5, 5], &[1, 2, 3, 4, 5, 6, 7], &axes, &types).unwrap();
    (links, joints)
}

fn assert_consistent(arm: &Armature<NdarrayBackend, Recorder>) {
    for joint in arm.joints() {
        let parent = arm.link(joint.parent()).unwrap();
        let child = arm.link(joint.child()).unwrap();
        let expected = parent
            .world_transform()
            .dot(joint.offset())
            .dot(&joint.parametric_transform())
            .dot(child.local_offset());
        assert_abs_diff_eq!(child.world_transform(), &expected, epsilon = 1e-9);
        assert_abs_diff_eq!(
            child.world_transform(),
            &arm.expected_world_transform(joint.child()).unwrap(),
            epsilon = 1e-9
        );
    }
}

#[test_log::test]
fn test_robot_arm_rest_pose() {
    let (links, joints) = robot_arm();
    let mut arm = Armature::<NdarrayBackend, _>::new(Recorder::default());
    let Loaded { links, joints, skipped } = load_links_and_joints(&mut arm, &links, &joints).unwrap();

    assert_eq!(links.len(), 8);
    assert_eq!(joints.len(), 7);
    assert!(skipped.is_empty());
    assert_eq!(arm.roots(), vec![links[0]]);

    // In the rest pose all offsets simply add up
    assert_abs_diff_eq!(
        position(arm.world_transform(links[6]).unwrap()),
        array![
            0.0 + 447.76 + 293.37 + 6.35 + 24.7 + 19.5,
            0.0 + 0.0 - 20.33 + 0.0 + 0.0 + (15.52 - 36.0),
            479.42 + 33.4 - 8.04 - 303.0 - 85.77 + 39.0
        ],
        epsilon = 1e-9
    );
    assert_consistent(&arm);

    let order = arm.iter_depth(links[0]).unwrap().map(|link| link.index()).collect_vec();
    assert_eq!(order, links);
}

#[test_log::test]
fn test_robot_arm_animation() {
    let (links, joints) = robot_arm();
    let mut arm = Armature::<NdarrayBackend, _>::new(Recorder::default());
    let loaded = load_links_and_joints(&mut arm, &links, &joints).unwrap();
    let joints = loaded.joints;

    for i in 0..200 {
        let i = i as f64;
        let theta = (i + 1.0) / 1000.0 * 2.0 * PI;
        let theta2 = 0.5 * PI * (i / 500.0 * 2.0 * PI).sin().powi(2);
        let t = 0.2 * (1.0 - (i / 500.0 * 2.0 * PI).cos());

        // stage everything, then flush once from the first joint
        arm.set_parameter(joints[1], -2.0 * theta2).unwrap();
        arm.set_parameter(joints[4], theta).unwrap();
        arm.set_parameter(joints[5], -theta2).unwrap();
        arm.set_parameter(joints[6], theta2).unwrap();
        arm.set_parameter(joints[2], t).unwrap();

        arm.renderer_mut().clear();
        arm.set_parameter_and_update(joints[0], theta2).unwrap();

        // every link but the base is redrawn exactly once, depth-first
        assert_eq!(arm.renderer().transformed_ids(), (1..8u64).collect_vec());
        assert_consistent(&arm);
    }

    // the fixed joint between rack and gripper never changes their relative pose
    let rack = arm.world_transform(loaded.links[3]).unwrap();
    let gripper = arm.world_transform(loaded.links[4]).unwrap();
    assert_abs_diff_eq!(
        gripper,
        &rack.dot(&NdarrayBackend::translation(&[24.7, 0.0, -85.77])),
        epsilon = 1e-9
    );
}

#[test_log::test]
fn test_unknown_joint_type_leaves_gripper_detached() {
    let (links, mut joints) = robot_arm();
    joints[3].joint_type = "glued".to_string();

    let mut arm = Armature::<NdarrayBackend, _>::new(TracingRenderer);
    let loaded = load_links_and_joints(&mut arm, &links, &joints).unwrap();

    assert_eq!(loaded.joints.len(), 6);
    assert_eq!(loaded.skipped.iter().map(|(position, _)| *position).collect_vec(), vec![3]);
    assert_eq!(arm.roots(), vec![loaded.links[0], loaded.links[4]]);

    let before = arm.world_transform(loaded.links[6]).unwrap().clone();
    arm.set_parameter_and_update(loaded.joints[0], 1.0).unwrap();
    assert_eq!(arm.world_transform(loaded.links[6]).unwrap(), &before);
}

use charmorph_engine::math::{compose_matrix, euler_to_quaternion};
use charmorph_engine::skinning::{compute_skinning, SkinningInput};
use charmorph_engine::{Bone, DeformEngine, EngineError, Mesh, MorphTarget, Skeleton, SkinData};
use glam::{Mat4, Quat, Vec2, Vec3};
use std::sync::Arc;

const TOLERANCE: f32 = 1e-5;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn unit_cube() -> Mesh {
    let positions: Vec<Vec3> = (0..8)
        .map(|i| Vec3::new((i & 1) as f32, ((i >> 1) & 1) as f32, ((i >> 2) & 1) as f32))
        .collect();
    let normals = positions.iter().map(|p| (*p - Vec3::splat(0.5)).normalize()).collect();
    let uvs = positions.iter().map(|p| Vec2::new(p.x, p.y)).collect();
    let indices = vec![
        0, 2, 1, 1, 2, 3, // -z
        4, 5, 6, 5, 7, 6, // +z
        0, 1, 4, 1, 5, 4, // -y
        2, 6, 3, 3, 6, 7, // +y
        0, 4, 2, 2, 4, 6, // -x
        1, 3, 5, 3, 7, 5, // +x
    ];
    Mesh::new("cube", "Unit Cube", positions, normals, uvs, indices).unwrap()
}

#[test]
fn cube_morph_half_weight() {
    init_logger();
    let cube = unit_cube();
    let base = cube.flat_positions();

    let engine = DeformEngine::new();
    let handle = engine.create_mesh(&base).unwrap();
    engine.add_morph_target(handle, 0, &[0], &[1.0, 0.0, 0.0]).unwrap();

    let mut out = vec![0.0f32; cube.vertex_count() * 3];
    engine.recompute(handle, &[0], &[0.5], &mut out).unwrap();

    assert_eq!(&out[0..3], &[0.5, 0.0, 0.0]);
    assert_eq!(&out[3..], &base[3..]);
    assert!(engine.destroy_mesh(handle));
}

#[test]
fn empty_weight_set_reproduces_base() {
    let cube = unit_cube();
    let base = cube.flat_positions();
    let engine = DeformEngine::new();
    let handle = engine.create_mesh(&base).unwrap();
    engine.add_morph_target(handle, 3, &[1, 6], &[0.2, 0.3, 0.4, -1.0, 0.0, 2.0]).unwrap();

    let mut out = vec![f32::NAN; base.len()];
    engine.recompute(handle, &[], &[], &mut out).unwrap();
    assert_eq!(out, base);
}

#[test]
fn wrong_sized_output_is_rejected_untouched() {
    let cube = unit_cube();
    let engine = DeformEngine::new();
    let handle = engine.create_mesh(&cube.flat_positions()).unwrap();
    engine.add_morph_target(handle, 0, &[0], &[1.0, 0.0, 0.0]).unwrap();

    for len in [0usize, 21, 23, 27] {
        let mut out = vec![7.0f32; len];
        let err = engine.recompute(handle, &[0], &[1.0], &mut out).unwrap_err();
        assert_eq!(err, EngineError::BufferSizeMismatch { expected: 24, actual: len });
        assert!(out.iter().all(|&v| v == 7.0));
    }
}

#[test]
fn named_morph_range_is_advisory() {
    let engine = DeformEngine::new();
    let handle = engine.create_mesh(&[0.0; 6]).unwrap();
    let target = MorphTarget::new("jaw_width", [(1, Vec3::X)]).with_range(0.0, 2.0).unwrap();
    assert_eq!(target.clamp_weight(5.0), 2.0);
    engine.add_named_morph(handle, 9, target).unwrap();

    // 引擎不钳制：5.0 线性外推
    let mut out = [0.0f32; 6];
    engine.recompute(handle, &[9], &[5.0], &mut out).unwrap();
    assert_eq!(out[3], 5.0);
}

fn two_bone_skeleton() -> Arc<Skeleton> {
    Arc::new(
        Skeleton::new(vec![
            Bone::new(0, "root", -1),
            Bone::new(1, "child", 0).with_position(Vec3::new(0.0, 2.0, 0.0)),
        ])
        .unwrap(),
    )
}

#[test]
fn child_rotation_only_moves_child_weighted_vertices() {
    init_logger();
    let skeleton = two_bone_skeleton();

    // 0..4 绑定到根骨骼，4..8 绑定到子骨骼
    let positions = vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(0.0, 2.5, 0.0),
        Vec3::new(1.0, 2.5, 0.0),
        Vec3::new(0.0, 3.0, 0.0),
        Vec3::new(1.0, 3.0, 1.0),
    ];
    let normals = vec![Vec3::X; 8];
    let joints: Vec<[i32; 4]> = (0..8).map(|i| [if i < 4 { 0 } else { 1 }, 0, 0, 0]).collect();
    let weights = vec![[1.0, 0.0, 0.0, 0.0]; 8];
    let skin = SkinData::new(joints, weights, skeleton.bone_count()).unwrap();

    let base: Vec<f32> = positions.iter().flat_map(|p| p.to_array()).collect();
    let engine = DeformEngine::new();
    let handle = engine.create_skinned_mesh(&base, skeleton).unwrap();
    assert!(engine.update_bone(handle, 1, euler_to_quaternion(0.0, 0.0, 90.0)).unwrap());

    let mut flat = vec![0.0f32; 32];
    assert_eq!(engine.copy_skinning_matrices(handle, &mut flat).unwrap(), 2);
    let matrices = [
        Mat4::from_cols_slice(&flat[0..16]),
        Mat4::from_cols_slice(&flat[16..32]),
    ];

    let output = compute_skinning(&SkinningInput {
        positions: &positions,
        normals: &normals,
        skin: &skin,
        bone_matrices: &matrices,
    })
    .unwrap();

    for i in 0..8 {
        if skin.references_bone(i, 1) {
            assert!(
                !output.positions[i].abs_diff_eq(positions[i], TOLERANCE),
                "child vertex {} should move",
                i
            );
        } else {
            assert_eq!(output.positions[i], positions[i], "root vertex {} moved", i);
            assert_eq!(output.normals[i], normals[i]);
        }
    }
    // 关节上方 1 个单位的点绕 Z 轴转到 -X
    assert!(output.positions[6].abs_diff_eq(Vec3::new(-1.0, 2.0, 0.0), TOLERANCE));
    assert!(output.positions[5].abs_diff_eq(Vec3::new(-0.5, 3.0, 0.0), TOLERANCE));
}

#[test]
fn destroy_and_recreate_restores_bind_pose() {
    let skeleton = two_bone_skeleton();
    let base = [0.0f32; 9];
    let engine = DeformEngine::new();

    let handle = engine.create_skinned_mesh(&base, skeleton.clone()).unwrap();
    let mut bind = vec![0.0f32; 32];
    engine.copy_skinning_matrices(handle, &mut bind).unwrap();

    engine.update_bone(handle, 0, Quat::from_rotation_y(1.3)).unwrap();
    engine.update_bone(handle, 1, Quat::from_rotation_x(-0.4)).unwrap();
    let mut posed = vec![0.0f32; 32];
    engine.copy_skinning_matrices(handle, &mut posed).unwrap();
    assert_ne!(posed, bind);

    assert!(engine.destroy_mesh(handle));
    assert!(matches!(
        engine.update_bone(handle, 0, Quat::IDENTITY),
        Err(EngineError::UnknownHandle(_))
    ));

    let recreated = engine.create_skinned_mesh(&base, skeleton).unwrap();
    let mut again = vec![0.0f32; 32];
    engine.copy_skinning_matrices(recreated, &mut again).unwrap();
    assert_eq!(again, bind);
    assert!(Mat4::from_cols_slice(&again[16..32]).abs_diff_eq(Mat4::IDENTITY, TOLERANCE));
}

#[test]
fn identity_euler_composes_to_identity() {
    let q = euler_to_quaternion(0.0, 0.0, 0.0);
    assert_eq!(q, Quat::from_xyzw(0.0, 0.0, 0.0, 1.0));
    assert_eq!(compose_matrix(Vec3::ZERO, q, Vec3::ONE), Mat4::IDENTITY);
}

#[test]
fn distinct_handles_run_concurrently() {
    let engine = DeformEngine::new();
    let cube = unit_cube();
    let base = cube.flat_positions();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let h = engine.create_mesh(&base).unwrap();
            engine.add_morph_target(h, 0, &[i], &[0.0, 1.0, 0.0]).unwrap();
            h
        })
        .collect();

    std::thread::scope(|scope| {
        for (i, &handle) in handles.iter().enumerate() {
            let engine = &engine;
            let base = &base;
            scope.spawn(move || {
                let mut out = vec![0.0f32; base.len()];
                for step in 0..100 {
                    let w = step as f32 / 100.0;
                    engine.recompute(handle, &[0], &[w], &mut out).unwrap();
                }
                assert_eq!(out[i * 3 + 1], base[i * 3 + 1] + 0.99);
            });
        }
    });

    for handle in handles {
        assert!(engine.destroy_mesh(handle));
    }
    assert_eq!(engine.mesh_count(), 0);
}

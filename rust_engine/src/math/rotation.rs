//! 旋转：四元数 ↔ 矩阵、欧拉角 → 四元数

use glam::{Mat4, Quat, Vec4};

/// 四元数转旋转矩阵（方向余弦公式）
///
/// 不做归一化，也没有三角函数分支；单位四元数 (0, 0, 0, 1) 精确得到单位矩阵。
pub fn quaternion_to_matrix(q: Quat) -> Mat4 {
    let (x, y, z, w) = (q.x, q.y, q.z, q.w);

    let x2 = x * x;
    let y2 = y * y;
    let z2 = z * z;
    let xy = x * y;
    let xz = x * z;
    let yz = y * z;
    let wx = w * x;
    let wy = w * y;
    let wz = w * z;

    Mat4::from_cols(
        Vec4::new(1.0 - 2.0 * (y2 + z2), 2.0 * (xy + wz), 2.0 * (xz - wy), 0.0),
        Vec4::new(2.0 * (xy - wz), 1.0 - 2.0 * (x2 + z2), 2.0 * (yz + wx), 0.0),
        Vec4::new(2.0 * (xz + wy), 2.0 * (yz - wx), 1.0 - 2.0 * (x2 + y2), 0.0),
        Vec4::W,
    )
}

/// 从矩阵中提取旋转部分（假定无剪切、缩放为正）
pub fn matrix_to_quaternion(m: &Mat4) -> Quat {
    let (_, rotation, _) = m.to_scale_rotation_translation();
    rotation
}

/// 欧拉角（角度制）转四元数
///
/// 内旋 XYZ 顺序：q = qx(pitch) * qy(yaw) * qz(roll)，半角公式展开。
pub fn euler_to_quaternion(pitch: f32, yaw: f32, roll: f32) -> Quat {
    let hp = (pitch as f64).to_radians() * 0.5;
    let hy = (yaw as f64).to_radians() * 0.5;
    let hr = (roll as f64).to_radians() * 0.5;

    let (sx, cx) = hp.sin_cos();
    let (sy, cy) = hy.sin_cos();
    let (sz, cz) = hr.sin_cos();

    let x = sx * cy * cz + cx * sy * sz;
    let y = cx * sy * cz - sx * cy * sz;
    let z = cx * cy * sz + sx * sy * cz;
    let w = cx * cy * cz - sx * sy * sz;

    Quat::from_xyzw(x as f32, y as f32, z as f32, w as f32)
}

//! Mathematical type definitions and small helpers.
//!
//! Rotations travel through the pipeline in two equivalent encodings: as part
//! of an [`Iso3`] rigid transform, and as a Rodrigues rotation vector (the
//! axis of rotation scaled by the angle). The helpers here convert between
//! the two.

use nalgebra::{
    Isometry3, Matrix3, Matrix3x4, Matrix4, Point2, Point3, Translation3, UnitQuaternion,
    Vector2, Vector3,
};

/// Scalar type used throughout the library (currently `f64`).
pub type Real = f64;

/// 2D vector with [`Real`] components.
pub type Vec2 = Vector2<Real>;
/// 3D vector with [`Real`] components.
pub type Vec3 = Vector3<Real>;
/// 2D point with [`Real`] coordinates.
pub type Pt2 = Point2<Real>;
/// 3D point with [`Real`] coordinates.
pub type Pt3 = Point3<Real>;
/// 3×3 matrix with [`Real`] entries.
pub type Mat3 = Matrix3<Real>;
/// 3×4 matrix with [`Real`] entries (camera projection matrices).
pub type Mat34 = Matrix3x4<Real>;
/// 4×4 matrix with [`Real`] entries.
pub type Mat4 = Matrix4<Real>;
/// 3D rigid transform (SE(3)) using [`Real`].
pub type Iso3 = Isometry3<Real>;

/// Homogeneous lift of a pixel point, `(x, y) -> (x, y, 1)`.
pub fn to_homogeneous(p: &Pt2) -> Vec3 {
    Vec3::new(p.x, p.y, 1.0)
}

/// Perspective division of a homogeneous image vector `(x, y, w)`.
///
/// `w` must be nonzero.
pub fn from_homogeneous(v: &Vec3) -> Pt2 {
    Pt2::new(v.x / v.z, v.y / v.z)
}

/// Build a rigid transform from a Rodrigues rotation vector and a translation.
pub fn iso_from_rodrigues(rvec: &Vec3, tvec: &Vec3) -> Iso3 {
    let rotation = UnitQuaternion::from_scaled_axis(*rvec);
    Iso3::from_parts(Translation3::from(*tvec), rotation)
}

/// Decompose a rigid transform into a Rodrigues rotation vector and a translation.
pub fn rodrigues_from_iso(iso: &Iso3) -> (Vec3, Vec3) {
    (iso.rotation.scaled_axis(), iso.translation.vector)
}

use std::f32::consts::TAU;

/// CPU-side triangle mesh: parallel position/normal arrays plus a
/// counter-clockwise triangle index list.
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u16>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Surface of revolution around Z: a closed ring of `slices + 1` top/bottom
/// vertex pairs. Normals are the outward radial direction, a cylindrical
/// approximation that suits the stylized shading.
///
/// `slices` must be at least 1; zero yields an empty index buffer.
pub fn build_lathe(radius_top: f32, radius_bottom: f32, height: f32, slices: u16) -> MeshData {
    let ring = slices as usize + 1;
    let mut positions = Vec::with_capacity(2 * ring);
    let mut normals = Vec::with_capacity(2 * ring);
    let mut indices = Vec::with_capacity(6 * slices as usize);
    for i in 0..=slices {
        let ang = f32::from(i) / f32::from(slices) * TAU;
        let (sin, cos) = ang.sin_cos();
        positions.push([radius_top * cos, radius_top * sin, height / 2.0]);
        positions.push([radius_bottom * cos, radius_bottom * sin, -height / 2.0]);
        normals.push([cos, sin, 0.0]);
        normals.push([cos, sin, 0.0]);
        if i < slices {
            let a = i * 2;
            indices.extend_from_slice(&[a, a + 1, a + 2, a + 1, a + 3, a + 2]);
        }
    }
    MeshData {
        positions,
        normals,
        indices,
    }
}

/// Triangle fan from a center vertex to `slices + 1` rim vertices at height
/// `z`, facing +Z.
pub fn build_disc(radius: f32, z: f32, slices: u16) -> MeshData {
    let mut positions = vec![[0.0, 0.0, z]];
    let mut normals = vec![[0.0, 0.0, 1.0]];
    let mut indices = Vec::with_capacity(3 * slices as usize);
    for i in 0..=slices {
        let ang = f32::from(i) / f32::from(slices) * TAU;
        positions.push([ang.cos() * radius, ang.sin() * radius, z]);
        normals.push([0.0, 0.0, 1.0]);
        if i > 0 {
            indices.extend_from_slice(&[0, i, i + 1]);
        }
    }
    MeshData {
        positions,
        normals,
        indices,
    }
}

/// Flat ribbon of `segments + 1` vertex pairs centered on the Y axis at depth
/// `z`, one quad (two triangles) per segment, facing +Z.
pub fn build_strap_band(width: f32, length: f32, z: f32, segments: u16) -> MeshData {
    let pairs = segments as usize + 1;
    let mut positions = Vec::with_capacity(2 * pairs);
    let mut normals = Vec::with_capacity(2 * pairs);
    let mut indices = Vec::with_capacity(6 * segments as usize);
    for i in 0..=segments {
        let t = f32::from(i) / f32::from(segments);
        let y = (t - 0.5) * length;
        positions.push([-width / 2.0, y, z]);
        positions.push([width / 2.0, y, z]);
        normals.push([0.0, 0.0, 1.0]);
        normals.push([0.0, 0.0, 1.0]);
        if i < segments {
            let a = i * 2;
            indices.extend_from_slice(&[a, a + 1, a + 2, a + 1, a + 3, a + 2]);
        }
    }
    MeshData {
        positions,
        normals,
        indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_indices_in_bounds(mesh: &MeshData) {
        assert_eq!(mesh.indices.len() % 3, 0);
        for &idx in &mesh.indices {
            assert!((idx as usize) < mesh.vertex_count());
        }
    }

    #[test]
    fn lathe_counts() {
        for slices in [1u16, 2, 7, 96] {
            let mesh = build_lathe(1.2, 1.2, 0.5, slices);
            assert_eq!(mesh.vertex_count(), 2 * (slices as usize + 1));
            assert_eq!(mesh.triangle_count(), 2 * slices as usize);
            assert_eq!(mesh.normals.len(), mesh.positions.len());
            assert_indices_in_bounds(&mesh);
        }
    }

    #[test]
    fn lathe_normals_are_unit_radial() {
        let mesh = build_lathe(1.3, 1.25, 0.15, 24);
        for n in &mesh.normals {
            assert!(n[2].abs() < 1e-6);
            let len = (n[0] * n[0] + n[1] * n[1]).sqrt();
            assert!((len - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn disc_counts_and_normals() {
        for slices in [1u16, 3, 96] {
            let mesh = build_disc(1.1, 0.26, slices);
            assert_eq!(mesh.vertex_count(), slices as usize + 2);
            assert_eq!(mesh.triangle_count(), slices as usize);
            assert_indices_in_bounds(&mesh);
            for n in &mesh.normals {
                assert_eq!(*n, [0.0, 0.0, 1.0]);
            }
        }
    }

    #[test]
    fn disc_rim_lies_at_height() {
        let mesh = build_disc(2.0, 0.5, 8);
        for p in &mesh.positions {
            assert_eq!(p[2], 0.5);
        }
    }

    #[test]
    fn strap_counts_and_extent() {
        let mesh = build_strap_band(0.9, 3.0, -0.1, 40);
        assert_eq!(mesh.vertex_count(), 2 * 41);
        assert_eq!(mesh.triangle_count(), 2 * 40);
        assert_indices_in_bounds(&mesh);
        for n in &mesh.normals {
            assert_eq!(*n, [0.0, 0.0, 1.0]);
        }
        let min_y = mesh.positions.iter().map(|p| p[1]).fold(f32::MAX, f32::min);
        let max_y = mesh.positions.iter().map(|p| p[1]).fold(f32::MIN, f32::max);
        assert!((min_y + 1.5).abs() < 1e-5);
        assert!((max_y - 1.5).abs() < 1e-5);
        for p in &mesh.positions {
            assert!((p[0].abs() - 0.45).abs() < 1e-6);
            assert_eq!(p[2], -0.1);
        }
    }
}

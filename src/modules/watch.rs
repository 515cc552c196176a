//! The five-part watch model: dimensions, materials, draw order and the pure
//! per-frame transform computation.

use glam::{Mat3, Mat4};

use crate::modules::geometry::{MeshData, build_disc, build_lathe, build_strap_band};
use crate::modules::transform;
use crate::modules::view::ViewState;

pub const FOV_DEGREES: f32 = 35.0;
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;
pub const LIGHT_POSITION: [f32; 3] = [3.0, 3.0, 3.0];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchPart {
    Body,
    Bezel,
    Crystal,
    Strap1,
    Strap2,
}

/// One draw with its material constants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCommand {
    pub part: WatchPart,
    pub gloss: f32,
    pub base_color: [f32; 3],
}

/// Fixed back-to-front order; depth testing, not this order, provides
/// correctness.
pub fn draw_list() -> [DrawCommand; 5] {
    const STRAP_GLOSS: f32 = 16.0;
    const STRAP_COLOR: [f32; 3] = [0.25, 0.13, 0.08];
    [
        DrawCommand {
            part: WatchPart::Body,
            gloss: 64.0,
            base_color: [0.70, 0.72, 0.75],
        },
        DrawCommand {
            part: WatchPart::Bezel,
            gloss: 96.0,
            base_color: [0.80, 0.78, 0.72],
        },
        DrawCommand {
            part: WatchPart::Crystal,
            gloss: 256.0,
            base_color: [0.95, 0.98, 1.00],
        },
        DrawCommand {
            part: WatchPart::Strap1,
            gloss: STRAP_GLOSS,
            base_color: STRAP_COLOR,
        },
        DrawCommand {
            part: WatchPart::Strap2,
            gloss: STRAP_GLOSS,
            base_color: STRAP_COLOR,
        },
    ]
}

/// Build the geometry for one part of the watch.
pub fn build_part(part: WatchPart) -> MeshData {
    match part {
        WatchPart::Body => build_lathe(1.2, 1.2, 0.5, 96),
        WatchPart::Bezel => build_lathe(1.3, 1.25, 0.15, 96),
        WatchPart::Crystal => build_disc(1.1, 0.26, 96),
        WatchPart::Strap1 => build_strap_band(0.9, 3.0, -0.1, 40),
        WatchPart::Strap2 => build_strap_band(0.9, 3.0, 0.1, 40),
    }
}

pub struct FrameTransforms {
    pub mvp: Mat4,
    pub normal: Mat3,
}

/// Recompute the frame's matrices from the current view state. Nothing here
/// persists between frames.
pub fn frame_transforms(view: &ViewState, aspect: f32) -> FrameTransforms {
    let proj = transform::perspective(FOV_DEGREES, aspect, NEAR_PLANE, FAR_PLANE);
    let model = transform::rotation_yx(view.rotation.x, view.rotation.y);
    let mvp = proj * model * transform::scale(view.zoom);
    FrameTransforms {
        mvp,
        normal: transform::normal_matrix(model),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_list_order_and_materials() {
        let list = draw_list();
        assert_eq!(list.len(), 5);
        let parts: Vec<WatchPart> = list.iter().map(|c| c.part).collect();
        assert_eq!(
            parts,
            vec![
                WatchPart::Body,
                WatchPart::Bezel,
                WatchPart::Crystal,
                WatchPart::Strap1,
                WatchPart::Strap2,
            ]
        );
        assert_eq!(list[0].gloss, 64.0);
        assert_eq!(list[0].base_color, [0.70, 0.72, 0.75]);
        assert_eq!(list[1].gloss, 96.0);
        assert_eq!(list[1].base_color, [0.80, 0.78, 0.72]);
        assert_eq!(list[2].gloss, 256.0);
        assert_eq!(list[2].base_color, [0.95, 0.98, 1.00]);
        for cmd in &list[3..] {
            assert_eq!(cmd.gloss, 16.0);
            assert_eq!(cmd.base_color, [0.25, 0.13, 0.08]);
        }
    }

    #[test]
    fn every_part_builds_valid_geometry() {
        for cmd in draw_list() {
            let mesh = build_part(cmd.part);
            assert!(mesh.triangle_count() > 0);
            assert_eq!(mesh.indices.len() % 3, 0);
            assert_eq!(mesh.normals.len(), mesh.positions.len());
            for &idx in &mesh.indices {
                assert!((idx as usize) < mesh.vertex_count());
            }
        }
    }

    #[test]
    fn frame_transforms_are_finite_and_zoom_scales_mvp() {
        let view = ViewState::default();
        let frame = frame_transforms(&view, 1.0);
        assert!(frame.mvp.to_cols_array().iter().all(|v| v.is_finite()));
        assert!(frame.normal.to_cols_array().iter().all(|v| v.is_finite()));

        let mut zoomed = ViewState::default();
        zoomed.zoom = 1.6;
        let wide = frame_transforms(&zoomed, 1.0);
        // Zoom is baked into the MVP but leaves the normal matrix alone.
        assert!(!wide.mvp.abs_diff_eq(frame.mvp, 1e-6));
        assert!(wide.normal.abs_diff_eq(frame.normal, 1e-6));
    }
}

//! Overlay projection
//!
//! Final per-actor render decision: visibility policy, display-mode gating
//! and world-to-screen placement.

use ffradar_types::{DisplayMode, OverlayConfig, Rgb};
use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::filter::OverlaySettings;
use crate::layout::{ActorId, ActorRecord, CameraState};

const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 5000.0;
/// Clip-space w at or below this is treated as behind the camera
const MIN_CLIP_W: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionParams {
    pub close_range: f32,
    pub look_at_cone_deg: f32,
    pub viewport: Vec2,
}

impl From<&OverlayConfig> for ProjectionParams {
    fn from(config: &OverlayConfig) -> Self {
        Self {
            close_range: config.close_range,
            look_at_cone_deg: config.look_at_cone_deg,
            viewport: Vec2::new(
                config.viewport_width.max(1) as f32,
                config.viewport_height.max(1) as f32,
            ),
        }
    }
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self::from(&OverlayConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderDecision {
    pub actor_id: ActorId,
    pub draw: bool,
    /// Pixel position, top-left origin; `None` when off screen
    pub screen_pos: Option<Vec2>,
    pub label: String,
    pub color: Rgb,
    pub highlighted: bool,
}

/// Whether the actor lies inside the camera's look-at cone
pub fn is_looked_at(position: Vec3, camera: &CameraState, cone_deg: f32) -> bool {
    let Some(dir) = (position - camera.position).try_normalize() else {
        return true;
    };
    let cos = camera.forward.dot(dir).clamp(-1.0, 1.0);
    cos.acos().to_degrees() <= cone_deg
}

pub fn view_projection(camera: &CameraState, viewport: Vec2) -> Mat4 {
    let up = if camera.forward.cross(Vec3::Y).length_squared() < 1e-6 {
        Vec3::Z
    } else {
        Vec3::Y
    };
    let view = Mat4::look_to_rh(camera.position, camera.forward, up);
    let proj = Mat4::perspective_rh(camera.fov_y, viewport.x / viewport.y, Z_NEAR, Z_FAR);
    proj * view
}

/// Project a world position to pixels. `None` when behind the camera or
/// outside the viewport.
pub fn world_to_screen(position: Vec3, view_proj: &Mat4, viewport: Vec2) -> Option<Vec2> {
    let clip = *view_proj * Vec4::new(position.x, position.y, position.z, 1.0);
    if !clip.is_finite() || clip.w <= MIN_CLIP_W {
        return None;
    }

    let ndc = clip.truncate() / clip.w;
    if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 {
        return None;
    }

    Some(Vec2::new(
        (ndc.x + 1.0) * 0.5 * viewport.x,
        (1.0 - ndc.y) * 0.5 * viewport.y,
    ))
}

fn mode_allows(
    mode: DisplayMode,
    actor: &ActorRecord,
    camera: &CameraState,
    params: &ProjectionParams,
) -> bool {
    if mode.requires_close() && actor.local_distance > params.close_range {
        return false;
    }
    !mode.requires_look_at() || is_looked_at(actor.position, camera, params.look_at_cone_deg)
}

/// Decide how (and whether) one actor is drawn this frame
pub fn project(
    actor: &ActorRecord,
    settings: &OverlaySettings,
    camera: &CameraState,
    params: &ProjectionParams,
) -> RenderDecision {
    let view_proj = view_projection(camera, params.viewport);
    project_with(actor, settings, camera, params, &view_proj)
}

/// [`project`] with a precomputed view-projection matrix
pub fn project_with(
    actor: &ActorRecord,
    settings: &OverlaySettings,
    camera: &CameraState,
    params: &ProjectionParams,
    view_proj: &Mat4,
) -> RenderDecision {
    let screen_pos = world_to_screen(actor.position, view_proj, params.viewport);
    let draw = settings.visible
        && screen_pos.is_some()
        && mode_allows(settings.label_mode, actor, camera, params);

    RenderDecision {
        actor_id: actor.stable_id,
        draw,
        screen_pos,
        label: settings.label_text.clone(),
        color: settings.color,
        highlighted: settings.highlighted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffradar_types::ActorType;

    fn camera() -> CameraState {
        CameraState {
            position: Vec3::ZERO,
            forward: Vec3::NEG_Z,
            fov_y: std::f32::consts::FRAC_PI_2,
        }
    }

    fn actor(position: Vec3, distance: f32) -> ActorRecord {
        ActorRecord {
            stable_id: ActorId(7),
            npc_id: 1,
            actor_type: ActorType::Monster,
            display_name: "Goobbue".to_string(),
            position,
            local_distance: distance,
            slot: 3,
        }
    }

    fn settings(mode: DisplayMode) -> OverlaySettings {
        OverlaySettings {
            visible: true,
            color: [1, 2, 3],
            label_mode: mode,
            label_text: "Goobbue".to_string(),
            highlighted: false,
        }
    }

    #[test]
    fn test_center_of_view_projects_to_center() {
        let params = ProjectionParams::default();
        let decision = project(
            &actor(Vec3::new(0.0, 0.0, -10.0), 10.0),
            &settings(DisplayMode::WhenClose),
            &camera(),
            &params,
        );
        assert!(decision.draw);
        let pos = decision.screen_pos.unwrap();
        assert!((pos.x - 960.0).abs() < 0.01);
        assert!((pos.y - 540.0).abs() < 0.01);
        assert_eq!(decision.label, "Goobbue");
        assert_eq!(decision.color, [1, 2, 3]);
    }

    #[test]
    fn test_screen_axes() {
        let params = ProjectionParams::default();
        let view_proj = view_projection(&camera(), params.viewport);
        let right_up = world_to_screen(Vec3::new(2.0, 2.0, -10.0), &view_proj, params.viewport).unwrap();
        assert!(right_up.x > 960.0);
        assert!(right_up.y < 540.0);
    }

    #[test]
    fn test_behind_camera_not_drawn() {
        let decision = project(
            &actor(Vec3::new(0.0, 0.0, 10.0), 10.0),
            &settings(DisplayMode::WhenClose),
            &camera(),
            &ProjectionParams::default(),
        );
        assert!(!decision.draw);
        assert!(decision.screen_pos.is_none());
    }

    #[test]
    fn test_outside_viewport_not_drawn() {
        let decision = project(
            &actor(Vec3::new(100.0, 0.0, -1.0), 5.0),
            &settings(DisplayMode::WhenClose),
            &camera(),
            &ProjectionParams::default(),
        );
        assert!(!decision.draw);
    }

    #[test]
    fn test_invisible_never_drawn() {
        let mut hidden = settings(DisplayMode::WhenClose);
        hidden.visible = false;
        let decision = project(
            &actor(Vec3::new(0.0, 0.0, -5.0), 5.0),
            &hidden,
            &camera(),
            &ProjectionParams::default(),
        );
        assert!(!decision.draw);
    }

    #[test]
    fn test_when_close_uses_distance() {
        let params = ProjectionParams::default();
        let near = actor(Vec3::new(0.0, 0.0, -5.0), params.close_range);
        let far = actor(Vec3::new(0.0, 0.0, -5.0), params.close_range + 0.1);
        let unknown = actor(Vec3::new(0.0, 0.0, -5.0), f32::INFINITY);

        let s = settings(DisplayMode::WhenClose);
        assert!(project(&near, &s, &camera(), &params).draw);
        assert!(!project(&far, &s, &camera(), &params).draw);
        assert!(!project(&unknown, &s, &camera(), &params).draw);
    }

    #[test]
    fn test_when_looking_at_uses_cone() {
        let params = ProjectionParams::default();
        let s = settings(DisplayMode::WhenLookingAt);

        // ~5.7 degrees off axis, far away
        let inside = actor(Vec3::new(1.0, 0.0, -10.0), 500.0);
        // ~26.6 degrees off axis, still on screen
        let outside = actor(Vec3::new(5.0, 0.0, -10.0), 1.0);

        assert!(project(&inside, &s, &camera(), &params).draw);
        assert!(!project(&outside, &s, &camera(), &params).draw);
    }

    #[test]
    fn test_close_and_looking_at() {
        let params = ProjectionParams::default();
        let s = settings(DisplayMode::WhenCloseAndLookingAt);

        assert!(project(&actor(Vec3::new(0.0, 0.0, -5.0), 5.0), &s, &camera(), &params).draw);
        assert!(!project(&actor(Vec3::new(0.0, 0.0, -5.0), 50.0), &s, &camera(), &params).draw);
        assert!(!project(&actor(Vec3::new(5.0, 0.0, -10.0), 5.0), &s, &camera(), &params).draw);
    }

    #[test]
    fn test_highlight_passes_through() {
        let mut s = settings(DisplayMode::WhenClose);
        s.highlighted = true;
        let decision = project(
            &actor(Vec3::new(0.0, 0.0, 10.0), 5.0),
            &s,
            &camera(),
            &ProjectionParams::default(),
        );
        assert!(decision.highlighted);
        assert!(!decision.draw);
    }

    #[test]
    fn test_vertical_camera_does_not_degenerate() {
        let cam = CameraState {
            forward: Vec3::NEG_Y,
            ..camera()
        };
        let params = ProjectionParams::default();
        let view_proj = view_projection(&cam, params.viewport);
        assert!(world_to_screen(Vec3::new(0.0, -10.0, 0.0), &view_proj, params.viewport).is_some());
    }
}

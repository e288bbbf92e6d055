//! Split-screen compositor
//!
//! Each half of the frame belongs to one observer and is composed from that
//! observer's position and heading only: backdrop, walls with fog, then
//! sprites back to front against that observer's own depth buffer.

use serde::{Deserialize, Serialize};

use super::frame::{Frame, Rect, Rgb};
use super::palette::Palette;
use super::raycast::{DepthBuffer, RaycastConfig};
use super::sky::{self, SkyConfig};
use super::sprite::{self, Billboard, PlayerStyle, SpriteConfig};
use crate::sim::{DuelState, PlayerSlot};

/// Everything the compositor needs besides the duel state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub raycast: RaycastConfig,
    pub sprites: SpriteConfig,
    pub sky: SkyConfig,
    pub palette: Palette,
    pub players: [PlayerStyle; 2],
    pub divider_width: usize,
    pub divider_color: Rgb,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            raycast: RaycastConfig::default(),
            sprites: SpriteConfig::default(),
            sky: SkyConfig::default(),
            palette: Palette::default(),
            players: PlayerSlot::BOTH.map(PlayerStyle::for_slot),
            divider_width: 1,
            divider_color: Rgb::WHITE,
        }
    }
}

/// Left and right halves of a `width` x `height` frame
pub fn split(width: usize, height: usize) -> [Rect; 2] {
    let half = width / 2;
    [Rect::new(0, 0, half, height), Rect::new(half, 0, half, height)]
}

/// Draw one column strip per ray
fn draw_walls(frame: &mut Frame, view: Rect, depth: &DepthBuffer, config: &RenderConfig) {
    let rays = depth.len().max(1);
    let column_w = view.w as f32 / rays as f32;
    let view_h = view.h as f32;
    let horizon = view.y as f32 + view_h / 2.0;

    for (i, hit) in depth.hits().iter().enumerate() {
        let Some(material) = hit.material else {
            continue;
        };
        let x0 = view.x as f32 + i as f32 * column_w;
        let x1 = view.x as f32 + (i + 1) as f32 * column_w;
        let wall_h = config
            .raycast
            .wall_height(hit.distance, view_h)
            .min(view_h * 4.0);
        let color = config
            .palette
            .color(material)
            .scale(config.raycast.fog(hit.distance));
        frame.fill_rect(
            x0 as i32,
            (horizon - wall_h / 2.0) as i32,
            ((x1.ceil() - x0.floor()) as i32).max(1),
            wall_h.ceil() as i32,
            color,
        );
    }
}

enum SpriteKind {
    Rider(PlayerSlot),
    Projectile(usize),
}

/// Compose one observer's view into `view`. Returns that observer's depth buffer.
pub fn render_view(
    frame: &mut Frame,
    view: Rect,
    observer_slot: PlayerSlot,
    state: &DuelState,
    config: &RenderConfig,
) -> DepthBuffer {
    let fov = config.raycast.fov;
    let observer = &state.player(observer_slot).body;

    frame.set_clip(view);
    sky::paint_backdrop(frame, view, &config.sky);
    sky::draw_sun(frame, view, observer, &config.sky, fov);
    sky::draw_clouds(frame, view, observer, &state.clouds, &config.sky, fov);

    let depth = DepthBuffer::cast(&state.grid, observer.pos, observer.heading, &config.raycast);
    draw_walls(frame, view, &depth, config);

    let mut sprites: Vec<(Billboard, SpriteKind)> = Vec::with_capacity(state.projectiles.len() + 1);
    let target_slot = observer_slot.opponent();
    if let Some(b) = sprite::project(observer, state.player(target_slot).pos(), view, fov) {
        sprites.push((b, SpriteKind::Rider(target_slot)));
    }
    for (i, p) in state.projectiles.iter().enumerate() {
        if let Some(b) = sprite::project(observer, p.body.pos, view, fov) {
            sprites.push((b, SpriteKind::Projectile(i)));
        }
    }
    // Back to front
    sprites.sort_by(|a, b| b.0.distance.total_cmp(&a.0.distance));

    let sun_bearing = config.sky.sun_bearing(observer.heading);
    for (billboard, kind) in &sprites {
        match *kind {
            SpriteKind::Rider(slot) => {
                let style = &config.players[slot.index()];
                sprite::draw_laser(frame, view, billboard, style.laser, &config.sprites);
                if billboard.visible_in(&depth, fov, config.sprites.rider_tolerance) {
                    sprite::draw_rider(
                        frame,
                        view,
                        observer,
                        &state.player(slot).body,
                        billboard,
                        style,
                        &config.sprites,
                        sun_bearing,
                    );
                }
            }
            SpriteKind::Projectile(i) => {
                if billboard.visible_in(&depth, fov, config.sprites.projectile_tolerance) {
                    let owner = state.projectiles[i].owner;
                    sprite::draw_projectile(frame, view, billboard, config.players[owner.index()].laser);
                }
            }
        }
    }

    frame.clear_clip();
    depth
}

/// Compose both halves and the divider. Returns each observer's depth buffer.
pub fn render_split(frame: &mut Frame, state: &DuelState, config: &RenderConfig) -> [DepthBuffer; 2] {
    frame.clear_clip();
    frame.fill(Rgb::BLACK);
    let views = split(frame.width(), frame.height());
    let depth = PlayerSlot::BOTH.map(|slot| render_view(frame, views[slot.index()], slot, state, config));

    if config.divider_width > 0 {
        let seam = views[1].x as i32;
        let w = config.divider_width as i32;
        frame.fill_rect(seam - w / 2, 0, w, frame.height() as i32, config.divider_color);
    }
    depth
}

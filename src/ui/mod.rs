//! HUD Overlays (graphical mode)
//!
//! Player vitals, the four skill slots with cooldown sweeps, hint
//! toasts, damage popups projected from world space, and a collapsible
//! combat log panel. All drawn as egui overlays on top of the 3D scene.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::combat::events::HudHintEvent;
use crate::combat::log::CombatLog;
use crate::keybindings::{GameAction, Keybindings};
use crate::world::combat_core::SkillLoadout;
use crate::world::components::{CooldownLedger, Player, SimClock, Vitals};
use crate::world::effects::entity::{FxFade, FxShape};
use crate::world::skills::types::AbilityKey;
use crate::world::skills::SkillDefinitions;
use crate::world::systems::FramePhase;

/// Active hint toasts with their expiry times.
#[derive(Resource, Default)]
pub struct HintToasts {
    toasts: Vec<(String, f32)>,
}

/// Whether the combat log panel is open.
#[derive(Resource, Default)]
pub struct CombatLogPanel {
    pub open: bool,
}

/// Plugin for the HUD layer.
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HintToasts>()
            .init_resource::<CombatLogPanel>()
            .add_systems(
                Update,
                (
                    collect_hints,
                    toggle_combat_log,
                    hud_overlay,
                    render_damage_popups,
                )
                    .in_set(FramePhase::Hud),
            );
    }
}

fn collect_hints(
    clock: Res<SimClock>,
    mut hints: EventReader<HudHintEvent>,
    mut toasts: ResMut<HintToasts>,
) {
    for hint in hints.read() {
        toasts.toasts.push((hint.text.clone(), clock.now + 2.0));
    }
    let now = clock.now;
    toasts.toasts.retain(|(_, expires)| *expires > now);
}

fn toggle_combat_log(
    keys: Res<ButtonInput<KeyCode>>,
    bindings: Res<Keybindings>,
    mut panel: ResMut<CombatLogPanel>,
) {
    if keys.just_pressed(bindings.key_for(GameAction::ToggleCombatLog)) {
        panel.open = !panel.open;
    }
}

/// Vitals bars, skill slots, hint toasts, and the combat log panel.
fn hud_overlay(
    mut contexts: EguiContexts,
    clock: Res<SimClock>,
    loadout: Res<SkillLoadout>,
    defs: Res<SkillDefinitions>,
    toasts: Res<HintToasts>,
    panel: Res<CombatLogPanel>,
    log: Res<CombatLog>,
    player: Query<(&Vitals, &CooldownLedger), With<Player>>,
) {
    // Use try_ctx_mut to gracefully handle window close
    let Some(ctx) = contexts.try_ctx_mut() else {
        return;
    };
    let Ok((vitals, ledger)) = player.get_single() else {
        return;
    };

    let screen = ctx.screen_rect();
    let now = clock.now;

    egui::Area::new(egui::Id::new("hud_bottom"))
        .fixed_pos(egui::pos2(screen.center().x - 180.0, screen.max.y - 110.0))
        .show(ctx, |ui| {
            let painter = ui.painter();

            // Health and mana bars.
            let bar_width = 360.0;
            let origin = ui.min_rect().min;
            let hp_frac = (vitals.hp.max(0) as f32 / vitals.max_hp.max(1) as f32).clamp(0.0, 1.0);
            let mp_frac = (vitals.mp / vitals.max_mp.max(1.0)).clamp(0.0, 1.0);

            let hp_rect = egui::Rect::from_min_size(origin, egui::vec2(bar_width, 14.0));
            painter.rect_filled(
                hp_rect,
                egui::Rounding::same(3.0),
                egui::Color32::from_rgb(40, 20, 20),
            );
            painter.rect_filled(
                egui::Rect::from_min_size(origin, egui::vec2(bar_width * hp_frac, 14.0)),
                egui::Rounding::same(3.0),
                egui::Color32::from_rgb(190, 45, 45),
            );
            painter.text(
                hp_rect.center(),
                egui::Align2::CENTER_CENTER,
                format!("{} / {}", vitals.hp.max(0), vitals.max_hp),
                egui::FontId::proportional(11.0),
                egui::Color32::WHITE,
            );

            let mp_origin = origin + egui::vec2(0.0, 18.0);
            let mp_rect = egui::Rect::from_min_size(mp_origin, egui::vec2(bar_width, 10.0));
            painter.rect_filled(
                mp_rect,
                egui::Rounding::same(3.0),
                egui::Color32::from_rgb(15, 25, 45),
            );
            painter.rect_filled(
                egui::Rect::from_min_size(mp_origin, egui::vec2(bar_width * mp_frac, 10.0)),
                egui::Rounding::same(3.0),
                egui::Color32::from_rgb(60, 110, 220),
            );

            // Skill slots with cooldown sweep and mana gating tint.
            let slot_size = 52.0;
            let slot_gap = 10.0;
            for (index, key) in AbilityKey::slots().into_iter().enumerate() {
                let Some(skill) = loadout.skill_for(key) else { continue };
                let Some(def) = defs.get(&skill) else { continue };

                let slot_origin = origin
                    + egui::vec2(
                        (bar_width - 4.0 * slot_size - 3.0 * slot_gap) / 2.0
                            + index as f32 * (slot_size + slot_gap),
                        36.0,
                    );
                let rect = egui::Rect::from_min_size(slot_origin, egui::vec2(slot_size, slot_size));

                let affordable = vitals.mp >= def.mana_cost;
                let base = if affordable {
                    egui::Color32::from_rgb(40, 44, 60)
                } else {
                    egui::Color32::from_rgb(30, 30, 34)
                };
                painter.rect_filled(rect, egui::Rounding::same(6.0), base);
                painter.rect_stroke(
                    rect,
                    egui::Rounding::same(6.0),
                    egui::Stroke::new(1.5, egui::Color32::from_rgb(90, 95, 120)),
                );
                painter.text(
                    rect.center() - egui::vec2(0.0, 8.0),
                    egui::Align2::CENTER_CENTER,
                    def.name.chars().next().unwrap_or('?'),
                    egui::FontId::proportional(20.0),
                    if affordable {
                        egui::Color32::WHITE
                    } else {
                        egui::Color32::GRAY
                    },
                );
                painter.text(
                    rect.center() + egui::vec2(0.0, 14.0),
                    egui::Align2::CENTER_CENTER,
                    format!("{}", index + 1),
                    egui::FontId::proportional(11.0),
                    egui::Color32::LIGHT_GRAY,
                );

                // Cooldown sweep: fill from the bottom proportional to
                // the time remaining.
                let remaining = ledger.remaining(key, now);
                if remaining > 0.0 && def.cooldown > 0.0 {
                    let frac = (remaining / def.cooldown).clamp(0.0, 1.0);
                    let sweep = egui::Rect::from_min_max(
                        egui::pos2(rect.min.x, rect.max.y - rect.height() * frac),
                        rect.max,
                    );
                    painter.rect_filled(
                        sweep,
                        egui::Rounding::same(6.0),
                        egui::Color32::from_rgba_unmultiplied(10, 10, 10, 180),
                    );
                    painter.text(
                        rect.center(),
                        egui::Align2::CENTER_CENTER,
                        format!("{:.1}", remaining),
                        egui::FontId::proportional(14.0),
                        egui::Color32::WHITE,
                    );
                }
            }
        });

    // Hint toasts, centered above the action bar.
    if !toasts.toasts.is_empty() {
        egui::Area::new(egui::Id::new("hud_hints"))
            .fixed_pos(egui::pos2(screen.center().x, screen.max.y * 0.72))
            .show(ctx, |ui| {
                for (index, (text, _)) in toasts.toasts.iter().enumerate() {
                    ui.painter().text(
                        ui.min_rect().min + egui::vec2(0.0, index as f32 * 22.0),
                        egui::Align2::CENTER_CENTER,
                        text,
                        egui::FontId::proportional(18.0),
                        egui::Color32::from_rgb(255, 210, 120),
                    );
                }
            });
    }

    // Combat log panel.
    if panel.open {
        egui::Window::new("Combat Log")
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-10.0, -10.0))
            .resizable(false)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().max_height(200.0).show(ui, |ui| {
                    for entry in log.recent(30) {
                        ui.label(format!("[{:>6.1}] {}", entry.timestamp, entry.message));
                    }
                });
            });
    }
}

/// Project damage popups into screen space and draw them with the fade
/// alpha the effect queue computed this frame.
fn render_damage_popups(
    mut contexts: EguiContexts,
    popups: Query<(&FxShape, &Transform, &FxFade)>,
    camera_query: Query<(&Camera, &GlobalTransform)>,
) {
    let Some(ctx) = contexts.try_ctx_mut() else {
        return;
    };
    let Ok((camera, camera_transform)) = camera_query.get_single() else {
        return;
    };

    egui::Area::new(egui::Id::new("damage_popups"))
        .fixed_pos(egui::pos2(0.0, 0.0))
        .show(ctx, |ui| {
            for (shape, transform, fade) in popups.iter() {
                let FxShape::Popup { text, color, crit } = shape else {
                    continue;
                };
                if fade.alpha <= 0.0 {
                    continue;
                }
                let Ok(screen_pos) =
                    camera.world_to_viewport(camera_transform, transform.translation)
                else {
                    continue;
                };

                let alpha = (fade.alpha * 255.0) as u8;
                let rgba = color.to_srgba();
                let fill = egui::Color32::from_rgba_unmultiplied(
                    (rgba.red * 255.0) as u8,
                    (rgba.green * 255.0) as u8,
                    (rgba.blue * 255.0) as u8,
                    alpha,
                );
                let outline = egui::Color32::from_rgba_unmultiplied(0, 0, 0, alpha);

                let font_size = if *crit { 30.0 } else { 22.0 };
                let display = if *crit { format!("{}!", text) } else { text.clone() };
                let font_id = egui::FontId::proportional(font_size);

                // Thick black outline (8 directions for smooth outline)
                for (dx, dy) in [
                    (-2.0, 0.0),
                    (2.0, 0.0),
                    (0.0, -2.0),
                    (0.0, 2.0),
                    (-1.5, -1.5),
                    (1.5, -1.5),
                    (-1.5, 1.5),
                    (1.5, 1.5),
                ] {
                    ui.painter().text(
                        egui::pos2(screen_pos.x + dx, screen_pos.y + dy),
                        egui::Align2::CENTER_CENTER,
                        &display,
                        font_id.clone(),
                        outline,
                    );
                }
                ui.painter().text(
                    egui::pos2(screen_pos.x, screen_pos.y),
                    egui::Align2::CENTER_CENTER,
                    &display,
                    font_id,
                    fill,
                );
            }
        });
}

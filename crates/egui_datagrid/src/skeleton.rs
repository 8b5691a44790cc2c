//! Pulsing placeholders shown while the grid is loading.

use egui::{Color32, CornerRadius, Painter, Rect, Ui, Vec2, vec2};

/// Height of one skeleton bar.
pub(crate) const BAR_HEIGHT: f32 = 16.0;

/// Vertical pitch of skeleton rows in the table.
pub(crate) const ROW_PITCH: f32 = 40.0;

/// Skeleton cards shown in the narrow layout.
pub(crate) const CARD_COUNT: usize = 4;

const PULSE_PERIOD: f64 = 2.0;

/// Opacity of the skeleton at `time`, between `0.5` and `1.0`.
pub(crate) fn pulse_opacity(time: f64) -> f32 {
    let phase = (time / PULSE_PERIOD * std::f64::consts::TAU).cos();
    (0.75 + 0.25 * phase) as f32
}

/// The bar color for this frame. Keeps the UI repainting while it is visible.
pub(crate) fn bar_color(ui: &Ui) -> Color32 {
    let time = ui.input(|i| i.time);
    ui.ctx().request_repaint();
    ui.visuals()
        .widgets
        .noninteractive
        .bg_fill
        .gamma_multiply(pulse_opacity(time))
}

/// A bar vertically centered in `slot`, inset horizontally by `padding`.
pub(crate) fn paint_bar(painter: &Painter, slot: Rect, padding: f32, color: Color32) {
    let width = (slot.width() - 2.0 * padding).max(0.0);
    if width <= 0.0 {
        return;
    }
    let bar = Rect::from_center_size(slot.center(), vec2(width, BAR_HEIGHT.min(slot.height())));
    painter.rect_filled(bar, CornerRadius::same(4), color);
}

/// Skeleton cards for the narrow layout: one title bar and `lines` value bars per card.
pub(crate) fn cards(ui: &mut Ui, lines: usize) {
    profiling::function_scope!();

    let color = bar_color(ui);
    for _ in 0..CARD_COUNT {
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_width(ui.available_width());
            let width = ui.available_width();

            bar(ui, vec2(width * 0.6, BAR_HEIGHT), color);
            for _ in 0..lines {
                ui.add_space(4.0);
                bar(ui, vec2(width, BAR_HEIGHT), color);
            }
        });
        ui.add_space(ui.spacing().item_spacing.y);
    }
}

fn bar(ui: &mut Ui, size: Vec2, color: Color32) {
    let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
    ui.painter().rect_filled(rect, CornerRadius::same(4), color);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulse_stays_in_range() {
        for step in 0..100 {
            let opacity = pulse_opacity(step as f64 * 0.05);
            assert!((0.5..=1.0).contains(&opacity), "{opacity}");
        }
        assert_eq!(pulse_opacity(0.0), 1.0);
        assert!((pulse_opacity(PULSE_PERIOD / 2.0) - 0.5).abs() < 1e-6);
    }
}

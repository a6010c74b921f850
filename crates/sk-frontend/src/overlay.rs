//! egui overlay for snap guides and the pick chooser

use egui::{Pos2, Shape, Stroke, Vec2 as EguiVec2};

use crate::event::{Anchor, Guide, ViewportEvent};
use crate::palette;
use crate::tools::Chooser;

const GUIDE_WIDTH: f32 = 1.0;
const DASH: f32 = 6.0;
const GAP: f32 = 4.0;
const ANCHOR_RADIUS: f32 = 5.0;

/// Guides and anchor as last reported by the viewport
#[derive(Debug, Default, Clone)]
pub struct SnapOverlay {
    guides: Vec<Guide>,
    anchor: Option<Anchor>,
}

impl SnapOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn guides(&self) -> &[Guide] {
        &self.guides
    }

    pub fn anchor(&self) -> Option<&Anchor> {
        self.anchor.as_ref()
    }

    /// Track guide updates; other events are ignored
    pub fn apply(&mut self, event: &ViewportEvent) {
        if let ViewportEvent::SnapGuidesUpdated { guides, anchor } = event {
            self.guides.clone_from(guides);
            self.anchor.clone_from(anchor);
        }
    }

    /// Paint into the viewport whose top-left corner is `origin`
    pub fn paint(&self, painter: &egui::Painter, origin: Pos2) {
        let to_pos = |p: glam::Vec2| origin + EguiVec2::new(p.x, p.y);
        let stroke = Stroke::new(GUIDE_WIDTH, palette::GUIDE);

        for guide in &self.guides {
            let path = [to_pos(guide.start), to_pos(guide.end)];
            painter.extend(Shape::dashed_line(&path, stroke, DASH, GAP));
        }
        if let Some(anchor) = &self.anchor {
            painter.circle_stroke(
                to_pos(anchor.screen),
                ANCHOR_RADIUS,
                Stroke::new(1.5, palette::ANCHOR),
            );
        }
    }
}

/// What the user did with the chooser popup this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChooserAction {
    Pick(usize),
    Cancel,
}

/// Show the candidates of `chooser` as a popup at `at`
pub fn chooser_window(ctx: &egui::Context, chooser: &Chooser, at: Pos2) -> Option<ChooserAction> {
    let mut action = None;
    egui::Area::new(egui::Id::new("pick_chooser"))
        .fixed_pos(at)
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style())
                .fill(palette::with_alpha(palette::CHOOSER_BG, 235))
                .stroke(Stroke::new(1.0, palette::CHOOSER_BORDER))
                .show(ui, |ui| {
                    ui.label(egui::RichText::new("Select object").color(palette::CHOOSER_TEXT));
                    ui.separator();
                    for (i, candidate) in chooser.candidates.iter().enumerate() {
                        if ui.button(candidate.label()).clicked() {
                            action = Some(ChooserAction::Pick(i));
                        }
                    }
                    if ui.button("Cancel").clicked() {
                        action = Some(ChooserAction::Cancel);
                    }
                });
        });

    if action.is_none() && ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        action = Some(ChooserAction::Cancel);
    }
    action
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{GuideAxis, Picked};
    use egui::epaint::ColorMode;
    use egui::{Event, Key, Modifiers, RawInput};
    use glam::{Vec2, Vec3};
    use uuid::Uuid;

    fn guide() -> Guide {
        Guide {
            id: "v100.0:300.0".to_string(),
            axis: GuideAxis::Vertical,
            start: Vec2::new(100.0, 300.0),
            end: Vec2::new(100.0, 100.0),
        }
    }

    fn count_shapes(overlay: &SnapOverlay) -> (usize, usize) {
        let ctx = egui::Context::default();
        let output = ctx.run(RawInput::default(), |ctx| {
            let painter = ctx.layer_painter(egui::LayerId::background());
            overlay.paint(&painter, Pos2::ZERO);
        });
        let mut dashes = 0;
        let mut rings = 0;
        for clipped in &output.shapes {
            match &clipped.shape {
                Shape::LineSegment { stroke, .. }
                    if stroke.color == ColorMode::Solid(palette::GUIDE) =>
                {
                    dashes += 1;
                }
                Shape::Circle(circle) if circle.stroke.color == palette::ANCHOR => rings += 1,
                _ => {}
            }
        }
        (dashes, rings)
    }

    #[test]
    fn test_apply_tracks_latest_update() {
        let mut overlay = SnapOverlay::new();
        overlay.apply(&ViewportEvent::SnapGuidesUpdated {
            guides: vec![guide()],
            anchor: None,
        });
        overlay.apply(&ViewportEvent::ChooserClosed);
        assert_eq!(overlay.guides().len(), 1);

        overlay.apply(&ViewportEvent::SnapGuidesUpdated {
            guides: Vec::new(),
            anchor: None,
        });
        assert!(overlay.guides().is_empty());
    }

    #[test]
    fn test_paint_dashes_and_anchor() {
        let mut overlay = SnapOverlay::new();
        assert_eq!(count_shapes(&overlay), (0, 0));

        overlay.apply(&ViewportEvent::SnapGuidesUpdated {
            guides: vec![guide()],
            anchor: Some(Anchor {
                id: "5:3:0".to_string(),
                position: Vec3::new(5.0, 3.0, 0.0),
                screen: Vec2::new(100.0, 100.0),
            }),
        });
        let (dashes, rings) = count_shapes(&overlay);
        assert!(dashes > 10, "one 200 px guide should split into many dashes");
        assert_eq!(rings, 1);
    }

    #[test]
    fn test_escape_cancels_chooser() {
        let chooser = Chooser::new(vec![Picked::Element(Uuid::new_v4())], 0.0);
        let ctx = egui::Context::default();

        let mut action = None;
        let _ = ctx.run(RawInput::default(), |ctx| {
            action = chooser_window(ctx, &chooser, Pos2::new(10.0, 10.0));
        });
        assert_eq!(action, None);

        let input = RawInput {
            events: vec![Event::Key {
                key: Key::Escape,
                physical_key: None,
                pressed: true,
                repeat: false,
                modifiers: Modifiers::NONE,
            }],
            ..Default::default()
        };
        let _ = ctx.run(input, |ctx| {
            action = chooser_window(ctx, &chooser, Pos2::new(10.0, 10.0));
        });
        assert_eq!(action, Some(ChooserAction::Cancel));
    }
}

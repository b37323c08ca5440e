//! The "Settings" overlay window.

use crate::camera::CameraMode;
use crate::frame::SceneSettings;

/// What the user changed in the settings window during one GUI pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SettingsChanges {
    pub grid_size: bool,
    pub camera_mode: bool,
}

/// Shows the settings window and applies edits to `settings` in place.
///
/// The grid size slider is pinned to `max_grid_size`; the mobile's layout is fixed, so the
/// value only decides when the instance data is rebuilt.
pub fn settings_window(
    ctx: &egui::Context,
    settings: &mut SceneSettings,
    max_grid_size: u32,
) -> SettingsChanges {
    let before = *settings;

    egui::Window::new("Settings")
        .resizable(false)
        .show(ctx, |ui| {
            ui.add(
                egui::Slider::new(&mut settings.grid_size, max_grid_size..=max_grid_size)
                    .clamping(egui::SliderClamping::Always)
                    .text("Grid Size"),
            );
            ui.separator();
            ui.label("Camera View");
            for mode in CameraMode::ALL {
                ui.radio_value(&mut settings.camera_mode, mode, mode.label());
            }
        });

    let changes = SettingsChanges {
        grid_size: settings.grid_size != before.grid_size,
        camera_mode: settings.camera_mode != before.camera_mode,
    };
    if changes.camera_mode {
        log::info!("Camera view changed to {}", settings.camera_mode);
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(settings: &mut SceneSettings, max_grid_size: u32) -> SettingsChanges {
        let ctx = egui::Context::default();
        let mut changes = SettingsChanges::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            changes = settings_window(ctx, settings, max_grid_size);
        });
        changes
    }

    #[test]
    fn untouched_window_reports_no_changes() {
        let mut settings = SceneSettings {
            grid_size: 32,
            camera_mode: CameraMode::Top,
        };

        let changes = run(&mut settings, 32);

        assert_eq!(changes, SettingsChanges::default());
        assert_eq!(settings.camera_mode, CameraMode::Top);
        assert_eq!(settings.grid_size, 32);
    }

    #[test]
    fn slider_clamps_grid_size_to_the_pinned_range() {
        let mut settings = SceneSettings {
            grid_size: 7,
            camera_mode: CameraMode::Default,
        };

        let changes = run(&mut settings, 32);

        assert_eq!(settings.grid_size, 32);
        assert!(changes.grid_size);
        assert!(!changes.camera_mode);
    }
}

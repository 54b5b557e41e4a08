use slidepad::device::{Assembled, Device};
use slidepad::dispatch::{Modifier, OutputAction, Toward};
use slidepad::host::{HostCommand, RecordingPort};
use slidepad::indicator::{LedPattern, ModeOverlay};
use slidepad::input::{Channel, Mode, PinLevel};
use slidepad::time::Millis;
use slidepad::profile::{self, Profile, ProfileError, PRESETS};
use std::path::PathBuf;
use tempfile::TempDir;

fn shipped(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("profiles")
        .join(name)
}

#[tokio::test]
async fn save_then_load_each_preset() {
    let dir = TempDir::new().unwrap();
    for name in PRESETS {
        let path = dir.path().join("nested").join(format!("{}.toml", name));
        let preset = Profile::preset(name).unwrap();
        profile::save(&preset, &path, false).await.unwrap();
        let loaded = profile::load(&path).await.unwrap();
        assert_eq!(loaded, preset);
    }
}

#[tokio::test]
async fn save_refuses_to_overwrite_without_force() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("profile.toml");
    profile::save(&Profile::desnarler(), &path, false).await.unwrap();

    let again = profile::save(&Profile::arrow_pad(), &path, false).await;
    assert!(matches!(again, Err(ProfileError::AlreadyExists(_))));

    profile::save(&Profile::arrow_pad(), &path, true).await.unwrap();
    assert_eq!(profile::load(&path).await.unwrap().name, "arrow-pad");
}

#[tokio::test]
async fn missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let result = profile::load(&dir.path().join("absent.toml")).await;
    assert!(matches!(result, Err(ProfileError::Io { .. })));
}

#[tokio::test]
async fn broken_toml_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    tokio::fs::write(&path, "name = \"x\"\n[[sliders]\n").await.unwrap();
    assert!(matches!(
        profile::load(&path).await,
        Err(ProfileError::Parse { .. })
    ));
}

#[tokio::test]
async fn invalid_profile_is_rejected_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("conflict.toml");
    let mut bad = Profile::desnarler();
    bad.indicator.led_pins = vec![29, 29, 28];
    let text = toml::to_string_pretty(&bad).unwrap();
    tokio::fs::write(&path, text).await.unwrap();
    assert!(matches!(
        profile::load(&path).await,
        Err(ProfileError::PinConflict(29))
    ));
}

#[tokio::test]
async fn shipped_desnarler_matches_preset() {
    let loaded = profile::load(&shipped("desnarler.toml")).await.unwrap();
    assert_eq!(loaded, Profile::desnarler());
}

#[tokio::test]
async fn shipped_profiles_assemble() {
    for name in [
        "desnarler.toml",
        "desnarler-umlauts.toml",
        "workspace-slider.toml",
    ] {
        let loaded = profile::load(&shipped(name)).await.unwrap();
        let port = RecordingPort::new();
        Device::<Assembled>::assemble(&loaded)
            .unwrap()
            .verify(&port)
            .unwrap();
    }
}

#[tokio::test]
async fn umlauts_profile_defaults_and_overlay() {
    let loaded = profile::load(&shipped("desnarler-umlauts.toml"))
        .await
        .unwrap();
    assert_eq!(loaded.sliders[0].deadband, 2);
    assert!(loaded.mode_switch.active_low);
    assert_eq!(loaded.window_switch.hold_timeout_ms, 1000);
    assert_eq!(
        loaded.indicator.mode_overlay,
        Some(ModeOverlay {
            mode: Mode::B,
            pattern: LedPattern::outer(3),
        })
    );
}

#[tokio::test]
async fn workspace_slider_follows_a_gradual_slide() {
    let loaded = profile::load(&shipped("workspace-slider.toml"))
        .await
        .unwrap();
    let mut port = RecordingPort::new();
    let mut device = Device::<Assembled>::assemble(&loaded)
        .unwrap()
        .verify(&port)
        .unwrap()
        .start(Millis(0), &mut port);
    let slider = Channel(26);
    let mut now = 0;

    for value in (100..=1000).step_by(9) {
        port.set_sample(slider, value);
        device.tick(Millis(now), &mut port);
        now += 10;
    }
    let workspaces = port.emitted();
    assert!(workspaces.len() >= 2);
    assert!(workspaces.iter().all(|action| *action
        == OutputAction::WorkspaceSwitch {
            toward: Toward::Next
        }));
    port.take_commands();

    port.set_level(PinLevel::Low);
    for _ in 0..5 {
        device.tick(Millis(now), &mut port);
        now += 10;
    }
    assert_eq!(device.mode(), Mode::B);

    for value in (100..=1000).rev().step_by(9) {
        port.set_sample(slider, value);
        device.tick(Millis(now), &mut port);
        now += 10;
    }
    let windows = port.emitted();
    assert!(windows.len() >= 2);
    assert!(windows.iter().all(|action| *action
        == OutputAction::WindowSwitch {
            toward: Toward::Previous
        }));
    let holds = port
        .take_commands()
        .into_iter()
        .filter(|command| *command == HostCommand::Hold(Modifier::Gui))
        .count();
    assert_eq!(holds, 1);
}

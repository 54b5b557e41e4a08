use slidepad::device::{Assembled, Device, InputEvent, Response, Running};
use slidepad::dispatch::{ActionPair, ActionTable, EventDispatcher, OutputAction};
use slidepad::host::{HostCommand, RecordingPort};
use slidepad::indicator::{LayerState, LedPattern};
use slidepad::input::rate_limit::allow;
use slidepad::input::{
    AdcRange, Channel, ClassifierPolicy, DebounceFilter, Direction, DirectionClassifier, Mode,
    PinLevel, RateLimiter, Sample, SliderChannel,
};
use slidepad::profile::Profile;
use slidepad::time::Millis;

const SLIDER: Channel = Channel(26);

fn sample(value: u16) -> Sample {
    Sample::clamped(value, AdcRange::default())
}

fn desnarler_without_blink() -> Profile {
    let mut profile = Profile::desnarler();
    profile.indicator.boot_blink_cycles = 0;
    profile
}

fn start(profile: &Profile, port: &mut RecordingPort) -> Device<Running> {
    let device = Device::<Assembled>::assemble(profile)
        .unwrap()
        .verify(&*port)
        .unwrap()
        .start(Millis(0), port);
    port.take_commands();
    device
}

#[test]
fn center_then_low_classifies_and_emits_once() {
    let mut slider = SliderChannel::new(
        SLIDER,
        DebounceFilter::new(2),
        DirectionClassifier::new(ClassifierPolicy::AbsoluteCenter {
            center: 512,
            dead_zone: 70,
        }),
        RateLimiter::new(100),
        EventDispatcher::new(ActionTable::uniform(ActionPair::volume())),
    );
    let directions: Vec<Direction> = [512, 512, 400, 400]
        .iter()
        .map(|v| slider.classify(sample(*v)))
        .collect();
    assert_eq!(
        directions,
        vec![
            Direction::Neutral,
            Direction::Neutral,
            Direction::Negative,
            Direction::Negative
        ]
    );

    let mut port = RecordingPort::new();
    let mut device = start(&desnarler_without_blink(), &mut port);
    for (tick, value) in [512, 512, 400, 400].iter().enumerate() {
        port.set_sample(SLIDER, *value);
        device.tick(Millis(10 * tick as u32), &mut port);
    }
    assert_eq!(port.emitted(), vec![OutputAction::MediaVolumeDown]);
}

#[test]
fn switch_flip_moves_base_layer_once() {
    let mut port = RecordingPort::new();
    let mut device = start(&desnarler_without_blink(), &mut port);

    device.tick(Millis(0), &mut port);
    port.set_level(PinLevel::Low);
    device.tick(Millis(10), &mut port);
    device.tick(Millis(20), &mut port);

    assert_eq!(device.mode(), Mode::B);
    assert_eq!(port.layer_moves(), vec![4]);
}

#[test]
fn n_toggles_give_n_layer_moves() {
    let mut port = RecordingPort::new();
    let mut device = start(&desnarler_without_blink(), &mut port);

    let toggles = 7u32;
    let mut level = PinLevel::High;
    for i in 0..toggles {
        level = match level {
            PinLevel::High => PinLevel::Low,
            PinLevel::Low => PinLevel::High,
        };
        port.set_level(level);
        device.tick(Millis(i * 20), &mut port);
        device.tick(Millis(i * 20 + 10), &mut port);
    }

    let moves = port.layer_moves();
    assert_eq!(moves.len(), toggles as usize);
    assert_eq!(&moves[..3], &[4, 0, 4]);
    assert_eq!(device.stats().mode_changes, u64::from(toggles));
}

#[test]
fn rate_limit_window() {
    assert!(allow(Millis(0), None, 50));
    assert!(!allow(Millis(30), Some(Millis(0)), 50));
    assert!(allow(Millis(60), Some(Millis(0)), 50));

    let mut profile = desnarler_without_blink();
    profile.sliders[0].min_interval_ms = 50;
    let mut port = RecordingPort::new();
    let mut device = start(&profile, &mut port);
    port.set_sample(SLIDER, 1000);
    for at in [0, 10, 40, 70, 130] {
        device.tick(Millis(at), &mut port);
    }
    // 10 emits, 40 is 30ms later, 70 is 60ms later, 130 is 60ms after that.
    assert_eq!(port.emitted().len(), 3);
}

#[test]
fn lower_and_raise_light_all_leds() {
    let mut port = RecordingPort::new();
    let mut device = start(&desnarler_without_blink(), &mut port);

    let response = device.handle(
        InputEvent::LayerChanged {
            state: LayerState::from_layers([1, 2]),
            now: Millis(5),
        },
        &mut port,
    );
    assert_eq!(response, Response::Layers(LayerState::from_layers([1, 2, 3])));
    assert_eq!(
        port.take_commands(),
        vec![HostCommand::SetLeds(LedPattern::all_on(3))]
    );

    let response = device.handle(
        InputEvent::LayerChanged {
            state: LayerState::from_layers([1, 3]),
            now: Millis(6),
        },
        &mut port,
    );
    assert_eq!(response, Response::Layers(LayerState::only(1)));
    assert_eq!(port.last_leds(), Some(LedPattern::single(3, 1)));
}

#[test]
fn spike_below_deadband_is_ignored() {
    let mut filter = DebounceFilter::new(5);
    filter.update(sample(600));
    let out = filter.update(sample(603)).unwrap();
    assert!(!out.changed);
    assert_eq!(filter.previous(), Some(sample(600)));

    let mut profile = desnarler_without_blink();
    profile.sliders[0].deadband = 200;
    let mut port = RecordingPort::new();
    let mut device = start(&profile, &mut port);
    port.set_sample(SLIDER, 512);
    device.tick(Millis(0), &mut port);
    port.set_sample(SLIDER, 400);
    device.tick(Millis(10), &mut port);
    assert!(port.emitted().is_empty());
}

#[test]
fn held_slider_repeats_at_interval() {
    let mut port = RecordingPort::new();
    let mut device = start(&desnarler_without_blink(), &mut port);
    port.set_sample(SLIDER, 900);
    for at in (0..=500).step_by(10) {
        device.tick(Millis(at), &mut port);
    }
    // Seeded at 0, first emit at 10, then every 100ms.
    assert_eq!(
        port.emitted(),
        vec![OutputAction::MediaVolumeUp; 5]
    );
}

#[test]
fn switch_asserted_at_boot_syncs_base_layer() {
    let mut port = RecordingPort::new();
    port.set_level(PinLevel::Low);
    let mut device = start(&desnarler_without_blink(), &mut port);
    device.tick(Millis(0), &mut port);
    assert_eq!(port.layer_moves(), vec![4]);
}

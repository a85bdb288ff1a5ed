//! Render loop runner
//!
//! Owns the display, the input sampler and the screen cache. Event
//! handlers cannot borrow any of those while a tick is running, so screen
//! change and setting requests are queued by a bus subscriber and applied
//! by the loop between the update and render phases of the same tick.

use core::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use log::{debug, error, info, warn};
use pettrac_display::{DisplayBackend, FrameBuffer};

use super::pacing::{pacing_delay, FpsCounter};
use super::toast::draw_toast;
use crate::battery::{BatteryAlarm, BatteryMonitor, BatteryStatus};
use crate::events::{
    Event, EventHandler, EventKind, EventPayload, ListenerError, Setting, ShutdownReason,
};
use crate::input::{Button, ButtonSnapshot, ButtonTransition, BUTTON_COUNT};
use crate::screen::{Screen, ScreenCache, ScreenContext};
use crate::state::AppState;
use crate::traits::{Clock, InputSampler, SystemClock};

/// Upper bound on request drain rounds per tick
///
/// Activating a screen may queue further requests; this stops two screens
/// that redirect to each other from spinning forever.
const MAX_REQUEST_ROUNDS: usize = 4;

/// Loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

/// Loop parameters
#[derive(Debug, Clone, PartialEq)]
pub struct RenderLoopConfig {
    /// Target tick period
    pub period: Duration,
    /// Press duration after which a `button_hold` is published
    pub hold_threshold: Duration,
    /// Frame clear color
    pub background: Rgb888,
    /// Screen used when a requested name is unknown
    pub fallback_screen: String,
}

impl Default for RenderLoopConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(50),
            hold_threshold: Duration::from_secs(1),
            background: Rgb888::BLACK,
            fallback_screen: "desktop".into(),
        }
    }
}

/// What one tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Time spent in update and render
    pub elapsed: Duration,
    /// Pacing sleep that followed
    pub sleep: Duration,
    /// The frame reached the display
    pub frame_sent: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Request {
    Screen(String),
    Setting(Setting),
}

/// Bus subscriber that records requests for the loop
#[derive(Default)]
struct RequestQueue {
    pending: RefCell<Vec<Request>>,
}

impl RequestQueue {
    fn take(&self) -> Vec<Request> {
        core::mem::take(&mut *self.pending.borrow_mut())
    }
}

impl EventHandler for RequestQueue {
    fn handle(&self, event: &mut Event) -> Result<(), ListenerError> {
        let request = match event.payload() {
            EventPayload::ScreenChange { screen } => Request::Screen(screen.clone()),
            EventPayload::SettingChange(setting) => Request::Setting(*setting),
            _ => return Ok(()),
        };
        self.pending.borrow_mut().push(request);
        Ok(())
    }
}

/// Fixed-rate update/render loop
pub struct RenderLoop<D, C = SystemClock>
where
    D: DisplayBackend,
    C: Clock,
{
    display: D,
    clock: C,
    input: Box<dyn InputSampler>,
    battery: Option<BatteryMonitor>,
    state: Rc<AppState>,
    screens: ScreenCache,
    active: Option<String>,
    frame: FrameBuffer,
    requests: Rc<RequestQueue>,
    previous: ButtonSnapshot,
    held_since: [Option<Instant>; BUTTON_COUNT],
    hold_reported: [bool; BUTTON_COUNT],
    fps: FpsCounter,
    loop_state: LoopState,
    stop: Arc<AtomicBool>,
    config: RenderLoopConfig,
    dropped_frames: u64,
    finalized: bool,
}

impl<D, C> RenderLoop<D, C>
where
    D: DisplayBackend,
    C: Clock,
{
    /// Build the loop and activate the screen named by `state.current_screen`
    ///
    /// The display must already be initialized.
    pub fn new(
        display: D,
        clock: C,
        input: Box<dyn InputSampler>,
        state: Rc<AppState>,
        screens: ScreenCache,
        config: RenderLoopConfig,
    ) -> Self {
        let (width, height) = display.dimensions();
        let requests = Rc::new(RequestQueue::default());
        let handler: Rc<dyn EventHandler> = requests.clone();
        state.bus().subscribe(EventKind::ScreenChange, Rc::clone(&handler));
        state.bus().subscribe(EventKind::SettingChange, handler);

        let now = clock.now();
        let mut render_loop = Self {
            display,
            clock,
            input,
            battery: None,
            state,
            screens,
            active: None,
            frame: FrameBuffer::new(width, height),
            requests,
            previous: ButtonSnapshot::released(),
            held_since: [None; BUTTON_COUNT],
            hold_reported: [false; BUTTON_COUNT],
            fps: FpsCounter::new(now),
            loop_state: LoopState::Stopped,
            stop: Arc::new(AtomicBool::new(false)),
            config,
            dropped_frames: 0,
            finalized: false,
        };

        let initial = render_loop.state.current_screen.get();
        render_loop.switch_screen(&initial);
        // Activation may have queued a request of its own
        render_loop.apply_requests();
        render_loop
    }

    /// Attach a battery monitor, polled every tick
    pub fn with_battery(mut self, monitor: BatteryMonitor) -> Self {
        self.battery = Some(monitor);
        self
    }

    /// Flag that ends the loop at the next tick boundary when set
    ///
    /// Shared so signal handlers can set it.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Request a cooperative stop after the current tick
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn state(&self) -> LoopState {
        self.loop_state
    }

    pub fn app_state(&self) -> &Rc<AppState> {
        &self.state
    }

    /// Name of the active screen
    pub fn active_screen(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn fps(&self) -> f32 {
        self.fps.fps()
    }

    /// Frames that failed to reach the display
    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Run ticks until the stop flag is set
    pub fn start(&mut self) {
        if self.loop_state == LoopState::Running {
            return;
        }
        self.loop_state = LoopState::Running;
        info!("Starting render loop ({} ms period)", self.config.period.as_millis());

        while !self.stop.load(Ordering::SeqCst) {
            self.tick();
        }

        self.loop_state = LoopState::Stopped;
        info!("Render loop stopped after {} dropped frames", self.dropped_frames);
    }

    /// Run one full tick, including the pacing sleep
    pub fn tick(&mut self) -> TickReport {
        let start = self.clock.now();

        self.update(start);
        self.apply_requests();
        let frame_sent = self.render(start);

        let elapsed = self.clock.now().saturating_duration_since(start);
        let sleep = pacing_delay(self.config.period, elapsed);
        self.clock.sleep(sleep);

        self.fps.frame(self.clock.now());

        TickReport {
            elapsed,
            sleep,
            frame_sent,
        }
    }

    /// Park the display in its safe idle state; runs once
    pub fn shutdown(&mut self) {
        if self.finalized {
            return;
        }
        self.finalized = true;
        self.stop.store(true, Ordering::SeqCst);
        info!("Shutting down display");
        self.display.shutdown();
    }

    fn update(&mut self, now: Instant) {
        let poll = self.input.poll(now);
        for transition in self.previous.transitions(&poll.snapshot) {
            let payload = match transition {
                ButtonTransition::Pressed(button) => {
                    self.held_since[button.index()] = Some(now);
                    EventPayload::ButtonPress { button }
                }
                ButtonTransition::Released(button) => {
                    self.held_since[button.index()] = None;
                    self.hold_reported[button.index()] = false;
                    EventPayload::ButtonRelease { button }
                }
            };
            self.dispatch(payload, now);
        }
        self.previous = poll.snapshot;
        self.check_holds(now);

        if let Some(monitor) = self.battery.as_mut() {
            let status = monitor.read();
            let stats = monitor.system_stats();
            self.state.update_battery(&status.reading);
            self.state.update_system_stats(&stats);
            self.publish_battery(&status);
        }

        self.with_active_screen(now, |screen, ctx| screen.update(ctx));
    }

    fn check_holds(&mut self, now: Instant) {
        for button in Button::ALL {
            let i = button.index();
            let Some(since) = self.held_since[i] else {
                continue;
            };
            let held = now.saturating_duration_since(since);
            if !self.hold_reported[i] && held >= self.config.hold_threshold {
                self.hold_reported[i] = true;
                let held_ms = u32::try_from(held.as_millis()).unwrap_or(u32::MAX);
                self.dispatch(EventPayload::ButtonHold { button, held_ms }, now);
            }
        }
    }

    fn publish_battery(&self, status: &BatteryStatus) {
        if !status.worsened() {
            return;
        }
        let percentage = status.reading.percentage.unwrap_or(0);
        let payload = match status.alarm {
            BatteryAlarm::None => return,
            BatteryAlarm::Low => EventPayload::BatteryLow { percentage },
            BatteryAlarm::Critical => EventPayload::BatteryCritical { percentage },
            BatteryAlarm::Shutdown => EventPayload::SystemShutdown {
                reason: ShutdownReason::LowBattery,
            },
        };
        self.state.bus().publish_payload(payload);
    }

    /// Publish on the bus, then hand unhandled events to the active screen
    fn dispatch(&mut self, payload: EventPayload, now: Instant) {
        let mut event = Event::new(payload);
        self.state.bus().publish(&mut event);
        if !event.is_handled() {
            self.with_active_screen(now, |screen, ctx| screen.handle_event(&mut event, ctx));
        }
    }

    fn with_active_screen<R>(
        &mut self,
        now: Instant,
        f: impl FnOnce(&mut dyn Screen, &ScreenContext<'_>) -> R,
    ) -> Option<R> {
        let state = Rc::clone(&self.state);
        let ctx = ScreenContext {
            state: &state,
            now,
            fps: self.fps.fps(),
        };
        let name = self.active.as_deref()?;
        let screen = self.screens.get_mut(name)?;
        Some(f(screen, &ctx))
    }

    fn apply_requests(&mut self) {
        for _ in 0..MAX_REQUEST_ROUNDS {
            let requests = self.requests.take();
            if requests.is_empty() {
                return;
            }
            for request in requests {
                match request {
                    Request::Screen(name) => self.switch_screen(&name),
                    Request::Setting(setting) => self.apply_setting(setting),
                }
            }
        }
        warn!("Screen requests still pending after {} rounds", MAX_REQUEST_ROUNDS);
    }

    fn apply_setting(&mut self, setting: Setting) {
        match setting {
            Setting::Brightness(duty) => match self.display.set_backlight(duty) {
                Ok(()) => info!("Brightness set to {}%", duty.min(100)),
                Err(e) => error!("Error setting brightness: {}", e),
            },
            Setting::Rotation(rotation) => {
                if rotation == self.display.rotation() {
                    return;
                }
                match self.display.set_rotation(rotation) {
                    Ok(()) => info!("Rotation set to {} degrees", rotation.degrees()),
                    Err(e) => error!("Error setting rotation: {}", e),
                }
            }
            Setting::DebugMode(enabled) => debug!("Debug mode {}", enabled),
        }
    }

    fn switch_screen(&mut self, name: &str) {
        if self.active.as_deref() == Some(name) {
            return;
        }

        let target = if self.screens.get_or_create(name).is_some() {
            name.to_string()
        } else if self
            .screens
            .get_or_create(&self.config.fallback_screen)
            .is_some()
        {
            warn!("Unknown screen {}, using {}", name, self.config.fallback_screen);
            self.config.fallback_screen.clone()
        } else {
            error!("Unknown screen {} and no fallback", name);
            if let Some(active) = self.active.clone() {
                self.state.current_screen.set(active);
            }
            return;
        };

        if self.active.as_deref() != Some(target.as_str()) {
            let state = Rc::clone(&self.state);
            let ctx = ScreenContext {
                state: &state,
                now: self.clock.now(),
                fps: self.fps.fps(),
            };
            if let Some(previous) = self.active.take() {
                if let Some(screen) = self.screens.get_mut(&previous) {
                    screen.deactivate(&ctx);
                }
            }
            if let Some(screen) = self.screens.get_mut(&target) {
                screen.activate(&ctx);
            }
            info!("Loaded screen: {}", target);
            self.active = Some(target.clone());
        }

        // Keep the observable in step when a fallback replaced the name
        self.state.current_screen.set(target);
    }

    fn render(&mut self, now: Instant) -> bool {
        self.frame.fill(self.config.background);

        let state = Rc::clone(&self.state);
        let ctx = ScreenContext {
            state: &state,
            now,
            fps: self.fps.fps(),
        };
        if let Some(screen) = self
            .active
            .as_deref()
            .and_then(|name| self.screens.get_mut(name))
        {
            screen.draw(&mut self.frame, &ctx);
        }

        state.toast.with(|toast| {
            if let Some(toast) = toast.as_ref().filter(|t| t.is_visible(now)) {
                draw_toast(&mut self.frame, &toast.message);
            }
        });

        match self.display.show(&self.frame) {
            Ok(()) => true,
            Err(e) => {
                self.dropped_frames += 1;
                warn!("Dropped frame: {}", e);
                false
            }
        }
    }
}

impl<D, C> Drop for RenderLoop<D, C>
where
    D: DisplayBackend,
    C: Clock,
{
    fn drop(&mut self) {
        let handler: Rc<dyn EventHandler> = self.requests.clone();
        self.state.bus().unsubscribe(EventKind::ScreenChange, &handler);
        self.state.bus().unsubscribe(EventKind::SettingChange, &handler);
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battery::{BatteryReading, BatteryThresholds};
    use crate::events::EventBus;
    use crate::input::PollResult;
    use crate::state::InitialState;
    use crate::traits::clock::mock::MockClock;
    use crate::traits::{BatterySensor, ShutdownError, ShutdownTrigger};
    use pettrac_display::{DisplayError, Rotation};
    use std::collections::VecDeque;

    #[derive(Default)]
    struct DisplayLog {
        frames: Vec<FrameBuffer>,
        backlight: Vec<u8>,
        rotations: Vec<Rotation>,
        shutdowns: u32,
        fail_next: bool,
    }

    /// Display that records calls; `show` takes `show_cost` of clock time
    struct MockDisplay {
        log: Rc<RefCell<DisplayLog>>,
        clock: MockClock,
        show_cost: Duration,
        rotation: Rotation,
    }

    impl DisplayBackend for MockDisplay {
        fn init(&mut self) -> Result<(), DisplayError> {
            Ok(())
        }

        fn show(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError> {
            self.clock.advance(self.show_cost);
            let mut log = self.log.borrow_mut();
            if core::mem::take(&mut log.fail_next) {
                return Err(DisplayError::Communication);
            }
            log.frames.push(frame.clone());
            Ok(())
        }

        fn clear(&mut self) -> Result<(), DisplayError> {
            Ok(())
        }

        fn set_backlight(&mut self, duty: u8) -> Result<(), DisplayError> {
            self.log.borrow_mut().backlight.push(duty);
            Ok(())
        }

        fn set_rotation(&mut self, rotation: Rotation) -> Result<(), DisplayError> {
            self.rotation = rotation;
            self.log.borrow_mut().rotations.push(rotation);
            Ok(())
        }

        fn rotation(&self) -> Rotation {
            self.rotation
        }

        fn dimensions(&self) -> (usize, usize) {
            (240, 240)
        }

        fn shutdown(&mut self) {
            self.log.borrow_mut().shutdowns += 1;
        }

        fn is_ready(&self) -> bool {
            true
        }
    }

    /// Sampler replaying snapshots; repeats the last one when drained
    struct ScriptedInput {
        script: Rc<RefCell<VecDeque<ButtonSnapshot>>>,
        last: ButtonSnapshot,
    }

    impl InputSampler for ScriptedInput {
        fn poll(&mut self, _now: Instant) -> PollResult {
            if let Some(next) = self.script.borrow_mut().pop_front() {
                self.last = next;
            }
            PollResult {
                snapshot: self.last,
                edges: heapless::Vec::new(),
            }
        }
    }

    /// Screen that logs its lifecycle as "name:hook"
    struct Probe {
        name: String,
        log: Rc<RefCell<Vec<String>>>,
        color: Rgb888,
    }

    impl Screen for Probe {
        fn name(&self) -> &str {
            &self.name
        }

        fn activate(&mut self, _ctx: &ScreenContext<'_>) {
            self.log.borrow_mut().push(format!("{}:activate", self.name));
        }

        fn deactivate(&mut self, _ctx: &ScreenContext<'_>) {
            self.log.borrow_mut().push(format!("{}:deactivate", self.name));
        }

        fn handle_event(&mut self, event: &mut Event, _ctx: &ScreenContext<'_>) {
            self.log
                .borrow_mut()
                .push(format!("{}:{}", self.name, event.kind()));
        }

        fn draw(&mut self, frame: &mut FrameBuffer, _ctx: &ScreenContext<'_>) {
            frame.set_pixel(0, 0, self.color);
        }
    }

    struct Harness {
        bus: Rc<EventBus>,
        state: Rc<AppState>,
        clock: MockClock,
        display: Rc<RefCell<DisplayLog>>,
        input: Rc<RefCell<VecDeque<ButtonSnapshot>>>,
        screens: Rc<RefCell<Vec<String>>>,
        render_loop: RenderLoop<MockDisplay, MockClock>,
    }

    fn harness(show_cost: Duration) -> Harness {
        let bus = Rc::new(EventBus::new());
        let clock = MockClock::new();
        let state = AppState::new(Rc::clone(&bus), InitialState::default(), clock.now());
        let display = Rc::new(RefCell::new(DisplayLog::default()));
        let input = Rc::new(RefCell::new(VecDeque::new()));
        let screens = Rc::new(RefCell::new(Vec::new()));

        let screen_log = Rc::clone(&screens);
        let cache = ScreenCache::new(Box::new(move |name: &str| -> Option<Box<dyn Screen>> {
            let color = match name {
                "desktop" => Rgb888::GREEN,
                "system" => Rgb888::RED,
                _ => return None,
            };
            Some(Box::new(Probe {
                name: name.to_string(),
                log: Rc::clone(&screen_log),
                color,
            }))
        }));

        let render_loop = RenderLoop::new(
            MockDisplay {
                log: Rc::clone(&display),
                clock: clock.clone(),
                show_cost,
                rotation: Rotation::Deg0,
            },
            clock.clone(),
            Box::new(ScriptedInput {
                script: Rc::clone(&input),
                last: ButtonSnapshot::released(),
            }),
            Rc::clone(&state),
            cache,
            RenderLoopConfig::default(),
        );

        Harness {
            bus,
            state,
            clock,
            display,
            input,
            screens,
            render_loop,
        }
    }

    fn pressed(button: Button) -> ButtonSnapshot {
        let mut snapshot = ButtonSnapshot::released();
        snapshot.set(button, true);
        snapshot
    }

    fn last_frame_origin(h: &Harness) -> Option<Rgb888> {
        h.display.borrow().frames.last().and_then(|f| f.pixel(0, 0))
    }

    #[test]
    fn test_initial_screen_is_activated() {
        let h = harness(Duration::ZERO);
        assert_eq!(h.render_loop.active_screen(), Some("desktop"));
        assert_eq!(*h.screens.borrow(), vec!["desktop:activate"]);
        assert_eq!(h.render_loop.state(), LoopState::Stopped);
    }

    #[test]
    fn test_overrun_tick_sleeps_zero() {
        let mut h = harness(Duration::from_millis(70));
        let report = h.render_loop.tick();
        assert_eq!(report.elapsed, Duration::from_millis(70));
        assert_eq!(report.sleep, Duration::ZERO);
        assert_eq!(*h.clock.sleeps.borrow(), vec![Duration::ZERO]);
    }

    #[test]
    fn test_fast_tick_sleeps_remainder() {
        let mut h = harness(Duration::from_millis(20));
        let report = h.render_loop.tick();
        assert_eq!(report.sleep, Duration::from_millis(30));
        assert!(report.frame_sent);
        assert_eq!(last_frame_origin(&h), Some(Rgb888::GREEN));
    }

    #[test]
    fn test_button_transitions_reach_bus_and_screen() {
        let mut h = harness(Duration::ZERO);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let handler: Rc<dyn EventHandler> =
            Rc::new(move |event: &mut Event| -> Result<(), ListenerError> {
                sink.borrow_mut().push(event.payload().clone());
                Ok(())
            });
        h.bus.subscribe(EventKind::ButtonPress, Rc::clone(&handler));
        h.bus.subscribe(EventKind::ButtonRelease, handler);

        h.input.borrow_mut().extend([
            pressed(Button::Up),
            pressed(Button::Up),
            ButtonSnapshot::released(),
        ]);
        for _ in 0..3 {
            h.render_loop.tick();
        }

        assert_eq!(
            *seen.borrow(),
            vec![
                EventPayload::ButtonPress { button: Button::Up },
                EventPayload::ButtonRelease { button: Button::Up },
            ]
        );
        let log = h.screens.borrow();
        assert!(log.contains(&"desktop:button_press".to_string()));
        assert!(log.contains(&"desktop:button_release".to_string()));
    }

    #[test]
    fn test_handled_press_skips_screen() {
        let mut h = harness(Duration::ZERO);
        let consume: Rc<dyn EventHandler> =
            Rc::new(|event: &mut Event| -> Result<(), ListenerError> {
                event.mark_handled();
                Ok(())
            });
        h.bus.subscribe(EventKind::ButtonPress, consume);
        h.input.borrow_mut().push_back(pressed(Button::Key1));
        h.render_loop.tick();
        assert!(!h
            .screens
            .borrow()
            .contains(&"desktop:button_press".to_string()));
    }

    #[test]
    fn test_screen_change_applies_before_render() {
        let mut h = harness(Duration::ZERO);
        let state = Rc::downgrade(&h.state);
        let navigate: Rc<dyn EventHandler> =
            Rc::new(move |event: &mut Event| -> Result<(), ListenerError> {
                if event.button() == Some(Button::Key2) {
                    if let Some(state) = state.upgrade() {
                        state.current_screen.set("system".into());
                    }
                }
                Ok(())
            });
        h.bus.subscribe(EventKind::ButtonPress, navigate);

        h.input.borrow_mut().push_back(pressed(Button::Key2));
        h.render_loop.tick();

        assert_eq!(h.render_loop.active_screen(), Some("system"));
        assert_eq!(last_frame_origin(&h), Some(Rgb888::RED));
        assert_eq!(
            *h.screens.borrow(),
            vec![
                "desktop:activate",
                "desktop:button_press",
                "desktop:deactivate",
                "system:activate"
            ]
        );
    }

    #[test]
    fn test_cached_screen_is_reused() {
        let mut h = harness(Duration::ZERO);
        h.state.current_screen.set("system".into());
        h.render_loop.tick();
        h.state.current_screen.set("desktop".into());
        h.render_loop.tick();

        let activations = h
            .screens
            .borrow()
            .iter()
            .filter(|s| s.ends_with(":activate"))
            .count();
        assert_eq!(activations, 3);
        assert_eq!(h.render_loop.active_screen(), Some("desktop"));
    }

    #[test]
    fn test_unknown_screen_falls_back() {
        let mut h = harness(Duration::ZERO);
        h.state.current_screen.set("system".into());
        h.render_loop.tick();
        h.state.current_screen.set("nope".into());
        h.render_loop.tick();
        assert_eq!(h.render_loop.active_screen(), Some("desktop"));
        assert_eq!(h.state.current_screen.get(), "desktop");
    }

    #[test]
    fn test_settings_reach_display() {
        let mut h = harness(Duration::ZERO);
        h.state.brightness.set(80);
        h.state.rotation.set(Rotation::Deg90);
        h.render_loop.tick();

        let log = h.display.borrow();
        assert_eq!(log.backlight, vec![80]);
        assert_eq!(log.rotations, vec![Rotation::Deg90]);
    }

    #[test]
    fn test_toast_overlay_expires() {
        let mut h = harness(Duration::ZERO);
        h.state
            .show_toast("Saved", Duration::from_millis(100), h.clock.now());

        h.render_loop.tick();
        let has_blue = |h: &Harness| {
            h.display
                .borrow()
                .frames
                .last()
                .is_some_and(|f| f.pixels().contains(&Rgb888::BLUE))
        };
        assert!(has_blue(&h));

        h.clock.advance(Duration::from_millis(100));
        h.render_loop.tick();
        assert!(!has_blue(&h));
    }

    #[test]
    fn test_dropped_frame_keeps_running() {
        let mut h = harness(Duration::ZERO);
        h.display.borrow_mut().fail_next = true;
        assert!(!h.render_loop.tick().frame_sent);
        assert!(h.render_loop.tick().frame_sent);
        assert_eq!(h.render_loop.dropped_frames(), 1);
    }

    #[test]
    fn test_stop_ends_loop_at_tick_boundary() {
        let mut h = harness(Duration::ZERO);
        let stop = h.render_loop.stop_flag();
        let request_stop: Rc<dyn EventHandler> =
            Rc::new(move |_: &mut Event| -> Result<(), ListenerError> {
                stop.store(true, Ordering::SeqCst);
                Ok(())
            });
        h.bus.subscribe(EventKind::ButtonPress, request_stop);
        h.input
            .borrow_mut()
            .extend([ButtonSnapshot::released(), pressed(Button::Press)]);

        h.render_loop.start();

        assert_eq!(h.render_loop.state(), LoopState::Stopped);
        // The stopping tick still rendered its frame
        assert_eq!(h.display.borrow().frames.len(), 2);
    }

    #[test]
    fn test_shutdown_runs_once() {
        let mut h = harness(Duration::ZERO);
        h.render_loop.shutdown();
        h.render_loop.shutdown();
        let display = Rc::clone(&h.display);
        drop(h);
        assert_eq!(display.borrow().shutdowns, 1);
    }

    #[test]
    fn test_drop_runs_shutdown() {
        let h = harness(Duration::ZERO);
        let display = Rc::clone(&h.display);
        let bus = Rc::clone(&h.bus);
        drop(h);
        assert_eq!(display.borrow().shutdowns, 1);
        assert_eq!(bus.subscriber_count(EventKind::ScreenChange), 0);
    }

    #[test]
    fn test_hold_published_once() {
        let mut h = harness(Duration::ZERO);
        let holds = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&holds);
        let handler: Rc<dyn EventHandler> =
            Rc::new(move |event: &mut Event| -> Result<(), ListenerError> {
                sink.borrow_mut().push(event.payload().clone());
                Ok(())
            });
        h.bus.subscribe(EventKind::ButtonHold, handler);

        // Held for 25 ticks of 50 ms
        h.input.borrow_mut().push_back(pressed(Button::Key3));
        for _ in 0..25 {
            h.render_loop.tick();
        }

        assert_eq!(
            *holds.borrow(),
            vec![EventPayload::ButtonHold {
                button: Button::Key3,
                held_ms: 1000
            }]
        );
    }

    struct Gauge(VecDeque<u8>);

    impl BatterySensor for Gauge {
        fn read(&mut self) -> BatteryReading {
            BatteryReading {
                percentage: self.0.pop_front(),
                voltage_mv: Some(3700),
                charging: Some(false),
            }
        }
    }

    struct NoShutdown;

    impl ShutdownTrigger for NoShutdown {
        fn request_shutdown(&mut self) -> Result<(), ShutdownError> {
            Ok(())
        }
    }

    #[test]
    fn test_battery_feeds_state_and_events() {
        let h = harness(Duration::ZERO);
        let Harness {
            bus,
            state,
            render_loop,
            ..
        } = h;
        let mut render_loop = render_loop.with_battery(BatteryMonitor::new(
            Box::new(Gauge(VecDeque::from([50, 15, 14]))),
            Box::new(NoShutdown),
            BatteryThresholds::default(),
        ));

        let lows = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&lows);
        let handler: Rc<dyn EventHandler> =
            Rc::new(move |_: &mut Event| -> Result<(), ListenerError> {
                *sink.borrow_mut() += 1;
                Ok(())
            });
        bus.subscribe(EventKind::BatteryLow, handler);

        for _ in 0..3 {
            render_loop.tick();
        }
        assert_eq!(state.battery_percentage.get(), Some(14));
        assert_eq!(state.battery_voltage.get(), Some(3700));
        assert_eq!(*lows.borrow(), 1);
    }
}

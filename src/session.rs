//! Session loop
//!
//! Owns the duel state, the engine config, the runtime settings, both pulse
//! counters and the frame buffer. Each step drains the sensors, advances the
//! simulation one tick and, when asked, composes both viewports.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::config::EngineConfig;
use crate::consts::TICK_RATE;
use crate::renderer::{Frame, render_split};
use crate::sensor::{PulseCounter, SensorSource, spawn_reader};
use crate::settings::Settings;
use crate::sim::{ArenaGrid, ControlState, DuelState, GameEvent, PlayerSlot, TickInput, tick};

/// Fixed-rate pacing. A late tick is run once and the schedule restarts from
/// it; missed ticks are never replayed.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    period: Duration,
    next: Instant,
}

impl FrameClock {
    pub fn new(rate: u32) -> Self {
        Self::starting_at(rate, Instant::now())
    }

    pub fn starting_at(rate: u32, now: Instant) -> Self {
        Self {
            period: Duration::from_secs(1) / rate.max(1),
            next: now,
        }
    }

    #[inline]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Time left until the next tick is due (zero if overdue)
    pub fn remaining(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }

    /// Whether a tick is due at `now`; if so, schedules the following one
    pub fn due(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next += self.period;
        if self.next < now {
            self.next = now + self.period;
        }
        true
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(TICK_RATE)
    }
}

/// A running two-player duel
pub struct Session {
    config: EngineConfig,
    settings: Settings,
    state: DuelState,
    sensors: [PulseCounter; 2],
    frame: Frame,
}

impl Session {
    /// Prepare the grid per `config.grid_prep` and place both riders
    pub fn new(grid: ArenaGrid, config: EngineConfig, settings: Settings) -> Self {
        let prep = config.grid_prep;
        // Clear around where the riders will actually start
        let spawns = config.sim.spawns.map(|s| grid.clamp_to_interior(s.pos()));
        let grid = grid.prepared(
            &config.render.palette.solid_materials(),
            prep.scatter_materials,
            &spawns,
            prep.clear_half_extent,
            prep.seed,
        );
        log::info!(
            "Session start: {}x{} arena, {} solid cells, combat {}",
            grid.size(),
            grid.size(),
            grid.solid_count(),
            if config.sim.combat.is_some() { "on" } else { "off" }
        );

        let state = DuelState::new(Arc::new(grid), &config.sim);
        Self {
            config,
            settings,
            state,
            sensors: [PulseCounter::new(), PulseCounter::new()],
            frame: Frame::new(0, 0),
        }
    }

    /// Start a background reader feeding `slot`'s pulse counter
    pub fn attach_sensor(&self, slot: PlayerSlot, source: SensorSource) -> Option<JoinHandle<()>> {
        let name = &self.config.render.players[slot.index()].name;
        spawn_reader(name, source, self.sensors[slot.index()].clone())
    }

    /// Pulse counter for `slot`, shared with any attached reader
    pub fn sensor(&self, slot: PlayerSlot) -> &PulseCounter {
        &self.sensors[slot.index()]
    }

    /// Advance one tick. Returns the events it produced.
    pub fn step(&mut self, controls: [ControlState; 2]) -> &[GameEvent] {
        let input = TickInput {
            controls,
            pulses: self.sensors.each_ref().map(PulseCounter::drain),
            sensitivity: self.settings.sensitivity,
        };
        tick(&mut self.state, &input, &self.config.sim);

        for event in &self.state.events {
            log::debug!("tick {}: {:?}", self.state.time_ticks, event);
        }
        &self.state.events
    }

    /// Compose both viewports into a `width` x `height` frame
    pub fn render(&mut self, width: usize, height: usize) -> &Frame {
        self.frame.resize(width, height);
        render_split(&mut self.frame, &self.state, &self.config.render);
        &self.frame
    }

    /// Run `ticks` ticks with idle controls and render the last state
    pub fn run_headless(&mut self, ticks: u64, width: usize, height: usize) -> &Frame {
        for _ in 0..ticks {
            self.step([ControlState::default(); 2]);
        }
        log::info!(
            "Headless run finished after {} ticks, scores {:?}",
            self.state.time_ticks,
            self.state.scores()
        );
        self.render(width, height)
    }

    /// Names, scores and sensitivity for the status bar
    pub fn status_line(&self) -> String {
        let [one, two] = &self.config.render.players;
        let [s1, s2] = self.state.scores();
        format!(
            "{}: {}  {}: {}  sensitivity {:.0}",
            one.name.to_uppercase(),
            s1,
            two.name.to_uppercase(),
            s2,
            self.settings.sensitivity
        )
    }

    pub fn adjust_sensitivity(&mut self, delta: f32) -> f32 {
        self.settings.adjust_sensitivity(delta)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> &DuelState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

//! Connection lines between VC and startup positions.
//!
//! The renderer owns the active line set, the current display mode, and a
//! single repeating one-second timer that drives every midpoint pulse
//! marker. Reloads go through the data loader's generation counter, so a
//! superseded fetch can never repopulate the line set.

use std::time::Duration;

use bevy::prelude::*;

use crate::config::MapAppConfig;
use crate::data::loader::{DataLoader, LoadSlot};
use crate::data::records::ConnectionRecord;
use crate::geo::GeoPoint;
use crate::layers::{LayerId, LayerRegistry};

/// What the connection layer is currently showing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConnectionMode {
    Off,
    /// Every connection, as solid lines with midpoint pulses.
    All,
    /// Only connections whose startup endpoint equals the selected
    /// position, as dashed lines.
    ForStartup(GeoPoint),
}

/// One rendered line, VC end to startup end.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionLine {
    pub from: GeoPoint,
    pub to: GeoPoint,
}

/// Resource owning connection rendering state.
#[derive(Resource)]
pub struct ConnectionState {
    mode: ConnectionMode,
    lines: Vec<ConnectionLine>,
    pulse: Timer,
    pulse_at_startup_end: bool,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self {
            mode: ConnectionMode::Off,
            lines: Vec::new(),
            pulse: Timer::from_seconds(1.0, TimerMode::Repeating),
            pulse_at_startup_end: false,
        }
    }
}

impl ConnectionState {
    /// Show every connection: clear, reload, attach.
    pub fn show_all(
        &mut self,
        loader: &mut DataLoader,
        config: &MapAppConfig,
        registry: &mut LayerRegistry,
    ) {
        self.begin(ConnectionMode::All);
        loader.request(config, LoadSlot::Connections);
        registry.set_attached(LayerId::Connections, true);
    }

    /// Show only the connections ending at one startup's position.
    /// Matching is by exact coordinate equality; entities sharing a
    /// position are indistinguishable to this filter.
    pub fn show_for_startup(
        &mut self,
        position: GeoPoint,
        loader: &mut DataLoader,
        config: &MapAppConfig,
        registry: &mut LayerRegistry,
    ) {
        self.begin(ConnectionMode::ForStartup(position));
        loader.request(config, LoadSlot::Connections);
        registry.set_attached(LayerId::Connections, true);
    }

    /// Hide the layer without touching the line set; the next show
    /// reloads from scratch anyway.
    pub fn detach(&mut self, registry: &mut LayerRegistry) {
        registry.set_attached(LayerId::Connections, false);
    }

    /// Enter a new mode, dropping previously drawn lines and resetting
    /// the shared pulse timer.
    pub fn begin(&mut self, mode: ConnectionMode) {
        self.mode = mode;
        self.lines.clear();
        self.pulse.reset();
        self.pulse_at_startup_end = false;
    }

    /// Apply a completed (non-stale) load of `connections.json`.
    pub fn apply_loaded(&mut self, records: Vec<ConnectionRecord>) {
        self.lines = match self.mode {
            ConnectionMode::Off => Vec::new(),
            ConnectionMode::All => records.iter().map(line_of).collect(),
            ConnectionMode::ForStartup(position) => records
                .iter()
                .filter(|record| record.startup_point() == position)
                .map(line_of)
                .collect(),
        };
        self.pulse.reset();
        self.pulse_at_startup_end = false;
        info!("showing {} connection lines", self.lines.len());
    }

    /// Advance the shared animation timer. The pulse only runs while the
    /// unfiltered view has lines to animate.
    pub fn tick(&mut self, delta: Duration) {
        if self.mode != ConnectionMode::All || self.lines.is_empty() {
            return;
        }
        if self.pulse.tick(delta).just_finished() {
            // Discrete jump between endpoints, no easing.
            self.pulse_at_startup_end = !self.pulse_at_startup_end;
        }
    }

    pub fn mode(&self) -> ConnectionMode {
        self.mode
    }

    pub fn lines(&self) -> &[ConnectionLine] {
        &self.lines
    }

    /// Current position of a line's pulse marker.
    pub fn pulse_point(&self, line: &ConnectionLine) -> GeoPoint {
        if self.pulse_at_startup_end {
            line.to
        } else {
            line.from
        }
    }
}

fn line_of(record: &ConnectionRecord) -> ConnectionLine {
    ConnectionLine {
        from: record.vc_point(),
        to: record.startup_point(),
    }
}

/// Update system driving the single pulse timer.
pub fn tick_connection_pulse(time: Res<Time>, mut state: ResMut<ConnectionState>) {
    state.tick(time.delta());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<ConnectionRecord> {
        serde_json::from_str(
            r#"[
                { "vc": [-3.70, 40.42], "startup": [-3.71, 40.40] },
                { "vc": [-3.70, 40.42], "startup": [2.17, 41.38] },
                { "vc": [-0.37, 39.47], "startup": [-3.71, 40.40] }
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn show_all_keeps_every_connection() {
        let mut state = ConnectionState::default();
        state.begin(ConnectionMode::All);
        state.apply_loaded(records());
        assert_eq!(state.lines().len(), 3);
    }

    #[test]
    fn filtered_mode_matches_startup_endpoint_exactly() {
        let mut state = ConnectionState::default();
        state.begin(ConnectionMode::ForStartup(GeoPoint::new(-3.71, 40.40)));
        state.apply_loaded(records());
        assert_eq!(state.lines().len(), 2);
        assert!(state
            .lines()
            .iter()
            .all(|line| line.to == GeoPoint::new(-3.71, 40.40)));

        // A nearby but unequal coordinate matches nothing.
        state.begin(ConnectionMode::ForStartup(GeoPoint::new(-3.7100001, 40.40)));
        state.apply_loaded(records());
        assert!(state.lines().is_empty());
    }

    #[test]
    fn begin_clears_previous_lines() {
        let mut state = ConnectionState::default();
        state.begin(ConnectionMode::All);
        state.apply_loaded(records());
        state.begin(ConnectionMode::All);
        assert!(state.lines().is_empty());
    }

    #[test]
    fn loads_landing_while_off_render_nothing() {
        let mut state = ConnectionState::default();
        state.apply_loaded(records());
        assert!(state.lines().is_empty());
    }

    #[test]
    fn pulse_jumps_between_endpoints_once_per_second() {
        let mut state = ConnectionState::default();
        state.begin(ConnectionMode::All);
        state.apply_loaded(records());
        let line = state.lines()[0].clone();

        assert_eq!(state.pulse_point(&line), line.from);
        state.tick(Duration::from_secs(1));
        assert_eq!(state.pulse_point(&line), line.to);
        state.tick(Duration::from_secs(1));
        assert_eq!(state.pulse_point(&line), line.from);
    }

    #[test]
    fn pulse_is_idle_in_filtered_mode() {
        let mut state = ConnectionState::default();
        state.begin(ConnectionMode::ForStartup(GeoPoint::new(-3.71, 40.40)));
        state.apply_loaded(records());
        let line = state.lines()[0].clone();
        state.tick(Duration::from_secs(1));
        assert_eq!(state.pulse_point(&line), line.from);
    }
}

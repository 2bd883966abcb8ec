//! Background loading of the static JSON documents.
//!
//! Each request runs a blocking fetch on its own thread and delivers the
//! parsed result over an mpsc channel, drained once per frame. Every
//! request carries a generation number per document slot; a completion
//! whose generation has been superseded is discarded, so rapid toggling
//! can never interleave stale results with fresh ones.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;
use std::thread;

use bevy::prelude::*;
use thiserror::Error;

use crate::config::MapAppConfig;
use crate::connections::ConnectionState;
use crate::layers::{LayerId, LayerRegistry};
use crate::markers;

use super::records::{ConnectionRecord, StartupRecord, VcRecord};

/// The single failure kind of the data layer: the document could not be
/// fetched or decoded. Logged and swallowed; the affected layer stays empty.
#[derive(Debug, Error)]
pub enum DataUnavailable {
    #[error("request error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("endpoint responded with {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The three documents the app knows how to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSlot {
    VentureCapitals,
    Startups,
    Connections,
}

impl LoadSlot {
    pub fn document(self) -> &'static str {
        match self {
            LoadSlot::VentureCapitals => "venture_capitals.json",
            LoadSlot::Startups => "startups.json",
            LoadSlot::Connections => "connections.json",
        }
    }

    fn index(self) -> usize {
        match self {
            LoadSlot::VentureCapitals => 0,
            LoadSlot::Startups => 1,
            LoadSlot::Connections => 2,
        }
    }
}

/// Parsed body of a completed load.
pub enum Payload {
    VentureCapitals(Vec<VcRecord>),
    Startups(Vec<StartupRecord>),
    Connections(Vec<ConnectionRecord>),
}

/// One completed load, stale or not.
pub struct LoadResult {
    pub slot: LoadSlot,
    pub generation: u64,
    pub payload: Result<Payload, DataUnavailable>,
}

/// Resource owning the result channel and the per-slot generation counters.
#[derive(Resource)]
pub struct DataLoader {
    tx: Sender<LoadResult>,
    rx: Mutex<Receiver<LoadResult>>,
    generations: [u64; 3],
}

impl Default for DataLoader {
    fn default() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx: Mutex::new(rx),
            generations: [0; 3],
        }
    }
}

impl DataLoader {
    /// Kick off a background fetch for one document. Any earlier pending
    /// request for the same slot becomes stale immediately.
    pub fn request(&mut self, config: &MapAppConfig, slot: LoadSlot) -> u64 {
        let generation = self.bump(slot);
        let url = config.document_url(slot.document());
        let tx = self.tx.clone();
        thread::spawn(move || {
            let payload = fetch_document(&url, slot);
            // The receiver only disappears on shutdown.
            let _ = tx.send(LoadResult {
                slot,
                generation,
                payload,
            });
        });
        generation
    }

    /// Whether a completion still matches the slot's current request.
    pub fn is_current(&self, slot: LoadSlot, generation: u64) -> bool {
        self.generations[slot.index()] == generation
    }

    fn bump(&mut self, slot: LoadSlot) -> u64 {
        let counter = &mut self.generations[slot.index()];
        *counter += 1;
        *counter
    }

    fn drain(&self) -> Vec<LoadResult> {
        let Ok(rx) = self.rx.lock() else {
            return Vec::new();
        };
        let mut results = Vec::new();
        while let Ok(result) = rx.try_recv() {
            results.push(result);
        }
        results
    }
}

/// Fetch and decode one document on the calling (background) thread.
fn fetch_document(url: &str, slot: LoadSlot) -> Result<Payload, DataUnavailable> {
    let response = reqwest::blocking::Client::new().get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(DataUnavailable::Status(status));
    }
    let bytes = response.bytes()?;
    match slot {
        LoadSlot::VentureCapitals => Ok(Payload::VentureCapitals(serde_json::from_slice(&bytes)?)),
        LoadSlot::Startups => Ok(Payload::Startups(serde_json::from_slice(&bytes)?)),
        LoadSlot::Connections => Ok(Payload::Connections(serde_json::from_slice(&bytes)?)),
    }
}

/// Startup system: request the entity documents once per run.
/// Connections are only loaded on demand.
pub fn request_initial_data(config: Res<MapAppConfig>, mut loader: ResMut<DataLoader>) {
    loader.request(&config, LoadSlot::VentureCapitals);
    loader.request(&config, LoadSlot::Startups);
}

/// Update system: apply completed loads. Markers for a document are
/// attached to their layer only after the whole batch has been processed,
/// so each source appears all at once.
pub fn drain_load_results(
    mut commands: Commands,
    loader: Res<DataLoader>,
    mut registry: ResMut<LayerRegistry>,
    mut connections: ResMut<ConnectionState>,
) {
    for result in loader.drain() {
        if !loader.is_current(result.slot, result.generation) {
            info!("discarding stale {} load", result.slot.document());
            continue;
        }
        let records = match result.payload {
            Ok(records) => records,
            Err(err) => {
                warn!("failed to load {}: {err}", result.slot.document());
                continue;
            }
        };
        match records {
            Payload::VentureCapitals(records) => {
                let total = records.len();
                let mut spawned = Vec::new();
                for record in records {
                    match markers::vc_marker_bundle(record) {
                        Some(bundle) => spawned.push(commands.spawn(bundle).id()),
                        None => warn!("skipping venture capital record without usable coordinates"),
                    }
                }
                info!("loaded {}/{} venture capital markers", spawned.len(), total);
                registry.extend_members(LayerId::VentureCapitals, spawned);
            }
            Payload::Startups(records) => {
                let total = records.len();
                let mut spawned = Vec::new();
                for record in records {
                    match markers::startup_marker_bundle(record) {
                        Some(bundle) => spawned.push(commands.spawn(bundle).id()),
                        None => warn!("skipping startup record without usable coordinates"),
                    }
                }
                info!("loaded {}/{} startup markers", spawned.len(), total);
                registry.extend_members(LayerId::Startups, spawned);
            }
            Payload::Connections(records) => {
                connections.apply_loaded(records);
            }
        }
    }
}

//! Named, independently toggleable layers of map renderables.

use bevy::prelude::*;
use std::collections::HashMap;

/// The three logical layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerId {
    VentureCapitals,
    Startups,
    Connections,
}

#[derive(Debug, Default)]
struct LayerState {
    attached: bool,
    members: Vec<Entity>,
}

/// Resource tracking, per layer, a member set and a single boolean
/// "attached to the map" state. Detaching hides exactly the current
/// members; the set itself is untouched, so re-attaching restores the
/// same markers without duplication or refetching.
#[derive(Resource, Debug)]
pub struct LayerRegistry {
    layers: HashMap<LayerId, LayerState>,
}

impl Default for LayerRegistry {
    fn default() -> Self {
        let mut layers = HashMap::new();
        // Marker layers start visible, connections start hidden.
        for (id, attached) in [
            (LayerId::VentureCapitals, true),
            (LayerId::Startups, true),
            (LayerId::Connections, false),
        ] {
            layers.insert(
                id,
                LayerState {
                    attached,
                    members: Vec::new(),
                },
            );
        }
        Self { layers }
    }
}

impl LayerRegistry {
    /// Attach or detach a layer. Idempotent in both directions.
    pub fn set_attached(&mut self, id: LayerId, attached: bool) {
        if let Some(layer) = self.layers.get_mut(&id) {
            layer.attached = attached;
        }
    }

    pub fn is_attached(&self, id: LayerId) -> bool {
        self.layers.get(&id).is_some_and(|layer| layer.attached)
    }

    /// Add a freshly loaded batch of markers to a layer.
    pub fn extend_members(&mut self, id: LayerId, members: impl IntoIterator<Item = Entity>) {
        if let Some(layer) = self.layers.get_mut(&id) {
            layer.members.extend(members);
        }
    }

    /// Current member set, attached or not.
    pub fn members(&self, id: LayerId) -> &[Entity] {
        self.layers
            .get(&id)
            .map(|layer| layer.members.as_slice())
            .unwrap_or(&[])
    }

    /// Members of a layer, but only while it is attached.
    pub fn visible_members(&self, id: LayerId) -> &[Entity] {
        match self.layers.get(&id) {
            Some(layer) if layer.attached => layer.members.as_slice(),
            _ => &[],
        }
    }
}

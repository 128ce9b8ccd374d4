use sz_geometry::{DEFAULT_MIN_ZONE_SIZE, NormalizedZone, PercentPoint};

/// Opaque zone identifier.
///
/// Allocated from a per-registry counter and never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneId(u64);

impl ZoneId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "zone-{}", self.0)
    }
}

/// A committed zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegisteredZone {
    pub id: ZoneId,
    pub zone: NormalizedZone,
}

/// Ordered set of extraction regions over one image.
///
/// Insertion order is extraction order. Overlapping zones are kept as-is.
#[derive(Debug, Clone)]
pub struct ZoneRegistry {
    zones: Vec<RegisteredZone>,
    next_id: u64,
    min_size: f32,
}

impl Default for ZoneRegistry {
    fn default() -> Self {
        Self::with_min_size(DEFAULT_MIN_ZONE_SIZE)
    }
}

impl ZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_size(min_size: f32) -> Self {
        Self {
            zones: Vec::new(),
            next_id: 1,
            min_size,
        }
    }

    pub fn min_size(&self) -> f32 {
        self.min_size
    }

    /// Commit a zone.
    ///
    /// The zone is re-clamped first; zones below the minimum size are dropped
    /// silently and `None` is returned.
    pub fn add(&mut self, zone: NormalizedZone) -> Option<ZoneId> {
        let zone = zone.normalized();
        if !zone.meets_min_size(self.min_size) {
            return None;
        }

        let id = ZoneId(self.next_id);
        self.next_id += 1;
        self.zones.push(RegisteredZone { id, zone });
        Some(id)
    }

    /// Remove a zone. Unknown ids are ignored.
    pub fn remove(&mut self, id: ZoneId) -> bool {
        let before = self.zones.len();
        self.zones.retain(|z| z.id != id);
        self.zones.len() != before
    }

    pub fn clear(&mut self) {
        self.zones.clear();
    }

    pub fn get(&self, id: ZoneId) -> Option<&RegisteredZone> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn zones(&self) -> &[RegisteredZone] {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

/// Zone input actions (pure).
///
/// Pointer positions are already in percent of the displayed image.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Pointer pressed: start drawing a new zone.
    PointerDown { point: PercentPoint },
    /// Pointer moved: update the in-progress rectangle.
    PointerMove { point: PercentPoint },
    /// Pointer released: commit the rectangle if it is large enough.
    PointerUp { point: PercentPoint },
    /// Abort the in-progress drag without committing.
    CancelDrag,
    RemoveZone { id: ZoneId },
    ClearZones,
}

/// Effects requested by the zone model (executed by the host).
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ZoneAdded { zone: RegisteredZone },
    /// The drag was too small to be a region (accidental click).
    ZoneDiscarded,
    ZoneRemoved { id: ZoneId },
    ZonesCleared,
}

/// Zone drawing model: registry plus the in-progress drag.
#[derive(Debug, Default)]
pub struct Model {
    registry: ZoneRegistry,
    press: Option<PercentPoint>,
    preview: Option<NormalizedZone>,
}

impl Model {
    pub fn with_min_size(min_size: f32) -> Self {
        Self {
            registry: ZoneRegistry::with_min_size(min_size),
            ..Self::default()
        }
    }

    pub fn registry(&self) -> &ZoneRegistry {
        &self.registry
    }

    pub fn is_dragging(&self) -> bool {
        self.press.is_some()
    }

    /// Rectangle being drawn, for overlay rendering.
    pub fn preview(&self) -> Option<NormalizedZone> {
        self.preview
    }

    /// Drop every zone and any drag in progress.
    pub fn reset(&mut self) {
        self.registry.clear();
        self.press = None;
        self.preview = None;
    }

    pub fn reduce(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::PointerDown { point } => {
                self.press = Some(point);
                self.preview = Some(NormalizedZone::from_drag(point, point));
                Vec::new()
            }

            Action::PointerMove { point } => {
                if let Some(press) = self.press {
                    self.preview = Some(NormalizedZone::from_drag(press, point));
                }
                Vec::new()
            }

            Action::PointerUp { point } => {
                self.preview = None;
                let Some(press) = self.press.take() else {
                    return Vec::new();
                };

                let zone = NormalizedZone::from_drag(press, point);
                match self.registry.add(zone) {
                    Some(id) => match self.registry.get(id) {
                        Some(zone) => vec![Effect::ZoneAdded { zone: *zone }],
                        None => Vec::new(),
                    },
                    None => vec![Effect::ZoneDiscarded],
                }
            }

            Action::CancelDrag => {
                self.press = None;
                self.preview = None;
                Vec::new()
            }

            Action::RemoveZone { id } => {
                if self.registry.remove(id) {
                    vec![Effect::ZoneRemoved { id }]
                } else {
                    Vec::new()
                }
            }

            Action::ClearZones => {
                let had_zones = !self.registry.is_empty();
                self.registry.clear();
                if had_zones {
                    vec![Effect::ZonesCleared]
                } else {
                    Vec::new()
                }
            }
        }
    }
}

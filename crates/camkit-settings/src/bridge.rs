//! Typed registry wiring stored settings to live application state.
//!
//! Each key owns an optional get/set accessor pair pointing at external
//! mutable state (a UI control, a test probe, a host integration) plus a
//! local fallback value. Reads prefer the bound getter; writes go through
//! the bound setter and are recorded locally as well, so a key keeps its
//! last written value if it is never bound.

use camkit_core::{BoundaryMode, Bounds3, Units, DEFAULT_REFRESH_HZ};
use std::collections::HashMap;
use std::fmt;

/// Numeric settings exposed through the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKey {
    /// Low X machining limit.
    MinX,
    /// Low Y machining limit.
    MinY,
    /// Low Z machining limit.
    MinZ,
    /// High X machining limit.
    MaxX,
    /// High Y machining limit.
    MaxY,
    /// High Z machining limit.
    MaxZ,
    /// Clearance height for drop-style vertical retracts.
    SafetyHeight,
    /// Upper bound on progress refresh side effects per second.
    ProgressMaxHz,
}

impl ScalarKey {
    /// All scalar keys, in boundary-box order.
    pub fn all() -> &'static [ScalarKey] {
        &[
            ScalarKey::MinX,
            ScalarKey::MinY,
            ScalarKey::MinZ,
            ScalarKey::MaxX,
            ScalarKey::MaxY,
            ScalarKey::MaxZ,
            ScalarKey::SafetyHeight,
            ScalarKey::ProgressMaxHz,
        ]
    }
}

/// Boolean settings exposed through the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagKey {
    /// Run the preview refresh callback while a job is generating.
    ShowProgressPreview,
    /// Build collision geometry for generation runs.
    CollisionDetection,
}

impl FlagKey {
    /// All flag keys.
    pub fn all() -> &'static [FlagKey] {
        &[FlagKey::ShowProgressPreview, FlagKey::CollisionDetection]
    }
}

fn scalar_default(key: ScalarKey) -> f64 {
    match key {
        // Matches the baseline process safety height.
        ScalarKey::SafetyHeight => 5.0,
        ScalarKey::ProgressMaxHz => DEFAULT_REFRESH_HZ,
        _ => 0.0,
    }
}

fn flag_default(key: FlagKey) -> bool {
    match key {
        FlagKey::ShowProgressPreview => false,
        FlagKey::CollisionDetection => false,
    }
}

/// One key's accessor pair plus its local fallback value.
struct Binding<T: Copy> {
    get: Option<Box<dyn Fn() -> T>>,
    set: Option<Box<dyn Fn(T)>>,
    local: T,
}

impl<T: Copy> Binding<T> {
    fn new(local: T) -> Self {
        Self {
            get: None,
            set: None,
            local,
        }
    }

    fn value(&self) -> T {
        match &self.get {
            Some(get) => get(),
            None => self.local,
        }
    }

    fn assign(&mut self, value: T) {
        if let Some(set) = &self.set {
            set(value);
        }
        self.local = value;
    }

    fn bind(&mut self, get: impl Fn() -> T + 'static, set: impl Fn(T) + 'static) {
        self.get = Some(Box::new(get));
        self.set = Some(Box::new(set));
    }
}

impl<T: Copy + fmt::Debug> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("bound", &self.get.is_some())
            .field("local", &self.local)
            .finish()
    }
}

/// Registry of live settings accessors with local fallbacks
///
/// Every key is seeded with its default at construction, so reads never
/// fail. Binding a key later replaces where reads and writes go, not what
/// the key means.
#[derive(Debug)]
pub struct SettingsBridge {
    scalars: HashMap<ScalarKey, Binding<f64>>,
    flags: HashMap<FlagKey, Binding<bool>>,
    unit: Binding<Units>,
    boundary_mode: Binding<BoundaryMode>,
}

impl SettingsBridge {
    /// Creates a bridge with every key at its default value.
    pub fn new() -> Self {
        let mut scalars = HashMap::new();
        for &key in ScalarKey::all() {
            scalars.insert(key, Binding::new(scalar_default(key)));
        }
        let mut flags = HashMap::new();
        for &key in FlagKey::all() {
            flags.insert(key, Binding::new(flag_default(key)));
        }
        Self {
            scalars,
            flags,
            unit: Binding::new(Units::default()),
            boundary_mode: Binding::new(BoundaryMode::default()),
        }
    }

    /// Current value of a numeric setting.
    pub fn scalar(&self, key: ScalarKey) -> f64 {
        self.scalars
            .get(&key)
            .map(|binding| binding.value())
            .unwrap_or_else(|| scalar_default(key))
    }

    /// Writes a numeric setting through its binding.
    pub fn set_scalar(&mut self, key: ScalarKey, value: f64) {
        self.scalars
            .entry(key)
            .or_insert_with(|| Binding::new(scalar_default(key)))
            .assign(value);
    }

    /// Installs the accessor pair for a numeric setting.
    pub fn bind_scalar(
        &mut self,
        key: ScalarKey,
        get: impl Fn() -> f64 + 'static,
        set: impl Fn(f64) + 'static,
    ) {
        self.scalars
            .entry(key)
            .or_insert_with(|| Binding::new(scalar_default(key)))
            .bind(get, set);
    }

    /// Current value of a boolean setting.
    pub fn flag(&self, key: FlagKey) -> bool {
        self.flags
            .get(&key)
            .map(|binding| binding.value())
            .unwrap_or_else(|| flag_default(key))
    }

    /// Writes a boolean setting through its binding.
    pub fn set_flag(&mut self, key: FlagKey, value: bool) {
        self.flags
            .entry(key)
            .or_insert_with(|| Binding::new(flag_default(key)))
            .assign(value);
    }

    /// Installs the accessor pair for a boolean setting.
    pub fn bind_flag(
        &mut self,
        key: FlagKey,
        get: impl Fn() -> bool + 'static,
        set: impl Fn(bool) + 'static,
    ) {
        self.flags
            .entry(key)
            .or_insert_with(|| Binding::new(flag_default(key)))
            .bind(get, set);
    }

    /// The active unit system.
    pub fn unit(&self) -> Units {
        self.unit.value()
    }

    /// Sets the active unit system.
    pub fn set_unit(&mut self, unit: Units) {
        self.unit.assign(unit);
    }

    /// Installs the accessor pair for the unit system.
    pub fn bind_unit(
        &mut self,
        get: impl Fn() -> Units + 'static,
        set: impl Fn(Units) + 'static,
    ) {
        self.unit.bind(get, set);
    }

    /// The active boundary interpretation mode.
    pub fn boundary_mode(&self) -> BoundaryMode {
        self.boundary_mode.value()
    }

    /// Sets the boundary interpretation mode.
    pub fn set_boundary_mode(&mut self, mode: BoundaryMode) {
        self.boundary_mode.assign(mode);
    }

    /// Installs the accessor pair for the boundary mode.
    pub fn bind_boundary_mode(
        &mut self,
        get: impl Fn() -> BoundaryMode + 'static,
        set: impl Fn(BoundaryMode) + 'static,
    ) {
        self.boundary_mode.bind(get, set);
    }

    /// Snapshot of the six machining limits.
    pub fn bounds(&self) -> Bounds3 {
        Bounds3::new(
            self.scalar(ScalarKey::MinX),
            self.scalar(ScalarKey::MaxX),
            self.scalar(ScalarKey::MinY),
            self.scalar(ScalarKey::MaxY),
            self.scalar(ScalarKey::MinZ),
            self.scalar(ScalarKey::MaxZ),
        )
    }

    /// Writes all six machining limits.
    pub fn set_bounds(&mut self, bounds: Bounds3) {
        self.set_scalar(ScalarKey::MinX, bounds.minx);
        self.set_scalar(ScalarKey::MaxX, bounds.maxx);
        self.set_scalar(ScalarKey::MinY, bounds.miny);
        self.set_scalar(ScalarKey::MaxY, bounds.maxy);
        self.set_scalar(ScalarKey::MinZ, bounds.minz);
        self.set_scalar(ScalarKey::MaxZ, bounds.maxz);
    }
}

impl Default for SettingsBridge {
    fn default() -> Self {
        Self::new()
    }
}

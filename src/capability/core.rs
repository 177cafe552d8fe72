use bitflags::bitflags;
use thiserror::Error;

bitflags! {
    /// Environment features a chrome may require.
    ///
    /// Requirement declarations are written as space-separated tags at the
    /// declaration boundary and parsed into a set once, during discovery.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CapabilitySet: u32 {
        const TOUCH = 1 << 0;
        const ORIENTATION = 1 << 1;
        const MOUSE = 1 << 2;
        const KEYBOARD = 1 << 3;
        const FULLSCREEN = 1 << 4;
        const OFFLINE = 1 << 5;
    }
}

/// A requirement tag that does not name any known capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown capability tag `{0}`")]
pub struct UnknownCapability(pub String);

impl CapabilitySet {
    pub fn from_tag(tag: &str) -> Result<Self, UnknownCapability> {
        match tag {
            "touch" => Ok(Self::TOUCH),
            "orientation" => Ok(Self::ORIENTATION),
            "mouse" => Ok(Self::MOUSE),
            "keyboard" => Ok(Self::KEYBOARD),
            "fullscreen" => Ok(Self::FULLSCREEN),
            "offline" => Ok(Self::OFFLINE),
            other => Err(UnknownCapability(other.to_string())),
        }
    }

    /// Parse a space-separated requirement declaration. An empty declaration
    /// yields the empty set, which every environment satisfies.
    pub fn parse_requirements(declaration: &str) -> Result<Self, UnknownCapability> {
        declaration
            .split_whitespace()
            .try_fold(Self::empty(), |set, tag| Ok(set | Self::from_tag(tag)?))
    }
}

/// Capability gate consumed by discovery and the state manager.
///
/// Detection internals live with the host; the engine only asks whether a
/// requirement set is met and, on orientation flips, requests a refresh of
/// whatever classification the host derives from the environment.
pub trait CapabilityProbe: Send {
    /// Whether every capability in `required` is present.
    fn check(&self, required: CapabilitySet) -> bool;

    /// Whether the host delivers orientation notifications.
    fn supports_orientation_events(&self) -> bool {
        false
    }

    /// Re-evaluate the environment classification after an orientation flip.
    fn refresh_classes(&mut self) {}
}

/// Fixed capability set, for hosts whose environment never changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCapabilities {
    available: CapabilitySet,
    orientation_events: bool,
}

impl StaticCapabilities {
    pub fn new(available: CapabilitySet) -> Self {
        Self {
            available,
            orientation_events: false,
        }
    }

    pub fn with_orientation_events(mut self, supported: bool) -> Self {
        self.orientation_events = supported;
        self
    }
}

impl CapabilityProbe for StaticCapabilities {
    fn check(&self, required: CapabilitySet) -> bool {
        self.available.contains(required)
    }

    fn supports_orientation_events(&self) -> bool {
        self.orientation_events
    }
}

use std::sync::Arc;

use crate::geometry::Size;
use crate::host::{DescriptorNode, HostEnvironment, NodeId};

/// A presentation wrapper able to test whether it fits a display size and to
/// be activated, resized, and deactivated.
///
/// A chrome is either inert (never activated, or activated then deactivated)
/// or active. `set_size` is only delivered while active.
pub trait Chrome: Send {
    fn name(&self) -> &str {
        "chrome"
    }

    /// Whether this chrome's layout is usable at `size`.
    fn fits(&self, size: Size) -> bool;

    /// Bring the chrome live and return its root content handle. The caller
    /// attaches the handle to the hosting container; the engine never looks
    /// inside it.
    fn activate(&mut self) -> NodeId;

    /// Release everything `activate` acquired.
    fn deactivate(&mut self);

    /// Re-lay-out content for new dimensions.
    fn set_size(&mut self, size: Size);
}

/// Builds a chrome from its descriptor. The descriptor node is attached to
/// the measurement container while the factory runs, so construction can
/// measure against real rendering.
pub type ChromeFactory =
    Arc<dyn Fn(&mut dyn HostEnvironment, &DescriptorNode) -> Box<dyn Chrome> + Send + Sync>;

/// First chrome in registry order whose fit test passes.
///
/// First-match keeps selection O(n) and predictable; the burden of priority
/// ordering is on discovery order. Declarations must be ordered by
/// descending specificity so the preferred chrome wins ties.
pub fn select(chromes: &[Box<dyn Chrome>], size: Size) -> Option<usize> {
    chromes.iter().position(|chrome| chrome.fits(size))
}

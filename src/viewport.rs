//! Viewport measurement and orientation bookkeeping.
//!
//! The host owns the actual accessors; this module layers the scroll-nudge
//! workaround, the legacy fallback, and the orientation-dependent viewport
//! hint on top of them.

use crate::capability::CapabilityProbe;
use crate::geometry::Size;
use crate::host::{HostEnvironment, NodeId};

/// Viewport hint content for the normal orientation.
pub const PORTRAIT_HINT: &str = "width=device-width, height=device-height";

/// Viewport hint content while rotated.
pub const LANDSCAPE_HINT: &str = "width=device-height, height=device-width";

/// Display area currently usable for content.
///
/// A non-zero scroll offset means a collapsible host bar is holding space;
/// scrolling back to origin with a one pixel offset reclaims it before the
/// dimensions are read. Legacy hosts without a viewport accessor fall back
/// to document metrics.
pub fn available_size(host: &mut dyn HostEnvironment) -> Size {
    let (x, y) = host.scroll_offset();
    if x != 0 || y != 0 {
        host.scroll_to(0, 1);
    }
    host.viewport_size()
        .unwrap_or_else(|| host.document_size())
}

/// Orientation bookkeeping for one notification.
///
/// Returns whether the stored orientation actually changed; duplicate
/// notifications are a no-op. On a real change the environment
/// classification is refreshed, the viewport hint rewritten, and the scroll
/// nudge re-issued. Selection is untouched: rotation also changes the
/// measured size, so the next tick picks it up.
pub fn apply_orientation_change(
    host: &mut dyn HostEnvironment,
    probe: &mut dyn CapabilityProbe,
    orientation: &mut i32,
    hint_node: NodeId,
) -> bool {
    let reported = host.orientation();
    if *orientation == reported {
        return false;
    }

    probe.refresh_classes();
    *orientation = reported;

    let hint = if reported % 180 != 0 {
        LANDSCAPE_HINT
    } else {
        PORTRAIT_HINT
    };
    host.set_node_content(hint_node, hint);
    host.scroll_to(0, 1);
    true
}

//! Activate/deactivate transition between chromes.

use crate::chrome::Chrome;
use crate::host::{HostEnvironment, NodeId};

/// Swap the chrome hosted in `container` from `previous` to `next`.
///
/// Order matters: the container is emptied first, the previous chrome is
/// deactivated before the next one is activated, and only the new root
/// content is attached afterward. The container therefore never hosts two
/// chromes at once. The caller records `next` as active and delivers the
/// current size to it.
pub fn swap_active(
    host: &mut dyn HostEnvironment,
    chromes: &mut [Box<dyn Chrome>],
    container: NodeId,
    previous: Option<usize>,
    next: usize,
) {
    host.clear_children(container);
    if let Some(index) = previous {
        chromes[index].deactivate();
    }
    let root = chromes[next].activate();
    host.append_child(container, root);
}

use crate::geometry::Size;

/// Opaque handle to a node in the host's content tree.
///
/// The engine never inspects what a handle points at; it only threads handles
/// between the host's own operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

/// Raw chrome declaration pulled out of the host document.
#[derive(Debug, Clone)]
pub struct DescriptorNode {
    pub node: NodeId,
    /// Space-separated capability tags, exactly as written at the
    /// declaration boundary. `None` means no requirements.
    pub requires: Option<String>,
}

impl DescriptorNode {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            requires: None,
        }
    }

    pub fn with_requirements(mut self, declaration: impl Into<String>) -> Self {
        self.requires = Some(declaration.into());
        self
    }
}

/// Everything the engine needs from the surrounding windowing environment.
///
/// Content-tree primitives, viewport measurement, and scroll control all live
/// on the host side of this seam. Implementations are expected to be cheap:
/// every tick reads the viewport through this trait.
pub trait HostEnvironment: Send {
    /// Root content container of the document.
    fn body(&mut self) -> NodeId;

    /// Create a dedicated container node appended under the body. Used for
    /// off-screen chrome measurement and for hosting the active chrome.
    fn create_container(&mut self) -> NodeId;

    /// Locate the viewport-hint node, creating it and inserting it into the
    /// document head when absent.
    fn viewport_hint_node(&mut self) -> NodeId;

    /// Replace the content string of a node (viewport hint updates).
    fn set_node_content(&mut self, node: NodeId, content: &str);

    fn append_child(&mut self, parent: NodeId, child: NodeId);

    fn remove_child(&mut self, parent: NodeId, child: NodeId);

    fn clear_children(&mut self, node: NodeId);

    /// Chrome declarations carrying `tag`, in document order.
    fn find_descriptors(&mut self, tag: &str) -> Vec<DescriptorNode>;

    /// Instantaneous viewport dimensions. `None` on legacy hosts that only
    /// expose document metrics.
    fn viewport_size(&self) -> Option<Size>;

    /// Document-metrics fallback for hosts without a viewport accessor.
    fn document_size(&self) -> Size;

    /// Current scroll position.
    fn scroll_offset(&self) -> (i32, i32);

    fn scroll_to(&mut self, x: i32, y: i32);

    /// Orientation in degrees as reported by the host (0/90/180/270; some
    /// hosts report -90).
    fn orientation(&self) -> i32;
}

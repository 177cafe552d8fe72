use serde_json::json;

use crate::capability::{CapabilityProbe, CapabilitySet};
use crate::chrome::{Chrome, ChromeFactory};
use crate::host::{HostEnvironment, NodeId};
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};

/// Well-known tag marking chrome declarations in the host document.
pub const CHROME_DESCRIPTOR_TAG: &str = "chrome";

const REGISTRY_TARGET: &str = "chrome::registry";

/// Ordered list of instantiated chromes, built once per session.
///
/// Order is discovery order and is load-bearing: selection is first-match, so
/// earlier chromes win ties.
#[derive(Default)]
pub struct ChromeRegistry {
    chromes: Vec<Box<dyn Chrome>>,
}

impl ChromeRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Discover candidate descriptors and instantiate one chrome per
    /// survivor.
    ///
    /// Descriptors whose requirement declaration fails to parse, or whose
    /// requirements the environment does not meet, are skipped. Surviving
    /// descriptors are attached to `container` for the duration of
    /// construction so the factory can measure against real rendering, then
    /// detached again; reattachment is the lifecycle swap's job.
    ///
    /// An empty result is not an error at this layer. The caller decides
    /// whether it is fatal.
    pub fn discover(
        host: &mut dyn HostEnvironment,
        probe: &dyn CapabilityProbe,
        factory: &ChromeFactory,
        container: NodeId,
        logger: Option<&Logger>,
    ) -> Self {
        let mut chromes: Vec<Box<dyn Chrome>> = Vec::new();

        for descriptor in host.find_descriptors(CHROME_DESCRIPTOR_TAG) {
            if let Some(declaration) = descriptor.requires.as_deref() {
                let required = match CapabilitySet::parse_requirements(declaration) {
                    Ok(required) => required,
                    Err(err) => {
                        log_skip(logger, LogLevel::Warn, &descriptor.node, &err.to_string());
                        continue;
                    }
                };
                if !probe.check(required) {
                    log_skip(logger, LogLevel::Debug, &descriptor.node, "unmet requirements");
                    continue;
                }
            }

            host.append_child(container, descriptor.node);
            let chrome = factory(host, &descriptor);
            host.remove_child(container, descriptor.node);
            chromes.push(chrome);
        }

        Self { chromes }
    }

    pub fn len(&self) -> usize {
        self.chromes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chromes.is_empty()
    }

    pub fn as_slice(&self) -> &[Box<dyn Chrome>] {
        &self.chromes
    }

    pub fn chromes_mut(&mut self) -> &mut [Box<dyn Chrome>] {
        &mut self.chromes
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Box<dyn Chrome>> {
        self.chromes.get_mut(index)
    }

    /// Drop every chrome. Their resources become eligible for release.
    pub fn clear(&mut self) {
        self.chromes.clear();
    }
}

fn log_skip(logger: Option<&Logger>, level: LogLevel, node: &NodeId, reason: &str) {
    if let Some(logger) = logger {
        let event = event_with_fields(
            level,
            REGISTRY_TARGET,
            "descriptor_skipped",
            [
                json_kv("node", json!(node.0)),
                json_kv("reason", json!(reason)),
            ],
        );
        let _ = logger.log_event(event);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::capability::{CapabilitySet, StaticCapabilities};
    use crate::geometry::Size;
    use crate::host::DescriptorNode;

    #[derive(Default)]
    struct TreeLog {
        attached: Vec<(NodeId, NodeId)>,
        detached: Vec<(NodeId, NodeId)>,
        built: Vec<NodeId>,
    }

    struct DescriptorHost {
        descriptors: Vec<DescriptorNode>,
        log: Arc<Mutex<TreeLog>>,
    }

    impl HostEnvironment for DescriptorHost {
        fn body(&mut self) -> NodeId {
            NodeId(0)
        }

        fn create_container(&mut self) -> NodeId {
            NodeId(1)
        }

        fn viewport_hint_node(&mut self) -> NodeId {
            NodeId(2)
        }

        fn set_node_content(&mut self, _node: NodeId, _content: &str) {}

        fn append_child(&mut self, parent: NodeId, child: NodeId) {
            self.log.lock().unwrap().attached.push((parent, child));
        }

        fn remove_child(&mut self, parent: NodeId, child: NodeId) {
            self.log.lock().unwrap().detached.push((parent, child));
        }

        fn clear_children(&mut self, _node: NodeId) {}

        fn find_descriptors(&mut self, tag: &str) -> Vec<DescriptorNode> {
            assert_eq!(tag, CHROME_DESCRIPTOR_TAG);
            self.descriptors.clone()
        }

        fn viewport_size(&self) -> Option<Size> {
            Some(Size::new(100, 100))
        }

        fn document_size(&self) -> Size {
            Size::new(100, 100)
        }

        fn scroll_offset(&self) -> (i32, i32) {
            (0, 0)
        }

        fn scroll_to(&mut self, _x: i32, _y: i32) {}

        fn orientation(&self) -> i32 {
            0
        }
    }

    struct InertChrome {
        source: NodeId,
    }

    impl Chrome for InertChrome {
        fn fits(&self, _size: Size) -> bool {
            true
        }

        fn activate(&mut self) -> NodeId {
            self.source
        }

        fn deactivate(&mut self) {}

        fn set_size(&mut self, _size: Size) {}
    }

    fn recording_factory(log: Arc<Mutex<TreeLog>>) -> ChromeFactory {
        Arc::new(move |_host, descriptor| {
            log.lock().unwrap().built.push(descriptor.node);
            Box::new(InertChrome {
                source: descriptor.node,
            })
        })
    }

    fn discover_with(
        descriptors: Vec<DescriptorNode>,
        available: CapabilitySet,
    ) -> (ChromeRegistry, Arc<Mutex<TreeLog>>) {
        let log = Arc::new(Mutex::new(TreeLog::default()));
        let mut host = DescriptorHost {
            descriptors,
            log: log.clone(),
        };
        let probe = StaticCapabilities::new(available);
        let factory = recording_factory(log.clone());
        let registry =
            ChromeRegistry::discover(&mut host, &probe, &factory, NodeId(1), None);
        (registry, log)
    }

    #[test]
    fn filters_unmet_requirements() {
        let descriptors = vec![
            DescriptorNode::new(NodeId(10)).with_requirements("touch"),
            DescriptorNode::new(NodeId(11)),
        ];
        let (registry, log) = discover_with(descriptors, CapabilitySet::empty());
        assert_eq!(registry.len(), 1);
        assert_eq!(log.lock().unwrap().built, vec![NodeId(11)]);
    }

    #[test]
    fn unknown_tag_skips_descriptor() {
        let descriptors = vec![
            DescriptorNode::new(NodeId(10)).with_requirements("warpdrive"),
            DescriptorNode::new(NodeId(11)),
        ];
        let (registry, _log) = discover_with(descriptors, CapabilitySet::all());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn empty_requirement_declaration_survives() {
        let descriptors = vec![DescriptorNode::new(NodeId(10)).with_requirements("")];
        let (registry, _log) = discover_with(descriptors, CapabilitySet::empty());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn discovery_preserves_document_order() {
        let descriptors = vec![
            DescriptorNode::new(NodeId(10)),
            DescriptorNode::new(NodeId(11)),
            DescriptorNode::new(NodeId(12)),
        ];
        let (registry, log) = discover_with(descriptors.clone(), CapabilitySet::empty());
        assert_eq!(registry.len(), 3);
        assert_eq!(
            log.lock().unwrap().built,
            vec![NodeId(10), NodeId(11), NodeId(12)]
        );

        // Determinism: a second run over the same inputs builds the same list.
        let (second, log) = discover_with(descriptors, CapabilitySet::empty());
        assert_eq!(second.len(), 3);
        assert_eq!(
            log.lock().unwrap().built,
            vec![NodeId(10), NodeId(11), NodeId(12)]
        );
    }

    #[test]
    fn construction_attaches_then_detaches() {
        let descriptors = vec![DescriptorNode::new(NodeId(10))];
        let (_registry, log) = discover_with(descriptors, CapabilitySet::empty());
        let log = log.lock().unwrap();
        assert_eq!(log.attached, vec![(NodeId(1), NodeId(10))]);
        assert_eq!(log.detached, vec![(NodeId(1), NodeId(10))]);
    }

    #[test]
    fn empty_discovery_is_not_an_error() {
        let (registry, _log) = discover_with(Vec::new(), CapabilitySet::empty());
        assert!(registry.is_empty());
    }
}

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrome_mvp::logging::{LogEvent, LogSink, LoggingResult};
use chrome_mvp::{
    Chrome, ChromeFactory, DescriptorNode, HostEnvironment, Logger, NodeId, Size, SimulatedLoop,
    StateManager, select,
};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

#[derive(Clone, Default)]
struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _event: &LogEvent) -> LoggingResult<()> {
        Ok(())
    }
}

struct BenchHost {
    size: Arc<Mutex<Size>>,
    descriptors: Vec<DescriptorNode>,
}

impl HostEnvironment for BenchHost {
    fn body(&mut self) -> NodeId {
        NodeId(1)
    }

    fn create_container(&mut self) -> NodeId {
        NodeId(2)
    }

    fn viewport_hint_node(&mut self) -> NodeId {
        NodeId(3)
    }

    fn set_node_content(&mut self, _node: NodeId, _content: &str) {}

    fn append_child(&mut self, _parent: NodeId, _child: NodeId) {}

    fn remove_child(&mut self, _parent: NodeId, _child: NodeId) {}

    fn clear_children(&mut self, _node: NodeId) {}

    fn find_descriptors(&mut self, _tag: &str) -> Vec<DescriptorNode> {
        self.descriptors.clone()
    }

    fn viewport_size(&self) -> Option<Size> {
        Some(*self.size.lock().unwrap())
    }

    fn document_size(&self) -> Size {
        *self.size.lock().unwrap()
    }

    fn scroll_offset(&self) -> (i32, i32) {
        (0, 0)
    }

    fn scroll_to(&mut self, _x: i32, _y: i32) {}

    fn orientation(&self) -> i32 {
        0
    }
}

struct BreakpointChrome {
    min_width: u32,
}

impl Chrome for BreakpointChrome {
    fn fits(&self, size: Size) -> bool {
        size.width >= self.min_width
    }

    fn activate(&mut self) -> NodeId {
        NodeId(100)
    }

    fn deactivate(&mut self) {}

    fn set_size(&mut self, _size: Size) {}
}

fn build_manager(size: Arc<Mutex<Size>>, breakpoints: &[u32]) -> StateManager {
    let descriptors: Vec<DescriptorNode> = (0..breakpoints.len())
        .map(|index| DescriptorNode::new(NodeId(10 + index as u64)))
        .collect();
    let breakpoints = breakpoints.to_vec();
    let factory: ChromeFactory = Arc::new(move |_host, descriptor| {
        let index = (descriptor.node.0 - 10) as usize;
        Box::new(BreakpointChrome {
            min_width: breakpoints[index],
        })
    });

    let host = BenchHost {
        size,
        descriptors,
    };
    let probe = chrome_mvp::StaticCapabilities::new(chrome_mvp::CapabilitySet::empty());
    let mut manager = StateManager::new(Box::new(host), Box::new(probe), factory);
    let config = manager.config_mut();
    config.logger = Some(Logger::new(NullSink));
    config.metrics_interval = Duration::from_millis(0);
    config.enable_metrics();
    manager
}

fn resize_storm(c: &mut Criterion) {
    let widths = [1400u32, 1000, 700, 400, 900, 1200, 300, 800];
    c.bench_function("resize_storm", |b| {
        b.iter(|| {
            let size = Arc::new(Mutex::new(Size::new(1280, 800)));
            let mut manager = build_manager(size.clone(), &[1200, 800, 480, 0]);
            let mut sim = SimulatedLoop::new();
            manager.load(&mut sim).expect("load");

            for width in black_box(widths) {
                *size.lock().unwrap() = Size::new(width, 800);
                sim.advance(Duration::from_millis(100));
                manager.run_queued(&mut sim);
            }

            manager.unload(&mut sim);
        });
    });
}

fn quiet_ticks(c: &mut Criterion) {
    c.bench_function("quiet_ticks", |b| {
        let size = Arc::new(Mutex::new(Size::new(1280, 800)));
        let mut manager = build_manager(size, &[1200, 800, 480, 0]);
        let mut sim = SimulatedLoop::new();
        manager.load(&mut sim).expect("load");
        manager.run_queued(&mut sim);

        b.iter(|| {
            sim.advance(Duration::from_millis(100));
            manager.run_queued(&mut sim);
        });
    });
}

fn first_fit_selection(c: &mut Criterion) {
    let chromes: Vec<Box<dyn Chrome>> = (0u32..64)
        .map(|index| {
            Box::new(BreakpointChrome {
                min_width: 2000 - index * 10,
            }) as Box<dyn Chrome>
        })
        .collect();
    c.bench_function("first_fit_selection", |b| {
        b.iter(|| select(black_box(&chromes), black_box(Size::new(640, 480))));
    });
}

criterion_group!(benches, resize_storm, quiet_ticks, first_fit_selection);
criterion_main!(benches);

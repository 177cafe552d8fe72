//! Drives a full chrome session against an in-memory host: three chromes
//! with descending breakpoints, a resize storm, and an orientation flip.
//!
//! ```text
//! cargo run --example adaptive_shell
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrome_mvp::logging::{LogEvent, LogSink, LoggingResult};
use chrome_mvp::{
    CapabilitySet, Chrome, ChromeFactory, DescriptorNode, HostEnvironment, LogLevel, Logger,
    NodeId, Size, SimulatedLoop, StateManager, StaticCapabilities,
};

struct StdoutSink;

impl LogSink for StdoutSink {
    fn log(&self, event: &LogEvent) -> LoggingResult<()> {
        println!("{}", serde_json::to_string(event)?);
        Ok(())
    }
}

#[derive(Default)]
struct ShellState {
    size: Size,
    orientation: i32,
    hint: Option<String>,
}

struct ShellHost {
    state: Arc<Mutex<ShellState>>,
    descriptors: Vec<DescriptorNode>,
}

impl HostEnvironment for ShellHost {
    fn body(&mut self) -> NodeId {
        NodeId(1)
    }

    fn create_container(&mut self) -> NodeId {
        NodeId(2)
    }

    fn viewport_hint_node(&mut self) -> NodeId {
        NodeId(3)
    }

    fn set_node_content(&mut self, _node: NodeId, content: &str) {
        self.state.lock().unwrap().hint = Some(content.to_string());
    }

    fn append_child(&mut self, _parent: NodeId, _child: NodeId) {}

    fn remove_child(&mut self, _parent: NodeId, _child: NodeId) {}

    fn clear_children(&mut self, _node: NodeId) {}

    fn find_descriptors(&mut self, _tag: &str) -> Vec<DescriptorNode> {
        self.descriptors.clone()
    }

    fn viewport_size(&self) -> Option<Size> {
        Some(self.state.lock().unwrap().size)
    }

    fn document_size(&self) -> Size {
        self.state.lock().unwrap().size
    }

    fn scroll_offset(&self) -> (i32, i32) {
        (0, 0)
    }

    fn scroll_to(&mut self, _x: i32, _y: i32) {}

    fn orientation(&self) -> i32 {
        self.state.lock().unwrap().orientation
    }
}

struct ShellChrome {
    label: &'static str,
    min_width: u32,
}

impl Chrome for ShellChrome {
    fn name(&self) -> &str {
        self.label
    }

    fn fits(&self, size: Size) -> bool {
        size.width >= self.min_width
    }

    fn activate(&mut self) -> NodeId {
        println!("-- {} activated", self.label);
        NodeId(100)
    }

    fn deactivate(&mut self) {
        println!("-- {} deactivated", self.label);
    }

    fn set_size(&mut self, size: Size) {
        println!("-- {} laid out at {}x{}", self.label, size.width, size.height);
    }
}

const SHELLS: [(&str, u32); 3] = [("desktop", 1024), ("tablet", 600), ("phone", 0)];

fn main() {
    let state = Arc::new(Mutex::new(ShellState {
        size: Size::new(1280, 800),
        ..ShellState::default()
    }));

    // Widest shell first: selection is first-match over declaration order.
    let descriptors: Vec<DescriptorNode> = (0..SHELLS.len())
        .map(|index| DescriptorNode::new(NodeId(10 + index as u64)))
        .collect();
    let factory: ChromeFactory = Arc::new(|_host, descriptor| {
        let (label, min_width) = SHELLS[(descriptor.node.0 - 10) as usize];
        Box::new(ShellChrome { label, min_width })
    });

    let host = ShellHost {
        state: state.clone(),
        descriptors,
    };
    let probe =
        StaticCapabilities::new(CapabilitySet::empty()).with_orientation_events(true);

    let mut manager = StateManager::new(Box::new(host), Box::new(probe), factory);
    manager.config_mut().logger =
        Some(Logger::new(StdoutSink).with_min_level(LogLevel::Info));

    let mut sim = SimulatedLoop::new();
    manager.load(&mut sim).expect("at least one shell must survive discovery");
    manager.run_queued(&mut sim);

    for (width, height) in [(900, 700), (480, 640), (1400, 900)] {
        state.lock().unwrap().size = Size::new(width, height);
        sim.advance(Duration::from_millis(100));
        manager.run_queued(&mut sim);
    }

    // Rotate: the hint updates immediately, the size change lands on the
    // next tick.
    {
        let mut state = state.lock().unwrap();
        state.orientation = 90;
        state.size = Size::new(900, 1400);
    }
    sim.emit_orientation_change();
    sim.advance(Duration::from_millis(100));
    manager.run_queued(&mut sim);
    println!(
        "-- viewport hint: {}",
        state.lock().unwrap().hint.as_deref().unwrap_or("(unset)")
    );

    manager.unload(&mut sim);
}

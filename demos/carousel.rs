//! Carousel - a slider with repeatable items and a single pager.
//!
//! Run with: `RUST_LOG=spark_components=debug cargo run --example carousel`

use serde::Deserialize;
use serde_json::json;
use spark_components::{
    events, ChildRoles, Component, Element, Options, Payload, Presets, Widget,
};
use tracing_subscriber::EnvFilter;

// =============================================================================
// Host elements
// =============================================================================

/// Stand-in for a host node: a label and a measured box.
#[derive(Debug)]
struct Node {
    label: String,
    left: f32,
    width: f32,
}

impl Node {
    fn element(label: impl Into<String>, left: f32, width: f32) -> Element {
        Element::new(Self {
            label: label.into(),
            left,
            width,
        })
    }
}

// =============================================================================
// Widgets
// =============================================================================

struct Item;

impl Widget for Item {}

/// Counts the slider's screens once the slider itself is initialized.
#[derive(Default)]
struct Pager {
    pages: usize,
}

impl Widget for Pager {
    fn create(&mut self, component: &Component) {
        let Some(slider) = component.parent() else {
            return;
        };
        let pager = component.downgrade();
        let source = slider.downgrade();
        // children init before their parent, so wait for the slider's own event
        slider.on(events::INIT, move |_| {
            let (Some(pager), Some(slider)) = (pager.upgrade(), source.upgrade()) else {
                return;
            };
            let pages = slider
                .widget::<Slider>()
                .map_or(0, |slider| slider.screens.len());
            if let Some(mut state) = pager.widget_mut::<Pager>() {
                state.pages = pages;
            }
        });
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SliderOptions {
    click_threshold: u32,
    screen_change_speed: u32,
    overdrag: f32,
    infinite: bool,
    per_screen: usize,
}

#[derive(Debug, Clone, Copy)]
struct Screen {
    left: f32,
    right: f32,
}

#[derive(Default)]
struct Slider {
    options: Option<SliderOptions>,
    screens: Vec<Screen>,
}

impl Widget for Slider {
    fn describe_children() -> ChildRoles {
        ChildRoles::new().many::<Item>("item").one::<Pager>("pager")
    }

    fn describe_defaults() -> Options {
        Options::from_value(json!({
            "clickThreshold": 40,
            "screenChangeSpeed": 500,
            "overdrag": 0.3,
            "infinite": false,
            "perScreen": 2,
        }))
    }

    fn describe_presets() -> Presets {
        Presets::from_value(json!({
            "gallery": { "infinite": true, "perScreen": 1 },
            "strip": { "perScreen": 4, "overdrag": 0.1 },
        }))
    }

    fn describe_frozen() -> Vec<&'static str> {
        vec!["/clickThreshold"]
    }

    fn create(&mut self, component: &Component) {
        match component.options().deserialize::<SliderOptions>() {
            Ok(options) => self.options = Some(options),
            Err(err) => tracing::warn!(error = %err, "slider options do not match"),
        }
    }

    fn init(&mut self, component: &Component) {
        let per_screen = self.options.as_ref().map_or(1, |o| o.per_screen.max(1));
        let items = component.children_in("item");

        self.screens = items
            .chunks(per_screen)
            .filter_map(|group| group.first())
            .filter_map(|item| item.element().downcast_ref::<Node>())
            .map(|node| Screen {
                left: node.left,
                right: node.left + node.width,
            })
            .collect();

        tracing::info!(
            items = items.len(),
            screens = self.screens.len(),
            "slider ready"
        );
    }

    fn destroy(&mut self, _component: &Component) {
        self.screens.clear();
    }
}

// =============================================================================
// Main
// =============================================================================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let slider = Component::root(
        Slider::default(),
        Node::element("carousel", 0.0, 800.0),
        json!({ "$preset": "gallery", "clickThreshold": 5, "screenChangeSpeed": 300 }),
    )?;

    slider.on(&events::added("item"), |payload| {
        if let Some(node) = payload
            .component()
            .and_then(|item| item.element().downcast_ref::<Node>())
        {
            println!("added {}", node.label);
        }
    });
    slider.on(events::INIT, |_| println!("slider initialized"));

    for (index, left) in [0.0, 200.0, 400.0].into_iter().enumerate() {
        slider.attach(Item, Node::element(format!("slide {index}"), left, 200.0), ())?;
    }
    let pager = slider.attach(Pager::default(), Node::element("dots", 0.0, 60.0), ())?;

    slider.init();

    if let Some(state) = slider.widget::<Slider>() {
        if let Some(options) = &state.options {
            println!(
                "threshold={} speed={} overdrag={} infinite={}",
                options.click_threshold,
                options.screen_change_speed,
                options.overdrag,
                options.infinite
            );
        }
        for screen in &state.screens {
            println!("screen {:>5.1}..{:<5.1}", screen.left, screen.right);
        }
    }
    println!(
        "pager pages: {}",
        pager.widget::<Pager>().map_or(0, |pager| pager.pages)
    );

    slider.emit("change", Payload::Value(json!({ "screen": 1 })));

    slider.destroy();
    println!(
        "destroyed: slider={} pager={} children left={}",
        slider.is_destroyed(),
        pager.is_destroyed(),
        slider.child_count()
    );

    Ok(())
}

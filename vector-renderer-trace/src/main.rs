use anyhow::{Context, Result};
use std::{cell::RefCell, rc::Rc};
use vector_renderer::{
    Drawable, LatLng, Map, Point, RenderFrame, RendererOptions, VectorRenderer,
};

/// Polyline that reprojects on reset/zoomend and counts its visible vertices on update
struct TracedShape {
    name: &'static str,
    vertices: Vec<LatLng>,
    projected: Vec<Point>,
}

impl TracedShape {
    fn new(name: &'static str, vertices: Vec<LatLng>) -> Self {
        Self {
            name,
            vertices,
            projected: Vec::new(),
        }
    }

    fn project(&mut self, frame: &RenderFrame<'_>) -> vector_renderer::Result<()> {
        self.projected = self
            .vertices
            .iter()
            .map(|vertex| frame.view().lat_lng_to_layer_point(*vertex))
            .collect::<vector_renderer::Result<Vec<_>>>()?;
        Ok(())
    }

    fn visible(&self, frame: &RenderFrame<'_>) -> usize {
        let bounds = frame.bounds();
        self.projected
            .iter()
            .filter(|point| bounds.contains(point))
            .count()
    }
}

impl Drawable for TracedShape {
    fn on_reset(&mut self, frame: &RenderFrame<'_>) -> vector_renderer::Result<()> {
        self.project(frame)?;
        log::info!("{}: reset, {} vertices in clip", self.name, self.visible(frame));
        Ok(())
    }

    fn on_zoom_end(&mut self, frame: &RenderFrame<'_>) -> vector_renderer::Result<()> {
        self.project(frame)?;
        log::info!("{}: reprojected after zoom", self.name);
        Ok(())
    }

    fn on_update(&mut self, frame: &RenderFrame<'_>) -> vector_renderer::Result<()> {
        log::info!(
            "{}: update, {} of {} vertices in clip",
            self.name,
            self.visible(frame),
            self.projected.len()
        );
        Ok(())
    }
}

fn load_options() -> Result<RendererOptions> {
    match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading renderer options from {}", path))?;
            RendererOptions::from_json(&raw).with_context(|| format!("parsing {}", path))
        }
        None => Ok(RendererOptions::default()),
    }
}

fn report(map: &Map, step: &str) -> Result<()> {
    let renderer = map
        .layer::<VectorRenderer>("paths")
        .context("renderer layer missing")?;
    let state = serde_json::to_string(&renderer.viewport_state())?;
    let transform = renderer
        .container()
        .map(|container| container.transform().to_string())
        .unwrap_or_else(|| "none".to_string());
    println!("{:<14} {} | {}", step, transform, state);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let options = load_options()?;
    let mut map = Map::new(LatLng::new(48.8566, 2.3522), 12.0, Point::new(800.0, 600.0));

    let seine = Rc::new(RefCell::new(TracedShape::new(
        "seine",
        vec![
            LatLng::new(48.8530, 2.2690),
            LatLng::new(48.8584, 2.2945),
            LatLng::new(48.8606, 2.3376),
            LatLng::new(48.8530, 2.3499),
            LatLng::new(48.8448, 2.3730),
        ],
    )));
    let ring = Rc::new(RefCell::new(TracedShape::new(
        "ring",
        vec![
            LatLng::new(48.9000, 2.3200),
            LatLng::new(48.8800, 2.4100),
            LatLng::new(48.8200, 2.3900),
            LatLng::new(48.8300, 2.2700),
        ],
    )));

    let mut renderer = VectorRenderer::new("paths", options)?;
    renderer.register(&seine);
    let ring_id = renderer.register(&ring);
    map.add_layer(Box::new(renderer))?;
    report(&map, "attach")?;

    map.set_view(LatLng::new(48.8566, 2.3522), 12.0)?;
    report(&map, "set_view")?;

    map.pan_by(Point::new(120.0, -40.0))?;
    report(&map, "pan_by")?;

    map.animate_zoom_to(LatLng::new(48.8584, 2.2945), 14.0, 4)?;
    report(&map, "animate_zoom")?;

    map.set_bearing(30.0)?;
    report(&map, "set_bearing")?;

    map.resize(Point::new(1024.0, 768.0))?;
    report(&map, "resize")?;

    map.layer_mut("paths", |renderer: &mut VectorRenderer| renderer.detach(ring_id))
        .context("renderer layer missing")?;
    map.pan_by(Point::new(-60.0, 0.0))?;
    report(&map, "detach_ring")?;

    map.remove_layer("paths")?;
    println!(
        "removed renderer, {} subscriptions left",
        map.hub().subscription_count()
    );
    Ok(())
}

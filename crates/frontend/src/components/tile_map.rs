use dioxus::html::geometry::WheelDelta;
use dioxus::html::input_data::MouseButton;
use dioxus::prelude::*;
use ruuturetki_shared::geo::{Bounds, LatLng};
use ruuturetki_shared::viewport::{TilePlacement, TileSource, Viewport};

/// Movement below this many pixels is treated as a click.
const DRAG_THRESHOLD: f64 = 3.0;

/// Touch is less precise than a mouse.
const TOUCH_DRAG_THRESHOLD: f64 = 8.0;

/// Size used before the container has been measured.
const FALLBACK_SIZE: (f64, f64) = (800.0, 600.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkerKind {
    /// Where the photo was taken.
    Target,
    /// The player's guess.
    Guess,
    /// A location being authored in the curator.
    Location,
}

impl MarkerKind {
    fn class(&self) -> &'static str {
        match self {
            MarkerKind::Target => "map-marker marker-target",
            MarkerKind::Guess => "map-marker marker-guess",
            MarkerKind::Location => "map-marker marker-location",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub id: usize,
    pub latlng: LatLng,
    pub kind: MarkerKind,
    pub draggable: bool,
    pub label: Option<String>,
}

impl MapMarker {
    pub fn new(id: usize, latlng: LatLng, kind: MarkerKind) -> Self {
        MapMarker {
            id,
            latlng,
            kind,
            draggable: false,
            label: None,
        }
    }
}

/// A marker resolved to container pixels for one render.
#[derive(Clone)]
struct PlacedMarker {
    id: usize,
    draggable: bool,
    class: String,
    style: String,
    label: Option<String>,
}

impl PlacedMarker {
    fn new(marker: &MapMarker, view: &Viewport) -> Self {
        let (x, y) = view.latlng_to_container(marker.latlng);
        let class = if marker.draggable {
            format!("{} draggable", marker.kind.class())
        } else {
            marker.kind.class().to_string()
        };
        PlacedMarker {
            id: marker.id,
            draggable: marker.draggable,
            class,
            style: format!("left: {:.1}px; top: {:.1}px;", x, y),
            label: marker.label.clone(),
        }
    }
}

fn container_rect(id: &str) -> Option<web_sys::DomRect> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(id)?;
    Some(element.get_bounding_client_rect())
}

/// Client coordinates relative to the container's top-left corner.
fn to_container(id: &str, client_x: f64, client_y: f64) -> Option<(f64, f64)> {
    let rect = container_rect(id)?;
    Some((client_x - rect.left(), client_y - rect.top()))
}

/// Convert a wheel delta (pixels / lines / pages) to a uniform pixel-like value.
fn wheel_delta_y(delta: WheelDelta) -> f64 {
    match delta {
        WheelDelta::Pixels(d) => d.y,
        WheelDelta::Lines(d) => d.y * 40.0,
        WheelDelta::Pages(d) => d.y * 400.0,
    }
}

/// One zoom level per wheel notch, in the scroll direction.
fn wheel_zoom_step(delta_y: f64) -> i8 {
    if delta_y < 0.0 {
        1
    } else if delta_y > 0.0 {
        -1
    } else {
        0
    }
}

fn exceeds(dx: f64, dy: f64, threshold: f64) -> bool {
    dx.abs() > threshold || dy.abs() > threshold
}

/// Viewport `start` panned by a drag of `(dx, dy)`, kept inside `bounds`.
fn dragged_view(start: Viewport, dx: f64, dy: f64, bounds: Option<Bounds>) -> Viewport {
    let mut view = start;
    view.pan_by(dx, dy);
    if let Some(b) = bounds {
        view.clamp_to(&b);
    }
    view
}

fn tile_style(tile: &TilePlacement) -> String {
    format!("left: {:.1}px; top: {:.1}px;", tile.left, tile.top)
}

/// Render tiles around `view`, with markers, drag-to-pan, wheel zoom and
/// click reporting.
#[component]
#[allow(clippy::too_many_arguments)]
pub fn TileMap(
    id: String,
    source: TileSource,
    view: Signal<Viewport>,
    #[props(default = true)] dragging: bool,
    #[props(default = true)] zoomable: bool,
    pan_bounds: Option<Bounds>,
    #[props(default)] markers: Vec<MapMarker>,
    /// Dashed line between two points, e.g. target to guess.
    line: Option<(LatLng, LatLng)>,
    onclick: Option<EventHandler<LatLng>>,
    /// Fired with the new center after every pan or zoom.
    onmove: Option<EventHandler<LatLng>>,
    onmarkerdrag: Option<EventHandler<(usize, LatLng)>>,
) -> Element {
    let mut view = view;

    // Measure the container once it exists
    let measure_id = id.clone();
    use_effect(move || {
        let (w, h) = container_rect(&measure_id)
            .map(|r| (r.width(), r.height()))
            .filter(|(w, h)| *w > 0.0 && *h > 0.0)
            .unwrap_or(FALLBACK_SIZE);
        let mut v = view.write();
        v.width = w;
        v.height = h;
    });

    // Mouse drag state
    let mut is_down = use_signal(|| false);
    let mut did_drag = use_signal(|| false);
    let mut drag_start = use_signal(|| (0.0_f64, 0.0_f64));
    let mut drag_start_view = use_signal(|| *view.peek());
    let mut dragged_marker = use_signal(|| None::<usize>);

    // Touch state
    let mut touch_start = use_signal(|| None::<(f64, f64)>);
    let mut touch_did_pan = use_signal(|| false);

    let current = *view.read();
    let tiles = current.visible_tiles();
    let attribution = source.attribution();
    let container_class = if *did_drag.read() && *is_down.read() {
        "tile-map dragging"
    } else {
        "tile-map"
    };

    let placed_markers: Vec<PlacedMarker> = markers
        .iter()
        .map(|m| PlacedMarker::new(m, &current))
        .collect();
    let line_px = line.map(|(a, b)| {
        let (x1, y1) = current.latlng_to_container(a);
        let (x2, y2) = current.latlng_to_container(b);
        (x1, y1, x2, y2)
    });

    let wheel_id = id.clone();
    let up_id = id.clone();
    let move_id = id.clone();
    let touch_id = id.clone();

    rsx! {
        div {
            id: "{id}",
            class: "{container_class}",

            onwheel: move |evt: Event<WheelData>| {
                evt.prevent_default();
                if !zoomable {
                    return;
                }
                let step = wheel_zoom_step(wheel_delta_y(evt.data().delta()));
                if step == 0 {
                    return;
                }
                let client = evt.data().client_coordinates();
                let Some((x, y)) = to_container(&wheel_id, client.x, client.y) else { return };
                let center = {
                    let mut v = view.write();
                    v.zoom_at(step, x, y);
                    if let Some(b) = pan_bounds {
                        v.clamp_to(&b);
                    }
                    v.center
                };
                if let Some(h) = &onmove {
                    h.call(center);
                }
            },

            onmousedown: move |evt: Event<MouseData>| {
                if evt.trigger_button() != Some(MouseButton::Primary) {
                    return;
                }
                let client = evt.client_coordinates();
                is_down.set(true);
                did_drag.set(false);
                drag_start.set((client.x, client.y));
                drag_start_view.set(*view.peek());
            },

            onmousemove: move |evt: Event<MouseData>| {
                if !*is_down.peek() {
                    return;
                }
                let client = evt.client_coordinates();

                if let Some(marker_id) = *dragged_marker.peek() {
                    if let (Some((x, y)), Some(h)) = (to_container(&move_id, client.x, client.y), &onmarkerdrag) {
                        h.call((marker_id, view.peek().container_to_latlng(x, y)));
                    }
                    return;
                }

                let (sx, sy) = *drag_start.peek();
                let (dx, dy) = (client.x - sx, client.y - sy);
                if !*did_drag.peek() && exceeds(dx, dy, DRAG_THRESHOLD) {
                    did_drag.set(true);
                }
                if *did_drag.peek() && dragging {
                    let next = dragged_view(*drag_start_view.peek(), dx, dy, pan_bounds);
                    view.set(next);
                    if let Some(h) = &onmove {
                        h.call(next.center);
                    }
                }
            },

            onmouseup: move |evt: Event<MouseData>| {
                let was_down = *is_down.peek();
                let was_drag = *did_drag.peek();
                is_down.set(false);
                if dragged_marker.peek().is_some() {
                    dragged_marker.set(None);
                    return;
                }
                // A mouseup without drag movement is a click
                if was_down && !was_drag {
                    let client = evt.client_coordinates();
                    if let (Some((x, y)), Some(h)) = (to_container(&up_id, client.x, client.y), &onclick) {
                        h.call(view.peek().container_to_latlng(x, y));
                    }
                }
            },

            onmouseleave: move |_| {
                is_down.set(false);
                dragged_marker.set(None);
            },

            ontouchstart: move |evt: Event<TouchData>| {
                let touches = evt.data().touches();
                if let Some(t) = touches.first() {
                    let c = t.client_coordinates();
                    touch_start.set(Some((c.x, c.y)));
                    touch_did_pan.set(false);
                    drag_start_view.set(*view.peek());
                }
            },

            ontouchmove: move |evt: Event<TouchData>| {
                evt.prevent_default();
                let touches = evt.data().touches();
                let (Some(t), Some((sx, sy))) = (touches.first(), *touch_start.peek()) else { return };
                let c = t.client_coordinates();
                let (dx, dy) = (c.x - sx, c.y - sy);
                if !*touch_did_pan.peek() && exceeds(dx, dy, TOUCH_DRAG_THRESHOLD) {
                    touch_did_pan.set(true);
                }
                if *touch_did_pan.peek() && dragging {
                    let next = dragged_view(*drag_start_view.peek(), dx, dy, pan_bounds);
                    view.set(next);
                    if let Some(h) = &onmove {
                        h.call(next.center);
                    }
                }
            },

            ontouchend: move |evt: Event<TouchData>| {
                if !evt.data().touches().is_empty() {
                    return;
                }
                if !*touch_did_pan.peek() {
                    if let Some((sx, sy)) = *touch_start.peek() {
                        if let (Some((x, y)), Some(h)) = (to_container(&touch_id, sx, sy), &onclick) {
                            h.call(view.peek().container_to_latlng(x, y));
                        }
                    }
                }
                touch_start.set(None);
            },

            div { class: "tile-layer",
                for tile in tiles {
                    img {
                        key: "{tile.z}/{tile.x}/{tile.y}/{tile.left}",
                        class: "map-tile",
                        src: source.tile_url(tile.x, tile.y, tile.z),
                        style: tile_style(&tile),
                        draggable: "false",
                    }
                }
            }

            if let Some((x1, y1, x2, y2)) = line_px {
                svg { class: "map-overlay",
                    line {
                        x1: "{x1}", y1: "{y1}", x2: "{x2}", y2: "{y2}",
                        stroke: "#c43030",
                        stroke_width: "3",
                        stroke_dasharray: "8 6",
                    }
                }
            }

            for placed in placed_markers {
                div {
                    key: "{placed.id}",
                    class: "{placed.class}",
                    style: "{placed.style}",
                    onmousedown: move |evt: Event<MouseData>| {
                        if placed.draggable {
                            evt.stop_propagation();
                            is_down.set(true);
                            dragged_marker.set(Some(placed.id));
                        }
                    },
                    if let Some(label) = placed.label {
                        span { class: "marker-label", "{label}" }
                    }
                }
            }

            div { class: "map-attribution", "{attribution}" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wheel_step_direction() {
        assert_eq!(wheel_zoom_step(-120.0), 1);
        assert_eq!(wheel_zoom_step(53.0), -1);
        assert_eq!(wheel_zoom_step(0.0), 0);
    }

    #[test]
    fn test_small_movement_is_a_click() {
        assert!(!exceeds(2.0, -3.0, DRAG_THRESHOLD));
        assert!(exceeds(0.0, 3.5, DRAG_THRESHOLD));
        assert!(!exceeds(6.0, 6.0, TOUCH_DRAG_THRESHOLD));
    }

    #[test]
    fn test_drag_moves_center_opposite_to_pointer() {
        let start = Viewport::new(LatLng::new(60.2, 24.95), 16, 800.0, 600.0);
        let moved = dragged_view(start, 100.0, 0.0, None);
        assert!(moved.center.lng < start.center.lng);
        assert!((moved.center.lat - start.center.lat).abs() < 1e-9);
    }

    #[test]
    fn test_drag_is_clamped_to_bounds() {
        let center = LatLng::new(60.2, 24.95);
        let bounds = Bounds::around(center, 200.0);
        let start = Viewport::new(center, 16, 800.0, 600.0);
        let moved = dragged_view(start, 5_000.0, -5_000.0, Some(bounds));
        assert!(bounds.contains(moved.center));
    }

    #[test]
    fn test_marker_at_center_sits_mid_container() {
        let center = LatLng::new(60.2, 24.95);
        let view = Viewport::new(center, 16, 800.0, 600.0);
        let mut marker = MapMarker::new(3, center, MarkerKind::Location);
        marker.draggable = true;
        let placed = PlacedMarker::new(&marker, &view);
        assert_eq!(placed.style, "left: 400.0px; top: 300.0px;");
        assert_eq!(placed.class, "map-marker marker-location draggable");
        let placed = PlacedMarker::new(&MapMarker::new(0, center, MarkerKind::Guess), &view);
        assert_eq!(placed.class, "map-marker marker-guess");
    }

    #[test]
    fn test_tile_style() {
        let tile = TilePlacement {
            x: 1,
            y: 2,
            z: 3,
            left: -12.34,
            top: 256.0,
        };
        assert_eq!(tile_style(&tile), "left: -12.3px; top: 256.0px;");
    }
}

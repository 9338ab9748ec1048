// World pixels follow the slippy-map convention: at zoom `z` the world is
// `256 * 2^z` pixels square with the origin top-left (lng -180, lat ~85).
// Container coordinates are relative to the map element's top-left corner.

use std::f64::consts::PI;

use crate::geo::{Bounds, LatLng};
use crate::layers::{self, MapLayer};

pub const TILE_SIZE: f64 = 256.0;

pub const MIN_ZOOM: u8 = 3;
pub const MAX_ZOOM: u8 = 19;

/// Half the EPSG:3857 world width in meters.
const MERCATOR_ORIGIN: f64 = 20_037_508.342_789_244;

/// Latitude limit of the square Mercator world.
const MAX_LAT: f64 = 85.051_128_78;

fn world_size(zoom: u8) -> f64 {
    TILE_SIZE * 2f64.powi(zoom as i32)
}

/// Project a point to world pixels at `zoom`.
pub fn project(p: LatLng, zoom: u8) -> (f64, f64) {
    let size = world_size(zoom);
    let lat = p.lat.clamp(-MAX_LAT, MAX_LAT).to_radians();
    let x = (p.lng + 180.0) / 360.0 * size;
    let y = (0.5 - ((1.0 + lat.sin()) / (1.0 - lat.sin())).ln() / (4.0 * PI)) * size;
    (x, y)
}

/// Inverse of [`project`].
pub fn unproject(x: f64, y: f64, zoom: u8) -> LatLng {
    let size = world_size(zoom);
    let lng = x / size * 360.0 - 180.0;
    let n = PI - 2.0 * PI * y / size;
    let lat = n.sinh().atan().to_degrees();
    LatLng { lat, lng }
}

/// A map surface the game can read and steer.
///
/// The browser map component implements this through [`Viewport`]; tests use
/// a plain `Viewport` directly instead of reaching into a live map.
pub trait MapHandle {
    fn center(&self) -> LatLng;
    fn zoom(&self) -> u8;
    fn set_view(&mut self, center: LatLng, zoom: u8);
}

/// One tile image to draw, with its container-relative position.
#[derive(Debug, Clone, PartialEq)]
pub struct TilePlacement {
    pub x: u32,
    pub y: u32,
    pub z: u8,
    pub left: f64,
    pub top: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TileSource {
    /// Terrain tiles for the guess map.
    Terrain,
    /// Orthophoto tiles rendered by the WMS server.
    Wms(MapLayer),
}

impl TileSource {
    pub fn tile_url(&self, x: u32, y: u32, z: u8) -> String {
        match self {
            TileSource::Terrain => layers::TERRAIN_TILE_URL
                .replace("{z}", &z.to_string())
                .replace("{x}", &x.to_string())
                .replace("{y}", &y.to_string()),
            TileSource::Wms(layer) => {
                let [minx, miny, maxx, maxy] = tile_bbox_3857(x, y, z);
                format!(
                    "{}?SERVICE=WMS&REQUEST=GetMap&VERSION=1.1.1&LAYERS={}&STYLES=&FORMAT=image/png&TRANSPARENT=false&SRS=EPSG:3857&WIDTH=256&HEIGHT=256&BBOX={:.3},{:.3},{:.3},{:.3}",
                    layers::WMS_URL,
                    layer.name(),
                    minx,
                    miny,
                    maxx,
                    maxy
                )
            }
        }
    }

    pub fn attribution(&self) -> &'static str {
        match self {
            TileSource::Terrain => layers::TERRAIN_ATTRIBUTION,
            TileSource::Wms(_) => layers::WMS_ATTRIBUTION,
        }
    }
}

/// EPSG:3857 bounding box `[minx, miny, maxx, maxy]` of a tile, in meters.
pub fn tile_bbox_3857(x: u32, y: u32, z: u8) -> [f64; 4] {
    let span = 2.0 * MERCATOR_ORIGIN / 2f64.powi(z as i32);
    let minx = x as f64 * span - MERCATOR_ORIGIN;
    let maxy = MERCATOR_ORIGIN - y as f64 * span;
    [minx, maxy - span, minx + span, maxy]
}

/// The visible part of a map: its center, zoom and container size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: u8,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(center: LatLng, zoom: u8, width: f64, height: f64) -> Self {
        Viewport {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            width,
            height,
        }
    }

    fn center_px(&self) -> (f64, f64) {
        project(self.center, self.zoom)
    }

    /// World pixel position of the container's top-left corner.
    fn origin_px(&self) -> (f64, f64) {
        let (cx, cy) = self.center_px();
        (cx - self.width / 2.0, cy - self.height / 2.0)
    }

    pub fn container_to_latlng(&self, x: f64, y: f64) -> LatLng {
        let (ox, oy) = self.origin_px();
        unproject(ox + x, oy + y, self.zoom)
    }

    pub fn latlng_to_container(&self, p: LatLng) -> (f64, f64) {
        let (ox, oy) = self.origin_px();
        let (px, py) = project(p, self.zoom);
        (px - ox, py - oy)
    }

    /// Move the content by `(dx, dy)` container pixels, as a drag does.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let (cx, cy) = self.center_px();
        self.center = unproject(cx - dx, cy - dy, self.zoom);
    }

    /// Zoom in or out by `delta` levels, keeping the container point
    /// `(x, y)` over the same place.
    pub fn zoom_at(&mut self, delta: i8, x: f64, y: f64) {
        let new_zoom = (self.zoom as i16 + delta as i16).clamp(MIN_ZOOM as i16, MAX_ZOOM as i16) as u8;
        if new_zoom == self.zoom {
            return;
        }
        let anchor = self.container_to_latlng(x, y);
        self.zoom = new_zoom;
        let (ax, ay) = self.latlng_to_container(anchor);
        self.pan_by(x - ax, y - ay);
    }

    /// Keep the center inside `bounds`.
    pub fn clamp_to(&mut self, bounds: &Bounds) {
        self.center = bounds.clamp(self.center);
    }

    /// Tiles covering the container, left-to-right, top-to-bottom.
    pub fn visible_tiles(&self) -> Vec<TilePlacement> {
        let (ox, oy) = self.origin_px();
        let n = 2i64.pow(self.zoom as u32);
        let first_x = (ox / TILE_SIZE).floor() as i64;
        let first_y = (oy / TILE_SIZE).floor() as i64;
        let last_x = ((ox + self.width) / TILE_SIZE).ceil() as i64 - 1;
        let last_y = ((oy + self.height) / TILE_SIZE).ceil() as i64 - 1;

        let mut tiles = Vec::new();
        for ty in first_y..=last_y {
            if ty < 0 || ty >= n {
                continue;
            }
            for tx in first_x..=last_x {
                tiles.push(TilePlacement {
                    x: tx.rem_euclid(n) as u32,
                    y: ty as u32,
                    z: self.zoom,
                    left: tx as f64 * TILE_SIZE - ox,
                    top: ty as f64 * TILE_SIZE - oy,
                });
            }
        }
        tiles
    }
}

impl MapHandle for Viewport {
    fn center(&self) -> LatLng {
        self.center
    }

    fn zoom(&self) -> u8 {
        self.zoom
    }

    fn set_view(&mut self, center: LatLng, zoom: u8) {
        self.center = center;
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }
}

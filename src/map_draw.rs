use std::collections::HashMap;

use geo::{Area, BoundingRect, Centroid, Geometry, MultiPolygon, Polygon};
use geojson::GeoJson;
use ratatui::{
    layout::Rect,
    style::Color,
    symbols::Marker,
    text::Line as TextLine,
    widgets::{
        canvas::{Canvas, Circle, Context, Line, Map, MapResolution},
        Block, Borders,
    },
    Frame,
};

use crate::countries;
use crate::error::MapDataError;
use crate::views::{MapLegend, MAP_CLASSES};

/// Sequential palette, light to dark.
pub const CLASS_COLORS: [Color; MAP_CLASSES] = [
    Color::Rgb(0xfe, 0xe5, 0xd9),
    Color::Rgb(0xfc, 0xae, 0x91),
    Color::Rgb(0xfb, 0x6a, 0x4a),
    Color::Rgb(0xde, 0x2d, 0x26),
    Color::Rgb(0xa5, 0x0f, 0x15),
];
pub const NO_DATA_COLOR: Color = Color::DarkGray;

/// Region shown when drawing capital markers over the world outline.
const ASEAN_LON: [f64; 2] = [90.0, 130.0];
const ASEAN_LAT: [f64; 2] = [-12.0, 30.0];

pub fn class_color(class: Option<usize>) -> Color {
    class.and_then(|c| CLASS_COLORS.get(c).copied()).unwrap_or(NO_DATA_COLOR)
}

/// Feature code: ISO alpha-2 property if present, otherwise the admin name
/// looked up in the registry.
fn feature_code(properties: Option<&geojson::JsonObject>) -> Option<String> {
    let props = properties?;
    for key in ["ISO_A2", "iso_a2", "ISO_A2_EH"] {
        if let Some(code) = props.get(key).and_then(|v| v.as_str()) {
            if countries::find_country(code).is_some() {
                return Some(code.to_string());
            }
        }
    }
    ["ADMIN", "NAME", "name"]
        .iter()
        .filter_map(|k| props.get(*k).and_then(|v| v.as_str()))
        .find_map(countries::code_for_name)
        .map(str::to_string)
}

/// Country outlines keyed by short code, ready to draw as a choropleth.
pub struct MapView {
    items: Vec<(String, MultiPolygon<f64>)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

impl MapView {
    pub fn new(raw: GeoJson) -> Result<Self, MapDataError> {
        let mut items = Vec::new();

        if let GeoJson::FeatureCollection(fc) = raw {
            for feature in fc.features {
                let Some(code) = feature_code(feature.properties.as_ref()) else {
                    continue;
                };

                if let Some(gj) = feature.geometry {
                    let geom: Geometry<f64> = gj.value.try_into()?;
                    let mut mp = match geom {
                        Geometry::Polygon(p) => p.into(),
                        Geometry::MultiPolygon(m) => m,
                        _ => continue,
                    };

                    // Keep fragments with at least 5% of the largest one's area.
                    if mp.0.len() > 1 {
                        let max_area = mp.0.iter().map(|p| p.unsigned_area()).fold(0.0, f64::max);
                        let threshold = max_area * 0.05;
                        let kept: Vec<Polygon<f64>> = mp.0.iter().filter(|p| p.unsigned_area() >= threshold).cloned().collect();
                        if !kept.is_empty() {
                            mp = MultiPolygon(kept);
                        }
                    }

                    items.push((code, mp));
                }
            }
        }

        let rects: Vec<_> = items.iter().filter_map(|(_, mp)| mp.bounding_rect()).collect();
        if rects.is_empty() {
            return Ok(Self { items, x_bounds: ASEAN_LON, y_bounds: ASEAN_LAT });
        }
        let minx = rects.iter().map(|r| r.min().x).fold(f64::INFINITY, f64::min);
        let miny = rects.iter().map(|r| r.min().y).fold(f64::INFINITY, f64::min);
        let maxx = rects.iter().map(|r| r.max().x).fold(f64::NEG_INFINITY, f64::max);
        let maxy = rects.iter().map(|r| r.max().y).fold(f64::NEG_INFINITY, f64::max);

        Ok(Self { items, x_bounds: [minx, maxx], y_bounds: [miny, maxy] })
    }

    pub fn feature_count(&self) -> usize {
        self.items.len()
    }

    pub fn codes(&self) -> Vec<&str> {
        self.items.iter().map(|(c, _)| c.as_str()).collect()
    }

    /// Draws every boundary in its class colour and labels it at the
    /// centroid.
    pub fn render(&self, f: &mut Frame, area: Rect, title: &str, legend: &MapLegend) {
        let colors = legend_colors(legend);
        let canvas = Canvas::default()
            .block(Block::default().title(title.to_string()).borders(Borders::ALL))
            .marker(Marker::Braille)
            .x_bounds(self.x_bounds)
            .y_bounds(self.y_bounds)
            .paint(|ctx| {
                for (code, mp) in &self.items {
                    let color = colors.get(code.as_str()).copied().unwrap_or(NO_DATA_COLOR);
                    for poly in &mp.0 {
                        draw_ring(ctx, &poly.exterior().0, color);
                    }
                }
                ctx.layer();
                for (code, mp) in &self.items {
                    if let Some(c) = mp.centroid() {
                        ctx.print(c.x(), c.y(), TextLine::from(code.clone()));
                    }
                }
            });
        f.render_widget(canvas, area);
    }
}

fn draw_ring(ctx: &mut Context, coords: &[geo::Coord<f64>], color: Color) {
    for window in coords.windows(2) {
        let (a, b) = (window[0], window[1]);
        ctx.draw(&Line { x1: a.x, y1: a.y, x2: b.x, y2: b.y, color });
    }
    if let (Some(first), Some(last)) = (coords.first(), coords.last()) {
        ctx.draw(&Line { x1: last.x, y1: last.y, x2: first.x, y2: first.y, color });
    }
}

fn legend_colors(legend: &MapLegend) -> HashMap<&str, Color> {
    legend.entries.iter().map(|e| (e.code.as_str(), class_color(e.class))).collect()
}

/// Fallback without boundaries: world outline plus a filled marker at each
/// capital.
pub fn render_markers(f: &mut Frame, area: Rect, title: &str, legend: &MapLegend) {
    let colors = legend_colors(legend);
    let canvas = Canvas::default()
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .marker(Marker::Braille)
        .x_bounds(ASEAN_LON)
        .y_bounds(ASEAN_LAT)
        .paint(|ctx| {
            ctx.draw(&Map { resolution: MapResolution::High, color: Color::Gray });
            ctx.layer();
            for country in countries::COUNTRIES {
                let color = colors.get(country.code).copied().unwrap_or(NO_DATA_COLOR);
                for radius in [0.4, 0.8, 1.2] {
                    ctx.draw(&Circle { x: country.longitude, y: country.latitude, radius, color });
                }
                ctx.print(country.longitude + 1.4, country.latitude, TextLine::from(country.code));
            }
        });
    f.render_widget(canvas, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const TWO_COUNTRIES: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{"ISO_A2":"SG"},
         "geometry":{"type":"Polygon","coordinates":[[[103.6,1.2],[104.0,1.2],[104.0,1.5],[103.6,1.5],[103.6,1.2]]]}},
        {"type":"Feature","properties":{"ADMIN":"Brunei"},
         "geometry":{"type":"MultiPolygon","coordinates":[
            [[[114.0,4.0],[115.0,4.0],[115.0,5.0],[114.0,5.0],[114.0,4.0]]],
            [[[115.2,4.6],[115.21,4.6],[115.21,4.61],[115.2,4.61],[115.2,4.6]]]]}},
        {"type":"Feature","properties":{"ADMIN":"Atlantis"},
         "geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]}}
    ]}"#;

    #[test]
    fn test_features_keyed_by_code() {
        let view = MapView::new(GeoJson::from_str(TWO_COUNTRIES).unwrap()).unwrap();
        assert_eq!(view.codes(), vec!["SG", "BN"]);
        assert_eq!(view.x_bounds, [103.6, 115.0]);
        assert_eq!(view.y_bounds, [1.2, 5.0]);
    }

    #[test]
    fn test_small_fragments_dropped() {
        let view = MapView::new(GeoJson::from_str(TWO_COUNTRIES).unwrap()).unwrap();
        let (_, brunei) = &view.items[1];
        assert_eq!(brunei.0.len(), 1);
    }

    #[test]
    fn test_class_colors() {
        assert_eq!(class_color(None), NO_DATA_COLOR);
        assert_eq!(class_color(Some(0)), CLASS_COLORS[0]);
        assert_eq!(class_color(Some(99)), NO_DATA_COLOR);
    }
}

//! Flat file geometry engine.
//!
//! Collections are persisted as CSV attribute tables with a leading
//! `WKT` geometry column, a layout most GIS viewers open directly.
//! Timeline kinematics and footprint buffering are computed on the
//! haversine sphere; the footprint is built by offsetting every track
//! vertex perpendicular to the local course, which yields the
//! full-sided, flat-capped buffer the downstream overlays expect.
use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDateTime;
use geo::{Bearing, Destination, Distance, Haversine, LineString, Point, Polygon};
use kml::{
    types::{AltitudeMode, Coord, KmlVersion, LinearRing, Placemark, Polygon as KmlPolygon},
    Kml, KmlDocument, KmlWriter,
};
use log::debug;
use wkt::{ToWkt, TryFromWkt};
use zip::{write::SimpleFileOptions, ZipWriter};

use crate::timefmt::TimeFormat;
use crate::{
    Error, FeatureCollection, FeatureGeometry, FeatureRow, GeoEngine, Result, ORBIT_FIELD,
    REQ_TIME_FIELD, START_TIME_FIELD,
};

/// Header name of the geometry column.
const WKT_FIELD: &str = "WKT";

/// Derived attribute names of the lines stage.
const DISTANCE_FIELD: &str = "D_KM";
const DURATION_FIELD: &str = "DURATION";
const SPEED_FIELD: &str = "SPP_KM_H";
const COURSE_FIELD: &str = "HEADING";

/// Buffer distance attribute of the buffers stage.
const BUFF_DIST_FIELD: &str = "BUFF_DIST";

/// Entry name of the KML document inside a `.kmz` archive.
const KMZ_DOC: &str = "doc.kml";

#[derive(Debug, Default, Clone)]
pub struct FlatEngine {}

impl FlatEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GeoEngine for FlatEngine {
    fn read_collection(&self, path: &Path) -> Result<FeatureCollection> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        let mut fields: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        if fields.first().map(|f| f.as_str()) != Some(WKT_FIELD) {
            return Err(Error::Wkt(format!(
                "\"{}\" does not start with a {} column",
                path.display(),
                WKT_FIELD
            )));
        }
        fields.remove(0);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let geometry = parse_geometry(record.get(0).unwrap_or(""))?;
            let mut row = FeatureRow::new(geometry);
            for (field, value) in fields.iter().zip(record.iter().skip(1)) {
                row.attrs.insert(field.clone(), value.to_string());
            }
            rows.push(row);
        }
        Ok(FeatureCollection::from_parts(fields, rows))
    }

    fn write_collection(&self, path: &Path, fc: &FeatureCollection) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        let mut header = vec![WKT_FIELD.to_string()];
        header.extend(fc.fields().iter().cloned());
        writer.write_record(&header)?;
        for (index, row) in fc.rows().iter().enumerate() {
            let mut record = vec![render_geometry(&row.geometry)];
            for field in fc.fields() {
                record.push(fc.value(index, field).to_string());
            }
            writer.write_record(&record)?;
        }
        writer.flush()?;
        debug!("\"{}\": {} feature(s) written", path.display(), fc.len());
        Ok(())
    }

    fn points_to_timeline(
        &self,
        fc: &FeatureCollection,
        time_field: &str,
    ) -> Result<FeatureCollection> {
        if !fc.has_field(time_field) {
            return Err(Error::MissingField(time_field.to_string()));
        }
        // time-ordered (stamp, position) track
        let mut track: Vec<(NaiveDateTime, String, Point<f64>)> = Vec::new();
        for (index, row) in fc.rows().iter().enumerate() {
            if let FeatureGeometry::Point(p) = row.geometry {
                let stamp = fc.value(index, time_field);
                let t = TimeFormat::Ephemeris.parse(stamp)?;
                track.push((t, stamp.to_string(), p));
            }
        }
        if track.len() < 2 {
            return Err(Error::InsufficientPoints(track.len()));
        }
        track.sort_by_key(|(t, _, _)| *t);

        let mut distance_m = 0.0_f64;
        for pair in track.windows(2) {
            distance_m += Haversine::distance(pair[0].2, pair[1].2);
        }
        let duration_s = (track[track.len() - 1].0 - track[0].0).num_seconds();
        let distance_km = distance_m / 1.0E3;
        let speed_km_h = if duration_s > 0 {
            distance_km / (duration_s as f64 / 3600.0)
        } else {
            0.0
        };
        let course = normalize_course(Haversine::bearing(track[0].2, track[track.len() - 1].2));

        let line: LineString<f64> = track.iter().map(|(_, _, p)| p.0).collect();
        let mut out = FeatureCollection::new(&[
            START_TIME_FIELD,
            DISTANCE_FIELD,
            DURATION_FIELD,
            SPEED_FIELD,
            COURSE_FIELD,
        ]);
        out.push(
            FeatureRow::new(FeatureGeometry::Line(line))
                .with_attr(START_TIME_FIELD, &track[0].1)
                .with_attr(DISTANCE_FIELD, &format!("{:.3}", distance_km))
                .with_attr(DURATION_FIELD, &format!("{}", duration_s))
                .with_attr(SPEED_FIELD, &format!("{:.3}", speed_km_h))
                .with_attr(COURSE_FIELD, &format!("{:.1}", course)),
        );
        Ok(out)
    }

    fn buffer_timeline(
        &self,
        fc: &FeatureCollection,
        width_km: f64,
        dissolve_field: &str,
    ) -> Result<FeatureCollection> {
        if !fc.has_field(dissolve_field) {
            return Err(Error::MissingField(dissolve_field.to_string()));
        }
        // group rows per dissolve value, first-seen order
        let mut groups: Vec<(String, Vec<&LineString<f64>>)> = Vec::new();
        for (index, row) in fc.rows().iter().enumerate() {
            if let FeatureGeometry::Line(line) = &row.geometry {
                let value = fc.value(index, dissolve_field).to_string();
                match groups.iter_mut().find(|(v, _)| *v == value) {
                    Some((_, lines)) => lines.push(line),
                    None => groups.push((value, vec![line])),
                }
            }
        }

        let mut out = FeatureCollection::new(&[dissolve_field, BUFF_DIST_FIELD]);
        for (value, lines) in groups {
            for polygon in dissolve(&lines, width_km * 1.0E3)? {
                out.push(
                    FeatureRow::new(FeatureGeometry::Polygon(polygon))
                        .with_attr(dissolve_field, &value)
                        .with_attr(BUFF_DIST_FIELD, &format!("{} Kilometers", width_km)),
                );
            }
        }
        Ok(out)
    }

    fn export_kmz(&self, fc: &FeatureCollection, path: &Path, name: &str) -> Result<()> {
        let mut placemarks = Vec::<Kml>::new();
        for (index, row) in fc.rows().iter().enumerate() {
            if let FeatureGeometry::Polygon(polygon) = &row.geometry {
                placemarks.push(Kml::Placemark(Placemark {
                    name: {
                        let label = fc.value(index, ORBIT_FIELD);
                        if label.is_empty() {
                            Some(name.to_string())
                        } else {
                            Some(label.to_string())
                        }
                    },
                    description: {
                        let request = fc.value(index, REQ_TIME_FIELD);
                        if request.is_empty() {
                            None
                        } else {
                            Some(format!("Request time {}", request))
                        }
                    },
                    geometry: Some(kml::types::Geometry::Polygon(kml_polygon(polygon))),
                    attrs: std::collections::HashMap::new(),
                    children: vec![],
                }));
            }
        }
        let document = KmlDocument {
            version: KmlVersion::V22,
            attrs: [(
                String::from("xmlns"),
                String::from("http://www.opengis.net/kml/2.2"),
            )]
            .into_iter()
            .collect(),
            elements: vec![Kml::Folder {
                attrs: [(String::from("name"), name.to_string())]
                    .into_iter()
                    .collect(),
                elements: placemarks,
            }],
        };

        let mut buffer = Vec::<u8>::new();
        let mut writer = KmlWriter::<_, f64>::from_writer(&mut buffer);
        writer.write(&Kml::KmlDocument(document))?;

        let mut archive = ZipWriter::new(File::create(path)?);
        archive.start_file(KMZ_DOC, SimpleFileOptions::default())?;
        archive.write_all(&buffer)?;
        archive.finish()?;
        debug!("\"{}\" generated", path.display());
        Ok(())
    }
}

fn parse_geometry(wkt: &str) -> Result<FeatureGeometry> {
    let geometry = geo::Geometry::<f64>::try_from_wkt_str(wkt)
        .map_err(|e| Error::Wkt(format!("\"{}\": {}", wkt, e)))?;
    match geometry {
        geo::Geometry::Point(p) => Ok(FeatureGeometry::Point(p)),
        geo::Geometry::LineString(l) => Ok(FeatureGeometry::Line(l)),
        geo::Geometry::Polygon(p) => Ok(FeatureGeometry::Polygon(p)),
        other => Err(Error::Wkt(format!("unsupported geometry {:?}", other))),
    }
}

fn render_geometry(geometry: &FeatureGeometry) -> String {
    match geometry {
        FeatureGeometry::Point(p) => p.wkt_string(),
        FeatureGeometry::Line(l) => l.wkt_string(),
        FeatureGeometry::Polygon(p) => p.wkt_string(),
    }
}

fn normalize_course(bearing: f64) -> f64 {
    let course = bearing % 360.0;
    if course < 0.0 {
        course + 360.0
    } else {
        course
    }
}

/// Offsets a ground track perpendicular to its local course on both
/// sides and closes the two bound chains into one flat-capped polygon.
fn offset_polygon(line: &LineString<f64>, width_m: f64) -> Result<Polygon<f64>> {
    let points: Vec<Point<f64>> = line.points().collect();
    if points.len() < 2 {
        return Err(Error::InsufficientPoints(points.len()));
    }
    let mut left = Vec::with_capacity(points.len());
    let mut right = Vec::with_capacity(points.len());
    for (i, p) in points.iter().enumerate() {
        // local course: towards the next vertex, previous one at the tail
        let course = if i + 1 < points.len() {
            Haversine::bearing(*p, points[i + 1])
        } else {
            Haversine::bearing(points[i - 1], *p)
        };
        left.push(Haversine::destination(*p, course - 90.0, width_m));
        right.push(Haversine::destination(*p, course + 90.0, width_m));
    }
    let mut exterior: Vec<Point<f64>> = left;
    exterior.extend(right.into_iter().rev());
    Ok(Polygon::new(exterior.into_iter().collect(), vec![]))
}

/// Buffers each line of a dissolve group and unions the results
/// into as few polygons as the geometry permits.
fn dissolve(lines: &[&LineString<f64>], width_m: f64) -> Result<Vec<Polygon<f64>>> {
    use geo::BooleanOps;
    let mut merged: Option<geo::MultiPolygon<f64>> = None;
    for line in lines {
        let polygon = offset_polygon(line, width_m)?;
        merged = Some(match merged {
            Some(mp) => mp.union(&geo::MultiPolygon::new(vec![polygon])),
            None => geo::MultiPolygon::new(vec![polygon]),
        });
    }
    Ok(merged.map(|mp| mp.0).unwrap_or_default())
}

fn kml_polygon(polygon: &Polygon<f64>) -> KmlPolygon<f64> {
    let coords = polygon
        .exterior()
        .points()
        .map(|p| Coord {
            x: p.x(),
            y: p.y(),
            z: None,
        })
        .collect();
    KmlPolygon {
        outer: LinearRing {
            coords,
            extrude: false,
            tessellate: true,
            altitude_mode: AltitudeMode::ClampToGround,
            attrs: std::collections::HashMap::new(),
        },
        inner: vec![],
        extrude: false,
        tessellate: true,
        altitude_mode: AltitudeMode::ClampToGround,
        attrs: std::collections::HashMap::new(),
    }
}

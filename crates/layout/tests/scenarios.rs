//! End-to-end layout runs on synthetic sites

use approx::assert_relative_eq;
use geo::{polygon, Contains, Point, Polygon};
use ndarray::Array2;
use sitegrade_algorithms::terrain::contour_levels;
use sitegrade_core::{Error, GeoTransform, Raster};
use sitegrade_layout::*;

const CELL: f64 = 10.0;

fn dem_from(rows: usize, cols: usize, f: impl Fn(f64, f64) -> f64) -> Raster<f64> {
    let data = Array2::from_shape_fn((rows, cols), |(r, c)| {
        let x = (c as f64 + 0.5) * CELL;
        let y = (rows as f64 - r as f64 - 0.5) * CELL;
        f(x, y)
    });
    let mut dem = Raster::from_array(data);
    dem.set_transform(GeoTransform::new(0.0, rows as f64 * CELL, CELL, -CELL));
    dem
}

fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon<f64> {
    polygon![(x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1)]
}

fn hill() -> Raster<f64> {
    dem_from(60, 60, |x, y| {
        let d2 = (x - 300.0).powi(2) + (y - 300.0).powi(2);
        100.0 + 30.0 * (-d2 / (2.0 * 150.0 * 150.0)).exp()
    })
}

fn mixed_request(count: usize, seed: u64) -> GenerationRequest {
    GenerationRequest {
        target_capacity_kw: 1000.0,
        requested_count: count,
        profile: vec![
            ProfileEntry::new(AssetKind::Substation, 1.0),
            ProfileEntry::new(AssetKind::Transformer, 1.0),
            ProfileEntry::new(AssetKind::Battery, 1.0),
            ProfileEntry::new(AssetKind::Inverter, 2.0),
            ProfileEntry::new(AssetKind::SolarArray, 3.0),
        ],
        seed,
    }
}

fn engine() -> LayoutEngine {
    LayoutEngine::new(LayoutConfig::default()).unwrap()
}

#[test]
fn test_flat_square_kilometer() {
    let dem = dem_from(100, 100, |_, _| 100.0);
    let boundary = square(0.0, 0.0, 1000.0, 1000.0);
    let result = engine().generate(&dem, &boundary, &[], &mixed_request(8, 2024)).unwrap();

    assert_eq!(result.placed_count, 8);
    assert_eq!(result.requested_count, 8);
    assert_eq!(result.roads.len(), 7);
    assert!(result.assets.iter().any(|a| a.kind.is_hub()));
    assert!(result.warnings.is_empty());
    assert!(result.roads.iter().all(|r| !r.fallback));
    assert_relative_eq!(result.cut_fill.total_cut_m3, 0.0, epsilon = 1e-9);
    assert_relative_eq!(result.cut_fill.total_fill_m3, 0.0, epsilon = 1e-9);
    for a in &result.assets {
        assert_relative_eq!(a.slope_deg, 0.0, epsilon = 1e-9);
    }
}

#[test]
fn test_steep_site_with_small_gentle_patch() {
    // 25 degree ramp with a level 5x5-cell shelf at rows 12..=16, cols 12..=16;
    // only the shelf's inner 3x3 is gentle, its rim sees the ramp
    let grade = 25f64.to_radians().tan();
    let dem = dem_from(30, 30, |x, y| {
        let on_shelf = (120.0..170.0).contains(&x) && (130.0..180.0).contains(&y);
        if on_shelf {
            145.0 * grade
        } else {
            x * grade
        }
    });
    let boundary = square(0.0, 0.0, 300.0, 300.0);
    let result = engine().generate(&dem, &boundary, &[], &mixed_request(6, 5)).unwrap();

    assert!(result.placed_count >= 1);
    assert!(result.assets[0].kind.is_hub());
    for a in &result.assets {
        assert!((13..=15).contains(&a.row) && (13..=15).contains(&a.col), "asset at ({}, {})", a.row, a.col);
        assert!(a.slope_deg <= 15.0, "asset on {} degree slope", a.slope_deg);
    }
    let skipped = result
        .warnings
        .iter()
        .filter(|w| matches!(w, LayoutWarning::NoBuildableCells { .. }))
        .count();
    assert_eq!(result.placed_count + skipped, 6);
    assert_eq!(result.roads.len(), result.placed_count - 1);
}

#[test]
fn test_contour_levels_over_range() {
    let levels = contour_levels(100.0, 142.0, 5.0).unwrap();
    let expected: Vec<f64> = (0..9).map(|i| 100.0 + 5.0 * i as f64).collect();
    assert_eq!(levels, expected);
    assert!(matches!(
        contour_levels(100.0, 142.0, 0.0),
        Err(Error::InvalidParameter { .. })
    ));
}

#[test]
fn test_terrain_products_on_ramp() {
    let dem = dem_from(20, 43, |x, _| 100.2 + 0.098 * (x - 5.0));
    let boundary = square(0.0, 0.0, 430.0, 200.0);
    let products = engine().terrain_products(&dem, &boundary).unwrap();

    let levels: Vec<f64> = products
        .contours
        .iter()
        .filter_map(|f| f.get_property("elevation").and_then(|v| v.as_f64()))
        .collect();
    let expected: Vec<f64> = (1..=8).map(|i| 100.0 + 5.0 * i as f64).collect();
    assert_eq!(levels, expected);

    // about 5.6 degrees everywhere, edge columns included
    assert!(!products.slope_heatmap.is_empty());
    let share: f64 = products.summary.slope_class_percent.values().sum();
    assert_relative_eq!(share, 100.0, epsilon = 1e-9);
    assert_relative_eq!(products.summary.slope_class_percent["5-10"], 100.0, epsilon = 1e-9);
    assert_eq!(products.summary.buildable.len(), AssetKind::ALL.len());
    assert!(!products.buildable_areas.is_empty());
}

#[test]
fn test_boundary_outside_grid() {
    let boundary = square(5000.0, 5000.0, 6000.0, 6000.0);
    let result = engine().generate(&hill(), &boundary, &[], &mixed_request(5, 1)).unwrap();
    assert!(result.assets.is_empty());
    assert!(result.roads.is_empty());
    assert_eq!(result.cut_fill.total_cut_m3, 0.0);
    assert_eq!(result.warnings.len(), 5);
}

#[test]
fn test_placement_constraints_on_hill() {
    let config = LayoutConfig::default();
    let boundary = square(50.0, 50.0, 550.0, 550.0);
    let exclusion = square(250.0, 250.0, 350.0, 350.0);
    let zones = [ExclusionZone::hard(exclusion.clone(), 10.0)];
    let result = LayoutEngine::new(config.clone())
        .unwrap()
        .generate(&hill(), &boundary, &zones, &mixed_request(12, 77))
        .unwrap();

    assert!(result.placed_count > 0);
    for (i, a) in result.assets.iter().enumerate() {
        let p = Point::new(a.x, a.y);
        assert!(boundary.contains(&p));
        assert!(!exclusion.contains(&p));
        assert!(a.slope_deg <= config.assets.spec(a.kind).suitability.max_slope_deg);
        for b in &result.assets[i + 1..] {
            assert!((a.x - b.x).hypot(a.y - b.y) >= config.placement.min_spacing_m);
        }
    }
    assert_eq!(result.roads.len(), result.placed_count - 1);
    for (i, road) in result.roads.iter().enumerate() {
        assert_eq!(road.from, 0);
        assert_eq!(road.to, i + 1);
    }

    let cut: f64 = result.cut_fill.breakdown.iter().map(|p| p.cut_m3).sum();
    let fill: f64 = result.cut_fill.breakdown.iter().map(|p| p.fill_m3).sum();
    assert_eq!(result.cut_fill.total_cut_m3, cut);
    assert_eq!(result.cut_fill.total_fill_m3, fill);
    assert_eq!(result.cut_fill.net_m3, cut - fill);
}

#[test]
fn test_same_seed_reproduces_layout() {
    let boundary = square(0.0, 0.0, 600.0, 600.0);
    let a = engine().generate(&hill(), &boundary, &[], &mixed_request(10, 9)).unwrap();
    let b = engine().generate(&hill(), &boundary, &[], &mixed_request(10, 9)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_tiny_search_budget_falls_back() {
    let mut config = LayoutConfig::default();
    config.roads.max_iterations = 1;
    let dem = dem_from(40, 40, |_, _| 50.0);
    let boundary = square(0.0, 0.0, 400.0, 400.0);
    let result = LayoutEngine::new(config)
        .unwrap()
        .generate(&dem, &boundary, &[], &mixed_request(4, 3))
        .unwrap();

    assert_eq!(result.roads.len(), 3);
    assert!(result.roads.iter().all(|r| r.fallback && r.path.0.len() == 2));
    let fallbacks = result
        .warnings
        .iter()
        .filter(|w| matches!(w, LayoutWarning::StraightLineFallback { .. }))
        .count();
    assert_eq!(fallbacks, 3);
}

#[test]
fn test_config_and_request_from_json() {
    let config: LayoutConfig = serde_json::from_str(
        r#"{
            "placement": { "min_spacing_m": 40.0 },
            "assets": { "inverter": {
                "suitability": { "max_slope_deg": 12.0, "optimal_slope_deg": 4.0 },
                "capacity": { "min_kw": 50.0, "max_kw": 150.0, "reference_kw": 100.0 },
                "footprint_width_m": 3.0,
                "footprint_length_m": 2.0,
                "pad_size_m": 6.0
            } }
        }"#,
    )
    .unwrap();
    assert_relative_eq!(config.assets.inverter.suitability.max_slope_deg, 12.0);
    assert_eq!(config.assets.battery, AssetCatalog::default().battery);

    let request: GenerationRequest = serde_json::from_str(
        r#"{ "target_capacity_kw": 400.0, "requested_count": 3,
             "profile": [ { "kind": "inverter", "weight": 1.0 } ] }"#,
    )
    .unwrap();
    assert_eq!(request.seed, 0);

    let dem = dem_from(30, 30, |_, _| 10.0);
    let result = LayoutEngine::new(config)
        .unwrap()
        .generate(&dem, &square(0.0, 0.0, 300.0, 300.0), &[], &request)
        .unwrap();
    assert_eq!(result.placed_count, 3);
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["assets"][0]["kind"], "substation");
    assert_eq!(json["roads"].as_array().map(Vec::len), Some(2));
}

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use morphsample_core::{
    collect, Action, ActionSlot, CurveKey, ExportSettings, FCurve, FrameRange, Interpolation,
    ObjectId, SampleCache, Scene, SceneObject, ShapeKeyBlock, ShapeKeySet, SlotId,
};

const KEYS: usize = 52;

fn build_scene() -> Scene {
    let mut blocks = vec![ShapeKeyBlock::new("Basis", 0.0)];
    let mut fcurves = Vec::new();
    for i in 0..KEYS {
        let name = format!("key{i}");
        blocks.push(ShapeKeyBlock::new(name.clone(), 0.0));
        if i % 2 == 0 {
            fcurves.push(FCurve::new(
                morphsample_core::data::shape_key_data_path(&name),
                vec![
                    CurveKey::new(0.0, 0.0, Interpolation::Bezier),
                    CurveKey::new(120.0, 1.0, Interpolation::Bezier),
                    CurveKey::new(240.0, 0.0, Interpolation::Bezier),
                ],
            ));
        }
    }
    Scene::new()
        .with_object(
            "Head",
            SceneObject {
                shape_keys: Some(ShapeKeySet::new(blocks)),
                ..Default::default()
            },
        )
        .with_action(Action {
            name: "Talk".into(),
            slots: vec![ActionSlot {
                identifier: SlotId::from("KEHead"),
                fcurves,
            }],
        })
}

fn bench_collect(c: &mut Criterion) {
    let scene = build_scene();
    let head = ObjectId::from("Head");
    let slot = SlotId::from("KEHead");

    for (label, disable_viewport) in [("evaluate", true), ("full_bake", false)] {
        let mut settings = ExportSettings {
            disable_viewport_optimization: disable_viewport,
            ..Default::default()
        };
        settings
            .ranges
            .insert(head.clone(), Some("Talk"), FrameRange::new(0.0, 240.0));
        c.bench_function(&format!("collect_{label}_240f_{KEYS}sk"), |b| {
            b.iter(|| {
                let mut cache = SampleCache::new();
                let out = collect(
                    &scene,
                    &settings,
                    &mut cache,
                    &head,
                    Some("Talk"),
                    Some(&slot),
                )
                .unwrap();
                black_box(out);
            })
        });
    }
}

criterion_group!(benches, bench_collect);
criterion_main!(benches);

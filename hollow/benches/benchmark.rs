use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use common::{config::HollowMethod, progress::Progress};
use hollow::{
    builder::MeshBuilder, geometry::bvh::Bvh, hollow, offset::offset_inward,
    thickness::min_local_thickness, HollowParams, Pos,
};

pub fn bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("Hollow");

    for (rings, segments) in [(16, 32), (64, 128), (128, 256)] {
        let sphere = MeshBuilder::sphere(Pos::zeros(), 25.0, rings, segments);
        let name = format!("sphere-{}", sphere.face_count());

        group.bench_with_input(BenchmarkId::new("Bvh", &name), &sphere, |b, i| {
            b.iter(|| Bvh::build(i))
        });

        let bvh = Bvh::build(&sphere);
        group.bench_with_input(
            BenchmarkId::new("Thickness", &name),
            &(bvh, sphere.clone()),
            |b, (bvh, mesh)| b.iter(|| min_local_thickness(mesh, bvh, &Progress::new())),
        );

        group.bench_with_input(BenchmarkId::new("Offset", &name), &sphere, |b, i| {
            b.iter(|| offset_inward(i, 2.0, 4.0))
        });

        for method in HollowMethod::ALL {
            let params = HollowParams::new(2.0).with_method(method);
            group.bench_with_input(
                BenchmarkId::new(format!("Hollow {method}"), &name),
                &sphere,
                |b, i| b.iter(|| hollow(i, &params).unwrap()),
            );
        }
    }
}

criterion_group!(benches, bench);
criterion_main!(benches);

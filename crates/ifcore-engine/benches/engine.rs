// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Benchmark of a full compliance run on synthetic models.
//!
//! Run with: cargo bench -p ifcore-engine --bench engine

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ifcore_engine::{extract::extract, Catalog, Engine};
use ifcore_parser::ParsedModel;
use std::fmt::Write;

/// STEP model with `walls` walls and `walls / 4` slabs on two storeys
fn generate_model(walls: usize) -> String {
    let mut step = String::from(
        "ISO-10303-21;\nHEADER;\nFILE_DESCRIPTION(('ViewDefinition [CoordinationView]'),'2;1');\n\
         FILE_NAME('bench.ifc','2024-01-01T00:00:00',(''),(''),'','','');\n\
         FILE_SCHEMA(('IFC4'));\nENDSEC;\nDATA;\n\
         #1=IFCPROJECT('proj',$,'Bench',$,$,$,$,$,#2);\n\
         #2=IFCUNITASSIGNMENT((#3));\n\
         #3=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);\n\
         #4=IFCBUILDINGSTOREY('st0',$,'Level 1',$,$,$,$,$,.ELEMENT.,0.0);\n\
         #5=IFCBUILDINGSTOREY('st1',$,'Level 2',$,$,$,$,$,.ELEMENT.,3000.0);\n\
         #6=IFCSPACE('sp',$,'K1',$,$,$,$,'Kitchen',.ELEMENT.,.INTERNAL.,$);\n",
    );

    let mut id = 100;
    let mut contained = Vec::new();
    for i in 0..walls {
        let wall = id;
        let _ = writeln!(step, "#{}=IFCWALL('w{}',$,'Wall {}',$,$,$,$,$,$);", wall, i, i);
        let _ = writeln!(
            step,
            "#{}=IFCQUANTITYLENGTH('Width',$,$,{}.,$);",
            wall + 1,
            80 + (i % 5) * 20
        );
        let _ = writeln!(
            step,
            "#{}=IFCELEMENTQUANTITY('q{}',$,'Qto_WallBaseQuantities',$,$,(#{}));",
            wall + 2,
            i,
            wall + 1
        );
        let _ = writeln!(
            step,
            "#{}=IFCRELDEFINESBYPROPERTIES('r{}',$,$,$,(#{}),#{});",
            wall + 3,
            i,
            wall,
            wall + 2
        );
        let _ = writeln!(
            step,
            "#{}=IFCRELSPACEBOUNDARY('b{}',$,$,$,#6,#{},$,.PHYSICAL.,.INTERNAL.);",
            wall + 4,
            i,
            wall
        );
        contained.push(wall);
        id += 5;
    }
    for i in 0..walls / 4 {
        let _ = writeln!(step, "#{}=IFCSLAB('s{}',$,'Floor {}mm',$,$,$,$,$,.FLOOR.);", id, i, 150 + i % 4 * 50);
        contained.push(id);
        id += 1;
    }

    let refs: Vec<String> = contained.iter().map(|id| format!("#{}", id)).collect();
    let _ = writeln!(
        step,
        "#{}=IFCRELCONTAINEDINSPATIALSTRUCTURE('c',$,$,$,({}),#4);",
        id,
        refs.join(",")
    );
    step.push_str("ENDSEC;\nEND-ISO-10303-21;\n");
    step
}

fn bench_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");
    let engine = Engine::default();

    for walls in [100usize, 1_000] {
        let content = generate_model(walls);
        group.throughput(Throughput::Elements(walls as u64));

        group.bench_with_input(BenchmarkId::new("run_content", walls), &content, |b, content| {
            b.iter(|| engine.run_content(black_box(content)))
        });

        if let Ok(model) = ParsedModel::parse(&content) {
            group.bench_with_input(BenchmarkId::new("extract", walls), &model, |b, model| {
                b.iter(|| extract(black_box(model), &Catalog::standard()))
            });

            if let Ok(population) = extract(&model, &Catalog::standard()) {
                group.bench_with_input(
                    BenchmarkId::new("evaluate", walls),
                    &population,
                    |b, population| b.iter(|| engine.evaluate(black_box(population))),
                );
            }
        }
    }
    group.finish();
}

criterion_group!(benches, bench_run);
criterion_main!(benches);

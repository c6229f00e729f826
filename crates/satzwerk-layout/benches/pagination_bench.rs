// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the two-pass pagination pipeline and cover wrap
// geometry on a synthetic novel-length manuscript.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use satzwerk_core::types::{BookSelection, Chapter, Manuscript, PaperClass};
use satzwerk_core::{EngineConfig, TrimCatalog};
use satzwerk_layout::{CoverWrapLayout, paginate};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Ten chapters of 4,500 words each.
fn novel() -> Manuscript {
    let words = ["lantern", "harbor", "tide", "the", "over", "night", "quietly"];
    Manuscript {
        title: "Bench Harbor".into(),
        author: "Bench Writer".into(),
        dedication: None,
        copyright: None,
        chapters: (0..10)
            .map(|index| Chapter {
                index,
                title: format!("Chapter {}", index + 1),
                body: (0..4500)
                    .map(|i| words[(i + index) % words.len()])
                    .collect::<Vec<_>>()
                    .join(" "),
                illustration: None,
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_paginate(c: &mut Criterion) {
    let config = EngineConfig::default();
    let selection = BookSelection {
        trim: TrimCatalog::lookup("6x9").unwrap(),
        paper: PaperClass::White,
    };
    let manuscript = novel();

    c.bench_function("paginate (10 x 4500 words, 6x9)", |b| {
        b.iter(|| {
            let book = paginate(black_box(&manuscript), &selection, &config).unwrap();
            black_box(book.plan.total_pages);
        });
    });
}

fn bench_cover_geometry(c: &mut Criterion) {
    let config = EngineConfig::default();
    let trims = TrimCatalog::all();

    c.bench_function("cover wrap geometry (all trims)", |b| {
        b.iter(|| {
            for trim in &trims {
                let layout =
                    CoverWrapLayout::compute(trim, black_box(320), PaperClass::Cream, &config)
                        .unwrap();
                black_box(layout.total_width);
            }
        });
    });
}

criterion_group!(benches, bench_paginate, bench_cover_geometry);
criterion_main!(benches);

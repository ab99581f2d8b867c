//! Geometry invariants over seeded random call sequences, through the window API

use std::cell::Cell;
use std::rc::Rc;

use casement::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SEEDS: u64 = 24;
const STEPS: usize = 200;

fn desktop_mode(rng: &mut StdRng) -> WindowMode {
    if rng.gen_bool(0.5) {
        WindowMode::Borderless
    } else {
        WindowMode::Fullscreen
    }
}

fn any_mode(rng: &mut StdRng) -> WindowMode {
    match rng.gen_range(0..3) {
        0 => WindowMode::Windowed,
        1 => WindowMode::Borderless,
        _ => WindowMode::Fullscreen,
    }
}

fn assert_within_bounds(window: &Window<HeadlessBackend>, step: usize, seed: u64) {
    let (size, min, max) = (window.size(), window.minimum_size(), window.maximum_size());
    assert!(
        min.width <= size.width && size.width <= max.width,
        "seed {seed} step {step}: width {} outside [{}, {}]",
        size.width,
        min.width,
        max.width
    );
    assert!(
        min.height <= size.height && size.height <= max.height,
        "seed {seed} step {step}: height {} outside [{}, {}]",
        size.height,
        min.height,
        max.height
    );
    assert!(min.width >= 1 && min.height >= 1);
}

#[test]
fn size_stays_within_bounds_for_random_call_sequences() {
    for seed in 0..SEEDS {
        let platform = Platform::headless();
        let mut window = Window::new(&platform, "bounds", 640, 480, WindowFlags::RESIZABLE);
        let steps = Rc::new(Cell::new(0));
        let counter = Rc::clone(&steps);
        let mut rng = StdRng::seed_from_u64(seed);

        window.on_loaded(move |window| {
            for step in 0..STEPS {
                let (w, h) = (rng.gen_range(-200..4000), rng.gen_range(-200..4000));
                match rng.gen_range(0..6) {
                    0 => window.set_minimum_size(w, h).unwrap(),
                    1 => window.set_maximum_size(w, h).unwrap(),
                    2 | 3 => window.change_size(w, h).unwrap(),
                    4 => window.unbound().unwrap(),
                    _ => window.change_window_mode(any_mode(&mut rng)).unwrap(),
                }
                assert_within_bounds(window, step, seed);
                counter.set(counter.get() + 1);
            }
        });
        window.show().unwrap();

        assert_eq!(steps.get(), STEPS, "seed {seed}");
    }
}

#[test]
fn leaving_desktop_modes_restores_the_windowed_tuple() {
    for seed in 0..SEEDS {
        let platform = Platform::headless();
        let mut window = Window::new(&platform, "round trip", 800, 600, WindowFlags::empty());
        let trips = Rc::new(Cell::new(0));
        let counter = Rc::clone(&trips);
        let mut rng = StdRng::seed_from_u64(seed);

        window.on_loaded(move |window| {
            for _ in 0..10 {
                window
                    .set_minimum_size(rng.gen_range(1..900), rng.gen_range(1..900))
                    .unwrap();
                window
                    .set_maximum_size(rng.gen_range(1..3000), rng.gen_range(1..3000))
                    .unwrap();
                window
                    .change_size(rng.gen_range(-50..3500), rng.gen_range(-50..3500))
                    .unwrap();
                window.set_resizable(rng.gen_bool(0.5)).unwrap();

                let before = (
                    window.minimum_size(),
                    window.maximum_size(),
                    window.size(),
                    window.is_resizable(),
                );

                for _ in 0..rng.gen_range(1..5) {
                    window.change_window_mode(desktop_mode(&mut rng)).unwrap();
                    window
                        .change_size(rng.gen_range(1..3000), rng.gen_range(1..3000))
                        .unwrap();
                }
                window.change_window_mode(WindowMode::Windowed).unwrap();

                let after = (
                    window.minimum_size(),
                    window.maximum_size(),
                    window.size(),
                    window.is_resizable(),
                );
                assert_eq!(after, before, "seed {seed}");
                counter.set(counter.get() + 1);
            }
        });
        window.show().unwrap();

        assert_eq!(trips.get(), 10, "seed {seed}");
    }
}

//! End-to-end checks across grid, generator, filters and templates.

use approx::assert_relative_eq;
use flatmaps::fourier::fft2;
use flatmaps::noise::white_noise_power;
use flatmaps::transforms::step_function_filter;
use flatmaps::units::arcmin_to_radians;
use flatmaps::{
    cosine_window, fourier_mask, tqu_to_fourier_teb, white_noise_2d, ApodizationConfig,
    BeamSpec, FourierCoordinates, GrfGenerator, MaskBounds, NoiseConfig, PixelGrid, Spectrum1D,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn scenario() -> (PixelGrid, Spectrum1D) {
    let grid = PixelGrid::square(64, 64, arcmin_to_radians(0.5)).unwrap();
    let spectrum = Spectrum1D::new(
        vec![2.0, 10.0, 100.0, 1000.0, 3000.0],
        vec![1.0, 1.0, 0.1, 0.01, 0.001],
    )
    .unwrap();
    (grid, spectrum)
}

#[test]
fn test_reference_scenario() {
    let (grid, spectrum) = scenario();
    let generator = GrfGenerator::new(&grid, &spectrum, 1).expect("generator construction");

    for _ in 0..3 {
        let map = generator.get_map(None);
        assert_eq!(map.dim(), (64, 64));
        assert!(map.iter().all(|v| v.is_finite()));
        assert_relative_eq!(map.mean().unwrap(), 0.0, epsilon = 1e-9);
    }
}

#[test]
fn test_buffered_generation_crops_to_grid() {
    let (grid, spectrum) = scenario();
    let generator = GrfGenerator::new(&grid, &spectrum, 3).unwrap();
    let map = generator.get_map_with_rng(&mut StdRng::seed_from_u64(21), None);
    assert_eq!(map.dim(), (64, 64));
    assert!(map.iter().all(|v| v.is_finite()));
    assert!(map.iter().any(|&v| v != 0.0));
}

#[test]
fn test_filtered_realization_survives_step_filter() {
    let (grid, spectrum) = scenario();
    let generator = GrfGenerator::new(&grid, &spectrum, 1).unwrap();
    let coords = FourierCoordinates::new(&grid);

    let map = generator.get_map_with_rng(&mut StdRng::seed_from_u64(8), Some(1500.0));
    let filtered = step_function_filter(&map, coords.mod_l_map(), 1500.0).unwrap();
    let scale = map.iter().fold(0.0f64, |m, v| m.max(v.abs()));
    for (a, b) in map.iter().zip(filtered.iter()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-10 * scale);
    }
}

#[test]
fn test_apodized_polarization_pipeline() {
    let (grid, spectrum) = scenario();
    let generator = GrfGenerator::new(&grid, &spectrum, 1).unwrap();
    let mut rng = StdRng::seed_from_u64(99);
    let window = cosine_window(64, 64, ApodizationConfig { len_apod: 10, pad: 2 });

    let t = generator.get_map_with_rng(&mut rng, None) * &window;
    let q = generator.get_map_with_rng(&mut rng, None) * &window;
    let u = generator.get_map_with_rng(&mut rng, None) * &window;

    let coords = FourierCoordinates::new(&grid);
    let teb = tqu_to_fourier_teb(&t, &q, &u, &coords).unwrap();
    let fq = fft2(&q);
    let fu = fft2(&u);

    let total_qu: f64 = fq.iter().zip(fu.iter()).map(|(a, b)| a.norm_sqr() + b.norm_sqr()).sum();
    let total_eb: f64 = teb
        .e
        .iter()
        .zip(teb.b.iter())
        .map(|(a, b)| a.norm_sqr() + b.norm_sqr())
        .sum();
    assert_relative_eq!(total_eb, total_qu, max_relative = 1e-10);

    let mask = fourier_mask(
        &coords,
        &MaskBounds {
            lmin: Some(100.0),
            lmax: Some(3000.0),
            ..Default::default()
        },
    );
    assert_eq!(mask[[0, 0]], 0);
    assert!(mask.iter().any(|&m| m == 1));
}

#[test]
fn test_noise_templates_on_generator_grid() {
    let (grid, _) = scenario();
    let coords = FourierCoordinates::new(&grid);
    let config = NoiseConfig {
        lknees: Some(vec![0.0, 2000.0]),
        alphas: Some(vec![1.0, -3.0]),
        ..Default::default()
    };
    let noise = white_noise_2d(
        &[12.0, 12.0],
        &BeamSpec::Gaussian { fwhm_arcmin: 1.5 },
        coords.mod_l_map(),
        &config,
        None,
    )
    .unwrap();

    let white = white_noise_power(12.0, config.tcmb);
    assert_relative_eq!(noise[0][[0, 0]], white, max_relative = 1e-12);
    // The atmospheric channel is never quieter than the white one
    for (a, w) in noise[1].iter().zip(noise[0].iter()) {
        assert!(*a >= *w);
    }
}

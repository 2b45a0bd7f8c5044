use super::*;
use crate::error::FactorizationError;
use crate::gen::{demo_objectives, layered_objectives, low_rank_psd, singular_integer_system};
use crate::null_space::{AffineSolution, QrBackend, SvdBackend};
use nalgebra::{dmatrix, dvector};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn obj(h: DMatrix<f64>, f: DVector<f64>) -> QuadraticObjective {
    QuadraticObjective::new(h, f).unwrap()
}

#[test]
fn single_level_residual_lies_outside_the_range() {
    let h = low_rank_psd(8, 3, 5);
    let f = DVector::from_fn(8, |i, _| 1.0 - 0.3 * i as f64);
    for method in Factorization::ALL {
        let x = solve(&[obj(h.clone(), f.clone())], None, method).unwrap();
        // ∇E = Hx + f must be orthogonal to range(H) = range(Hᵀ).
        let grad = &h * &x + &f;
        assert!((&h * grad).amax() < 1e-9, "{method}");
    }
}

#[test]
fn single_level_consistent_system_is_solved_exactly() {
    let h = low_rank_psd(6, 4, 9);
    let f = &h * DVector::from_fn(6, |i, _| i as f64);
    let x = solve(&[obj(h.clone(), f.clone())], None, Factorization::Qr).unwrap();
    assert!((&h * &x + &f).amax() < 1e-9);
}

#[test]
fn full_rank_first_level_ignores_the_rest() {
    let first = obj(dmatrix![2.0, 0.0; 0.0, 4.0], dvector![-2.0, 4.0]);
    let second = obj(DMatrix::identity(2, 2), dvector![100.0, -100.0]);
    let alone = LexSolver::default().solve(&[first.clone()], None).unwrap();
    let both = LexSolver::default().solve(&[first, second], None).unwrap();
    assert!((&both.x - dvector![1.0, -1.0]).amax() < 1e-12);
    assert_eq!(both.x, alone.x);
    assert_eq!(both.early_exit, Some(0));
    assert_eq!(both.levels.len(), 1);
    assert!(both.is_unique());
    // Energies still cover every input level.
    assert_eq!(both.energies.len(), 2);
    assert!((both.energies[1] - (1.0 + 200.0)).abs() < 1e-9);
}

#[test]
fn priority_order_changes_the_answer() {
    // A pins x₀, x₁ and leaves x₂ free; B wants everything at 5.
    let a = obj(dmatrix![1.0, 0.0, 0.0; 0.0, 1.0, 0.0; 0.0, 0.0, 0.0], dvector![-1.0, -2.0, 0.0]);
    let b = obj(DMatrix::identity(3, 3), dvector![-5.0, -5.0, -5.0]);
    let ab = LexSolver::default().solve(&[a.clone(), b.clone()], None).unwrap();
    let ba = LexSolver::default().solve(&[b, a], None).unwrap();
    assert!((&ab.x - dvector![1.0, 2.0, 5.0]).amax() < 1e-12);
    assert!((&ba.x - dvector![5.0, 5.0, 5.0]).amax() < 1e-12);
    assert_eq!(ab.early_exit, Some(1));
    assert_eq!(ba.early_exit, Some(0));
}

#[test]
fn under_determined_problem_reports_free_dims() {
    let a = obj(dmatrix![1.0, 0.0, 0.0; 0.0, 0.0, 0.0; 0.0, 0.0, 0.0], dvector![-3.0, 0.0, 0.0]);
    let sol = LexSolver::default().solve(&[a], None).unwrap();
    assert_eq!(sol.free_dims, 2);
    assert!(!sol.is_unique());
    assert_eq!(sol.early_exit, None);
    assert!((&sol.x - dvector![3.0, 0.0, 0.0]).amax() < 1e-12);
}

#[test]
fn singular_integer_system_end_to_end() {
    let (h, f) = singular_integer_system(100, 2024);
    let objectives = [obj(h.clone(), f.clone())];
    for method in [Factorization::Qr, Factorization::Svd] {
        let sol = LexSolver::new(LexCfg::with_method(method))
            .solve(&objectives, None)
            .unwrap();
        let z = &sol.x;
        let quad = z.dot(&(&h * z));
        let lin = z.dot(&f);
        assert!(
            (quad + lin).abs() <= 1e-6 * (quad.abs() + lin.abs()),
            "{method}: zᵀHz + zᵀf = {}",
            quad + lin
        );
        assert!((&h * z + &f).norm() <= 1e-6 * f.norm(), "{method}");
        assert_eq!(sol.free_dims, 1, "{method}");
    }
}

#[test]
fn second_level_is_stationary_on_the_first_null_space() {
    let objectives = demo_objectives(40, 3, true);
    let sol = LexSolver::default().solve(&objectives, None).unwrap();
    assert_eq!(sol.early_exit, Some(1));
    let h = &objectives[0].h;
    assert!((h * &sol.x + &objectives[0].f).norm() <= 1e-8 * objectives[0].f.norm());

    let null = crate::null_space::affine_null_space(
        &SvdBackend,
        h,
        &DVector::zeros(40),
        None,
        &NullSpaceCfg::default(),
    )
    .unwrap()
    .basis;
    assert_eq!(null.ncols(), 1);
    let grad2 = objectives[1].gradient(&sol.x);
    assert!((null.transpose() * grad2).amax() < 1e-8);
}

#[test]
fn shape_errors_are_detected_before_factoring() {
    assert_eq!(
        LexSolver::default().solve(&[], None).unwrap_err(),
        LexError::EmptyObjectives
    );

    let good = QuadraticObjective::zeros(3);
    let bad = QuadraticObjective {
        h: DMatrix::identity(2, 2),
        f: DVector::zeros(2),
    };
    let err = LexSolver::default().solve(&[good.clone(), bad], None).unwrap_err();
    assert!(matches!(err, LexError::DimensionMismatch { level: Some(1), .. }));

    let ragged = QuadraticObjective {
        h: DMatrix::identity(3, 3),
        f: DVector::zeros(4),
    };
    let err = LexSolver::default().solve(&[ragged], None).unwrap_err();
    assert!(matches!(err, LexError::DimensionMismatch { level: Some(0), .. }));

    let err = LexSolver::default()
        .solve(&[good], Some(&Bounds::unit(2)))
        .unwrap_err();
    assert!(matches!(err, LexError::DimensionMismatch { level: None, .. }));
}

#[test]
fn factorization_failure_names_the_level() {
    let first = obj(dmatrix![1.0, 0.0; 0.0, 0.0], dvector![0.0, 0.0]);
    let poisoned = QuadraticObjective {
        h: dmatrix![f64::NAN, 0.0; 0.0, 1.0],
        f: dvector![0.0, 0.0],
    };
    let err = LexSolver::default().solve(&[first, poisoned], None).unwrap_err();
    assert_eq!(
        err,
        LexError::Factorization {
            level: 1,
            source: FactorizationError::NonFinite
        }
    );

    let asym = obj(dmatrix![1.0, 3.0; 0.0, 1.0], dvector![0.0, 0.0]);
    let err = solve(&[asym], None, Factorization::SymmetricEigen).unwrap_err();
    assert!(matches!(
        err,
        LexError::Factorization {
            level: 0,
            source: FactorizationError::NotSymmetric { .. }
        }
    ));
}

#[test]
fn bounds_select_among_free_directions() {
    // Level 0 pins x₀ = 0.5; level 1 pins x₂ = 0.75; x₁ is never constrained.
    let objectives = [
        obj(dmatrix![1.0, 0.0, 0.0; 0.0, 0.0, 0.0; 0.0, 0.0, 0.0], dvector![-0.5, 0.0, 0.0]),
        obj(dmatrix![0.0, 0.0, 0.0; 0.0, 0.0, 0.0; 0.0, 0.0, 1.0], dvector![0.0, 0.0, -0.75]),
    ];
    let free = LexSolver::default().solve(&objectives, None).unwrap();
    assert!((&free.x - dvector![0.5, 0.0, 0.75]).amax() < 1e-12);

    let bounds = Bounds::new(dvector![0.0, 0.25, 0.0], dvector![1.0, 1.0, 1.0]).unwrap();
    let boxed = LexSolver::default().solve(&objectives, Some(&bounds)).unwrap();
    assert!((&boxed.x - dvector![0.5, 0.25, 0.75]).amax() < 1e-9);
    assert!(bounds.contains_eps(&boxed.x, 1e-9));
}

#[test]
fn trivial_level_with_bounds_lands_on_the_box() {
    let bounds = Bounds::new(dvector![0.2, -1.0], dvector![1.0, 1.0]).unwrap();
    let sol = LexSolver::default()
        .solve(&[QuadraticObjective::zeros(2)], Some(&bounds))
        .unwrap();
    assert!((&sol.x - dvector![0.2, 0.0]).amax() < 1e-12);
    assert_eq!(sol.free_dims, 2);
}

#[test]
fn trivial_level_keeps_a_boxed_solution_on_a_rotated_null_space() {
    // Level 0 fixes x₀ + x₁ = 1 and x₂ = 0.5; its free direction (1, -1, 0)/√2
    // is not a coordinate axis.
    let a = obj(
        dmatrix![1.0, 1.0, 0.0; 1.0, 1.0, 0.0; 0.0, 0.0, 1.0],
        dvector![-1.0, -1.0, -0.5],
    );
    let bounds = Bounds::new(dvector![0.7, 0.0, 0.0], dvector![1.0, 0.25, 1.0]).unwrap();
    for method in Factorization::ALL {
        let solver = LexSolver::new(LexCfg::with_method(method));
        let alone = solver.solve(&[a.clone()], Some(&bounds)).unwrap();
        assert!((&alone.x - dvector![0.75, 0.25, 0.5]).amax() < 1e-8, "{method}");
        assert!(bounds.contains_eps(&alone.x, 1e-9), "{method}");
        assert_eq!(alone.free_dims, 1, "{method}");

        let padded = solver
            .solve(&[a.clone(), QuadraticObjective::zeros(3)], Some(&bounds))
            .unwrap();
        assert_eq!(padded.x, alone.x, "{method}");
        assert_eq!(padded.levels[1].step_norm, 0.0, "{method}");
    }
}

struct Counting {
    inner: QrBackend,
    calls: Arc<AtomicUsize>,
}

impl NullSpaceBackend for Counting {
    fn name(&self) -> &'static str {
        "counting-qr"
    }

    fn decompose(
        &self,
        h: &DMatrix<f64>,
        rhs: &DVector<f64>,
        cfg: &NullSpaceCfg,
    ) -> Result<AffineSolution, FactorizationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.decompose(h, rhs, cfg)
    }
}

#[test]
fn custom_backend_is_called_once_per_processed_level() {
    let calls = Arc::new(AtomicUsize::new(0));
    let solver = LexSolver::with_backend(
        NullSpaceCfg::default(),
        Box::new(Counting {
            inner: QrBackend,
            calls: Arc::clone(&calls),
        }),
    );
    assert_eq!(solver.backend_name(), "counting-qr");
    let objectives = [
        obj(dmatrix![1.0, 0.0; 0.0, 0.0], dvector![1.0, 0.0]),
        obj(DMatrix::identity(2, 2), dvector![0.0, 1.0]),
        obj(DMatrix::identity(2, 2), dvector![7.0, 7.0]),
    ];
    let sol = solver.solve(&objectives, None).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(sol.early_exit, Some(1));
    assert!((&sol.x - dvector![-1.0, -1.0]).amax() < 1e-12);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn trivial_levels_do_not_move_the_solution(
        n in 3usize..10,
        k in 1usize..4,
        pos_frac in 0.0f64..1.0,
        seed in any::<u64>(),
    ) {
        let objectives = layered_objectives(n, k, seed);
        let base = LexSolver::default().solve(&objectives, None).unwrap();
        let pos = ((objectives.len() + 1) as f64 * pos_frac) as usize;
        let mut padded = objectives.clone();
        padded.insert(pos.min(objectives.len()), QuadraticObjective::zeros(n));
        let with_zero = LexSolver::default().solve(&padded, None).unwrap();
        prop_assert!((&with_zero.x - &base.x).amax() < 1e-8);
    }

    #[test]
    fn free_space_never_grows(n in 2usize..12, k in 1usize..5, seed in any::<u64>()) {
        let objectives = layered_objectives(n, k, seed);
        let sol = LexSolver::default().solve(&objectives, None).unwrap();
        let mut prev = n;
        for report in &sol.levels {
            prop_assert_eq!(report.free_before, prev);
            prop_assert!(report.free_after <= report.free_before);
            prev = report.free_after;
        }
        prop_assert_eq!(prev, sol.free_dims);
    }

    #[test]
    fn each_level_is_stationary_on_its_feasible_set(n in 3usize..10, k in 1usize..4, seed in any::<u64>()) {
        // Re-derive the free space of every prefix and check the restricted gradient.
        let objectives = layered_objectives(n, k, seed);
        let x = LexSolver::default().solve(&objectives, None).unwrap().x;
        let mut basis = DMatrix::identity(n, n);
        for o in &objectives {
            let grad = basis.transpose() * o.gradient(&x);
            let hr = basis.transpose() * &o.h * &basis;
            // Stationary up to the range of the restricted form.
            prop_assert!((&hr * grad).amax() < 1e-7);
            let next = crate::null_space::affine_null_space(
                &SvdBackend,
                &hr,
                &DVector::zeros(basis.ncols()),
                None,
                &NullSpaceCfg::default(),
            )
            .unwrap()
            .basis;
            if next.ncols() == 0 {
                break;
            }
            basis = &basis * next;
        }
    }
}

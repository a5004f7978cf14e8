//! # 生命周期行为集成测试
//!
//! 覆盖状态机对外承诺的行为：空操作、完成、单调进度、反向连续、
//! 默认过渡、退化过渡以及销毁后不再推进。

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use lifecycle_runtime::{
    Easing, Lifecycle, LifecycleDriver, ManualScheduler, Phase, TransitionSpec, Vector,
    extrapolate_alpha, interpolate,
};

fn x(value: f64) -> Vector {
    Vector::new().with("x", value)
}

/// 带完成计数的 A(0) ↔ B(100) 生命周期
fn counted(easing: Easing, duration_ms: f64) -> (Lifecycle, Rc<Cell<u32>>) {
    let fired = Rc::new(Cell::new(0));
    let counter = fired.clone();
    let lifecycle = Lifecycle::builder()
        .state("a", x(0.0))
        .state("b", x(100.0))
        .transition(
            "a",
            TransitionSpec::to("b")
                .with_duration(duration_ms)
                .with_easing(easing),
        )
        .transition(
            "b",
            TransitionSpec::to("a")
                .with_duration(duration_ms)
                .with_easing(easing),
        )
        .on_complete("a", "b", move || counter.set(counter.get() + 1))
        .build()
        .unwrap();
    (lifecycle, fired)
}

#[test]
fn test_noop_transition_is_idempotent() {
    let (mut lifecycle, fired) = counted(Easing::Linear, 1000.0);
    let before = lifecycle.output().clone();

    lifecycle.set_state("a").unwrap();
    assert_eq!(lifecycle.phase(), Phase::Idle);
    assert_eq!(lifecycle.output(), &before);
    assert_eq!(lifecycle.current_state(), "a");
    assert_eq!(lifecycle.alpha(), 0.0);
    assert_eq!(fired.get(), 0);
}

#[test]
fn test_completion_invariant() {
    let deltas: &[&[f64]] = &[
        &[1000.0],
        &[16.0; 63],
        &[333.0, 1.0, 700.0],
        &[5000.0],
        &[100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0],
    ];

    for sequence in deltas {
        let (mut lifecycle, fired) = counted(Easing::EaseOutQuart, 1000.0);
        lifecycle.set_state("b").unwrap();
        for delta in *sequence {
            lifecycle.advance(*delta);
        }
        let total: f64 = sequence.iter().sum();
        assert!(total >= 1000.0);
        assert_eq!(lifecycle.output(), &x(100.0));
        assert_eq!(fired.get(), 1);
        assert_eq!(lifecycle.phase(), Phase::Idle);
    }
}

#[test]
fn test_alpha_is_monotonic_and_bounded() {
    let (mut lifecycle, _) = counted(Easing::EaseInOutCubic, 500.0);
    lifecycle.set_state("b").unwrap();

    let mut last = 0.0;
    for delta in [7.0, 16.0, 33.0, 0.0, 120.0, 16.0, 16.0, 250.0] {
        lifecycle.advance(delta);
        let alpha = lifecycle.alpha();
        if lifecycle.phase() == Phase::Idle {
            break;
        }
        assert!(alpha >= last);
        assert!((0.0..=1.0).contains(&alpha));
        last = alpha;
    }
}

#[test]
fn test_reversal_continuity() {
    let (mut lifecycle, fired) = counted(Easing::Linear, 1000.0);
    lifecycle.set_state("b").unwrap();
    lifecycle.advance(500.0);
    assert_eq!(lifecycle.output().get("x"), Some(50.0));

    lifecycle.set_state("a").unwrap();
    assert_eq!(lifecycle.output().get("x"), Some(50.0));

    lifecycle.advance(500.0);
    assert_eq!(lifecycle.output(), &x(0.0));
    // b → a 没有回调
    assert_eq!(fired.get(), 0);
}

#[test]
fn test_interpolation_correctness() {
    let from = Vector::new().with("x", 0.0).with("y", 10.0);
    let to = Vector::new().with("x", 10.0).with("y", 0.0);
    assert_eq!(
        interpolate(&from, &to, 0.5),
        Vector::new().with("x", 5.0).with("y", 5.0)
    );
}

#[test]
fn test_extrapolation_round_trip() {
    let from = Vector::new().with("x", -40.0).with("y", 3.0);
    let to = Vector::new().with("x", 60.0).with("y", 7.0);
    for a in [0.0, 0.25, 0.5, 0.75, 1.0] {
        let observed = interpolate(&from, &to, a);
        // 交换两端得到正向进度
        let recovered = extrapolate_alpha(&to, &from, &observed);
        assert!((recovered - a).abs() < 1e-9, "a = {a}, recovered = {recovered}");
    }
}

#[test]
fn test_degenerate_transition() {
    let mut lifecycle = Lifecycle::builder()
        .state("a", x(0.0))
        .state("b", x(100.0))
        .state("c", x(100.0))
        .transition("b", TransitionSpec::to("c").with_duration(1e9))
        .build()
        .unwrap();
    lifecycle.set_state("b").unwrap();
    lifecycle.advance(1000.0);
    assert_eq!(lifecycle.output(), &x(100.0));

    lifecycle.set_state("c").unwrap();
    assert_eq!(lifecycle.advance(16.0), Phase::Idle);
    assert_eq!(lifecycle.current_state(), "c");
}

#[test]
fn test_unregistered_transition_uses_default() {
    let mut lifecycle = Lifecycle::builder()
        .state("a", x(0.0))
        .state("b", x(100.0))
        .build()
        .unwrap();
    lifecycle.set_state("b").unwrap();

    let resolved = lifecycle.active_transition().unwrap();
    assert_eq!(resolved.duration_ms, 1000.0);
    assert_eq!(resolved.easing, Easing::EaseOutQuart);

    lifecycle.advance(500.0);
    let expected = 100.0 * Easing::EaseOutQuart.forward(0.5);
    let actual = lifecycle.output().get("x").unwrap();
    assert!((actual - expected).abs() < 1e-9);
    assert!((actual - 50.0).abs() > 1.0, "不应是线性插值");
}

#[test]
fn test_teardown_stops_frames() {
    let (lifecycle, fired) = counted(Easing::Linear, 100.0);
    let mut driver = LifecycleDriver::new(lifecycle, ManualScheduler::new());
    let updates = Rc::new(RefCell::new(0));
    let sink = updates.clone();
    driver.subscribe(move |_| *sink.borrow_mut() += 1);

    driver.mount();
    driver.set_state("b").unwrap();
    driver.on_frame(0.0);
    driver.on_frame(40.0);
    let frozen = driver.output().clone();
    assert_eq!(*updates.borrow(), 1);

    driver.teardown();
    for t in [80.0, 120.0, 400.0] {
        driver.on_frame(t);
    }
    assert_eq!(driver.output(), &frozen);
    assert_eq!(fired.get(), 0);
    assert_eq!(*updates.borrow(), 1);
}

#[test]
fn test_driver_clamps_long_frame() {
    let lifecycle = Lifecycle::builder()
        .state("a", x(0.0))
        .state("b", x(100.0))
        .transition(
            "a",
            TransitionSpec::to("b")
                .with_duration(4000.0)
                .with_easing(Easing::Linear),
        )
        .build()
        .unwrap();
    let mut driver = LifecycleDriver::new(lifecycle, ManualScheduler::new());
    driver.set_state("b").unwrap();
    driver.on_frame(0.0);
    // 后台恢复：一帧 60 秒，被限制为 1 秒
    driver.on_frame(60_000.0);
    assert_eq!(driver.output(), &x(25.0));
}

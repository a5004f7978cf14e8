//! # Simulate 模块
//!
//! headless 模拟：按固定帧率喂入时间戳，在指定时刻请求状态，记录每一帧输出的向量。

use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;

use anyhow::{Context, bail};
use lifecycle_runtime::{LifecycleDecl, LifecycleDriver, ManualScheduler, Phase, Vector};
use serde::Serialize;
use tracing::info;

/// 在某一时刻请求某个状态
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// 请求时刻（毫秒）
    pub at_ms: f64,
    /// 目标状态
    pub state: String,
}

impl FromStr for Request {
    type Err = String;

    /// 解析 `MS:STATE`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (at, state) = s
            .split_once(':')
            .ok_or_else(|| format!("请求格式应为 MS:STATE，实际为 '{s}'"))?;
        let at_ms: f64 = at
            .trim()
            .parse()
            .map_err(|_| format!("无效的请求时刻 '{at}'"))?;
        let state = state.trim();
        if !(at_ms.is_finite() && at_ms >= 0.0) || state.is_empty() {
            return Err(format!("无效的请求 '{s}'"));
        }
        Ok(Self {
            at_ms,
            state: state.to_string(),
        })
    }
}

/// 模拟参数
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    /// 帧率
    pub fps: u32,
    /// 模拟结束时刻（毫秒）
    pub until_ms: f64,
    /// 状态请求
    pub requests: Vec<Request>,
}

/// 一帧输出
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    /// 帧时间戳（毫秒）
    pub t: f64,
    /// 最近一次请求的状态
    pub state: String,
    /// 推进后的阶段
    pub phase: Phase,
    /// 输出向量
    pub vector: Vector,
}

/// 运行模拟
pub fn simulate(decl: LifecycleDecl, plan: &SimulationPlan) -> anyhow::Result<Vec<Sample>> {
    if plan.fps == 0 {
        bail!("帧率必须大于 0");
    }

    let lifecycle = decl.into_builder().build().context("生命周期声明无效")?;
    let mut driver = LifecycleDriver::new(lifecycle, ManualScheduler::new());

    let emitted: Rc<RefCell<Vec<Vector>>> = Rc::default();
    let sink = emitted.clone();
    driver.subscribe(move |v| sink.borrow_mut().push(v.clone()));
    driver.mount();

    let mut requests = plan.requests.clone();
    requests.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));
    let mut requests = requests.into_iter().peekable();

    let interval = 1000.0 / plan.fps as f64;
    let frames = (plan.until_ms / interval).floor() as u64;
    let mut samples = Vec::new();

    for i in 0..=frames {
        let t = i as f64 * interval;

        while let Some(request) = requests.next_if(|r| r.at_ms <= t) {
            info!(t, state = %request.state, "请求状态");
            driver
                .set_state(&request.state)
                .with_context(|| format!("{}ms 处的请求失败", request.at_ms))?;
        }

        if !driver.clock_mut().scheduler_mut().take_pending() {
            continue;
        }
        driver.on_frame(t);

        for vector in emitted.borrow_mut().drain(..) {
            samples.push(Sample {
                t,
                state: driver.lifecycle().current_state().to_string(),
                phase: driver.lifecycle().phase(),
                vector,
            });
        }
    }

    if let Some(request) = requests.next() {
        info!(at_ms = request.at_ms, "请求时刻晚于模拟结束时刻，已忽略");
    }

    driver.teardown();
    Ok(samples)
}

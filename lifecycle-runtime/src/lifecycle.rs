//! # Lifecycle 模块
//!
//! 生命周期状态机：在声明的状态之间插值动画，支持中途改变目标。
//!
//! ## 状态
//!
//! - `Idle`: 没有活跃过渡，输出向量等于当前状态的声明向量
//! - `Animating`: 进度 `alpha` 在活跃过渡的缓动曲线上从 0 推进到 1
//!
//! ## 中途改变目标
//!
//! 动画进行中请求回到正在离开的状态时，不会跳变：
//! 1. 从当前显示的向量反推出它在 旧目标 → 旧起点 方向上的缓动进度
//! 2. 用新过渡的缓动反函数换算回时间进度
//! 3. 新起点为旧目标，新目标为请求的状态，从换算出的进度继续
//!
//! 请求第三个状态时，从当前显示的向量重新开始（`alpha = 0`）。
//! 两种情况下，改变目标的瞬间输出向量都保持不变。

use serde::Serialize;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{LifecycleResult, UsageError};
use crate::states::{DEFAULT_STATE, StateSet};
use crate::transition::{ResolvedTransition, TransitionSpec, TransitionTable};
use crate::vector::{Vector, extrapolate_alpha, interpolate, vectors_equal};

/// 状态机阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// 空闲
    #[default]
    Idle,
    /// 动画中
    Animating,
}

/// 生命周期事件
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    /// 从空闲开始过渡
    Started { from: String, to: String },
    /// 动画中途改变目标
    Retargeted { from: String, to: String, alpha: f64 },
    /// 过渡完成
    Completed { from: String, to: String },
}

/// 活跃过渡
#[derive(Debug, Clone)]
struct ActiveTransition {
    /// 描述所属的源状态
    from: String,
    /// 目标状态
    to: String,
    /// 目标向量
    target_vector: Vector,
    /// 时长与缓动
    resolved: ResolvedTransition,
}

/// 生命周期状态机
///
/// 单线程、单所有者：由持有者在每帧调用 [`advance`](Self::advance) 推进。
#[derive(Debug)]
pub struct Lifecycle {
    states: StateSet,
    transitions: TransitionTable,
    engine: EngineConfig,
    /// 最近一次请求的状态
    current: String,
    /// 动画离开的状态
    prior_state: String,
    /// 动画离开的向量
    prior_vector: Vector,
    active: Option<ActiveTransition>,
    /// 时间进度（缓动前）
    alpha: f64,
    /// 活跃过渡已经过的时间（毫秒），`alpha = elapsed / duration`
    elapsed_ms: f64,
    /// 缓动进度
    eased: f64,
    /// 当前输出向量
    output: Vector,
    mounted: bool,
    events: Vec<LifecycleEvent>,
}

impl Lifecycle {
    /// 创建构建器
    pub fn builder() -> LifecycleBuilder {
        LifecycleBuilder::new()
    }

    /// 由已校验的状态集合创建
    pub fn new(
        states: StateSet,
        transitions: TransitionTable,
        engine: EngineConfig,
    ) -> LifecycleResult<Self> {
        engine.validate()?;
        transitions.validate(&states)?;

        let (initial, vector) = states.initial();
        let initial = initial.to_string();
        let vector = vector.clone();

        Ok(Self {
            current: initial.clone(),
            prior_state: initial,
            prior_vector: vector.clone(),
            output: vector,
            states,
            transitions,
            engine,
            active: None,
            alpha: 0.0,
            elapsed_ms: 0.0,
            eased: 0.0,
            mounted: false,
            events: Vec::new(),
        })
    }

    /// 首次激活
    ///
    /// 同时声明了 `mount` 与 `default` 时自动请求 `mount` → `default`。
    /// 重复调用不做任何事。
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;

        if !self.states.animates_on_mount() {
            return;
        }
        if let Some(target) = self.states.get(DEFAULT_STATE).cloned() {
            self.request(DEFAULT_STATE, target);
        }
    }

    /// 请求过渡到指定状态
    ///
    /// # 错误
    /// 状态未声明时返回 [`UsageError::UnknownState`]。
    pub fn set_state(&mut self, name: &str) -> LifecycleResult<()> {
        let Some(target) = self.states.get(name).cloned() else {
            return Err(UsageError::UnknownState {
                name: name.to_string(),
            }
            .into());
        };
        self.request(name, target);
        Ok(())
    }

    fn request(&mut self, name: &str, target_vector: Vector) {
        if name == self.current {
            return;
        }

        match self.active.take() {
            None => {
                let from = self.current.clone();
                let resolved = self.transitions.resolve(&from, name, &self.engine);
                debug!(
                    from = %from,
                    to = %name,
                    duration_ms = resolved.duration_ms,
                    easing = %resolved.easing,
                    "过渡开始"
                );

                self.prior_state = from.clone();
                self.prior_vector = self.output.clone();
                self.alpha = 0.0;
                self.elapsed_ms = 0.0;
                self.eased = 0.0;
                self.events.push(LifecycleEvent::Started {
                    from: from.clone(),
                    to: name.to_string(),
                });
                self.active = Some(ActiveTransition {
                    from,
                    to: name.to_string(),
                    target_vector,
                    resolved,
                });
            }
            Some(old) => {
                let resolved = self.transitions.resolve(&old.to, name, &self.engine);

                // 只有起点仍是该状态的声明向量时，显示位置才落在反向路径上
                let reversing = name == self.prior_state
                    && self
                        .states
                        .get(name)
                        .is_some_and(|declared| vectors_equal(&self.prior_vector, declared));

                if reversing {
                    // 反向：从显示位置反推进度，继续沿反方向推进
                    let eased =
                        extrapolate_alpha(&self.prior_vector, &old.target_vector, &self.output);
                    self.alpha = resolved.easing.inverse(eased);
                    self.eased = eased;
                    self.prior_vector = old.target_vector;
                } else {
                    self.alpha = 0.0;
                    self.eased = 0.0;
                    self.prior_vector = self.output.clone();
                }
                self.elapsed_ms = self.alpha * resolved.duration_ms;
                self.prior_state = old.to.clone();

                debug!(
                    from = %old.to,
                    to = %name,
                    alpha = self.alpha,
                    "过渡中途改变目标"
                );
                self.events.push(LifecycleEvent::Retargeted {
                    from: old.to.clone(),
                    to: name.to_string(),
                    alpha: self.alpha,
                });
                self.active = Some(ActiveTransition {
                    from: old.to,
                    to: name.to_string(),
                    target_vector,
                    resolved,
                });
            }
        }

        self.current = name.to_string();
    }

    /// 推进一帧
    ///
    /// # 返回
    /// 推进后的阶段；返回 `Idle` 表示不再需要帧。
    pub fn advance(&mut self, delta_ms: f64) -> Phase {
        let Some(active) = self.active.as_ref() else {
            return Phase::Idle;
        };

        if vectors_equal(&self.prior_vector, &active.target_vector) {
            debug!(from = %active.from, to = %active.to, "起点与目标相同，立即完成");
            self.complete();
            return Phase::Idle;
        }

        // alpha 始终由累计时间换算
        if delta_ms.is_finite() && delta_ms > 0.0 {
            self.elapsed_ms += delta_ms;
        }
        self.alpha = (self.elapsed_ms / active.resolved.duration_ms).clamp(0.0, 1.0);
        self.eased = active.resolved.easing.forward(self.alpha);
        self.output = interpolate(&self.prior_vector, &active.target_vector, self.eased);

        if self.alpha >= 1.0 {
            self.complete();
            return Phase::Idle;
        }

        Phase::Animating
    }

    fn complete(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        self.transitions.fire_on_complete(&active.from, &active.to);
        debug!(from = %active.from, to = %active.to, "过渡完成");

        self.output = active.target_vector.clone();
        self.prior_state = active.to.clone();
        self.prior_vector = active.target_vector;
        self.alpha = 0.0;
        self.elapsed_ms = 0.0;
        self.eased = 0.0;
        self.events.push(LifecycleEvent::Completed {
            from: active.from,
            to: active.to,
        });
    }

    // ========== 查询方法 ==========

    /// 当前阶段
    pub fn phase(&self) -> Phase {
        if self.active.is_some() {
            Phase::Animating
        } else {
            Phase::Idle
        }
    }

    /// 是否在动画中
    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }

    /// 是否已激活
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// 最近一次请求的状态
    pub fn current_state(&self) -> &str {
        &self.current
    }

    /// 动画离开的状态
    pub fn prior_state(&self) -> &str {
        &self.prior_state
    }

    /// 动画离开的向量
    pub fn prior_vector(&self) -> &Vector {
        &self.prior_vector
    }

    /// 动画目标状态（空闲时为 `None`）
    pub fn target_state(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.to.as_str())
    }

    /// 动画目标向量（空闲时为 `None`）
    pub fn target_vector(&self) -> Option<&Vector> {
        self.active.as_ref().map(|a| &a.target_vector)
    }

    /// 活跃过渡的时长与缓动（空闲时为 `None`）
    pub fn active_transition(&self) -> Option<ResolvedTransition> {
        self.active.as_ref().map(|a| a.resolved)
    }

    /// 时间进度（缓动前）
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// 缓动进度
    pub fn eased_value(&self) -> f64 {
        self.eased
    }

    /// 当前输出向量
    pub fn output(&self) -> &Vector {
        &self.output
    }

    /// 声明的状态
    pub fn states(&self) -> &StateSet {
        &self.states
    }

    /// 过渡表
    pub fn transitions(&self) -> &TransitionTable {
        &self.transitions
    }

    /// 引擎配置
    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    /// 取出并清空事件队列
    pub fn take_events(&mut self) -> Vec<LifecycleEvent> {
        std::mem::take(&mut self.events)
    }
}

/// 生命周期构建器
///
/// 校验全部在 [`build`](Self::build) 中进行。
#[derive(Debug, Default)]
pub struct LifecycleBuilder {
    states: Vec<(String, Vector)>,
    transitions: TransitionTable,
    engine: EngineConfig,
}

impl LifecycleBuilder {
    /// 创建空构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 声明状态
    pub fn state(mut self, name: impl Into<String>, vector: Vector) -> Self {
        self.states.push((name.into(), vector));
        self
    }

    /// 登记过渡描述
    pub fn transition(mut self, from: impl Into<String>, spec: TransitionSpec) -> Self {
        self.transitions.insert(from, spec);
        self
    }

    /// 设置过渡完成回调
    pub fn on_complete(
        mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        callback: impl FnMut() + 'static,
    ) -> Self {
        self.transitions.set_on_complete(from, to, Box::new(callback));
        self
    }

    /// 设置引擎配置
    pub fn engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// 校验并创建生命周期
    pub fn build(self) -> LifecycleResult<Lifecycle> {
        let states = StateSet::new(self.states)?;
        Lifecycle::new(states, self.transitions, self.engine)
    }
}

//! # Driver 模块
//!
//! 把 [`Lifecycle`] 绑定到 [`FrameClock`]：
//! - 有活跃过渡时启动时钟，过渡结束后时钟自行停止
//! - 每帧推进状态机，并把新的输出向量推送给订阅者
//! - `teardown()` 同步取消时钟，之后的帧不再改变任何状态，也不会触发完成回调

use tracing::debug;

use crate::clock::{FrameClock, FrameControl, FrameScheduler};
use crate::error::{LifecycleResult, UsageError};
use crate::lifecycle::{Lifecycle, LifecycleEvent, Phase};
use crate::vector::Vector;

/// 输出向量监听器
pub type VectorListener = Box<dyn FnMut(&Vector)>;

/// 生命周期驱动器
pub struct LifecycleDriver<S: FrameScheduler> {
    lifecycle: Lifecycle,
    clock: FrameClock<S>,
    listener: Option<VectorListener>,
    torn_down: bool,
}

impl<S: FrameScheduler> std::fmt::Debug for LifecycleDriver<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleDriver")
            .field("lifecycle", &self.lifecycle)
            .field("clock_running", &self.clock.is_animating())
            .field("torn_down", &self.torn_down)
            .finish()
    }
}

impl<S: FrameScheduler> LifecycleDriver<S> {
    /// 创建驱动器
    ///
    /// 时钟的单帧 delta 上限取自生命周期的引擎配置。
    pub fn new(lifecycle: Lifecycle, scheduler: S) -> Self {
        let max_delta = lifecycle.engine().max_frame_delta_ms;
        Self {
            lifecycle,
            clock: FrameClock::new(scheduler).with_max_delta(max_delta),
            listener: None,
            torn_down: false,
        }
    }

    /// 订阅每帧的输出向量
    pub fn subscribe(&mut self, listener: impl FnMut(&Vector) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// 首次激活（挂载）
    pub fn mount(&mut self) {
        if self.torn_down {
            return;
        }
        self.lifecycle.mount();
        self.sync_clock();
    }

    /// 请求过渡到指定状态
    ///
    /// 销毁后只校验状态名，不再推进。
    pub fn set_state(&mut self, name: &str) -> LifecycleResult<()> {
        if !self.lifecycle.states().contains(name) {
            return Err(UsageError::UnknownState {
                name: name.to_string(),
            }
            .into());
        }
        if self.torn_down {
            debug!(state = %name, "驱动器已销毁，忽略状态请求");
            return Ok(());
        }
        self.lifecycle.set_state(name)?;
        self.sync_clock();
        Ok(())
    }

    /// 宿主帧回调
    pub fn on_frame(&mut self, timestamp_ms: f64) {
        if self.torn_down {
            return;
        }

        let lifecycle = &mut self.lifecycle;
        let listener = &mut self.listener;
        self.clock.on_frame(timestamp_ms, |time| {
            let phase = lifecycle.advance(time.delta_ms);
            if let Some(listener) = listener.as_mut() {
                listener(lifecycle.output());
            }
            match phase {
                Phase::Animating => FrameControl::Continue,
                Phase::Idle => FrameControl::Stop,
            }
        });
    }

    /// 销毁：同步取消时钟并丢弃监听器
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        debug!(state = %self.lifecycle.current_state(), "生命周期驱动器销毁");
        self.clock.cancel();
        self.listener = None;
        self.torn_down = true;
    }

    /// 有活跃过渡而时钟未运行时启动时钟
    fn sync_clock(&mut self) {
        if self.lifecycle.is_animating() && !self.clock.is_animating() {
            self.clock.begin();
        }
    }

    // ========== 查询方法 ==========

    /// 当前输出向量
    pub fn output(&self) -> &Vector {
        self.lifecycle.output()
    }

    /// 状态机
    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    /// 帧时钟
    pub fn clock(&self) -> &FrameClock<S> {
        &self.clock
    }

    /// 帧时钟（可变，用于宿主访问调度器）
    pub fn clock_mut(&mut self) -> &mut FrameClock<S> {
        &mut self.clock
    }

    /// 是否已销毁
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// 取出状态机事件
    pub fn take_events(&mut self) -> Vec<LifecycleEvent> {
        self.lifecycle.take_events()
    }
}

impl<S: FrameScheduler> Drop for LifecycleDriver<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

//! # Clock 模块
//!
//! 帧时钟：每次显示刷新调用一次回调，提供自启动以来的时间与帧间隔。
//!
//! 帧调度本身由宿主提供（[`FrameScheduler`]），时钟只负责：
//! - 记录首帧时间戳与上一帧时间戳
//! - 计算 `offset_ms` / `delta_ms`
//! - 根据回调返回值决定继续请求下一帧还是停止
//!
//! 首帧只建立起始时间戳，不调用回调。

use tracing::{debug, trace};

/// 宿主提供的帧调度原语
pub trait FrameScheduler {
    /// 请求在下一帧调用 `FrameClock::on_frame`
    fn request_frame(&mut self);

    /// 取消尚未触发的帧请求
    fn cancel_frame(&mut self);
}

/// 单帧时间信息
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// 自时钟启动（首帧）以来的时间（毫秒）
    pub offset_ms: f64,
    /// 距上一帧的时间（毫秒，可能已被限制）
    pub delta_ms: f64,
}

/// 帧回调的返回值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameControl {
    /// 继续请求下一帧
    #[default]
    Continue,
    /// 停止时钟
    Stop,
}

/// 帧时钟
#[derive(Debug)]
pub struct FrameClock<S: FrameScheduler> {
    /// 帧调度器
    scheduler: S,
    /// 是否已启动
    running: bool,
    /// 首帧时间戳
    first_frame: Option<f64>,
    /// 上一帧时间戳
    previous_frame: Option<f64>,
    /// 单帧 delta 上限
    max_delta_ms: Option<f64>,
}

impl<S: FrameScheduler> FrameClock<S> {
    /// 创建帧时钟（未启动）
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            running: false,
            first_frame: None,
            previous_frame: None,
            max_delta_ms: None,
        }
    }

    /// 设置单帧 delta 上限
    pub fn with_max_delta(mut self, max_delta_ms: Option<f64>) -> Self {
        self.max_delta_ms = max_delta_ms;
        self
    }

    /// 启动时钟
    ///
    /// 已在运行时不做任何事；需要重新计时的调用方应先 `cancel()`。
    pub fn begin(&mut self) {
        if self.running {
            return;
        }
        debug!("帧时钟启动");
        self.running = true;
        self.scheduler.request_frame();
    }

    /// 停止时钟并清空计时状态
    ///
    /// 未运行时调用是安全的。
    pub fn cancel(&mut self) {
        if self.running {
            debug!("帧时钟停止");
            self.scheduler.cancel_frame();
        }
        self.running = false;
        self.first_frame = None;
        self.previous_frame = None;
    }

    /// 是否正在运行
    pub fn is_animating(&self) -> bool {
        self.running
    }

    /// 处理一帧
    ///
    /// 由宿主在帧触发时调用。时钟未运行时忽略。
    pub fn on_frame<F>(&mut self, timestamp_ms: f64, callback: F)
    where
        F: FnOnce(FrameTime) -> FrameControl,
    {
        if !self.running {
            return;
        }

        let (Some(first), Some(previous)) = (self.first_frame, self.previous_frame) else {
            // 首帧：只记录时间戳
            self.first_frame = Some(timestamp_ms);
            self.previous_frame = Some(timestamp_ms);
            self.scheduler.request_frame();
            return;
        };

        let mut delta_ms = (timestamp_ms - previous).max(0.0);
        if let Some(max) = self.max_delta_ms {
            if delta_ms > max {
                trace!(delta_ms, max, "帧间隔过大，已限制");
                delta_ms = max;
            }
        }
        self.previous_frame = Some(timestamp_ms);

        let time = FrameTime {
            offset_ms: timestamp_ms - first,
            delta_ms,
        };

        match callback(time) {
            FrameControl::Continue => self.scheduler.request_frame(),
            FrameControl::Stop => self.cancel(),
        }
    }

    /// 获取调度器引用
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// 获取调度器可变引用
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}

/// 手动帧调度器
///
/// 只记录是否有待触发的帧，由宿主（测试、headless 模拟）自行推进时间。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualScheduler {
    /// 是否有待触发的帧
    pending: bool,
    /// 累计请求次数
    requests: u64,
}

impl ManualScheduler {
    /// 创建调度器
    pub fn new() -> Self {
        Self::default()
    }

    /// 是否有待触发的帧
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// 累计请求次数
    pub fn requests(&self) -> u64 {
        self.requests
    }

    /// 取走待触发的帧
    ///
    /// # 返回
    /// 之前是否有待触发的帧
    pub fn take_pending(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) {
        self.pending = true;
        self.requests += 1;
    }

    fn cancel_frame(&mut self) {
        self.pending = false;
    }
}

//! # Lifecycle Runtime
//!
//! 带键的动画生命周期引擎。
//!
//! ## 架构概述
//!
//! 调用方声明一组命名状态（每个状态是一组命名数值字段），以及可选的过渡描述。
//! 引擎在状态之间插值出单一的输出向量，支持在动画中途改变目标而不产生跳变。
//!
//! `lifecycle-runtime` 是纯逻辑核心，不依赖渲染或帧调度实现：
//!
//! ```text
//! Host                               Runtime
//!   │                                   │
//!   │──── set_state(name) ────────────►│
//!   │──── on_frame(timestamp) ────────►│ FrameClock → Lifecycle::advance
//!   │◄─── listener(&Vector) ───────────│
//!   │                                   │
//! ```
//!
//! ## 核心类型
//!
//! - [`Lifecycle`]：状态机本体，按帧间隔推进
//! - [`LifecycleDriver`]：把状态机绑定到帧时钟
//! - [`FrameClock`] / [`FrameScheduler`]：帧时钟与宿主帧调度接口
//! - [`Easing`]：带反函数的缓动曲线
//! - [`Vector`]：命名数值向量
//! - [`LifecycleDecl`]：可从 JSON 加载的声明
//!
//! ## 使用示例
//!
//! ```ignore
//! use lifecycle_runtime::{Lifecycle, LifecycleDriver, ManualScheduler, Vector};
//!
//! let lifecycle = Lifecycle::builder()
//!     .state("mount", Vector::new().with("opacity", 0.0))
//!     .state("default", Vector::new().with("opacity", 1.0))
//!     .build()?;
//!
//! let mut driver = LifecycleDriver::new(lifecycle, ManualScheduler::new());
//! driver.subscribe(|v| render(v));
//! driver.mount();
//!
//! // 宿主每帧调用
//! driver.on_frame(now_ms);
//! ```
//!
//! ## 模块结构
//!
//! - [`easing`]：缓动曲线
//! - [`vector`]：向量与插值数学
//! - [`clock`]：帧时钟
//! - [`states`]：状态集合
//! - [`transition`]：过渡描述与过渡表
//! - [`lifecycle`]：状态机
//! - [`driver`]：帧驱动
//! - [`config`]：引擎配置与声明
//! - [`error`]：错误类型

pub mod clock;
pub mod config;
pub mod driver;
pub mod easing;
pub mod error;
pub mod lifecycle;
pub mod states;
pub mod transition;
pub mod vector;

// 重导出核心类型
pub use clock::{FrameClock, FrameControl, FrameScheduler, FrameTime, ManualScheduler};
pub use config::{EngineConfig, LifecycleDecl};
pub use driver::{LifecycleDriver, VectorListener};
pub use easing::{CustomEasing, Easing};
pub use error::{ConfigError, LifecycleError, LifecycleResult, UsageError};
pub use lifecycle::{Lifecycle, LifecycleBuilder, LifecycleEvent, Phase};
pub use states::{DEFAULT_STATE, MOUNT_STATE, StateSet};
pub use transition::{CompletionCallback, ResolvedTransition, TransitionSpec, TransitionTable};
pub use vector::{Vector, extrapolate_alpha, interpolate, vectors_equal};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_accessible() {
        let lifecycle = Lifecycle::builder()
            .state("mount", Vector::new().with("opacity", 0.0))
            .state("default", Vector::new().with("opacity", 1.0))
            .build()
            .unwrap();

        let mut driver = LifecycleDriver::new(lifecycle, ManualScheduler::new());
        driver.mount();
        assert_eq!(driver.lifecycle().phase(), Phase::Animating);
        assert_eq!(driver.lifecycle().active_transition().unwrap().easing, Easing::EaseOutQuart);
    }
}

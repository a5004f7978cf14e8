//! # Easing 模块
//!
//! 缓动曲线库。每条曲线都是一对函数：
//! - `forward`: 时间进度 → 缓动进度
//! - `inverse`: 缓动进度 → 时间进度
//!
//! 反向函数用于在动画中途改变目标时，从当前显示的位置恢复出时间进度。
//! 没有解析反函数的曲线使用二分法数值求解，只需保证视觉上连续。

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 数值反函数的二分迭代次数
const INVERSE_ITERATIONS: usize = 48;

/// 自定义缓动曲线
///
/// `inverse` 为 `None` 时使用数值反函数。
#[derive(Clone, Copy)]
pub struct CustomEasing {
    /// 曲线名称（用于日志与比较）
    pub name: &'static str,
    /// 正向函数
    pub forward: fn(f64) -> f64,
    /// 反向函数
    pub inverse: Option<fn(f64) -> f64>,
}

impl CustomEasing {
    /// 创建带解析反函数的自定义曲线
    pub fn new(name: &'static str, forward: fn(f64) -> f64, inverse: fn(f64) -> f64) -> Self {
        Self {
            name,
            forward,
            inverse: Some(inverse),
        }
    }

    /// 创建只有正向函数的自定义曲线
    pub fn forward_only(name: &'static str, forward: fn(f64) -> f64) -> Self {
        Self {
            name,
            forward,
            inverse: None,
        }
    }
}

impl fmt::Debug for CustomEasing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomEasing")
            .field("name", &self.name)
            .field("analytic_inverse", &self.inverse.is_some())
            .finish()
    }
}

impl PartialEq for CustomEasing {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// 缓动曲线
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    /// 线性（匀速）
    Linear,
    /// 二次缓入
    EaseInQuad,
    /// 二次缓出
    EaseOutQuad,
    /// 二次缓入缓出
    EaseInOutQuad,
    /// 三次缓入
    EaseInCubic,
    /// 三次缓出
    EaseOutCubic,
    /// 三次缓入缓出
    EaseInOutCubic,
    /// 四次缓入
    EaseInQuart,
    /// 四次缓出
    #[default]
    EaseOutQuart,
    /// 正弦缓入
    EaseInSine,
    /// 正弦缓出
    EaseOutSine,
    /// 正弦缓入缓出
    EaseInOutSine,
    /// 弹性缓出
    EaseOutElastic,
    /// 弹跳缓出
    EaseOutBounce,
    /// 自定义曲线（不可序列化）
    #[serde(skip)]
    Custom(CustomEasing),
}

impl Easing {
    /// 正向：时间进度 → 缓动进度
    ///
    /// 输入会被限制在 [0, 1]。
    pub fn forward(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Easing::Linear => t,
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::EaseInQuart => t.powi(4),
            Easing::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
            Easing::EaseInSine => 1.0 - (t * PI / 2.0).cos(),
            Easing::EaseOutSine => (t * PI / 2.0).sin(),
            Easing::EaseInOutSine => -((PI * t).cos() - 1.0) / 2.0,
            Easing::EaseOutElastic => ease_out_elastic(t),
            Easing::EaseOutBounce => ease_out_bounce(t),
            Easing::Custom(custom) => (custom.forward)(t),
        }
    }

    /// 反向：缓动进度 → 时间进度
    ///
    /// 对单调曲线满足 `inverse(forward(x)) ≈ x`。
    pub fn inverse(&self, y: f64) -> f64 {
        let y = y.clamp(0.0, 1.0);

        let t = match self {
            Easing::Linear => y,
            Easing::EaseInQuad => y.sqrt(),
            Easing::EaseOutQuad => 1.0 - (1.0 - y).sqrt(),
            Easing::EaseInOutQuad => {
                if y < 0.5 {
                    (y / 2.0).sqrt()
                } else {
                    1.0 - (2.0 * (1.0 - y)).sqrt() / 2.0
                }
            }
            Easing::EaseInCubic => y.cbrt(),
            Easing::EaseOutCubic => 1.0 - (1.0 - y).cbrt(),
            Easing::EaseInOutCubic => {
                if y < 0.5 {
                    (y / 4.0).cbrt()
                } else {
                    1.0 - (2.0 * (1.0 - y)).cbrt() / 2.0
                }
            }
            Easing::EaseInQuart => y.powf(0.25),
            Easing::EaseOutQuart => 1.0 - (1.0 - y).powf(0.25),
            Easing::EaseInSine => (1.0 - y).acos() * 2.0 / PI,
            Easing::EaseOutSine => y.asin() * 2.0 / PI,
            Easing::EaseInOutSine => (1.0 - 2.0 * y).acos() / PI,
            Easing::EaseOutElastic => numeric_inverse(ease_out_elastic, y),
            Easing::EaseOutBounce => numeric_inverse(ease_out_bounce, y),
            Easing::Custom(custom) => match custom.inverse {
                Some(inverse) => inverse(y),
                None => numeric_inverse(custom.forward, y),
            },
        };

        t.clamp(0.0, 1.0)
    }

    /// 曲线名称
    pub fn name(&self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::EaseInQuad => "easeInQuad",
            Easing::EaseOutQuad => "easeOutQuad",
            Easing::EaseInOutQuad => "easeInOutQuad",
            Easing::EaseInCubic => "easeInCubic",
            Easing::EaseOutCubic => "easeOutCubic",
            Easing::EaseInOutCubic => "easeInOutCubic",
            Easing::EaseInQuart => "easeInQuart",
            Easing::EaseOutQuart => "easeOutQuart",
            Easing::EaseInSine => "easeInSine",
            Easing::EaseOutSine => "easeOutSine",
            Easing::EaseInOutSine => "easeInOutSine",
            Easing::EaseOutElastic => "easeOutElastic",
            Easing::EaseOutBounce => "easeOutBounce",
            Easing::Custom(custom) => custom.name,
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 二分法求 `forward(t) = y` 的解
///
/// 假设 `forward(0) <= y <= forward(1)`；非单调曲线返回其中一个近似解。
fn numeric_inverse(forward: fn(f64) -> f64, y: f64) -> f64 {
    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    for _ in 0..INVERSE_ITERATIONS {
        let mid = (lo + hi) / 2.0;
        if forward(mid) < y {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    (lo + hi) / 2.0
}

/// 弹性缓出
fn ease_out_elastic(t: f64) -> f64 {
    if t == 0.0 {
        0.0
    } else if t == 1.0 {
        1.0
    } else {
        let c4 = (2.0 * PI) / 3.0;
        2.0_f64.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
    }
}

/// 弹跳缓出
fn ease_out_bounce(t: f64) -> f64 {
    let n1 = 7.5625;
    let d1 = 2.75;

    if t < 1.0 / d1 {
        n1 * t * t
    } else if t < 2.0 / d1 {
        let t = t - 1.5 / d1;
        n1 * t * t + 0.75
    } else if t < 2.5 / d1 {
        let t = t - 2.25 / d1;
        n1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / d1;
        n1 * t * t + 0.984375
    }
}

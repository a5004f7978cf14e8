//! # Config 模块
//!
//! 引擎配置与生命周期声明。
//!
//! 声明是 JSON 文档，描述状态、过渡以及引擎默认值：
//!
//! ```json
//! {
//!   "engine": { "default_duration_ms": 300, "max_frame_delta_ms": 1000 },
//!   "states": {
//!     "mount":   { "opacity": 0, "y": 20 },
//!     "default": { "opacity": 1, "y": 0 },
//!     "hidden":  { "opacity": 0, "y": -20 }
//!   },
//!   "transitions": {
//!     "default": [{ "to": "hidden", "duration": 200, "easing": "linear" }]
//!   }
//! }
//! ```
//!
//! `states` 与 `transitions` 保持文档中的顺序。完成回调无法在 JSON 中声明，
//! 需通过 [`LifecycleBuilder::on_complete`](crate::LifecycleBuilder::on_complete) 附加。

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::easing::Easing;
use crate::error::ConfigError;
use crate::lifecycle::LifecycleBuilder;
use crate::transition::TransitionSpec;
use crate::vector::Vector;

/// 引擎配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 未登记状态对的默认时长（毫秒）
    #[serde(default = "default_duration_ms")]
    pub default_duration_ms: f64,

    /// 未登记状态对的默认缓动曲线
    #[serde(default)]
    pub default_easing: Easing,

    /// 单帧 delta 上限（毫秒）
    ///
    /// 防止后台恢复后一帧跳完整个过渡。`null` 表示不限制。
    #[serde(default = "default_max_frame_delta_ms")]
    pub max_frame_delta_ms: Option<f64>,
}

// 默认值函数
fn default_duration_ms() -> f64 {
    1000.0
}

fn default_max_frame_delta_ms() -> Option<f64> {
    Some(1000.0)
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_duration_ms: default_duration_ms(),
            default_easing: Easing::default(),
            max_frame_delta_ms: default_max_frame_delta_ms(),
        }
    }
}

impl EngineConfig {
    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.default_duration_ms.is_finite() && self.default_duration_ms > 0.0) {
            return Err(ConfigError::InvalidEngine {
                message: format!("默认时长必须为正数，实际为 {}", self.default_duration_ms),
            });
        }

        if let Some(max) = self.max_frame_delta_ms {
            if !(max.is_finite() && max > 0.0) {
                return Err(ConfigError::InvalidEngine {
                    message: format!("单帧 delta 上限必须为正数，实际为 {max}"),
                });
            }
        }

        Ok(())
    }
}

/// 生命周期声明
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LifecycleDecl {
    /// 引擎配置
    #[serde(default)]
    pub engine: EngineConfig,

    /// 状态（有序）
    #[serde(with = "ordered_map")]
    pub states: Vec<(String, Vector)>,

    /// 过渡（源状态 → 过渡描述列表，有序）
    #[serde(default, with = "ordered_map")]
    pub transitions: Vec<(String, Vec<TransitionSpec>)>,
}

impl LifecycleDecl {
    /// 从 JSON 字符串解析
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// 从文件加载
    ///
    /// 声明没有合理的默认值，读取或解析失败直接返回错误。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        let decl = Self::from_json_str(&content)?;
        debug!(
            path = %path.display(),
            states = decl.states.len(),
            "生命周期声明加载成功"
        );
        Ok(decl)
    }

    /// 序列化为格式化 JSON
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// 转换为构建器（尚未校验，校验在 `build()` 中进行）
    pub fn into_builder(self) -> LifecycleBuilder {
        let mut builder = LifecycleBuilder::new().engine(self.engine);
        for (name, vector) in self.states {
            builder = builder.state(name, vector);
        }
        for (from, specs) in self.transitions {
            for spec in specs {
                builder = builder.transition(from.clone(), spec);
            }
        }
        builder
    }
}

/// 以 JSON 对象形式读写有序的 `Vec<(String, V)>`
mod ordered_map {
    use std::fmt;
    use std::marker::PhantomData;

    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[allow(clippy::ptr_arg)]
    pub fn serialize<S, V>(entries: &Vec<(String, V)>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        V: Serialize,
    {
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (k, v) in entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D, V>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        struct OrderedVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
            type Value = Vec<(String, V)>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("JSON 对象")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, V>()? {
                    entries.push(entry);
                }
                Ok(entries)
            }
        }

        deserializer.deserialize_map(OrderedVisitor(PhantomData))
    }
}

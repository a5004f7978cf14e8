//! # Transition 模块
//!
//! 过渡描述与过渡表。
//!
//! 过渡描述属于一对 (源状态, 目标状态)，携带时长、缓动曲线和可选的完成回调。
//! 表中没有登记的状态对使用引擎默认描述（见 [`EngineConfig`](crate::EngineConfig)）。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::easing::Easing;
use crate::error::ConfigError;
use crate::states::StateSet;

/// 过渡完成回调
pub type CompletionCallback = Box<dyn FnMut()>;

/// 过渡描述（可序列化部分）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionSpec {
    /// 目标状态
    pub to: String,
    /// 时长（毫秒），缺省使用引擎默认值
    #[serde(default, rename = "duration", skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
    /// 缓动曲线，缺省使用引擎默认值
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<Easing>,
}

impl TransitionSpec {
    /// 创建使用默认时长与缓动的过渡描述
    pub fn to(state: impl Into<String>) -> Self {
        Self {
            to: state.into(),
            duration_ms: None,
            easing: None,
        }
    }

    /// 设置时长（毫秒）
    pub fn with_duration(mut self, duration_ms: f64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// 设置缓动曲线
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }
}

/// 解析后的过渡参数（运行期使用）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedTransition {
    /// 时长（毫秒，> 0）
    pub duration_ms: f64,
    /// 缓动曲线
    pub easing: Easing,
    /// 是否来自表中登记的描述
    pub registered: bool,
}

/// 表项
struct Entry {
    from: String,
    spec: TransitionSpec,
    on_complete: Option<CompletionCallback>,
}

/// 过渡表
///
/// 同一状态对重复登记时，后登记的描述覆盖先登记的。
#[derive(Default)]
pub struct TransitionTable {
    entries: Vec<Entry>,
}

impl fmt::Debug for TransitionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| {
                (
                    e.from.as_str(),
                    &e.spec,
                    e.on_complete.as_ref().map(|_| "on_complete"),
                )
            }))
            .finish()
    }
}

impl TransitionTable {
    /// 创建空表
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记过渡描述
    pub fn insert(&mut self, from: impl Into<String>, spec: TransitionSpec) {
        let from = from.into();
        match self.find_mut(&from, &spec.to) {
            Some(entry) => entry.spec = spec,
            None => self.entries.push(Entry {
                from,
                spec,
                on_complete: None,
            }),
        }
    }

    /// 设置完成回调
    ///
    /// 状态对尚未登记时，登记一个使用默认时长与缓动的描述。
    pub fn set_on_complete(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        callback: CompletionCallback,
    ) {
        let from = from.into();
        let to = to.into();
        match self.find_mut(&from, &to) {
            Some(entry) => entry.on_complete = Some(callback),
            None => self.entries.push(Entry {
                from,
                spec: TransitionSpec::to(to),
                on_complete: Some(callback),
            }),
        }
    }

    /// 查找已登记的描述
    pub fn get(&self, from: &str, to: &str) -> Option<&TransitionSpec> {
        self.entries
            .iter()
            .find(|e| e.from == from && e.spec.to == to)
            .map(|e| &e.spec)
    }

    /// 按登记顺序遍历 (源状态, 描述)
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TransitionSpec)> {
        self.entries.iter().map(|e| (e.from.as_str(), &e.spec))
    }

    /// 登记数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 解析状态对的过渡参数，未登记时使用引擎默认值
    pub fn resolve(&self, from: &str, to: &str, engine: &EngineConfig) -> ResolvedTransition {
        match self.get(from, to) {
            Some(spec) => ResolvedTransition {
                duration_ms: spec.duration_ms.unwrap_or(engine.default_duration_ms),
                easing: spec.easing.unwrap_or(engine.default_easing),
                registered: true,
            },
            None => ResolvedTransition {
                duration_ms: engine.default_duration_ms,
                easing: engine.default_easing,
                registered: false,
            },
        }
    }

    /// 调用完成回调（若有）
    ///
    /// # 返回
    /// 是否调用了回调
    pub fn fire_on_complete(&mut self, from: &str, to: &str) -> bool {
        match self.find_mut(from, to).and_then(|e| e.on_complete.as_mut()) {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    /// 校验所有描述引用的状态都已声明、时长有效
    pub fn validate(&self, states: &StateSet) -> Result<(), ConfigError> {
        for entry in &self.entries {
            let to = &entry.spec.to;
            for name in [&entry.from, to] {
                if !states.contains(name) {
                    return Err(ConfigError::UnknownTransitionState {
                        from: entry.from.clone(),
                        to: to.clone(),
                        missing: name.clone(),
                    });
                }
            }

            if let Some(duration_ms) = entry.spec.duration_ms {
                if !(duration_ms.is_finite() && duration_ms > 0.0) {
                    return Err(ConfigError::InvalidDuration {
                        from: entry.from.clone(),
                        to: to.clone(),
                        duration_ms,
                    });
                }
            }
        }
        Ok(())
    }

    fn find_mut(&mut self, from: &str, to: &str) -> Option<&mut Entry> {
        self.entries
            .iter_mut()
            .find(|e| e.from == from && e.spec.to == to)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::vector::Vector;

    fn states() -> StateSet {
        StateSet::new(vec![
            ("a".to_string(), Vector::new().with("x", 0.0)),
            ("b".to_string(), Vector::new().with("x", 1.0)),
        ])
        .unwrap()
    }

    #[test]
    fn test_resolve_default() {
        let table = TransitionTable::new();
        let resolved = table.resolve("a", "b", &EngineConfig::default());
        assert_eq!(resolved.duration_ms, 1000.0);
        assert_eq!(resolved.easing, Easing::EaseOutQuart);
        assert!(!resolved.registered);
    }

    #[test]
    fn test_resolve_registered_partial() {
        let mut table = TransitionTable::new();
        table.insert("a", TransitionSpec::to("b").with_easing(Easing::Linear));
        let resolved = table.resolve("a", "b", &EngineConfig::default());
        assert_eq!(resolved.duration_ms, 1000.0);
        assert_eq!(resolved.easing, Easing::Linear);
        assert!(resolved.registered);

        // 方向相反的状态对不受影响
        assert!(!table.resolve("b", "a", &EngineConfig::default()).registered);
    }

    #[test]
    fn test_insert_overrides_and_keeps_callback() {
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();

        let mut table = TransitionTable::new();
        table.set_on_complete("a", "b", Box::new(move || counter.set(counter.get() + 1)));
        table.insert("a", TransitionSpec::to("b").with_duration(250.0));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("a", "b").unwrap().duration_ms, Some(250.0));

        assert!(table.fire_on_complete("a", "b"));
        assert!(!table.fire_on_complete("b", "a"));
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_validate() {
        let mut table = TransitionTable::new();
        table.insert("a", TransitionSpec::to("b").with_duration(100.0));
        assert!(table.validate(&states()).is_ok());

        table.insert("a", TransitionSpec::to("c"));
        assert_eq!(
            table.validate(&states()),
            Err(ConfigError::UnknownTransitionState {
                from: "a".to_string(),
                to: "c".to_string(),
                missing: "c".to_string(),
            })
        );

        let mut table = TransitionTable::new();
        table.insert("b", TransitionSpec::to("a").with_duration(0.0));
        assert!(matches!(
            table.validate(&states()),
            Err(ConfigError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn test_spec_serde() {
        let spec: TransitionSpec =
            serde_json::from_str(r#"{"to": "b", "duration": 300, "easing": "linear"}"#).unwrap();
        assert_eq!(
            spec,
            TransitionSpec::to("b")
                .with_duration(300.0)
                .with_easing(Easing::Linear)
        );

        let spec: TransitionSpec = serde_json::from_str(r#"{"to": "b"}"#).unwrap();
        assert_eq!(spec, TransitionSpec::to("b"));
    }
}

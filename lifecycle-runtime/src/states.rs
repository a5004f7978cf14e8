//! # States 模块
//!
//! 声明的状态集合：状态名 → 向量，保持声明顺序。
//!
//! 构造时校验：至少一个状态、状态名不重复、字段不重复、值为有限数、
//! 所有向量字段集合一致。校验通过后集合在实例生命周期内不再变化。

use crate::error::ConfigError;
use crate::vector::{Vector, duplicate_key};

/// 挂载状态名
pub const MOUNT_STATE: &str = "mount";
/// 默认状态名
pub const DEFAULT_STATE: &str = "default";

/// 已校验的状态集合
#[derive(Debug, Clone, PartialEq)]
pub struct StateSet {
    states: Vec<(String, Vector)>,
}

impl StateSet {
    /// 校验并创建状态集合
    pub fn new(states: Vec<(String, Vector)>) -> Result<Self, ConfigError> {
        let Some((reference_name, reference)) = states.first() else {
            return Err(ConfigError::NoStates);
        };

        for (i, (name, vector)) in states.iter().enumerate() {
            if states[..i].iter().any(|(prev, _)| prev == name) {
                return Err(ConfigError::DuplicateState { name: name.clone() });
            }

            if let Some(field) = duplicate_key(vector) {
                return Err(ConfigError::DuplicateField {
                    state: name.clone(),
                    field: field.to_string(),
                });
            }

            if let Some((field, _)) = vector.iter().find(|(_, v)| !v.is_finite()) {
                return Err(ConfigError::NonFiniteValue {
                    state: name.clone(),
                    field: field.to_string(),
                });
            }

            if !vector.same_keys(reference) {
                return Err(ConfigError::FieldMismatch {
                    state: name.clone(),
                    reference: reference_name.clone(),
                    expected: join_keys(reference),
                    found: join_keys(vector),
                });
            }
        }

        Ok(Self { states })
    }

    /// 获取状态向量
    pub fn get(&self, name: &str) -> Option<&Vector> {
        self.states
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// 状态是否已声明
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// 按声明顺序遍历状态名
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(|(k, _)| k.as_str())
    }

    /// 按声明顺序遍历 (状态名, 向量)
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Vector)> {
        self.states.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// 状态数量
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// 是否为空（校验后恒为 false）
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// 初始状态：`mount` > `default` > 第一个声明的状态
    pub fn initial(&self) -> (&str, &Vector) {
        [MOUNT_STATE, DEFAULT_STATE]
            .into_iter()
            .find_map(|name| self.get(name).map(|v| (name, v)))
            .unwrap_or_else(|| {
                let (name, vector) = &self.states[0];
                (name.as_str(), vector)
            })
    }

    /// 挂载后是否需要自动请求 `mount` → `default`
    pub fn animates_on_mount(&self) -> bool {
        self.contains(MOUNT_STATE) && self.contains(DEFAULT_STATE)
    }
}

fn join_keys(vector: &Vector) -> String {
    vector.keys().collect::<Vec<_>>().join(", ")
}

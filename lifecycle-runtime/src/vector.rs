//! # Vector 模块
//!
//! 命名数值向量，以及插值 / 反推进度的数学工具。
//!
//! 字段保持声明顺序：反推进度时使用的“探测字段”依赖这一顺序。

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 命名数值向量
///
/// 字段名到 f64 的有序映射。同一个生命周期实例中的所有向量共享同一组字段名。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vector {
    fields: Vec<(String, f64)>,
}

impl Vector {
    /// 创建空向量
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加或覆盖字段（构建器风格）
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set(name, value);
        self
    }

    /// 设置字段值；字段不存在时追加到末尾
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value,
            None => self.fields.push((name, value)),
        }
    }

    /// 获取字段值
    pub fn get(&self, name: &str) -> Option<f64> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| *v)
    }

    /// 字段数量
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// 是否没有任何字段
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 按声明顺序遍历字段名
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// 按声明顺序遍历 (字段名, 值)
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// 两个向量是否拥有相同的字段集合（与顺序无关）
    pub fn same_keys(&self, other: &Vector) -> bool {
        self.len() == other.len() && self.keys().all(|k| other.get(k).is_some())
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Vector {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut vector = Vector::new();
        for (k, v) in iter {
            vector.set(k, v);
        }
        vector
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k}: {v}")?;
        }
        write!(f, "}}")
    }
}

impl Serialize for Vector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, &v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Vector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct VectorVisitor;

        impl<'de> Visitor<'de> for VectorVisitor {
            type Value = Vector;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("字段名到数值的映射")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Vector, A::Error> {
                // 重复字段保留为重复项，交给 StateSet 校验时报错
                let mut fields = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((k, v)) = access.next_entry::<String, f64>()? {
                    fields.push((k, v));
                }
                Ok(Vector { fields })
            }
        }

        deserializer.deserialize_map(VectorVisitor)
    }
}

/// 找出向量中第一个重复的字段名
pub(crate) fn duplicate_key(vector: &Vector) -> Option<&str> {
    vector
        .fields
        .iter()
        .enumerate()
        .find(|(i, (k, _))| vector.fields[..*i].iter().any(|(prev, _)| prev == k))
        .map(|(_, (k, _))| k.as_str())
}

/// 线性插值：`from[k] + alpha * (to[k] - from[k])`
///
/// 前置条件：两个向量字段集合相同（由 `StateSet` 在构造时保证）。
/// `to` 中缺少的字段保持 `from` 的值。
pub fn interpolate(from: &Vector, to: &Vector, alpha: f64) -> Vector {
    debug_assert!(from.same_keys(to), "插值的两个向量字段集合不一致");

    from.iter()
        .map(|(k, a)| {
            let value = match to.get(k) {
                Some(b) => a + alpha * (b - a),
                None => a,
            };
            (k, value)
        })
        .collect()
}

/// 反推进度：求使 `observed` 位于 `from` → `to` 直线上的 alpha
///
/// 返回值按 `(observed - to) / (from - to)` 计算，即从 `to` 回到 `from` 方向的进度。
/// 只使用一个探测字段：第一个字段；若两端在该字段上相等，则取第一个不相等的字段。
/// 所有字段都相等时返回 1。结果限制在 [0, 1]。
pub fn extrapolate_alpha(from: &Vector, to: &Vector, observed: &Vector) -> f64 {
    let probe = from.iter().find_map(|(k, a)| match to.get(k) {
        Some(b) if a != b => Some((k, a, b)),
        _ => None,
    });

    let Some((key, a, b)) = probe else {
        return 1.0;
    };

    match observed.get(key) {
        Some(value) => ((value - b) / (a - b)).clamp(0.0, 1.0),
        None => 1.0,
    }
}

/// 逐字段精确比较（无容差）
pub fn vectors_equal(a: &Vector, b: &Vector) -> bool {
    a.same_keys(b) && a.iter().all(|(k, v)| b.get(k) == Some(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(fields: &[(&str, f64)]) -> Vector {
        fields.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn test_interpolate() {
        let from = v(&[("x", 0.0), ("y", 10.0)]);
        let to = v(&[("x", 10.0), ("y", 0.0)]);
        assert_eq!(interpolate(&from, &to, 0.5), v(&[("x", 5.0), ("y", 5.0)]));
        assert_eq!(interpolate(&from, &to, 0.0), from);
    }

    #[test]
    fn test_interpolate_keeps_field_order() {
        let from = v(&[("y", 0.0), ("x", 0.0)]);
        let to = v(&[("x", 4.0), ("y", 2.0)]);
        let out = interpolate(&from, &to, 0.5);
        assert_eq!(out.keys().collect::<Vec<_>>(), vec!["y", "x"]);
        assert_eq!(out.get("x"), Some(2.0));
    }

    #[test]
    fn test_extrapolate_round_trip() {
        let from = v(&[("x", 0.0), ("y", 10.0)]);
        let to = v(&[("x", 100.0), ("y", -10.0)]);
        for a in [0.0, 0.25, 0.5, 0.75, 1.0] {
            let observed = interpolate(&from, &to, a);
            // 结果是从 to 回到 from 的进度
            let back = extrapolate_alpha(&from, &to, &observed);
            assert!((back - (1.0 - a)).abs() < 1e-12, "a = {a}, back = {back}");
            // 交换两端即得到正向进度
            let forward = extrapolate_alpha(&to, &from, &observed);
            assert!((forward - a).abs() < 1e-12);
        }
    }

    #[test]
    fn test_extrapolate_probe_falls_through_equal_field() {
        let from = v(&[("x", 5.0), ("y", 0.0)]);
        let to = v(&[("x", 5.0), ("y", 10.0)]);
        let observed = v(&[("x", 5.0), ("y", 2.5)]);
        assert!((extrapolate_alpha(&from, &to, &observed) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_extrapolate_identical_endpoints() {
        let a = v(&[("x", 1.0)]);
        assert_eq!(extrapolate_alpha(&a, &a, &a), 1.0);
        assert_eq!(extrapolate_alpha(&Vector::new(), &Vector::new(), &a), 1.0);
    }

    #[test]
    fn test_vectors_equal() {
        let a = v(&[("x", 1.0), ("y", 2.0)]);
        let b = v(&[("y", 2.0), ("x", 1.0)]);
        let c = v(&[("x", 1.0), ("y", 2.000001)]);
        assert!(vectors_equal(&a, &b));
        assert!(!vectors_equal(&a, &c));
        assert!(!vectors_equal(&a, &v(&[("x", 1.0)])));
    }

    #[test]
    fn test_serde_preserves_order() {
        let vector: Vector = serde_json::from_str(r#"{"opacity": 0, "x": -20.5}"#).unwrap();
        assert_eq!(vector.keys().collect::<Vec<_>>(), vec!["opacity", "x"]);
        assert_eq!(
            serde_json::to_string(&vector).unwrap(),
            r#"{"opacity":0.0,"x":-20.5}"#
        );
    }

    #[test]
    fn test_duplicate_key() {
        let vector: Vector = serde_json::from_str(r#"{"x": 0, "y": 1, "x": 2}"#).unwrap();
        assert_eq!(duplicate_key(&vector), Some("x"));
        assert_eq!(duplicate_key(&v(&[("x", 0.0)])), None);
    }
}

//! 数值精度工具模块
//!
//! 提供效率评分等需要固定小数位数的计算与序列化支持

use serde::{Deserialize, Deserializer, Serializer};

/// 评分保留的小数位数
pub const SCORE_DECIMALS: i32 = 2;

/// 四舍五入到指定小数位（远离零方向舍入）
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let multiplier = 10f64.powi(decimals);
    (value * multiplier).round() / multiplier
}

/// 四舍五入到评分精度（小数点后2位）
pub fn round_score(value: f64) -> f64 {
    round_to(value, SCORE_DECIMALS)
}

/// 可选评分字段精度（Option<f64>）
///
/// 用于 serde 的 serialize_with 和 deserialize_with 属性
pub mod option_score_precision {
    use super::*;

    /// 序列化 Option<f64> 为固定 2 位小数
    pub fn serialize<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_some(&round_score(*v)),
            None => serializer.serialize_none(),
        }
    }

    /// 反序列化保持原有精度
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<f64>::deserialize(deserializer)
    }
}

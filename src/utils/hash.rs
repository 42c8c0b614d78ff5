//! Prompt 指纹
//!
//! 非加密的 32 位滚动哈希，仅用于界面上"可能是同一个 prompt"的分组，
//! 不提供抗碰撞保证。

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// 计算 prompt 指纹（`h = h * 31 + unit`，按 UTF-16 码元，32 位回绕，取绝对值后转 36 进制）
///
/// 空字符串返回空指纹。
pub fn prompt_hash(prompt: &str) -> String {
    if prompt.is_empty() {
        return String::new();
    }

    let hash = prompt
        .encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as i32));

    to_base36(hash.unsigned_abs())
}

fn to_base36(mut value: u32) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_prompt_has_empty_hash() {
        assert_eq!(prompt_hash(""), "");
    }

    #[test]
    fn test_known_values() {
        assert_eq!(prompt_hash("a"), "2p");
        assert_eq!(prompt_hash("hello"), "1n1e4y");
        assert_eq!(prompt_hash("Hello world"), "drxx7g");
    }

    #[test]
    fn test_surrogate_pairs_hash_per_code_unit() {
        assert_eq!(prompt_hash("😀"), "11zz7");
    }

    #[test]
    fn test_min_value_does_not_overflow() {
        // 该字符串的 32 位哈希恰好是 i32::MIN
        assert_eq!(prompt_hash("polygenelubricants"), "zik0zk");
    }

    #[test]
    fn test_order_dependent() {
        assert_ne!(prompt_hash("ab"), prompt_hash("ba"));
        assert_eq!(prompt_hash("same prompt"), prompt_hash("same prompt"));
    }

    #[test]
    fn test_base36_zero() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }
}
